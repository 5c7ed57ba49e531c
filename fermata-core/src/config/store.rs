//! Configuration persistence
//!
//! Serialises the two configuration blocks with postcard into their
//! [`StorageKey`] slots. A written block reads back to an equal value.

use fermata_hal::{NvStore, StorageKey, StoreError};

use super::{ControlConstants, ControlSettings};

/// Upper bound on a postcard-encoded configuration block
pub const MAX_BLOCK_SIZE: usize = 96;

/// Load the constants block
pub fn load_constants<S: NvStore>(store: &mut S) -> Result<ControlConstants, StoreError> {
    let mut buffer = [0u8; MAX_BLOCK_SIZE];
    let len = store.read(StorageKey::ControlConstants, &mut buffer)?;
    postcard::from_bytes(&buffer[..len]).map_err(|_| StoreError::Corrupted)
}

/// Write the constants block
pub fn store_constants<S: NvStore>(
    store: &mut S,
    constants: &ControlConstants,
) -> Result<(), StoreError> {
    let mut buffer = [0u8; MAX_BLOCK_SIZE];
    let used =
        postcard::to_slice(constants, &mut buffer).map_err(|_| StoreError::BufferTooSmall)?;
    store.write(StorageKey::ControlConstants, used)
}

/// Load the settings block
pub fn load_settings<S: NvStore>(store: &mut S) -> Result<ControlSettings, StoreError> {
    let mut buffer = [0u8; MAX_BLOCK_SIZE];
    let len = store.read(StorageKey::ControlSettings, &mut buffer)?;
    postcard::from_bytes(&buffer[..len]).map_err(|_| StoreError::Corrupted)
}

/// Write the settings block
pub fn store_settings<S: NvStore>(
    store: &mut S,
    settings: &ControlSettings,
) -> Result<(), StoreError> {
    let mut buffer = [0u8; MAX_BLOCK_SIZE];
    let used =
        postcard::to_slice(settings, &mut buffer).map_err(|_| StoreError::BufferTooSmall)?;
    store.write(StorageKey::ControlSettings, used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temp::Temperature;
    use fermata_protocol::ControlMode;

    /// In-memory store with a write counter
    struct MemStore {
        blocks: [([u8; MAX_BLOCK_SIZE], usize); 2],
        present: [bool; 2],
        writes: usize,
    }

    impl Default for MemStore {
        fn default() -> Self {
            MemStore {
                blocks: [([0u8; MAX_BLOCK_SIZE], 0), ([0u8; MAX_BLOCK_SIZE], 0)],
                present: [false, false],
                writes: 0,
            }
        }
    }

    impl NvStore for MemStore {
        fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StoreError> {
            let slot = key.as_u8() as usize;
            if !self.present[slot] {
                return Err(StoreError::NotFound);
            }
            let (data, len) = &self.blocks[slot];
            if buffer.len() < *len {
                return Err(StoreError::BufferTooSmall);
            }
            buffer[..*len].copy_from_slice(&data[..*len]);
            Ok(*len)
        }

        fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StoreError> {
            let slot = key.as_u8() as usize;
            if data.len() > MAX_BLOCK_SIZE {
                return Err(StoreError::Full);
            }
            self.blocks[slot].0[..data.len()].copy_from_slice(data);
            self.blocks[slot].1 = data.len();
            self.present[slot] = true;
            self.writes += 1;
            Ok(())
        }

        fn exists(&mut self, key: StorageKey) -> bool {
            self.present[key.as_u8() as usize]
        }

        fn erase_all(&mut self) -> Result<(), StoreError> {
            self.present = [false; 2];
            Ok(())
        }
    }

    #[test]
    fn test_constants_roundtrip() {
        let mut store = MemStore::default();
        let mut constants = ControlConstants::default();
        constants.light_as_heater = true;
        constants.heat_pwm_period_s = 8;

        store_constants(&mut store, &constants).unwrap();
        let loaded = load_constants(&mut store).unwrap();
        assert_eq!(loaded, constants);
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut store = MemStore::default();
        let settings = ControlSettings {
            mode: ControlMode::BeerConstant,
            beer_setting: Temperature::from_degrees(20),
            fridge_setting: Temperature::from_degrees(19),
        };

        store_settings(&mut store, &settings).unwrap();
        let loaded = load_settings(&mut store).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_sentinel_setpoints_roundtrip() {
        let mut store = MemStore::default();
        let settings = ControlSettings::default();
        store_settings(&mut store, &settings).unwrap();
        let loaded = load_settings(&mut store).unwrap();
        assert!(loaded.beer_setting.is_disabled_or_invalid());
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_block() {
        let mut store = MemStore::default();
        assert_eq!(load_settings(&mut store), Err(StoreError::NotFound));
    }

    #[test]
    fn test_corrupt_block() {
        let mut store = MemStore::default();
        store
            .write(StorageKey::ControlConstants, &[0xFF; MAX_BLOCK_SIZE])
            .unwrap();
        assert_eq!(load_constants(&mut store), Err(StoreError::Corrupted));
    }
}
