//! Configuration types
//!
//! Two persisted blocks, stored as postcard binary data through the
//! [`fermata_hal::NvStore`] trait:
//!
//! - [`ControlConstants`] — tuning parameters, seldom changed
//! - [`ControlSettings`] — mode and setpoints, changed by the host
//!
//! Write coalescing (skip the write when nothing changed) is handled by
//! the controller, not here.

pub mod constants;
pub mod settings;
pub mod store;

pub use constants::ControlConstants;
pub use settings::ControlSettings;
