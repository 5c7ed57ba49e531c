//! Hardware abstraction traits for the fermata chamber controller
//!
//! The control core is board-agnostic; boards implement these traits and
//! inject them at construction:
//!
//! - Keyed non-volatile block storage for settings and constants
//! - A monotonic seconds clock

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod store;

pub use clock::Clock;
pub use store::{NvStore, StorageKey, StoreError};
