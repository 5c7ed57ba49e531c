//! Host Link Wire Contract
//!
//! This crate defines the parts of the controller that a connected host
//! (script or service on the serial link) depends on byte-for-byte:
//!
//! - The control mode characters (`'o'`, `'b'`, `'p'`, `'f'`, `'t'`)
//! - The temperature unit characters (`'C'`, `'F'`)
//! - Annotation events and their canonical rendered text
//!
//! Keeping these in one crate lets the controller core and any link
//! implementation agree on the external contract without sharing
//! internals.

#![no_std]
#![deny(unsafe_code)]

pub mod annotation;
pub mod mode;

pub use annotation::{Annotation, AnnotationText, MAX_ANNOTATION_LEN};
pub use mode::{ControlMode, TempUnit};
