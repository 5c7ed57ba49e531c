//! Annotation events emitted on the host link
//!
//! The controller reports notable events (currently door transitions) as
//! one-line annotations. The host stores them alongside the temperature
//! log, so the rendered text is part of the external contract.

use heapless::String;

/// Maximum rendered annotation length in bytes
pub const MAX_ANNOTATION_LEN: usize = 24;

/// Rendered annotation text
pub type AnnotationText = String<MAX_ANNOTATION_LEN>;

/// A one-shot event the controller reports to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Annotation {
    /// The chamber door opened
    DoorOpened,
    /// The chamber door closed
    DoorClosed,
}

impl Annotation {
    /// Canonical annotation text as logged by the host
    pub fn as_str(self) -> &'static str {
        match self {
            Annotation::DoorOpened => "Fridge door opened",
            Annotation::DoorClosed => "Fridge door closed",
        }
    }

    /// Render into a bounded string for link transports that need an
    /// owned buffer
    pub fn render(self) -> AnnotationText {
        let mut text = AnnotationText::new();
        // as_str() is always shorter than MAX_ANNOTATION_LEN
        let _ = text.push_str(self.as_str());
        text
    }
}
