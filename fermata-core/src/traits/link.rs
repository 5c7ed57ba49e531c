//! Host link trait

use fermata_protocol::Annotation;

/// Append-only annotation channel to the host
///
/// The controller emits one annotation per notable event; the link
/// implementation frames and transmits it. Must not block.
pub trait HostLink {
    fn annotate(&mut self, annotation: Annotation);
}

/// Link that discards annotations (no host attached)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLink;

impl HostLink for NullLink {
    fn annotate(&mut self, _annotation: Annotation) {}
}
