//! Removal of identity and audit fields before content is resubmitted

use crate::block::{AuditFields, Block, Page};

/// Strips fields that are only valid on content read from the API
///
/// Applying it twice leaves the value as after the first call.
pub trait Sanitize {
    fn sanitize(&mut self);
}

impl Sanitize for Block {
    fn sanitize(&mut self) {
        self.id = None;
        self.audit = AuditFields::default();
    }
}

impl Sanitize for Page {
    fn sanitize(&mut self) {
        self.id = None;
        self.audit = AuditFields::default();
    }
}
