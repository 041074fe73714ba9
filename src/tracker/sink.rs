use super::signature;
use crate::classfile::ClassId;
use crate::error::Result;

/// Anything that accepts class references discovered during analysis.
///
/// Only [`ClassSink::submit`] is required; the signature methods walk the
/// signature grammar and submit every class type they find.
pub trait ClassSink {
    fn submit(&mut self, id: &ClassId);

    fn submit_class_signature(&mut self, text: &str) -> Result<()> {
        signature::parse_class_signature(text, self)
    }

    fn submit_field_signature(&mut self, text: &str) -> Result<()> {
        signature::parse_field_signature(text, self)
    }

    fn submit_method_signature(&mut self, text: &str) -> Result<()> {
        signature::parse_method_signature(text, self)
    }

    fn submit_type_signature(&mut self, text: &str) -> Result<()> {
        signature::parse_type_signature(text, self)
    }
}
