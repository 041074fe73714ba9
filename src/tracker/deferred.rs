use super::sink::ClassSink;
use crate::classfile::ClassId;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Submission {
    Class(ClassId),
    ClassSignature(String),
    FieldSignature(String),
    MethodSignature(String),
    TypeSignature(String),
}

/// Records submissions so they can be replayed into another sink later
#[derive(Debug, Clone, Default)]
pub struct DeferredClassSink {
    actions: Vec<Submission>,
}

impl DeferredClassSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Replay every recorded submission, in order, into `sink`
    pub fn apply(&self, sink: &mut dyn ClassSink) -> Result<()> {
        for action in &self.actions {
            match action {
                Submission::Class(id) => sink.submit(id),
                Submission::ClassSignature(text) => sink.submit_class_signature(text)?,
                Submission::FieldSignature(text) => sink.submit_field_signature(text)?,
                Submission::MethodSignature(text) => sink.submit_method_signature(text)?,
                Submission::TypeSignature(text) => sink.submit_type_signature(text)?,
            }
        }
        Ok(())
    }
}

// Signatures are stored unparsed; errors surface on replay
impl ClassSink for DeferredClassSink {
    fn submit(&mut self, id: &ClassId) {
        self.actions.push(Submission::Class(id.clone()));
    }

    fn submit_class_signature(&mut self, text: &str) -> Result<()> {
        self.actions.push(Submission::ClassSignature(text.to_string()));
        Ok(())
    }

    fn submit_field_signature(&mut self, text: &str) -> Result<()> {
        self.actions.push(Submission::FieldSignature(text.to_string()));
        Ok(())
    }

    fn submit_method_signature(&mut self, text: &str) -> Result<()> {
        self.actions.push(Submission::MethodSignature(text.to_string()));
        Ok(())
    }

    fn submit_type_signature(&mut self, text: &str) -> Result<()> {
        self.actions.push(Submission::TypeSignature(text.to_string()));
        Ok(())
    }
}
