//! Field and method entries of a classfile

use std::collections::BTreeSet;

use super::annotation::{read_annotation, read_element_value, read_type_annotation};
use super::class_id::ClassId;
use super::constant_pool::{Constant, ConstantPool};
use super::defs::access_flags::*;
use super::defs::attribute_names;
use super::reader::ByteReader;
use super::visibility::Visibility;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
}

impl MemberKind {
    pub fn keyword(self) -> &'static str {
        match self {
            MemberKind::Field => "field",
            MemberKind::Method => "method",
        }
    }
}

/// One `field_info` or `method_info` with the attributes that matter to
/// profiles
#[derive(Debug, Clone)]
pub struct MemberEntry {
    kind: MemberKind,
    container: ClassId,
    flags: u16,
    name: String,
    raw_descriptor: String,
    descriptor: String,
    value: Option<Constant>,
    synthetic: bool,
    deprecated: bool,
    exceptions: BTreeSet<ClassId>,
    annotations: Vec<String>,
    parameter_annotations: Vec<Vec<String>>,
    annotation_default: Option<String>,
}

impl MemberEntry {
    pub fn parse_field(container: &ClassId, reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<MemberEntry> {
        Self::parse(MemberKind::Field, container, reader, pool)
    }

    pub fn parse_method(container: &ClassId, reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<MemberEntry> {
        Self::parse(MemberKind::Method, container, reader, pool)
    }

    fn parse(kind: MemberKind, container: &ClassId, reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<MemberEntry> {
        let flags = reader.read_u2()?;
        let name = pool.text(reader.read_u2()?)?.to_string();
        let raw_descriptor = pool.text(reader.read_u2()?)?.to_string();
        let mut entry = MemberEntry {
            kind,
            container: container.clone(),
            flags,
            name,
            descriptor: raw_descriptor.clone(),
            raw_descriptor,
            value: None,
            synthetic: false,
            deprecated: false,
            exceptions: BTreeSet::new(),
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            annotation_default: None,
        };

        let attribute_count = reader.read_u2()?;
        for _ in 0..attribute_count {
            let attribute_name = pool.text(reader.read_u2()?)?;
            let length = reader.read_u4()? as usize;
            let mut body = reader.take(length)?;
            entry.read_attribute(attribute_name, &mut body, pool)?;
        }
        Ok(entry)
    }

    fn read_attribute(&mut self, name: &str, body: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<()> {
        match name {
            attribute_names::CONSTANT_VALUE => {
                self.value = Some(pool.constant(body.read_u2()?)?.clone());
            }
            attribute_names::SYNTHETIC => self.synthetic = true,
            attribute_names::DEPRECATED => self.deprecated = true,
            attribute_names::SIGNATURE => {
                self.descriptor = pool.text(body.read_u2()?)?.to_string();
            }
            attribute_names::EXCEPTIONS => {
                let count = body.read_u2()?;
                for _ in 0..count {
                    self.exceptions.insert(pool.class(body.read_u2()?)?.clone());
                }
            }
            attribute_names::RUNTIME_VISIBLE_ANNOTATIONS | attribute_names::RUNTIME_INVISIBLE_ANNOTATIONS => {
                let count = body.read_u2()?;
                for _ in 0..count {
                    self.annotations.push(read_annotation(body, pool)?);
                }
            }
            attribute_names::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS
            | attribute_names::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS => {
                let parameters = body.read_u1()?;
                for _ in 0..parameters {
                    let count = body.read_u2()?;
                    let mut list = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        list.push(read_annotation(body, pool)?);
                    }
                    self.parameter_annotations.push(list);
                }
            }
            attribute_names::RUNTIME_VISIBLE_TYPE_ANNOTATIONS | attribute_names::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS => {
                let count = body.read_u2()?;
                for _ in 0..count {
                    if let Some(text) = read_type_annotation(body, pool)? {
                        self.annotations.push(text);
                    }
                }
            }
            attribute_names::ANNOTATION_DEFAULT => {
                self.annotation_default = Some(read_element_value(body, pool)?);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    pub fn container(&self) -> &ClassId {
        &self.container
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generic signature if the member has one, else the erased descriptor
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn raw_descriptor(&self) -> &str {
        &self.raw_descriptor
    }

    /// Visibility from the member's own flags, ignoring its container
    pub fn visibility(&self) -> Visibility {
        Visibility::from_flags(self.flags)
    }

    pub fn is_static(&self) -> bool {
        self.flags & ACC_STATIC != 0
    }

    pub fn is_final(&self) -> bool {
        self.flags & ACC_FINAL != 0
    }

    /// Shares its bit with `ACC_BRIDGE`; only meaningful on fields
    pub fn is_volatile(&self) -> bool {
        self.flags & ACC_VOLATILE != 0
    }

    /// Shares its bit with `ACC_VARARGS`; only meaningful on fields
    pub fn is_transient(&self) -> bool {
        self.flags & ACC_TRANSIENT != 0
    }

    pub fn is_bridge(&self) -> bool {
        self.flags & ACC_BRIDGE != 0
    }

    pub fn is_varargs(&self) -> bool {
        self.flags & ACC_VARARGS != 0
    }

    /// Synthetic by flag or by `Synthetic` attribute
    pub fn is_synthetic(&self) -> bool {
        self.synthetic || self.flags & ACC_SYNTHETIC != 0
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn value(&self) -> Option<&Constant> {
        self.value.as_ref()
    }

    /// `=<value>` for fields with a constant value, else empty
    pub fn value_suffix(&self) -> String {
        match &self.value {
            Some(value) => format!("={}", value.render()),
            None => String::new(),
        }
    }

    pub fn exceptions(&self) -> &BTreeSet<ClassId> {
        &self.exceptions
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    pub fn parameter_annotations(&self) -> &[Vec<String>] {
        &self.parameter_annotations
    }

    pub fn annotation_default(&self) -> Option<&str> {
        self.annotation_default.as_deref()
    }

    /// Profile line for this member. The visibility word is the member's
    /// own, not the one merged with its containers.
    pub fn profile_line(&self) -> String {
        let mut line = format!("{}.{} {} ", self.container, self.name, self.kind.keyword());
        if let Some(word) = self.visibility().keyword() {
            line.push_str(word);
            line.push(' ');
        }
        let modifiers = [
            (self.is_static(), "static "),
            (self.is_final(), "final "),
            (self.is_volatile(), "volatile "),
            (self.is_transient(), "transient "),
            (self.is_deprecated(), "deprecated "),
        ];
        for (set, word) in modifiers {
            if set {
                line.push_str(word);
            }
        }
        line.push_str(&self.descriptor);
        line.push_str(&self.value_suffix());

        if self.is_method() {
            for exception in &self.exceptions {
                line.push_str(" ^");
                line.push_str(exception.as_str());
            }
        }
        for annotation in &self.annotations {
            line.push(' ');
            line.push_str(annotation);
        }
        if self.is_method() {
            for list in &self.parameter_annotations {
                line.push_str(" +");
                for annotation in list {
                    line.push(' ');
                    line.push_str(annotation);
                }
            }
            if let Some(default) = &self.annotation_default {
                line.push_str(" default ");
                line.push_str(default);
            }
        }
        line
    }
}
