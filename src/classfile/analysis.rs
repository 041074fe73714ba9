//! Whole-classfile decoding and profile generation

use std::collections::{BTreeMap, HashSet};

use log::trace;

use super::annotation::{read_annotation, read_type_annotation};
use super::class_id::ClassId;
use super::constant_pool::ConstantPool;
use super::defs::access_flags::*;
use super::defs::{attribute_names, MAGIC, STATIC_INITIALIZER_METHOD_NAME};
use super::member::{MemberEntry, MemberKind};
use super::reader::ByteReader;
use super::visibility::Visibility;
use crate::consts::ANALYSIS_MAX_CONTAINMENT_STEPS;
use crate::error::{Error, Result};
use crate::profile::ProfileLines;

/// One `InnerClasses` entry, keyed by the inner class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerInfo {
    pub outer: ClassId,
    pub flags: u16,
    pub visibility: Visibility,
}

impl InnerInfo {
    pub fn new(outer: ClassId, flags: u16) -> Self {
        Self { outer, flags, visibility: Visibility::from_flags(flags) }
    }
}

#[derive(Debug, Clone)]
struct Loaded {
    id: ClassId,
    major_version: u16,
    minor_version: u16,
    pool: ConstantPool,
    flags: u16,
    visibility: Visibility,
    synthetic: bool,
    anonymous: bool,
    signature: String,
    superclass: Option<ClassId>,
    interfaces: Vec<ClassId>,
    annotations: Vec<String>,
    fields: Vec<MemberEntry>,
    methods: Vec<MemberEntry>,
    inners: BTreeMap<ClassId, InnerInfo>,
}

/// A decoded classfile.
///
/// The analysis is reusable: [`ClassAnalysis::load`] replaces everything,
/// and a failed load leaves it cleared. Accessors return `None` or empty
/// values while nothing is loaded.
#[derive(Debug, Clone, Default)]
pub struct ClassAnalysis {
    loaded: Option<Loaded>,
}

impl ClassAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a classfile into a fresh analysis
    pub fn parse(expected: Option<&ClassId>, bytes: &[u8]) -> Result<ClassAnalysis> {
        let mut analysis = ClassAnalysis::new();
        analysis.load(expected, bytes)?;
        Ok(analysis)
    }

    pub fn clear(&mut self) {
        self.loaded = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Load a class from raw classfile bytes. When `expected` is given, the
    /// class named in the file must match it.
    pub fn load(&mut self, expected: Option<&ClassId>, bytes: &[u8]) -> Result<()> {
        self.clear();
        self.loaded = Some(read_class(expected, bytes)?);
        Ok(())
    }

    pub fn class_id(&self) -> Option<&ClassId> {
        self.loaded.as_ref().map(|l| &l.id)
    }

    pub fn major_version(&self) -> u16 {
        self.loaded.as_ref().map_or(0, |l| l.major_version)
    }

    pub fn minor_version(&self) -> u16 {
        self.loaded.as_ref().map_or(0, |l| l.minor_version)
    }

    pub fn constant_pool(&self) -> Option<&ConstantPool> {
        self.loaded.as_ref().map(|l| &l.pool)
    }

    pub fn flags(&self) -> u16 {
        self.loaded.as_ref().map_or(0, |l| l.flags)
    }

    /// Visibility after merging every containing class
    pub fn visibility(&self) -> Option<Visibility> {
        self.loaded.as_ref().map(|l| l.visibility)
    }

    pub fn is_synthetic(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.synthetic)
    }

    /// Anonymous itself or nested somewhere inside an anonymous class
    pub fn is_anonymous(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.anonymous)
    }

    /// Generic class signature, or the erased `L<super>;L<iface>;...` form
    pub fn signature(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.signature.as_str())
    }

    /// `None` for `java/lang/Object` and when nothing is loaded
    pub fn superclass(&self) -> Option<&ClassId> {
        self.loaded.as_ref().and_then(|l| l.superclass.as_ref())
    }

    pub fn interfaces(&self) -> &[ClassId] {
        self.loaded.as_ref().map_or(&[][..], |l| l.interfaces.as_slice())
    }

    pub fn annotations(&self) -> &[String] {
        self.loaded.as_ref().map_or(&[][..], |l| l.annotations.as_slice())
    }

    pub fn fields(&self) -> &[MemberEntry] {
        self.loaded.as_ref().map_or(&[][..], |l| l.fields.as_slice())
    }

    pub fn methods(&self) -> &[MemberEntry] {
        self.loaded.as_ref().map_or(&[][..], |l| l.methods.as_slice())
    }

    pub fn inner_classes(&self) -> Option<&BTreeMap<ClassId, InnerInfo>> {
        self.loaded.as_ref().map(|l| &l.inners)
    }

    /// Every class named in the constant pool, reduced to its base type.
    /// Arrays of primitives contribute nothing.
    pub fn runtime_class_references(&self) -> Vec<ClassId> {
        match &self.loaded {
            Some(l) => l.pool.classes().filter_map(ClassId::base_type).collect(),
            None => Vec::new(),
        }
    }

    /// Descriptor (or generic signature) of every field and method
    pub fn member_signatures(&self) -> Vec<(MemberKind, &str)> {
        self.fields()
            .iter()
            .chain(self.methods())
            .map(|m| (m.kind(), m.descriptor()))
            .collect()
    }

    /// The class line of the profile, whether or not it is emitted
    pub fn profile_class_line(&self) -> Option<String> {
        let l = self.loaded.as_ref()?;
        let mut line = format!("{} ", l.id);
        if l.flags & ACC_ENUM != 0 {
            line.push_str("enums");
        } else if l.flags & ACC_ANNOTATION != 0 {
            line.push_str("annot");
        } else if l.flags & ACC_INTERFACE != 0 {
            line.push_str("iface");
        } else {
            line.push_str("class");
            if l.flags & ACC_ABSTRACT != 0 {
                line.push_str(" abstract");
            }
            if l.flags & ACC_FINAL != 0 {
                line.push_str(" final");
            }
        }
        if let Some(word) = l.visibility.keyword() {
            line.push(' ');
            line.push_str(word);
        }
        line.push(' ');
        line.push_str(&l.signature);
        for annotation in &l.annotations {
            line.push(' ');
            line.push_str(annotation);
        }
        Some(line)
    }

    /// Add this class's lines to the public and package profiles.
    ///
    /// Anonymous and synthetic classes contribute nothing, nor do private
    /// members or members of a class concealed by a private container.
    pub fn create_profiles(&self, lines: &mut ProfileLines) {
        let Some(l) = self.loaded.as_ref() else {
            return;
        };
        if l.anonymous || l.synthetic {
            return;
        }
        if l.visibility.is_visible() {
            if let Some(class_line) = self.profile_class_line() {
                lines.add(class_line, l.visibility.is_public_surface());
            }
        }

        let members = l
            .fields
            .iter()
            .chain(l.methods.iter().filter(|m| m.name() != STATIC_INITIALIZER_METHOD_NAME));
        for member in members {
            if member.is_synthetic() {
                continue;
            }
            let effective = l.visibility.merge(member.visibility());
            if !effective.is_visible() {
                continue;
            }
            lines.add(member.profile_line(), effective.is_public_surface());
        }
    }
}

fn read_class(expected: Option<&ClassId>, bytes: &[u8]) -> Result<Loaded> {
    let mut reader = ByteReader::new(bytes);
    if reader.read_u4()? != MAGIC {
        return Err(Error::format_error("Not a class"));
    }
    let minor_version = reader.read_u2()?;
    let major_version = reader.read_u2()?;
    let pool = ConstantPool::build(&mut reader)?;

    let flags = reader.read_u2()?;
    let id = pool.class(reader.read_u2()?)?.clone();
    if let Some(expected) = expected {
        if *expected != id {
            return Err(Error::IdentityMismatch { expected: expected.clone(), found: id });
        }
    }

    let mut signature = String::new();
    let superclass = match reader.read_u2()? {
        0 => None,
        index => Some(pool.class(index)?.clone()),
    };
    if let Some(superclass) = &superclass {
        signature.push_str(&format!("L{};", superclass));
    }
    let interface_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        let interface = pool.class(reader.read_u2()?)?.clone();
        signature.push_str(&format!("L{};", interface));
        interfaces.push(interface);
    }

    let field_count = reader.read_u2()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        fields.push(MemberEntry::parse_field(&id, &mut reader, &pool)?);
    }
    let method_count = reader.read_u2()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        methods.push(MemberEntry::parse_method(&id, &mut reader, &pool)?);
    }

    let mut inners = BTreeMap::new();
    let mut annotations = Vec::new();
    let attribute_count = reader.read_u2()?;
    for _ in 0..attribute_count {
        let name = pool.text(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;
        let mut body = reader.take(length)?;
        match name {
            attribute_names::INNER_CLASSES => {
                let count = body.read_u2()?;
                for _ in 0..count {
                    let inner_index = body.read_u2()?;
                    let outer_index = body.read_u2()?;
                    let _name_index = body.read_u2()?;
                    let inner_flags = body.read_u2()?;
                    if inner_index != 0 && outer_index != 0 {
                        let inner = pool.class(inner_index)?.clone();
                        let outer = pool.class(outer_index)?.clone();
                        inners.insert(inner, InnerInfo::new(outer, inner_flags));
                    }
                }
            }
            attribute_names::SIGNATURE => {
                signature = pool.text(body.read_u2()?)?.to_string();
            }
            attribute_names::RUNTIME_VISIBLE_ANNOTATIONS | attribute_names::RUNTIME_INVISIBLE_ANNOTATIONS => {
                let count = body.read_u2()?;
                for _ in 0..count {
                    annotations.push(read_annotation(&mut body, &pool)?);
                }
            }
            attribute_names::RUNTIME_VISIBLE_TYPE_ANNOTATIONS | attribute_names::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS => {
                let count = body.read_u2()?;
                for _ in 0..count {
                    if let Some(text) = read_type_annotation(&mut body, &pool)? {
                        annotations.push(text);
                    }
                }
            }
            _ => {}
        }
    }

    let mut loaded = Loaded {
        visibility: Visibility::from_flags(flags),
        synthetic: flags & ACC_SYNTHETIC != 0,
        anonymous: id.is_anonymous(),
        id,
        major_version,
        minor_version,
        pool,
        flags,
        signature,
        superclass,
        interfaces,
        annotations,
        fields,
        methods,
        inners,
    };
    conceal(&mut loaded);
    Ok(loaded)
}

/// Walk outwards through the inner-class table, narrowing visibility and
/// inheriting synthetic and anonymous status from each container
fn conceal(loaded: &mut Loaded) {
    let mut current = loaded.id.clone();
    let mut visited = HashSet::new();
    visited.insert(current.clone());
    for _ in 0..ANALYSIS_MAX_CONTAINMENT_STEPS {
        let Some(info) = loaded.inners.get(&current) else {
            break;
        };
        loaded.visibility = loaded.visibility.merge(info.visibility);
        loaded.synthetic |= info.flags & ACC_SYNTHETIC != 0;
        loaded.anonymous |= info.outer.is_anonymous();
        if !visited.insert(info.outer.clone()) {
            trace!("containment of {} loops at {}", loaded.id, info.outer);
            break;
        }
        current = info.outer.clone();
    }
}
