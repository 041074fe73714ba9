//! Constant pool decoding for Java class files
//!
//! Decoding happens in two passes. The first pass ([`RawPool`]) reads every
//! entry as it appears in the file, keeping cross-references as plain
//! indices. The second pass resolves those indices into a read-only
//! [`ConstantPool`] in dependency order: text, then strings and classes
//! (which point at text), then name-and-type pairs (also text), then the
//! field/method/interface-method references (class + name-and-type).

use std::collections::BTreeMap;
use std::fmt;

use super::class_id::ClassId;
use super::defs::constant_tags::*;
use super::reader::ByteReader;
use crate::error::{Error, Result};

/// A literal value stored in the pool
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
    Class(ClassId),
}

impl Constant {
    /// Render the value the way profile lines and annotation values print it
    pub fn render(&self) -> String {
        match self {
            Constant::Integer(v) => v.to_string(),
            Constant::Long(v) => v.to_string(),
            Constant::Float(v) => java_floating(*v as f64, format!("{}", v), format!("{:e}", v)),
            Constant::Double(v) => java_floating(*v, format!("{}", v), format!("{:e}", v)),
            Constant::String(s) => quote(s),
            Constant::Class(id) => format!("L{};", id),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAndType {
    pub name: String,
    pub descriptor: String,
}

/// A field, method or interface-method reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub owner: ClassId,
    pub name_and_type: NameAndType,
}

/// A resolved pool entry
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    Text(String),
    Constant(Constant),
    NameAndType(NameAndType),
    FieldRef(MemberRef),
    MethodRef(MemberRef),
    InterfaceMethodRef(MemberRef),
}

/// First-pass entries, references still expressed as indices
#[derive(Debug)]
enum RawEntry {
    Utf8(String),
    Literal(Constant),
    Class(u16),
    String(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
}

/// Output of the first decoding pass
#[derive(Debug, Default)]
pub struct RawPool {
    entries: BTreeMap<u16, RawEntry>,
}

impl RawPool {
    /// Read the pool count and every entry. Long and Double take two
    /// slots; the second slot is never populated.
    pub fn read(reader: &mut ByteReader<'_>) -> Result<RawPool> {
        let count = reader.read_u2()?;
        let mut pool = RawPool::default();
        let mut index: u32 = 1;
        while index < count as u32 {
            let slots = pool.read_entry(index as u16, reader)?;
            index += slots;
        }
        Ok(pool)
    }

    fn read_entry(&mut self, index: u16, reader: &mut ByteReader<'_>) -> Result<u32> {
        let tag = reader.read_u1()?;
        let entry = match tag {
            CONSTANT_UTF8 => RawEntry::Utf8(reader.read_utf()?),
            CONSTANT_INTEGER => RawEntry::Literal(Constant::Integer(reader.read_i4()?)),
            CONSTANT_FLOAT => RawEntry::Literal(Constant::Float(reader.read_f4()?)),
            CONSTANT_LONG => {
                self.entries.insert(index, RawEntry::Literal(Constant::Long(reader.read_i8()?)));
                return Ok(2);
            }
            CONSTANT_DOUBLE => {
                self.entries.insert(index, RawEntry::Literal(Constant::Double(reader.read_f8()?)));
                return Ok(2);
            }
            CONSTANT_CLASS => RawEntry::Class(reader.read_u2()?),
            CONSTANT_STRING => RawEntry::String(reader.read_u2()?),
            CONSTANT_FIELDREF => RawEntry::FieldRef(reader.read_u2()?, reader.read_u2()?),
            CONSTANT_METHODREF => RawEntry::MethodRef(reader.read_u2()?, reader.read_u2()?),
            CONSTANT_INTERFACEMETHODREF => {
                RawEntry::InterfaceMethodRef(reader.read_u2()?, reader.read_u2()?)
            }
            CONSTANT_NAMEANDTYPE => RawEntry::NameAndType(reader.read_u2()?, reader.read_u2()?),
            // These contribute neither to signatures nor to runtime
            // dependencies; consume them to keep the stream aligned.
            CONSTANT_METHODHANDLE => {
                reader.skip(3)?;
                return Ok(1);
            }
            CONSTANT_METHODTYPE | CONSTANT_MODULE | CONSTANT_PACKAGE => {
                reader.skip(2)?;
                return Ok(1);
            }
            CONSTANT_DYNAMIC | CONSTANT_INVOKEDYNAMIC => {
                reader.skip(4)?;
                return Ok(1);
            }
            other => {
                return Err(Error::format_error(format!("CONSTANT type {} pos {}", other, index)));
            }
        };
        self.entries.insert(index, entry);
        Ok(1)
    }

    /// Second pass: resolve every index into its target
    pub fn resolve(self) -> Result<ConstantPool> {
        let mut texts: BTreeMap<u16, String> = BTreeMap::new();
        let mut literals: BTreeMap<u16, Constant> = BTreeMap::new();
        let mut pending = Vec::new();
        for (index, entry) in self.entries {
            match entry {
                RawEntry::Utf8(text) => {
                    texts.insert(index, text);
                }
                RawEntry::Literal(value) => {
                    literals.insert(index, value);
                }
                other => pending.push((index, other)),
            }
        }

        let text_at = |index: u16| -> Result<String> {
            texts
                .get(&index)
                .cloned()
                .ok_or_else(|| Error::reference_error("text", index))
        };

        let mut classes: BTreeMap<u16, ClassId> = BTreeMap::new();
        let mut nats: BTreeMap<u16, NameAndType> = BTreeMap::new();
        let mut refs = Vec::new();
        for (index, entry) in pending {
            match entry {
                RawEntry::String(text) => {
                    literals.insert(index, Constant::String(text_at(text)?));
                }
                RawEntry::Class(name) => {
                    classes.insert(index, ClassId::parse(&text_at(name)?)?);
                }
                RawEntry::NameAndType(name, descriptor) => {
                    nats.insert(
                        index,
                        NameAndType { name: text_at(name)?, descriptor: text_at(descriptor)? },
                    );
                }
                other => refs.push((index, other)),
            }
        }

        let member_ref = |class: u16, nat: u16| -> Result<MemberRef> {
            let owner = classes
                .get(&class)
                .cloned()
                .ok_or_else(|| Error::reference_error("class", class))?;
            let name_and_type = nats
                .get(&nat)
                .cloned()
                .ok_or_else(|| Error::reference_error("NameAndType", nat))?;
            Ok(MemberRef { owner, name_and_type })
        };

        let mut entries: BTreeMap<u16, PoolEntry> = BTreeMap::new();
        for (index, entry) in refs {
            let resolved = match entry {
                RawEntry::FieldRef(c, n) => PoolEntry::FieldRef(member_ref(c, n)?),
                RawEntry::MethodRef(c, n) => PoolEntry::MethodRef(member_ref(c, n)?),
                RawEntry::InterfaceMethodRef(c, n) => PoolEntry::InterfaceMethodRef(member_ref(c, n)?),
                _ => continue,
            };
            entries.insert(index, resolved);
        }
        entries.extend(texts.into_iter().map(|(i, t)| (i, PoolEntry::Text(t))));
        entries.extend(literals.into_iter().map(|(i, c)| (i, PoolEntry::Constant(c))));
        entries.extend(classes.into_iter().map(|(i, c)| (i, PoolEntry::Constant(Constant::Class(c)))));
        entries.extend(nats.into_iter().map(|(i, n)| (i, PoolEntry::NameAndType(n))));
        Ok(ConstantPool { entries })
    }
}

/// Read-only, fully resolved constant pool
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: BTreeMap<u16, PoolEntry>,
}

impl ConstantPool {
    /// Decode a constant pool, starting at its u2 count
    pub fn build(reader: &mut ByteReader<'_>) -> Result<ConstantPool> {
        RawPool::read(reader)?.resolve()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&PoolEntry> {
        self.entries.get(&index)
    }

    /// Any literal: numbers, strings and class literals
    pub fn constant(&self, index: u16) -> Result<&Constant> {
        match self.entries.get(&index) {
            Some(PoolEntry::Constant(c)) => Ok(c),
            _ => Err(Error::reference_error("constant", index)),
        }
    }

    pub fn text(&self, index: u16) -> Result<&str> {
        match self.entries.get(&index) {
            Some(PoolEntry::Text(t)) => Ok(t),
            _ => Err(Error::reference_error("text", index)),
        }
    }

    pub fn string(&self, index: u16) -> Result<&str> {
        match self.entries.get(&index) {
            Some(PoolEntry::Constant(Constant::String(s))) => Ok(s),
            _ => Err(Error::reference_error("string", index)),
        }
    }

    pub fn class(&self, index: u16) -> Result<&ClassId> {
        match self.entries.get(&index) {
            Some(PoolEntry::Constant(Constant::Class(c))) => Ok(c),
            _ => Err(Error::reference_error("class", index)),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<&NameAndType> {
        match self.entries.get(&index) {
            Some(PoolEntry::NameAndType(n)) => Ok(n),
            _ => Err(Error::reference_error("NameAndType", index)),
        }
    }

    pub fn field_ref(&self, index: u16) -> Result<&MemberRef> {
        match self.entries.get(&index) {
            Some(PoolEntry::FieldRef(r)) => Ok(r),
            _ => Err(Error::reference_error("field", index)),
        }
    }

    pub fn method_ref(&self, index: u16) -> Result<&MemberRef> {
        match self.entries.get(&index) {
            Some(PoolEntry::MethodRef(r)) => Ok(r),
            _ => Err(Error::reference_error("method", index)),
        }
    }

    pub fn interface_method_ref(&self, index: u16) -> Result<&MemberRef> {
        match self.entries.get(&index) {
            Some(PoolEntry::InterfaceMethodRef(r)) => Ok(r),
            _ => Err(Error::reference_error("interface method", index)),
        }
    }

    /// Every class entry, in index order
    pub fn classes(&self) -> impl Iterator<Item = &ClassId> {
        self.entries.values().filter_map(|e| match e {
            PoolEntry::Constant(Constant::Class(c)) => Some(c),
            _ => None,
        })
    }
}

/// Java's `Float.toString`/`Double.toString` layout: plain decimal with at
/// least one fractional digit inside [1e-3, 1e7), otherwise `d.dddEn`.
fn java_floating(value: f64, plain: String, scientific: String) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{}E{}", mantissa, exponent)
        } else {
            format!("{}.0E{}", mantissa, exponent)
        }
    }
}

/// Double-quote a string literal, escaping control characters
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
