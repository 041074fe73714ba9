//! Annotation element-value grammar (JVMS 4.7.16 - 4.7.20)
//!
//! Annotations are not kept structurally; they are rendered straight into
//! the canonical text used by profile lines:
//!
//! ```text
//! @Lp/Ann;(count=3,names=["a","b"],kind=Lp/Kind;.FAST,nested=@Lp/Inner;())
//! ```
//!
//! Element pairs are sorted so the text does not depend on the order the
//! compiler emitted them in.

use log::warn;

use super::constant_pool::{quote, ConstantPool};
use super::defs::target_types::*;
use super::reader::ByteReader;
use crate::consts::ANNOTATION_MAX_DEPTH;
use crate::error::{Error, Result};

/// Read one `element_value` and render it
pub fn read_element_value(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<String> {
    element_value(reader, pool, 0)
}

/// Read one `annotation` structure and render it as `@Type(k=v,...)`
pub fn read_annotation(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<String> {
    annotation(reader, pool, 0)
}

fn element_value(reader: &mut ByteReader<'_>, pool: &ConstantPool, depth: usize) -> Result<String> {
    if depth > ANNOTATION_MAX_DEPTH {
        return Err(Error::format_error("annotation values nested too deeply"));
    }
    let tag = reader.read_u1()? as char;
    match tag {
        'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' => Ok(pool.constant(reader.read_u2()?)?.render()),
        'c' => Ok(pool.text(reader.read_u2()?)?.to_string()),
        's' => Ok(quote(pool.text(reader.read_u2()?)?)),
        'e' => {
            let type_name = pool.text(reader.read_u2()?)?;
            let const_name = pool.text(reader.read_u2()?)?;
            Ok(format!("{}.{}", type_name, const_name))
        }
        '@' => annotation(reader, pool, depth + 1),
        '[' => {
            let count = reader.read_u2()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(element_value(reader, pool, depth + 1)?);
            }
            Ok(format!("[{}]", values.join(",")))
        }
        other => Err(Error::format_error(format!("Annotation value not recognized: {}", other))),
    }
}

fn annotation(reader: &mut ByteReader<'_>, pool: &ConstantPool, depth: usize) -> Result<String> {
    let type_name = pool.text(reader.read_u2()?)?.to_string();
    let pair_count = reader.read_u2()?;
    let mut pairs = Vec::with_capacity(pair_count as usize);
    for _ in 0..pair_count {
        let name = pool.text(reader.read_u2()?)?.to_string();
        let value = element_value(reader, pool, depth)?;
        pairs.push(format!("{}={}", name, value));
    }
    pairs.sort();
    Ok(format!("@{}({})", type_name, pairs.join(",")))
}

/// Read one `type_annotation`.
///
/// The rendering is prefixed by where the annotation attaches (`tvar[0]`,
/// `super[1]`, `fparam[2]`, ...) and by its type path. Annotations on
/// local variables, resource variables, catch parameters and expressions
/// inside code are parsed to stay aligned and then dropped (`None`).
pub fn read_type_annotation(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<Option<String>> {
    let mut prefix = String::new();
    let mut discard = false;

    let target_type = reader.read_u1()?;
    match target_type {
        CLASS_TYPE_PARAMETER | METHOD_TYPE_PARAMETER => {
            prefix.push_str(&format!("tvar[{}]", reader.read_u1()?));
        }
        CLASS_EXTENDS => {
            prefix.push_str(&format!("super[{}]", reader.read_u2()?));
        }
        CLASS_TYPE_PARAMETER_BOUND | METHOD_TYPE_PARAMETER_BOUND => {
            let param = reader.read_u1()?;
            let bound = reader.read_u1()?;
            prefix.push_str(&format!("tvar[{}.{}]", param, bound));
        }
        FIELD | METHOD_RETURN | METHOD_RECEIVER => prefix.push_str("result"),
        METHOD_FORMAL_PARAMETER => {
            prefix.push_str(&format!("fparam[{}]", reader.read_u1()?));
        }
        THROWS => {
            prefix.push_str(&format!("throws[{}]", reader.read_u2()?));
        }
        LOCAL_VARIABLE | RESOURCE_VARIABLE => {
            discard = true;
            let table_length = reader.read_u2()? as usize;
            reader.skip(6 * table_length)?;
        }
        EXCEPTION_PARAMETER..=METHOD_REFERENCE => {
            discard = true;
            reader.skip(2)?;
        }
        CAST..=METHOD_REFERENCE_TYPE_ARGUMENT => {
            discard = true;
            reader.skip(3)?;
        }
        other => {
            warn!("unknown annotation target type {:#04x}", other);
        }
    }

    let path_length = reader.read_u1()?;
    for _ in 0..path_length {
        let kind = reader.read_u1()?;
        let argument = reader.read_u1()?;
        prefix.push_str(&format!("/{}[{}]", kind, argument));
    }

    let rendered = read_annotation(reader, pool)?;
    if discard {
        return Ok(None);
    }
    Ok(Some(format!("{}{}", prefix, rendered)))
}
