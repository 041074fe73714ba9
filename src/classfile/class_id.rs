//! Immutable identities of class, interface and array types

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\[+)L(.*);|(\[+)([ZCSIJBFD])|([^\[].*))$").expect("class id pattern")
});

static ANONYMOUS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[0-9]+$").expect("anonymous class pattern"));

static SEGMENT_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[./]").expect("separator pattern"));

/// Which file a class maps onto under a root directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Binary,
}

impl FileKind {
    pub fn suffix(self) -> &'static str {
        match self {
            FileKind::Source => ".java",
            FileKind::Binary => ".class",
        }
    }
}

/// Identifies a class type: plain classes and interfaces, arrays of them,
/// and arrays of primitives. Primitives themselves have no identity.
///
/// Equality, hashing and ordering use the internal name (`a/b/C$D`,
/// `[[La/B;`, `[I`).
#[derive(Debug, Clone)]
pub struct ClassId {
    parts: Vec<String>,
    text: String,
    depth: usize,
    primitive: bool,
    anonymous: bool,
}

impl ClassId {
    /// Parse a class identifier. Accepted forms:
    ///
    /// * `java/lang/String` (dots are accepted as separators too)
    /// * `[[Ljava/lang/String;` with one `[` per dimension
    /// * `[B` and other primitive element characters
    pub fn parse(text: &str) -> Result<ClassId> {
        let caps = ID_PATTERN
            .captures(text)
            .ok_or_else(|| Error::format_error(format!("Not class: {}", text)))?;
        if let Some(name) = caps.get(5) {
            return Ok(Self::object(0, split_segments(name.as_str())));
        }
        if let (Some(dims), Some(prim)) = (caps.get(3), caps.get(4)) {
            let element = prim.as_str().chars().next().unwrap_or('I');
            return Ok(Self::primitive_array(dims.as_str().len(), element));
        }
        match (caps.get(1), caps.get(2)) {
            (Some(dims), Some(name)) => Ok(Self::object(dims.as_str().len(), split_segments(name.as_str()))),
            _ => Err(Error::format_error(format!("Not class: {}", text))),
        }
    }

    fn object(depth: usize, parts: Vec<String>) -> ClassId {
        let anonymous = parts
            .last()
            .map(|leaf| ANONYMOUS_PATTERN.is_match(leaf))
            .unwrap_or(false);
        let mut text = String::new();
        if depth > 0 {
            text.push_str(&"[".repeat(depth));
            text.push('L');
        }
        text.push_str(&parts.join("/"));
        if depth > 0 {
            text.push(';');
        }
        ClassId { parts, text, depth, primitive: false, anonymous }
    }

    fn primitive_array(depth: usize, element: char) -> ClassId {
        let mut text = "[".repeat(depth);
        text.push(element);
        ClassId {
            parts: vec![element.to_string()],
            text,
            depth,
            primitive: true,
            anonymous: false,
        }
    }

    /// Number of array dimensions
    pub fn array_dimensions(&self) -> usize {
        self.depth
    }

    pub fn is_array(&self) -> bool {
        self.depth > 0
    }

    /// Whether the innermost element type is primitive
    pub fn base_is_primitive(&self) -> bool {
        self.primitive
    }

    /// Nested class whose simple name is a number, e.g. `a/B$1`
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Name segments; for primitive arrays, the element character
    pub fn segments(&self) -> &[String] {
        &self.parts
    }

    /// The non-array identity, or `None` for arrays of primitives
    pub fn base_type(&self) -> Option<ClassId> {
        if self.depth == 0 {
            return Some(self.clone());
        }
        if self.primitive {
            return None;
        }
        Some(Self::object(0, self.parts.clone()))
    }

    /// The innermost element of an array of objects; `None` otherwise
    pub fn primary_element_type(&self) -> Option<ClassId> {
        if self.depth == 0 || self.primitive {
            return None;
        }
        Some(Self::object(0, self.parts.clone()))
    }

    /// The type with one fewer dimension; `None` for non-arrays and for
    /// one-dimensional primitive arrays
    pub fn element_type(&self) -> Option<ClassId> {
        if self.depth == 0 {
            return None;
        }
        if self.primitive {
            if self.depth == 1 {
                return None;
            }
            return Some(Self::primitive_array(self.depth - 1, self.primitive_element()));
        }
        Some(Self::object(self.depth - 1, self.parts.clone()))
    }

    /// An array type with `extra` more dimensions
    pub fn array_type(&self, extra: usize) -> ClassId {
        if extra == 0 {
            return self.clone();
        }
        if self.primitive {
            return Self::primitive_array(self.depth + extra, self.primitive_element());
        }
        Self::object(self.depth + extra, self.parts.clone())
    }

    fn primitive_element(&self) -> char {
        self.parts
            .first()
            .and_then(|p| p.chars().next())
            .unwrap_or('I')
    }

    /// The top-level class whose source defines this class
    pub fn source_top_level(&self) -> ClassId {
        if self.primitive {
            return self.clone();
        }
        let Some(leaf) = self.parts.last() else {
            return self.clone();
        };
        match leaf.find('$') {
            None => self.clone(),
            Some(dollar) => {
                let mut parts = self.parts.clone();
                let last = parts.len() - 1;
                parts[last] = leaf[..dollar].to_string();
                Self::object(0, parts)
            }
        }
    }

    /// External name, with dots in place of slashes
    pub fn external_name(&self) -> String {
        self.text.replace('/', ".")
    }

    /// The dot-separated package, or `None` for the unnamed package
    pub fn package_name(&self) -> Option<String> {
        if self.parts.len() < 2 {
            return None;
        }
        Some(self.parts[..self.parts.len() - 1].join("."))
    }

    /// File holding this class under `root`. This makes no attempt to
    /// correct for nested classes; use [`ClassId::source_top_level`] first
    /// for source files. `None` for array types.
    pub fn to_file_name(&self, kind: FileKind, root: &Path) -> Option<PathBuf> {
        if self.is_array() || self.primitive {
            return None;
        }
        let mut path = root.to_path_buf();
        let last = self.parts.len() - 1;
        for (i, part) in self.parts.iter().enumerate() {
            if i == last {
                path.push(format!("{}{}", part, kind.suffix()));
            } else {
                path.push(part);
            }
        }
        Some(path)
    }

    /// First existing file for this class across several roots
    pub fn find_file<P: AsRef<Path>>(&self, kind: FileKind, roots: &[P]) -> Option<PathBuf> {
        roots
            .iter()
            .filter_map(|root| self.to_file_name(kind, root.as_ref()))
            .find(|candidate| candidate.exists())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn split_segments(name: &str) -> Vec<String> {
    SEGMENT_SEPARATOR.split(name).map(str::to_string).collect()
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for ClassId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ClassId::parse(s)
    }
}

impl PartialEq for ClassId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for ClassId {}

impl Hash for ClassId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for ClassId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}
