//! Deciding whether a class belongs to the tree being analyzed

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::classfile::{ClassId, FileKind};

/// Answers whether a class exists as build output of the current tree
pub trait ClassProbe {
    fn contains(&self, id: &ClassId) -> bool;

    /// Where the classfile for `id` lives, when the probe knows
    fn locate(&self, _id: &ClassId) -> Option<PathBuf> {
        None
    }
}

/// Looks for `.class` files under one or more output directories
#[derive(Debug, Clone, Default)]
pub struct DirectoryProbe {
    roots: Vec<PathBuf>,
}

impl DirectoryProbe {
    pub fn new<P: AsRef<Path>>(roots: &[P]) -> Self {
        Self { roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect() }
    }

    /// Build a probe from a path list such as `out/main:out/gen`
    pub fn from_path_list(list: &str) -> Self {
        Self::new(&parse_path_list(list))
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ClassProbe for DirectoryProbe {
    fn contains(&self, id: &ClassId) -> bool {
        self.locate(id).is_some()
    }

    fn locate(&self, id: &ClassId) -> Option<PathBuf> {
        id.find_file(FileKind::Binary, &self.roots)
    }
}

/// A fixed set of known classes
#[derive(Debug, Clone, Default)]
pub struct SetProbe {
    known: HashSet<ClassId>,
}

impl SetProbe {
    pub fn new<I: IntoIterator<Item = ClassId>>(known: I) -> Self {
        Self { known: known.into_iter().collect() }
    }
}

impl ClassProbe for SetProbe {
    fn contains(&self, id: &ClassId) -> bool {
        self.known.contains(id)
    }
}

/// Split a path list on the platform separator (`:` on Unix, `;` on Windows)
pub fn parse_path_list(list: &str) -> Vec<PathBuf> {
    let separator = if cfg!(windows) { ';' } else { ':' };
    list.split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}
