//! Settings for one analysis run

use std::path::{Path, PathBuf};

use crate::classfile::ClassId;

/// Everything one run needs: where classes and sources live, which classes
/// to start from, and which reports to write.
///
/// Report paths left as `None` are not written.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the source tree, used in the dependency fragment
    pub tree: String,

    /// Directories searched for `.java` files
    pub source_roots: Vec<PathBuf>,

    /// Build output directories; a class found here is internal
    pub class_roots: Vec<PathBuf>,

    /// Classes the closure starts from
    pub roots: Vec<ClassId>,

    /// Start from every classfile under the class roots as well
    pub all_classes: bool,

    /// Also follow field and method signatures, not just the constant pool
    /// and the class signature
    pub follow_member_signatures: bool,

    /// Public profile
    pub api_file: Option<PathBuf>,

    /// Package-private profile
    pub ppi_file: Option<PathBuf>,

    /// Internal classfiles, relative to the class root
    pub list_file: Option<PathBuf>,

    /// `srclist-<tree> += <source>` lines for make
    pub deps_file: Option<PathBuf>,

    /// External names of the sources that were found
    pub srclist_file: Option<PathBuf>,

    /// Packages the tree uses from elsewhere
    pub imports_file: Option<PathBuf>,

    /// Packages the tree provides
    pub exports_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree: "default".to_string(),
            source_roots: Vec::new(),
            class_roots: Vec::new(),
            roots: Vec::new(),
            all_classes: false,
            follow_member_signatures: false,
            api_file: None,
            ppi_file: None,
            list_file: None,
            deps_file: None,
            srclist_file: None,
            imports_file: None,
            exports_file: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(mut self, tree: impl Into<String>) -> Self {
        self.tree = tree.into();
        self
    }

    pub fn with_source_root(mut self, root: impl AsRef<Path>) -> Self {
        self.source_roots.push(root.as_ref().to_path_buf());
        self
    }

    pub fn with_class_root(mut self, root: impl AsRef<Path>) -> Self {
        self.class_roots.push(root.as_ref().to_path_buf());
        self
    }

    pub fn with_root(mut self, id: ClassId) -> Self {
        self.roots.push(id);
        self
    }

    pub fn with_all_classes(mut self, enabled: bool) -> Self {
        self.all_classes = enabled;
        self
    }

    pub fn with_member_signatures(mut self, enabled: bool) -> Self {
        self.follow_member_signatures = enabled;
        self
    }

    pub fn with_api_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.api_file = Some(path.into());
        self
    }

    pub fn with_ppi_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ppi_file = Some(path.into());
        self
    }

    pub fn with_list_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.list_file = Some(path.into());
        self
    }

    pub fn with_deps_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.deps_file = Some(path.into());
        self
    }

    pub fn with_srclist_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.srclist_file = Some(path.into());
        self
    }

    pub fn with_imports_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.imports_file = Some(path.into());
        self
    }

    pub fn with_exports_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.exports_file = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_write_nothing() {
        let config = Config::default();
        assert_eq!(config.tree, "default");
        assert!(!config.follow_member_signatures);
        assert!(config.api_file.is_none() && config.deps_file.is_none());
    }

    #[test]
    fn test_builders_accumulate_roots() {
        let config = Config::new()
            .with_tree("core")
            .with_class_root("out/a")
            .with_class_root("out/b")
            .with_root(ClassId::parse("p/Main").unwrap())
            .with_api_file("core.api");
        assert_eq!(config.class_roots, vec![PathBuf::from("out/a"), PathBuf::from("out/b")]);
        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.api_file, Some(PathBuf::from("core.api")));
    }
}
