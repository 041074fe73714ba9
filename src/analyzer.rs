//! Drives the closure: tracker → classfile bytes → analysis → tracker

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::classfile::{ClassAnalysis, ClassId, FileKind, MemberKind};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::profile::ProfileLines;
use crate::tracker::{ClassProbe, ClassSink, DependencyTracker, DirectoryProbe};

/// Result of a finished run
#[derive(Debug)]
pub struct Report<P: ClassProbe> {
    pub profiles: ProfileLines,
    pub tracker: DependencyTracker<P>,
    /// Number of classfiles decoded
    pub analyzed: usize,
}

/// Analyzes every internal class reachable from the submitted roots
#[derive(Debug)]
pub struct Analyzer<P: ClassProbe> {
    tracker: DependencyTracker<P>,
    profiles: ProfileLines,
    follow_member_signatures: bool,
    analyzed: usize,
}

impl<P: ClassProbe> Analyzer<P> {
    pub fn new(probe: P) -> Self {
        Self {
            tracker: DependencyTracker::new(probe),
            profiles: ProfileLines::new(),
            follow_member_signatures: false,
            analyzed: 0,
        }
    }

    pub fn with_member_signatures(mut self, enabled: bool) -> Self {
        self.follow_member_signatures = enabled;
        self
    }

    pub fn submit(&mut self, id: &ClassId) {
        self.tracker.submit(id);
    }

    pub fn tracker(&self) -> &DependencyTracker<P> {
        &self.tracker
    }

    pub fn profiles(&self) -> &ProfileLines {
        &self.profiles
    }

    /// Drain the queue. `load` fetches the classfile bytes of an internal
    /// class; the first failure aborts the run with the class attached.
    pub fn run<F>(&mut self, mut load: F) -> Result<()>
    where
        F: FnMut(&ClassId) -> Result<Vec<u8>>,
    {
        while let Some(id) = self.tracker.next() {
            let bytes = load(&id).map_err(|e| e.in_class(&id))?;
            self.analyze_class(&id, &bytes).map_err(|e| e.in_class(&id))?;
        }
        info!(
            "analyzed {} classes: {} internal, {} external",
            self.analyzed,
            self.tracker.needed_classes().len(),
            self.tracker.external_classes().len()
        );
        Ok(())
    }

    /// Decode one classfile, feed what it references back into the
    /// tracker and add its profile lines
    pub fn analyze_class(&mut self, id: &ClassId, bytes: &[u8]) -> Result<()> {
        debug!("analyzing {}", id);
        let analysis = ClassAnalysis::parse(Some(id), bytes)?;
        for reference in analysis.runtime_class_references() {
            self.tracker.submit(&reference);
        }
        if let Some(signature) = analysis.signature() {
            self.tracker.submit_class_signature(signature)?;
        }
        if self.follow_member_signatures {
            for (kind, signature) in analysis.member_signatures() {
                match kind {
                    MemberKind::Field => self.tracker.submit_type_signature(signature)?,
                    MemberKind::Method => self.tracker.submit_method_signature(signature)?,
                }
            }
        }
        analysis.create_profiles(&mut self.profiles);
        self.analyzed += 1;
        Ok(())
    }

    pub fn finish(self) -> Report<P> {
        Report {
            profiles: self.profiles,
            tracker: self.tracker,
            analyzed: self.analyzed,
        }
    }
}

/// Run the closure described by `config` over classfiles on disk
pub fn analyze(config: &Config) -> Result<Report<DirectoryProbe>> {
    let mut analyzer =
        Analyzer::new(DirectoryProbe::new(&config.class_roots)).with_member_signatures(config.follow_member_signatures);
    for root in &config.roots {
        analyzer.submit(root);
    }
    if config.all_classes {
        for root in &config.class_roots {
            for id in discover_classes(root)? {
                analyzer.submit(&id);
            }
        }
    }

    let roots = config.class_roots.clone();
    analyzer.run(|id| read_classfile(id, &roots))?;
    Ok(analyzer.finish())
}

fn read_classfile(id: &ClassId, roots: &[PathBuf]) -> Result<Vec<u8>> {
    let path = id
        .find_file(FileKind::Binary, roots)
        .ok_or_else(|| Error::format_error(format!("no classfile for {}", id)))?;
    fs::read(&path).map_err(|e| Error::io_error(path, e))
}

/// Every class with a `.class` file under `root`, in sorted order
pub fn discover_classes(root: &Path) -> Result<Vec<ClassId>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::io_error(path, e.into())
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "class") {
            continue;
        }
        let Ok(relative) = path.with_extension("").strip_prefix(root).map(Path::to_path_buf) else {
            continue;
        };
        let name: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        found.push(ClassId::parse(&name.join("/"))?);
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_classes_lists_classfiles_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/C.class"), b"").unwrap();
        fs::write(dir.path().join("a/b/C$1.class"), b"").unwrap();
        fs::write(dir.path().join("Top.class"), b"").unwrap();
        fs::write(dir.path().join("a/notes.txt"), b"").unwrap();

        let names: Vec<String> = discover_classes(dir.path())
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(names, vec!["Top", "a/b/C", "a/b/C$1"]);
    }

    #[test]
    fn test_load_failure_names_the_class() {
        let id = ClassId::parse("p/A").unwrap();
        let mut analyzer = Analyzer::new(crate::tracker::SetProbe::new([id.clone()]));
        analyzer.submit(&id);
        let err = analyzer.run(|_| Ok(vec![0, 1, 2])).unwrap_err();
        match err {
            Error::Class { id: failed, source } => {
                assert_eq!(failed, id);
                assert!(matches!(*source, Error::Format { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
