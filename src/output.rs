//! Text reports written after a run
//!
//! Every report is one entry per line, sorted and without duplicates.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::analyzer::Report;
use crate::classfile::{ClassId, FileKind};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::tracker::{ClassProbe, DependencyTracker};

/// Internal classfiles as paths relative to the class root
pub fn class_list<P: ClassProbe>(tracker: &DependencyTracker<P>) -> Vec<String> {
    let mut lines: Vec<String> = tracker
        .needed_classes()
        .iter()
        .filter_map(|id| id.to_file_name(FileKind::Binary, Path::new("")))
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    lines.sort();
    lines
}

/// Top-level sources of internal classes that exist under a source root
pub fn found_sources<P: ClassProbe>(tracker: &DependencyTracker<P>, source_roots: &[PathBuf]) -> Vec<(ClassId, PathBuf)> {
    tracker
        .source_classes()
        .into_iter()
        .filter_map(|id| {
            let path = id.find_file(FileKind::Source, source_roots)?;
            Some((id, path))
        })
        .collect()
}

/// External names of the sources that were found
pub fn source_list<P: ClassProbe>(tracker: &DependencyTracker<P>, source_roots: &[PathBuf]) -> Vec<String> {
    let mut lines: Vec<String> = found_sources(tracker, source_roots)
        .iter()
        .map(|(id, _)| id.external_name())
        .collect();
    lines.sort();
    lines
}

/// Make fragment adding every found source to `srclist-<tree>`. Paths are
/// relative to whichever source root holds the file.
pub fn deps_lines<P: ClassProbe>(tracker: &DependencyTracker<P>, tree: &str, source_roots: &[PathBuf]) -> Vec<String> {
    let mut lines: Vec<String> = found_sources(tracker, source_roots)
        .iter()
        .filter_map(|(id, _)| id.to_file_name(FileKind::Source, Path::new("")))
        .map(|path| format!("srclist-{} += {}", tree, path.display()))
        .collect();
    lines.sort();
    lines
}

/// Write one entry per line
pub fn write_lines<I, S>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io_error(parent, e))?;
    }
    let mut file = fs::File::create(path).map_err(|e| Error::io_error(path, e))?;
    file.write_all(text.as_bytes()).map_err(|e| Error::io_error(path, e))?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Write every report `config` asks for
pub fn write_reports<P: ClassProbe>(config: &Config, report: &Report<P>) -> Result<()> {
    let tracker = &report.tracker;
    if let Some(path) = &config.api_file {
        write_lines(path, &report.profiles.public)?;
    }
    if let Some(path) = &config.ppi_file {
        write_lines(path, &report.profiles.package)?;
    }
    if let Some(path) = &config.list_file {
        write_lines(path, class_list(tracker))?;
    }
    if let Some(path) = &config.deps_file {
        write_lines(path, deps_lines(tracker, &config.tree, &config.source_roots))?;
    }
    if let Some(path) = &config.srclist_file {
        write_lines(path, source_list(tracker, &config.source_roots))?;
    }
    if let Some(path) = &config.imports_file {
        write_lines(path, tracker.imported_packages())?;
    }
    if let Some(path) = &config.exports_file {
        write_lines(path, tracker.provided_packages())?;
    }
    Ok(())
}
