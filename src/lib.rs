//! Classfile dependency closure and API profiles (classdeps)
//!
//! Given compiled classes of one source tree, classdeps works out which
//! classes the tree provides, which it takes from elsewhere, and what its
//! public and package-private API looks like, so a build can tell when a
//! dependent tree really needs recompiling.
//!
//! ## Architecture
//!
//! - **classfile**: class identities, constant pool, members, annotations
//!   and whole-class analysis with profile lines
//! - **tracker**: worklist closure over class references, fed by the
//!   constant pool and by generic signatures
//! - **analyzer**: the driver loop tying the two together
//! - **output**: the text reports written after a run
//! - **bin**: command-line interface
//!
//! ## Flow
//!
//! ```text
//! roots → tracker → .class bytes → ClassAnalysis → references/signatures → tracker
//!                                        ↓
//!                                  profile lines → reports
//! ```

pub mod analyzer;
pub mod classfile;
pub mod config;
pub mod consts;
pub mod error;
pub mod output;
pub mod profile;
pub mod tracker;

pub use analyzer::{analyze, Analyzer, Report};
pub use classfile::{ClassAnalysis, ClassId, Visibility};
pub use config::Config;
pub use error::{Error, Result};
pub use profile::ProfileLines;
pub use tracker::{ClassProbe, ClassSink, DeferredClassSink, DependencyTracker, DirectoryProbe};

/// Analyze and write every report `config` asks for
pub fn run(config: &Config) -> Result<Report<DirectoryProbe>> {
    let report = analyze(config)?;
    output::write_reports(config, &report)?;
    Ok(report)
}

/// Profile of a set of classfiles, without following references
pub fn profile_classfiles<I, B>(classfiles: I) -> Result<ProfileLines>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut lines = ProfileLines::new();
    for bytes in classfiles {
        ClassAnalysis::parse(None, bytes.as_ref())?.create_profiles(&mut lines);
    }
    Ok(lines)
}
