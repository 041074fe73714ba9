//! Worklist closure over class references

use std::collections::{BTreeSet, VecDeque};

use log::trace;

use super::probe::ClassProbe;
use super::sink::ClassSink;
use crate::classfile::ClassId;

/// Classifies every submitted class as internal (found by the probe) or
/// external, and queues internal ones for analysis.
///
/// A class is classified once; later submissions of it are ignored, so
/// reference cycles terminate.
#[derive(Debug)]
pub struct DependencyTracker<P: ClassProbe> {
    probe: P,
    outstanding: VecDeque<ClassId>,
    internal: BTreeSet<ClassId>,
    external: BTreeSet<ClassId>,
}

impl<P: ClassProbe> DependencyTracker<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            outstanding: VecDeque::new(),
            internal: BTreeSet::new(),
            external: BTreeSet::new(),
        }
    }

    /// A tracker with `roots` already submitted
    pub fn with_roots<'a, I>(probe: P, roots: I) -> Self
    where
        I: IntoIterator<Item = &'a ClassId>,
    {
        let mut tracker = Self::new(probe);
        for root in roots {
            tracker.submit(root);
        }
        tracker
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn has_next(&self) -> bool {
        !self.outstanding.is_empty()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Internal classes: everything the tree itself provides
    pub fn needed_classes(&self) -> &BTreeSet<ClassId> {
        &self.internal
    }

    pub fn external_classes(&self) -> &BTreeSet<ClassId> {
        &self.external
    }

    /// Top-level classes whose sources define the internal classes
    pub fn source_classes(&self) -> BTreeSet<ClassId> {
        self.internal.iter().map(ClassId::source_top_level).collect()
    }

    /// Packages of external classes; the unnamed package is left out
    pub fn imported_packages(&self) -> BTreeSet<String> {
        self.external.iter().filter_map(ClassId::package_name).collect()
    }

    /// Packages of internal classes; the unnamed package is left out
    pub fn provided_packages(&self) -> BTreeSet<String> {
        self.internal.iter().filter_map(ClassId::package_name).collect()
    }
}

impl<P: ClassProbe> ClassSink for DependencyTracker<P> {
    fn submit(&mut self, id: &ClassId) {
        let Some(base) = id.base_type() else {
            return;
        };
        if self.external.contains(&base) || self.internal.contains(&base) {
            return;
        }
        if self.probe.contains(&base) {
            trace!("internal: {}", base);
            self.internal.insert(base.clone());
            self.outstanding.push_back(base);
        } else {
            trace!("external: {}", base);
            self.external.insert(base);
        }
    }
}

impl<P: ClassProbe> Iterator for DependencyTracker<P> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        self.outstanding.pop_front()
    }
}
