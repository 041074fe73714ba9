//! Accumulators for the two API profiles of a tree

use std::collections::BTreeSet;

/// Profile lines gathered across every analyzed class.
///
/// `public` holds what other trees may compile against (public and
/// protected surface); `package` additionally holds package-private lines.
/// Both are sorted sets, so the order classes were analyzed in does not
/// show in the output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileLines {
    pub public: BTreeSet<String>,
    pub package: BTreeSet<String>,
}

impl ProfileLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line in the package profile, and in the public one too
    /// when `public_surface` is set
    pub fn add(&mut self, line: String, public_surface: bool) {
        if public_surface {
            self.public.insert(line.clone());
        }
        self.package.insert(line);
    }

    pub fn is_empty(&self) -> bool {
        self.package.is_empty() && self.public.is_empty()
    }

    /// Merge another accumulator into this one
    pub fn extend(&mut self, other: ProfileLines) {
        self.public.extend(other.public);
        self.package.extend(other.package);
    }
}
