//! Dependency tracking: which classes a tree provides and which it needs

pub mod deferred;
pub mod probe;
pub mod signature;
pub mod sink;
#[allow(clippy::module_inception)]
pub mod tracker;

pub use deferred::DeferredClassSink;
pub use probe::{parse_path_list, ClassProbe, DirectoryProbe, SetProbe};
pub use sink::ClassSink;
pub use tracker::DependencyTracker;
