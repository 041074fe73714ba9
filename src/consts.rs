// Global safety caps to prevent pathological or infinite loops

// Analysis: maximum number of enclosing classes followed when merging concealment
pub const ANALYSIS_MAX_CONTAINMENT_STEPS: usize = 1_024;

// Tracker: signature parser iteration cap for any repeated production
pub const TRACKER_MAX_SIGNATURE_ITERS: usize = 200_000;

// Tracker: nesting cap for type arguments and array signatures
pub const TRACKER_MAX_SIGNATURE_DEPTH: usize = 256;

// Annotation element values nest through '@' and '['
pub const ANNOTATION_MAX_DEPTH: usize = 256;

/// Primitive descriptor characters that may follow '[' in an array identity
pub const PRIMITIVE_DESCRIPTORS: &[char] = &['Z', 'C', 'S', 'I', 'J', 'B', 'F', 'D'];
