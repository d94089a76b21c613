use std::fmt;

use thiserror::Error;

/// How the matched profiles were arrived at.
///
/// The numeric codes are stable and are what callers see in result metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum MatchMethod {
    /// Nothing in the input resembled any signature.
    #[default]
    None = 0,
    /// Every node of the winning signature appears in the input, in order.
    Exact = 1,
    /// Every node appears, but not in signature order.
    Nearest = 3,
    /// Only some nodes appear; the best scoring signature was taken.
    Closest = 4,
}

impl MatchMethod {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchMethod::None => "none",
            MatchMethod::Exact => "exact",
            MatchMethod::Nearest => "nearest",
            MatchMethod::Closest => "closest",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic counters describing the work one match performed.
///
/// They are observability data only; nothing branches on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MatchCounters {
    /// Root nodes (first node of some signature) checked against the input.
    pub root_nodes_evaluated: u32,
    /// Node checks, memoized repeats included.
    pub nodes_evaluated: u32,
    /// Distinct node strings read from the dataset.
    pub strings_read: u32,
    /// Signatures whose root node was present and were therefore read.
    pub signatures_read: u32,
    /// Signatures scored against each other when no exact match existed.
    pub signatures_compared: u32,
    /// Signatures tied at the best closeness score.
    pub closest_signatures: u32,
}

/// Failure to resolve a required property against the current match.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The required property index does not exist in the dataset.
    #[error("required property {0} is out of range")]
    UnknownProperty(usize),
    /// No matched profile belongs to the property's component.
    #[error("no matched {component} profile to resolve `{property}`")]
    NoProfile { property: String, component: String },
    /// The matched profile carries no value for the property.
    #[error("profile {profile_id} has no value for `{property}`")]
    NoValues { property: String, profile_id: u32 },
}
