//! Detection results and their assembly from a matched workset.
use dataset::DataSet;
use pattern::{MatchCounters, MatchMethod, PooledWorkset, ValueError};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::PropertyFailurePolicy;

/// Resolved value of one required property.
///
/// A single `"True"`/`"False"` value becomes a boolean, any other single value
/// stays a string, and several values are kept as a list in resolution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Str(String),
    List(Vec<String>),
}

impl PropertyValue {
    /// Coerce one raw value name. Case-sensitive.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "True" => PropertyValue::Bool(true),
            "False" => PropertyValue::Bool(false),
            other => PropertyValue::Str(other.to_string()),
        }
    }

    /// Build from the raw value names of one property.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut names: Vec<&str> = names.into_iter().collect();
        if names.len() == 1 {
            return Self::coerce(names.remove(0));
        }
        PropertyValue::List(names.into_iter().map(str::to_string).collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

/// Diagnostic metadata of one match, serialized as `__meta__`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMeta {
    pub difference: u32,
    #[serde(serialize_with = "serialize_method")]
    pub method: MatchMethod,
    pub rank: u32,
    pub root_nodes_evaluated: u32,
    pub nodes_evaluated: u32,
    pub strings_read: u32,
    pub signatures_read: u32,
    pub signatures_compared: u32,
    pub closest_signatures: u32,
}

impl MatchMeta {
    pub fn new(method: MatchMethod, difference: u32, rank: u32, counters: MatchCounters) -> Self {
        Self {
            difference,
            method,
            rank,
            root_nodes_evaluated: counters.root_nodes_evaluated,
            nodes_evaluated: counters.nodes_evaluated,
            strings_read: counters.strings_read,
            signatures_read: counters.signatures_read,
            signatures_compared: counters.signatures_compared,
            closest_signatures: counters.closest_signatures,
        }
    }
}

fn serialize_method<S: Serializer>(method: &MatchMethod, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(method.code())
}

/// Why a required property is missing from a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error(transparent)]
    Unresolved(ValueError),
    /// Not attempted because an earlier property failed under
    /// [`PropertyFailurePolicy::StopAtFirstFailure`].
    #[error("skipped after an earlier property failed")]
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFailure {
    pub property: String,
    pub reason: FailureReason,
}

/// Outcome of a successful detection.
///
/// Serializes to a JSON object holding `Id`, one entry per resolved property
/// in required order, and `__meta__`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    id: String,
    profile_ids: Vec<u32>,
    properties: Vec<(String, PropertyValue)>,
    meta: MatchMeta,
    failures: Vec<PropertyFailure>,
    input_truncated: bool,
}

impl MatchResult {
    /// Matched profile ids joined with `-`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn profile_ids(&self) -> &[u32] {
        &self.profile_ids
    }

    /// Resolved properties in required order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    pub fn meta(&self) -> &MatchMeta {
        &self.meta
    }

    pub fn method(&self) -> MatchMethod {
        self.meta.method
    }

    /// Required properties that could not be resolved, in required order.
    pub fn failures(&self) -> &[PropertyFailure] {
        &self.failures
    }

    /// Whether every required property was resolved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether the input was cut to the dataset's maximum length first.
    pub fn input_truncated(&self) -> bool {
        self.input_truncated
    }
}

impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len() + 2))?;
        map.serialize_entry("Id", &self.id)?;
        for (name, value) in &self.properties {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("__meta__", &self.meta)?;
        map.end()
    }
}

/// Join profile ids with `-`, without a trailing separator.
///
/// ```
/// assert_eq!(uamatch::join_profile_ids(&[12, 34, 56]), "12-34-56");
/// assert_eq!(uamatch::join_profile_ids(&[7]), "7");
/// ```
pub fn join_profile_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join("-")
}

/// Build the result for a matched workset, or `None` when nothing matched.
pub(crate) fn assemble(
    workset: &mut PooledWorkset<'_>,
    dataset: &DataSet,
    policy: PropertyFailurePolicy,
) -> Option<MatchResult> {
    if workset.profiles().is_empty() {
        return None;
    }

    let profile_ids: Vec<u32> = workset
        .profiles()
        .iter()
        .filter_map(|&index| dataset.profile(index))
        .map(|profile| profile.id)
        .collect();
    let id = join_profile_ids(&profile_ids);

    let required = dataset.required_properties();
    let mut properties = Vec::with_capacity(required.len());
    let mut failures = Vec::new();
    for (required_index, &property) in required.iter().enumerate() {
        let name = dataset.property_name(property).unwrap_or_default();
        if policy == PropertyFailurePolicy::StopAtFirstFailure && !failures.is_empty() {
            failures.push(PropertyFailure {
                property: name.to_string(),
                reason: FailureReason::Skipped,
            });
            continue;
        }

        match workset.set_values(required_index) {
            Ok(_) => {
                let names = workset
                    .values()
                    .iter()
                    .filter_map(|&value| dataset.value_name(value));
                properties.push((name.to_string(), PropertyValue::from_names(names)));
            }
            Err(err) => {
                debug!(property = name, profile_id = %id, error = %err, "property_unresolved");
                failures.push(PropertyFailure {
                    property: name.to_string(),
                    reason: FailureReason::Unresolved(err),
                });
            }
        }
    }

    let meta = MatchMeta::new(
        workset.method(),
        workset.difference(),
        workset.signature_rank(),
        workset.counters(),
    );

    Some(MatchResult {
        id,
        profile_ids,
        properties,
        meta,
        failures,
        input_truncated: workset.is_truncated(),
    })
}
