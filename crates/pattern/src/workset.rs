use dataset::{DataSet, InitError};

use crate::cache::Resultset;
use crate::engine::Candidate;
use crate::types::{MatchCounters, MatchMethod, ValueError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeState {
    Unread,
    Absent,
    Present,
}

/// Mutable scratch state for one in-flight match.
///
/// A workset is sized once from its dataset (the input buffer holds exactly
/// `max_user_agent_length` bytes) and then reused request after request. Only
/// one caller holds a given workset at a time; see
/// [`WorksetPool`](crate::WorksetPool).
#[derive(Debug)]
pub struct Workset {
    pub(crate) input: String,
    max_input_len: usize,
    truncated: bool,
    profiles: Vec<usize>,
    values: Vec<usize>,
    signature: Option<usize>,
    method: MatchMethod,
    difference: u32,
    pub(crate) counters: MatchCounters,
    pub(crate) node_states: Vec<NodeState>,
    pub(crate) touched_nodes: Vec<usize>,
    pub(crate) candidates: Vec<Candidate>,
}

impl Workset {
    /// Allocate a workset for `dataset`. Every buffer is reserved up front.
    pub fn new(dataset: &DataSet) -> Result<Self, InitError> {
        let max_input_len = dataset.max_user_agent_length();
        let mut input = String::new();
        input
            .try_reserve_exact(max_input_len)
            .map_err(|_| InitError::InsufficientMemory {
                what: "workset input buffer",
                requested: max_input_len,
            })?;

        let node_count = dataset.nodes().len();
        let mut node_states = Vec::new();
        node_states
            .try_reserve_exact(node_count)
            .map_err(|_| InitError::InsufficientMemory {
                what: "workset node scratch",
                requested: node_count.saturating_mul(size_of::<NodeState>()),
            })?;
        node_states.resize(node_count, NodeState::Unread);

        Ok(Self {
            input,
            max_input_len,
            truncated: false,
            profiles: Vec::new(),
            values: Vec::new(),
            signature: None,
            method: MatchMethod::None,
            difference: 0,
            counters: MatchCounters::default(),
            node_states,
            touched_nodes: Vec::new(),
            candidates: Vec::new(),
        })
    }

    /// Copy `input` into the buffer, silently truncating it to the dataset's
    /// maximum length. Returns `true` when truncation happened.
    ///
    /// The cut lands on the nearest UTF-8 character boundary at or below the
    /// limit, so a multi-byte character is never split.
    pub fn set_input(&mut self, input: &str) -> bool {
        let end = floor_char_boundary(input, self.max_input_len);
        self.input.clear();
        self.input.push_str(&input[..end]);
        self.truncated = end < input.len();
        self.truncated
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn max_input_len(&self) -> usize {
        self.max_input_len
    }

    /// Whether the last [`set_input`](Self::set_input) cut the input short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Matched profile indexes, in signature order.
    pub fn profiles(&self) -> &[usize] {
        &self.profiles
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Value indexes resolved by the last [`set_values`](Self::set_values).
    pub fn values(&self) -> &[usize] {
        &self.values
    }

    /// Index of the winning signature, if any.
    pub fn signature(&self) -> Option<usize> {
        self.signature
    }

    pub fn method(&self) -> MatchMethod {
        self.method
    }

    pub fn difference(&self) -> u32 {
        self.difference
    }

    pub fn counters(&self) -> MatchCounters {
        self.counters
    }

    /// Resolve the values of the `required_index`-th required property
    /// against the current match. Returns the number of values found.
    pub fn set_values(
        &mut self,
        dataset: &DataSet,
        required_index: usize,
    ) -> Result<usize, ValueError> {
        self.values.clear();

        let property_index = *dataset
            .required_properties()
            .get(required_index)
            .ok_or(ValueError::UnknownProperty(required_index))?;
        let property = dataset
            .property(property_index)
            .ok_or(ValueError::UnknownProperty(required_index))?;

        let profile = self
            .profiles
            .iter()
            .filter_map(|&index| dataset.profile(index))
            .find(|profile| profile.component == property.component)
            .ok_or_else(|| ValueError::NoProfile {
                property: property.name.clone(),
                component: dataset
                    .component_name(property.component)
                    .unwrap_or_default()
                    .to_string(),
            })?;

        self.values.extend(profile.values.iter().copied().filter(|&value| {
            dataset
                .value(value)
                .is_some_and(|v| v.property == property_index)
        }));

        if self.values.is_empty() {
            return Err(ValueError::NoValues {
                property: property.name.clone(),
                profile_id: profile.id,
            });
        }
        Ok(self.values.len())
    }

    /// Clear match state ahead of a new match; the input buffer is kept.
    pub(crate) fn begin_match(&mut self, dataset: &DataSet) {
        for node in self.touched_nodes.drain(..) {
            self.node_states[node] = NodeState::Unread;
        }
        if self.node_states.len() != dataset.nodes().len() {
            self.node_states.clear();
            self.node_states.resize(dataset.nodes().len(), NodeState::Unread);
        }
        self.candidates.clear();
        self.profiles.clear();
        self.values.clear();
        self.signature = None;
        self.method = MatchMethod::None;
        self.difference = 0;
        self.counters = MatchCounters::default();
    }

    pub(crate) fn record(
        &mut self,
        dataset: &DataSet,
        signature: Option<usize>,
        method: MatchMethod,
        difference: u32,
    ) {
        self.signature = signature;
        self.method = method;
        self.difference = difference;
        self.profiles.clear();
        if let Some(record) = signature.and_then(|index| dataset.signature(index)) {
            self.profiles.extend_from_slice(&record.profiles);
        }
    }

    pub(crate) fn apply(&mut self, resultset: &Resultset) {
        self.profiles.clear();
        self.profiles.extend_from_slice(&resultset.profiles);
        self.signature = resultset.signature;
        self.method = resultset.method;
        self.difference = resultset.difference;
        self.counters = resultset.counters;
    }

    pub(crate) fn snapshot(&self) -> Resultset {
        Resultset {
            profiles: self.profiles.clone().into_boxed_slice(),
            signature: self.signature,
            method: self.method,
            difference: self.difference,
            counters: self.counters,
        }
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
