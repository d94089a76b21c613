//! Signature matching.
//!
//! A match walks the dataset in two passes. Every root node is checked
//! against the input first; signatures whose root was found are then read and
//! their remaining nodes evaluated on demand, memoized per workset so a node
//! shared between signatures is only searched for once.
use dataset::DataSet;

use crate::cache::ResultsetCache;
use crate::types::{MatchCounters, MatchMethod};
use crate::workset::{NodeState, Workset};

#[cfg(test)]
mod tests;

/// Per-signature score kept while looking for the closest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    signature: usize,
    present_chars: usize,
    total_chars: usize,
}

struct Outcome {
    signature: Option<usize>,
    method: MatchMethod,
    difference: u32,
}

impl Outcome {
    const NONE: Outcome = Outcome {
        signature: None,
        method: MatchMethod::None,
        difference: 0,
    };
}

/// Borrowed view of the workset scratch used during one evaluation.
struct Evaluation<'w> {
    dataset: &'w DataSet,
    input: &'w str,
    states: &'w mut [NodeState],
    touched: &'w mut Vec<usize>,
    candidates: &'w mut Vec<Candidate>,
    counters: &'w mut MatchCounters,
}

impl Evaluation<'_> {
    fn node_present(&mut self, node: usize) -> bool {
        self.counters.nodes_evaluated += 1;
        match self.states[node] {
            NodeState::Present => true,
            NodeState::Absent => false,
            NodeState::Unread => {
                self.counters.strings_read += 1;
                let present = self.input.contains(self.dataset.nodes()[node].as_str());
                self.states[node] = if present {
                    NodeState::Present
                } else {
                    NodeState::Absent
                };
                self.touched.push(node);
                present
            }
        }
    }

    fn already_present(&self, node: usize) -> bool {
        self.states[node] == NodeState::Present
    }
}

/// Match the workset's current input against `dataset`, filling its matched
/// profiles, method, difference and counters.
///
/// The cache is consulted first and populated on a miss, so repeated inputs
/// replay the stored outcome (counters included) without any node search.
pub fn match_workset(
    dataset: &DataSet,
    cache: &ResultsetCache,
    workset: &mut Workset,
) -> MatchMethod {
    workset.begin_match(dataset);

    if let Some(hit) = cache.get(workset.input()) {
        workset.apply(&hit);
        return workset.method();
    }

    let outcome = {
        let mut eval = Evaluation {
            dataset,
            input: &workset.input,
            states: &mut workset.node_states,
            touched: &mut workset.touched_nodes,
            candidates: &mut workset.candidates,
            counters: &mut workset.counters,
        };
        evaluate(&mut eval)
    };
    workset.record(dataset, outcome.signature, outcome.method, outcome.difference);

    cache.insert(workset.input(), workset.snapshot());
    workset.method()
}

/// Rank of the matched signature, or the signature count when nothing matched.
pub fn signature_rank(dataset: &DataSet, workset: &Workset) -> u32 {
    workset
        .signature()
        .and_then(|index| dataset.signature(index))
        .map(|signature| signature.rank)
        .unwrap_or_else(|| u32::try_from(dataset.signatures().len()).unwrap_or(u32::MAX))
}

fn evaluate(eval: &mut Evaluation<'_>) -> Outcome {
    let dataset = eval.dataset;

    for &node in dataset.root_nodes() {
        eval.counters.root_nodes_evaluated += 1;
        eval.node_present(node);
    }

    eval.candidates.clear();
    let mut best_exact: Option<(usize, usize)> = None;
    for (index, signature) in dataset.signatures().iter().enumerate() {
        let root = signature.nodes[0];
        if !eval.already_present(root) {
            continue;
        }
        eval.counters.signatures_read += 1;

        let mut present_chars = dataset.nodes()[root].len();
        let mut total_chars = present_chars;
        for &node in &signature.nodes[1..] {
            let len = dataset.nodes()[node].len();
            total_chars += len;
            if eval.node_present(node) {
                present_chars += len;
            }
        }

        if present_chars == total_chars
            && ordered_chars(eval.input, dataset, &signature.nodes) == total_chars
        {
            let better = match best_exact {
                None => true,
                Some((current, current_chars)) => {
                    total_chars > current_chars
                        || (total_chars == current_chars
                            && signature.rank < dataset.signatures()[current].rank)
                }
            };
            if better {
                best_exact = Some((index, total_chars));
            }
        }

        eval.candidates.push(Candidate {
            signature: index,
            present_chars,
            total_chars,
        });
    }

    if let Some((signature, _)) = best_exact {
        return Outcome {
            signature: Some(signature),
            method: MatchMethod::Exact,
            difference: 0,
        };
    }

    let mut best: Option<Candidate> = None;
    for candidate in eval.candidates.iter() {
        eval.counters.signatures_compared += 1;
        let better = match best {
            None => true,
            Some(current) => {
                candidate.present_chars > current.present_chars
                    || (candidate.present_chars == current.present_chars
                        && dataset.signatures()[candidate.signature].rank
                            < dataset.signatures()[current.signature].rank)
            }
        };
        if better {
            best = Some(*candidate);
        }
    }
    let Some(best) = best else {
        return Outcome::NONE;
    };

    let tied = eval
        .candidates
        .iter()
        .filter(|candidate| candidate.present_chars == best.present_chars)
        .count();
    eval.counters.closest_signatures = u32::try_from(tied).unwrap_or(u32::MAX);

    let nodes = &dataset.signatures()[best.signature].nodes;
    let in_order = ordered_chars(eval.input, dataset, nodes);
    let method = if best.present_chars == best.total_chars {
        MatchMethod::Nearest
    } else {
        MatchMethod::Closest
    };
    Outcome {
        signature: Some(best.signature),
        method,
        difference: u32::try_from(best.total_chars - in_order).unwrap_or(u32::MAX),
    }
}

/// Characters of `nodes` found left to right in `input` without overlap.
fn ordered_chars(input: &str, dataset: &DataSet, nodes: &[usize]) -> usize {
    let mut position = 0;
    let mut matched = 0;
    for &node in nodes {
        let text = dataset.nodes()[node].as_str();
        if let Some(offset) = input[position..].find(text) {
            position += offset + text.len();
            matched += text.len();
        }
    }
    matched
}
