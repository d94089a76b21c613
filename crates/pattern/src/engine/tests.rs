use super::*;

use dataset::demo_utils::{
    self, EDGE_UA, GALAXY_UA, GOOGLEBOT_UA, IPHONE_OS8_UA, IPHONE_UA, SHUFFLED_EDGE_UA,
    UNKNOWN_UA,
};
use dataset::{DataFile, Signature};

use crate::types::ValueError;

fn profile_ids(dataset: &DataSet, workset: &Workset) -> Vec<u32> {
    workset
        .profiles()
        .iter()
        .map(|&index| dataset.profile(index).expect("profile").id)
        .collect()
}

fn run(dataset: &DataSet, cache: &ResultsetCache, input: &str) -> Workset {
    let mut workset = Workset::new(dataset).expect("workset");
    workset.set_input(input);
    match_workset(dataset, cache, &mut workset);
    workset
}

fn dataset_from(file: DataFile) -> DataSet {
    DataSet::from_data_file(file, "").expect("valid data file")
}

#[test]
fn exact_matches_resolve_every_component() {
    let dataset = demo_utils::sample_dataset("");
    let cache = ResultsetCache::disabled();

    let cases: [(&str, &[u32]); 4] = [
        (IPHONE_UA, &[12, 34, 56]),
        (GALAXY_UA, &[15, 38, 60]),
        (EDGE_UA, &[17, 41, 64]),
        (GOOGLEBOT_UA, &[7]),
    ];
    for (ua, expected) in cases {
        let ws = run(&dataset, &cache, ua);
        assert_eq!(ws.method(), MatchMethod::Exact, "{ua}");
        assert_eq!(ws.difference(), 0, "{ua}");
        assert_eq!(profile_ids(&dataset, &ws), expected, "{ua}");
    }
}

#[test]
fn exact_match_counters() {
    let dataset = demo_utils::sample_dataset("");
    let ws = run(&dataset, &ResultsetCache::disabled(), IPHONE_UA);

    assert_eq!(
        ws.counters(),
        MatchCounters {
            root_nodes_evaluated: 4,
            nodes_evaluated: 6,
            strings_read: 6,
            signatures_read: 1,
            signatures_compared: 0,
            closest_signatures: 0,
        }
    );
}

#[test]
fn partial_match_is_closest_with_difference() {
    let dataset = demo_utils::sample_dataset("");
    let ws = run(&dataset, &ResultsetCache::disabled(), IPHONE_OS8_UA);

    assert_eq!(ws.method(), MatchMethod::Closest);
    // "CPU iPhone OS 7" (15 chars) is the only node missing.
    assert_eq!(ws.difference(), 15);
    assert_eq!(profile_ids(&dataset, &ws), vec![12, 34, 56]);
    let counters = ws.counters();
    assert_eq!(counters.signatures_read, 1);
    assert_eq!(counters.signatures_compared, 1);
    assert_eq!(counters.closest_signatures, 1);
}

#[test]
fn out_of_order_nodes_are_nearest() {
    let dataset = demo_utils::sample_dataset("");
    let ws = run(&dataset, &ResultsetCache::disabled(), SHUFFLED_EDGE_UA);

    assert_eq!(ws.method(), MatchMethod::Nearest);
    // "Edge/18" precedes "Windows NT 10.0", so only the root counts in order.
    assert_eq!(ws.difference(), 7);
    assert_eq!(profile_ids(&dataset, &ws), vec![17, 41, 64]);
}

#[test]
fn unknown_input_matches_nothing() {
    let dataset = demo_utils::sample_dataset("");
    let ws = run(&dataset, &ResultsetCache::disabled(), UNKNOWN_UA);

    assert_eq!(ws.method(), MatchMethod::None);
    assert!(ws.profiles().is_empty());
    assert_eq!(ws.signature(), None);
    let counters = ws.counters();
    assert_eq!(counters.root_nodes_evaluated, 4);
    assert_eq!(counters.signatures_read, 0);
    assert_eq!(signature_rank(&dataset, &ws), 4);
}

#[test]
fn empty_input_matches_nothing() {
    let dataset = demo_utils::sample_dataset("");
    let ws = run(&dataset, &ResultsetCache::disabled(), "");
    assert_eq!(ws.method(), MatchMethod::None);
    assert!(ws.profiles().is_empty());
}

#[test]
fn rank_comes_from_the_matched_signature() {
    let dataset = demo_utils::sample_dataset("");
    let cache = ResultsetCache::disabled();
    assert_eq!(signature_rank(&dataset, &run(&dataset, &cache, IPHONE_UA)), 1);
    assert_eq!(signature_rank(&dataset, &run(&dataset, &cache, GOOGLEBOT_UA)), 4);
}

#[test]
fn longest_exact_signature_wins() {
    let mut file = demo_utils::sample_data_file();
    // "Android 4.4" alone also matches the Galaxy input exactly.
    file.signatures.push(Signature {
        nodes: vec![3],
        profiles: vec![2],
        rank: 0,
    });
    let dataset = dataset_from(file);
    let ws = run(&dataset, &ResultsetCache::disabled(), GALAXY_UA);

    assert_eq!(ws.method(), MatchMethod::Exact);
    assert_eq!(ws.signature(), Some(1));
    assert_eq!(ws.counters().signatures_read, 2);
}

#[test]
fn equal_length_exact_signatures_prefer_lower_rank() {
    let mut file = demo_utils::sample_data_file();
    file.signatures.push(Signature {
        nodes: vec![3, 4, 5],
        profiles: vec![1],
        rank: 0,
    });
    let dataset = dataset_from(file);
    let ws = run(&dataset, &ResultsetCache::disabled(), GALAXY_UA);

    assert_eq!(ws.signature(), Some(4));
    assert_eq!(profile_ids(&dataset, &ws), vec![15]);
    assert_eq!(signature_rank(&dataset, &ws), 0);
}

#[test]
fn shared_nodes_are_read_once() {
    let mut file = demo_utils::sample_data_file();
    // A second iPhone signature reusing "Mobile/" without the OS node.
    file.signatures.push(Signature {
        nodes: vec![0, 2],
        profiles: vec![0],
        rank: 9,
    });
    let dataset = dataset_from(file);
    let ws = run(&dataset, &ResultsetCache::disabled(), IPHONE_UA);

    let counters = ws.counters();
    assert_eq!(counters.signatures_read, 2);
    // 4 roots + 2 nodes for the first signature + 1 memoized lookup.
    assert_eq!(counters.nodes_evaluated, 7);
    assert_eq!(counters.strings_read, 6);
    // Both are exact; the longer one wins.
    assert_eq!(ws.signature(), Some(0));
}

#[test]
fn reused_workset_starts_clean() {
    let dataset = demo_utils::sample_dataset("");
    let cache = ResultsetCache::disabled();
    let mut ws = Workset::new(&dataset).expect("workset");

    ws.set_input(IPHONE_UA);
    match_workset(&dataset, &cache, &mut ws);
    assert_eq!(ws.method(), MatchMethod::Exact);

    ws.set_input(UNKNOWN_UA);
    match_workset(&dataset, &cache, &mut ws);
    assert_eq!(ws.method(), MatchMethod::None);
    assert!(ws.profiles().is_empty());
    assert_eq!(ws.counters().strings_read, 4);
}

#[test]
fn cache_hit_replays_outcome_and_counters() {
    let dataset = demo_utils::sample_dataset("");
    let cache = ResultsetCache::new(16);

    let first = run(&dataset, &cache, IPHONE_OS8_UA);
    let second = run(&dataset, &cache, IPHONE_OS8_UA);

    assert_eq!(first.method(), second.method());
    assert_eq!(first.difference(), second.difference());
    assert_eq!(first.profiles(), second.profiles());
    assert_eq!(first.counters(), second.counters());
    assert_eq!(first.signature(), second.signature());

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));
}

#[test]
fn no_match_outcomes_are_cached_too() {
    let dataset = demo_utils::sample_dataset("");
    let cache = ResultsetCache::new(16);

    run(&dataset, &cache, UNKNOWN_UA);
    let ws = run(&dataset, &cache, UNKNOWN_UA);
    assert_eq!(ws.method(), MatchMethod::None);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn values_follow_the_matched_profile() {
    let dataset = demo_utils::sample_dataset("IsMobile,CcppAccept,PlatformName");
    let mut ws = run(&dataset, &ResultsetCache::disabled(), IPHONE_UA);

    assert_eq!(ws.set_values(&dataset, 0), Ok(1));
    assert_eq!(dataset.value_name(ws.values()[0]), Some("True"));

    assert_eq!(ws.set_values(&dataset, 1), Ok(3));
    let accept: Vec<_> = ws
        .values()
        .iter()
        .filter_map(|&v| dataset.value_name(v))
        .collect();
    assert_eq!(accept, ["text/html", "application/xhtml+xml", "image/png"]);

    assert_eq!(ws.set_values(&dataset, 2), Ok(1));
    assert_eq!(dataset.value_name(ws.values()[0]), Some("iOS"));
}

#[test]
fn missing_value_and_component_are_reported() {
    let dataset = demo_utils::sample_dataset("IsCrawler,IsMobile");
    let cache = ResultsetCache::disabled();

    let mut edge = run(&dataset, &cache, EDGE_UA);
    assert_eq!(
        edge.set_values(&dataset, 0),
        Err(ValueError::NoValues {
            property: "IsCrawler".into(),
            profile_id: 64,
        })
    );

    let mut bot = run(&dataset, &cache, GOOGLEBOT_UA);
    assert_eq!(
        bot.set_values(&dataset, 1),
        Err(ValueError::NoProfile {
            property: "IsMobile".into(),
            component: "HardwarePlatform".into(),
        })
    );
}
