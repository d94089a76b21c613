//! Common utilities for uamatch benchmarks
//!
//! Builds a synthetic dataset of arbitrary size and the user-agent workloads
//! run against it: known devices, unique (cache-busting) variants of known
//! devices, and random noise that matches nothing.

#![allow(dead_code)]

use std::sync::Arc;

use dataset::{DataFile, DataSet, Profile, Property, SUPPORTED_VERSION, Signature, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uamatch::{Provider, ProviderConfig};

pub const SEED: u64 = 0x5eed_cafe;

/// A data file with `devices` signatures, each made of three nodes and
/// pointing at one hardware and one browser profile.
pub fn synthetic_data_file(devices: usize) -> DataFile {
    let mut values = vec![
        Value { property: 0, name: "True".into() },
        Value { property: 0, name: "False".into() },
    ];
    let mut profiles = Vec::with_capacity(devices * 2);
    let mut nodes = Vec::with_capacity(devices * 3);
    let mut signatures = Vec::with_capacity(devices);

    for i in 0..devices {
        let model = values.len();
        values.push(Value { property: 1, name: format!("Model {i}") });
        let browser = values.len();
        values.push(Value { property: 2, name: format!("Browser {i}") });

        let hardware_profile = profiles.len();
        profiles.push(Profile {
            id: 1_000 + i as u32,
            component: 0,
            values: vec![i % 2, model],
        });
        profiles.push(Profile {
            id: 1_000_000 + i as u32,
            component: 1,
            values: vec![browser],
        });

        let first_node = nodes.len();
        nodes.push(format!("Vendor{i}/"));
        nodes.push(format!("Model-{i};"));
        nodes.push(format!("Browser/{i}."));
        signatures.push(Signature {
            nodes: vec![first_node, first_node + 1, first_node + 2],
            profiles: vec![hardware_profile, hardware_profile + 1],
            rank: i as u32,
        });
    }

    DataFile {
        version: SUPPORTED_VERSION.to_string(),
        name: Some(format!("Synthetic-{devices}")),
        published: None,
        max_user_agent_length: 512,
        components: vec!["HardwarePlatform".into(), "BrowserUA".into()],
        properties: vec![
            property("IsMobile", 0),
            property("HardwareModel", 0),
            property("BrowserName", 1),
        ],
        values,
        profiles,
        nodes,
        signatures,
    }
}

fn property(name: &str, component: usize) -> Property {
    Property {
        name: name.into(),
        component,
        description: None,
    }
}

pub fn synthetic_dataset(devices: usize) -> Arc<DataSet> {
    let dataset = DataSet::from_data_file(synthetic_data_file(devices), "")
        .expect("synthetic data file is valid");
    Arc::new(dataset)
}

pub fn provider(dataset: &Arc<DataSet>, cache_size: usize, pool_size: usize) -> Provider {
    let config = ProviderConfig::new("", "")
        .with_cache_size(cache_size)
        .with_pool_size(pool_size);
    Provider::from_dataset(Arc::clone(dataset), &config).expect("provider")
}

/// User agents that match a random known device exactly.
pub fn known_user_agents(devices: usize, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..count)
        .map(|_| {
            let i = rng.random_range(0..devices);
            format!("Mozilla/5.0 (Vendor{i}/; Model-{i}; rv:1) Browser/{i}.0")
        })
        .collect()
}

/// Known devices with a random build suffix, so every input is distinct.
pub fn unique_user_agents(devices: usize, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(SEED ^ 1);
    (0..count)
        .map(|_| {
            let i = rng.random_range(0..devices);
            let build: u64 = rng.random();
            format!("Mozilla/5.0 (Vendor{i}/; Model-{i}; build {build:x}) Browser/{i}.0")
        })
        .collect()
}

/// Random printable noise of realistic length.
pub fn bad_user_agents(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(SEED ^ 2);
    (0..count)
        .map(|_| {
            let len = rng.random_range(40..160);
            (0..len)
                .map(|_| char::from(rng.random_range(b' '..=b'~')))
                .collect()
        })
        .collect()
}
