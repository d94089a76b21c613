//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use uamatch::{Provider, ProviderConfig};

/// Path of the sample data file shipped with the repository.
pub fn sample_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample.json"))
}

pub fn sample_config(required_properties: &str) -> ProviderConfig {
    ProviderConfig::new(sample_path(), required_properties)
}

pub fn sample_provider(required_properties: &str) -> Provider {
    Provider::new(&sample_config(required_properties)).expect("sample data file opens")
}
