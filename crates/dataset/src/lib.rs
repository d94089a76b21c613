//! Device reference dataset
//!
//! The dataset is the immutable half of device detection: property and value
//! names, profiles, the node strings signatures are made of, and the limits
//! every match request is held to. It is built once at startup and then shared
//! read-only (usually behind an `Arc`) by every workset that matches against it.
//!
//! ## What we do here
//!
//! - **Load** a JSON data file from disk, a reader or a byte slice.
//! - **Validate** every cross reference once, so lookups afterwards are plain
//!   slice indexing.
//! - **Fix the output shape** by resolving the caller's required property list
//!   into an ordered list of property indexes.
//! - **Report failures** through the closed [`InitError`] enum.
//!
//! ## Example
//!
//! ```
//! use dataset::{demo_utils, DataSet};
//!
//! let dataset = DataSet::from_data_file(demo_utils::sample_data_file(), "IsMobile,BrowserName")
//!     .expect("sample data is valid");
//!
//! let names: Vec<&str> = dataset.required_property_names().collect();
//! assert_eq!(names, ["IsMobile", "BrowserName"]);
//! assert_eq!(dataset.max_user_agent_length(), 256);
//! ```
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

mod error;
mod loader;
mod model;

#[doc(hidden)]
pub mod demo_utils;

pub use crate::error::InitError;
pub use crate::loader::{RESERVED_PROPERTY_NAMES, split_property_list};
pub use crate::model::{DataFile, Profile, Property, SUPPORTED_VERSION, Signature, Value};

use crate::loader::MEMORY_SOURCE;

/// Immutable, validated reference data for device detection.
#[derive(Debug)]
pub struct DataSet {
    source: PathBuf,
    version: String,
    name: Option<String>,
    published: Option<String>,
    max_user_agent_length: usize,
    components: Vec<String>,
    properties: Vec<Property>,
    values: Vec<Value>,
    profiles: Vec<Profile>,
    nodes: Vec<String>,
    signatures: Vec<Signature>,
    property_index: HashMap<String, usize>,
    required: Vec<usize>,
    root_nodes: Vec<usize>,
    root_flags: Vec<bool>,
}

impl DataSet {
    /// Load a data file from disk.
    ///
    /// `required_properties` is a comma separated list of property names; an
    /// empty list selects every property in the file.
    pub fn from_file(
        path: impl AsRef<Path>,
        required_properties: &str,
    ) -> Result<Self, InitError> {
        let path = path.as_ref();
        let start = Instant::now();
        let result = loader::read_file(path)
            .and_then(|bytes| loader::parse(&bytes, path))
            .map(|file| Self::build(file, path.to_path_buf(), required_properties));

        let elapsed_micros = start.elapsed().as_micros();
        match &result {
            Ok(dataset) => info!(
                path = %path.display(),
                name = dataset.name().unwrap_or("unnamed"),
                properties = dataset.properties.len(),
                required = dataset.required.len(),
                signatures = dataset.signatures.len(),
                elapsed_micros,
                "dataset_loaded"
            ),
            Err(err) => warn!(
                path = %path.display(),
                error = %err,
                elapsed_micros,
                "dataset_load_failure"
            ),
        }
        result
    }

    /// Load a data file from any reader.
    pub fn from_reader<R: Read>(
        mut reader: R,
        required_properties: &str,
    ) -> Result<Self, InitError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|err| InitError::corrupt(MEMORY_SOURCE, format!("read failed: {err}")))?;
        Self::from_slice(&bytes, required_properties)
    }

    /// Load a data file already held in memory.
    pub fn from_slice(bytes: &[u8], required_properties: &str) -> Result<Self, InitError> {
        let source = PathBuf::from(MEMORY_SOURCE);
        let file = loader::parse(bytes, &source)?;
        Ok(Self::build(file, source, required_properties))
    }

    /// Build a dataset from an already deserialized [`DataFile`].
    pub fn from_data_file(file: DataFile, required_properties: &str) -> Result<Self, InitError> {
        let source = PathBuf::from(MEMORY_SOURCE);
        if file.version != SUPPORTED_VERSION {
            return Err(InitError::IncorrectVersion {
                path: source,
                found: file.version,
                expected: SUPPORTED_VERSION,
            });
        }
        loader::validate(&file).map_err(|reason| InitError::corrupt(MEMORY_SOURCE, reason))?;
        Ok(Self::build(file, source, required_properties))
    }

    /// `file` must already be validated.
    fn build(file: DataFile, source: PathBuf, required_properties: &str) -> Self {
        let property_index: HashMap<String, usize> = file
            .properties
            .iter()
            .enumerate()
            .map(|(index, property)| (property.name.clone(), index))
            .collect();
        let required =
            loader::resolve_required(required_properties, &file.properties, &property_index);

        let mut root_flags = vec![false; file.nodes.len()];
        for signature in &file.signatures {
            root_flags[signature.nodes[0]] = true;
        }
        let root_nodes = root_flags
            .iter()
            .enumerate()
            .filter_map(|(index, &root)| root.then_some(index))
            .collect();

        Self {
            source,
            version: file.version,
            name: file.name,
            published: file.published,
            max_user_agent_length: file.max_user_agent_length,
            components: file.components,
            properties: file.properties,
            values: file.values,
            profiles: file.profiles,
            nodes: file.nodes,
            signatures: file.signatures,
            property_index,
            required,
            root_nodes,
            root_flags,
        }
    }

    /// Path the dataset was read from, or `<memory>`.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn published(&self) -> Option<&str> {
        self.published.as_deref()
    }

    /// Longest input, in bytes, considered by the matcher.
    pub fn max_user_agent_length(&self) -> usize {
        self.max_user_agent_length
    }

    pub fn component_name(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(String::as_str)
    }

    pub fn property(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    pub fn property_name(&self, index: usize) -> Option<&str> {
        self.properties.get(index).map(|p| p.name.as_str())
    }

    /// Index of the property called `name`, if the file defines one.
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.property_index.get(name).copied()
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn value_name(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(|v| v.name.as_str())
    }

    pub fn profile(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn signature(&self, index: usize) -> Option<&Signature> {
        self.signatures.get(index)
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn node(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(String::as_str)
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Nodes that start at least one signature, ascending.
    pub fn root_nodes(&self) -> &[usize] {
        &self.root_nodes
    }

    pub fn is_root_node(&self, index: usize) -> bool {
        self.root_flags.get(index).copied().unwrap_or(false)
    }

    /// Required property indexes, in output order.
    pub fn required_properties(&self) -> &[usize] {
        &self.required
    }

    pub fn required_property_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.required
            .iter()
            .map(|&index| self.properties[index].name.as_str())
    }

    /// Every property the file defines, in file order.
    pub fn available_properties(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.iter().map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    fn sample_bytes() -> Vec<u8> {
        serde_json::to_vec(&demo_utils::sample_data_file()).expect("serialize sample")
    }

    #[test]
    fn loads_sample_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&sample_bytes()).expect("write sample");

        let dataset = DataSet::from_file(file.path(), "IsMobile").expect("load sample");
        assert_eq!(dataset.source(), file.path());
        assert_eq!(dataset.version(), SUPPORTED_VERSION);
        assert_eq!(dataset.name(), Some("Sample"));
        assert_eq!(dataset.required_properties(), &[0]);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.json");

        let err = DataSet::from_file(&path, "").expect_err("missing file");
        match err {
            InitError::FileNotFound { path: reported, source } => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_path_is_not_set() {
        let err = DataSet::from_file("", "").expect_err("empty path");
        assert!(matches!(err, InitError::NotSet { .. }));
    }

    #[test]
    fn garbage_is_corrupt() {
        let err = DataSet::from_slice(b"\x00\x01 definitely not json", "").expect_err("garbage");
        assert!(matches!(err, InitError::CorruptData { .. }));
    }

    #[test]
    fn version_is_checked_before_schema() {
        let bytes = serde_json::to_vec(&json!({ "version": "3.1", "unrelated": true })).unwrap();
        let err = DataSet::from_slice(&bytes, "").expect_err("old version");
        match err {
            InitError::IncorrectVersion { found, expected, .. } => {
                assert_eq!(found, "3.1");
                assert_eq!(expected, SUPPORTED_VERSION);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_version_is_corrupt() {
        let bytes = serde_json::to_vec(&json!({ "name": "Lite" })).unwrap();
        let err = DataSet::from_slice(&bytes, "").expect_err("no version");
        assert!(matches!(
            err,
            InitError::CorruptData { ref reason, .. } if reason.contains("version")
        ));
    }

    #[test]
    fn dangling_references_are_corrupt() {
        let mut file = demo_utils::sample_data_file();
        file.signatures[0].nodes.push(99);
        let err = DataSet::from_data_file(file, "").expect_err("dangling node");
        assert!(matches!(
            err,
            InitError::CorruptData { ref reason, .. } if reason.contains("node 99")
        ));

        let mut file = demo_utils::sample_data_file();
        file.profiles[0].values.push(500);
        let err = DataSet::from_data_file(file, "").expect_err("dangling value");
        assert!(matches!(err, InitError::CorruptData { .. }));
    }

    #[test]
    fn cross_component_values_are_corrupt() {
        let mut file = demo_utils::sample_data_file();
        let browser_value = file
            .values
            .iter()
            .position(|v| v.name == "Chrome")
            .expect("sample has Chrome");
        file.profiles[0].values.push(browser_value);
        let err = DataSet::from_data_file(file, "").expect_err("cross component value");
        assert!(matches!(
            err,
            InitError::CorruptData { ref reason, .. } if reason.contains("another component")
        ));
    }

    #[test]
    fn zero_length_limit_is_corrupt() {
        let mut file = demo_utils::sample_data_file();
        file.max_user_agent_length = 0;
        assert!(matches!(
            DataSet::from_data_file(file, ""),
            Err(InitError::CorruptData { .. })
        ));
    }

    #[test]
    fn empty_required_list_selects_every_property() {
        let dataset = demo_utils::sample_dataset("");
        let all: Vec<&str> = dataset.available_properties().collect();
        let required: Vec<&str> = dataset.required_property_names().collect();
        assert_eq!(required, all);
    }

    #[test]
    fn required_list_keeps_caller_order_and_skips_unknown() {
        let dataset =
            demo_utils::sample_dataset("BrowserName, NoSuchProperty ,IsMobile,BrowserName");
        let required: Vec<&str> = dataset.required_property_names().collect();
        assert_eq!(required, ["BrowserName", "IsMobile"]);
    }

    #[test]
    fn output_key_names_are_never_required() {
        let mut file = demo_utils::sample_data_file();
        let browser = file
            .properties
            .iter()
            .position(|p| p.name == "BrowserName")
            .expect("sample has BrowserName");
        file.properties[browser].name = RESERVED_PROPERTY_NAMES[0].into();
        let platform = file
            .properties
            .iter()
            .position(|p| p.name == "PlatformName")
            .expect("sample has PlatformName");
        file.properties[platform].name = RESERVED_PROPERTY_NAMES[1].into();

        let listed = DataSet::from_data_file(file.clone(), "Id,IsMobile,__meta__").expect("load");
        let required: Vec<&str> = listed.required_property_names().collect();
        assert_eq!(required, ["IsMobile"]);

        let all = DataSet::from_data_file(file, "").expect("load");
        let required: Vec<&str> = all.required_property_names().collect();
        assert_eq!(required.len(), all.available_properties().count() - 2);
        assert!(required.iter().all(|name| !RESERVED_PROPERTY_NAMES.contains(name)));
    }

    #[test]
    fn root_nodes_are_first_signature_nodes() {
        let dataset = demo_utils::sample_dataset("");
        for signature in dataset.signatures() {
            assert!(dataset.is_root_node(signature.nodes[0]));
        }
        let roots = dataset.root_nodes();
        assert!(roots.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(!dataset.is_root_node(usize::MAX));
    }

    #[test]
    fn lookups_by_index() {
        let dataset = demo_utils::sample_dataset("");
        let index = dataset.property_index("IsMobile").expect("IsMobile defined");
        assert_eq!(dataset.property_name(index), Some("IsMobile"));
        let component = dataset.property(index).expect("property").component;
        assert_eq!(dataset.component_name(component), Some("HardwarePlatform"));
        assert_eq!(dataset.value_name(0), Some("True"));
        assert!(dataset.value_name(10_000).is_none());
        assert!(dataset.property_index("Missing").is_none());
    }
}
