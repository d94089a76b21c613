//! Serialized shape of a device data file.
//!
//! A data file is a single JSON document. Every cross reference is a zero-based
//! index into one of the sibling tables, so the whole structure can be checked
//! once at load time and then used without further bounds checks.
//!
//! ```json
//! {
//!   "version": "3.2",
//!   "name": "Lite",
//!   "max_user_agent_length": 256,
//!   "components": ["HardwarePlatform", "SoftwarePlatform", "BrowserUA"],
//!   "properties": [{ "name": "IsMobile", "component": 0 }],
//!   "values": [{ "property": 0, "name": "True" }],
//!   "profiles": [{ "id": 12, "component": 0, "values": [0] }],
//!   "nodes": ["iPhone"],
//!   "signatures": [{ "nodes": [0], "profiles": [0], "rank": 1 }]
//! }
//! ```
use serde::{Deserialize, Serialize};

/// Data file format version understood by this build.
pub const SUPPORTED_VERSION: &str = "3.2";

/// Top-level data file document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataFile {
    /// Format version; must equal [`SUPPORTED_VERSION`].
    pub version: String,
    /// Optional human readable name, e.g. `"Lite"`.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional publication date as written by the data producer.
    #[serde(default)]
    pub published: Option<String>,
    /// Longest input, in bytes, the matcher will consider. Longer inputs are
    /// truncated before matching.
    pub max_user_agent_length: usize,
    /// Component names. Every property and profile belongs to one component.
    pub components: Vec<String>,
    pub properties: Vec<Property>,
    pub values: Vec<Value>,
    pub profiles: Vec<Profile>,
    /// Substring patterns signatures are built from.
    pub nodes: Vec<String>,
    pub signatures: Vec<Signature>,
}

/// A resolvable device property such as `IsMobile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    /// Index into [`DataFile::components`].
    pub component: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One possible value of a property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Value {
    /// Index into [`DataFile::properties`].
    pub property: usize,
    pub name: String,
}

/// A cluster of values for one component, identified by a numeric id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: u32,
    /// Index into [`DataFile::components`].
    pub component: usize,
    /// Indexes into [`DataFile::values`], in resolution order.
    pub values: Vec<usize>,
}

/// An ordered list of nodes that, when present in an input, identifies a set
/// of profiles (at most one per component).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signature {
    /// Indexes into [`DataFile::nodes`]. The first entry is the root node.
    pub nodes: Vec<usize>,
    /// Indexes into [`DataFile::profiles`], in output order.
    pub profiles: Vec<usize>,
    /// Popularity rank, lower is more common.
    pub rank: u32,
}
