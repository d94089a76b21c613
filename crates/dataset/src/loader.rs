use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::InitError;
use crate::model::{DataFile, Property, SUPPORTED_VERSION};

/// Keys every serialized match result already carries. Properties with
/// these names are never selected as required properties.
pub const RESERVED_PROPERTY_NAMES: [&str; 2] = ["Id", "__meta__"];

/// Source label used in errors for datasets that were not read from disk.
pub(crate) const MEMORY_SOURCE: &str = "<memory>";

/// Only the version is looked at before the full parse so that a file from a
/// newer producer reports `IncorrectVersion` rather than a schema mismatch.
#[derive(Deserialize)]
struct VersionProbe {
    version: Option<String>,
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, InitError> {
    if path.as_os_str().is_empty() {
        return Err(InitError::NotSet {
            reason: "no data file path configured".into(),
        });
    }

    let mut file = File::open(path).map_err(|source| InitError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let expected_len = file
        .metadata()
        .map(|meta| usize::try_from(meta.len()).unwrap_or(usize::MAX))
        .unwrap_or(0);
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(expected_len)
        .map_err(|_| InitError::InsufficientMemory {
            what: "data file buffer",
            requested: expected_len,
        })?;
    file.read_to_end(&mut bytes)
        .map_err(|err| InitError::corrupt(path, format!("read failed: {err}")))?;
    Ok(bytes)
}

/// Parse and structurally validate a data file.
pub(crate) fn parse(bytes: &[u8], source: &Path) -> Result<DataFile, InitError> {
    let probe: VersionProbe = serde_json::from_slice(bytes)
        .map_err(|err| InitError::corrupt(source, format!("not a data file: {err}")))?;
    match probe.version {
        Some(version) if version == SUPPORTED_VERSION => {}
        Some(found) => {
            return Err(InitError::IncorrectVersion {
                path: source.to_path_buf(),
                found,
                expected: SUPPORTED_VERSION,
            });
        }
        None => return Err(InitError::corrupt(source, "missing version field")),
    }

    let file: DataFile = serde_json::from_slice(bytes)
        .map_err(|err| InitError::corrupt(source, err.to_string()))?;
    validate(&file).map_err(|reason| InitError::corrupt(source, reason))?;
    Ok(file)
}

/// Check every cross reference in the file. Returns the first problem found.
pub(crate) fn validate(file: &DataFile) -> Result<(), String> {
    if file.version != SUPPORTED_VERSION {
        return Err(format!("unsupported version {}", file.version));
    }
    if file.max_user_agent_length == 0 {
        return Err("max_user_agent_length must be greater than zero".into());
    }

    let components = file.components.len();
    let mut names = HashSet::with_capacity(file.properties.len());
    for (index, property) in file.properties.iter().enumerate() {
        if property.component >= components {
            return Err(format!(
                "property {index} references component {} of {components}",
                property.component
            ));
        }
        if !names.insert(property.name.as_str()) {
            return Err(format!("duplicate property name `{}`", property.name));
        }
    }

    for (index, value) in file.values.iter().enumerate() {
        if value.property >= file.properties.len() {
            return Err(format!(
                "value {index} references property {} of {}",
                value.property,
                file.properties.len()
            ));
        }
    }

    let mut ids = HashSet::with_capacity(file.profiles.len());
    for (index, profile) in file.profiles.iter().enumerate() {
        if profile.component >= components {
            return Err(format!(
                "profile {index} references component {} of {components}",
                profile.component
            ));
        }
        if !ids.insert(profile.id) {
            return Err(format!("duplicate profile id {}", profile.id));
        }
        for &value in &profile.values {
            let Some(record) = file.values.get(value) else {
                return Err(format!(
                    "profile {} references value {value} of {}",
                    profile.id,
                    file.values.len()
                ));
            };
            // Bounds were checked above.
            let owner = file.properties[record.property].component;
            if owner != profile.component {
                return Err(format!(
                    "profile {} holds value {value} of a property from another component",
                    profile.id
                ));
            }
        }
    }

    if let Some(index) = file.nodes.iter().position(String::is_empty) {
        return Err(format!("node {index} is empty"));
    }

    for (index, signature) in file.signatures.iter().enumerate() {
        if signature.nodes.is_empty() {
            return Err(format!("signature {index} has no nodes"));
        }
        if let Some(&node) = signature.nodes.iter().find(|&&n| n >= file.nodes.len()) {
            return Err(format!(
                "signature {index} references node {node} of {}",
                file.nodes.len()
            ));
        }
        let mut seen_components = HashSet::with_capacity(signature.profiles.len());
        for &profile in &signature.profiles {
            let Some(record) = file.profiles.get(profile) else {
                return Err(format!(
                    "signature {index} references profile {profile} of {}",
                    file.profiles.len()
                ));
            };
            if !seen_components.insert(record.component) {
                return Err(format!(
                    "signature {index} holds two profiles for component {}",
                    record.component
                ));
            }
        }
    }

    Ok(())
}

/// Split a comma separated property list into trimmed, de-duplicated names.
///
/// ```rust
/// use dataset::split_property_list;
///
/// assert_eq!(
///     split_property_list(" IsMobile, BrowserName,,IsMobile "),
///     vec!["IsMobile", "BrowserName"]
/// );
/// ```
pub fn split_property_list(list: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .collect()
}

/// Resolve required property names to property indexes, in list order.
///
/// An empty list selects every property in file order. Names the file does not
/// define are skipped with a warning, and so are the reserved output keys.
pub(crate) fn resolve_required(
    list: &str,
    properties: &[Property],
    property_index: &HashMap<String, usize>,
) -> Vec<usize> {
    let names = split_property_list(list);
    if names.is_empty() {
        return properties
            .iter()
            .enumerate()
            .filter(|(_, property)| !is_reserved(&property.name))
            .map(|(index, _)| index)
            .collect();
    }

    names
        .into_iter()
        .filter(|name| !is_reserved(name))
        .filter_map(|name| match property_index.get(name) {
            Some(&index) => Some(index),
            None => {
                warn!(property = %name, "unknown_required_property");
                None
            }
        })
        .collect()
}

fn is_reserved(name: &str) -> bool {
    let reserved = RESERVED_PROPERTY_NAMES.contains(&name);
    if reserved {
        warn!(property = %name, "reserved_required_property");
    }
    reserved
}
