//! Small hand-written dataset shared by tests, benches and demos.
//!
//! Three components, nine properties and four signatures: an iPhone on iOS 7,
//! a Galaxy S4 on Android 4.4 with Chrome 33, a Windows 10 desktop with Edge 18
//! (which carries no `IsCrawler` value), and Googlebot (a browser profile only).
use crate::{DataFile, DataSet, Profile, Property, SUPPORTED_VERSION, Signature, Value};

pub const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 7_0 like Mac OS X) AppleWebKit/537.51.1 (KHTML, like Gecko) Version/7.0 Mobile/11A465 Safari/9537.53";
pub const GALAXY_UA: &str = "Mozilla/5.0 (Linux; Android 4.4.2; GT-I9505 Build/KOT49H) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/33.0.1750.136 Mobile Safari/537.36";
pub const EDGE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3538.102 Safari/537.36 Edge/18.18363";
pub const GOOGLEBOT_UA: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
/// Shares the iPhone root node but not the OS version node.
pub const IPHONE_OS8_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 8_0 like Mac OS X) AppleWebKit/600.1.4 (KHTML, like Gecko) Version/8.0 Mobile/12A365 Safari/600.1.4";
/// Every Edge node is present, in the wrong order.
pub const SHUFFLED_EDGE_UA: &str = "Edge/18 (Windows NT 10.0)";
pub const UNKNOWN_UA: &str = "curl/7.64.1";

const COMPONENTS: [&str; 3] = ["HardwarePlatform", "SoftwarePlatform", "BrowserUA"];

const PROPERTIES: [(&str, usize); 9] = [
    ("IsMobile", 0),
    ("HardwareVendor", 0),
    ("HardwareModel", 0),
    ("CcppAccept", 0),
    ("PlatformName", 1),
    ("PlatformVersion", 1),
    ("BrowserName", 2),
    ("BrowserVersion", 2),
    ("IsCrawler", 2),
];

const VALUES: [(usize, &str); 27] = [
    (0, "True"),
    (0, "False"),
    (1, "Apple"),
    (1, "Samsung"),
    (1, "Unknown"),
    (2, "iPhone"),
    (2, "Galaxy S4"),
    (2, "Unknown"),
    (3, "text/html"),
    (3, "application/xhtml+xml"),
    (3, "image/png"),
    (4, "iOS"),
    (4, "Android"),
    (4, "Windows"),
    (5, "7.0"),
    (5, "4.4"),
    (5, "10"),
    (6, "Mobile Safari"),
    (6, "Chrome"),
    (6, "Edge"),
    (6, "Googlebot"),
    (7, "7.0"),
    (7, "33"),
    (7, "18"),
    (7, "2.1"),
    (8, "False"),
    (8, "True"),
];

const NODES: [&str; 9] = [
    "iPhone",
    "CPU iPhone OS 7",
    "Mobile/",
    "Android 4.4",
    "GT-I9505",
    "Chrome/33",
    "Windows NT 10.0",
    "Edge/18",
    "Googlebot/",
];

/// The sample data file, ready to serialize or to tweak in a test.
pub fn sample_data_file() -> DataFile {
    DataFile {
        version: SUPPORTED_VERSION.to_string(),
        name: Some("Sample".to_string()),
        published: Some("2014-06-01".to_string()),
        max_user_agent_length: 256,
        components: COMPONENTS.iter().map(|c| c.to_string()).collect(),
        properties: PROPERTIES
            .iter()
            .map(|&(name, component)| Property {
                name: name.to_string(),
                component,
                description: None,
            })
            .collect(),
        values: VALUES
            .iter()
            .map(|&(property, name)| Value {
                property,
                name: name.to_string(),
            })
            .collect(),
        profiles: vec![
            profile(12, 0, &[0, 2, 5, 8, 9, 10]),
            profile(15, 0, &[0, 3, 6, 8]),
            profile(17, 0, &[1, 4, 7, 8, 9]),
            profile(34, 1, &[11, 14]),
            profile(38, 1, &[12, 15]),
            profile(41, 1, &[13, 16]),
            profile(56, 2, &[17, 21, 25]),
            profile(60, 2, &[18, 22, 25]),
            profile(64, 2, &[19, 23]),
            profile(7, 2, &[20, 24, 26]),
        ],
        nodes: NODES.iter().map(|n| n.to_string()).collect(),
        signatures: vec![
            signature(&[0, 1, 2], &[0, 3, 6], 1),
            signature(&[3, 4, 5], &[1, 4, 7], 2),
            signature(&[6, 7], &[2, 5, 8], 3),
            signature(&[8], &[9], 4),
        ],
    }
}

/// The sample dataset with the given required property list.
pub fn sample_dataset(required_properties: &str) -> DataSet {
    match DataSet::from_data_file(sample_data_file(), required_properties) {
        Ok(dataset) => dataset,
        Err(err) => panic!("sample data file is invalid: {err}"),
    }
}

fn profile(id: u32, component: usize, values: &[usize]) -> Profile {
    Profile {
        id,
        component,
        values: values.to_vec(),
    }
}

fn signature(nodes: &[usize], profiles: &[usize], rank: u32) -> Signature {
    Signature {
        nodes: nodes.to_vec(),
        profiles: profiles.to_vec(),
        rank,
    }
}
