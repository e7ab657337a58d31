//! Ring configuration, usually loaded from a json file.
//!
//! ```json
//! {
//!   "default_weight": 100,
//!   "hash": "murmur3",
//!   "nodes": [{ "id": "10.0.0.1:3001", "weight": 200 }, { "id": "10.0.0.2:3001" }]
//! }
//! ```
use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    hash::HashAlgorithm,
    ring::DEFAULT_WEIGHT,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RingConfig {
    #[serde(default = "default_weight")]
    pub default_weight: usize,
    #[serde(default)]
    pub hash: HashAlgorithm,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NodeConfig {
    pub id: String,
    /// Falls back to [`RingConfig::default_weight`] when absent
    pub weight: Option<usize>,
}

fn default_weight() -> usize {
    DEFAULT_WEIGHT
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            default_weight: DEFAULT_WEIGHT,
            hash: HashAlgorithm::default(),
            nodes: Vec::new(),
        }
    }
}

impl RingConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let stringified_json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&stringified_json)?)
    }

    /// Rejects configs that could never be turned into a ring
    pub fn validate(&self) -> Result<()> {
        if self.default_weight == 0 {
            return Err(Error::InvalidConfig {
                reason: "default_weight must be greater than 0".to_string(),
            });
        }

        let mut ids = HashSet::new();
        for node in self.nodes.iter() {
            if node.weight == Some(0) {
                return Err(Error::InvalidConfig {
                    reason: format!("node {} has weight 0", node.id),
                });
            }
            if !ids.insert(node.id.as_str()) {
                return Err(Error::InvalidConfig {
                    reason: format!("node {} is listed more than once", node.id),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{NodeConfig, RingConfig};
    use crate::{error::Error, hash::HashAlgorithm, ring::RingHash};

    fn conf_path(name: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("conf");
        path.push(name);
        path
    }

    #[test]
    fn deserialize_defaults() {
        let config = RingConfig::from_path(conf_path("ring.json")).unwrap();

        assert_eq!(config.default_weight, 1);
        assert_eq!(config.hash, HashAlgorithm::Crc32);
        assert_eq!(config.nodes.len(), 3);
        assert!(config.nodes.iter().all(|node| node.weight.is_none()));
    }

    #[test]
    fn deserialize_weighted() {
        let config = RingConfig::from_path(conf_path("weighted_murmur3.json")).unwrap();

        assert!(matches!(
            config,
            RingConfig {
                default_weight: 100,
                hash: HashAlgorithm::Murmur3,
                ..
            }
        ));
        assert!(matches!(
            config.nodes.as_slice(),
            [
                NodeConfig {
                    weight: Some(200),
                    ..
                },
                NodeConfig { weight: None, .. },
                NodeConfig {
                    weight: Some(50),
                    ..
                },
            ]
        ));

        let ring: RingHash = RingHash::from_config(&config).unwrap();
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.virtual_len(), 350);
        assert_eq!(ring.weight("10.0.0.2:3001"), Some(100));
    }

    #[test]
    fn missing_file() {
        let err = RingConfig::from_path(conf_path("does_not_exist.json"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn invalid_json() {
        let err: Error = serde_json::from_str::<RingConfig>(r#"{"hash": "md5"}"#)
            .err()
            .unwrap()
            .into();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn validate() {
        let mut config = RingConfig {
            default_weight: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { .. })
        ));

        config.default_weight = 10;
        config.nodes = vec![
            NodeConfig {
                id: "a".to_string(),
                weight: None,
            },
            NodeConfig {
                id: "a".to_string(),
                weight: Some(3),
            },
        ];
        assert!(config.validate().is_err());
        assert!(RingHash::<String>::from_config(&config).is_err());

        config.nodes.pop();
        assert!(config.validate().is_ok());
        let ring = RingHash::<String>::from_config(&config).unwrap();
        assert_eq!(ring.virtual_len(), 10);
    }
}
