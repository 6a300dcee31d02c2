use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of a market configuration (BLAKE3 over canonical JSON).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic run ID (config + seed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub config_hash: ConfigHash,
    pub seed: u64,
}

impl RunId {
    pub fn new(config_hash: ConfigHash, seed: u64) -> Self {
        Self { config_hash, seed }
    }

    /// Stable short hash of the pair, suitable for artifact file names.
    pub fn hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.config_hash.0.as_bytes());
        hasher.update(&self.seed.to_le_bytes());
        let hex = hasher.finalize().to_hex();
        hex.as_str()[..16].to_string()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.config_hash, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_hash_deterministic() {
        let a = RunId::new(ConfigHash::from_bytes(b"cfg"), 42);
        let b = RunId::new(ConfigHash::from_bytes(b"cfg"), 42);
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash().len(), 16);
    }

    #[test]
    fn different_seed_different_hash() {
        let a = RunId::new(ConfigHash::from_bytes(b"cfg"), 42);
        let b = RunId::new(ConfigHash::from_bytes(b"cfg"), 43);
        assert_ne!(a.hash(), b.hash());
    }
}
