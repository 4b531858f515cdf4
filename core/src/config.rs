use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Fixed seed for operator selection. None draws from OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default = "default_max_load")]
    pub default_max_load: i64,
    #[serde(default = "default_weight")]
    pub default_weight: i64,
    #[serde(default = "default_page_limit")]
    pub page_limit: u64,
}

fn default_db_path() -> String {
    "leadflow.db".into()
}

fn default_busy_timeout_ms() -> u64 {
    crate::store::DEFAULT_BUSY_TIMEOUT_MS
}

fn default_max_load() -> i64 {
    10
}

fn default_weight() -> i64 {
    1
}

fn default_page_limit() -> u64 {
    100
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            rng_seed: None,
            default_max_load: default_max_load(),
            default_weight: default_weight(),
            page_limit: default_page_limit(),
        }
    }
}

impl CrmConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: CrmConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// In-memory database and a pinned seed, for tests.
    pub fn default_test(seed: u64) -> Self {
        Self {
            db_path: ":memory:".into(),
            rng_seed: Some(seed),
            ..Self::default()
        }
    }
}
