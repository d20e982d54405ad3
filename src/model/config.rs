use serde::Deserialize;
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "DA_ENGINE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_VISION_BASE_URL: &str = "VISION_BASE_URL";
const DEFAULT_VISION_BASE_URL: &str = "http://127.0.0.1:8000/api";

const ENV_NARRATIVE_BASE_URL: &str = "NARRATIVE_BASE_URL";
const DEFAULT_NARRATIVE_BASE_URL: &str = "https://api.openai.com/v1";

const ENV_NARRATIVE_API_KEY: &str = "NARRATIVE_API_KEY";
const ENV_NARRATIVE_MODEL: &str = "NARRATIVE_MODEL";
const DEFAULT_NARRATIVE_MODEL: &str = "gpt-4o-mini";

const ENV_POLL_INTERVAL_MS: &str = "ANALYSIS_POLL_INTERVAL_MS";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

const ENV_POLL_MAX_WAIT_MS: &str = "ANALYSIS_POLL_MAX_WAIT_MS";
const DEFAULT_POLL_MAX_WAIT_MS: u64 = 5 * 60 * 1000;

const ENV_RETRIEVAL_TOP_N: &str = "RETRIEVAL_TOP_N";
const DEFAULT_RETRIEVAL_TOP_N: usize = 3;

/// One supplemental knowledge document from the YAML config file
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeDoc {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub disaster_type: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub knowledge: Vec<KnowledgeDoc>,
}

/// Polling behavior for asynchronous structured analysis jobs
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval_ms: u64,
    /// Hard cap on total wait; exceeding it forces a fallback-tier transition
    pub max_wait_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_wait_ms: DEFAULT_POLL_MAX_WAIT_MS,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub vision_base_url: String,
    pub narrative_base_url: String,
    pub narrative_api_key: Option<String>,
    pub narrative_model: String,
    pub poll: PollConfig,
    pub retrieval_top_n: usize,
    pub extra_knowledge: Vec<KnowledgeDoc>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            vision_base_url: DEFAULT_VISION_BASE_URL.to_string(),
            narrative_base_url: DEFAULT_NARRATIVE_BASE_URL.to_string(),
            narrative_api_key: None,
            narrative_model: DEFAULT_NARRATIVE_MODEL.to_string(),
            poll: PollConfig::default(),
            retrieval_top_n: DEFAULT_RETRIEVAL_TOP_N,
            extra_knowledge: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment and optional config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let vision_base_url = std::env::var(ENV_VISION_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_VISION_BASE_URL.to_string());

        let narrative_base_url = std::env::var(ENV_NARRATIVE_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_NARRATIVE_BASE_URL.to_string());

        let narrative_api_key = std::env::var(ENV_NARRATIVE_API_KEY).ok();

        let narrative_model = std::env::var(ENV_NARRATIVE_MODEL)
            .unwrap_or_else(|_| DEFAULT_NARRATIVE_MODEL.to_string());

        let poll = PollConfig {
            interval_ms: std::env::var(ENV_POLL_INTERVAL_MS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            max_wait_ms: std::env::var(ENV_POLL_MAX_WAIT_MS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_POLL_MAX_WAIT_MS),
        };

        let retrieval_top_n = std::env::var(ENV_RETRIEVAL_TOP_N)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRIEVAL_TOP_N);

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let extra_knowledge = Self::load_config_file(&config_path)
            .map(|cf| cf.knowledge)
            .unwrap_or_default();

        Self {
            host,
            port,
            vision_base_url,
            narrative_base_url,
            narrative_api_key,
            narrative_model,
            poll,
            retrieval_top_n,
            extra_knowledge,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
