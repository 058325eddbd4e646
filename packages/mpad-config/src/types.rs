use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub notes: Notes,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Origins allowed by CORS. Empty disables cross-origin access.
	#[serde(default)]
	pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Upper bound (exclusive) on the L2 distance between a query and a note embedding.
	#[serde(default = "default_distance_threshold")]
	pub distance_threshold: f64,
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	#[serde(default = "default_max_limit")]
	pub max_limit: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			distance_threshold: default_distance_threshold(),
			default_limit: default_limit(),
			max_limit: default_max_limit(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Notes {
	#[serde(default = "default_max_title_chars")]
	pub max_title_chars: u32,
	#[serde(default = "default_max_body_bytes")]
	pub max_body_bytes: u32,
}
impl Default for Notes {
	fn default() -> Self {
		Self { max_title_chars: default_max_title_chars(), max_body_bytes: default_max_body_bytes() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	/// One of "off" or "static_keys".
	pub auth_mode: String,
	#[serde(default)]
	pub auth_keys: Vec<AuthKey>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthKey {
	pub token_id: String,
	pub token: String,
	pub user_id: String,
}

fn default_distance_threshold() -> f64 {
	0.8
}

fn default_limit() -> u32 {
	50
}

fn default_max_limit() -> u32 {
	200
}

fn default_max_title_chars() -> u32 {
	512
}

fn default_max_body_bytes() -> u32 {
	1_048_576
}
