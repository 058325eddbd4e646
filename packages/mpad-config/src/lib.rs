mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AuthKey, Config, EmbeddingProviderConfig, Notes, Postgres, Providers, Search, Security,
	Service, Storage,
};

use std::{collections::HashSet, fs, net::SocketAddr, path::Path};

pub const AUTH_MODE_OFF: &str = "off";
pub const AUTH_MODE_STATIC_KEYS: &str = "static_keys";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let bind: SocketAddr = cfg.service.http_bind.trim().parse().map_err(|_| Error::Validation {
		message: "service.http_bind must be a socket address, e.g. 127.0.0.1:8080.".to_string(),
	})?;

	if cfg.security.bind_localhost_only && !bind.ip().is_loopback() {
		return Err(Error::Validation {
			message: "service.http_bind must be a loopback address when security.bind_localhost_only is true."
				.to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.vector_dim.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if !cfg.search.distance_threshold.is_finite() {
		return Err(Error::Validation {
			message: "search.distance_threshold must be a finite number.".to_string(),
		});
	}
	if cfg.search.distance_threshold <= 0.0 {
		return Err(Error::Validation {
			message: "search.distance_threshold must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit == 0 {
		return Err(Error::Validation {
			message: "search.max_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 || cfg.search.default_limit > cfg.search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must be between 1 and search.max_limit.".to_string(),
		});
	}
	if cfg.notes.max_title_chars == 0 {
		return Err(Error::Validation {
			message: "notes.max_title_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.notes.max_body_bytes == 0 {
		return Err(Error::Validation {
			message: "notes.max_body_bytes must be greater than zero.".to_string(),
		});
	}

	validate_auth(cfg, &bind)
}

fn validate_auth(cfg: &Config, bind: &SocketAddr) -> Result<()> {
	match cfg.security.auth_mode.as_str() {
		AUTH_MODE_OFF =>
			if !bind.ip().is_loopback() {
				return Err(Error::Validation {
					message: "security.auth_mode = \"off\" requires a loopback service.http_bind."
						.to_string(),
				});
			},
		AUTH_MODE_STATIC_KEYS => {
			if cfg.security.auth_keys.is_empty() {
				return Err(Error::Validation {
					message: "security.auth_keys must be non-empty when security.auth_mode is static_keys."
						.to_string(),
				});
			}

			let mut seen = HashSet::new();

			for key in &cfg.security.auth_keys {
				for (label, value) in [
					("security.auth_keys.token_id", &key.token_id),
					("security.auth_keys.token", &key.token),
					("security.auth_keys.user_id", &key.user_id),
				] {
					if value.trim().is_empty() {
						return Err(Error::Validation {
							message: format!("{label} must be non-empty."),
						});
					}
				}

				if !seen.insert(key.token_id.as_str()) {
					return Err(Error::Validation {
						message: format!(
							"security.auth_keys.token_id {:?} is duplicated.",
							key.token_id
						),
					});
				}
			}
		},
		_ => {
			return Err(Error::Validation {
				message: "security.auth_mode must be one of off or static_keys.".to_string(),
			});
		},
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.security.auth_mode = cfg.security.auth_mode.trim().to_ascii_lowercase();

	cfg.service.cors_allowed_origins = cfg
		.service
		.cors_allowed_origins
		.iter()
		.map(|origin| origin.trim().trim_end_matches('/').to_string())
		.filter(|origin| !origin.is_empty())
		.collect();

	for key in &mut cfg.security.auth_keys {
		key.token_id = key.token_id.trim().to_string();
		key.user_id = key.user_id.trim().to_string();
	}
}
