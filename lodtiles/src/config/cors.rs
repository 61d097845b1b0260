//! Which browser origins may fetch tiles cross-origin.
//!
//! The map client usually lives on a different origin than the tile server, so every
//! origin is allowed unless this section says otherwise.
//!
//! ```yaml
//! cors:
//!   allowed_origins:
//!     - "https://maps.example.org"
//!     - "*.example.net"
//!   max_age_seconds: 86400
//! ```

use serde::Deserialize;

pub const DEFAULT_MAX_AGE_SECONDS: u64 = 86400;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
	/// Allowed origins. Supports:
	/// - `*` for every origin
	/// - exact origins like `https://example.com`
	/// - a leading glob like `*.example.com`
	/// - a trailing glob like `https://dev-*`
	/// - regular expressions enclosed in slashes like `/example\..*$/`
	#[serde(default = "default_allowed_origins")]
	pub allowed_origins: Vec<String>,

	/// How long browsers may cache preflight responses.
	#[serde(default)]
	pub max_age_seconds: Option<u64>,
}

fn default_allowed_origins() -> Vec<String> {
	vec!["*".to_string()]
}

impl CorsConfig {
	pub fn max_age_seconds_or_default(&self) -> u64 {
		self.max_age_seconds.unwrap_or(DEFAULT_MAX_AGE_SECONDS)
	}
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allowed_origins: default_allowed_origins(),
			max_age_seconds: None,
		}
	}
}
