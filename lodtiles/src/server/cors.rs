//! CORS for map clients on other origins.
//!
//! Origin patterns (strings in `cors.allowed_origins`):
//! - `"*"`: every origin
//! - `"*.example.com"`: suffix match
//! - `"https://dev-*"`: prefix match
//! - `"/^https://(foo|bar)\.example\.com$/"`: regular expression between slashes
//! - anything else: exact match
//!
//! Besides the origin check, the layer lets browsers send `Range` and read the headers a
//! PMTiles client needs (`Content-Length`, `Content-Range`, `Accept-Ranges`).

use crate::config::CorsConfig;
use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue, Method, header, request::Parts};
use regex::Regex;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Debug)]
enum OriginPattern {
	Any,
	Suffix(String),
	Prefix(String),
	Regex(Regex),
	Exact(String),
}

impl OriginPattern {
	fn parse(pattern: &str) -> Result<OriginPattern> {
		let pattern = pattern.trim();
		if pattern == "*" {
			return Ok(OriginPattern::Any);
		}
		if pattern.len() > 2
			&& let Some(inner) = pattern.strip_prefix('/').and_then(|p| p.strip_suffix('/'))
		{
			let regex = Regex::new(inner).with_context(|| format!("invalid origin regex '{pattern}'"))?;
			return Ok(OriginPattern::Regex(regex));
		}
		if let Some(suffix) = pattern.strip_prefix('*')
			&& !suffix.contains('*')
		{
			return Ok(OriginPattern::Suffix(suffix.to_string()));
		}
		if let Some(prefix) = pattern.strip_suffix('*')
			&& !prefix.contains('*')
		{
			return Ok(OriginPattern::Prefix(prefix.to_string()));
		}
		Ok(OriginPattern::Exact(pattern.to_string()))
	}

	fn matches(&self, origin: &str) -> bool {
		match self {
			OriginPattern::Any => true,
			OriginPattern::Suffix(suffix) => origin.ends_with(suffix.as_str()),
			OriginPattern::Prefix(prefix) => origin.starts_with(prefix.as_str()),
			OriginPattern::Regex(regex) => regex.is_match(origin),
			OriginPattern::Exact(exact) => origin == exact,
		}
	}
}

pub fn build_cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
	let patterns = config
		.allowed_origins
		.iter()
		.map(|p| OriginPattern::parse(p))
		.collect::<Result<Vec<_>>>()?;
	log::debug!("cors origin patterns: {patterns:?}");

	let exposed: [HeaderName; 3] = [header::CONTENT_LENGTH, header::CONTENT_RANGE, header::ACCEPT_RANGES];
	let allowed: [HeaderName; 5] = [
		header::ORIGIN,
		HeaderName::from_static("x-requested-with"),
		header::CONTENT_TYPE,
		header::ACCEPT,
		header::RANGE,
	];

	Ok(CorsLayer::new()
		.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _req: &Parts| {
			let origin = origin.to_str().unwrap_or("");
			patterns.iter().any(|p| p.matches(origin))
		}))
		.allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
		.allow_headers(allowed)
		.expose_headers(exposed)
		.max_age(Duration::from_secs(config.max_age_seconds_or_default())))
}
