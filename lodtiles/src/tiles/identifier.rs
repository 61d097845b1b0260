use anyhow::{Result, ensure};
use regex::Regex;
use std::{fmt, sync::LazyLock};

static IDENTIFIER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("identifier regex"));

/// A plain SQL identifier, optionally schema-qualified.
///
/// Table and column names reach the SQL text verbatim, so they are checked once when the
/// configuration is loaded and always emitted double-quoted.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Identifier(String);

impl Identifier {
	pub fn parse(name: &str) -> Result<Identifier> {
		ensure!(
			IDENTIFIER.is_match(name),
			"'{name}' is not a valid SQL identifier"
		);
		// postgres truncates longer names silently
		ensure!(
			name.split('.').all(|part| part.len() <= 63),
			"identifier '{name}' is longer than 63 characters"
		);
		Ok(Identifier(name.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// `"name"` or `"schema"."name"`.
	pub fn quoted(&self) -> String {
		self
			.0
			.split('.')
			.map(|part| format!("\"{part}\""))
			.collect::<Vec<_>>()
			.join(".")
	}
}

impl fmt::Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
