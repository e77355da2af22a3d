use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DelimiterSet;
use crate::DelimiterSpec;
use crate::EscapePolicy;
use crate::FilterError;
use crate::FilterResult;
use crate::LineEnding;
use crate::value_source::value_to_string;

/// Lookahead every window starts with before the escape and delimiter token
/// lengths are added on top. It also bounds how far the engine searches for a
/// closing token.
pub const BASE_MARK_LENGTH: usize = 4096;

/// Default number of bytes pulled from the underlying reader per refill.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"resfilter.toml",
	".resfilter.toml",
	".config/resfilter.toml",
];

/// Immutable filtering configuration shared by every reader built from it.
///
/// Derived values such as [`mark_length`](Self::mark_length) are computed once
/// in [`FilterConfigBuilder::build`], so they can never drift out of sync with
/// the delimiters and escape marker they depend on.
#[derive(Debug, Clone)]
pub struct FilterConfig {
	delimiters: DelimiterSet,
	escape: EscapePolicy,
	escape_windows_paths: bool,
	support_multi_line_filtering: bool,
	recognized_prefixes: Vec<String>,
	line_ending: Option<LineEnding>,
	chunk_size: usize,
	mark_length: usize,
	token_starts: Vec<u8>,
}

impl FilterConfig {
	pub fn builder() -> FilterConfigBuilder {
		FilterConfigBuilder::default()
	}

	pub fn delimiters(&self) -> &DelimiterSet {
		&self.delimiters
	}

	pub fn escape(&self) -> &EscapePolicy {
		&self.escape
	}

	pub fn escape_windows_paths(&self) -> bool {
		self.escape_windows_paths
	}

	/// When `false`, an expression may not span a `\n`.
	pub fn support_multi_line_filtering(&self) -> bool {
		self.support_multi_line_filtering
	}

	pub fn recognized_prefixes(&self) -> &[String] {
		&self.recognized_prefixes
	}

	pub fn line_ending(&self) -> Option<LineEnding> {
		self.line_ending
	}

	pub fn chunk_size(&self) -> usize {
		self.chunk_size
	}

	/// The number of bytes the engine keeps buffered ahead of the scan
	/// position. Always larger than the longest token sequence the scanner
	/// matches in one go.
	pub fn mark_length(&self) -> usize {
		self.mark_length
	}

	/// First bytes of the escape marker and every begin token, sorted.
	pub(crate) fn token_starts(&self) -> &[u8] {
		&self.token_starts
	}
}

/// `BASE_MARK_LENGTH` plus the escape marker plus every begin and end token.
pub fn mark_length_for(delimiters: &DelimiterSet, escape: &EscapePolicy) -> usize {
	BASE_MARK_LENGTH + escape.marker_len() + delimiters.token_len()
}

fn token_starts_for(delimiters: &DelimiterSet, escape: &EscapePolicy) -> Vec<u8> {
	let mut starts: Vec<u8> = delimiters
		.iter()
		.filter_map(|spec| spec.begin().as_bytes().first().copied())
		.chain(escape.marker().and_then(|marker| marker.as_bytes().first().copied()))
		.collect();
	starts.sort_unstable();
	starts.dedup();
	starts
}

#[derive(Debug, Clone, Default)]
pub struct FilterConfigBuilder {
	delimiters: Option<DelimiterSet>,
	escape_string: Option<String>,
	preserve_escape_string: bool,
	escape_windows_paths: bool,
	support_multi_line_filtering: bool,
	recognized_prefixes: Vec<String>,
	line_ending: Option<LineEnding>,
	chunk_size: Option<usize>,
}

impl FilterConfigBuilder {
	/// Replace the delimiter set. Without this the `${*}` and `@` defaults are
	/// used.
	#[must_use]
	pub fn delimiters(mut self, delimiters: DelimiterSet) -> Self {
		self.delimiters = Some(delimiters);
		self
	}

	/// Append one delimiter, starting from an empty set.
	#[must_use]
	pub fn delimiter(mut self, spec: DelimiterSpec) -> Self {
		self.delimiters.get_or_insert_with(DelimiterSet::new).insert(spec);
		self
	}

	#[must_use]
	pub fn escape_string(mut self, escape_string: impl Into<String>) -> Self {
		self.escape_string = Some(escape_string.into());
		self
	}

	#[must_use]
	pub fn preserve_escape_string(mut self, preserve: bool) -> Self {
		self.preserve_escape_string = preserve;
		self
	}

	#[must_use]
	pub fn escape_windows_paths(mut self, escape: bool) -> Self {
		self.escape_windows_paths = escape;
		self
	}

	#[must_use]
	pub fn support_multi_line_filtering(mut self, support: bool) -> Self {
		self.support_multi_line_filtering = support;
		self
	}

	#[must_use]
	pub fn recognized_prefixes<I, S>(mut self, prefixes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.recognized_prefixes = prefixes.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
		self.line_ending = Some(line_ending);
		self
	}

	#[must_use]
	pub fn chunk_size(mut self, chunk_size: usize) -> Self {
		self.chunk_size = Some(chunk_size);
		self
	}

	pub fn build(self) -> FilterResult<FilterConfig> {
		let delimiters = self.delimiters.unwrap_or_else(DelimiterSet::maven_defaults);
		if delimiters.is_empty() {
			return Err(FilterError::NoDelimiters);
		}

		let chunk_size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
		if chunk_size == 0 {
			return Err(FilterError::InvalidChunkSize);
		}

		let escape = EscapePolicy::new(self.escape_string, self.preserve_escape_string);
		let mark_length = mark_length_for(&delimiters, &escape);
		let token_starts = token_starts_for(&delimiters, &escape);

		tracing::debug!(
			delimiters = %delimiters,
			escape = ?escape.marker(),
			mark_length,
			chunk_size,
			"built filter config"
		);

		Ok(FilterConfig {
			delimiters,
			escape,
			escape_windows_paths: self.escape_windows_paths,
			support_multi_line_filtering: self.support_multi_line_filtering,
			recognized_prefixes: self.recognized_prefixes,
			line_ending: self.line_ending,
			chunk_size,
			mark_length,
			token_starts,
		})
	}
}

/// Configuration loaded from a `resfilter.toml` file.
///
/// ```toml
/// delimiters = ["${*}", "@"]
/// escape_string = "\\"
/// preserve_escape_string = false
/// escape_windows_paths = true
/// support_multi_line_filtering = false
/// recognized_prefixes = ["project.", "pom."]
/// line_ending = "lf"
/// local_repository = "/home/me/.m2/repository"
///
/// [properties]
/// name = "demo"
///
/// [project]
/// version = "1.0.0"
///
/// [session]
/// offline = false
///
/// [settings]
/// interactiveMode = false
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FilterFile {
	/// Delimiters in their textual form. Empty means the defaults.
	#[serde(default)]
	pub delimiters: Vec<String>,
	#[serde(default)]
	pub escape_string: Option<String>,
	#[serde(default)]
	pub preserve_escape_string: bool,
	#[serde(default)]
	pub escape_windows_paths: bool,
	#[serde(default)]
	pub support_multi_line_filtering: bool,
	/// Object-graph roots such as `project.`. Enables prefix-aware cycle
	/// detection and names the prefixes of the `[project]` table.
	#[serde(default)]
	pub recognized_prefixes: Vec<String>,
	#[serde(default)]
	pub line_ending: Option<LineEnding>,
	#[serde(default)]
	pub chunk_size: Option<usize>,
	/// Flat properties. Scalars are converted to strings.
	#[serde(default)]
	pub properties: BTreeMap<String, serde_json::Value>,
	/// Object graph resolved through prefixed expressions like
	/// `${project.version}`.
	#[serde(default)]
	pub project: Option<serde_json::Value>,
	/// Build session state, resolved through `${session.*}`.
	#[serde(default)]
	pub session: Option<serde_json::Value>,
	/// User settings, resolved through `${settings.*}`.
	#[serde(default)]
	pub settings: Option<serde_json::Value>,
	/// Answer for the bare `${localRepository}` expression.
	#[serde(default)]
	pub local_repository: Option<String>,
}

impl FilterFile {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> FilterResult<Option<FilterFile>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	pub fn load_file(path: &Path) -> FilterResult<FilterFile> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	pub fn from_toml_str(content: &str) -> FilterResult<FilterFile> {
		toml::from_str(content).map_err(|e| FilterError::ConfigParse(e.to_string()))
	}

	/// A builder carrying every engine setting from this file.
	pub fn config_builder(&self) -> FilterResult<FilterConfigBuilder> {
		let mut builder = FilterConfig::builder()
			.preserve_escape_string(self.preserve_escape_string)
			.escape_windows_paths(self.escape_windows_paths)
			.support_multi_line_filtering(self.support_multi_line_filtering)
			.recognized_prefixes(self.recognized_prefixes.iter().cloned());

		if !self.delimiters.is_empty() {
			builder = builder.delimiters(DelimiterSet::parse_all(&self.delimiters)?);
		}
		if let Some(escape_string) = &self.escape_string {
			builder = builder.escape_string(escape_string.clone());
		}
		if let Some(line_ending) = self.line_ending {
			builder = builder.line_ending(line_ending);
		}
		if let Some(chunk_size) = self.chunk_size {
			builder = builder.chunk_size(chunk_size);
		}

		Ok(builder)
	}

	/// The `[properties]` table as strings. `null` entries are dropped.
	pub fn properties(&self) -> BTreeMap<String, String> {
		self.properties
			.iter()
			.filter_map(|(key, value)| value_to_string(value).map(|value| (key.clone(), value)))
			.collect()
	}
}
