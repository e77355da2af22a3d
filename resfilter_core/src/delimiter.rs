use std::fmt;
use std::str::FromStr;

use derive_more::Deref;

use crate::FilterError;
use crate::FilterResult;

/// Separates the begin and end tokens in the textual form of a delimiter,
/// e.g. `${*}`.
const TOKEN_SEPARATOR: char = '*';

/// The delimiters used when none are configured: `${*}` followed by `@`.
pub const DEFAULT_DELIMITERS: [&str; 2] = ["${*}", "@"];

/// A begin/end token pair marking an interpolatable expression.
///
/// Both tokens are guaranteed to be non-empty. Two specs are equal when both
/// of their tokens are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelimiterSpec {
	begin: String,
	end: String,
}

impl DelimiterSpec {
	pub fn new(begin: impl Into<String>, end: impl Into<String>) -> FilterResult<Self> {
		let begin = begin.into();
		let end = end.into();

		if begin.is_empty() || end.is_empty() {
			return Err(FilterError::EmptyDelimiterToken { begin, end });
		}

		Ok(Self { begin, end })
	}

	/// Parse the textual form of a delimiter. `${*}` splits into `${` and `}`
	/// around the `*`, while a spec without a `*` such as `@` uses the same
	/// token to open and close.
	pub fn parse(spec: &str) -> FilterResult<Self> {
		let result = match spec.split_once(TOKEN_SEPARATOR) {
			Some((begin, end)) => Self::new(begin, end),
			None => Self::new(spec, spec),
		};

		result.map_err(|_| FilterError::InvalidDelimiterSpec(spec.to_string()))
	}

	pub fn begin(&self) -> &str {
		&self.begin
	}

	pub fn end(&self) -> &str {
		&self.end
	}

	/// Combined length in bytes of both tokens.
	pub(crate) fn token_len(&self) -> usize {
		self.begin.len() + self.end.len()
	}
}

impl fmt::Display for DelimiterSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.begin == self.end {
			write!(f, "{}", self.begin)
		} else {
			write!(f, "{}{TOKEN_SEPARATOR}{}", self.begin, self.end)
		}
	}
}

impl FromStr for DelimiterSpec {
	type Err = FilterError;

	fn from_str(spec: &str) -> Result<Self, Self::Err> {
		Self::parse(spec)
	}
}

/// An insertion-ordered set of delimiters.
///
/// Delimiters are tried in the order they were inserted, and inserting a spec
/// that is already present leaves the set unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct DelimiterSet(Vec<DelimiterSpec>);

impl DelimiterSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// The `${*}` and `@` delimiters.
	pub fn maven_defaults() -> Self {
		DEFAULT_DELIMITERS
			.iter()
			.filter_map(|spec| DelimiterSpec::parse(spec).ok())
			.collect()
	}

	/// Parse every textual spec, keeping the first occurrence of duplicates.
	pub fn parse_all<I, S>(specs: I) -> FilterResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut set = Self::new();
		for spec in specs {
			set.insert(DelimiterSpec::parse(spec.as_ref())?);
		}

		Ok(set)
	}

	/// Add a delimiter to the end of the trial order. Returns `false` when an
	/// identical spec is already present.
	pub fn insert(&mut self, spec: DelimiterSpec) -> bool {
		if self.0.contains(&spec) {
			return false;
		}

		self.0.push(spec);
		true
	}

	/// Sum of the begin and end token lengths of every delimiter.
	pub(crate) fn token_len(&self) -> usize {
		self.0.iter().map(DelimiterSpec::token_len).sum()
	}

	/// The first delimiter whose begin token opens `window`, in trial order.
	pub(crate) fn match_begin(&self, window: &[u8]) -> Option<(usize, &DelimiterSpec)> {
		self.0
			.iter()
			.enumerate()
			.find(|(_, spec)| window.starts_with(spec.begin.as_bytes()))
	}
}

impl FromIterator<DelimiterSpec> for DelimiterSet {
	fn from_iter<T: IntoIterator<Item = DelimiterSpec>>(iter: T) -> Self {
		let mut set = Self::new();
		set.extend(iter);
		set
	}
}

impl Extend<DelimiterSpec> for DelimiterSet {
	fn extend<T: IntoIterator<Item = DelimiterSpec>>(&mut self, iter: T) {
		for spec in iter {
			self.insert(spec);
		}
	}
}

impl fmt::Display for DelimiterSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (index, spec) in self.0.iter().enumerate() {
			if index > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{spec}")?;
		}

		Ok(())
	}
}
