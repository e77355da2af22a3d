use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Resolves an expression name to a value.
///
/// Implemented for closures so ad-hoc sources need no wrapper type:
///
/// ```rust
/// use resfilter_core::ValueSource;
///
/// let source = |name: &str| (name == "greeting").then(|| "hello".to_string());
/// assert_eq!(source.resolve("greeting").as_deref(), Some("hello"));
/// assert_eq!(source.resolve("other"), None);
/// ```
pub trait ValueSource: Send + Sync {
	fn resolve(&self, expression: &str) -> Option<String>;
}

impl<F> ValueSource for F
where
	F: Fn(&str) -> Option<String> + Send + Sync,
{
	fn resolve(&self, expression: &str) -> Option<String> {
		self(expression)
	}
}

/// A flat key/value table.
pub trait PropertyLookup: Send + Sync {
	fn get(&self, key: &str) -> Option<&str>;
	fn entries(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_>;
}

impl PropertyLookup for BTreeMap<String, String> {
	fn get(&self, key: &str) -> Option<&str> {
		BTreeMap::get(self, key).map(String::as_str)
	}

	fn entries(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
		Box::new(self.iter().map(|(key, value)| (key.as_str(), value.as_str())))
	}
}

impl PropertyLookup for HashMap<String, String> {
	fn get(&self, key: &str) -> Option<&str> {
		HashMap::get(self, key).map(String::as_str)
	}

	fn entries(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
		Box::new(self.iter().map(|(key, value)| (key.as_str(), value.as_str())))
	}
}

/// Looks expressions up verbatim in a property table.
#[derive(Debug, Clone, Default)]
pub struct PropertiesValueSource<P = BTreeMap<String, String>> {
	properties: P,
}

impl<P: PropertyLookup> PropertiesValueSource<P> {
	pub fn new(properties: P) -> Self {
		Self { properties }
	}

	pub fn properties(&self) -> &P {
		&self.properties
	}
}

impl<P: PropertyLookup> ValueSource for PropertiesValueSource<P> {
	fn resolve(&self, expression: &str) -> Option<String> {
		self.properties.get(expression).map(str::to_string)
	}
}

impl<K, V> FromIterator<(K, V)> for PropertiesValueSource
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self::new(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

/// Resolves `prefix.dotted.path` expressions by walking an object graph.
///
/// With the prefix `project.`, `${project.build.finalName}` reads
/// `root["build"]["finalName"]`. Numeric segments index into arrays. When
/// unprefixed expressions are allowed, `${build.finalName}` is walked from the
/// root as well.
#[derive(Debug, Clone)]
pub struct PrefixedObjectValueSource {
	prefixes: Vec<String>,
	root: Value,
	allow_unprefixed: bool,
}

impl PrefixedObjectValueSource {
	pub fn new(prefix: impl Into<String>, root: Value) -> Self {
		Self::with_prefixes([prefix], root, false)
	}

	pub fn with_prefixes<I, S>(prefixes: I, root: Value, allow_unprefixed: bool) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			prefixes: prefixes.into_iter().map(Into::into).collect(),
			root,
			allow_unprefixed,
		}
	}

	pub fn prefixes(&self) -> &[String] {
		&self.prefixes
	}

	/// The path below the root named by `expression`, if it carries one of
	/// the prefixes (or unprefixed expressions are allowed).
	fn path<'a>(&self, expression: &'a str) -> Option<&'a str> {
		let stripped = self
			.prefixes
			.iter()
			.find_map(|prefix| expression.strip_prefix(prefix.as_str()))
			.map(|rest| rest.strip_prefix('.').unwrap_or(rest));

		match stripped {
			Some(path) => Some(path),
			None if self.allow_unprefixed => Some(expression),
			None => None,
		}
	}
}

impl ValueSource for PrefixedObjectValueSource {
	fn resolve(&self, expression: &str) -> Option<String> {
		let path = self.path(expression)?;
		lookup_path(&self.root, path).and_then(value_to_string)
	}
}

/// Answers exactly one expression with a fixed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleResponseValueSource {
	expression: String,
	response: String,
}

impl SingleResponseValueSource {
	pub fn new(expression: impl Into<String>, response: impl Into<String>) -> Self {
		Self {
			expression: expression.into(),
			response: response.into(),
		}
	}
}

impl ValueSource for SingleResponseValueSource {
	fn resolve(&self, expression: &str) -> Option<String> {
		(expression == self.expression).then(|| self.response.clone())
	}
}

/// Tries each member in registration order; the first present value wins.
#[derive(Default)]
pub struct CompositeValueSource {
	sources: Vec<Box<dyn ValueSource>>,
}

impl CompositeValueSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, source: impl ValueSource + 'static) {
		self.sources.push(Box::new(source));
	}

	#[must_use]
	pub fn with(mut self, source: impl ValueSource + 'static) -> Self {
		self.push(source);
		self
	}

	pub fn len(&self) -> usize {
		self.sources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}
}

impl ValueSource for CompositeValueSource {
	fn resolve(&self, expression: &str) -> Option<String> {
		self.sources
			.iter()
			.find_map(|source| source.resolve(expression))
	}
}

impl fmt::Debug for CompositeValueSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CompositeValueSource")
			.field("sources", &self.sources.len())
			.finish()
	}
}

/// Walk a dotted path such as `build.plugins.0.name` below `root`.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
	if path.is_empty() {
		return None;
	}

	path.split('.').try_fold(root, |current, segment| {
		match current {
			Value::Object(map) => map.get(segment),
			Value::Array(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
			_ => None,
		}
	})
}

/// The text substituted for a value. `null` has no text; arrays and objects
/// are written as JSON.
pub fn value_to_string(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(text) => Some(text.clone()),
		Value::Bool(flag) => Some(flag.to_string()),
		Value::Number(number) => Some(number.to_string()),
		Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
	}
}
