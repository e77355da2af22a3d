use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use crate::CompositeValueSource;
use crate::ExpressionError;
use crate::FilterConfig;
use crate::RecursionGuard;
use crate::ValueSource;
use crate::scanner::Scanner;
use crate::scanner::Step;

/// Transforms a resolved value before it is re-scanned for nested
/// expressions.
pub trait PostProcessor: Send + Sync {
	fn process(&self, expression: &str, value: String) -> String;
}

impl<F> PostProcessor for F
where
	F: Fn(&str, String) -> String + Send + Sync,
{
	fn process(&self, expression: &str, value: String) -> String {
		self(expression, value)
	}
}

/// Doubles the backslashes of values that look like Windows paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPathEscaper;

impl PostProcessor for WindowsPathEscaper {
	fn process(&self, _expression: &str, value: String) -> String {
		match escape_windows_path(&value) {
			Cow::Borrowed(_) => value,
			Cow::Owned(escaped) => escaped,
		}
	}
}

/// Double every backslash when `value` contains a drive-letter path such as
/// `C:\`. Backslashes that are already doubled stay a single pair.
///
/// ```rust
/// use resfilter_core::escape_windows_path;
///
/// assert_eq!(escape_windows_path(r"C:\Users\me"), r"C:\\Users\\me");
/// assert_eq!(escape_windows_path(r"C:\\Users\me"), r"C:\\Users\\me");
/// assert_eq!(escape_windows_path(r"no\drive"), r"no\drive");
/// ```
pub fn escape_windows_path(value: &str) -> Cow<'_, str> {
	let has_drive = value
		.as_bytes()
		.windows(3)
		.any(|bytes| bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\');
	if !has_drive {
		return Cow::Borrowed(value);
	}

	let mut escaped = String::with_capacity(value.len() + 8);
	let mut chars = value.chars().peekable();
	while let Some(ch) = chars.next() {
		if ch == '\\' {
			escaped.push_str(r"\\");
			chars.next_if_eq(&'\\');
		} else {
			escaped.push(ch);
		}
	}

	Cow::Owned(escaped)
}

/// Resolves expressions against an ordered chain of value sources.
///
/// Resolved values are post-processed and then scanned again with the same
/// delimiters, so a value may itself contain expressions. A value that refers
/// back to an expression still being expanded is a cycle and leaves the
/// outermost expression as literal text.
pub struct Interpolator {
	config: Arc<FilterConfig>,
	sources: CompositeValueSource,
	post_processors: Vec<Box<dyn PostProcessor>>,
}

impl Interpolator {
	/// An interpolator without any value sources. The [`WindowsPathEscaper`]
	/// is installed when the config asks for it.
	pub fn new(config: impl Into<Arc<FilterConfig>>) -> Self {
		let config = config.into();
		let mut post_processors: Vec<Box<dyn PostProcessor>> = Vec::new();
		if config.escape_windows_paths() {
			post_processors.push(Box::new(WindowsPathEscaper));
		}

		Self {
			config,
			sources: CompositeValueSource::new(),
			post_processors,
		}
	}

	#[must_use]
	pub fn with_source(mut self, source: impl ValueSource + 'static) -> Self {
		self.add_source(source);
		self
	}

	/// Sources are consulted in the order they were added.
	pub fn add_source(&mut self, source: impl ValueSource + 'static) {
		self.sources.push(source);
	}

	#[must_use]
	pub fn with_post_processor(mut self, post_processor: impl PostProcessor + 'static) -> Self {
		self.add_post_processor(post_processor);
		self
	}

	pub fn add_post_processor(&mut self, post_processor: impl PostProcessor + 'static) {
		self.post_processors.push(Box::new(post_processor));
	}

	pub fn config(&self) -> &FilterConfig {
		&self.config
	}

	pub fn sources(&self) -> &CompositeValueSource {
		&self.sources
	}

	/// A fresh guard, prefix-aware when the config recognizes prefixes.
	pub fn recursion_guard(&self) -> RecursionGuard {
		let prefixes = self.config.recognized_prefixes();
		if prefixes.is_empty() {
			RecursionGuard::new()
		} else {
			RecursionGuard::prefix_aware(prefixes.iter().cloned())
		}
	}

	/// Resolve `name` and expand any expressions inside its value.
	///
	/// Nested expressions that cannot be resolved stay literal inside the
	/// value, but a cycle anywhere below `name` fails the whole resolution.
	pub fn resolve(&self, name: &str, guard: &mut RecursionGuard) -> Result<String, ExpressionError> {
		if name.is_empty() {
			return Err(ExpressionError::Unresolved(String::new()));
		}

		guard.enter(name)?;
		let result = self.resolve_entered(name, guard);
		guard.leave();

		result
	}

	fn resolve_entered(&self, name: &str, guard: &mut RecursionGuard) -> Result<String, ExpressionError> {
		let value = self
			.sources
			.resolve(name)
			.ok_or_else(|| ExpressionError::Unresolved(name.to_string()))?;
		let value = self
			.post_processors
			.iter()
			.fold(value, |value, post_processor| post_processor.process(name, value));

		let mut expanded = Vec::with_capacity(value.len());
		self.scan(value.as_bytes(), &mut expanded, |nested, occurrence, output| {
			match self.resolve_bytes(nested, guard) {
				Ok(resolved) => output.extend_from_slice(resolved.as_bytes()),
				Err(error @ ExpressionError::Cycle { .. }) => return Err(error),
				Err(error) => {
					log_fallback(&error);
					output.extend_from_slice(occurrence);
				}
			}
			Ok(())
		})?;

		Ok(into_string(expanded))
	}

	/// Resolve a top-level expression with its own guard.
	pub fn resolve_expression(&self, name: &str) -> Result<String, ExpressionError> {
		let mut guard = self.recursion_guard();
		self.resolve(name, &mut guard)
	}

	/// Interpolate a whole string in memory. Used for short inputs such as
	/// file names, where streaming buys nothing.
	///
	/// Every expression gets its own guard and falls back to its literal text
	/// on any failure.
	pub fn interpolate(&self, input: &str) -> String {
		let mut output = Vec::with_capacity(input.len());
		let Ok(()) = self.scan(input.as_bytes(), &mut output, |name, occurrence, output| {
			match self.resolve_bytes(name, &mut self.recursion_guard()) {
				Ok(value) => output.extend_from_slice(value.as_bytes()),
				Err(error) => {
					log_fallback(&error);
					output.extend_from_slice(occurrence);
				}
			}
			Ok::<(), Infallible>(())
		});

		into_string(output)
	}

	/// Scan `input` into `output`, handing each complete expression's name and
	/// full occurrence to `on_expression`.
	fn scan<E>(
		&self,
		input: &[u8],
		output: &mut Vec<u8>,
		mut on_expression: impl FnMut(&[u8], &[u8], &mut Vec<u8>) -> Result<(), E>,
	) -> Result<(), E> {
		let scanner = Scanner::new(&self.config);
		let mut rest = input;

		while !rest.is_empty() {
			let step = scanner.classify(rest);
			let len = step.len();
			let occurrence = &rest[..len];

			match step {
				Step::Literal(_) => output.extend_from_slice(occurrence),
				Step::Escaped { marker_len, .. } => {
					output.extend_from_slice(self.config.escape().escaped_text(occurrence, marker_len));
				}
				Step::Unterminated { delimiter, .. } => {
					log_fallback(&self.malformed(delimiter));
					output.extend_from_slice(occurrence);
				}
				Step::Expression { name, .. } => on_expression(&rest[name], occurrence, output)?,
			}

			rest = &rest[len..];
		}

		Ok(())
	}

	pub(crate) fn resolve_bytes(&self, name: &[u8], guard: &mut RecursionGuard) -> Result<String, ExpressionError> {
		match std::str::from_utf8(name) {
			Ok(name) => self.resolve(name, guard),
			Err(_) => Err(ExpressionError::Unresolved(String::from_utf8_lossy(name).into_owned())),
		}
	}

	pub(crate) fn malformed(&self, delimiter: usize) -> ExpressionError {
		let (begin, end) = self
			.config
			.delimiters()
			.get(delimiter)
			.map(|spec| (spec.begin().to_string(), spec.end().to_string()))
			.unwrap_or_default();

		ExpressionError::MalformedToken { begin, end }
	}
}

impl fmt::Debug for Interpolator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Interpolator")
			.field("config", &self.config)
			.field("sources", &self.sources)
			.field("post_processors", &self.post_processors.len())
			.finish()
	}
}

/// Record why an expression was copied through literally.
pub(crate) fn log_fallback(error: &ExpressionError) {
	match error {
		ExpressionError::Cycle { name, stack } => {
			tracing::warn!(name, stack = ?stack, "{error}");
		}
		ExpressionError::Unresolved(name) => {
			tracing::trace!(name, "{error}");
		}
		ExpressionError::MalformedToken { .. } => {
			tracing::trace!("{error}");
		}
	}
}

fn into_string(bytes: Vec<u8>) -> String {
	String::from_utf8(bytes).unwrap_or_else(|error| String::from_utf8_lossy(error.as_bytes()).into_owned())
}
