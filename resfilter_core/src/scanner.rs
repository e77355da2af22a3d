use std::ops::Range;

use crate::DelimiterSpec;
use crate::FilterConfig;

/// Find the first occurrence of `needle` in `haystack`.
pub fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}

/// What the bytes at the front of a window are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
	/// Bytes that cannot start a token, copied through as-is.
	Literal(usize),
	/// The escape marker directly followed by a begin token.
	Escaped { marker_len: usize, begin_len: usize },
	/// A complete `begin name end` occurrence. `name` indexes into the window.
	Expression {
		delimiter: usize,
		name: Range<usize>,
		len: usize,
	},
	/// A begin token without a closing token in reach.
	Unterminated { delimiter: usize, begin_len: usize },
}

impl Step {
	/// Bytes of the window covered by this step.
	pub(crate) fn len(&self) -> usize {
		match self {
			Self::Literal(len) | Self::Expression { len, .. } => *len,
			Self::Escaped {
				marker_len,
				begin_len,
			} => marker_len + begin_len,
			Self::Unterminated { begin_len, .. } => *begin_len,
		}
	}
}

/// Classifies the next position of a buffered window against a config.
///
/// The caller must make sure the window holds at least
/// [`FilterConfig::mark_length`] bytes unless the input has ended, so every
/// token that starts at the front of the window is fully visible.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scanner<'a> {
	config: &'a FilterConfig,
}

impl<'a> Scanner<'a> {
	pub(crate) fn new(config: &'a FilterConfig) -> Self {
		Self { config }
	}

	pub(crate) fn classify(&self, window: &[u8]) -> Step {
		let escape = self.config.escape();
		if let Some(marker_len) = escape.match_marker(window) {
			return match self.config.delimiters().match_begin(&window[marker_len..]) {
				Some((_, spec)) => {
					Step::Escaped {
						marker_len,
						begin_len: spec.begin().len(),
					}
				}
				// Only the first character is literal; the marker may start
				// again inside itself.
				None => Step::Literal(first_char_len(escape.marker().unwrap_or_default(), marker_len)),
			};
		}

		if let Some((delimiter, spec)) = self.config.delimiters().match_begin(window) {
			return match self.find_end(spec, window) {
				Some((name, len)) => {
					Step::Expression {
						delimiter,
						name,
						len,
					}
				}
				None => {
					Step::Unterminated {
						delimiter,
						begin_len: spec.begin().len(),
					}
				}
			};
		}

		Step::Literal(self.literal_run(window))
	}

	/// Search for `spec`'s end token after its begin token, no further than
	/// `mark_length` bytes from the front of the window.
	fn find_end(&self, spec: &DelimiterSpec, window: &[u8]) -> Option<(Range<usize>, usize)> {
		let name_start = spec.begin().len();
		let limit = window.len().min(self.config.mark_length());
		if name_start > limit {
			return None;
		}

		let body = &window[name_start..limit];
		let body = if self.config.support_multi_line_filtering() {
			body
		} else {
			body.split(|&byte| byte == b'\n').next().unwrap_or(body)
		};

		let end = spec.end().as_bytes();
		let offset = memstr(body, end)?;
		let name_end = name_start + offset;

		Some((name_start..name_end, name_end + end.len()))
	}

	/// Length of the run up to the next byte that could start a token. Always
	/// at least one byte so scanning makes progress.
	fn literal_run(&self, window: &[u8]) -> usize {
		let starts = self.config.token_starts();
		window
			.iter()
			.skip(1)
			.position(|byte| starts.binary_search(byte).is_ok())
			.map_or(window.len(), |offset| offset + 1)
	}
}

fn first_char_len(marker: &str, fallback: usize) -> usize {
	marker.chars().next().map_or(fallback, char::len_utf8)
}
