/// Decides whether a delimiter occurrence is literal text.
///
/// When the marker (for example `\`) immediately precedes a delimiter's begin
/// token, that occurrence is copied through instead of being interpolated. The
/// marker itself is stripped from the output unless `preserve` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapePolicy {
	marker: Option<String>,
	preserve: bool,
}

impl EscapePolicy {
	/// An empty marker disables escaping.
	pub fn new(marker: Option<String>, preserve: bool) -> Self {
		Self {
			marker: marker.filter(|marker| !marker.is_empty()),
			preserve,
		}
	}

	pub fn disabled() -> Self {
		Self::default()
	}

	pub fn marker(&self) -> Option<&str> {
		self.marker.as_deref()
	}

	pub fn preserves_marker(&self) -> bool {
		self.preserve
	}

	pub fn is_enabled(&self) -> bool {
		self.marker.is_some()
	}

	/// Length in bytes of the marker, `0` when escaping is disabled.
	pub fn marker_len(&self) -> usize {
		self.marker.as_ref().map_or(0, String::len)
	}

	/// Returns the marker length when `window` starts with the marker.
	pub(crate) fn match_marker(&self, window: &[u8]) -> Option<usize> {
		let marker = self.marker.as_deref()?;
		window
			.starts_with(marker.as_bytes())
			.then_some(marker.len())
	}

	/// The part of an escaped occurrence that should be written out: the
	/// marker (when preserved) plus the begin token.
	pub(crate) fn escaped_text<'a>(&self, occurrence: &'a [u8], marker_len: usize) -> &'a [u8] {
		if self.preserve {
			occurrence
		} else {
			&occurrence[marker_len..]
		}
	}
}
