use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::FilterError;

/// The line terminator written in place of `\r\n`, `\r` and `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
	/// `\n`
	Lf,
	/// `\r\n`
	#[serde(rename = "crlf")]
	CrLf,
	/// `\r`
	Cr,
}

impl LineEnding {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Lf => "\n",
			Self::CrLf => "\r\n",
			Self::Cr => "\r",
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Lf => "lf",
			Self::CrLf => "crlf",
			Self::Cr => "cr",
		}
	}
}

impl fmt::Display for LineEnding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for LineEnding {
	type Err = FilterError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.to_ascii_lowercase().as_str() {
			"lf" | "unix" => Ok(Self::Lf),
			"crlf" | "windows" | "dos" => Ok(Self::CrLf),
			"cr" => Ok(Self::Cr),
			_ => Err(FilterError::UnknownLineEnding(value.to_string())),
		}
	}
}

/// Rewrites line terminators in a stream that arrives in arbitrary chunks.
///
/// A `\r` at the end of a chunk might be the first half of `\r\n`, so it is
/// held back until the next chunk (or [`finish`](Self::finish)) decides what
/// it was.
#[derive(Debug, Clone, Default)]
pub struct LineEndingNormalizer {
	target: Option<LineEnding>,
	pending_cr: bool,
}

impl LineEndingNormalizer {
	/// `None` passes every byte through untouched.
	pub fn new(target: Option<LineEnding>) -> Self {
		Self {
			target,
			pending_cr: false,
		}
	}

	pub fn target(&self) -> Option<LineEnding> {
		self.target
	}

	/// Normalize `input` and append the result to `output`.
	pub fn push(&mut self, input: &[u8], output: &mut Vec<u8>) {
		let Some(target) = self.target else {
			output.extend_from_slice(input);
			return;
		};
		let terminator = target.as_str().as_bytes();

		let mut run_start = 0;
		for (index, &byte) in input.iter().enumerate() {
			if self.pending_cr {
				self.pending_cr = false;
				output.extend_from_slice(terminator);
				if byte == b'\n' {
					run_start = index + 1;
					continue;
				}
			}

			match byte {
				b'\r' => {
					output.extend_from_slice(&input[run_start..index]);
					self.pending_cr = true;
					run_start = index + 1;
				}
				b'\n' => {
					output.extend_from_slice(&input[run_start..index]);
					output.extend_from_slice(terminator);
					run_start = index + 1;
				}
				_ => {}
			}
		}

		output.extend_from_slice(&input[run_start..]);
	}

	/// Flush a held-back `\r` once the stream has ended.
	pub fn finish(&mut self, output: &mut Vec<u8>) {
		let Some(target) = self.target else {
			return;
		};

		if self.pending_cr {
			self.pending_cr = false;
			output.extend_from_slice(target.as_str().as_bytes());
		}
	}
}
