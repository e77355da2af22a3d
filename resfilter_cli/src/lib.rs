use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use resfilter_core::FilterError;
use resfilter_core::FilterResult;
use resfilter_core::LineEnding;

#[derive(Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(
	author,
	version,
	about = "Interpolate `${name}` and `@name@` expressions in a text stream.",
	long_about = "resfilter reads text from a file or stdin, replaces delimited expressions with \
	              values from `resfilter.toml` and `-D` definitions, and writes the result to \
	              stdout.\n\nExpressions that cannot be resolved are copied through unchanged.\n\n\
	              Examples:\n  resfilter -D version=1.2.0 pom.xml\n  cat app.properties | \
	              resfilter --line-ending lf"
)]
pub struct FilterCli {
	/// File to filter. Reads stdin when omitted or `-`.
	pub input: Option<PathBuf>,

	/// Path to the project root directory used to discover `resfilter.toml`.
	#[arg(long, short)]
	pub path: Option<PathBuf>,

	/// Explicit config file. Skips discovery.
	#[arg(long, short)]
	pub config: Option<PathBuf>,

	/// Define a property as `key=value`. Overrides `[properties]` entries.
	#[arg(long = "define", short = 'D', value_name = "KEY=VALUE", value_parser = parse_define)]
	pub defines: Vec<(String, String)>,

	/// Delimiter such as `${*}` or `@`. Replaces the configured delimiters
	/// when given at least once.
	#[arg(long = "delimiter", short, value_name = "SPEC")]
	pub delimiters: Vec<String>,

	/// Marker that makes the following delimiter literal, e.g. `\`.
	#[arg(long)]
	pub escape_string: Option<String>,

	/// Keep the escape marker in the output of escaped occurrences.
	#[arg(long, default_value_t = false)]
	pub preserve_escape_string: bool,

	/// Double the backslashes of resolved values that contain a Windows path.
	#[arg(long, default_value_t = false)]
	pub escape_windows_paths: bool,

	/// Allow an expression to span line breaks.
	#[arg(long = "multi-line", default_value_t = false)]
	pub multi_line: bool,

	/// Rewrite every line terminator to this line ending.
	#[arg(long, value_enum)]
	pub line_ending: Option<LineEndingArg>,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LineEndingArg {
	/// Unix line endings (`\n`).
	Lf,
	/// Windows line endings (`\r\n`).
	Crlf,
	/// Classic Mac line endings (`\r`).
	Cr,
}

impl From<LineEndingArg> for LineEnding {
	fn from(value: LineEndingArg) -> Self {
		match value {
			LineEndingArg::Lf => LineEnding::Lf,
			LineEndingArg::Crlf => LineEnding::CrLf,
			LineEndingArg::Cr => LineEnding::Cr,
		}
	}
}

/// Split a `key=value` definition. The value may be empty and may itself
/// contain `=`.
pub fn parse_define(definition: &str) -> FilterResult<(String, String)> {
	match definition.split_once('=') {
		Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
		_ => Err(FilterError::InvalidProperty(definition.to_string())),
	}
}
