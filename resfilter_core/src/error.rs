use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FilterError {
	#[error(transparent)]
	#[diagnostic(code(resfilter::io_error))]
	Io(#[from] std::io::Error),

	#[error("delimiter tokens must not be empty (begin: `{begin}`, end: `{end}`)")]
	#[diagnostic(
		code(resfilter::empty_delimiter_token),
		help("both the begin and the end token need at least one character")
	)]
	EmptyDelimiterToken { begin: String, end: String },

	#[error("invalid delimiter specification: `{0}`")]
	#[diagnostic(
		code(resfilter::invalid_delimiter_spec),
		help("write delimiters as `begin*end` (for example `${{*}}`) or as a single token such as `@`")
	)]
	InvalidDelimiterSpec(String),

	#[error("no delimiters configured")]
	#[diagnostic(
		code(resfilter::no_delimiters),
		help("configure at least one delimiter, for example `${{*}}`")
	)]
	NoDelimiters,

	#[error("read chunk size must be greater than zero")]
	#[diagnostic(code(resfilter::invalid_chunk_size))]
	InvalidChunkSize,

	#[error("unknown line ending: `{0}`")]
	#[diagnostic(
		code(resfilter::unknown_line_ending),
		help("supported line endings: lf, crlf, cr")
	)]
	UnknownLineEnding(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(resfilter::config_parse),
		help("check that resfilter.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("invalid property definition: `{0}`")]
	#[diagnostic(
		code(resfilter::invalid_property),
		help("properties are written as `key=value`")
	)]
	InvalidProperty(String),
}

/// Why a single expression was left unexpanded. These never abort a filtering
/// pass: the expression is copied to the output exactly as it was written.
#[derive(Debug, Clone, Diagnostic, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExpressionError {
	#[error("no value found for expression `{0}`")]
	#[diagnostic(code(resfilter::unresolved))]
	Unresolved(String),

	#[error("expression cycle detected: {} -> {name}", .stack.join(" -> "))]
	#[diagnostic(
		code(resfilter::cycle),
		help("one of these values refers back to an expression that is still being expanded")
	)]
	Cycle { name: String, stack: Vec<String> },

	#[error("no closing `{end}` found for `{begin}`")]
	#[diagnostic(code(resfilter::malformed_token))]
	MalformedToken { begin: String, end: String },
}

pub type FilterResult<T> = Result<T, FilterError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
