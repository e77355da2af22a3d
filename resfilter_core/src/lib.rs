//! `resfilter_core` is a streaming text-interpolation engine. It reads a text
//! stream once, replaces delimited expressions such as `${project.version}` or
//! `@name@` with values from an ordered chain of value sources, and writes the
//! result with normalized line endings, without ever holding the whole input
//! in memory.
//!
//! ## Processing Pipeline
//!
//! ```text
//! std::io::Read
//!   → LookaheadBuffer (refills in chunks, keeps `mark_length` bytes of lookahead)
//!   → Scanner (literal run, escaped occurrence, expression or unterminated token)
//!   → Interpolator (value sources → post-processors → nested expansion, cycle checked)
//!   → LineEndingNormalizer (rewrites \r\n, \r and \n across chunk boundaries)
//!   → InterpolatingReader: std::io::Read
//! ```
//!
//! ## Modules
//!
//! - [`config`]: The immutable [`FilterConfig`] and the `resfilter.toml` file
//!   format.
//! - [`value_source`]: Property tables, object graphs, fixed responses and
//!   their composition.
//!
//! ## Key Types
//!
//! - [`DelimiterSpec`] / [`DelimiterSet`]: Begin/end token pairs, tried in
//!   insertion order.
//! - [`EscapePolicy`]: The escape marker that makes one occurrence literal.
//! - [`Interpolator`]: Resolution, post-processing and nested expansion.
//! - [`InterpolatingReader`]: The streaming [`Read`](std::io::Read) adapter.
//! - [`RecursionGuard`]: The expansion stack used to detect cycles.
//!
//! Expressions that cannot be resolved, that form a cycle or that are never
//! closed are copied to the output exactly as written.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use resfilter_core::FilterConfig;
//! use resfilter_core::Interpolator;
//! use resfilter_core::PrefixedObjectValueSource;
//! use resfilter_core::PropertiesValueSource;
//! use resfilter_core::filter_str;
//! use serde_json::json;
//!
//! let config = FilterConfig::builder().escape_string("\\").build()?;
//! let interpolator = Interpolator::new(config)
//! 	.with_source([("name", "demo")].into_iter().collect::<PropertiesValueSource>())
//! 	.with_source(PrefixedObjectValueSource::new("project.", json!({ "version": "1.2.0" })));
//! let interpolator = Arc::new(interpolator);
//!
//! let output = filter_str("${name} v${project.version} \\${name}", &interpolator)?;
//! assert_eq!(output, "demo v1.2.0 ${name}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use config::*;
pub use delimiter::*;
pub use error::*;
pub use escape::*;
pub use interpolator::*;
pub use line_ending::*;
pub use lookahead::*;
pub use reader::*;
pub use recursion::*;
pub use value_source::*;

pub mod config;
mod delimiter;
#[allow(unused_assignments)]
mod error;
mod escape;
mod interpolator;
mod line_ending;
mod lookahead;
mod reader;
mod recursion;
pub(crate) mod scanner;
pub mod value_source;

#[cfg(test)]
mod __fixtures;
