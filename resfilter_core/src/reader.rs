use std::io;
use std::io::Read;
use std::sync::Arc;

use crate::FilterResult;
use crate::Interpolator;
use crate::LineEndingNormalizer;
use crate::LookaheadBuffer;
use crate::interpolator::log_fallback;
use crate::scanner::Scanner;
use crate::scanner::Step;

/// A [`Read`] adapter that interpolates expressions as the input streams
/// through it.
///
/// The upstream reader is consumed once, in chunks, and only a window of
/// [`mark_length`](crate::FilterConfig::mark_length) bytes is held at a time.
/// Expressions that cannot be resolved are written out exactly as they
/// appeared in the input. Line endings are normalized last, after
/// substitution.
///
/// ```rust
/// use std::io::Read;
///
/// use resfilter_core::FilterConfig;
/// use resfilter_core::InterpolatingReader;
/// use resfilter_core::Interpolator;
/// use resfilter_core::PropertiesValueSource;
///
/// let config = FilterConfig::builder().build()?;
/// let interpolator = Interpolator::new(config)
/// 	.with_source([("name", "world")].into_iter().collect::<PropertiesValueSource>());
///
/// let mut reader = InterpolatingReader::new("hello ${name} @missing@".as_bytes(), interpolator);
/// let mut output = String::new();
/// reader.read_to_string(&mut output)?;
///
/// assert_eq!(output, "hello world @missing@");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct InterpolatingReader<R> {
	buffer: LookaheadBuffer<R>,
	interpolator: Arc<Interpolator>,
	normalizer: LineEndingNormalizer,
	/// Filtered bytes waiting to be handed out, from `output_pos` on.
	output: Vec<u8>,
	output_pos: usize,
	finished: bool,
}

impl<R: Read> InterpolatingReader<R> {
	pub fn new(inner: R, interpolator: impl Into<Arc<Interpolator>>) -> Self {
		let interpolator = interpolator.into();
		let config = interpolator.config();

		Self {
			buffer: LookaheadBuffer::new(inner, config.chunk_size()),
			normalizer: LineEndingNormalizer::new(config.line_ending()),
			interpolator,
			output: Vec::new(),
			output_pos: 0,
			finished: false,
		}
	}

	/// Process the next step of the input into `output`.
	fn advance(&mut self) -> io::Result<()> {
		let config = self.interpolator.config();
		self.buffer.fill(config.mark_length())?;

		let window = self.buffer.window();
		if window.is_empty() {
			self.normalizer.finish(&mut self.output);
			self.finished = true;
			tracing::trace!("filter stream finished");
			return Ok(());
		}

		let step = Scanner::new(config).classify(window);
		let len = step.len();

		match step {
			Step::Literal(_) => {
				self.normalizer.push(&window[..len], &mut self.output);
				self.buffer.consume(len);
			}
			Step::Escaped { marker_len, .. } => {
				let text = config.escape().escaped_text(&window[..len], marker_len);
				self.normalizer.push(text, &mut self.output);
				self.buffer.consume(len);
			}
			Step::Unterminated { delimiter, .. } => {
				log_fallback(&self.interpolator.malformed(delimiter));
				self.normalizer.push(&window[..len], &mut self.output);
				self.buffer.consume(len);
			}
			Step::Expression { name, .. } => {
				let name = window[name].to_vec();
				self.buffer.mark();
				self.buffer.consume(len);

				let mut guard = self.interpolator.recursion_guard();
				match self.interpolator.resolve_bytes(&name, &mut guard) {
					Ok(value) => {
						self.normalizer.push(value.as_bytes(), &mut self.output);
					}
					Err(error) => {
						log_fallback(&error);
						self.buffer.reset();
						self.normalizer.push(&self.buffer.window()[..len], &mut self.output);
						self.buffer.consume(len);
					}
				}

				self.buffer.clear_mark();
			}
		}

		Ok(())
	}
}

impl<R> InterpolatingReader<R> {
	pub fn interpolator(&self) -> &Arc<Interpolator> {
		&self.interpolator
	}

	/// Release the buffered window and the upstream reader. Every later read
	/// returns `Ok(0)`.
	pub fn close(&mut self) {
		self.buffer.close();
		self.output.clear();
		self.output_pos = 0;
		self.finished = true;
	}

	/// The upstream reader, unless the stream was closed.
	pub fn into_inner(self) -> Option<R> {
		self.buffer.into_inner()
	}
}

impl<R: Read> Read for InterpolatingReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if buf.is_empty() {
			return Ok(0);
		}

		while self.output_pos == self.output.len() {
			if self.finished {
				return Ok(0);
			}

			self.output.clear();
			self.output_pos = 0;
			self.advance()?;
		}

		let pending = &self.output[self.output_pos..];
		let count = pending.len().min(buf.len());
		buf[..count].copy_from_slice(&pending[..count]);
		self.output_pos += count;

		Ok(count)
	}
}

/// Filter everything `input` yields into a string.
pub fn filter_to_string<R: Read>(input: R, interpolator: &Arc<Interpolator>) -> FilterResult<String> {
	let mut reader = InterpolatingReader::new(input, Arc::clone(interpolator));
	let mut output = String::new();
	reader.read_to_string(&mut output)?;

	Ok(output)
}

/// Filter a short string such as a file name.
pub fn filter_str(input: &str, interpolator: &Arc<Interpolator>) -> FilterResult<String> {
	filter_to_string(input.as_bytes(), interpolator)
}
