use std::io;
use std::io::Read;

/// A refillable window over an upstream reader.
///
/// The buffer only grows far enough to satisfy the lookahead it is asked for.
/// Consumed bytes are dropped by shifting the live region to the front on the
/// next refill, but never the bytes at or after an active [`mark`](Self::mark),
/// so a [`reset`](Self::reset) always has something to rewind to.
#[derive(Debug)]
pub struct LookaheadBuffer<R> {
	inner: Option<R>,
	/// Valid bytes are `data[..filled]`.
	data: Vec<u8>,
	filled: usize,
	position: usize,
	mark: Option<usize>,
	chunk_size: usize,
	eof: bool,
}

impl<R: Read> LookaheadBuffer<R> {
	/// `chunk_size` is the most bytes requested from `inner` per read call and
	/// must be non-zero.
	pub fn new(inner: R, chunk_size: usize) -> Self {
		Self {
			inner: Some(inner),
			data: Vec::new(),
			filled: 0,
			position: 0,
			mark: None,
			chunk_size: chunk_size.max(1),
			eof: false,
		}
	}

	/// Make at least `min` unread bytes available, stopping early only at the
	/// end of the upstream reader.
	pub fn fill(&mut self, min: usize) -> io::Result<()> {
		while self.available() < min && !self.eof {
			self.compact();

			let Some(inner) = self.inner.as_mut() else {
				self.eof = true;
				break;
			};

			let start = self.filled;
			self.data.resize(start + self.chunk_size, 0);

			match inner.read(&mut self.data[start..]) {
				Ok(0) => {
					self.eof = true;
				}
				Ok(read) => {
					self.filled += read;
					tracing::trace!(read, available = self.filled - self.position, "refilled lookahead buffer");
				}
				Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
				Err(error) => {
					self.data.truncate(self.filled);
					return Err(error);
				}
			}

			self.data.truncate(self.filled);
		}

		Ok(())
	}

	/// Drop everything before the mark (or the position when unmarked).
	fn compact(&mut self) {
		let keep_from = self.mark.map_or(self.position, |mark| mark.min(self.position));
		if keep_from == 0 {
			return;
		}

		self.data.copy_within(keep_from..self.filled, 0);
		self.filled -= keep_from;
		self.position -= keep_from;
		self.mark = self.mark.map(|mark| mark - keep_from);
		self.data.truncate(self.filled);
	}
}

impl<R> LookaheadBuffer<R> {
	/// The unread bytes.
	pub fn window(&self) -> &[u8] {
		&self.data[self.position..self.filled]
	}

	pub fn available(&self) -> usize {
		self.filled - self.position
	}

	/// Advance past `count` unread bytes.
	pub fn consume(&mut self, count: usize) {
		self.position = (self.position + count).min(self.filled);
	}

	/// Remember the current position for a later [`reset`](Self::reset).
	pub fn mark(&mut self) {
		self.mark = Some(self.position);
	}

	/// Rewind to the mark, if there is one. The mark stays in place.
	pub fn reset(&mut self) {
		if let Some(mark) = self.mark {
			self.position = mark;
		}
	}

	pub fn clear_mark(&mut self) {
		self.mark = None;
	}

	pub fn is_eof(&self) -> bool {
		self.eof
	}

	/// `true` once the upstream reader is drained and every byte consumed.
	pub fn is_exhausted(&self) -> bool {
		self.eof && self.available() == 0
	}

	/// Release the window and the upstream reader.
	pub fn close(&mut self) {
		self.inner = None;
		self.data = Vec::new();
		self.filled = 0;
		self.position = 0;
		self.mark = None;
		self.eof = true;
	}

	pub fn into_inner(self) -> Option<R> {
		self.inner
	}
}
