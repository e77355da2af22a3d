use std::io;
use std::io::Read;
use std::sync::Arc;

use serde_json::Value;
use serde_json::json;

use crate::*;

pub(crate) fn default_config() -> FilterConfig {
	FilterConfig::builder().build().unwrap()
}

pub(crate) fn escaping_config(preserve: bool) -> FilterConfig {
	FilterConfig::builder()
		.escape_string("\\")
		.preserve_escape_string(preserve)
		.build()
		.unwrap()
}

pub(crate) fn properties(pairs: &[(&str, &str)]) -> PropertiesValueSource {
	pairs.iter().copied().collect()
}

pub(crate) fn interpolator(config: FilterConfig, pairs: &[(&str, &str)]) -> Arc<Interpolator> {
	Arc::new(Interpolator::new(config).with_source(properties(pairs)))
}

/// The properties most engine tests resolve against.
pub(crate) fn sample_properties() -> Vec<(&'static str, &'static str)> {
	vec![
		("name", "world"),
		("greeting", "hello ${name}"),
		("empty", ""),
		("x", "1"),
	]
}

pub(crate) fn project_graph() -> Value {
	json!({
		"name": "demo",
		"version": "1.0.0",
		"build": { "finalName": "demo-1.0.0" },
		"modules": ["core", "cli"],
		"count": 3,
		"flag": true,
		"missing": null,
	})
}

/// Drain `reader` through a buffer of `piece` bytes.
pub(crate) fn read_in_pieces<R: Read>(mut reader: R, piece: usize) -> io::Result<Vec<u8>> {
	let mut output = Vec::new();
	let mut buffer = vec![0; piece];
	loop {
		let read = reader.read(&mut buffer)?;
		if read == 0 {
			return Ok(output);
		}
		output.extend_from_slice(&buffer[..read]);
	}
}

/// Yields its data and then fails.
pub(crate) struct FailingReader {
	data: Option<&'static [u8]>,
}

impl FailingReader {
	pub(crate) fn new(data: &'static [u8]) -> Self {
		Self { data: Some(data) }
	}
}

impl Read for FailingReader {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		match self.data.take() {
			Some(data) => {
				let count = data.len().min(buf.len());
				buf[..count].copy_from_slice(&data[..count]);
				Ok(count)
			}
			None => Err(io::Error::other("upstream failure")),
		}
	}
}

/// Interrupts every other read and hands out at most one byte at a time.
pub(crate) struct InterruptingReader {
	data: Vec<u8>,
	position: usize,
	interrupt: bool,
}

impl InterruptingReader {
	pub(crate) fn new(data: &str) -> Self {
		Self {
			data: data.as_bytes().to_vec(),
			position: 0,
			interrupt: true,
		}
	}
}

impl Read for InterruptingReader {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.interrupt = !self.interrupt;
		if !self.interrupt {
			return Err(io::Error::from(io::ErrorKind::Interrupted));
		}

		if self.position == self.data.len() || buf.is_empty() {
			return Ok(0);
		}

		buf[0] = self.data[self.position];
		self.position += 1;
		Ok(1)
	}
}
