use crate::ExpressionError;

/// Tracks the expressions currently being expanded so a value that refers back
/// to one of them is reported instead of recursing forever.
///
/// A guard is created for each top-level expression and handed down through
/// every nested resolution, so independent expressions never share state.
#[derive(Debug, Clone, Default)]
pub struct RecursionGuard {
	prefixes: Vec<String>,
	stack: Vec<String>,
}

impl RecursionGuard {
	/// Every distinct name is its own key.
	pub fn new() -> Self {
		Self::default()
	}

	/// Names are keyed with a leading recognized prefix removed, so
	/// `project.version` and `version` count as the same expression.
	pub fn prefix_aware<I, S>(prefixes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			prefixes: prefixes.into_iter().map(Into::into).collect(),
			stack: Vec::new(),
		}
	}

	fn key<'a>(&self, name: &'a str) -> &'a str {
		self.prefixes
			.iter()
			.find_map(|prefix| name.strip_prefix(prefix.as_str()))
			.map(|rest| rest.strip_prefix('.').unwrap_or(rest))
			.unwrap_or(name)
	}

	/// Push `name` onto the expansion stack. Fails when an expression with the
	/// same key is already being expanded.
	pub fn enter(&mut self, name: &str) -> Result<(), ExpressionError> {
		let key = self.key(name);
		if self.stack.iter().any(|active| self.key(active) == key) {
			return Err(ExpressionError::Cycle {
				name: name.to_string(),
				stack: self.stack.clone(),
			});
		}

		self.stack.push(name.to_string());
		Ok(())
	}

	pub fn leave(&mut self) {
		self.stack.pop();
	}

	/// Names currently being expanded, outermost first.
	pub fn stack(&self) -> &[String] {
		&self.stack
	}

	pub fn depth(&self) -> usize {
		self.stack.len()
	}

	pub fn is_prefix_aware(&self) -> bool {
		!self.prefixes.is_empty()
	}
}
