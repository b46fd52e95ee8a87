use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Logical identity of a search stream.
///
/// Searches under the same key supersede each other. Callers namespace keys by
/// feature (`"book-search"`, `"author-search"`) so unrelated inputs never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SearchKey(Arc<str>);

impl SearchKey {
	/// Creates a key from a stable identity, typically one per input box.
	pub fn new(key: impl Into<Arc<str>>) -> Self {
		Self(key.into())
	}

	/// Creates a `<prefix>-<query>` key.
	///
	/// Distinct queries under one prefix get distinct keys and therefore do
	/// not supersede each other; only repeats of the same query collapse.
	pub fn scoped(prefix: &str, query: &str) -> Self {
		Self(format!("{prefix}-{query}").into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SearchKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for SearchKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for SearchKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<&str> for SearchKey {
	fn from(key: &str) -> Self {
		Self::new(key)
	}
}

impl From<String> for SearchKey {
	fn from(key: String) -> Self {
		Self::new(key)
	}
}

impl From<&SearchKey> for SearchKey {
	fn from(key: &SearchKey) -> Self {
		key.clone()
	}
}
