//! External catalog search boundary.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::trace;

use crate::candidate::Candidate;
use crate::similarity::query_score;
use crate::store::StoreError;

/// Minimum [`query_score`] for a [`StaticCatalog`] entry to be returned.
pub const SUGGESTION_FLOOR: f64 = 0.75;

/// Errors reported by a [`SearchProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
	/// The provider could not be reached or refused the request.
	#[error("provider {provider} unavailable: {reason}")]
	Unavailable {
		/// Provider name.
		provider: String,
		/// Human readable cause.
		reason: String,
	},

	/// Error reading a catalog file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the catalog file.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Catalog data did not decode.
	#[error("malformed catalog data: {0}")]
	Json(#[from] serde_json::Error),

	/// The backing record store failed.
	#[error(transparent)]
	Store(#[from] StoreError),
}

/// A catalog that can be searched by free text.
///
/// Implementations may be slow, may fail, and may return nothing. Results are
/// ranked best first and hold at most `limit` entries.
#[async_trait]
pub trait SearchProvider: Send + Sync {
	/// Stable provider name, recorded on every returned [`Candidate`].
	fn name(&self) -> &str;

	/// Searches the catalog for `query`.
	async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ProviderError>;
}

/// An in-memory catalog ranked by fuzzy similarity.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
	name: String,
	entries: Vec<Candidate>,
}

impl StaticCatalog {
	/// Creates a catalog; entries without a source are attributed to it.
	pub fn new(name: impl Into<String>, entries: Vec<Candidate>) -> Self {
		let name = name.into();
		let entries = entries
			.into_iter()
			.map(|mut entry| {
				if entry.source.is_empty() {
					entry.source = name.clone();
				}
				entry
			})
			.collect();
		Self { name, entries }
	}

	/// Loads a JSON array of candidates, naming the catalog after the file stem.
	pub fn from_json_file(path: &Path) -> Result<Self, ProviderError> {
		let text = std::fs::read_to_string(path).map_err(|error| ProviderError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let entries: Vec<Candidate> = serde_json::from_str(&text)?;
		let name = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_else(|| "catalog".to_string());
		Ok(Self::new(name, entries))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[async_trait]
impl SearchProvider for StaticCatalog {
	fn name(&self) -> &str {
		&self.name
	}

	async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ProviderError> {
		let mut scored: Vec<(f64, &Candidate)> = self
			.entries
			.iter()
			.map(|entry| (query_score(query, entry), entry))
			.filter(|(score, _)| *score >= SUGGESTION_FLOOR)
			.collect();
		scored.sort_by(|(a_score, a), (b_score, b)| b_score.total_cmp(a_score).then_with(|| a.title.cmp(&b.title)));
		trace!(provider = %self.name, query, hits = scored.len(), "catalog.search");
		Ok(scored.into_iter().take(limit).map(|(_, entry)| entry.clone()).collect())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;
	use crate::candidate::CopyFormat;

	fn shelf() -> StaticCatalog {
		StaticCatalog::new(
			"shelf",
			vec![
				Candidate::new("Dune").with_author("Frank Herbert"),
				Candidate::new("Dune Messiah").with_author("Frank Herbert"),
				Candidate::new("Hyperion").with_author("Dan Simmons"),
				Candidate::new("Neuromancer").with_author("William Gibson"),
			],
		)
	}

	#[tokio::test]
	async fn ranks_exact_title_first() {
		let hits = shelf().search("Dune", 10).await.unwrap();
		let titles: Vec<_> = hits.iter().map(|c| c.title.as_str()).collect();
		assert_eq!(titles, vec!["Dune", "Dune Messiah"]);
		assert!(hits.iter().all(|c| c.source == "shelf"));
	}

	#[tokio::test]
	async fn matches_by_author_and_respects_limit() {
		let hits = shelf().search("herbert", 1).await.unwrap();
		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].primary_author(), Some("Frank Herbert"));
	}

	#[tokio::test]
	async fn unrelated_query_returns_nothing() {
		assert!(shelf().search("zzzz", 10).await.unwrap().is_empty());
	}

	#[test]
	fn loads_json_file() {
		let mut file = tempfile::Builder::new().prefix("gutenberg").suffix(".json").tempfile().unwrap();
		write!(file, r#"[{{"title": "The Time Machine", "authors": ["H. G. Wells"], "links": [{{"format": "epub", "url": "https://example.org/35.epub"}}]}}]"#).unwrap();

		let catalog = StaticCatalog::from_json_file(file.path()).unwrap();
		assert_eq!(catalog.len(), 1);
		assert!(catalog.name().starts_with("gutenberg"));
		assert_eq!(catalog.entries[0].links[0].format, CopyFormat::Epub);
	}

	#[test]
	fn malformed_json_is_reported() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "{{ not json").unwrap();
		assert!(matches!(StaticCatalog::from_json_file(file.path()), Err(ProviderError::Json(_))));
	}
}
