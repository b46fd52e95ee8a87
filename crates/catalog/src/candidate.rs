//! Catalog hits.

use serde::{Deserialize, Serialize};

/// Format of a readable copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyFormat {
	Epub,
	Pdf,
	Html,
	Text,
	Audio,
	Other,
}

/// Where a copy can be read or downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLink {
	pub format: CopyFormat,
	pub url: String,
}

/// One hit from a catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
	pub title: String,
	#[serde(default)]
	pub authors: Vec<String>,
	/// Name of the provider that returned this hit.
	#[serde(default)]
	pub source: String,
	#[serde(default)]
	pub year: Option<i32>,
	#[serde(default)]
	pub links: Vec<AccessLink>,
}

impl Candidate {
	/// Creates a candidate with only a title.
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			authors: Vec::new(),
			source: String::new(),
			year: None,
			links: Vec::new(),
		}
	}

	pub fn with_author(mut self, author: impl Into<String>) -> Self {
		self.authors.push(author.into());
		self
	}

	pub fn with_year(mut self, year: i32) -> Self {
		self.year = Some(year);
		self
	}

	pub fn with_link(mut self, format: CopyFormat, url: impl Into<String>) -> Self {
		self.links.push(AccessLink { format, url: url.into() });
		self
	}

	pub fn primary_author(&self) -> Option<&str> {
		self.authors.first().map(String::as_str)
	}

	/// Returns true if at least one readable copy is linked.
	pub fn has_access(&self) -> bool {
		!self.links.is_empty()
	}

	/// Returns the most convenient link, preferring reflowable formats.
	pub fn best_link(&self) -> Option<&AccessLink> {
		self.links.iter().min_by_key(|link| link.format)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn best_link_prefers_epub() {
		let candidate = Candidate::new("Hyperion")
			.with_link(CopyFormat::Pdf, "https://example.org/hyperion.pdf")
			.with_link(CopyFormat::Epub, "https://example.org/hyperion.epub");
		assert_eq!(candidate.best_link().map(|l| l.format), Some(CopyFormat::Epub));
	}

	#[test]
	fn deserializes_with_defaults() {
		let candidate: Candidate = serde_json::from_str(r#"{"title": "Solaris", "links": [{"format": "html", "url": "https://example.org/solaris"}]}"#).unwrap();
		assert_eq!(candidate.title, "Solaris");
		assert!(candidate.authors.is_empty());
		assert!(candidate.has_access());
	}
}
