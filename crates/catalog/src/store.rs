//! Record store boundary over the hosted data service.
//!
//! The application keeps its shared book records remotely. This module fixes
//! the boundary ([`RecordStore`]) and provides [`MemoryStore`] for tests and
//! offline use, plus [`StoreSearchProvider`] which exposes a store as a
//! [`SearchProvider`] for community book search.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candidate::Candidate;
use crate::provider::{ProviderError, SearchProvider};
use crate::similarity::normalize;

/// Identifier of a stored book record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A stored book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
	pub id: RecordId,
	pub title: String,
	pub author: Option<String>,
	pub year: Option<i32>,
}

/// Fields of a book to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
	pub title: String,
	pub author: Option<String>,
	pub year: Option<i32>,
}

/// Simple list filter. Text filters match case-insensitively on normalized text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
	pub title_contains: Option<String>,
	pub author_contains: Option<String>,
	pub limit: Option<usize>,
}

/// Errors raised by a [`RecordStore`].
#[derive(Debug, Error)]
pub enum StoreError {
	/// No record has the given id.
	#[error("record {0} not found")]
	NotFound(RecordId),

	/// The record was rejected.
	#[error("validation failed: {0}")]
	Validation(String),

	/// The remote service failed.
	#[error("record store unavailable: {0}")]
	Unavailable(String),
}

/// Create/read/update/delete and filtered listing of book records.
#[async_trait]
pub trait RecordStore: Send + Sync {
	async fn create(&self, book: NewBook) -> Result<BookRecord, StoreError>;

	async fn get(&self, id: RecordId) -> Result<BookRecord, StoreError>;

	/// Replaces the record with the same id.
	async fn update(&self, record: BookRecord) -> Result<BookRecord, StoreError>;

	async fn delete(&self, id: RecordId) -> Result<(), StoreError>;

	/// Lists records matching `filter`, ordered by id.
	async fn list(&self, filter: &BookFilter) -> Result<Vec<BookRecord>, StoreError>;
}

fn validate(title: &str, author: Option<&str>) -> Result<(), StoreError> {
	if title.trim().is_empty() {
		return Err(StoreError::Validation("title must not be empty".into()));
	}
	if author.is_some_and(|author| author.trim().is_empty()) {
		return Err(StoreError::Validation("author must not be blank when present".into()));
	}
	Ok(())
}

impl BookFilter {
	/// Returns true if `record` passes the text filters.
	pub fn matches(&self, record: &BookRecord) -> bool {
		let contains = |needle: &Option<String>, haystack: Option<&str>| -> bool {
			match needle {
				None => true,
				Some(needle) => haystack.is_some_and(|haystack| normalize(haystack).contains(&normalize(needle))),
			}
		};
		contains(&self.title_contains, Some(&record.title)) && contains(&self.author_contains, record.author.as_deref())
	}
}

/// In-memory [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
	next_id: AtomicU64,
	records: RwLock<BTreeMap<RecordId, BookRecord>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl RecordStore for MemoryStore {
	async fn create(&self, book: NewBook) -> Result<BookRecord, StoreError> {
		validate(&book.title, book.author.as_deref())?;
		let id = RecordId(self.next_id.fetch_add(1, Ordering::AcqRel).wrapping_add(1));
		let record = BookRecord {
			id,
			title: book.title,
			author: book.author,
			year: book.year,
		};
		self.records.write().insert(id, record.clone());
		Ok(record)
	}

	async fn get(&self, id: RecordId) -> Result<BookRecord, StoreError> {
		self.records.read().get(&id).cloned().ok_or(StoreError::NotFound(id))
	}

	async fn update(&self, record: BookRecord) -> Result<BookRecord, StoreError> {
		validate(&record.title, record.author.as_deref())?;
		let mut records = self.records.write();
		let Some(slot) = records.get_mut(&record.id) else {
			return Err(StoreError::NotFound(record.id));
		};
		*slot = record.clone();
		Ok(record)
	}

	async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
		self.records.write().remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
	}

	async fn list(&self, filter: &BookFilter) -> Result<Vec<BookRecord>, StoreError> {
		let records = self.records.read();
		let matching = records.values().filter(|record| filter.matches(record)).cloned();
		Ok(match filter.limit {
			Some(limit) => matching.take(limit).collect(),
			None => matching.collect(),
		})
	}
}

/// Exposes a [`RecordStore`] as a title [`SearchProvider`].
///
/// Community records carry no access links, so hits are suggestions only.
#[derive(Clone)]
pub struct StoreSearchProvider {
	name: String,
	store: Arc<dyn RecordStore>,
}

impl StoreSearchProvider {
	pub fn new(name: impl Into<String>, store: Arc<dyn RecordStore>) -> Self {
		Self { name: name.into(), store }
	}
}

#[async_trait]
impl SearchProvider for StoreSearchProvider {
	fn name(&self) -> &str {
		&self.name
	}

	async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ProviderError> {
		let filter = BookFilter {
			title_contains: Some(query.to_string()),
			limit: Some(limit),
			..BookFilter::default()
		};
		let records = self.store.list(&filter).await?;
		Ok(records
			.into_iter()
			.map(|record| Candidate {
				title: record.title,
				authors: record.author.into_iter().collect(),
				source: self.name.clone(),
				year: record.year,
				links: Vec::new(),
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn book(title: &str, author: &str) -> NewBook {
		NewBook {
			title: title.into(),
			author: Some(author.into()),
			year: None,
		}
	}

	#[tokio::test]
	async fn crud_round_trip() {
		let store = MemoryStore::new();
		let created = store.create(book("Solaris", "Stanislaw Lem")).await.unwrap();
		assert_eq!(created.id, RecordId(1));
		assert_eq!(store.get(created.id).await.unwrap(), created);

		let updated = store
			.update(BookRecord {
				year: Some(1961),
				..created.clone()
			})
			.await
			.unwrap();
		assert_eq!(store.get(created.id).await.unwrap().year, Some(1961));
		assert_eq!(updated.year, Some(1961));

		store.delete(created.id).await.unwrap();
		assert!(matches!(store.get(created.id).await, Err(StoreError::NotFound(id)) if id == created.id));
		assert!(matches!(store.delete(created.id).await, Err(StoreError::NotFound(_))));
	}

	#[tokio::test]
	async fn rejects_invalid_records() {
		let store = MemoryStore::new();
		assert!(matches!(store.create(book("  ", "Lem")).await, Err(StoreError::Validation(_))));
		assert!(matches!(store.create(book("Solaris", " ")).await, Err(StoreError::Validation(_))));

		let missing = BookRecord {
			id: RecordId(99),
			title: "Eden".into(),
			author: None,
			year: None,
		};
		assert!(matches!(store.update(missing).await, Err(StoreError::NotFound(RecordId(99)))));
	}

	#[tokio::test]
	async fn list_filters_and_limits() {
		let store = MemoryStore::new();
		store.create(book("The Cyberiad", "Stanislaw Lem")).await.unwrap();
		store.create(book("Solaris", "Stanislaw Lem")).await.unwrap();
		store.create(book("Roadside Picnic", "Strugatsky")).await.unwrap();

		let by_lem = store
			.list(&BookFilter {
				author_contains: Some("lem".into()),
				..BookFilter::default()
			})
			.await
			.unwrap();
		assert_eq!(by_lem.len(), 2);

		let limited = store
			.list(&BookFilter {
				limit: Some(1),
				..BookFilter::default()
			})
			.await
			.unwrap();
		assert_eq!(limited[0].title, "The Cyberiad");
	}

	#[tokio::test]
	async fn store_provider_maps_records_to_candidates() {
		let store = Arc::new(MemoryStore::new());
		store.create(book("Roadside Picnic", "Strugatsky")).await.unwrap();
		let provider = StoreSearchProvider::new("community", store);

		let hits = provider.search("picnic", 5).await.unwrap();
		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].source, "community");
		assert_eq!(hits[0].primary_author(), Some("Strugatsky"));
		assert!(!hits[0].has_access());
	}
}
