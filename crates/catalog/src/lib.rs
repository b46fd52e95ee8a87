//! Catalog search for starlog.
//!
//! - [`provider`]: the [`SearchProvider`] boundary over external catalogs, and
//!   [`StaticCatalog`], an in-memory catalog loadable from JSON.
//! - [`store`]: the [`RecordStore`] boundary over the hosted data service,
//!   with [`MemoryStore`] and a provider adapter for community book search.
//! - [`similarity`]: normalization and fuzzy scoring of titles and authors.
//! - [`resolve`]: multi-source digital copy resolution.
//! - [`autocomplete`]: the search-as-you-type input, driven by a
//!   [`SearchDebouncer`](starlog_debounce::SearchDebouncer).

pub mod autocomplete;
pub mod candidate;
pub mod provider;
pub mod resolve;
pub mod similarity;
pub mod store;

pub use autocomplete::{Autocomplete, SuggestionState};
pub use candidate::{AccessLink, Candidate, CopyFormat};
pub use provider::{ProviderError, SearchProvider, StaticCatalog};
pub use resolve::{CopyQuery, DigitalCopyResolver, Resolution, ResolveError};
pub use store::{BookFilter, BookRecord, MemoryStore, NewBook, RecordId, RecordStore, StoreError, StoreSearchProvider};
