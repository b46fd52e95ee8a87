//! Search-as-you-type input state.
//!
//! An [`Autocomplete`] is one input box (book title, author, community
//! search). Each keystroke goes through [`Autocomplete::input`], which hands
//! the lookup to a shared [`SearchDebouncer`] so that bursts of typing issue at
//! most one provider call per quiet period and stale provider responses never
//! overwrite fresher suggestions.

use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use starlog_config::{KeyStrategy, SearchConfig};
use starlog_debounce::{SearchDebouncer, SearchKey};
use tracing::debug;

use crate::candidate::Candidate;
use crate::provider::SearchProvider;

/// What the input box currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
	/// Text in the box.
	pub query: String,
	pub suggestions: Vec<Candidate>,
	/// A lookup is scheduled or running.
	pub loading: bool,
}

/// One autocomplete input box.
pub struct Autocomplete {
	name: SearchKey,
	debouncer: SearchDebouncer,
	provider: Arc<dyn SearchProvider>,
	config: SearchConfig,
	state: Arc<Mutex<SuggestionState>>,
	/// Keys with a search that may still deliver; settled keys are pruned on
	/// the next input.
	issued: Mutex<HashSet<SearchKey>>,
}

impl fmt::Debug for Autocomplete {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Autocomplete")
			.field("name", &self.name)
			.field("provider", &self.provider.name())
			.field("state", &*self.state.lock())
			.finish()
	}
}

impl Autocomplete {
	/// Creates an input box identified by `name`.
	///
	/// `name` must be unique among boxes sharing `debouncer`.
	pub fn new(name: impl Into<SearchKey>, debouncer: SearchDebouncer, provider: Arc<dyn SearchProvider>, config: SearchConfig) -> Self {
		Self {
			name: name.into(),
			debouncer,
			provider,
			config,
			state: Arc::default(),
			issued: Mutex::default(),
		}
	}

	pub fn name(&self) -> &SearchKey {
		&self.name
	}

	/// Returns the debounce key used for `query`.
	pub fn key_for(&self, query: &str) -> SearchKey {
		match self.config.key_strategy {
			KeyStrategy::PerBox => self.name.clone(),
			KeyStrategy::PerQuery => SearchKey::scoped(self.name.as_str(), query),
		}
	}

	/// Handles new text in the box.
	///
	/// Short queries clear the suggestions; anything else schedules a
	/// debounced provider lookup.
	pub fn input(&self, query: &str) {
		let trimmed = query.trim();
		self.state.lock().query = query.to_string();

		if trimmed.chars().count() < self.config.min_query_chars {
			self.cancel_issued();
			let mut state = self.state.lock();
			state.suggestions.clear();
			state.loading = false;
			return;
		}

		self.state.lock().loading = true;
		let key = self.key_for(trimmed);
		self.track(key.clone());

		let provider = self.provider.clone();
		let limit = self.config.suggestion_limit;
		let text = trimmed.to_string();
		let state = self.state.clone();
		self.debouncer.search(
			key,
			move |token| async move {
				let suggestions = match token.run_until_cancelled(provider.search(&text, limit)).await {
					Some(Ok(found)) => found,
					Some(Err(error)) => {
						debug!(provider = provider.name(), query = %text, %error, "autocomplete.provider_failed");
						Vec::new()
					}
					None => Vec::new(),
				};
				Ok::<_, Infallible>(suggestions)
			},
			move |suggestions| {
				let mut state = state.lock();
				state.suggestions = suggestions;
				state.loading = false;
			},
		);
	}

	/// Picks the suggestion at `index` and closes the list.
	///
	/// Any search still pending for this box is cancelled, so its results can
	/// never reopen the list.
	pub fn select(&self, index: usize) -> Option<Candidate> {
		self.cancel_issued();
		let mut state = self.state.lock();
		let chosen = state.suggestions.get(index).cloned();
		if let Some(candidate) = &chosen {
			state.query = candidate.title.clone();
		}
		state.suggestions.clear();
		state.loading = false;
		chosen
	}

	/// Closes the list without selecting.
	pub fn dismiss(&self) {
		self.cancel_issued();
		let mut state = self.state.lock();
		state.suggestions.clear();
		state.loading = false;
	}

	pub fn snapshot(&self) -> SuggestionState {
		self.state.lock().clone()
	}

	/// Remembers `key` and forgets keys whose searches have settled.
	fn track(&self, key: SearchKey) {
		let mut issued = self.issued.lock();
		issued.retain(|earlier| self.debouncer.is_pending(earlier));
		issued.insert(key);
	}

	fn cancel_issued(&self) {
		for key in self.issued.lock().drain() {
			self.debouncer.cancel(&key);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use crate::provider::StaticCatalog;

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn settled_per_query_keys_are_forgotten() {
		let catalog = StaticCatalog::new("shelf", vec![Candidate::new("Dune").with_author("Frank Herbert")]);
		let debouncer = SearchDebouncer::default();
		let config = SearchConfig {
			key_strategy: KeyStrategy::PerQuery,
			..SearchConfig::default()
		};
		let input = Autocomplete::new("book-search", debouncer.clone(), Arc::new(catalog), config);

		for n in 0..200 {
			input.input(&format!("query {n}"));
			tokio::time::sleep(Duration::from_millis(400)).await;
		}
		assert!(debouncer.is_empty());
		assert_eq!(input.issued.lock().len(), 1);

		input.input("dune one");
		input.input("dune two");
		assert_eq!(input.issued.lock().len(), 2);
		input.dismiss();
		assert!(input.issued.lock().is_empty());
		assert!(debouncer.is_empty());
	}
}
