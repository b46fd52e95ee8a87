//! Multi-source digital copy resolution.
//!
//! Given a known book, ask each configured catalog in priority order for
//! readable copies and keep the candidate whose title and author best match.
//! A candidate at or above the accept threshold ends the search early;
//! otherwise the overall best is returned if it clears the minimum threshold.

use std::sync::Arc;

use starlog_config::ResolverConfig;
use starlog_debounce::SearchToken;
use thiserror::Error;
use tracing::{debug, warn};

use crate::candidate::Candidate;
use crate::provider::{ProviderError, SearchProvider};
use crate::similarity::match_score;

/// The book to find a copy of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyQuery {
	pub title: String,
	pub author: Option<String>,
}

impl CopyQuery {
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			author: None,
		}
	}

	pub fn by(mut self, author: impl Into<String>) -> Self {
		self.author = Some(author.into());
		self
	}

	/// Free text sent to providers: the title, followed by the author when known.
	pub fn search_text(&self) -> String {
		match self.author.as_deref().map(str::trim).filter(|author| !author.is_empty()) {
			Some(author) => format!("{} {author}", self.title.trim()),
			None => self.title.trim().to_string(),
		}
	}
}

/// A matched copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
	pub candidate: Candidate,
	/// Name of the provider that returned it.
	pub provider: String,
	pub score: f64,
}

/// Errors from [`DigitalCopyResolver::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("no catalog providers configured")]
	NoProviders,

	/// Every provider failed, so "no match" cannot be concluded.
	#[error("all {count} catalog providers failed; last error: {last}")]
	AllProvidersFailed {
		count: usize,
		#[source]
		last: ProviderError,
	},

	#[error("resolution cancelled")]
	Cancelled,
}

/// Resolves books to readable copies across several catalogs.
#[derive(Clone)]
pub struct DigitalCopyResolver {
	providers: Vec<Arc<dyn SearchProvider>>,
	config: ResolverConfig,
}

impl DigitalCopyResolver {
	pub fn new(config: ResolverConfig) -> Self {
		Self {
			providers: Vec::new(),
			config,
		}
	}

	/// Appends a provider; earlier providers take priority on ties.
	pub fn with_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
		self.providers.push(provider);
		self
	}

	pub fn provider_names(&self) -> impl Iterator<Item = &str> {
		self.providers.iter().map(|provider| provider.name())
	}

	/// Resolves `query` without external cancellation.
	pub async fn resolve(&self, query: &CopyQuery) -> Result<Option<Resolution>, ResolveError> {
		self.resolve_with(query, &SearchToken::detached()).await
	}

	/// Resolves `query`, stopping with [`ResolveError::Cancelled`] once `token`
	/// is cancelled.
	pub async fn resolve_with(&self, query: &CopyQuery, token: &SearchToken) -> Result<Option<Resolution>, ResolveError> {
		if self.providers.is_empty() {
			return Err(ResolveError::NoProviders);
		}

		let text = query.search_text();
		let mut best: Option<Resolution> = None;
		let mut failures = 0;
		let mut last_error = None;

		for provider in &self.providers {
			let Some(result) = token.run_until_cancelled(provider.search(&text, self.config.per_provider_limit)).await else {
				return Err(ResolveError::Cancelled);
			};
			let candidates = match result {
				Ok(candidates) => candidates,
				Err(error) => {
					warn!(provider = provider.name(), %error, "resolve.provider_failed");
					failures += 1;
					last_error = Some(error);
					continue;
				}
			};

			for candidate in candidates.into_iter().filter(Candidate::has_access) {
				let score = match_score(&query.title, query.author.as_deref(), &candidate);
				if best.as_ref().is_none_or(|best| score > best.score) {
					best = Some(Resolution {
						candidate,
						provider: provider.name().to_string(),
						score,
					});
				}
			}

			if let Some(found) = &best
				&& found.score >= self.config.accept_threshold
			{
				debug!(provider = %found.provider, score = found.score, title = %query.title, "resolve.accepted");
				return Ok(best);
			}
		}

		if failures == self.providers.len()
			&& let Some(last) = last_error
		{
			return Err(ResolveError::AllProvidersFailed { count: failures, last });
		}

		let best = best.filter(|best| best.score >= self.config.min_threshold);
		debug!(title = %query.title, matched = best.is_some(), "resolve.finished");
		Ok(best)
	}
}
