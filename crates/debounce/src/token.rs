use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Cooperative cancellation signal handed to a lookup.
///
/// The coordinator cancels it when the search that produced it is superseded,
/// cancelled, or torn down. Lookups that can stop early should race their work
/// against [`SearchToken::cancelled`] or wrap it in
/// [`SearchToken::run_until_cancelled`].
#[derive(Debug, Clone)]
pub struct SearchToken {
	generation: u64,
	cancel: CancellationToken,
}

impl SearchToken {
	pub(crate) fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	/// Creates a token that no coordinator owns.
	///
	/// Lets lookup code such as a catalog resolver run outside a debounced
	/// search. Its generation is 0, which the coordinator never assigns, and
	/// only [`SearchToken::cancel`] cancels it.
	pub fn detached() -> Self {
		Self::new(0)
	}

	/// Returns the generation of the search this token belongs to, or 0 for a
	/// detached token.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Returns true when cancellation is requested.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests cancellation.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}

	/// Runs `fut` to completion unless the token is cancelled first.
	///
	/// Returns `None` when cancellation won.
	pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
		tokio::select! {
			biased;
			_ = self.cancel.cancelled() => None,
			out = fut => Some(out),
		}
	}

	/// Creates a child token in the same generation.
	///
	/// Cancelling the parent cancels the child, not the other way round.
	pub fn child(&self) -> Self {
		Self {
			generation: self.generation,
			cancel: self.cancel.child_token(),
		}
	}
}
