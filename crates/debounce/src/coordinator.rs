//! The search debounce coordinator.
//!
//! [`SearchDebouncer`] owns a map from [`SearchKey`] to one pending entry.
//! Scheduling under a key replaces its entry; the replaced entry's timer task
//! is aborted while still scheduled, or detached and its result ignored once
//! its lookup has started.
//!
//! # Generations
//!
//! Each `search` call draws a fresh generation from a coordinator-wide clock
//! and the spawned task captures it. When the task wakes or its lookup
//! resolves, it compares its generation with the entry currently stored for
//! its key; any mismatch (or a missing entry) means the call was superseded or
//! cancelled and the task drops its work silently.
//!
//! # Locking
//!
//! State lives behind a re-entrant lock that is never held across an
//! `.await`. Delivery holds it from the generation check through the result
//! callback, so no other thread can cancel or supersede the key in between.
//! The callback may call back into the coordinator from the same thread.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::FutureExt;
use parking_lot::ReentrantMutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::key::SearchKey;
use crate::spawn::spawn;
use crate::stats::DebounceStats;
use crate::token::SearchToken;

/// Default quiet period before a scheduled lookup starts.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Observable phase of a pending search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
	/// Waiting for the debounce window to elapse.
	Scheduled,
	/// Lookup running.
	InFlight,
}

/// One active search under a key.
#[derive(Debug)]
struct PendingSearch {
	generation: u64,
	phase: SearchPhase,
	/// Timer task, present only while [`SearchPhase::Scheduled`].
	timer: Option<JoinHandle<()>>,
	token: SearchToken,
}

impl PendingSearch {
	/// Invalidates this entry: clears its timer and signals its lookup.
	fn retire(self) {
		if let Some(timer) = self.timer {
			timer.abort();
		}
		self.token.cancel();
	}
}

#[derive(Debug, Default)]
struct State {
	entries: HashMap<SearchKey, PendingSearch>,
	stats: DebounceStats,
}

struct Inner {
	default_delay: Duration,
	/// Last generation handed out, shared by every key.
	generation: AtomicU64,
	state: ReentrantMutex<RefCell<State>>,
}

impl Drop for Inner {
	fn drop(&mut self) {
		let state = self.state.get_mut().get_mut();
		for (_, entry) in state.entries.drain() {
			entry.retire();
		}
	}
}

/// Debounced, cancelable search coordinator.
///
/// Cloning yields another handle to the same coordinator. Dropping the last
/// handle tears it down: pending timers are aborted, tokens cancelled, and
/// lookups still in flight deliver nothing.
#[derive(Clone)]
pub struct SearchDebouncer {
	inner: Arc<Inner>,
}

impl Default for SearchDebouncer {
	fn default() -> Self {
		Self::new(DEFAULT_DEBOUNCE)
	}
}

impl fmt::Debug for SearchDebouncer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SearchDebouncer")
			.field("default_delay", &self.inner.default_delay)
			.field("pending", &self.len())
			.finish()
	}
}

impl SearchDebouncer {
	/// Creates a coordinator whose `search` waits `default_delay`.
	pub fn new(default_delay: Duration) -> Self {
		Self {
			inner: Arc::new(Inner {
				default_delay,
				generation: AtomicU64::new(0),
				state: ReentrantMutex::new(RefCell::new(State::default())),
			}),
		}
	}

	/// Returns the window used by [`Self::search`].
	pub fn default_delay(&self) -> Duration {
		self.inner.default_delay
	}

	/// Schedules `lookup` under `key` after the default delay.
	///
	/// See [`Self::search_with_delay`].
	pub fn search<T, E, L, Fut, R>(&self, key: impl Into<SearchKey>, lookup: L, on_result: R) -> u64
	where
		T: Send + 'static,
		E: fmt::Display + Send + 'static,
		L: FnOnce(SearchToken) -> Fut + Send + 'static,
		Fut: Future<Output = Result<T, E>> + Send + 'static,
		R: FnOnce(T) + Send + 'static,
	{
		self.search_with_delay(key, self.inner.default_delay, lookup, on_result)
	}

	/// Schedules `lookup` under `key` once `delay` passes without another
	/// search for the same key.
	///
	/// Any pending or in-flight search for `key` is invalidated first.
	/// `on_result` runs at most once, and only if this call is still the latest
	/// for `key` when the lookup resolves. An `Err` or panic from the lookup is
	/// logged and never reaches `on_result`.
	///
	/// Returns the generation assigned to this call.
	pub fn search_with_delay<T, E, L, Fut, R>(&self, key: impl Into<SearchKey>, delay: Duration, lookup: L, on_result: R) -> u64
	where
		T: Send + 'static,
		E: fmt::Display + Send + 'static,
		L: FnOnce(SearchToken) -> Fut + Send + 'static,
		Fut: Future<Output = Result<T, E>> + Send + 'static,
		R: FnOnce(T) + Send + 'static,
	{
		let key = key.into();
		let generation = self.inner.next_generation();
		let token = SearchToken::new(generation);

		let guard = self.inner.state.lock();
		let mut state = guard.borrow_mut();
		let state = &mut *state;

		if let Some(previous) = state.entries.remove(&key) {
			state.stats.superseded += 1;
			trace!(key = %key, previous = previous.generation, generation, phase = ?previous.phase, "debounce.supersede");
			previous.retire();
		}

		let task = spawn(run_search(Arc::downgrade(&self.inner), key.clone(), generation, delay, token.clone(), lookup, on_result));
		trace!(key = %key, generation, delay_ms = delay.as_millis() as u64, "debounce.schedule");
		state.entries.insert(
			key,
			PendingSearch {
				generation,
				phase: SearchPhase::Scheduled,
				timer: Some(task),
				token,
			},
		);
		state.stats.scheduled += 1;
		generation
	}

	/// Cancels the search under `key`, if any.
	///
	/// A scheduled lookup never starts; an in-flight lookup has its token
	/// cancelled and its result discarded. Returns whether an entry existed.
	pub fn cancel(&self, key: impl AsRef<str>) -> bool {
		let key = key.as_ref();
		let guard = self.inner.state.lock();
		let mut state = guard.borrow_mut();
		let Some(entry) = state.entries.remove(key) else {
			return false;
		};
		state.stats.cancelled += 1;
		trace!(key, generation = entry.generation, phase = ?entry.phase, "debounce.cancel");
		entry.retire();
		true
	}

	/// Cancels every pending and in-flight search. Returns how many there were.
	pub fn clear(&self) -> usize {
		let guard = self.inner.state.lock();
		let mut state = guard.borrow_mut();
		let entries: Vec<_> = state.entries.drain().map(|(_, entry)| entry).collect();
		let count = entries.len();
		state.stats.cancelled += count as u64;
		for entry in entries {
			entry.retire();
		}
		if count > 0 {
			debug!(count, "debounce.clear");
		}
		count
	}

	/// Returns the phase of the search under `key`, or `None` when idle.
	pub fn phase(&self, key: impl AsRef<str>) -> Option<SearchPhase> {
		let guard = self.inner.state.lock();
		let state = guard.borrow();
		state.entries.get(key.as_ref()).map(|entry| entry.phase)
	}

	/// Returns true if a search under `key` is scheduled or in flight.
	pub fn is_pending(&self, key: impl AsRef<str>) -> bool {
		self.phase(key).is_some()
	}

	/// Returns the number of keys with a scheduled or in-flight search.
	pub fn len(&self) -> usize {
		let guard = self.inner.state.lock();
		let state = guard.borrow();
		state.entries.len()
	}

	/// Returns true if no search is pending.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns a snapshot of the lifetime counters.
	pub fn stats(&self) -> DebounceStats {
		let guard = self.inner.state.lock();
		let state = guard.borrow();
		state.stats
	}
}

impl Inner {
	/// Draws the next generation, starting at 1; 0 marks detached tokens.
	fn next_generation(&self) -> u64 {
		self.generation.fetch_add(1, Ordering::AcqRel) + 1
	}

	/// Moves the entry for `key` to [`SearchPhase::InFlight`] if it still
	/// belongs to `generation`.
	fn begin(&self, key: &SearchKey, generation: u64) -> bool {
		let guard = self.state.lock();
		let mut state = guard.borrow_mut();
		let state = &mut *state;
		let Some(entry) = state.entries.get_mut(key).filter(|entry| entry.generation == generation) else {
			return false;
		};
		entry.phase = SearchPhase::InFlight;
		// Detach the timer: from here on supersession only ignores the result.
		entry.timer = None;
		state.stats.started += 1;
		trace!(key = %key, generation, "debounce.start");
		true
	}

	/// Delivers or discards the outcome of the lookup for `generation`.
	fn finish<T, E, R>(&self, key: &SearchKey, generation: u64, outcome: Result<Result<T, E>, Box<dyn Any + Send>>, on_result: R)
	where
		E: fmt::Display,
		R: FnOnce(T),
	{
		let guard = self.state.lock();
		let value = {
			let mut state = guard.borrow_mut();
			let state = &mut *state;
			if !state.entries.get(key).is_some_and(|entry| entry.generation == generation) {
				state.stats.discarded += 1;
				debug!(key = %key, generation, "debounce.discard");
				return;
			}
			state.entries.remove(key);
			match outcome {
				Ok(Ok(value)) => {
					state.stats.delivered += 1;
					value
				}
				Ok(Err(error)) => {
					state.stats.failed += 1;
					debug!(key = %key, generation, %error, "debounce.lookup_failed");
					return;
				}
				Err(payload) => {
					state.stats.failed += 1;
					debug!(key = %key, generation, panic = panic_message(payload.as_ref()), "debounce.lookup_panicked");
					return;
				}
			}
		};
		trace!(key = %key, generation, "debounce.deliver");
		on_result(value);
		drop(guard);
	}
}

async fn run_search<T, E, L, Fut, R>(inner: Weak<Inner>, key: SearchKey, generation: u64, delay: Duration, token: SearchToken, lookup: L, on_result: R)
where
	E: fmt::Display,
	L: FnOnce(SearchToken) -> Fut,
	Fut: Future<Output = Result<T, E>>,
	R: FnOnce(T),
{
	tokio::time::sleep(delay).await;

	{
		let Some(inner) = inner.upgrade() else {
			return;
		};
		if !inner.begin(&key, generation) {
			return;
		}
	}

	let outcome = AssertUnwindSafe(async move { lookup(token).await }).catch_unwind().await;

	let Some(inner) = inner.upgrade() else {
		trace!(key = %key, generation, "debounce.orphaned");
		return;
	};
	inner.finish(&key, generation, outcome, on_result);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		*msg
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.as_str()
	} else {
		"<non-string panic payload>"
	}
}
