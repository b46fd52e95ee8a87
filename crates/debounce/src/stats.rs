/// Lifetime counters of one [`SearchDebouncer`](crate::SearchDebouncer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
	/// Calls to `search`.
	pub scheduled: u64,
	/// Entries replaced by a newer `search` under the same key.
	pub superseded: u64,
	/// Entries removed by `cancel` or `clear`.
	pub cancelled: u64,
	/// Lookups that actually started after their window elapsed.
	pub started: u64,
	/// Results handed to their callback.
	pub delivered: u64,
	/// Results that arrived stale and were dropped.
	pub discarded: u64,
	/// Current lookups that returned an error or panicked.
	pub failed: u64,
}
