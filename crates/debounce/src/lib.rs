//! Debounced, cancelable search coordination.
//!
//! Every autocomplete input funnels its lookups through one
//! [`SearchDebouncer`]. Rapid repeated requests under the same [`SearchKey`]
//! collapse into at most one lookup per quiet period, and only the most
//! recently scheduled lookup for a key ever reaches its result callback, no
//! matter in which order the underlying network calls resolve.
//!
//! # Lifecycle of a key
//!
//! ```text
//! Idle --search()--> Scheduled --timer--> InFlight --resolved, current--> Idle
//!                        |                    |
//!                        +--search()/cancel()-+--> Idle (old result discarded)
//! ```
//!
//! A scheduled entry that is superseded never starts its lookup. An in-flight
//! lookup is not aborted; its [`SearchToken`] is cancelled and its eventual
//! result is dropped on arrival.

mod coordinator;
mod key;
mod spawn;
mod stats;
mod token;

pub use coordinator::{DEFAULT_DEBOUNCE, SearchDebouncer, SearchPhase};
pub use key::SearchKey;
pub use stats::DebounceStats;
pub use token::SearchToken;
