//! hall_of_fame — bounded leaderboard of the best models seen in training.
//!
//! Purpose
//! -------
//! Track the lowest-loss model snapshots produced by an external training
//! loop, evicting the worst one once capacity is reached.
//!
//! Key behaviors
//! -------------
//! - [`HallOfFame::add`] stores an owned clone of a model under its loss if
//!   the ledger has room or the loss beats the current worst entry.
//! - [`HallOfFame::get`] looks a snapshot up by rank (0 = best).
//! - [`Admission`] tells the caller whether the model was stored and which
//!   loss, if any, was evicted.
//!
//! Invariants & assumptions
//! ------------------------
//! - `len() <= capacity()` after every public call.
//! - Entries are always ordered by ascending loss; equal losses are ordered
//!   by insertion (earlier first) and the later one is evicted first.
//! - The snapshot type only needs `Clone`; the ledger never inspects it.
//!
//! Conventions
//! -----------
//! - Ranks are 0-based; out-of-range lookups return
//!   [`HallOfFameError::IndexOutOfRange`].
//! - No persistence: serialise the snapshots yourself if needed.
pub mod errors;
pub mod ledger;

pub use self::errors::{HallOfFameError, HallOfFameResult};
pub use self::ledger::{Admission, HallOfFame};
