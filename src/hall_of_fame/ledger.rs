//! Bounded, loss-ordered ledger of model snapshots.
//!
//! Entries are keyed by `(loss, insertion sequence)` in a `BTreeMap`, so the
//! map is always in ascending-loss order and equal losses coexist: among
//! equal losses the earlier insertion ranks first and the later one is
//! evicted first.
use crate::hall_of_fame::errors::{HallOfFameError, HallOfFameResult};
use std::{cmp::Ordering, collections::BTreeMap};

/// Ordering key of a ledger entry.
#[derive(Debug, Clone, Copy)]
struct RankKey {
    loss: f64,
    seq: u64,
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.loss.total_cmp(&other.loss).then(self.seq.cmp(&other.seq))
    }
}

/// Outcome of [`HallOfFame::add`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// Stored without evicting anything (the ledger had room).
    Inserted,
    /// Stored; the previous worst entry with `evicted_loss` was dropped.
    Replaced { evicted_loss: f64 },
    /// Not stored: the ledger is full and `loss` is not below its worst
    /// entry, or `loss` is NaN.
    Rejected,
}

impl Admission {
    /// Whether the model made it into the ledger.
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Admission::Rejected)
    }
}

/// HallOfFame — fixed-capacity leaderboard of the lowest-loss snapshots.
///
/// Purpose
/// -------
/// Keep the best `capacity` models seen during training so the caller can
/// restore or ensemble them after the run.
///
/// Key behaviors
/// -------------
/// - [`add`](Self::add) stores an owned clone of the model when the ledger
///   has room or when `loss` is strictly below the current worst loss; the
///   worst entry is evicted when capacity would be exceeded.
/// - [`get`](Self::get) returns the snapshot at a rank (0 = lowest loss).
///
/// Invariants
/// ----------
/// - `len() <= capacity()` after every call.
/// - Iteration order is ascending in loss.
/// - Stored snapshots are owned by the ledger; mutating the caller's model
///   after `add` never changes a stored entry.
///
/// Notes
/// -----
/// - Single-writer structure; wrap it in a lock if several threads must add.
pub struct HallOfFame<M> {
    capacity: usize,
    entries: BTreeMap<RankKey, M>,
    next_seq: u64,
    #[cfg(feature = "obs_slog")]
    logger: Option<slog::Logger>,
}

impl<M> HallOfFame<M> {
    /// Create an empty ledger holding at most `capacity` entries.
    ///
    /// # Errors
    /// [`HallOfFameError::ZeroCapacity`] when `capacity == 0`.
    pub fn new(capacity: usize) -> HallOfFameResult<Self> {
        if capacity == 0 {
            return Err(HallOfFameError::ZeroCapacity);
        }
        Ok(HallOfFame {
            capacity,
            entries: BTreeMap::new(),
            next_seq: 0,
            #[cfg(feature = "obs_slog")]
            logger: None,
        })
    }

    /// Attach a logger; admissions and evictions are logged at debug level.
    #[cfg(feature = "obs_slog")]
    pub fn with_logger(mut self, logger: slog::Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Highest stored loss, i.e. the next entry to be evicted.
    pub fn worst_loss(&self) -> Option<f64> {
        self.entries.last_key_value().map(|(key, _)| key.loss)
    }

    /// Lowest stored loss and its snapshot.
    pub fn best(&self) -> Option<(f64, &M)> {
        self.entries.first_key_value().map(|(key, model)| (key.loss, model))
    }

    /// Stored losses in ascending order.
    pub fn losses(&self) -> Vec<f64> {
        self.entries.keys().map(|key| key.loss).collect()
    }

    /// `(loss, snapshot)` pairs in ascending-loss order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &M)> + '_ {
        self.entries.iter().map(|(key, model)| (key.loss, model))
    }

    /// Snapshot at rank `index` (0 = lowest loss).
    ///
    /// # Errors
    /// [`HallOfFameError::IndexOutOfRange`] when `index >= len()`.
    pub fn get(&self, index: usize) -> HallOfFameResult<&M> {
        self.entry(index).map(|(_, model)| model)
    }

    /// `(loss, snapshot)` at rank `index`.
    ///
    /// # Errors
    /// [`HallOfFameError::IndexOutOfRange`] when `index >= len()`.
    pub fn entry(&self, index: usize) -> HallOfFameResult<(f64, &M)> {
        self.iter()
            .nth(index)
            .ok_or(HallOfFameError::IndexOutOfRange { index, len: self.entries.len() })
    }

    /// Whether an entry with `loss` would be admitted right now.
    ///
    /// Lets callers skip building an expensive snapshot that would be
    /// rejected anyway.
    pub fn admits(&self, loss: f64) -> bool {
        if loss.is_nan() {
            return false;
        }
        self.entries.len() < self.capacity
            || self.worst_loss().is_some_and(|worst| loss < worst)
    }

    /// Store an owned snapshot under `loss`; see [`add`](Self::add) for the
    /// admission rule.
    pub fn insert(&mut self, model: M, loss: f64) -> Admission {
        self.admit_with(loss, move || model)
    }

    /// Consume the ledger, returning `(loss, snapshot)` in ascending order.
    pub fn into_vec(self) -> Vec<(f64, M)> {
        self.entries.into_iter().map(|(key, model)| (key.loss, model)).collect()
    }

    fn admit_with<F>(&mut self, loss: f64, snapshot: F) -> Admission
    where
        F: FnOnce() -> M,
    {
        if !self.admits(loss) {
            return Admission::Rejected;
        }

        let key = RankKey { loss, seq: self.next_seq };
        self.next_seq += 1;
        self.entries.insert(key, snapshot());

        #[cfg(feature = "obs_slog")]
        if let Some(log) = &self.logger {
            slog::debug!(log, "hall of fame: admitted"; "loss" => loss, "len" => self.entries.len());
        }

        if self.entries.len() > self.capacity {
            if let Some((evicted, _)) = self.entries.pop_last() {
                #[cfg(feature = "obs_slog")]
                if let Some(log) = &self.logger {
                    slog::debug!(log, "hall of fame: evicted"; "loss" => evicted.loss);
                }
                return Admission::Replaced { evicted_loss: evicted.loss };
            }
        }
        Admission::Inserted
    }
}

impl<M: Clone> HallOfFame<M> {
    /// Offer `model` with its `loss`.
    ///
    /// A clone of `model` is stored when the ledger is not yet full, or when
    /// `loss` is strictly less than the current worst loss; in the latter case
    /// the worst entry is evicted. The clone is only taken on admission.
    ///
    /// NaN losses are always rejected.
    ///
    /// # Examples
    /// ```rust
    /// use rust_sinn::hall_of_fame::{Admission, HallOfFame};
    ///
    /// let mut hof = HallOfFame::new(2).unwrap();
    /// hof.add(&"a", 5.0);
    /// hof.add(&"b", 3.0);
    /// assert_eq!(hof.add(&"c", 10.0), Admission::Rejected);
    /// assert_eq!(hof.add(&"d", 1.0), Admission::Replaced { evicted_loss: 5.0 });
    /// assert_eq!(*hof.get(0).unwrap(), "d");
    /// ```
    pub fn add(&mut self, model: &M, loss: f64) -> Admission {
        self.admit_with(loss, || model.clone())
    }
}

impl<M: Clone> Clone for HallOfFame<M> {
    fn clone(&self) -> Self {
        HallOfFame {
            capacity: self.capacity,
            entries: self.entries.clone(),
            next_seq: self.next_seq,
            #[cfg(feature = "obs_slog")]
            logger: self.logger.clone(),
        }
    }
}

impl<M> std::fmt::Debug for HallOfFame<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HallOfFame")
            .field("capacity", &self.capacity)
            .field("losses", &self.losses())
            .finish()
    }
}

impl<M> std::ops::Index<usize> for HallOfFame<M> {
    type Output = M;

    /// Panics when `index >= len()`, like slice indexing; use
    /// [`HallOfFame::get`] for a fallible lookup.
    fn index(&self, index: usize) -> &M {
        match self.get(index) {
            Ok(model) => model,
            Err(err) => panic!("{err}"),
        }
    }
}
