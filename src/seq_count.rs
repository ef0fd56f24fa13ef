// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Sequence counter: a single atomic word whose parity encodes
// "write in progress". Even = no writer, odd = a writer holds the
// exclusion backend. Exactly two bumps per write critical section.

use std::sync::atomic::{AtomicU64, Ordering};

/// The sequence counter at the heart of a [`SeqLock`](crate::SeqLock).
///
/// A 64-bit counter wide enough that wraparound is not a practical
/// concern. Readers load it before and after reading the protected
/// payload; writers bump it on critical-section entry (even → odd) and
/// exit (odd → even).
pub struct SeqCount {
    status: AtomicU64,
}

impl SeqCount {
    /// Create a new counter, initialized to 0 (even = unlocked).
    pub const fn new() -> Self {
        Self {
            status: AtomicU64::new(0),
        }
    }

    /// Current counter value.
    ///
    /// Acquire ordering: payload reads issued after this load cannot be
    /// reordered before it.
    #[inline]
    pub fn load(&self) -> u64 {
        self.status.load(Ordering::Acquire)
    }

    /// Increment the counter by one.
    ///
    /// AcqRel: the acquire half keeps the writer's payload stores from
    /// floating above the entry bump, the release half keeps them from
    /// sinking below the exit bump. Only called while the exclusion
    /// backend is held, so bumps never race each other.
    #[inline]
    pub fn bump(&self) {
        self.status.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for SeqCount {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the sequence counter taken by
/// [`read_begin`](crate::SeqLock::read_begin) or
/// [`read_begin_spin`](crate::SeqLock::read_begin_spin).
///
/// Opaque beyond equality: pass it back into
/// [`check_read`](crate::SeqLock::check_read) /
/// [`read_retry`](crate::SeqLock::read_retry) on the lock instance it
/// came from. A ticket carried across lock instances validates garbage.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReadTicket(pub(crate) u64);
