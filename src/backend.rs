// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Exclusion backend contract for SeqLock writers: any mutual-exclusion
// primitive exposing acquire / interruptible-acquire / release. The
// default backend is parking_lot's raw mutex.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::lock_api::RawMutex as RawMutexApi;

/// Error returned when an interruptible lock acquisition is abandoned.
///
/// Raised strictly before the acquisition completes: no lock state has
/// changed and the caller may retry or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("lock acquisition interrupted")]
pub struct Interrupted;

/// Cancellation token for interruptible lock acquisition.
///
/// Shared between the thread waiting in
/// [`acquire_interruptibly`](ExclusiveLock::acquire_interruptibly) and
/// whichever thread decides to cancel it. A flag that is already set when
/// the acquisition starts fails it immediately, even if the lock is free.
pub struct InterruptFlag {
    flag: AtomicBool,
}

impl InterruptFlag {
    /// Create a new, unset flag.
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    /// Set the flag, failing any in-flight or future interruptible
    /// acquisitions that observe it.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether the flag is set.
    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clear the flag so the token can be reused.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Default for InterruptFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// A mutual-exclusion primitive usable as the writer backend of a
/// [`SeqLock`](crate::SeqLock).
///
/// Reentrancy is whatever the implementation provides; the seqlock adds
/// none of its own. Neither of the backends shipped with this crate
/// ([`parking_lot::RawMutex`] and [`SpinMutex`](crate::SpinMutex)) is
/// reentrant.
pub trait ExclusiveLock {
    /// Block until exclusive ownership is obtained. Infallible.
    fn acquire(&self);

    /// Like [`acquire`](Self::acquire), but gives up with
    /// [`Interrupted`] if `interrupt` is set before ownership is
    /// obtained, leaving ownership state unchanged.
    fn acquire_interruptibly(&self, interrupt: &InterruptFlag) -> Result<(), Interrupted>;

    /// Relinquish ownership.
    ///
    /// # Safety
    /// The calling context must currently hold the lock. Releasing a
    /// lock that is not held is undefined behavior delegated to the
    /// implementation.
    unsafe fn release(&self);
}

/// Default backend: parking_lot's raw word lock.
///
/// The interruptible path degrades to a try-lock loop with adaptive
/// backoff, checking the flag each round, since the parked fast path has
/// no cancellation hook.
impl ExclusiveLock for parking_lot::RawMutex {
    fn acquire(&self) {
        RawMutexApi::lock(self);
    }

    fn acquire_interruptibly(&self, interrupt: &InterruptFlag) -> Result<(), Interrupted> {
        let mut k = 0u32;
        loop {
            if interrupt.is_interrupted() {
                return Err(Interrupted);
            }
            if RawMutexApi::try_lock(self) {
                return Ok(());
            }
            crate::spin_mutex::adaptive_yield_pub(&mut k);
        }
    }

    unsafe fn release(&self) {
        RawMutexApi::unlock(self);
    }
}
