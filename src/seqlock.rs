// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Sequence lock: optimistic non-blocking readers validated against a
// sequence counter, writers serialized through an exclusion backend.
//
// Writer path: acquire backend, bump (even → odd), mutate payload,
// bump (odd → even), release backend. The asymmetry is load-bearing:
// acquire-then-bump on entry means no reader can observe "backend held
// but counter even"; bump-then-release on exit means no reader can
// observe "counter even but backend held".

use std::marker::PhantomData;
use std::sync::atomic::{fence, Ordering};

use parking_lot::lock_api::RawMutex as RawMutexApi;

use crate::backend::{ExclusiveLock, InterruptFlag, Interrupted};
use crate::seq_count::{ReadTicket, SeqCount};

/// A sequence lock.
///
/// Readers never block and never starve writers: they sample the
/// sequence counter, read the (externally owned) payload, then validate
/// the sample. A failed validation means a writer ran concurrently and
/// the whole read must be redone — partially read data must not be
/// trusted, since a concurrent write can leave the payload in any
/// intermediate state.
///
/// Writers are serialized through an [`ExclusiveLock`] backend, by
/// default parking_lot's raw mutex. The backend is default-constructed
/// by [`new`](SeqLock::new) or injected via
/// [`with_lock`](SeqLock::with_lock).
///
/// # Examples
///
/// A writer updates the payload under a scoped guard; a reader loops
/// until it gets a validated snapshot:
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use libseq::SeqLock;
///
/// let lock = SeqLock::new();
/// let value = AtomicU64::new(0);
///
/// {
///     let _write = lock.lock_write();
///     value.store(42, Ordering::Relaxed);
/// }
///
/// let snapshot = loop {
///     let ticket = lock.read_begin();
///     let v = value.load(Ordering::Relaxed);
///     if lock.check_read(ticket) {
///         break v;
///     }
/// };
/// assert_eq!(snapshot, 42);
/// ```
pub struct SeqLock<L = parking_lot::RawMutex> {
    status: SeqCount,
    write_lock: L,
}

impl SeqLock {
    /// Create a new seqlock over a default-constructed
    /// `parking_lot::RawMutex` backend.
    pub const fn new() -> Self {
        Self::with_lock(<parking_lot::RawMutex as RawMutexApi>::INIT)
    }
}

impl Default for SeqLock {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> SeqLock<L> {
    /// Create a new seqlock over a caller-supplied exclusion backend.
    ///
    /// The seqlock takes sole responsibility for invoking the backend;
    /// sharing it with unrelated lock/unlock traffic breaks the counter
    /// parity invariant.
    pub const fn with_lock(write_lock: L) -> Self {
        Self {
            status: SeqCount::new(),
            write_lock,
        }
    }

    /// Current raw sequence value (for diagnostics).
    ///
    /// Odd means a write is in progress.
    pub fn sequence(&self) -> u64 {
        self.status.load()
    }

    /// Begin a read by busy-spinning until no write is in progress.
    ///
    /// Pure CPU spin; never touches the backend. Appropriate only when
    /// writers hold the lock for extremely short stretches — a writer
    /// that never unlocks spins this forever, and that liveness hazard
    /// is the caller's to avoid.
    pub fn read_begin_spin(&self) -> ReadTicket {
        loop {
            let current = self.status.load();
            if current & 1 == 0 {
                return ReadTicket(current);
            }
            std::hint::spin_loop();
        }
    }

    /// Validate a read window opened by [`read_begin`](Self::read_begin)
    /// or [`read_begin_spin`](Self::read_begin_spin).
    ///
    /// `true` means every payload read between ticket issue and this
    /// call saw a consistent state. `false` means the window raced a
    /// write: discard everything read since the ticket and start over.
    #[inline]
    pub fn check_read(&self, ticket: ReadTicket) -> bool {
        // The fence orders the caller's payload loads before the
        // validation load; without it a payload load could drift past
        // the re-check and a torn read could validate.
        fence(Ordering::Acquire);
        ticket.0 == self.status.load()
    }

    /// Same as `!check_read(ticket)`.
    ///
    /// Separate entry point for call sites that want to `continue` a
    /// retry loop partway through an expensive read; purely an
    /// optimization, no additional guarantee.
    #[inline]
    pub fn read_retry(&self, ticket: ReadTicket) -> bool {
        !self.check_read(ticket)
    }
}

impl<L: ExclusiveLock> SeqLock<L> {
    /// Begin a read, parking on the backend instead of spinning while a
    /// write is in progress.
    ///
    /// If the counter is odd, the calling thread acquires and
    /// immediately releases the write backend — it gains no exclusivity,
    /// it just sleeps until the writer is done — and retries. Trades
    /// read latency for CPU time; prefer this whenever the backend
    /// blocks efficiently.
    pub fn read_begin(&self) -> ReadTicket {
        loop {
            let current = self.status.load();
            if current & 1 == 0 {
                return ReadTicket(current);
            }
            tracing::trace!("write in progress, parking reader on write lock");
            self.write_lock.acquire();
            // Safety: acquired on the line above.
            unsafe { self.write_lock.release() };
        }
    }

    /// Acquire exclusive write access: backend first, then counter bump.
    ///
    /// Blocks for as long as the backend blocks. Every call must be
    /// paired with exactly one [`write_unlock`](Self::write_unlock);
    /// prefer [`lock_write`](Self::lock_write), whose guard cannot leak
    /// the counter odd on a panic.
    pub fn write_lock(&self) {
        self.write_lock.acquire();
        self.status.bump();
    }

    /// Release exclusive write access: counter bump first, then backend.
    ///
    /// # Safety
    /// The calling context must hold this seqlock via a previous
    /// [`write_lock`](Self::write_lock) (or successful
    /// [`write_lock_interruptibly`](Self::write_lock_interruptibly))
    /// that has not yet been unlocked. Otherwise the counter parity is
    /// corrupted and the backend release is undefined behavior.
    pub unsafe fn write_unlock(&self) {
        self.status.bump();
        self.write_lock.release();
    }

    /// Interruptible variant of [`write_lock`](Self::write_lock).
    ///
    /// Fails with [`Interrupted`] only while still waiting on the
    /// backend; the counter is untouched in that case. Once the backend
    /// is acquired the bump is unconditional, so a successful return
    /// must be paired with [`write_unlock`](Self::write_unlock) exactly
    /// like `write_lock`.
    pub fn write_lock_interruptibly(&self, interrupt: &InterruptFlag) -> Result<(), Interrupted> {
        if let Err(e) = self.write_lock.acquire_interruptibly(interrupt) {
            tracing::debug!("write lock acquisition interrupted");
            return Err(e);
        }
        // Bump only on confirmed, uninterrupted acquisition.
        self.status.bump();
        Ok(())
    }

    /// Acquire write access scoped to a guard.
    ///
    /// The guard releases on drop, on every exit path including panics,
    /// so the counter cannot be left odd.
    pub fn lock_write(&self) -> WriteGuard<'_, L> {
        self.write_lock();
        WriteGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Interruptible variant of [`lock_write`](Self::lock_write).
    pub fn lock_write_interruptibly(
        &self,
        interrupt: &InterruptFlag,
    ) -> Result<WriteGuard<'_, L>, Interrupted> {
        self.write_lock_interruptibly(interrupt)?;
        Ok(WriteGuard {
            lock: self,
            _not_send: PhantomData,
        })
    }
}

/// RAII guard for a seqlock write critical section.
///
/// Holding it means the backend is held and the counter is odd.
/// Dropping it bumps the counter back to even and releases the backend,
/// in that order.
#[must_use = "the write lock is released immediately if the guard is not held"]
pub struct WriteGuard<'a, L: ExclusiveLock> {
    lock: &'a SeqLock<L>,

    // PhantomData<*mut ()> keeps the guard !Send: the backend must be
    // released on the thread that acquired it.
    _not_send: PhantomData<*mut ()>,
}

impl<L: ExclusiveLock> Drop for WriteGuard<'_, L> {
    fn drop(&mut self) {
        // Safety: the guard is only constructed after a successful
        // write_lock / write_lock_interruptibly and dropped once.
        unsafe { self.lock.write_unlock() };
    }
}
