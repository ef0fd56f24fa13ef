// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Lock-free spin mutex with adaptive backoff: pause → yield → sleep.
// The dependency-free exclusion backend for SeqLock.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::backend::{ExclusiveLock, InterruptFlag, Interrupted};

/// Adaptive backoff between acquisition retries.
///
/// - k < 4:  busy spin (do nothing)
/// - k < 16: CPU pause hint
/// - k < 32: thread yield
/// - k >= 32: sleep 1ms
#[inline]
fn adaptive_yield(k: &mut u32) {
    if *k < 4 {
        // busy spin
    } else if *k < 16 {
        std::hint::spin_loop();
    } else if *k < 32 {
        std::thread::yield_now();
    } else {
        std::thread::sleep(std::time::Duration::from_millis(1));
        return;
    }
    *k += 1;
}

/// Public (crate-internal) access to the adaptive yield for other modules.
#[inline]
pub(crate) fn adaptive_yield_pub(k: &mut u32) {
    adaptive_yield(k);
}

/// A simple spin mutex with adaptive backoff.
///
/// Uses an `AtomicU32` exchanged to 1 on lock, stored to 0 on unlock,
/// with adaptive yield between retries. Not reentrant: a thread that
/// locks it twice deadlocks against itself.
pub struct SpinMutex {
    lc: AtomicU32,
}

impl SpinMutex {
    /// Create a new unlocked spin mutex.
    pub const fn new() -> Self {
        Self {
            lc: AtomicU32::new(0),
        }
    }

    /// Acquire the lock (spinning with adaptive backoff).
    pub fn lock(&self) {
        let mut k = 0u32;
        while self.lc.swap(1, Ordering::Acquire) != 0 {
            adaptive_yield(&mut k);
        }
    }

    /// Try to acquire the lock without waiting.
    pub fn try_lock(&self) -> bool {
        self.lc
            .compare_exchange(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Release the lock.
    pub fn unlock(&self) {
        self.lc.store(0, Ordering::Release);
    }
}

impl Default for SpinMutex {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: SpinMutex is designed for concurrent access.
unsafe impl Send for SpinMutex {}
unsafe impl Sync for SpinMutex {}

impl ExclusiveLock for SpinMutex {
    fn acquire(&self) {
        self.lock();
    }

    fn acquire_interruptibly(&self, interrupt: &InterruptFlag) -> Result<(), Interrupted> {
        let mut k = 0u32;
        loop {
            if interrupt.is_interrupted() {
                return Err(Interrupted);
            }
            if self.try_lock() {
                return Ok(());
            }
            adaptive_yield(&mut k);
        }
    }

    unsafe fn release(&self) {
        self.unlock();
    }
}
