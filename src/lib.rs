// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Sequence-lock (seqlock) synchronization primitive: lock-free optimistic
// readers validated against a sequence counter, writers serialized through
// a pluggable mutual-exclusion backend.

mod seq_count;
pub use seq_count::{ReadTicket, SeqCount};

mod backend;
pub use backend::{ExclusiveLock, InterruptFlag, Interrupted};

mod spin_mutex;
pub use spin_mutex::SpinMutex;

mod seqlock;
pub use seqlock::{SeqLock, WriteGuard};
