// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// SpinMutex backend tests: mutual exclusion, try_lock, and the
// interruptible acquire required by the ExclusiveLock contract.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use libseq::{ExclusiveLock, InterruptFlag, SpinMutex};

#[test]
fn basic_lock_unlock() {
    let lock = SpinMutex::new();
    lock.lock();
    lock.unlock();
}

#[test]
fn multiple_cycles() {
    let lock = SpinMutex::new();
    for _ in 0..100 {
        lock.lock();
        lock.unlock();
    }
}

#[test]
fn try_lock_reports_contention() {
    let lock = SpinMutex::new();

    assert!(lock.try_lock());
    assert!(!lock.try_lock());
    lock.unlock();
    assert!(lock.try_lock());
    lock.unlock();
}

#[test]
fn critical_section() {
    let lock = Arc::new(SpinMutex::new());
    let counter = Arc::new(AtomicI32::new(0));
    let iterations = 1000;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let lock = Arc::clone(&lock);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..iterations {
                    lock.lock();
                    counter.fetch_add(1, Ordering::Relaxed);
                    lock.unlock();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(counter.load(Ordering::Relaxed), iterations * 2);
}

#[test]
fn mutual_exclusion() {
    let lock = Arc::new(SpinMutex::new());
    let t1_in_cs = Arc::new(AtomicBool::new(false));
    let t2_in_cs = Arc::new(AtomicBool::new(false));
    let violation = Arc::new(AtomicBool::new(false));

    let make_task = |my_flag: Arc<AtomicBool>,
                     other_flag: Arc<AtomicBool>,
                     viol: Arc<AtomicBool>,
                     lk: Arc<SpinMutex>| {
        thread::spawn(move || {
            for _ in 0..100 {
                lk.lock();
                my_flag.store(true, Ordering::SeqCst);
                if other_flag.load(Ordering::SeqCst) {
                    viol.store(true, Ordering::SeqCst);
                }
                thread::sleep(Duration::from_micros(10));
                my_flag.store(false, Ordering::SeqCst);
                lk.unlock();
                thread::yield_now();
            }
        })
    };

    let t1 = make_task(
        Arc::clone(&t1_in_cs),
        Arc::clone(&t2_in_cs),
        Arc::clone(&violation),
        Arc::clone(&lock),
    );
    let t2 = make_task(
        Arc::clone(&t2_in_cs),
        Arc::clone(&t1_in_cs),
        Arc::clone(&violation),
        Arc::clone(&lock),
    );

    t1.join().unwrap();
    t2.join().unwrap();

    assert!(!violation.load(Ordering::SeqCst));
}

#[test]
fn interruptible_acquire_uncontended() {
    let lock = SpinMutex::new();
    let flag = InterruptFlag::new();

    lock.acquire_interruptibly(&flag).expect("uncontended");
    unsafe { lock.release() };
}

#[test]
fn interruptible_acquire_preset_flag_fails() {
    let lock = SpinMutex::new();
    let flag = InterruptFlag::new();
    flag.interrupt();

    // Fails immediately even though the lock is free.
    assert!(lock.acquire_interruptibly(&flag).is_err());

    // Ownership state unchanged: a plain acquire still succeeds.
    assert!(lock.try_lock());
    lock.unlock();
}

#[test]
fn interruptible_acquire_unblocks_on_interrupt() {
    let lock = Arc::new(SpinMutex::new());
    let flag = Arc::new(InterruptFlag::new());

    lock.lock();

    let blocked = {
        let lock = Arc::clone(&lock);
        let flag = Arc::clone(&flag);
        thread::spawn(move || lock.acquire_interruptibly(&flag))
    };

    thread::sleep(Duration::from_millis(50));
    flag.interrupt();

    assert!(blocked.join().unwrap().is_err());
    lock.unlock();
}
