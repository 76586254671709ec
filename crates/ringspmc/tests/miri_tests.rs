//! Miri-compatible tests for detecting undefined behavior.
//!
//! Run with: `cargo +nightly miri test --test miri_tests`
//!
//! Small capacities and short runs keep miri fast while still covering the
//! unsafe slot paths: inline and boxed storage, the sentinel slot, wraparound,
//! the speculative SPMC copy, and dropping values left in the ring.

#![cfg(not(feature = "loom"))]

use ringspmc_rs::{FixedSpmcQueue, FixedSpscQueue, SpmcQueue, SpscQueue};
use std::thread;

/// Fill and drain repeatedly so every slot, sentinel included, is written.
#[test]
fn miri_spsc_wrap_around() {
    let mut queue = SpscQueue::<u32>::with_capacity(4).unwrap();
    let (mut producer, mut consumer) = queue.split();

    for round in 0..3 {
        for i in 0..4 {
            assert!(producer.push(round * 10 + i), "push failed at round {round} item {i}");
        }
        assert!(!producer.push(99));
        for i in 0..4 {
            assert_eq!(consumer.pop(), Some(round * 10 + i));
        }
        assert_eq!(consumer.pop(), None);
    }
}

/// Inline storage: the sentinel lives in its own field.
#[test]
fn miri_fixed_sentinel_slot() {
    let mut queue: FixedSpscQueue<u64, 2> = FixedSpscQueue::new();
    let (mut producer, mut consumer) = queue.split();

    // Walk the indices 0, 1, 2 (sentinel), 0, ...
    for i in 0..10 {
        assert!(producer.push(i));
        assert_eq!(consumer.pop(), Some(i));
    }
}

/// Values left in the queue are dropped with it.
#[test]
fn miri_drop_with_items() {
    let mut queue = SpscQueue::<String>::with_capacity(4).unwrap();
    {
        let (mut producer, mut consumer) = queue.split();
        assert!(producer.push(String::from("hello")));
        assert!(producer.push(String::from("world")));
        assert!(producer.push(String::from("again")));
        assert_eq!(consumer.pop().as_deref(), Some("hello"));
    }
    // Queue drops here with two unconsumed Strings.
}

/// Inline storage drops leftovers too, including one in the sentinel slot.
#[test]
fn miri_fixed_drop_with_items() {
    let queue: FixedSpmcQueue<Vec<u8>, 2> = FixedSpmcQueue::new();
    unsafe {
        assert!(queue.push(vec![1]));
        assert!(queue.push(vec![2]));
    }
    assert_eq!(queue.pop(), Some(vec![1]));
    unsafe {
        assert!(queue.push(vec![3])); // lands in the sentinel-indexed slot
    }
    drop(queue);
}

/// A rejected push hands the value back intact.
#[test]
fn miri_try_push_returns_value() {
    let mut queue = SpmcQueue::<Box<[u8; 16]>>::with_capacity(1).unwrap();
    let (mut producer, consumer) = queue.split();

    assert!(producer.try_push(Box::new([1; 16])).is_ok());
    let rejected = producer.try_push(Box::new([2; 16])).unwrap_err();
    assert_eq!(rejected[0], 2);
    assert_eq!(consumer.pop().map(|b| b[0]), Some(1));
}

/// Two consumers racing over heap values: each Box is freed exactly once.
#[test]
fn miri_spmc_two_consumers() {
    let mut queue = SpmcQueue::<Box<u32>>::with_capacity(3).unwrap();
    let (mut producer, consumer) = queue.split();

    for i in 0..3 {
        assert!(producer.push(Box::new(i)));
    }

    let mut got = thread::scope(|s| {
        let a = consumer.clone();
        let b = consumer.clone();
        let ha = s.spawn(move || std::iter::from_fn(|| a.pop()).map(|v| *v).collect::<Vec<_>>());
        let hb = s.spawn(move || std::iter::from_fn(|| b.pop()).map(|v| *v).collect::<Vec<_>>());
        let mut all = ha.join().unwrap();
        all.extend(hb.join().unwrap());
        all
    });

    got.sort_unstable();
    assert_eq!(got, vec![0, 1, 2]);
}
