//! Work distribution with an SPMC queue.
//!
//! One dispatcher thread feeds jobs into a bounded SpmcQueue; a pool of
//! workers claims them. Each job is handled by exactly one worker.
//!
//! Run with: `cargo run --release --example work_pool --features tracing`

use ringspmc_rs::{init_tracing, SpmcQueue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

const JOBS: u64 = 2_000_000;
const WORKERS: usize = 4;

fn main() {
    init_tracing();

    let mut queue = SpmcQueue::<u64>::with_capacity(1000).expect("valid capacity");
    println!(
        "queue: capacity {} ({:?} wrap), {} workers, {} jobs",
        queue.capacity(),
        queue.policy(),
        WORKERS,
        JOBS
    );

    let (mut producer, consumer) = queue.split();
    let done = AtomicBool::new(false);
    let start = Instant::now();

    let per_worker: Vec<(u64, u64)> = thread::scope(|s| {
        let workers: Vec<_> = (0..WORKERS)
            .map(|_| {
                let jobs = consumer.clone();
                let done = &done;
                s.spawn(move || {
                    let (mut count, mut checksum) = (0u64, 0u64);
                    loop {
                        match jobs.pop() {
                            Some(job) => {
                                count += 1;
                                checksum = checksum.wrapping_add(job);
                            }
                            None if done.load(Ordering::Acquire) && jobs.is_empty() => break,
                            None => std::hint::spin_loop(),
                        }
                    }
                    (count, checksum)
                })
            })
            .collect();

        let mut rejected = 0u64;
        for job in 0..JOBS {
            while !producer.push(job) {
                rejected += 1;
                std::hint::spin_loop();
            }
        }
        done.store(true, Ordering::Release);
        println!("dispatcher: {} pushes rejected while full", rejected);

        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let elapsed = start.elapsed();
    let total: u64 = per_worker.iter().map(|(count, _)| count).sum();
    let checksum = per_worker
        .iter()
        .fold(0u64, |acc, (_, sum)| acc.wrapping_add(*sum));

    for (id, (count, _)) in per_worker.iter().enumerate() {
        println!("worker {}: {} jobs", id, count);
    }
    println!(
        "{} jobs in {:.2?} ({:.1} M jobs/s)",
        total,
        elapsed,
        total as f64 / elapsed.as_secs_f64() / 1e6
    );

    assert_eq!(total, JOBS);
    assert_eq!(checksum, JOBS * (JOBS - 1) / 2);
}
