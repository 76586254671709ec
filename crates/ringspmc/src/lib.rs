//! RingSPMC - Bounded Lock-Free SPSC and SPMC Ring Buffers
//!
//! Two queue disciplines built on one ring core:
//!
//! - [`SpscQueue`]: one producer thread, one consumer thread.
//! - [`SpmcQueue`]: one producer thread, any number of consumer threads
//!   racing on a compare-and-swap.
//!
//! Each comes with a runtime capacity ([`Dynamic`], heap storage) or a
//! compile-time capacity ([`Fixed<N>`], inline storage). A queue of capacity
//! `N` owns `N + 1` slots; the spare slot distinguishes full from empty.
//!
//! # Key Features
//!
//! - Cache-line padded `head`, `tail` and slot storage (no false sharing)
//! - Bitmask index wrap when `N + 1` is a power of two, modulo otherwise
//! - Non-blocking `push`/`pop`: full and empty are reported by return value
//! - Lap-tagged indices, so a stalled SPMC consumer can never claim a slot
//!   that was recycled underneath it
//! - Move semantics: any `T: Send`, no `Clone` or `Default` bound
//!
//! # Example
//!
//! ```
//! use ringspmc_rs::{FixedSpmcQueue, SpscQueue};
//!
//! let mut spsc = SpscQueue::<u64>::with_capacity(3).unwrap();
//! let (mut producer, mut consumer) = spsc.split();
//! assert!(producer.push(1));
//! assert!(producer.push(2));
//! assert!(producer.push(3));
//! assert!(!producer.push(4)); // full
//! assert_eq!(consumer.pop(), Some(1));
//!
//! let mut spmc: FixedSpmcQueue<u64, 8> = FixedSpmcQueue::new();
//! let (mut producer, consumer) = spmc.split();
//! producer.push(42);
//! let other = consumer.clone(); // one handle per consumer thread
//! assert_eq!(other.pop(), Some(42));
//! assert_eq!(consumer.pop(), None);
//! ```
//!
//! # Features
//!
//! - `tracing`: diagnostic events (construction, CAS contention, teardown)
//!   and [`init_tracing`].
//! - `loom`: swaps the ring's atomics for loom's model-checked ones.

pub mod capacity;
mod error;
mod invariants;
mod producer;
mod ring;
mod shim;
pub mod spmc;
pub mod spsc;
mod trace;

pub use capacity::{Capacity, Dynamic, Fixed, WrapPolicy};
pub use error::{CapacityError, MAX_CAPACITY};
pub use producer::Producer;
pub use spmc::{FixedSpmcQueue, SpmcQueue};
pub use spsc::{FixedSpscQueue, SpscQueue};
pub use trace::init_tracing;
