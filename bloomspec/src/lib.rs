//! Bloom filter parameters computed from a table of false positive
//! rates instead of closed-form formulas.
//!
//! ```
//! use bloomspec::{compute_bloom_spec, max_buckets_per_element};
//!
//! let max_buckets = max_buckets_per_element(10_000).unwrap();
//! let spec = compute_bloom_spec(max_buckets, 0.01).unwrap();
//! assert_eq!(<(usize, usize)>::from(spec), (5, 10));
//! ```
mod calc;
pub use calc::*;

pub mod table;
pub mod utils;
