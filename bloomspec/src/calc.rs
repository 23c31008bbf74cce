use std::fmt::Display;

use thiserror::Error;
use tracing::debug;

use crate::table::{self, max_k, optimal_k, probability, rows};

/// Smallest number of buckets per element making a usable filter
pub const MIN_BUCKETS: usize = 2;
/// Smallest number of hash functions
pub const MIN_K: usize = 1;
/// Total number of bits a filter can address
pub const MAX_ADDRESSABLE_BITS: u64 = i64::MAX as u64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unable to satisfy fpp={fpp} with {buckets} buckets per element")]
    Unsatisfiable { fpp: f64, buckets: usize },
    #[error("cannot compute probabilities for {0} elements")]
    TooManyElements(u64),
}

impl Error {
    /// The arguments are out of what the computation accepts
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// The arguments are valid but no configuration can meet them
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Self::Unsatisfiable { .. } | Self::TooManyElements(_))
    }
}

/// Construction parameters of a bloom filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BloomSpec {
    /// number of hash functions
    pub k: usize,
    /// number of buckets (bits) to allocate per element
    pub buckets_per_element: usize,
}

impl BloomSpec {
    /// False positive probability of a filter built with these parameters.
    /// Pairs the table does not know are unusable, so their rate is 1.0
    /// like the dummy rows.
    pub fn fpp(&self) -> f64 {
        table::get(self.buckets_per_element, self.k).unwrap_or(1.0)
    }

    /// Number of bits a filter holding `num_elements` needs, `None` if it
    /// does not fit in an u64.
    pub fn bit_size(&self, num_elements: u64) -> Option<u64> {
        num_elements.checked_mul(self.buckets_per_element as u64)
    }
}

impl Display for BloomSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "k={} buckets_per_element={}",
            self.k, self.buckets_per_element
        )
    }
}

/// Pairs are ordered (K, buckets per element)
impl From<BloomSpec> for (usize, usize) {
    fn from(s: BloomSpec) -> Self {
        (s.k, s.buckets_per_element)
    }
}

/// Computes the cheapest filter parameters achieving `max_false_pos_prob`
/// without using more than `max_buckets_per_element` buckets per element.
///
/// The smallest sufficient bucket count is picked first, then the number
/// of hash functions is lowered as long as the target still holds.
///
/// # Example
///
/// ```
/// use bloomspec::compute_bloom_spec;
///
/// let spec = compute_bloom_spec(15, 0.01).unwrap();
/// assert_eq!((spec.k, spec.buckets_per_element), (5, 10));
/// assert!(spec.fpp() <= 0.01);
/// ```
pub fn compute_bloom_spec(
    max_buckets_per_element: usize,
    max_false_pos_prob: f64,
) -> Result<BloomSpec, Error> {
    if max_buckets_per_element == 0 {
        return Err(Error::InvalidArgument(
            "max_buckets_per_element must be greater than 0".into(),
        ));
    }

    if max_buckets_per_element >= rows() {
        return Err(Error::InvalidArgument(format!(
            "max_buckets_per_element must be less than {}",
            rows()
        )));
    }

    if max_false_pos_prob.is_nan() {
        return Err(Error::InvalidArgument(
            "max_false_pos_prob must be a number".into(),
        ));
    }

    let max_k = max_k(max_buckets_per_element);

    // loosest usable configuration is already good enough. Consumers
    // expect exactly the pair (2, optimal K of 2) here, in this order.
    if max_false_pos_prob >= probability(MIN_BUCKETS, MIN_K) {
        debug!(max_false_pos_prob, "target met with minimal buckets");
        return Ok(BloomSpec {
            k: MIN_BUCKETS,
            buckets_per_element: optimal_k(MIN_BUCKETS),
        });
    }

    // checked against the largest K of the row, not its optimal one
    if max_false_pos_prob < probability(max_buckets_per_element, max_k) {
        return Err(Error::Unsatisfiable {
            fpp: max_false_pos_prob,
            buckets: max_buckets_per_element,
        });
    }

    let mut buckets_per_element = MIN_BUCKETS;
    let mut k = optimal_k(buckets_per_element);

    while probability(buckets_per_element, k) > max_false_pos_prob {
        buckets_per_element += 1;
        k = optimal_k(buckets_per_element);
    }
    debug!(buckets_per_element, k, "found minimal buckets per element");

    // buckets are sufficient, drop hash functions we do not need
    while k > MIN_K && probability(buckets_per_element, k - 1) <= max_false_pos_prob {
        k -= 1;
    }
    debug!(buckets_per_element, k, "relaxed number of hash functions");

    Ok(BloomSpec {
        k,
        buckets_per_element,
    })
}

/// Largest number of buckets per element usable for a filter holding
/// `num_elements`. Zero elements is handled like one.
pub fn max_buckets_per_element(num_elements: u64) -> Result<usize, Error> {
    let num_elements = num_elements.max(1);
    let v = MAX_ADDRESSABLE_BITS as f64 / num_elements as f64;

    if v < 1.0 {
        return Err(Error::TooManyElements(num_elements));
    }

    Ok((rows() - 1).min(v as usize))
}

/// Computes the parameters of a filter meant to hold `num_elements`
/// with a false positive probability of at most `max_false_pos_prob`.
///
/// # Example
///
/// ```
/// use bloomspec::spec_for_elements;
///
/// let spec = spec_for_elements(1_000_000, 0.001).unwrap();
/// assert!(spec.fpp() <= 0.001);
/// assert_eq!(spec.bit_size(1_000_000), Some(15_000_000));
/// ```
pub fn spec_for_elements(num_elements: u64, max_false_pos_prob: f64) -> Result<BloomSpec, Error> {
    let max_buckets = max_buckets_per_element(num_elements)?;
    compute_bloom_spec(max_buckets, max_false_pos_prob)
}
