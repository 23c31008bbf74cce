use std::sync::OnceLock;

use tracing::trace;

/// Row `i` holds the false positive rates of a filter using `i` buckets
/// per element, cell `j` the rate when `j` hash functions are used.
///
/// Column 0 (K=0) is a dummy column, and so are rows 0 and 1: fewer than
/// two buckets per element is never a usable configuration.
static PROBS: [&[f64]; 21] = [
    &[1.0],
    &[1.0, 1.0],
    &[1.0, 0.393, 0.400],
    &[1.0, 0.283, 0.237, 0.253],
    &[1.0, 0.221, 0.155, 0.147, 0.160],
    &[1.0, 0.181, 0.109, 0.092, 0.092, 0.101], // 5
    &[1.0, 0.154, 0.0804, 0.0609, 0.0561, 0.0578, 0.0638],
    &[1.0, 0.133, 0.0618, 0.0423, 0.0359, 0.0347, 0.0364],
    &[1.0, 0.118, 0.0489, 0.0306, 0.024, 0.0217, 0.0216, 0.0229],
    &[
        1.0, 0.105, 0.0397, 0.0228, 0.0166, 0.0141, 0.0133, 0.0135, 0.0145,
    ],
    &[
        1.0, 0.0952, 0.0329, 0.0174, 0.0118, 0.00943, 0.00844, 0.00819, 0.00846,
    ], // 10
    &[
        1.0, 0.0869, 0.0276, 0.0136, 0.00864, 0.0065, 0.00552, 0.00513, 0.00509,
    ],
    &[
        1.0, 0.08, 0.0236, 0.0108, 0.00646, 0.00459, 0.00371, 0.00329, 0.00314,
    ],
    &[
        1.0, 0.074, 0.0203, 0.00875, 0.00492, 0.00332, 0.00255, 0.00217, 0.00199, 0.00194,
    ],
    &[
        1.0, 0.0689, 0.0177, 0.00718, 0.00381, 0.00244, 0.00179, 0.00146, 0.00129, 0.00121,
        0.0012,
    ],
    &[
        1.0, 0.0645, 0.0156, 0.00596, 0.003, 0.00183, 0.00128, 0.001, 0.000852, 0.000775,
        0.000744,
    ], // 15
    &[
        1.0, 0.0606, 0.0138, 0.005, 0.00239, 0.00139, 0.000935, 0.000702, 0.000574, 0.000505,
        0.00047, 0.000459,
    ],
    &[
        1.0, 0.0571, 0.0123, 0.00423, 0.00193, 0.00107, 0.000692, 0.000499, 0.000394, 0.000335,
        0.000302, 0.000287, 0.000284,
    ],
    &[
        1.0, 0.054, 0.0111, 0.00362, 0.00158, 0.000839, 0.000519, 0.00036, 0.000275, 0.000226,
        0.000198, 0.000183, 0.000176,
    ],
    &[
        1.0, 0.0513, 0.00998, 0.00312, 0.0013, 0.000663, 0.000394, 0.000264, 0.000194, 0.000155,
        0.000132, 0.000118, 0.000111, 0.000109,
    ],
    &[
        1.0, 0.0488, 0.00906, 0.0027, 0.00108, 0.00053, 0.000303, 0.000196, 0.00014, 0.000108,
        8.89e-05, 7.77e-05, 7.12e-05, 6.79e-05, 6.71e-05,
    ], // 20
];

static OPT_K_PER_BUCKETS: OnceLock<Vec<usize>> = OnceLock::new();

/// Number of rows of the probability table, i.e. the first bucket count
/// the table cannot answer for.
#[inline(always)]
pub fn rows() -> usize {
    PROBS.len()
}

/// Full row of false positive rates for `buckets` per element, indexed by K.
///
/// # Panics
///
/// Panics if `buckets >= rows()`.
#[inline]
pub fn row(buckets: usize) -> &'static [f64] {
    PROBS[buckets]
}

/// Largest number of hash functions the table knows for `buckets`.
///
/// # Panics
///
/// Panics if `buckets >= rows()`.
#[inline]
pub fn max_k(buckets: usize) -> usize {
    row(buckets).len() - 1
}

/// False positive rate of a filter using `buckets` per element and `k`
/// hash functions.
///
/// # Panics
///
/// Panics if the pair is out of the table. Callers are expected to stay
/// within [rows] and [max_k].
#[inline]
pub fn probability(buckets: usize, k: usize) -> f64 {
    row(buckets)[k]
}

/// Same as [probability] but `None` when the pair is out of the table
#[inline]
pub fn get(buckets: usize, k: usize) -> Option<f64> {
    PROBS.get(buckets)?.get(k).copied()
}

// index of the first minimum, floored at 1 since K=0 is never valid
fn first_min_index(row: &[f64]) -> usize {
    let (best, _) = row
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, min), (i, &p)| {
            if p < min {
                (i, p)
            } else {
                (best, min)
            }
        });
    best.max(crate::MIN_K)
}

fn opt_k_per_buckets() -> &'static [usize] {
    OPT_K_PER_BUCKETS.get_or_init(|| {
        let opt = PROBS.iter().map(|r| first_min_index(r)).collect::<Vec<_>>();
        trace!(?opt, "derived optimal K per bucket count");
        opt
    })
}

/// Number of hash functions minimizing the false positive rate when
/// `buckets` are used per element. Ties go to the smallest K.
///
/// # Panics
///
/// Panics if `buckets >= rows()`.
#[inline]
pub fn optimal_k(buckets: usize) -> usize {
    opt_k_per_buckets()[buckets]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shape() {
        assert_eq!(rows(), 21);
        assert_eq!(max_k(0), 0);
        assert_eq!(max_k(2), 2);
        assert_eq!(max_k(12), 8);
        assert_eq!(max_k(20), 14);

        for b in 0..rows() {
            assert_eq!(probability(b, 0), 1.0);
        }
        assert!(row(1).iter().all(|&p| p == 1.0));
    }

    #[test]
    fn test_optimal_k() {
        let expected = [
            1, 1, 1, 2, 3, 3, 4, 5, 6, 6, 7, 8, 8, 9, 10, 10, 11, 12, 12, 13, 14,
        ];
        for (b, &k) in expected.iter().enumerate() {
            assert_eq!(optimal_k(b), k, "buckets={b}");
        }
    }

    #[test]
    fn test_optimal_k_is_row_minimum() {
        for b in crate::MIN_BUCKETS..rows() {
            let k = optimal_k(b);
            let p = probability(b, k);
            for (j, &q) in row(b).iter().enumerate() {
                assert!(p <= q, "buckets={b} k={k} beaten by k={j}");
                if j < k {
                    assert!(q > p, "tie should go to the smallest K");
                }
            }
        }
    }

    #[test]
    fn test_first_min_index() {
        // tie between index 3 and 4
        assert_eq!(first_min_index(&[1.0, 0.5, 0.2, 0.1, 0.1, 0.3]), 3);
        assert_eq!(first_min_index(&[1.0]), 1);
        assert_eq!(first_min_index(&[1.0, 1.0]), 1);
    }

    #[test]
    fn test_get() {
        assert_eq!(get(6, 4), Some(0.0561));
        assert_eq!(get(1, 2), None);
        assert_eq!(get(rows(), 1), None);
    }

    #[test]
    #[should_panic]
    fn test_out_of_rows() {
        probability(rows(), 1);
    }

    #[test]
    #[should_panic]
    fn test_out_of_row() {
        probability(2, 3);
    }
}
