use pyo3::{exceptions::PyValueError, prelude::*};

struct Error(bloomspec::Error);

impl From<bloomspec::Error> for Error {
    fn from(value: bloomspec::Error) -> Self {
        Self(value)
    }
}

impl From<Error> for PyErr {
    fn from(value: Error) -> Self {
        PyValueError::new_err(value.0.to_string())
    }
}

#[pyfunction]
/// Computes (K, buckets_per_element) achieving max_false_pos_prob with at
/// most max_buckets_per_element buckets per element
pub fn compute_bloom_spec(
    max_buckets_per_element: i64,
    max_false_pos_prob: f64,
) -> PyResult<(usize, usize)> {
    // negative budgets are rejected like 0
    let max_buckets = usize::try_from(max_buckets_per_element).unwrap_or(0);
    Ok(
        bloomspec::compute_bloom_spec(max_buckets, max_false_pos_prob)
            .map_err(Error::from)?
            .into(),
    )
}

// anything above u64::MAX is as unsatisfiable as u64::MAX
fn clamp_elements(n: i128) -> u64 {
    u64::try_from(n.max(0)).unwrap_or(u64::MAX)
}

#[pyfunction]
/// Largest number of buckets per element usable for num_elements,
/// values lower than 1 are handled like 1
pub fn max_buckets_per_element(num_elements: i128) -> PyResult<usize> {
    Ok(bloomspec::max_buckets_per_element(clamp_elements(num_elements)).map_err(Error::from)?)
}

#[pyfunction]
/// Computes (K, buckets_per_element) for a filter holding num_elements
pub fn spec_for_elements(num_elements: i128, max_false_pos_prob: f64) -> PyResult<(usize, usize)> {
    Ok(
        bloomspec::spec_for_elements(clamp_elements(num_elements), max_false_pos_prob)
            .map_err(Error::from)?
            .into(),
    )
}

/// Python bindings to bloomspec parameter computations (written in Rust)
#[pymodule]
#[pyo3(name = "bloomspec")]
fn bloomspec_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("MIN_BUCKETS", bloomspec::MIN_BUCKETS)?;
    m.add("MIN_K", bloomspec::MIN_K)?;
    m.add("MAX_ADDRESSABLE_BITS", bloomspec::MAX_ADDRESSABLE_BITS)?;
    m.add_function(wrap_pyfunction!(compute_bloom_spec, m)?)?;
    m.add_function(wrap_pyfunction!(max_buckets_per_element, m)?)?;
    m.add_function(wrap_pyfunction!(spec_for_elements, m)?)?;
    Ok(())
}
