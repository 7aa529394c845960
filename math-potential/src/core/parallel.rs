//! Portable parallel iteration
//!
//! - `native` feature: rayon thread pool
//! - otherwise: sequential iteration with the same results
//!
//! ## Usage
//!
//! ```ignore
//! use crate::core::parallel::*;
//!
//! // Parallel map over indices; the returned Vec is the join point
//! let lanes: Vec<f64> = parallel_map_indexed(16, |lane| lane as f64);
//!
//! // One task per disjoint output chunk
//! parallel_for_each_chunk_mut(&mut buffer, 2, |slot, pair| pair[0] += 1.0);
//! ```

/// Check if parallel processing is available
#[inline]
pub fn is_parallel_available() -> bool {
    cfg!(feature = "native")
}

/// Parallel map over a range of indices
///
/// Results are returned in index order regardless of execution order.
#[cfg(feature = "native")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Parallel map over a range of indices (sequential fallback)
#[cfg(not(feature = "native"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

/// Run `f(chunk_index, chunk)` on every `chunk_size` chunk of `data`
///
/// Each chunk is handed to exactly one call, so writes never overlap.
/// `chunk_size` must be non-zero.
#[cfg(feature = "native")]
pub fn parallel_for_each_chunk_mut<T, F>(data: &mut [T], chunk_size: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    use rayon::prelude::*;
    data.par_chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(i, chunk)| f(i, chunk));
}

/// Run `f(chunk_index, chunk)` on every `chunk_size` chunk of `data` (sequential fallback)
#[cfg(not(feature = "native"))]
pub fn parallel_for_each_chunk_mut<T, F>(data: &mut [T], chunk_size: usize, f: F)
where
    F: Fn(usize, &mut [T]),
{
    data.chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(i, chunk)| f(i, chunk));
}
