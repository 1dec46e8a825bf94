//! Flattened addressing of argument combinations.
//!
//! A combination of `k` identifier indices, one per dispatched argument, is encoded as a single
//! mixed-radix integer whose radixes are the sizes of the argument hierarchies.
use smallvec::SmallVec;

/// Largest number of simultaneously dispatched arguments.
pub const MAX_ARITY: usize = 4;

/// One index per dispatched argument.
pub type MultiIndex = SmallVec<usize, MAX_ARITY>;

/// Mixed-radix encoding of `indices`, the last position varying fastest.
///
/// Each `indices[i]` must be smaller than `bounds[i]`.
///
/// ```
/// # use hyrtti::dispatch::index::flatten_index;
/// assert_eq!(flatten_index(&[1, 1], &[2, 3]), 4);
/// assert_eq!(flatten_index(&[1, 1, 1], &[3, 2, 3]), 10);
/// ```
#[inline]
pub fn flatten_index(indices: &[usize], bounds: &[usize]) -> usize {
    debug_assert_eq!(indices.len(), bounds.len());
    indices
        .iter()
        .zip(bounds)
        .fold(0, |flat, (&index, &bound)| {
            debug_assert!(index < bound, "index {index} out of bound {bound}");
            flat * bound + index
        })
}

/// Inverse of [`flatten_index`].
pub fn expand_index(mut flat: usize, bounds: &[usize]) -> MultiIndex {
    let mut indices: MultiIndex = bounds
        .iter()
        .rev()
        .map(|&bound| {
            let index = flat % bound;
            flat /= bound;
            index
        })
        .collect();
    indices.reverse();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_examples() {
        assert_eq!(flatten_index(&[], &[]), 0);
        assert_eq!(flatten_index(&[2], &[5]), 2);
        assert_eq!(flatten_index(&[0, 2], &[2, 3]), 2);
        assert_eq!(flatten_index(&[1, 0], &[2, 3]), 3);
        assert_eq!(flatten_index(&[1, 1], &[2, 3]), 4);
        assert_eq!(flatten_index(&[1, 1, 1], &[3, 2, 3]), 10);
    }

    #[test]
    fn expand_inverts_flatten() {
        let bounds = [3, 2, 3];
        let total: usize = bounds.iter().product();
        for flat in 0..total {
            let indices = expand_index(flat, &bounds);
            assert_eq!(flatten_index(&indices, &bounds), flat);
        }
        assert_eq!(expand_index(10, &bounds).as_slice(), &[1, 1, 1]);
    }
}
