//! Errors reported by the fallible constructors.

use thiserror::Error;

/// Rejection of the input handed to a `SafeMap` constructor.
///
/// Nothing is inserted when a constructor fails; the caller gets the error
/// and no partially built map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    /// Parallel key and value sequences have different lengths.
    #[error("keys and values must have the same length: got {keys} keys and {values} values")]
    LengthMismatch { keys: usize, values: usize },

    /// A flat `key, value, key, value, ...` sequence has an odd length.
    #[error("flat key-value sequence must have an even length, got {len}")]
    OddLength { len: usize },

    /// Element at `index` of a flat sequence is not a `K`.
    #[error("element {index} is not a key of type {expected}")]
    KeyType {
        index: usize,
        expected: &'static str,
    },

    /// Element at `index` of a flat sequence is not a `V`.
    #[error("element {index} is not a value of type {expected}")]
    ValueType {
        index: usize,
        expected: &'static str,
    },
}
