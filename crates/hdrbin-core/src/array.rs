//! Materialization of decoded initializers to their declared capacity.

use crate::error::{Error, Result};
use tracing::trace;

/// A byte array of exactly its declared capacity.
///
/// The first [`literal_count`](Self::literal_count) bytes are the initializer
/// values in source order; the rest are zero, as C specifies for aggregate
/// initializers that supply fewer elements than the array dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedArray {
    name: String,
    bytes: Vec<u8>,
    literal_count: usize,
}

impl MaterializedArray {
    /// Zero-fills `literals` up to `capacity`.
    ///
    /// Fails with [`Error::SizeExceeded`] if the initializer is longer than
    /// the array, and with [`Error::AllocationFailed`] if the zero fill cannot
    /// be reserved.
    pub fn new(name: impl Into<String>, capacity: usize, mut literals: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let literal_count = literals.len();

        if literal_count > capacity {
            return Err(Error::size_exceeded(name, capacity, literal_count));
        }

        if literal_count < capacity {
            let fill = capacity - literal_count;
            trace!("{}: zero-filling {} of {} bytes", name, fill, capacity);
            if let Err(source) = literals.try_reserve_exact(fill) {
                return Err(Error::AllocationFailed {
                    name,
                    capacity,
                    source,
                });
            }
        }
        literals.resize(capacity, 0);

        Ok(Self {
            name,
            bytes: literals,
            literal_count,
        })
    }

    /// Array identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The materialized bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared capacity, which is also the byte length
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Number of values the initializer supplied explicitly
    pub fn literal_count(&self) -> usize {
        self.literal_count
    }

    /// Number of trailing bytes that were zero-filled
    pub fn zero_filled(&self) -> usize {
        self.bytes.len() - self.literal_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exact_fit() {
        let array = MaterializedArray::new("name", 4, vec![0x01, 0x02, 0xFF, 0x04]).unwrap();
        assert_eq!(array.as_bytes(), &[0x01, 0x02, 0xFF, 0x04]);
        assert_eq!(array.literal_count(), 4);
        assert_eq!(array.zero_filled(), 0);
    }

    #[test]
    fn test_zero_fill() {
        let array = MaterializedArray::new("name", 8, vec![1, 2]).unwrap();
        assert_eq!(array.as_bytes(), &[1, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(array.capacity(), 8);
        assert_eq!(array.literal_count(), 2);
        assert_eq!(array.zero_filled(), 6);
    }

    #[test]
    fn test_empty_initializer() {
        let array = MaterializedArray::new("blank", 3, Vec::new()).unwrap();
        assert_eq!(array.as_bytes(), &[0, 0, 0]);
        assert_eq!(array.literal_count(), 0);
    }

    #[test]
    fn test_zero_capacity() {
        let array = MaterializedArray::new("none", 0, Vec::new()).unwrap();
        assert!(array.as_bytes().is_empty());
    }

    #[test]
    fn test_size_exceeded() {
        match MaterializedArray::new("name", 2, vec![1, 2, 3]) {
            Err(Error::SizeExceeded {
                name,
                capacity,
                actual,
            }) => {
                assert_eq!(name, "name");
                assert_eq!(capacity, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected SizeExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_unallocatable_capacity_is_an_error() {
        match MaterializedArray::new("big", usize::MAX, vec![1]) {
            Err(Error::AllocationFailed { name, capacity, .. }) => {
                assert_eq!(name, "big");
                assert_eq!(capacity, usize::MAX);
            }
            other => panic!("expected AllocationFailed, got {:?}", other),
        }
    }
}
