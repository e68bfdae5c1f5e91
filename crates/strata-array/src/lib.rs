//! Contiguous growable array for Strata.
//!
//! [`DynArray`] keeps its values in one raw buffer and grows by relocation.
//! Positions are expressed with [`Cursor`], a copyable random-access
//! position that can be passed back into mutating operations.
//!
//! ```
//! use strata_array::{dyn_array, DynArray};
//!
//! let mut a: DynArray<i32> = dyn_array![1, 2, 3];
//! a.insert(a.begin() + 1, 99).unwrap();
//! assert_eq!(a.as_slice(), &[1, 99, 2, 3]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod array;
pub mod cursor;
pub mod iter;

pub use array::DynArray;
pub use cursor::Cursor;
pub use iter::IntoIter;

#[doc(hidden)]
pub use strata_raw::alloc_failed as __alloc_failed;

/// Build a [`DynArray`] from a literal sequence.
///
/// `dyn_array![a, b, c]` copies the listed values in order;
/// `dyn_array![value; n]` holds `n` clones of `value`.
#[macro_export]
macro_rules! dyn_array {
    () => {
        $crate::DynArray::new()
    };
    ($value:expr; $count:expr) => {
        $crate::DynArray::from_elem($count, &$value)
            .unwrap_or_else(|err| $crate::__alloc_failed(err))
    };
    ($($value:expr),+ $(,)?) => {
        $crate::DynArray::from([$($value),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_forms() {
        let empty: DynArray<u8> = dyn_array![];
        assert!(empty.is_empty());
        let listed = dyn_array![1, 2, 3,];
        assert_eq!(listed.as_slice(), &[1, 2, 3]);
        let repeated = dyn_array!["z".to_string(); 3];
        assert_eq!(repeated.len(), 3);
        assert!(repeated.iter().all(|s| s == "z"));
    }
}
