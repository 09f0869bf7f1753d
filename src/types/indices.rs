//! Strongly-typed index newtypes.
//!
//! Element loops in the evolution operator juggle element, face, dof and
//! equation counters. Elements and mesh faces get their own types so they
//! cannot be swapped for the plain `usize` counters.

use std::fmt;

macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Index zero.
            pub const ZERO: Self = Self(0);

            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0
            }

            /// Iterate over the indices [0, n).
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = Self> {
                (0..n).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        // Per-element tables are indexed directly. `Vec<T>` needs its own
        // impls: its `SliceIndex` impl shadows the slice one.
        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Index of an element owned by the local partition.
    ///
    /// Ghost elements of other partitions are numbered separately with a
    /// plain `usize` ghost index.
    ///
    /// # Example
    ///
    /// ```
    /// use dg_hypsys::types::ElementIndex;
    ///
    /// let elems: Vec<_> = ElementIndex::iter(3).collect();
    /// assert_eq!(elems[2], ElementIndex::new(2));
    /// assert_eq!(elems[2].to_string(), "E2");
    /// ```
    ElementIndex,
    "E"
);

define_index!(
    /// Index of a mesh face: a vertex in 1D, an edge in 2D.
    ///
    /// A face is shared by at most two elements.
    FaceIndex,
    "F"
);
