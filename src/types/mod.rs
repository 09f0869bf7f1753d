//! Strongly-typed indices and the dof layout.
//!
//! - **Newtypes prevent mix-ups**: an [`ElementIndex`] cannot be passed where
//!   a [`FaceIndex`] is expected
//! - **Typed neighbor references**: [`DofRef`] replaces raw offset arithmetic
//!   on neighbor codes; [`DofLayout`] owns the arithmetic in one place
//!
//! # Example
//!
//! ```
//! use dg_hypsys::types::{DofLayout, DofRef, ElementIndex};
//!
//! let layout = DofLayout::new(2, 4, 3, 1);
//! let code = layout.encode(DofRef::Local { element: ElementIndex::new(1), dof: 2 });
//! assert_eq!(code, 5);
//! assert_eq!(layout.decode(code), Some(DofRef::Local { element: ElementIndex::new(1), dof: 2 }));
//! ```

mod indices;
mod layout;

pub use indices::{ElementIndex, FaceIndex};
pub use layout::{DofLayout, DofRef};
