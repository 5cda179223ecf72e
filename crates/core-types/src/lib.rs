//! Shared primitives for the pagepilot automation core.
//!
//! Everything that crosses a crate boundary lives here: viewport geometry,
//! viewport-relative coordinates, and the operation model the planner,
//! executor and playbook store all speak.

pub mod geom;
pub mod ops;

pub use geom::{to_absolute, to_relative, RelativePosition, ScrollOffset, Viewport};
pub use ops::{Operation, ScrollDirection, Target};
