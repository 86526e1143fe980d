//! Poll loop tasks
//!
//! Each task checks whether it is due and does its work against the shared
//! board. They are plain functions over the driver rather than threads: the
//! transport has a single owner.

pub mod drain;
pub mod link;
pub mod sync;
