//! Extension points for the runtime

pub mod observer;

pub use observer::{dispatch, BoardObserver, Notification};
