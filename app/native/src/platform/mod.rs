//! Host platform helpers.
//!
//! - [`path`] - Shell-like path expansion for configured paths
//! - [`thread`] - Named worker threads

pub mod path;
pub mod thread;

pub use path::{expand, expand_and_resolve};
pub use thread::spawn_named_thread;
