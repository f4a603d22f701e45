//! Helpers shared by every crate and binary in the workspace.

pub mod utils;
