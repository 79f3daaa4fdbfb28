//! Integration tests for pixa crates.
//!
//! End-to-end checks of the public operations: filter catalog, resize,
//! fit, thumbnail, blur and sharpen, run against dedicated executors with
//! different worker counts.
