//! Plugin System Tests
//!
//! Manager-level tests run against the in-process mock loader.


#[cfg(test)]
pub mod lifecycle_tests;
