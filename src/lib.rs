pub mod adapters;
pub mod application;
pub mod domain;
pub mod infra;

// Test utilities (in-memory port implementations and fixtures).
#[cfg(test)]
pub mod test_utils;
