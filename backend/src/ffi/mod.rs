//! FFI (Foreign Function Interface) module
//!
//! PyO3 bindings exposing the reward calculator to the Python training loop.
//!
//! # Design Principles
//!
//! 1. **Minimal boundary**: Only the two scoring operations and a calculator class
//! 2. **Simple types**: Floats, bools, dicts and lists at the boundary
//! 3. **Validate inputs**: Every record is validated before scoring
//! 4. **Safe errors**: All Rust errors become Python `ValueError`s

pub mod rewards;
pub mod types;
