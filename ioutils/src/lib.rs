//! Host I/O operators for a specification evaluator.
//!
//! The crate exposes the operators an evaluator calls to reach outside of
//! pure expression evaluation: running external processes, reading the
//! process environment, and writing values to files through pluggable
//! serializer backends. The layout mirrors that split:
//!
//! - **[`core`]**: Pure logic (value model, argument validation, command
//!   templates). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (process spawning, environment
//!   capture, value files, configuration).
//!
//! [`operators::IoUtils`] ties both together into the evaluator-facing
//! operator surface, and [`exec`] holds the shared process-bridge pipeline.

pub mod core;
pub mod error;
pub mod exec;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod operators;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::value::{Record, Value};
pub use crate::error::{EvalError, EvalResult};
pub use crate::operators::IoUtils;
