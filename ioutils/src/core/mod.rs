//! Deterministic, pure logic shared by the operators.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod convert;
pub mod template;
pub mod value;
