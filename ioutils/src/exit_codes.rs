//! Stable exit codes for the `ioutils` CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid arguments, config, or an operator raised an error.
pub const INVALID: i32 = 1;
