//! Side-effecting helpers behind the operators.

pub mod config;
pub mod env;
pub mod process;
pub mod serializer;
pub mod value_stream;
