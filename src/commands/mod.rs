//! # CLI Command Implementations
//!
//! One file per subcommand of the `datafile` binary. Each holds an `Args`
//! struct derived with `clap` and an `execute` function that calls into the
//! `datafile` library.

pub mod apply;
pub mod completions;
pub mod render;
pub mod validate;
