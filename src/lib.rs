//! `rnaqc` is a command line tool that computes quality control metrics for
//! RNA-Seq samples and combines them into one report per batch. This package
//! is composed of both a library crate, as well as a binary crate.
//!
//! This documentation generally refers to the library crate documentation for
//! use by developers of `rnaqc`. The [`qc`] module holds the metric
//! computation and aggregation; [`utils`] holds the file format and logging
//! plumbing shared across subcommands.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod qc;
pub mod utils;
