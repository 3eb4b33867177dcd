//! # mards
//!
//! A parser, schema compiler, and document validator for the MARDS format.
//!
//! ## Testing
//!
//! For the fluent assertion helpers used across unit and integration
//! tests, see the [testing module](mards::testing).

pub mod mards;
