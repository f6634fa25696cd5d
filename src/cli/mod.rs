//! Native CLI support for the jsdfa binary.

pub mod args;
pub mod driver;

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
