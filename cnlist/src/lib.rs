#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod config;
pub mod emit;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod source;
