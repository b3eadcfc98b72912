//! driver-upload library exports.
//!
//! The binary is a thin `clap` front end over these modules; integration
//! tests drive the orchestrator directly.

pub mod catalog;
pub mod client;
pub mod commands;
pub mod config;
pub mod inspect;
pub mod orchestrator;
pub mod preflight;
pub mod process;
pub mod setup;
