//! Larder CLI - Command-line interface for the Larder inventory store
//!
//! This crate provides the CLI application that ties together all Larder components.

pub mod config;

pub use config::{Command, Config};
