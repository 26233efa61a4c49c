//! # convoy-core
//!
//! Core types and configuration for Convoy.
//!
//! This crate provides the foundational building blocks used across all
//! other crates:
//! - Identifier aliases
//! - Application configuration with environment loading

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
