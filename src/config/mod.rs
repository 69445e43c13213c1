//! Configuration module for Bookrank
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A run needs no file at all: [`Config::default`] ranks the default tag.
//!
//! # Example
//!
//! ```no_run
//! use bookrank::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("bookrank.toml")).unwrap();
//! println!("Fetching {}", config.listing_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, OutputConfig, PipelineConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
