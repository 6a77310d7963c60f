//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! as well as loading the optional product reference table.
//!
//! # Example
//!
//! ```no_run
//! use llmstxt_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, IdentityConfig, SchemaConfig, DEFAULT_USER_AGENTS};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_reference_dataset,
};
pub use validation::validate;
