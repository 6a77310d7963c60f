//! URL handling module
//!
//! This module provides seed normalization, visited-set keys, and host
//! comparison helpers.

mod domain;
mod normalize;

pub use domain::{extract_domain, origin_key, same_host};
pub use normalize::{normalize_seed, normalize_url, visit_key};
