//! Descriptor to voice matching
//!
//! [`SubstitutionConfig`] holds the naming tables, [`FallbackMatcher`] runs
//! the rule chain over them.

pub mod config;
pub mod matcher;

pub use config::{Rewrite, SubstitutionConfig, apply_rewrites};
pub use matcher::{FallbackMatcher, MatchHit, MatchResult, MatchRule};
