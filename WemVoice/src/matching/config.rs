//! Substitution tables used by the fallback matcher
//!
//! The tables encode one game's naming conventions and are plain data: they
//! deserialize from the `[substitutions]` section of a `wemvoice.toml` and
//! default to the tables for the French Oblivion voice set.
//!
//! ```toml
//! [substitutions]
//! subfolder_tokens = ["altvoice", "beggar"]
//!
//! [[substitutions.special_case_rewrites]]
//! from = "_alt01"
//! to = ""
//!
//! [substitutions.race_aliases]
//! redguard = ["rougegarde", "imperial"]
//! nord = ["nordique", "rougegarde"]
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A literal substring replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl Rewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Apply rewrites in order. Rewrites with an empty `from` are ignored.
pub fn apply_rewrites(input: &str, rewrites: &[Rewrite]) -> String {
    rewrites
        .iter()
        .filter(|rw| !rw.from.is_empty())
        .fold(input.to_string(), |acc, rw| acc.replace(&rw.from, &rw.to))
}

/// Naming tables for the fallback matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionConfig {
    /// Race token to replacement candidates, both in priority order
    pub race_aliases: IndexMap<String, Vec<String>>,
    /// Segments dropped from keys (`_token_` becomes `_`, a trailing `_token` is removed)
    pub subfolder_tokens: Vec<String>,
    /// Literal rewrites applied before subfolder and race handling
    pub special_case_rewrites: Vec<Rewrite>,
    /// Literal rewrites applied to a descriptor's file name before its key is taken
    pub descriptor_name_rewrites: Vec<Rewrite>,
}

impl SubstitutionConfig {
    /// Tables with every rule disabled: only exact matches succeed
    #[must_use]
    pub fn empty() -> Self {
        Self {
            race_aliases: IndexMap::new(),
            subfolder_tokens: Vec::new(),
            special_case_rewrites: Vec::new(),
            descriptor_name_rewrites: Vec::new(),
        }
    }

    /// Builder-style helper to append a race and its aliases
    #[must_use]
    pub fn with_race<I, S>(mut self, race: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.race_aliases
            .insert(race.to_string(), aliases.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style helper to append a subfolder token
    #[must_use]
    pub fn with_subfolder_token(mut self, token: &str) -> Self {
        self.subfolder_tokens.push(token.to_string());
        self
    }

    /// Builder-style helper to append a special-case rewrite
    #[must_use]
    pub fn with_rewrite(mut self, from: &str, to: &str) -> Self {
        self.special_case_rewrites.push(Rewrite::new(from, to));
        self
    }

    /// Builder-style helper to append a descriptor file name rewrite
    #[must_use]
    pub fn with_descriptor_rewrite(mut self, from: &str, to: &str) -> Self {
        self.descriptor_name_rewrites.push(Rewrite::new(from, to));
        self
    }
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self::empty()
            .with_race("high_elf", ["haut_elfe", "imperial"])
            .with_race("wood_elf", ["haut_elfe", "imperial"])
            .with_race("redguard", ["rougegarde", "imperial", "haut_elfe", "nordique"])
            .with_race("dark_elf", ["haut_elfe", "imperial"])
            .with_race("argonian", ["argonien", "haut_elfe"])
            .with_race("khajiit", ["argonien", "haut_elfe"])
            .with_race("nord", ["nordique", "rougegarde", "imperial", "haut_elfe"])
            .with_race("orc", ["nordique", "rougegarde", "imperial"])
            .with_race("breton", ["imperial", "haut_elfe", "nordique"])
            .with_race("imperial", ["imperial", "haut_elfe", "rougegarde", "nordique"])
            .with_race("dark_seducer", ["vil_séducteur"])
            .with_race("golden_saint", ["saint_doré"])
            .with_race("sheogorath", ["shéogorath"])
            .with_race("dremora", ["drémora"])
            .with_subfolder_token("altvoice")
            .with_subfolder_token("beggar")
            .with_rewrite("_alt01", "")
            .with_rewrite("_elf_f_0300", "_1")
            .with_descriptor_rewrite("v.txtp", ".txtp")
    }
}
