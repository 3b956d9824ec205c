//! Fallback-chain matcher
//!
//! A descriptor key is resolved against the voice index by an ordered rule
//! chain; the first rule that finds a key wins:
//!
//! 1. exact key
//! 2. special-case rewrites and subfolder token removal
//! 3. race alias substitution, races and aliases in configuration order
//!
//! There is no similarity scoring. A key that no rule resolves is reported as
//! missing rather than guessed, since a wrong match puts the wrong voice in a
//! character's mouth.

use serde::Serialize;

use super::config::{SubstitutionConfig, apply_rewrites};
use crate::formats::txtp::DescriptorId;
use crate::voice::{VoiceId, VoiceLookup};

/// Rule of the chain that resolved a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MatchRule {
    /// The descriptor key was in the index as is
    Exact,
    /// The key matched after rewrites and subfolder removal
    Rewritten,
    /// The key matched after replacing `race` with `alias`
    RaceAlias { race: String, alias: String },
}

impl MatchRule {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Rewritten => "rewritten",
            Self::RaceAlias { .. } => "race alias",
        }
    }
}

/// A successful resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchHit {
    pub voice: VoiceId,
    pub rule: MatchRule,
    /// The key that was found in the index
    pub matched_key: String,
}

/// Outcome of matching one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub descriptor: DescriptorId,
    /// Key derived from the descriptor
    pub key: String,
    hit: Option<MatchHit>,
}

impl MatchResult {
    #[must_use]
    pub fn found_with(descriptor: DescriptorId, key: String, hit: MatchHit) -> Self {
        Self {
            descriptor,
            key,
            hit: Some(hit),
        }
    }

    #[must_use]
    pub fn missing(descriptor: DescriptorId, key: String) -> Self {
        Self {
            descriptor,
            key,
            hit: None,
        }
    }

    #[must_use]
    pub fn found(&self) -> bool {
        self.hit.is_some()
    }

    #[must_use]
    pub fn voice(&self) -> Option<VoiceId> {
        self.hit.as_ref().map(|hit| hit.voice)
    }

    #[must_use]
    pub fn rule(&self) -> Option<&MatchRule> {
        self.hit.as_ref().map(|hit| &hit.rule)
    }

    #[must_use]
    pub fn hit(&self) -> Option<&MatchHit> {
        self.hit.as_ref()
    }
}

/// Resolves descriptor keys against a [`VoiceLookup`]
#[derive(Debug, Clone)]
pub struct FallbackMatcher {
    config: SubstitutionConfig,
}

impl FallbackMatcher {
    #[must_use]
    pub fn new(config: SubstitutionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SubstitutionConfig {
        &self.config
    }

    /// Resolve `key` for `descriptor`
    pub fn match_key<L: VoiceLookup + ?Sized>(
        &self,
        descriptor: DescriptorId,
        key: &str,
        index: &L,
    ) -> MatchResult {
        match self.resolve(key, index) {
            Some(hit) => MatchResult::found_with(descriptor, key.to_string(), hit),
            None => MatchResult::missing(descriptor, key.to_string()),
        }
    }

    fn resolve<L: VoiceLookup + ?Sized>(&self, key: &str, index: &L) -> Option<MatchHit> {
        if let Some(voice) = index.lookup(key) {
            return Some(MatchHit {
                voice,
                rule: MatchRule::Exact,
                matched_key: key.to_string(),
            });
        }

        let rewritten = self.rewrite(key);
        if rewritten != key {
            if let Some(voice) = index.lookup(&rewritten) {
                return Some(MatchHit {
                    voice,
                    rule: MatchRule::Rewritten,
                    matched_key: rewritten,
                });
            }
        }

        self.resolve_race_alias(&rewritten, index)
    }

    /// Apply the special-case rewrites then drop subfolder segments
    #[must_use]
    pub fn rewrite(&self, key: &str) -> String {
        let mut rewritten = apply_rewrites(key, &self.config.special_case_rewrites);
        for token in self.config.subfolder_tokens.iter().filter(|t| !t.is_empty()) {
            rewritten = strip_segment(&rewritten, token);
        }
        rewritten
    }

    fn resolve_race_alias<L: VoiceLookup + ?Sized>(&self, key: &str, index: &L) -> Option<MatchHit> {
        for (race, aliases) in &self.config.race_aliases {
            let segment = format!("_{race}_");
            if race.is_empty() || !key.contains(&segment) {
                continue;
            }

            for alias in aliases {
                let candidate = key.replace(&segment, &format!("_{}_", alias.replace(' ', "_")));
                if candidate == key {
                    continue;
                }
                if let Some(voice) = index.lookup(&candidate) {
                    return Some(MatchHit {
                        voice,
                        rule: MatchRule::RaceAlias {
                            race: race.clone(),
                            alias: alias.clone(),
                        },
                        matched_key: candidate,
                    });
                }
            }
        }
        None
    }
}

/// Replace every `_token_` with `_`, including overlapping runs like `_t_t_`,
/// then drop a trailing `_token`
fn strip_segment(key: &str, token: &str) -> String {
    let segment = format!("_{token}_");
    let mut result = key.to_string();
    while result.contains(&segment) {
        result = result.replace(&segment, "_");
    }

    let tail = format!("_{token}");
    while let Some(stripped) = result.strip_suffix(&tail) {
        result = stripped.to_string();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Lookup that records every key it is asked for
    #[derive(Default)]
    struct SpyLookup {
        keys: HashMap<String, VoiceId>,
        asked: RefCell<Vec<String>>,
    }

    impl SpyLookup {
        fn with(keys: &[&str]) -> Self {
            Self {
                keys: keys
                    .iter()
                    .enumerate()
                    .map(|(i, k)| ((*k).to_string(), VoiceId(i)))
                    .collect(),
                asked: RefCell::default(),
            }
        }

        fn asked(&self) -> Vec<String> {
            self.asked.borrow().clone()
        }
    }

    impl VoiceLookup for SpyLookup {
        fn lookup(&self, key: &str) -> Option<VoiceId> {
            self.asked.borrow_mut().push(key.to_string());
            self.keys.get(key).copied()
        }
    }

    fn config() -> SubstitutionConfig {
        SubstitutionConfig::empty()
            .with_race("redguard", ["rougegarde", "imperial"])
            .with_subfolder_token("beggar")
            .with_rewrite("_alt01", "")
    }

    #[test]
    fn test_exact_match_skips_fallback_rules() {
        let index = SpyLookup::with(&["Play_redguard_alt01_beggar_x"]);
        let result = FallbackMatcher::new(config()).match_key(
            DescriptorId(0),
            "Play_redguard_alt01_beggar_x",
            &index,
        );

        assert!(result.found());
        assert_eq!(result.rule(), Some(&MatchRule::Exact));
        assert_eq!(index.asked(), ["Play_redguard_alt01_beggar_x"]);
    }

    #[test]
    fn test_rewrite_then_subfolder() {
        let index = SpyLookup::with(&["Play_npc_tired"]);
        let result = FallbackMatcher::new(config()).match_key(
            DescriptorId(3),
            "Play_npc_beggar_tired_alt01",
            &index,
        );

        assert_eq!(result.descriptor, DescriptorId(3));
        assert_eq!(result.rule(), Some(&MatchRule::Rewritten));
        assert_eq!(result.hit().unwrap().matched_key, "Play_npc_tired");
    }

    #[test]
    fn test_subfolder_token_stripping() {
        let index = SpyLookup::with(&["bark_tired"]);
        let result =
            FallbackMatcher::new(config()).match_key(DescriptorId(0), "bark_beggar_tired", &index);
        assert_eq!(result.voice(), Some(VoiceId(0)));
        assert_eq!(index.asked(), ["bark_beggar_tired", "bark_tired"]);
    }

    #[test]
    fn test_subfolder_token_must_be_a_whole_segment() {
        let matcher = FallbackMatcher::new(config());
        assert_eq!(matcher.rewrite("bark_beggars_tired"), "bark_beggars_tired");
        assert_eq!(matcher.rewrite("a_beggar_beggar_b"), "a_b");
    }

    #[test]
    fn test_trailing_subfolder_token() {
        let matcher = FallbackMatcher::new(config());
        assert_eq!(matcher.rewrite("Play_npc_hello_beggar"), "Play_npc_hello");
        assert_eq!(matcher.rewrite("Play_npc_beggar_hello_beggar"), "Play_npc_hello");
        assert_eq!(matcher.rewrite("Play_npc_hello_beggars"), "Play_npc_hello_beggars");
        assert_eq!(matcher.rewrite("Play_npc_hellobeggar"), "Play_npc_hellobeggar");

        let config = SubstitutionConfig::empty().with_subfolder_token("altvoice");
        let index = SpyLookup::with(&["Play_npc_hello"]);
        let result = FallbackMatcher::new(config).match_key(
            DescriptorId(0),
            "Play_npc_hello_altvoice",
            &index,
        );
        assert_eq!(result.rule(), Some(&MatchRule::Rewritten));
        assert_eq!(result.hit().unwrap().matched_key, "Play_npc_hello");
    }

    #[test]
    fn test_unchanged_rewrite_is_not_looked_up_twice() {
        let index = SpyLookup::with(&[]);
        FallbackMatcher::new(config()).match_key(DescriptorId(0), "Play_nothing_here", &index);
        assert_eq!(index.asked(), ["Play_nothing_here"]);
    }

    #[test]
    fn test_race_alias_first_candidate() {
        let index = SpyLookup::with(&["greeting_rougegarde_01"]);
        let result =
            FallbackMatcher::new(config()).match_key(DescriptorId(0), "greeting_redguard_01", &index);

        assert_eq!(
            result.rule(),
            Some(&MatchRule::RaceAlias {
                race: "redguard".to_string(),
                alias: "rougegarde".to_string(),
            })
        );
        assert_eq!(index.asked(), ["greeting_redguard_01", "greeting_rougegarde_01"]);
    }

    #[test]
    fn test_race_alias_priority_follows_configuration() {
        // Both candidates exist; the first configured alias must win
        // regardless of the order the keys were indexed in.
        for keys in [
            ["greeting_imperial_01", "greeting_rougegarde_01"],
            ["greeting_rougegarde_01", "greeting_imperial_01"],
        ] {
            let index = SpyLookup::with(&keys);
            let result = FallbackMatcher::new(config()).match_key(
                DescriptorId(0),
                "greeting_redguard_01",
                &index,
            );
            assert_eq!(result.hit().unwrap().matched_key, "greeting_rougegarde_01");
        }
    }

    #[test]
    fn test_first_configured_race_wins() {
        let config = SubstitutionConfig::empty()
            .with_race("nord", ["nordique"])
            .with_race("orc", ["ork"]);
        let index = SpyLookup::with(&["a_nordique_orc_b", "a_nord_ork_b"]);

        let result = FallbackMatcher::new(config).match_key(DescriptorId(0), "a_nord_orc_b", &index);
        assert_eq!(result.hit().unwrap().matched_key, "a_nordique_orc_b");
    }

    #[test]
    fn test_alias_with_space_is_underscored() {
        let config = SubstitutionConfig::empty().with_race("nord", ["haut elfe"]);
        let index = SpyLookup::with(&["a_haut_elfe_b"]);
        let result = FallbackMatcher::new(config).match_key(DescriptorId(0), "a_nord_b", &index);
        assert!(result.found());
    }

    #[test]
    fn test_race_substring_is_not_a_segment() {
        let index = SpyLookup::with(&["a_rougegardes_b"]);
        let result = FallbackMatcher::new(config()).match_key(DescriptorId(0), "a_redguards_b", &index);
        assert!(!result.found());
    }

    #[test]
    fn test_no_match() {
        let index = SpyLookup::with(&["Play_other"]);
        let result = FallbackMatcher::new(config()).match_key(
            DescriptorId(7),
            "Play_redguard_beggar_x",
            &index,
        );

        assert!(!result.found());
        assert_eq!(result.voice(), None);
        assert_eq!(result.rule(), None);
        assert_eq!(result.key, "Play_redguard_beggar_x");
    }

    #[test]
    fn test_match_is_deterministic() {
        let index = SpyLookup::with(&["greeting_imperial_01"]);
        let matcher = FallbackMatcher::new(config());
        let first = matcher.match_key(DescriptorId(1), "greeting_redguard_01", &index);
        let second = matcher.match_key(DescriptorId(1), "greeting_redguard_01", &index);
        assert_eq!(first, second);
    }
}
