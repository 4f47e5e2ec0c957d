use crate::rule_set::RuleSet;

/// Default cap on the number of canonical cells kept around between two calls.
pub const DEFAULT_CACHE_LIMIT: usize = 1 << 22;

/// Knobs of a [`HashLifeAlgorithm`](crate::HashLifeAlgorithm).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub rule: RuleSet,

    /// Once the canonical table grows past this many cells, it is cleared as a whole before the
    /// next call. `None` lets it grow forever.
    pub cache_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rule: RuleSet::default(),
            cache_limit: Some(DEFAULT_CACHE_LIMIT),
        }
    }
}

impl EngineConfig {
    pub fn rule(mut self, rule: RuleSet) -> Self {
        self.rule = rule;
        self
    }

    pub fn cache_limit(mut self, cache_limit: Option<usize>) -> Self {
        self.cache_limit = cache_limit;
        self
    }
}
