use serde::{Deserialize, Serialize};
use std::env;

/// Largest hand the combo endpoint may be configured to accept. Combo
/// counts grow exponentially with hand size; 18 cards stays around a
/// hundred thousand combos.
pub const HAND_SIZE_CEILING: usize = 18;

/// Game context threaded through the rule engine in place of global game
/// state: how many decks are shuffled together and which round is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleContext {
    pub decks: u8,
    #[serde(default)]
    pub round: u32,
}

impl Default for RuleContext {
    fn default() -> Self {
        Self { decks: 2, round: 0 }
    }
}

impl RuleContext {
    pub fn new(decks: u8) -> Self {
        Self {
            decks,
            ..Self::default()
        }
    }

    pub fn with_round(self, round: u32) -> Self {
        Self { round, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub decks: u8,
    /// Largest hand accepted by the combo endpoint, at most
    /// [`HAND_SIZE_CEILING`].
    pub max_hand_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            decks: 2,
            max_hand_size: 16,
        }
    }
}

impl ServerConfig {
    /// Reads `RUMMY_BIND_ADDR`, `RUMMY_DECKS` and `RUMMY_MAX_HAND`, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("RUMMY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            decks: lookup("RUMMY_DECKS")
                .and_then(|v| v.parse().ok())
                .filter(|d| *d > 0)
                .unwrap_or(defaults.decks),
            max_hand_size: lookup("RUMMY_MAX_HAND")
                .and_then(|v| v.parse::<usize>().ok())
                .map(|n| n.min(HAND_SIZE_CEILING))
                .unwrap_or(defaults.max_hand_size),
        }
    }

    pub fn rule_context(&self) -> RuleContext {
        RuleContext::new(self.decks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.rule_context(), RuleContext::default());
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = [
            ("RUMMY_BIND_ADDR", "127.0.0.1:8080"),
            ("RUMMY_DECKS", "0"),
            ("RUMMY_MAX_HAND", "12"),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.decks, 2);
        assert_eq!(config.max_hand_size, 12);
    }

    #[test]
    fn hand_limit_is_capped() {
        let config = ServerConfig::from_lookup(|k| (k == "RUMMY_MAX_HAND").then(|| "40".to_string()));
        assert_eq!(config.max_hand_size, HAND_SIZE_CEILING);
        assert!(ServerConfig::default().max_hand_size <= HAND_SIZE_CEILING);
    }

    #[test]
    fn context_round_is_optional_on_the_wire() {
        let ctx: RuleContext = serde_json::from_str(r#"{"decks":1}"#).unwrap();
        assert_eq!(ctx, RuleContext::new(1));
        assert_eq!(ctx.with_round(5).round, 5);
    }
}
