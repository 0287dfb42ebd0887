use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ENV_SELECTION_STRATEGY;
use crate::errors::Error;

/// How the registry picks among providers registered for one platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Lowest priority value wins; ties keep registration order.
    #[default]
    Priority,
    /// Uniform choice among candidates.
    Random,
    /// Wall-clock milliseconds modulo the candidate count.
    RoundRobin,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Random => "random",
            Self::RoundRobin => "round-robin",
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(Self::Priority),
            "random" => Ok(Self::Random),
            "round-robin" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            other => Err(Error::configuration(
                format!("Unknown selection strategy: {}", other),
                ENV_SELECTION_STRATEGY,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        assert_eq!("Priority".parse::<SelectionStrategy>().unwrap(), SelectionStrategy::Priority);
        assert_eq!(
            "round_robin".parse::<SelectionStrategy>().unwrap(),
            SelectionStrategy::RoundRobin
        );
        assert!("fastest".parse::<SelectionStrategy>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let value = serde_json::to_value(SelectionStrategy::RoundRobin).unwrap();
        assert_eq!(value, "round-robin");
    }
}
