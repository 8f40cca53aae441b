//! Threshold policy and advisory text.
//!
//! Two tiers, checked strongest first so at most one ever fires:
//!
//! | percentage            | outcome         |
//! |-----------------------|-----------------|
//! | `>= strong`           | strong advisory |
//! | `>= soft, < strong`   | soft advisory   |
//! | below soft            | silence         |

use std::fmt;

use serde::Serialize;

use crate::budget::BudgetState;
use crate::config::Settings;

const DEFAULT_SOFT_TEMPLATE: &str = "Context window {percent}% full ({used}/{capacity} tokens). \
     Consider pausing soon to save your progress and current state.";

const DEFAULT_STRONG_TEMPLATE: &str = "Context window {percent}% full ({used}/{capacity} tokens). \
     Save your current state now, then start a fresh session or run /compact.";

/// Severity of an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryTier {
    /// Approaching the limit; persist state soon
    Soft,
    /// At the limit; persist state and reset context
    Strong,
}

impl fmt::Display for AdvisoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryTier::Soft => write!(f, "soft"),
            AdvisoryTier::Strong => write!(f, "strong"),
        }
    }
}

/// A rendered advisory: one line of plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub tier: AdvisoryTier,
    pub text: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Thresholds plus the text for each tier
#[derive(Debug, Clone)]
pub struct AdvisoryPolicy {
    soft_pct: u64,
    strong_pct: u64,
    soft_template: String,
    strong_template: String,
}

impl Default for AdvisoryPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AdvisoryPolicy {
    /// Build the policy from monitor settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            soft_pct: settings.soft_threshold_pct,
            strong_pct: settings.strong_threshold_pct,
            soft_template: settings
                .messages
                .soft
                .clone()
                .unwrap_or_else(|| DEFAULT_SOFT_TEMPLATE.to_string()),
            strong_template: settings
                .messages
                .strong
                .clone()
                .unwrap_or_else(|| DEFAULT_STRONG_TEMPLATE.to_string()),
        }
    }

    /// Tier for a percentage, if any
    pub fn tier_for(&self, percentage: u64) -> Option<AdvisoryTier> {
        if percentage >= self.strong_pct {
            Some(AdvisoryTier::Strong)
        } else if percentage >= self.soft_pct {
            Some(AdvisoryTier::Soft)
        } else {
            None
        }
    }

    /// Render the advisory for a budget state, or `None` below the soft tier
    pub fn advise(&self, budget: &BudgetState) -> Option<Advisory> {
        let tier = self.tier_for(budget.percentage)?;
        let template = match tier {
            AdvisoryTier::Soft => &self.soft_template,
            AdvisoryTier::Strong => &self.strong_template,
        };
        Some(Advisory {
            tier,
            text: render(template, budget),
        })
    }
}

/// Fill placeholders and fold the result onto a single line
fn render(template: &str, budget: &BudgetState) -> String {
    let filled = template
        .replace("{percent}", &budget.percentage.to_string())
        .replace("{used}", &budget.used_tokens.to_string())
        .replace("{capacity}", &budget.capacity.to_string());

    filled
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
