//! Token usage accounting and cost estimation

use serde::{Deserialize, Serialize};

/// Token counts for one or more generation calls.
///
/// Providers accumulate these monotonically across a run; the stage
/// runner takes `delta_since` snapshots around each stage to attribute
/// usage per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Prompt-side tokens billed
    pub input_tokens: u64,

    /// Completion-side tokens billed
    pub output_tokens: u64,
}

impl UsageStats {
    /// Create usage from raw counts.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Combined token count.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Accumulate another usage sample into this one.
    pub fn add(&mut self, other: UsageStats) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    /// Usage accrued since an earlier snapshot of the same accumulator.
    pub fn delta_since(&self, earlier: UsageStats) -> UsageStats {
        UsageStats {
            input_tokens: self.input_tokens.saturating_sub(earlier.input_tokens),
            output_tokens: self.output_tokens.saturating_sub(earlier.output_tokens),
        }
    }

    /// Linear cost estimate in dollars, given per-1k-token prices.
    pub fn estimate_cost(&self, price_input_per_1k: f64, price_output_per_1k: f64) -> f64 {
        (self.input_tokens as f64 / 1000.0) * price_input_per_1k
            + (self.output_tokens as f64 / 1000.0) * price_output_per_1k
    }
}

/// Serialized usage row: counts plus the derived total and cost.
///
/// Costs are rounded to six decimal places so run metadata stays stable
/// across serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageBreakdown {
    /// Prompt-side tokens
    pub input_tokens: u64,

    /// Completion-side tokens
    pub output_tokens: u64,

    /// Combined token count
    pub total_tokens: u64,

    /// Estimated dollar cost, rounded to 6 decimals
    pub estimated_cost: f64,
}

impl UsageBreakdown {
    /// Build a breakdown row from usage and per-1k prices.
    pub fn from_usage(usage: UsageStats, price_input_per_1k: f64, price_output_per_1k: f64) -> Self {
        let cost = usage.estimate_cost(price_input_per_1k, price_output_per_1k);
        Self {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens(),
            estimated_cost: (cost * 1_000_000.0).round() / 1_000_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tokens() {
        assert_eq!(UsageStats::new(100, 50).total_tokens(), 150);
    }

    #[test]
    fn test_add_accumulates() {
        let mut usage = UsageStats::new(10, 5);
        usage.add(UsageStats::new(20, 15));
        assert_eq!(usage, UsageStats::new(30, 20));
    }

    #[test]
    fn test_delta_since() {
        let before = UsageStats::new(100, 40);
        let after = UsageStats::new(250, 90);
        assert_eq!(after.delta_since(before), UsageStats::new(150, 50));
    }

    #[test]
    fn test_delta_saturates_after_reset() {
        let before = UsageStats::new(100, 40);
        let after = UsageStats::new(10, 5);
        assert_eq!(after.delta_since(before), UsageStats::new(0, 0));
    }

    #[test]
    fn test_estimate_cost_is_linear_per_1k() {
        let usage = UsageStats::new(2000, 500);
        let cost = usage.estimate_cost(0.002, 0.006);
        assert!((cost - (0.004 + 0.003)).abs() < 1e-12);
    }

    #[test]
    fn test_breakdown_rounds_to_six_decimals() {
        let usage = UsageStats::new(1, 1);
        let breakdown = UsageBreakdown::from_usage(usage, 0.0000019, 0.0000011);
        assert_eq!(breakdown.total_tokens, 2);
        assert_eq!(breakdown.estimated_cost, 0.0);
    }
}
