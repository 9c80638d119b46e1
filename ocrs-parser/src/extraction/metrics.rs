//! Metrics collected across a pipeline run.

use std::time::Duration;

use serde::Serialize;

use crate::provider::TokenUsage;

/// Metrics collected during a pipeline run.
///
/// Counts and timings only; intermediate error text never lands here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionMetrics {
    /// Attempts started, including the final one.
    pub attempts: usize,
    /// Provider calls made, whether or not they returned a record.
    pub provider_calls: usize,
    /// Wall-clock time elapsed during the run.
    pub wall_time: Duration,
    /// Token usage summed across provider calls that returned a record.
    pub usage: TokenUsage,
}

impl ExtractionMetrics {
    pub(crate) fn add_usage(&mut self, usage: TokenUsage) {
        self.usage = self.usage + usage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_usage_accumulates() {
        let mut metrics = ExtractionMetrics::default();
        metrics.add_usage(TokenUsage::new(100, 20));
        metrics.add_usage(TokenUsage::new(150, 30));

        assert_eq!(metrics.usage, TokenUsage::new(250, 50));
        assert_eq!(metrics.usage.total(), 300);
    }
}
