//! Token usage counters.

use serde::{Deserialize, Serialize};

/// Input/output token counts reported by the LLM client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input_tokens: u64,
    /// Completion tokens.
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Add another response's usage into this accumulator.
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_sums() {
        let mut total = TokenUsage::default();
        total.accumulate(TokenUsage {
            input_tokens: 10,
            output_tokens: 3,
        });
        total.accumulate(TokenUsage {
            input_tokens: 5,
            output_tokens: 2,
        });
        assert_eq!(total.input_tokens, 15);
        assert_eq!(total.output_tokens, 5);
    }

    #[test]
    fn accumulate_saturates() {
        let mut total = TokenUsage {
            input_tokens: u64::MAX,
            output_tokens: 0,
        };
        total.accumulate(TokenUsage {
            input_tokens: 1,
            output_tokens: 1,
        });
        assert_eq!(total.input_tokens, u64::MAX);
    }
}
