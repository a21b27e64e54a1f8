use serde::{Deserialize, Serialize};

/// Input and output token counts for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    pub input: u64,
    pub output: u64,
}

/// Pricing per million tokens for a Bedrock model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPricing {
    pub fn estimate_cost(&self, tokens: TokenCount) -> f64 {
        let input_cost = (tokens.input as f64 / 1_000_000.0) * self.input_per_million;
        let output_cost = (tokens.output as f64 / 1_000_000.0) * self.output_per_million;
        input_cost + output_cost
    }
}

/// Converse reports counts as `i32`; negative values are treated as zero.
pub fn extract_token_usage(usage: &aws_sdk_bedrockruntime::types::TokenUsage) -> TokenCount {
    TokenCount {
        input: usage.input_tokens.max(0) as u64,
        output: usage.output_tokens.max(0) as u64,
    }
}

/// Approximate on-demand prices per million tokens, matched by substring
/// of the model or inference profile ID. First match wins.
const PRICING: &[(&str, f64, f64)] = &[
    ("claude-opus-4", 15.0, 75.0),
    ("claude-sonnet-4", 3.0, 15.0),
    ("claude-3-7-sonnet", 3.0, 15.0),
    ("claude-3-5-haiku", 0.80, 4.0),
    ("claude-haiku-4", 1.0, 5.0),
    ("nova-pro", 0.80, 3.20),
    ("nova-lite", 0.06, 0.24),
];

pub fn get_pricing(model_id: &str) -> Option<ModelPricing> {
    PRICING
        .iter()
        .find(|(needle, _, _)| model_id.contains(needle))
        .map(|&(_, input_per_million, output_per_million)| ModelPricing {
            input_per_million,
            output_per_million,
        })
}
