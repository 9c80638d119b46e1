//! Request configuration for rig-backed extraction.

/// Default model: a snapshot that supports strict structured outputs.
pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";

/// Default name of the structured-output schema.
pub const DEFAULT_SCHEMA_NAME: &str = "ocrs_recipe";

/// Settings sent with every extraction request.
///
/// Defaults favor reproducibility: zero temperature and a fixed seed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Provider label recorded on every extracted record.
    pub provider_name: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature. Default: 0.
    pub temperature: f64,
    /// Sampling seed. Default: 42.
    pub seed: u64,
    /// Completion token ceiling. Default: 4096.
    pub max_tokens: u64,
    /// Name given to the strict output schema.
    pub schema_name: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_name: "openai".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            seed: 42,
            max_tokens: 4096,
            schema_name: DEFAULT_SCHEMA_NAME.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Set the provider label.
    #[must_use]
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the completion token ceiling.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}
