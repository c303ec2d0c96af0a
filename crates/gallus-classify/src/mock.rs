//! Mock generation backend for deterministic testing.
//!
//! Returns canned responses keyed on prompt content and records every
//! call for assertion. Fully deterministic: the idempotence and precedence
//! properties are tested against this backend.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use gallus_core::{Error, GenerationBackend, Result};

#[derive(Debug, Clone)]
struct MockConfig {
    /// Response mappings matched by prompt substring, in key order.
    mapped_responses: BTreeMap<String, String>,
    default_response: String,
    failure: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mapped_responses: BTreeMap::new(),
            default_response: "{}".to_string(),
            failure: None,
        }
    }
}

/// Deterministic mock backend.
#[derive(Clone, Default)]
pub struct MockBackend {
    config: Arc<MockConfig>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    /// Create a mock that answers `{}` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response for any prompt without a more specific mapping.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Answer `response` to prompts containing `prompt_substring`.
    pub fn with_response_for(
        mut self,
        prompt_substring: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .mapped_responses
            .insert(prompt_substring.into(), response.into());
        self
    }

    /// Fail every call with an inference error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    /// All prompts seen so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of generation calls made.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(message) = &self.config.failure {
            return Err(Error::Inference(message.clone()));
        }

        for (substring, response) in &self.config.mapped_responses {
            if prompt.contains(substring) {
                return Ok(response.clone());
            }
        }
        Ok(self.config.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
