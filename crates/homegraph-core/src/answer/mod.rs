//! Model-first answering with a deterministic fallback

pub mod fallback;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::serialize_graph;
use crate::error::{Error, Result};
use crate::graph::{GraphNode, HouseholdGraph};
use crate::llm::TextCompleter;

pub use fallback::{Intent, NOTHING_FOUND, fallback_answer};

/// Instructions sent with every model call
pub const SYSTEM_PROMPT: &str = "You are a household assistant answering questions about one household. \
Answer only from the household data provided. If the data does not contain the answer, say so honestly \
instead of guessing. Format dates in a readable way (for example, Mar 4, 2026). \
Keep answers concise, no more than 200 words.";

/// Completion bounds for the model call
pub const DEFAULT_MAX_TOKENS: usize = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Where an answer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Text produced by the language model
    Model(String),
    /// Text produced by the rule-based fallback
    Fallback(String),
}

impl Answer {
    /// Keep a successful model answer, otherwise log the failure and use the
    /// fallback
    pub fn recover(model: Result<String>, fallback: impl FnOnce() -> String) -> Self {
        match model {
            Ok(text) => Self::Model(text),
            Err(err) => {
                let degraded = Error::AnswerDegraded(err.to_string());
                warn!(code = degraded.code(), error = %degraded, "Using fallback answer");
                Self::Fallback(fallback())
            }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Model(text) | Self::Fallback(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Model(text) | Self::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Chooses between the model and the fallback for each question
#[derive(Clone)]
pub struct AnswerEngine {
    completer: Option<Arc<dyn TextCompleter>>,
    max_tokens: usize,
    temperature: f32,
}

impl Default for AnswerEngine {
    fn default() -> Self {
        Self::offline()
    }
}

impl AnswerEngine {
    /// Engine that always answers with the fallback
    pub fn offline() -> Self {
        Self {
            completer: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Engine that asks the model first
    pub fn with_completer(completer: Arc<dyn TextCompleter>) -> Self {
        Self {
            completer: Some(completer),
            ..Self::offline()
        }
    }

    pub fn with_bounds(mut self, max_tokens: usize, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn has_model(&self) -> bool {
        self.completer.is_some()
    }

    /// Answer a question about a graph
    pub async fn answer(
        &self,
        question: &str,
        graph: &HouseholdGraph,
        relevant: &[&GraphNode],
    ) -> Answer {
        let Some(completer) = &self.completer else {
            debug!("No model configured, answering from rules");
            return Answer::Fallback(fallback_answer(question, relevant));
        };

        let user = format!(
            "Household data:\n{}\n\nQuestion: {}",
            serialize_graph(graph),
            question
        );
        let result = completer
            .complete(SYSTEM_PROMPT, &user, self.max_tokens, self.temperature)
            .await
            .and_then(|text| {
                let text = text.trim().to_string();
                if text.is_empty() {
                    Err(Error::LLMError("Model returned an empty answer".into()))
                } else {
                    Ok(text)
                }
            });

        Answer::recover(result, || fallback_answer(question, relevant))
    }
}
