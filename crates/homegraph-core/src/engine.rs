//! Per-request orchestration: load, build, retrieve, mine, answer

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::answer::AnswerEngine;
use crate::connections::mine_connections;
use crate::error::{Error, Result};
use crate::graph::{GraphBuilder, GraphNode, HouseholdGraph, NodeType};
use crate::llm::TextCompleter;
use crate::records::{HouseholdRecordStore, LoaderConfig, RecordLoader};
use crate::retrieval::find_relevant;

/// Relevant nodes cited as sources
pub const MAX_SOURCES: usize = 10;

/// A node cited in an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    pub id: String,
}

impl From<&GraphNode> for SourceRef {
    fn from(node: &GraphNode) -> Self {
        Self {
            node_type: node.node_type,
            label: node.label.clone(),
            id: node.id.to_string(),
        }
    }
}

/// Everything returned for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResult {
    pub answer: String,
    pub connections: Vec<String>,
    pub sources: Vec<SourceRef>,
    pub graph_summary: String,
}

/// Builds household graphs and answers questions about them
///
/// Holds no per-household state; every call loads and builds afresh.
pub struct HouseholdEngine<S: HouseholdRecordStore + ?Sized> {
    loader: RecordLoader<S>,
    builder: GraphBuilder,
    answers: AnswerEngine,
}

impl<S: HouseholdRecordStore + ?Sized> HouseholdEngine<S> {
    /// Engine with default loader settings and no model
    pub fn new(store: Arc<S>) -> Self {
        Self {
            loader: RecordLoader::new(store),
            builder: GraphBuilder::new(),
            answers: AnswerEngine::offline(),
        }
    }

    pub fn with_loader_config(mut self, config: LoaderConfig) -> Self {
        self.loader = self.loader.with_config(config);
        self
    }

    /// Answer with a model first, falling back to rules on failure
    pub fn with_completer(mut self, completer: Arc<dyn TextCompleter>) -> Self {
        self.answers = AnswerEngine::with_completer(completer);
        self
    }

    pub fn with_answer_engine(mut self, answers: AnswerEngine) -> Self {
        self.answers = answers;
        self
    }

    pub fn with_builder(mut self, builder: GraphBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn has_model(&self) -> bool {
        self.answers.has_model()
    }

    /// Build the current graph for a household
    pub async fn build_graph(&self, household_id: &str) -> Result<HouseholdGraph> {
        self.build_graph_at(household_id, Utc::now()).await
    }

    /// Build the graph as of `now`
    pub async fn build_graph_at(
        &self,
        household_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HouseholdGraph> {
        let records = self.loader.load(household_id, now).await?;
        let graph = self.builder.build(&records);
        info!(household_id = %household_id, summary = %graph.summary, "Built household graph");
        Ok(graph)
    }

    /// Answer a question about a household
    pub async fn ask(&self, household_id: &str, question: &str) -> Result<AskResult> {
        self.ask_at(household_id, question, Utc::now()).await
    }

    /// Answer a question as of `now`
    pub async fn ask_at(
        &self,
        household_id: &str,
        question: &str,
        now: DateTime<Utc>,
    ) -> Result<AskResult> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must not be empty".into()));
        }

        let graph = self.build_graph_at(household_id, now).await?;
        let relevant = find_relevant(&graph, question);
        let connections = mine_connections(&graph, now.date_naive());
        let answer = self.answers.answer(question, &graph, &relevant).await;

        info!(
            household_id = %household_id,
            relevant = relevant.len(),
            connections = connections.len(),
            fallback = answer.is_fallback(),
            "Answered household question"
        );

        Ok(AskResult {
            answer: answer.into_text(),
            connections,
            sources: relevant
                .iter()
                .take(MAX_SOURCES)
                .map(|node| SourceRef::from(*node))
                .collect(),
            graph_summary: graph.summary.clone(),
        })
    }
}
