//! Picks the graph nodes a question is about
//!
//! Pure keyword heuristics, no ranking: matches come back in graph order.

use crate::graph::{GraphNode, HouseholdGraph};

/// Upper bound on relevant nodes
pub const MAX_RELEVANT: usize = 20;

/// Share of keywords a node must contain to count as relevant
const KEYWORD_RATIO: f64 = 0.3;

/// Lower-cased question words longer than two characters, with surrounding
/// punctuation stripped
pub fn keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() > 2)
        .map(String::from)
        .collect()
}

/// Minimum keyword hits for a question with `count` keywords
pub fn keyword_threshold(count: usize) -> usize {
    ((count as f64 * KEYWORD_RATIO).ceil() as usize).max(1)
}

/// Nodes relevant to a question, in graph order, at most [`MAX_RELEVANT`]
pub fn find_relevant<'g>(graph: &'g HouseholdGraph, question: &str) -> Vec<&'g GraphNode> {
    let question_lower = question.to_lowercase();
    let words = keywords(question);
    let threshold = keyword_threshold(words.len());

    graph
        .nodes
        .iter()
        .filter(|node| is_relevant(node, &question_lower, &words, threshold))
        .take(MAX_RELEVANT)
        .collect()
}

fn is_relevant(node: &GraphNode, question: &str, words: &[String], threshold: usize) -> bool {
    let label = node.label.trim().to_lowercase();
    let question = question.trim();
    if !label.is_empty()
        && !question.is_empty()
        && (question.contains(&label) || label.contains(question))
    {
        return true;
    }
    if words.is_empty() {
        return false;
    }

    let attributes = serde_json::to_string(&node.attributes)
        .unwrap_or_default()
        .to_lowercase();
    let hits = words
        .iter()
        .filter(|word| label.contains(word.as_str()) || attributes.contains(word.as_str()))
        .count();
    hits >= threshold
}
