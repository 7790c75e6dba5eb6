//! # hoover-ner
//!
//! HTTP client for the NER AI sidecar: `POST /extract-entities` with a
//! batch of page texts, grouped into the fixed `{PER, ORG, LOC, MISC}`
//! vocabulary per input text (`GPE` folds into `LOC`), exactly mirroring
//! the original `extract_ner_from_texts` / `_group_entities_by_text` pair.

use hoover_config::AiSidecarConfig;
use hoover_types::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum NerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    input: &'a [String],
    include_confidence: bool,
    entity_types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    data: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    label: String,
    text: String,
    #[serde(default)]
    text_index: usize,
}

/// One text's extracted entities, keyed by our fixed vocabulary.
pub type EntitiesByType = HashMap<EntityType, Vec<String>>;

pub struct NerClient {
    http: reqwest::Client,
    extract_entities_url: String,
}

impl NerClient {
    pub fn from_config(config: &AiSidecarConfig) -> Result<Self, NerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(3000))
            .build()?;
        Ok(Self {
            http,
            extract_entities_url: config.ner_url.clone(),
        })
    }

    /// Extracts entities from a batch of texts. Returns one
    /// `EntitiesByType` per input text, in order, with every vocabulary
    /// key present (possibly empty) even when the server yields nothing.
    pub async fn extract_entities(&self, texts: &[String]) -> Result<Vec<EntitiesByType>, NerError> {
        if texts.is_empty() || texts.iter().all(|t| t.trim().is_empty()) {
            return Ok(texts.iter().map(|_| empty_buckets()).collect());
        }

        let request = ExtractRequest {
            input: texts,
            include_confidence: false,
            entity_types: None,
        };
        let response = self
            .http
            .post(&self.extract_entities_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ExtractResponse>()
            .await?;

        Ok(group_entities_by_text(response.data, texts.len()))
    }
}

fn empty_buckets() -> EntitiesByType {
    [EntityType::Per, EntityType::Org, EntityType::Loc, EntityType::Misc]
        .into_iter()
        .map(|t| (t, Vec::new()))
        .collect()
}

/// `_group_entities_by_text`: groups a flat entity list by `text_index`
/// (always bucket 0 when there was only a single input text) into the
/// fixed vocabulary, folding `GPE` into `LOC` and dropping unrecognized
/// labels.
fn group_entities_by_text(entities: Vec<RawEntity>, num_texts: usize) -> Vec<EntitiesByType> {
    let mut result: Vec<EntitiesByType> = (0..num_texts).map(|_| empty_buckets()).collect();
    for entity in entities {
        let index = if num_texts > 1 { entity.text_index } else { 0 };
        let Some(bucket) = result.get_mut(index) else { continue };
        if let Some(entity_type) = EntityType::from_ner_label(&entity.label) {
            bucket.entry(entity_type).or_default().push(entity.text);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_single_text_ignoring_text_index() {
        let entities = vec![
            RawEntity { label: "PER".into(), text: "Alice".into(), text_index: 5 },
            RawEntity { label: "GPE".into(), text: "Paris".into(), text_index: 0 },
        ];
        let grouped = group_entities_by_text(entities, 1);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0][&EntityType::Per], vec!["Alice".to_string()]);
        assert_eq!(grouped[0][&EntityType::Loc], vec!["Paris".to_string()]);
    }

    #[test]
    fn unrecognized_label_is_dropped() {
        let entities = vec![RawEntity { label: "WEIRD".into(), text: "x".into(), text_index: 0 }];
        let grouped = group_entities_by_text(entities, 1);
        assert!(grouped[0].values().all(|v| v.is_empty()));
    }

    #[test]
    fn multi_text_uses_text_index_to_route() {
        let entities = vec![
            RawEntity { label: "ORG".into(), text: "Acme".into(), text_index: 1 },
        ];
        let grouped = group_entities_by_text(entities, 2);
        assert!(grouped[0][&EntityType::Org].is_empty());
        assert_eq!(grouped[1][&EntityType::Org], vec!["Acme".to_string()]);
    }
}
