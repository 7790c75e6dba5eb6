use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filetype::ExtractedBy;

/// One page of extracted text, `page_id` dense and 0-based per
/// `(file_hash, extracted_by)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContentRow {
    pub collection_dataset: String,
    pub file_hash: String,
    pub extracted_by: ExtractedBy,
    pub page_id: u32,
    pub text: String,
}

/// Named-entity category. `GPE` labels from the NER sidecar fold into `Loc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Per,
    Org,
    Loc,
    Misc,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityType::Per => "PER",
            EntityType::Org => "ORG",
            EntityType::Loc => "LOC",
            EntityType::Misc => "MISC",
        };
        f.write_str(s)
    }
}

impl EntityType {
    /// Map a raw NER sidecar label to our fixed vocabulary. `GPE` folds
    /// into `Loc`; anything else is unrecognized and dropped by the caller.
    pub fn from_ner_label(label: &str) -> Option<EntityType> {
        match label {
            "PER" => Some(EntityType::Per),
            "ORG" => Some(EntityType::Org),
            "LOC" | "GPE" => Some(EntityType::Loc),
            "MISC" => Some(EntityType::Misc),
            _ => None,
        }
    }
}

/// `(dataset, file_hash, extracted_by, page_id, entity_type) -> values[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHit {
    pub collection_dataset: String,
    pub file_hash: String,
    pub extracted_by: ExtractedBy,
    pub page_id: u32,
    pub entity_type: EntityType,
    pub entity_values: Vec<String>,
}

/// Append-only per-task failure row, written by the error journal (C10).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingErrorRow {
    pub collection_dataset: String,
    pub hash: String,
    pub task_name: String,
    pub run_time_ms: u64,
    pub error_logs: String,
    pub timestamp_unix_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ner_label_mapping() {
        assert_eq!(EntityType::from_ner_label("PER"), Some(EntityType::Per));
        assert_eq!(EntityType::from_ner_label("GPE"), Some(EntityType::Loc));
        assert_eq!(EntityType::from_ner_label("LOC"), Some(EntityType::Loc));
        assert_eq!(EntityType::from_ner_label("MISC"), Some(EntityType::Misc));
        assert_eq!(EntityType::from_ner_label("WEIRD"), None);
    }
}
