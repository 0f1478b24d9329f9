use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{NodeId, NodeKind, NodeRef};

/// What is being dragged and where it was dragged from.
pub type DragPayload = NodeRef;

pub const TREE_ITEM_KEY: &str = "treeItem";
pub const POSITION_KEY: &str = "position";
pub const SUBJECT_ID_KEY: &str = "subjectId";
pub const FOLDER_ID_KEY: &str = "folderId";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("drag data carries no tree item")]
    Missing,
    #[error("drag data tree item is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("drag data position is not an index: {0}")]
    InvalidPosition(String),
}

/// String keyed drag data channel, shaped like a platform drag data store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragData {
    entries: BTreeMap<String, String>,
}

impl DragData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `payload` under [`TREE_ITEM_KEY`] and the flat id key for its
    /// kind, plus the sibling index for positional reorders.
    pub fn encode(payload: &DragPayload, position: Option<usize>) -> Result<Self, PayloadError> {
        let mut data = Self::new();
        data.set(TREE_ITEM_KEY, serde_json::to_string(payload)?);
        let flat_key = match payload.kind {
            NodeKind::Subject => SUBJECT_ID_KEY,
            NodeKind::Folder => FOLDER_ID_KEY,
        };
        data.set(flat_key, payload.id.as_str());
        if let Some(position) = position {
            data.set(POSITION_KEY, position.to_string());
        }
        Ok(data)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode the dragged item.
    ///
    /// Falls back to the flat `subjectId` / `folderId` keys written by older
    /// drag sources; those carry no parent.
    pub fn payload(&self) -> Result<DragPayload, PayloadError> {
        if let Some(raw) = self.get(TREE_ITEM_KEY) {
            return Ok(serde_json::from_str(raw)?);
        }

        let legacy = [
            (SUBJECT_ID_KEY, NodeKind::Subject),
            (FOLDER_ID_KEY, NodeKind::Folder),
        ];
        legacy
            .into_iter()
            .find_map(|(key, kind)| {
                self.get(key)
                    .filter(|id| !id.is_empty())
                    .map(|id| NodeRef {
                        id: NodeId::from(id),
                        kind,
                        parent_id: None,
                    })
            })
            .ok_or(PayloadError::Missing)
    }

    pub fn position(&self) -> Result<Option<usize>, PayloadError> {
        self.get(POSITION_KEY)
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| PayloadError::InvalidPosition(raw.to_string()))
            })
            .transpose()
    }
}
