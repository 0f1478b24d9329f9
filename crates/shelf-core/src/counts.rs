use std::collections::{HashMap, HashSet};

use crate::model::{FolderNode, NodeId, ShelfSnapshot};

/// Subjects and folders transitively contained in a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FolderCounts {
    pub subject_count: usize,
    pub folder_count: usize,
}

impl FolderCounts {
    pub fn total_count(&self) -> usize {
        self.subject_count.saturating_add(self.folder_count)
    }
}

/// Count everything below `folder`.
///
/// Every folder's own `subjectIds`/`folderIds` lengths are added, then its
/// child folders are walked. A folder is visited at most once, so a cyclic
/// listing terminates (and undercounts). With an empty `all_folders` only the
/// shallow counts of `folder` itself are returned.
pub fn folder_counts(folder: &FolderNode, all_folders: &[FolderNode]) -> FolderCounts {
    let shallow = FolderCounts {
        subject_count: folder.subject_ids.len(),
        folder_count: folder.folder_ids.len(),
    };
    if all_folders.is_empty() {
        return shallow;
    }

    let lookup: HashMap<&NodeId, &FolderNode> =
        all_folders.iter().map(|folder| (&folder.id, folder)).collect();

    let mut counts = shallow;
    let mut visited: HashSet<&NodeId> = HashSet::new();
    visited.insert(&folder.id);
    let mut pending: Vec<&NodeId> = folder.folder_ids.iter().rev().collect();

    while let Some(id) = pending.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(child) = lookup.get(id) else {
            continue;
        };
        counts.subject_count = counts.subject_count.saturating_add(child.subject_ids.len());
        counts.folder_count = counts.folder_count.saturating_add(child.folder_ids.len());
        pending.extend(child.folder_ids.iter().rev());
    }

    counts
}

/// Per-snapshot memo of [`folder_counts`], meant to live for one render pass.
#[derive(Debug, Default)]
pub struct CountCache {
    counts: HashMap<NodeId, FolderCounts>,
}

impl CountCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, snapshot: &ShelfSnapshot, folder: &FolderNode) -> FolderCounts {
        if let Some(counts) = self.counts.get(&folder.id) {
            return *counts;
        }
        let counts = folder_counts(folder, &snapshot.folders);
        self.counts.insert(folder.id.clone(), counts);
        counts
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
