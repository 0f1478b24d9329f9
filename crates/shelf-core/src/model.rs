use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque identifier of a folder or subject document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Folder,
    Subject,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::Subject => "subject",
        }
    }
}

/// `{id, type, parentId}` of a node, as carried by drags and drop targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
}

impl NodeRef {
    pub fn folder(id: impl Into<NodeId>, parent_id: Option<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Folder,
            parent_id,
        }
    }

    pub fn subject(id: impl Into<NodeId>, parent_id: Option<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Subject,
            parent_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub subject_ids: Vec<NodeId>,
    #[serde(default)]
    pub folder_ids: Vec<NodeId>,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub shared_with: BTreeSet<String>,
}

impl FolderNode {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: String::new(),
            icon: "folder".to_string(),
            description: None,
            tags: Vec::new(),
            parent_id: None,
            subject_ids: Vec::new(),
            folder_ids: Vec::new(),
            is_shared: false,
            shared_with: BTreeSet::new(),
        }
    }

    pub fn parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn subjects<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.subject_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn folders<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.folder_ids.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// Quiz topic attached to a subject. Only the count matters to the shelf, the
/// rest of the document is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Topic {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectNode {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub is_shared: bool,
}

impl SubjectNode {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: String::new(),
            icon: "book".to_string(),
            course: None,
            tags: Vec::new(),
            topics: Vec::new(),
            parent_id: None,
            is_shared: false,
        }
    }

    pub fn parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }
}

/// Uniform read-only view over either node kind.
#[derive(Debug, Clone, Copy)]
pub enum TreeNode<'a> {
    Folder(&'a FolderNode),
    Subject(&'a SubjectNode),
}

impl<'a> TreeNode<'a> {
    pub fn id(&self) -> &'a NodeId {
        match self {
            TreeNode::Folder(folder) => &folder.id,
            TreeNode::Subject(subject) => &subject.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::Folder(_) => NodeKind::Folder,
            TreeNode::Subject(_) => NodeKind::Subject,
        }
    }

    pub fn parent_id(&self) -> Option<&'a NodeId> {
        match self {
            TreeNode::Folder(folder) => folder.parent_id.as_ref(),
            TreeNode::Subject(subject) => subject.parent_id.as_ref(),
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            TreeNode::Folder(folder) => &folder.name,
            TreeNode::Subject(subject) => &subject.name,
        }
    }

    pub fn icon(&self) -> &'a str {
        match self {
            TreeNode::Folder(folder) => &folder.icon,
            TreeNode::Subject(subject) => &subject.icon,
        }
    }

    pub fn color(&self) -> &'a str {
        match self {
            TreeNode::Folder(folder) => &folder.color,
            TreeNode::Subject(subject) => &subject.color,
        }
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: self.id().clone(),
            kind: self.kind(),
            parent_id: self.parent_id().cloned(),
        }
    }
}

/// The whole forest of folders and subjects as delivered by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShelfSnapshot {
    #[serde(default)]
    pub folders: Vec<FolderNode>,
    #[serde(default)]
    pub subjects: Vec<SubjectNode>,
}

impl ShelfSnapshot {
    pub fn new(folders: Vec<FolderNode>, subjects: Vec<SubjectNode>) -> Self {
        Self { folders, subjects }
    }

    pub fn folder(&self, id: &NodeId) -> Option<&FolderNode> {
        self.folders.iter().find(|folder| folder.id == *id)
    }

    pub fn subject(&self, id: &NodeId) -> Option<&SubjectNode> {
        self.subjects.iter().find(|subject| subject.id == *id)
    }

    pub fn node(&self, id: &NodeId, kind: NodeKind) -> Option<TreeNode<'_>> {
        match kind {
            NodeKind::Folder => self.folder(id).map(TreeNode::Folder),
            NodeKind::Subject => self.subject(id).map(TreeNode::Subject),
        }
    }

    pub fn root_folders(&self) -> impl Iterator<Item = &FolderNode> {
        self.folders
            .iter()
            .filter(|folder| folder.parent_id.is_none())
    }

    pub fn root_subjects(&self) -> impl Iterator<Item = &SubjectNode> {
        self.subjects
            .iter()
            .filter(|subject| subject.parent_id.is_none())
    }

    /// Child folders of `folder` in manual order. Dangling ids are skipped.
    pub fn child_folders<'a>(
        &'a self,
        folder: &'a FolderNode,
    ) -> impl Iterator<Item = &'a FolderNode> + 'a {
        folder.folder_ids.iter().filter_map(|id| self.folder(id))
    }

    /// Child subjects of `folder` in manual order. Dangling ids are skipped.
    pub fn child_subjects<'a>(
        &'a self,
        folder: &'a FolderNode,
    ) -> impl Iterator<Item = &'a SubjectNode> + 'a {
        folder.subject_ids.iter().filter_map(|id| self.subject(id))
    }

    /// Folders from the root down to and including `id`.
    pub fn ancestry(&self, id: &NodeId) -> Vec<&FolderNode> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = self.folder(id);
        while let Some(folder) = cursor {
            if !seen.insert(&folder.id) {
                break;
            }
            path.push(folder);
            cursor = folder.parent_id.as_ref().and_then(|id| self.folder(id));
        }
        path.reverse();
        path
    }

    /// Whether `candidate` sits strictly below the folder `ancestor`, following
    /// both `folderIds` downwards and `parentId` upwards.
    pub fn is_descendant(&self, ancestor: &NodeId, candidate: &NodeId) -> bool {
        if ancestor == candidate {
            return false;
        }

        let mut seen = HashSet::new();
        let mut cursor = self
            .folder(candidate)
            .and_then(|folder| folder.parent_id.as_ref());
        while let Some(parent_id) = cursor {
            if parent_id == ancestor {
                return true;
            }
            if !seen.insert(parent_id) {
                break;
            }
            cursor = self
                .folder(parent_id)
                .and_then(|folder| folder.parent_id.as_ref());
        }

        let mut visited = HashSet::new();
        let mut stack = vec![ancestor];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(folder) = self.folder(id) else {
                continue;
            };
            for child in &folder.folder_ids {
                if child == candidate {
                    return true;
                }
                stack.push(child);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ShelfSnapshot {
        ShelfSnapshot::new(
            vec![
                FolderNode::new("a", "A").folders(["b"]).subjects(["s1"]),
                FolderNode::new("b", "B").parent("a").folders(["c"]),
                FolderNode::new("c", "C").parent("b"),
                FolderNode::new("d", "D"),
            ],
            vec![
                SubjectNode::new("s1", "Algebra").parent("a"),
                SubjectNode::new("s2", "History"),
            ],
        )
    }

    #[test]
    fn tree_node_exposes_uniform_fields() {
        let snapshot = snapshot();
        let node = snapshot.node(&"s1".into(), NodeKind::Subject).unwrap();
        assert_eq!(node.name(), "Algebra");
        assert_eq!(node.icon(), "book");
        assert_eq!(node.parent_id().map(NodeId::as_str), Some("a"));
        assert_eq!(node.node_ref(), NodeRef::subject("s1", Some("a".into())));

        let node = snapshot.node(&"a".into(), NodeKind::Folder).unwrap();
        assert_eq!(node.kind(), NodeKind::Folder);
        assert!(node.parent_id().is_none());
    }

    #[test]
    fn descendant_lookup() {
        let snapshot = snapshot();
        assert!(snapshot.is_descendant(&"a".into(), &"c".into()));
        assert!(snapshot.is_descendant(&"b".into(), &"c".into()));
        assert!(!snapshot.is_descendant(&"c".into(), &"a".into()));
        assert!(!snapshot.is_descendant(&"a".into(), &"a".into()));
        assert!(!snapshot.is_descendant(&"a".into(), &"d".into()));
    }

    #[test]
    fn ancestry_runs_root_first() {
        let snapshot = snapshot();
        let ids: Vec<_> = snapshot
            .ancestry(&"c".into())
            .iter()
            .map(|folder| folder.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn parses_document_store_shape() {
        let json = r#"{
            "folders": [{"id": "f1", "name": "Math", "parentId": null,
                         "subjectIds": ["s1"], "folderIds": [], "isShared": true,
                         "sharedWith": ["u2"]}],
            "subjects": [{"id": "s1", "name": "Algebra", "parentId": "f1",
                          "topics": [{"name": "Linear", "questions": 12}]}]
        }"#;
        let snapshot: ShelfSnapshot = serde_json::from_str(json).unwrap();
        let folder = &snapshot.folders[0];
        assert!(folder.is_shared);
        assert!(folder.shared_with.contains("u2"));
        assert_eq!(folder.subject_ids, vec![NodeId::from("s1")]);
        let subject = &snapshot.subjects[0];
        assert_eq!(subject.topics.len(), 1);
        assert_eq!(subject.topics[0].rest.get("questions"), Some(&Value::from(12)));
    }
}
