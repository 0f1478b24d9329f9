use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::counts::{CountCache, FolderCounts};
use crate::model::{FolderNode, NodeId, NodeRef, ShelfSnapshot, SubjectNode, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

/// UI state layered over a snapshot. At most one menu is open and at most one
/// card is flipped at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub mode: ViewMode,
    current_folder: Option<NodeId>,
    collapsed: HashSet<NodeId>,
    active_menu: Option<NodeId>,
    flipped_card: Option<NodeId>,
}

impl ViewState {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn current_folder(&self) -> Option<&NodeId> {
        self.current_folder.as_ref()
    }

    pub fn open_folder(&mut self, folder_id: Option<NodeId>) {
        self.current_folder = folder_id;
        self.active_menu = None;
        self.flipped_card = None;
    }

    /// Browse the parent of the current folder.
    pub fn go_up(&mut self, snapshot: &ShelfSnapshot) {
        let parent = self
            .current_folder
            .as_ref()
            .and_then(|id| snapshot.folder(id))
            .and_then(|folder| folder.parent_id.clone());
        self.open_folder(parent);
    }

    pub fn is_collapsed(&self, folder_id: &NodeId) -> bool {
        self.collapsed.contains(folder_id)
    }

    pub fn toggle_collapsed(&mut self, folder_id: &NodeId) {
        if !self.collapsed.remove(folder_id) {
            self.collapsed.insert(folder_id.clone());
        }
    }

    pub fn active_menu(&self) -> Option<&NodeId> {
        self.active_menu.as_ref()
    }

    pub fn toggle_menu(&mut self, id: &NodeId) {
        if self.active_menu.as_ref() == Some(id) {
            self.active_menu = None;
        } else {
            self.active_menu = Some(id.clone());
        }
    }

    pub fn close_menu(&mut self) {
        self.active_menu = None;
    }

    pub fn flipped_card(&self) -> Option<&NodeId> {
        self.flipped_card.as_ref()
    }

    pub fn toggle_flipped(&mut self, id: &NodeId) {
        if self.flipped_card.as_ref() == Some(id) {
            self.flipped_card = None;
        } else {
            self.flipped_card = Some(id.clone());
        }
    }

    /// Drop references to nodes that are gone from `snapshot`.
    pub fn prune(&mut self, snapshot: &ShelfSnapshot) {
        let exists = |id: &NodeId| snapshot.folder(id).is_some() || snapshot.subject(id).is_some();
        if self
            .current_folder
            .as_ref()
            .is_some_and(|id| snapshot.folder(id).is_none())
        {
            self.current_folder = None;
        }
        self.collapsed.retain(|id| snapshot.folder(id).is_some());
        if self.active_menu.as_ref().is_some_and(|id| !exists(id)) {
            self.active_menu = None;
        }
        if self.flipped_card.as_ref().is_some_and(|id| !exists(id)) {
            self.flipped_card = None;
        }
    }
}

/// One flattened row of the list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub node: NodeRef,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub depth: usize,
    /// Set for folders only.
    pub counts: Option<FolderCounts>,
    pub collapsed: bool,
    pub menu_open: bool,
}

impl ListRow {
    pub fn is_folder(&self) -> bool {
        self.counts.is_some()
    }
}

fn contents<'a>(
    snapshot: &'a ShelfSnapshot,
    folder: Option<&'a FolderNode>,
) -> (Vec<&'a FolderNode>, Vec<&'a SubjectNode>) {
    match folder {
        Some(folder) => (
            snapshot.child_folders(folder).collect(),
            snapshot.child_subjects(folder).collect(),
        ),
        None => (
            snapshot.root_folders().collect(),
            snapshot.root_subjects().collect(),
        ),
    }
}

fn push_layer<'a>(
    pending: &mut Vec<(TreeNode<'a>, usize)>,
    folders: Vec<&'a FolderNode>,
    subjects: Vec<&'a SubjectNode>,
    depth: usize,
) {
    for subject in subjects.into_iter().rev() {
        pending.push((TreeNode::Subject(subject), depth));
    }
    for folder in folders.into_iter().rev() {
        pending.push((TreeNode::Folder(folder), depth));
    }
}

/// Flatten the current layer depth first: folders before subjects, each in
/// manual order, children of collapsed folders left out.
pub fn compose_list(snapshot: &ShelfSnapshot, view: &ViewState) -> Vec<ListRow> {
    let mut cache = CountCache::new();
    let mut rows = Vec::new();
    let mut visited: HashSet<&NodeId> = HashSet::new();

    let current = view.current_folder().and_then(|id| snapshot.folder(id));
    if let Some(current) = current {
        visited.insert(&current.id);
    }

    let mut pending: Vec<(TreeNode<'_>, usize)> = Vec::new();
    let (folders, subjects) = contents(snapshot, current);
    push_layer(&mut pending, folders, subjects, 0);

    while let Some((node, depth)) = pending.pop() {
        let mut row = ListRow {
            node: node.node_ref(),
            name: node.name().to_string(),
            icon: node.icon().to_string(),
            color: node.color().to_string(),
            depth,
            counts: None,
            collapsed: false,
            menu_open: view.active_menu() == Some(node.id()),
        };

        if let TreeNode::Folder(folder) = node {
            if !visited.insert(&folder.id) {
                continue;
            }
            row.counts = Some(cache.get(snapshot, folder));
            row.collapsed = view.is_collapsed(&folder.id);
            if !row.collapsed {
                let (folders, subjects) = contents(snapshot, Some(folder));
                push_layer(&mut pending, folders, subjects, depth + 1);
            }
        }

        rows.push(row);
    }

    rows
}

/// A folder or subject card of the grid view.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCard {
    pub node: NodeRef,
    pub name: String,
    pub icon: String,
    pub color: String,
    /// Position among same-kind siblings.
    pub index: usize,
    pub counts: Option<FolderCounts>,
    pub topic_count: usize,
    pub flipped: bool,
    pub menu_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Crumb {
    pub id: NodeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridLayout {
    pub folders: Vec<GridCard>,
    pub subjects: Vec<GridCard>,
    /// Root first, ending at the current folder.
    pub breadcrumbs: Vec<Crumb>,
    /// The promote zone only applies inside a folder.
    pub can_promote: bool,
}

/// Cards for the current layer plus the breadcrumb trail.
pub fn compose_grid(snapshot: &ShelfSnapshot, view: &ViewState) -> GridLayout {
    let mut cache = CountCache::new();
    let current = view.current_folder().and_then(|id| snapshot.folder(id));
    let (folders, subjects) = contents(snapshot, current);

    let card = |node: TreeNode<'_>, index: usize| GridCard {
        node: node.node_ref(),
        name: node.name().to_string(),
        icon: node.icon().to_string(),
        color: node.color().to_string(),
        index,
        counts: None,
        topic_count: match node {
            TreeNode::Subject(subject) => subject.topics.len(),
            TreeNode::Folder(_) => 0,
        },
        flipped: view.flipped_card() == Some(node.id()),
        menu_open: view.active_menu() == Some(node.id()),
    };

    let folders = folders
        .into_iter()
        .enumerate()
        .map(|(index, folder)| GridCard {
            counts: Some(cache.get(snapshot, folder)),
            ..card(TreeNode::Folder(folder), index)
        })
        .collect();
    let subjects = subjects
        .into_iter()
        .enumerate()
        .map(|(index, subject)| card(TreeNode::Subject(subject), index))
        .collect();

    let breadcrumbs = current
        .map(|folder| {
            snapshot
                .ancestry(&folder.id)
                .into_iter()
                .map(|folder| Crumb {
                    id: folder.id.clone(),
                    name: folder.name.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    GridLayout {
        folders,
        subjects,
        breadcrumbs,
        can_promote: current.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubjectNode;

    fn snapshot() -> ShelfSnapshot {
        ShelfSnapshot::new(
            vec![
                FolderNode::new("math", "Math").folders(["alg"]).subjects(["calc"]),
                FolderNode::new("alg", "Algebra").parent("math").subjects(["lin"]),
                FolderNode::new("lang", "Languages"),
            ],
            vec![
                SubjectNode::new("calc", "Calculus").parent("math"),
                SubjectNode::new("lin", "Linear").parent("alg"),
                SubjectNode::new("art", "Art"),
            ],
        )
    }

    fn dump(rows: &[ListRow]) -> String {
        rows.iter()
            .map(|row| format!("{}{}", "  ".repeat(row.depth), row.node.id))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn list_flattens_folders_before_subjects() {
        let rows = compose_list(&snapshot(), &ViewState::default());
        assert_eq!(
            dump(&rows),
            r#"math
  alg
    lin
  calc
lang
art"#
        );
        assert_eq!(rows[0].counts.map(|c| c.total_count()), Some(3));
        assert!(!rows[2].is_folder());
    }

    #[test]
    fn collapsed_folder_hides_children() {
        let mut view = ViewState::default();
        view.toggle_collapsed(&"alg".into());
        let rows = compose_list(&snapshot(), &view);
        assert_eq!(dump(&rows), "math\n  alg\n  calc\nlang\nart");
        assert!(rows[1].collapsed);
    }

    #[test]
    fn list_starts_at_current_folder() {
        let mut view = ViewState::default();
        view.open_folder(Some("math".into()));
        let rows = compose_list(&snapshot(), &view);
        assert_eq!(dump(&rows), "alg\n  lin\ncalc");
    }

    #[test]
    fn cyclic_listing_is_flattened_once() {
        let snapshot = ShelfSnapshot::new(
            vec![
                FolderNode::new("a", "A").folders(["b"]),
                FolderNode::new("b", "B").parent("a").folders(["a"]),
            ],
            Vec::new(),
        );
        let rows = compose_list(&snapshot, &ViewState::default());
        assert_eq!(dump(&rows), "a\n  b");
    }

    #[test]
    fn grid_inside_folder() {
        let snapshot = snapshot();
        let mut view = ViewState::new(ViewMode::Grid);
        view.open_folder(Some("alg".into()));
        view.toggle_flipped(&"lin".into());

        let layout = compose_grid(&snapshot, &view);
        assert!(layout.can_promote);
        assert!(layout.folders.is_empty());
        assert_eq!(layout.subjects.len(), 1);
        assert!(layout.subjects[0].flipped);
        let crumbs: Vec<_> = layout.breadcrumbs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(crumbs, ["Math", "Algebra"]);

        view.go_up(&snapshot);
        assert_eq!(view.current_folder().map(NodeId::as_str), Some("math"));
        assert!(view.flipped_card().is_none());
    }

    #[test]
    fn grid_at_root() {
        let layout = compose_grid(&snapshot(), &ViewState::new(ViewMode::Grid));
        assert!(!layout.can_promote);
        assert!(layout.breadcrumbs.is_empty());
        let folders: Vec<_> = layout.folders.iter().map(|c| (c.name.as_str(), c.index)).collect();
        assert_eq!(folders, [("Math", 0), ("Languages", 1)]);
        assert_eq!(layout.folders[0].counts.map(|c| c.subject_count), Some(2));
    }

    #[test]
    fn single_active_menu() {
        let mut view = ViewState::default();
        view.toggle_menu(&"a".into());
        view.toggle_menu(&"b".into());
        assert_eq!(view.active_menu().map(NodeId::as_str), Some("b"));
        view.toggle_menu(&"b".into());
        assert!(view.active_menu().is_none());
    }

    #[test]
    fn prune_forgets_deleted_nodes() {
        let mut view = ViewState::default();
        view.open_folder(Some("gone".into()));
        view.toggle_menu(&"art".into());
        view.toggle_collapsed(&"gone".into());
        view.prune(&snapshot());
        assert!(view.current_folder().is_none());
        assert_eq!(view.active_menu().map(NodeId::as_str), Some("art"));
        assert!(!view.is_collapsed(&"gone".into()));
    }
}
