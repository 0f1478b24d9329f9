use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::intent::{ShelfIntent, ShelfMutations, ShelfSource, SubscriptionId};
use crate::model::{FolderNode, NodeId, ShelfSnapshot, SubjectNode};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown folder {0}")]
    UnknownFolder(NodeId),
    #[error("unknown subject {0}")]
    UnknownSubject(NodeId),
    #[error("id {0} is already taken")]
    DuplicateId(NodeId),
    #[error("folder {folder} cannot be nested inside {target}")]
    WouldCreateCycle { folder: NodeId, target: NodeId },
    #[error("invalid shelf snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),
}

type Listener = Rc<dyn Fn(&ShelfSnapshot)>;

/// Single-threaded in-memory data layer.
///
/// Keeps every `parentId` in sync with the parent's `subjectIds`/`folderIds`
/// and notifies subscribers after each successful change.
pub struct MemoryShelf {
    snapshot: RefCell<ShelfSnapshot>,
    revision: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
}

impl Default for MemoryShelf {
    fn default() -> Self {
        Self::new(ShelfSnapshot::default())
    }
}

impl MemoryShelf {
    pub fn new(snapshot: ShelfSnapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
            revision: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&*self.snapshot.borrow())?)
    }

    pub fn create_folder(&self, folder: FolderNode) -> Result<(), StoreError> {
        self.mutate(|snapshot| {
            ensure_unused(snapshot, &folder.id)?;
            let mut folder = folder;
            folder.folder_ids.clear();
            folder.subject_ids.clear();
            if let Some(parent_id) = folder.parent_id.as_ref() {
                folder_mut(snapshot, parent_id)?
                    .folder_ids
                    .push(folder.id.clone());
            }
            snapshot.folders.push(folder);
            Ok(())
        })
    }

    pub fn create_subject(&self, subject: SubjectNode) -> Result<(), StoreError> {
        self.mutate(|snapshot| {
            ensure_unused(snapshot, &subject.id)?;
            if let Some(parent_id) = subject.parent_id.as_ref() {
                folder_mut(snapshot, parent_id)?
                    .subject_ids
                    .push(subject.id.clone());
            }
            snapshot.subjects.push(subject);
            Ok(())
        })
    }

    /// Remove a folder. Its direct children move up to the folder's parent.
    pub fn delete_folder(&self, folder_id: &NodeId) -> Result<(), StoreError> {
        self.mutate(|snapshot| {
            let index = snapshot
                .folders
                .iter()
                .position(|folder| folder.id == *folder_id)
                .ok_or_else(|| StoreError::UnknownFolder(folder_id.clone()))?;
            let removed = snapshot.folders.remove(index);
            detach_folder(snapshot, folder_id);

            // Children are found through both the id lists and `parentId`.
            let mut folders: Vec<NodeId> = removed
                .folder_ids
                .iter()
                .filter(|child| snapshot.folder(child).is_some())
                .cloned()
                .collect();
            for folder in &snapshot.folders {
                if folder.parent_id.as_ref() == Some(folder_id) && !folders.contains(&folder.id) {
                    folders.push(folder.id.clone());
                }
            }
            let mut subjects: Vec<NodeId> = removed
                .subject_ids
                .iter()
                .filter(|child| snapshot.subject(child).is_some())
                .cloned()
                .collect();
            for subject in &snapshot.subjects {
                if subject.parent_id.as_ref() == Some(folder_id) && !subjects.contains(&subject.id)
                {
                    subjects.push(subject.id.clone());
                }
            }

            for child in &folders {
                detach_folder(snapshot, child);
                attach_folder(snapshot, child, removed.parent_id.as_ref())?;
            }
            for child in &subjects {
                detach_subject(snapshot, child);
                attach_subject(snapshot, child, removed.parent_id.as_ref())?;
            }
            Ok(())
        })
    }

    pub fn delete_subject(&self, subject_id: &NodeId) -> Result<(), StoreError> {
        self.mutate(|snapshot| {
            let index = snapshot
                .subjects
                .iter()
                .position(|subject| subject.id == *subject_id)
                .ok_or_else(|| StoreError::UnknownSubject(subject_id.clone()))?;
            snapshot.subjects.remove(index);
            detach_subject(snapshot, subject_id);
            Ok(())
        })
    }

    /// Apply `intent`, reporting why it could not be applied.
    pub fn try_apply(&self, intent: &ShelfIntent) -> Result<(), StoreError> {
        self.mutate(|snapshot| match intent {
            ShelfIntent::MoveSubject {
                subject_id,
                new_parent_id,
                ..
            } => move_subject(snapshot, subject_id, new_parent_id.as_ref()),
            ShelfIntent::NestFolder {
                target_parent_id,
                folder_id,
            } => nest_folder(snapshot, folder_id, target_parent_id.as_ref()),
            ShelfIntent::PromoteSubject { subject_id } => {
                let subject = snapshot
                    .subject(subject_id)
                    .ok_or_else(|| StoreError::UnknownSubject(subject_id.clone()))?;
                let Some(parent_id) = subject.parent_id.clone() else {
                    debug!(%subject_id, "subject already at root");
                    return Ok(());
                };
                let grandparent = grandparent_of(snapshot, &parent_id)?;
                move_subject(snapshot, subject_id, grandparent.as_ref())
            }
            ShelfIntent::PromoteFolder { folder_id } => {
                let folder = snapshot
                    .folder(folder_id)
                    .ok_or_else(|| StoreError::UnknownFolder(folder_id.clone()))?;
                let Some(parent_id) = folder.parent_id.clone() else {
                    debug!(%folder_id, "folder already at root");
                    return Ok(());
                };
                let grandparent = grandparent_of(snapshot, &parent_id)?;
                nest_folder(snapshot, folder_id, grandparent.as_ref())
            }
            ShelfIntent::ReorderSubject {
                subject_id,
                from,
                to,
            } => {
                let parent_id = snapshot
                    .subject(subject_id)
                    .ok_or_else(|| StoreError::UnknownSubject(subject_id.clone()))?
                    .parent_id
                    .clone();
                match parent_id {
                    Some(parent_id) => {
                        let live: HashSet<NodeId> =
                            snapshot.subjects.iter().map(|subject| subject.id.clone()).collect();
                        let parent = folder_mut(snapshot, &parent_id)?;
                        reorder_slots(
                            &mut parent.subject_ids,
                            |id| live.contains(id),
                            node_id,
                            subject_id,
                            *from,
                            *to,
                        )
                        .ok_or_else(|| StoreError::UnknownSubject(subject_id.clone()))
                    }
                    None => reorder_slots(
                        &mut snapshot.subjects,
                        |subject| subject.parent_id.is_none(),
                        |subject| &subject.id,
                        subject_id,
                        *from,
                        *to,
                    )
                    .ok_or_else(|| StoreError::UnknownSubject(subject_id.clone())),
                }
            }
            ShelfIntent::ReorderFolder {
                folder_id,
                from,
                to,
            } => {
                let parent_id = snapshot
                    .folder(folder_id)
                    .ok_or_else(|| StoreError::UnknownFolder(folder_id.clone()))?
                    .parent_id
                    .clone();
                match parent_id {
                    Some(parent_id) => {
                        let live: HashSet<NodeId> =
                            snapshot.folders.iter().map(|folder| folder.id.clone()).collect();
                        let parent = folder_mut(snapshot, &parent_id)?;
                        reorder_slots(
                            &mut parent.folder_ids,
                            |id| live.contains(id),
                            node_id,
                            folder_id,
                            *from,
                            *to,
                        )
                        .ok_or_else(|| StoreError::UnknownFolder(folder_id.clone()))
                    }
                    None => reorder_slots(
                        &mut snapshot.folders,
                        |folder| folder.parent_id.is_none(),
                        |folder| &folder.id,
                        folder_id,
                        *from,
                        *to,
                    )
                    .ok_or_else(|| StoreError::UnknownFolder(folder_id.clone())),
                }
            }
        })
    }

    /// Run `f` on a scratch copy and commit only if it succeeds.
    fn mutate(
        &self,
        f: impl FnOnce(&mut ShelfSnapshot) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut scratch = self.snapshot.borrow().clone();
        f(&mut scratch)?;
        let changed = *self.snapshot.borrow() != scratch;
        if changed {
            *self.snapshot.borrow_mut() = scratch;
            self.revision.set(self.revision.get() + 1);
            self.notify();
        }
        Ok(())
    }

    fn notify(&self) {
        let snapshot = self.snapshot.borrow().clone();
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl ShelfSource for MemoryShelf {
    fn snapshot(&self) -> ShelfSnapshot {
        self.snapshot.borrow().clone()
    }

    fn revision(&self) -> u64 {
        self.revision.get()
    }

    fn subscribe(&self, listener: Box<dyn Fn(&ShelfSnapshot)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::from(listener)));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .borrow_mut()
            .retain(|(subscription, _)| *subscription != id);
    }
}

impl MemoryShelf {
    fn apply_logged(&self, intent: ShelfIntent) {
        if let Err(err) = self.try_apply(&intent) {
            warn!(?intent, "shelf mutation failed: {err}");
        }
    }
}

impl ShelfMutations for MemoryShelf {
    fn move_subject(
        &self,
        subject_id: &NodeId,
        new_parent_id: Option<&NodeId>,
        old_parent_id: Option<&NodeId>,
    ) {
        self.apply_logged(ShelfIntent::MoveSubject {
            subject_id: subject_id.clone(),
            new_parent_id: new_parent_id.cloned(),
            old_parent_id: old_parent_id.cloned(),
        });
    }

    fn nest_folder(&self, target_parent_id: Option<&NodeId>, folder_id: &NodeId) {
        self.apply_logged(ShelfIntent::NestFolder {
            target_parent_id: target_parent_id.cloned(),
            folder_id: folder_id.clone(),
        });
    }

    fn promote_subject(&self, subject_id: &NodeId) {
        self.apply_logged(ShelfIntent::PromoteSubject {
            subject_id: subject_id.clone(),
        });
    }

    fn promote_folder(&self, folder_id: &NodeId) {
        self.apply_logged(ShelfIntent::PromoteFolder {
            folder_id: folder_id.clone(),
        });
    }

    fn reorder_subject(&self, subject_id: &NodeId, from: usize, to: usize) {
        self.apply_logged(ShelfIntent::ReorderSubject {
            subject_id: subject_id.clone(),
            from,
            to,
        });
    }

    fn reorder_folder(&self, folder_id: &NodeId, from: usize, to: usize) {
        self.apply_logged(ShelfIntent::ReorderFolder {
            folder_id: folder_id.clone(),
            from,
            to,
        });
    }
}

fn ensure_unused(snapshot: &ShelfSnapshot, id: &NodeId) -> Result<(), StoreError> {
    if snapshot.folder(id).is_some() || snapshot.subject(id).is_some() {
        return Err(StoreError::DuplicateId(id.clone()));
    }
    Ok(())
}

fn folder_mut<'a>(
    snapshot: &'a mut ShelfSnapshot,
    id: &NodeId,
) -> Result<&'a mut FolderNode, StoreError> {
    snapshot
        .folders
        .iter_mut()
        .find(|folder| folder.id == *id)
        .ok_or_else(|| StoreError::UnknownFolder(id.clone()))
}

fn grandparent_of(
    snapshot: &ShelfSnapshot,
    parent_id: &NodeId,
) -> Result<Option<NodeId>, StoreError> {
    snapshot
        .folder(parent_id)
        .map(|parent| parent.parent_id.clone())
        .ok_or_else(|| StoreError::UnknownFolder(parent_id.clone()))
}

fn detach_subject(snapshot: &mut ShelfSnapshot, subject_id: &NodeId) {
    for folder in &mut snapshot.folders {
        folder.subject_ids.retain(|id| id != subject_id);
    }
}

fn detach_folder(snapshot: &mut ShelfSnapshot, folder_id: &NodeId) {
    for folder in &mut snapshot.folders {
        folder.folder_ids.retain(|id| id != folder_id);
    }
}

/// Move the item at `ix` to the end of `items`, where new root items land.
fn send_to_back<T>(items: &mut Vec<T>, ix: usize) {
    let item = items.remove(ix);
    items.push(item);
}

fn attach_subject(
    snapshot: &mut ShelfSnapshot,
    subject_id: &NodeId,
    parent_id: Option<&NodeId>,
) -> Result<(), StoreError> {
    if let Some(parent_id) = parent_id {
        folder_mut(snapshot, parent_id)?
            .subject_ids
            .push(subject_id.clone());
    }
    let ix = snapshot
        .subjects
        .iter()
        .position(|subject| subject.id == *subject_id)
        .ok_or_else(|| StoreError::UnknownSubject(subject_id.clone()))?;
    snapshot.subjects[ix].parent_id = parent_id.cloned();
    if parent_id.is_none() {
        send_to_back(&mut snapshot.subjects, ix);
    }
    Ok(())
}

fn attach_folder(
    snapshot: &mut ShelfSnapshot,
    folder_id: &NodeId,
    parent_id: Option<&NodeId>,
) -> Result<(), StoreError> {
    if let Some(parent_id) = parent_id {
        folder_mut(snapshot, parent_id)?
            .folder_ids
            .push(folder_id.clone());
    }
    let ix = snapshot
        .folders
        .iter()
        .position(|folder| folder.id == *folder_id)
        .ok_or_else(|| StoreError::UnknownFolder(folder_id.clone()))?;
    snapshot.folders[ix].parent_id = parent_id.cloned();
    if parent_id.is_none() {
        send_to_back(&mut snapshot.folders, ix);
    }
    Ok(())
}

fn move_subject(
    snapshot: &mut ShelfSnapshot,
    subject_id: &NodeId,
    parent_id: Option<&NodeId>,
) -> Result<(), StoreError> {
    if snapshot.subject(subject_id).is_none() {
        return Err(StoreError::UnknownSubject(subject_id.clone()));
    }
    if let Some(parent_id) = parent_id
        && snapshot.folder(parent_id).is_none()
    {
        return Err(StoreError::UnknownFolder(parent_id.clone()));
    }
    detach_subject(snapshot, subject_id);
    attach_subject(snapshot, subject_id, parent_id)
}

fn nest_folder(
    snapshot: &mut ShelfSnapshot,
    folder_id: &NodeId,
    parent_id: Option<&NodeId>,
) -> Result<(), StoreError> {
    if snapshot.folder(folder_id).is_none() {
        return Err(StoreError::UnknownFolder(folder_id.clone()));
    }
    if let Some(parent_id) = parent_id {
        if snapshot.folder(parent_id).is_none() {
            return Err(StoreError::UnknownFolder(parent_id.clone()));
        }
        if parent_id == folder_id || snapshot.is_descendant(folder_id, parent_id) {
            return Err(StoreError::WouldCreateCycle {
                folder: folder_id.clone(),
                target: parent_id.clone(),
            });
        }
    }
    detach_folder(snapshot, folder_id);
    attach_folder(snapshot, folder_id, parent_id)
}

/// Move `id` to `to` inside `ids`. `from` is trusted only when it still points
/// at `id`.
fn reorder_ids(ids: &mut Vec<NodeId>, id: &NodeId, from: usize, to: usize) -> Option<()> {
    let from = match ids.get(from) {
        Some(found) if found == id => from,
        _ => ids.iter().position(|candidate| candidate == id)?,
    };
    let item = ids.remove(from);
    let to = to.min(ids.len());
    ids.insert(to, item);
    Some(())
}

fn node_id(id: &NodeId) -> &NodeId {
    id
}

/// Reorder among the items matching `in_view`, leaving the others in place.
/// `from` and `to` count only the matching items.
fn reorder_slots<T: Clone>(
    items: &mut [T],
    in_view: impl Fn(&T) -> bool,
    id_of: impl Fn(&T) -> &NodeId,
    id: &NodeId,
    from: usize,
    to: usize,
) -> Option<()> {
    let slots: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| in_view(item))
        .map(|(ix, _)| ix)
        .collect();
    let mut order: Vec<NodeId> = slots.iter().map(|&ix| id_of(&items[ix]).clone()).collect();
    reorder_ids(&mut order, id, from, to)?;

    let mut reordered = Vec::with_capacity(slots.len());
    for id in &order {
        let ix = slots.iter().copied().find(|&ix| id_of(&items[ix]) == id)?;
        reordered.push(items[ix].clone());
    }
    for (slot, item) in slots.into_iter().zip(reordered) {
        items[slot] = item;
    }
    Some(())
}
