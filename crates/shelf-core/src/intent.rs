use crate::model::{NodeId, ShelfSnapshot};

/// A mutation the shelf asks the data layer to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShelfIntent {
    MoveSubject {
        subject_id: NodeId,
        new_parent_id: Option<NodeId>,
        old_parent_id: Option<NodeId>,
    },
    NestFolder {
        target_parent_id: Option<NodeId>,
        folder_id: NodeId,
    },
    PromoteSubject {
        subject_id: NodeId,
    },
    PromoteFolder {
        folder_id: NodeId,
    },
    ReorderSubject {
        subject_id: NodeId,
        from: usize,
        to: usize,
    },
    ReorderFolder {
        folder_id: NodeId,
        from: usize,
        to: usize,
    },
}

impl ShelfIntent {
    /// Id of the item being moved.
    pub fn item_id(&self) -> &NodeId {
        match self {
            ShelfIntent::MoveSubject { subject_id, .. }
            | ShelfIntent::PromoteSubject { subject_id }
            | ShelfIntent::ReorderSubject { subject_id, .. } => subject_id,
            ShelfIntent::NestFolder { folder_id, .. }
            | ShelfIntent::PromoteFolder { folder_id }
            | ShelfIntent::ReorderFolder { folder_id, .. } => folder_id,
        }
    }

    /// Call the matching mutation on `mutations`.
    pub fn dispatch<M: ShelfMutations + ?Sized>(&self, mutations: &M) {
        match self {
            ShelfIntent::MoveSubject {
                subject_id,
                new_parent_id,
                old_parent_id,
            } => mutations.move_subject(subject_id, new_parent_id.as_ref(), old_parent_id.as_ref()),
            ShelfIntent::NestFolder {
                target_parent_id,
                folder_id,
            } => mutations.nest_folder(target_parent_id.as_ref(), folder_id),
            ShelfIntent::PromoteSubject { subject_id } => mutations.promote_subject(subject_id),
            ShelfIntent::PromoteFolder { folder_id } => mutations.promote_folder(folder_id),
            ShelfIntent::ReorderSubject {
                subject_id,
                from,
                to,
            } => mutations.reorder_subject(subject_id, *from, *to),
            ShelfIntent::ReorderFolder {
                folder_id,
                from,
                to,
            } => mutations.reorder_folder(folder_id, *from, *to),
        }
    }
}

/// Mutations offered by the data layer. Fire and forget: results arrive as a
/// fresh snapshot through [`ShelfSource`].
pub trait ShelfMutations {
    fn move_subject(
        &self,
        subject_id: &NodeId,
        new_parent_id: Option<&NodeId>,
        old_parent_id: Option<&NodeId>,
    );

    /// `None` moves the folder to the root.
    fn nest_folder(&self, target_parent_id: Option<&NodeId>, folder_id: &NodeId);

    fn promote_subject(&self, subject_id: &NodeId);

    fn promote_folder(&self, folder_id: &NodeId);

    fn reorder_subject(&self, subject_id: &NodeId, from: usize, to: usize);

    fn reorder_folder(&self, folder_id: &NodeId, from: usize, to: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Read side of the data layer.
pub trait ShelfSource {
    fn snapshot(&self) -> ShelfSnapshot;

    /// Monotonic counter bumped on every change.
    fn revision(&self) -> u64;

    fn subscribe(&self, listener: Box<dyn Fn(&ShelfSnapshot)>) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Data layer with both sides, as handed to views.
pub trait ShelfBackend: ShelfSource + ShelfMutations {}

impl<T: ShelfSource + ShelfMutations> ShelfBackend for T {}
