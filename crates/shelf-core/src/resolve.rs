use thiserror::Error;
use tracing::{debug, info, warn};

use crate::intent::{ShelfIntent, ShelfMutations};
use crate::model::{NodeId, NodeKind, NodeRef, ShelfSnapshot};
use crate::payload::{DragData, DragPayload};
use crate::session::{DragSession, GhostOverlay};

/// Where a drag was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A folder or subject row/card.
    Node(NodeRef),
    /// The grid's "move up one level" zone.
    PromoteZone,
    /// The list's "move to current layer" zone.
    CurrentLayer,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub snapshot: &'a ShelfSnapshot,
    /// Folder being browsed, `None` at the root.
    pub current_folder: Option<&'a NodeId>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(snapshot: &'a ShelfSnapshot, current_folder: Option<&'a NodeId>) -> Self {
        Self {
            snapshot,
            current_folder,
        }
    }
}

/// Why a drop produced no mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveSkip {
    #[error("item dropped onto itself")]
    SelfDrop,
    #[error("item is already a direct child of the target folder")]
    AlreadyInTarget,
    #[error("item already lives in the destination container")]
    SameContainer,
    #[error("folder {folder} cannot be nested inside its own descendant {target}")]
    WouldCreateCycle { folder: NodeId, target: NodeId },
    #[error("promotion needs an open folder")]
    NotInsideFolder,
    #[error("malformed drag data: {0}")]
    MalformedPayload(String),
    #[error("reorder needs two items of the same kind in the same container")]
    NotSiblings,
    #[error("item did not change position")]
    NotMoved,
    #[error("index {index} is outside a list of {len}")]
    OutOfRange { index: usize, len: usize },
}

/// Decide which mutation a completed drop maps to.
pub fn resolve_drop(
    dragged: &DragPayload,
    target: &DropTarget,
    cx: &ResolveContext<'_>,
) -> Result<ShelfIntent, MoveSkip> {
    match target {
        DropTarget::Node(target) => {
            if dragged.id == target.id {
                return Err(MoveSkip::SelfDrop);
            }
            match target.kind {
                NodeKind::Folder => {
                    if dragged.parent_id.as_ref() == Some(&target.id) {
                        return Err(MoveSkip::AlreadyInTarget);
                    }
                    move_into(dragged, Some(&target.id), cx)
                }
                NodeKind::Subject => {
                    let destination = target.parent_id.as_ref();
                    if dragged.parent_id.as_ref() == destination {
                        return Err(MoveSkip::SameContainer);
                    }
                    move_into(dragged, destination, cx)
                }
            }
        }
        DropTarget::PromoteZone => {
            if cx.current_folder.is_none() {
                return Err(MoveSkip::NotInsideFolder);
            }
            Ok(match dragged.kind {
                NodeKind::Subject => ShelfIntent::PromoteSubject {
                    subject_id: dragged.id.clone(),
                },
                NodeKind::Folder => ShelfIntent::PromoteFolder {
                    folder_id: dragged.id.clone(),
                },
            })
        }
        DropTarget::CurrentLayer => {
            if dragged.parent_id.as_ref() == cx.current_folder {
                return Err(MoveSkip::SameContainer);
            }
            move_into(dragged, cx.current_folder, cx)
        }
    }
}

fn move_into(
    dragged: &DragPayload,
    destination: Option<&NodeId>,
    cx: &ResolveContext<'_>,
) -> Result<ShelfIntent, MoveSkip> {
    match dragged.kind {
        NodeKind::Subject => Ok(ShelfIntent::MoveSubject {
            subject_id: dragged.id.clone(),
            new_parent_id: destination.cloned(),
            old_parent_id: dragged.parent_id.clone(),
        }),
        NodeKind::Folder => {
            if let Some(destination) = destination
                && (*destination == dragged.id
                    || cx.snapshot.is_descendant(&dragged.id, destination))
            {
                return Err(MoveSkip::WouldCreateCycle {
                    folder: dragged.id.clone(),
                    target: destination.clone(),
                });
            }
            Ok(ShelfIntent::NestFolder {
                target_parent_id: destination.cloned(),
                folder_id: dragged.id.clone(),
            })
        }
    }
}

/// Destination index for dropping the item at `from_ix` onto the row or card
/// at `target_ix`: before it when moving up, after it when moving down.
pub fn reorder_index_for_drop_on(from_ix: usize, target_ix: usize, item_count: usize) -> usize {
    let gap_index = if target_ix < from_ix {
        target_ix
    } else if target_ix > from_ix {
        target_ix.saturating_add(1)
    } else {
        from_ix
    };
    reorder_index_from_gap(from_ix, gap_index, item_count)
}

/// Destination index for dropping past the last item.
pub fn reorder_index_for_drop_after_last(from_ix: usize, item_count: usize) -> usize {
    reorder_index_from_gap(from_ix, item_count, item_count)
}

fn reorder_index_from_gap(from_ix: usize, gap_index: usize, item_count: usize) -> usize {
    let mut to_ix = gap_index;
    if to_ix > from_ix {
        to_ix = to_ix.saturating_sub(1);
    }
    to_ix.min(item_count.saturating_sub(1))
}

/// Positional reorder inside one sibling list of the grid view.
pub fn resolve_reorder(
    dragged: &DragPayload,
    target: &NodeRef,
    from_ix: usize,
    target_ix: usize,
    sibling_count: usize,
) -> Result<ShelfIntent, MoveSkip> {
    if dragged.kind != target.kind || dragged.parent_id != target.parent_id {
        return Err(MoveSkip::NotSiblings);
    }
    for index in [from_ix, target_ix] {
        if index >= sibling_count {
            return Err(MoveSkip::OutOfRange {
                index,
                len: sibling_count,
            });
        }
    }

    let to_ix = reorder_index_for_drop_on(from_ix, target_ix, sibling_count);
    if to_ix == from_ix {
        return Err(MoveSkip::NotMoved);
    }

    Ok(match dragged.kind {
        NodeKind::Subject => ShelfIntent::ReorderSubject {
            subject_id: dragged.id.clone(),
            from: from_ix,
            to: to_ix,
        },
        NodeKind::Folder => ShelfIntent::ReorderFolder {
            folder_id: dragged.id.clone(),
            from: from_ix,
            to: to_ix,
        },
    })
}

/// Turns drops into at most one mutation and always closes the drag session.
pub struct MoveResolver;

impl MoveResolver {
    pub fn finish_drop<O, M>(
        session: &mut DragSession<O>,
        data: &DragData,
        target: &DropTarget,
        cx: &ResolveContext<'_>,
        mutations: &M,
    ) -> Option<ShelfIntent>
    where
        O: GhostOverlay,
        M: ShelfMutations + ?Sized,
    {
        let resolution = data
            .payload()
            .map_err(|err| MoveSkip::MalformedPayload(err.to_string()))
            .and_then(|dragged| resolve_drop(&dragged, target, cx));
        let intent = Self::dispatch(resolution, mutations);
        session.end();
        intent
    }

    /// Grid reorder drop onto the sibling at `target_ix`. The origin index is
    /// read from the drag data.
    pub fn finish_reorder<O, M>(
        session: &mut DragSession<O>,
        data: &DragData,
        target: &NodeRef,
        target_ix: usize,
        sibling_count: usize,
        mutations: &M,
    ) -> Option<ShelfIntent>
    where
        O: GhostOverlay,
        M: ShelfMutations + ?Sized,
    {
        let resolution = data
            .payload()
            .and_then(|dragged| Ok((dragged, data.position()?)))
            .map_err(|err| MoveSkip::MalformedPayload(err.to_string()))
            .and_then(|(dragged, position)| {
                let from_ix = position.ok_or_else(|| {
                    MoveSkip::MalformedPayload("missing sibling position".to_string())
                })?;
                resolve_reorder(&dragged, target, from_ix, target_ix, sibling_count)
            });
        let intent = Self::dispatch(resolution, mutations);
        session.end();
        intent
    }

    fn dispatch<M: ShelfMutations + ?Sized>(
        resolution: Result<ShelfIntent, MoveSkip>,
        mutations: &M,
    ) -> Option<ShelfIntent> {
        match resolution {
            Ok(intent) => {
                info!(item = %intent.item_id(), ?intent, "dispatching shelf mutation");
                intent.dispatch(mutations);
                Some(intent)
            }
            Err(skip @ MoveSkip::WouldCreateCycle { .. }) => {
                warn!("drop rejected: {skip}");
                None
            }
            Err(skip) => {
                debug!("drop ignored: {skip}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_index_math() {
        assert_eq!(reorder_index_for_drop_on(0, 2, 4), 2);
        assert_eq!(reorder_index_for_drop_on(3, 1, 4), 1);
        assert_eq!(reorder_index_for_drop_on(1, 1, 4), 1);
        assert_eq!(reorder_index_for_drop_after_last(0, 4), 3);
        assert_eq!(reorder_index_for_drop_after_last(3, 4), 3);
    }

    #[test]
    fn reorder_requires_siblings() {
        let dragged = NodeRef::subject("s1", Some("f1".into()));
        let other_parent = NodeRef::subject("s2", Some("f2".into()));
        let folder = NodeRef::folder("g", Some("f1".into()));
        assert_eq!(
            resolve_reorder(&dragged, &other_parent, 0, 1, 2),
            Err(MoveSkip::NotSiblings)
        );
        assert_eq!(
            resolve_reorder(&dragged, &folder, 0, 1, 2),
            Err(MoveSkip::NotSiblings)
        );
    }

    #[test]
    fn reorder_bounds_and_identity() {
        let dragged = NodeRef::folder("a", None);
        let target = NodeRef::folder("c", None);
        assert_eq!(
            resolve_reorder(&dragged, &target, 0, 5, 3),
            Err(MoveSkip::OutOfRange { index: 5, len: 3 })
        );
        assert_eq!(
            resolve_reorder(&dragged, &target, 1, 1, 3),
            Err(MoveSkip::NotMoved)
        );
        assert_eq!(
            resolve_reorder(&dragged, &target, 0, 2, 3),
            Ok(ShelfIntent::ReorderFolder {
                folder_id: "a".into(),
                from: 0,
                to: 2,
            })
        );
    }
}
