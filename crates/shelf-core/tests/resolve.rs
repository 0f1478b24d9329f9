use std::cell::RefCell;
use std::rc::Rc;

use gpui_shelf_core::{
    DragData, DragSession, DropTarget, FolderNode, GhostOverlay, GhostSource, MoveResolver,
    MoveSkip, NodeId, NodeRef, Point, ResolveContext, ShelfIntent, ShelfMutations, ShelfSnapshot,
    SubjectNode, TREE_ITEM_KEY, resolve_drop,
};

fn snapshot() -> ShelfSnapshot {
    ShelfSnapshot::new(
        vec![
            FolderNode::new("f1", "Science").folders(["f2"]).subjects(["s1"]),
            FolderNode::new("f2", "Physics").parent("f1").folders(["f4"]),
            FolderNode::new("f3", "History"),
            FolderNode::new("f4", "Optics").parent("f2"),
        ],
        vec![
            SubjectNode::new("s1", "Chemistry").parent("f1"),
            SubjectNode::new("s2", "Art"),
            SubjectNode::new("s3", "Rome").parent("f3"),
        ],
    )
}

#[derive(Default)]
struct Recorder {
    intents: RefCell<Vec<ShelfIntent>>,
}

impl ShelfMutations for Recorder {
    fn move_subject(&self, subject_id: &NodeId, new: Option<&NodeId>, old: Option<&NodeId>) {
        self.intents.borrow_mut().push(ShelfIntent::MoveSubject {
            subject_id: subject_id.clone(),
            new_parent_id: new.cloned(),
            old_parent_id: old.cloned(),
        });
    }

    fn nest_folder(&self, target_parent_id: Option<&NodeId>, folder_id: &NodeId) {
        self.intents.borrow_mut().push(ShelfIntent::NestFolder {
            target_parent_id: target_parent_id.cloned(),
            folder_id: folder_id.clone(),
        });
    }

    fn promote_subject(&self, subject_id: &NodeId) {
        self.intents.borrow_mut().push(ShelfIntent::PromoteSubject {
            subject_id: subject_id.clone(),
        });
    }

    fn promote_folder(&self, folder_id: &NodeId) {
        self.intents.borrow_mut().push(ShelfIntent::PromoteFolder {
            folder_id: folder_id.clone(),
        });
    }

    fn reorder_subject(&self, subject_id: &NodeId, from: usize, to: usize) {
        self.intents.borrow_mut().push(ShelfIntent::ReorderSubject {
            subject_id: subject_id.clone(),
            from,
            to,
        });
    }

    fn reorder_folder(&self, folder_id: &NodeId, from: usize, to: usize) {
        self.intents.borrow_mut().push(ShelfIntent::ReorderFolder {
            folder_id: folder_id.clone(),
            from,
            to,
        });
    }
}

struct NoOverlay;

impl GhostOverlay for NoOverlay {
    type Ghost = ();

    fn mount(&mut self, _source: &GhostSource, _origin: Point) -> Option<()> {
        Some(())
    }

    fn place(&mut self, _ghost: &mut (), _origin: Point) {}

    fn unmount(&mut self, _ghost: ()) {}
}

fn resolve(dragged: NodeRef, target: DropTarget) -> Result<ShelfIntent, MoveSkip> {
    let snapshot = snapshot();
    resolve_drop(&dragged, &target, &ResolveContext::new(&snapshot, None))
}

#[test]
fn self_drop_is_ignored() {
    let dragged = NodeRef::folder("f3", None);
    assert_eq!(
        resolve(dragged, DropTarget::Node(NodeRef::folder("f3", None))),
        Err(MoveSkip::SelfDrop)
    );
}

#[test]
fn dropping_into_current_parent_is_ignored() {
    let dragged = NodeRef::subject("s1", Some("f1".into()));
    assert_eq!(
        resolve(dragged, DropTarget::Node(NodeRef::folder("f1", None))),
        Err(MoveSkip::AlreadyInTarget)
    );
}

#[test]
fn folder_onto_new_folder_nests_it() {
    let dragged = NodeRef::folder("f2", Some("f1".into()));
    assert_eq!(
        resolve(dragged, DropTarget::Node(NodeRef::folder("f3", None))),
        Ok(ShelfIntent::NestFolder {
            target_parent_id: Some("f3".into()),
            folder_id: "f2".into(),
        })
    );
}

#[test]
fn subject_onto_folder_moves_it() {
    let dragged = NodeRef::subject("s2", None);
    assert_eq!(
        resolve(dragged, DropTarget::Node(NodeRef::folder("f3", None))),
        Ok(ShelfIntent::MoveSubject {
            subject_id: "s2".into(),
            new_parent_id: Some("f3".into()),
            old_parent_id: None,
        })
    );
}

#[test]
fn folder_into_own_descendant_is_rejected() {
    let dragged = NodeRef::folder("f1", None);
    assert_eq!(
        resolve(dragged, DropTarget::Node(NodeRef::folder("f4", Some("f2".into())))),
        Err(MoveSkip::WouldCreateCycle {
            folder: "f1".into(),
            target: "f4".into(),
        })
    );
}

#[test]
fn drop_on_subject_moves_into_its_folder() {
    let dragged = NodeRef::subject("s2", None);
    assert_eq!(
        resolve(dragged, DropTarget::Node(NodeRef::subject("s3", Some("f3".into())))),
        Ok(ShelfIntent::MoveSubject {
            subject_id: "s2".into(),
            new_parent_id: Some("f3".into()),
            old_parent_id: None,
        })
    );

    let dragged = NodeRef::folder("f2", Some("f1".into()));
    assert_eq!(
        resolve(dragged, DropTarget::Node(NodeRef::subject("s2", None))),
        Ok(ShelfIntent::NestFolder {
            target_parent_id: None,
            folder_id: "f2".into(),
        })
    );
}

#[test]
fn drop_on_sibling_subject_is_ignored() {
    let dragged = NodeRef::folder("f2", Some("f1".into()));
    assert_eq!(
        resolve(dragged, DropTarget::Node(NodeRef::subject("s1", Some("f1".into())))),
        Err(MoveSkip::SameContainer)
    );
}

#[test]
fn folder_onto_subject_inside_itself_is_rejected() {
    let snapshot = ShelfSnapshot::new(
        vec![FolderNode::new("f", "F").subjects(["s"])],
        vec![SubjectNode::new("s", "S").parent("f")],
    );
    let dragged = NodeRef::folder("f", None);
    let target = DropTarget::Node(NodeRef::subject("s", Some("f".into())));
    let resolution = resolve_drop(&dragged, &target, &ResolveContext::new(&snapshot, None));
    assert!(matches!(resolution, Err(MoveSkip::WouldCreateCycle { .. })));
}

#[test]
fn promote_zone_needs_open_folder() {
    let snapshot = snapshot();
    let dragged = NodeRef::subject("s1", Some("f1".into()));

    let at_root = ResolveContext::new(&snapshot, None);
    assert_eq!(
        resolve_drop(&dragged, &DropTarget::PromoteZone, &at_root),
        Err(MoveSkip::NotInsideFolder)
    );

    let current: NodeId = "f1".into();
    let inside = ResolveContext::new(&snapshot, Some(&current));
    assert_eq!(
        resolve_drop(&dragged, &DropTarget::PromoteZone, &inside),
        Ok(ShelfIntent::PromoteSubject {
            subject_id: "s1".into()
        })
    );
    let folder = NodeRef::folder("f2", Some("f1".into()));
    assert_eq!(
        resolve_drop(&folder, &DropTarget::PromoteZone, &inside),
        Ok(ShelfIntent::PromoteFolder {
            folder_id: "f2".into()
        })
    );
}

#[test]
fn current_layer_zone_moves_into_browsed_folder() {
    let snapshot = snapshot();
    let current: NodeId = "f3".into();
    let cx = ResolveContext::new(&snapshot, Some(&current));

    let dragged = NodeRef::subject("s1", Some("f1".into()));
    assert_eq!(
        resolve_drop(&dragged, &DropTarget::CurrentLayer, &cx),
        Ok(ShelfIntent::MoveSubject {
            subject_id: "s1".into(),
            new_parent_id: Some("f3".into()),
            old_parent_id: Some("f1".into()),
        })
    );

    let already_here = NodeRef::subject("s3", Some("f3".into()));
    assert_eq!(
        resolve_drop(&already_here, &DropTarget::CurrentLayer, &cx),
        Err(MoveSkip::SameContainer)
    );

    let root = ResolveContext::new(&snapshot, None);
    let nested = NodeRef::folder("f4", Some("f2".into()));
    assert_eq!(
        resolve_drop(&nested, &DropTarget::CurrentLayer, &root),
        Ok(ShelfIntent::NestFolder {
            target_parent_id: None,
            folder_id: "f4".into(),
        })
    );
}

#[test]
fn finish_drop_dispatches_once_and_ends_session() {
    let snapshot = snapshot();
    let ended = Rc::new(RefCell::new(0));
    let mut session = DragSession::new(NoOverlay).on_drag_end({
        let ended = Rc::clone(&ended);
        move |_| *ended.borrow_mut() += 1
    });
    let recorder = Recorder::default();

    let data = session.start(
        NodeRef::folder("f2", Some("f1".into())),
        None,
        Point::new(5., 5.),
        None,
    );
    let intent = MoveResolver::finish_drop(
        &mut session,
        &data,
        &DropTarget::Node(NodeRef::folder("f3", None)),
        &ResolveContext::new(&snapshot, None),
        &recorder,
    );

    assert_eq!(
        intent,
        Some(ShelfIntent::NestFolder {
            target_parent_id: Some("f3".into()),
            folder_id: "f2".into(),
        })
    );
    assert_eq!(recorder.intents.borrow().len(), 1);
    assert_eq!(*ended.borrow(), 1);
    assert!(!session.is_dragging());
}

#[test]
fn finish_drop_with_malformed_data_still_ends_session() {
    let snapshot = snapshot();
    let mut session = DragSession::new(NoOverlay);
    let recorder = Recorder::default();
    session.start(NodeRef::subject("s2", None), None, Point::new(5., 5.), None);

    let mut data = DragData::new();
    data.set(TREE_ITEM_KEY, "garbage");
    let intent = MoveResolver::finish_drop(
        &mut session,
        &data,
        &DropTarget::Node(NodeRef::folder("f3", None)),
        &ResolveContext::new(&snapshot, None),
        &recorder,
    );

    assert_eq!(intent, None);
    assert!(recorder.intents.borrow().is_empty());
    assert!(!session.is_dragging());
}

#[test]
fn finish_reorder_reads_position_from_drag_data() {
    let mut session = DragSession::new(NoOverlay);
    let recorder = Recorder::default();
    let data = session.start(NodeRef::folder("f1", None), Some(0), Point::new(1., 1.), None);

    let intent = MoveResolver::finish_reorder(
        &mut session,
        &data,
        &NodeRef::folder("f3", None),
        1,
        2,
        &recorder,
    );
    assert_eq!(
        intent,
        Some(ShelfIntent::ReorderFolder {
            folder_id: "f1".into(),
            from: 0,
            to: 1,
        })
    );
    assert_eq!(*recorder.intents.borrow(), vec![intent.unwrap()]);
    assert!(!session.is_dragging());
}
