use gpui_shelf_core::{FolderCounts, FolderNode, folder_counts};

#[test]
fn counts_roll_up_through_nested_folders() {
    // Folder A holds two subjects and folder B, which holds one subject.
    let folders = vec![
        FolderNode::new("root", "Root").folders(["a"]),
        FolderNode::new("a", "A").parent("root").subjects(["s1", "s2"]).folders(["b"]),
        FolderNode::new("b", "B").parent("a").subjects(["s3"]),
    ];

    let counts = folder_counts(&folders[1], &folders);
    assert_eq!(
        counts,
        FolderCounts {
            subject_count: 3,
            folder_count: 1,
        }
    );
    assert_eq!(counts.total_count(), 4);

    let counts = folder_counts(&folders[0], &folders);
    assert_eq!(counts.subject_count, 3);
    assert_eq!(counts.folder_count, 2);
}

#[test]
fn totals_are_additive() {
    let folders = vec![
        FolderNode::new("a", "A").subjects(["s1"]).folders(["b", "c"]),
        FolderNode::new("b", "B").parent("a").subjects(["s2", "s3"]),
        FolderNode::new("c", "C").parent("a").folders(["d"]),
        FolderNode::new("d", "D").parent("c").subjects(["s4"]),
    ];
    for folder in &folders {
        let counts = folder_counts(folder, &folders);
        assert_eq!(
            counts.total_count(),
            counts.subject_count + counts.folder_count
        );
    }
    let counts = folder_counts(&folders[0], &folders);
    assert_eq!((counts.subject_count, counts.folder_count), (4, 3));
}

#[test]
fn mutual_containment_terminates() {
    let folders = vec![
        FolderNode::new("a", "A").folders(["b"]).subjects(["s1"]),
        FolderNode::new("b", "B").parent("a").folders(["a"]).subjects(["s2"]),
    ];
    let counts = folder_counts(&folders[0], &folders);
    assert_eq!(counts.subject_count, 2);
    assert_eq!(counts.folder_count, 2);
    assert_eq!(counts.total_count(), 4);
}

#[test]
fn deep_chain_does_not_recurse() {
    let depth = 10_000;
    let folders: Vec<FolderNode> = (0..depth)
        .map(|ix| {
            let mut folder = FolderNode::new(format!("f{ix}"), "nested").subjects([format!("s{ix}")]);
            if ix + 1 < depth {
                folder = folder.folders([format!("f{}", ix + 1)]);
            }
            folder
        })
        .collect();
    let counts = folder_counts(&folders[0], &folders);
    assert_eq!(counts.subject_count, depth);
    assert_eq!(counts.folder_count, depth - 1);
}
