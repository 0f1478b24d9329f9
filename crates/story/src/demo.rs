use gpui_shelf_core::{FolderNode, ShelfSnapshot, SubjectNode, Topic};

fn topics(names: &[&str]) -> Vec<Topic> {
    names
        .iter()
        .map(|name| Topic {
            name: name.to_string(),
            rest: Default::default(),
        })
        .collect()
}

fn subject(
    id: &str,
    name: &str,
    parent: Option<&str>,
    color: &str,
    course: &str,
    topic_names: &[&str],
) -> SubjectNode {
    let mut subject = SubjectNode::new(id, name).color(color).course(course);
    if let Some(parent) = parent {
        subject = subject.parent(parent);
    }
    subject.topics = topics(topic_names);
    subject
}

/// A small school shelf used when no seed snapshot is configured.
pub fn demo_snapshot() -> ShelfSnapshot {
    let mut science = FolderNode::new("science", "Science")
        .color("from-green-500 to-emerald-600")
        .subjects(["biology", "chemistry"])
        .folders(["labs"]);
    science.description = Some("Year 10 sciences".to_string());
    science.tags = vec!["stem".to_string()];

    let labs = FolderNode::new("labs", "Lab Reports")
        .parent("science")
        .color("from-cyan-500 to-blue-600")
        .subjects(["physics"]);

    let mut humanities = FolderNode::new("humanities", "Humanities")
        .color("from-amber-400 to-orange-500")
        .subjects(["history"]);
    humanities.is_shared = true;
    humanities.shared_with = ["ms.rivera@example.com".to_string()].into_iter().collect();

    let archive = FolderNode::new("archive", "Archive").color("from-slate-400 to-slate-600");

    let mut art = subject(
        "art",
        "Art",
        None,
        "from-pink-500 to-rose-500",
        "ART 110",
        &["Color theory", "Perspective"],
    );
    art.tags = vec!["elective".to_string()];

    ShelfSnapshot::new(
        vec![science, labs, humanities, archive],
        vec![
            subject(
                "biology",
                "Biology",
                Some("science"),
                "from-green-400 to-lime-500",
                "BIO 101",
                &["Cells", "Genetics", "Ecology"],
            ),
            subject(
                "chemistry",
                "Chemistry",
                Some("science"),
                "from-purple-500 to-violet-600",
                "CHEM 120",
                &["Atoms", "Bonding"],
            ),
            subject(
                "physics",
                "Physics",
                Some("labs"),
                "from-blue-500 to-indigo-600",
                "PHYS 140",
                &["Motion", "Energy", "Waves"],
            ),
            subject(
                "history",
                "World History",
                Some("humanities"),
                "from-red-500 to-orange-600",
                "HIST 200",
                &["Antiquity", "Revolutions"],
            ),
            art,
            subject(
                "algebra",
                "Algebra",
                None,
                "from-sky-500 to-blue-600",
                "MATH 150",
                &["Equations", "Functions"],
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use gpui_shelf_core::{MemoryShelf, ShelfSource as _, folder_counts};

    use super::*;

    #[test]
    fn demo_links_are_consistent() {
        let snapshot = demo_snapshot();
        for folder in &snapshot.folders {
            for child in &folder.folder_ids {
                let child = snapshot.folder(child).unwrap();
                assert_eq!(child.parent_id.as_ref(), Some(&folder.id));
            }
            for child in &folder.subject_ids {
                let child = snapshot.subject(child).unwrap();
                assert_eq!(child.parent_id.as_ref(), Some(&folder.id));
            }
        }
    }

    #[test]
    fn demo_counts() {
        let snapshot = demo_snapshot();
        let science = snapshot.folder(&"science".into()).unwrap();
        let counts = folder_counts(science, &snapshot.folders);
        assert_eq!((counts.subject_count, counts.folder_count), (3, 1));
    }

    #[test]
    fn demo_round_trips_through_the_store() {
        let shelf = MemoryShelf::new(demo_snapshot());
        let json = shelf.to_json().unwrap();
        let reloaded = MemoryShelf::from_json(&json).unwrap();
        assert_eq!(reloaded.snapshot(), demo_snapshot());
    }
}
