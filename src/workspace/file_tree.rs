use crate::ids::time_derived_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<FileNode>,
    pub is_open: bool,
}

impl FileNode {
    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::File,
            children: Vec::new(),
            is_open: false,
        }
    }

    pub fn folder(id: impl Into<String>, name: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::Folder,
            children,
            is_open: false,
        }
    }

    pub fn opened(mut self) -> Self {
        self.is_open = true;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

/// One rendered line of the explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub node: &'a FileNode,
}

/// Workspace explorer tree.
///
/// Node ids must be unique across the whole tree. Duplicates are not
/// detected; `toggle` flips every node carrying the id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    roots: Vec<FileNode>,
}

impl FileTree {
    pub fn new(roots: Vec<FileNode>) -> Self {
        Self { roots }
    }

    pub fn sample() -> Self {
        Self::new(vec![FileNode::folder(
            "root1",
            "Project Alpha",
            vec![
                FileNode::folder(
                    "f1",
                    "src",
                    vec![
                        FileNode::file("file1", "index.ts"),
                        FileNode::file("file2", "utils.ts"),
                    ],
                ),
                FileNode::file("f2", "package.json"),
            ],
        )
        .opened()])
    }

    #[cfg(test)]
    pub fn roots(&self) -> &[FileNode] {
        &self.roots
    }

    /// Returns a tree where the node matching `node_id` has `is_open`
    /// inverted. Closed folders are searched too. Only the path from the
    /// root to the match is rebuilt; an unknown id yields an equal tree.
    pub fn toggle(&self, node_id: &str) -> FileTree {
        FileTree {
            roots: toggle_nodes(node_id, &self.roots),
        }
    }

    /// Appends an empty, closed folder at the end of the root list.
    pub fn add_root_folder(&self, name: impl Into<String>, now_ms: i64) -> FileTree {
        let id = time_derived_id(now_ms, |candidate| self.contains(candidate));
        let mut roots = self.roots.clone();
        roots.push(FileNode::folder(id, name, Vec::new()));
        FileTree { roots }
    }

    /// Label used by the explorer's "add folder" button.
    pub fn next_folder_name(&self) -> String {
        format!("Local Folder {}", self.roots.len() + 1)
    }

    pub fn find(&self, node_id: &str) -> Option<&FileNode> {
        fn walk<'a>(nodes: &'a [FileNode], node_id: &str) -> Option<&'a FileNode> {
            for node in nodes {
                if node.id == node_id {
                    return Some(node);
                }
                if let Some(found) = walk(&node.children, node_id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.find(node_id).is_some()
    }

    pub fn visible_rows(&self) -> Vec<TreeRow<'_>> {
        fn walk<'a>(nodes: &'a [FileNode], depth: usize, rows: &mut Vec<TreeRow<'a>>) {
            for node in nodes {
                rows.push(TreeRow { depth, node });
                if node.is_folder() && node.is_open {
                    walk(&node.children, depth + 1, rows);
                }
            }
        }

        let mut rows = Vec::new();
        walk(&self.roots, 0, &mut rows);
        rows
    }
}

fn toggle_nodes(node_id: &str, nodes: &[FileNode]) -> Vec<FileNode> {
    nodes
        .iter()
        .map(|node| {
            if node.id == node_id {
                FileNode {
                    is_open: !node.is_open,
                    ..node.clone()
                }
            } else if node.children.is_empty() {
                node.clone()
            } else {
                FileNode {
                    children: toggle_nodes(node_id, &node.children),
                    ..node.clone()
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_nodes(tree: &FileTree) -> Vec<FileNode> {
        fn walk(nodes: &[FileNode], out: &mut Vec<FileNode>) {
            for node in nodes {
                out.push(node.clone());
                walk(&node.children, out);
            }
        }
        let mut out = Vec::new();
        walk(tree.roots(), &mut out);
        out
    }

    fn changed_ids(before: &FileTree, after: &FileTree) -> Vec<String> {
        all_nodes(before)
            .into_iter()
            .zip(all_nodes(after))
            .filter(|(a, b)| a.is_open != b.is_open || a.name != b.name || a.id != b.id)
            .map(|(a, _)| a.id)
            .collect()
    }

    #[test]
    fn toggle_flips_nested_folder_only() {
        let tree = FileTree::sample();
        let toggled = tree.toggle("f1");

        assert_eq!(toggled.find("f1").map(|node| node.is_open), Some(true));
        assert_eq!(toggled.find("root1").map(|node| node.is_open), Some(true));
        assert_eq!(changed_ids(&tree, &toggled), vec!["f1".to_string()]);
    }

    #[test]
    fn toggle_reaches_descendants_of_closed_folders() {
        let tree = FileTree::new(vec![FileNode::folder(
            "outer",
            "outer",
            vec![FileNode::folder(
                "middle",
                "middle",
                vec![FileNode::folder("deep", "deep", Vec::new())],
            )],
        )]);
        let toggled = tree.toggle("deep");

        assert_eq!(toggled.find("deep").map(|node| node.is_open), Some(true));
        assert_eq!(toggled.find("outer").map(|node| node.is_open), Some(false));
        assert_eq!(changed_ids(&tree, &toggled), vec!["deep".to_string()]);
    }

    #[test]
    fn toggle_twice_restores_original() {
        let tree = FileTree::sample();
        assert_eq!(tree.toggle("root1").toggle("root1"), tree);
        assert_eq!(tree.toggle("f1").toggle("f1"), tree);
    }

    #[test]
    fn toggle_unknown_id_leaves_tree_unchanged() {
        let tree = FileTree::sample();
        let toggled = tree.toggle("missing");
        assert_eq!(toggled, tree);
        assert!(changed_ids(&tree, &toggled).is_empty());
    }

    #[test]
    fn add_root_folder_appends_empty_closed_folder() {
        let tree = FileTree::sample();
        let name = tree.next_folder_name();
        let grown = tree.add_root_folder(name, 1_700_000_000_000);

        assert_eq!(grown.roots().len(), tree.roots().len() + 1);
        let added = grown.roots().last().cloned().expect("added folder should be the last root");
        assert_eq!(added.name, "Local Folder 2");
        assert_eq!(added.kind, NodeKind::Folder);
        assert!(added.children.is_empty());
        assert!(!added.is_open);
        assert!(!tree.contains(&added.id));
        assert_eq!(grown.roots()[0], tree.roots()[0]);
    }

    #[test]
    fn add_root_folder_ids_stay_unique_within_one_millisecond() {
        let tree = FileTree::default()
            .add_root_folder("a", 5)
            .add_root_folder("b", 5);
        let ids: Vec<&str> = tree.roots().iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "6"]);
    }

    #[test]
    fn visible_rows_skip_closed_and_empty_folders() {
        let tree = FileTree::sample().add_root_folder("Empty", 1);
        let rows: Vec<(usize, &str)> = tree
            .visible_rows()
            .iter()
            .map(|row| (row.depth, row.node.id.as_str()))
            .collect();
        assert_eq!(rows, vec![(0, "root1"), (1, "f1"), (1, "f2"), (0, "1")]);

        let opened = tree.toggle("f1").toggle("1");
        let depths: Vec<usize> = opened.visible_rows().iter().map(|row| row.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 1, 0]);
    }
}
