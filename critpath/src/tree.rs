use std::collections::HashSet;

use crate::index::{normalize_url, RequestIndex};
use crate::records::NetworkRecord;

/// A node of the critical path tree. The root is the ad request; the children of any node are
/// the scripts whose execution led to it being requested.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TreeNode {
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: vec![],
        }
    }

    /// Total number of nodes in this tree, repeats included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

/// Output of [`CriticalPathTreeBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPath {
    pub tree: TreeNode,
    /// Number of distinct URLs in the tree, root included.
    pub unique_count: usize,
}

/// Rebuilds the tree of script loads that led to a request by walking initiator stacks.
///
/// Every URL is expanded at most once per build. A URL reached again, whether through a cycle
/// back to one of its own ancestors or through a second path into a shared dependency, still
/// shows up in the tree at that position but has no children and is not counted again.
pub struct CriticalPathTreeBuilder<'i, 'a> {
    index: &'i RequestIndex<'a>,
    max_stack_depth: usize,
}

/// State for one call to `build`.
struct Walk {
    /// URLs already expanded anywhere in the tree.
    visited: HashSet<String>,
    /// URLs currently being expanded on the way from the root to the current node.
    path: Vec<String>,
}

impl<'i, 'a> CriticalPathTreeBuilder<'i, 'a> {
    pub fn new(index: &'i RequestIndex<'a>, max_stack_depth: usize) -> Self {
        Self { index, max_stack_depth }
    }

    pub fn build(&self, root: &NetworkRecord) -> CriticalPath {
        let mut walk = Walk {
            visited: HashSet::new(),
            path: vec![],
        };
        let tree = self.expand(root, &mut walk);
        CriticalPath {
            tree,
            unique_count: walk.visited.len(),
        }
    }

    fn expand(&self, record: &NetworkRecord, walk: &mut Walk) -> TreeNode {
        let mut node = TreeNode::leaf(&record.url);
        let key = normalize_url(&record.url);

        if walk.visited.contains(&key) {
            if walk.path.contains(&key) {
                tracing::debug!(url = %record.url, "cycle in initiator chain");
            } else {
                tracing::debug!(url = %record.url, "shared dependency reached again");
            }
            return node;
        }
        walk.visited.insert(key.clone());
        walk.path.push(key);

        let children = self.index.resolver().resolve_initiators(record, self.max_stack_depth);
        node.children = children
            .into_iter()
            .map(|(_, child)| self.expand(child, walk))
            .collect();

        walk.path.pop();
        node
    }
}
