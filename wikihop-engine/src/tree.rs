/// Handle into a [`PathTree`] arena. Cheap to copy, only meaningful for the
/// tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct PathNode {
    title: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Discovery tree for one search. Each node records the page it was reached
/// from, so a found target can be walked back to the start page. Nodes are
/// arena-allocated and never removed; parent links are set at creation and
/// never reassigned.
#[derive(Debug, Default)]
pub struct PathTree {
    nodes: Vec<PathNode>,
}

impl PathTree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create the root node for the start page.
    pub fn create_root(&mut self, title: impl Into<String>) -> NodeId {
        self.push_node(title.into(), None)
    }

    /// Attach a newly discovered page under the node it was found on.
    pub fn attach_child(&mut self, parent: NodeId, title: impl Into<String>) -> NodeId {
        let id = self.push_node(title.into(), Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_node(&mut self, title: String, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PathNode {
            title,
            parent,
            children: Vec::new(),
        });
        id
    }

    pub fn title(&self, id: NodeId) -> &str {
        &self.nodes[id.0].title
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Page titles on the chain from the root down to `id`'s parent, in
    /// root-first order. The root title is included, `id`'s own is not;
    /// `ancestors(root)` is empty.
    pub fn ancestors(&self, id: NodeId) -> Vec<String> {
        let mut titles = Vec::new();
        let mut current = self.nodes[id.0].parent;
        while let Some(node) = current {
            titles.push(self.nodes[node.0].title.clone());
            current = self.nodes[node.0].parent;
        }
        titles.reverse();
        titles
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
