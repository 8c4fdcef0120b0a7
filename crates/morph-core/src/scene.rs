use crate::mesh::MeshData;
use crate::types::{NodeId, Transform3};
use glam::Mat4;

/// What a scene node renders.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// A pure container; only its transform and children matter.
    Group,
    /// A triangle mesh.
    Mesh(MeshData),
}

/// A node of the scene graph with its hierarchy links and local transform.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub kind: NodeKind,
    /// Debug label.
    pub name: String,
    /// Indices of child nodes.
    pub children: Vec<NodeId>,
    /// Index of parent node.
    pub parent: Option<NodeId>,
    pub transform: Transform3,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            kind,
            name: name.into(),
            children: Vec::new(),
            parent: None,
            transform: Transform3::new(),
        }
    }

    pub fn mesh(&self) -> Option<&MeshData> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut MeshData> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }
}

/// Arena of scene nodes. Freed slots are recycled by [`SceneGraph::add_node`].
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    /// `None` marks a freed slot.
    pub nodes: Vec<Option<SceneNode>>,
    pub free_indices: Vec<usize>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    /// Adds a detached node to the arena and returns its ID.
    pub fn add_node(&mut self, node: SceneNode) -> NodeId {
        if let Some(id) = self.free_indices.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(node));
            id
        }
    }

    /// Adds a node and attaches it under `parent` in one step.
    pub fn spawn(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
        let id = self.add_node(node);
        self.add_child(parent, id);
        id
    }

    /// Removes `id` and its whole subtree.
    pub fn destroy_node(&mut self, id: NodeId) {
        let (parent_id, children_ids) = match self.get_node(id) {
            Some(node) => (node.parent, node.children.clone()),
            None => return,
        };

        if let Some(pid) = parent_id {
            self.remove_child(pid, id);
        }

        for child_id in children_ids {
            self.destroy_node(child_id);
        }

        self.nodes[id] = None;
        self.free_indices.push(id);
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p_node) = self.get_node_mut(parent) {
            p_node.children.push(child);
        }
        if let Some(c_node) = self.get_node_mut(child) {
            c_node.parent = Some(parent);
        }
    }

    /// Unlinks `child` from `parent`'s child list. The child's own `parent` link is left as is.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p_node) = self.get_node_mut(parent) {
            if let Some(pos) = p_node.children.iter().position(|&x| x == child) {
                p_node.children.remove(pos);
            }
        }
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id).and_then(|n| n.as_mut())
    }

    pub fn get_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    /// Number of direct children of `id` (0 for a missing node).
    pub fn child_count(&self, id: NodeId) -> usize {
        self.get_node(id).map_or(0, |n| n.children.len())
    }

    /// Number of live nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Composes local transforms from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.get_node(id);
        while let Some(node) = current {
            matrix = node.transform.matrix() * matrix;
            current = node.parent.and_then(|pid| self.get_node(pid));
        }
        matrix
    }
}
