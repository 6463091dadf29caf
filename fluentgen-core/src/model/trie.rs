//! Prefix-merge trie over key sequences.
//!
//! Nodes live in a flat arena and reference each other by [`NodeId`].
//! Keys are compared with `PartialEq`, not hashed: the fluent parameter
//! relation is structural and not transitive, so a child lookup is a linear
//! scan over the (small) sibling list in insertion order.
//!
//! ```text
//!   insert([a, b], X)      root
//!   insert([a, c], Y)       └─ a
//!   insert([a], Z)             ├─ b   {X}
//!                              ├─ c   {Y}
//!                              (a itself ends Z)
//! ```

use serde::Serialize;

/// Index of a node in the trie arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct TrieNode<K, V> {
    parent: Option<NodeId>,
    depth: usize,
    /// Every key variant inserted along the edge into this node, in
    /// insertion order. The first is the representative.
    encountered: Vec<K>,
    children: Vec<NodeId>,
    /// Payloads whose sequence ends exactly here.
    end_values: Vec<V>,
}

impl<K, V> TrieNode<K, V> {
    fn new(parent: Option<NodeId>, depth: usize) -> Self {
        Self {
            parent,
            depth,
            encountered: Vec::new(),
            children: Vec::new(),
            end_values: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Representative key of the incoming edge (`None` for the root).
    pub fn key(&self) -> Option<&K> {
        self.encountered.first()
    }

    pub fn encountered_key_parts(&self) -> &[K] {
        &self.encountered
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn end_values(&self) -> &[V] {
        &self.end_values
    }

    pub fn is_end(&self) -> bool {
        !self.end_values.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Trie<K, V> {
    nodes: Vec<TrieNode<K, V>>,
}

impl<K: PartialEq + Clone, V> Default for Trie<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq + Clone, V> Trie<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new(None, 0)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TrieNode<K, V> {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].end_values.is_empty()
    }

    /// Add one key sequence ending in `value`. Returns the end node.
    pub fn insert<I>(&mut self, keys: I, value: V) -> NodeId
    where
        I: IntoIterator<Item = K>,
    {
        let mut current = self.root();
        for key in keys {
            current = match self.find_child(current, &key) {
                Some(child) => {
                    self.nodes[child.0].encountered.push(key);
                    child
                }
                None => {
                    let child = NodeId(self.nodes.len());
                    let depth = self.nodes[current.0].depth + 1;
                    let mut node = TrieNode::new(Some(current), depth);
                    node.encountered.push(key);
                    self.nodes.push(node);
                    self.nodes[current.0].children.push(child);
                    child
                }
            };
        }
        self.nodes[current.0].end_values.push(value);
        current
    }

    /// First child whose representative key equals `key`.
    pub fn find_child(&self, parent: NodeId, key: &K) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|c| self.nodes[c.0].key().is_some_and(|k| k == key))
    }

    /// Payloads ending at or below `id`, in pre-order.
    pub fn values(&self, id: NodeId) -> Vec<&V> {
        self.preorder_from(id)
            .into_iter()
            .flat_map(|n| self.nodes[n.0].end_values.iter())
            .collect()
    }

    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root())
    }

    fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Representative keys from the root to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.nodes[id.0].depth);
        let mut current = Some(id);
        while let Some(n) = current {
            let node = &self.nodes[n.0];
            if let Some(k) = node.key() {
                keys.push(k);
            }
            current = node.parent;
        }
        keys.reverse();
        keys
    }

    /// Non-root nodes with neither children nor values. Always empty after
    /// inserts; exposed for invariant checks.
    pub fn dead_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, n)| n.children.is_empty() && n.end_values.is_empty())
            .map(|(i, _)| NodeId(i))
            .collect()
    }
}
