//! The classification tree in its working (arena) form.
//!
//! A [`Classification`] stores every category of one classification in a map
//! addressed by [`CategoryId`]. Children are ordered lists of ids and parent
//! links are plain id lookups, so the structure is cycle-free and cheap to
//! clone. All structural mutation algorithms live here; after every shape
//! change a single depth-first pass reassigns the `(left, right, level)`
//! attributes that read paths use for ancestry tests.

use std::collections::{HashMap, HashSet};

use crate::category::Category;
use crate::error::{TreeError, TreeResult};
use crate::id::CategoryId;
use crate::label::{Label, LabelSet};

/// One category inside a [`Classification`] arena.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryNode {
    /// Composite identifier.
    pub id: CategoryId,
    /// Language-tagged labels.
    pub labels: LabelSet,
    /// Optional external reference.
    pub uri: Option<String>,
    /// Owning category, `None` for the root.
    pub parent: Option<CategoryId>,
    /// Ordered child ids.
    pub children: Vec<CategoryId>,
    /// Depth below the root (root = 0).
    pub level: u32,
    /// Nested-set interval start.
    pub left: u32,
    /// Nested-set interval end.
    pub right: u32,
}

/// A complete classification: one root category plus its descendant tree.
///
/// Invariants maintained by every mutation:
/// - exactly one root, reachable from every node via parent links;
/// - no duplicate ids;
/// - `left < right` per node, and descendant intervals strictly nested
///   inside their ancestors';
/// - child `level` is always `parent.level + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    root: CategoryId,
    nodes: HashMap<CategoryId, CategoryNode>,
}

impl Classification {
    /// Build a classification from its nested transport form.
    ///
    /// The top category must be a root id (`local == root`); every id in the
    /// subtree must carry the same root part and appear exactly once.
    pub fn new(root: Category) -> TreeResult<Self> {
        if !root.id.is_root() {
            return Err(TreeError::NotARoot(root.id.clone()));
        }
        Self::check_subtree_ids(root.id.root_id(), &root, &HashSet::new())?;

        let mut tree = Self {
            root: root.id.clone(),
            nodes: HashMap::with_capacity(root.count()),
        };
        let Category {
            id,
            labels,
            uri,
            children,
        } = root;
        tree.nodes.insert(
            id.clone(),
            CategoryNode {
                id: id.clone(),
                labels,
                uri,
                parent: None,
                children: Vec::new(),
                level: 0,
                left: 0,
                right: 0,
            },
        );
        for child in children {
            let child_id = child.id.clone();
            tree.attach_subtree(&id, child);
            tree.node_mut(&id).children.push(child_id);
        }
        tree.renumber();
        Ok(tree)
    }

    // ---------------------------------------------------------------
    // Read paths
    // ---------------------------------------------------------------

    /// Id of the root category.
    pub fn root_id(&self) -> &CategoryId {
        &self.root
    }

    /// Look up a node by id.
    pub fn get(&self, id: &CategoryId) -> Option<&CategoryNode> {
        self.nodes.get(id)
    }

    /// Returns `true` if the id exists in this classification.
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of categories, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A classification always holds at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All ids in depth-first order, starting with the root.
    pub fn ids(&self) -> Vec<CategoryId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_depth_first(&self.root, &mut out);
        out
    }

    /// Ids of the strict descendants of `id`, in depth-first order.
    ///
    /// Empty when `id` is unknown or a leaf.
    pub fn descendants(&self, id: &CategoryId) -> Vec<CategoryId> {
        let mut out = Vec::new();
        if let Some(node) = self.nodes.get(id) {
            for child in &node.children {
                self.collect_depth_first(child, &mut out);
            }
        }
        out
    }

    /// Ids of the strict ancestors of `id`, root first.
    ///
    /// Empty when `id` is unknown or the root itself.
    pub fn ancestors(&self, id: &CategoryId) -> Vec<CategoryId> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(id).and_then(|n| n.parent.clone());
        while let Some(parent) = current {
            current = self.nodes.get(&parent).and_then(|n| n.parent.clone());
            out.push(parent);
        }
        out.reverse();
        out
    }

    /// Position of `id` within its parent's child list (root has none).
    pub fn sibling_index(&self, id: &CategoryId) -> Option<usize> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        self.node(parent).children.iter().position(|c| c == id)
    }

    /// Nested-set ancestry test: is `ancestor` a strict ancestor of `id`?
    ///
    /// Uses the cached `(left, right)` intervals, no tree walk.
    pub fn is_ancestor(&self, ancestor: &CategoryId, id: &CategoryId) -> bool {
        match (self.nodes.get(ancestor), self.nodes.get(id)) {
            (Some(a), Some(b)) => a.left < b.left && b.right < a.right,
            _ => false,
        }
    }

    /// Export the subtree rooted at `id` to transport form.
    ///
    /// `child_depth` bounds how many child levels are included: `-1` means
    /// unlimited, `0` means the category alone.
    pub fn to_category(&self, id: &CategoryId, child_depth: i32) -> TreeResult<Category> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let mut category = Category {
            id: node.id.clone(),
            labels: node.labels.clone(),
            uri: node.uri.clone(),
            children: Vec::new(),
        };
        if child_depth != 0 {
            let next = if child_depth < 0 { -1 } else { child_depth - 1 };
            for child in &node.children {
                category.children.push(self.to_category(child, next)?);
            }
        }
        Ok(category)
    }

    // ---------------------------------------------------------------
    // Structural mutations
    // ---------------------------------------------------------------

    /// Insert a category subtree under `parent_id`.
    ///
    /// `position` indexes into the parent's child list (clamped); `None`
    /// appends. Every id in the incoming subtree must carry this
    /// classification's root part and must not already exist here.
    pub fn insert(
        &mut self,
        parent_id: &CategoryId,
        category: Category,
        position: Option<usize>,
    ) -> TreeResult<()> {
        if !self.nodes.contains_key(parent_id) {
            return Err(TreeError::NotFound(parent_id.clone()));
        }
        let existing: HashSet<CategoryId> = self.nodes.keys().cloned().collect();
        Self::check_subtree_ids(self.root.root_id(), &category, &existing)?;

        let new_id = category.id.clone();
        self.attach_subtree(parent_id, category);
        let parent = self.node_mut(parent_id);
        let position = position
            .unwrap_or(parent.children.len())
            .min(parent.children.len());
        parent.children.insert(position, new_id);
        self.renumber();
        Ok(())
    }

    /// Remove the category and its entire subtree.
    ///
    /// Returns the removed ids in depth-first order, starting with `id`.
    /// The root cannot be removed; deleting a whole classification is the
    /// store's job.
    pub fn remove_subtree(&mut self, id: &CategoryId) -> TreeResult<Vec<CategoryId>> {
        if !self.nodes.contains_key(id) {
            return Err(TreeError::NotFound(id.clone()));
        }
        if *id == self.root {
            return Err(TreeError::RootIsFixed);
        }
        let mut removed = Vec::new();
        self.collect_depth_first(id, &mut removed);
        self.detach(id);
        for gone in &removed {
            self.nodes.remove(gone);
        }
        self.renumber();
        Ok(removed)
    }

    /// Swap the category with its previous sibling.
    ///
    /// Returns the sibling it swapped with, or `None` when the category is
    /// already first (or is the root) — a no-op, not an error.
    pub fn move_up(&mut self, id: &CategoryId) -> TreeResult<Option<CategoryId>> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let Some(parent_id) = node.parent.clone() else {
            return Ok(None);
        };
        let parent = self.node_mut(&parent_id);
        let index = parent
            .children
            .iter()
            .position(|c| c == id)
            .expect("child list out of sync");
        if index == 0 {
            return Ok(None);
        }
        parent.children.swap(index - 1, index);
        let swapped = parent.children[index].clone();
        self.renumber();
        Ok(Some(swapped))
    }

    /// Swap the category with its next sibling.
    ///
    /// Returns the sibling it swapped with, or `None` when already last.
    pub fn move_down(&mut self, id: &CategoryId) -> TreeResult<Option<CategoryId>> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let Some(parent_id) = node.parent.clone() else {
            return Ok(None);
        };
        let parent = self.node_mut(&parent_id);
        let index = parent
            .children
            .iter()
            .position(|c| c == id)
            .expect("child list out of sync");
        if index + 1 == parent.children.len() {
            return Ok(None);
        }
        parent.children.swap(index, index + 1);
        let swapped = parent.children[index].clone();
        self.renumber();
        Ok(Some(swapped))
    }

    /// Re-parent the category toward a shallower position.
    ///
    /// Refused (`None`) when the category is the root, when its parent is
    /// the root of the classification, or when the parent would be left
    /// childless. Otherwise the category moves to the end of the child list
    /// of its former parent's previous sibling; when the former parent is
    /// first among its own siblings, the category instead moves one level
    /// up, directly after its former parent.
    ///
    /// Returns `(old_parent, new_parent)` on success.
    pub fn promote(&mut self, id: &CategoryId) -> TreeResult<Option<(CategoryId, CategoryId)>> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let Some(parent_id) = node.parent.clone() else {
            return Ok(None);
        };
        if self.node(&parent_id).children.len() <= 1 {
            // The parent must retain at least one child.
            return Ok(None);
        }
        let Some(grand_id) = self.node(&parent_id).parent.clone() else {
            return Ok(None);
        };
        let parent_index = self
            .node(&grand_id)
            .children
            .iter()
            .position(|c| *c == parent_id)
            .expect("child list out of sync");

        self.detach(id);
        let new_parent = if parent_index > 0 {
            let target = self.node(&grand_id).children[parent_index - 1].clone();
            self.node_mut(&target).children.push(id.clone());
            target
        } else {
            // Former parent is first among its siblings: one level up,
            // directly after the former parent.
            self.node_mut(&grand_id)
                .children
                .insert(parent_index + 1, id.clone());
            grand_id
        };
        self.node_mut(id).parent = Some(new_parent.clone());
        self.renumber();
        Ok(Some((parent_id, new_parent)))
    }

    /// Re-parent the category under its previous sibling, one level deeper.
    ///
    /// Refused (`None`) when the category is the root or has no previous
    /// sibling. Returns `(old_parent, new_parent)` on success.
    pub fn demote(&mut self, id: &CategoryId) -> TreeResult<Option<(CategoryId, CategoryId)>> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let Some(parent_id) = node.parent.clone() else {
            return Ok(None);
        };
        let index = self
            .node(&parent_id)
            .children
            .iter()
            .position(|c| c == id)
            .expect("child list out of sync");
        if index == 0 {
            return Ok(None);
        }
        let target = self.node(&parent_id).children[index - 1].clone();
        self.detach(id);
        self.node_mut(&target).children.push(id.clone());
        self.node_mut(id).parent = Some(target.clone());
        self.renumber();
        Ok(Some((parent_id, target)))
    }

    /// Move the category (with its subtree) under `new_parent` at `index`.
    ///
    /// The index is clamped to the new parent's child count. Moving the root
    /// or moving a category beneath its own descendant is refused.
    pub fn move_to(
        &mut self,
        id: &CategoryId,
        new_parent: &CategoryId,
        index: usize,
    ) -> TreeResult<()> {
        if !self.nodes.contains_key(id) {
            return Err(TreeError::NotFound(id.clone()));
        }
        if !self.nodes.contains_key(new_parent) {
            return Err(TreeError::NotFound(new_parent.clone()));
        }
        if *id == self.root {
            return Err(TreeError::RootIsFixed);
        }
        if id == new_parent || self.ancestors(new_parent).contains(id) {
            return Err(TreeError::MoveIntoSubtree {
                id: id.clone(),
                target: new_parent.clone(),
            });
        }
        self.detach(id);
        let parent = self.node_mut(new_parent);
        let index = index.min(parent.children.len());
        parent.children.insert(index, id.clone());
        self.node_mut(id).parent = Some(new_parent.clone());
        self.renumber();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Content mutations
    // ---------------------------------------------------------------

    /// Wholesale replacement of a category's label set.
    pub fn set_labels(&mut self, id: &CategoryId, labels: LabelSet) -> TreeResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        node.labels = labels;
        Ok(())
    }

    /// Insert or replace one label by its language.
    pub fn set_label(&mut self, id: &CategoryId, label: Label) -> TreeResult<Option<Label>> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        Ok(node.labels.set(label))
    }

    /// Remove one label by language. `Ok(false)` when no such label exists.
    pub fn remove_label(&mut self, id: &CategoryId, lang: &str) -> TreeResult<bool> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        Ok(node.labels.remove(lang).is_some())
    }

    /// Set or clear the external URI.
    pub fn set_uri(&mut self, id: &CategoryId, uri: Option<String>) -> TreeResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        node.uri = uri;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn node(&self, id: &CategoryId) -> &CategoryNode {
        self.nodes.get(id).expect("node table out of sync")
    }

    fn node_mut(&mut self, id: &CategoryId) -> &mut CategoryNode {
        self.nodes.get_mut(id).expect("node table out of sync")
    }

    /// Remove `id` from its parent's child list. The node itself stays.
    fn detach(&mut self, id: &CategoryId) {
        if let Some(parent_id) = self.node(id).parent.clone() {
            self.node_mut(&parent_id).children.retain(|c| c != id);
        }
    }

    fn collect_depth_first(&self, id: &CategoryId, out: &mut Vec<CategoryId>) {
        out.push(id.clone());
        if let Some(node) = self.nodes.get(id) {
            for child in &node.children {
                self.collect_depth_first(child, out);
            }
        }
    }

    /// Validate root-part agreement and id uniqueness of an incoming
    /// subtree, also against `existing` ids already present in the arena.
    fn check_subtree_ids(
        root_id: &str,
        category: &Category,
        existing: &HashSet<CategoryId>,
    ) -> TreeResult<()> {
        let mut seen = HashSet::new();
        for id in category.subtree_ids() {
            if id.root_id() != root_id {
                return Err(TreeError::RootMismatch {
                    expected: root_id.to_string(),
                    found: id,
                });
            }
            if existing.contains(&id) || !seen.insert(id.clone()) {
                return Err(TreeError::DuplicateId(id));
            }
        }
        Ok(())
    }

    /// Create arena nodes for `category` and its descendants below `parent`.
    ///
    /// The caller links `category.id` into the parent's child list.
    fn attach_subtree(&mut self, parent: &CategoryId, category: Category) {
        let Category {
            id,
            labels,
            uri,
            children,
        } = category;
        self.nodes.insert(
            id.clone(),
            CategoryNode {
                id: id.clone(),
                labels,
                uri,
                parent: Some(parent.clone()),
                children: Vec::new(),
                level: 0,
                left: 0,
                right: 0,
            },
        );
        for child in children {
            let child_id = child.id.clone();
            self.attach_subtree(&id, child);
            self.node_mut(&id).children.push(child_id);
        }
    }

    /// One depth-first pass assigning `(left, right, level)` to every node.
    fn renumber(&mut self) {
        fn assign(
            nodes: &mut HashMap<CategoryId, CategoryNode>,
            id: &CategoryId,
            level: u32,
            counter: &mut u32,
        ) {
            *counter += 1;
            let children = {
                let node = nodes.get_mut(id).expect("node table out of sync");
                node.level = level;
                node.left = *counter;
                node.children.clone()
            };
            for child in &children {
                assign(nodes, child, level + 1, counter);
            }
            *counter += 1;
            nodes.get_mut(id).expect("node table out of sync").right = *counter;
        }

        let root = self.root.clone();
        let mut counter = 0;
        assign(&mut self.nodes, &root, 0, &mut counter);
    }
}
