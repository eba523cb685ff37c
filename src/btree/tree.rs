//! The tree controller: owns the root pointer and drives the recursive
//! algorithms in [`crate::btree::algorithms`] for whole-tree `insert`,
//! `delete`, and `get`.
//!
//! Everything below the root is built by [`super::algorithms`] and
//! [`super::builders`]; this module's job is strictly the bookkeeping that
//! only makes sense at the top: creating the very first leaf, growing the
//! tree by one level when the root splits, and shrinking it by one level
//! when the root's only child can replace it.

use tracing::debug;

use super::algorithms::{lookup_le, new_root_leaf, tree_delete, tree_insert};
use super::builders::{append_kv, split3};
use super::node::{BNode, NodeTag, MAX_KEY, MAX_VAL};
use super::page_store::PageStore;
use crate::page::PageId;

/// A copy-on-write B+ tree over an abstract [`PageStore`].
///
/// `root == 0` means the tree is empty; the first successful `insert`
/// creates the sentinel-bearing root leaf (see [`new_root_leaf`]).
#[derive(Debug)]
pub struct BTree<S: PageStore> {
    store: S,
    root: PageId,
}

impl<S: PageStore> BTree<S> {
    /// Wrap a page-store as an empty tree. A fresh store and a store that
    /// already holds a previously-built tree's pages are both valid here;
    /// this crate has no on-disk header recording "the" root id, so a
    /// caller persisting across restarts must remember the root id
    /// separately and rebuild with [`BTree::from_existing_root`].
    #[must_use]
    pub fn new(store: S) -> Self {
        super::node::assert_constants_are_sane();
        Self { store, root: 0 }
    }

    /// Resume operating on a tree whose root is already `root` in `store`.
    #[must_use]
    pub fn from_existing_root(store: S, root: PageId) -> Self {
        super::node::assert_constants_are_sane();
        Self { store, root }
    }

    /// The current root page id, or `0` if the tree is empty.
    #[must_use]
    pub fn root(&self) -> PageId {
        self.root
    }

    /// Consume the tree, returning its page-store. Useful for callers that
    /// built the tree against a store they still want to use afterward
    /// (e.g. to inspect `MemPageStore::len`).
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Look up `key`, returning a copy of its value if present.
    ///
    /// # Panics
    /// Panics if `key` is empty — the empty key is reserved for the
    /// internal sentinel and is never a valid lookup key.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        assert!(!key.is_empty(), "get: key must not be empty");
        if self.root == 0 {
            return None;
        }

        let mut node = BNode::from_page(self.store.get(self.root));
        loop {
            let i = lookup_le(&node, key);
            match node.tag() {
                NodeTag::Leaf => {
                    if node.get_key(i) == key {
                        return Some(node.get_val(i).to_vec());
                    }
                    return None;
                }
                NodeTag::Internal => {
                    let child_id = node.get_ptr(i);
                    node = BNode::from_page(self.store.get(child_id));
                }
            }
        }
    }

    /// Insert `key`, overwriting any existing value for it.
    ///
    /// # Panics
    /// Panics if `key` is empty, `key` exceeds [`MAX_KEY`], or `val`
    /// exceeds [`MAX_VAL`] — callers are expected to validate sizes before
    /// calling into the core, per the crate's no-silent-truncation policy.
    pub fn insert(&mut self, key: &[u8], val: &[u8]) {
        assert!(!key.is_empty(), "insert: key must not be empty");
        assert!(
            key.len() <= MAX_KEY,
            "insert: key length {} exceeds MAX_KEY {MAX_KEY}",
            key.len()
        );
        assert!(
            val.len() <= MAX_VAL,
            "insert: value length {} exceeds MAX_VAL {MAX_VAL}",
            val.len()
        );

        if self.root == 0 {
            let root = new_root_leaf(key, val);
            self.root = self.store.new(root.into_page());
            return;
        }

        let old_root_id = self.root;
        let old_root = BNode::from_page(self.store.get(old_root_id));
        let updated = tree_insert(&mut self.store, &old_root, key, val);
        self.store.del(old_root_id);

        let mut fragments = split3(updated);
        if fragments.len() == 1 {
            self.root = self.store.new(fragments.remove(0).into_page());
            return;
        }

        debug!(n = fragments.len(), "root split, growing tree by one level");

        let mut new_root = BNode::new();
        new_root.set_header(NodeTag::Internal, fragments.len() as u16);
        let mut pos = 0u16;
        for frag in fragments {
            let first_key = frag.get_key(0).to_vec();
            let ptr = self.store.new(frag.into_page());
            append_kv(&mut new_root, pos, ptr, &first_key, &[]);
            pos += 1;
        }
        self.root = self.store.new(new_root.into_page());
    }

    /// Delete `key`. Returns `true` if it was present.
    ///
    /// # Panics
    /// Panics if `key` is empty.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        assert!(!key.is_empty(), "delete: key must not be empty");
        if self.root == 0 {
            return false;
        }

        let old_root_id = self.root;
        let old_root = BNode::from_page(self.store.get(old_root_id));
        let Some(mut updated) = tree_delete(&mut self.store, &old_root, key) else {
            return false;
        };
        self.store.del(old_root_id);

        // Collapse a one-child internal root down to its child, repeatedly:
        // an insert can only ever grow the tree by one level at a time, but
        // a single delete's merge can in principle leave a chain of
        // single-child internal nodes above a leaf that is itself still
        // non-empty (it always is — the sentinel guarantees at least one
        // entry). Each collapse reuses the child's existing page id rather
        // than re-allocating it — the child is already live in the store.
        let mut existing_id: Option<PageId> = None;
        while updated.tag() == NodeTag::Internal && updated.nkeys() == 1 {
            let only_child_id = updated.get_ptr(0);
            debug!(old_root = old_root_id, "root collapsed by one level");
            updated = BNode::from_page(self.store.get(only_child_id));
            existing_id = Some(only_child_id);
        }

        self.root = match existing_id {
            Some(id) => id,
            None => self.store.new(updated.into_page()),
        };
        true
    }
}
