//! Recursive insert and delete over pages fetched via a page-store.
//!
//! These functions are where the tree's CoW discipline actually happens:
//! every recursive step reads an old child via `store.get`, builds a new
//! one, allocates it via `store.new`, and `store.del`s the old page-id. The
//! [`crate::btree::tree::BTree`] controller only drives the top level
//! (root bookkeeping); everything below the root is here.

use super::builders::{
    append_kv, leaf_delete, leaf_insert, leaf_update, merge, replace_2_kids, replace_kid_1,
    replace_kid_n, split3,
};
use super::node::{NodeTag, PAGE_SIZE};
use super::page_store::PageStore;
use super::BNode;

/// Return the largest index `i ∈ [0, nkeys)` such that `node.get_key(i) ≤
/// key`. Index `0` is always a copy of the subtree's minimum key (or the
/// tree's sentinel), so it is always `≤ key` and this always returns a
/// valid index.
///
/// This is a linear scan rather than a binary search. Node key counts are
/// bounded by page size (at most a few hundred entries), so the constant
/// factor of a linear scan over cache-local bytes is not worth trading for
/// branch-heavy binary search; a binary search is an equally conforming
/// substitute that returns the same index.
#[must_use]
pub fn lookup_le(node: &BNode, key: &[u8]) -> u16 {
    let nkeys = node.nkeys();
    let mut found = 0u16;
    for i in 1..nkeys {
        if node.get_key(i) <= key {
            found = i;
        } else {
            break;
        }
    }
    found
}

/// Insert `(key, val)` into the subtree rooted at `node`, returning a
/// freshly built replacement node. The replacement may be oversized — the
/// caller is responsible for running [`split3`] on it before persisting.
pub fn tree_insert<S: PageStore>(store: &mut S, node: &BNode, key: &[u8], val: &[u8]) -> BNode {
    let i = lookup_le(node, key);

    match node.tag() {
        NodeTag::Leaf => {
            let mut dst = BNode::new();
            if node.get_key(i) == key {
                leaf_update(&mut dst, node, i, key, val);
            } else {
                leaf_insert(&mut dst, node, i + 1, key, val);
            }
            dst
        }
        NodeTag::Internal => {
            let child_id = node.get_ptr(i);
            let child = BNode::from_page(store.get(child_id));
            let updated = tree_insert(store, &child, key, val);
            store.del(child_id);

            let fragments = split3(updated);
            let new_children: Vec<(u64, Vec<u8>)> = fragments
                .into_iter()
                .map(|frag| {
                    let first_key = frag.get_key(0).to_vec();
                    let ptr = store.new(frag.into_page());
                    (ptr, first_key)
                })
                .collect();

            let mut dst = BNode::new();
            replace_kid_n(&mut dst, node, i, &new_children);
            dst
        }
    }
}

/// Delete `key` from the subtree rooted at `node`. Returns `None` if the
/// key was not found (including if `node` itself has no matching entry);
/// otherwise returns the freshly built replacement node.
pub fn tree_delete<S: PageStore>(store: &mut S, node: &BNode, key: &[u8]) -> Option<BNode> {
    let i = lookup_le(node, key);

    match node.tag() {
        NodeTag::Leaf => {
            if node.get_key(i) != key {
                return None;
            }
            let mut dst = BNode::new();
            leaf_delete(&mut dst, node, i);
            Some(dst)
        }
        NodeTag::Internal => {
            let child_id = node.get_ptr(i);
            let child = BNode::from_page(store.get(child_id));
            let updated = tree_delete(store, &child, key)?;
            store.del(child_id);

            let mut dst = BNode::new();
            match should_merge(store, node, i, &updated) {
                MergeDirection::Left(sibling_id, sibling) => {
                    let mut merged = BNode::new();
                    merge(&mut merged, &sibling, &updated);
                    store.del(sibling_id);
                    let merged_key = merged.get_key(0).to_vec();
                    let merged_id = store.new(merged.into_page());
                    replace_2_kids(&mut dst, node, i - 1, merged_id, &merged_key);
                }
                MergeDirection::Right(sibling_id, sibling) => {
                    let mut merged = BNode::new();
                    merge(&mut merged, &updated, &sibling);
                    store.del(sibling_id);
                    let merged_key = merged.get_key(0).to_vec();
                    let merged_id = store.new(merged.into_page());
                    replace_2_kids(&mut dst, node, i, merged_id, &merged_key);
                }
                MergeDirection::None => {
                    assert!(
                        updated.nkeys() > 0,
                        "tree_delete: updated child has no keys left"
                    );
                    let first_key = updated.get_key(0).to_vec();
                    let updated_id = store.new(updated.into_page());
                    replace_kid_1(&mut dst, node, i, updated_id, &first_key);
                }
            }
            Some(dst)
        }
    }
}

enum MergeDirection {
    Left(u64, BNode),
    Right(u64, BNode),
    None,
}

/// Decide whether the just-rebuilt child at index `i` of `node` should be
/// merged with a sibling, per the merge policy: only consider merging when
/// `updated` is under a quarter page, prefer the left sibling, then the
/// right sibling, else don't merge.
fn should_merge<S: PageStore>(store: &S, node: &BNode, i: u16, updated: &BNode) -> MergeDirection {
    if updated.nbytes() >= PAGE_SIZE / 4 {
        return MergeDirection::None;
    }

    if i > 0 {
        let sibling_id = node.get_ptr(i - 1);
        let sibling = BNode::from_page(store.get(sibling_id));
        if sibling.nbytes() + updated.nbytes() - super::node::HEADER <= PAGE_SIZE {
            return MergeDirection::Left(sibling_id, sibling);
        }
    }

    if i + 1 < node.nkeys() {
        let sibling_id = node.get_ptr(i + 1);
        let sibling = BNode::from_page(store.get(sibling_id));
        if sibling.nbytes() + updated.nbytes() - super::node::HEADER <= PAGE_SIZE {
            return MergeDirection::Right(sibling_id, sibling);
        }
    }

    MergeDirection::None
}

/// Build the initial leaf used by an empty tree's first insert: the
/// sentinel empty key at slot 0, then the real `(key, val)` at slot 1.
#[must_use]
pub fn new_root_leaf(key: &[u8], val: &[u8]) -> BNode {
    let mut root = BNode::new();
    root.set_header(NodeTag::Leaf, 2);
    append_kv(&mut root, 0, 0, &[], &[]);
    append_kv(&mut root, 1, 0, key, val);
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::page_store::MemPageStore;

    fn single_leaf(key: &[u8], val: &[u8]) -> BNode {
        let mut node = BNode::new();
        node.set_header(NodeTag::Leaf, 1);
        append_kv(&mut node, 0, 0, key, val);
        node
    }

    #[test]
    fn lookup_le_returns_zero_for_single_entry() {
        let node = single_leaf(b"m", b"v");
        assert_eq!(lookup_le(&node, b"a"), 0);
        assert_eq!(lookup_le(&node, b"m"), 0);
        assert_eq!(lookup_le(&node, b"z"), 0);
    }

    #[test]
    fn lookup_le_scans_multiple_entries() {
        let mut node = BNode::new();
        node.set_header(NodeTag::Leaf, 3);
        append_kv(&mut node, 0, 0, b"a", b"1");
        append_kv(&mut node, 1, 0, b"m", b"2");
        append_kv(&mut node, 2, 0, b"z", b"3");

        assert_eq!(lookup_le(&node, b"a"), 0);
        assert_eq!(lookup_le(&node, b"b"), 0);
        assert_eq!(lookup_le(&node, b"m"), 1);
        assert_eq!(lookup_le(&node, b"y"), 1);
        assert_eq!(lookup_le(&node, b"z"), 2);
    }

    #[test]
    fn tree_insert_on_leaf_updates_existing_key() {
        let mut store = MemPageStore::new();
        let leaf = new_root_leaf(b"a", b"1");
        let updated = tree_insert(&mut store, &leaf, b"a", b"99");
        assert_eq!(updated.nkeys(), 2);
        assert_eq!(updated.get_val(1), b"99");
    }

    #[test]
    fn tree_insert_on_leaf_inserts_new_key() {
        let mut store = MemPageStore::new();
        let leaf = new_root_leaf(b"a", b"1");
        let updated = tree_insert(&mut store, &leaf, b"b", b"2");
        assert_eq!(updated.nkeys(), 3);
        assert_eq!(updated.get_key(2), b"b");
    }

    #[test]
    fn tree_delete_not_found_returns_none() {
        let mut store = MemPageStore::new();
        let leaf = new_root_leaf(b"a", b"1");
        assert!(tree_delete(&mut store, &leaf, b"nonexistent").is_none());
    }
}
