//! B+ tree implementation: packed page codec plus the insert/delete/get
//! algorithms that operate on it.
//!
//! # Structure
//!
//! The B+ tree consists of:
//! - Internal nodes: store keys and child page pointers.
//! - Leaf nodes: store key-value pairs.
//!
//! Both node kinds share one physical layout ([`node::BNode`]); only the
//! header tag and the interpretation of the pointer array differ.
//!
//! # Key/value format
//!
//! Keys and values are arbitrary byte strings, bounded by [`node::MAX_KEY`]
//! and [`node::MAX_VAL`] respectively. There is no fixed key type: ordering
//! is unsigned lexicographic byte comparison.
//!
//! # Usage
//!
//! ```
//! use cow_btree::{BTree, MemPageStore};
//!
//! let mut tree = BTree::new(MemPageStore::new());
//! tree.insert(b"a", b"1");
//! tree.insert(b"b", b"2");
//! assert_eq!(tree.get(b"a"), Some(b"1".to_vec()));
//! assert!(tree.delete(b"a"));
//! assert_eq!(tree.get(b"a"), None);
//! ```

pub mod algorithms;
pub mod builders;
pub mod node;
pub mod page_store;
pub mod tree;

pub use node::{BNode, NodeTag, HEADER, MAX_KEY, MAX_VAL, PAGE_SIZE};
pub use page_store::{MemPageStore, PageStore};
pub use tree::BTree;
