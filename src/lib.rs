// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(test, allow(clippy::disallowed_methods))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
//! A copy-on-write B+ tree core.
//!
//! This crate implements the indexing primitive of a key-value storage
//! engine: a packed 4 KiB page format and the B+ tree algorithms (insert,
//! delete, get, split, merge) that operate on it. It does not perform any
//! I/O itself — every page access goes through a [`page_store::PageStore`]
//! supplied by the embedder.
//!
//! # Structure
//!
//! - [`page`] — the raw fixed-size page buffer and its byte accessors.
//! - [`btree::node`] — the packed node layout (header, pointers, offsets, KV region).
//! - [`btree::builders`] — pure functions that construct new pages from old ones.
//! - [`btree::algorithms`] — recursive insert/delete over pages fetched from a page-store.
//! - [`btree::page_store`] — the `{get, new, del}` capability the core consumes.
//! - [`btree::tree`] — the public `BTree` controller: root pointer, height changes, sentinel.
//!
//! # Non-goals
//!
//! No range iteration, no secondary indexes, no prefix compression, no
//! variable-size pages, no in-place mutation of existing pages. The backing
//! store (file, mmap, WAL, free-list, transactions) is the embedder's
//! responsibility; this crate only ships a `HashMap`-backed [`btree::page_store::MemPageStore`]
//! as a reference implementation for its own tests.

pub mod btree;
pub mod page;

pub use btree::node::{BNode, NodeTag, HEADER, MAX_KEY, MAX_VAL, PAGE_SIZE};
pub use btree::page_store::{MemPageStore, PageStore};
pub use btree::tree::BTree;
pub use page::PageId;
