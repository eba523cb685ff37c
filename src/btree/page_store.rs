//! The capability the tree core needs from its backing storage, plus an
//! in-memory implementation used by the core's own tests.
//!
//! The core never assumes anything about durability, concurrency, or disk
//! layout beyond this trait: allocate a page and get an id back, fetch a
//! page by id, and free an id. A production backing (mmap'd file, WAL,
//! whatever) lives outside this crate and implements the same trait.

use std::collections::HashMap;

use crate::page::{Page, PageId};

/// Storage capability required by the tree algorithms.
///
/// Implementations need not reuse freed ids; the tree never assumes an id
/// returned by `new` was previously used or will be reused.
pub trait PageStore {
    /// Fetch the page previously stored under `id`.
    ///
    /// # Panics
    /// May panic if `id` was never returned by `new`, or was already
    /// passed to `del`. The tree core never calls `get` with such an id.
    fn get(&self, id: PageId) -> Page;

    /// Allocate storage for `page` and return a fresh id for it.
    fn new(&mut self, page: Page) -> PageId;

    /// Release the page previously stored under `id`. The tree core calls
    /// this exactly once for every id it no longer references, immediately
    /// after allocating the replacement page(s).
    fn del(&mut self, id: PageId);
}

/// A [`PageStore`] backed by an in-process [`HashMap`].
///
/// This is the reference backing used by the tree's own test suite: it
/// exercises the CoW discipline (every `new` id is distinct, every `del`
/// actually removes the entry) without needing a real disk. It is not a
/// durability solution — pages vanish with the process — and ships here
/// only because the core's tests need something to point a [`BTree`
/// ](crate::btree::tree::BTree) at.
#[derive(Debug, Default)]
pub struct MemPageStore {
    pages: HashMap<PageId, Page>,
    next_id: PageId,
}

impl MemPageStore {
    /// Create an empty store. Allocated ids start at 1; `0` is reserved by
    /// the tree controller to mean "no root".
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            next_id: 1,
        }
    }

    /// Number of pages currently live in the store. Used by tests to check
    /// that deleted pages are actually reclaimed, not merely orphaned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the store currently holds no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageStore for MemPageStore {
    fn get(&self, id: PageId) -> Page {
        self.pages
            .get(&id)
            .unwrap_or_else(|| panic!("MemPageStore::get: no page for id {id}"))
            .clone()
    }

    fn new(&mut self, page: Page) -> PageId {
        let id = self.next_id;
        self.next_id += 1;
        self.pages.insert(id, page);
        id
    }

    fn del(&mut self, id: PageId) {
        self.pages
            .remove(&id)
            .unwrap_or_else(|| panic!("MemPageStore::del: no page for id {id}"));
    }
}
