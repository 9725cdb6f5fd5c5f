use serde::{Deserialize, Serialize};

/// Stable identity of a managed resource.
pub type Id = u64;

/// The short form of a record used by pickers and breadcrumbs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub id: Id,
    /// Human-facing code (`EP-3`, `US-12`); empty when the entity has none.
    #[serde(default)]
    pub code: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// A request for one page of a scoped collection. Both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Build a request, raising zero values to 1.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.size as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

/// One page of results, exactly as the backing store served it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

impl<T> PageResult<T> {
    /// An empty collection: one empty page.
    pub fn empty(size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            size: size.max(1),
            pages: 1,
        }
    }

    /// Cut the requested page out of a fully materialized, ordered collection.
    ///
    /// A page past the end is clamped to the last page, so the served `page`
    /// may differ from the requested one.
    pub fn from_slice(all: &[T], req: PageRequest) -> Self
    where
        T: Clone,
    {
        let req = PageRequest::new(req.page, req.size);
        let total = all.len() as u64;
        let pages = page_count(total, req.size);
        let page = clamp_page(req.page, pages);
        let served = PageRequest { page, size: req.size };
        let items = all
            .iter()
            .skip(served.offset())
            .take(req.size as usize)
            .cloned()
            .collect();
        Self {
            items,
            total,
            page,
            size: req.size,
            pages,
        }
    }
}

/// Number of pages for `total` items at `size` per page.
///
/// An empty collection still has one (empty) page so that "current page" is
/// always well-defined.
pub fn page_count(total: u64, size: u32) -> u32 {
    if total == 0 {
        return 1;
    }
    let size = u64::from(size.max(1));
    u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX)
}

/// Clamp a page number into `[1, pages]`.
pub fn clamp_page(page: u32, pages: u32) -> u32 {
    page.clamp(1, pages.max(1))
}
