//! Fixed-size paging over transaction-id sequences.
//!
//! Sequences of ten items or fewer are served whole regardless of the
//! requested page, so small histories never 404 behind an off-by-one
//! client. Beyond that, the two listing flavors differ only in how they
//! treat a page past the end: address history degrades to an empty page,
//! block listings report the miss.

use thiserror::Error;

/// Items per page on every listing route.
pub const PAGE_SIZE: usize = 10;

/// Requested page starts past the end of a block's transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page {0} doesn't exist")]
pub struct PageOutOfBounds(pub usize);

/// Page of an address history; out-of-range pages are empty.
pub fn page_or_empty<T>(items: &[T], page: usize) -> &[T] {
    if items.len() <= PAGE_SIZE {
        return items;
    }
    let start = page.saturating_mul(PAGE_SIZE);
    if start >= items.len() {
        return &[];
    }
    &items[start..(start + PAGE_SIZE).min(items.len())]
}

/// Page of a block's transaction list; pages strictly past the end are
/// an error. A page starting exactly at the end is still an empty page,
/// not a miss.
pub fn page_or_error<T>(items: &[T], page: usize) -> Result<&[T], PageOutOfBounds> {
    if items.len() <= PAGE_SIZE {
        return Ok(items);
    }
    let start = page.saturating_mul(PAGE_SIZE);
    if start > items.len() {
        return Err(PageOutOfBounds(page));
    }
    Ok(&items[start..(start + PAGE_SIZE).min(items.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_short_sequences_ignore_the_page() {
        let seq = items(3);
        assert_eq!(page_or_empty(&seq, 0), &[0, 1, 2]);
        assert_eq!(page_or_empty(&seq, 5), &[0, 1, 2]);
        assert_eq!(page_or_error(&seq, 5).unwrap(), &[0, 1, 2]);

        let seq = items(PAGE_SIZE);
        assert_eq!(page_or_empty(&seq, 3).len(), 10);
        assert_eq!(page_or_error(&seq, 3).unwrap().len(), 10);
    }

    #[test]
    fn test_full_and_partial_pages() {
        let seq = items(15);
        assert_eq!(page_or_empty(&seq, 0), &seq[0..10]);
        assert_eq!(page_or_empty(&seq, 1), &[10, 11, 12, 13, 14]);
        assert_eq!(page_or_error(&seq, 0).unwrap(), &seq[0..10]);
        assert_eq!(page_or_error(&seq, 1).unwrap(), &[10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_address_pages_past_the_end_are_empty() {
        let seq = items(15);
        assert!(page_or_empty(&seq, 2).is_empty());
        assert!(page_or_empty(&seq, 100).is_empty());
        assert!(page_or_empty(&seq, usize::MAX).is_empty());
    }

    #[test]
    fn test_block_pages_past_the_end_error() {
        let seq = items(15);
        let err = page_or_error(&seq, 2).unwrap_err();
        assert_eq!(err, PageOutOfBounds(2));
        assert_eq!(err.to_string(), "page 2 doesn't exist");
        assert!(page_or_error(&seq, usize::MAX).is_err());
    }

    #[test]
    fn test_block_page_starting_exactly_at_the_end_is_empty() {
        let seq = items(20);
        assert_eq!(page_or_error(&seq, 1).unwrap(), &seq[10..20]);
        assert!(page_or_error(&seq, 2).unwrap().is_empty());
        assert!(page_or_error(&seq, 3).is_err());
    }

    #[test]
    fn test_empty_sequence() {
        let seq: Vec<usize> = Vec::new();
        assert!(page_or_empty(&seq, 0).is_empty());
        assert!(page_or_error(&seq, 7).unwrap().is_empty());
    }
}
