//! Page slicing for diagnostic lists.

use crate::model::PaginationInfo;
use std::num::NonZeroUsize;

/// Diagnostics per page when the caller does not say otherwise
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Slice `items` to the requested page.
///
/// `page` is 1-based and clamped into `[1, total_pages]`; out-of-range values
/// are never an error. `total_pages` is at least 1, even for an empty list.
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: NonZeroUsize) -> (Vec<T>, PaginationInfo) {
    let page_size = page_size.get();
    let total = items.len();
    let total_pages = total.div_ceil(page_size).max(1);

    let current_page = clamp_page(page, total_pages);

    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(total);

    let slice = items.into_iter().skip(start).take(end.saturating_sub(start)).collect();

    let info = PaginationInfo {
        current_page,
        total_pages,
        page_size,
        total_diagnostics: total,
        has_next_page: current_page < total_pages,
        has_previous_page: current_page > 1,
    };

    (slice, info)
}

fn clamp_page(page: i64, total_pages: usize) -> usize {
    if page < 1 {
        return 1;
    }
    usize::try_from(page).map_or(total_pages, |p| p.min(total_pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_first_page() {
        let (slice, info) = paginate(vec![1, 2, 3], 1, size(2));

        assert_eq!(slice, vec![1, 2]);
        assert_eq!(info.current_page, 1);
        assert_eq!(info.total_pages, 2);
        assert_eq!(info.page_size, 2);
        assert_eq!(info.total_diagnostics, 3);
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);
    }

    #[test]
    fn test_middle_page() {
        let items: Vec<usize> = (0..25).collect();
        let (slice, info) = paginate(items, 2, size(10));

        assert_eq!(slice, (10..20).collect::<Vec<_>>());
        assert!(info.has_next_page);
        assert!(info.has_previous_page);
    }

    #[test]
    fn test_last_partial_page() {
        let items: Vec<usize> = (0..25).collect();
        let (slice, info) = paginate(items, 3, size(10));

        assert_eq!(slice, vec![20, 21, 22, 23, 24]);
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);
    }

    #[test]
    fn test_empty_input() {
        let (slice, info) = paginate(Vec::<u8>::new(), 1, size(10));

        assert!(slice.is_empty());
        assert_eq!(
            info,
            PaginationInfo {
                current_page: 1,
                total_pages: 1,
                page_size: 10,
                total_diagnostics: 0,
                has_next_page: false,
                has_previous_page: false,
            }
        );
    }

    #[test]
    fn test_page_is_clamped() {
        let items: Vec<usize> = (0..5).collect();

        let (slice, info) = paginate(items.clone(), 0, size(2));
        assert_eq!(info.current_page, 1);
        assert_eq!(slice, vec![0, 1]);

        let (_, info) = paginate(items.clone(), -7, size(2));
        assert_eq!(info.current_page, 1);

        let (slice, info) = paginate(items.clone(), 99, size(2));
        assert_eq!(info.current_page, 3);
        assert_eq!(slice, vec![4]);

        let (_, info) = paginate(items, i64::MAX, size(2));
        assert_eq!(info.current_page, 3);
    }

    #[test]
    fn test_empty_input_always_one_page() {
        for n in [1, 2, 7, 50, 1000] {
            let (_, info) = paginate(Vec::<u8>::new(), 3, size(n));
            assert_eq!(info.total_pages, 1);
            assert_eq!(info.current_page, 1);
        }
    }

    #[test]
    fn test_pages_reconstruct_input() {
        for total in [0usize, 1, 9, 10, 11, 37] {
            for page_size in [1usize, 3, 10, 50] {
                let items: Vec<usize> = (0..total).collect();
                let (_, first) = paginate(items.clone(), 1, size(page_size));

                let mut rebuilt = Vec::new();
                for page in 1..=first.total_pages {
                    let (slice, _) = paginate(items.clone(), page as i64, size(page_size));
                    let expected_len =
                        page_size.min(total.saturating_sub((page - 1) * page_size));
                    assert_eq!(slice.len(), expected_len);
                    rebuilt.extend(slice);
                }

                assert_eq!(rebuilt, items, "total={} page_size={}", total, page_size);
            }
        }
    }
}
