//! Offset → index lookup over the lazily measured prefix sums.
//!
//! Inside the measured run a plain binary search is enough. Past it, an exponential probe
//! brackets the target first so that scrolling far ahead only measures `O(log distance)` probe
//! points before the binary search fills in the bracket.

use crate::VirtualIndexRange;
use crate::metadata::MetadataStore;

/// Returns the item containing `offset`: the largest index whose offset is `<= offset`, clamped
/// to `bounds`.
pub(crate) fn find_nearest_item(
    store: &mut MetadataStore,
    bounds: VirtualIndexRange,
    size_of: &mut impl FnMut(usize) -> u32,
    offset: u64,
) -> usize {
    let min = bounds.min_index;
    let last_measured = store
        .last_measured()
        .filter(|_| store.first_measured() == Some(min))
        .map(|last| last.min(bounds.max_index));

    match last_measured {
        Some(last) if store.get(last, min, size_of).offset >= offset => {
            binary_search(store, bounds, size_of, min, last, offset)
        }
        _ => exponential_search(
            store,
            bounds,
            size_of,
            last_measured.unwrap_or(min).max(min),
            offset,
        ),
    }
}

fn binary_search(
    store: &mut MetadataStore,
    bounds: VirtualIndexRange,
    size_of: &mut impl FnMut(usize) -> u32,
    mut low: usize,
    mut high: usize,
    offset: u64,
) -> usize {
    let min = bounds.min_index;
    while low <= high {
        let mid = low + (high - low) / 2;
        let current = store.get(mid, min, size_of).offset;
        if current == offset {
            return mid;
        }
        if current < offset {
            low = mid + 1;
        } else {
            match mid.checked_sub(1) {
                Some(h) => high = h,
                None => break,
            }
        }
    }
    if low > min { low - 1 } else { min }
}

fn exponential_search(
    store: &mut MetadataStore,
    bounds: VirtualIndexRange,
    size_of: &mut impl FnMut(usize) -> u32,
    start: usize,
    offset: u64,
) -> usize {
    let min = bounds.min_index;
    let max = bounds.max_index;

    let mut low = start;
    let mut index = start;
    let mut interval = 1usize;
    while index <= max && store.get(index, min, size_of).offset < offset {
        low = index;
        index = index.saturating_add(interval);
        interval = interval.saturating_mul(2);
    }

    vtrace!(
        start,
        low,
        high = index.min(max),
        offset,
        "exponential_search bracket"
    );
    binary_search(store, bounds, size_of, low, index.min(max), offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min_index: usize, max_index: usize) -> VirtualIndexRange {
        VirtualIndexRange {
            min_index,
            max_index,
            initial_index: min_index,
        }
    }

    #[test]
    fn exponential_probe_measures_few_items() {
        let b = bounds(1000, 1000 + 99_999);
        let mut store = MetadataStore::new(10);
        let mut size_of = |_: usize| 10u32;

        let found = find_nearest_item(&mut store, b, &mut size_of, 5_005);
        assert_eq!(found, 1000 + 500);
        // Measurement is forced up to the bracketing probe, not to the end of the list.
        assert!(store.measured_len() < 2_000);
    }

    #[test]
    fn binary_search_inside_measured_run() {
        let b = bounds(0, 99);
        let mut store = MetadataStore::new(10);
        let mut size_of = |i: usize| if i % 2 == 0 { 10u32 } else { 30u32 };
        store.get(99, 0, &mut size_of);

        // Layout: item 2k at 40k, item 2k+1 at 40k + 10.
        assert_eq!(find_nearest_item(&mut store, b, &mut size_of, 0), 0);
        assert_eq!(find_nearest_item(&mut store, b, &mut size_of, 9), 0);
        assert_eq!(find_nearest_item(&mut store, b, &mut size_of, 10), 1);
        assert_eq!(find_nearest_item(&mut store, b, &mut size_of, 39), 1);
        assert_eq!(find_nearest_item(&mut store, b, &mut size_of, 40), 2);
    }

    #[test]
    fn offsets_past_the_end_clamp_to_max_index() {
        let b = bounds(5, 14);
        let mut store = MetadataStore::new(10);
        let mut size_of = |_: usize| 10u32;
        assert_eq!(find_nearest_item(&mut store, b, &mut size_of, 1_000_000), 14);
        assert_eq!(find_nearest_item(&mut store, b, &mut size_of, 0), 5);
    }
}
