/// In-place ascending partition sort keyed by `key`.
///
/// The partition step lets an element equal to the pivot move left only when
/// it sits at an odd absolute index, which fixes where equal-cost perks end
/// up; perk selection depends on that placement.
pub fn jag_sort_by_key<T, K>(items: &mut [T], key: K)
where
    K: Fn(&T) -> i64,
{
    if items.len() > 1 {
        partition_sort(items, 0, items.len() - 1, &key);
    }
}

fn partition_sort<T, K>(items: &mut [T], low: usize, high: usize, key: &K)
where
    K: Fn(&T) -> i64,
{
    let pivot_index = (low + high) / 2;
    items.swap(pivot_index, high);
    let pivot = key(&items[high]);

    let mut counter = low;
    for index in low..high {
        if key(&items[index]) - pivot < (index & 1) as i64 {
            items.swap(index, counter);
            counter += 1;
        }
    }
    items.swap(high, counter);

    if low + 1 < counter {
        partition_sort(items, low, counter - 1, key);
    }
    if counter + 1 < high {
        partition_sort(items, counter + 1, high, key);
    }
}
