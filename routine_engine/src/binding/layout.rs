use crate::error::{Result, RoutineError};

/// Orders items by explicit zero-based ordinal.
///
/// Items with an ordinal are placed at that index first; the rest fill the
/// free slots in declaration order. An ordinal must be below the item count,
/// and two items claiming the same ordinal is an error.
pub fn layout<T>(
    items: Vec<T>,
    ordinal: impl Fn(&T) -> Option<usize>,
    label: impl Fn(&T) -> String,
) -> Result<Vec<T>> {
    let count = items.len();
    let mut slots: Vec<Option<T>> = Vec::with_capacity(count);
    slots.resize_with(count, || None);
    let mut unordered = Vec::new();

    for item in items {
        let Some(idx) = ordinal(&item) else {
            unordered.push(item);
            continue;
        };
        if idx >= count {
            return Err(RoutineError::Configuration(format!(
                "'{}' declares ordinal {} but only {} columns exist",
                label(&item),
                idx,
                count
            )));
        }
        if let Some(existing) = &slots[idx] {
            return Err(RoutineError::Configuration(format!(
                "'{}' and '{}' both claim ordinal {}",
                label(existing),
                label(&item),
                idx
            )));
        }
        slots[idx] = Some(item);
    }

    let mut unordered = unordered.into_iter();
    for slot in slots.iter_mut().filter(|s| s.is_none()) {
        *slot = unordered.next();
    }

    Ok(slots.into_iter().flatten().collect())
}
