//! Index arithmetic over a row-major grid of `columns` laid over a flat list.
//!
//! All functions are pure. Callers guarantee `count >= 1` and `columns >= 1`;
//! `Menu` guards the empty cases before calling in.

/// Number of rows needed to hold `count` entries
pub fn row_count(count: usize, columns: usize) -> usize {
    count.div_ceil(columns)
}

/// Move left, wrapping from the first column to the end of the same row
pub fn index_left(index: usize, count: usize, columns: usize) -> usize {
    if index % columns == 0 {
        (index + columns - 1).min(count - 1)
    } else {
        index - 1
    }
}

/// Move right, wrapping from the last column (or last entry) to the row start
pub fn index_right(index: usize, count: usize, columns: usize) -> usize {
    if index % columns == columns - 1 || index == count - 1 {
        index - index % columns
    } else {
        index + 1
    }
}

/// Move up a row, wrapping to the bottom-most row holding this column
pub fn index_up(index: usize, count: usize, columns: usize) -> usize {
    if index >= columns {
        return index - columns;
    }

    let wrapped = row_count(count, columns) * columns + index - columns;
    if wrapped >= count {
        wrapped - columns
    } else {
        wrapped
    }
}

/// Move down a row. Past the end this lands on the last entry when a
/// partial row still lies below, otherwise it wraps to the top row.
pub fn index_down(index: usize, count: usize, columns: usize) -> usize {
    let next = index + columns;
    if next < count {
        return next;
    }

    let rows = row_count(count, columns);
    let current_row = (index + 1).div_ceil(columns);
    if rows > current_row {
        count - 1
    } else {
        next % columns
    }
}

/// Circular clamp: below zero wraps to the end, past the end wraps to zero
pub fn clamp_index(index: isize, count: usize) -> usize {
    if index < 0 {
        count.saturating_sub(1)
    } else if index as usize >= count {
        0
    } else {
        index as usize
    }
}

/// Pick the first visible row so that `index` stays in view.
///
/// Scrolling keeps one row of lookahead in the direction of travel: moving
/// onto the last visible row scrolls so that it becomes the second-to-last,
/// moving onto the first visible row scrolls so that one row above stays
/// visible. The window never extends past the last row.
pub fn recalc_first_displayed_row(
    index: usize,
    count: usize,
    columns: usize,
    rows: usize,
    current_first_row: usize,
) -> usize {
    let rows = rows.max(1);
    let row = index / columns;
    let max_first = row_count(count, columns).saturating_sub(rows);

    let first = if row + 1 >= current_first_row + rows {
        (row + 2).saturating_sub(rows)
    } else if row <= current_first_row {
        if rows > 1 {
            row.saturating_sub(1)
        } else {
            row
        }
    } else {
        current_first_row
    };

    first.min(max_first).min(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_left_right_wrap_within_row() {
        // 7 entries, 4 columns:  0 1 2 3 / 4 5 6
        assert_eq!(index_left(0, 7, 4), 3);
        assert_eq!(index_left(4, 7, 4), 6);
        assert_eq!(index_left(5, 7, 4), 4);
        assert_eq!(index_right(3, 7, 4), 0);
        assert_eq!(index_right(6, 7, 4), 4);
        assert_eq!(index_right(1, 7, 4), 2);
    }

    #[test]
    fn test_up_wraps_to_bottom_of_column() {
        assert_eq!(index_up(5, 7, 4), 1);
        assert_eq!(index_up(1, 7, 4), 5);
        // Column 3 has no entry in the partial last row
        assert_eq!(index_up(3, 7, 4), 3);
    }

    #[test]
    fn test_down_wraps_or_lands_on_last() {
        assert_eq!(index_down(1, 7, 4), 5);
        // Row 0, column 3: a partial row lies below, land on the last entry
        assert_eq!(index_down(3, 7, 4), 6);
        // Last row wraps to the top of the column
        assert_eq!(index_down(6, 7, 4), 2);
        assert_eq!(index_down(4, 7, 4), 0);
    }

    #[test]
    fn test_single_column() {
        assert_eq!(index_left(2, 3, 1), 2);
        assert_eq!(index_right(2, 3, 1), 2);
        assert_eq!(index_up(0, 3, 1), 2);
        assert_eq!(index_down(2, 3, 1), 0);
    }

    #[test]
    fn test_clamp_index_is_circular() {
        assert_eq!(clamp_index(-1, 5), 4);
        assert_eq!(clamp_index(5, 5), 0);
        assert_eq!(clamp_index(3, 5), 3);
    }

    #[test]
    fn test_first_row_keeps_lookahead() {
        // 20 entries, 4 columns, 3 visible rows: 5 rows in total
        assert_eq!(recalc_first_displayed_row(4, 20, 4, 3, 0), 0);
        // Landing on the last visible row scrolls it to second-to-last
        assert_eq!(recalc_first_displayed_row(8, 20, 4, 3, 0), 1);
        // Clamped so the window never passes the last row
        assert_eq!(recalc_first_displayed_row(19, 20, 4, 3, 1), 2);
        // Going back up keeps one row above visible
        assert_eq!(recalc_first_displayed_row(8, 20, 4, 3, 2), 1);
        assert_eq!(recalc_first_displayed_row(0, 20, 4, 3, 2), 0);
    }

    #[test]
    fn test_partial_page_does_not_scroll() {
        // 7 entries, 4 columns, 2 rows: everything fits on one page
        assert_eq!(recalc_first_displayed_row(6, 7, 4, 2, 0), 0);
    }

    #[test]
    fn test_stale_first_row_is_pulled_back() {
        // After deletions only 2 rows remain but the window started at row 4
        assert_eq!(recalc_first_displayed_row(5, 8, 4, 2, 4), 0);
    }

    proptest! {
        #[test]
        fn right_cycles_through_its_row(count in 1usize..60, columns in 1usize..9, seed in 0usize..1000) {
            let start = seed % count;
            let row_start = start - start % columns;
            let row_len = (count - row_start).min(columns);

            let mut seen = vec![false; count];
            let mut index = start;
            for _ in 0..row_len {
                prop_assert!(!seen[index]);
                seen[index] = true;
                index = index_right(index, count, columns);
            }
            prop_assert_eq!(index, start);
            prop_assert_eq!(seen.iter().filter(|s| **s).count(), row_len);
        }

        #[test]
        fn left_cycles_through_its_row(count in 1usize..60, columns in 1usize..9, seed in 0usize..1000) {
            let start = seed % count;
            let row_start = start - start % columns;
            let row_len = (count - row_start).min(columns);

            let mut index = start;
            let mut visited = Vec::new();
            for _ in 0..row_len {
                visited.push(index);
                index = index_left(index, count, columns);
            }
            prop_assert_eq!(index, start);
            visited.sort_unstable();
            visited.dedup();
            prop_assert_eq!(visited.len(), row_len);
        }

        #[test]
        fn single_row_traversal_takes_count_steps(count in 1usize..9, seed in 0usize..100) {
            // When the whole list fits on one row, count presses visit every entry once
            let columns = count;
            let start = seed % count;
            let mut index = start;
            let mut seen = vec![false; count];
            for _ in 0..count {
                prop_assert!(!seen[index]);
                seen[index] = true;
                index = index_right(index, count, columns);
            }
            prop_assert_eq!(index, start);
        }

        #[test]
        fn navigation_stays_in_range(count in 1usize..60, columns in 1usize..9, seed in 0usize..1000) {
            let index = seed % count;
            prop_assert!(index_left(index, count, columns) < count);
            prop_assert!(index_right(index, count, columns) < count);
            prop_assert!(index_up(index, count, columns) < count);
            prop_assert!(index_down(index, count, columns) < count);
        }

        #[test]
        fn up_and_down_keep_the_column_when_possible(count in 1usize..60, columns in 1usize..9, seed in 0usize..1000) {
            let index = seed % count;
            let up = index_up(index, count, columns);
            prop_assert_eq!(up % columns, index % columns);
        }

        #[test]
        fn window_always_contains_selection(
            count in 1usize..80,
            columns in 1usize..9,
            rows in 1usize..6,
            moves in proptest::collection::vec(0u8..4, 0..64),
        ) {
            let mut index = 0;
            let mut first = 0;
            for m in moves {
                index = match m {
                    0 => index_up(index, count, columns),
                    1 => index_down(index, count, columns),
                    2 => index_left(index, count, columns),
                    _ => index_right(index, count, columns),
                };
                first = recalc_first_displayed_row(index, count, columns, rows, first);

                let row = index / columns;
                prop_assert!(first <= row);
                prop_assert!(row <= first + rows - 1);
                prop_assert!(first <= row_count(count, columns).saturating_sub(rows));
            }
        }
    }
}
