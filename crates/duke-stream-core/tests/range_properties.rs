use duke_stream_core::{column_to_letters, letters_to_column, CellRange, MAX_COLS, MAX_ROWS};
use proptest::prelude::*;

fn arb_range() -> impl Strategy<Value = CellRange> {
    (
        1..=MAX_COLS,
        1..=MAX_ROWS,
        1..=MAX_COLS,
        1..=MAX_ROWS,
        any::<bool>(),
        any::<bool>(),
        proptest::option::of("[A-Za-z_][A-Za-z0-9 _.']{0,12}"),
    )
        .prop_map(|(c1, r1, c2, r2, col_abs, row_abs, sheet)| {
            let range = CellRange::new(c1, r1, c2, r2)
                .unwrap()
                .with_absolute(col_abs, row_abs);
            match sheet {
                Some(name) => range.with_sheet(name),
                None => range,
            }
        })
}

proptest! {
    #[test]
    fn column_letters_round_trip(column in 1..=MAX_COLS) {
        let letters = column_to_letters(column);
        prop_assert_eq!(letters_to_column(&letters).unwrap(), column);
        prop_assert_eq!(letters_to_column(&letters.to_ascii_lowercase()).unwrap(), column);
    }

    #[test]
    fn rendered_range_parses_back_to_itself(range in arb_range()) {
        let text = range.to_string();
        let parsed = CellRange::parse(&text).unwrap();
        prop_assert_eq!(&parsed, &range);
        prop_assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn any_sheet_name_survives_rendering(
        name in "[ -~]{1,16}",
        column in 1..=MAX_COLS,
        row in 1..=MAX_ROWS,
    ) {
        let range = CellRange::cell(column, row).unwrap().with_sheet(name.as_str());
        let parsed = CellRange::parse(&range.to_string()).unwrap();
        prop_assert_eq!(parsed.sheet(), Some(name.as_str()));
        prop_assert_eq!(parsed.to_string(), range.to_string());
    }

    #[test]
    fn lowercase_input_renders_canonically(range in arb_range()) {
        let canonical = range.without_sheet().to_string();
        let parsed = CellRange::parse(&canonical.to_ascii_lowercase()).unwrap();
        prop_assert_eq!(parsed.to_string(), canonical);
    }

    #[test]
    fn corner_order_does_not_matter(
        c1 in 1..=MAX_COLS, r1 in 1..=MAX_ROWS,
        c2 in 1..=MAX_COLS, r2 in 1..=MAX_ROWS,
    ) {
        let forward = CellRange::new(c1, r1, c2, r2).unwrap();
        let backward = CellRange::new(c2, r2, c1, r1).unwrap();
        prop_assert_eq!(&forward, &backward);
        prop_assert!(forward.start_column() <= forward.end_column());
        prop_assert!(forward.start_row() <= forward.end_row());
        prop_assert_eq!(forward.height(), r1.abs_diff(r2) + 1);
        prop_assert_eq!(forward.width(), c1.abs_diff(c2) + 1);
    }

    #[test]
    fn ordering_agrees_with_equality(a in arb_range(), b in arb_range()) {
        prop_assert_eq!(a.cmp(&b) == std::cmp::Ordering::Equal, a == b);
    }
}

#[test]
fn ordering_is_row_major() {
    let a = CellRange::parse("A2:B5").unwrap();
    let b = CellRange::parse("A2:J7").unwrap();
    let c = CellRange::parse("A3:B5").unwrap();
    assert!(a < b);
    assert!(b < c);

    let mut ranges = vec![c.clone(), a.clone(), b.clone()];
    ranges.sort();
    assert_eq!(ranges, vec![a, b, c]);
}
