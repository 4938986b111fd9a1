//! Property tests for the reference model and recalculation

use cellgrid::prelude::*;
use proptest::prelude::*;

fn cell_ref() -> impl Strategy<Value = String> {
    (0usize..3, 1u32..=5).prop_map(|(c, r)| format!("{}{}", ["A", "B", "C"][c], r))
}

fn operator() -> impl Strategy<Value = char> {
    prop_oneof![Just('+'), Just('-'), Just('*'), Just('/')]
}

fn input() -> impl Strategy<Value = String> {
    prop_oneof![
        (-100i32..100).prop_map(|n| n.to_string()),
        "[a-z]{1,4}",
        Just(String::new()),
        (cell_ref(), operator(), cell_ref()).prop_map(|(a, op, b)| format!("={}{}{}", a, op, b)),
        (cell_ref(), cell_ref()).prop_map(|(a, b)| format!("=SUM({}:{})", a, b)),
        (cell_ref(), cell_ref()).prop_map(|(a, b)| format!("=AVERAGE({}, {})", a, b)),
        cell_ref().prop_map(|a| format!("=UPPER({})", a)),
    ]
}

fn edits() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((cell_ref(), input()), 1..24)
}

fn apply(edits: &[(String, String)]) -> Spreadsheet {
    let mut sheet = Spreadsheet::with_options(SheetOptions::with_bounds(50, 26));
    for (addr, raw) in edits {
        sheet.set(addr, raw).unwrap();
    }
    sheet
}

proptest! {
    #[test]
    fn range_corners_commute(c1 in 1u32..=30, r1 in 1u32..=30, c2 in 1u32..=30, r2 in 1u32..=30) {
        let a = CellId::new(c1, r1);
        let b = CellId::new(c2, r2);
        let forward = CellRange::new(a, b);
        let backward = CellRange::new(b, a);

        prop_assert_eq!(forward, backward);
        prop_assert_eq!(
            CellRange::parse(&format!("{}:{}", a, b)).unwrap(),
            CellRange::parse(&format!("{}:{}", b, a)).unwrap()
        );
        prop_assert_eq!(
            forward.cells().count() as u64,
            u64::from(c1.abs_diff(c2) + 1) * u64::from(r1.abs_diff(r2) + 1)
        );
    }

    #[test]
    fn column_letters_decode(col in 1u32..=18_278) {
        let letters = CellId::column_to_letters(col);
        prop_assert!(letters.bytes().all(|b| b.is_ascii_uppercase()));
        prop_assert_eq!(CellId::letters_to_column(&letters).unwrap(), col);
        prop_assert_eq!(CellId::parse(&format!("{}7", letters)).unwrap(), CellId::new(col, 7));
    }

    #[test]
    fn aggregates_agree(values in prop::collection::vec(prop::option::of(-1000i32..1000), 1..20)) {
        let mut sheet = Spreadsheet::new();
        for (i, value) in values.iter().enumerate() {
            let raw = value.map(|n| n.to_string()).unwrap_or_else(|| "label".to_string());
            sheet.set_cell_input(CellId::new(1, i as u32 + 1), &raw).unwrap();
        }
        let last = values.len();
        sheet.set("B1", &format!("=SUM(A1:A{})", last)).unwrap();
        sheet.set("B2", &format!("=COUNT(A1:A{})", last)).unwrap();
        sheet.set("B3", &format!("=AVERAGE(A1:A{})", last)).unwrap();

        let numbers: Vec<f64> = values.iter().flatten().map(|n| f64::from(*n)).collect();
        let sum: f64 = numbers.iter().sum();
        prop_assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(sum));
        prop_assert_eq!(sheet.value("B2").unwrap(), CellValue::Number(numbers.len() as f64));

        let expected_average = if numbers.is_empty() { 0.0 } else { sum / numbers.len() as f64 };
        prop_assert_eq!(sheet.value("B3").unwrap(), CellValue::Number(expected_average));
    }

    #[test]
    fn incremental_matches_full_recalculation(edits in edits()) {
        let sheet = apply(&edits);
        let mut full = sheet.clone();
        full.recalculate_all();

        for id in sheet.cell_ids() {
            prop_assert_eq!(sheet.get_cell_value(id), full.get_cell_value(id), "value of {}", id);
        }
    }

    #[test]
    fn serialize_round_trip_preserves_values(edits in edits()) {
        let sheet = apply(&edits);
        let restored = Spreadsheet::deserialize(sheet.serialize(), sheet.options().clone());

        for id in sheet.cell_ids() {
            prop_assert_eq!(sheet.get_cell_value(id), restored.get_cell_value(id), "value of {}", id);
        }
    }
}
