use super::*;
use crate::error::ErrorKind;

// ──────────────────────────────────────────────────
// Bitmask
// ──────────────────────────────────────────────────

#[test]
fn test_bitmask_all_valid_partial_byte() {
    let m = Bitmask::new(11, MaskState::AllValid);
    assert_eq!(m.len(), 11);
    assert_eq!(m.null_count(), 0);
    assert!((0..11).all(|i| m.is_valid(i)));
}

#[test]
fn test_bitmask_try_new_matches_new() {
    for len in [0, 1, 8, 13] {
        for state in [MaskState::AllValid, MaskState::AllNull] {
            let m = Bitmask::try_new(len, state).unwrap();
            assert_eq!(m, Bitmask::new(len, state));
            assert_eq!(m.is_empty(), len == 0);
        }
    }
}

#[test]
fn test_bitmask_try_new_reports_exhaustion() {
    let err = Bitmask::try_new(usize::MAX, MaskState::AllValid).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Allocation);
}

#[test]
fn test_bitmask_all_null() {
    let m = Bitmask::new(9, MaskState::AllNull);
    assert_eq!(m.null_count(), 9);
    assert!(!m.is_valid(8));
}

#[test]
fn test_bitmask_set_and_clear() {
    let mut m = Bitmask::new(16, MaskState::AllNull);
    m.set(3, true);
    m.set(15, true);
    assert!(m.is_valid(3));
    assert!(m.is_valid(15));
    m.set(3, false);
    assert!(!m.is_valid(3));
    assert_eq!(m.null_count(), 15);
}

#[test]
fn test_bitmask_from_bools() {
    let m = Bitmask::from_bools(&[true, false, true]);
    assert_eq!(m, {
        let mut e = Bitmask::new(3, MaskState::AllValid);
        e.set(1, false);
        e
    });
}

// ──────────────────────────────────────────────────
// StringColumn construction
// ──────────────────────────────────────────────────

#[test]
fn test_column_from_strs() {
    let c = StringColumn::from_strs(&["ab", "", "cde"]);
    assert_eq!(c.len(), 3);
    assert_eq!(c.offsets(), &[0, 2, 2, 5]);
    assert_eq!(c.get(1), Some(&b""[..]));
    assert_eq!(c.get(2), Some(&b"cde"[..]));
    assert_eq!(c.null_count(), 0);
    assert!(c.validity().is_none());
}

#[test]
fn test_column_from_options_nulls() {
    let c = StringColumn::from_options(&[Some("a"), None, Some("b")]);
    assert_eq!(c.null_count(), 1);
    assert_eq!(c.get(1), None);
    assert_eq!(
        c.iter().collect::<Vec<_>>(),
        vec![Some(&b"a"[..]), None, Some(&b"b"[..])]
    );
}

#[test]
fn test_column_from_options_without_nulls_drops_mask() {
    let c = StringColumn::from_options(&[Some("a"), Some("b")]);
    assert!(c.validity().is_none());
}

#[test]
fn test_column_all_null() {
    let c = StringColumn::all_null(4).unwrap();
    assert_eq!(c.len(), 4);
    assert_eq!(c.null_count(), 4);
    assert!(c.iter().all(|r| r.is_none()));
}

#[test]
fn test_column_all_null_reports_exhaustion() {
    let err = StringColumn::all_null(usize::MAX / 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Allocation);
}

#[test]
fn test_column_new_rejects_nonzero_first_offset() {
    let err = StringColumn::new(b"ab".to_vec(), vec![1, 2], None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);
}

#[test]
fn test_column_new_rejects_decreasing_offsets() {
    let err = StringColumn::new(b"abc".to_vec(), vec![0, 2, 1, 3], None).unwrap_err();
    assert!(err.to_string().contains("decrease"));
}

#[test]
fn test_column_new_rejects_length_mismatch() {
    let err = StringColumn::new(b"abc".to_vec(), vec![0, 2], None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);
}

#[test]
fn test_column_new_rejects_empty_offsets() {
    assert!(StringColumn::new(Vec::new(), Vec::new(), None).is_err());
}

#[test]
fn test_column_new_rejects_mask_length() {
    let mask = Bitmask::new(3, MaskState::AllValid);
    let err = StringColumn::new(b"ab".to_vec(), vec![0, 1, 2], Some(mask)).unwrap_err();
    assert!(err.to_string().contains("validity mask"));
}

#[test]
fn test_column_null_row_with_bytes() {
    // A null row may still own bytes in the buffer; get() hides them.
    let mask = Bitmask::from_bools(&[true, false]);
    let c = StringColumn::new(b"abcd".to_vec(), vec![0, 2, 4], Some(mask)).unwrap();
    assert_eq!(c.get(0), Some(&b"ab"[..]));
    assert_eq!(c.get(1), None);
    assert_eq!(c.view().row_bytes(1), b"cd");
}

// ──────────────────────────────────────────────────
// Token-based builder
// ──────────────────────────────────────────────────

#[test]
fn test_from_tokens_mixed() {
    let src = StringColumn::from_strs(&["hello", "world"]);
    let view = src.view();
    let tokens = vec![
        Some(Token::within(1, 3, &view.row_span(0))),
        None,
        Some(Token::within(5, 5, &view.row_span(1))),
        Some(Token::within(6, 10, &view.row_span(1))),
    ];
    let out = StringColumn::from_tokens(&view, &tokens).unwrap();
    assert_eq!(
        out.iter().collect::<Vec<_>>(),
        vec![Some(&b"el"[..]), None, Some(&b""[..]), Some(&b"orld"[..])]
    );
    assert_eq!(out.chars(), b"elorld");
}

#[test]
fn test_from_tokens_all_live_has_no_mask() {
    let src = StringColumn::from_strs(&["ab"]);
    let view = src.view();
    let out = StringColumn::from_tokens(&view, &[Some(Token::within(0, 2, &view.row_span(0)))])
        .unwrap();
    assert!(out.validity().is_none());
    assert_eq!(out.get(0), Some(&b"ab"[..]));
}

#[test]
#[should_panic(expected = "escapes row")]
#[cfg(debug_assertions)]
fn test_token_within_checks_row_span() {
    let _ = Token::within(2, 6, &(0..5));
}

// ──────────────────────────────────────────────────
// Scalar and table
// ──────────────────────────────────────────────────

#[test]
fn test_scalar_validity() {
    assert!(StringScalar::from("_").is_valid());
    assert!(!StringScalar::null().is_valid());
    assert_eq!(StringScalar::new("ab").value(), b"ab");
}

#[test]
fn test_table_rejects_ragged_columns() {
    let err = Table::new(vec![
        StringColumn::from_strs(&["a"]),
        StringColumn::from_strs(&["a", "b"]),
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);
}

#[test]
fn test_table_row_access() {
    let t = Table::new(vec![
        StringColumn::from_strs(&["a", "b"]),
        StringColumn::from_options(&[None, Some("c")]),
    ])
    .unwrap();
    assert_eq!(t.num_columns(), 2);
    assert_eq!(t.num_rows(), 2);
    assert_eq!(t.row(0), vec![Some(&b"a"[..]), None]);
    assert_eq!(t.row(1), vec![Some(&b"b"[..]), Some(&b"c"[..])]);
}

#[test]
fn test_table_columns_and_into_columns() {
    let t = Table::new(vec![
        StringColumn::from_strs(&["x", "y"]),
        StringColumn::from_options(&[Some("z"), None]),
    ])
    .unwrap();
    assert_eq!(t.columns().len(), 2);
    assert_eq!(t.columns()[1].null_count(), 1);
    let cols = t.into_columns();
    assert_eq!(cols.len(), 2);
    assert_eq!(cols[0].get(1), Some(&b"y"[..]));
    assert_eq!(cols[1].get(1), None);
}
