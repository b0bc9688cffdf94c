//! End-to-end flow through the pure core: scan → debounce → append → export.

use shelf_core::export::{to_csv, to_xlsx};
use shelf_core::{Debouncer, EntryDraft, EntryEdit, Ledger, Preferences};

#[test]
fn test_append_then_export_rows_round_trip() {
    let mut ledger = Ledger::new();
    let prefs = Preferences::default();

    ledger
        .append(
            EntryDraft::new("4006381333931", 4)
                .description("Ballpoint pens")
                .location("Aisle 2"),
            &prefs,
            1_704_164_645_678,
        )
        .unwrap();

    let rows = ledger.export_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].timestamp, 1_704_164_645_678);
    assert_eq!(rows[0].barcode, "4006381333931");
    assert_eq!(rows[0].quantity, 4);
    assert_eq!(rows[0].description, "Ballpoint pens");
    assert_eq!(rows[0].location, "Aisle 2");

    // Exporting does not touch the ledger.
    assert_eq!(ledger.len(), 1);

    ledger.remove(0).unwrap();
    assert!(ledger.is_empty());
    assert!(ledger.export_rows().is_empty());
}

#[test]
fn test_debounced_scans_feed_the_ledger() {
    let mut debouncer = Debouncer::default();
    let mut ledger = Ledger::new();
    let prefs = Preferences {
        default_location: "Front".to_string(),
        strict: true,
        ..Preferences::default()
    };

    // Camera reports the same code on consecutive frames, then a second code.
    let reads = [
        ("96385074", 0),
        ("96385074", 16),
        ("96385074", 33),
        ("012345678905", 50),
        ("96385074", 1400),
        ("96385074", 3000),
    ];

    for (code, at) in reads {
        if debouncer.accept(code, at) {
            ledger
                .append(EntryDraft::new(code, 1), &prefs, 1_700_000_000_000 + at)
                .unwrap();
        }
    }

    let codes: Vec<&str> = ledger.entries().iter().map(|e| e.barcode.as_str()).collect();
    assert_eq!(codes, ["96385074", "012345678905", "96385074", "96385074"]);
    assert!(ledger
        .entries()
        .iter()
        .all(|e| e.location.as_deref() == Some("Front")));
}

#[test]
fn test_edit_then_both_exports_agree_on_rows() {
    let mut ledger = Ledger::new();
    let prefs = Preferences::default();
    ledger
        .append(EntryDraft::new("QR:bin-7", 1), &prefs, 1_704_164_645_678)
        .unwrap();
    ledger
        .update(
            0,
            EntryEdit {
                quantity: 12,
                description: Some("Mixed screws, \"M4\"".into()),
                location: Some("Back room".into()),
            },
        )
        .unwrap();

    let rows = ledger.export_rows();
    let csv = to_csv(&rows).unwrap();
    let workbook = to_xlsx(&rows).unwrap();

    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("QR:bin-7,12,\"Mixed screws, \"\"M4\"\"\",Back room"));
    // xlsx is a zip archive
    assert!(workbook.starts_with(b"PK"));
}
