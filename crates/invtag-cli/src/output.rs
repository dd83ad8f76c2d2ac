//! Plain-text rendering of a sync report.

use std::fmt::Write;

use invtag_sync::SyncReport;

/// Render the report the way the terminal shows it.
///
/// ```text
/// Loaded 3 inventory items
///
/// inv-1
///   old: []
///   new: ["jewelry", "gold"]
///
/// [APPLY] Updated: 1 | Skipped: 2
/// ```
pub fn render_text(report: &SyncReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Loaded {} inventory items", report.loaded);

    for change in &report.changes {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", change.item_id);
        let _ = writeln!(out, "  old: {:?}", change.old);
        let _ = writeln!(out, "  new: {:?}", change.new);
        if let Some(failure) = report.failure_for(&change.item_id) {
            let _ = writeln!(out, "  update failed: {}", failure.error);
        }
    }

    if report.cancelled {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Cancelled: {} items not processed",
            report.not_started
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.summary_line());
    out
}
