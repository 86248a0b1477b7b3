//! Console summaries of check results and drift reports.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rmdrift_model::{CheckOutcome, DriftReport, RmRole};

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn role_cell(role: RmRole) -> Cell {
    match role {
        RmRole::Base => Cell::new("Base").fg(Color::Green),
        RmRole::Check => Cell::new("Check").fg(Color::Yellow),
        RmRole::Cone => Cell::new("Cone").fg(Color::Magenta),
    }
}

/// Print the reference points and segment layout of a check pass.
pub fn print_check_summary(outcome: &CheckOutcome, keyword: &str) {
    println!(
        "Keyword: {keyword}  |  pivot rows: {}  |  reference points: {}  |  segments: {}",
        outcome.pivot.record_count(),
        outcome.reference.points.len(),
        outcome.segments.len(),
    );

    let mut points = Table::new();
    points.set_header(vec![
        header_cell("Label"),
        header_cell("Seq"),
        header_cell("Role"),
        header_cell("Segment"),
        header_cell("Run Position"),
    ]);
    apply_table_style(&mut points);
    for segment in &outcome.segments {
        for span in &segment.points {
            let point = &outcome.reference.points[span.point];
            points.add_row(vec![
                Cell::new(&point.label),
                Cell::new(point.info.number).set_alignment(CellAlignment::Right),
                role_cell(point.info.role),
                Cell::new(segment.id).set_alignment(CellAlignment::Right),
                Cell::new(point.original_index).set_alignment(CellAlignment::Right),
            ]);
        }
    }
    println!("{points}");

    let mut segments = Table::new();
    segments.set_header(vec![
        header_cell("Segment"),
        header_cell("Anchor Seq"),
        header_cell("Points"),
    ]);
    apply_table_style(&mut segments);
    for segment in &outcome.segments {
        segments.add_row(vec![
            Cell::new(segment.id).set_alignment(CellAlignment::Right),
            Cell::new(segment.ref_number).set_alignment(CellAlignment::Right),
            Cell::new(segment.points.len()).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{segments}");
}

/// Print the applied drift ratios.
pub fn print_drift_summary(report: &DriftReport) {
    if report.is_empty() {
        println!("No drift ratios applied.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Solution Label"),
        header_cell("Element"),
        header_cell("Ratio"),
    ]);
    apply_table_style(&mut table);
    for entry in report.entries() {
        table.add_row(vec![
            Cell::new(&entry.label),
            Cell::new(&entry.element),
            Cell::new(format!("{:.4}", entry.ratio)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
}
