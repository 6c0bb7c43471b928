//! Terminal summaries for curation and validation runs.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use clinreg_model::{
    AssignmentOutcome, CurationReport, FileOutcome, FileValidation, MaterializeStatus,
    ReclassificationOutcome, ValidationReport,
};
use clinreg_standards::Catalog;

pub fn print_curation_summary(report: &CurationReport) {
    println!("Source: {}", report.source_dir.display());
    println!("Clinical: {}", report.clinical_dir.display());
    println!("{}", curation_table(report));
    println!("{}", reclassification_line(&report.reclassification));
    println!("{}", curation_totals_line(report));
    let errors = curation_errors(report);
    if !errors.is_empty() {
        eprintln!("Errors:");
        for error in errors {
            eprintln!("- {error}");
        }
    }
}

pub fn print_validation_summary(report: &ValidationReport) {
    println!(
        "Registry: {} ({} subjects, {} controls)",
        report.registry_entity, report.registry_subjects, report.control_subjects
    );
    println!("{}", validation_table(report));
    let mismatches = mismatch_lines(report);
    if !mismatches.is_empty() {
        println!("Mismatches:");
        for line in mismatches {
            println!("- {line}");
        }
    }
    println!("{}", validation_totals_line(report));
}

pub fn print_catalog(catalog: &Catalog) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Legacy name"),
        header_cell("Columns"),
        header_cell("Subject keyed"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for entity in catalog.all_descriptors() {
        let name = if catalog.is_registry(entity) {
            Cell::new(format!("{} (registry)", entity.canonical_name))
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(&entity.canonical_name)
        };
        table.add_row(vec![
            name,
            Cell::new(&entity.legacy_name),
            Cell::new(entity.columns.len()),
            flag_cell(entity.is_subject_keyed()),
        ]);
    }
    println!("{table}");
    println!("{} entities, fingerprint {}", catalog.len(), catalog.fingerprint());
}

pub fn curation_table(report: &CurationReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("File"),
        header_cell("Rows"),
        header_cell("Added"),
        header_cell("Dropped"),
        header_cell("Sentinels"),
        header_cell("Participant_ID"),
        header_cell("Reclassified"),
    ]);
    apply_table_style(&mut table);
    for column in [2, 3, 4, 5, 7] {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for entity in &report.entities {
        let (added, dropped) = match &entity.schema {
            Some(schema) => (Some(schema.added.len()), Some(schema.dropped.len())),
            None => (None, None),
        };
        table.add_row(vec![
            entity_cell(&entity.entity, !entity.errors.is_empty()),
            materialize_cell(&entity.materialized),
            optional_cell(entity.rows),
            optional_cell(added),
            optional_cell(dropped),
            count_cell(entity.sentinels_cleaned, Color::Yellow),
            assignment_cell(entity.assignment),
            count_cell(entity.reclassified, Color::Cyan),
        ]);
    }
    table
}

pub fn validation_table(report: &ValidationReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Result"),
        header_cell("Rows"),
        header_cell("No SubjectUID"),
        header_cell("Mismatches"),
    ]);
    apply_table_style(&mut table);
    for column in [2, 3, 4] {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for file in &report.files {
        let (rows, without_subject) = match file.outcome {
            FileOutcome::Checked {
                rows_checked,
                rows_without_subject,
            } => (Some(rows_checked), Some(rows_without_subject)),
            _ => (None, None),
        };
        table.add_row(vec![
            Cell::new(&file.entity),
            result_cell(file),
            optional_cell(rows),
            optional_cell(without_subject),
            count_cell(file.mismatches.len(), Color::Red),
        ]);
    }
    table
}

/// One line per mismatch, in file then row order.
pub fn mismatch_lines(report: &ValidationReport) -> Vec<String> {
    report
        .files
        .iter()
        .flat_map(|file| {
            file.mismatches.iter().map(move |mismatch| {
                format!(
                    "{} row {}: SubjectUID {}, Participant_ID {} ({})",
                    file.entity,
                    mismatch.row,
                    mismatch.subject_uid,
                    mismatch.participant_id.as_deref().unwrap_or("<absent>"),
                    mismatch.reason
                )
            })
        })
        .collect()
}

pub fn validation_totals_line(report: &ValidationReport) -> String {
    let mut line = format!(
        "{} files validated: {} passed, {} failed",
        report.total_files(),
        report.passed_count(),
        report.failed_count()
    );
    let vacuous = report.vacuous_count();
    if vacuous > 0 {
        line.push_str(&format!(" ({vacuous} vacuous)"));
    }
    line.push_str(&format!("; {} mismatches", report.mismatch_count()));
    line
}

pub fn curation_totals_line(report: &CurationReport) -> String {
    format!(
        "{} of {} entities materialized, {} curated",
        report.materialized_count(),
        report.entities.len(),
        report.curated_count()
    )
}

pub fn reclassification_line(outcome: &ReclassificationOutcome) -> String {
    match outcome {
        ReclassificationOutcome::Applied {
            controls,
            rewritten,
        } => format!(
            "Reclassification: {controls} control subjects, {rewritten} identifiers rewritten"
        ),
        ReclassificationOutcome::Abandoned { reason } => {
            format!("Reclassification abandoned: {reason}")
        }
    }
}

fn curation_errors(report: &CurationReport) -> Vec<String> {
    report
        .entities
        .iter()
        .flat_map(|entity| {
            entity
                .errors
                .iter()
                .map(move |error| format!("{}: {error}", entity.entity))
        })
        .collect()
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn entity_cell(name: &str, failed: bool) -> Cell {
    if failed {
        Cell::new(name).fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        Cell::new(name)
    }
}

fn materialize_cell(status: &MaterializeStatus) -> Cell {
    match status {
        MaterializeStatus::Moved => Cell::new("moved").fg(Color::Green),
        MaterializeStatus::AlreadyPresent => Cell::new("present").fg(Color::Green),
        MaterializeStatus::Missing => Cell::new("missing").fg(Color::Yellow),
        MaterializeStatus::Failed { .. } => Cell::new("failed")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn assignment_cell(outcome: Option<AssignmentOutcome>) -> Cell {
    match outcome {
        Some(AssignmentOutcome::Assigned { rows }) => Cell::new(format!("assigned {rows}")),
        Some(AssignmentOutcome::AlreadyPresent) => dim_cell("present"),
        Some(AssignmentOutcome::NoSubjectKey) => dim_cell("no key"),
        None => dim_cell("-"),
    }
}

fn result_cell(file: &FileValidation) -> Cell {
    match &file.outcome {
        FileOutcome::Missing => Cell::new("MISSING")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        FileOutcome::Unreadable { .. } => Cell::new("UNREADABLE")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        FileOutcome::Vacuous { .. } => Cell::new("PASS (vacuous)").fg(Color::Yellow),
        FileOutcome::Checked { .. } if file.passed() => Cell::new("PASS").fg(Color::Green),
        FileOutcome::Checked { .. } => Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("✓").fg(Color::Green)
    } else {
        dim_cell("-")
    }
}

fn optional_cell(value: Option<usize>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
