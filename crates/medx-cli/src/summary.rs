use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use medx_cli::run::{CheckReport, RunReport};
use medx_config::{ProcessorConfig, StrategyKind};

/// Most frequent item codes listed after a run.
const TOP_CODES: usize = 10;

pub fn print_run_summary(report: &RunReport) {
    let outcome = &report.outcome;
    println!("Input: {}", report.input.display());
    match &report.written {
        Some(written) => println!("Output: {}", written.path.display()),
        None => println!("Output: {} (dry run, not written)", report.output_path.display()),
    }
    println!("Strategy: {}", outcome.strategy.strategy);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Phase"),
        header_cell("Stage"),
        header_cell("Rows"),
        header_cell("Dropped"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    let mut previous = outcome.input_rows;
    let mut add_row = |table: &mut Table, phase: &str, stage: &str, rows: usize| {
        table.add_row(vec![
            phase_cell(phase),
            Cell::new(stage),
            Cell::new(rows),
            count_cell(previous.saturating_sub(rows), Color::Yellow),
        ]);
        previous = rows;
    };
    add_row(&mut table, "ingest", "records read", outcome.input_rows);
    add_row(&mut table, "gate", "diagnosis type", outcome.gated_rows);
    for step in &outcome.normalization.steps {
        add_row(&mut table, "quality", step.step, step.after);
    }
    for stage in &outcome.strategy.stages {
        add_row(&mut table, "filter", stage.stage, stage.rows);
    }
    for stage in &outcome.final_pass {
        add_row(&mut table, "final", stage.stage, stage.rows);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("records written")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(outcome.table.height()).add_attribute(Attribute::Bold),
        count_cell(
            outcome.input_rows.saturating_sub(outcome.table.height()),
            Color::Yellow,
        )
        .add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    print_distribution_table(report);

    println!("Unique patients: {}", report.unique_patients);
    if let Some((first, last)) = report.date_span {
        println!("Visit dates: {first} to {last}");
    }
    if let Some(groups) = outcome.strategy.qualifying_groups {
        println!("Qualifying groups: {groups}");
    }
    println!("Reduction: {:.2}%", report.reduction_percent());
    let missing: Vec<String> = outcome
        .missing_values
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(column, count)| format!("{column} ({count})"))
        .collect();
    if !missing.is_empty() {
        println!("Missing values: {}", missing.join(", "));
    }
    println!("Elapsed: {:.2?}", report.elapsed);

    if !outcome.strategy.warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &outcome.strategy.warnings {
            eprintln!("- {warning}");
        }
    }
}

fn print_distribution_table(report: &RunReport) {
    let diagnostics = &report.outcome.strategy;
    if diagnostics.code_distribution.is_empty() && diagnostics.classifications.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Value"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    let mut codes: Vec<(&String, &usize)> = diagnostics.code_distribution.iter().collect();
    codes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (code, rows) in codes.iter().take(TOP_CODES) {
        table.add_row(vec![
            dim_cell("Codigo_Item"),
            Cell::new(code.as_str()),
            Cell::new(**rows),
        ]);
    }
    if codes.len() > TOP_CODES {
        table.add_row(vec![
            dim_cell("Codigo_Item"),
            dim_cell(format!("{} more codes", codes.len() - TOP_CODES)),
            dim_cell("-"),
        ]);
    }
    for (column, counts) in &diagnostics.classifications {
        for (class, rows) in counts {
            table.add_row(vec![
                Cell::new(column.as_str()).fg(Color::Blue),
                class_cell(class),
                Cell::new(*rows),
            ]);
        }
    }
    println!("{table}");
}

pub fn print_check_summary(report: &CheckReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    apply_table_style(&mut table);

    table.add_row(vec![
        Cell::new("Strategy"),
        Cell::new(report.active.label())
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Configuration block"),
        Cell::new(report.active.config_key()),
    ]);
    for (setting, value) in strategy_settings(&report.config, report.active) {
        table.add_row(vec![Cell::new(setting), Cell::new(value)]);
    }
    table.add_row(vec![
        Cell::new("Columns"),
        Cell::new(report.config.columns.join(", ")),
    ]);
    table.add_row(vec![
        Cell::new("Input"),
        path_cell(report.input.as_deref()),
    ]);
    table.add_row(vec![
        Cell::new("Output"),
        path_cell(report.output.as_deref()),
    ]);
    println!("{table}");

    if report.enabled.len() > 1 {
        let ignored: Vec<&str> = report
            .enabled
            .iter()
            .filter(|kind| **kind != report.active)
            .map(|kind| kind.config_key())
            .collect();
        eprintln!(
            "warning: several filters are active; ignoring {}",
            ignored.join(", ")
        );
    }
}

fn strategy_settings(config: &ProcessorConfig, kind: StrategyKind) -> Vec<(&'static str, String)> {
    match kind {
        StrategyKind::Specific => {
            let specific = &config.specific;
            vec![
                ("Diagnosis types", specific.diagnosis_types.to_string()),
                ("Item code", specific.item_code.clone()),
                ("Lab values", specific.lab_values.to_string()),
                ("Date range", on_off(specific.date_range.active)),
                ("Blood pressure", on_off(specific.blood_pressure.active)),
            ]
        }
        StrategyKind::Perimeter => vec![
            ("Required codes", config.perimeter.required_codes.to_string()),
            ("Mode", config.perimeter.mode.clone()),
            ("Group by visit date", on_off(config.perimeter.group_by_date)),
        ],
        StrategyKind::ClinicalAssessment => vec![
            (
                "Required codes",
                config.clinical_assessment.required_codes.to_string(),
            ),
            ("Mode", config.clinical_assessment.mode.clone()),
            ("Lab values", config.clinical_assessment.lab_values.to_string()),
            (
                "Group by visit date",
                on_off(config.clinical_assessment.group_by_date),
            ),
        ],
        StrategyKind::ClinicalAssessmentWithRisk => vec![
            ("Required codes", config.clinical_risk.required_codes.to_string()),
            ("Risk factor codes", config.clinical_risk.risk_codes.to_string()),
            ("Lab values", config.clinical_risk.lab_values.to_string()),
            ("Group by visit date", on_off(config.clinical_risk.group_by_date)),
        ],
        StrategyKind::GenericCodeLab => vec![
            ("Required codes", config.item_codes.required.to_string()),
            ("Optional codes", config.item_codes.optional.to_string()),
            ("Lab values", config.lab_values.to_string()),
            ("Mode", config.code_filtering.mode.clone()),
            ("Diagnosis type", config.general.diagnosis_type.clone()),
        ],
    }
}

fn on_off(active: bool) -> String {
    if active { "on" } else { "off" }.to_string()
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn phase_cell(phase: &str) -> Cell {
    Cell::new(phase).fg(Color::Blue)
}

fn class_cell(class: &str) -> Cell {
    match class {
        "ANORMAL" => Cell::new(class).fg(Color::Red).add_attribute(Attribute::Bold),
        "NORMAL" => Cell::new(class).fg(Color::Green),
        _ => dim_cell(class),
    }
}

fn path_cell(path: Option<&std::path::Path>) -> Cell {
    match path {
        Some(path) => Cell::new(path.display()),
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
