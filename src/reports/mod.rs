use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use gizmoforge::catalog::PerkSummary;
use gizmoforge::consts::GIZMO_SLOTS;
use gizmoforge::error::GfResult;
use gizmoforge::protocol::{GizmoResult, GizmoSlot};
use gizmoforge::search::SecondaryTarget;
use std::path::Path;
use strum::IntoEnumIterator;

pub fn describe_secondary(secondary: &SecondaryTarget) -> String {
    match secondary {
        SecondaryTarget::None => "no second perk".to_string(),
        SecondaryTarget::Any => "any perk".to_string(),
        SecondaryTarget::Perk(target) => target.to_string(),
    }
}

fn quantities_label(result: &GizmoResult) -> String {
    result
        .component_quantities
        .iter()
        .map(|(name, q)| format!("{} x{}", q, name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn chance_color(chance: f64) -> Color {
    if chance >= 0.5 {
        Color::Green
    } else if chance >= 0.1 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn print_results_table(results: &[GizmoResult]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Materials").add_attribute(Attribute::Bold),
        Cell::new("Qty"),
        Cell::new("Gizmo %").fg(Color::Cyan),
        Cell::new("No Effect %"),
        Cell::new("Level").add_attribute(Attribute::Bold),
    ]);

    for i in [0, 2, 3, 4, 5] {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (i, r) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(quantities_label(r)),
            Cell::new(r.total_quantity()),
            Cell::new(format!("{:.3}", r.success_rate_per_gizmo * 100.0))
                .fg(chance_color(r.success_rate_per_gizmo)),
            Cell::new(format!("{:.2}", r.no_effect_chance * 100.0)),
            Cell::new(r.optimal_invention_level).add_attribute(Attribute::Bold),
        ]);
    }
    println!("{}", table);
}

/// Draws a result's arrangement on the 3x3 gizmo grid.
pub fn print_layout_grid(name: &str, result: &GizmoResult) {
    println!(
        "\nLayout {}: {:.3}% at level {}",
        name,
        result.success_rate_per_gizmo * 100.0,
        result.optimal_invention_level
    );
    let mut grid = [[""; 3]; 3];
    for slot in GizmoSlot::iter() {
        if let Some(m) = result.material_at(slot) {
            let (row, col) = slot.grid_cell();
            grid[row][col] = m;
        }
    }

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    for row in grid {
        let cells: Vec<Cell> = row
            .iter()
            .map(|&m| {
                let s = if m.is_empty() { " " } else { m };
                Cell::new(s).set_alignment(CellAlignment::Center)
            })
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

pub fn print_perks_table(perks: &[PerkSummary]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Perk").add_attribute(Attribute::Bold),
        Cell::new("Max Rank").fg(Color::Cyan),
        Cell::new("Components"),
        Cell::new("Two Slot"),
    ]);
    for i in 1..=2 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for p in perks {
        table.add_row(vec![
            Cell::new(&p.name).add_attribute(Attribute::Bold),
            Cell::new(p.max_rank).fg(Color::Cyan),
            Cell::new(p.component_count),
            Cell::new(if p.two_slot { "yes" } else { "" }),
        ]);
    }
    println!("{}", table);
}

pub fn print_budget_table(rows: &[(usize, f64, f64, Option<(f64, f64)>)], budget: Option<u32>) {
    println!("\n📊 === INVENTION BUDGET === 📊");
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("Level").add_attribute(Attribute::Bold),
        Cell::new("Mean (reg)").fg(Color::Cyan),
        Cell::new("Mean (anc)").fg(Color::Cyan),
    ];
    if let Some(b) = budget {
        header.push(Cell::new(format!("P(<= {}) reg", b)));
        header.push(Cell::new(format!("P(<= {}) anc", b)));
    }
    table.set_header(header);

    for (level, reg_mean, anc_mean, at_most) in rows {
        let mut row = vec![
            Cell::new(level).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.1}", reg_mean)),
            Cell::new(format!("{:.1}", anc_mean)),
        ];
        if let Some((reg, anc)) = at_most {
            row.push(Cell::new(format!("{:.4}", reg)));
            row.push(Cell::new(format!("{:.4}", anc)));
        }
        table.add_row(row);
    }
    for i in 0..5 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    println!("{}", table);
}

/// One row per result: rank, chances, level, then the nine slots in placement order.
pub fn write_results_csv<P: AsRef<Path>>(path: P, results: &[GizmoResult]) -> GfResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "rank".to_string(),
        "gizmo_chance".to_string(),
        "no_effect_chance".to_string(),
        "invention_level".to_string(),
        "quantities".to_string(),
    ];
    header.extend(GizmoSlot::ORDER.iter().map(GizmoSlot::to_string));
    writer.write_record(&header)?;

    for (i, r) in results.iter().enumerate() {
        let mut record = vec![
            (i + 1).to_string(),
            format!("{:.6}", r.success_rate_per_gizmo),
            format!("{:.6}", r.no_effect_chance),
            r.optimal_invention_level.to_string(),
            quantities_label(r),
        ];
        record.extend((0..GIZMO_SLOTS).map(|p| {
            r.materials_arrangement
                .get(p)
                .cloned()
                .flatten()
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
