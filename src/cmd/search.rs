use crate::reports;
use clap::Args;
use gizmoforge::api::GizmoEngine;
use gizmoforge::catalog::GizmoType;
use gizmoforge::config::SearchConfig;
use gizmoforge::error::GfResult;
use gizmoforge::protocol::GizmoRequest;
use std::fs;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub config: SearchConfig,

    /// Perk the gizmo must roll.
    #[arg(short, long)]
    pub perk: String,

    #[arg(short, long, default_value_t = 1)]
    pub rank: usize,

    /// Second perk; "any" accepts anything outside the undesired list.
    #[arg(short, long)]
    pub second: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub second_rank: usize,

    #[arg(short = 't', long, default_value = "weapon")]
    pub gizmo_type: GizmoType,

    /// Search an ancient gizmo shell.
    #[arg(short, long, default_value_t = false)]
    pub ancient: bool,

    /// Number of result layouts drawn as grids.
    #[arg(long, default_value_t = 1)]
    pub grids: usize,

    /// Write the ranking as CSV.
    #[arg(long)]
    pub csv: Option<String>,

    /// Write the ranking as JSON.
    #[arg(long)]
    pub json: Option<String>,
}

impl SearchArgs {
    pub fn to_request(&self) -> GizmoRequest {
        let mut names = vec![self.perk.clone()];
        let mut ranks = vec![self.rank];
        if let Some(second) = &self.second {
            names.push(second.clone());
            ranks.push(self.second_rank);
        }
        GizmoRequest {
            target_perk_names: names,
            target_perk_ranks: ranks,
            target_gizmo_type: self.gizmo_type,
            target_gizmo_ancient: self.ancient,
            config: None,
        }
    }
}

pub fn run(args: SearchArgs, engine: &GizmoEngine) -> GfResult<()> {
    let request = args.to_request();
    let plan = engine.plan(&request)?;

    println!(
        "🔥 Searching {} {} gizmo: {} / {}",
        plan.variant,
        plan.gizmo_type,
        plan.primary,
        reports::describe_secondary(&plan.secondary)
    );

    let start = Instant::now();
    let last_shown = AtomicU8::new(0);
    let progress = |percent: u8| {
        let step = percent / 10 * 10;
        if step > last_shown.fetch_max(step, Ordering::Relaxed) {
            info!("⏳ {:>3}%", step);
        }
        true
    };
    let results = engine.run(&request, &progress)?;
    println!(
        "\n✅ Search finished in {:.2}s ({} results)",
        start.elapsed().as_secs_f64(),
        results.len()
    );

    if results.is_empty() {
        println!("No material combination can roll this target.");
        return Ok(());
    }

    reports::print_results_table(&results);
    for (i, result) in results.iter().take(args.grids).enumerate() {
        reports::print_layout_grid(&format!("#{}", i + 1), result);
    }

    if let Some(path) = &args.csv {
        reports::write_results_csv(path, &results)?;
        println!("💾 CSV written to {}", path);
    }
    if let Some(path) = &args.json {
        fs::write(path, serde_json::to_string_pretty(&results)?)?;
        println!("💾 JSON written to {}", path);
    }
    Ok(())
}
