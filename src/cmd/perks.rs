use crate::reports;
use clap::Args;
use gizmoforge::api::GizmoEngine;
use gizmoforge::catalog::GizmoType;
use gizmoforge::error::GfResult;

#[derive(Args, Debug, Clone)]
pub struct PerksArgs {
    #[arg(short = 't', long, default_value = "weapon")]
    pub gizmo_type: GizmoType,

    #[arg(short, long, default_value_t = false)]
    pub ancient: bool,

    /// Only list perks whose name contains this text.
    #[arg(short, long)]
    pub filter: Option<String>,
}

pub fn run(args: PerksArgs, engine: &GizmoEngine) -> GfResult<()> {
    let mut perks = engine
        .catalog()
        .perk_summaries(args.gizmo_type, args.ancient);

    if let Some(ref filter) = args.filter {
        let needle = filter.to_lowercase();
        perks.retain(|p| p.name.to_lowercase().contains(&needle));
    }

    if perks.is_empty() {
        println!("No perks found matching criteria.");
        return Ok(());
    }

    let shell = if args.ancient { "ancient" } else { "regular" };
    println!("\n🔎 === {} PERKS ({}) === 🔎", args.gizmo_type, shell);
    reports::print_perks_table(&perks);
    Ok(())
}
