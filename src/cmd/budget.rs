use crate::reports;
use clap::Args;
use gizmoforge::consts::MAX_INV_LEVEL;
use gizmoforge::distribution::{BudgetTable, GizmoVariant};

#[derive(Args, Debug, Clone)]
pub struct BudgetArgs {
    /// Invention levels to show (default: every 10th level).
    #[arg(short, long, value_delimiter = ',')]
    pub levels: Vec<usize>,

    /// Budget whose "at most" probability is shown alongside the mean.
    #[arg(short, long)]
    pub budget: Option<u32>,
}

pub fn run(args: &BudgetArgs) {
    let mut levels: Vec<usize> = if args.levels.is_empty() {
        (1..=MAX_INV_LEVEL).filter(|l| l % 10 == 0 || *l == 1).collect()
    } else {
        args.levels.iter().map(|&l| l.min(MAX_INV_LEVEL)).collect()
    };
    levels.sort_unstable();
    levels.dedup();

    let table = BudgetTable::new();
    let rows: Vec<(usize, f64, f64, Option<(f64, f64)>)> = levels
        .into_iter()
        .map(|level| {
            let at_most = args.budget.map(|b| {
                (
                    table.at_most(GizmoVariant::Regular, level, b),
                    table.at_most(GizmoVariant::Ancient, level, b),
                )
            });
            (
                level,
                table.mean(GizmoVariant::Regular, level),
                table.mean(GizmoVariant::Ancient, level),
                at_most,
            )
        })
        .collect();

    reports::print_budget_table(&rows, args.budget);
}
