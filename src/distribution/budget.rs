use crate::consts::{
    ANCIENT_ARRANGEMENT_LIMIT, ANCIENT_MATERIAL_LIMIT, BUDGET_DRAW_LAYERS, MAX_INV_BUDGET,
    MAX_INV_LEVEL, REGULAR_ARRANGEMENT_LIMIT, REGULAR_MATERIAL_LIMIT,
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GizmoVariant {
    Regular,
    Ancient,
}

impl GizmoVariant {
    pub fn from_ancient(ancient: bool) -> Self {
        if ancient {
            Self::Ancient
        } else {
            Self::Regular
        }
    }

    pub fn is_ancient(self) -> bool {
        self == Self::Ancient
    }

    pub fn material_limit(self) -> u32 {
        match self {
            Self::Regular => REGULAR_MATERIAL_LIMIT,
            Self::Ancient => ANCIENT_MATERIAL_LIMIT,
        }
    }

    pub fn arrangement_limit(self) -> usize {
        match self {
            Self::Regular => REGULAR_ARRANGEMENT_LIMIT,
            Self::Ancient => ANCIENT_ARRANGEMENT_LIMIT,
        }
    }

    /// Uniform draws summed into the budget: five for regular shells, six for ancient.
    pub fn draws(self) -> usize {
        match self {
            Self::Regular => BUDGET_DRAW_LAYERS - 1,
            Self::Ancient => BUDGET_DRAW_LAYERS,
        }
    }
}

/// Width of one budget draw at the given invention level (exclusive upper bound).
pub fn draw_width(level: usize) -> usize {
    level / 2 + 20
}

/// `P(budget <= b)` for every level and shell, computed once.
///
/// Row layout: index `b + 1` holds `P(budget <= b)` and index 0 is always 0,
/// so a closed range `[lo, hi]` is `row[hi + 1] - row[lo]`.
#[derive(Debug, Clone)]
pub struct BudgetTable {
    regular: Vec<Vec<f64>>,
    ancient: Vec<Vec<f64>>,
}

impl Default for BudgetTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetTable {
    pub fn new() -> Self {
        let mut regular = Vec::with_capacity(MAX_INV_LEVEL + 1);
        let mut ancient = Vec::with_capacity(MAX_INV_LEVEL + 1);

        for level in 0..=MAX_INV_LEVEL {
            let (reg_row, anc_row) = build_level_rows(level);
            regular.push(reg_row);
            ancient.push(anc_row);
        }

        debug!(
            "Budget table built: {} levels x {} budgets",
            MAX_INV_LEVEL + 1,
            MAX_INV_BUDGET + 1
        );
        Self { regular, ancient }
    }

    fn row(&self, variant: GizmoVariant, level: usize) -> &[f64] {
        let level = level.min(MAX_INV_LEVEL);
        match variant {
            GizmoVariant::Regular => &self.regular[level],
            GizmoVariant::Ancient => &self.ancient[level],
        }
    }

    /// P(budget <= budget_value).
    pub fn at_most(&self, variant: GizmoVariant, level: usize, budget: u32) -> f64 {
        let idx = (budget as usize).min(MAX_INV_BUDGET) + 1;
        self.row(variant, level)[idx]
    }

    /// P(min_budget <= budget <= max_budget); both ends are clamped to the table.
    pub fn between(&self, variant: GizmoVariant, level: usize, min_budget: u32, max_budget: u32) -> f64 {
        let row = self.row(variant, level);
        let lo = (min_budget as usize).min(MAX_INV_BUDGET + 1);
        let hi = (max_budget as usize).min(MAX_INV_BUDGET) + 1;
        if hi <= lo {
            return 0.0;
        }
        row[hi] - row[lo]
    }

    /// Expected budget, for reports.
    pub fn mean(&self, variant: GizmoVariant, level: usize) -> f64 {
        let row = self.row(variant, level);
        (0..=MAX_INV_BUDGET)
            .map(|b| b as f64 * (row[b + 1] - row[b]))
            .sum()
    }
}

fn build_level_rows(level: usize) -> (Vec<f64>, Vec<f64>) {
    let width = draw_width(level);
    let prob = 1.0 / width as f64;

    let mut layers: Vec<Vec<f64>> = Vec::with_capacity(BUDGET_DRAW_LAYERS);
    layers.push(vec![prob; width]);

    for draw in 1..BUDGET_DRAW_LAYERS {
        let prev = &layers[draw - 1];
        let next_size = (width - 1) * (draw + 1) + 1;
        let mut next = vec![0.0; next_size];

        let mut window = 0.0;
        for (i, slot) in next.iter_mut().enumerate() {
            if i < prev.len() {
                window += prev[i];
            }
            if i >= width {
                window -= prev[i - width];
            }
            *slot = window / width as f64;
        }
        layers.push(next);
    }

    let regular_pdf = &layers[GizmoVariant::Regular.draws() - 1];
    let ancient_pdf = &layers[GizmoVariant::Ancient.draws() - 1];
    let support = ancient_pdf.len();

    let mut reg_row = vec![0.0; MAX_INV_BUDGET + 2];
    let mut anc_row = vec![0.0; MAX_INV_BUDGET + 2];
    let mut reg_sum = 0.0;
    let mut anc_sum = 0.0;

    for b in 0..=MAX_INV_BUDGET {
        if b < support {
            reg_sum += regular_pdf.get(b).copied().unwrap_or(0.0);
            anc_sum += ancient_pdf[b];
        }
        if b + 1 >= support {
            reg_row[b + 1] = 1.0;
            anc_row[b + 1] = 1.0;
        } else if b >= level {
            // Budget never falls below the invention level; that mass lands on `level`.
            reg_row[b + 1] = reg_sum;
            anc_row[b + 1] = anc_sum;
        }
    }
    (reg_row, anc_row)
}
