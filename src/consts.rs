/// Highest invention level the budget table covers.
pub const MAX_INV_LEVEL: usize = 137;

/// Largest budget a six-draw roll can produce at the highest level.
pub const MAX_INV_BUDGET: usize = 6 * (MAX_INV_LEVEL / 2 + 20 - 1) + 1;

/// Number of uniform draws that make up a budget layer table.
pub const BUDGET_DRAW_LAYERS: usize = 6;

/// Upper bound used for "unbounded" value and budget ranges.
pub const UNBOUNDED: u32 = 9999;

/// Material slots available on a regular gizmo shell.
pub const REGULAR_MATERIAL_LIMIT: u32 = 5;

/// Material slots available on an ancient gizmo shell.
pub const ANCIENT_MATERIAL_LIMIT: u32 = 9;

/// Arrangement orderings generated per quantity vector (5!, 9!).
pub const REGULAR_ARRANGEMENT_LIMIT: usize = 720;
pub const ANCIENT_ARRANGEMENT_LIMIT: usize = 362_880;

/// Ranks rarer than this are skipped during rank enumeration.
pub const RANK_PROBABILITY_FLOOR: f64 = 0.001;

/// Fraction of base and roll a regular component keeps inside an ancient gizmo.
pub const ANCIENT_PENALTY: f64 = 0.8;

/// Number of positional slots in a gizmo layout.
pub const GIZMO_SLOTS: usize = 9;

/// Candidates evaluated between progress reports.
pub const PROGRESS_CADENCE: usize = 10;

/// Share of the progress bar spent on the first-arrangement pass.
pub const FIRST_PASS_WEIGHT: f64 = 75.0;

/// Gizmo chances closer than this are considered tied when ranking.
pub const RESULT_TIE_EPSILON: f64 = 1e-5;
