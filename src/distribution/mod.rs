pub mod budget;
pub mod dice;

pub use self::budget::{BudgetTable, GizmoVariant};
pub use self::dice::{CdfCache, DiceSumCdf};
