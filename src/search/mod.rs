pub mod arrangements;
pub mod evaluator;
pub mod level;
pub mod plan;
pub mod quantities;
pub mod ranks;
pub mod runner;
pub mod sort;

pub use self::arrangements::{Arrangement, ArrangementGenerator};
pub use self::evaluator::{ArrangementEvaluator, ArrangementResult, BudgetRange, SelectionMass};
pub use self::level::{LevelEvaluation, LevelOptimizer};
pub use self::plan::{PerkTarget, SearchPlan, SecondaryTarget};
pub use self::quantities::QuantityProblem;
pub use self::ranks::{rank_tables, PerkRank, PerkRankTable, RankTables};
pub use self::runner::{ProgressCallback, RankedCandidate, SearchPhase, SearchRunner, Silent};
