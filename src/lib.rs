pub mod api;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod distribution;
pub mod error;
pub mod protocol;
pub mod search;

pub use api::{GizmoEngine, SearchHandle};
pub use catalog::{Catalog, GizmoType};
pub use config::SearchConfig;
pub use error::{GfResult, GizmoError};
pub use protocol::{GizmoRequest, GizmoResult, GizmoSlot, StatusMessage, WorkStatus};
