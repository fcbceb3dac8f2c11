use crate::catalog::{Catalog, GizmoType};
use crate::config::SearchConfig;
use crate::consts::GIZMO_SLOTS;
use crate::distribution::GizmoVariant;
use crate::error::{GfResult, GizmoError};
use crate::search::{PerkTarget, RankedCandidate, SearchPlan, SecondaryTarget};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Second-perk names meaning "any acceptable perk".
pub const ANY_PERK_NAMES: [&str; 2] = ["any", "any perk"];

/// A search request as it travels on the wire.
///
/// The second name is optional: missing or `""` means no second perk, and
/// `"any"` accepts any perk outside the undesired list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GizmoRequest {
    pub target_perk_names: Vec<String>,
    pub target_perk_ranks: Vec<usize>,
    pub target_gizmo_type: GizmoType,
    pub target_gizmo_ancient: bool,
    /// Replaces the engine's tunables for this request only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SearchConfig>,
}

impl GizmoRequest {
    pub fn new(
        gizmo_type: GizmoType,
        ancient: bool,
        primary: PerkTarget,
        secondary: SecondaryTarget,
    ) -> Self {
        let mut names = vec![primary.name];
        let mut ranks = vec![primary.rank];
        match secondary {
            SecondaryTarget::None => {}
            SecondaryTarget::Any => {
                names.push(ANY_PERK_NAMES[0].to_string());
                ranks.push(0);
            }
            SecondaryTarget::Perk(second) => {
                names.push(second.name);
                ranks.push(second.rank);
            }
        }
        Self {
            target_perk_names: names,
            target_perk_ranks: ranks,
            target_gizmo_type: gizmo_type,
            target_gizmo_ancient: ancient,
            config: None,
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn variant(&self) -> GizmoVariant {
        GizmoVariant::from_ancient(self.target_gizmo_ancient)
    }

    pub fn primary(&self) -> GfResult<PerkTarget> {
        let name = self
            .target_perk_names
            .first()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| GizmoError::Validation("a first target perk is required".to_string()))?;
        let rank = self.target_perk_ranks.first().copied().ok_or_else(|| {
            GizmoError::Validation(format!("no rank given for '{}'", name))
        })?;
        Ok(PerkTarget::new(name.trim(), rank))
    }

    pub fn secondary(&self) -> GfResult<SecondaryTarget> {
        let name = match self.target_perk_names.get(1).map(|n| n.trim()) {
            None | Some("") => return Ok(SecondaryTarget::None),
            Some(name) => name,
        };
        if ANY_PERK_NAMES.iter().any(|any| any.eq_ignore_ascii_case(name)) {
            return Ok(SecondaryTarget::Any);
        }
        let rank = self.target_perk_ranks.get(1).copied().ok_or_else(|| {
            GizmoError::Validation(format!("no rank given for '{}'", name))
        })?;
        Ok(SecondaryTarget::Perk(PerkTarget::new(name, rank)))
    }

    /// Validates the request and resolves it into a search plan.
    pub fn to_plan(&self, catalog: &Catalog, defaults: &SearchConfig) -> GfResult<SearchPlan> {
        let config = self.config.clone().unwrap_or_else(|| defaults.clone());
        SearchPlan::new(
            catalog,
            self.target_gizmo_type,
            self.variant(),
            self.primary()?,
            self.secondary()?,
            config,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    InProgress,
    Complete,
    /// The request failed validation; nothing was searched.
    Rejected,
    /// The search hit an internal inconsistency and was abandoned.
    Failed,
}

/// Progress or terminal message for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    pub request_id: u64,
    pub status: WorkStatus,
    pub percent_complete: u8,
    pub result: Vec<GizmoResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusMessage {
    pub fn in_progress(request_id: u64, percent_complete: u8) -> Self {
        Self {
            request_id,
            status: WorkStatus::InProgress,
            percent_complete: percent_complete.min(100),
            result: Vec::new(),
            error: None,
        }
    }

    pub fn complete(request_id: u64, result: Vec<GizmoResult>) -> Self {
        Self {
            request_id,
            status: WorkStatus::Complete,
            percent_complete: 100,
            result,
            error: None,
        }
    }

    pub fn rejected(request_id: u64, reason: impl Into<String>) -> Self {
        Self {
            request_id,
            status: WorkStatus::Rejected,
            percent_complete: 0,
            result: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn failed(request_id: u64, reason: impl Into<String>) -> Self {
        Self {
            request_id,
            status: WorkStatus::Failed,
            percent_complete: 0,
            result: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != WorkStatus::InProgress
    }
}

/// Gizmo slots in placement order: the first material goes in the middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GizmoSlot {
    Middle,
    Top,
    Left,
    Right,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl GizmoSlot {
    pub const ORDER: [GizmoSlot; GIZMO_SLOTS] = [
        GizmoSlot::Middle,
        GizmoSlot::Top,
        GizmoSlot::Left,
        GizmoSlot::Right,
        GizmoSlot::Bottom,
        GizmoSlot::TopLeft,
        GizmoSlot::TopRight,
        GizmoSlot::BottomLeft,
        GizmoSlot::BottomRight,
    ];

    pub fn from_position(position: usize) -> Option<Self> {
        Self::ORDER.get(position).copied()
    }

    /// (row, column) in the 3x3 gizmo grid.
    pub fn grid_cell(self) -> (usize, usize) {
        match self {
            GizmoSlot::TopLeft => (0, 0),
            GizmoSlot::Top => (0, 1),
            GizmoSlot::TopRight => (0, 2),
            GizmoSlot::Left => (1, 0),
            GizmoSlot::Middle => (1, 1),
            GizmoSlot::Right => (1, 2),
            GizmoSlot::BottomLeft => (2, 0),
            GizmoSlot::Bottom => (2, 1),
            GizmoSlot::BottomRight => (2, 2),
        }
    }
}

/// One recommended combination, in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GizmoResult {
    pub component_quantities: Vec<(String, u32)>,
    /// Material per placement position (see [`GizmoSlot::ORDER`]); `None` is an empty slot.
    pub materials_arrangement: Vec<Option<String>>,
    pub success_rate_per_gizmo: f64,
    pub no_effect_chance: f64,
    pub optimal_invention_level: usize,
}

impl GizmoResult {
    /// Material in `slot`, if any.
    pub fn material_at(&self, slot: GizmoSlot) -> Option<&str> {
        let position = GizmoSlot::ORDER.iter().position(|&s| s == slot)?;
        self.materials_arrangement
            .get(position)
            .and_then(|m| m.as_deref())
    }

    pub fn total_quantity(&self) -> u32 {
        self.component_quantities.iter().map(|(_, q)| q).sum()
    }
}

impl From<RankedCandidate> for GizmoResult {
    fn from(candidate: RankedCandidate) -> Self {
        let mut materials_arrangement: Vec<Option<String>> =
            candidate.materials.into_iter().map(Some).collect();
        materials_arrangement.resize(GIZMO_SLOTS, None);

        Self {
            component_quantities: candidate.quantities,
            materials_arrangement,
            success_rate_per_gizmo: candidate.evaluation.gizmo_chance,
            no_effect_chance: candidate.evaluation.no_effect,
            optimal_invention_level: candidate.evaluation.level,
        }
    }
}
