use crate::catalog::{Catalog, GizmoType};
use crate::config::SearchConfig;
use crate::distribution::GizmoVariant;
use crate::error::{GfResult, GizmoError};
use std::collections::HashSet;
use std::fmt;

/// A perk at a specific rank (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PerkTarget {
    pub name: String,
    pub rank: usize,
}

impl PerkTarget {
    pub fn new(name: impl Into<String>, rank: usize) -> Self {
        Self {
            name: name.into(),
            rank,
        }
    }
}

impl fmt::Display for PerkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.rank)
    }
}

/// What the second perk slot should hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SecondaryTarget {
    /// Only the primary perk may be selected.
    #[default]
    None,
    /// The primary perk alone, or paired with any perk that is not undesired.
    Any,
    Perk(PerkTarget),
}

impl SecondaryTarget {
    pub fn perk(&self) -> Option<&PerkTarget> {
        match self {
            Self::Perk(target) => Some(target),
            _ => None,
        }
    }
}

/// A validated search request with its own copy of the tunables.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub gizmo_type: GizmoType,
    pub variant: GizmoVariant,
    pub primary: PerkTarget,
    pub secondary: SecondaryTarget,
    pub undesired: HashSet<String>,
    pub excluded_materials: HashSet<String>,
    pub config: SearchConfig,
}

impl SearchPlan {
    /// Validates the targets against the catalog. Every check here runs
    /// before any enumeration starts.
    pub fn new(
        catalog: &Catalog,
        gizmo_type: GizmoType,
        variant: GizmoVariant,
        primary: PerkTarget,
        secondary: SecondaryTarget,
        config: SearchConfig,
    ) -> GfResult<Self> {
        config
            .validate()
            .map_err(|e| GizmoError::Validation(e.to_string()))?;

        let primary_two_slot = check_target(catalog, gizmo_type, variant, &primary)?;

        if let SecondaryTarget::Perk(second) = &secondary {
            if second.name == primary.name {
                return Err(GizmoError::Validation(format!(
                    "both target perks are '{}'",
                    primary.name
                )));
            }
            let second_two_slot = check_target(catalog, gizmo_type, variant, second)?;
            if primary_two_slot || second_two_slot {
                return Err(GizmoError::Validation(format!(
                    "'{}' and '{}' cannot share a gizmo: a two-slot perk is always alone",
                    primary.name, second.name
                )));
            }
        }

        let mut undesired = config.get_undesired_perks();
        undesired.remove(&primary.name);
        if let Some(second) = secondary.perk() {
            undesired.remove(&second.name);
        }
        let excluded_materials = config.get_excluded_materials();

        Ok(Self {
            gizmo_type,
            variant,
            primary,
            secondary,
            undesired,
            excluded_materials,
            config,
        })
    }

    /// Targets whose rank windows constrain the quantity search.
    pub fn targets(&self) -> Vec<&PerkTarget> {
        let mut targets = vec![&self.primary];
        if let Some(second) = self.secondary.perk() {
            targets.push(second);
        }
        targets
    }
}

/// Returns the perk's two-slot flag once the target is known to be reachable.
fn check_target(
    catalog: &Catalog,
    gizmo_type: GizmoType,
    variant: GizmoVariant,
    target: &PerkTarget,
) -> GfResult<bool> {
    let info = catalog
        .perk(&target.name)
        .ok_or_else(|| GizmoError::Validation(format!("unknown perk '{}'", target.name)))?;

    if target.rank == 0 {
        return Err(GizmoError::Validation(format!(
            "rank of '{}' must be at least 1",
            target.name
        )));
    }
    if target.rank > info.rank_count() {
        return Err(GizmoError::Validation(format!(
            "'{}' has no rank {} (maximum is {})",
            target.name,
            target.rank,
            info.rank_count()
        )));
    }
    let ancient = variant.is_ancient();
    if !ancient && (info.is_ancient_only(target.rank) || target.rank > info.max_rank(false)) {
        return Err(GizmoError::Validation(format!(
            "rank {} of '{}' requires an ancient gizmo",
            target.rank, target.name
        )));
    }
    if !catalog.is_obtainable(gizmo_type, &target.name, ancient) {
        return Err(GizmoError::Validation(format!(
            "'{}' cannot be obtained on a {} {} gizmo",
            target.name, variant, gizmo_type
        )));
    }
    Ok(info.two_slot)
}
