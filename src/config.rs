use crate::error::{GfResult, GizmoError};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const DEFAULT_UNDESIRED_PERKS: &str = "Demon Bait,Fatiguing,Cautious,Dragon Bait,Committed,\
Profane,Inaccurate,Blunted,Junk food,Confused,Antitheism";

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Results kept after pruning and in the final ranking.
    #[arg(long, default_value_t = 30)]
    pub top_configuration_count: usize,

    /// Quantity vectors evaluated per search.
    #[arg(long, default_value_t = 1250)]
    pub quantity_limit: usize,

    /// Extra arrangements tried for each retained candidate.
    #[arg(long, default_value_t = 200)]
    pub arrangement_limit_per_quantity: usize,

    /// Comma separated perks that spoil an "any second perk" outcome.
    #[arg(long, default_value = DEFAULT_UNDESIRED_PERKS)]
    pub undesired_perks: String,

    /// Comma separated materials never used in a candidate.
    #[arg(long, default_value = "")]
    pub exclude_materials: String,

    /// Check probability and budget-range invariants during the search.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sanity_checks: bool,

    /// Worker threads for candidate evaluation (0 = one per core).
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_configuration_count: 30,
            quantity_limit: 1250,
            arrangement_limit_per_quantity: 200,
            undesired_perks: DEFAULT_UNDESIRED_PERKS.to_string(),
            exclude_materials: String::new(),
            sanity_checks: true,
            threads: 0,
        }
    }
}

impl SearchConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GfResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GfResult<()> {
        if self.top_configuration_count == 0 {
            return Err(GizmoError::Config(
                "top_configuration_count must be at least 1".to_string(),
            ));
        }
        if self.quantity_limit == 0 {
            return Err(GizmoError::Config(
                "quantity_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_undesired_perks(&self) -> HashSet<String> {
        split_list(&self.undesired_perks)
    }

    pub fn get_excluded_materials(&self) -> HashSet<String> {
        split_list(&self.exclude_materials)
    }

    pub fn merge_from_cli(&mut self, cli_config: &SearchConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_config.$field.clone();
                }
            };
        }

        update_if_present!(top_configuration_count, "top_configuration_count");
        update_if_present!(quantity_limit, "quantity_limit");
        update_if_present!(
            arrangement_limit_per_quantity,
            "arrangement_limit_per_quantity"
        );
        update_if_present!(undesired_perks, "undesired_perks");
        update_if_present!(exclude_materials, "exclude_materials");
        update_if_present!(sanity_checks, "sanity_checks");
        update_if_present!(threads, "threads");
    }
}

fn split_list(s: &str) -> HashSet<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
