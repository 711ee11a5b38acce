//! Model lifecycle stages and the transition table

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::RegistryError;

/// Model lifecycle stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelStage {
    /// Freshly registered, not assigned to any stage
    None,
    /// Being validated before serving traffic
    Staging,
    /// Deployed and serving traffic
    Production,
    /// Retired from active use
    Archived,
}

impl ModelStage {
    /// All stages, in lifecycle order
    pub const ALL: [ModelStage; 4] =
        [ModelStage::None, ModelStage::Staging, ModelStage::Production, ModelStage::Archived];

    /// Check if transition to target stage is valid
    pub fn can_transition_to(&self, target: ModelStage) -> bool {
        match (self, target) {
            // Same stage is a no-op
            (a, b) if *a == b => true,
            // Nothing returns to the unassigned stage
            (_, ModelStage::None) => false,
            // Any live stage can be archived
            (_, ModelStage::Archived) => true,
            // None can go to Staging or straight to Production
            (ModelStage::None, ModelStage::Staging | ModelStage::Production) => true,
            (ModelStage::Staging, ModelStage::Production) => true,
            // Production can go back to Staging (rollback)
            (ModelStage::Production, ModelStage::Staging) => true,
            // Manual re-promotion of a retired version
            (ModelStage::Archived, ModelStage::Staging | ModelStage::Production) => true,
            _ => false,
        }
    }

    /// Stages that admit at most one version per model
    pub fn is_exclusive(&self) -> bool {
        matches!(self, ModelStage::Staging | ModelStage::Production)
    }

    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStage::None => "None",
            ModelStage::Staging => "Staging",
            ModelStage::Production => "Production",
            ModelStage::Archived => "Archived",
        }
    }
}

impl std::fmt::Display for ModelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelStage {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ModelStage::None),
            "staging" => Ok(ModelStage::Staging),
            "production" => Ok(ModelStage::Production),
            "archived" => Ok(ModelStage::Archived),
            _ => Err(RegistryError::UnknownStage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_none_to_staging() {
        assert!(ModelStage::None.can_transition_to(ModelStage::Staging));
    }

    #[test]
    fn test_stage_none_direct_to_production() {
        assert!(ModelStage::None.can_transition_to(ModelStage::Production));
    }

    #[test]
    fn test_stage_staging_to_production() {
        assert!(ModelStage::Staging.can_transition_to(ModelStage::Production));
    }

    #[test]
    fn test_stage_production_rollback_to_staging() {
        assert!(ModelStage::Production.can_transition_to(ModelStage::Staging));
    }

    #[test]
    fn test_stage_any_to_archived() {
        for stage in ModelStage::ALL {
            assert!(stage.can_transition_to(ModelStage::Archived));
        }
    }

    #[test]
    fn test_stage_nothing_returns_to_none() {
        assert!(!ModelStage::Staging.can_transition_to(ModelStage::None));
        assert!(!ModelStage::Production.can_transition_to(ModelStage::None));
        assert!(!ModelStage::Archived.can_transition_to(ModelStage::None));
    }

    #[test]
    fn test_stage_archived_manual_repromotion() {
        assert!(ModelStage::Archived.can_transition_to(ModelStage::Staging));
        assert!(ModelStage::Archived.can_transition_to(ModelStage::Production));
    }

    #[test]
    fn test_stage_same_stage_noop() {
        for stage in ModelStage::ALL {
            assert!(stage.can_transition_to(stage));
        }
    }

    #[test]
    fn test_stage_exclusive() {
        assert!(ModelStage::Staging.is_exclusive());
        assert!(ModelStage::Production.is_exclusive());
        assert!(!ModelStage::None.is_exclusive());
        assert!(!ModelStage::Archived.is_exclusive());
    }

    #[test]
    fn test_stage_parse_case_insensitive() {
        assert_eq!("production".parse::<ModelStage>().unwrap(), ModelStage::Production);
        assert_eq!("Staging".parse::<ModelStage>().unwrap(), ModelStage::Staging);
        assert!(matches!("live".parse::<ModelStage>(), Err(RegistryError::UnknownStage(_))));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ModelStage::Production.to_string(), "Production");
        assert_eq!(ModelStage::None.as_str(), "None");
    }

    #[test]
    fn test_stage_serde_uses_display_names() {
        let json = serde_json::to_string(&ModelStage::Archived).unwrap();
        assert_eq!(json, "\"Archived\"");
        let stage: ModelStage = serde_json::from_str("\"Staging\"").unwrap();
        assert_eq!(stage, ModelStage::Staging);
    }
}
