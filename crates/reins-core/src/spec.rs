use crate::action::Catalog;
use crate::error::{CoreError, Result};
use crate::requirement::{Requirement, RequirementSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// RunSpec
// ---------------------------------------------------------------------------

/// The externally persisted run configuration: an ordered list of
/// requirements plus the step budget and retry limit. This is the only file
/// format the core knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSpec {
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Maximum number of steps (actions + the finalize step) per run.
    pub step_budget: u32,
    /// Rejected or failed proposals tolerated per step before the run aborts.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// Timeout applied to each external call (proposal, tool execution).
    #[serde(default = "default_step_timeout_seconds")]
    pub step_timeout_seconds: u64,
}

fn default_retry_limit() -> u32 {
    3
}

fn default_step_timeout_seconds() -> u64 {
    60
}

impl RunSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let spec: RunSpec = serde_yaml::from_str(yaml)?;
        Ok(spec)
    }

    /// Validate the spec against a catalog and compile the requirement set.
    /// Every configuration error is reported here, before the run starts.
    pub fn compile(&self, catalog: &Catalog) -> Result<RequirementSet> {
        if self.step_budget < 1 {
            return Err(CoreError::InvalidStepBudget);
        }
        RequirementSet::compile(self.requirements.clone(), catalog)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_seconds)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionId;
    use std::io::Write;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            ActionId::new("think").unwrap(),
            ActionId::new("search").unwrap(),
        ])
        .unwrap()
    }

    const SPEC_YAML: &str = "\
requirements:
  - target: think
    force_at_step: 1
    min_invocations: 1
    max_invocations: 3
    consecutive_allowed: false
  - target: search
    only_after: [think]
    min_invocations: 1
    max_invocations: 2
step_budget: 12
";

    #[test]
    fn yaml_parse_with_defaults() {
        let spec = RunSpec::from_yaml(SPEC_YAML).unwrap();
        assert_eq!(spec.requirements.len(), 2);
        assert_eq!(spec.step_budget, 12);
        assert_eq!(spec.retry_limit, 3);
        assert_eq!(spec.step_timeout_seconds, 60);
        assert_eq!(spec.step_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn compile_validates_budget() {
        let mut spec = RunSpec::from_yaml(SPEC_YAML).unwrap();
        spec.step_budget = 0;
        assert!(matches!(
            spec.compile(&catalog()),
            Err(CoreError::InvalidStepBudget)
        ));
    }

    #[test]
    fn compile_surfaces_requirement_errors() {
        let yaml = "\
requirements:
  - target: think
    min_invocations: 5
    max_invocations: 1
step_budget: 4
";
        let spec = RunSpec::from_yaml(yaml).unwrap();
        assert!(matches!(
            spec.compile(&catalog()),
            Err(CoreError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn unknown_top_level_field_rejected() {
        let yaml = "step_budget: 4\nmax_steps: 9\n";
        assert!(RunSpec::from_yaml(yaml).is_err());
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(SPEC_YAML.as_bytes()).unwrap();
        let spec = RunSpec::load(f.path()).unwrap();
        assert_eq!(spec.step_budget, 12);
        spec.compile(&catalog()).unwrap();
    }
}
