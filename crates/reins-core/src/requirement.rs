use crate::action::{ActionId, ActionRef, Catalog};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requirement
// ---------------------------------------------------------------------------

/// A declarative constraint governing one concrete action's timing,
/// ordering, and frequency.
///
/// All six knobs are explicit and defaulted; a file that sets none of them
/// is a no-op requirement. Validation happens in [`RequirementSet::compile`],
/// never during evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Requirement {
    /// The governed action. Never the wildcard.
    pub target: ActionId,
    /// 1-based step at which `target` must be the chosen action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_at_step: Option<u32>,
    /// Trigger set: immediately after any of these runs, `target` is
    /// mandatory for the next step. `*` matches any action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub force_after: Vec<ActionRef>,
    /// Prerequisites that must each have one prior successful invocation
    /// before `target` may ever be chosen.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only_after: Vec<ActionId>,
    /// Inclusive lower bound on successful invocations over the run.
    #[serde(default)]
    pub min_invocations: u32,
    /// Inclusive upper bound on successful invocations; `None` is unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_invocations: Option<u32>,
    /// If false, `target` may not be chosen on two adjacent steps.
    #[serde(default = "default_consecutive_allowed")]
    pub consecutive_allowed: bool,
}

fn default_consecutive_allowed() -> bool {
    true
}

impl Requirement {
    /// A requirement with every constraint at its default (no-op).
    pub fn new(target: ActionId) -> Self {
        Self {
            target,
            force_at_step: None,
            force_after: Vec::new(),
            only_after: Vec::new(),
            min_invocations: 0,
            max_invocations: None,
            consecutive_allowed: default_consecutive_allowed(),
        }
    }
}

// ---------------------------------------------------------------------------
// RequirementSet
// ---------------------------------------------------------------------------

/// A validated, compiled set of requirements bound to one catalog.
///
/// Construction performs every configuration check up front so the legality
/// evaluator can assume a well-formed set. Deliberately not deserializable:
/// the only way in is [`RequirementSet::compile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementSet {
    requirements: Vec<Requirement>,
    catalog: Catalog,
}

impl RequirementSet {
    pub fn compile(requirements: Vec<Requirement>, catalog: &Catalog) -> Result<Self> {
        for req in &requirements {
            validate_requirement(req, catalog)?;
        }
        validate_force_steps(&requirements)?;
        validate_force_triggers(&requirements)?;
        Ok(Self {
            requirements,
            catalog: catalog.clone(),
        })
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

fn validate_requirement(req: &Requirement, catalog: &Catalog) -> Result<()> {
    let target = req.target.to_string();

    if !catalog.contains(&req.target) {
        return Err(CoreError::UnknownAction {
            target: target.clone(),
            action: target,
        });
    }

    if let Some(max) = req.max_invocations {
        if req.min_invocations > max {
            return Err(CoreError::InvalidBounds {
                target,
                min: req.min_invocations,
                max,
            });
        }
    }

    if let Some(step) = req.force_at_step {
        if step < 1 {
            return Err(CoreError::InvalidForceStep { target });
        }
    }

    for prereq in &req.only_after {
        if !catalog.contains(prereq) {
            return Err(CoreError::UnknownAction {
                target,
                action: prereq.to_string(),
            });
        }
    }

    for trigger in &req.force_after {
        if let ActionRef::Action(id) = trigger {
            if !catalog.contains(id) {
                return Err(CoreError::UnknownAction {
                    target,
                    action: id.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// At most one requirement may claim a given step.
fn validate_force_steps(requirements: &[Requirement]) -> Result<()> {
    let mut claimed: Vec<(u32, &ActionId)> = Vec::new();
    for req in requirements {
        if let Some(step) = req.force_at_step {
            if let Some((_, first)) = claimed.iter().find(|(s, _)| *s == step) {
                return Err(CoreError::ConflictingForce {
                    step,
                    first: first.to_string(),
                    second: req.target.to_string(),
                });
            }
            claimed.push((step, &req.target));
        }
    }
    Ok(())
}

/// Two requirements with different targets whose trigger sets can fire off
/// the same action would both mandate the following step.
fn validate_force_triggers(requirements: &[Requirement]) -> Result<()> {
    for (i, a) in requirements.iter().enumerate() {
        for b in &requirements[i + 1..] {
            if a.target == b.target {
                continue;
            }
            for ta in &a.force_after {
                for tb in &b.force_after {
                    if ta.overlaps(tb) {
                        return Err(CoreError::OverlappingForceTriggers {
                            first: a.target.to_string(),
                            second: b.target.to_string(),
                            trigger: ta.to_string(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ActionId {
        ActionId::new(s).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![id("think"), id("search"), id("calc")]).unwrap()
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let req: Requirement = serde_yaml::from_str("target: think\n").unwrap();
        assert_eq!(req.target, id("think"));
        assert_eq!(req.force_at_step, None);
        assert!(req.force_after.is_empty());
        assert!(req.only_after.is_empty());
        assert_eq!(req.min_invocations, 0);
        assert_eq!(req.max_invocations, None);
        assert!(req.consecutive_allowed);
    }

    #[test]
    fn full_yaml_roundtrip() {
        let yaml = "target: think\nforce_at_step: 1\nforce_after: ['*']\nonly_after: [search]\nmin_invocations: 1\nmax_invocations: 3\nconsecutive_allowed: false\n";
        let req: Requirement = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(req.force_at_step, Some(1));
        assert_eq!(req.force_after, vec![ActionRef::Any]);
        assert_eq!(req.only_after, vec![id("search")]);
        assert_eq!(req.max_invocations, Some(3));
        assert!(!req.consecutive_allowed);

        let back = serde_yaml::to_string(&req).unwrap();
        let reparsed: Requirement = serde_yaml::from_str(&back).unwrap();
        assert_eq!(reparsed, req);
    }

    #[test]
    fn unknown_field_rejected() {
        let yaml = "target: think\nmax_invocation: 3\n";
        assert!(serde_yaml::from_str::<Requirement>(yaml).is_err());
    }

    #[test]
    fn wildcard_target_rejected_at_parse() {
        let err = serde_yaml::from_str::<Requirement>("target: '*'\n");
        assert!(err.is_err());
    }

    #[test]
    fn compile_accepts_well_formed_set() {
        let mut think = Requirement::new(id("think"));
        think.force_at_step = Some(1);
        think.min_invocations = 1;
        think.max_invocations = Some(3);
        think.consecutive_allowed = false;

        let mut search = Requirement::new(id("search"));
        search.only_after = vec![id("think")];
        search.min_invocations = 1;
        search.max_invocations = Some(2);

        let set = RequirementSet::compile(vec![think, search], &catalog()).unwrap();
        assert_eq!(set.requirements().len(), 2);
    }

    #[test]
    fn compile_rejects_inverted_bounds() {
        let mut req = Requirement::new(id("think"));
        req.min_invocations = 4;
        req.max_invocations = Some(2);
        assert!(matches!(
            RequirementSet::compile(vec![req], &catalog()),
            Err(CoreError::InvalidBounds { min: 4, max: 2, .. })
        ));
    }

    #[test]
    fn compile_rejects_zero_force_step() {
        let mut req = Requirement::new(id("think"));
        req.force_at_step = Some(0);
        assert!(matches!(
            RequirementSet::compile(vec![req], &catalog()),
            Err(CoreError::InvalidForceStep { .. })
        ));
    }

    #[test]
    fn compile_rejects_conflicting_force_steps() {
        let mut think = Requirement::new(id("think"));
        think.force_at_step = Some(2);
        let mut search = Requirement::new(id("search"));
        search.force_at_step = Some(2);

        let err = RequirementSet::compile(vec![think, search], &catalog()).unwrap_err();
        assert!(matches!(err, CoreError::ConflictingForce { step: 2, .. }));
    }

    #[test]
    fn compile_rejects_unknown_target() {
        let req = Requirement::new(id("teleport"));
        assert!(matches!(
            RequirementSet::compile(vec![req], &catalog()),
            Err(CoreError::UnknownAction { .. })
        ));
    }

    #[test]
    fn compile_rejects_unknown_prerequisite() {
        let mut req = Requirement::new(id("think"));
        req.only_after = vec![id("teleport")];
        assert!(matches!(
            RequirementSet::compile(vec![req], &catalog()),
            Err(CoreError::UnknownAction { .. })
        ));
    }

    #[test]
    fn compile_rejects_overlapping_triggers() {
        let mut think = Requirement::new(id("think"));
        think.force_after = vec![ActionRef::Action(id("search"))];
        let mut calc = Requirement::new(id("calc"));
        calc.force_after = vec![ActionRef::Any];

        let err = RequirementSet::compile(vec![think, calc], &catalog()).unwrap_err();
        assert!(matches!(err, CoreError::OverlappingForceTriggers { .. }));
    }

    #[test]
    fn same_target_triggers_do_not_conflict() {
        let mut a = Requirement::new(id("think"));
        a.force_after = vec![ActionRef::Action(id("search"))];
        let mut b = Requirement::new(id("think"));
        b.force_after = vec![ActionRef::Any];

        assert!(RequirementSet::compile(vec![a, b], &catalog()).is_ok());
    }
}
