use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved spelling for the "any action" wildcard in trigger sets.
pub const WILDCARD: &str = "*";

// ---------------------------------------------------------------------------
// ActionId
// ---------------------------------------------------------------------------

/// The name of one concrete capability (a tool) the agent may invoke.
///
/// Slugs are lowercase alphanumeric with hyphens or underscores. The
/// wildcard spelling `*` is never a valid `ActionId`; it only appears in
/// trigger sets as [`ActionRef::Any`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionId(String);

impl ActionId {
    pub fn new(slug: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        let valid = !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(CoreError::InvalidSlug(slug));
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ActionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ActionId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ActionId> for String {
    fn from(id: ActionId) -> String {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ActionRef
// ---------------------------------------------------------------------------

/// A reference used inside requirement trigger sets: either one concrete
/// action or the wildcard `*`, meaning "whichever action just ran".
///
/// Matching is a membership test, never runtime type inspection: the
/// wildcard matches every concrete action and nothing else (a finalize step
/// runs no action, so nothing triggers off it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionRef {
    Action(ActionId),
    Any,
}

impl ActionRef {
    pub fn matches(&self, action: &ActionId) -> bool {
        match self {
            ActionRef::Action(id) => id == action,
            ActionRef::Any => true,
        }
    }

    /// True if two refs can ever match the same concrete action.
    pub fn overlaps(&self, other: &ActionRef) -> bool {
        match (self, other) {
            (ActionRef::Any, _) | (_, ActionRef::Any) => true,
            (ActionRef::Action(a), ActionRef::Action(b)) => a == b,
        }
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionRef::Action(id) => id.fmt(f),
            ActionRef::Any => f.write_str(WILDCARD),
        }
    }
}

impl std::str::FromStr for ActionRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        if s == WILDCARD {
            Ok(ActionRef::Any)
        } else {
            Ok(ActionRef::Action(s.parse()?))
        }
    }
}

impl TryFrom<String> for ActionRef {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ActionRef> for String {
    fn from(r: ActionRef) -> String {
        r.to_string()
    }
}

impl From<ActionId> for ActionRef {
    fn from(id: ActionId) -> Self {
        ActionRef::Action(id)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The registry of actions known to one run, built once before the run
/// starts. Order is preserved so offers are presented deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    actions: Vec<ActionId>,
}

impl Catalog {
    pub fn new(actions: Vec<ActionId>) -> Result<Self> {
        let mut catalog = Self::default();
        for action in actions {
            catalog.register(action)?;
        }
        Ok(catalog)
    }

    pub fn register(&mut self, action: ActionId) -> Result<()> {
        if self.actions.contains(&action) {
            return Err(CoreError::DuplicateAction(action.to_string()));
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn contains(&self, action: &ActionId) -> bool {
        self.actions.contains(action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionId> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
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

    #[test]
    fn slug_validation() {
        assert!(ActionId::new("think").is_ok());
        assert!(ActionId::new("wiki_search-2").is_ok());
        assert!(ActionId::new("").is_err());
        assert!(ActionId::new("Think").is_err());
        assert!(ActionId::new("has space").is_err());
        assert!(ActionId::new("*").is_err());
    }

    #[test]
    fn wildcard_parses_to_any() {
        let r: ActionRef = "*".parse().unwrap();
        assert_eq!(r, ActionRef::Any);
        assert!(r.matches(&id("think")));
        assert!(r.matches(&id("search")));
    }

    #[test]
    fn concrete_ref_matches_only_itself() {
        let r: ActionRef = "think".parse().unwrap();
        assert!(r.matches(&id("think")));
        assert!(!r.matches(&id("search")));
    }

    #[test]
    fn ref_overlap() {
        let think = ActionRef::Action(id("think"));
        let search = ActionRef::Action(id("search"));
        assert!(think.overlaps(&think.clone()));
        assert!(!think.overlaps(&search));
        assert!(ActionRef::Any.overlaps(&search));
        assert!(think.overlaps(&ActionRef::Any));
    }

    #[test]
    fn catalog_rejects_duplicates() {
        let mut catalog = Catalog::default();
        catalog.register(id("think")).unwrap();
        assert!(matches!(
            catalog.register(id("think")),
            Err(CoreError::DuplicateAction(_))
        ));
    }

    #[test]
    fn catalog_preserves_order() {
        let catalog = Catalog::new(vec![id("think"), id("search"), id("calc")]).unwrap();
        let order: Vec<&str> = catalog.iter().map(ActionId::as_str).collect();
        assert_eq!(order, vec!["think", "search", "calc"]);
    }

    #[test]
    fn action_ref_yaml_roundtrip() {
        let refs: Vec<ActionRef> = serde_yaml::from_str("[think, '*']").unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], ActionRef::Action(id("think")));
        assert_eq!(refs[1], ActionRef::Any);
        let back = serde_yaml::to_string(&refs).unwrap();
        assert!(back.contains("think"));
        assert!(back.contains("'*'"));
    }
}
