//! Construction-time gate for rule trees.

use std::ops::Deref;

use crate::error::ConfigError;
use crate::rule::FieldRule;

/// A rule tree that passed construction checks.
///
/// Holds the rules unchanged; the check is a gate, not a transform.
#[derive(Debug, Clone, Default)]
pub struct RuleTree {
    rules: Vec<FieldRule>,
}

impl RuleTree {
    /// Checks every rule recursively and wraps the tree.
    ///
    /// Every rule needs a non-blank name. Stop options are a closed enum and
    /// need no check here; textual literals are rejected when definitions are
    /// parsed.
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, ConfigError> {
        check_level(&rules, "")?;
        Ok(Self { rules })
    }

    /// The checked rules.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Unwraps the rules.
    #[must_use]
    pub fn into_rules(self) -> Vec<FieldRule> {
        self.rules
    }
}

impl Deref for RuleTree {
    type Target = [FieldRule];

    fn deref(&self) -> &Self::Target {
        &self.rules
    }
}

fn check_level(rules: &[FieldRule], parent: &str) -> Result<(), ConfigError> {
    for (index, rule) in rules.iter().enumerate() {
        if rule.name.trim().is_empty() {
            let path = if parent.is_empty() {
                format!("[{index}]")
            } else {
                format!("{parent}.fields[{index}]")
            };
            return Err(ConfigError::MissingName { path });
        }

        if !rule.fields.is_empty() {
            let here = if parent.is_empty() {
                rule.name.clone()
            } else {
                format!("{parent}.fields[{index}]")
            };
            check_level(&rule.fields, &here)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_named_rules() {
        let tree = RuleTree::new(vec![
            FieldRule::new("name"),
            FieldRule::new("subs").fields(vec![FieldRule::new("bread")]),
        ])
        .unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[1].get_fields()[0].name(), "bread");
    }

    #[test]
    fn rejects_unnamed_root_rule() {
        let err = RuleTree::new(vec![FieldRule::new("name"), FieldRule::new("  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingName { ref path } if path == "[1]"));
    }

    #[test]
    fn rejects_unnamed_nested_rule() {
        let err = RuleTree::new(vec![FieldRule::new("subs").fields(vec![
            FieldRule::new("bread"),
            FieldRule::default(),
        ])])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingName { ref path } if path == "subs.fields[1]"));
    }

    #[test]
    fn reports_deep_location() {
        let err = RuleTree::new(vec![FieldRule::new("orders").fields(vec![
            FieldRule::new("lines").fields(vec![FieldRule::new("")]),
        ])])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingName { ref path } if path == "orders.fields[0].fields[0]")
        );
    }
}
