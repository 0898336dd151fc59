//! Composition error taxonomy
//!
//! Fatal problems are accumulated during lowering and reported together
//! after every screen has been processed; warnings never block compilation
//! and are retrievable from the composer separately.

use thiserror::Error;

use crate::ir::ContractError;

/// A single fatal problem detected during lowering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionIssue {
    /// A bound property with no default was left unsupplied by the caller
    #[error("{macro_name}: required value for {target}.{property} was not supplied")]
    MissingRequiredBoundValue {
        macro_name: String,
        target: String,
        property: String,
    },

    /// A defined layout was invoked with other than exactly one content child
    #[error("layout {layout} expects exactly one content child, found {found}")]
    LayoutChildrenArity { layout: String, found: usize },

    /// The reserved content-slot placeholder appeared where no slot exists
    #[error("Children slot used outside a defined layout body ({context})")]
    ChildrenSlotOutsideDefinition { context: String },

    /// A defined component's body is neither a layout nor a component
    #[error("definition {name} has an invalid body; expected a layout or component")]
    InvalidDefinitionBody { name: String },
}

/// A non-fatal problem detected during lowering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionWarning {
    /// An optional bound property had no value; the property was omitted
    #[error("{macro_name}: no value bound for {target}.{property}; property omitted")]
    MissingBoundValue {
        macro_name: String,
        target: String,
        property: String,
    },

    /// The caller supplied an argument the macro body never consumed
    #[error("{macro_name}: argument {argument} is never used")]
    UnusedDefinitionArgument {
        macro_name: String,
        argument: String,
    },

    /// A definition name was declared twice; the later declaration wins
    #[error("definition {name} declared more than once; the last declaration wins")]
    DuplicateDefinition { name: String },
}

/// Composition failure, aggregating every detected problem
#[derive(Debug, Error)]
pub enum CompositionError {
    /// Component type names that are neither built-in nor defined
    #[error(
        "undefined components used: {}. Define them as components or layouts before use.",
        names.join(", ")
    )]
    UndefinedComponents { names: Vec<String> },

    /// One or more semantic errors accumulated during lowering
    #[error("composition failed with {} error(s): {}", issues.len(), format_issues(issues))]
    Failed { issues: Vec<CompositionIssue> },

    /// The produced contract violated its own structural schema
    #[error("generated contract failed validation: {0}")]
    Contract(#[from] ContractError),
}

fn format_issues(issues: &[CompositionIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_components_lists_all_names() {
        let err = CompositionError::UndefinedComponents {
            names: vec!["Foo".to_string(), "Zap".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("Foo"));
        assert!(message.contains("Zap"));
        assert!(message.contains("Define them"));
    }

    #[test]
    fn test_failed_enumerates_every_issue() {
        let err = CompositionError::Failed {
            issues: vec![
                CompositionIssue::LayoutChildrenArity {
                    layout: "Shell".to_string(),
                    found: 3,
                },
                CompositionIssue::InvalidDefinitionBody {
                    name: "Broken".to_string(),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("2 error(s)"));
        assert!(message.contains("Shell"));
        assert!(message.contains("Broken"));
    }
}
