//! Execution planner - holds the operations of a deploy

use crate::resource::{BoxedOperation, Operation};

/// Operations to reconcile on every host, in declaration order
#[derive(Debug)]
pub struct ExecutionPlan {
    pub operations: Vec<BoxedOperation>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Append an operation
    pub fn add(&mut self, operation: BoxedOperation) {
        self.operations.push(operation);
    }

    /// Filter plan to only include operations matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Operation) -> bool,
    {
        Self {
            operations: self
                .operations
                .into_iter()
                .filter(|op| predicate(op.as_ref()))
                .collect(),
        }
    }

    /// Filter plan to only include operations matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (operation_type, name) = parse_target(t);
                self.filter(|op| matches_filter(op, operation_type.as_deref(), name.as_deref()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        None => (Some(target.to_string()), None),
        Some((kind, name)) => (Some(kind.to_string()), Some(name.to_string())),
    }
}

/// Check if an operation matches the filter criteria
fn matches_filter(
    operation: &dyn Operation,
    operation_type: Option<&str>,
    name: Option<&str>,
) -> bool {
    if let Some(ot) = operation_type {
        // Allow common aliases
        let matches_type = match ot {
            "packages" | "pkg" => operation.operation_type() == "packages",
            "services" => operation.operation_type() == "service",
            "rpms" => operation.operation_type() == "rpm",
            "repos" | "repositories" => operation.operation_type() == "repo",
            _ => operation.operation_type() == ot,
        };
        if !matches_type {
            return false;
        }
    }

    if let Some(n) = name
        && !operation.id().contains(n)
    {
        return false;
    }

    true
}
