//! Bucket notification registration model

use serde::{Deserialize, Serialize};

/// A single binding from a bucket to a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNotification {
    /// Function reference (name or ARN, depending on the platform)
    pub function: String,
}

impl FunctionNotification {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
        }
    }
}

/// Ordered function bindings attached to a bucket.
///
/// A function appears at most once; [`Notifications::add`] checks membership
/// before appending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifications {
    pub functions: Vec<FunctionNotification>,
}

impl Notifications {
    /// Registration containing exactly one function
    pub fn with_function(function: impl Into<String>) -> Self {
        Self {
            functions: vec![FunctionNotification::new(function)],
        }
    }

    /// Whether the function is already bound
    pub fn contains(&self, function: &str) -> bool {
        self.functions.iter().any(|n| n.function == function)
    }

    /// Append the function unless it is already bound.
    ///
    /// Returns `true` if the registration changed.
    pub fn add(&mut self, function: &str) -> bool {
        if self.contains(function) {
            return false;
        }
        self.functions.push(FunctionNotification::new(function));
        true
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
