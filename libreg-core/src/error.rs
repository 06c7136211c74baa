//! Errors returned when building or applying a [`DependencySpec`].
//!
//! [`DependencySpec`]: crate::spec::DependencySpec

use std::fmt;

use libreg_types::{GroupKey, LibraryName, NameError, ToolName};

/// Error constructing a [`DependencySpec`](crate::spec::DependencySpec).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("dependency '{name}' is listed twice in a row at position {index}")]
    ConsecutiveDuplicate { index: usize, name: ToolName },
}

/// A single step the [`Registrar`](crate::registrar::Registrar) runs against an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    RegisterLibrary(LibraryName),
    ApplyTool(ToolName),
    ResolveGroup(GroupKey),
    RegisterExternal(GroupKey),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::RegisterLibrary(name) => write!(f, "registering library '{name}'"),
            Step::ApplyTool(name) => write!(f, "applying tool '{name}'"),
            Step::ResolveGroup(key) => write!(f, "resolving group '{key}'"),
            Step::RegisterExternal(key) => write!(f, "registering libraries of group '{key}'"),
        }
    }
}

/// Error applying a [`DependencySpec`](crate::spec::DependencySpec) to an environment.
///
/// `index` is the position of the failing step in the sequence of steps the registrar runs,
/// starting at 0. Nothing after that step was run.
#[derive(Debug, thiserror::Error)]
pub enum RegistrarError {
    #[error("invalid dependency spec: {reason}")]
    InvalidSpec { reason: String },
    #[error("step {index}: external library group '{group}' could not be resolved")]
    UnresolvedGroup { index: usize, group: GroupKey },
    #[error("step {index}: failed {step}")]
    ToolApplicationFailed {
        index: usize,
        step: Step,
        #[source]
        source: anyhow::Error,
    },
}

impl From<SpecError> for RegistrarError {
    fn from(err: SpecError) -> Self {
        RegistrarError::InvalidSpec {
            reason: err.to_string(),
        }
    }
}
