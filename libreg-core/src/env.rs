//! The interface to the build environment that dependencies get applied to.

use libreg_types::{GroupKey, LibraryName, ToolName};

/// Global state of a build, e.g. the libraries being built and the tools that have configured
/// include paths and linker flags.
///
/// Implementations own all of the state. The [`Registrar`](crate::registrar::Registrar) only ever
/// calls into an [`Environment`] in a well defined order, so implementations may be order
/// sensitive, e.g. a tool can depend on setup done by an earlier tool.
pub trait Environment {
    /// Declare `name` as a library to build and link against.
    fn register_library(&mut self, name: &LibraryName) -> Result<(), anyhow::Error>;

    /// Apply the tool `name`, mutating the environment.
    fn apply_tool(&mut self, name: &ToolName) -> Result<(), anyhow::Error>;

    /// Look up the libraries in the group `key`.
    ///
    /// Returns `Ok(None)` if the group does not exist.
    fn resolve_group(&mut self, key: &GroupKey) -> Result<Option<Vec<LibraryName>>, anyhow::Error>;

    /// Register a batch of externally resolved libraries.
    fn register_external_libraries(&mut self, names: &[LibraryName]) -> Result<(), anyhow::Error>;
}
