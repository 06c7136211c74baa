//! An [`Environment`] that records every call made into it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use libreg_types::{GroupKey, LibraryName, ToolName};

use crate::env::Environment;

/// A single call made into a [`RecordingEnvironment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RegisterLibrary(LibraryName),
    ApplyTool(ToolName),
    ResolveGroup(GroupKey),
    RegisterExternal(Vec<LibraryName>),
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::RegisterLibrary(name) => write!(f, "register-library {name}"),
            Call::ApplyTool(name) => write!(f, "apply-tool {name}"),
            Call::ResolveGroup(key) => write!(f, "resolve-group {key}"),
            Call::RegisterExternal(names) => {
                write!(f, "register-external")?;
                for name in names {
                    write!(f, " {name}")?;
                }
                Ok(())
            }
        }
    }
}

/// Records the calls made into it without applying anything.
///
/// Groups that should resolve are provided up front, and failures can be injected into any of
/// the calls. Failing calls are still recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingEnvironment {
    calls: Vec<Call>,
    groups: BTreeMap<GroupKey, Vec<LibraryName>>,
    failing_tools: BTreeSet<ToolName>,
    fail_register: bool,
    fail_resolve: bool,
    fail_register_external: bool,
}

impl RecordingEnvironment {
    pub fn new() -> Self {
        RecordingEnvironment::default()
    }

    /// Make the group `key` resolve to `libraries`.
    pub fn with_group(mut self, key: GroupKey, libraries: Vec<LibraryName>) -> Self {
        self.groups.insert(key, libraries);
        self
    }

    /// Make every group in `groups` resolvable.
    pub fn with_groups(mut self, groups: &BTreeMap<GroupKey, Vec<LibraryName>>) -> Self {
        self.groups
            .extend(groups.iter().map(|(key, libs)| (key.clone(), libs.clone())));
        self
    }

    /// Fail whenever the tool `name` is applied.
    pub fn fail_on_tool(mut self, name: ToolName) -> Self {
        self.failing_tools.insert(name);
        self
    }

    /// Fail whenever a library gets registered.
    pub fn fail_on_register(mut self) -> Self {
        self.fail_register = true;
        self
    }

    /// Fail whenever a group gets resolved, as opposed to reporting it missing.
    pub fn fail_on_resolve(mut self) -> Self {
        self.fail_resolve = true;
        self
    }

    /// Fail whenever a batch of external libraries gets registered.
    pub fn fail_on_register_external(mut self) -> Self {
        self.fail_register_external = true;
        self
    }

    /// The calls made so far, in order.
    pub fn calls(&self) -> &[Call] {
        &self.calls[..]
    }

    pub fn into_calls(self) -> Vec<Call> {
        self.calls
    }
}

impl Environment for RecordingEnvironment {
    fn register_library(&mut self, name: &LibraryName) -> Result<(), anyhow::Error> {
        self.calls.push(Call::RegisterLibrary(name.clone()));
        if self.fail_register {
            anyhow::bail!("registration of '{name}' rejected");
        }
        Ok(())
    }

    fn apply_tool(&mut self, name: &ToolName) -> Result<(), anyhow::Error> {
        self.calls.push(Call::ApplyTool(name.clone()));
        if self.failing_tools.contains(name) {
            anyhow::bail!("tool '{name}' failed to apply");
        }
        Ok(())
    }

    fn resolve_group(&mut self, key: &GroupKey) -> Result<Option<Vec<LibraryName>>, anyhow::Error> {
        self.calls.push(Call::ResolveGroup(key.clone()));
        if self.fail_resolve {
            anyhow::bail!("configuration unavailable");
        }
        Ok(self.groups.get(key).cloned())
    }

    fn register_external_libraries(&mut self, names: &[LibraryName]) -> Result<(), anyhow::Error> {
        self.calls.push(Call::RegisterExternal(names.to_vec()));
        if self.fail_register_external {
            anyhow::bail!("external libraries rejected");
        }
        Ok(())
    }
}
