use std::collections::BTreeMap;

use anyhow::Context;
use libreg_cfg::Config;
use libreg_types::{GroupKey, LibraryName, ToolName};
use serde::Deserialize;

use crate::spec::DependencySpec;

pub static MANIFEST_FILENAME: Config<&'static str> = Config::new(
    "manifest_filename",
    "The filename of the manifest that declares libraries and their dependencies.",
    "libreg.toml",
);

pub static TOOL_SUFFIX: Config<&'static str> = Config::new(
    "tool_suffix",
    "Suffix appended to a library's name to get the name of the tool that provides it.",
    "Lib",
);

/// Definition of every library in a workspace, parsed from a [`MANIFEST_FILENAME`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Named groups of external libraries, e.g. platform specific libraries.
    #[serde(default)]
    pub groups: BTreeMap<GroupKey, Vec<LibraryName>>,
    /// The libraries declared in this workspace.
    #[serde(default)]
    pub libraries: BTreeMap<LibraryName, LibrarySpec>,
}

impl Manifest {
    pub fn from_toml(raw: &str) -> Result<Self, anyhow::Error> {
        let manifest = toml::from_str(raw)?;
        Ok(manifest)
    }

    /// Build the [`DependencySpec`] for the library `name`.
    pub fn spec(&self, name: &LibraryName) -> Result<DependencySpec, anyhow::Error> {
        let library = self
            .libraries
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("library '{name}' is not declared"))?;
        let spec = DependencySpec::new(
            Some(name.clone()),
            library.dependencies.clone(),
            library.external_groups.clone(),
        )
        .with_context(|| format!("invalid dependencies for library '{name}'"))?;
        Ok(spec)
    }

    /// Name of the tool that provides the library `name`.
    pub fn tool_name(&self, name: &LibraryName, suffix: &str) -> Result<ToolName, anyhow::Error> {
        match self.libraries.get(name).and_then(|lib| lib.tool.clone()) {
            Some(tool) => Ok(tool),
            None => Ok(ToolName::for_library(name, suffix)?),
        }
    }

    /// Map of every tool name to the library that provides it.
    ///
    /// # Errors
    ///
    /// * If two libraries are provided by the same tool.
    pub fn tools(&self, suffix: &str) -> Result<BTreeMap<ToolName, LibraryName>, anyhow::Error> {
        let mut tools = BTreeMap::new();
        for name in self.libraries.keys() {
            let tool = self.tool_name(name, suffix)?;
            if let Some(prev) = tools.insert(tool.clone(), name.clone()) {
                anyhow::bail!("tool '{tool}' is provided by both '{prev}' and '{name}'");
            }
        }
        Ok(tools)
    }
}

/// A single library within a [`Manifest`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibrarySpec {
    /// Name of the tool that provides this library, defaults to `<name><TOOL_SUFFIX>`.
    pub tool: Option<ToolName>,
    /// Tools this library depends on, applied in order.
    #[serde(default)]
    pub dependencies: Vec<ToolName>,
    /// Keys into [`Manifest::groups`] of external libraries this library links against.
    #[serde(default)]
    pub external_groups: Vec<GroupKey>,
}
