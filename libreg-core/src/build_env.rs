//! An in-memory build environment backed by a [`Manifest`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use libreg_cfg::{Config, ConfigSet};
use libreg_types::{GroupKey, LibraryName, ToolName};

use crate::defs::{Manifest, TOOL_SUFFIX};
use crate::env::Environment;
use crate::registrar::Registrar;

pub static STRICT_TOOLS: Config<bool> = Config::new(
    "strict_tools",
    "Whether applying a tool that no library in the manifest provides is an error.",
    true,
);

/// Accumulates the libraries, tools, and external libraries of a build.
///
/// Applying a tool pulls in the library that provides it, along with that library's own
/// dependencies. Every operation is idempotent, applying a tool or registering a library that
/// is already part of the environment does nothing. A tool that fails to apply leaves no trace,
/// everything it pulled in is removed so applying it again fails again.
#[derive(Debug)]
pub struct BuildEnvironment {
    /// Declarations of all known libraries.
    manifest: Arc<Manifest>,
    /// Tool name to the library it provides.
    tool_index: BTreeMap<ToolName, LibraryName>,
    /// Whether unknown tools are an error, or get recorded as opaque.
    strict_tools: bool,

    /// Libraries registered to build and link, in registration order.
    libraries: Vec<LibraryName>,
    /// Tools applied, in the order they were first applied.
    tools: Vec<ToolName>,
    /// Fast lookup for `tools`.
    applied: BTreeSet<ToolName>,
    /// Tools that no library in the manifest provides.
    opaque_tools: Vec<ToolName>,
    /// Externally resolved libraries, in registration order.
    external_libraries: Vec<LibraryName>,
}

impl BuildEnvironment {
    pub fn new(manifest: Arc<Manifest>, configs: &ConfigSet) -> Result<Self, anyhow::Error> {
        let suffix = TOOL_SUFFIX.read(configs);
        let tool_index = manifest.tools(&suffix)?;
        let strict_tools = STRICT_TOOLS.read(configs);

        Ok(BuildEnvironment {
            manifest,
            tool_index,
            strict_tools,
            libraries: Vec::new(),
            tools: Vec::new(),
            applied: BTreeSet::new(),
            opaque_tools: Vec::new(),
            external_libraries: Vec::new(),
        })
    }

    pub fn libraries(&self) -> &[LibraryName] {
        &self.libraries[..]
    }

    pub fn tools(&self) -> &[ToolName] {
        &self.tools[..]
    }

    pub fn opaque_tools(&self) -> &[ToolName] {
        &self.opaque_tools[..]
    }

    pub fn external_libraries(&self) -> &[LibraryName] {
        &self.external_libraries[..]
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            libraries: self.libraries.len(),
            tools: self.tools.len(),
            opaque_tools: self.opaque_tools.len(),
            external_libraries: self.external_libraries.len(),
        }
    }

    /// Undo everything recorded since `checkpoint`, all of our lists are append only.
    fn rollback(&mut self, checkpoint: Checkpoint) {
        for tool in self.tools.drain(checkpoint.tools..) {
            self.applied.remove(&tool);
        }
        self.libraries.truncate(checkpoint.libraries);
        self.opaque_tools.truncate(checkpoint.opaque_tools);
        self.external_libraries
            .truncate(checkpoint.external_libraries);
    }

    fn apply_new_tool(&mut self, name: &ToolName) -> Result<(), anyhow::Error> {
        // Marking the tool before applying it is what keeps a cyclic manifest from recursing
        // forever.
        self.applied.insert(name.clone());
        self.tools.push(name.clone());

        let Some(library) = self.tool_index.get(name).cloned() else {
            if self.strict_tools {
                anyhow::bail!("no library in the manifest provides tool '{name}'");
            }
            tracing::warn!(%name, "no library provides tool, treating it as opaque");
            self.opaque_tools.push(name.clone());
            return Ok(());
        };

        let spec = self.manifest.spec(&library)?;
        Registrar
            .apply(&spec, self, false)
            .with_context(|| format!("tool '{name}' failed to apply library '{library}'"))?;
        Ok(())
    }
}

/// Lengths of the [`BuildEnvironment`] lists before a tool started applying.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    libraries: usize,
    tools: usize,
    opaque_tools: usize,
    external_libraries: usize,
}

impl Environment for BuildEnvironment {
    fn register_library(&mut self, name: &LibraryName) -> Result<(), anyhow::Error> {
        if self.libraries.contains(name) {
            tracing::trace!(%name, "library already registered");
            return Ok(());
        }
        self.libraries.push(name.clone());
        Ok(())
    }

    fn apply_tool(&mut self, name: &ToolName) -> Result<(), anyhow::Error> {
        if self.applied.contains(name) {
            tracing::trace!(%name, "tool already applied");
            return Ok(());
        }

        let checkpoint = self.checkpoint();
        let result = self.apply_new_tool(name);
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    fn resolve_group(&mut self, key: &GroupKey) -> Result<Option<Vec<LibraryName>>, anyhow::Error> {
        Ok(self.manifest.groups.get(key).cloned())
    }

    fn register_external_libraries(&mut self, names: &[LibraryName]) -> Result<(), anyhow::Error> {
        for name in names {
            if !self.external_libraries.contains(name) {
                self.external_libraries.push(name.clone());
            }
        }
        Ok(())
    }
}

impl fmt::Display for BuildEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn line<T: fmt::Display>(f: &mut fmt::Formatter<'_>, title: &str, items: &[T]) -> fmt::Result {
            write!(f, "{title}:")?;
            for item in items {
                write!(f, " {item}")?;
            }
            writeln!(f)
        }

        line(f, "libraries", &self.libraries[..])?;
        line(f, "tools", &self.tools[..])?;
        if !self.opaque_tools.is_empty() {
            line(f, "opaque tools", &self.opaque_tools[..])?;
        }
        line(f, "external libraries", &self.external_libraries[..])
    }
}
