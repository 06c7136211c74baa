//! Drives applying libraries from a workspace manifest.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use libreg_cfg::{Config, ConfigSet};
use libreg_types::LibraryName;

use crate::build_env::BuildEnvironment;
use crate::defs::{MANIFEST_FILENAME, Manifest};
use crate::recording::{Call, RecordingEnvironment};
use crate::registrar::{Registrar, module_available};

pub static DEPS_ONLY: Config<bool> = Config::new(
    "deps_only",
    "Apply only the dependencies of a library, without registering the library itself.",
    false,
);

/// Configuration for creating an [`Engine`].
pub struct EngineConfig {
    /// Root directory of the workspace, where the manifest lives.
    pub workspace_dir: PathBuf,
    /// Dynamic configs for `libreg`.
    pub configs: ConfigSet,
}

#[derive(Debug)]
pub struct Engine {
    /// Declarations of every library in the workspace.
    manifest: Arc<Manifest>,
    /// Dynamic configs for `libreg`.
    configs: ConfigSet,
}

impl Engine {
    /// Create an [`Engine`] by reading the manifest in the workspace directory.
    pub fn new(config: EngineConfig) -> Result<Self, anyhow::Error> {
        let EngineConfig {
            workspace_dir,
            configs,
        } = config;

        let path = workspace_dir.join(MANIFEST_FILENAME.read(&configs).as_str());
        tracing::info!(?path, "reading manifest");
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        let manifest = Manifest::from_toml(&raw)
            .with_context(|| format!("parsing manifest {}", path.display()))?;

        Ok(Engine::from_manifest(manifest, configs))
    }

    pub fn from_manifest(manifest: Manifest, configs: ConfigSet) -> Self {
        tracing::info!(libraries = manifest.libraries.len(), "created engine");
        Engine {
            manifest: Arc::new(manifest),
            configs,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn configs(&self) -> &ConfigSet {
        &self.configs
    }

    /// Whether libraries are applied in deps-only mode by default.
    pub fn deps_only(&self) -> bool {
        DEPS_ONLY.read(&self.configs)
    }

    /// Apply `library` to a fresh [`BuildEnvironment`], returning the environment.
    pub fn apply(
        &self,
        library: &LibraryName,
        deps_only: bool,
    ) -> Result<BuildEnvironment, anyhow::Error> {
        let spec = self.manifest.spec(library)?;
        let mut env = BuildEnvironment::new(Arc::clone(&self.manifest), &self.configs)?;
        Registrar
            .apply(&spec, &mut env, deps_only)
            .with_context(|| format!("applying library '{library}'"))?;
        Ok(env)
    }

    /// Returns the calls applying `library` would make, without following any tools.
    pub fn plan(&self, library: &LibraryName, deps_only: bool) -> Result<Vec<Call>, anyhow::Error> {
        let spec = self.manifest.spec(library)?;
        let mut env = RecordingEnvironment::new().with_groups(&self.manifest.groups);
        Registrar
            .apply(&spec, &mut env, deps_only)
            .with_context(|| format!("planning library '{library}'"))?;
        Ok(env.into_calls())
    }

    /// Whether `library` can be applied.
    pub fn check(&self, library: &LibraryName) -> bool {
        module_available() && self.manifest.libraries.contains_key(library)
    }
}
