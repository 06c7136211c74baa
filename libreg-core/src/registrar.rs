//! Applies a [`DependencySpec`] to an [`Environment`].

use crate::env::Environment;
use crate::error::{RegistrarError, Step};
use crate::spec::DependencySpec;

/// Applies [`DependencySpec`]s to [`Environment`]s.
///
/// A [`Registrar`] holds no state, so a single instance can be reused for any number of specs
/// and environments.
#[derive(Debug, Default, Clone, Copy)]
pub struct Registrar;

/// Acknowledgement that a [`DependencySpec`] was fully applied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Whether the library itself was registered.
    pub registered_library: bool,
    /// Number of tools applied.
    pub tools: usize,
    /// Number of external library groups registered.
    pub groups: usize,
}

impl Registrar {
    /// Apply `spec` to `env`.
    ///
    /// Steps run in this order, stopping at the first failure:
    ///
    /// 1. Unless `deps_only` is set, register the library itself.
    /// 2. Apply every dependency, in declared order.
    /// 3. Resolve every external library group and register its libraries.
    ///
    /// # Errors
    ///
    /// * [`RegistrarError::InvalidSpec`] if `deps_only` is not set and `spec` has no library
    ///   name. Nothing is applied.
    /// * [`RegistrarError::UnresolvedGroup`] if `env` does not know an external library group.
    /// * [`RegistrarError::ToolApplicationFailed`] if any call into `env` fails.
    pub fn apply<E: Environment + ?Sized>(
        &self,
        spec: &DependencySpec,
        env: &mut E,
        deps_only: bool,
    ) -> Result<Applied, RegistrarError> {
        let mut applied = Applied::default();
        let mut index = 0;

        if !deps_only {
            let Some(library) = spec.library_name() else {
                return Err(RegistrarError::InvalidSpec {
                    reason: "a library name is required unless only dependencies are applied"
                        .to_string(),
                });
            };
            tracing::debug!(index, %library, "registering library");
            env.register_library(library)
                .map_err(|source| RegistrarError::ToolApplicationFailed {
                    index,
                    step: Step::RegisterLibrary(library.clone()),
                    source,
                })?;
            applied.registered_library = true;
            index += 1;
        }

        for tool in spec.dependencies() {
            tracing::debug!(index, %tool, "applying tool");
            env.apply_tool(tool)
                .map_err(|source| RegistrarError::ToolApplicationFailed {
                    index,
                    step: Step::ApplyTool(tool.clone()),
                    source,
                })?;
            applied.tools += 1;
            index += 1;
        }

        for group in spec.external_library_groups() {
            tracing::debug!(index, %group, "resolving external library group");
            let libraries = match env.resolve_group(group) {
                Ok(Some(libraries)) => libraries,
                Ok(None) => {
                    return Err(RegistrarError::UnresolvedGroup {
                        index,
                        group: group.clone(),
                    });
                }
                Err(source) => {
                    return Err(RegistrarError::ToolApplicationFailed {
                        index,
                        step: Step::ResolveGroup(group.clone()),
                        source,
                    });
                }
            };
            env.register_external_libraries(&libraries[..])
                .map_err(|source| RegistrarError::ToolApplicationFailed {
                    index,
                    step: Step::RegisterExternal(group.clone()),
                    source,
                })?;
            applied.groups += 1;
            index += 1;
        }

        tracing::info!(
            library = ?spec.library_name().map(|name| name.as_str()),
            deps_only,
            ?applied,
            "applied dependency spec"
        );
        Ok(applied)
    }
}

/// Always `true`, the dependency declaration module is built in.
///
/// Lets an orchestrator check that a module is registrable before calling [`apply`].
pub fn module_available() -> bool {
    true
}

/// Shorthand for [`Registrar::apply`].
pub fn apply<E: Environment + ?Sized>(
    spec: &DependencySpec,
    env: &mut E,
    deps_only: bool,
) -> Result<Applied, RegistrarError> {
    Registrar.apply(spec, env, deps_only)
}
