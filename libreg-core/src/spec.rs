//! The declared dependencies of a single library.

use compact_str::CompactString;
use libreg_types::{GroupKey, LibraryName, ToolName};

use crate::error::SpecError;

/// An immutable, ordered declaration of everything a library needs from a build environment.
///
/// Each revision of a library's dependencies is a new [`DependencySpec`], see
/// [`DependencySpec::revise`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Library that gets registered as a build target, unless only its dependencies are applied.
    library_name: Option<LibraryName>,
    /// Tools to apply, in the exact order they must be applied.
    dependencies: Box<[ToolName]>,
    /// Groups of libraries resolved from the environment's own configuration.
    external_library_groups: Box<[GroupKey]>,
}

impl DependencySpec {
    /// Create a new [`DependencySpec`].
    ///
    /// # Errors
    ///
    /// * If the same dependency is listed twice in a row.
    pub fn new(
        library_name: Option<LibraryName>,
        dependencies: Vec<ToolName>,
        external_library_groups: Vec<GroupKey>,
    ) -> Result<Self, SpecError> {
        if let Some(index) = dependencies.windows(2).position(|pair| pair[0] == pair[1]) {
            return Err(SpecError::ConsecutiveDuplicate {
                index: index + 1,
                name: dependencies[index].clone(),
            });
        }

        Ok(DependencySpec {
            library_name,
            dependencies: dependencies.into_boxed_slice(),
            external_library_groups: external_library_groups.into_boxed_slice(),
        })
    }

    /// Returns a new [`DependencySpecBuilder`].
    pub fn builder() -> DependencySpecBuilder {
        DependencySpecBuilder::default()
    }

    /// Returns a [`DependencySpecBuilder`] seeded with the contents of this spec, for creating a
    /// new revision. `self` is left untouched.
    pub fn revise(&self) -> DependencySpecBuilder {
        DependencySpecBuilder {
            library_name: self
                .library_name
                .as_ref()
                .map(|name| CompactString::new(name.as_str())),
            dependencies: self
                .dependencies
                .iter()
                .map(|name| CompactString::new(name.as_str()))
                .collect(),
            external_library_groups: self
                .external_library_groups
                .iter()
                .map(|key| CompactString::new(key.as_str()))
                .collect(),
        }
    }

    pub fn library_name(&self) -> Option<&LibraryName> {
        self.library_name.as_ref()
    }

    pub fn dependencies(&self) -> &[ToolName] {
        &self.dependencies[..]
    }

    pub fn external_library_groups(&self) -> &[GroupKey] {
        &self.external_library_groups[..]
    }
}

/// A builder for a [`DependencySpec`] that accepts plain strings and validates them on
/// [`DependencySpecBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct DependencySpecBuilder {
    library_name: Option<CompactString>,
    dependencies: Vec<CompactString>,
    external_library_groups: Vec<CompactString>,
}

impl DependencySpecBuilder {
    /// Set the library that gets registered as a build target.
    pub fn library(mut self, name: impl AsRef<str>) -> Self {
        self.library_name = Some(CompactString::new(name.as_ref()));
        self
    }

    /// Clear the library name, the spec can then only be applied in deps-only mode.
    pub fn without_library(mut self) -> Self {
        self.library_name = None;
        self
    }

    /// Append a single dependency.
    pub fn dependency(mut self, name: impl AsRef<str>) -> Self {
        self.dependencies.push(CompactString::new(name.as_ref()));
        self
    }

    /// Append all of `names` as dependencies, in order.
    pub fn dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dependencies
            .extend(names.into_iter().map(|name| CompactString::new(name.as_ref())));
        self
    }

    /// Remove all dependencies declared so far.
    pub fn clear_dependencies(mut self) -> Self {
        self.dependencies.clear();
        self
    }

    /// Append an external library group.
    pub fn external_group(mut self, key: impl AsRef<str>) -> Self {
        self.external_library_groups
            .push(CompactString::new(key.as_ref()));
        self
    }

    /// Validate everything and construct the [`DependencySpec`].
    pub fn build(self) -> Result<DependencySpec, SpecError> {
        let library_name = self.library_name.map(LibraryName::new).transpose()?;
        let dependencies = self
            .dependencies
            .iter()
            .map(ToolName::new)
            .collect::<Result<Vec<_>, _>>()?;
        let external_library_groups = self
            .external_library_groups
            .iter()
            .map(GroupKey::new)
            .collect::<Result<Vec<_>, _>>()?;

        DependencySpec::new(library_name, dependencies, external_library_groups)
    }
}
