//! Declaring the dependencies of a library and applying them to a build environment.
//!
//! A library's needs are described by an immutable [`DependencySpec`]: the library itself, the
//! tools it depends on, and groups of external libraries that the environment resolves. The
//! [`Registrar`] applies a spec to anything implementing [`Environment`], always in the same
//! order:
//!
//! 1. The library is registered, unless only its dependencies are wanted.
//! 2. Every tool is applied, in declared order.
//! 3. Every external library group is resolved and registered.
//!
//! The first failure stops everything after it.
//!
//! [`BuildEnvironment`] is an in-memory environment where tools resolve to other libraries from a
//! [`Manifest`], and [`RecordingEnvironment`] captures the calls a spec would make.

pub mod build_env;
pub mod cfgs;
pub mod defs;
pub mod engine;
pub mod env;
pub mod error;
pub mod recording;
pub mod registrar;
pub mod spec;

#[cfg(test)]
mod tests;

pub use build_env::BuildEnvironment;
pub use defs::Manifest;
pub use engine::{Engine, EngineConfig};
pub use env::Environment;
pub use error::{RegistrarError, SpecError, Step};
pub use recording::{Call, RecordingEnvironment};
pub use registrar::{Applied, Registrar, apply, module_available};
pub use spec::{DependencySpec, DependencySpecBuilder};
