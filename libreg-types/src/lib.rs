//! Types used throughout `libreg`.
//!
//! The goal of this crate is to be very lightweight, so take care with adding dependencies.

use std::fmt;
use std::ops::Deref;

use compact_str::CompactString;

/// Error returned when a string is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    #[error("{kind} '{name}' must not contain whitespace")]
    Whitespace { kind: &'static str, name: String },
}

fn validate(kind: &'static str, name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty { kind });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(NameError::Whitespace {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(CompactString);

        impl $name {
            #[doc = concat!("Create a new [`", stringify!($name), "`], validating `name`.")]
            ///
            /// # Errors
            ///
            /// * If `name` is empty or contains whitespace.
            pub fn new(name: impl AsRef<str>) -> Result<Self, NameError> {
                let name = name.as_ref();
                validate($kind, name)?;
                Ok($name(CompactString::new(name)))
            }

            /// Returns the underlying string.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::new(s)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = CompactString::deserialize(deserializer)?;
                $name::new(&raw).map_err(serde::de::Error::custom)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Name of a library that can be registered as a build target, e.g. `evtbin`.
    LibraryName,
    "library name"
);

identifier!(
    /// Name of a build tool that gets applied to an environment, e.g. `astroLib`.
    ToolName,
    "tool name"
);

identifier!(
    /// Key of an externally resolved group of libraries, e.g. `healpixlibs`.
    GroupKey,
    "group key"
);

impl ToolName {
    /// The conventional tool name for a library, `<library><suffix>`.
    pub fn for_library(library: &LibraryName, suffix: &str) -> Result<Self, NameError> {
        ToolName::new(format!("{library}{suffix}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest_names() {
        let lib = LibraryName::new("evtbin").unwrap();
        assert_eq!(lib.as_str(), "evtbin");
        assert_eq!(lib.to_string(), "evtbin");
        assert_eq!(&*lib, "evtbin");

        let tool = ToolName::for_library(&lib, "Lib").unwrap();
        assert_eq!(tool.as_str(), "evtbinLib");
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(
            LibraryName::new(""),
            Err(NameError::Empty {
                kind: "library name"
            })
        );
        assert!(matches!(
            ToolName::new("tip Lib"),
            Err(NameError::Whitespace { .. })
        ));
        assert!("".parse::<GroupKey>().is_err());
    }

    #[test]
    fn deserialize_validates() {
        #[derive(Debug, serde::Deserialize)]
        struct Holder {
            group: GroupKey,
        }

        let holder: Holder = toml::from_str(r#"group = "healpixlibs""#).unwrap();
        assert_eq!(holder.group.as_str(), "healpixlibs");

        let err = toml::from_str::<Holder>(r#"group = """#).unwrap_err();
        assert!(err.to_string().contains("group key must not be empty"));
    }
}
