//! Configuration flags for `libreg` itself.
//!
//! A [`Config`] is declared once as a `static`, registered with a [`ConfigSetBuilder`], and read
//! from the resulting [`ConfigSet`]. Values can be updated at runtime from strings, e.g. from the
//! command line, or from environment variables.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Context;
use compact_str::CompactString;
use libreg_ore::assert_none;

/// A single configuration setting.
pub struct Config<V: ConfigType> {
    name: &'static str,
    desc: &'static str,
    default: V,
}

impl<V: ConfigType> Config<V> {
    /// Define a new [`Config`] with a default value.
    pub const fn new(name: &'static str, desc: &'static str, default: V) -> Self {
        Config {
            name,
            desc,
            default,
        }
    }

    /// Read the value of this [`Config`] from the provided [`ConfigSet`].
    ///
    /// # Panics
    /// * If this [`Config`] was never registered with the [`ConfigSet`].
    pub fn read(&self, set: &ConfigSet) -> V::Owned {
        let Some(entry) = set.configs.get(self.name) else {
            panic!("tried to read unregistered config {}", self.name);
        };
        V::read_shared(&entry.value)
    }
}

/// A thread-safe shareable set of [`Config`]s.
#[derive(Clone, Debug)]
pub struct ConfigSet {
    configs: Arc<BTreeMap<CompactString, ConfigSetEntry>>,
}

impl ConfigSet {
    /// Returns a new [`ConfigSetBuilder`].
    pub fn builder() -> ConfigSetBuilder {
        ConfigSetBuilder::default()
    }

    /// Update [`Config`] in this [`ConfigSet`] with the specified value.
    ///
    /// # Panics
    /// * If [`Config`] was not previously registered with the original [`ConfigSetBuilder`].
    pub fn update<V: ConfigType>(&self, config: &'static Config<V>, value: V) {
        let Some(entry) = self.configs.get(config.name) else {
            panic!("tried to update unregistered config {}", config.name);
        };
        entry.value.store(value.to_value());
    }

    /// Update the [`Config`] in this [`ConfigSet`] with `name` to `value`.
    ///
    /// # Errors
    ///
    /// * If no config named `name` exists in this set.
    /// * If the config specified by `name` cannot parse `value`.
    ///
    pub fn try_update(&self, name: &str, value: &str) -> Result<(), anyhow::Error> {
        let entry = self
            .configs
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("no Config named '{name}' found"))?;
        entry.value.store_parsed(value)?;
        Ok(())
    }

    /// Parse and apply an override of the form `name=value`.
    pub fn try_update_pair(&self, pair: &str) -> Result<(), anyhow::Error> {
        let Some((name, value)) = pair.split_once('=') else {
            anyhow::bail!("expected 'name=value', found '{pair}'");
        };
        self.try_update(name.trim(), value.trim())
    }

    /// Override every [`Config`] that has a matching environment variable set, e.g.
    /// `LIBREG_TOOL_SUFFIX` for `tool_suffix` with a `prefix` of `LIBREG_`. Values are parsed
    /// the same way as [`ConfigSet::try_update`].
    ///
    /// Returns the number of configs that were overridden.
    pub fn apply_env(&self, prefix: &str) -> Result<usize, anyhow::Error> {
        let mut applied = 0;
        for (name, entry) in &*self.configs {
            let Some(raw) = libreg_ore::env::var_with_prefix(prefix, name) else {
                continue;
            };
            let raw = raw.into_string().map_err(|raw| {
                anyhow::anyhow!("override for '{name}' is not valid UTF-8: {raw:?}")
            })?;
            entry
                .value
                .store_parsed(&raw)
                .with_context(|| format!("invalid override for '{name}' from the environment"))?;
            tracing::debug!(%name, value = %entry.value, "config overridden from environment");
            applied += 1;
        }
        Ok(applied)
    }
}

impl fmt::Display for ConfigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, entry) in &*self.configs {
            writeln!(f, "{} => {}\n\t└─ '{}'", name, entry.value, entry.desc)?;
        }
        Ok(())
    }
}

/// Single entry within a [`ConfigSet`].
#[derive(Clone, Debug)]
struct ConfigSetEntry {
    value: SharedValue,
    desc: &'static str,
}

/// A builder for a [`ConfigSet`].
#[derive(Default, Debug)]
pub struct ConfigSetBuilder {
    configs: BTreeMap<CompactString, (Value, &'static str)>,
}

impl ConfigSetBuilder {
    /// Register a [`Config`] into this [`ConfigSetBuilder`] with the default value.
    ///
    /// # Panics
    /// * If a [`Config`] with the same name was already registered.
    pub fn register<V: ConfigType>(&mut self, config: &'static Config<V>) -> &mut Self {
        let value = config.default.to_value();
        let prev = self
            .configs
            .insert(CompactString::const_new(config.name), (value, config.desc));
        assert_none!(prev, "config '{}' registered more than once", config.name);
        self
    }

    /// Consumes this [`ConfigSetBuilder`] constructing a [`ConfigSet`].
    pub fn build(self) -> ConfigSet {
        let configs = self
            .configs
            .into_iter()
            .map(|(name, (value, desc))| {
                let entry = ConfigSetEntry {
                    value: value.into_shared(),
                    desc,
                };
                (name, entry)
            })
            .collect();
        ConfigSet {
            configs: Arc::new(configs),
        }
    }
}

/// Types that can be stored in a [`Config`].
pub trait ConfigType {
    /// What gets returned when reading the [`Config`].
    type Owned;

    fn to_value(&self) -> Value;
    fn read_shared(shared: &SharedValue) -> Self::Owned;
}

impl ConfigType for bool {
    type Owned = bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn read_shared(shared: &SharedValue) -> bool {
        let SharedValue::Bool(val) = shared else {
            panic!("programming error, found {shared:?} for bool")
        };
        val.load(Ordering::SeqCst)
    }
}

impl ConfigType for &str {
    type Owned = CompactString;

    fn to_value(&self) -> Value {
        Value::Str(CompactString::new(self))
    }

    fn read_shared(shared: &SharedValue) -> CompactString {
        let SharedValue::Str(val) = shared else {
            panic!("programming error, found {shared:?} for string")
        };
        val.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// "Type erased" configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Str(CompactString),
}

impl Value {
    fn into_shared(self) -> SharedValue {
        match self {
            Value::Bool(val) => SharedValue::Bool(Arc::new(AtomicBool::new(val))),
            Value::Str(val) => SharedValue::Str(Arc::new(RwLock::new(val))),
        }
    }
}

/// Shareable instance of [`Value`], all clones observe updates.
#[derive(Clone, Debug)]
pub enum SharedValue {
    Bool(Arc<AtomicBool>),
    Str(Arc<RwLock<CompactString>>),
}

impl SharedValue {
    fn store(&self, value: Value) {
        match (self, value) {
            (SharedValue::Bool(shared), Value::Bool(val)) => shared.store(val, Ordering::SeqCst),
            (SharedValue::Str(shared), Value::Str(val)) => {
                *shared.write().unwrap_or_else(PoisonError::into_inner) = val;
            }
            (shared, val) => unreachable!("tried to update shared {shared:?} with {val:?}"),
        }
    }

    fn store_parsed(&self, raw: &str) -> Result<(), anyhow::Error> {
        let value = match self {
            SharedValue::Bool(_) => match libreg_ore::env::parse_bool(raw) {
                Some(val) => Value::Bool(val),
                None => anyhow::bail!("expected a boolean, found '{raw}'"),
            },
            SharedValue::Str(_) => Value::Str(CompactString::new(raw)),
        };
        self.store(value);
        Ok(())
    }
}

impl fmt::Display for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedValue::Bool(val) => write!(f, "{}", val.load(Ordering::SeqCst)),
            SharedValue::Str(val) => {
                let val = val.read().unwrap_or_else(PoisonError::into_inner);
                write!(f, "{val}")
            }
        }
    }
}
