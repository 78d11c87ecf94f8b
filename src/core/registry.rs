//! Log-type registry and level gating
//!
//! Every message is tagged with a log type looked up by string key. A type
//! carries a display name, a numeric level, per-sink enable flags and cached
//! style codes. Enable flags are derived from the registry's min/max level
//! thresholds unless a type has been explicitly forced for that sink, in
//! which case recalculation leaves it alone until the override is released.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::error::{LoggerError, Result};
use crate::core::style::{StyleCodes, StyleTable};

/// One of the two delivery destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sink {
    Stdout,
    File,
}

impl Sink {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Sink::Stdout => "stdout",
            Sink::File => "file",
        }
    }
}

/// A level bound or gate argument: either a literal value or the key of a
/// registered type whose level is used instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelSpec {
    Value(f64),
    TypeKey(String),
}

impl From<f64> for LevelSpec {
    fn from(value: f64) -> Self {
        LevelSpec::Value(value)
    }
}

impl From<i32> for LevelSpec {
    fn from(value: i32) -> Self {
        LevelSpec::Value(f64::from(value))
    }
}

impl From<&str> for LevelSpec {
    fn from(key: &str) -> Self {
        LevelSpec::TypeKey(key.to_string())
    }
}

impl From<String> for LevelSpec {
    fn from(key: String) -> Self {
        LevelSpec::TypeKey(key)
    }
}

/// A registered log type.
///
/// The enable flags here are the resolved values; whether they are pinned or
/// threshold-derived is tracked by the registry's forced sets.
#[derive(Debug, Clone)]
pub struct LogType {
    key: String,
    name: String,
    level: f64,
    stdout_enabled: bool,
    file_enabled: bool,
    color: Option<String>,
    highlight: Option<String>,
    attributes: Vec<String>,
    style: StyleCodes,
}

impl LogType {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name shown in message headers.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn stdout_enabled(&self) -> bool {
        self.stdout_enabled
    }

    pub fn file_enabled(&self) -> bool {
        self.file_enabled
    }

    /// Configured color name, kept even when the stream strips styling.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn highlight(&self) -> Option<&str> {
        self.highlight.as_deref()
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Escape sequences resolved at definition time.
    pub fn style(&self) -> &StyleCodes {
        &self.style
    }

    #[cfg(test)]
    fn enabled_for(&self, sink: Sink) -> bool {
        match sink {
            Sink::Stdout => self.stdout_enabled,
            Sink::File => self.file_enabled,
        }
    }

    fn set_enabled(&mut self, sink: Sink, flag: bool) {
        match sink {
            Sink::Stdout => self.stdout_enabled = flag,
            Sink::File => self.file_enabled = flag,
        }
    }
}

/// Partial description of a log type.
///
/// Used both to create types and to patch them: a present field overwrites,
/// an absent field keeps the current value (or the documented default on
/// creation). A present sink flag pins that sink as a forced override; an
/// absent flag leaves the forced status untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogTypeSpec {
    pub name: Option<String>,
    pub level: Option<f64>,
    pub stdout_flag: Option<bool>,
    pub file_flag: Option<bool>,
    pub color: Option<String>,
    pub highlight: Option<String>,
    pub attributes: Option<Vec<String>>,
}

impl LogTypeSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: f64) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_stdout_flag(mut self, flag: bool) -> Self {
        self.stdout_flag = Some(flag);
        self
    }

    #[must_use]
    pub fn with_file_flag(mut self, flag: bool) -> Self {
        self.file_flag = Some(flag);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_highlight(mut self, highlight: impl Into<String>) -> Self {
        self.highlight = Some(highlight.into());
        self
    }

    #[must_use]
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }
}

/// The per-logger type registry with its gating thresholds.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, LogType>,
    styles: StyleTable,
    stdout_min: Option<f64>,
    stdout_max: Option<f64>,
    file_min: Option<f64>,
    file_max: Option<f64>,
    forced_stdout: HashSet<String>,
    forced_file: HashSet<String>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new(styles: StyleTable) -> Self {
        Self {
            types: HashMap::new(),
            styles,
            stdout_min: None,
            stdout_max: None,
            file_min: None,
            file_max: None,
            forced_stdout: HashSet::new(),
            forced_file: HashSet::new(),
        }
    }

    /// Replace the style table used for future resolutions.
    ///
    /// Codes already cached on registered types keep their definition-time
    /// resolution.
    pub fn set_styles(&mut self, styles: StyleTable) {
        self.styles = styles;
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn is_defined(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&LogType> {
        self.types.get(key)
    }

    /// All registered keys, ordered by level then key.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&LogType> = self.types.values().collect();
        keys.sort_by(|a, b| {
            a.level
                .partial_cmp(&b.level)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        });
        keys.into_iter().map(|t| t.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn minimum_level(&self, sink: Sink) -> Option<f64> {
        match sink {
            Sink::Stdout => self.stdout_min,
            Sink::File => self.file_min,
        }
    }

    pub fn maximum_level(&self, sink: Sink) -> Option<f64> {
        match sink {
            Sink::Stdout => self.stdout_max,
            Sink::File => self.file_max,
        }
    }

    /// Whether a type's flag for a sink is pinned by a forced override.
    pub fn is_forced(&self, key: &str, sink: Sink) -> bool {
        self.forced_set(sink).contains(key)
    }

    fn forced_set(&self, sink: Sink) -> &HashSet<String> {
        match sink {
            Sink::Stdout => &self.forced_stdout,
            Sink::File => &self.forced_file,
        }
    }

    fn check_level(level: f64) -> Result<f64> {
        if level.is_nan() {
            return Err(LoggerError::invalid_argument("level", "must be a number"));
        }
        Ok(level)
    }

    fn resolve_level(&self, spec: &LevelSpec) -> Result<f64> {
        match spec {
            LevelSpec::Value(value) => Self::check_level(*value),
            LevelSpec::TypeKey(key) => self
                .types
                .get(key)
                .map(|ty| ty.level)
                .ok_or_else(|| LoggerError::UnknownType(key.clone())),
        }
    }

    /// Register a new type.
    ///
    /// Fails with `DuplicateType` if the key exists; a failed call leaves the
    /// registry untouched. Present sink flags become forced overrides, absent
    /// ones are derived from the current thresholds.
    pub fn add(&mut self, key: &str, spec: LogTypeSpec) -> Result<()> {
        if key.is_empty() {
            return Err(LoggerError::invalid_argument(
                "log type key",
                "must not be empty",
            ));
        }
        if self.types.contains_key(key) {
            return Err(LoggerError::DuplicateType(key.to_string()));
        }
        let LogTypeSpec {
            name,
            level,
            stdout_flag,
            file_flag,
            color,
            highlight,
            attributes,
        } = spec;
        let level = Self::check_level(level.unwrap_or(0.0))?;
        let attributes = attributes.unwrap_or_default();
        let style = self
            .styles
            .resolve(color.as_deref(), highlight.as_deref(), &attributes)?;
        self.types.insert(
            key.to_string(),
            LogType {
                key: key.to_string(),
                name: name.unwrap_or_else(|| key.to_string()),
                level,
                stdout_enabled: stdout_flag.unwrap_or(true),
                file_enabled: file_flag.unwrap_or(true),
                color,
                highlight,
                attributes,
                style,
            },
        );
        self.apply_flag_spec(key, Sink::Stdout, stdout_flag);
        self.apply_flag_spec(key, Sink::File, file_flag);
        Ok(())
    }

    fn apply_flag_spec(&mut self, key: &str, sink: Sink, flag: Option<bool>) {
        match flag {
            Some(value) => {
                if let Some(ty) = self.types.get_mut(key) {
                    ty.set_enabled(sink, value);
                }
                match sink {
                    Sink::Stdout => self.forced_stdout.insert(key.to_string()),
                    Sink::File => self.forced_file.insert(key.to_string()),
                };
            }
            None => self.recalculate(sink),
        }
    }

    /// Patch an existing type.
    ///
    /// Absent fields keep their current value; style codes are re-resolved
    /// from the merged selectors.
    pub fn update(&mut self, key: &str, patch: LogTypeSpec) -> Result<()> {
        let current = self
            .types
            .get(key)
            .ok_or_else(|| LoggerError::UnknownType(key.to_string()))?;
        let name = patch.name.unwrap_or_else(|| current.name.clone());
        let level = Self::check_level(patch.level.unwrap_or(current.level))?;
        let color = patch.color.or_else(|| current.color.clone());
        let highlight = patch.highlight.or_else(|| current.highlight.clone());
        let attributes = patch
            .attributes
            .unwrap_or_else(|| current.attributes.clone());
        let style = self
            .styles
            .resolve(color.as_deref(), highlight.as_deref(), &attributes)?;
        if let Some(ty) = self.types.get_mut(key) {
            ty.name = name;
            ty.level = level;
            ty.color = color;
            ty.highlight = highlight;
            ty.attributes = attributes;
            ty.style = style;
        }
        self.apply_flag_spec(key, Sink::Stdout, patch.stdout_flag);
        self.apply_flag_spec(key, Sink::File, patch.file_flag);
        // a level change may move the type across a threshold
        self.recalculate(Sink::Stdout);
        self.recalculate(Sink::File);
        Ok(())
    }

    /// Remove a type and purge its forced overrides.
    ///
    /// Removing an absent key is a silent no-op unless `assert_exists` asks
    /// for an `UnknownType` error.
    pub fn remove(&mut self, key: &str, assert_exists: bool) -> Result<()> {
        if self.types.remove(key).is_none() && assert_exists {
            return Err(LoggerError::UnknownType(key.to_string()));
        }
        self.forced_stdout.remove(key);
        self.forced_file.remove(key);
        Ok(())
    }

    /// Set or clear one sink's minimum level.
    ///
    /// A `TypeKey` spec resolves through the named type's level. Ordering
    /// against the sink's maximum is enforced here, not at type-add time.
    pub fn set_minimum_level(&mut self, sink: Sink, level: Option<LevelSpec>) -> Result<()> {
        let value = match level {
            Some(spec) => Some(self.resolve_level(&spec)?),
            None => None,
        };
        if let (Some(min), Some(max)) = (value, self.maximum_level(sink)) {
            if min > max {
                return Err(LoggerError::invalid_threshold(
                    sink.label(),
                    format!("minimum {} exceeds maximum {}", min, max),
                ));
            }
        }
        match sink {
            Sink::Stdout => self.stdout_min = value,
            Sink::File => self.file_min = value,
        }
        self.recalculate(sink);
        Ok(())
    }

    /// Set or clear one sink's maximum level.
    pub fn set_maximum_level(&mut self, sink: Sink, level: Option<LevelSpec>) -> Result<()> {
        let value = match level {
            Some(spec) => Some(self.resolve_level(&spec)?),
            None => None,
        };
        if let (Some(max), Some(min)) = (value, self.minimum_level(sink)) {
            if max < min {
                return Err(LoggerError::invalid_threshold(
                    sink.label(),
                    format!("maximum {} is below minimum {}", max, min),
                ));
            }
        }
        match sink {
            Sink::Stdout => self.stdout_max = value,
            Sink::File => self.file_max = value,
        }
        self.recalculate(sink);
        Ok(())
    }

    /// Pin or release a type's flag for one sink.
    ///
    /// `Some(flag)` sets the flag directly and exempts the type from
    /// threshold recalculation; `None` releases the override and re-derives
    /// the flag immediately.
    pub fn force_flag(&mut self, key: &str, sink: Sink, flag: Option<bool>) -> Result<()> {
        if !self.types.contains_key(key) {
            return Err(LoggerError::UnknownType(key.to_string()));
        }
        match flag {
            Some(value) => {
                if let Some(ty) = self.types.get_mut(key) {
                    ty.set_enabled(sink, value);
                }
                match sink {
                    Sink::Stdout => self.forced_stdout.insert(key.to_string()),
                    Sink::File => self.forced_file.insert(key.to_string()),
                };
            }
            None => {
                match sink {
                    Sink::Stdout => self.forced_stdout.remove(key),
                    Sink::File => self.forced_file.remove(key),
                };
                self.recalculate(sink);
            }
        }
        Ok(())
    }

    /// Re-derive every non-forced flag for one sink from its thresholds.
    ///
    /// Both bounds unset means enabled; otherwise the flag is a closed-range
    /// check with unset sides unbounded. Runs in full and is idempotent.
    pub fn recalculate(&mut self, sink: Sink) {
        let (min, max) = match sink {
            Sink::Stdout => (self.stdout_min, self.stdout_max),
            Sink::File => (self.file_min, self.file_max),
        };
        let forced = match sink {
            Sink::Stdout => &self.forced_stdout,
            Sink::File => &self.forced_file,
        };
        for (key, ty) in self.types.iter_mut() {
            if forced.contains(key) {
                continue;
            }
            let flag = match (min, max) {
                (None, None) => true,
                _ => {
                    ty.level >= min.unwrap_or(f64::NEG_INFINITY)
                        && ty.level <= max.unwrap_or(f64::INFINITY)
                }
            };
            ty.set_enabled(sink, flag);
        }
    }

    /// Export every type as a spec that reconstructs it, forced flags
    /// included.
    pub fn snapshot(&self) -> BTreeMap<String, LogTypeSpec> {
        self.types
            .iter()
            .map(|(key, ty)| {
                let spec = LogTypeSpec {
                    name: Some(ty.name.clone()),
                    level: Some(ty.level),
                    stdout_flag: self
                        .forced_stdout
                        .contains(key)
                        .then_some(ty.stdout_enabled),
                    file_flag: self.forced_file.contains(key).then_some(ty.file_enabled),
                    color: ty.color.clone(),
                    highlight: ty.highlight.clone(),
                    attributes: if ty.attributes.is_empty() {
                        None
                    } else {
                        Some(ty.attributes.clone())
                    },
                };
                (key.clone(), spec)
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn enabled_for(&self, key: &str, sink: Sink) -> Option<bool> {
        self.types.get(key).map(|ty| ty.enabled_for(sink))
    }
}
