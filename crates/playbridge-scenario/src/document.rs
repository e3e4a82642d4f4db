//! Scenario document model
//!
//! Only `script_id` is known to the bridge. Every other key on a script,
//! and every top-level key besides `scripts`, is carried through as an
//! opaque YAML value so that a load/save cycle keeps the document intact.
//! Keys need not be strings and values may carry YAML tags, so entries are
//! decoded as a whole [`Mapping`] and the known keys are split out by hand.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

const SCRIPT_ID: &str = "script_id";
const SCRIPTS: &str = "scripts";

/// Ordered key/value fields of a script or change event
pub type Fields = Mapping;

/// One addressable script in the scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEntry {
    /// Stable identifier
    pub script_id: String,
    /// All remaining fields, in document order
    pub fields: Fields,
}

impl ScriptEntry {
    /// Create entry with no extra fields
    #[inline]
    #[must_use]
    pub fn new(script_id: impl Into<String>) -> Self {
        Self {
            script_id: script_id.into(),
            fields: Fields::new(),
        }
    }

    /// With a field set
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(Value::String(key.into()), value.into());
        self
    }

    /// Get a field by key
    #[inline]
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Merge `fields` into this entry
    ///
    /// Keys present in `fields` overwrite existing values in place; new
    /// keys are appended. Keys absent from `fields` are left alone.
    ///
    /// # Returns
    /// `true` if any value was added or differed from the previous one
    pub fn merge_fields(&mut self, fields: &Fields) -> bool {
        let mut changed = false;
        for (key, value) in fields {
            if self.fields.get(key) != Some(value) {
                self.fields.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }
}

impl Serialize for ScriptEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_with_id(serializer, &self.script_id, &self.fields)
    }
}

impl<'de> Deserialize<'de> for ScriptEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (script_id, fields) = split_script_id::<D::Error>(Mapping::deserialize(deserializer)?)?;
        Ok(Self { script_id, fields })
    }
}

/// Full persisted scenario state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioDocument {
    /// Scripts in document order
    pub scripts: Vec<ScriptEntry>,
    /// Top-level keys other than `scripts`
    pub extra: Fields,
}

impl ScenarioDocument {
    /// Create document from scripts
    #[inline]
    #[must_use]
    pub fn new(scripts: Vec<ScriptEntry>) -> Self {
        Self {
            scripts,
            extra: Fields::new(),
        }
    }

    /// Decode from YAML text
    ///
    /// # Errors
    /// Returns the YAML error if the text is not a scenario document
    pub fn from_yaml_str(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Encode to YAML text
    ///
    /// # Errors
    /// Returns the YAML error if a value cannot be represented
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// First script with the given identifier
    #[must_use]
    pub fn find(&self, script_id: &str) -> Option<&ScriptEntry> {
        self.scripts.iter().find(|s| s.script_id == script_id)
    }

    /// Number of scripts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// True if the document has no scripts
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Identifiers that occur more than once, in first-seen order
    ///
    /// Uniqueness is expected but not enforced; updates only ever touch
    /// the first entry with a given identifier.
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for script in &self.scripts {
            let count = counts.entry(script.script_id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(script.script_id.as_str());
            }
        }
        duplicates
    }
}

impl Serialize for ScenarioDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.extra.len() + 1))?;
        map.serialize_entry(SCRIPTS, &self.scripts)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScenarioDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra = Mapping::deserialize(deserializer)?;
        // an absent or empty `scripts:` means no scripts yet
        let scripts = match extra.shift_remove(SCRIPTS) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => Vec::<ScriptEntry>::deserialize(value)
                .map_err(|e| <D::Error as de::Error>::custom(format_args!("{SCRIPTS}: {e}")))?,
        };
        Ok(Self { scripts, extra })
    }
}

/// Incoming notification that a script changed in the UI
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptChangeEvent {
    /// Script to update
    pub script_id: String,
    /// Fields to merge into the script
    pub fields: Fields,
}

impl ScriptChangeEvent {
    /// Create event carrying no fields
    #[inline]
    #[must_use]
    pub fn new(script_id: impl Into<String>) -> Self {
        Self {
            script_id: script_id.into(),
            fields: Fields::new(),
        }
    }

    /// With a field to apply
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(Value::String(key.into()), value.into());
        self
    }
}

impl Serialize for ScriptChangeEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_with_id(serializer, &self.script_id, &self.fields)
    }
}

impl<'de> Deserialize<'de> for ScriptChangeEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (script_id, fields) = split_script_id::<D::Error>(Mapping::deserialize(deserializer)?)?;
        Ok(Self { script_id, fields })
    }
}

fn serialize_with_id<S: Serializer>(
    serializer: S,
    script_id: &str,
    fields: &Fields,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
    map.serialize_entry(SCRIPT_ID, script_id)?;
    for (key, value) in fields {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

fn split_script_id<E: de::Error>(mut fields: Mapping) -> Result<(String, Fields), E> {
    match fields.shift_remove(SCRIPT_ID) {
        Some(Value::String(id)) => Ok((id, fields)),
        Some(_) => Err(E::invalid_type(
            de::Unexpected::Other("non-string script_id"),
            &"a string",
        )),
        None => Err(E::missing_field(SCRIPT_ID)),
    }
}
