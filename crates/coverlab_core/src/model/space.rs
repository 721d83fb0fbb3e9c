//! Parameter spaces and the run configurations drawn from them.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ParamValue, SweepSchema};
use crate::error::ConfigError;

/// One swept dimension: a parameter name and its candidate values.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<ParamValue>,
}

impl Axis {
    /// Whether this axis actually varies.
    #[must_use]
    pub fn is_varying(&self) -> bool {
        self.values.len() > 1
    }
}

/// Mapping from parameter name to candidate values, in declared order.
///
/// Serializes as a plain mapping (`delta: [0.1, 0.2]`); declaration order is
/// preserved on the way in.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    axes: Vec<Axis>,
}

impl ParameterSpace {
    /// Build a space, rejecting empty candidate lists, repeated names and
    /// repeated candidates. Two equal candidates would be two runs writing
    /// the same output files.
    pub fn new<N, I>(axes: I) -> Result<Self, ConfigError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<ParamValue>)>,
    {
        let mut out: Vec<Axis> = Vec::new();
        for (name, values) in axes {
            let name = name.into();
            if values.is_empty() {
                return Err(ConfigError::EmptyCandidates(name));
            }
            if out.iter().any(|a| a.name == name) {
                return Err(ConfigError::DuplicateParameter(name));
            }
            if let Some(value) = values
                .iter()
                .enumerate()
                .find_map(|(i, v)| values[..i].contains(v).then_some(v))
            {
                return Err(ConfigError::DuplicateCandidate {
                    value: value.to_string(),
                    name,
                });
            }
            out.push(Axis { name, values });
        }
        Ok(Self { axes: out })
    }

    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    #[must_use]
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.name.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Total number of runs in the full factorial expansion.
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    /// Names of axes with more than one candidate, in declared order.
    #[must_use]
    pub fn varying(&self) -> Vec<&str> {
        self.axes
            .iter()
            .filter(|a| a.is_varying())
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Rename legacy parameter names to the schema's canonical names and
    /// reject names the schema does not know.
    pub fn canonicalize(&self, schema: SweepSchema) -> Result<Self, ConfigError> {
        let mut renamed = Vec::with_capacity(self.axes.len());
        for axis in &self.axes {
            let canonical =
                schema
                    .canonical_name(&axis.name)
                    .ok_or_else(|| ConfigError::UnknownParameter {
                        name: axis.name.clone(),
                        schema: schema.name(),
                    })?;
            renamed.push((canonical, axis.values.clone()));
        }
        Self::new(renamed)
    }

    /// Reject spaces that leave a schema field without candidates.
    pub fn require_complete(&self, schema: SweepSchema) -> Result<(), ConfigError> {
        for field in schema.fields() {
            if self.axis(field).is_none() {
                return Err(ConfigError::MissingParameter {
                    name: (*field).to_string(),
                    schema: schema.name(),
                });
            }
        }
        Ok(())
    }
}

impl Serialize for ParameterSpace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.axes.len()))?;
        for axis in &self.axes {
            map.serialize_entry(&axis.name, &axis.values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParameterSpace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries: Vec<(String, Vec<ParamValue>)> =
            deserializer.deserialize_map(OrderedEntries::default())?;
        ParameterSpace::new(entries).map_err(serde::de::Error::custom)
    }
}

/// One concrete assignment of a value to every parameter of a sweep.
///
/// Immutable: built by the expander and only ever read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    values: Vec<(String, ParamValue)>,
}

impl RunConfig {
    pub fn new<N, I>(values: I) -> Result<Self, ConfigError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, ParamValue)>,
    {
        let mut out: Vec<(String, ParamValue)> = Vec::new();
        for (name, value) in values {
            let name = name.into();
            if out.iter().any(|(n, _)| *n == name) {
                return Err(ConfigError::DuplicateParameter(name));
            }
            out.push((name, value));
        }
        Ok(Self { values: out })
    }

    pub(crate) fn from_parts(values: Vec<(String, ParamValue)>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Configuration values as a JSON object.
    #[must_use]
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.values
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect()
    }
}

impl Serialize for RunConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RunConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries: Vec<(String, ParamValue)> =
            deserializer.deserialize_map(OrderedEntries::default())?;
        RunConfig::new(entries).map_err(serde::de::Error::custom)
    }
}

/// Map visitor that keeps entries in document order.
struct OrderedEntries<V>(std::marker::PhantomData<V>);

impl<V> Default for OrderedEntries<V> {
    fn default() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedEntries<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of parameter names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(entries)
    }
}
