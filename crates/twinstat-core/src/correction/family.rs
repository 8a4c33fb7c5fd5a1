//! Named p-value groups and the pooled family built from them.
//!
//! # Invariants
//!
//! - Group order is insertion order (for JSON input, document order) and is
//!   the only order used both to pool and to scatter values back.
//! - Within a group, value order is preserved end to end.
//! - Every stored value is finite and lies in `[0, 1]`.

use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{GroupError, GroupRejection, Result, TwinstatError};

/// One named group of raw (or adjusted) p-values.
#[derive(Debug, Clone, PartialEq)]
pub struct PValueGroup {
    pub name: String,
    pub values: Vec<f64>,
}

/// Ordered mapping from group name to p-values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PValueFamily {
    groups: Vec<PValueGroup>,
}

/// A family as loaded from disk, plus the groups that failed validation.
#[derive(Debug, Clone, Default)]
pub struct LoadedFamily {
    pub family: PValueFamily,
    pub rejected: Vec<GroupRejection>,
}

impl PValueFamily {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated group. Names must be non-empty and unique.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> std::result::Result<(), GroupRejection> {
        let name = name.into();
        let reject = |reason| GroupRejection {
            group: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(reject(GroupError::EmptyName));
        }
        if self.get(&name).is_some() {
            return Err(reject(GroupError::DuplicateName));
        }
        for (index, &value) in values.iter().enumerate() {
            check_range(index, value).map_err(reject)?;
        }

        self.groups.push(PValueGroup { name, values });
        Ok(())
    }

    /// Build a family from a JSON object, collecting per-group failures.
    ///
    /// Values may be JSON numbers or numeric strings. A group with any
    /// unusable value is rejected as a whole; the rest of the document is
    /// still loaded.
    pub fn from_json(doc: &Value) -> Result<LoadedFamily> {
        let object = doc.as_object().ok_or(TwinstatError::NotAFamily)?;

        let mut loaded = LoadedFamily::default();
        for (name, raw) in object {
            let outcome = coerce_group(raw).map_err(|reason| GroupRejection {
                group: name.clone(),
                reason,
            });
            match outcome.and_then(|values| loaded.family.push(name.clone(), values)) {
                Ok(()) => {}
                Err(rejection) => loaded.rejected.push(rejection),
            }
        }
        Ok(loaded)
    }

    /// Read and validate a family document from `path`.
    pub fn load(path: &Path) -> Result<LoadedFamily> {
        if !path.exists() {
            return Err(TwinstatError::InputNotFound(path.to_path_buf()));
        }
        let content = std::fs::read(path)?;
        let doc: Value = serde_json::from_slice(&content)?;
        Self::from_json(&doc)
    }

    pub fn groups(&self) -> &[PValueGroup] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of p-values across all groups.
    pub fn n_tests(&self) -> usize {
        self.groups.iter().map(|g| g.values.len()).sum()
    }

    /// Concatenate every group into one sequence, recording each group's span.
    pub fn pool(&self) -> PooledFamily {
        let mut values = Vec::with_capacity(self.n_tests());
        let mut spans = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            spans.push(GroupSpan {
                name: group.name.clone(),
                offset: values.len(),
                len: group.values.len(),
            });
            values.extend_from_slice(&group.values);
        }
        PooledFamily { values, spans }
    }
}

impl Serialize for PValueFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.name, &group.values)?;
        }
        map.end()
    }
}

/// Position of one group inside a pooled sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpan {
    pub name: String,
    pub offset: usize,
    pub len: usize,
}

/// All p-values of a family in one flat sequence, plus the spans needed to
/// put per-test results back into their groups. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PooledFamily {
    pub values: Vec<f64>,
    pub spans: Vec<GroupSpan>,
}

impl PooledFamily {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Slice a pooled-order sequence back into named groups.
    ///
    /// `pooled` must have the same length as the pooled raw values.
    pub fn scatter(&self, pooled: &[f64]) -> PValueFamily {
        debug_assert_eq!(pooled.len(), self.values.len());
        let groups = self
            .spans
            .iter()
            .map(|span| PValueGroup {
                name: span.name.clone(),
                values: pooled[span.offset..span.offset + span.len].to_vec(),
            })
            .collect();
        PValueFamily { groups }
    }
}

fn check_range(index: usize, value: f64) -> std::result::Result<(), GroupError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GroupError::OutOfRange { index, value })
    }
}

fn coerce_group(raw: &Value) -> std::result::Result<Vec<f64>, GroupError> {
    let items = raw.as_array().ok_or(GroupError::NotASequence)?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let value = coerce_value(item).ok_or_else(|| GroupError::NonNumeric {
                index,
                value: item.to_string(),
            })?;
            check_range(index, value)?;
            Ok(value)
        })
        .collect()
}

fn coerce_value(item: &Value) -> Option<f64> {
    match item {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
