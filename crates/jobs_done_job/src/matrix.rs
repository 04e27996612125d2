//! Matrix expansion - computing every combination of the declared axes

use indexmap::IndexMap;
use jobs_done_yaml::{RawValue, ValueKind};

use crate::{condition::BRANCH_AXIS, condition::ConditionalKey, error::ResolveError};

/// One value of an axis. Written as `"alias,...,canonical"`: the last token is the value the
/// row carries, every other token is an alias that conditions may also match on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisValue {
    value: String,
    aliases: Vec<String>,
}

impl AxisValue {
    pub fn parse(raw: &str) -> Self {
        let mut tokens: Vec<String> = raw.split(',').map(|t| t.trim().to_string()).collect();
        let value = tokens.pop().unwrap_or_default();
        let mut aliases = Vec::new();
        for token in tokens {
            if !token.is_empty() && token != value && !aliases.contains(&token) {
                aliases.push(token);
            }
        }
        Self { value, aliases }
    }

    /// The canonical value
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The canonical value followed by its aliases
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.value.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    fn absorb(&mut self, other: AxisValue) {
        for alias in other.aliases {
            if !self.aliases.contains(&alias) {
                self.aliases.push(alias);
            }
        }
    }
}

/// A single combination: one value per declared axis, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixRow {
    values: IndexMap<String, AxisValue>,
}

impl MatrixRow {
    pub fn get(&self, axis: &str) -> Option<&AxisValue> {
        self.values.get(axis)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AxisValue)> {
        self.values.iter().map(|(axis, value)| (axis.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Axis name to canonical value
    pub fn canonical(&self) -> IndexMap<String, String> {
        self.values
            .iter()
            .map(|(axis, value)| (axis.clone(), value.value().to_string()))
            .collect()
    }
}

impl FromIterator<(String, AxisValue)> for MatrixRow {
    fn from_iter<T: IntoIterator<Item = (String, AxisValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// The declared axes of a document
#[derive(Debug, Clone, Default)]
pub struct Matrix {
    axes: IndexMap<String, Vec<AxisValue>>,
}

impl Matrix {
    /// Read the value of the `matrix` option. Every axis must be a list of scalars; values
    /// that share a canonical token are merged into one.
    pub fn from_value(value: &RawValue) -> Result<Self, ResolveError> {
        let Some(mapping) = value.as_mapping() else {
            return Err(ResolveError::TypeMismatch {
                option: crate::schema::MATRIX.to_string(),
                accepted: vec![ValueKind::Map],
                actual: value.kind(),
                span: *value.span(),
            });
        };

        let mut axes = IndexMap::new();
        for (axis_key, axis_value) in mapping.iter() {
            let axis = axis_key.as_str();
            if axis.contains(':') {
                return Err(ResolveError::InvalidCondition {
                    key: axis.to_string(),
                    reason: "matrix axes cannot be conditioned".to_string(),
                    span: *axis_key.span(),
                });
            }
            if axis == BRANCH_AXIS {
                return Err(ResolveError::InvalidValue {
                    option: format!("{}.{axis}", crate::schema::MATRIX),
                    reason: "'branch' is reserved for conditions on the repository branch"
                        .to_string(),
                    span: *axis_key.span(),
                });
            }

            let Some(list) = axis_value.as_list() else {
                return Err(ResolveError::TypeMismatch {
                    option: format!("{}.{axis}", crate::schema::MATRIX),
                    accepted: vec![ValueKind::List],
                    actual: axis_value.kind(),
                    span: *axis_value.span(),
                });
            };

            let mut values: Vec<AxisValue> = Vec::new();
            for (index, item) in list.iter().enumerate() {
                let Some(scalar) = item.as_scalar() else {
                    return Err(ResolveError::TypeMismatch {
                        option: format!("{}.{axis}[{index}]", crate::schema::MATRIX),
                        accepted: vec![ValueKind::Scalar],
                        actual: item.kind(),
                        span: *item.span(),
                    });
                };
                let parsed = AxisValue::parse(scalar.as_str());
                match values.iter_mut().find(|v| v.value == parsed.value) {
                    Some(existing) => existing.absorb(parsed),
                    None => values.push(parsed),
                }
            }
            axes.insert(axis.to_string(), values);
        }

        Ok(Self { axes })
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Axis name to its canonical values, in declaration order
    pub fn canonical_values(&self) -> IndexMap<String, Vec<String>> {
        self.axes
            .iter()
            .map(|(axis, values)| {
                let values = values.iter().map(|v| v.value().to_string()).collect();
                (axis.clone(), values)
            })
            .collect()
    }

    /// The full cartesian product. The first axis varies slowest. No axes gives a single
    /// empty row; an axis without values gives no rows.
    pub fn rows(&self) -> Vec<MatrixRow> {
        let axes: Vec<_> = self.axes.iter().collect();
        let mut rows = Vec::new();
        let mut current = Vec::with_capacity(axes.len());
        find_combinations(&axes, 0, &mut current, &mut rows);
        rows
    }
}

/// Recursively compute all combinations of axis values
fn find_combinations(
    axes: &[(&String, &Vec<AxisValue>)],
    index: usize,
    current: &mut Vec<(String, AxisValue)>,
    result: &mut Vec<MatrixRow>,
) {
    if index == axes.len() {
        result.push(current.iter().cloned().collect());
        return;
    }

    let (axis, values) = axes[index];
    for value in values.iter() {
        current.push((axis.clone(), value.clone()));
        find_combinations(axes, index + 1, current, result);
        current.pop();
    }
}

/// An `exclude` entry: rows its key matches are dropped (or kept again, for `false`)
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    key: ConditionalKey,
    excluded: bool,
}

impl ExclusionRule {
    pub fn new(key: ConditionalKey, excluded: bool) -> Self {
        Self { key, excluded }
    }

    pub fn key(&self) -> &ConditionalKey {
        &self.key
    }

    pub fn excluded(&self) -> bool {
        self.excluded
    }
}

/// Whether a row is excluded. Rules are declared in order and the last one whose key
/// matches the row decides.
pub fn is_excluded(rules: &[ExclusionRule], row: &MatrixRow, branch: &str) -> bool {
    rules
        .iter()
        .rev()
        .find(|rule| rule.key.matches(row, branch))
        .is_some_and(|rule| rule.excluded)
}
