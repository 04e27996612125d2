//! `{placeholder}` replacement in resolved values
//!
//! A placeholder is looked up, in order, in the matrix row (canonical value), the free-form
//! variables and the repository (`name`, `branch`). `{{` and `}}` are literal braces.

use std::{borrow::Cow, sync::LazyLock};

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::{error::ResolveError, matrix::MatrixRow, repository::Repository, value::Value};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("placeholder pattern is valid")
});

/// Everything a placeholder can refer to while resolving one job
pub struct Substitution<'a> {
    row: &'a MatrixRow,
    variables: &'a IndexMap<String, Value>,
    repository: &'a Repository,
}

impl<'a> Substitution<'a> {
    pub fn new(
        row: &'a MatrixRow,
        variables: &'a IndexMap<String, Value>,
        repository: &'a Repository,
    ) -> Self {
        Self {
            row,
            variables,
            repository,
        }
    }

    fn lookup(&self, name: &str) -> Option<Cow<'a, str>> {
        if let Some(value) = self.row.get(name) {
            return Some(Cow::Borrowed(value.value()));
        }
        if let Some(value) = self.variables.get(name) {
            return match value {
                Value::Scalar(s) => Some(Cow::Borrowed(s.as_str())),
                Value::List(_) => Some(Cow::Owned(value.scalars().join(","))),
                Value::Map(_) => None,
            };
        }
        match name {
            "name" => Some(Cow::Borrowed(self.repository.name.as_str())),
            "branch" => Some(Cow::Borrowed(self.repository.branch.as_str())),
            _ => None,
        }
    }

    /// Replace the placeholders of one string. `path` names the value in error messages.
    pub fn text(&self, text: &str, path: &str) -> Result<String, ResolveError> {
        let mut error = None;
        let replaced = PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
            if error.is_some() {
                return Cow::Borrowed("");
            }
            match &caps[0] {
                "{{" => Cow::Borrowed("{"),
                "}}" => Cow::Borrowed("}"),
                "{" | "}" => {
                    error = Some(ResolveError::MalformedPlaceholder {
                        option: path.to_string(),
                        text: text.to_string(),
                    });
                    Cow::Borrowed("")
                }
                _ => {
                    let name = &caps[1];
                    match self.lookup(name) {
                        Some(value) => value,
                        None => {
                            error = Some(ResolveError::MissingSubstitution {
                                placeholder: name.to_string(),
                                option: path.to_string(),
                            });
                            Cow::Borrowed("")
                        }
                    }
                }
            }
        });

        match error {
            Some(err) => Err(err),
            None => Ok(replaced.into_owned()),
        }
    }

    /// Replace the placeholders of every string inside a value. Mapping keys are kept as
    /// they are.
    pub fn value(&self, value: &Value, path: &str) -> Result<Value, ResolveError> {
        Ok(match value {
            Value::Scalar(s) => Value::Scalar(self.text(s, path)?),
            Value::List(items) => Value::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.value(item, &format!("{path}[{index}]")))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(map) => Value::Map(
                map.iter()
                    .map(|(key, item)| {
                        Ok((key.clone(), self.value(item, &format!("{path}.{key}"))?))
                    })
                    .collect::<Result<_, ResolveError>>()?,
            ),
        })
    }

    /// Substitute a whole option map, naming each value after its option
    pub fn map(
        &self,
        values: &IndexMap<String, Value>,
    ) -> Result<IndexMap<String, Value>, ResolveError> {
        values
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.value(value, name)?)))
            .collect()
    }
}
