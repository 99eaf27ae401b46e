//! Recoverable diagnostics raised by query entry points.
//!
//! A query that receives partially invalid input (an unknown variable, an unknown value for a
//! known variable) still returns a well-typed, best-effort result. The offending input is
//! reported as a `Warning` alongside the result and logged through `tracing`.

use std::fmt;
use std::ops::Deref;

/// A recoverable condition encountered while answering a query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Warning {

    /// The variable is not part of the entity being queried and was ignored
    UnknownVariable(String),

    /// The value is not in the domain of the variable; the full domain was used instead
    UnknownValue { variable: String, value: String },

}

impl Warning {

    /// Build an `UnknownVariable` warning and log it
    pub(crate) fn unknown_variable(name: &str) -> Self {
        tracing::warn!(variable = name, "ignoring unknown variable");
        Warning::UnknownVariable(String::from(name))
    }

    /// Build an `UnknownValue` warning and log it
    pub(crate) fn unknown_value(variable: &str, value: &str) -> Self {
        tracing::warn!(variable, value, "ignoring unknown value, using the full domain");
        Warning::UnknownValue { variable: String::from(variable), value: String::from(value) }
    }

    /// The name of the variable this warning concerns
    pub fn variable(&self) -> &str {
        match self {
            Warning::UnknownVariable(name) => name,
            Warning::UnknownValue { variable, .. } => variable,
        }
    }
}

impl fmt::Display for Warning {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::UnknownVariable(name) => {
                write!(f, "The variable {} is not part of this query target and will be ignored.",
                       name)
            },
            Warning::UnknownValue { variable, value } => {
                write!(f, "Unknown value ({}) for variable {}. Ignoring this value.",
                       value, variable)
            }
        }
    }
}


/// A query result together with the warnings raised while computing it.
#[derive(Clone, Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {

    pub fn new(value: T, warnings: Vec<Warning>) -> Self {
        Outcome { value, warnings }
    }

    /// `true`, if no warnings were raised
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Discard the warnings and return the value
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Outcome<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
