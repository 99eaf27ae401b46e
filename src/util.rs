//! Defines the `Error` type for the exact-bn library

use std::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {

    /// An ordering routine was handed something other than a Bayesian network
    #[error("Only Bayesian Networks are currently supported.")]
    UnsupportedModel,

    /// The normalization constant of a query result was zero, i.e. the evidence has
    /// probability zero under the model
    #[error("The evidence is impossible under the model (normalization constant is zero)")]
    ImpossibleEvidence,

    /// A value was not found in the domain of the given variable
    #[error("Unknown value '{value}' for variable '{variable}'")]
    UnknownValue { variable: String, value: String },

    /// Represents an incomplete assignment where a complete assignment was required.
    /// The value is the names of the variables that were missing from the assignment.
    #[error("Missing assignments to the required variables: {0:?}")]
    IncompleteAssignment(Vec<String>),

    /// A variable was looked up by name but is not part of the model
    #[error("The model does not contain a variable named '{0}'")]
    UnknownVariable(String),

    /// Attempted to sum out a variable that the `Factor` does not mention
    #[error("Variable '{0}' is not in the scope of the factor")]
    VariableNotInScope(String),

    /// Represents an error where a certain constraint on a scope was not satisfied
    #[error("Provided scope did not satisfy constraints: {0}")]
    InvalidScope(String),

    /// The shape of a table did not match the domains of its scope
    #[error("Table shape {actual:?} does not match the expected shape {expected:?}")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    /// Represents an error where there was a parent variable expected, but not found
    #[error("Parent '{0}' must be added to the network before its children")]
    MissingParent(String),

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    #[error("The network already contains a node called '{0}'.")]
    DuplicateVariable(String),

    /// The table provided for a node is not a conditional probability distribution
    #[error("The table for '{0}' is not a conditional probability distribution")]
    NotACPD(String),

    /// Represents an attempt to initialize a variable with an incompatible Initialization
    #[error("An invalid initialization was provided")]
    InvalidInitialization,

    /// Represents a situation in which there was a negative probability provided
    #[error("Encountered a negative probability")]
    NegativeProbability,

    /// The junction tree violates the running intersection property for this variable
    #[error("Running intersection property violated for variable '{0}'")]
    RunningIntersection(String),

}
