//! Exact inference over discrete Bayesian networks: a named-axis factor algebra, elimination
//! orders, variable elimination and junction trees.

#[cfg_attr(test, macro_use)]
extern crate itertools;
#[macro_use]
extern crate ndarray;

pub mod diagnostics;
pub mod factor;
pub mod graph;
pub mod inference;
pub mod init;
pub mod marginal;
pub mod model;
pub mod util;
pub mod variable;

#[cfg(test)]
mod fixtures;

pub use crate::diagnostics::{Outcome, Warning};
pub use crate::factor::{Factor, Table};
pub use crate::inference::{bucket_marginals, bucket_marginals_with, induced_width,
                           min_degree_order, naive_marginals, random_order, FactorTree,
                           OrderHeuristic};
pub use crate::init::Initialization;
pub use crate::marginal::{Marginal, Probabilities, Selection};
pub use crate::model::{BayesianNetwork, BayesianNetworkBuilder, MarkovNetwork,
                       MarkovNetworkBuilder, Model};
pub use crate::util::{Error, Result};
pub use crate::variable::{Domains, Evidence};
