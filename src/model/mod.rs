//! Defines a `Model`, which is a Bayesian (directed) or Markovian (undirected) graphical model
//! representing the factorization of a probability distribution P.

use crate::factor::Factor;
use crate::graph::InteractionGraph;

pub mod directed;
pub mod undirected;

pub use self::directed::{BayesianNetwork, BayesianNetworkBuilder, DiscreteNode};
pub use self::undirected::{MarkovNetwork, MarkovNetworkBuilder};

/// The `Model` trait represents a Probabilistic Graphical Model.
pub trait Model {

    /// Get the names of all variables in the model, in a stable order.
    fn variable_names(&self) -> Vec<String>;


    /// Get the ordered domain of a variable in the model.
    fn domain(&self, name: &str) -> Option<&[String]>;


    /// Get the `Factor`s whose product is the (unnormalized) distribution of the model.
    fn factors(&self) -> Vec<Factor>;


    /// Get the number of variables in the model.
    fn num_variables(&self) -> usize {
        self.variable_names().len()
    }


    /// Check if a variable with the given name is in the model.
    fn contains(&self, name: &str) -> bool {
        self.domain(name).is_some()
    }


    /// The undirected interaction graph: two variables are adjacent iff they share the scope
    /// of some factor of the model.
    fn interaction_graph(&self) -> InteractionGraph {
        let scopes: Vec<Vec<String>> = self.factors()
                                           .iter()
                                           .map(|f| f.variables().to_vec())
                                           .collect();
        InteractionGraph::new(self.variable_names(), &scopes)
    }


    /// View the model as a `BayesianNetwork`, if it is one.
    fn as_bayesian_network(&self) -> Option<&BayesianNetwork> {
        None
    }
}
