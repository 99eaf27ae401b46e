//! Elimination orders.
//!
//! An elimination order decides the size of the largest intermediate factor built during
//! variable elimination (the induced width), so it determines cost but never correctness.

use crate::model::Model;
use crate::util::{Error, Result};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use std::collections::HashSet;


/// Selects the heuristic used to compute an elimination order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderHeuristic {
    /// Greedily eliminate the variable with the fewest neighbors
    MinDegree,

    /// A random permutation drawn from a generator seeded with the given value
    Random(u64),
}

impl Default for OrderHeuristic {

    fn default() -> Self {
        OrderHeuristic::MinDegree
    }
}

impl OrderHeuristic {

    /// Compute an order over the variables of `model` that are not in `excluded`
    pub fn order<M: Model + ?Sized>(&self, model: &M, excluded: &[String]) -> Result<Vec<String>> {
        match *self {
            OrderHeuristic::MinDegree => min_degree_order_excluding(model, excluded),
            OrderHeuristic::Random(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut order = random_order(model, &mut rng)?;
                order.retain(|v| !excluded.contains(v));
                Ok(order)
            }
        }
    }
}


/// Compute an elimination order over all variables of a Bayesian network with the min-degree
/// heuristic.
///
/// # Errors
/// * `Error::UnsupportedModel` if `model` is not a `BayesianNetwork`
pub fn min_degree_order<M: Model + ?Sized>(model: &M) -> Result<Vec<String>> {
    min_degree_order_excluding(model, &[])
}


/// Compute a min-degree elimination order over the variables of a Bayesian network that are not
/// in `excluded`.
///
/// The excluded variables stay in the interaction graph, so they still count towards the degree
/// of their neighbors and receive fill-in edges, but are never picked. Ties are broken in favor
/// of the variable that was added to the network first.
///
/// # Errors
/// * `Error::UnsupportedModel` if `model` is not a `BayesianNetwork`
pub fn min_degree_order_excluding<M: Model + ?Sized>(
    model: &M,
    excluded: &[String]
) -> Result<Vec<String>> {
    let net = model.as_bayesian_network().ok_or(Error::UnsupportedModel)?;

    let mut graph = net.interaction_graph();
    let mut candidates: Vec<usize> = (0..graph.num_vertices())
        .filter(|&i| !excluded.iter().any(|e| e == graph.name(i)))
        .collect();

    let mut order = Vec::with_capacity(candidates.len());
    loop {
        // min_by_key keeps the first of several minima
        let (pos, next) = match candidates.iter()
                                          .enumerate()
                                          .min_by_key(|&(_, &i)| graph.degree(i)) {
            Some((pos, &i)) => (pos, i),
            None => break
        };
        candidates.remove(pos);

        tracing::trace!(variable = graph.name(next), degree = graph.degree(next), "eliminating");
        graph.eliminate(next);
        order.push(String::from(graph.name(next)));
    }

    tracing::debug!(?order, "min-degree elimination order");
    Ok(order)
}


/// Compute a uniformly random permutation of the variables of a Bayesian network.
///
/// # Errors
/// * `Error::UnsupportedModel` if `model` is not a `BayesianNetwork`
pub fn random_order<M, R>(model: &M, rng: &mut R) -> Result<Vec<String>>
    where M: Model + ?Sized,
          R: Rng + ?Sized
{
    let net = model.as_bayesian_network().ok_or(Error::UnsupportedModel)?;

    let mut order = net.node_names();
    order.shuffle(rng);
    Ok(order)
}


/// The induced width of an elimination order: the size, minus one, of the largest clique formed
/// while eliminating the variables of `order` from the interaction graph of `model`.
///
/// # Errors
/// * `Error::UnknownVariable` if `order` names a variable that is not in the model
/// * `Error::DuplicateVariable` if `order` names a variable twice
pub fn induced_width<M: Model + ?Sized>(model: &M, order: &[String]) -> Result<usize> {
    let mut graph = model.interaction_graph();
    let mut seen = HashSet::new();
    let mut width = 0;

    for var in order {
        let idx = graph.index_of(var).ok_or_else(|| Error::UnknownVariable(var.clone()))?;
        if !seen.insert(idx) {
            return Err(Error::DuplicateVariable(var.clone()));
        }
        width = width.max(graph.eliminate(idx).len());
    }

    Ok(width)
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::fixtures::{random_network, sprinkler};
    use crate::model::MarkovNetwork;
    use crate::variable::names;

    use proptest::prelude::*;

    #[test]
    fn min_degree_sprinkler() {
        let net = sprinkler();
        let order = min_degree_order(&net).unwrap();

        assert_eq!(names(vec!["slippery_road", "winter", "sprinkler", "rain", "wet_grass"]), order);
        assert_eq!(2, induced_width(&net, &order).unwrap());
    }

    #[test]
    fn min_degree_excluding() {
        let net = sprinkler();
        let excluded = names(vec!["winter", "rain"]);
        let order = min_degree_order_excluding(&net, &excluded).unwrap();

        assert_eq!(3, order.len());
        assert!(!order.contains(&String::from("winter")));
        assert!(!order.contains(&String::from("rain")));
        assert_eq!("slippery_road", order[0]);
    }

    #[test]
    fn random_order_permutes() {
        let net = sprinkler();
        let mut rng = StdRng::seed_from_u64(3);
        let order = random_order(&net, &mut rng).unwrap();

        let mut expected = net.node_names();
        let mut sorted = order.clone();
        expected.sort();
        sorted.sort();
        assert_eq!(expected, sorted);

        // reproducible for a fixed seed
        let again = OrderHeuristic::Random(9).order(&net, &[]).unwrap();
        assert_eq!(again, OrderHeuristic::Random(9).order(&net, &[]).unwrap());
    }

    #[test]
    fn only_bayesian_networks() {
        let markov = MarkovNetwork::from(&sprinkler());

        let err = min_degree_order(&markov).unwrap_err();
        assert_eq!(Error::UnsupportedModel, err);
        assert_eq!("Only Bayesian Networks are currently supported.", err.to_string());

        let mut rng = StdRng::seed_from_u64(0);
        let err = random_order(&markov, &mut rng).unwrap_err();
        assert_eq!("Only Bayesian Networks are currently supported.", err.to_string());
    }

    #[test]
    fn induced_width_errors() {
        let net = sprinkler();
        assert!(induced_width(&net, &names(vec!["nope"])).is_err());
        assert!(induced_width(&net, &names(vec!["rain", "rain"])).is_err());

        // eliminating rain first connects everything around it
        assert_eq!(4, induced_width(&net, &names(vec!["rain"])).unwrap());
    }

    proptest! {
        #[test]
        fn orders_are_permutations(seed in 0u64..500, size in 1usize..9) {
            let net = random_network(seed, size);
            let mut expected = net.node_names();
            expected.sort();

            let mut order = min_degree_order(&net).unwrap();
            order.sort();
            prop_assert_eq!(&expected, &order);

            let mut order = OrderHeuristic::Random(seed).order(&net, &[]).unwrap();
            order.sort();
            prop_assert_eq!(&expected, &order);
        }
    }
}
