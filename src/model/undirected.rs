//! Defines a `MarkovNetwork` which is an undirected model that represents the factorization of a
//! probability distribution P

use crate::factor::Factor;
use crate::util::{Error, Result};
use crate::variable::{Domains, Evidence};
use super::{BayesianNetwork, Model};

/// Represents a Markov Network - an Undirected Probabilistic Graphical Model.
///
/// # Representation
/// Although a Markov Network typically is represented as a graph, this representation does not
/// explicitly define the graph structure. Instead, it uses a logical view of a Markov Network
/// as a collection of `Factor`s to present the semantics of operations over a Markov Network.
#[derive(Clone, Debug)]
pub struct MarkovNetwork {

    /// The `Factor`s that comprise the `MarkovNetwork`
    factors: Vec<Factor>,

    /// The variables that comprise the `MarkovNetwork` and their domains
    domains: Domains,

    /// The partition function of the Gibbs Distribution.
    partition: f64

}


impl MarkovNetwork {

    /// Get the partition function of the network.
    pub fn partition(&self) -> f64 {
        self.partition
    }

    /// Condition the network given the evidence.
    ///
    /// # Returns:
    /// a new `MarkovNetwork` with scope ```self.vars() - evidence.keys()``` that represents the
    /// conditional distribution ```P(self.scope() - evidence.keys() | evidence.keys())```
    pub fn condition(&self, evidence: &Evidence) -> Result<Self> {
        let factors = self.factors.iter()
                                  .map(|f| f.reduce(evidence))
                                  .collect::<Result<Vec<Factor>>>()?;
        let domains: Domains = self.domains.iter()
                                           .filter(|(v, _)| !evidence.contains(v))
                                           .map(|(k, v)| (k.clone(), v.clone()))
                                           .collect();

        let partition = compute_partition(&domains, &factors)?;
        Ok(MarkovNetwork { factors, domains, partition })
    }

    /// Determine the probability of a full assignment to the variables in the network.
    pub fn probability(&self, assignment: &Evidence) -> Result<f64> {
        // for every factor in the graph
        self.factors.iter()
                    // get the value of the assignment
                    .map(|f| f.value(assignment))
                    // and multiply those values together
                    // but if there are any errors, just return the error
                    .fold(Ok(1.0), |acc, val| acc.and_then(|p| val.map(|v| p * v)))
                    // and finally normalize by the partition function
                    .map(|v| v / self.partition)
    }
}


impl Model for MarkovNetwork {

    fn variable_names(&self) -> Vec<String> {
        self.domains.keys().cloned().collect()
    }

    fn domain(&self, name: &str) -> Option<&[String]> {
        self.domains.get(name).map(|v| v.as_slice())
    }

    fn factors(&self) -> Vec<Factor> {
        self.factors.clone()
    }
}


/// The moralized view of a `BayesianNetwork`: one factor per CPD, partition function 1.
impl<'a> From<&'a BayesianNetwork> for MarkovNetwork {

    fn from(net: &'a BayesianNetwork) -> Self {
        MarkovNetwork {
            factors: net.joint_factors(),
            domains: net.domains(),
            partition: 1.0
        }
    }
}


/// Utility function to compute the partition function given a set of `Factor`s.
fn compute_partition(domains: &Domains, factors: &[Factor]) -> Result<f64> {
    let joint = factors.iter()
                       .try_fold(Factor::ones(domains.clone()), |acc, f| acc.product(f))?;
    Ok(joint.sum())
}


/// An implementation of the [builder pattern] for creating a `MarkovNetwork`.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct MarkovNetworkBuilder {

    /// The `Factor`s added to the `MarkovNetwork`
    factors: Vec<Factor>,

    /// The domains of every variable seen so far
    domains: Domains,

    /// The error state of the builder, if any
    err: Option<Error>

}

impl MarkovNetworkBuilder {

    /// Construct a new `MarkovNetworkBuilder`
    pub fn new() -> MarkovNetworkBuilder {
        MarkovNetworkBuilder {
            factors: Vec::new(),
            domains: Domains::new(),
            err: None
        }
    }


    /// Add a `Factor` to the `MarkovNetwork`. Variables shared with earlier factors must have the
    /// same domain.
    pub fn with_factor(mut self, factor: Factor) -> Self {
        if self.err.is_some() {
            return self;
        }

        if factor.potentials().iter().any(|&v| v < 0.0) {
            self.err = Some(Error::NegativeProbability);
            return self;
        }

        for (var, values) in factor.values().iter() {
            match self.domains.get(var) {
                Some(existing) if existing != values => {
                    self.err = Some(Error::InvalidScope(format!(
                        "variable {} has domains {:?} and {:?}", var, existing, values
                    )));
                    return self;
                },
                Some(_) => (),
                None => { self.domains.insert(var.clone(), values.clone()); }
            }
        }

        self.factors.push(factor);
        self
    }


    /// Build the `MarkovNetwork`, computing its partition function
    pub fn build(self) -> Result<MarkovNetwork> {
        if let Some(e) = self.err {
            return Err(e);
        }

        let partition = compute_partition(&self.domains, &self.factors)?;
        Ok(MarkovNetwork {
            factors: self.factors,
            domains: self.domains,
            partition
        })
    }

}

impl Default for MarkovNetworkBuilder {

    fn default() -> Self {
        MarkovNetworkBuilder::new()
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::fixtures::sprinkler;
    use crate::variable::domains;

    fn pair(x: &str, y: &str, table: crate::factor::Table) -> Factor {
        let d = domains(vec![(x, vec!["0", "1"]), (y, vec!["0", "1"])]);
        Factor::new(d, table).unwrap()
    }

    fn assignment(values: &[(&str, &str)]) -> Evidence {
        values.iter().cloned().collect()
    }

    #[test]
    /// Tests the implementation of `MarkovNetwork` using the Misconception example from Koller &
    /// Friedman Section 4.1
    fn misconception() {
        ///////////////////////////////////////////////////////////////////////////////////////////
        // TEST BUILDING THE MODEL
        let model = MarkovNetworkBuilder::new()
            .with_factor(pair("A", "B", array![[30.0, 5.0], [1.0, 10.0]].into_dyn()))
            .with_factor(pair("B", "C", array![[100.0, 1.0], [1.0, 100.0]].into_dyn()))
            .with_factor(pair("C", "D", array![[1.0, 100.0], [100.0, 1.0]].into_dyn()))
            .with_factor(pair("D", "A", array![[100.0, 1.0], [1.0, 100.0]].into_dyn()))
            .build()
            .unwrap();

        assert_eq!(7_201_840.0, model.partition());
        assert_eq!(4, model.num_variables());

        ///////////////////////////////////////////////////////////////////////////////////////////
        // TEST PROBABILITIES
        let p = model.probability(&assignment(&[("A", "0"), ("B", "0"), ("C", "0"), ("D", "0")]));
        assert!((0.04 - p.unwrap()).abs() < 0.005);

        let p = model.probability(&assignment(&[("A", "0"), ("B", "1"), ("C", "1"), ("D", "0")]));
        assert!((0.69 - p.unwrap()).abs() < 0.005);

        let p = model.probability(&assignment(&[("A", "1"), ("B", "0"), ("C", "0"), ("D", "1")]));
        assert!((0.14 - p.unwrap()).abs() < 0.005);

        // test incomplete assignment
        assert!(model.probability(&assignment(&[("A", "1"), ("B", "1")])).is_err());

        ///////////////////////////////////////////////////////////////////////////////////////////
        // TEST CONDITIONING
        let new_model = model.condition(&assignment(&[("A", "0"), ("C", "1")])).unwrap();
        assert_eq!(2, new_model.num_variables());
        assert!(new_model.contains("B"));
        assert!(new_model.contains("D"));

        let p = new_model.probability(&assignment(&[("B", "0"), ("D", "0")])).unwrap();
        assert!((0.057 - p).abs() < 0.0005);
    }

    #[test]
    fn mismatched_domains() {
        let ab = pair("A", "B", array![[1.0, 1.0], [1.0, 1.0]].into_dyn());
        let d = domains(vec![("B", vec!["x", "y", "z"])]);
        let b = Factor::new(d, array![1.0, 1.0, 1.0].into_dyn()).unwrap();

        let res = MarkovNetworkBuilder::new().with_factor(ab).with_factor(b).build();
        assert!(res.is_err());
    }

    #[test]
    fn from_bayesian_network() {
        let net = sprinkler();
        let markov = MarkovNetwork::from(&net);

        assert_eq!(1.0, markov.partition());
        assert_eq!(net.variable_names(), markov.variable_names());
        assert!(markov.as_bayesian_network().is_none());

        let a = assignment(&[("winter", "true"), ("sprinkler", "false"), ("rain", "true"),
                             ("wet_grass", "true"), ("slippery_road", "false")]);
        let diff = net.probability(&a).unwrap() - markov.probability(&a).unwrap();
        assert!(diff.abs() < 1e-12);
    }
}
