//! Defines a `BayesianNetwork`, which is a directed model that represents the factorization of
//! a probability distribution P

use crate::factor::Factor;
use crate::init::Initialization;
use crate::util::{Error, Result};
use crate::variable::{Domains, Evidence};
use super::Model;

use indexmap::IndexMap;


/// A discrete random variable of a `BayesianNetwork` together with its CPD.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteNode {

    /// The name of the node
    name: String,

    /// The ordered values the node can take
    values: Vec<String>,

    /// The names of the node's parents, in CPD axis order
    parents: Vec<String>,

    /// The CPD of the node: a `Factor` over ```[name] ++ parents```
    cpd: Factor

}

impl DiscreteNode {

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// The joint factor of the node: its CPD over ```[self] ++ parents```
    pub fn cpd(&self) -> &Factor {
        &self.cpd
    }
}

impl AsRef<str> for DiscreteNode {

    fn as_ref(&self) -> &str {
        &self.name
    }
}


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// A traditional graph data structure is not used for the representation of a
/// `BayesianNetwork`; instead, the parents recorded by each node implicitly define the edges of
/// the graph. The nodes are held in their topological order (the order they were added in) to
/// faciliate efficient computations over the graph.
#[derive(Clone, Debug)]
pub struct BayesianNetwork {

    /// The nodes of the network, keyed by name, in topological order
    nodes: IndexMap<String, DiscreteNode>

}

impl BayesianNetwork {

    /// Get a node by name
    ///
    /// # Errors
    /// * `Error::UnknownVariable` if there is no node with that name
    pub fn node(&self, name: &str) -> Result<&DiscreteNode> {
        self.nodes.get(name).ok_or_else(|| Error::UnknownVariable(String::from(name)))
    }

    /// All nodes, in topological order
    pub fn nodes(&self) -> impl Iterator<Item = &DiscreteNode> {
        self.nodes.values()
    }

    /// All node names, in topological order
    pub fn node_names(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The names of the nodes that have `name` as a parent
    pub fn children(&self, name: &str) -> Vec<&str> {
        self.nodes.values()
                  .filter(|n| n.parents.iter().any(|p| p == name))
                  .map(|n| n.name())
                  .collect()
    }

    /// The ordered domains of all nodes
    pub fn domains(&self) -> Domains {
        self.nodes.values().map(|n| (n.name.clone(), n.values.clone())).collect()
    }

    /// The joint factor of every node, in topological order
    pub fn joint_factors(&self) -> Vec<Factor> {
        self.nodes.values().map(|n| n.cpd.clone()).collect()
    }

    /// Determine the probability of a full assignment to the variables in the network by the
    /// chain rule.
    pub fn probability(&self, assignment: &Evidence) -> Result<f64> {
        self.nodes.values()
                  .map(|n| n.cpd.value(assignment))
                  .fold(Ok(1.0), |acc, val| acc.and_then(|p| val.map(|v| p * v)))
    }

    /// Condition the network given the evidence.
    ///
    /// # Returns:
    /// a new `BayesianNetwork` without the observed variables, whose CPDs are reduced by the
    /// evidence. Its joint distribution is ```P(X - E, E = e)``` up to the factor ```P(E = e)```
    /// contributed by the removed nodes.
    pub fn condition(&self, evidence: &Evidence) -> Result<BayesianNetwork> {
        let mut builder = BayesianNetworkBuilder::new();

        for node in self.nodes.values() {
            if evidence.contains(&node.name) {
                continue;
            }

            // if the variable is *not* in the evidence, it belongs in the new network with a
            // CPT reduced by the evidence
            let cpt = node.cpd.reduce(evidence)?;
            let parents: Vec<&str> = node.parents.iter()
                                                 .filter(|p| !evidence.contains(p))
                                                 .map(|p| p.as_str())
                                                 .collect();
            let values: Vec<&str> = node.values.iter().map(|v| v.as_str()).collect();

            builder = builder.with_node(
                &node.name,
                &values,
                &parents,
                Initialization::Table(cpt.potentials().clone())
            );
        }

        builder.build()
    }
}

impl Model for BayesianNetwork {

    fn variable_names(&self) -> Vec<String> {
        self.node_names()
    }

    fn domain(&self, name: &str) -> Option<&[String]> {
        self.nodes.get(name).map(|n| n.values())
    }

    fn factors(&self) -> Vec<Factor> {
        self.joint_factors()
    }

    fn num_variables(&self) -> usize {
        self.nodes.len()
    }

    fn as_bayesian_network(&self) -> Option<&BayesianNetwork> {
        Some(self)
    }
}


/// An implementation of the [builder pattern] for creating a `BayesianNetwork`.
///
/// At the moment, networks must be assembled in topological order: every parent has to be added
/// before its children, which also rules out cycles.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct BayesianNetworkBuilder {

    /// The nodes added so far
    nodes: IndexMap<String, DiscreteNode>,

    /// The error state of the builder
    err: Option<Error>

}


impl BayesianNetworkBuilder {

    /// Construct a new `BayesianNetworkBuilder` representing an empty `BayesianNetwork`
    pub fn new() -> Self {
        BayesianNetworkBuilder {
            nodes: IndexMap::new(),
            err: None
        }
    }


    /// Add a node to the `BayesianNetwork`.
    ///
    /// # Args
    /// * `name`: the unique name of the node
    /// * `values`: the ordered values of the node
    /// * `parents`: the names of the parents, in CPD axis order. The parents must already be in
    ///   the network.
    /// * `init`: the initialization mechanism for the CPD of the node.
    pub fn with_node(
        mut self,
        name: &str,
        values: &[&str],
        parents: &[&str],
        init: Initialization,
    ) -> Self {
        ///////////////////////////////////////////////////////////////////////
        // 1) if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Check for error conditions
        if self.nodes.contains_key(name) {
            self.err = Some(Error::DuplicateVariable(String::from(name)));
            return self;
        }

        let mut parent_domains = Domains::new();
        for &p in parents.iter() {
            match self.nodes.get(p) {
                Some(node) if p != name && !parent_domains.contains_key(p) => {
                    parent_domains.insert(String::from(p), node.values.clone());
                },
                Some(_) => {
                    self.err = Some(Error::DuplicateVariable(String::from(p)));
                    return self;
                },
                None => {
                    self.err = Some(Error::MissingParent(String::from(p)));
                    return self;
                }
            }
        }

        let values: Vec<String> = values.iter().map(|&v| String::from(v)).collect();

        ///////////////////////////////////////////////////////////////////////
        // 3) Build the factor based on the initialization
        let cpd = match init.build_cpd(name, &values, &parent_domains) {
            Ok(cpd) => cpd,
            Err(e) => {
                self.err = Some(e);
                return self;
            }
        };

        ///////////////////////////////////////////////////////////////////////
        // 4) Add to current network
        let node = DiscreteNode {
            name: String::from(name),
            values,
            parents: parent_domains.keys().cloned().collect(),
            cpd
        };
        self.nodes.insert(String::from(name), node);

        self
    }


    /// Complete building the network.
    ///
    /// # Returns
    /// the `BayesianNetwork`, or the first error generated during the building process
    pub fn build(self) -> Result<BayesianNetwork> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(BayesianNetwork { nodes: self.nodes })
        }
    }
}

impl Default for BayesianNetworkBuilder {

    fn default() -> Self {
        BayesianNetworkBuilder::new()
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::fixtures::sprinkler;

    #[test]
    fn build_empty() {
        let net = BayesianNetworkBuilder::new().build().unwrap();
        assert_eq!(0, net.len());
        assert!(net.is_empty());
        assert!(net.variable_names().is_empty());
    }

    #[test]
    /// Tests building a network with a single binary variable
    fn build_simple() {
        let net = BayesianNetworkBuilder::new()
            .with_node("foo", &["yes", "no"], &[], Initialization::Uniform)
            .build()
            .unwrap();

        assert_eq!(1, net.len());
        let node = net.node("foo").unwrap();
        assert_eq!("foo", node.name());
        assert_eq!(vec!["yes", "no"], node.values());
        assert!(node.parents().is_empty());

        let a = Evidence::new().with("foo", "yes");
        assert_eq!(0.5, node.cpd().value(&a).unwrap());
        assert!(net.node("bar").is_err());
    }

    #[test]
    fn build_errors() {
        // same name twice
        let res = BayesianNetworkBuilder::new()
            .with_node("a", &["0", "1"], &[], Initialization::Uniform)
            .with_node("a", &["0", "1"], &[], Initialization::Uniform)
            .build();
        match res {
            Err(e) => assert_eq!("The network already contains a node called 'a'.", e.to_string()),
            Ok(_) => panic!("duplicate node accepted")
        };

        // parent added after child
        let res = BayesianNetworkBuilder::new()
            .with_node("b", &["0", "1"], &["a"], Initialization::Uniform)
            .with_node("a", &["0", "1"], &[], Initialization::Uniform)
            .build();
        assert_eq!(Some(Error::MissingParent(String::from("a"))), res.err());

        // the first error sticks
        let res = BayesianNetworkBuilder::new()
            .with_node("a", &["0", "1"], &[], Initialization::Binomial(0.2))
            .with_node("b", &["0", "1", "2"], &["a"], Initialization::Binomial(0.2))
            .with_node("c", &["0", "1"], &["zz"], Initialization::Uniform)
            .build();
        assert_eq!(Some(Error::InvalidInitialization), res.err());
    }

    #[test]
    fn structure() {
        let net = sprinkler();
        assert_eq!(5, net.len());
        assert_eq!(vec!["winter", "sprinkler", "rain", "wet_grass", "slippery_road"],
                   net.node_names());

        let mut children = net.children("rain");
        children.sort();
        assert_eq!(vec!["slippery_road", "wet_grass"], children);
        assert_eq!(vec!["sprinkler", "rain"], net.node("wet_grass").unwrap().parents());

        let wet = net.node("wet_grass").unwrap().cpd();
        assert_eq!(vec!["wet_grass", "sprinkler", "rain"], wet.variables());
    }

    #[test]
    fn chain_rule_probability() {
        let net = sprinkler();
        let a = Evidence::new().with("winter", "true")
                               .with("sprinkler", "false")
                               .with("rain", "true")
                               .with("wet_grass", "true")
                               .with("slippery_road", "false");
        let expected = 0.6 * 0.8 * 0.8 * 0.8 * 0.3;
        assert!((expected - net.probability(&a).unwrap()).abs() < 1e-12);

        // partial assignment
        let a = Evidence::new().with("winter", "true");
        assert!(net.probability(&a).is_err());
    }

    #[test]
    fn condition() {
        let net = sprinkler();
        let evidence = Evidence::new().with("rain", "false");
        let conditioned = net.condition(&evidence).unwrap();

        assert_eq!(4, conditioned.len());
        assert!(conditioned.node("rain").is_err());
        assert_eq!(vec!["sprinkler"], conditioned.node("wet_grass").unwrap().parents());
        assert!(conditioned.node("slippery_road").unwrap().parents().is_empty());

        let a = Evidence::new().with("wet_grass", "true").with("sprinkler", "true");
        let p = conditioned.node("wet_grass").unwrap().cpd().value(&a).unwrap();
        assert!((0.1 - p).abs() < 1e-12);
    }

    #[test]
    fn node_alias() {
        let net = sprinkler();
        let node = net.node("rain").unwrap();
        let name: &str = node.as_ref();
        assert_eq!("rain", name);
        assert_eq!(Some(&["true".to_string(), "false".to_string()][..]), net.domain(node.as_ref()));
    }
}
