//! Networks and helpers shared by the unit tests.

use crate::factor::Table;
use crate::init::Initialization;
use crate::model::{BayesianNetwork, BayesianNetworkBuilder};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const BOOL: [&str; 2] = ["true", "false"];
const BIT: [&str; 2] = ["0", "1"];


/// The sprinkler network of Darwiche, Modeling and Reasoning with Bayesian Networks, Figure 5.1
pub fn sprinkler() -> BayesianNetwork {
    let wet_grass = array![[[0.95, 0.1], [0.8, 0.0]],
                           [[0.05, 0.9], [0.2, 1.0]]].into_dyn();

    BayesianNetworkBuilder::new()
        .with_node("winter", &BOOL, &[], Initialization::Binomial(0.6))
        .with_node("sprinkler", &BOOL, &["winter"],
                   Initialization::Table(array![[0.2, 0.75], [0.8, 0.25]].into_dyn()))
        .with_node("rain", &BOOL, &["winter"],
                   Initialization::Table(array![[0.8, 0.1], [0.2, 0.9]].into_dyn()))
        .with_node("wet_grass", &BOOL, &["sprinkler", "rain"], Initialization::Table(wet_grass))
        .with_node("slippery_road", &BOOL, &["rain"],
                   Initialization::Table(array![[0.7, 0.0], [0.3, 1.0]].into_dyn()))
        .build()
        .expect("sprinkler network")
}


/// A variant of the student network of Koller & Friedman Figure 3.4 with binary grades.
///
/// Example 6d of [1] gives ```P(I = 1 | D = 0, L = 1, S = 0) = 0.02919708``` for it.
///
/// [1] https://www.uni-oldenburg.de/en/lcs/probabilistic-programming/webchurch-and-openbugs/
pub fn student() -> BayesianNetwork {
    let grade = array![[[0.3, 0.05], [0.9, 0.5]],
                       [[0.7, 0.95], [0.1, 0.5]]].into_dyn();

    BayesianNetworkBuilder::new()
        .with_node("D", &BIT, &[], Initialization::Binomial(0.6))
        .with_node("I", &BIT, &[], Initialization::Binomial(0.7))
        .with_node("G", &BIT, &["I", "D"], Initialization::Table(grade))
        .with_node("S", &BIT, &["I"],
                   Initialization::Table(array![[0.95, 0.2], [0.05, 0.8]].into_dyn()))
        .with_node("L", &BIT, &["G"],
                   Initialization::Table(array![[0.9, 0.4], [0.1, 0.6]].into_dyn()))
        .build()
        .expect("student network")
}


/// A random network of `size` nodes named ```x0, x1, ...```. Every node has two or three values
/// and at most two parents among the nodes before it; the CPDs are randomly initialized.
pub fn random_network(seed: u64, size: usize) -> BayesianNetwork {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = BayesianNetworkBuilder::new();
    let mut names: Vec<String> = Vec::with_capacity(size);

    for i in 0..size {
        let name = format!("x{}", i);
        let card = rng.gen_range(2..4);
        let values: Vec<String> = (0..card).map(|v| format!("v{}", v)).collect();
        let values: Vec<&str> = values.iter().map(|v| v.as_str()).collect();

        let k = rng.gen_range(0..=i.min(2));
        let parents: Vec<&str> = names.choose_multiple(&mut rng, k)
                                      .map(|p| p.as_str())
                                      .collect();

        builder = builder.with_node(&name, &values, &parents, Initialization::Random(rng.gen()));
        names.push(name);
    }

    builder.build().expect("random network")
}


/// Assert that two tables have the same shape and agree elementwise within `tol`
pub fn assert_table_close(expected: &Table, actual: &Table, tol: f64) {
    assert_eq!(expected.shape(), actual.shape(), "shape mismatch");
    for (e, a) in expected.iter().zip(actual.iter()) {
        assert!((e - a).abs() <= tol, "expected {}, got {}\nexpected: {}\nactual: {}",
                e, a, expected, actual);
    }
}
