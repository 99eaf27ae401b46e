//! Provides an example of how to use exact-bn to perform inference on a Bayesian Network.
//!
//! Builds the sprinkler network of Darwiche, Modeling and Reasoning with Bayesian Networks,
//! Figure 5.1, and answers the same queries with every engine. Run with
//! ```RUST_LOG=exact_bn=debug``` to see the elimination orders and cliques.

#[macro_use]
extern crate ndarray;

use exact_bn as bn;
use tracing_subscriber::EnvFilter;

const BOOL: [&str; 2] = ["true", "false"];

fn main() -> bn::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    /////////////////////////////////////////////////////
    // Step 1: Build Model
    let net = build_model()?;

    /////////////////////////////////////////////////////
    // Step 2: Compile some evidence
    let evidence = bn::Evidence::new().with("wet_grass", "false");

    /////////////////////////////////////////////////////
    // Step 3: Run a Conditional Query with each engine
    let naive = bn::naive_marginals(&net, &["rain"], &evidence)?;
    report("naive", &naive);

    let bucket = bn::bucket_marginals(&net, &["rain"], &evidence, None)?;
    report("bucket", &bucket);

    let mut tree = bn::FactorTree::create_jointree(&net)?;
    println!("junction tree cliques: {:?}", tree.cliques());
    tree.set_evidence(&evidence)?;
    let jt = tree.marginals(&["rain"])?;
    report("junction tree", &jt);

    /////////////////////////////////////////////////////
    // Step 4: Read the result through a Marginal
    let marginal = bn::Marginal::from_factor(&jt);
    let p = marginal.get_probabilities(&bn::Selection::all().value("rain", "true"));
    println!("P(rain = true | wet_grass = false) = {:.6}", p.sum());

    let order = bn::min_degree_order(&net)?;
    let width = bn::induced_width(&net, &order)?;
    println!("min-degree order {:?} has induced width {}", order, width);

    Ok(())
}

fn report(engine: &str, res: &bn::Outcome<bn::Factor>) {
    for warning in res.warnings.iter() {
        println!("warning: {}", warning);
    }
    println!("{:>14}: P(rain | wet_grass = false) = {}", engine, res.potentials());
}

fn build_model() -> bn::Result<bn::BayesianNetwork> {
    let wet_grass = array![[[0.95, 0.1], [0.8, 0.0]],
                           [[0.05, 0.9], [0.2, 1.0]]].into_dyn();

    bn::BayesianNetworkBuilder::new()
        .with_node("winter", &BOOL, &[], bn::Initialization::Binomial(0.6))
        .with_node("sprinkler", &BOOL, &["winter"],
                   bn::Initialization::Table(array![[0.2, 0.75], [0.8, 0.25]].into_dyn()))
        .with_node("rain", &BOOL, &["winter"],
                   bn::Initialization::Table(array![[0.8, 0.1], [0.2, 0.9]].into_dyn()))
        .with_node("wet_grass", &BOOL, &["sprinkler", "rain"],
                   bn::Initialization::Table(wet_grass))
        .with_node("slippery_road", &BOOL, &["rain"],
                   bn::Initialization::Table(array![[0.7, 0.0], [0.3, 1.0]].into_dyn()))
        .build()
}
