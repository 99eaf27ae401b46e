//! Exact inference by variable elimination.
//!
//! `naive_marginals` is the textbook baseline: build the full joint, reduce, sum out. Its cost is
//! exponential in the number of variables in the network, so it is only fit for small networks
//! and for checking the other engines.
//!
//! `bucket_marginals` is an implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE.
//! Its cost is exponential in the induced width of the elimination order only.

use crate::diagnostics::Outcome;
use crate::factor::Factor;
use crate::model::Model;
use crate::util::Result;
use crate::variable::Evidence;
use super::order::OrderHeuristic;
use super::{domains_of, finish, free_variables, resolve_evidence, resolve_query};


/// Compute ```P(query | evidence)``` from the full joint distribution of `model`.
///
/// Unknown query or evidence variables are dropped with a warning.
///
/// # Errors
/// * `Error::UnknownValue` if an evidence value is not in its variable's domain
/// * `Error::ImpossibleEvidence` if the evidence has probability zero
pub fn naive_marginals<M, K>(model: &M, query: &[K], evidence: &Evidence) -> Result<Outcome<Factor>>
    where M: Model + ?Sized,
          K: AsRef<str>
{
    let domains = domains_of(model);
    let (query, mut warnings) = resolve_query(&domains, query);
    let (evidence, evidence_warnings) = resolve_evidence(&domains, evidence)?;
    warnings.extend(evidence_warnings);

    let joint = model.factors()
                     .iter()
                     .try_fold(Factor::identity(), |acc, f| acc.product(f))?;
    tracing::debug!(scope = ?joint.variables(), "built the full joint");

    let free = free_variables(&query, &evidence);
    let joint = joint.reduce(&evidence)?.marginalize_to(&free)?;

    let res = finish(joint, &query, &evidence, &domains)?;
    Ok(Outcome::new(res, warnings))
}


/// Compute ```P(query | evidence)``` by bucket elimination.
///
/// # Args
/// * `order`: the order in which to eliminate the hidden variables. Query, evidence and unknown
///   variables in it are skipped; hidden variables missing from it are eliminated last, in
///   network order. If `None`, the min-degree order over the hidden variables is used.
///
/// # Errors
/// * `Error::UnsupportedModel` if `order` is `None` and `model` is not a `BayesianNetwork`
/// * `Error::UnknownValue` if an evidence value is not in its variable's domain
/// * `Error::ImpossibleEvidence` if the evidence has probability zero
pub fn bucket_marginals<M, K>(
    model: &M,
    query: &[K],
    evidence: &Evidence,
    order: Option<&[String]>
) -> Result<Outcome<Factor>>
    where M: Model + ?Sized,
          K: AsRef<str>
{
    match order {
        Some(order) => eliminate(model, query, evidence, |_, _| Ok(order.to_vec())),
        None => bucket_marginals_with(model, query, evidence, &OrderHeuristic::MinDegree)
    }
}


/// Compute ```P(query | evidence)``` by bucket elimination, eliminating the hidden variables in
/// the order chosen by `heuristic`.
///
/// # Errors
/// * `Error::UnsupportedModel` if `model` is not a `BayesianNetwork`
/// * `Error::UnknownValue` if an evidence value is not in its variable's domain
/// * `Error::ImpossibleEvidence` if the evidence has probability zero
pub fn bucket_marginals_with<M, K>(
    model: &M,
    query: &[K],
    evidence: &Evidence,
    heuristic: &OrderHeuristic
) -> Result<Outcome<Factor>>
    where M: Model + ?Sized,
          K: AsRef<str>
{
    eliminate(model, query, evidence, |model, excluded| heuristic.order(model, excluded))
}


/// Sum-Product-VE with the elimination order produced by `order_for`, which receives the model
/// and the query and evidence variables.
fn eliminate<M, K, F>(model: &M, query: &[K], evidence: &Evidence, order_for: F)
    -> Result<Outcome<Factor>>
    where M: Model + ?Sized,
          K: AsRef<str>,
          F: FnOnce(&M, &[String]) -> Result<Vec<String>>
{
    let domains = domains_of(model);
    let (query, mut warnings) = resolve_query(&domains, query);
    let (evidence, evidence_warnings) = resolve_evidence(&domains, evidence)?;
    warnings.extend(evidence_warnings);

    let mut excluded = query.clone();
    excluded.extend(evidence.variables().map(String::from));

    // only hidden variables are eliminated, each once
    let mut order: Vec<String> = Vec::with_capacity(domains.len());
    for var in order_for(model, &excluded)? {
        if domains.contains_key(&var) && !excluded.contains(&var) && !order.contains(&var) {
            order.push(var);
        }
    }
    for var in domains.keys() {
        if !excluded.contains(var) && !order.contains(var) {
            order.push(var.clone());
        }
    }
    tracing::debug!(?order, "bucket elimination order");

    let mut phis = model.factors()
                        .iter()
                        .map(|f| f.reduce(&evidence))
                        .collect::<Result<Vec<Factor>>>()?;

    for var in order.iter() {
        // Time to get rid of var
        let (bucket, rest): (Vec<Factor>, Vec<Factor>) = phis.into_iter()
                                                            .partition(|f| f.contains(var));
        phis = rest;
        if bucket.is_empty() {
            continue;
        }

        // product step - multiply factors with var
        let psi = bucket.iter().try_fold(Factor::identity(), |acc, phi| acc.product(phi))?;

        // sum step - marginalize psi over var
        let tau = psi.marginalize(var)?;
        tracing::trace!(variable = var.as_str(), scope = ?tau.variables(), "eliminated");
        phis.push(tau);
    }

    // multiply together the remaining phis, which only mention the free query variables
    let joint = phis.iter().try_fold(Factor::identity(), |acc, phi| acc.product(phi))?;
    let joint = joint.marginalize_to(&free_variables(&query, &evidence))?;

    let res = finish(joint, &query, &evidence, &domains)?;
    Ok(Outcome::new(res, warnings))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Warning;
    use crate::fixtures::{assert_table_close, random_network, sprinkler};
    use crate::inference::order::min_degree_order;
    use crate::model::MarkovNetwork;
    use crate::variable::names;
    use crate::util::Error;

    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[test]
    fn explicit_order() {
        let net = sprinkler();
        let evidence = Evidence::new().with("winter", "true");

        // query and evidence variables and unknown names in the order are skipped
        let order = names(vec!["winter", "rain", "nope", "wet_grass", "rain"]);
        let res = bucket_marginals(&net, &["slippery_road"], &evidence, Some(&order[..])).unwrap();

        // P(slippery_road | winter) = 0.8 * 0.7
        assert_eq!(vec!["slippery_road"], res.variables());
        assert_table_close(&array![0.56, 0.44].into_dyn(), res.potentials(), 1e-9);
        assert!(res.is_clean());
    }

    #[test]
    fn empty_order_still_answers() {
        let net = sprinkler();
        let res = bucket_marginals(&net, &["slippery_road"], &Evidence::new(), Some(&[][..]))
            .unwrap();
        assert_table_close(&array![0.364, 0.636].into_dyn(), res.potentials(), 1e-9);
    }

    #[test]
    fn only_unknown_query_variables() {
        let net = sprinkler();
        let res = bucket_marginals(&net, &["nope"], &Evidence::new(), None).unwrap();

        assert!(res.is_scalar());
        assert!((1.0 - res.sum()).abs() < 1e-9);
        assert_eq!(vec![Warning::UnknownVariable(String::from("nope"))], res.warnings);
    }

    #[test]
    fn markov_networks() {
        let markov = MarkovNetwork::from(&sprinkler());

        // the full joint works for any model
        let res = naive_marginals(&markov, &["winter"], &Evidence::new()).unwrap();
        assert_table_close(&array![0.6, 0.4].into_dyn(), res.potentials(), 1e-9);

        // so does bucket elimination with a given order
        let order = min_degree_order(&sprinkler()).unwrap();
        let res = bucket_marginals(&markov, &["winter"], &Evidence::new(), Some(&order[..]))
            .unwrap();
        assert_table_close(&array![0.6, 0.4].into_dyn(), res.potentials(), 1e-9);

        // but the orderings only support Bayesian networks
        let res = bucket_marginals(&markov, &["winter"], &Evidence::new(), None);
        assert_eq!(Some(Error::UnsupportedModel), res.err());
    }

    #[test]
    fn node_aliases() {
        let net = sprinkler();
        let rain = net.node("rain").unwrap();
        let evidence = Evidence::new().with(net.node("winter").unwrap(), "true");

        let res = naive_marginals(&net, &[rain], &evidence).unwrap();
        assert_table_close(&array![0.8, 0.2].into_dyn(), res.potentials(), 1e-9);
    }

    proptest! {
        #[test]
        fn order_independence(seed in 0u64..10_000, size in 2usize..7) {
            let net = random_network(seed, size);
            let mut vars = net.node_names();
            let mut rng = StdRng::seed_from_u64(seed);
            vars.shuffle(&mut rng);

            let query = &vars[..1];
            let evidence: Evidence = vars[1..2].iter()
                .map(|v| (v.clone(), net.node(v).unwrap().values()[0].clone()))
                .collect();

            let naive = naive_marginals(&net, query, &evidence).unwrap();
            let mut order = net.node_names();
            order.shuffle(&mut rng);

            let bucket = bucket_marginals(&net, query, &evidence, Some(&order[..])).unwrap();
            prop_assert!((bucket.sum() - 1.0).abs() < 1e-6);
            assert_table_close(naive.potentials(), bucket.potentials(), 1e-6);
        }
    }
}
