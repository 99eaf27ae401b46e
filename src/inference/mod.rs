//! Exact inference over discrete Bayesian networks.
//!
//! Three engines answer marginal queries ```P(Y | E = e)```:
//! * `naive_marginals` multiplies out the full joint distribution,
//! * `bucket_marginals` eliminates the remaining variables one bucket at a time,
//! * `FactorTree` compiles the network into a junction tree once and answers repeated queries
//!   by message passing.
//!
//! All of them agree up to floating point error. The result is a `Factor` over the query
//! variables, in query order, that sums to one.

use crate::diagnostics::Warning;
use crate::factor::Factor;
use crate::model::Model;
use crate::util::{Error, Result};
use crate::variable::{Domains, Evidence};

pub mod factor_tree;
pub mod order;
pub mod variable_elimination;

pub use self::factor_tree::FactorTree;
pub use self::order::{induced_width, min_degree_order, min_degree_order_excluding, random_order,
                      OrderHeuristic};
pub use self::variable_elimination::{bucket_marginals, bucket_marginals_with, naive_marginals};


/// The ordered domains of every variable of `model`
fn domains_of<M: Model + ?Sized>(model: &M) -> Domains {
    model.variable_names()
         .into_iter()
         .filter_map(|v| model.domain(&v).map(|d| (v.clone(), d.to_vec())))
         .collect()
}


/// Resolve the requested query variables to names known to `domains`, dropping duplicates.
/// Unknown names are reported as warnings.
fn resolve_query<K: AsRef<str>>(domains: &Domains, query: &[K]) -> (Vec<String>, Vec<Warning>) {
    let mut names = Vec::with_capacity(query.len());
    let mut warnings = Vec::new();

    for var in query.iter().map(|v| v.as_ref()) {
        if !domains.contains_key(var) {
            warnings.push(Warning::unknown_variable(var));
        } else if !names.iter().any(|n| n == var) {
            names.push(String::from(var));
        }
    }

    (names, warnings)
}


/// Keep the observations of known variables. Observations of unknown variables are reported as
/// warnings.
///
/// # Errors
/// * `Error::UnknownValue` if a known variable is observed with a value outside its domain
fn resolve_evidence(domains: &Domains, evidence: &Evidence) -> Result<(Evidence, Vec<Warning>)> {
    let mut resolved = Evidence::new();
    let mut warnings = Vec::new();

    for (var, value) in evidence.iter() {
        match domains.get(var) {
            None => warnings.push(Warning::unknown_variable(var)),
            Some(values) if !values.iter().any(|v| v == value) => {
                return Err(Error::UnknownValue {
                    variable: String::from(var),
                    value: String::from(value)
                });
            },
            Some(_) => resolved.set(var, value)
        }
    }

    Ok((resolved, warnings))
}


/// The query variables that are not observed
fn free_variables(query: &[String], evidence: &Evidence) -> Vec<String> {
    query.iter().filter(|v| !evidence.contains(v)).cloned().collect()
}


/// Turn the unnormalized joint over the free query variables into the answer: normalize it,
/// put a point mass on every observed query variable and lay the axes out in query order.
///
/// # Errors
/// * `Error::ImpossibleEvidence` if `joint` sums to zero
fn finish(joint: Factor, query: &[String], evidence: &Evidence, domains: &Domains)
    -> Result<Factor>
{
    let mut res = joint.normalize()?;

    for var in query.iter() {
        if let (Some(value), Some(domain)) = (evidence.get(var), domains.get(var)) {
            res = res.product(&Factor::indicator(var, domain, value)?)?;
        }
    }

    res.reorder(query)
}
