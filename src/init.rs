//! Module containing initialization routines for the conditional probability tables of a network.

use crate::factor::{Factor, Table};
use crate::util::{Error, Result};
use crate::variable::Domains;

use ndarray::prelude as nd;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Maximum deviation from 1 tolerated when checking that a CPD column is normalized
pub const CPD_TOLERANCE: f64 = 0.001;


/// Defines possible ways to initialize a node's CPD.
///
/// Tables are laid out with the node's own variable on the first axis, followed by one axis per
/// parent in the order the parents were declared. ```table[x, p1, ..., pn] = P(x | p1, ..., pn)```
#[derive(Clone, Debug)]
pub enum Initialization<'a> {
    /// A uniform distribution over all possibilities
    Uniform,

    /// Randomly initialize the weights of the CPD from the given seed
    Random(u64),

    /// Initialize the CPD as a Binomial distribution with parameter ```p```.
    /// Note that this `Initialization` is valid only for a binary node with no parents.
    Binomial(f64),

    /// Initialize the CPD as a Multinomial distribution with parameters ```p_0, p_1...```.
    /// Note that this `Initialization` is valid only for a node with no parents.
    Multinomial(&'a [f64]),

    /// User defined table
    Table(Table)
}


impl<'a> Initialization<'a> {

    /// Construct the CPD of `var`, initialized based on ```self```
    ///
    /// # Args
    /// * `var`: the name of the node
    /// * `values`: the ordered domain of the node
    /// * `parents`: the ordered domains of the node's parents
    ///
    /// # Returns
    /// a `Factor` over ```[var] ++ parents```
    pub fn build_cpd(self, var: &str, values: &[String], parents: &Domains) -> Result<Factor> {
        let mut domains = Domains::new();
        domains.insert(String::from(var), values.to_vec());
        for (p, vals) in parents.iter() {
            domains.insert(p.clone(), vals.clone());
        }

        let mut shape = vec![values.len()];
        shape.extend(parents.values().map(|v| v.len()));

        ///////////////////////////////////////////////////////////////////////////////
        // Check for errors
        match self {
            Initialization::Binomial(_) if values.len() != 2 || !parents.is_empty() => {
                return Err(Error::InvalidInitialization);
            },
            Initialization::Multinomial(ps) if ps.len() != values.len() || !parents.is_empty() => {
                return Err(Error::InvalidInitialization);
            },
            _ => ()
        }

        ///////////////////////////////////////////////////////////////////////////////
        // now, build CPD
        let table = match self {
            Initialization::Uniform => {
                // normalizing constant is just the number of values
                let val = 1. / (values.len() as f64);
                Table::from_elem(shape, val)
            },
            Initialization::Random(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                let tbl = Table::random_using(shape, Uniform::new(1.0, 100.0), &mut rng);
                let z = tbl.sum_axis(nd::Axis(0));
                &tbl / &z
            },
            Initialization::Binomial(p) => {
                array![p, (1.0 - p)].into_dyn()
            },
            Initialization::Multinomial(ps) => {
                nd::Array::from_iter(ps.iter().cloned()).into_dyn()
            },
            Initialization::Table(tbl) => tbl
        };

        let cpd = Factor::new(domains, table)?;
        check_cpd(var, cpd.potentials())?;
        Ok(cpd)
    }

}


/// Verify that `table` is a valid CPD for `var`: non-negative, and every column (a fixed
/// assignment to the parents) sums to one.
fn check_cpd(var: &str, table: &Table) -> Result<()> {
    if table.ndim() == 0 {
        return Err(Error::NotACPD(String::from(var)));
    }

    if table.iter().any(|&p| p < 0.0) {
        return Err(Error::NegativeProbability);
    }

    let columns = table.sum_axis(nd::Axis(0));
    if columns.iter().any(|&z| (z - 1.0).abs() > CPD_TOLERANCE) {
        return Err(Error::NotACPD(String::from(var)));
    }

    Ok(())
}
