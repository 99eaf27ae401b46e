//! Definition of the factor module
//!
//! A `Factor` represents a relationship between some set of named, discrete variables. It is a
//! dense table with one axis per variable, in the order given by `variables()`.

use crate::util::{Error, Result};
use crate::variable::{Domains, Evidence};

use indexmap::IndexMap;
use ndarray::prelude as nd;
use ndarray::Zip;

/// Alias f64 ndarray::Array as Table
pub type Table = nd::ArrayD<f64>;


#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    /// The scope of the `Factor`, in axis order
    variables: Vec<String>,

    /// The ordered domain of every variable in the scope, in axis order
    values: Domains,

    /// The values of the `Factor` table. ```potentials.shape()[i] == |values[variables[i]]|```
    potentials: Table,
}


impl Factor {

    /// Create a new `Factor` over the variables of `domains`, in their given order.
    ///
    /// # Errors
    /// * `Error::ShapeMismatch` if the table's shape does not match the domain sizes
    pub fn new(domains: Domains, potentials: Table) -> Result<Self> {
        let expected = shape_of(&domains);
        if expected.as_slice() != potentials.shape() {
            return Err(Error::ShapeMismatch {
                expected,
                actual: potentials.shape().to_vec()
            });
        }

        let variables = domains.keys().cloned().collect();
        Ok(Factor { variables, values: domains, potentials })
    }


    /// The identity `Factor`: no scope and a single value of 1
    pub fn identity() -> Self {
        Factor {
            variables: Vec::new(),
            values: Domains::new(),
            potentials: Table::from_elem(nd::IxDyn(&[]), 1.0)
        }
    }


    /// A `Factor` of ones over the given scope. Multiplying by it only extends the scope.
    pub fn ones(domains: Domains) -> Self {
        let potentials = Table::ones(shape_of(&domains));
        let variables = domains.keys().cloned().collect();
        Factor { variables, values: domains, potentials }
    }


    /// A `Factor` over a single variable that is 1 at `value` and 0 elsewhere
    pub fn indicator(variable: &str, domain: &[String], value: &str) -> Result<Self> {
        let idx = domain.iter().position(|v| v == value).ok_or_else(|| Error::UnknownValue {
            variable: String::from(variable),
            value: String::from(value)
        })?;

        let mut table = Table::zeros(vec![domain.len()]);
        table[nd::IxDyn(&[idx])] = 1.0;

        let mut domains = Domains::new();
        domains.insert(String::from(variable), domain.to_vec());
        Factor::new(domains, table)
    }


    /// The scope of the `Factor`, in axis order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }


    /// The ordered domains of the scope
    pub fn values(&self) -> &Domains {
        &self.values
    }


    /// The ordered domain of `var`, if it is in scope
    pub fn domain(&self, var: &str) -> Option<&[String]> {
        self.values.get(var).map(|v| v.as_slice())
    }


    /// The table of the `Factor`
    pub fn potentials(&self) -> &Table {
        &self.potentials
    }


    /// Check if `var` is in the scope of the `Factor`
    pub fn contains(&self, var: &str) -> bool {
        self.values.contains_key(var)
    }


    /// Check if the `Factor` has an empty scope
    pub fn is_scalar(&self) -> bool {
        self.variables.is_empty()
    }


    /// Sum of all entries of the table
    pub fn sum(&self) -> f64 {
        self.potentials.sum()
    }


    /// Position of `value` in the domain of `var`
    pub fn value_index(&self, var: &str, value: &str) -> Result<usize> {
        self.domain(var)
            .and_then(|d| d.iter().position(|v| v == value))
            .ok_or_else(|| Error::UnknownValue {
                variable: String::from(var),
                value: String::from(value)
            })
    }


    /// Retrieve the value for a complete assignment over the scope of this `Factor`
    ///
    /// # Args
    /// assignment: a full assignment to the scope of a `Factor`. The assignment's scope may be a
    ///             superset of the `Factor`s scope.
    ///
    /// # Errors
    /// * `Error::IncompleteAssignment`, if assignment does not cover the scope of the `Factor`
    /// * `Error::UnknownValue`, if an assigned value is not in its variable's domain
    pub fn value(&self, assignment: &Evidence) -> Result<f64> {
        let missing: Vec<String> = self.variables.iter()
                                                 .filter(|v| !assignment.contains(v))
                                                 .cloned()
                                                 .collect();
        if !missing.is_empty() {
            return Err(Error::IncompleteAssignment(missing));
        }

        let mut idx = Vec::with_capacity(self.variables.len());
        for var in self.variables.iter() {
            // presence checked above
            let value = assignment.get(var).unwrap_or_default();
            idx.push(self.value_index(var, value)?);
        }

        Ok(self.potentials[nd::IxDyn(&idx)])
    }


    /// Product of this `Factor` and another `Factor`.
    ///
    /// Defined in Koller & Friedman Section 4.2.1. The scopes need not intersect; disjoint
    /// scopes produce the outer product.
    ///
    /// # Returns
    /// A new `Factor` of scope ```self.variables() ++ (other.variables() - self.variables())```
    ///
    /// # Errors
    /// * `Error::InvalidScope`, if a shared variable has different domains in the two factors
    pub fn product(&self, other: &Self) -> Result<Self> {
        if other.is_scalar() {
            return Ok(self.scaled(other.potentials.sum()));
        } else if self.is_scalar() {
            return Ok(other.scaled(self.potentials.sum()));
        }

        let domains = self.union(other)?;
        let order: Vec<String> = domains.keys().cloned().collect();
        let shape = shape_of(&domains);

        let lhs = self.aligned(&order, &shape)?;
        let rhs = other.aligned(&order, &shape)?;

        Factor::new(domains, lhs * rhs)
    }


    /// `Factor` division. Calculates Psi(X, Y) = Phi1(X, Y) / Phi2(Y) where Phi1 = self and Phi2 =
    /// other.
    ///
    /// Defined in Koller & Friedman Section 10.3.1
    ///
    /// # Notes
    /// Any entry divided by zero is defined as 0: a zero denominator means the separator carries
    /// no probability mass for that assignment.
    ///
    /// # Errors
    /// * `Error::InvalidScope` if a shared variable has different domains in the two factors
    pub fn divide(&self, other: &Self) -> Result<Self> {
        let domains = self.union(other)?;
        let order: Vec<String> = domains.keys().cloned().collect();
        let shape = shape_of(&domains);

        let numerator = self.aligned(&order, &shape)?;
        let denominator = other.aligned(&order, &shape)?;

        let mut table = Table::zeros(shape);
        Zip::from(&mut table)
            .and(&numerator)
            .and(&denominator)
            .for_each(|out, &n, &d| *out = if d == 0.0 { 0.0 } else { n / d });

        Factor::new(domains, table)
    }


    /// Reduce the `Factor` to the given partial assignment. Observed variables are dropped from
    /// the scope; observations of variables outside of the scope are ignored.
    ///
    /// Defined in Koller & Friedman 4.2.3
    ///
    /// # Errors
    /// * `Error::UnknownValue` if an observed value is not in its variable's domain
    pub fn reduce(&self, evidence: &Evidence) -> Result<Self> {
        let mut cuts = Vec::new();
        for (axis, var) in self.variables.iter().enumerate() {
            if let Some(value) = evidence.get(var) {
                cuts.push((axis, self.value_index(var, value)?));
            }
        }

        if cuts.is_empty() {
            return Ok(self.clone());
        }

        // slice from the last axis so earlier axis positions stay valid
        let mut table = self.potentials.clone();
        for &(axis, idx) in cuts.iter().rev() {
            table = table.index_axis_move(nd::Axis(axis), idx);
        }

        let domains = self.values.iter()
                                 .filter(|(k, _)| !evidence.contains(k))
                                 .map(|(k, v)| (k.clone(), v.clone()))
                                 .collect();
        Factor::new(domains, table)
    }


    /// Marginalize the `Factor` over the given variable
    ///
    /// Defined in Koller & Friedman 9.3.1
    ///
    /// # Errors
    /// * `Error::VariableNotInScope` if `var` is not in the scope. Callers eliminating over
    ///   heterogeneous scopes are expected to tolerate this.
    pub fn marginalize(&self, var: &str) -> Result<Self> {
        let idx = self.variables.iter()
                                .position(|v| v == var)
                                .ok_or_else(|| Error::VariableNotInScope(String::from(var)))?;

        let mut domains = self.values.clone();
        domains.shift_remove(var);
        Factor::new(domains, self.potentials.sum_axis(nd::Axis(idx)))
    }


    /// Marginalize over every variable in `vars` that is in scope. Variables outside the scope
    /// are ignored and logged at debug level; the elimination drivers rely on this when they
    /// sum a scope down to a subset.
    pub fn marginalize_all<I, K>(&self, vars: I) -> Result<Self>
        where I: IntoIterator<Item = K>,
              K: AsRef<str>
    {
        let mut res = self.clone();
        for var in vars {
            match res.marginalize(var.as_ref()) {
                Ok(f) => res = f,
                Err(Error::VariableNotInScope(v)) => {
                    tracing::debug!(variable = v.as_str(), "not in scope, ignoring");
                },
                Err(e) => return Err(e)
            }
        }
        Ok(res)
    }


    /// Marginalize out every variable that is not in `keep`
    pub fn marginalize_to(&self, keep: &[String]) -> Result<Self> {
        let drop: Vec<String> = self.variables.iter()
                                              .filter(|v| !keep.contains(v))
                                              .cloned()
                                              .collect();
        self.marginalize_all(drop)
    }


    /// Retrieve the sub-table for a partial selection of values without altering the `Factor`.
    ///
    /// Each selected variable is restricted to the listed values (an empty list selects the whole
    /// domain); variables outside the scope are ignored. Axes of length one are dropped from the
    /// result, so a fully specified selection yields a zero-dimensional table.
    ///
    /// # Errors
    /// * `Error::UnknownValue` if a listed value is not in its variable's domain
    pub fn get_potential(&self, selection: &IndexMap<String, Vec<String>>) -> Result<Table> {
        let mut picks = Vec::with_capacity(self.variables.len());
        for var in self.variables.iter() {
            match selection.get(var) {
                Some(values) if !values.is_empty() => {
                    let idxs = values.iter()
                                     .map(|v| self.value_index(var, v))
                                     .collect::<Result<Vec<usize>>>()?;
                    picks.push(Some(idxs));
                },
                _ => picks.push(None)
            }
        }

        Ok(select_values(&self.potentials, &picks))
    }


    /// Scale the table so that it sums to one
    ///
    /// # Errors
    /// * `Error::ImpossibleEvidence` if the table sums to zero
    pub fn normalize(&self) -> Result<Self> {
        let z = self.potentials.sum();
        if z == 0.0 || !z.is_finite() {
            return Err(Error::ImpossibleEvidence);
        }

        Ok(self.scaled(1.0 / z))
    }


    /// Permute the axes of the `Factor` into `order`, which must be a permutation of the scope
    pub fn reorder(&self, order: &[String]) -> Result<Self> {
        if order.len() != self.variables.len() {
            return Err(Error::InvalidScope(format!(
                "{:?} is not a permutation of {:?}", order, self.variables
            )));
        }

        let mut axes = Vec::with_capacity(order.len());
        let mut domains = Domains::new();
        for var in order {
            let idx = self.variables.iter().position(|v| v == var).ok_or_else(|| {
                Error::InvalidScope(format!("{} is not in scope {:?}", var, self.variables))
            })?;
            axes.push(idx);
            domains.insert(var.clone(), self.values[var].clone());
        }

        // a repeated name leaves some axis out
        if domains.len() != order.len() {
            return Err(Error::InvalidScope(format!(
                "{:?} is not a permutation of {:?}", order, self.variables
            )));
        }

        let table = self.potentials.view().permuted_axes(axes).to_owned();
        Factor::new(domains, table)
    }


    /// Consume the `Factor`, returning its domains and table
    pub fn into_parts(self) -> (Domains, Table) {
        (self.values, self.potentials)
    }


    /// A copy of this `Factor` with every entry multiplied by `k`
    fn scaled(&self, k: f64) -> Self {
        Factor {
            variables: self.variables.clone(),
            values: self.values.clone(),
            potentials: self.potentials.mapv(|p| p * k)
        }
    }


    /// The domains of ```self.variables() ++ (other.variables() - self.variables())```
    fn union(&self, other: &Self) -> Result<Domains> {
        let mut domains = self.values.clone();
        for (var, values) in other.values.iter() {
            match domains.get(var) {
                Some(existing) if existing != values => {
                    return Err(Error::InvalidScope(format!(
                        "variable {} has domains {:?} and {:?}", var, existing, values
                    )));
                },
                Some(_) => (),
                None => { domains.insert(var.clone(), values.clone()); }
            }
        }
        Ok(domains)
    }


    /// The table of this `Factor` with its axes permuted into `order` and broadcast to `shape`.
    /// Every variable in scope must appear in `order`.
    fn aligned(&self, order: &[String], shape: &[usize]) -> Result<Table> {
        let mut positions = Vec::with_capacity(self.variables.len());
        for var in self.variables.iter() {
            match order.iter().position(|o| o == var) {
                Some(p) => positions.push(p),
                None => {
                    return Err(Error::InvalidScope(format!("{} is not in {:?}", var, order)))
                }
            }
        }

        // put own axes in relative target order, then open unit axes for the missing variables
        let mut axes: Vec<usize> = (0..positions.len()).collect();
        axes.sort_by_key(|&i| positions[i]);

        let mut view = self.potentials.view().permuted_axes(axes);
        for (i, var) in order.iter().enumerate() {
            if !self.contains(var) {
                view = view.insert_axis(nd::Axis(i));
            }
        }

        view.broadcast(shape.to_vec())
            .map(|b| b.to_owned())
            .ok_or_else(|| Error::ShapeMismatch {
                expected: shape.to_vec(),
                actual: self.potentials.shape().to_vec()
            })
    }

}


/// The table shape implied by a set of domains
pub fn shape_of(domains: &Domains) -> Vec<usize> {
    domains.values().map(|v| v.len()).collect()
}


/// Restrict each axis of `table` to the listed indices, in the listed order (`None` keeps the
/// whole axis), then drop every axis of length one
pub(crate) fn select_values(table: &Table, picks: &[Option<Vec<usize>>]) -> Table {
    let mut out = table.clone();
    for (axis, pick) in picks.iter().enumerate() {
        if let Some(idxs) = pick {
            out = out.select(nd::Axis(axis), idxs);
        }
    }
    squeeze(out)
}


/// Drop every axis of length one
pub(crate) fn squeeze(mut table: Table) -> Table {
    for axis in (0..table.ndim()).rev() {
        if table.len_of(nd::Axis(axis)) == 1 {
            table = table.index_axis_move(nd::Axis(axis), 0);
        }
    }
    table
}
