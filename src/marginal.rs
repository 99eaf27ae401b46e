//! Query results.
//!
//! A `Marginal` is a read-only snapshot of the table of a `Factor` holding a (joint) posterior
//! distribution. It owns a copy of the table, so nothing done to the source `Factor` afterwards
//! can change it.

use crate::diagnostics::{Outcome, Warning};
use crate::factor::{select_values, Factor, Table};
use crate::variable::Domains;

use indexmap::IndexMap;


/// The probabilities of each selected value of one variable
pub type ValueMap = IndexMap<String, Table>;


/// The dictionary form of a probability query.
#[derive(Clone, Debug, PartialEq)]
pub enum Probabilities {
    /// Only one variable was selected: its values, mapped to their probabilities
    Single(ValueMap),

    /// Several variables were selected: variable -> value -> probabilities
    Nested(IndexMap<String, ValueMap>),
}


/// Which variables, and which of their values, a probability query is about.
///
/// An empty selection selects everything. A variable selected without values selects its whole
/// domain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    entries: IndexMap<String, Vec<String>>
}

impl Selection {

    /// Select everything
    pub fn all() -> Self {
        Selection::default()
    }

    /// Select all values of `var`
    pub fn variable<K: AsRef<str>>(mut self, var: K) -> Self {
        self.entries.entry(String::from(var.as_ref())).or_insert_with(Vec::new);
        self
    }

    /// Select `value` of `var`, in addition to the values already selected for it
    pub fn value<K: AsRef<str>, V: AsRef<str>>(mut self, var: K, value: V) -> Self {
        self.entries.entry(String::from(var.as_ref()))
                    .or_insert_with(Vec::new)
                    .push(String::from(value.as_ref()));
        self
    }

    /// Select each of `values` of `var`, in addition to the values already selected for it
    pub fn values<K, I, V>(mut self, var: K, values: I) -> Self
        where K: AsRef<str>,
              I: IntoIterator<Item = V>,
              V: AsRef<str>
    {
        self.entries.entry(String::from(var.as_ref()))
                    .or_insert_with(Vec::new)
                    .extend(values.into_iter().map(|v| String::from(v.as_ref())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct Marginal {
    factor: Factor
}

impl Marginal {

    /// Snapshot the table of `factor`
    pub fn from_factor(factor: &Factor) -> Self {
        Marginal { factor: factor.clone() }
    }

    /// The variables of the marginal, in axis order
    pub fn variables(&self) -> &[String] {
        self.factor.variables()
    }

    /// The ordered domain of `var`
    pub fn values(&self, var: &str) -> Option<&[String]> {
        self.factor.domain(var)
    }

    pub fn domains(&self) -> &Domains {
        self.factor.values()
    }

    /// The full probability table, one axis per variable
    pub fn probabilities(&self) -> &Table {
        self.factor.potentials()
    }


    /// The probabilities of the selected values, as a table with one axis per variable of the
    /// marginal, in marginal order. Axes of length one are dropped.
    ///
    /// Variables that are not part of the marginal are ignored. If a selected value is not in
    /// the domain of its variable, the whole domain of that variable is used. Both raise a
    /// warning.
    pub fn get_probabilities(&self, selection: &Selection) -> Outcome<Table> {
        let (picks, warnings) = self.resolve(selection);
        Outcome::new(self.select(&picks), warnings)
    }


    /// The probabilities of the selected values as a dictionary ```variable -> value -> table```,
    /// where each table is what `get_probabilities` returns with the variable fixed to the value.
    ///
    /// An empty selection selects every variable of the marginal, and a variable selected
    /// without values (or with an unknown value) gets an entry for each value of its domain. If a
    /// single variable is selected, its inner dictionary is returned directly.
    pub fn get_probabilities_dict(&self, selection: &Selection) -> Outcome<Probabilities> {
        let (picks, warnings) = self.resolve(selection);

        let selected: Vec<usize> = if selection.is_empty() {
            (0..self.variables().len()).collect()
        } else {
            (0..picks.len()).filter(|&axis| picks[axis].is_some()).collect()
        };

        let mut nested = IndexMap::new();
        for &axis in selected.iter() {
            let domain = self.domain_at(axis);
            let values: Vec<usize> = match &picks[axis] {
                Some(idxs) if !idxs.is_empty() => idxs.clone(),
                _ => (0..domain.len()).collect()
            };

            let mut inner = ValueMap::new();
            for idx in values {
                let mut fixed = picks.clone();
                fixed[axis] = Some(vec![idx]);
                inner.insert(domain[idx].clone(), self.select(&fixed));
            }
            nested.insert(self.variables()[axis].clone(), inner);
        }

        let res = if nested.len() == 1 {
            match nested.pop() {
                Some((_, inner)) => Probabilities::Single(inner),
                None => Probabilities::Nested(nested)
            }
        } else {
            Probabilities::Nested(nested)
        };

        Outcome::new(res, warnings)
    }


    /// Sum out `vars`. Variables that are not part of the marginal are ignored with a warning.
    pub fn marginalize<I, K>(&self, vars: I) -> Outcome<Marginal>
        where I: IntoIterator<Item = K>,
              K: AsRef<str>
    {
        let mut factor = self.factor.clone();
        let mut warnings = Vec::new();

        for var in vars {
            let var = var.as_ref();
            match factor.marginalize(var) {
                Ok(f) => factor = f,
                Err(_) => warnings.push(Warning::unknown_variable(var))
            }
        }

        Outcome::new(Marginal { factor }, warnings)
    }


    /// Translate `selection` into value indices per axis. `None` selects the whole axis;
    /// `Some(vec![])` marks a selected variable whose whole domain is used.
    fn resolve(&self, selection: &Selection) -> (Vec<Option<Vec<usize>>>, Vec<Warning>) {
        let mut picks = vec![None; self.variables().len()];
        let mut warnings = Vec::new();

        for (var, values) in selection.entries.iter() {
            let axis = match self.variables().iter().position(|v| v == var) {
                Some(axis) => axis,
                None => {
                    warnings.push(Warning::unknown_variable(var));
                    continue;
                }
            };

            let domain = self.domain_at(axis);
            let mut idxs = Vec::with_capacity(values.len());
            let mut valid = true;
            for value in values.iter() {
                match domain.iter().position(|v| v == value) {
                    Some(idx) => idxs.push(idx),
                    None => {
                        warnings.push(Warning::unknown_value(var, value));
                        valid = false;
                    }
                }
            }

            picks[axis] = Some(if valid { idxs } else { Vec::new() });
        }

        (picks, warnings)
    }


    fn domain_at(&self, axis: usize) -> &[String] {
        self.factor.values().get_index(axis).map(|(_, d)| d.as_slice()).unwrap_or(&[])
    }


    fn select(&self, picks: &[Option<Vec<usize>>]) -> Table {
        let picks: Vec<Option<Vec<usize>>> = picks.iter()
            .map(|p| p.clone().filter(|idxs| !idxs.is_empty()))
            .collect();
        select_values(self.factor.potentials(), &picks)
    }
}


impl From<Factor> for Marginal {

    fn from(factor: Factor) -> Self {
        Marginal { factor }
    }
}
