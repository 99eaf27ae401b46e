//! Definition of the variable module
//!
//! Variables are identified by their name throughout the crate. Anything that can be viewed as
//! a `&str` (a `String`, a `DiscreteNode`, ...) is accepted wherever a variable is expected and
//! resolved to its name at the boundary.

use indexmap::IndexMap;

use std::iter::FromIterator;

/// The ordered domains of a set of variables: name -> ordered values
pub type Domains = IndexMap<String, Vec<String>>;


/// Resolve any accepted variable alias to its canonical name
pub fn names<I, K>(vars: I) -> Vec<String>
    where I: IntoIterator<Item = K>,
          K: AsRef<str>
{
    vars.into_iter().map(|v| String::from(v.as_ref())).collect()
}


/// Build `Domains` from `(name, values)` pairs, keeping the given order
pub fn domains<I, K, V, S>(pairs: I) -> Domains
    where I: IntoIterator<Item = (K, V)>,
          K: AsRef<str>,
          V: IntoIterator<Item = S>,
          S: AsRef<str>
{
    pairs.into_iter()
         .map(|(k, vs)| (String::from(k.as_ref()), names(vs)))
         .collect()
}


/// A partial assignment of observed values to variables, by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evidence {
    values: IndexMap<String, String>
}

impl Evidence {

    /// Construct an empty `Evidence`
    pub fn new() -> Self {
        Evidence { values: IndexMap::new() }
    }

    /// Observe `value` for `var`, replacing any earlier observation
    pub fn set<K: AsRef<str>, V: AsRef<str>>(&mut self, var: K, value: V) {
        self.values.insert(String::from(var.as_ref()), String::from(value.as_ref()));
    }

    /// Builder-style `set`
    pub fn with<K: AsRef<str>, V: AsRef<str>>(mut self, var: K, value: V) -> Self {
        self.set(var, value);
        self
    }

    /// Get the observed value for `var`
    pub fn get(&self, var: &str) -> Option<&str> {
        self.values.get(var).map(|v| v.as_str())
    }

    pub fn contains(&self, var: &str) -> bool {
        self.values.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(variable, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The observed variables
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// The subset of this `Evidence` whose variables satisfy `keep`
    pub fn restrict<F: Fn(&str) -> bool>(&self, keep: F) -> Evidence {
        self.iter().filter(|&(k, _)| keep(k)).collect()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Evidence {

    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut evidence = Evidence::new();
        for (k, v) in iter {
            evidence.set(k, v);
        }
        evidence
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn set_and_get() {
        let mut evidence = Evidence::new();
        assert!(evidence.is_empty());

        evidence.set("winter", "true");
        evidence.set(String::from("rain"), "false");
        assert_eq!(2, evidence.len());
        assert_eq!(Some("true"), evidence.get("winter"));
        assert_eq!(Some("false"), evidence.get("rain"));
        assert_eq!(None, evidence.get("sprinkler"));

        // later observations replace earlier ones
        evidence.set("winter", "false");
        assert_eq!(Some("false"), evidence.get("winter"));
        assert_eq!(vec!["winter", "rain"], evidence.variables().collect::<Vec<_>>());
    }

    #[test]
    fn collect_and_restrict() {
        let evidence: Evidence = vec![("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        let restricted = evidence.restrict(|v| v != "b");

        assert_eq!(2, restricted.len());
        assert!(restricted.contains("a"));
        assert!(!restricted.contains("b"));
        assert_eq!(vec!["a", "b"], names(vec!["a", "b"]));
    }
}
