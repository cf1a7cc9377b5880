use crate::algebra::Context;
use smol_str::SmolStr;
use std::{
    collections::{hash_map, HashMap},
    f64::consts,
    iter::{Extend, FromIterator},
};

/// A set of named values to use when evaluating an
/// [`Expression`][crate::Expression].
///
/// Names are case-insensitive, matching the way the parser upper-cases
/// everything it reads.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Variables {
    values: HashMap<SmolStr, f64>,
}

impl Variables {
    pub fn new() -> Self { Variables::default() }

    /// Create a set of variables pre-populated with `PI` and `E`.
    pub fn with_constants() -> Self {
        Variables::new().with("pi", consts::PI).with("e", consts::E)
    }

    pub fn with<S: AsRef<str>>(mut self, name: S, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a variable, returning its previous value.
    pub fn insert<S: AsRef<str>>(&mut self, name: S, value: f64) -> Option<f64> {
        self.values.insert(key(name.as_ref()), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(&key(name)).copied()
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(&key(name))
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Iterate over each (upper-cased) name and its value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

fn key(name: &str) -> SmolStr {
    if name.chars().any(char::is_lowercase) {
        SmolStr::new(name.to_uppercase())
    } else {
        SmolStr::new(name)
    }
}

impl Context for Variables {
    fn lookup(&self, name: &str) -> Option<f64> { self.get(name) }
}

impl<S: AsRef<str>> Extend<(S, f64)> for Variables {
    fn extend<T: IntoIterator<Item = (S, f64)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for Variables {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut variables = Variables::new();
        variables.extend(iter);
        variables
    }
}

impl IntoIterator for Variables {
    type IntoIter = hash_map::IntoIter<SmolStr, f64>;
    type Item = (SmolStr, f64);

    fn into_iter(self) -> Self::IntoIter { self.values.into_iter() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn names_are_case_insensitive() {
        let mut vars = Variables::new().with("Radius", 2.0);

        assert_eq!(vars.get("radius"), Some(2.0));
        assert_eq!(vars.get("RADIUS"), Some(2.0));
        assert_eq!(vars.insert("rAdIuS", 3.0), Some(2.0));
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.remove("radius"), Some(3.0));
        assert!(vars.is_empty());
    }

    #[test]
    fn constants_are_available() {
        let vars = Variables::with_constants();

        let got = parse("2*pi").unwrap().evaluate(&vars).unwrap();

        assert_eq!(got, 2.0 * consts::PI);
        assert_eq!(vars.get("e"), Some(consts::E));
    }

    #[test]
    fn original_case_doesnt_matter_when_evaluating() {
        let vars: Variables = vec![("test", 42.0), ("Other", 1.0)]
            .into_iter()
            .collect();

        let got = parse("TeSt + other").unwrap().evaluate(&vars).unwrap();

        assert_eq!(got, 43.0);
    }

    #[test]
    fn iterate_over_upper_cased_names() {
        let vars = Variables::new().with("x", 1.0).with("Y", 2.0);

        let mut got: Vec<_> = vars.iter().collect();
        got.sort_by(|a, b| a.0.cmp(b.0));

        assert_eq!(got, vec![("X", 1.0), ("Y", 2.0)]);
    }

    #[test]
    fn unknown_names_fall_back_to_numbers() {
        let vars = Variables::with_constants();

        let got = parse("1.5 * 2").unwrap().evaluate(&vars).unwrap();

        assert_eq!(got, 3.0);
    }
}
