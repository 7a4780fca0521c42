use std::fmt;

use crate::dsl::Antecedent;

/// `IF antecedent THEN consequent.variable IS consequent.term`, scaled by `weight`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub(crate) antecedent: Antecedent,
    pub(crate) consequent: (String, String),
    pub(crate) weight: f64,
}

impl Rule {
    pub fn new(antecedent: Antecedent, variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            antecedent,
            consequent: (variable.into(), term.into()),
            weight: 1.0,
        }
    }

    /// Weight must lie in `(0, 1]`; checked when the engine is built.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn antecedent(&self) -> &Antecedent {
        &self.antecedent
    }

    pub fn consequent(&self) -> (&str, &str) {
        (&self.consequent.0, &self.consequent.1)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN {}[{}]", self.antecedent, self.consequent.0, self.consequent.1)?;

        if self.weight != 1.0 {
            write!(f, " WITH {}", self.weight)?;
        }

        Ok(())
    }
}

/// An ordered rule set. Order never changes the result but is kept for diagnostics.
#[derive(Clone, Debug, Default)]
pub struct Rules(pub(crate) Vec<Rule>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    pub fn add(&mut self, rule: Rule) {
        self.0.push(rule);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Rule> for Rules {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Rules(iter.into_iter().collect())
    }
}
