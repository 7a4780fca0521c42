use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::error::{ConfigError, ConfigResult};
use crate::math::interp;
use crate::terms::{Shape, Term};
use crate::universe::Universe;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// Whether a variable is read in rule premises or produced by rule conclusions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Antecedent,
    Consequent,
}

impl Role {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Role::Antecedent => "an antecedent",
            Role::Consequent => "a consequent",
        }
    }
}

/// A linguistic variable: ordered, uniquely named terms over one universe.
#[derive(Clone, Debug)]
pub struct Variable {
    name: String,
    universe: Universe,
    role: Role,
    terms: IndexMap<String, Term>,
}

impl Variable {
    /// Validates and assembles a variable. Term order is kept as given.
    pub fn new(
        name: impl Into<String>,
        universe: Universe,
        role: Role,
        terms: impl IntoIterator<Item = Term>,
    ) -> ConfigResult<Self> {
        let name = name.into();
        let mut map = IndexMap::new();

        for term in terms {
            if !term.shape().is_well_formed() {
                return Err(ConfigError::MalformedShape {
                    variable: name,
                    term: term.name().to_owned(),
                    points: term.shape().points(),
                });
            }

            if map.contains_key(term.name()) {
                return Err(ConfigError::DuplicateTerm {
                    variable: name,
                    term: term.name().to_owned(),
                });
            }

            map.insert(term.name().to_owned(), term);
        }

        if map.is_empty() {
            return Err(ConfigError::EmptyVariable(name));
        }

        Ok(Self {
            name,
            universe,
            role,
            terms: map,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn terms(&self) -> impl ExactSizeIterator<Item = &Term> {
        self.terms.values()
    }

    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.get(name)
    }

    pub(crate) fn term_index(&self, name: &str) -> Option<usize> {
        self.terms.get_index_of(name)
    }

    pub(crate) fn term_at(&self, index: usize) -> &Term {
        &self.terms[index]
    }

    /// Degree of every term at `x`, in term order.
    pub fn fuzzify(&self, x: f64) -> Vec<f64> {
        self.terms.values().map(|term| term.degree(x)).collect()
    }

    /// Degree of every term at `x`, keyed by term name.
    pub fn fuzzify_named(&self, x: f64) -> IndexMap<&str, f64> {
        self.terms
            .values()
            .map(|term| (term.name(), term.degree(x)))
            .collect()
    }

    /// A term's degrees over the universe sample grid, for plotting.
    pub fn sample_term(&self, term: &str) -> Option<Vec<f64>> {
        let shape = self.terms.get(term)?.shape();

        Some(self.universe.samples().map(|x| shape.degree(x)).collect())
    }

    /// Degree of `term` at `x`, interpolated from the sampled grid the way plots read it.
    ///
    /// Outside the universe the edge value is held. Inference never uses this;
    /// it agrees with [`Term::degree`] within the grid spacing.
    pub fn interpolated_degree(&self, term: &str, x: f64) -> Option<f64> {
        let samples = self.sample_term(term)?;

        interp(x, self.universe.samples().zip(samples))
    }
}

/// The variables of one engine, addressed by stable keys after construction.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    slots: SlotMap<VariableKey, Variable>,
    by_name: HashMap<String, VariableKey>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, variable: Variable) -> ConfigResult<VariableKey> {
        if self.by_name.contains_key(variable.name()) {
            return Err(ConfigError::DuplicateVariable(variable.name.clone()));
        }

        let name = variable.name.clone();
        let key = self.slots.insert(variable);

        self.by_name.insert(name, key);

        Ok(key)
    }

    pub fn key(&self, name: &str) -> Option<VariableKey> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, key: VariableKey) -> Option<&Variable> {
        self.slots.get(key)
    }

    pub fn by_name(&self, name: &str) -> Option<&Variable> {
        self.key(name).and_then(|key| self.slots.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, &Variable)> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::ops::Index<VariableKey> for Variables {
    type Output = Variable;

    fn index(&self, key: VariableKey) -> &Variable {
        &self.slots[key]
    }
}

/// Shorthand used by the static system tables.
pub(crate) fn terms_from<'t>(defs: impl IntoIterator<Item = &'t (&'static str, Shape)>) -> Vec<Term> {
    defs.into_iter()
        .map(|(name, shape)| Term::new(*name, *shape))
        .collect()
}
