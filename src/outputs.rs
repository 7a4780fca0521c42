use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Terminal state of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Defuzzified(f64),
    /// Every rule had zero firing strength, so the aggregated set is empty and
    /// has no centroid.
    NoRuleFired,
}

impl Evaluation {
    pub fn value(self) -> Option<f64> {
        match self {
            Evaluation::Defuzzified(value) => Some(value),
            Evaluation::NoRuleFired => None,
        }
    }

    pub fn fired(self) -> bool {
        matches!(self, Evaluation::Defuzzified(_))
    }
}

impl From<Option<f64>> for Evaluation {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Evaluation::NoRuleFired, Evaluation::Defuzzified)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Defuzzified(value) => write!(f, "{value:.2}"),
            Evaluation::NoRuleFired => f.write_str("N/A"),
        }
    }
}

/// Everything computed during one evaluation, for plots and diagnostics.
#[derive(Clone, Debug, Serialize)]
pub struct Outputs {
    pub(crate) output: String,
    pub(crate) fuzzified: IndexMap<String, Vec<f64>>,
    pub(crate) firing_strengths: Vec<f64>,
    pub(crate) activations: IndexMap<String, f64>,
    pub(crate) universe: Vec<f64>,
    pub(crate) aggregated: Vec<f64>,
    pub(crate) evaluation: Evaluation,
}

impl Outputs {
    /// Name of the output variable.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn evaluation(&self) -> Evaluation {
        self.evaluation
    }

    /// Term degrees of each input variable, in term order.
    pub fn fuzzified(&self, variable: &str) -> Option<&[f64]> {
        self.fuzzified.get(variable).map(Vec::as_slice)
    }

    /// Weighted firing strength of each rule, in rule order.
    pub fn firing_strengths(&self) -> &[f64] {
        &self.firing_strengths
    }

    /// Strongest firing per output term, in term order. Zero for terms no rule reached.
    pub fn activations(&self) -> &IndexMap<String, f64> {
        &self.activations
    }

    /// Output universe sample grid.
    pub fn universe(&self) -> &[f64] {
        &self.universe
    }

    /// Aggregated output set sampled on [`Outputs::universe`].
    pub fn aggregated(&self) -> &[f64] {
        &self.aggregated
    }
}
