//! Mamdani fuzzy inference for the housing deficit index.
//!
//! Two chained engines: the subsystem turns family cohabitation (COF) and
//! excessive density (AED) into the intermediate index SIF1; the main system
//! combines precarious dwellings (DOP), excessive rent burden (OEA) and SIF1
//! into the final IFDH.
//!
//! ```
//! let sif1 = ifdh_fuzzy::evaluate_subsystem(40.0, 15.0);
//! let ifdh = ifdh_fuzzy::evaluate_main_system(20.0, 35.0, sif1);
//!
//! assert!(ifdh.is_some());
//! ```
//!
//! Engines are immutable once built and every evaluation is a pure function of
//! its inputs, so a single [`Pipeline`] can be shared across threads.

use once_cell::sync::Lazy;

pub mod batch;
pub mod config;
mod dsl;
pub mod error;
mod inference;
mod inputs;
mod linspace;
mod math;
pub mod ops;
mod outputs;
mod pipeline;
mod rules;
mod terms;
mod universe;
mod variable;

pub use dsl::{is, Antecedent};
pub use error::{ConfigError, ConfigResult, EvalError, EvalResult, RowError};
pub use inference::{EngineBuilder, InferenceEngine};
pub use inputs::Inputs;
pub use ops::Operators;
pub use outputs::{Evaluation, Outputs};
pub use pipeline::{Pipeline, PipelineOutput};
pub use rules::{Rule, Rules};
pub use terms::{Shape, Term};
pub use universe::{Universe, DEFAULT_RESOLUTION};
pub use variable::{Role, Variable, VariableKey, Variables};

static PIPELINE: Lazy<Pipeline> =
    Lazy::new(|| Pipeline::new().expect("built-in fuzzy tables are valid and cover every rule cell"));

/// The shared pipeline behind [`evaluate_subsystem`] and [`evaluate_main_system`].
pub fn pipeline() -> &'static Pipeline {
    &PIPELINE
}

/// SIF1 for the given cohabitation and density rates.
///
/// Inside the nominal universes (COF in 0..=80, AED in 0..=40) some rule always
/// fires. Returns `NaN` for non-finite inputs or inputs beyond every term shoulder;
/// use [`Pipeline::subsystem`] on [`pipeline()`] to tell those apart through
/// [`Evaluation::NoRuleFired`] and [`EvalError`].
pub fn evaluate_subsystem(cof: f64, aed: f64) -> f64 {
    match PIPELINE.subsystem(cof, aed) {
        Ok(Evaluation::Defuzzified(sif1)) => sif1,
        Ok(Evaluation::NoRuleFired) => f64::NAN,
        Err(error) => {
            tracing::warn!(%error, "subsystem evaluation failed");
            f64::NAN
        },
    }
}

/// IFDH for the given precarious dwelling rate, rent burden rate and SIF1.
///
/// `None` when no rule fires (or an input is not a finite number).
pub fn evaluate_main_system(dop: f64, oea: f64, sif1: f64) -> Option<f64> {
    match PIPELINE.main_system(dop, oea, sif1) {
        Ok(evaluation) => evaluation.value(),
        Err(error) => {
            tracing::warn!(%error, "main system evaluation failed");
            None
        },
    }
}
