use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AED, COF, DOP, MAIN_SYSTEM, OEA, SIF1, SUBSYSTEM};
use crate::error::{ConfigError, ConfigResult, EvalResult};
use crate::inference::InferenceEngine;
use crate::inputs::Inputs;
use crate::outputs::{Evaluation, Outputs};

/// Both stages of the index: `(COF, AED) -> SIF1`, then `(DOP, OEA, SIF1) -> IFDH`.
///
/// Immutable after construction; share it behind `&` or `Arc` freely.
#[derive(Clone, Debug)]
pub struct Pipeline {
    subsystem: InferenceEngine,
    main: InferenceEngine,
}

/// Result of running both stages on one record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub sif1: Evaluation,
    pub ifdh: Evaluation,
}

impl Pipeline {
    /// Builds both engines from the built-in tables.
    pub fn new() -> ConfigResult<Self> {
        Self::from_engines(SUBSYSTEM.build()?, MAIN_SYSTEM.build()?)
    }

    /// Custom stages. The subsystem must read exactly `COF` and `AED` and produce
    /// `SIF1`; the main engine must read exactly `DOP`, `OEA` and `SIF1`.
    pub fn from_engines(subsystem: InferenceEngine, main: InferenceEngine) -> ConfigResult<Self> {
        check_stage("subsystem inputs", subsystem.inputs().map(|v| v.name()), &[COF, AED])?;
        check_stage("subsystem output", [subsystem.output().name()], &[SIF1])?;
        check_stage("main system inputs", main.inputs().map(|v| v.name()), &[DOP, OEA, SIF1])?;

        Ok(Self { subsystem, main })
    }

    pub fn subsystem_engine(&self) -> &InferenceEngine {
        &self.subsystem
    }

    pub fn main_engine(&self) -> &InferenceEngine {
        &self.main
    }

    pub fn subsystem(&self, cof: f64, aed: f64) -> EvalResult<Evaluation> {
        self.subsystem.evaluate(&Self::subsystem_inputs(cof, aed))
    }

    pub fn subsystem_detailed(&self, cof: f64, aed: f64) -> EvalResult<Outputs> {
        self.subsystem.evaluate_detailed(&Self::subsystem_inputs(cof, aed))
    }

    pub fn main_system(&self, dop: f64, oea: f64, sif1: f64) -> EvalResult<Evaluation> {
        self.main.evaluate(&Self::main_inputs(dop, oea, sif1))
    }

    pub fn main_system_detailed(&self, dop: f64, oea: f64, sif1: f64) -> EvalResult<Outputs> {
        self.main.evaluate_detailed(&Self::main_inputs(dop, oea, sif1))
    }

    /// Runs stage 1, then feeds its crisp output to stage 2.
    ///
    /// If stage 1 yields nothing, stage 2 is not run and reports `NoRuleFired` too.
    pub fn evaluate(&self, cof: f64, aed: f64, dop: f64, oea: f64) -> EvalResult<PipelineOutput> {
        let sif1 = self.subsystem(cof, aed)?;

        let ifdh = match sif1 {
            Evaluation::Defuzzified(value) => self.main_system(dop, oea, value)?,
            Evaluation::NoRuleFired => {
                warn!(cof, aed, "subsystem fired no rule, skipping main system");
                Evaluation::NoRuleFired
            },
        };

        debug!(%sif1, %ifdh, "pipeline evaluated");

        Ok(PipelineOutput { sif1, ifdh })
    }

    fn subsystem_inputs(cof: f64, aed: f64) -> Inputs {
        Inputs::new().with(COF, cof).with(AED, aed)
    }

    fn main_inputs(dop: f64, oea: f64, sif1: f64) -> Inputs {
        Inputs::new().with(DOP, dop).with(OEA, oea).with(SIF1, sif1)
    }
}

fn check_stage<'a>(stage: &'static str, found: impl IntoIterator<Item = &'a str>, expected: &[&str]) -> ConfigResult<()> {
    let mut found: Vec<String> = found.into_iter().map(str::to_owned).collect();
    let mut expected: Vec<String> = expected.iter().map(|name| (*name).to_owned()).collect();

    found.sort();
    expected.sort();

    if found != expected {
        return Err(ConfigError::StageMismatch { stage, expected, found });
    }

    Ok(())
}
