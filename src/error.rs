use thiserror::Error;

/// Problems found while building an engine. Always fatal: no engine is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("universe of `{variable}` is invalid: min {min} must be below max {max} and resolution {resolution} at least 2")]
    InvalidUniverse {
        variable: String,
        min: f64,
        max: f64,
        resolution: usize,
    },

    #[error("variable `{0}` is defined more than once")]
    DuplicateVariable(String),

    #[error("variable `{variable}` defines term `{term}` more than once")]
    DuplicateTerm { variable: String, term: String },

    #[error("term `{term}` of `{variable}` has malformed control points {points:?}")]
    MalformedShape {
        variable: String,
        term: String,
        points: Vec<f64>,
    },

    #[error("variable `{0}` has no terms")]
    EmptyVariable(String),

    #[error("rule {rule} references unknown variable `{variable}`")]
    UnknownVariable { rule: usize, variable: String },

    #[error("rule {rule} references unknown term `{term}` of `{variable}`")]
    UnknownTerm {
        rule: usize,
        variable: String,
        term: String,
    },

    #[error("rule {rule} uses `{variable}` as {expected} but it is declared as {actual}")]
    RoleMismatch {
        rule: usize,
        variable: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("rule {rule} has weight {weight}, expected a value in (0, 1]")]
    InvalidWeight { rule: usize, weight: f64 },

    #[error("no output variable was declared")]
    MissingOutput,

    #[error("more than one output variable was declared: `{0}` and `{1}`")]
    MultipleOutputs(String, String),

    #[error("no input variable was declared")]
    MissingInputs,

    #[error("the rule set is empty")]
    NoRules,

    #[error("no rule covers the input combination {0}")]
    IncompleteRuleGrid(String),

    #[error("{stage} expects variables {expected:?}, found {found:?}")]
    StageMismatch {
        stage: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Problems with a single evaluation. Never affects other evaluations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("no value was supplied for input `{0}`")]
    MissingInput(String),

    #[error("input `{variable}` is not a finite number: {value}")]
    NonFiniteInput { variable: String, value: f64 },
}

/// Problems with one row of a batch. The row is skipped, the batch continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("expected {expected} columns, found {found}")]
    MissingColumns { expected: usize, found: usize },

    #[error("column `{column}` is not a number: {value:?}")]
    NotANumber { column: &'static str, value: String },

    #[error("the subsystem fired no rule, SIF1 is undefined")]
    NoSif1,

    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type EvalResult<T> = Result<T, EvalError>;
