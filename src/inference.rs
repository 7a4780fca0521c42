use indexmap::IndexMap;
use slotmap::SecondaryMap;
use tracing::{debug, debug_span, trace};

use crate::dsl::Antecedent;
use crate::error::{ConfigError, ConfigResult, EvalError, EvalResult};
use crate::inputs::Inputs;
use crate::ops::Operators;
use crate::outputs::{Evaluation, Outputs};
use crate::rules::{Rule, Rules};
use crate::variable::{Role, Variable, VariableKey, Variables};

/// Collects variables, rules and operators, then validates them into an
/// [`InferenceEngine`]. Every configuration problem surfaces from [`EngineBuilder::build`].
#[derive(Debug)]
pub struct EngineBuilder {
    name: String,
    variables: Vec<Variable>,
    rules: Rules,
    operators: Operators,
    require_complete_grid: bool,
}

impl EngineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            rules: Rules::new(),
            operators: Operators::default(),
            require_complete_grid: false,
        }
    }

    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.add(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.0.extend(rules);
        self
    }

    pub fn operators(mut self, operators: Operators) -> Self {
        self.operators = operators;
        self
    }

    /// Fail the build unless every combination of input terms fires some rule.
    pub fn require_complete_grid(mut self) -> Self {
        self.require_complete_grid = true;
        self
    }

    pub fn build(self) -> ConfigResult<InferenceEngine> {
        let mut variables = Variables::new();
        let mut inputs = Vec::new();
        let mut output: Option<VariableKey> = None;

        for variable in self.variables {
            let role = variable.role();
            let key = variables.add(variable)?;

            match (role, output) {
                (Role::Antecedent, _) => inputs.push(key),
                (Role::Consequent, None) => output = Some(key),
                (Role::Consequent, Some(first)) => {
                    return Err(ConfigError::MultipleOutputs(
                        variables[first].name().to_owned(),
                        variables[key].name().to_owned(),
                    ))
                },
            }
        }

        let output = output.ok_or(ConfigError::MissingOutput)?;

        if inputs.is_empty() {
            return Err(ConfigError::MissingInputs);
        }

        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }

        let compiled = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| compile_rule(i, rule, &variables, output))
            .collect::<ConfigResult<Vec<_>>>()?;

        let output_var = &variables[output];
        let output_samples: Vec<f64> = output_var.universe().samples().collect();
        let term_samples: Vec<Vec<f64>> = output_var
            .terms()
            .map(|term| output_samples.iter().map(|x| term.degree(*x)).collect())
            .collect();

        let engine = InferenceEngine {
            name: self.name,
            variables,
            inputs,
            output,
            rules: self.rules,
            compiled,
            operators: self.operators,
            output_samples,
            term_samples,
        };

        if self.require_complete_grid {
            engine.check_complete_grid()?;
        }

        debug!(
            engine = %engine.name,
            inputs = engine.inputs.len(),
            rules = engine.compiled.len(),
            "built inference engine"
        );

        Ok(engine)
    }
}

/// A rule premise with names resolved to variable keys and term indices.
#[derive(Clone, Debug)]
enum Premise {
    Is(VariableKey, usize),
    And(Box<Premise>, Box<Premise>),
    Or(Box<Premise>, Box<Premise>),
    Not(Box<Premise>),
}

#[derive(Clone, Debug)]
struct CompiledRule {
    premise: Premise,
    term: usize,
    weight: f64,
}

fn compile_rule(index: usize, rule: &Rule, variables: &Variables, output: VariableKey) -> ConfigResult<CompiledRule> {
    if !(rule.weight > 0. && rule.weight <= 1.) {
        return Err(ConfigError::InvalidWeight {
            rule: index,
            weight: rule.weight,
        });
    }

    let premise = compile_premise(index, &rule.antecedent, variables)?;
    let (var_name, term_name) = rule.consequent();
    let (key, term) = resolve(index, var_name, term_name, variables)?;

    if key != output {
        return Err(ConfigError::RoleMismatch {
            rule: index,
            variable: var_name.to_owned(),
            expected: Role::Consequent.describe(),
            actual: variables[key].role().describe(),
        });
    }

    Ok(CompiledRule {
        premise,
        term,
        weight: rule.weight,
    })
}

fn compile_premise(index: usize, expr: &Antecedent, variables: &Variables) -> ConfigResult<Premise> {
    let compile = |expr: &Antecedent| compile_premise(index, expr, variables).map(Box::new);

    Ok(match expr {
        Antecedent::Is { variable, term } => {
            let (key, term) = resolve(index, variable, term, variables)?;
            let role = variables[key].role();

            if role != Role::Antecedent {
                return Err(ConfigError::RoleMismatch {
                    rule: index,
                    variable: variable.clone(),
                    expected: Role::Antecedent.describe(),
                    actual: role.describe(),
                });
            }

            Premise::Is(key, term)
        },
        Antecedent::And(lhs, rhs) => Premise::And(compile(&**lhs)?, compile(&**rhs)?),
        Antecedent::Or(lhs, rhs) => Premise::Or(compile(&**lhs)?, compile(&**rhs)?),
        Antecedent::Not(expr) => Premise::Not(compile(&**expr)?),
    })
}

fn resolve(index: usize, variable: &str, term: &str, variables: &Variables) -> ConfigResult<(VariableKey, usize)> {
    let key = variables.key(variable).ok_or_else(|| ConfigError::UnknownVariable {
        rule: index,
        variable: variable.to_owned(),
    })?;
    let term_index = variables[key]
        .term_index(term)
        .ok_or_else(|| ConfigError::UnknownTerm {
            rule: index,
            variable: variable.to_owned(),
            term: term.to_owned(),
        })?;

    Ok((key, term_index))
}

/// A validated, immutable Mamdani system with one output variable.
///
/// Evaluation takes `&self` and keeps all intermediate state local to the call,
/// so one engine can serve any number of threads.
#[derive(Clone, Debug)]
pub struct InferenceEngine {
    name: String,
    variables: Variables,
    inputs: Vec<VariableKey>,
    output: VariableKey,
    rules: Rules,
    compiled: Vec<CompiledRule>,
    operators: Operators,
    output_samples: Vec<f64>,
    term_samples: Vec<Vec<f64>>,
}

impl InferenceEngine {
    pub fn builder(name: impl Into<String>) -> EngineBuilder {
        EngineBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operators(&self) -> &Operators {
        &self.operators
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Input variables in declaration order.
    pub fn inputs(&self) -> impl ExactSizeIterator<Item = &Variable> {
        self.inputs.iter().map(|key| &self.variables[*key])
    }

    pub fn output(&self) -> &Variable {
        &self.variables[self.output]
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.by_name(name)
    }

    /// Crisp output for `inputs`, or [`Evaluation::NoRuleFired`].
    pub fn evaluate(&self, inputs: &Inputs) -> EvalResult<Evaluation> {
        self.evaluate_detailed(inputs).map(|outputs| outputs.evaluation)
    }

    /// Like [`InferenceEngine::evaluate`], keeping every intermediate result.
    pub fn evaluate_detailed(&self, inputs: &Inputs) -> EvalResult<Outputs> {
        let _span = debug_span!("evaluate", engine = %self.name).entered();

        // Fuzzify
        let mut degrees = SecondaryMap::with_capacity(self.inputs.len());

        for key in &self.inputs {
            let variable = &self.variables[*key];
            let value = inputs
                .get(variable.name())
                .ok_or_else(|| EvalError::MissingInput(variable.name().to_owned()))?;

            if !value.is_finite() {
                return Err(EvalError::NonFiniteInput {
                    variable: variable.name().to_owned(),
                    value,
                });
            }

            degrees.insert(*key, variable.fuzzify(value));
        }

        trace!(?degrees, "fuzzified");

        // Evaluate rules
        let firing_strengths: Vec<f64> = self
            .compiled
            .iter()
            .map(|rule| (self.premise_degree(&rule.premise, &degrees) * rule.weight).clamp(0., 1.))
            .collect();

        trace!(?firing_strengths, "rules evaluated");

        // Aggregate
        let output = &self.variables[self.output];
        let mut activations: IndexMap<String, f64> =
            output.terms().map(|term| (term.name().to_owned(), 0.)).collect();
        let mut aggregated = vec![0.; self.output_samples.len()];
        let mut fired = false;

        for (rule, strength) in self.compiled.iter().zip(&firing_strengths) {
            if *strength <= 0. {
                continue;
            }

            fired = true;

            if let Some((_, activation)) = activations.get_index_mut(rule.term) {
                *activation = f64::max(*activation, *strength);
            }

            let implication = self.operators.implication;
            let implied = self.term_samples[rule.term]
                .iter()
                .map(|mu| implication.call(*strength, *mu));

            aggregated = self.operators.aggregation.call(aggregated, implied).collect();
        }

        trace!(?activations, "aggregated");

        // Defuzzify
        let evaluation = if fired {
            Evaluation::from(self.operators.defuzzification.call(&self.output_samples, &aggregated))
        } else {
            Evaluation::NoRuleFired
        };

        debug!(%evaluation, "evaluated");

        let fuzzified = degrees
            .into_iter()
            .map(|(key, values)| (self.variables[key].name().to_owned(), values))
            .collect();

        Ok(Outputs {
            output: output.name().to_owned(),
            fuzzified,
            firing_strengths,
            activations,
            universe: self.output_samples.clone(),
            aggregated,
            evaluation,
        })
    }

    fn premise_degree(&self, premise: &Premise, degrees: &SecondaryMap<VariableKey, Vec<f64>>) -> f64 {
        match premise {
            Premise::Is(key, term) => degrees.get(*key).and_then(|d| d.get(*term)).copied().unwrap_or(0.),
            Premise::And(lhs, rhs) => self
                .operators
                .and
                .call(self.premise_degree(lhs, degrees), self.premise_degree(rhs, degrees)),
            Premise::Or(lhs, rhs) => self
                .operators
                .or
                .call(self.premise_degree(lhs, degrees), self.premise_degree(rhs, degrees)),
            Premise::Not(expr) => 1. - self.premise_degree(expr, degrees),
        }
    }

    /// Walks every combination of input terms, setting the chosen term of each
    /// input to 1 and the others to 0, and requires some rule to fire on it.
    fn check_complete_grid(&self) -> ConfigResult<()> {
        let sizes: Vec<usize> = self.inputs().map(|var| var.terms().len()).collect();
        let mut cell = vec![0usize; sizes.len()];

        loop {
            let mut degrees = SecondaryMap::with_capacity(self.inputs.len());

            for ((key, size), chosen) in self.inputs.iter().zip(&sizes).zip(&cell) {
                let one_hot = (0..*size).map(|i| if i == *chosen { 1. } else { 0. }).collect::<Vec<f64>>();

                degrees.insert(*key, one_hot);
            }

            let covered = self
                .compiled
                .iter()
                .any(|rule| self.premise_degree(&rule.premise, &degrees) > 0.);

            if !covered {
                let description = self
                    .inputs
                    .iter()
                    .zip(&cell)
                    .map(|(key, chosen)| {
                        let var = &self.variables[*key];

                        format!("{}[{}]", var.name(), var.term_at(*chosen).name())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");

                return Err(ConfigError::IncompleteRuleGrid(description));
            }

            // odometer increment, last input fastest
            let mut pos = cell.len();

            loop {
                if pos == 0 {
                    return Ok(());
                }

                pos -= 1;
                cell[pos] += 1;

                if cell[pos] < sizes[pos] {
                    break;
                }

                cell[pos] = 0;
            }
        }
    }
}
