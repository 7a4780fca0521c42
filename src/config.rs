//! The two fixed systems, as static tables validated once when an engine is built.

use crate::dsl::{is, Antecedent};
use crate::error::{ConfigError, ConfigResult};
use crate::inference::{EngineBuilder, InferenceEngine};
use crate::rules::Rule;
use crate::terms::Shape;
use crate::universe::{Universe, DEFAULT_RESOLUTION};
use crate::variable::{terms_from, Role, Variable};

pub const COF: &str = "COF";
pub const AED: &str = "AED";
pub const SIF1: &str = "SIF1";
pub const DOP: &str = "DOP";
pub const OEA: &str = "OEA";
pub const IFDH: &str = "IFDH";

#[derive(Clone, Copy, Debug)]
pub struct VariableDef {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub role: Role,
    pub terms: &'static [(&'static str, Shape)],
}

impl VariableDef {
    pub fn build(&self, resolution: usize) -> ConfigResult<Variable> {
        let universe = Universe::new(self.min, self.max, resolution).ok_or_else(|| ConfigError::InvalidUniverse {
            variable: self.name.to_owned(),
            min: self.min,
            max: self.max,
            resolution,
        })?;

        Variable::new(self.name, universe, self.role, terms_from(self.terms))
    }
}

/// `IF v1 IS t1 AND v2 IS t2 ... THEN output IS then`
#[derive(Clone, Copy, Debug)]
pub struct RuleDef {
    pub when: &'static [(&'static str, &'static str)],
    pub then: (&'static str, &'static str),
}

impl RuleDef {
    const fn new(when: &'static [(&'static str, &'static str)], then: (&'static str, &'static str)) -> Self {
        Self { when, then }
    }

    pub fn to_rule(&self) -> Option<Rule> {
        let antecedent = Antecedent::all(self.when.iter().map(|(var, term)| is(*var, *term)))?;

        Some(Rule::new(antecedent, self.then.0, self.then.1))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SystemDef {
    pub name: &'static str,
    pub variables: &'static [VariableDef],
    pub rules: &'static [RuleDef],
}

impl SystemDef {
    /// A builder preloaded with this system, sampled at `resolution` points per universe.
    pub fn builder(&self, resolution: usize) -> ConfigResult<EngineBuilder> {
        let mut builder = EngineBuilder::new(self.name);

        for def in self.variables {
            builder = builder.variable(def.build(resolution)?);
        }

        let rules = self
            .rules
            .iter()
            .map(RuleDef::to_rule)
            .collect::<Option<Vec<_>>>()
            .ok_or(ConfigError::NoRules)?;

        Ok(builder.rules(rules))
    }

    /// Validated engine at the default resolution, with full grid coverage enforced.
    pub fn build(&self) -> ConfigResult<InferenceEngine> {
        self.builder(DEFAULT_RESOLUTION)?.require_complete_grid().build()
    }
}

const SIF1_OUTPUT_TERMS: &[(&str, Shape)] = &[
    ("Muito baixa", Shape::trap(0., 0., 10., 30.)),
    ("baixa", Shape::tri(10., 30., 50.)),
    ("médio", Shape::tri(30., 50., 70.)),
    ("alta", Shape::tri(50., 70., 90.)),
    ("muito alta", Shape::trap(70., 90., 100., 100.)),
];

/// Family cohabitation (COF) and excessive density (AED) into the SIF1 index.
pub const SUBSYSTEM: SystemDef = SystemDef {
    name: "subsystem",
    variables: &[
        VariableDef {
            name: COF,
            min: 0.,
            max: 80.,
            role: Role::Antecedent,
            terms: &[
                ("baixa", Shape::trap(-30., -3.333, 35., 45.)),
                ("média", Shape::tri(35., 45., 55.)),
                ("alta", Shape::trap(45., 55., 100., 100.)),
            ],
        },
        VariableDef {
            name: AED,
            min: 0.,
            max: 40.,
            role: Role::Antecedent,
            terms: &[
                ("baixa", Shape::trap(-15., -1.667, 2., 11.)),
                ("média", Shape::tri(2., 11., 18.)),
                ("alta", Shape::trap(11., 18., 100., 100.)),
            ],
        },
        VariableDef {
            name: SIF1,
            min: 0.,
            max: 100.,
            role: Role::Consequent,
            terms: SIF1_OUTPUT_TERMS,
        },
    ],
    rules: &[
        RuleDef::new(&[(COF, "baixa"), (AED, "baixa")], (SIF1, "Muito baixa")),
        RuleDef::new(&[(COF, "baixa"), (AED, "média")], (SIF1, "baixa")),
        RuleDef::new(&[(COF, "baixa"), (AED, "alta")], (SIF1, "alta")),
        RuleDef::new(&[(COF, "média"), (AED, "baixa")], (SIF1, "baixa")),
        RuleDef::new(&[(COF, "média"), (AED, "média")], (SIF1, "médio")),
        RuleDef::new(&[(COF, "média"), (AED, "alta")], (SIF1, "muito alta")),
        RuleDef::new(&[(COF, "alta"), (AED, "baixa")], (SIF1, "alta")),
        RuleDef::new(&[(COF, "alta"), (AED, "média")], (SIF1, "muito alta")),
        RuleDef::new(&[(COF, "alta"), (AED, "alta")], (SIF1, "muito alta")),
    ],
};

const MB: (&str, &str) = (IFDH, "muito baixa");
const B: (&str, &str) = (IFDH, "baixa");
const M: (&str, &str) = (IFDH, "médio");
const A: (&str, &str) = (IFDH, "alta");
const MA: (&str, &str) = (IFDH, "muito alta");

/// Precarious dwellings (DOP), excessive rent burden (OEA) and SIF1 into IFDH.
pub const MAIN_SYSTEM: SystemDef = SystemDef {
    name: "main",
    variables: &[
        VariableDef {
            name: DOP,
            min: 0.,
            max: 40.,
            role: Role::Antecedent,
            terms: &[
                ("baixa", Shape::trap(0., 0., 10., 25.)),
                ("média", Shape::tri(10., 25., 40.)),
                ("alta", Shape::trap(25., 40., 40., 40.)),
            ],
        },
        VariableDef {
            name: OEA,
            min: 0.,
            max: 70.,
            role: Role::Antecedent,
            terms: &[
                ("baixa", Shape::trap(0., 0., 15., 40.)),
                ("média", Shape::tri(15., 40., 60.)),
                ("alta", Shape::trap(40., 60., 70., 70.)),
            ],
        },
        VariableDef {
            name: SIF1,
            min: 0.,
            max: 100.,
            role: Role::Antecedent,
            terms: &[
                ("baixa", Shape::trap(0., 0., 20., 50.)),
                ("médio", Shape::tri(20., 50., 80.)),
                ("alta", Shape::trap(50., 80., 100., 100.)),
            ],
        },
        VariableDef {
            name: IFDH,
            min: 0.,
            max: 100.,
            role: Role::Consequent,
            terms: &[
                ("muito baixa", Shape::trap(0., 0., 10., 30.)),
                ("baixa", Shape::tri(10., 30., 50.)),
                ("médio", Shape::tri(30., 50., 70.)),
                ("alta", Shape::tri(50., 70., 90.)),
                ("muito alta", Shape::trap(70., 90., 100., 100.)),
            ],
        },
    ],
    rules: &[
        // DOP baixa
        RuleDef::new(&[(DOP, "baixa"), (OEA, "baixa"), (SIF1, "baixa")], MB),
        RuleDef::new(&[(DOP, "baixa"), (OEA, "baixa"), (SIF1, "médio")], MB),
        RuleDef::new(&[(DOP, "baixa"), (OEA, "baixa"), (SIF1, "alta")], B),
        RuleDef::new(&[(DOP, "baixa"), (OEA, "média"), (SIF1, "baixa")], MB),
        RuleDef::new(&[(DOP, "baixa"), (OEA, "média"), (SIF1, "médio")], B),
        RuleDef::new(&[(DOP, "baixa"), (OEA, "média"), (SIF1, "alta")], M),
        RuleDef::new(&[(DOP, "baixa"), (OEA, "alta"), (SIF1, "baixa")], M),
        RuleDef::new(&[(DOP, "baixa"), (OEA, "alta"), (SIF1, "médio")], A),
        RuleDef::new(&[(DOP, "baixa"), (OEA, "alta"), (SIF1, "alta")], MA),
        // DOP média
        RuleDef::new(&[(DOP, "média"), (OEA, "baixa"), (SIF1, "baixa")], B),
        RuleDef::new(&[(DOP, "média"), (OEA, "baixa"), (SIF1, "médio")], M),
        RuleDef::new(&[(DOP, "média"), (OEA, "baixa"), (SIF1, "alta")], A),
        RuleDef::new(&[(DOP, "média"), (OEA, "média"), (SIF1, "baixa")], M),
        RuleDef::new(&[(DOP, "média"), (OEA, "média"), (SIF1, "médio")], A),
        RuleDef::new(&[(DOP, "média"), (OEA, "média"), (SIF1, "alta")], MA),
        RuleDef::new(&[(DOP, "média"), (OEA, "alta"), (SIF1, "baixa")], A),
        RuleDef::new(&[(DOP, "média"), (OEA, "alta"), (SIF1, "médio")], MA),
        RuleDef::new(&[(DOP, "média"), (OEA, "alta"), (SIF1, "alta")], MA),
        // DOP alta
        RuleDef::new(&[(DOP, "alta"), (OEA, "baixa"), (SIF1, "baixa")], A),
        RuleDef::new(&[(DOP, "alta"), (OEA, "baixa"), (SIF1, "médio")], MA),
        RuleDef::new(&[(DOP, "alta"), (OEA, "baixa"), (SIF1, "alta")], MA),
        RuleDef::new(&[(DOP, "alta"), (OEA, "média"), (SIF1, "baixa")], MA),
        RuleDef::new(&[(DOP, "alta"), (OEA, "média"), (SIF1, "médio")], MA),
        RuleDef::new(&[(DOP, "alta"), (OEA, "média"), (SIF1, "alta")], MA),
        RuleDef::new(&[(DOP, "alta"), (OEA, "alta"), (SIF1, "baixa")], MA),
        RuleDef::new(&[(DOP, "alta"), (OEA, "alta"), (SIF1, "médio")], MA),
        RuleDef::new(&[(DOP, "alta"), (OEA, "alta"), (SIF1, "alta")], MA),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn term_rank(system: &SystemDef, term: &str) -> usize {
        let output = system
            .variables
            .iter()
            .find(|v| matches!(v.role, Role::Consequent))
            .unwrap();

        output.terms.iter().position(|(name, _)| *name == term).unwrap()
    }

    fn input_rank(system: &SystemDef, variable: &str, term: &str) -> usize {
        let def = system.variables.iter().find(|v| v.name == variable).unwrap();

        def.terms.iter().position(|(name, _)| *name == term).unwrap()
    }

    #[test]
    fn test_tables_build_with_complete_grids() {
        let sub = SUBSYSTEM.build().unwrap();
        let main = MAIN_SYSTEM.build().unwrap();

        assert_eq!(sub.rules().len(), 9);
        assert_eq!(main.rules().len(), 27);
        assert_eq!(sub.inputs().map(|v| v.name()).collect::<Vec<_>>(), vec![COF, AED]);
        assert_eq!(main.inputs().map(|v| v.name()).collect::<Vec<_>>(), vec![DOP, OEA, SIF1]);
        assert_eq!(sub.output().name(), SIF1);
        assert_eq!(main.output().name(), IFDH);
    }

    #[test]
    fn test_every_cell_has_exactly_one_rule() {
        for system in [&SUBSYSTEM, &MAIN_SYSTEM] {
            let mut cells: Vec<Vec<usize>> = system
                .rules
                .iter()
                .map(|rule| {
                    rule.when
                        .iter()
                        .map(|(var, term)| input_rank(system, var, term))
                        .collect()
                })
                .collect();
            let total = cells.len();

            cells.sort();
            cells.dedup();

            assert_eq!(cells.len(), total, "{} has overlapping rules", system.name);
        }
    }

    #[test]
    fn test_rule_tables_are_monotone() {
        // raising any single input term never lowers the consequent term
        for system in [&SUBSYSTEM, &MAIN_SYSTEM] {
            let ranked: Vec<(Vec<usize>, usize)> = system
                .rules
                .iter()
                .map(|rule| {
                    let cell = rule
                        .when
                        .iter()
                        .map(|(var, term)| input_rank(system, var, term))
                        .collect();

                    (cell, term_rank(system, rule.then.1))
                })
                .collect();

            for (cell, out) in &ranked {
                for (other, other_out) in &ranked {
                    let dominates = cell.iter().zip(other).all(|(a, b)| a <= b);

                    if dominates {
                        assert!(out <= other_out, "{}: {cell:?} -> {out} vs {other:?} -> {other_out}", system.name);
                    }
                }
            }
        }
    }

    #[test]
    fn test_incomplete_table_is_rejected() {
        const PARTIAL: SystemDef = SystemDef {
            name: "partial",
            variables: SUBSYSTEM.variables,
            rules: &[RuleDef::new(&[(COF, "baixa"), (AED, "baixa")], (SIF1, "Muito baixa"))],
        };

        assert_eq!(
            PARTIAL.build().unwrap_err(),
            ConfigError::IncompleteRuleGrid("COF[baixa], AED[média]".into())
        );
        // without the grid requirement the same table is accepted
        assert!(PARTIAL.builder(DEFAULT_RESOLUTION).unwrap().build().is_ok());
    }

    #[test]
    fn test_invalid_resolution() {
        assert!(matches!(
            SUBSYSTEM.builder(1),
            Err(ConfigError::InvalidUniverse { resolution: 1, .. })
        ));
    }
}
