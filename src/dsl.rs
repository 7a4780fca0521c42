use std::fmt;

/// A rule premise: term lookups combined with AND / OR / NOT.
///
/// Variables and terms are referenced by name here; the engine builder resolves
/// them once and rejects unknown references.
#[derive(Clone, Debug, PartialEq)]
pub enum Antecedent {
    Is { variable: String, term: String },
    And(Box<Antecedent>, Box<Antecedent>),
    Or(Box<Antecedent>, Box<Antecedent>),
    Not(Box<Antecedent>),
}

/// `variable IS term`
pub fn is(variable: impl Into<String>, term: impl Into<String>) -> Antecedent {
    Antecedent::Is {
        variable: variable.into(),
        term: term.into(),
    }
}

impl Antecedent {
    pub fn and(self, rhs: Antecedent) -> Self {
        Antecedent::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Antecedent) -> Self {
        Antecedent::Or(Box::new(self), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Antecedent::Not(Box::new(self))
    }

    /// Left-folds `exprs` with AND. `None` when empty.
    pub fn all(exprs: impl IntoIterator<Item = Antecedent>) -> Option<Self> {
        exprs.into_iter().reduce(Antecedent::and)
    }

    /// Left-folds `exprs` with OR. `None` when empty.
    pub fn any(exprs: impl IntoIterator<Item = Antecedent>) -> Option<Self> {
        exprs.into_iter().reduce(Antecedent::or)
    }

    /// Every `(variable, term)` lookup in the tree, left to right.
    pub fn propositions(&self) -> Vec<(&str, &str)> {
        let mut props = Vec::new();

        fn parse<'p>(expr: &'p Antecedent, out: &mut Vec<(&'p str, &'p str)>) {
            match expr {
                Antecedent::Is { variable, term } => out.push((variable.as_str(), term.as_str())),
                Antecedent::And(lhs, rhs) | Antecedent::Or(lhs, rhs) => {
                    parse(lhs, out);
                    parse(rhs, out);
                },
                Antecedent::Not(expr) => parse(expr, out),
            }
        }

        parse(self, &mut props);

        props
    }
}

impl fmt::Display for Antecedent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Antecedent::Is { variable, term } => write!(f, "{variable}[{term}]"),
            Antecedent::And(lhs, rhs) => write!(f, "({lhs} AND {rhs})"),
            Antecedent::Or(lhs, rhs) => write!(f, "({lhs} OR {rhs})"),
            Antecedent::Not(expr) => write!(f, "NOT {expr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_and_propositions() {
        let expr = is("DOP", "baixa")
            .and(is("OEA", "média"))
            .or(is("SIF1", "alta").not());

        assert_eq!(
            expr.propositions(),
            vec![("DOP", "baixa"), ("OEA", "média"), ("SIF1", "alta")]
        );
        assert_eq!(expr.to_string(), "((DOP[baixa] AND OEA[média]) OR NOT SIF1[alta])");
    }

    #[test]
    fn test_all_folds_left() {
        let expr = Antecedent::all([is("A", "x"), is("B", "y"), is("C", "z")]).unwrap();

        assert_eq!(expr, is("A", "x").and(is("B", "y")).and(is("C", "z")));
        assert_eq!(Antecedent::any(Vec::new()), None);
    }
}
