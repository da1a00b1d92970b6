//! Regions of integration: ordered bound pairs, matched positionally with integration variables.
use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use itertools::Itertools;
use std::fmt;

/// Lower and upper limit for one integration variable. Limits may depend on variables that are
/// integrated later.
#[derive(Clone, Debug, PartialEq)]
pub struct Bound {
    pub lower: Expr,
    pub upper: Expr,
}

impl Bound {
    pub fn new(lower: Expr, upper: Expr) -> Bound {
        Bound { lower, upper }
    }

    pub fn numeric(lower: f64, upper: f64) -> Bound {
        Bound::new(Expr::Const(lower), Expr::Const(upper))
    }

    /// both limits given as expression strings, e.g. `("0", "sqrt(1 - x^2)")`
    pub fn parse(lower: &str, upper: &str) -> Result<Bound, CalcError> {
        Ok(Bound::new(
            Expr::parse_expression(lower)?,
            Expr::parse_expression(upper)?,
        ))
    }
}

impl From<(f64, f64)> for Bound {
    fn from((lower, upper): (f64, f64)) -> Bound {
        Bound::numeric(lower, upper)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lower, self.upper)
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Region {
    bounds: Vec<Bound>,
}

impl Region {
    pub fn new(bounds: Vec<Bound>) -> Region {
        Region { bounds }
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Region {
        Region::new(pairs.iter().map(|&pair| Bound::from(pair)).collect())
    }

    pub fn from_exprs(pairs: Vec<(Expr, Expr)>) -> Region {
        Region::new(
            pairs
                .into_iter()
                .map(|(lower, upper)| Bound::new(lower, upper))
                .collect(),
        )
    }

    pub fn parse(pairs: &[(&str, &str)]) -> Result<Region, CalcError> {
        let bounds = pairs
            .iter()
            .map(|(lower, upper)| Bound::parse(lower, upper))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Region::new(bounds))
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Bound> {
        self.bounds.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bound> {
        self.bounds.iter()
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a Bound;
    type IntoIter = std::slice::Iter<'a, Bound>;

    fn into_iter(self) -> Self::IntoIter {
        self.bounds.iter()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.bounds.iter().join(", "))
    }
}
