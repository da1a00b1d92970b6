//! # Function
//! A symbolic expression together with the ordered list of parameters it depends on and the
//! snapshots of its previous states.
//!
//! Operations that change the expression (`integrate`, `transform`) return a new `Function`
//! whose history ends with the state it was built from; `undo` returns the value with that
//! snapshot restored. The receiver is never modified.
//!
//! Variables and region bounds are paired by position: integrating `f dx dy` over
//! `x in [a, b]` and `y in [c, d]` takes `vars = ["x", "y"]` and `region = [(a, b), (c, d)]`.
//! A bound may depend on variables that are integrated after it. Only the lengths are checked,
//! a wrong order gives a wrong result.
//!
//!# Example
//! ```
//! use RustedCalculus::calculus::function::Function;
//! use RustedCalculus::calculus::region::Region;
//! let f = Function::from_str("x^2 + y^2", &["x", "y"]).unwrap();
//! let region = Region::from_pairs(&[(0.0, 1.0), (0.0, 1.0)]);
//! let integrated = f.integrate(&["x", "y"], Some(&region)).unwrap();
//! assert!((integrated.to_f64().unwrap() - 2.0 / 3.0).abs() < 1e-12);
//! let restored = integrated.undo().unwrap();
//! assert_eq!(restored.state(), f.state());
//! ```
use crate::Utils::settings::CalcSettings;
use crate::calculus::region::{Bound, Region};
use crate::calculus::transform::{CoordinateSystem, Transform};
use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    state: Expr,
    params: Vec<String>,
    history: Vec<Expr>,
    coordinates: CoordinateSystem,
    settings: CalcSettings,
}

/// Numeric value of an expression that should no longer contain symbols
fn to_number(expr: &Expr) -> Result<f64, CalcError> {
    let simplified = expr.simplify();
    match simplified.as_const() {
        Some(value) => Ok(value),
        None => Err(CalcError::UnresolvedSymbols {
            expr: simplified.to_string(),
            symbols: simplified.free_variables(),
        }),
    }
}

fn check_region(vars: &[&str], region: Option<&Region>) -> Result<(), CalcError> {
    match region {
        Some(region) if region.len() != vars.len() => Err(CalcError::RegionMismatch {
            variables: vars.len(),
            bounds: region.len(),
        }),
        _ => Ok(()),
    }
}

/// Iterated integration of `expr`: innermost variable first
fn integrate_sequence(
    expr: &Expr,
    vars: &[&str],
    region: Option<&Region>,
    settings: &CalcSettings,
) -> Result<Expr, CalcError> {
    check_region(vars, region)?;
    let mut current = expr.clone();
    for (i, var) in vars.iter().enumerate() {
        let bound = region.and_then(|r| r.get(i));
        current = integral_step(&current, var, bound, settings)?;
        debug!("after integrating over {}: {}", var, current);
    }
    Ok(current)
}

fn integral_step(
    expr: &Expr,
    var: &str,
    bound: Option<&Bound>,
    settings: &CalcSettings,
) -> Result<Expr, CalcError> {
    let max_power = settings.max_expand_power;
    let result = match bound {
        Some(bound) => expr.definite_integrate_with_limit(var, &bound.lower, &bound.upper, max_power)?,
        None => expr.integrate_with_limit(var, max_power)?,
    };
    Ok(settings.finish(result))
}

/// `∫ 1` or `∫ ρ` must be non-zero to divide by it
fn nonzero_measure(measure: f64, what: impl FnOnce() -> String) -> Result<f64, CalcError> {
    if measure == 0.0 {
        Err(CalcError::ZeroMeasure(what()))
    } else {
        Ok(measure)
    }
}

impl Function {
    /// The stored state is the simplified expression
    pub fn new(expr: Expr, params: &[&str]) -> Function {
        Function {
            state: expr.simplify(),
            params: params.iter().map(|p| p.to_string()).collect(),
            history: Vec::new(),
            coordinates: CoordinateSystem::Rectangular,
            settings: CalcSettings::default(),
        }
    }

    pub fn from_str(input: &str, params: &[&str]) -> Result<Function, CalcError> {
        Ok(Function::new(Expr::parse_expression(input)?, params))
    }

    pub fn with_coordinates(mut self, coordinates: CoordinateSystem) -> Function {
        self.coordinates = coordinates;
        self
    }

    /// Settings used by every later operation: the expansion limit of integration and whether
    /// results are simplified. The current state is kept as is.
    pub fn with_settings(mut self, settings: CalcSettings) -> Function {
        self.settings = settings;
        self
    }

    pub fn state(&self) -> &Expr {
        &self.state
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn history(&self) -> &[Expr] {
        &self.history
    }

    pub fn coordinates(&self) -> CoordinateSystem {
        self.coordinates
    }

    pub fn settings(&self) -> &CalcSettings {
        &self.settings
    }

    fn param_refs(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.as_str()).collect()
    }

    /// New function with the same params, coordinates and settings, history not carried over
    fn sibling(&self, expr: Expr) -> Function {
        Function {
            state: self.settings.finish(expr),
            params: self.params.clone(),
            history: Vec::new(),
            coordinates: self.coordinates,
            settings: self.settings.clone(),
        }
    }

    /// value of the current state; every free symbol must be given
    pub fn evaluate(&self, values: &HashMap<String, f64>) -> Result<f64, CalcError> {
        self.state.eval_map(values)
    }

    /// current state with the given symbols substituted, simplified
    pub fn subs(&self, values: &HashMap<String, Expr>) -> Expr {
        self.settings.finish(self.state.substitute_map(values))
    }

    /// current state as a number, if no symbols are left in it
    pub fn to_f64(&self) -> Result<f64, CalcError> {
        to_number(&self.state)
    }

    pub fn diff(&self, var: &str) -> Expr {
        self.settings.finish(self.state.diff(var))
    }

    /// partial derivatives with respect to every param, in param order
    pub fn gradient(&self) -> Vec<Expr> {
        self.state.diff_multi_args(&self.param_refs())
    }

    /// One integration step over `var`, definite if a bound is given. Does not change `self`.
    pub fn integral(&self, var: &str, bound: Option<&Bound>) -> Result<Expr, CalcError> {
        integral_step(&self.state, var, bound, &self.settings)
    }

    /// Integrates over `vars` in order, pairing `vars[i]` with `region[i]`. Does not change `self`.
    pub fn integral_over(&self, vars: &[&str], region: Option<&Region>) -> Result<Expr, CalcError> {
        integrate_sequence(&self.state, vars, region, &self.settings)
    }

    /// Same integration as `integral_over`, returned as a new `Function` that remembers the
    /// current state.
    pub fn integrate(&self, vars: &[&str], region: Option<&Region>) -> Result<Function, CalcError> {
        let state = self.integral_over(vars, region)?;
        info!("integrated {} over {:?}: {}", self.state, vars, state);
        let mut history = self.history.clone();
        history.push(self.state.clone());
        Ok(Function {
            state,
            params: self.params.clone(),
            history,
            coordinates: self.coordinates,
            settings: self.settings.clone(),
        })
    }

    /// The function as it was before the last `integrate` or `transform`
    pub fn undo(&self) -> Result<Function, CalcError> {
        let mut history = self.history.clone();
        match history.pop() {
            Some(previous) => {
                debug!("undo: {} -> {}", self.state, previous);
                Ok(Function {
                    state: previous,
                    params: self.params.clone(),
                    history,
                    coordinates: self.coordinates,
                    settings: self.settings.clone(),
                })
            }
            None => {
                warn!("nothing to undo for {}", self.state);
                Err(CalcError::EmptyHistory)
            }
        }
    }

    /// Mean of the function over the region: `∫ f / ∫ 1`
    ///
    /// # Errors
    /// `ZeroMeasure` for a degenerate region such as `[(1, 1)]`.
    pub fn average_value(&self, vars: &[&str], region: &Region) -> Result<f64, CalcError> {
        let total = to_number(&self.integral_over(vars, Some(region))?)?;
        let measure = to_number(&self.sibling(Expr::Const(1.0)).integral_over(vars, Some(region))?)?;
        let measure = nonzero_measure(measure, || format!("region {}", region))?;
        Ok(total / measure)
    }

    /// Mean weighted by a density: `∫ f ρ / ∫ ρ`. `ZeroMeasure` if `∫ ρ` vanishes.
    pub fn average_value_weighted(
        &self,
        vars: &[&str],
        region: &Region,
        density: &Expr,
    ) -> Result<f64, CalcError> {
        let weighted = self.sibling(self.state.clone() * density.clone());
        let total = to_number(&weighted.integral_over(vars, Some(region))?)?;
        let mass = to_number(&self.sibling(density.clone()).integral_over(vars, Some(region))?)?;
        let mass = nonzero_measure(mass, || format!("density {} over region {}", density, region))?;
        Ok(total / mass)
    }

    /// Change of variables: the state becomes `f(old -> new) * scale`, the params become the
    /// transform's params.
    pub fn transform(&self, transform: &Transform) -> Result<Function, CalcError> {
        let (substituted, scale) = transform.apply(&self.state)?;
        let mut history = self.history.clone();
        history.push(self.state.clone());
        Ok(Function {
            state: self.settings.finish(substituted * scale),
            params: transform.params.clone(),
            history,
            coordinates: transform.coordinates,
            settings: self.settings.clone(),
        })
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    #[test]
    fn test_new_simplifies() {
        let f = Function::from_str("x + 0*y + x", &["x", "y"]).unwrap();
        assert_eq!(f.state(), &parse("2*x").simplify());
        assert_eq!(f.params(), &["x".to_string(), "y".to_string()]);
        assert!(f.history().is_empty());
        assert_eq!(f.coordinates(), CoordinateSystem::Rectangular);
        assert!(Function::from_str("x +", &["x"]).is_err());
    }

    #[test]
    fn test_evaluate_and_subs() {
        let f = Function::from_str("x^2*y", &["x", "y"]).unwrap();
        let values = HashMap::from([("x".to_string(), 3.0), ("y".to_string(), 2.0)]);
        assert_relative_eq!(f.evaluate(&values).unwrap(), 18.0);
        let missing = HashMap::from([("x".to_string(), 3.0)]);
        assert!(matches!(f.evaluate(&missing), Err(CalcError::UnresolvedSymbols { .. })));

        let partial = f.subs(&HashMap::from([("y".to_string(), Expr::Const(2.0))]));
        assert_eq!(partial, parse("2*x^2").simplify());
    }

    #[test]
    fn test_diff_and_gradient() {
        let f = Function::from_str("x^2*y + sin(y)", &["x", "y"]).unwrap();
        let grad = f.gradient();
        assert_eq!(grad.len(), 2);
        let at = [1.5, 0.5];
        assert_relative_eq!(grad[0].eval_expression(&["x", "y"], &at).unwrap(), 2.0 * 1.5 * 0.5, epsilon = 1e-12);
        assert_relative_eq!(
            grad[1].eval_expression(&["x", "y"], &at).unwrap(),
            1.5 * 1.5 + f64::cos(0.5),
            epsilon = 1e-12
        );
        assert_eq!(f.diff("x"), grad[0]);
    }

    #[test]
    fn test_integral_single_step() {
        let f = Function::from_str("x*y", &["x", "y"]).unwrap();
        let indefinite = f.integral("x", None).unwrap();
        assert_eq!(indefinite.diff("x").simplify(), f.state().clone());
        let definite = f.integral("x", Some(&Bound::numeric(0.0, 2.0))).unwrap();
        assert_eq!(definite, parse("2*y").simplify());
    }

    #[test]
    fn test_integrate_over_dependent_region() {
        // triangle 0 <= y <= x <= 1, integrate dy first
        let f = Function::from_str("1", &["x", "y"]).unwrap();
        let region = Region::parse(&[("0", "x"), ("0", "1")]).unwrap();
        let area = f.integrate(&["y", "x"], Some(&region)).unwrap();
        assert_relative_eq!(area.to_f64().unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(area.history().len(), 1);
        assert_eq!(f.history().len(), 0);
    }

    #[test]
    fn test_integrate_indefinite_sequence() {
        let f = Function::from_str("x*y", &["x", "y"]).unwrap();
        let g = f.integrate(&["x", "y"], None).unwrap();
        let back = g.diff("y").diff("x").simplify();
        assert_eq!(back, f.state().clone());
    }

    #[test]
    fn test_region_mismatch() {
        let f = Function::from_str("x*y", &["x", "y"]).unwrap();
        let region = Region::from_pairs(&[(0.0, 1.0)]);
        let err = f.integrate(&["x", "y"], Some(&region)).unwrap_err();
        assert_eq!(err, CalcError::RegionMismatch { variables: 2, bounds: 1 });
    }

    #[test]
    fn test_undo() {
        let f = Function::from_str("x^2", &["x"]).unwrap();
        assert_eq!(f.undo().unwrap_err(), CalcError::EmptyHistory);
        let once = f.integrate(&["x"], None).unwrap();
        let twice = once.integrate(&["x"], None).unwrap();
        assert_eq!(twice.history().len(), 2);
        let back = twice.undo().unwrap();
        assert_eq!(back, once);
        assert_eq!(back.undo().unwrap(), f);
    }

    #[test]
    fn test_average_values() {
        let f = Function::from_str("x + y", &["x", "y"]).unwrap();
        let region = Region::from_pairs(&[(0.0, 2.0), (0.0, 1.0)]);
        assert_relative_eq!(f.average_value(&["x", "y"], &region).unwrap(), 1.5, epsilon = 1e-12);

        let g = Function::from_str("x", &["x"]).unwrap();
        let line = Region::from_pairs(&[(0.0, 1.0)]);
        let weighted = g.average_value_weighted(&["x"], &line, &parse("x")).unwrap();
        assert_relative_eq!(weighted, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_average_value_unresolved() {
        let f = Function::from_str("x*y", &["x", "y"]).unwrap();
        let region = Region::from_pairs(&[(0.0, 1.0)]);
        let err = f.average_value(&["x"], &region).unwrap_err();
        match err {
            CalcError::UnresolvedSymbols { symbols, .. } => assert_eq!(symbols, vec!["y".to_string()]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_average_over_zero_measure() {
        let f = Function::from_str("x^2", &["x"]).unwrap();
        let point = Region::from_pairs(&[(1.0, 1.0)]);
        let err = f.average_value(&["x"], &point).unwrap_err();
        assert!(matches!(err, CalcError::ZeroMeasure(_)));
        // ∫_{-1}^{1} x dx = 0
        let line = Region::from_pairs(&[(-1.0, 1.0)]);
        let err = f.average_value_weighted(&["x"], &line, &parse("x")).unwrap_err();
        assert!(matches!(err, CalcError::ZeroMeasure(_)));
    }

    #[test]
    fn test_settings_reach_integration() {
        let cube = Function::from_str("(x + 1)^3", &["x"]).unwrap();
        let at_zero = |f: &Function| f.state().eval_expression(&["x"], &[0.0]).unwrap();
        // expanded: x^4/4 + x^3 + 3x^2/2 + x
        let expanded = cube.integrate(&["x"], None).unwrap();
        assert_relative_eq!(at_zero(&expanded), 0.0, epsilon = 1e-12);
        // kept as a power: (x + 1)^4/4
        let limited = CalcSettings {
            max_expand_power: 2,
            ..CalcSettings::default()
        };
        let kept = cube.clone().with_settings(limited.clone()).integrate(&["x"], None).unwrap();
        assert_relative_eq!(at_zero(&kept), 0.25, epsilon = 1e-12);
        assert_eq!(kept.settings(), &limited);
        assert_eq!(kept.undo().unwrap().settings(), &limited);
    }

    #[test]
    fn test_settings_without_simplification() {
        let raw = CalcSettings {
            simplify_results: false,
            ..CalcSettings::default()
        };
        let f = Function::from_str("x^2 + y^2", &["x", "y"]).unwrap();
        let simplified = f.transform(&Transform::polar("r", "t")).unwrap();
        let unsimplified = f.with_settings(raw).transform(&Transform::polar("r", "t")).unwrap();
        assert_ne!(unsimplified.state(), simplified.state());
        assert_eq!(unsimplified.state().simplify(), simplified.state().clone());
        let at = [1.5, 0.4];
        assert_relative_eq!(
            unsimplified.state().eval_expression(&["r", "t"], &at).unwrap(),
            1.5f64.powi(3),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_transform_to_polar() {
        let f = Function::from_str("x^2 + y^2", &["x", "y"]).unwrap();
        let polar = f.transform(&Transform::polar("r", "t")).unwrap();
        assert_eq!(polar.coordinates(), CoordinateSystem::Polar);
        assert_eq!(polar.params(), &["r".to_string(), "t".to_string()]);
        assert_eq!(polar.state(), &parse("r^3"));
        // integral over the unit disk
        let disk = Region::parse(&[("0", "1"), ("0", "2*pi")]).unwrap();
        let value = polar.integrate(&["r", "t"], Some(&disk)).unwrap().to_f64().unwrap();
        assert_relative_eq!(value, std::f64::consts::PI / 2.0, epsilon = 1e-12);
        assert_eq!(polar.undo().unwrap().state(), f.state());
    }
}
