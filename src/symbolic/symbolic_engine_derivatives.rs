//! # Symbolic Engine Derivatives Module
//!
//! Extends the symbolic engine with differentiation and numerical evaluation.
//!
//! ## Key Methods
//!
//! ### Differentiation
//! - `diff(var: &str)` - Analytical partial/total derivative
//! - `diff_multi_args()` - All partial derivatives at once (gradient)
//! - `n_th_derivative()` - Higher-order derivatives
//!
//! ### Function evaluation
//! - `eval_expression()` - Direct evaluation without closure creation
//! - `eval_map()` - Evaluation with values taken from a map
//! - `lambdify()` - Conversion into a boxed Rust closure
//!
//! Evaluation refuses expressions with variables that were not given a value and reports
//! them as `CalcError::UnresolvedSymbols`.

use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use std::collections::HashMap;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements all standard differentiation rules from calculus:
    /// - Power rule: d/dx(x^n) = n*x^(n-1), and the general d/dx(f^g) = f^g*(g'*ln(f) + g*f'/f)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule: d/dx(f(g(x))) = f'(g(x))*g'(x)
    /// - d/dx|u| = u/|u| * u'
    ///
    /// The result is not simplified.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.diff("x").simplify(); // 2*x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
                )),
                Box::new(Expr::Pow(rhs.clone(), Box::new(Expr::Const(2.0)))),
            ),
            Expr::Pow(base, exp) if !exp.contains_variable(var) => Expr::Mul(
                Box::new(Expr::Mul(
                    exp.clone(),
                    Box::new(Expr::Pow(
                        base.clone(),
                        Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                    )),
                )),
                Box::new(base.diff(var)),
            ),
            Expr::Pow(base, exp) if !base.contains_variable(var) => Expr::Mul(
                Box::new(Expr::Mul(Box::new(self.clone()), Box::new(Expr::Ln(base.clone())))),
                Box::new(exp.diff(var)),
            ),
            Expr::Pow(base, exp) => Expr::Mul(
                Box::new(self.clone()),
                Box::new(Expr::Add(
                    Box::new(Expr::Mul(Box::new(exp.diff(var)), Box::new(Expr::Ln(base.clone())))),
                    Box::new(Expr::Div(
                        Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                        base.clone(),
                    )),
                )),
            ),
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::cos(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::arcsin(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arccos(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arctg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
            Expr::Abs(expr) => Expr::Mul(
                Box::new(Expr::Div(expr.clone(), Box::new(Expr::Abs(expr.clone())))),
                Box::new(expr.diff(var)),
            ),
        }
    }

    /// n-th derivative, simplified after every step
    pub fn n_th_derivative(&self, var_name: &str, n: usize) -> Expr {
        let mut expr = self.clone();
        for _ in 0..n {
            expr = expr.diff(var_name).simplify();
        }
        expr
    }

    /// Simplified partial derivatives with respect to each of the given variables.
    pub fn diff_multi_args(&self, all_vars: &[&str]) -> Vec<Expr> {
        all_vars
            .iter()
            .map(|var| self.diff(var).simplify())
            .collect()
    }

    /// FUNCTION EVALUATION

    /// Fails with `UnresolvedSymbols` when any variable is not known to `is_known`.
    fn check_resolved<F>(&self, is_known: F) -> Result<(), CalcError>
    where
        F: Fn(&str) -> bool,
    {
        let missing: Vec<String> = self
            .free_variables()
            .into_iter()
            .filter(|name| !is_known(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CalcError::UnresolvedSymbols {
                expr: self.to_string(),
                symbols: missing,
            })
        }
    }

    fn eval_unchecked<F>(&self, lookup: &F) -> f64
    where
        F: Fn(&str) -> f64,
    {
        match self {
            Expr::Var(name) => lookup(name),
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_unchecked(lookup) + rhs.eval_unchecked(lookup),
            Expr::Sub(lhs, rhs) => lhs.eval_unchecked(lookup) - rhs.eval_unchecked(lookup),
            Expr::Mul(lhs, rhs) => lhs.eval_unchecked(lookup) * rhs.eval_unchecked(lookup),
            Expr::Div(lhs, rhs) => lhs.eval_unchecked(lookup) / rhs.eval_unchecked(lookup),
            Expr::Pow(base, exp) => {
                let base_val = base.eval_unchecked(lookup);
                let exp_val = exp.eval_unchecked(lookup);
                // integer powers keep the sign of a negative base
                if exp_val.fract() == 0.0 && exp_val.abs() <= i32::MAX as f64 {
                    base_val.powi(exp_val as i32)
                } else {
                    base_val.powf(exp_val)
                }
            }
            Expr::Exp(expr) => expr.eval_unchecked(lookup).exp(),
            Expr::Ln(expr) => expr.eval_unchecked(lookup).ln(),
            Expr::sin(expr) => expr.eval_unchecked(lookup).sin(),
            Expr::cos(expr) => expr.eval_unchecked(lookup).cos(),
            Expr::tg(expr) => expr.eval_unchecked(lookup).tan(),
            Expr::arcsin(expr) => expr.eval_unchecked(lookup).asin(),
            Expr::arccos(expr) => expr.eval_unchecked(lookup).acos(),
            Expr::arctg(expr) => expr.eval_unchecked(lookup).atan(),
            Expr::Abs(expr) => expr.eval_unchecked(lookup).abs(),
        }
    }

    /// Evaluates the expression with `vars[i] = values[i]`.
    ///
    /// # Errors
    /// `UnresolvedSymbols` if the expression has a variable not listed in `vars`,
    /// `Shape` if `vars` and `values` differ in length.
    pub fn eval_expression(&self, vars: &[&str], values: &[f64]) -> Result<f64, CalcError> {
        if vars.len() != values.len() {
            return Err(CalcError::Shape(format!(
                "{} variables but {} values",
                vars.len(),
                values.len()
            )));
        }
        self.check_resolved(|name| vars.contains(&name))?;
        Ok(self.eval_unchecked(&|name: &str| {
            vars.iter()
                .position(|v| *v == name)
                .map(|i| values[i])
                .unwrap_or(f64::NAN)
        }))
    }

    /// Evaluates the expression with variable values taken from a map.
    pub fn eval_map(&self, values: &HashMap<String, f64>) -> Result<f64, CalcError> {
        self.check_resolved(|name| values.contains_key(name))?;
        Ok(self.eval_unchecked(&|name: &str| values.get(name).copied().unwrap_or(f64::NAN)))
    }

    /// Value of an expression without free variables.
    pub fn to_f64(&self) -> Result<f64, CalcError> {
        self.eval_expression(&[], &[])
    }

    /// Converts the expression into a closure of the listed variables, checked once up front.
    ///
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x*y + 1")?.lambdify(&["x", "y"])?;
    /// assert_eq!(f(&[2.0, 3.0]), 7.0);
    /// ```
    pub fn lambdify(&self, vars: &[&str]) -> Result<Box<dyn Fn(&[f64]) -> f64>, CalcError> {
        self.check_resolved(|name| vars.contains(&name))?;
        let index: HashMap<String, usize> = vars
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        let expr = self.clone();
        Ok(Box::new(move |values: &[f64]| {
            expr.eval_unchecked(&|name: &str| {
                index
                    .get(name)
                    .and_then(|&i| values.get(i).copied())
                    .unwrap_or(f64::NAN)
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    // central difference of f along var at the given point
    fn numeric_partial(expr: &Expr, vars: &[&str], point: &[f64], var_index: usize) -> f64 {
        let h = 1e-6;
        let mut plus = point.to_vec();
        let mut minus = point.to_vec();
        plus[var_index] += h;
        minus[var_index] -= h;
        (expr.eval_expression(vars, &plus).unwrap() - expr.eval_expression(vars, &minus).unwrap())
            / (2.0 * h)
    }

    #[test]
    fn test_diff_against_finite_differences() {
        let vars = ["x", "y"];
        let point = [0.7, 1.3];
        for input in [
            "x^3*y - 2*x",
            "sin(x*y)/(1 + x^2)",
            "exp(2*x)*ln(y)",
            "x^y",
            "2^x",
            "arctg(x/y) + arcsin(x/2) - arccos(x/3)",
            "tan(x) + abs(x - y)",
            "sqrt(x^2 + y^2)",
        ] {
            let expr = parse(input);
            for (i, var) in vars.iter().enumerate() {
                let analytic = expr.diff(var).eval_expression(&vars, &point).unwrap();
                let numeric = numeric_partial(&expr, &vars, &point, i);
                assert_relative_eq!(analytic, numeric, epsilon = 1e-5, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn test_diff_simplified_forms() {
        assert_eq!(parse("x^2").diff("x").simplify(), parse("2*x"));
        assert_eq!(parse("5*y").diff("x").simplify(), Expr::Const(0.0));
        assert_eq!(parse("x^3").n_th_derivative("x", 3), Expr::Const(6.0));
        let gradient = parse("x^2 + x*y").diff_multi_args(&["x", "y"]);
        assert_eq!(gradient[1], Expr::var("x"));
        assert_relative_eq!(gradient[0].eval_expression(&["x", "y"], &[1.0, 2.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_eval_errors() {
        let expr = parse("x*y + z");
        match expr.eval_expression(&["x"], &[1.0]) {
            Err(CalcError::UnresolvedSymbols { symbols, .. }) => {
                assert_eq!(symbols, vec!["y".to_string(), "z".to_string()])
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(
            expr.eval_expression(&["x", "y", "z"], &[1.0]),
            Err(CalcError::Shape(_))
        ));
        assert!(parse("pi*2").to_f64().is_ok());
    }

    #[test]
    fn test_eval_negative_base_integer_power() {
        assert_relative_eq!(parse("x^3").eval_expression(&["x"], &[-2.0]).unwrap(), -8.0);
        assert_relative_eq!(parse("x^(-2)").eval_expression(&["x"], &[-2.0]).unwrap(), 0.25);
    }

    #[test]
    fn test_eval_map_and_lambdify() {
        let expr = parse("x*y + 1");
        let mut values = HashMap::new();
        values.insert("x".to_string(), 2.0);
        values.insert("y".to_string(), 3.0);
        assert_relative_eq!(expr.eval_map(&values).unwrap(), 7.0);
        let f = expr.lambdify(&["x", "y"]).unwrap();
        assert_relative_eq!(f(&[2.0, 3.0]), 7.0);
        assert!(expr.lambdify(&["x"]).is_err());
    }
}
