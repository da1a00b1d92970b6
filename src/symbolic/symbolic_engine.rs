//! # Symbolic Engine Module
//!
//! Core expression type of the toolkit. Every calculus operation of the crate
//! (integration over regions, change of variables, Jacobians) is expressed as
//! a transformation of this tree.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "theta"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `arcsin`, `arccos`, `arctg`, `Abs`
//!
//! ### Key Methods
//! - `Symbols(symbols: &str)` - Create multiple variables from comma-separated string
//! - `substitute_variable()` / `substitute_map()` - replace variables by expressions
//! - `set_variable_from_map()` - replace variables by numbers
//! - `free_variables()` - sorted list of the symbols an expression depends on
//!
//! Differentiation, simplification, integration and parsing live in sibling
//! modules and extend `Expr` through further `impl` blocks.
//!
//! Trigonometric functions keep the mathematical notation (tg, arctg) of the
//! rest of the engine; the parser accepts `tan`/`atan` as aliases.

#![allow(non_camel_case_types)]

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y", "r")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
    /// Arcsine function: arcsin(x)
    arcsin(Box<Expr>),
    /// Arccosine function: arccos(x)
    arccos(Box<Expr>),
    /// Arctangent function: arctan(x) - uses mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// Absolute value |x|, produced by Jacobian scale factors
    Abs(Box<Expr>),
}

// binding strength used by Display to decide where parentheses are needed
const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_NEGATIVE: u8 = 3;
const PREC_POWER: u8 = 4;
const PREC_ATOM: u8 = 5;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Const(val) if *val < 0.0 => PREC_NEGATIVE,
            Expr::Var(_) | Expr::Const(_) => PREC_ATOM,
            Expr::Add(_, _) | Expr::Sub(_, _) => PREC_SUM,
            Expr::Mul(_, _) | Expr::Div(_, _) => PREC_PRODUCT,
            Expr::Pow(_, _) => PREC_POWER,
            _ => PREC_ATOM,
        }
    }

    /// true when the printed form starts with a minus sign, e.g. `-1*y` or `-2/x`
    fn leads_with_minus(&self) -> bool {
        match self {
            Expr::Const(val) => *val < 0.0,
            Expr::Add(lhs, _) | Expr::Sub(lhs, _) | Expr::Mul(lhs, _) | Expr::Div(lhs, _) => {
                lhs.leads_with_minus()
            }
            _ => false,
        }
    }

    fn fmt_wrapped(&self, f: &mut fmt::Formatter, wrap: bool) -> fmt::Result {
        if wrap {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }

    /// name under which a unary function node is printed and parsed
    pub fn function_name(&self) -> Option<&'static str> {
        match self {
            Expr::Exp(_) => Some("exp"),
            Expr::Ln(_) => Some("ln"),
            Expr::sin(_) => Some("sin"),
            Expr::cos(_) => Some("cos"),
            Expr::tg(_) => Some("tg"),
            Expr::arcsin(_) => Some("arcsin"),
            Expr::arccos(_) => Some("arccos"),
            Expr::arctg(_) => Some("arctg"),
            Expr::Abs(_) => Some("abs"),
            _ => None,
        }
    }
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Parentheses are only emitted where operator precedence requires them,
/// so `Add(Mul(2, x), 1)` prints as `2*x + 1`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                lhs.fmt_wrapped(f, lhs.precedence() < PREC_SUM)?;
                write!(f, " + ")?;
                rhs.fmt_wrapped(f, rhs.precedence() < PREC_SUM || rhs.leads_with_minus())
            }
            Expr::Sub(lhs, rhs) => {
                lhs.fmt_wrapped(f, lhs.precedence() < PREC_SUM)?;
                write!(f, " - ")?;
                rhs.fmt_wrapped(f, rhs.precedence() <= PREC_SUM || rhs.leads_with_minus())
            }
            Expr::Mul(lhs, rhs) => {
                lhs.fmt_wrapped(f, lhs.precedence() < PREC_PRODUCT)?;
                write!(f, "*")?;
                rhs.fmt_wrapped(f, rhs.precedence() < PREC_PRODUCT || rhs.leads_with_minus())
            }
            Expr::Div(lhs, rhs) => {
                lhs.fmt_wrapped(f, lhs.precedence() < PREC_PRODUCT)?;
                write!(f, "/")?;
                rhs.fmt_wrapped(f, rhs.precedence() <= PREC_NEGATIVE || rhs.leads_with_minus())
            }
            Expr::Pow(base, exp) => {
                base.fmt_wrapped(f, base.precedence() <= PREC_POWER)?;
                write!(f, "^")?;
                exp.fmt_wrapped(f, exp.precedence() < PREC_POWER)
            }
            Expr::Exp(arg)
            | Expr::Ln(arg)
            | Expr::sin(arg)
            | Expr::cos(arg)
            | Expr::tg(arg)
            | Expr::arcsin(arg)
            | Expr::arccos(arg)
            | Expr::arctg(arg)
            | Expr::Abs(arg) => {
                // every unary variant has a name
                let name = self.function_name().unwrap_or("?");
                write!(f, "{}({})", name, arg)
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Add<f64> for Expr {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        Expr::Add(self.boxed(), Expr::Const(rhs).boxed())
    }
}

impl std::ops::Sub<f64> for Expr {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self::Output {
        Expr::Sub(self.boxed(), Expr::Const(rhs).boxed())
    }
}

impl std::ops::Mul<f64> for Expr {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Expr::Mul(Expr::Const(rhs).boxed(), self.boxed())
    }
}

impl std::ops::Div<f64> for Expr {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Expr::Div(self.boxed(), Expr::Const(rhs).boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl From<f64> for Expr {
    fn from(val: f64) -> Self {
        Expr::Const(val)
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Creates a single variable.
    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// Whitespace is trimmed and empty names are skipped.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let vars = Expr::Symbols("x, y, z");
    /// assert_eq!(vars.len(), 3);
    /// ```
    #[allow(non_snake_case)]
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Expr::var)
            .collect()
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// e^(self)
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// ln(self)
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// self^rhs
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// self^n for a numeric exponent
    pub fn powf(self, n: f64) -> Expr {
        Expr::Pow(self.boxed(), Box::new(Expr::Const(n)))
    }

    /// self^(1/2)
    pub fn sqrt(self) -> Expr {
        self.powf(0.5)
    }

    /// |self|
    pub fn abs(self) -> Expr {
        Expr::Abs(self.boxed())
    }

    /// true if expression is Const(0.0)
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// true if expression is Const(1.0)
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 1.0)
    }

    /// Numeric value of a constant node
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ => None,
        }
    }

    /// Direct children of a node, left to right.
    pub fn args(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) => Vec::new(),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Exp(arg)
            | Expr::Ln(arg)
            | Expr::sin(arg)
            | Expr::cos(arg)
            | Expr::tg(arg)
            | Expr::arcsin(arg)
            | Expr::arccos(arg)
            | Expr::arctg(arg)
            | Expr::Abs(arg) => vec![arg.as_ref()],
        }
    }

    /// Rebuilds the node with `f` applied to every child. Leaves are returned unchanged.
    pub fn map_args<F>(&self, f: F) -> Expr
    where
        F: Fn(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Pow(base, exp) => Expr::Pow(f(base).boxed(), f(exp).boxed()),
            Expr::Exp(arg) => Expr::Exp(f(arg).boxed()),
            Expr::Ln(arg) => Expr::Ln(f(arg).boxed()),
            Expr::sin(arg) => Expr::sin(f(arg).boxed()),
            Expr::cos(arg) => Expr::cos(f(arg).boxed()),
            Expr::tg(arg) => Expr::tg(f(arg).boxed()),
            Expr::arcsin(arg) => Expr::arcsin(f(arg).boxed()),
            Expr::arccos(arg) => Expr::arccos(f(arg).boxed()),
            Expr::arctg(arg) => Expr::arctg(f(arg).boxed()),
            Expr::Abs(arg) => Expr::Abs(f(arg).boxed()),
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    /// Substitutes multiple variables with constant values.
    /// Only variables present in the map are substituted.
    pub fn set_variable_from_map(&self, var_map: &HashMap<String, f64>) -> Expr {
        match self {
            Expr::Var(name) => match var_map.get(name) {
                Some(value) => Expr::Const(*value),
                None => self.clone(),
            },
            _ => self.map_args(|arg| arg.set_variable_from_map(var_map)),
        }
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            _ => self.map_args(|arg| arg.substitute_variable(var, expr)),
        }
    }

    /// Simultaneous substitution: every variable found in the map is replaced
    /// by its expression in one pass, so `{x: y, y: x}` swaps the two.
    pub fn substitute_map(&self, var_map: &HashMap<String, Expr>) -> Expr {
        match self {
            Expr::Var(name) => match var_map.get(name) {
                Some(expr) => expr.clone(),
                None => self.clone(),
            },
            _ => self.map_args(|arg| arg.substitute_map(var_map)),
        }
    }

    /// Renames a variable throughout the expression.
    pub fn rename_variable(&self, old_var: &str, new_var: &str) -> Expr {
        self.substitute_variable(old_var, &Expr::var(new_var))
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            _ => self.args().iter().any(|arg| arg.contains_variable(var_name)),
        }
    }

    /// true if the expression has no variables at all
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Var(_) => false,
            Expr::Const(_) => true,
            _ => self.args().iter().all(|arg| arg.is_constant()),
        }
    }

    fn collect_variables(&self, acc: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                acc.insert(name.clone());
            }
            Expr::Const(_) => {}
            _ => {
                for arg in self.args() {
                    arg.collect_variables(acc);
                }
            }
        }
    }

    /// Sorted, deduplicated names of all variables in the expression.
    pub fn free_variables(&self) -> Vec<String> {
        let mut acc = BTreeSet::new();
        self.collect_variables(&mut acc);
        acc.into_iter().collect()
    }

    /// Number of nodes in the tree, used to pick the smaller of equivalent forms
    pub fn size(&self) -> usize {
        1 + self.args().iter().map(|arg| arg.size()).sum::<usize>()
    }
}

//___________________________________MACROS____________________________________

/// Macro to create symbolic variables from a comma-separated list
/// Usage: symbols!(x, y, z) -> creates variables x, y, z
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        (
            $(
                $crate::symbolic::symbolic_engine::Expr::Var(stringify!($var).to_string())
            ),+
        )
    };
}
