#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// let input = "x^2.3* log(x+y+y^2.6)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let parsed_function = parsed_expression.lambdify(&["x", "y"]).unwrap();
/// println!("{}, Rust function: {}  \n", input, parsed_function(&[1.0, 2.0]));
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) keeps the expression tree `Expr` and its arithmetic
/// 2) substitutes variables and expressions into a tree
/// 3) prints expressions back to a human-readable string
///# Example#
/// ```
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// let input = "exp(x)+log(y)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// let df_dx = parsed_expression.diff("x");
/// let df_dy = parsed_expression.diff("y");
/// println!("df_dx = {}, df_dy = {}", df_dx, df_dy);
/// let variables = parsed_expression.free_variables();
/// assert_eq!(variables, vec!["x".to_string(), "y".to_string()]);
/// ```
pub mod symbolic_engine;
/// derivatives, numerical evaluation and lambdify
pub mod symbolic_engine_derivatives;
/// simplification, expansion and coefficient extraction
pub mod symbolic_simplify;
/// # Symbolic integration
/// antiderivatives by a table of rules (power rule, elementary functions of linear arguments,
/// products of polynomials with exp/sin/cos, integration by parts and by substitution)
///# Example#
/// ```
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x*exp(x)").unwrap();
/// let value = f.definite_integrate_numeric("x", 0.0, 1.0).unwrap();
/// assert!((value - 1.0).abs() < 1e-12);
/// ```
pub mod symbolic_integration;
/// matrices of symbolic expressions: Jacobian, determinant, inverse
pub mod symbolic_vectors;
