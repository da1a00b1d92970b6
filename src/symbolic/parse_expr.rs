//! a module turns a String expression into a symbolic expression
//!
//! The grammar, from loosest to tightest binding:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('-' | '+') unary | power
//! power  := atom (('^' | '**') unary)?
//! atom   := number | function '(' expr ')' | constant | variable | '(' expr ')'
//! ```
//! `^` is right associative (`2^3^2 = 2^9`) and binds tighter than unary minus
//! (`-x^2 = -(x^2)`). Recognised functions: exp, ln, log, sin, cos, tan, tg,
//! asin, arcsin, acos, arccos, atan, arctg, sqrt, abs. `pi` and `e` are constants.
//!
//!# Example
//! ```
//! use RustedCalculus::symbolic::symbolic_engine::Expr;
//! let parsed = Expr::parse_expression("x^2 + sin(y)").unwrap();
//! assert_eq!(parsed.to_string(), "x^2 + sin(y)");
//! ```
use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, one_of},
    combinator::{map_res, not, opt, recognize},
    multi::many0,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded},
};
use std::str::FromStr;

type ParseError<'a> = nom::error::Error<&'a str>;

/// strips whitespace around a token
fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = ParseError<'a>>
where
    F: Parser<&'a str, Output = O, Error = ParseError<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parses a number: `2`, `2.5`, `.5`, `1e-3`. A leading sign never reaches here,
/// unary minus is consumed first.
fn parse_number(input: &str) -> IResult<&str, Expr> {
    let mut parser = map_res(recognize_float, |s: &str| s.parse::<f64>().map(Expr::Const));
    parser.parse(input)
}

/// Parses an identifier (word characters without spaces, not starting with a digit)
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    let mut parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    parser.parse(input)
}

fn apply_function(name: &str, arg: Expr) -> Option<Expr> {
    let arg = Box::new(arg);
    let expr = match name {
        "exp" => Expr::Exp(arg),
        "ln" | "log" => Expr::Ln(arg),
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "asin" | "arcsin" => Expr::arcsin(arg),
        "acos" | "arccos" => Expr::arccos(arg),
        "atan" | "arctg" | "arctan" => Expr::arctg(arg),
        "sqrt" => Expr::Pow(arg, Box::new(Expr::Const(0.5))),
        "abs" => Expr::Abs(arg),
        _ => return None,
    };
    Some(expr)
}

/// identifier, optionally followed by a parenthesised argument
fn parse_named(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = parse_identifier(input)?;
    let (rest, arg) = opt(delimited(ws(char('(')), parse_sum, ws(char(')')))).parse(rest)?;
    match arg {
        Some(arg) => match apply_function(name, arg) {
            Some(expr) => Ok((rest, expr)),
            // unknown function name: point the error at the identifier
            None => Err(nom::Err::Failure(ParseError::new(
                input,
                nom::error::ErrorKind::Verify,
            ))),
        },
        None => {
            let expr = match name {
                "pi" => Expr::Const(std::f64::consts::PI),
                "e" => Expr::Const(std::f64::consts::E),
                _ => Expr::Var(name.to_string()),
            };
            Ok((rest, expr))
        }
    }
}

fn parse_atom(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        parse_number,
        parse_named,
        delimited(char('('), parse_sum, char(')')),
    )))
    .parse(input)
}

fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (rest, base) = parse_atom(input)?;
    let (rest, exponent) = opt(preceded(ws(alt((tag("**"), tag("^")))), parse_unary)).parse(rest)?;
    match exponent {
        Some(exponent) => Ok((rest, Expr::Pow(Box::new(base), Box::new(exponent)))),
        None => Ok((rest, base)),
    }
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (rest, sign) = opt(ws(one_of("+-"))).parse(input)?;
    match sign {
        Some('-') => {
            let (rest, operand) = parse_unary(rest)?;
            let negated = match operand {
                Expr::Const(val) => Expr::Const(-val),
                other => Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(other)),
            };
            Ok((rest, negated))
        }
        Some(_) => parse_unary(rest),
        None => parse_power(rest),
    }
}

fn parse_product(input: &str) -> IResult<&str, Expr> {
    let (rest, first) = parse_unary(input)?;
    let operator = ws(preceded(not(tag("**")), one_of("*/")));
    let (rest, tail) = many0(pair(operator, parse_unary)).parse(rest)?;
    let expr = tail.into_iter().fold(first, |acc, (op, rhs)| match op {
        '*' => Expr::Mul(Box::new(acc), Box::new(rhs)),
        _ => Expr::Div(Box::new(acc), Box::new(rhs)),
    });
    Ok((rest, expr))
}

fn parse_sum(input: &str) -> IResult<&str, Expr> {
    let (rest, first) = parse_product(input)?;
    let (rest, tail) = many0(pair(ws(one_of("+-")), parse_product)).parse(rest)?;
    let expr = tail.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => Expr::Add(Box::new(acc), Box::new(rhs)),
        _ => Expr::Sub(Box::new(acc), Box::new(rhs)),
    });
    Ok((rest, expr))
}

impl Expr {
    /// Parses a string into an expression. The whole input must be consumed.
    pub fn parse_expression(input: &str) -> Result<Expr, CalcError> {
        let parse_error = |msg: String| CalcError::Parse {
            input: input.to_string(),
            msg,
        };
        if input.trim().is_empty() {
            return Err(parse_error("empty input".to_string()));
        }
        match parse_sum(input) {
            Ok((rest, expr)) if rest.trim().is_empty() => Ok(expr),
            Ok((rest, _)) => Err(parse_error(format!("unexpected input at '{}'", rest.trim()))),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(parse_error(format!("unexpected input at '{}'", e.input.trim())))
            }
            Err(nom::Err::Incomplete(_)) => Err(parse_error("incomplete input".to_string())),
        }
    }

    /// Parses a comma-separated list of expressions, e.g. the components of a vector field.
    /// Commas inside brackets do not split.
    pub fn parse_vector_expression(input: &str) -> Result<Vec<Expr>, CalcError> {
        let mut parts = Vec::new();
        let mut depth = 0i32;
        let mut start = 0;
        for (i, c) in input.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                ',' if depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        parts.push(&input[start..]);
        parts.into_iter().map(Expr::parse_expression).collect()
    }
}

impl FromStr for Expr {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expr::parse_expression(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eval(input: &str, vars: &[&str], values: &[f64]) -> f64 {
        Expr::parse_expression(input)
            .unwrap()
            .eval_expression(vars, values)
            .unwrap()
    }

    #[test]
    fn test_parse_structure() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        assert_eq!(
            Expr::parse_expression("x + 2*y").unwrap(),
            Expr::Add(
                Box::new(x.clone()),
                Box::new(Expr::Mul(Box::new(Expr::Const(2.0)), Box::new(y.clone())))
            )
        );
        assert_eq!(
            Expr::parse_expression("x^2").unwrap(),
            Expr::Pow(Box::new(x.clone()), Box::new(Expr::Const(2.0)))
        );
        assert_eq!(
            Expr::parse_expression("x**2").unwrap(),
            Expr::parse_expression("x^2").unwrap()
        );
        assert_eq!(Expr::parse_expression(" -3.5 ").unwrap(), Expr::Const(-3.5));
        assert_eq!(Expr::parse_expression("1e-3").unwrap(), Expr::Const(1e-3));
    }

    #[test]
    fn test_parse_decimal_literals() {
        let x = || Box::new(Expr::var("x"));
        assert_eq!(Expr::parse_expression("2.5").unwrap(), Expr::Const(2.5));
        assert_eq!(Expr::parse_expression(".25").unwrap(), Expr::Const(0.25));
        assert_eq!(Expr::parse_expression("7.5").unwrap(), Expr::Const(7.5));
        assert_eq!(
            Expr::parse_expression("x^0.5").unwrap(),
            Expr::Pow(x(), Box::new(Expr::Const(0.5)))
        );
        assert_eq!(
            Expr::parse_expression("x/0.5").unwrap(),
            Expr::Div(x(), Box::new(Expr::Const(0.5)))
        );
        assert_eq!(
            Expr::parse_expression("x + 2.5e2").unwrap(),
            Expr::Add(x(), Box::new(Expr::Const(250.0)))
        );
        assert_eq!(
            Expr::parse_expression("2.5-x").unwrap(),
            Expr::Sub(Box::new(Expr::Const(2.5)), x())
        );
        assert_relative_eq!(eval("x^0.5", &["x"], &[9.0]), 3.0);
        assert_relative_eq!(eval("x/0.5", &["x"], &[3.0]), 6.0);
    }

    #[test]
    fn test_parse_precedence() {
        assert_relative_eq!(eval("2 + 3*4", &[], &[]), 14.0);
        assert_relative_eq!(eval("2^3^2", &[], &[]), 512.0);
        assert_relative_eq!(eval("-x^2", &["x"], &[3.0]), -9.0);
        assert_relative_eq!(eval("10 - 4 - 3", &[], &[]), 3.0);
        assert_relative_eq!(eval("8/4/2", &[], &[]), 1.0);
        assert_relative_eq!(eval("x^-1", &["x"], &[4.0]), 0.25);
        assert_relative_eq!(eval("(1 + x)*(1 - x)", &["x"], &[2.0]), -3.0);
    }

    #[test]
    fn test_parse_functions_and_constants() {
        assert_relative_eq!(eval("sin(pi/2)", &[], &[]), 1.0);
        assert_relative_eq!(eval("ln(e)", &[], &[]), 1.0);
        assert_relative_eq!(eval("log(exp(2))", &[], &[]), 2.0);
        assert_relative_eq!(eval("sqrt(16)", &[], &[]), 4.0);
        assert_relative_eq!(eval("abs(-2)", &[], &[]), 2.0);
        assert_relative_eq!(eval("atan(1)*4", &[], &[]), std::f64::consts::PI);
        assert_relative_eq!(eval("tan(x)", &["x"], &[0.3]), 0.3f64.tan());
        assert_relative_eq!(eval("exp(x)", &["x"], &[1.0]), std::f64::consts::E);
    }

    #[test]
    fn test_parse_identifiers() {
        let parsed = Expr::parse_expression("theta*r_1 + exp_x").unwrap();
        assert_eq!(
            parsed.free_variables(),
            vec!["exp_x".to_string(), "r_1".to_string(), "theta".to_string()]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Expr::parse_expression("x +"),
            Err(CalcError::Parse { .. })
        ));
        assert!(Expr::parse_expression("(x + 1").is_err());
        assert!(Expr::parse_expression("foo(x)").is_err());
        assert!(Expr::parse_expression("").is_err());
        assert!(Expr::parse_expression("x y").is_err());
    }

    #[test]
    fn test_display_reparses() {
        for input in ["x - (y - x)", "(x + y)^2/(2*x)", "-x^2 + sin(x)^(-1)", "x*(-1)"] {
            let expr = Expr::parse_expression(input).unwrap();
            let reparsed = Expr::parse_expression(&expr.to_string()).unwrap();
            assert_relative_eq!(
                expr.eval_expression(&["x", "y"], &[1.3, 0.7]).unwrap(),
                reparsed.eval_expression(&["x", "y"], &[1.3, 0.7]).unwrap(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_parse_vector_expression() {
        let parts = Expr::parse_vector_expression("x*y, atan(x), -y").unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2], Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(Expr::var("y"))));
    }
}
