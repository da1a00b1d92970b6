//! Differential operators on vector fields given as lists of component expressions.
use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_simplify::build_sum;

fn check_len(what: &str, field: &[Expr], params: &[&str], expected: Option<usize>) -> Result<(), CalcError> {
    if field.len() != params.len() {
        return Err(CalcError::Shape(format!(
            "{}: field has {} components but {} params were given",
            what,
            field.len(),
            params.len()
        )));
    }
    if let Some(n) = expected {
        if field.len() != n {
            return Err(CalcError::Shape(format!("{} needs {} components, got {}", what, n, field.len())));
        }
    }
    Ok(())
}

/// scalar curl of a plane field (P, Q): dQ/dx - dP/dy
pub fn curl_2d(field: &[Expr], params: &[&str]) -> Result<Expr, CalcError> {
    check_len("curl_2d", field, params, Some(2))?;
    Ok((field[1].diff(params[0]) - field[0].diff(params[1])).simplify())
}

/// curl of a field (P, Q, R) in 3-D
pub fn curl(field: &[Expr], params: &[&str]) -> Result<Vec<Expr>, CalcError> {
    check_len("curl", field, params, Some(3))?;
    let d = |i: usize, j: usize| field[i].diff(params[j]);
    Ok(vec![
        (d(2, 1) - d(1, 2)).simplify(),
        (d(0, 2) - d(2, 0)).simplify(),
        (d(1, 0) - d(0, 1)).simplify(),
    ])
}

/// dF_i/dx_i for every component
pub fn divergence_components(field: &[Expr], params: &[&str]) -> Result<Vec<Expr>, CalcError> {
    check_len("divergence", field, params, None)?;
    Ok(field
        .iter()
        .zip(params)
        .map(|(f, p)| f.diff(p).simplify())
        .collect())
}

/// sum of dF_i/dx_i
pub fn divergence(field: &[Expr], params: &[&str]) -> Result<Expr, CalcError> {
    let components = divergence_components(field, params)?;
    Ok(build_sum(components).simplify())
}

/// unit normal (v2, -v1)/|v| of a plane vector
pub fn unit_normal_2d(v: &[Expr]) -> Result<Vec<Expr>, CalcError> {
    if v.len() != 2 {
        return Err(CalcError::Shape(format!("unit_normal_2d needs 2 components, got {}", v.len())));
    }
    let norm = (v[0].clone().powf(2.0) + v[1].clone().powf(2.0)).sqrt();
    Ok(vec![
        (v[1].clone() / norm.clone()).simplify(),
        (-v[0].clone() / norm).simplify(),
    ])
}
