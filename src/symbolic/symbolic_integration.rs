//! # Symbolic Integration Module
//!
//! Indefinite and definite integration of symbolic expressions.
//!
//! The integrand is simplified and expanded, then integrated term by term. In every term
//! the factors free of the integration variable are pulled out and the remaining product is
//! matched against a rule table:
//!
//! - `(a*x + b)^n`, `1/(a*x + b)`, `c^(a*x + b)`, `x^k` with symbolic `k`
//! - `exp`, `sin`, `cos`, `tg`, `ln`, `arcsin`, `arccos`, `arctg`, `abs` of a linear argument
//! - `1/(a*x^2 + c)`, `1/sqrt(a*x^2 + c)` and `sqrt(a*x^2 + c)` for either sign of `a`
//! - `x^m * (a*x + b)^n`, which covers a polynomial over a linear denominator
//! - `x^m * sin(u)^p * cos(u)^q` (product-to-sum, then integration by parts)
//! - `sin(u)*cos(v)`, `sin(u)*sin(v)`, `cos(u)*cos(v)` with different arguments
//! - `x^m * exp(a*x + b)`, `x^n * ln(x)` (integration by parts)
//! - substitution `λ * F(g(x)) * g'(x)`, which includes `g'/g`
//!
//! The constant of integration is omitted.

use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_simplify::{
    FactorKey, MAX_EXPAND_POWER, Monomial, build_product, build_sum, flatten_add,
};
use log::debug;
use std::collections::BTreeMap;

fn is_integer(val: f64) -> bool {
    val.is_finite() && val.fract() == 0.0
}

/// `Some(a)` if `u = a*var + b` with `a` free of `var` and non-zero
fn linear_coefficient(u: &Expr, var: &str) -> Option<Expr> {
    let slope = u.diff(var).simplify();
    if slope.is_zero() || slope.contains_variable(var) {
        None
    } else {
        Some(slope)
    }
}

/// `Some((a, c))` if `q = a*var^2 + c` with numeric `a`, `c`
fn quadratic_coefficients(q: &Expr, var: &str) -> Option<(f64, f64)> {
    let mut terms = Vec::new();
    flatten_add(&q.expand(), &mut terms);
    let var_key = FactorKey::of_var(var);
    let (mut a, mut c) = (0.0, 0.0);
    for term in terms {
        let monomial = Monomial::from_expr(&term);
        match monomial.factors.len() {
            0 => c += monomial.coeff,
            1 if monomial.exponent(&var_key) == 2.0 => a += monomial.coeff,
            _ => return None,
        }
    }
    (a != 0.0 && c != 0.0).then_some((a, c))
}

fn ln_abs(expr: Expr) -> Expr {
    Expr::Ln(Box::new(Expr::Abs(Box::new(expr))))
}

fn div(num: Expr, den: Expr) -> Expr {
    Expr::Div(Box::new(num), Box::new(den))
}

fn mul(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Mul(Box::new(lhs), Box::new(rhs))
}

/// Antiderivative of a single factor `base^n`.
fn integrate_single_factor(base: &Expr, n: f64, var: &str) -> Option<Expr> {
    if let Some(a) = linear_coefficient(base, var) {
        // (a*x + b)^n
        return Some(if n == -1.0 {
            div(ln_abs(base.clone()), a)
        } else {
            div(
                base.clone().powf(n + 1.0),
                mul(Expr::Const(n + 1.0), a),
            )
        });
    }
    if n == -1.0 || n == -0.5 || n == 0.5 {
        let (a, c) = quadratic_coefficients(base, var)?;
        return integrate_quadratic_power(base, n, a, c, var);
    }
    if n != 1.0 {
        return None;
    }
    if let Expr::Pow(b, e) = base {
        // c^(a x + d)
        if !b.contains_variable(var) {
            let a = linear_coefficient(e, var)?;
            return Some(div(base.clone(), mul(a, Expr::Ln(b.clone()))));
        }
        // (a x + d)^k with k free of var
        if !e.contains_variable(var) {
            let a = linear_coefficient(b, var)?;
            let k1 = Expr::Add(e.clone(), Box::new(Expr::Const(1.0)));
            return Some(div(
                Expr::Pow(b.clone(), Box::new(k1.clone())),
                mul(k1, a),
            ));
        }
        return None;
    }
    let u = base.args().first().map(|arg| (*arg).clone())?;
    let a = linear_coefficient(&u, var)?;
    let boxed = || Box::new(u.clone());
    let one_minus_u2 = || Expr::Sub(Box::new(Expr::Const(1.0)), Box::new(u.clone().powf(2.0)));
    let antiderivative = match base {
        Expr::Exp(_) => base.clone(),
        Expr::sin(_) => -Expr::cos(boxed()),
        Expr::cos(_) => Expr::sin(boxed()),
        Expr::tg(_) => -ln_abs(Expr::cos(boxed())),
        Expr::Ln(_) => u.clone() * Expr::Ln(boxed()) - u.clone(),
        Expr::arcsin(_) => u.clone() * Expr::arcsin(boxed()) + one_minus_u2().sqrt(),
        Expr::arccos(_) => u.clone() * Expr::arccos(boxed()) - one_minus_u2().sqrt(),
        Expr::arctg(_) => {
            u.clone() * Expr::arctg(boxed())
                - Expr::Ln(Box::new(Expr::Const(1.0) + u.clone().powf(2.0))) / 2.0
        }
        Expr::Abs(_) => u.clone() * Expr::Abs(boxed()) / 2.0,
        _ => return None,
    };
    Some(div(antiderivative, a))
}

/// `q^n` for `q = a*x^2 + c` and `n` one of -1, -1/2, 1/2
fn integrate_quadratic_power(q: &Expr, n: f64, a: f64, c: f64, var: &str) -> Option<Expr> {
    let x = Expr::var(var);
    let sqrt_q = || q.clone().powf(0.5);
    // ln|√a x + sqrt(q)|, valid for a > 0 and either sign of c
    let log_branch = || ln_abs(mul(Expr::Const(a.sqrt()), x.clone()) + sqrt_q());
    // arcsin(x √(|a|/c)), for a < 0 < c
    let arcsin_branch = || Expr::arcsin(Box::new(mul(Expr::Const((-a / c).sqrt()), x.clone())));
    match n {
        // 1/(a x^2 + c) with a, c > 0
        -1.0 if a > 0.0 && c > 0.0 => {
            let arg = mul(Expr::Const((a / c).sqrt()), x.clone());
            Some(div(Expr::arctg(Box::new(arg)), Expr::Const((a * c).sqrt())))
        }
        -0.5 if a < 0.0 && c > 0.0 => Some(div(arcsin_branch(), Expr::Const((-a).sqrt()))),
        -0.5 if a > 0.0 => Some(div(log_branch(), Expr::Const(a.sqrt()))),
        // x/2 sqrt(q) + c/(2√|a|) * (arcsin or ln branch)
        0.5 if a < 0.0 && c > 0.0 => Some(
            div(mul(x.clone(), sqrt_q()), Expr::Const(2.0))
                + mul(Expr::Const(c / (2.0 * (-a).sqrt())), arcsin_branch()),
        ),
        0.5 if a > 0.0 => Some(
            div(mul(x.clone(), sqrt_q()), Expr::Const(2.0))
                + mul(Expr::Const(c / (2.0 * a.sqrt())), log_branch()),
        ),
        _ => None,
    }
}

/// ∫ x^m (a x + b)^n dx with `x = (u - b)/a`:
/// `Σ_k C(m, k) (-b)^(m-k) / a^(m+1) ∫ u^(k+n) du`
fn integrate_power_times_linear(m: u32, u: &Expr, n: f64, var: &str) -> Option<Expr> {
    let a = linear_coefficient(u, var)?;
    let b = u.substitute_variable(var, &Expr::Const(0.0)).simplify();
    let mut binomial = 1.0;
    let mut terms = Vec::new();
    for k in 0..=m {
        if k > 0 {
            binomial = binomial * (m - k + 1) as f64 / k as f64;
        }
        let shift = match m - k {
            0 => Expr::Const(1.0),
            _ if b.is_zero() => continue,
            p => (-b.clone()).powf(p as f64),
        };
        let coeff = div(mul(Expr::Const(binomial), shift), a.clone().powf((m + 1) as f64));
        let e = k as f64 + n + 1.0;
        let part = if e == 0.0 {
            ln_abs(u.clone())
        } else {
            div(u.clone().powf(e), Expr::Const(e))
        };
        terms.push(mul(coeff, part));
    }
    Some(build_sum(terms))
}

/// `x^m * u^n`, `m` a positive integer and `u` linear in `x`
fn integrate_polynomial_over_linear(factors: &[(Expr, f64)], var: &str) -> Option<Expr> {
    let [first, second] = factors else {
        return None;
    };
    let (m, (u, n)) = match (first, second) {
        ((Expr::Var(name), m), other) | (other, (Expr::Var(name), m)) if name == var => (*m, other),
        _ => return None,
    };
    if !is_integer(m) || m <= 0.0 {
        return None;
    }
    integrate_power_times_linear(m as u32, u, *n, var)
}

/// Two first-power trig factors with different arguments, rewritten with
/// `sin A cos B = (sin(A+B) + sin(A-B))/2`, `sin A sin B = (cos(A-B) - cos(A+B))/2` and
/// `cos A cos B = (cos(A-B) + cos(A+B))/2`. The other factors multiply every piece.
fn integrate_trig_pair(factors: &[(Expr, f64)], var: &str) -> Option<Expr> {
    let trig: Vec<usize> = factors
        .iter()
        .enumerate()
        .filter(|(_, (base, exp))| *exp == 1.0 && matches!(base, Expr::sin(_) | Expr::cos(_)))
        .map(|(i, _)| i)
        .collect();
    let &[i, j] = trig.as_slice() else {
        return None;
    };
    let (first, second) = (&factors[i].0, &factors[j].0);
    // order the pair so a lone sin comes first
    let (lhs, rhs) = match (first, second) {
        (Expr::cos(_), Expr::sin(_)) => (second, first),
        _ => (first, second),
    };
    let (u, v) = match (lhs, rhs) {
        (Expr::sin(u) | Expr::cos(u), Expr::sin(v) | Expr::cos(v)) => (u.as_ref(), v.as_ref()),
        _ => return None,
    };
    if u == v {
        return None;
    }
    linear_coefficient(u, var)?;
    linear_coefficient(v, var)?;
    let sum = Box::new(u.clone() + v.clone());
    let difference = Box::new(u.clone() - v.clone());
    let pieces = match (lhs, rhs) {
        (Expr::sin(_), Expr::cos(_)) => vec![(0.5, Expr::sin(sum)), (0.5, Expr::sin(difference))],
        (Expr::sin(_), Expr::sin(_)) => vec![(0.5, Expr::cos(difference)), (-0.5, Expr::cos(sum))],
        _ => vec![(0.5, Expr::cos(difference)), (0.5, Expr::cos(sum))],
    };
    let rest: Vec<Expr> = factors
        .iter()
        .enumerate()
        .filter(|(k, _)| *k != i && *k != j)
        .map(|(_, (b, e))| b.clone().powf(*e))
        .collect();
    let rest = build_product(rest).unwrap_or(Expr::Const(1.0));
    let mut parts = Vec::with_capacity(pieces.len());
    for (coeff, trig) in pieces {
        let piece = mul(mul(Expr::Const(coeff), rest.clone()), trig).simplify();
        parts.push(integrate_term(&piece, var).ok()?);
    }
    Some(build_sum(parts))
}

/// Coefficients of `Σ c_k cos(k u) + s_k sin(k u)`, keyed by `k`.
type Fourier = BTreeMap<u32, (f64, f64)>;

fn fourier_add(out: &mut Fourier, k: i64, c: f64, s: f64) {
    // cos(-ku) = cos(ku), sin(-ku) = -sin(ku), sin(0) = 0
    let (k, s) = if k < 0 { (-k, -s) } else { (k, s) };
    let entry = out.entry(k as u32).or_insert((0.0, 0.0));
    entry.0 += c;
    if k != 0 {
        entry.1 += s;
    }
}

/// Multiplies the series by `sin(u)` or `cos(u)` with the product-to-sum formulas.
fn fourier_mul(series: &Fourier, by_sin: bool) -> Fourier {
    let mut out = Fourier::new();
    for (&k, &(c, s)) in series {
        let k = k as i64;
        if by_sin {
            fourier_add(&mut out, k + 1, 0.0, c / 2.0);
            fourier_add(&mut out, k - 1, 0.0, -c / 2.0);
            fourier_add(&mut out, k - 1, s / 2.0, 0.0);
            fourier_add(&mut out, k + 1, -s / 2.0, 0.0);
        } else {
            fourier_add(&mut out, k - 1, c / 2.0, 0.0);
            fourier_add(&mut out, k + 1, c / 2.0, 0.0);
            fourier_add(&mut out, k + 1, 0.0, s / 2.0);
            fourier_add(&mut out, k - 1, 0.0, s / 2.0);
        }
    }
    out
}

/// `sin(u)^p * cos(u)^q` as a Fourier series in `u`.
fn linearize_trig(p: u32, q: u32) -> Fourier {
    let mut series = Fourier::new();
    series.insert(0, (1.0, 0.0));
    for _ in 0..p {
        series = fourier_mul(&series, true);
    }
    for _ in 0..q {
        series = fourier_mul(&series, false);
    }
    series
}

/// ∫ x^m sin(w) dx (or cos) for `w` linear with slope `b`, by repeated integration by parts.
fn integrate_power_times_trig(m: u32, is_sin: bool, w: &Expr, b: &Expr, var: &str) -> Expr {
    let x_m = Expr::var(var).powf(m as f64);
    let (first, next_is_sin, sign) = if is_sin {
        (-Expr::cos(Box::new(w.clone())), false, 1.0)
    } else {
        (Expr::sin(Box::new(w.clone())), true, -1.0)
    };
    let leading = div(mul(x_m, first), b.clone());
    if m == 0 {
        return leading;
    }
    let rest = integrate_power_times_trig(m - 1, next_is_sin, w, b, var);
    leading + mul(div(Expr::Const(sign * m as f64), b.clone()), rest)
}

/// ∫ x^m exp(u) dx = exp(u) Σ_j (-1)^j m!/(m-j)! x^(m-j) / a^(j+1)
fn integrate_power_times_exp(m: u32, u: &Expr, a: &Expr, var: &str) -> Expr {
    let mut falling = 1.0;
    let mut terms = Vec::new();
    for j in 0..=m {
        if j > 0 {
            falling *= (m - j + 1) as f64;
        }
        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
        terms.push(div(
            mul(Expr::Const(sign * falling), Expr::var(var).powf((m - j) as f64)),
            a.clone().powf((j + 1) as f64),
        ));
    }
    mul(Expr::Exp(Box::new(u.clone())), build_sum(terms))
}

/// ∫ x^n ln(x) dx
fn integrate_power_times_ln(n: f64, var: &str) -> Expr {
    let x = Expr::var(var);
    let ln_x = Expr::Ln(Box::new(x.clone()));
    if n == -1.0 {
        return ln_x.powf(2.0) / 2.0;
    }
    let n1 = n + 1.0;
    x.powf(n1) * (ln_x / n1 - Expr::Const(1.0 / (n1 * n1)))
}

/// Factors `x^m` and `sin(u)^p cos(u)^q` only, `u` linear, integer exponents.
fn integrate_trig_group(factors: &[(Expr, f64)], var: &str) -> Option<Expr> {
    let mut m = 0u32;
    let mut arg: Option<Expr> = None;
    let (mut p, mut q) = (0u32, 0u32);
    for (base, exp) in factors {
        if !is_integer(*exp) || *exp < 0.0 {
            return None;
        }
        match base {
            Expr::Var(name) if name == var => m += *exp as u32,
            Expr::sin(u) | Expr::cos(u) => {
                match &arg {
                    Some(existing) if existing != u.as_ref() => return None,
                    _ => arg = Some(u.as_ref().clone()),
                }
                if matches!(base, Expr::sin(_)) {
                    p += *exp as u32;
                } else {
                    q += *exp as u32;
                }
            }
            _ => return None,
        }
    }
    let u = arg?;
    let a = linear_coefficient(&u, var)?;
    let mut parts = Vec::new();
    for (k, (c, s)) in linearize_trig(p, q) {
        if k == 0 {
            if c != 0.0 {
                let x_m1 = Expr::var(var).powf((m + 1) as f64);
                parts.push(mul(Expr::Const(c / (m + 1) as f64), x_m1));
            }
            continue;
        }
        let w = mul(Expr::Const(k as f64), u.clone()).simplify();
        let b = mul(Expr::Const(k as f64), a.clone()).simplify();
        if c != 0.0 {
            parts.push(mul(Expr::Const(c), integrate_power_times_trig(m, false, &w, &b, var)));
        }
        if s != 0.0 {
            parts.push(mul(Expr::Const(s), integrate_power_times_trig(m, true, &w, &b, var)));
        }
    }
    Some(build_sum(parts))
}

/// `x^m * exp(u)` with `u` linear, or `x^n * ln(x)`
fn integrate_by_parts(factors: &[(Expr, f64)], var: &str) -> Option<Expr> {
    if factors.len() != 2 {
        return None;
    }
    let (power, other) = match (&factors[0], &factors[1]) {
        ((Expr::Var(name), n), other) if name == var => (*n, other),
        (other, (Expr::Var(name), n)) if name == var => (*n, other),
        _ => return None,
    };
    match other {
        (Expr::Exp(u), e) if *e == 1.0 && is_integer(power) && power > 0.0 => {
            let a = linear_coefficient(u, var)?;
            Some(integrate_power_times_exp(power as u32, u, &a, var))
        }
        (Expr::Ln(inner), e) if *e == 1.0 && inner.as_ref() == &Expr::var(var) => {
            Some(integrate_power_times_ln(power, var))
        }
        _ => None,
    }
}

fn substitution_variable(var: &str) -> String {
    format!("{}__sub", var)
}

/// `∫ λ F(g) g' dx = λ ∫ F(t) dt` at `t = g`, with `λ` free of `x`.
fn integrate_by_substitution(factors: &[(Expr, f64)], var: &str) -> Option<Expr> {
    let t_name = substitution_variable(var);
    let t = Expr::var(&t_name);
    for (i, (base, exp)) in factors.iter().enumerate() {
        let rest = build_product(
            factors
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (b, e))| b.clone().powf(*e))
                .collect(),
        )
        .unwrap_or(Expr::Const(1.0));
        // either the whole factor is g^n, or for n = 1 the factor is F(g)
        let mut candidates = vec![(base.clone(), t.clone().powf(*exp))];
        if *exp == 1.0 {
            if let (Some(outer), [inner]) = (rebuild_unary(base, t.clone()), base.args().as_slice()) {
                candidates.push(((*inner).clone(), outer));
            }
        }
        for (g, outer) in candidates {
            if linear_coefficient(&g, var).is_some() && factors.len() == 1 {
                continue;
            }
            let g_prime = g.diff(var).simplify();
            if g_prime.is_zero() {
                continue;
            }
            let lambda = div(rest.clone(), g_prime).simplify();
            if lambda.contains_variable(var) {
                continue;
            }
            let monomial = Monomial::from_expr(&outer.simplify());
            let (base_t, exp_t) = match monomial.factors.values().next() {
                Some((b, e)) if monomial.factors.len() == 1 => (b.clone(), *e),
                _ => continue,
            };
            if let Some(antiderivative) = integrate_single_factor(&base_t, exp_t, &t_name) {
                let coeff = Expr::Const(monomial.coeff);
                let back = antiderivative.substitute_variable(&t_name, &g);
                return Some(mul(mul(lambda, coeff), back));
            }
        }
    }
    None
}

fn rebuild_unary(node: &Expr, arg: Expr) -> Option<Expr> {
    let arg = Box::new(arg);
    Some(match node {
        Expr::Exp(_) => Expr::Exp(arg),
        Expr::Ln(_) => Expr::Ln(arg),
        Expr::sin(_) => Expr::sin(arg),
        Expr::cos(_) => Expr::cos(arg),
        Expr::tg(_) => Expr::tg(arg),
        Expr::arcsin(_) => Expr::arcsin(arg),
        Expr::arccos(_) => Expr::arccos(arg),
        Expr::arctg(_) => Expr::arctg(arg),
        Expr::Abs(_) => Expr::Abs(arg),
        _ => return None,
    })
}

/// Antiderivative of the product of factors that all depend on `var`.
fn integrate_dependent(factors: &[(Expr, f64)], var: &str) -> Option<Expr> {
    if factors.is_empty() {
        return Some(Expr::var(var));
    }
    if let Some(result) = integrate_trig_group(factors, var) {
        return Some(result);
    }
    if let [(base, exp)] = factors {
        if let Some(result) = integrate_single_factor(base, *exp, var) {
            return Some(result);
        }
    }
    integrate_polynomial_over_linear(factors, var)
        .or_else(|| integrate_trig_pair(factors, var))
        .or_else(|| integrate_by_parts(factors, var))
        .or_else(|| integrate_by_substitution(factors, var))
}

/// One term of an expanded sum: constant part times the rule table result.
fn integrate_term(term: &Expr, var: &str) -> Result<Expr, String> {
    let monomial = Monomial::from_expr(term);
    let mut constant = Monomial::constant(monomial.coeff);
    let mut dependent = Vec::new();
    for (key, (base, exp)) in &monomial.factors {
        if base.contains_variable(var) {
            dependent.push((base.clone(), *exp));
        } else {
            constant.factors.insert(key.clone(), (base.clone(), *exp));
        }
    }
    match integrate_dependent(&dependent, var) {
        Some(antiderivative) => Ok(mul(constant.to_expr(), antiderivative)),
        None => Err(format!("no rule for {}", term)),
    }
}

impl Expr {
    /// SYMBOLIC INTEGRATION

    /// Indefinite integral with respect to `var`, without the constant of integration.
    /// The result is simplified.
    ///
    /// # Errors
    /// `CalcError::Integration` naming the first term no rule applies to.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("3*x^2 + cos(x)")?;
    /// let antiderivative = f.integrate("x")?; // x^3 + sin(x)
    /// ```
    pub fn integrate(&self, var: &str) -> Result<Expr, CalcError> {
        self.integrate_with_limit(var, MAX_EXPAND_POWER)
    }

    /// `integrate`, expanding integer powers of sums only up to `max_power`
    pub fn integrate_with_limit(&self, var: &str, max_power: u32) -> Result<Expr, CalcError> {
        let prepared = self.simplify();
        if !prepared.contains_variable(var) {
            return Ok(mul(prepared, Expr::var(var)).simplify());
        }
        let expanded = prepared.expand_with_limit(max_power);
        let mut terms = Vec::new();
        flatten_add(&expanded, &mut terms);
        let mut parts = Vec::with_capacity(terms.len());
        for term in &terms {
            let part = integrate_term(term, var).map_err(|msg| {
                debug!("integration of {} failed: {}", self, msg);
                CalcError::Integration {
                    integrand: term.to_string(),
                    var: var.to_string(),
                }
            })?;
            parts.push(part);
        }
        let result = build_sum(parts).simplify();
        debug!("∫ {} d{} = {}", self, var, result);
        Ok(result)
    }

    /// `F(upper) - F(lower)`, simplified. Bounds may depend on other variables, which
    /// gives iterated integrals over non-rectangular regions.
    pub fn definite_integrate(&self, var: &str, lower: &Expr, upper: &Expr) -> Result<Expr, CalcError> {
        self.definite_integrate_with_limit(var, lower, upper, MAX_EXPAND_POWER)
    }

    pub fn definite_integrate_with_limit(
        &self,
        var: &str,
        lower: &Expr,
        upper: &Expr,
        max_power: u32,
    ) -> Result<Expr, CalcError> {
        let antiderivative = self.integrate_with_limit(var, max_power)?;
        let at_upper = antiderivative.substitute_variable(var, upper);
        let at_lower = antiderivative.substitute_variable(var, lower);
        Ok(Expr::Sub(Box::new(at_upper), Box::new(at_lower)).simplify())
    }

    /// Definite integral between numeric bounds as a number.
    ///
    /// # Errors
    /// `UnresolvedSymbols` when the integrand depends on variables other than `var`.
    pub fn definite_integrate_numeric(&self, var: &str, lower: f64, upper: f64) -> Result<f64, CalcError> {
        self.definite_integrate(var, &Expr::Const(lower), &Expr::Const(upper))?
            .to_f64()
    }
}
