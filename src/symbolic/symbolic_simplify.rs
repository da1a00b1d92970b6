//! # Symbolic Expression Simplification Module
//!
//! Algebraic simplification of symbolic expressions, applied bottom-up:
//!
//! 1. **Constant Folding**: arithmetic on constants and every elementary function of a constant
//! 2. **Algebraic Identities**: x + 0 = x, x * 1 = x, x^0 = 1, (x^a)^b, exp(ln(x)) = x, |x^2| = x^2
//! 3. **Product Normal Form**: coefficients of a product are multiplied out and powers of equal
//!    factors are merged (`x*x^2/x = x^2`)
//! 4. **Like Term Collection**: terms of a sum with the same factors are combined (`3x + 2x = 5x`),
//!    constant multiples of sums are distributed and `a*sin(u)^2 + a*cos(u)^2` collapses to `a`
//!
//! `expand()` additionally distributes products over sums and integer powers of sums.

use crate::symbolic::symbolic_engine::Expr;
use std::collections::BTreeMap;

/// Largest integer power of a sum that `expand()` multiplies out.
pub const MAX_EXPAND_POWER: u32 = 8;

// relative size under which a collected coefficient is treated as cancelled
const CANCELLATION_TOL: f64 = 1e-12;

fn is_integer(val: f64) -> bool {
    val.is_finite() && val.fract() == 0.0
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= CANCELLATION_TOL * a.abs().max(b.abs()).max(1.0)
}

/// Ordering key of a factor inside a product: plain variables first, then powers with
/// symbolic exponents, elementary functions and finally whole sums. Within a rank the
/// printed form of the factor decides, so `y*x` and `x*y` share one key set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactorKey(pub u8, pub String);

impl FactorKey {
    pub(crate) fn of_var(var: &str) -> FactorKey {
        FactorKey(0, var.to_string())
    }

    pub(crate) fn of(base: &Expr) -> FactorKey {
        let rank = match base {
            Expr::Var(_) => 0,
            Expr::Const(_) | Expr::Pow(_, _) => 1,
            Expr::Add(_, _) | Expr::Sub(_, _) => 3,
            _ => 2,
        };
        FactorKey(rank, base.to_string())
    }
}

/// Product normal form `coeff * Π base_i^exp_i`.
///
/// - `3*x^2*y` → `coeff 3, {x: 2, y: 1}`
/// - `sin(t)^2*r/2` → `coeff 0.5, {r: 1, sin(t): 2}`
/// - `5` → `coeff 5, {}`
#[derive(Clone, Debug, PartialEq)]
pub struct Monomial {
    pub coeff: f64,
    pub factors: BTreeMap<FactorKey, (Expr, f64)>,
}

impl Monomial {
    pub fn constant(coeff: f64) -> Monomial {
        Monomial {
            coeff,
            factors: BTreeMap::new(),
        }
    }

    /// Decomposes a product/quotient/power tree. Sums stay whole as single factors.
    pub fn from_expr(expr: &Expr) -> Monomial {
        let mut monomial = Monomial::constant(1.0);
        monomial.absorb(expr, 1.0);
        monomial
    }

    fn absorb(&mut self, expr: &Expr, power: f64) {
        match expr {
            Expr::Const(c) => self.coeff *= c.powf(power),
            Expr::Mul(lhs, rhs) => {
                self.absorb(lhs, power);
                self.absorb(rhs, power);
            }
            Expr::Div(lhs, rhs) => {
                self.absorb(lhs, power);
                self.absorb(rhs, -power);
            }
            Expr::Pow(base, exp) => match (base.as_ref(), exp.as_ref()) {
                (Expr::Mul(_, _) | Expr::Div(_, _), Expr::Const(n)) if is_integer(*n) => {
                    self.absorb(base, power * n)
                }
                (Expr::Const(_), _) | (_, Expr::Var(_)) => self.push_factor(expr, power),
                (_, Expr::Const(n)) => self.push_factor(base, power * n),
                _ => self.push_factor(expr, power),
            },
            _ => self.push_factor(expr, power),
        }
    }

    fn push_factor(&mut self, base: &Expr, power: f64) {
        let key = FactorKey::of(base);
        let entry = self.factors.entry(key).or_insert_with(|| (base.clone(), 0.0));
        entry.1 += power;
    }

    fn drop_unit_factors(&mut self) {
        self.factors.retain(|_, (_, exp)| *exp != 0.0);
    }

    /// exponent of the factor with the given key, 0 if absent
    pub fn exponent(&self, key: &FactorKey) -> f64 {
        self.factors.get(key).map(|(_, exp)| *exp).unwrap_or(0.0)
    }

    fn same_factors(&self, other: &Monomial) -> bool {
        self.factors.len() == other.factors.len()
            && self
                .factors
                .iter()
                .zip(other.factors.iter())
                .all(|((k1, (_, e1)), (k2, (_, e2)))| k1 == k2 && e1 == e2)
    }

    /// Rebuilds `coeff * numerator / denominator`.
    pub fn to_expr(&self) -> Expr {
        if self.coeff == 0.0 {
            return Expr::Const(0.0);
        }
        let power_of = |base: &Expr, exp: f64| {
            if exp == 1.0 {
                base.clone()
            } else {
                Expr::Pow(Box::new(base.clone()), Box::new(Expr::Const(exp)))
            }
        };
        let numerator: Vec<Expr> = self
            .factors
            .values()
            .filter(|(_, exp)| *exp > 0.0)
            .map(|(base, exp)| power_of(base, *exp))
            .collect();
        let denominator: Vec<Expr> = self
            .factors
            .values()
            .filter(|(_, exp)| *exp < 0.0)
            .map(|(base, exp)| power_of(base, -exp))
            .collect();

        let mut body = match build_product(numerator) {
            Some(num) if self.coeff == 1.0 => num,
            Some(num) => Expr::Mul(Box::new(Expr::Const(self.coeff)), Box::new(num)),
            None => Expr::Const(self.coeff),
        };
        if let Some(den) = build_product(denominator) {
            body = Expr::Div(Box::new(body), Box::new(den));
        }
        body
    }
}

/// `a*b*c` from a list of factors, `None` for an empty list
pub fn build_product(factors: Vec<Expr>) -> Option<Expr> {
    factors
        .into_iter()
        .reduce(|acc, f| Expr::Mul(Box::new(acc), Box::new(f)))
}

/// `a + b - c` from a list of terms; terms with a negative leading coefficient are subtracted.
pub fn build_sum(terms: Vec<Expr>) -> Expr {
    let mut iter = terms.into_iter();
    let Some(first) = iter.next() else {
        return Expr::Const(0.0);
    };
    iter.fold(first, |acc, term| match negated_term(&term) {
        Some(positive) => Expr::Sub(Box::new(acc), Box::new(positive)),
        None => Expr::Add(Box::new(acc), Box::new(term)),
    })
}

// -c*rest → c*rest for display as a subtraction
fn negated_term(term: &Expr) -> Option<Expr> {
    match term {
        Expr::Const(c) if *c < 0.0 => Some(Expr::Const(-c)),
        Expr::Mul(lhs, rhs) => match lhs.as_ref() {
            Expr::Const(c) if *c == -1.0 => Some(rhs.as_ref().clone()),
            Expr::Const(c) if *c < 0.0 => {
                Some(Expr::Mul(Box::new(Expr::Const(-c)), rhs.clone()))
            }
            _ => None,
        },
        Expr::Div(num, den) => {
            negated_term(num).map(|positive| Expr::Div(Box::new(positive), den.clone()))
        }
        _ => None,
    }
}

/// Flatten nested Add/Sub expressions into a list of terms. Subtraction becomes addition
/// of the term multiplied by -1.
///
/// - `a - b` → `[a, -1*b]`
/// - `(a + b) - (c + d)` → `[a, b, -1*c, -1*d]`
pub fn flatten_add(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Add(a, b) => {
            flatten_add(a, out);
            flatten_add(b, out);
        }
        Expr::Sub(a, b) => {
            flatten_add(a, out);
            let mut negated = Vec::new();
            flatten_add(b, &mut negated);
            out.extend(
                negated
                    .into_iter()
                    .map(|t| Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(t))),
            );
        }
        _ => out.push(expr.clone()),
    }
}

/// Flatten nested multiplication expressions into a list of factors.
///
/// - `(a * b) * c` → `[a, b, c]`
pub fn flatten_mul(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            flatten_mul(a, out);
            flatten_mul(b, out);
        }
        _ => out.push(expr.clone()),
    }
}

/// Monomials of a sum. A constant multiple of a nested sum is distributed over it.
fn sum_monomials(expr: &Expr, out: &mut Vec<Monomial>) {
    let mut terms = Vec::new();
    flatten_add(expr, &mut terms);
    for term in terms {
        let monomial = Monomial::from_expr(&term);
        let nested_sum = if monomial.factors.len() == 1 {
            monomial
                .factors
                .values()
                .next()
                .filter(|(base, exp)| *exp == 1.0 && matches!(base, Expr::Add(_, _) | Expr::Sub(_, _)))
                .map(|(base, _)| base.clone())
        } else {
            None
        };
        match nested_sum {
            Some(sum) => {
                let mut inner = Vec::new();
                sum_monomials(&sum, &mut inner);
                out.extend(inner.into_iter().map(|mut m| {
                    m.coeff *= monomial.coeff;
                    m
                }));
            }
            None => out.push(monomial),
        }
    }
}

/// Groups monomials with equal factors, summing their coefficients.
fn collect_like_terms(monomials: Vec<Monomial>) -> Vec<Monomial> {
    // (monomial, sum of |contributions|) in order of first appearance
    let mut collected: Vec<(Monomial, f64)> = Vec::new();
    for mut monomial in monomials {
        monomial.drop_unit_factors();
        if monomial.coeff == 0.0 {
            continue;
        }
        match collected.iter_mut().find(|(m, _)| m.same_factors(&monomial)) {
            Some((existing, magnitude)) => {
                existing.coeff += monomial.coeff;
                *magnitude += monomial.coeff.abs();
            }
            None => {
                let magnitude = monomial.coeff.abs();
                collected.push((monomial, magnitude));
            }
        }
    }
    collected
        .into_iter()
        .filter(|(m, magnitude)| m.coeff.abs() > CANCELLATION_TOL * magnitude)
        .map(|(m, _)| m)
        .collect()
}

/// `a*R*sin(u)^(p+2)*cos(u)^q + a*R*sin(u)^p*cos(u)^(q+2)` → `a*R*sin(u)^p*cos(u)^q`.
/// Returns true when a pair was merged.
fn merge_pythagorean_pair(terms: &mut Vec<Monomial>) -> bool {
    for i in 0..terms.len() {
        let sine_keys: Vec<(FactorKey, Expr)> = terms[i]
            .factors
            .iter()
            .filter_map(|(key, (base, _))| match base {
                Expr::sin(arg) => Some((key.clone(), arg.as_ref().clone())),
                _ => None,
            })
            .collect();
        for (sin_key, arg) in sine_keys {
            let cos_base = Expr::cos(Box::new(arg));
            let cos_key = FactorKey::of(&cos_base);
            let s_i = terms[i].exponent(&sin_key);
            let c_i = terms[i].exponent(&cos_key);
            for j in 0..terms.len() {
                if i == j || !close(terms[i].coeff, terms[j].coeff) {
                    continue;
                }
                let s_j = terms[j].exponent(&sin_key);
                let c_j = terms[j].exponent(&cos_key);
                if s_i != s_j + 2.0 || c_j != c_i + 2.0 {
                    continue;
                }
                let strip = |m: &Monomial| {
                    let mut rest = m.clone();
                    rest.factors.remove(&sin_key);
                    rest.factors.remove(&cos_key);
                    rest
                };
                let (rest_i, rest_j) = (strip(&terms[i]), strip(&terms[j]));
                if !rest_i.same_factors(&rest_j) {
                    continue;
                }
                let sin_base = terms[i].factors[&sin_key].0.clone();
                let mut merged = rest_i;
                if s_j != 0.0 {
                    merged.factors.insert(sin_key.clone(), (sin_base, s_j));
                }
                if c_i != 0.0 {
                    merged.factors.insert(cos_key.clone(), (cos_base.clone(), c_i));
                }
                let (first, second) = if i < j { (i, j) } else { (j, i) };
                terms.remove(second);
                terms[first] = merged;
                return true;
            }
        }
    }
    false
}

fn fold_unary(expr: &Expr, val: f64) -> Option<f64> {
    let result = match expr {
        Expr::Exp(_) => val.exp(),
        Expr::Ln(_) => val.ln(),
        Expr::sin(_) => val.sin(),
        Expr::cos(_) => val.cos(),
        Expr::tg(_) => val.tan(),
        Expr::arcsin(_) => val.asin(),
        Expr::arccos(_) => val.acos(),
        Expr::arctg(_) => val.atan(),
        Expr::Abs(_) => val.abs(),
        _ => return None,
    };
    result.is_finite().then_some(result)
}

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Simplifies expressions by evaluating constant arithmetic operations.
    ///
    /// - `2 + 3` → `5`
    /// - `sin(0)` → `0`
    /// - `ln(-1)` stays as it is, the value is not a real number
    pub fn simplify_numbers(&self) -> Expr {
        let node = self.map_args(|arg| arg.simplify_numbers());
        let folded = match &node {
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
                match (a.as_ref(), b.as_ref()) {
                    (Expr::Const(x), Expr::Const(y)) => {
                        let val = match &node {
                            Expr::Add(_, _) => x + y,
                            Expr::Sub(_, _) => x - y,
                            Expr::Mul(_, _) => x * y,
                            Expr::Div(_, _) => x / y,
                            _ => x.powf(*y),
                        };
                        val.is_finite().then_some(val)
                    }
                    _ => None,
                }
            }
            _ => match node.args().as_slice() {
                [Expr::Const(val)] => fold_unary(&node, *val),
                _ => None,
            },
        };
        match folded {
            Some(val) => Expr::Const(val),
            None => node,
        }
    }

    /// Applies the single-node rules, assuming every child is already simplified.
    fn simplify_node(self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self,
            Expr::Add(_, _) | Expr::Sub(_, _) => {
                let mut monomials = Vec::new();
                sum_monomials(&self, &mut monomials);
                let mut collected = collect_like_terms(monomials);
                while merge_pythagorean_pair(&mut collected) {
                    collected = collect_like_terms(collected);
                }
                let terms = collected.iter().map(|m| m.to_expr().simplify_node_shallow()).collect();
                build_sum(terms)
            }
            Expr::Mul(_, _) | Expr::Div(_, _) => {
                let mut monomial = Monomial::from_expr(&self);
                if !monomial.coeff.is_finite() {
                    return self.simplify_numbers();
                }
                monomial.drop_unit_factors();
                monomial.to_expr().simplify_node_shallow()
            }
            Expr::Pow(base, exp) => Expr::simplify_power(*base, *exp),
            Expr::Exp(arg) => match *arg {
                Expr::Ln(inner) => *inner,
                Expr::Const(c) => Expr::Const(c.exp()),
                other => Expr::Exp(Box::new(other)),
            },
            Expr::Ln(arg) => match *arg {
                Expr::Exp(inner) => *inner,
                Expr::Const(c) if c > 0.0 => Expr::Const(c.ln()),
                other => Expr::Ln(Box::new(other)),
            },
            Expr::Abs(arg) => Expr::simplify_abs(*arg),
            unary => unary.simplify_numbers(),
        }
    }

    // rebuilt monomials only need their power factors re-checked
    fn simplify_node_shallow(self) -> Expr {
        match self {
            Expr::Pow(base, exp) => Expr::simplify_power(*base, *exp),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                Box::new(lhs.simplify_node_shallow()),
                Box::new(rhs.simplify_node_shallow()),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(lhs.simplify_node_shallow()),
                Box::new(rhs.simplify_node_shallow()),
            ),
            other => other,
        }
    }

    fn simplify_power(base: Expr, exp: Expr) -> Expr {
        match (base, exp) {
            (Expr::Const(b), Expr::Const(e)) if b.powf(e).is_finite() => Expr::Const(b.powf(e)),
            (_, Expr::Const(e)) if e == 0.0 => Expr::Const(1.0),
            (base, Expr::Const(e)) if e == 1.0 => base,
            (Expr::Const(b), _) if b == 1.0 => Expr::Const(1.0),
            (Expr::Pow(inner, inner_exp), Expr::Const(e)) => match *inner_exp {
                Expr::Const(a) if is_integer(e) => Expr::simplify_power(*inner, Expr::Const(a * e)),
                Expr::Const(a) if is_integer(a) && a % 2.0 == 0.0 && a * e == 1.0 => {
                    Expr::Abs(inner)
                }
                inner_exp => Expr::Pow(
                    Box::new(Expr::Pow(inner, Box::new(inner_exp))),
                    Box::new(Expr::Const(e)),
                ),
            },
            (Expr::Abs(inner), Expr::Const(e)) if is_integer(e) && e % 2.0 == 0.0 => {
                Expr::Pow(inner, Box::new(Expr::Const(e)))
            }
            (Expr::Exp(arg), Expr::Const(e)) => {
                Expr::Exp(Box::new(Expr::Mul(Box::new(Expr::Const(e)), arg).simplify_node()))
            }
            (base @ (Expr::Mul(_, _) | Expr::Div(_, _)), Expr::Const(e)) if is_integer(e) => {
                Expr::Pow(Box::new(base), Box::new(Expr::Const(e))).simplify_node_product()
            }
            (base, exp) => Expr::Pow(Box::new(base), Box::new(exp)),
        }
    }

    fn simplify_node_product(self) -> Expr {
        let mut monomial = Monomial::from_expr(&self);
        monomial.drop_unit_factors();
        monomial.to_expr()
    }

    fn simplify_abs(arg: Expr) -> Expr {
        match arg {
            Expr::Const(c) => Expr::Const(c.abs()),
            Expr::Abs(inner) => Expr::Abs(inner),
            Expr::Exp(inner) => Expr::Exp(inner),
            Expr::Pow(base, exp) => match *exp {
                Expr::Const(e) if is_integer(e) && e % 2.0 == 0.0 => Expr::Pow(base, Box::new(Expr::Const(e))),
                exp => Expr::Abs(Box::new(Expr::Pow(base, Box::new(exp)))),
            },
            product @ (Expr::Mul(_, _) | Expr::Div(_, _)) => {
                let mut monomial = Monomial::from_expr(&product);
                if monomial.coeff == 1.0 || !monomial.coeff.is_finite() {
                    return Expr::Abs(Box::new(product));
                }
                let scale = monomial.coeff.abs();
                monomial.coeff = 1.0;
                let rest = monomial.to_expr();
                let abs_rest = Expr::simplify_abs(rest);
                Expr::Mul(Box::new(Expr::Const(scale)), Box::new(abs_rest)).simplify_node_product()
            }
            other => Expr::Abs(Box::new(other)),
        }
    }

    /// Recursive bottom-up simplification: children first, then the node rules.
    pub fn simplify_(&self) -> Expr {
        let node = self.map_args(|arg| arg.simplify_());
        node.simplify_node()
    }

    /// Public interface for expression simplification.
    ///
    /// The result has the same numeric value as `self` wherever `self` is defined.
    pub fn simplify(&self) -> Expr {
        self.simplify_()
    }

    //___________________________________EXPANSION____________________________________

    /// Distributes products over sums and multiplies out integer powers of sums,
    /// then collects like terms.
    /// - `(x + 1)^2` → `x^2 + 2*x + 1`
    /// - `x*(y - x)` → `x*y - x^2`
    pub fn expand(&self) -> Expr {
        self.expand_with_limit(MAX_EXPAND_POWER)
    }

    /// `expand()` with a custom limit on the power of a sum that gets multiplied out.
    pub fn expand_with_limit(&self, max_power: u32) -> Expr {
        let terms = expand_terms(&self.simplify(), max_power);
        build_sum(terms).simplify()
    }

    /// Coefficient of `var^1` in the expanded form of the expression.
    /// Terms in which `var` also appears inside another factor are not counted.
    /// - `(3*x + 2*y + 1).coeff("x")` → `3`
    /// - `(a*x + x*y).coeff("x")` → `a + y`
    pub fn coeff(&self, var: &str) -> Expr {
        let expanded = self.expand();
        let mut terms = Vec::new();
        flatten_add(&expanded, &mut terms);
        let var_key = FactorKey::of_var(var);
        let parts: Vec<Expr> = terms
            .iter()
            .map(Monomial::from_expr)
            .filter(|m| m.exponent(&var_key) == 1.0)
            .filter_map(|mut m| {
                m.factors.remove(&var_key);
                let rest = m.to_expr();
                (!rest.contains_variable(var)).then_some(rest)
            })
            .collect();
        build_sum(parts).simplify()
    }
}

fn expand_terms(expr: &Expr, max_power: u32) -> Vec<Expr> {
    let negate = |t: Expr| Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(t));
    match expr {
        Expr::Add(a, b) => {
            let mut terms = expand_terms(a, max_power);
            terms.extend(expand_terms(b, max_power));
            terms
        }
        Expr::Sub(a, b) => {
            let mut terms = expand_terms(a, max_power);
            terms.extend(expand_terms(b, max_power).into_iter().map(negate));
            terms
        }
        Expr::Mul(a, b) => distribute(&expand_terms(a, max_power), &expand_terms(b, max_power)),
        Expr::Div(a, b) => {
            let denominator = build_sum(expand_terms(b, max_power));
            expand_terms(a, max_power)
                .into_iter()
                .map(|t| Expr::Div(Box::new(t), Box::new(denominator.clone())))
                .collect()
        }
        Expr::Pow(base, exp) => {
            let base_terms = expand_terms(base, max_power);
            match exp.as_ref() {
                Expr::Const(n)
                    if is_integer(*n) && *n >= 2.0 && *n <= max_power as f64 && base_terms.len() > 1 =>
                {
                    let mut acc = base_terms.clone();
                    for _ in 1..(*n as u32) {
                        acc = distribute(&acc, &base_terms);
                    }
                    acc
                }
                _ => vec![Expr::Pow(
                    Box::new(build_sum(base_terms)),
                    Box::new(exp.expand_with_limit(max_power)),
                )],
            }
        }
        Expr::Var(_) | Expr::Const(_) => vec![expr.clone()],
        _ => vec![expr.map_args(|arg| arg.expand_with_limit(max_power))],
    }
}

fn distribute(lhs: &[Expr], rhs: &[Expr]) -> Vec<Expr> {
    let mut out = Vec::with_capacity(lhs.len() * rhs.len());
    for a in lhs {
        for b in rhs {
            out.push(Expr::Mul(Box::new(a.clone()), Box::new(b.clone())).simplify_node_product());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    fn assert_same_value(lhs: &Expr, rhs: &Expr, vars: &[&str]) {
        for sample in [[0.3, 1.7, -0.4], [1.1, -0.6, 2.5], [2.2, 0.9, 0.35]] {
            let values = &sample[..vars.len()];
            assert_relative_eq!(
                lhs.eval_expression(vars, values).unwrap(),
                rhs.eval_expression(vars, values).unwrap(),
                epsilon = 1e-9,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(parse("2 + 3*4").simplify(), Expr::Const(14.0));
        assert_eq!(parse("sin(0) + cos(0)").simplify(), Expr::Const(1.0));
        assert_eq!(parse("abs(-3)*2").simplify(), Expr::Const(6.0));
        assert_relative_eq!(parse("exp(1)").simplify().as_const().unwrap(), std::f64::consts::E);
        // not a real number, left alone
        assert!(parse("ln(-1)").simplify().as_const().is_none());
    }

    #[test]
    fn test_identities() {
        let x = Expr::var("x");
        assert_eq!(parse("x + 0").simplify(), x);
        assert_eq!(parse("1*x").simplify(), x);
        assert_eq!(parse("0*x + 2").simplify(), Expr::Const(2.0));
        assert_eq!(parse("x^1").simplify(), x);
        assert_eq!(parse("x^0").simplify(), Expr::Const(1.0));
        assert_eq!(parse("exp(ln(x))").simplify(), x);
        assert_eq!(parse("ln(exp(x))").simplify(), x);
        assert_eq!(parse("x - x").simplify(), Expr::Const(0.0));
        assert_eq!(parse("x/x").simplify(), Expr::Const(1.0));
        assert_eq!(parse("(x^2)^3").simplify(), x.clone().powf(6.0));
        assert_eq!(parse("(x^2)^0.5").simplify(), Expr::Abs(Box::new(x.clone())));
        assert_eq!(parse("abs(abs(x))").simplify(), Expr::Abs(Box::new(x.clone())));
        assert_eq!(parse("abs(x^2)").simplify(), x.clone().powf(2.0));
    }

    #[test]
    fn test_like_terms() {
        assert_eq!(parse("3*x + 2*x").simplify(), Expr::Const(5.0) * Expr::var("x"));
        assert_eq!(parse("x*x*x").simplify(), Expr::var("x").powf(3.0));
        assert_eq!(parse("y*x - x*y").simplify(), Expr::Const(0.0));
        assert_eq!(parse("2*(x + 1) - 2*x").simplify(), Expr::Const(2.0));
        assert_eq!(parse("x^2*y/x").simplify(), parse("x*y"));
        assert_eq!(parse("x + y - x").simplify(), Expr::var("y"));
    }

    #[test]
    fn test_pythagorean_identity() {
        assert_eq!(parse("sin(t)^2 + cos(t)^2").simplify(), Expr::Const(1.0));
        assert_eq!(parse("r*cos(t)^2 + r*sin(t)^2").simplify(), Expr::var("r"));
        let spherical = parse(
            "rho^2*sin(p)^3*cos(q)^2 + rho^2*sin(p)^3*sin(q)^2 + rho^2*sin(p)*cos(p)^2",
        );
        assert_eq!(spherical.simplify(), parse("rho^2*sin(p)").simplify());
    }

    #[test]
    fn test_simplify_preserves_value() {
        for input in [
            "(x + y)^2/(2*x) - y*x/x",
            "x*exp(x)*exp(x) - 3*x/(y + 1)",
            "-(x - y)*(x + y) + sin(x)^2*y",
            "abs(-2*x*y) + sqrt(x^2)",
        ] {
            let expr = parse(input);
            assert_same_value(&expr, &expr.simplify(), &["x", "y"]);
        }
    }

    #[test]
    fn test_expand() {
        let expanded = parse("(x + 1)^2").expand();
        assert_same_value(&expanded, &parse("x^2 + 2*x + 1"), &["x"]);
        let mut terms = Vec::new();
        flatten_add(&expanded, &mut terms);
        assert_eq!(terms.len(), 3);
        assert_eq!(parse("x*(y - x) + x^2").expand(), parse("x*y"));
        let limited = parse("(x + 1)^3").expand_with_limit(2);
        let mut terms = Vec::new();
        flatten_add(&limited, &mut terms);
        assert_eq!(terms.len(), 1);
    }

    #[test]
    fn test_coeff() {
        assert_eq!(parse("3*x + 2*y + 1").coeff("x"), Expr::Const(3.0));
        assert_eq!(parse("3*x + 2*y + 1").coeff("y"), Expr::Const(2.0));
        assert_eq!(parse("x^2 + 1").coeff("x"), Expr::Const(0.0));
        let c = parse("a*x + x*y + sin(x)").coeff("x");
        assert_same_value(&c, &parse("a + y"), &["a", "y"]);
    }
}
