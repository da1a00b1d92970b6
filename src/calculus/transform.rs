//! Changes of variables. A `Transform` maps every old variable onto an expression in the new
//! parameters, e.g. rectangular to polar:
//! ```
//! use RustedCalculus::calculus::transform::Transform;
//! use RustedCalculus::symbolic::symbolic_engine::Expr;
//! let polar = Transform::polar("r", "t");
//! let (expr, scale) = polar.apply(&Expr::parse_expression("x^2 + y^2").unwrap()).unwrap();
//! assert_eq!(expr, Expr::parse_expression("r^2").unwrap());
//! assert_eq!(scale, Expr::var("r"));
//! ```
use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_vectors::ExprMatrix;
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};
use strum_macros::{Display, EnumIter, EnumString};

/// Coordinate system a function is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CoordinateSystem {
    #[default]
    Rectangular,
    Polar,
    Cylindrical,
    Spherical,
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub params: Vec<String>,
    /// (old variable, expression in the new params)
    pub equations: Vec<(String, Expr)>,
    pub coordinates: CoordinateSystem,
    /// params known to be >= 0 (radii)
    nonnegative: BTreeSet<String>,
    /// params known to lie in [0, pi], so their sine is >= 0
    half_turn_angles: BTreeSet<String>,
}

impl Transform {
    pub fn new(params: &[&str], equations: Vec<(&str, Expr)>) -> Transform {
        Transform {
            params: params.iter().map(|p| p.to_string()).collect(),
            equations: equations
                .into_iter()
                .map(|(old, expr)| (old.to_string(), expr))
                .collect(),
            coordinates: CoordinateSystem::Custom,
            nonnegative: BTreeSet::new(),
            half_turn_angles: BTreeSet::new(),
        }
    }

    /// Equations written as strings, `("x", "r*cos(t)")`
    pub fn parse(params: &[&str], equations: &[(&str, &str)]) -> Result<Transform, CalcError> {
        let parsed = equations
            .iter()
            .map(|(old, rhs)| Ok((*old, Expr::parse_expression(rhs)?)))
            .collect::<Result<Vec<_>, CalcError>>()?;
        Ok(Transform::new(params, parsed))
    }

    /// Declares params that never take negative values; `scale` drops `abs` over them.
    pub fn assume_nonnegative(mut self, params: &[&str]) -> Transform {
        self.nonnegative
            .extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// x = r cos t, y = r sin t, with r >= 0
    pub fn polar(r: &str, t: &str) -> Transform {
        let (rv, tv) = (Expr::var(r), Expr::var(t));
        let mut transform = Transform::new(
            &[r, t],
            vec![
                ("x", rv.clone() * Expr::cos(tv.clone().boxed())),
                ("y", rv * Expr::sin(tv.boxed())),
            ],
        )
        .assume_nonnegative(&[r]);
        transform.coordinates = CoordinateSystem::Polar;
        transform
    }

    /// polar coordinates in the xy-plane plus z = z
    pub fn cylindrical(r: &str, t: &str, z: &str) -> Transform {
        let (rv, tv) = (Expr::var(r), Expr::var(t));
        let mut transform = Transform::new(
            &[r, t, z],
            vec![
                ("x", rv.clone() * Expr::cos(tv.clone().boxed())),
                ("y", rv * Expr::sin(tv.boxed())),
                ("z", Expr::var(z)),
            ],
        )
        .assume_nonnegative(&[r]);
        transform.coordinates = CoordinateSystem::Cylindrical;
        transform
    }

    /// x = rho sin(phi) cos(theta), y = rho sin(phi) sin(theta), z = rho cos(phi);
    /// rho >= 0 and phi in [0, pi]
    pub fn spherical(rho: &str, theta: &str, phi: &str) -> Transform {
        let (rv, tv, pv) = (Expr::var(rho), Expr::var(theta), Expr::var(phi));
        let sin_phi = Expr::sin(pv.clone().boxed());
        let mut transform = Transform::new(
            &[rho, theta, phi],
            vec![
                ("x", rv.clone() * sin_phi.clone() * Expr::cos(tv.clone().boxed())),
                ("y", rv.clone() * sin_phi * Expr::sin(tv.boxed())),
                ("z", rv * Expr::cos(pv.boxed())),
            ],
        )
        .assume_nonnegative(&[rho]);
        transform.half_turn_angles.insert(phi.to_string());
        transform.coordinates = CoordinateSystem::Spherical;
        transform
    }

    pub fn param_refs(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.as_str()).collect()
    }

    /// Jacobian of the equations with respect to the new params
    pub fn jacobian(&self) -> ExprMatrix {
        let functions: Vec<Expr> = self.equations.iter().map(|(_, rhs)| rhs.clone()).collect();
        ExprMatrix::jacobian(&functions, &self.param_refs())
    }

    /// Whether `expr` can be shown to be >= 0 from the declared assumptions
    fn is_nonnegative(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Const(c) => *c >= 0.0,
            Expr::Var(name) => self.nonnegative.contains(name),
            Expr::Add(lhs, rhs) | Expr::Mul(lhs, rhs) | Expr::Div(lhs, rhs) => {
                self.is_nonnegative(lhs) && self.is_nonnegative(rhs)
            }
            Expr::Pow(base, exp) => match exp.as_ref() {
                Expr::Const(e) if e.fract() == 0.0 && e % 2.0 == 0.0 => true,
                _ => self.is_nonnegative(base),
            },
            Expr::Exp(_) | Expr::Abs(_) => true,
            Expr::sin(arg) => matches!(arg.as_ref(), Expr::Var(name) if self.half_turn_angles.contains(name)),
            _ => false,
        }
    }

    /// Differential scale factor `|det J|`. The absolute value is dropped when the determinant
    /// (or its negation) is nonnegative under the declared assumptions.
    pub fn scale(&self) -> Result<Expr, CalcError> {
        let det = self.jacobian().determinant()?;
        let scale = if self.is_nonnegative(&det) {
            det
        } else {
            let negated = (-det.clone()).simplify();
            if self.is_nonnegative(&negated) {
                negated
            } else {
                det.abs().simplify()
            }
        };
        debug!("scale of {} transform: {}", self.coordinates, scale);
        Ok(scale)
    }

    /// Old variables replaced by their expressions in the new params
    pub fn substitute(&self, expr: &Expr) -> Expr {
        let map: HashMap<String, Expr> = self.equations.iter().cloned().collect();
        expr.substitute_map(&map).simplify()
    }

    /// (expression in the new params, scale factor)
    pub fn apply(&self, expr: &Expr) -> Result<(Expr, Expr), CalcError> {
        let substituted = self.substitute(expr);
        let scale = self.scale()?;
        info!("{} -> {} with scale {}", expr, substituted, scale);
        Ok((substituted, scale))
    }
}

/// A transform whose equations are linear in the new params. Constant offsets in the equations
/// are ignored by `t_matrix`, so `invert` is only meaningful for purely linear maps.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTransform {
    pub transform: Transform,
}

impl LinearTransform {
    pub fn new(params: &[&str], equations: Vec<(&str, Expr)>) -> LinearTransform {
        LinearTransform {
            transform: Transform::new(params, equations),
        }
    }

    /// Coefficient matrix: row per equation, column per param
    pub fn t_matrix(&self) -> ExprMatrix {
        let data: Vec<Vec<Expr>> = self
            .transform
            .equations
            .iter()
            .map(|(_, rhs)| self.transform.params.iter().map(|p| rhs.coeff(p)).collect())
            .collect();
        ExprMatrix {
            nrows: data.len(),
            ncols: self.transform.params.len(),
            data,
        }
    }

    /// Inverse map: the old variables become the params and every former param is expressed
    /// through them as `(T^-1 * old)_i`.
    pub fn invert(&self) -> Result<LinearTransform, CalcError> {
        let t_inv = self.t_matrix().inverse()?;
        let old_vars: Vec<Expr> = self
            .transform
            .equations
            .iter()
            .map(|(old, _)| Expr::var(old))
            .collect();
        let expressions = t_inv.mul_vector(&old_vars)?;
        let old_names: Vec<&str> = self.transform.equations.iter().map(|(old, _)| old.as_str()).collect();
        let equations = self
            .transform
            .params
            .iter()
            .map(|p| p.as_str())
            .zip(expressions)
            .collect();
        Ok(LinearTransform::new(&old_names, equations))
    }

    pub fn scale(&self) -> Result<Expr, CalcError> {
        self.transform.scale()
    }

    pub fn apply(&self, expr: &Expr) -> Result<(Expr, Expr), CalcError> {
        self.transform.apply(expr)
    }
}
