//! Physics-style formulas built on `Function` integration: area, mass, averages, center of mass
//! and moments of inertia. `params` are the coordinates of a point of the body, `vars` and
//! `region` describe the integration in the same positional way as `Function::integrate`.
use crate::calculus::function::Function;
use crate::calculus::region::Region;
use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use log::info;
use strum_macros::Display;

/// Axis (or point) a moment of inertia is taken about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Axis {
    X,
    Y,
    Z,
    Origin,
}

impl Axis {
    /// Squared distance from the point `params` to the axis. Params are read as (x, y, z); a
    /// missing coordinate counts as zero.
    pub fn distance_sq(&self, params: &[&str]) -> Expr {
        let square = |i: usize| params.get(i).map(|p| Expr::var(p).powf(2.0));
        let terms: Vec<Expr> = match self {
            Axis::X => vec![square(1), square(2)],
            Axis::Y => vec![square(0), square(2)],
            Axis::Z => vec![square(0), square(1)],
            Axis::Origin => vec![square(0), square(1), square(2)],
        }
        .into_iter()
        .flatten()
        .collect();
        terms
            .into_iter()
            .reduce(|acc, t| acc + t)
            .unwrap_or(Expr::Const(0.0))
    }
}

fn integrate_number(expr: Expr, params: &[&str], vars: &[&str], region: &Region) -> Result<f64, CalcError> {
    Function::new(expr, params)
        .integrate(vars, Some(region))?
        .to_f64()
}

/// `∫ 1` over the region
pub fn area(vars: &[&str], region: &Region) -> Result<f64, CalcError> {
    let result = integrate_number(Expr::Const(1.0), vars, vars, region)?;
    info!("area of {} = {}", region, result);
    Ok(result)
}

/// `∫ ρ` over the region
pub fn mass(density: &Expr, params: &[&str], vars: &[&str], region: &Region) -> Result<f64, CalcError> {
    let result = integrate_number(density.clone(), params, vars, region)?;
    info!("mass with density {} = {}", density, result);
    Ok(result)
}

pub fn average_value(f: &Function, vars: &[&str], region: &Region) -> Result<f64, CalcError> {
    f.average_value(vars, region)
}

pub fn average_value_weighted(
    f: &Function,
    vars: &[&str],
    region: &Region,
    density: &Expr,
) -> Result<f64, CalcError> {
    f.average_value_weighted(vars, region, density)
}

/// One coordinate per param: `∫ p_i ρ / ∫ ρ`
pub fn center_of_mass(
    density: &Expr,
    params: &[&str],
    vars: &[&str],
    region: &Region,
) -> Result<Vec<f64>, CalcError> {
    let center = params
        .iter()
        .map(|p| Function::new(Expr::var(p), params).average_value_weighted(vars, region, density))
        .collect::<Result<Vec<f64>, CalcError>>()?;
    info!("center of mass: {:?}", center);
    Ok(center)
}

/// `∫ d² ρ` where `distance_sq` is the squared distance to the axis of rotation
pub fn moment_of_inertia(
    density: &Expr,
    distance_sq: &Expr,
    params: &[&str],
    vars: &[&str],
    region: &Region,
) -> Result<f64, CalcError> {
    let integrand = distance_sq.clone() * density.clone();
    let result = integrate_number(integrand, params, vars, region)?;
    info!("moment of inertia for distance^2 {} = {}", distance_sq, result);
    Ok(result)
}

pub fn moment_of_inertia_about_axis(
    density: &Expr,
    axis: Axis,
    params: &[&str],
    vars: &[&str],
    region: &Region,
) -> Result<f64, CalcError> {
    moment_of_inertia(density, &axis.distance_sq(params), params, vars, region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Region {
        Region::from_pairs(&[(0.0, 1.0), (0.0, 1.0)])
    }

    #[test]
    fn test_area() {
        assert_relative_eq!(area(&["x", "y"], &unit_square()).unwrap(), 1.0);
        let rectangle = Region::from_pairs(&[(0.0, 2.0), (-1.0, 2.0)]);
        assert_relative_eq!(area(&["x", "y"], &rectangle).unwrap(), 6.0, epsilon = 1e-12);
        // y from 0 to 1 - x, then x from 0 to 1
        let triangle = Region::parse(&[("0", "1 - x"), ("0", "1")]).unwrap();
        assert_relative_eq!(area(&["y", "x"], &triangle).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_mass_and_center_of_mass() {
        let density = Expr::parse_expression("x").unwrap();
        let m = mass(&density, &["x", "y"], &["x", "y"], &unit_square()).unwrap();
        assert_relative_eq!(m, 0.5, epsilon = 1e-12);

        let uniform = Expr::Const(1.0);
        let center = center_of_mass(&uniform, &["x", "y"], &["x", "y"], &unit_square()).unwrap();
        assert_relative_eq!(center[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(center[1], 0.5, epsilon = 1e-12);

        let heavier_right = center_of_mass(&density, &["x", "y"], &["x", "y"], &unit_square()).unwrap();
        assert_relative_eq!(heavier_right[0], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(heavier_right[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_averages() {
        let f = Function::from_str("x*y", &["x", "y"]).unwrap();
        assert_relative_eq!(average_value(&f, &["x", "y"], &unit_square()).unwrap(), 0.25, epsilon = 1e-12);
        let w = average_value_weighted(&f, &["x", "y"], &unit_square(), &Expr::Const(3.0)).unwrap();
        assert_relative_eq!(w, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_moment_of_inertia() {
        // unit square plate about the z axis: ∫∫ (x^2 + y^2) = 2/3
        let one = Expr::Const(1.0);
        let about_z = moment_of_inertia_about_axis(&one, Axis::Z, &["x", "y"], &["x", "y"], &unit_square()).unwrap();
        assert_relative_eq!(about_z, 2.0 / 3.0, epsilon = 1e-12);
        let about_x = moment_of_inertia_about_axis(&one, Axis::X, &["x", "y"], &["x", "y"], &unit_square()).unwrap();
        assert_relative_eq!(about_x, 1.0 / 3.0, epsilon = 1e-12);

        // unit disk in polar coordinates, distance^2 = r^2, area element r dr dt
        let disk = Region::parse(&[("0", "1"), ("0", "2*pi")]).unwrap();
        let r_sq = Expr::parse_expression("r^2").unwrap();
        let polar_density = Expr::var("r");
        let disk_moment = moment_of_inertia(&polar_density, &r_sq, &["r", "t"], &["r", "t"], &disk).unwrap();
        assert_relative_eq!(disk_moment, std::f64::consts::PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_distance() {
        let d = Axis::Origin.distance_sq(&["x", "y", "z"]);
        let value = d.eval_expression(&["x", "y", "z"], &[1.0, 2.0, 2.0]).unwrap();
        assert_relative_eq!(value, 9.0);
        assert_eq!(Axis::Y.distance_sq(&["x"]), Expr::var("x").powf(2.0));
        assert_eq!(Axis::X.to_string(), "X");
    }
}
