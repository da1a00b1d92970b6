use RustedCalculus::calculus::applications::{area, center_of_mass};
use RustedCalculus::calculus::function::Function;
use RustedCalculus::calculus::region::Region;
use RustedCalculus::calculus::transform::Transform;
use RustedCalculus::error::CalcError;
use RustedCalculus::symbolic::symbolic_engine::Expr;
use approx::assert_relative_eq;

fn assert_same_function(lhs: &Expr, rhs: &Expr, vars: &[&str], points: &[Vec<f64>]) {
    for point in points {
        let a = lhs.eval_expression(vars, point).unwrap();
        let b = rhs.eval_expression(vars, point).unwrap();
        assert_relative_eq!(a, b, epsilon = 1e-9, max_relative = 1e-9);
    }
}

#[test]
fn integral_then_derivative_gives_back_the_integrand() {
    let points: Vec<Vec<f64>> = vec![vec![0.3], vec![1.1], vec![2.7]];
    for input in [
        "x^3 - 2*x + 1",
        "x*exp(2*x)",
        "sin(2*x)^2*cos(2*x)",
        "x^2*cos(x)",
        "1/(2*x + 1)",
        "x*ln(x)",
        "cos(x)*exp(sin(x))",
    ] {
        let f = Function::from_str(input, &["x"]).unwrap();
        let antiderivative = f.integral("x", None).unwrap();
        assert_same_function(&antiderivative.diff("x"), f.state(), &["x"], &points);
    }
}

#[test]
fn multivariable_integral_then_derivatives() {
    let f = Function::from_str("x*y^2 + exp(x)*y", &["x", "y"]).unwrap();
    let g = f.integrate(&["x", "y"], None).unwrap();
    let back = g.state().diff("y").diff("x");
    let points = vec![vec![0.5, -1.0], vec![1.5, 2.0]];
    assert_same_function(&back, f.state(), &["x", "y"], &points);
}

#[test]
fn undo_restores_the_exact_state() {
    let f = Function::from_str("x*y + sin(x)", &["x", "y"]).unwrap();
    let region = Region::from_pairs(&[(0.0, 1.0), (0.0, 2.0)]);
    let integrated = f.integrate(&["x", "y"], Some(&region)).unwrap();
    assert_ne!(integrated.state(), f.state());
    let restored = integrated.undo().unwrap();
    assert_eq!(restored, f);
    assert_eq!(restored.undo(), Err(CalcError::EmptyHistory));
}

#[test]
fn average_of_a_constant_is_the_constant() {
    let f = Function::from_str("7.5", &["x", "y"]).unwrap();
    for region in [
        Region::from_pairs(&[(0.0, 1.0), (0.0, 1.0)]),
        Region::from_pairs(&[(-3.0, 2.0), (1.0, 4.0)]),
        Region::parse(&[("0", "x^2"), ("0", "2")]).unwrap(),
    ] {
        let vars = if region.get(0).map(|b| b.upper.contains_variable("x")) == Some(true) {
            ["y", "x"]
        } else {
            ["x", "y"]
        };
        assert_relative_eq!(f.average_value(&vars, &region).unwrap(), 7.5, epsilon = 1e-12);
        let weighted = f
            .average_value_weighted(&vars, &region, &Expr::parse_expression("1 + y^2").unwrap())
            .unwrap();
        assert_relative_eq!(weighted, 7.5, epsilon = 1e-12);
    }
}

#[test]
fn polar_and_back_reproduces_the_expression() {
    let original = Expr::parse_expression("x^2 + 3*x*y - y").unwrap();
    let polar = Transform::polar("r", "t");
    let in_polar = polar.substitute(&original);
    let back = Transform::parse(
        &["x", "y"],
        &[("r", "sqrt(x^2 + y^2)"), ("t", "arctg(y/x)")],
    )
    .unwrap()
    .substitute(&in_polar);
    // the inverse map is valid for x > 0
    let points = vec![vec![0.5, 0.2], vec![1.5, -2.0], vec![3.0, 1.0]];
    assert_same_function(&back, &original, &["x", "y"], &points);
}

#[test]
fn polar_integral_over_a_quarter_disk() {
    // x^2 + y^2 over the quarter disk of radius 2: ∫∫ r^3 dr dt
    let polar = Function::from_str("x^2 + y^2", &["x", "y"])
        .unwrap()
        .transform(&Transform::polar("r", "t"))
        .unwrap();
    let region = Region::parse(&[("0", "2"), ("0", "pi/2")]).unwrap();
    let value = polar.integrate(&["r", "t"], Some(&region)).unwrap().to_f64().unwrap();
    assert_relative_eq!(value, 2.0 * std::f64::consts::PI, epsilon = 1e-12);
}

#[test]
fn unit_square_area_and_center_of_mass() {
    let square = Region::from_pairs(&[(0.0, 1.0), (0.0, 1.0)]);
    assert_relative_eq!(area(&["x", "y"], &square).unwrap(), 1.0);
    let center = center_of_mass(&Expr::Const(1.0), &["x", "y"], &["x", "y"], &square).unwrap();
    assert_eq!(center.len(), 2);
    assert_relative_eq!(center[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(center[1], 0.5, epsilon = 1e-12);
}

#[test]
fn unit_disk_area_in_rectangular_coordinates() {
    let disk = Region::parse(&[("-sqrt(1 - x^2)", "sqrt(1 - x^2)"), ("-1", "1")]).unwrap();
    assert_relative_eq!(area(&["y", "x"], &disk).unwrap(), std::f64::consts::PI, epsilon = 1e-12);
    // upper half disk, center of mass at (0, 4/(3π))
    let half = Region::parse(&[("0", "sqrt(1 - x^2)"), ("-1", "1")]).unwrap();
    let center = center_of_mass(&Expr::Const(1.0), &["x", "y"], &["y", "x"], &half).unwrap();
    assert_relative_eq!(center[0], 0.0, epsilon = 1e-12);
    assert_relative_eq!(center[1], 4.0 / (3.0 * std::f64::consts::PI), epsilon = 1e-12);
}

#[test]
fn volume_of_a_ball_in_spherical_coordinates() {
    let ball = Function::from_str("1", &["x", "y", "z"])
        .unwrap()
        .transform(&Transform::spherical("rho", "theta", "phi"))
        .unwrap();
    let region = Region::parse(&[("0", "1"), ("0", "2*pi"), ("0", "pi")]).unwrap();
    let volume = ball
        .integrate(&["rho", "theta", "phi"], Some(&region))
        .unwrap()
        .to_f64()
        .unwrap();
    assert_relative_eq!(volume, 4.0 * std::f64::consts::PI / 3.0, epsilon = 1e-10);
}
