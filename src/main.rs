#![allow(non_snake_case)]
use RustedCalculus::Utils::logger::{history_table, init_logger};
use RustedCalculus::Utils::settings::CalcSettings;
use RustedCalculus::calculus::applications::{Axis, area, center_of_mass, moment_of_inertia_about_axis};
use RustedCalculus::calculus::function::Function;
use RustedCalculus::calculus::region::Region;
use RustedCalculus::calculus::transform::{LinearTransform, Transform};
use RustedCalculus::calculus::vector_calculus::{curl_2d, divergence};
use RustedCalculus::error::CalcError;
use RustedCalculus::symbolic::symbolic_engine::Expr;

const SETTINGS: &str = "
// demo settings
settings
loglevel: info
simplify_results: true
max_expand_power: 8
";

fn main() -> Result<(), CalcError> {
    let settings = CalcSettings::from_document(SETTINGS)?;
    init_logger(settings.loglevel.as_deref())?;
    let example = 0;
    match example {
        0 => {
            // ITERATED INTEGRATION WITH UNDO
            let f = Function::from_str("x^2*y + sin(x)", &["x", "y"])?.with_settings(settings.clone());
            println!("f = {}", f);
            println!("grad f = {:?}", f.gradient().iter().map(|e| e.to_string()).collect::<Vec<_>>());
            // y from 0 to x, then x from 0 to 1
            let region = Region::parse(&[("0", "x"), ("0", "1")])?;
            let inner = f.integrate(&["y"], Some(&Region::parse(&[("0", "x")])?))?;
            let total = inner.integrate(&["x"], Some(&Region::parse(&[("0", "1")])?))?;
            println!("{}", history_table(&total));
            println!("same in one call: {}", f.integral_over(&["y", "x"], Some(&region))?);
            let restored = total.undo()?;
            println!("after undo: {}", restored);
            println!("average over the triangle: {}", f.average_value(&["y", "x"], &region)?);
        }
        1 => {
            // CHANGE OF VARIABLES
            let f = Function::from_str("exp(-(x^2 + y^2))", &["x", "y"])?;
            let polar = f.transform(&Transform::polar("r", "t"))?;
            println!("in polar coordinates: {} ({})", polar, polar.coordinates());
            let disk = Region::parse(&[("0", "1"), ("0", "2*pi")])?;
            let value = polar.integrate(&["r", "t"], Some(&disk))?;
            println!("integral over the unit disk = {}", value.to_f64()?);

            let spherical = Transform::spherical("rho", "theta", "phi");
            println!("spherical jacobian = {}", spherical.jacobian());
            println!("spherical scale = {}", spherical.scale()?);

            let linear = LinearTransform::new(
                &["u", "v"],
                vec![("x", Expr::parse_expression("u + v")?), ("y", Expr::parse_expression("u - v")?)],
            );
            println!("T = {}", linear.t_matrix());
            let inverse = linear.invert()?;
            for (param, rhs) in &inverse.transform.equations {
                println!("{} = {}", param, rhs);
            }
        }
        2 => {
            // APPLICATIONS
            let square = Region::from_pairs(&[(0.0, 1.0), (0.0, 1.0)]);
            let density = Expr::parse_expression("1 + x")?;
            println!("area = {}", area(&["x", "y"], &square)?);
            println!("center of mass = {:?}", center_of_mass(&density, &["x", "y"], &["x", "y"], &square)?);
            let moment = moment_of_inertia_about_axis(&density, Axis::Z, &["x", "y"], &["x", "y"], &square)?;
            println!("moment of inertia about {} = {}", Axis::Z, moment);
        }
        3 => {
            // VECTOR CALCULUS AND EXPANSION
            let field = Expr::parse_vector_expression("x*y^2, x^2*y")?;
            println!("curl = {}", curl_2d(&field, &["x", "y"])?);
            println!("div = {}", divergence(&field, &["x", "y"])?);
            let expr = Expr::parse_expression("(x + y)^3")?;
            println!("expanded: {}", settings.finish(expr.expand_with_limit(settings.max_expand_power)));
        }
        _ => {
            println!("no such example");
        }
    }
    Ok(())
}
