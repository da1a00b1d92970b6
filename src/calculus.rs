/// # Calculus
/// convenience layer over the symbolic engine: a `Function` wrapper with iterated integration
/// and undo, coordinate transforms, application formulas and vector calculus helpers
///# Example
/// ```
/// use RustedCalculus::calculus::applications::center_of_mass;
/// use RustedCalculus::calculus::region::Region;
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// let square = Region::from_pairs(&[(0.0, 1.0), (0.0, 1.0)]);
/// let center = center_of_mass(&Expr::Const(1.0), &["x", "y"], &["x", "y"], &square).unwrap();
/// assert!((center[0] - 0.5).abs() < 1e-12 && (center[1] - 0.5).abs() < 1e-12);
/// ```
pub mod applications;
/// the `Function` wrapper: evaluation, derivatives, integration with history
pub mod function;
/// bounds of integration
pub mod region;
/// changes of variables and their Jacobian scale factor
pub mod transform;
/// curl, divergence and normals of vector fields
pub mod vector_calculus;
