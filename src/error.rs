use std::fmt;

/// Errors produced by the symbolic engine and the calculus layer on top of it
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    /// The input string is not a valid expression
    Parse { input: String, msg: String },
    /// No integration rule matched the integrand
    Integration { integrand: String, var: String },
    /// A number was expected but the expression still has free symbols
    UnresolvedSymbols { expr: String, symbols: Vec<String> },
    /// `undo` was called with nothing recorded
    EmptyHistory,
    /// Number of integration variables and region bounds differ
    RegionMismatch { variables: usize, bounds: usize },
    /// Matrix or vector dimensions do not fit the operation
    Shape(String),
    /// Matrix has a zero determinant
    Singular(String),
    /// Settings document could not be read
    Settings(String),
    /// An average was taken over a region (or a weight) that integrates to zero
    ZeroMeasure(String),
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::Parse { input, msg } => {
                write!(f, "cannot parse expression '{}': {}", input, msg)
            }
            CalcError::Integration { integrand, var } => {
                write!(f, "cannot integrate {} with respect to {}", integrand, var)
            }
            CalcError::UnresolvedSymbols { expr, symbols } => write!(
                f,
                "expression {} still depends on [{}]",
                expr,
                symbols.join(", ")
            ),
            CalcError::EmptyHistory => write!(f, "nothing to undo"),
            CalcError::RegionMismatch { variables, bounds } => write!(
                f,
                "{} integration variables but {} bounds in the region",
                variables, bounds
            ),
            CalcError::Shape(msg) => write!(f, "shape error: {}", msg),
            CalcError::Singular(msg) => write!(f, "singular matrix: {}", msg),
            CalcError::Settings(msg) => write!(f, "settings error: {}", msg),
            CalcError::ZeroMeasure(msg) => write!(f, "zero measure: {}", msg),
        }
    }
}

impl std::error::Error for CalcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = CalcError::RegionMismatch {
            variables: 2,
            bounds: 1,
        };
        assert_eq!(
            err.to_string(),
            "2 integration variables but 1 bounds in the region"
        );
        let err = CalcError::UnresolvedSymbols {
            expr: "x*y".to_string(),
            symbols: vec!["x".to_string(), "y".to_string()],
        };
        assert_eq!(err.to_string(), "expression x*y still depends on [x, y]");
        assert_eq!(CalcError::EmptyHistory.to_string(), "nothing to undo");
        let err = CalcError::ZeroMeasure("region [(1, 1)]".to_string());
        assert_eq!(err.to_string(), "zero measure: region [(1, 1)]");
    }
}
