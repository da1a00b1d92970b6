//! Symbolic matrices: Jacobians, determinants and inverses of matrices whose entries are
//! expressions. Numerical evaluation goes to `nalgebra::DMatrix`.

use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_simplify::build_sum;
use itertools::Itertools;
use nalgebra::DMatrix;
use std::fmt;
use std::ops::Index;

/// Row-major matrix of expressions
#[derive(Clone, Debug, PartialEq)]
pub struct ExprMatrix {
    pub data: Vec<Vec<Expr>>,
    pub nrows: usize,
    pub ncols: usize,
}

impl ExprMatrix {
    /// Create new symbolic matrix, all rows must have the same length
    pub fn new(data: Vec<Vec<Expr>>) -> Result<Self, CalcError> {
        let nrows = data.len();
        let ncols = data.first().map(|row| row.len()).unwrap_or(0);
        if let Some(bad) = data.iter().position(|row| row.len() != ncols) {
            return Err(CalcError::Shape(format!(
                "row {} has {} entries, expected {}",
                bad,
                data[bad].len(),
                ncols
            )));
        }
        Ok(Self { data, nrows, ncols })
    }

    /// Create zero matrix
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        let data = vec![vec![Expr::Const(0.0); ncols]; nrows];
        Self { data, nrows, ncols }
    }

    /// Jacobian matrix: `J[i][j] = d functions[i] / d variables[j]`, simplified
    pub fn jacobian(functions: &[Expr], variables: &[&str]) -> Self {
        let data: Vec<Vec<Expr>> = functions
            .iter()
            .map(|f| f.diff_multi_args(variables))
            .collect();
        Self {
            nrows: functions.len(),
            ncols: variables.len(),
            data,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Get element at (i, j)
    pub fn get(&self, i: usize, j: usize) -> Option<&Expr> {
        self.data.get(i)?.get(j)
    }

    /// Transpose
    pub fn transpose(&self) -> ExprMatrix {
        let data = (0..self.ncols)
            .map(|j| self.data.iter().map(|row| row[j].clone()).collect())
            .collect();
        ExprMatrix {
            data,
            nrows: self.ncols,
            ncols: self.nrows,
        }
    }

    /// Get minor matrix (remove row i and column j)
    pub fn minor(&self, row: usize, col: usize) -> ExprMatrix {
        let data: Vec<Vec<Expr>> = self
            .data
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != row)
            .map(|(_, r)| {
                r.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != col)
                    .map(|(_, e)| e.clone())
                    .collect()
            })
            .collect();
        ExprMatrix {
            nrows: data.len(),
            ncols: self.ncols.saturating_sub(1),
            data,
        }
    }

    fn require_square(&self, what: &str) -> Result<(), CalcError> {
        if self.nrows == 0 || !self.is_square() {
            return Err(CalcError::Shape(format!(
                "{} needs a non-empty square matrix, got {}x{}",
                what, self.nrows, self.ncols
            )));
        }
        Ok(())
    }

    /// Determinant of a square matrix of any size by cofactor expansion along the first row.
    pub fn determinant(&self) -> Result<Expr, CalcError> {
        self.require_square("determinant")?;
        Ok(self.cofactor_expansion())
    }

    fn cofactor_expansion(&self) -> Expr {
        match self.nrows {
            1 => self.data[0][0].simplify(),
            2 => {
                let a = &self.data[0][0];
                let b = &self.data[0][1];
                let c = &self.data[1][0];
                let d = &self.data[1][1];
                (a.clone() * d.clone() - b.clone() * c.clone()).simplify()
            }
            n => {
                let terms: Vec<Expr> = (0..n)
                    .filter(|&j| !self.data[0][j].is_zero())
                    .map(|j| {
                        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                        Expr::Const(sign) * self.data[0][j].clone() * self.minor(0, j).cofactor_expansion()
                    })
                    .collect();
                build_sum(terms).simplify()
            }
        }
    }

    /// Inverse through the adjugate: `A⁻¹ = adj(A) / det(A)`.
    ///
    /// # Errors
    /// `Shape` for a non-square matrix, `Singular` if the determinant simplifies to zero.
    pub fn inverse(&self) -> Result<ExprMatrix, CalcError> {
        let det = self.determinant()?;
        if det.is_zero() {
            return Err(CalcError::Singular(format!("determinant of {} is zero", self)));
        }
        let n = self.nrows;
        if n == 1 {
            return Ok(ExprMatrix {
                data: vec![vec![(Expr::Const(1.0) / det).simplify()]],
                nrows: 1,
                ncols: 1,
            });
        }
        let mut data = vec![vec![Expr::Const(0.0); n]; n];
        for (i, row) in self.data.iter().enumerate() {
            for j in 0..row.len() {
                let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
                let cofactor = Expr::Const(sign) * self.minor(i, j).cofactor_expansion();
                // adjugate is the transposed cofactor matrix
                data[j][i] = (cofactor / det.clone()).simplify();
            }
        }
        Ok(ExprMatrix { data, nrows: n, ncols: n })
    }

    /// Matrix-vector multiplication
    pub fn mul_vector(&self, vec: &[Expr]) -> Result<Vec<Expr>, CalcError> {
        if vec.len() != self.ncols {
            return Err(CalcError::Shape(format!(
                "matrix has {} columns but the vector has {} entries",
                self.ncols,
                vec.len()
            )));
        }
        Ok(self
            .data
            .iter()
            .map(|row| {
                let products = row
                    .iter()
                    .zip(vec.iter())
                    .map(|(a, b)| a.clone() * b.clone())
                    .collect();
                build_sum(products).simplify()
            })
            .collect())
    }

    /// Element-wise operations
    pub fn map<F>(&self, f: F) -> ExprMatrix
    where
        F: Fn(&Expr) -> Expr,
    {
        let data: Vec<Vec<Expr>> = self
            .data
            .iter()
            .map(|row| row.iter().map(&f).collect())
            .collect();
        ExprMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    /// Simplify all expressions
    pub fn simplify(&self) -> ExprMatrix {
        self.map(|expr| expr.simplify())
    }

    /// Evaluate matrix numerically
    pub fn evaluate(&self, vars: &[&str], values: &[f64]) -> Result<DMatrix<f64>, CalcError> {
        let mut result = DMatrix::zeros(self.nrows, self.ncols);
        for (i, row) in self.data.iter().enumerate() {
            for (j, expr) in row.iter().enumerate() {
                result[(i, j)] = expr.eval_expression(vars, values)?;
            }
        }
        Ok(result)
    }
}

impl Index<(usize, usize)> for ExprMatrix {
    type Output = Expr;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i][j] // i - row, j - column
    }
}

impl fmt::Display for ExprMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .data
            .iter()
            .map(|row| format!("[{}]", row.iter().join(", ")))
            .join(", ");
        write!(f, "[{}]", rows)
    }
}
