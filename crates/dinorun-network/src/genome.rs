use serde::{Deserialize, Serialize};

use crate::{LayerShape, NetworkError, Topology};

/// Dense row-major matrix of one agent's layer parameters.
///
/// Serialized as a list of rows, so a bias column `[b0, b1]` reads
/// `[[b0], [b1]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, NetworkError> {
        if data.len() != rows * cols {
            return Err(NetworkError::ShapeMismatch {
                what: "matrix data",
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major elements.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NetworkError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(NetworkError::ShapeMismatch {
                what: "matrix row",
                expected: cols,
                actual: bad.len(),
            });
        }
        let n_rows = rows.len();
        Ok(Self {
            rows: n_rows,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        if matrix.cols == 0 {
            return vec![vec![]; matrix.rows];
        }
        matrix
            .data
            .chunks(matrix.cols)
            .map(<[f64]>::to_vec)
            .collect()
    }
}

/// One agent's full parameter set: a weight matrix and a bias column per layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

impl Genome {
    /// Checks that every matrix matches the corresponding layer of `topology`.
    pub fn check_shape(&self, topology: &Topology) -> Result<(), NetworkError> {
        let shapes = topology.shapes();
        if self.weights.len() != shapes.len() {
            return Err(NetworkError::ShapeMismatch {
                what: "weight layer count",
                expected: shapes.len(),
                actual: self.weights.len(),
            });
        }
        if self.biases.len() != shapes.len() {
            return Err(NetworkError::ShapeMismatch {
                what: "bias layer count",
                expected: shapes.len(),
                actual: self.biases.len(),
            });
        }
        for ((w, b), shape) in self.weights.iter().zip(&self.biases).zip(shapes) {
            check_matrix(w, shape.outputs, shape.inputs, "weight rows", "weight columns")?;
            check_matrix(b, shape.outputs, 1, "bias rows", "bias columns")?;
        }
        Ok(())
    }

    /// Layer shapes implied by the weight matrices.
    #[must_use]
    pub fn shapes(&self) -> Vec<LayerShape> {
        self.weights
            .iter()
            .map(|w| LayerShape {
                inputs: w.cols(),
                outputs: w.rows(),
            })
            .collect()
    }
}

fn check_matrix(
    matrix: &Matrix,
    rows: usize,
    cols: usize,
    rows_what: &'static str,
    cols_what: &'static str,
) -> Result<(), NetworkError> {
    if matrix.rows() != rows {
        return Err(NetworkError::ShapeMismatch {
            what: rows_what,
            expected: rows,
            actual: matrix.rows(),
        });
    }
    if matrix.cols() != cols {
        return Err(NetworkError::ShapeMismatch {
            what: cols_what,
            expected: cols,
            actual: matrix.cols(),
        });
    }
    Ok(())
}
