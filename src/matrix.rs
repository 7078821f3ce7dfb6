//! Dense square cost matrices for the directed TSP.
//!
//! Entries are extended reals: a finite non-negative cost or `+inf` for an
//! edge that cannot be traversed. Vertex 0 is the depot: every tour starts
//! there and every closed-tour weight returns there.

use crate::error::{Result, SolverError};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Cost of a non-traversable edge.
pub const INF: f64 = f64::INFINITY;

/// The fixed origin and return vertex.
pub const DEPOT: usize = 0;

/// Conversion of a numeric matrix element into the canonical real form.
pub trait ToReal: Copy {
    fn to_real(self) -> f64;
}

macro_rules! impl_to_real {
    ($($t:ty),*) => {
        $(
            impl ToReal for $t {
                #[inline]
                fn to_real(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_to_real!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

/// Immutable N x N matrix of edge costs, `N >= 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<ExtendedReal>>", into = "Vec<Vec<ExtendedReal>>")]
pub struct CostMatrix {
    dimension: usize,
    costs: Vec<Vec<f64>>,
}

impl CostMatrix {
    /// Build a matrix from rows of reals.
    ///
    /// The diagonal is overwritten with `+inf` so self-loops are never used.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dimension = rows.len();
        if dimension < 2 {
            return Err(SolverError::TooSmall(dimension));
        }

        let mut costs = rows;
        for (i, row) in costs.iter_mut().enumerate() {
            if row.len() != dimension {
                return Err(SolverError::not_square(i, row.len(), dimension));
            }
            for (j, value) in row.iter_mut().enumerate() {
                if i == j {
                    *value = INF;
                    continue;
                }
                if value.is_nan() || *value < 0.0 {
                    return Err(SolverError::invalid_cost(i, j, *value));
                }
            }
        }

        Ok(CostMatrix { dimension, costs })
    }

    /// Build a matrix from rows of any numeric type, converting once.
    pub fn from_rows<T: ToReal>(rows: Vec<Vec<T>>) -> Result<Self> {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(ToReal::to_real).collect())
            .collect();
        Self::new(rows)
    }

    /// Number of vertices
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Cost of the directed edge `from -> to`
    #[inline]
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from][to]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.dimension)
            .all(|i| (i + 1..self.dimension).all(|j| self.costs[i][j] == self.costs[j][i]))
    }

    /// Closed-tour weight: consecutive edges plus the return edge to the depot.
    ///
    /// Any `+inf` edge makes the whole weight `+inf`.
    pub fn tour_cost(&self, tour: &[usize]) -> f64 {
        let Some(&last) = tour.last() else {
            return 0.0;
        };

        let path: f64 = tour.windows(2).map(|w| self.cost(w[0], w[1])).sum();
        path + self.cost(last, DEPOT)
    }

    /// Copy of this matrix with every finite cost multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        let rows = self
            .costs
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&c| if c.is_finite() { c * factor } else { c })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    /// Summary of the off-diagonal edges
    pub fn statistics(&self) -> MatrixStatistics {
        let off_diagonal: Vec<f64> = (0..self.dimension)
            .flat_map(|i| (0..self.dimension).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| self.cost(i, j))
            .collect();

        let finite: Vec<f64> = off_diagonal.iter().copied().filter(|c| c.is_finite()).collect();
        let min_cost = finite.iter().copied().map(OrderedFloat).min().map(|c| c.0);
        let max_cost = finite.iter().copied().map(OrderedFloat).max().map(|c| c.0);
        let avg_cost = if finite.is_empty() {
            None
        } else {
            Some(finite.iter().sum::<f64>() / finite.len() as f64)
        };

        MatrixStatistics {
            dimension: self.dimension,
            finite_edges: finite.len(),
            infinite_edges: off_diagonal.len() - finite.len(),
            min_cost,
            max_cost,
            avg_cost,
            symmetric: self.is_symmetric(),
        }
    }
}

impl TryFrom<Vec<Vec<ExtendedReal>>> for CostMatrix {
    type Error = SolverError;

    fn try_from(rows: Vec<Vec<ExtendedReal>>) -> Result<Self> {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|c| c.0).collect())
                .collect(),
        )
    }
}

impl From<CostMatrix> for Vec<Vec<ExtendedReal>> {
    fn from(matrix: CostMatrix) -> Self {
        matrix
            .costs
            .into_iter()
            .map(|row| row.into_iter().map(ExtendedReal).collect())
            .collect()
    }
}

/// A cost cell as it appears in serialized form.
///
/// JSON has no infinity, so `+inf` is written as the string `"inf"`. Reading
/// accepts a number, `"inf"`, `"-inf"`, `"nan"` or `null` (read as `+inf`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtendedReal(pub f64);

impl Serialize for ExtendedReal {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        extended_real::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for ExtendedReal {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        extended_real::deserialize(deserializer).map(ExtendedReal)
    }
}

/// Serde adapter for `f64` fields that may hold `+inf`,
/// for use with `#[serde(with = "crate::matrix::extended_real")]`.
pub mod extended_real {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
        Null,
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("nan")
        } else if *value > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Null => Ok(f64::INFINITY),
            Repr::Text(text) => match text.as_str() {
                "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
                "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid extended real {:?}", other))),
            },
        }
    }
}

/// Statistics about a cost matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixStatistics {
    pub dimension: usize,
    pub finite_edges: usize,
    pub infinite_edges: usize,
    pub min_cost: Option<f64>,
    pub max_cost: Option<f64>,
    pub avg_cost: Option<f64>,
    pub symmetric: bool,
}

impl std::fmt::Display for MatrixStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Matrix: {}x{}", self.dimension, self.dimension)?;
        writeln!(f, "  Finite edges: {}", self.finite_edges)?;
        writeln!(f, "  Infinite edges: {}", self.infinite_edges)?;
        writeln!(f, "  Symmetric: {}", self.symmetric)?;
        match (self.min_cost, self.max_cost, self.avg_cost) {
            (Some(min), Some(max), Some(avg)) => {
                writeln!(f, "  Min cost: {:.2}", min)?;
                writeln!(f, "  Max cost: {:.2}", max)?;
                writeln!(f, "  Avg cost: {:.2}", avg)
            }
            _ => writeln!(f, "  No finite edges"),
        }
    }
}
