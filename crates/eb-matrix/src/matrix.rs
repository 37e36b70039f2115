//! Dense N×N station distance matrix.

use eb_core::{DistanceKind, StationId};

use crate::{MatrixError, MatrixResult};

/// Row-major N×N matrix of metres.  `get(i, j)` is the distance *from*
/// station `i` *to* station `j`; `NaN` marks a pair with no street path.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    kind:   DistanceKind,
    n:      usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// An `n × n` matrix with every off-diagonal cell missing and a zero
    /// diagonal.
    pub fn unfilled(kind: DistanceKind, n: usize) -> Self {
        let mut values = vec![f64::NAN; n * n];
        for i in 0..n {
            values[i * n + i] = 0.0;
        }
        Self { kind, n, values }
    }

    /// Wrap row-major `values` of an `n × n` matrix.
    ///
    /// An `n` whose square overflows `usize` is a shape mismatch.
    pub fn from_values(kind: DistanceKind, n: usize, values: Vec<f64>) -> MatrixResult<Self> {
        let Some(expected) = n.checked_mul(n) else {
            return Err(MatrixError::ShapeMismatch { n, expected: usize::MAX, got: values.len() });
        };
        if values.len() != expected {
            return Err(MatrixError::ShapeMismatch { n, expected, got: values.len() });
        }
        Ok(Self { kind, n, values })
    }

    pub fn kind(&self) -> DistanceKind {
        self.kind
    }

    /// Number of stations, `N`.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance from `origin` to `destination`.
    ///
    /// # Panics
    /// Panics if either id is outside `1..=N`.
    #[inline]
    pub fn get(&self, origin: StationId, destination: StationId) -> f64 {
        self.values[origin.slot() * self.n + destination.slot()]
    }

    /// Like [`get`](Self::get) but `None` for unknown ids and missing cells.
    pub fn distance(&self, origin: StationId, destination: StationId) -> Option<f64> {
        if !origin.is_within(self.n) || !destination.is_within(self.n) {
            return None;
        }
        Some(self.get(origin, destination)).filter(|d| !d.is_nan())
    }

    #[inline]
    pub(crate) fn set(&mut self, origin: usize, destination: usize, value: f64) {
        self.values[origin * self.n + destination] = value;
    }

    /// Distances from `origin` to every station, in station order.
    pub fn row(&self, origin: StationId) -> &[f64] {
        let start = origin.slot() * self.n;
        &self.values[start..start + self.n]
    }

    /// Row-major cell values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// `true` if `get(i, j) == get(j, i)` for every pair, with `NaN`
    /// matching `NaN`.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| {
            (i + 1..self.n).all(|j| {
                let a = self.values[i * self.n + j];
                let b = self.values[j * self.n + i];
                a == b || (a.is_nan() && b.is_nan())
            })
        })
    }

    /// Ordered pairs whose cell is `NaN`.
    pub fn missing_pairs(&self) -> Vec<(StationId, StationId)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_nan())
            .map(|(idx, _)| {
                (StationId::from_slot(idx / self.n), StationId::from_slot(idx % self.n))
            })
            .collect()
    }
}
