//! Solve statistics and termination status.

use std::fmt;

/// Terminal status of a solve.
///
/// The [`Display`](fmt::Display) rendering of each variant is an observable
/// value callers may match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverStatus {
    /// The solve has not terminated (or the workspace was never run).
    #[default]
    Unknown,
    /// The right-hand side was zero.
    ZeroResidual,
    /// The residual dropped below `atol + rtol * |r0|`.
    SolutionGoodEnough,
    /// The iteration cap was reached.
    MaxIterations,
    /// A non-positive curvature direction was met: either the curvature
    /// check tripped on a negative pivot, or the pivot vanished outright.
    NegativeCurvature,
    /// The triangular factor was rank-deficient; the returned solution
    /// minimises the residual over the explored subspace.
    LeastSquaresSolution,
    /// The per-iteration callback requested termination.
    UserRequestedExit,
}

impl SolverStatus {
    /// The observable status string.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Unknown => "unknown",
            SolverStatus::ZeroResidual => "x = 0 is a zero-residual solution",
            SolverStatus::SolutionGoodEnough => "solution good enough given atol and rtol",
            SolverStatus::MaxIterations => "maximum number of iterations exceeded",
            SolverStatus::NegativeCurvature => "negative curvature",
            SolverStatus::LeastSquaresSolution => "found approximate least-squares solution",
            SolverStatus::UserRequestedExit => "user-requested exit",
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics of a general (non-Lanczos) solve.
#[derive(Debug, Clone)]
pub struct SimpleStats<T> {
    /// Cumulative number of inner iterations.
    pub niter: usize,
    /// Whether the tolerance was met.
    pub solved: bool,
    /// Whether the system was detected to be inconsistent.
    pub inconsistent: bool,
    /// Residual norm history, one entry per recorded iteration.
    ///
    /// Empty unless the `history` option is set; grows on demand.
    pub residuals: Vec<T>,
    /// Terminal status.
    pub status: SolverStatus,
}

impl<T> Default for SimpleStats<T> {
    fn default() -> Self {
        Self {
            niter: 0,
            solved: false,
            inconsistent: false,
            residuals: Vec::new(),
            status: SolverStatus::Unknown,
        }
    }
}

impl<T> SimpleStats<T> {
    /// Clear the record before a new solve on a reused workspace.
    pub fn reset(&mut self) {
        self.niter = 0;
        self.solved = false;
        self.inconsistent = false;
        self.residuals.clear();
        self.status = SolverStatus::Unknown;
    }
}

/// Statistics of a Lanczos-based solve.
#[derive(Debug, Clone, Default)]
pub struct LanczosStats<T> {
    /// Number of iterations.
    pub niter: usize,
    /// Whether the tolerance was met.
    pub solved: bool,
    /// Whether a non-positive curvature direction was encountered.
    pub indefinite: bool,
    /// Estimate of the operator norm, from the Frobenius norm of the
    /// Lanczos tridiagonal.
    pub anorm: T,
    /// Residual norm history (`M`-norm), one entry per recorded iteration.
    pub residuals: Vec<T>,
    /// Terminal status.
    pub status: SolverStatus,
}

impl<T: num_traits::Zero> LanczosStats<T> {
    /// Clear the record before a new solve on a reused workspace.
    pub fn reset(&mut self) {
        self.niter = 0;
        self.solved = false;
        self.indefinite = false;
        self.anorm = T::zero();
        self.residuals.clear();
        self.status = SolverStatus::Unknown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_are_stable() {
        assert_eq!(SolverStatus::Unknown.to_string(), "unknown");
        assert_eq!(
            SolverStatus::ZeroResidual.to_string(),
            "x = 0 is a zero-residual solution"
        );
        assert_eq!(
            SolverStatus::SolutionGoodEnough.to_string(),
            "solution good enough given atol and rtol"
        );
        assert_eq!(
            SolverStatus::MaxIterations.to_string(),
            "maximum number of iterations exceeded"
        );
        assert_eq!(SolverStatus::NegativeCurvature.to_string(), "negative curvature");
        assert_eq!(
            SolverStatus::LeastSquaresSolution.to_string(),
            "found approximate least-squares solution"
        );
        assert_eq!(SolverStatus::UserRequestedExit.to_string(), "user-requested exit");
    }

    #[test]
    fn reset_clears_everything() {
        let mut stats = SimpleStats::<f64> {
            niter: 7,
            solved: true,
            inconsistent: true,
            residuals: vec![1.0, 0.5],
            status: SolverStatus::SolutionGoodEnough,
        };
        stats.reset();
        assert_eq!(stats.niter, 0);
        assert!(!stats.solved);
        assert!(!stats.inconsistent);
        assert!(stats.residuals.is_empty());
        assert_eq!(stats.status, SolverStatus::Unknown);
    }

    #[test]
    fn lanczos_reset_clears_anorm() {
        let mut stats = LanczosStats::<f64> {
            niter: 3,
            solved: true,
            indefinite: true,
            anorm: 4.2,
            residuals: vec![0.1],
            status: SolverStatus::NegativeCurvature,
        };
        stats.reset();
        assert_eq!(stats.anorm, 0.0);
        assert!(!stats.indefinite);
        assert_eq!(stats.status, SolverStatus::Unknown);
    }
}
