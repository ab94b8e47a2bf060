//! CG-Lanczos: the conjugate-gradient method derived from the Lanczos
//! process.
//!
//! Solves `Ax = b` for Hermitian `A`, optionally preconditioned by a
//! Hermitian positive-definite `M`. The solver maintains the M-orthonormal
//! Lanczos basis through the three-term recurrence
//!
//! ```text
//! beta[k+1] M v[k+1] = A v[k] - delta[k] M v[k] - beta[k] M v[k-1]
//! ```
//!
//! and derives the CG iterates from coupled short recursions, so only a
//! fixed set of vectors is carried regardless of the iteration count. The
//! monitored residual is `|r|_M`.
//!
//! The pivot `gamma[k]` has the sign of `p[k]ᴴ A p[k]`; a non-positive value
//! reveals a non-positive-definite curvature direction. With
//! `check_curvature` enabled the solve stops there; otherwise it records the
//! observation and keeps iterating. A pivot at round-off level is zero
//! curvature and always terminates the solve with status
//! "negative curvature", since the recurrence has no defined continuation.

use krylite_core::{LinearOperator, Scalar, apply_mul_or_div, vecops};
use log::info;
use num_traits::{Float, One, Zero};

use crate::error::{Error, Result};
use crate::stats::{LanczosStats, SolverStatus};

/// Per-iteration cancellation hook: receives the current iterate and the
/// running statistics, returns `true` to stop the solve.
pub type CgLanczosCallback<'a, FC> =
    &'a mut dyn FnMut(&[FC], &LanczosStats<<FC as Scalar>::Real>) -> bool;

/// CG-Lanczos solver configuration.
#[derive(Debug, Clone)]
pub struct CgLanczosConfig<T> {
    /// Absolute tolerance on the M-norm of the residual.
    pub atol: T,
    /// Relative tolerance on the M-norm of the residual.
    pub rtol: T,
    /// Iteration cap; `0` means `2n`.
    pub itmax: usize,
    /// Terminate with status "negative curvature" when a non-positive
    /// curvature direction is met. Enable this when the definiteness of `A`
    /// is uncertain: without it the method keeps iterating and the final
    /// iterate may not be meaningful.
    pub check_curvature: bool,
    /// Apply the preconditioner through left-division instead of
    /// multiplication.
    pub ldiv: bool,
    /// Record every residual norm in the stats history.
    pub history: bool,
    /// `0` disables logging; a positive value logs every that-many
    /// iterations.
    pub verbose: usize,
}

impl<T: Float> Default for CgLanczosConfig<T> {
    fn default() -> Self {
        Self {
            atol: T::epsilon().sqrt(),
            rtol: T::epsilon().sqrt(),
            itmax: 0,
            check_curvature: false,
            ldiv: false,
            history: false,
            verbose: 0,
        }
    }
}

/// Preallocated state of the CG-Lanczos method.
///
/// Create once per problem size and scalar type, then reuse across
/// arbitrarily many solves; no inner-loop allocation takes place. A
/// workspace must not be shared between concurrent solves.
pub struct CgLanczosWorkspace<FC: Scalar> {
    n: usize,
    x: Vec<FC>,
    dx: Vec<FC>,
    mv: Vec<FC>,
    mv_prev: Vec<FC>,
    mv_next: Vec<FC>,
    p: Vec<FC>,
    v: Vec<FC>,
    stats: LanczosStats<FC::Real>,
}

impl<FC: Scalar> CgLanczosWorkspace<FC> {
    /// Workspace for systems of size `n`.
    ///
    /// The warm-start buffer and the preconditioned direction are allocated
    /// lazily, on the first solve that needs them.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            x: vec![FC::zero(); n],
            dx: Vec::new(),
            mv: vec![FC::zero(); n],
            mv_prev: vec![FC::zero(); n],
            mv_next: vec![FC::zero(); n],
            p: vec![FC::zero(); n],
            v: Vec::new(),
            stats: LanczosStats {
                niter: 0,
                solved: false,
                indefinite: false,
                anorm: FC::Real::zero(),
                residuals: Vec::new(),
                status: SolverStatus::Unknown,
            },
        }
    }

    /// The solution of the last solve.
    pub fn solution(&self) -> &[FC] {
        &self.x
    }

    /// Statistics of the last solve.
    pub fn stats(&self) -> &LanczosStats<FC::Real> {
        &self.stats
    }

    /// Number of iterations of the last solve.
    pub fn niter(&self) -> usize {
        self.stats.niter
    }

    /// Whether the last solve met its tolerance.
    pub fn solved(&self) -> bool {
        self.stats.solved
    }

    /// Solve `Ax = b` from a cold start.
    pub fn solve(
        &mut self,
        a: &dyn LinearOperator<FC>,
        b: &[FC],
        config: &CgLanczosConfig<FC::Real>,
    ) -> Result<&LanczosStats<FC::Real>> {
        self.run(a, b, None, None, config, None)
    }

    /// Solve `Ax = b` starting from the guess `x0`.
    pub fn solve_warm(
        &mut self,
        a: &dyn LinearOperator<FC>,
        b: &[FC],
        x0: &[FC],
        config: &CgLanczosConfig<FC::Real>,
    ) -> Result<&LanczosStats<FC::Real>> {
        self.run(a, b, None, Some(x0), config, None)
    }

    /// Solve `Ax = b` with a Hermitian positive-definite preconditioner `m`.
    pub fn solve_preconditioned(
        &mut self,
        a: &dyn LinearOperator<FC>,
        b: &[FC],
        m: &dyn LinearOperator<FC>,
        config: &CgLanczosConfig<FC::Real>,
    ) -> Result<&LanczosStats<FC::Real>> {
        self.run(a, b, Some(m), None, config, None)
    }

    /// Full entry point: preconditioner, warm start, and callback are all
    /// optional.
    pub fn run(
        &mut self,
        a: &dyn LinearOperator<FC>,
        b: &[FC],
        m: Option<&dyn LinearOperator<FC>>,
        x0: Option<&[FC]>,
        config: &CgLanczosConfig<FC::Real>,
        mut callback: Option<CgLanczosCallback<'_, FC>>,
    ) -> Result<&LanczosStats<FC::Real>> {
        let n = self.n;
        if a.nrows() != a.ncols() {
            return Err(Error::NonSquareSystem {
                rows: a.nrows(),
                cols: a.ncols(),
            });
        }
        if a.ncols() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                actual: a.ncols(),
            });
        }
        if b.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                actual: b.len(),
            });
        }
        if let Some(mop) = m {
            if mop.nrows() != n || mop.ncols() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    actual: mop.nrows(),
                });
            }
        }
        if let Some(x0) = x0 {
            if x0.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    actual: x0.len(),
                });
            }
        }

        let warm = x0.is_some();
        let m_is_i = m.is_none();

        if !m_is_i && self.v.is_empty() {
            self.v = vec![FC::zero(); n];
        }
        if warm && self.dx.is_empty() {
            self.dx = vec![FC::zero(); n];
        }
        if let Some(x0) = x0 {
            self.dx.copy_from_slice(x0);
        }
        self.stats.reset();

        let Self {
            x,
            dx,
            mv,
            mv_prev,
            mv_next,
            p,
            v,
            stats,
            ..
        } = self;

        for xi in x.iter_mut() {
            *xi = FC::zero();
        }

        // Initial Lanczos direction: beta[1] M v[1] = r0.
        if warm {
            a.apply(dx, mv);
            vecops::axpby(FC::one(), b, -FC::one(), mv);
        } else {
            mv.copy_from_slice(b);
        }
        if let Some(mop) = m {
            apply_mul_or_div(mop, mv, v, config.ldiv);
        }
        let mut beta = if m_is_i {
            vecops::nrm2(mv)
        } else {
            vecops::dotr(v, mv).sqrt()
        };
        let mut sigma = beta;
        let mut rnorm = sigma;
        if config.history {
            stats.residuals.push(rnorm);
        }

        if beta == FC::Real::zero() {
            stats.niter = 0;
            stats.solved = true;
            stats.status = SolverStatus::ZeroResidual;
            if warm {
                vecops::axpy(FC::one(), dx, x);
            }
            return Ok(stats);
        }

        // p[1] = sigma[1] v[1], i.e. the yet-unnormalised first direction.
        p.copy_from_slice(if m_is_i { &*mv } else { &*v });

        let one_r = FC::Real::one();
        let inv_beta = FC::from_real(one_r / beta);
        if m_is_i {
            vecops::scal(inv_beta, mv);
        } else {
            vecops::scal(inv_beta, v);
            vecops::scal(inv_beta, mv);
        }
        mv_prev.copy_from_slice(mv);

        let itmax = if config.itmax == 0 { 2 * n } else { config.itmax };
        let mut iter = 0usize;
        let mut gamma = one_r;
        let mut omega = FC::Real::zero();
        let mut beta_prev = FC::Real::zero();
        let mut anorm2 = FC::Real::zero();

        // Pivot degeneracy threshold eps^(3/4), relative to the operator
        // norm estimate.
        let sqrt_eps = FC::Real::epsilon().sqrt();
        let ptol = sqrt_eps * sqrt_eps.sqrt();

        let epsilon = config.atol + config.rtol * rnorm;
        let mut solved = rnorm <= epsilon;
        let mut tired = iter >= itmax;
        let mut indefinite = false;
        let mut degenerate = false;
        let mut user_requested_exit = false;

        if config.verbose > 0 {
            info!("cg_lanczos: system of size {n}, initial residual {rnorm}");
        }

        while !(solved || tired || (config.check_curvature && indefinite) || user_requested_exit)
        {
            // Advance the Lanczos recurrence to v[k+1].
            if m_is_i {
                a.apply(mv, mv_next);
            } else {
                a.apply(v, mv_next);
            }
            let delta = if m_is_i {
                vecops::dotr(mv, mv_next)
            } else {
                vecops::dotr(v, mv_next)
            };
            vecops::axpy(FC::from_real(-delta), mv, mv_next);
            if iter > 0 {
                vecops::axpy(FC::from_real(-beta), mv_prev, mv_next);
                mv_prev.copy_from_slice(mv);
            }
            mv.copy_from_slice(mv_next);
            if let Some(mop) = m {
                apply_mul_or_div(mop, mv, v, config.ldiv);
            }
            beta = if m_is_i {
                vecops::nrm2(mv)
            } else {
                vecops::dotr(v, mv).sqrt()
            };
            let inv_beta = FC::from_real(one_r / beta);
            if m_is_i {
                vecops::scal(inv_beta, mv);
            } else {
                vecops::scal(inv_beta, v);
                vecops::scal(inv_beta, mv);
            }

            // Frobenius norm of the tridiagonal, as a growing estimate of |A|.
            anorm2 += beta_prev * beta_prev + beta * beta + delta * delta;
            beta_prev = beta;

            // The pivot has the sign of p[k]ᴴ A p[k]. A vanishing pivot is
            // zero curvature along p[k]: the recurrence cannot continue, so
            // the solve stops instead of dividing through to infinity.
            let pivot = delta - omega / gamma;
            if pivot.abs() <= ptol * anorm2.sqrt() {
                indefinite = true;
                degenerate = true;
                break;
            }
            gamma = one_r / pivot;
            if gamma <= FC::Real::zero() {
                indefinite = true;
            }
            if config.check_curvature && indefinite {
                continue;
            }

            vecops::axpy(FC::from_real(gamma), p, x);
            let bg = beta * gamma;
            sigma = -bg * sigma;
            omega = bg * bg;
            vecops::axpby(
                FC::from_real(sigma),
                if m_is_i { &*mv } else { &*v },
                FC::from_real(omega),
                p,
            );
            rnorm = sigma.abs();
            if config.history {
                stats.residuals.push(rnorm);
            }

            iter += 1;
            if config.verbose > 0 && iter % config.verbose == 0 {
                info!("cg_lanczos: iter {iter}, residual {rnorm}");
            }

            solved = rnorm <= epsilon || rnorm + one_r <= one_r;
            tired = iter >= itmax;
            if let Some(cb) = callback.as_mut() {
                user_requested_exit = cb(x, stats);
            }
        }

        stats.niter = iter;
        stats.solved = solved;
        stats.indefinite = indefinite;
        stats.anorm = anorm2.sqrt();
        stats.status = if user_requested_exit {
            SolverStatus::UserRequestedExit
        } else if solved {
            SolverStatus::SolutionGoodEnough
        } else if degenerate || (config.check_curvature && indefinite) {
            SolverStatus::NegativeCurvature
        } else {
            SolverStatus::MaxIterations
        };

        if warm {
            vecops::axpy(FC::one(), dx, x);
        }
        Ok(stats)
    }
}

/// Solve `Ax = b` with a freshly allocated workspace.
pub fn cg_lanczos<FC: Scalar>(
    a: &dyn LinearOperator<FC>,
    b: &[FC],
    config: &CgLanczosConfig<FC::Real>,
) -> Result<(Vec<FC>, LanczosStats<FC::Real>)> {
    let mut workspace = CgLanczosWorkspace::new(a.ncols());
    workspace.run(a, b, None, None, config, None)?;
    let CgLanczosWorkspace { x, stats, .. } = workspace;
    Ok((x, stats))
}

/// Solve `Ax = b` from the guess `x0` with a freshly allocated workspace.
pub fn cg_lanczos_warm<FC: Scalar>(
    a: &dyn LinearOperator<FC>,
    b: &[FC],
    x0: &[FC],
    config: &CgLanczosConfig<FC::Real>,
) -> Result<(Vec<FC>, LanczosStats<FC::Real>)> {
    let mut workspace = CgLanczosWorkspace::new(a.ncols());
    workspace.run(a, b, None, Some(x0), config, None)?;
    let CgLanczosWorkspace { x, stats, .. } = workspace;
    Ok((x, stats))
}
