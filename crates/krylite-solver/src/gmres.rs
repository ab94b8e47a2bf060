//! GMRES: the generalised minimal residual method.
//!
//! Solves `Ax = b` for general square `A`, minimising `|M(b - Ax)|` over the
//! affine Krylov subspace `x0 + N K_k(MAN, M r0)`, where `M` and `N` are the
//! optional left and right preconditioners. The Arnoldi basis is built with
//! modified Gram-Schmidt (optionally a second pass), and the Hessenberg
//! projection is triangularised incrementally with Givens reflections, so the
//! residual norm `|zeta[k+1]|` is available at every step without forming the
//! iterate.
//!
//! With `restart` enabled the basis is capped at `memory` vectors and the
//! method runs in passes; otherwise `memory` is only a storage hint and the
//! basis grows with the iteration count.

use krylite_core::{LinearOperator, Scalar, apply_mul_or_div, vecops};
use log::info;
use num_traits::{Float, One, Zero};

use crate::error::{Error, Result};
use crate::givens::sym_givens;
use crate::stats::{SimpleStats, SolverStatus};

/// Per-iteration cancellation hook: receives the running iterate and the
/// statistics, returns `true` to stop the solve. Within a pass the iterate
/// reflects the state at the last restart.
pub type GmresCallback<'a, FC> =
    &'a mut dyn FnMut(&[FC], &SimpleStats<<FC as Scalar>::Real>) -> bool;

/// GMRES solver configuration.
#[derive(Debug, Clone)]
pub struct GmresConfig<T> {
    /// Absolute tolerance on the preconditioned residual norm.
    pub atol: T,
    /// Relative tolerance on the preconditioned residual norm.
    pub rtol: T,
    /// Iteration cap; `0` means `2n`.
    pub itmax: usize,
    /// Basis size: the restart window when `restart` is set, otherwise an
    /// allocation hint. Used by the allocating entry points; an explicit
    /// workspace fixes its own capacity at construction.
    pub memory: usize,
    /// Run as GMRES(memory): assemble the iterate and restart once the basis
    /// fills up.
    pub restart: bool,
    /// Run a second Gram-Schmidt pass at every Arnoldi step.
    pub reorthogonalization: bool,
    /// Apply preconditioners through left-division instead of multiplication.
    pub ldiv: bool,
    /// Record every residual norm in the stats history.
    pub history: bool,
    /// `0` disables logging; a positive value logs every that-many
    /// iterations.
    pub verbose: usize,
}

impl<T: Float> Default for GmresConfig<T> {
    fn default() -> Self {
        Self {
            atol: T::epsilon().sqrt(),
            rtol: T::epsilon().sqrt(),
            itmax: 0,
            memory: 20,
            restart: false,
            reorthogonalization: false,
            ldiv: false,
            history: false,
            verbose: 0,
        }
    }
}

/// Preallocated state of the GMRES method.
///
/// Create once per problem size and scalar type, then reuse across
/// arbitrarily many solves. The only inner-loop allocation is the growth of
/// the basis past the memory hint when `restart` is disabled. A workspace
/// must not be shared between concurrent solves.
pub struct GmresWorkspace<FC: Scalar> {
    n: usize,
    memory: usize,
    x: Vec<FC>,
    dx: Vec<FC>,
    w: Vec<FC>,
    q: Vec<FC>,
    p: Vec<FC>,
    v: Vec<Vec<FC>>,
    c: Vec<FC::Real>,
    s: Vec<FC>,
    z: Vec<FC>,
    r: Vec<FC>,
    inner_iter: usize,
    stats: SimpleStats<FC::Real>,
}

impl<FC: Scalar> GmresWorkspace<FC> {
    /// Workspace for systems of size `n` with a basis capacity of `memory`
    /// vectors.
    ///
    /// The warm-start/restart accumulator and the preconditioner scratch
    /// vectors are allocated lazily, on the first solve that needs them.
    pub fn new(n: usize, memory: usize) -> Self {
        let memory = memory.max(1);
        Self {
            n,
            memory,
            x: vec![FC::zero(); n],
            dx: Vec::new(),
            w: vec![FC::zero(); n],
            q: Vec::new(),
            p: Vec::new(),
            v: (0..memory).map(|_| vec![FC::zero(); n]).collect(),
            c: vec![FC::Real::zero(); memory],
            s: vec![FC::zero(); memory],
            z: vec![FC::zero(); memory],
            r: vec![FC::zero(); memory * (memory + 1) / 2],
            inner_iter: 0,
            stats: SimpleStats::default(),
        }
    }

    /// The solution of the last solve.
    pub fn solution(&self) -> &[FC] {
        &self.x
    }

    /// Statistics of the last solve.
    pub fn stats(&self) -> &SimpleStats<FC::Real> {
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

    /// Number of inner iterations of the last pass.
    pub fn inner_iter(&self) -> usize {
        self.inner_iter
    }

    /// The Arnoldi basis vectors of the last pass; the first
    /// [`inner_iter`](Self::inner_iter) of them are valid.
    pub fn basis(&self) -> &[Vec<FC>] {
        &self.v
    }

    /// Solve `Ax = b` from a cold start.
    pub fn solve(
        &mut self,
        a: &dyn LinearOperator<FC>,
        b: &[FC],
        config: &GmresConfig<FC::Real>,
    ) -> Result<&SimpleStats<FC::Real>> {
        self.run(a, b, None, None, None, config, None)
    }

    /// Solve `Ax = b` starting from the guess `x0`.
    pub fn solve_warm(
        &mut self,
        a: &dyn LinearOperator<FC>,
        b: &[FC],
        x0: &[FC],
        config: &GmresConfig<FC::Real>,
    ) -> Result<&SimpleStats<FC::Real>> {
        self.run(a, b, None, None, Some(x0), config, None)
    }

    /// Solve `Ax = b` with optional left and right preconditioners.
    pub fn solve_preconditioned(
        &mut self,
        a: &dyn LinearOperator<FC>,
        b: &[FC],
        left: Option<&dyn LinearOperator<FC>>,
        right: Option<&dyn LinearOperator<FC>>,
        config: &GmresConfig<FC::Real>,
    ) -> Result<&SimpleStats<FC::Real>> {
        self.run(a, b, left, right, None, config, None)
    }

    /// Full entry point: preconditioners, warm start, and callback are all
    /// optional.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        a: &dyn LinearOperator<FC>,
        b: &[FC],
        left: Option<&dyn LinearOperator<FC>>,
        right: Option<&dyn LinearOperator<FC>>,
        x0: Option<&[FC]>,
        config: &GmresConfig<FC::Real>,
        mut callback: Option<GmresCallback<'_, FC>>,
    ) -> Result<&SimpleStats<FC::Real>> {
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
        for precond in [left, right].into_iter().flatten() {
            if precond.nrows() != n || precond.ncols() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    actual: precond.nrows(),
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
        let m_is_i = left.is_none();
        let restart = config.restart;
        let mem = self.memory;

        if !m_is_i && self.q.is_empty() {
            self.q = vec![FC::zero(); n];
        }
        if right.is_some() && self.p.is_empty() {
            self.p = vec![FC::zero(); n];
        }
        if (warm || restart) && self.dx.is_empty() {
            self.dx = vec![FC::zero(); n];
        }
        if let Some(x0) = x0 {
            self.dx.copy_from_slice(x0);
        }
        self.stats.reset();
        self.inner_iter = 0;

        let Self {
            x,
            dx,
            w,
            q,
            p,
            v,
            c,
            s,
            z,
            r,
            inner_iter,
            stats,
            ..
        } = self;

        for xi in x.iter_mut() {
            *xi = FC::zero();
        }

        // Initial residual r0 = M (b - A x0); r0 aliases w when M is absent.
        if warm {
            a.apply(dx, w);
            vecops::axpby(FC::one(), b, -FC::one(), w);
            if restart {
                vecops::axpy(FC::one(), dx, x);
            }
        } else {
            w.copy_from_slice(b);
        }
        if let Some(mop) = left {
            apply_mul_or_div(mop, w, q, config.ldiv);
        }
        let mut rnorm = if m_is_i { vecops::nrm2(w) } else { vecops::nrm2(q) };
        if config.history {
            stats.residuals.push(rnorm);
        }
        let epsilon = config.atol + config.rtol * rnorm;

        if rnorm == FC::Real::zero() {
            stats.niter = 0;
            stats.solved = true;
            stats.status = SolverStatus::ZeroResidual;
            if warm && !restart {
                vecops::axpy(FC::one(), dx, x);
            }
            return Ok(stats);
        }

        let itmax = if config.itmax == 0 { 2 * n } else { config.itmax };
        let mut iter = 0usize;
        let mut inner_itmax = itmax;
        let mut npass = 0usize;

        let one_r = FC::Real::one();
        // Breakdown and rank-deficiency threshold eps^(3/4).
        let sqrt_eps = FC::Real::epsilon().sqrt();
        let btol = sqrt_eps * sqrt_eps.sqrt();

        let mut solved = rnorm <= epsilon;
        let mut tired = false;
        let mut breakdown = false;
        let mut inconsistent = false;
        let mut user_requested_exit = false;

        if config.verbose > 0 {
            info!("gmres: system of size {n}, initial residual {rnorm}");
        }

        while !(solved || tired || breakdown || user_requested_exit) {
            npass += 1;
            let mut nr = 0usize;
            for vi in v.iter_mut() {
                for t in vi.iter_mut() {
                    *t = FC::zero();
                }
            }
            for t in c.iter_mut() {
                *t = FC::Real::zero();
            }
            for t in s.iter_mut() {
                *t = FC::zero();
            }
            for t in r.iter_mut() {
                *t = FC::zero();
            }
            for t in z.iter_mut() {
                *t = FC::zero();
            }

            if restart {
                for t in dx.iter_mut() {
                    *t = FC::zero();
                }
                if npass >= 2 {
                    a.apply(x, w);
                    vecops::axpby(FC::one(), b, -FC::one(), w);
                    if let Some(mop) = left {
                        apply_mul_or_div(mop, w, q, config.ldiv);
                    }
                }
            }

            // First basis vector and transformed right-hand side.
            let r0: &[FC] = if m_is_i { w } else { q };
            let beta = vecops::nrm2(r0);
            z[0] = FC::from_real(beta);
            v[0].copy_from_slice(r0);
            vecops::scal(FC::from_real(one_r / beta), &mut v[0]);

            *inner_iter = 0;
            let mut inner_tired = false;

            while !(solved || inner_tired || breakdown || user_requested_exit) {
                let k = *inner_iter;
                *inner_iter += 1;
                let count = k + 1;

                // Grow past the memory hint when not restarting; this is the
                // only allocation permitted inside the iteration. A reused
                // workspace may already have grown far enough.
                if !restart && count > mem {
                    if r.len() < nr + count {
                        r.resize(nr + count, FC::zero());
                    }
                    if s.len() < count {
                        s.push(FC::zero());
                    }
                    if c.len() < count {
                        c.push(FC::Real::zero());
                    }
                }

                // Arnoldi step: q <- M A N v[k].
                if let Some(nop) = right {
                    apply_mul_or_div(nop, &v[k], p, config.ldiv);
                    a.apply(p, w);
                } else {
                    a.apply(&v[k], w);
                }
                if let Some(mop) = left {
                    apply_mul_or_div(mop, w, q, config.ldiv);
                }

                // Modified Gram-Schmidt against the current basis.
                {
                    let qv: &mut [FC] = if m_is_i { w } else { q };
                    for i in 0..count {
                        let h = vecops::dot(&v[i], qv);
                        r[nr + i] = h;
                        vecops::axpy(-h, &v[i], qv);
                    }
                    if config.reorthogonalization {
                        for i in 0..count {
                            let h = vecops::dot(&v[i], qv);
                            r[nr + i] += h;
                            vecops::axpy(-h, &v[i], qv);
                        }
                    }
                }
                let hbis = vecops::nrm2(if m_is_i { &*w } else { &*q });

                // Apply the stored reflections to the new column of R.
                for i in 0..k {
                    let rtmp = r[nr + i].mul_real(c[i]) + s[i] * r[nr + i + 1];
                    r[nr + i + 1] =
                        s[i].conj() * r[nr + i] - r[nr + i + 1].mul_real(c[i]);
                    r[nr + i] = rtmp;
                }

                // New reflection zeroing the subdiagonal entry h[k+1,k].
                let (ck, sk, rho) = sym_givens(r[nr + k], FC::from_real(hbis));
                c[k] = ck;
                s[k] = sk;
                r[nr + k] = rho;

                let zeta_next = sk.conj() * z[k];
                z[k] = z[k].mul_real(ck);

                // |M (b - A x_k)| = |zeta[k+1]|.
                rnorm = zeta_next.abs();
                if config.history {
                    stats.residuals.push(rnorm);
                }

                nr += count;

                solved = rnorm <= epsilon || rnorm + one_r <= one_r;
                breakdown = hbis <= btol;
                inner_tired = if restart {
                    count >= mem.min(inner_itmax)
                } else {
                    count >= inner_itmax
                };

                if config.verbose > 0 && (iter + count) % config.verbose == 0 {
                    info!(
                        "gmres: pass {npass}, iter {}, residual {rnorm}",
                        iter + count
                    );
                }

                if !(solved || inner_tired || breakdown || user_requested_exit) {
                    if !restart && count >= mem {
                        if v.len() < count + 1 {
                            v.push(vec![FC::zero(); n]);
                        }
                        if z.len() < count + 1 {
                            z.push(FC::zero());
                        }
                    }
                    v[count].copy_from_slice(if m_is_i { &*w } else { &*q });
                    vecops::scal(FC::from_real(one_r / hbis), &mut v[count]);
                    z[count] = zeta_next;
                }

                if let Some(cb) = callback.as_mut() {
                    user_requested_exit = cb(x, stats);
                }
            }

            // Solve R y = z by back-substitution over the packed triangle;
            // a vanishing pivot marks the system inconsistent and the
            // corresponding coefficient is dropped.
            let count = *inner_iter;
            for i in (0..count).rev() {
                let mut pos = nr - count + i;
                for j in ((i + 1)..count).rev() {
                    let rij = r[pos];
                    z[i] = z[i] - rij * z[j];
                    pos -= j;
                }
                if r[pos].abs() <= btol {
                    z[i] = FC::zero();
                    inconsistent = true;
                } else {
                    z[i] = z[i] / r[pos];
                }
            }

            // Assemble x_r = N V y; it accumulates into x directly unless
            // restarting.
            {
                let xr: &mut [FC] = if restart { dx } else { x };
                for i in 0..count {
                    vecops::axpy(z[i], &v[i], xr);
                }
                if let Some(nop) = right {
                    p.copy_from_slice(xr);
                    apply_mul_or_div(nop, p, xr, config.ldiv);
                }
            }
            if restart {
                vecops::axpy(FC::one(), dx, x);
            }

            inner_itmax -= count;
            iter += count;
            tired = iter >= itmax;
        }

        stats.niter = iter;
        stats.solved = solved;
        stats.inconsistent = inconsistent;
        stats.status = if user_requested_exit {
            SolverStatus::UserRequestedExit
        } else if inconsistent {
            SolverStatus::LeastSquaresSolution
        } else if solved {
            SolverStatus::SolutionGoodEnough
        } else if tired {
            SolverStatus::MaxIterations
        } else {
            SolverStatus::Unknown
        };

        if warm && !restart {
            vecops::axpy(FC::one(), dx, x);
        }
        Ok(stats)
    }
}

/// Solve `Ax = b` with a freshly allocated workspace.
pub fn gmres<FC: Scalar>(
    a: &dyn LinearOperator<FC>,
    b: &[FC],
    config: &GmresConfig<FC::Real>,
) -> Result<(Vec<FC>, SimpleStats<FC::Real>)> {
    let mut workspace = GmresWorkspace::new(a.ncols(), config.memory);
    workspace.run(a, b, None, None, None, config, None)?;
    let GmresWorkspace { x, stats, .. } = workspace;
    Ok((x, stats))
}

/// Solve `Ax = b` from the guess `x0` with a freshly allocated workspace.
pub fn gmres_warm<FC: Scalar>(
    a: &dyn LinearOperator<FC>,
    b: &[FC],
    x0: &[FC],
    config: &GmresConfig<FC::Real>,
) -> Result<(Vec<FC>, SimpleStats<FC::Real>)> {
    let mut workspace = GmresWorkspace::new(a.ncols(), config.memory);
    workspace.run(a, b, None, None, Some(x0), config, None)?;
    let GmresWorkspace { x, stats, .. } = workspace;
    Ok((x, stats))
}
