//! Euler–Maruyama integration of the double-well Langevin system.
//!
//! The state of every trajectory is a `(p, q)` pair held in two `Array1<f64>`
//! buffers that advance in lockstep. One step reads the forces from the state
//! before the step, moves the position with the old momentum, then kicks the
//! momentum:
//!
//! ```text
//! q ← q + p·dt
//! p ← p + (−V'(q_old) − γ·p_old)·dt + ξ·sqrt(2·dt·γ/β),   ξ ~ N(0, 1)
//! ```
//!
//! Step `i` leaves the system at simulated time `(i + 1)·dt`; it is saved when
//! that time lies past the burn-in (`i >= floor(t_burnin / dt)`) and
//! `i % save_every == 0`. Integration runs until the `n_save` rows of the
//! output are written and stops there, so the shape is always
//! `(n_save, batch, 2)`. Steps after the last snapshot of the window never
//! reach the output and are not simulated.
use crate::generator::{
    errors::GeneratorResult,
    params::{FpuParams, IntegratorOpts},
};
use ndarray::{Array1, Array3, Zip, s};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

/// Simulate `opts.batch` trajectories seeded from `opts.seed`.
///
/// # Returns
/// An `(n_save, batch, 2)` `f32` array; `[.., .., 0]` is momentum and
/// `[.., .., 1]` is position.
///
/// # Errors
/// Any validation error of [`FpuParams`] / [`IntegratorOpts`].
///
/// # Examples
/// ```rust
/// use rust_sinn::generator::{FpuParams, IntegratorOpts, fpu};
///
/// let opts = IntegratorOpts::new(0.01, 0.1, 1.0, 3.0, 8, Some(7)).unwrap();
/// let traj = fpu(&FpuParams::default(), &opts).unwrap();
/// assert_eq!(traj.dim(), (20, 8, 2));
/// ```
pub fn fpu(params: &FpuParams, opts: &IntegratorOpts) -> GeneratorResult<Array3<f32>> {
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    fpu_with_rng(params, opts, &mut rng)
}

/// Same as [`fpu`] but draws the Gaussian impulses from a caller-owned RNG;
/// `opts.seed` is ignored.
pub fn fpu_with_rng<R: Rng + ?Sized>(
    params: &FpuParams, opts: &IntegratorOpts, rng: &mut R,
) -> GeneratorResult<Array3<f32>> {
    fpu_with_noise(params, opts, |noise| {
        noise.mapv_inplace(|_| rng.sample::<f64, _>(StandardNormal));
    })
}

/// Same as [`fpu`] but the caller fills the standard-normal draws of every
/// step. `fill_noise` receives a length-`batch` buffer once per step.
///
/// Useful for deterministic runs (e.g. all-zero forcing) and for replaying a
/// recorded noise sequence.
pub fn fpu_with_noise<F>(
    params: &FpuParams, opts: &IntegratorOpts, mut fill_noise: F,
) -> GeneratorResult<Array3<f32>>
where
    F: FnMut(&mut Array1<f64>),
{
    params.validate()?;
    opts.validate()?;

    let dt = opts.dt;
    let batch = opts.batch;
    let save_every = opts.save_every();
    let burnin_steps = opts.burnin_steps();
    let n_save = opts.n_save();
    let noise_scale = params.noise_scale(dt);

    #[cfg(feature = "obs_slog")]
    let logger = opts.verbose.then(crate::logging::term_logger);
    #[cfg(feature = "obs_slog")]
    if let Some(log) = &logger {
        slog::info!(log, "fpu: start";
            "batch" => batch, "burnin_steps" => burnin_steps,
            "save_every" => save_every, "n_save" => n_save);
    }

    let mut result = Array3::<f32>::zeros((n_save, batch, 2));
    let mut p = Array1::<f64>::zeros(batch);
    let mut q = Array1::<f64>::zeros(batch);
    let mut noise = Array1::<f64>::zeros(batch);

    let mut i_save = 0;
    let mut i = 0;
    while i_save < n_save {
        fill_noise(&mut noise);
        Zip::from(&mut p).and(&mut q).and(&noise).for_each(|p, q, &xi| {
            let f_conservative = -params.potential_gradient(*q);
            let f_dissipative = -params.gamma * *p;
            *q += *p * dt;
            *p += (f_conservative + f_dissipative) * dt + xi * noise_scale;
        });

        if i >= burnin_steps && i % save_every == 0 {
            let mut row = result.slice_mut(s![i_save, .., ..]);
            Zip::from(row.rows_mut()).and(&p).and(&q).for_each(|mut pair, &p, &q| {
                pair[0] = p as f32;
                pair[1] = q as f32;
            });
            i_save += 1;
        }
        i += 1;
    }

    #[cfg(feature = "obs_slog")]
    if let Some(log) = &logger {
        slog::info!(log, "fpu: done"; "steps" => i, "saved" => i_save);
    }

    Ok(result)
}
