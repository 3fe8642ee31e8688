//! Shared fixtures for the unit tests: small hydrogen-bonded systems with snapshot
//! energies, random perturbations and a finite-difference gradient.

use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::gradient::GradientField;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Regression snapshots of this implementation. The water-dimer pair also matches the
// closed forms evaluated by hand.
pub const WATER_DIMER_E_H4: f64 = -0.9680144088095307;
pub const WATER_DIMER_E_HH: f64 = 0.8913450291105611;
pub const BENT_WATER_DIMER_E_H4: f64 = -0.6517802450246716;
pub const AMMONIUM_FORMATE_E_H4: f64 = -5.312954076010687;
pub const AMMONIUM_FORMATE_E_HH: f64 = 2.2699599819886274;
pub const MIXED_E_H4: f64 = -5.135201097558349;
pub const MIXED_E_HH: f64 = 3.291696618351011;

const FD_STEP: f64 = 1e-5;

fn build(positions: &[[f64; 3]], numbers: &[i64]) -> AtomicConfiguration {
    AtomicConfiguration::from_parts(positions, numbers).unwrap()
}

/// Linear water dimer: the donor O-H points straight at the acceptor oxygen 2.91 Å away.
pub fn water_dimer() -> AtomicConfiguration {
    linear_water_dimer_at(2.91)
}

/// Linear water dimer with the acceptor oxygen at `(distance, 0, 0)`.
pub fn linear_water_dimer_at(distance: f64) -> AtomicConfiguration {
    build(
        &[
            [0.0, 0.0, 0.0],
            [0.9572, 0.0, 0.0],
            [-0.24, 0.9266, 0.0],
            [distance, 0.0, 0.0],
            [distance + 0.586, 0.0, 0.757],
            [distance + 0.586, 0.0, -0.757],
        ],
        &[8, 1, 1, 8, 1, 1],
    )
}

/// Water dimer with a stretched, off-axis donor O-H (fractional hydrogen valence).
pub fn bent_water_dimer() -> AtomicConfiguration {
    build(
        &[
            [0.0, 0.0, 0.0],
            [1.25, 0.35, 0.1],
            [-0.3, 0.93, 0.0],
            [2.85, 0.2, -0.3],
            [3.3, 0.95, 0.1],
            [3.4, -0.3, -0.95],
        ],
        &[8, 1, 1, 8, 1, 1],
    )
}

/// Ammonium donating to a formate oxygen.
pub fn ammonium_formate() -> AtomicConfiguration {
    build(
        &[
            [0.0, 0.0, 0.0],
            [1.2, 0.1, 0.0],
            [-0.35, 0.97, 0.0],
            [-0.35, -0.5, 0.85],
            [-0.35, -0.5, -0.85],
            [2.95, 0.4, 0.2],
            [4.4, 1.15, 0.2],
            [4.7, 2.35, 0.3],
            [5.4, 0.65, 0.2],
        ],
        &[7, 1, 1, 1, 1, 8, 6, 8, 1],
    )
}

/// Ammonia, water and a second ammonia: O-H...N, N-H...O and N-H...N contacts.
pub fn mixed_nitrogen_oxygen() -> AtomicConfiguration {
    build(
        &[
            [0.0, 0.0, 0.0],
            [-0.38, 0.94, 0.0],
            [-0.38, -0.47, 0.82],
            [-0.38, -0.47, -0.82],
            [2.95, 0.1, 0.05],
            [1.99, 0.05, 0.02],
            [3.25, 0.9, 0.4],
            [-1.16, 2.87, 0.0],
            [-0.85, 3.8, 0.1],
            [-1.5, 2.6, 0.95],
            [-2.1, 2.95, -0.35],
        ],
        &[7, 1, 1, 1, 8, 1, 1, 7, 1, 1, 1],
    )
}

/// A bare O-H...O contact with the acceptor 1.95 Å from the hydrogen, `phi` radians off the
/// donor-hydrogen axis.
pub fn hydroxyl_bridge(phi: f64) -> AtomicConfiguration {
    build(
        &[
            [-0.9572, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.95 * phi.cos(), 1.95 * phi.sin(), 0.0],
        ],
        &[8, 1, 8],
    )
}

pub fn hydrogen_bonded_systems() -> Vec<(&'static str, AtomicConfiguration)> {
    vec![
        ("water dimer", water_dimer()),
        ("bent water dimer", bent_water_dimer()),
        ("ammonium formate", ammonium_formate()),
        ("mixed nitrogen/oxygen", mixed_nitrogen_oxygen()),
    ]
}

pub fn water_dimer_h4_gradient() -> GradientField {
    let mut rows = [[0.0; 3]; 6];
    rows[0] = [0.14255194659949016, 0.0, 0.0];
    rows[3] = [-0.14255194659949016, 0.0, 0.0];
    GradientField::from_rows(&rows)
}

pub fn water_dimer_hh_gradient() -> GradientField {
    GradientField::from_rows(&[
        [0.0, 0.0, 0.0],
        [0.44690526705638123, 0.017161697240747616, 0.0],
        [0.022713007351940147, -0.017295500419464076, 0.0],
        [0.0, 0.0, 0.0],
        [-0.23480913720416066, 6.690158935822953e-05, -0.09804285735133059],
        [-0.23480913720416066, 6.690158935822953e-05, 0.09804285735133059],
    ])
}

/// `count` copies of `base` with every coordinate displaced uniformly within `±amplitude`.
pub fn perturbed(
    base: &AtomicConfiguration,
    count: u64,
    amplitude: f64,
) -> Vec<AtomicConfiguration> {
    (0..count)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let offsets: Vec<Vector3<f64>> = (0..base.len())
                .map(|_| {
                    Vector3::new(
                        rng.gen_range(-amplitude..amplitude),
                        rng.gen_range(-amplitude..amplitude),
                        rng.gen_range(-amplitude..amplitude),
                    )
                })
                .collect();
            with_positions(base, |i, p| p + offsets[i])
        })
        .collect()
}

fn with_positions<F>(base: &AtomicConfiguration, shift: F) -> AtomicConfiguration
where
    F: Fn(usize, &Point3<f64>) -> Point3<f64>,
{
    let mut atoms = base.atoms().to_vec();
    for (i, atom) in atoms.iter_mut().enumerate() {
        atom.position = shift(i, &atom.position);
    }
    AtomicConfiguration::new(atoms).unwrap()
}

/// Central-difference gradient of `energy` with respect to every coordinate.
pub fn finite_difference_gradient<F>(config: &AtomicConfiguration, energy: F) -> GradientField
where
    F: Fn(&AtomicConfiguration) -> f64,
{
    let vectors = (0..config.len())
        .map(|atom| {
            let mut g = Vector3::zeros();
            for axis in 0..3 {
                let mut step = Vector3::zeros();
                step[axis] = FD_STEP;
                let displaced = |sign: f64| {
                    with_positions(config, |i, p| if i == atom { p + step * sign } else { *p })
                };
                g[axis] = (energy(&displaced(1.0)) - energy(&displaced(-1.0))) / (2.0 * FD_STEP);
            }
            g
        })
        .collect();
    GradientField::from_vectors(vectors)
}

pub fn assert_gradient_close(
    analytic: &GradientField,
    numeric: &GradientField,
    tolerance: f64,
    label: &str,
) {
    assert_eq!(analytic.len(), numeric.len(), "{label}: gradient length");
    for (atom, (a, n)) in analytic.iter().zip(numeric.iter()).enumerate() {
        let deviation = (a - n).amax();
        assert!(
            deviation < tolerance,
            "{label}: atom {atom} analytic {a:?} vs numeric {n:?} (deviation {deviation:e})"
        );
    }
}
