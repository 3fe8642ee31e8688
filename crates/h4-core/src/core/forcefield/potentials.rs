use std::f64::consts::FRAC_PI_2;

/// Lower donor-acceptor distance (Å) at which the radial factor starts.
pub const HB_R_0: f64 = 1.5;
/// Donor-acceptor distance (Å) beyond which no hydrogen bond is counted.
pub const HB_R_CUTOFF: f64 = 5.5;
/// Donor-hydrogen distance (Å) above which the bond-switching factor decays.
pub const MAX_XH_BOND: f64 = 1.15;

/// Ratio between the outer and inner radius of the continuous-valence switch.
pub const VALENCE_CUTOFF_SCALE: f64 = 1.6;

// Radial polynomial in r_DA, highest power first.
const RADIAL_COEFFICIENTS: [f64; 8] = [
    -0.00303407407407313510,
    0.07357629629627092382,
    -0.70087111111082800452,
    3.25309629629461749545,
    -7.20687407406838786983,
    5.31754666665572184314,
    3.40736000001102778967,
    -4.68512000000450434811,
];

/// Septic switching polynomial `35x⁴ − 84x⁵ + 70x⁶ − 20x⁷` and its derivative.
///
/// Rises from 0 at `x = 0` to 1 at `x = 1` with the first three derivatives vanishing at
/// both ends. Arguments outside `[0, 1]` are clamped.
#[inline]
pub fn septic_switch(x: f64) -> (f64, f64) {
    if x <= 0.0 {
        return (0.0, 0.0);
    }
    if x >= 1.0 {
        return (1.0, 0.0);
    }
    let x3 = x * x * x;
    let value = x3 * x * (35.0 + x * (-84.0 + x * (70.0 - 20.0 * x)));
    let one_minus = 1.0 - x;
    let derivative = 140.0 * x3 * one_minus * one_minus * one_minus;
    (value, derivative)
}

/// Radial factor of the H4 term and its derivative with respect to `r_DA`.
///
/// Zero with zero slope at `HB_R_0` and `HB_R_CUTOFF`, minimum of -1 at 3.0 Å. Outside the
/// open interval the factor is exactly zero.
#[inline]
pub fn radial(r: f64) -> (f64, f64) {
    if r <= HB_R_0 || r >= HB_R_CUTOFF {
        return (0.0, 0.0);
    }
    let mut value = 0.0;
    let mut derivative = 0.0;
    for &c in &RADIAL_COEFFICIENTS {
        derivative = derivative * r + value;
        value = value * r + c;
    }
    (value, derivative)
}

/// Angular factor `1 − s7(φ/(π/2))²` and its derivative with respect to `φ`.
///
/// `φ` is the deviation of the D-H···A angle from linearity.
#[inline]
pub fn angular(phi: f64) -> (f64, f64) {
    let (s, ds) = septic_switch(phi / FRAC_PI_2);
    (1.0 - s * s, -2.0 * s * ds / FRAC_PI_2)
}

/// Bond-switching factor for a hydrogen shared between donor and acceptor.
///
/// Returns the factor and its derivatives with respect to `r_DH` and `r_AH`. The factor is
/// 1 for a covalently bound hydrogen and reaches 0 when the hydrogen sits midway.
#[inline]
pub fn bond_switch(r_dh: f64, r_ah: f64) -> (f64, f64, f64) {
    if r_dh <= MAX_XH_BOND {
        return (1.0, 0.0, 0.0);
    }
    let numerator = r_dh - MAX_XH_BOND;
    let denominator = 0.5 * (r_dh + r_ah) - MAX_XH_BOND;
    let (s, ds) = septic_switch(numerator / denominator);
    let d_denominator2 = denominator * denominator;
    let d_r_dh = -ds * (denominator - 0.5 * numerator) / d_denominator2;
    let d_r_ah = -ds * (-0.5 * numerator) / d_denominator2;
    (1.0 - s, d_r_dh, d_r_ah)
}

/// Smooth bond count between two atoms and its derivative with respect to distance.
///
/// `r0` is the sum of covalent radii; the count falls from 1 at `r0` to 0 at
/// `VALENCE_CUTOFF_SCALE * r0`.
#[inline]
pub fn continuous_valence(r: f64, r0: f64) -> (f64, f64) {
    let r1 = VALENCE_CUTOFF_SCALE * r0;
    if r <= r0 {
        return (1.0, 0.0);
    }
    if r >= r1 {
        return (0.0, 0.0);
    }
    let width = r1 - r0;
    let (s, ds) = septic_switch((r - r0) / width);
    (1.0 - s, -ds / width)
}

/// Tent function `max(0, 1 − |d|)` and its derivative (0 at the apex).
#[inline]
pub fn triangle(d: f64) -> (f64, f64) {
    if d.abs() >= 1.0 {
        (0.0, 0.0)
    } else if d == 0.0 {
        (1.0, 0.0)
    } else {
        (1.0 - d.abs(), -d.signum())
    }
}

/// Water-donor weight as a function of the donor's hydrogen valence.
///
/// Peaks at exactly two hydrogens and fades linearly to zero at one and three.
#[inline]
pub fn water_weight(hydrogen_valence: f64) -> (f64, f64) {
    let v = hydrogen_valence;
    if v > 1.0 && v <= 2.0 {
        (v - 1.0, 1.0)
    } else if v > 2.0 && v < 3.0 {
        (3.0 - v, -1.0)
    } else {
        (0.0, 0.0)
    }
}

/// Charged-nitrogen weight: `clamp(V − 3, 0, 1)` and its derivative.
#[inline]
pub fn ammonium_weight(valence: f64) -> (f64, f64) {
    if valence <= 3.0 {
        (0.0, 0.0)
    } else if valence < 4.0 {
        (valence - 3.0, 1.0)
    } else {
        (1.0, 0.0)
    }
}

/// Sigmoidal H-H repulsion `k/(1 + exp(x))`, `x = e(r/r0 − 1)`, and its derivative.
///
/// The exponential is only ever taken of a non-positive argument, so large `|e|` saturates
/// to `k` or 0 instead of overflowing.
#[inline]
pub fn hh_repulsion(r: f64, k: f64, exponent: f64, r0: f64) -> (f64, f64) {
    let x = exponent * (r / r0 - 1.0);
    // t = exp(-|x|) in (0, 1]; the logistic and its slope follow from t alone.
    let t = (-x.abs()).exp();
    let one_plus = 1.0 + t;
    let energy = if x < 0.0 {
        k / one_plus
    } else {
        k * t / one_plus
    };
    let derivative = -k * exponent * t / (r0 * one_plus * one_plus);
    (energy, derivative)
}

/// Smooth cutoff that is 1 below `on`, 0 at and beyond `off`.
#[inline]
pub fn cutoff_switch(r: f64, on: f64, off: f64) -> (f64, f64) {
    if r <= on {
        return (1.0, 0.0);
    }
    if r >= off {
        return (0.0, 0.0);
    }
    let width = off - on;
    let (s, ds) = septic_switch((r - on) / width);
    (1.0 - s, -ds / width)
}
