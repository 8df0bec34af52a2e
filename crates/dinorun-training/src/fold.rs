/// Triangle-wave style folding applied to every bred parameter.
///
/// `zigzag(x) = sign(x) · ((x mod 2) − 2·(x mod 1)) · (2·((x mod 2) − (x mod 1)) − 1)`
///
/// `mod` takes the sign of the divisor and `sign(0) = 0`. The function is
/// neither a clamp nor monotonic: `zigzag(0.5) = 0.5`, `zigzag(1.5) = 0.5`,
/// `zigzag(-0.5) = -0.5`.
///
/// # Example
///
/// ```
/// use dinorun_training::zigzag;
///
/// assert_eq!(zigzag(0.0), 0.0);
/// assert_eq!(zigzag(1.0), 1.0);
/// assert_eq!(zigzag(-1.0), -1.0);
/// assert_eq!(zigzag(2.5), 0.5);
/// ```
#[must_use]
pub fn zigzag(x: f64) -> f64 {
    let mod2 = x.rem_euclid(2.0);
    let mod1 = x.rem_euclid(1.0);
    sign(x) * (mod2 - 2.0 * mod1) * (2.0 * (mod2 - mod1) - 1.0)
}

/// Sign with `sign(0) = 0`; `f64::signum` maps zero to one.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        // zero or NaN
        x
    }
}
