//! Currency amount helpers.
//!
//! Amounts are decimal currency values with 2-digit cent precision at every
//! boundary. Equal splitting does not always divide evenly, so zero checks
//! throughout the engine use a tolerance of one minor currency unit.

/// One minor currency unit. Residues at or below this are treated as zero.
pub const CENT_EPSILON: f64 = 0.01;

/// Rounds an amount to 2 decimal places.
#[must_use]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Returns `true` when the amount is within one cent of zero.
#[must_use]
pub fn near_zero(amount: f64) -> bool {
    amount.abs() <= CENT_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_to_cents(33.333333), 33.33);
        assert_eq!(round_to_cents(66.666666), 66.67);
        assert_eq!(round_to_cents(0.004), 0.0);
        assert_eq!(round_to_cents(20.0), 20.0);
    }

    #[test]
    fn near_zero_tolerates_one_cent() {
        assert!(near_zero(0.0));
        assert!(near_zero(0.01));
        assert!(near_zero(-0.01));
        assert!(!near_zero(0.011));
    }
}
