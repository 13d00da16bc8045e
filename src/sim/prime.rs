//! Trial-division primality test

/// True if `n` is a prime integer.
///
/// Anything that is not a finite whole number >= 2 is reported as not prime,
/// so callers never have to pre-validate.
pub fn is_prime(n: f64) -> bool {
    if !n.is_finite() || n.fract() != 0.0 || n < 2.0 {
        return false;
    }
    // Beyond 2^64 the value cannot be represented exactly as an integer anyway
    if n >= u64::MAX as f64 {
        return false;
    }
    is_prime_u64(n as u64)
}

/// Integer form of [`is_prime`]
pub fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    // Candidates 6k-1 and 6k+1; everything else is a multiple of 2 or 3
    let limit = isqrt(n);
    let mut i = 5;
    while i <= limit {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// floor(sqrt(n)) without float rounding surprises
fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).is_none_or(|sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn naive(n: u64) -> bool {
        n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    #[test]
    fn test_small_values() {
        assert!(!is_prime(0.0));
        assert!(!is_prime(1.0));
        assert!(is_prime(2.0));
        assert!(is_prime(3.0));
        assert!(!is_prime(4.0));
        assert!(is_prime(5.0));
        assert!(is_prime(17.0));
        assert!(!is_prime(25.0));
        assert!(!is_prime(49.0));
        assert!(is_prime(97.0));
    }

    #[test]
    fn test_rejects_non_integers() {
        assert!(!is_prime(f64::NAN));
        assert!(!is_prime(f64::INFINITY));
        assert!(!is_prime(f64::NEG_INFINITY));
        assert!(!is_prime(-7.0));
        assert!(!is_prime(7.5));
        assert!(!is_prime(1e300));
    }

    #[test]
    fn test_square_of_prime_boundary() {
        // The divisor equals floor(sqrt(n)) exactly
        assert!(!is_prime_u64(121));
        assert!(!is_prime_u64(169));
        assert!(!is_prime_u64(1_000_000_007 * 3));
        assert!(is_prime_u64(1_000_000_007));
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(u64::MAX), u32::MAX as u64);
    }

    proptest! {
        #[test]
        fn matches_naive_trial_division(n in 0u64..20_000) {
            prop_assert_eq!(is_prime_u64(n), naive(n));
            prop_assert_eq!(is_prime(n as f64), naive(n));
        }

        #[test]
        fn below_two_is_never_prime(n in -1e9f64..2.0) {
            prop_assert!(!is_prime(n));
        }
    }
}
