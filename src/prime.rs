//! Prime sizing for bucket arrays.

/// Trial division by odd divisors up to `sqrt(n)`.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3usize;
    // d * d may overflow near usize::MAX.
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Smallest prime `>= n`, or `None` if it does not fit in `usize`.
pub fn checked_next_prime(n: usize) -> Option<usize> {
    let mut c = n;
    loop {
        if is_prime(c) {
            return Some(c);
        }
        c = c.checked_add(1)?;
    }
}

/// Smallest prime `>= n`.
///
/// # Panics
/// If no prime `>= n` fits in `usize`.
pub fn next_prime(n: usize) -> usize {
    checked_next_prime(n).expect("no prime >= n representable in usize")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_primes() {
        let primes: Vec<usize> = (0..40).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37]);
    }

    #[test]
    fn squares_of_primes_are_composite() {
        for p in [3usize, 5, 7, 11, 13, 97] {
            assert!(!is_prime(p * p), "{} should be composite", p * p);
        }
    }

    /// Invariant: `next_prime` is the identity on primes and rounds up otherwise.
    #[test]
    fn next_prime_rounds_up() {
        assert_eq!(next_prime(0), 2);
        assert_eq!(next_prime(1), 2);
        assert_eq!(next_prime(2), 2);
        assert_eq!(next_prime(17), 17);
        assert_eq!(next_prime(18), 19);
        assert_eq!(next_prime(34), 37);
        assert_eq!(next_prime(74), 79);
        assert_eq!(next_prime(158), 163);
    }

    #[test]
    fn checked_next_prime_overflows_to_none() {
        assert_eq!(checked_next_prime(usize::MAX), None);
    }
}
