use super::zn_ops::{mul_mod, pow_mod};

///
/// Witnesses for which the Miller-Rabin test is known to be deterministic for
/// all `n < 2^64`.
///
const DETERMINISTIC_WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

///
/// Miller-Rabin primality test for 64-bit integers.
/// 
/// Since the witness set [`DETERMINISTIC_WITNESSES`] is known to detect every
/// composite below `2^64`, the result is always correct. Additionally, `k`
/// further witnesses are drawn from a PRNG seeded with `n`, so the function
/// will always yield the same output on the same input.
/// 
pub fn is_prime(n: u64, k: usize) -> bool {
    if n < 2 {
        return false;
    }
    for p in DETERMINISTIC_WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }
    let mut d = n - 1;
    let mut s = 0;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }
    let mut rng = oorandom::Rand64::new(n as u128);
    let random_witnesses = (0..k).map(|_| 2 + rng.rand_range(0..(n - 3)));
    for a in DETERMINISTIC_WITNESSES.into_iter().chain(random_witnesses) {
        let mut current = pow_mod(a, d, n);
        let mut miller_rabin_condition = current == 1;
        for _r in 0..s {
            miller_rabin_condition |= current == n - 1;
            if miller_rabin_condition {
                break;
            }
            current = mul_mod(current, current, n);
        }
        if !miller_rabin_condition {
            return false;
        }
    }
    return true;
}

#[test]
fn test_is_prime() {
    assert!(!is_prime(0, 5));
    assert!(!is_prime(1, 5));
    assert!(is_prime(2, 5));
    assert!(is_prime(37, 5));
    assert!(!is_prime(91, 5));
    assert!(is_prime(2147483647, 5));
    assert!(is_prime(2147481317, 5));
    // strong pseudoprime to the bases 2 and 3
    assert!(!is_prime(1373653, 0));
    assert!(!is_prime(3215031751, 0));
    assert!(is_prime(18446744073709551557, 2));
}
