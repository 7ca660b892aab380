//!
//! Arithmetic in `Z/pZ` for moduli that fit into an `u64`. All intermediate
//! products are computed in `u128`, so every function is valid for all
//! moduli `2 <= p < 2^64`.
//!

///
/// Computes `a * b mod p`.
///
pub fn mul_mod(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

pub fn add_mod(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 + b as u128) % p as u128) as u64
}

pub fn neg_mod(a: u64, p: u64) -> u64 {
    if a == 0 { 0 } else { p - a }
}

///
/// Computes `base^exp mod p` by square-and-multiply.
///
pub fn pow_mod(base: u64, mut exp: u64, p: u64) -> u64 {
    let mut result = 1 % p;
    let mut current = base % p;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, current, p);
        }
        current = mul_mod(current, current, p);
        exp >>= 1;
    }
    return result;
}

///
/// Computes the inverse of `a` modulo `p` using the extended Euclidean algorithm.
/// Returns `None` if `a` is not invertible.
///
pub fn inv_mod(a: u64, p: u64) -> Option<u64> {
    let (mut r0, mut r1) = (p as i128, (a % p) as i128);
    let (mut s0, mut s1) = (0i128, 1i128);
    while r1 != 0 {
        let q = r0 / r1;
        (r0, r1) = (r1, r0 - q * r1);
        (s0, s1) = (s1, s0 - q * s1);
    }
    if r0 != 1 {
        return None;
    }
    return Some(s0.rem_euclid(p as i128) as u64);
}

///
/// Euler's criterion: returns whether `a` is a square modulo the odd prime `p`.
/// Zero counts as a square.
///
pub fn is_quadratic_residue(a: u64, p: u64) -> bool {
    let a = a % p;
    if a == 0 || p == 2 {
        return true;
    }
    return pow_mod(a, (p - 1) / 2, p) == 1;
}

///
/// Computes a square root of `a` modulo the prime `p` using the Tonelli-Shanks
/// algorithm, or returns `None` if `a` is a quadratic non-residue.
///
/// Of the two square roots `r` and `p - r`, the smaller one is returned.
///
pub fn sqrt_mod(a: u64, p: u64) -> Option<u64> {
    let a = a % p;
    if a == 0 || p == 2 {
        return Some(a);
    }
    if !is_quadratic_residue(a, p) {
        return None;
    }
    let root = if p % 4 == 3 {
        pow_mod(a, (p + 1) / 4, p)
    } else {
        let mut q = p - 1;
        let mut s = 0;
        while q % 2 == 0 {
            q /= 2;
            s += 1;
        }
        let mut z = 2;
        while is_quadratic_residue(z, p) {
            z += 1;
        }
        let mut m = s;
        let mut c = pow_mod(z, q, p);
        let mut t = pow_mod(a, q, p);
        let mut r = pow_mod(a, (q + 1) / 2, p);
        while t != 1 {
            let mut i = 0;
            let mut t_pow = t;
            while t_pow != 1 {
                t_pow = mul_mod(t_pow, t_pow, p);
                i += 1;
            }
            let b = pow_mod(c, 1 << (m - i - 1), p);
            m = i;
            c = mul_mod(b, b, p);
            t = mul_mod(t, c, p);
            r = mul_mod(r, b, p);
        }
        r
    };
    return Some(std::cmp::min(root, p - root));
}

#[test]
fn test_inv_mod() {
    assert_eq!(Some(4), inv_mod(2, 7));
    assert_eq!(None, inv_mod(6, 9));
    assert_eq!(Some(1), inv_mod(1, 2));
    let p = (1 << 31) - 1;
    assert_eq!(1, mul_mod(inv_mod(123456789, p).unwrap(), 123456789, p));
}

#[test]
fn test_sqrt_mod() {
    assert_eq!(None, sqrt_mod(3, 7));
    assert_eq!(Some(2), sqrt_mod(4, 7));
    // 17 = 1 mod 8 exercises the general Tonelli-Shanks loop
    for a in 0..17 {
        if let Some(r) = sqrt_mod(a, 17) {
            assert_eq!(a, mul_mod(r, r, 17));
        } else {
            assert!(!is_quadratic_residue(a, 17));
        }
    }
    let p = 2147483629;
    let r = sqrt_mod(mul_mod(98765, 98765, p), p).unwrap();
    assert_eq!(mul_mod(98765, 98765, p), mul_mod(r, r, p));
}
