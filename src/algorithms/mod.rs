///
/// Contains [`buchberger::buchberger()`], an implementation of Buchberger's algorithm
/// for computing Groebner bases, and the related multivariate division.
///
pub mod buchberger;
///
/// Contains [`independent_sets::independent_sets()`] and [`independent_sets::dimension()`],
/// which compute combinatorial invariants of an ideal from its leading monomials.
///
pub mod independent_sets;
///
/// Contains [`miller_rabin::is_prime()`], a deterministic primality test for `u64`.
///
pub mod miller_rabin;
///
/// Contains modular arithmetic for moduli that fit into a `u64`.
///
pub mod zn_ops;
