#![allow(non_snake_case)]

//!
//! Fields, polynomial rings and ideals, where the derived invariants of an ideal
//! (Groebner basis, dimension, primary decomposition, ...) are computed on demand by
//! a computation engine, usually the computer algebra system Singular, and cached.
//!
//! The main type is [`ideal::Ideal`]. It lives in a [`ring::Ring`] or a [`qring::QuotientRing`],
//! which in turn is defined over a coefficient [`field::Field`]. Engines implement
//! [`engine::EngineBridge`]; besides the bridge to Singular in [`engine::singular`], the
//! crate contains the in-process [`engine::local::LocalEngine`], which is used by default.
//!

///
/// Contains [`error::AlgebraError`], the error type of this crate.
///
pub mod error;
///
/// Contains algorithms that are used internally, e.g. Buchberger's algorithm.
///
pub mod algorithms;
///
/// Contains [`field::Field`], the coefficient fields of polynomial rings.
///
pub mod field;
///
/// Contains monomials, monomial orderings and sparse multivariate polynomials.
///
pub mod multivariate;
///
/// Contains the textual syntax of polynomials, as understood by the engine.
///
pub mod syntax;
///
/// Contains [`ring::Ring`], the multivariate polynomial ring over a field.
///
pub mod ring;
///
/// Contains [`qring::QuotientRing`] and [`qring::AmbientRing`].
///
pub mod qring;
///
/// Contains [`ideal::Ideal`], and the cache of its derived invariants.
///
pub mod ideal;
///
/// Contains [`engine::EngineBridge`], the interface to the engines performing
/// computations on ideals, together with its implementations.
///
pub mod engine;
