use std::fmt::{Debug, Display};
use std::sync::Arc;

use tracing::{event, instrument, Level};

use crate::algorithms::buchberger::multivariate_division;
use crate::engine::*;
use crate::error::*;
use crate::field::FieldElement;
use crate::multivariate::*;
use crate::multivariate::polynomial::Polynomial;
use crate::qring::{AmbientRing, QuotientRing};
use crate::ring::Ring;
use crate::syntax;

use cache::*;

///
/// Contains [`cache::PropertyCache`], which stores the derived invariants of an ideal.
///
pub mod cache;

///
/// Contains [`extension::Extension`], the extension of an ideal to the polynomial ring
/// over the rational function field in some of the variables.
///
pub mod extension;

///
/// An ideal in a polynomial ring or a quotient ring, given by a list of generators.
///
/// All derived invariants (Groebner basis, dimension, primary decomposition, ...) are
/// computed lazily on first access by the [`EngineBridge`] the ideal was created with,
/// and then cached. Whenever the generators or the ambient ring change, all cached
/// values are invalidated, so an access never returns a value that belongs to an older
/// state of the ideal. The cache is thread-safe, i.e. if an invariant is requested by
/// multiple threads at once, it is computed only once.
///
/// The zero ideal (no nonzero generator) and ideals with a constant generator are
/// handled locally where the answer does not depend on the engine.
///
/// # Example
/// ```
/// # use std::sync::Arc;
/// # use feanor_ideals::field::*;
/// # use feanor_ideals::ring::*;
/// # use feanor_ideals::ideal::*;
/// # use feanor_ideals::multivariate::*;
/// let ring = Arc::new(Ring::new(Field::rationals(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap());
/// let ideal = Ideal::parse(ring.clone(), &["x^2 - y", "x*y - 1"]).unwrap();
/// assert_eq!(0, ideal.dimension().unwrap());
/// assert_eq!(2, ideal.codimension().unwrap());
/// assert!(ideal.contains(&ring.parse("y^3 - 1").unwrap()).unwrap());
/// ```
///
pub struct Ideal {
    ring: AmbientRing,
    generators: Vec<Polynomial>,
    engine: Arc<dyn EngineBridge>,
    cache: PropertyCache
}

///
/// Result of [`Ideal::test_valid_ideal()`].
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityReport {
    defects: Vec<String>
}

impl ValidityReport {

    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn defects(&self) -> &[String] {
        &self.defects
    }
}

fn check_generators(ring: &AmbientRing, generators: &[Polynomial]) -> Result<()> {
    for f in generators {
        ring.base().check(f)?;
    }
    return Ok(());
}

fn unparseable_output(e: AlgebraError) -> AlgebraError {
    AlgebraError::Engine(EngineError::unparseable(format!("{}", e)))
}

impl Ideal {

    ///
    /// Creates the ideal generated by the given polynomials, using the default engine
    /// (see [`crate::engine::default_engine()`]).
    ///
    pub fn new<R: Into<AmbientRing>>(ring: R, generators: Vec<Polynomial>) -> Result<Self> {
        Self::with_engine(ring, generators, default_engine())
    }

    pub fn with_engine<R: Into<AmbientRing>>(ring: R, generators: Vec<Polynomial>, engine: Arc<dyn EngineBridge>) -> Result<Self> {
        let ring = ring.into();
        check_generators(&ring, &generators)?;
        Ok(Ideal { ring, generators, engine, cache: PropertyCache::new() })
    }

    ///
    /// Creates the ideal generated by the given polynomials, given in engine syntax.
    ///
    pub fn parse<R: Into<AmbientRing>>(ring: R, generators: &[&str]) -> Result<Self> {
        let ring = ring.into();
        let generators = generators.iter().map(|f| ring.base().parse(f)).collect::<Result<Vec<_>>>()?;
        Self::new(ring, generators)
    }

    ///
    /// Creates a new ideal over the same ring using the same engine.
    ///
    fn derive(&self, generators: Vec<Polynomial>) -> Ideal {
        Ideal { ring: self.ring.clone(), generators, engine: self.engine.clone(), cache: PropertyCache::new() }
    }

    pub fn ring(&self) -> &AmbientRing {
        &self.ring
    }

    ///
    /// Returns the polynomial ring whose elements represent the elements of the ambient ring.
    ///
    pub fn base_ring(&self) -> &Arc<Ring> {
        self.ring.base()
    }

    pub fn generators(&self) -> &[Polynomial] {
        &self.generators
    }

    ///
    /// Returns the generators in engine syntax.
    ///
    pub fn generator_strings(&self) -> Vec<String> {
        self.generators.iter().map(|f| self.base_ring().format(f)).collect()
    }

    pub fn engine(&self) -> &Arc<dyn EngineBridge> {
        &self.engine
    }

    ///
    /// Replaces the generators of this ideal, which invalidates all cached properties.
    ///
    pub fn set_generators(&mut self, generators: Vec<Polynomial>) -> Result<()> {
        check_generators(&self.ring, &generators)?;
        self.generators = generators;
        self.delete_cached_properties();
        return Ok(());
    }

    ///
    /// Deletes all cached properties, so that they are recomputed on next access.
    ///
    pub fn delete_cached_properties(&self) {
        self.cache.invalidate_all();
    }

    pub fn is_cached(&self, invariant: Invariant) -> bool {
        self.cache.is_cached(invariant)
    }

    ///
    /// Returns whether no generator is nonzero. Note that in a quotient ring, an ideal
    /// might be zero even though this returns `false`.
    ///
    pub fn is_zero(&self) -> bool {
        self.generators.iter().all(|f| f.is_zero())
    }

    fn has_unit_generator(&self) -> bool {
        self.generators.iter().any(|f| f.is_unit())
    }

    fn zero_in_free_ring(&self) -> bool {
        self.is_zero() && !self.ring.is_quotient()
    }

    fn request(&self, operation: EngineOperation) -> EngineRequest {
        EngineRequest {
            ring: self.ring.description(),
            generators: self.generator_strings(),
            operation
        }
    }

    fn run(&self, operation: EngineOperation) -> Result<EngineValue> {
        run_session(self.engine.as_ref(), &self.request(operation))
    }

    fn parse_output(&self, polys: Vec<String>) -> Result<Vec<Polynomial>> {
        polys.iter().map(|f| self.base_ring().parse(f)).collect::<Result<Vec<_>>>().map_err(unparseable_output)
    }

    fn compute_polynomials(&self, operation: EngineOperation) -> Result<Derived> {
        let polys = self.run(operation)?.into_polynomials()?;
        Ok(Derived::Polynomials(self.parse_output(polys)?))
    }

    fn get_polynomials<F>(&self, invariant: Invariant, compute: F) -> Result<Vec<Polynomial>>
        where F: FnOnce() -> Result<Derived>
    {
        match self.cache.get_or_try_init(invariant, compute)? {
            Derived::Polynomials(result) => Ok(result),
            other => panic!("invariant {:?} cached as {:?}", invariant, other)
        }
    }

    fn get_integer<F>(&self, invariant: Invariant, compute: F) -> Result<i64>
        where F: FnOnce() -> Result<Derived>
    {
        match self.cache.get_or_try_init(invariant, compute)? {
            Derived::Integer(result) => Ok(result),
            other => panic!("invariant {:?} cached as {:?}", invariant, other)
        }
    }

    ///
    /// Returns the reduced Groebner basis w.r.t. the monomial ordering of the ring.
    ///
    /// In a quotient ring, the elements of the modulus are left out, i.e. together
    /// with the Groebner basis of the modulus, this gives a Groebner basis of the preimage
    /// of this ideal in the base ring.
    ///
    #[instrument(skip_all, level = "trace")]
    pub fn groebner_basis(&self) -> Result<Vec<Polynomial>> {
        self.get_polynomials(Invariant::GroebnerBasis, || {
            if self.has_unit_generator() {
                Ok(Derived::Polynomials(vec![self.base_ring().one()]))
            } else if self.is_zero() {
                Ok(Derived::Polynomials(Vec::new()))
            } else {
                self.compute_polynomials(EngineOperation::GroebnerBasis)
            }
        })
    }

    ///
    /// Returns a minimal generating set of the ideal.
    ///
    pub fn minimal_base(&self) -> Result<Vec<Polynomial>> {
        self.get_polynomials(Invariant::MinimalBase, || {
            if self.has_unit_generator() {
                Ok(Derived::Polynomials(vec![self.base_ring().one()]))
            } else if self.is_zero() {
                Ok(Derived::Polynomials(Vec::new()))
            } else {
                self.compute_polynomials(EngineOperation::MinimalBase)
            }
        })
    }

    ///
    /// Returns the Krull dimension of the quotient of the ambient ring by this ideal,
    /// or `-1` if this is the unit ideal.
    ///
    pub fn dimension(&self) -> Result<i64> {
        self.get_integer(Invariant::Dimension, || {
            if self.has_unit_generator() {
                Ok(Derived::Integer(-1))
            } else if self.zero_in_free_ring() {
                Ok(Derived::Integer(self.base_ring().variable_count() as i64))
            } else {
                Ok(Derived::Integer(self.run(EngineOperation::Dimension)?.into_integer()?))
            }
        })
    }

    ///
    /// Returns the codimension `n - dim(I)`, where `n` is the number of variables.
    /// For the unit ideal, this is `n + 1`.
    ///
    pub fn codimension(&self) -> Result<i64> {
        self.get_integer(Invariant::Codimension, || {
            let n = self.base_ring().variable_count() as i64;
            let dim = self.dimension()?;
            Ok(Derived::Integer(if dim < 0 { n + 1 } else { n - dim }))
        })
    }

    ///
    /// Returns the codimension of each associated prime, in the order of
    /// [`Ideal::primary_decomposition()`].
    ///
    pub fn codimensions(&self) -> Result<Vec<i64>> {
        let result = self.cache.get_or_try_init(Invariant::Codimensions, || {
            let decomposition = self.primary_decomposition()?;
            Ok(Derived::Integers(decomposition.iter().map(|(_, prime)| prime.codimension()).collect::<Result<Vec<_>>>()?))
        })?;
        match result {
            Derived::Integers(result) => Ok(result),
            other => panic!("codimensions cached as {:?}", other)
        }
    }

    ///
    /// Returns the radical of this ideal, as new ideal over the same ring.
    ///
    pub fn radical(&self) -> Result<Ideal> {
        let generators = self.get_polynomials(Invariant::Radical, || {
            if self.has_unit_generator() {
                Ok(Derived::Polynomials(vec![self.base_ring().one()]))
            } else if self.zero_in_free_ring() {
                Ok(Derived::Polynomials(Vec::new()))
            } else {
                self.compute_polynomials(EngineOperation::Radical)
            }
        })?;
        return Ok(self.derive(generators));
    }

    ///
    /// Returns the primary decomposition, as list of pairs `(Q, P)` of a primary component
    /// `Q` and its associated prime `P`. For the unit ideal, the result is empty.
    ///
    #[instrument(skip_all, level = "trace")]
    pub fn primary_decomposition(&self) -> Result<Vec<(Ideal, Ideal)>> {
        let result = self.cache.get_or_try_init(Invariant::PrimaryDecomposition, || {
            if self.has_unit_generator() {
                return Ok(Derived::Decomposition(Vec::new()));
            }
            let decomposition = self.run(EngineOperation::PrimaryDecomposition)?.into_decomposition()?;
            let decomposition = decomposition.into_iter()
                .map(|(primary, prime)| Ok((self.parse_output(primary)?, self.parse_output(prime)?)))
                .collect::<Result<Vec<_>>>()?;
            event!(Level::DEBUG, components = decomposition.len(), "primary decomposition");
            Ok(Derived::Decomposition(decomposition))
        })?;
        match result {
            Derived::Decomposition(result) => Ok(result.into_iter().map(|(primary, prime)| (self.derive(primary), self.derive(prime))).collect()),
            other => panic!("primary decomposition cached as {:?}", other)
        }
    }

    ///
    /// Returns the leading monomials of the Groebner basis.
    ///
    pub fn leading_monomials(&self) -> Result<Vec<Monomial>> {
        let result = self.cache.get_or_try_init(Invariant::LeadingMonomials, || {
            let ring = self.base_ring();
            Ok(Derived::Monomials(self.groebner_basis()?.iter().filter_map(|f| ring.lm(f).cloned()).collect()))
        })?;
        match result {
            Derived::Monomials(result) => Ok(result),
            other => panic!("leading monomials cached as {:?}", other)
        }
    }

    ///
    /// Returns whether this is the unit ideal, i.e. the whole ring.
    ///
    pub fn is_unit(&self) -> Result<bool> {
        let result = self.cache.get_or_try_init(Invariant::IsUnit, || {
            if self.has_unit_generator() {
                Ok(Derived::Boolean(true))
            } else if self.is_zero() {
                Ok(Derived::Boolean(false))
            } else {
                let gb = self.groebner_basis()?;
                Ok(Derived::Boolean(gb.len() == 1 && gb[0].is_unit()))
            }
        })?;
        match result {
            Derived::Boolean(result) => Ok(result),
            other => panic!("unit flag cached as {:?}", other)
        }
    }

    ///
    /// Returns all maximal independent sets of variables, as `0/1`-vectors. The sets are
    /// sorted by size descending, so the first one is of maximal size, which is the dimension.
    ///
    pub fn independent_sets(&self) -> Result<Vec<Vec<i64>>> {
        let result = self.cache.get_or_try_init(Invariant::IndependentSets, || {
            let n = self.base_ring().variable_count();
            if self.has_unit_generator() {
                return Ok(Derived::IntegerVectors(Vec::new()));
            } else if self.zero_in_free_ring() {
                return Ok(Derived::IntegerVectors(vec![vec![1; n]]));
            }
            let mut sets = self.run(EngineOperation::IndependentSets)?.into_integer_vectors()?;
            if sets.iter().any(|set| set.len() != n) {
                return Err(EngineError::unparseable(format!("independent sets must have length {}", n)).into());
            }
            sets.sort_by_key(|set| -set.iter().sum::<i64>());
            Ok(Derived::IntegerVectors(sets))
        })?;
        match result {
            Derived::IntegerVectors(result) => Ok(result),
            other => panic!("independent sets cached as {:?}", other)
        }
    }

    ///
    /// Returns an independent set of maximal size, or `None` for the unit ideal.
    ///
    pub fn independent_set(&self) -> Result<Option<Vec<i64>>> {
        Ok(self.independent_sets()?.into_iter().next())
    }

    ///
    /// Evaluates the generators at the given values of some of the variables, and
    /// returns the resulting polynomials.
    ///
    pub fn generators_eval(&self, values: &[(&str, FieldElement)]) -> Result<Vec<Polynomial>> {
        let ring = self.base_ring();
        for (_, value) in values {
            if !ring.field().contains(value) {
                return Err(AlgebraError::Coercion(format!("{:?} is not an element of {}", value, ring.field())));
            }
        }
        self.generators.iter().map(|f| ring.substitute(f, values)).collect()
    }

    ///
    /// Returns the normal form of `f` modulo this ideal, which is zero if and only if `f`
    /// is contained in the ideal.
    ///
    /// For global orderings, this is done locally using the cached Groebner basis, otherwise
    /// the engine computes the normal form.
    ///
    pub fn reduce(&self, f: &Polynomial) -> Result<Polynomial> {
        let ring = self.base_ring();
        ring.check(f)?;
        if !ring.ordering().is_global() {
            let result = self.run(EngineOperation::Reduce { polynomial: ring.format(f) })?.into_polynomials()?;
            let result = self.parse_output(result)?;
            return match <[Polynomial; 1]>::try_from(result) {
                Ok([result]) => Ok(result),
                Err(result) => Err(EngineError::unparseable(format!("expected a single normal form, got {} polynomials", result.len())).into())
            };
        }
        let mut reducers = self.groebner_basis()?;
        if let Some(modulus) = self.ring.modulus() {
            reducers.extend(modulus.groebner_basis()?);
        }
        return Ok(multivariate_division(ring.field(), f.clone(), reducers.iter(), ring.ordering())?);
    }

    pub fn contains(&self, f: &Polynomial) -> Result<bool> {
        Ok(self.reduce(f)?.is_zero())
    }

    fn check_same_ring(&self, other: &Ideal) -> Result<()> {
        if self.ring != other.ring {
            return Err(AlgebraError::RingMismatch(format!("{} and {}", self.ring, other.ring)));
        }
        return Ok(());
    }

    ///
    /// Returns whether `other` is contained in this ideal.
    ///
    pub fn contains_ideal(&self, other: &Ideal) -> Result<bool> {
        self.check_same_ring(other)?;
        for f in &other.generators {
            if !self.contains(f)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    ///
    /// Returns whether both ideals live in the same ring and are equal as sets.
    ///
    pub fn is_equal(&self, other: &Ideal) -> Result<bool> {
        if self.ring != other.ring {
            return Ok(false);
        }
        Ok(self.contains_ideal(other)? && other.contains_ideal(self)?)
    }

    ///
    /// Computes the elimination ideal `I ∩ k[Y]`, where `Y` are all variables except the
    /// given ones. The result lives in the polynomial ring in the remaining variables.
    ///
    /// If this ideal lives in a quotient ring, the preimage in the base ring is used.
    ///
    #[instrument(skip_all, level = "trace")]
    pub fn eliminate(&self, variables: &[&str]) -> Result<Ideal> {
        let ring = self.base_ring();
        if !ring.ordering().is_global() {
            return Err(AlgebraError::Ordering(format!("cannot eliminate variables w.r.t. the local ordering {}", ring.ordering())));
        }
        let mut eliminated = Vec::new();
        for name in variables {
            let index = ring.variable_index(name)?;
            if !eliminated.contains(&index) {
                eliminated.push(index);
            }
        }
        if eliminated.len() == ring.variable_count() {
            return Err(AlgebraError::Arity(format!("cannot eliminate all variables of {}", ring)));
        }
        let kept = (0..ring.variable_count()).filter(|i| !eliminated.contains(i)).collect::<Vec<_>>();
        // fixed-size block orderings do not fit the smaller ring
        let ordering = match ring.ordering().fixed_variable_count() {
            Some(_) => MonomialOrdering::DegRevLex,
            None => ring.ordering().clone()
        };
        let result_ring = Arc::new(Ring::new(ring.field().clone(), kept.iter().map(|i| ring.variables()[*i].clone()), ordering)?);

        let mut generators = self.generator_strings();
        if let Some(modulus) = self.ring.modulus() {
            generators.extend(modulus.generator_strings());
        }
        let request = EngineRequest {
            ring: AmbientRing::Free(ring.clone()).description(),
            generators,
            operation: EngineOperation::Eliminate { variables: eliminated.iter().map(|i| ring.variables()[*i].clone()).collect() }
        };
        let result = self.parse_output(run_session(self.engine.as_ref(), &request)?.into_polynomials()?)?;
        if let Some(f) = result.iter().find(|f| f.appearing_variables().iter().any(|i| eliminated.contains(i))) {
            return Err(EngineError::unparseable(format!("elimination result {} contains eliminated variables", ring.format(f))).into());
        }
        let result = result.iter().map(|f| f.restrict(&kept).normalize(ring.field(), result_ring.ordering())).collect();
        event!(Level::DEBUG, eliminated = eliminated.len(), remaining = kept.len(), "eliminated variables");
        return Ideal::with_engine(result_ring, result, self.engine.clone());
    }

    ///
    /// Computes the intersection of all given ideals, which must live in the same ring.
    ///
    #[instrument(skip_all, level = "trace")]
    pub fn intersection(ideals: &[&Ideal]) -> Result<Ideal> {
        let (first, others) = ideals.split_first().ok_or_else(|| AlgebraError::Arity("intersection of no ideals".to_owned()))?;
        for other in others {
            first.check_same_ring(other)?;
        }
        if others.is_empty() {
            return Ok(first.derive(first.generators.clone()));
        }
        let operation = EngineOperation::Intersect { others: others.iter().map(|other| other.generator_strings()).collect() };
        let result = first.parse_output(first.run(operation)?.into_polynomials()?)?;
        return Ok(first.derive(result));
    }

    pub fn intersect(&self, other: &Ideal) -> Result<Ideal> {
        Self::intersection(&[self, other])
    }

    ///
    /// Returns the ideal `I + J`.
    ///
    pub fn sum(&self, other: &Ideal) -> Result<Ideal> {
        self.check_same_ring(other)?;
        Ok(self.derive(self.generators.iter().chain(other.generators.iter()).cloned().collect()))
    }

    ///
    /// Returns the ideal `I * J`, generated by all products of generators.
    ///
    pub fn product(&self, other: &Ideal) -> Result<Ideal> {
        self.check_same_ring(other)?;
        let ring = self.base_ring();
        let mut generators = Vec::new();
        for f in &self.generators {
            for g in &other.generators {
                let product = ring.mul(f, g)?;
                if !product.is_zero() {
                    generators.push(product);
                }
            }
        }
        Ok(self.derive(generators))
    }

    ///
    /// Returns the ideal `I^k`. In particular, `I^0` is the unit ideal.
    ///
    pub fn power(&self, k: u32) -> Result<Ideal> {
        let mut result = self.derive(vec![self.base_ring().one()]);
        for _ in 0..k {
            result = result.product(self)?;
        }
        return Ok(result);
    }

    ///
    /// Returns the ideal quotient `I : J = { f | f * J ⊆ I }`.
    ///
    pub fn quotient(&self, other: &Ideal) -> Result<Ideal> {
        self.check_same_ring(other)?;
        if other.is_zero() {
            return Ok(self.derive(vec![self.base_ring().one()]));
        }
        let result = self.parse_output(self.run(EngineOperation::Quotient { divisor: other.generator_strings() })?.into_polynomials()?)?;
        return Ok(self.derive(result));
    }

    ///
    /// Considers this ideal as ideal in the quotient of the current base ring by `modulus`.
    /// The generators remain unchanged, but all cached properties are invalidated.
    ///
    pub fn to_qring(&mut self, modulus: Ideal) -> Result<()> {
        let qring = QuotientRing::new(self.base_ring().clone(), modulus)?;
        self.ring = AmbientRing::Quotient(Arc::new(qring));
        self.delete_cached_properties();
        return Ok(());
    }

    ///
    /// Considers this ideal as ideal in the base ring of the current ambient ring.
    /// The generators remain unchanged, but all cached properties are invalidated.
    ///
    pub fn to_full_ring(&mut self) {
        self.ring = AmbientRing::Free(self.base_ring().clone());
        self.delete_cached_properties();
    }

    ///
    /// Checks that the generators fit to the ring, without contacting the engine.
    ///
    pub fn test_valid_ideal(&self) -> ValidityReport {
        let ring = self.base_ring();
        let mut defects = Vec::new();
        for (i, f) in self.generators.iter().enumerate() {
            if f.variable_count() != ring.variable_count() {
                defects.push(format!("generator {} has {} variables, but ring has {}", i, f.variable_count(), ring.variable_count()));
            } else if let Some((c, _)) = f.terms().find(|(c, _)| !ring.field().contains(c)) {
                defects.push(format!("generator {} has coefficient {:?} outside of {}", i, c, ring.field()));
            } else if f.terms().any(|(c, _)| ring.field().is_zero(c)) {
                defects.push(format!("generator {} stores a zero coefficient", i));
            }
        }
        if let Some(modulus) = self.ring.modulus() {
            defects.extend(modulus.test_valid_ideal().defects.into_iter().map(|defect| format!("modulus: {}", defect)));
        }
        return ValidityReport { defects };
    }

    ///
    /// Replaces the generators by a minimal generating set, which invalidates all cached properties.
    ///
    pub fn squoosh(&mut self) -> Result<()> {
        let generators = self.minimal_base()?;
        event!(Level::DEBUG, before = self.generators.len(), after = generators.len(), "squoosh");
        self.generators = generators;
        self.delete_cached_properties();
        return Ok(());
    }

    ///
    /// Parses a monomial in the variables of the ring, see [`syntax::monomial_to_exponents()`].
    ///
    pub fn monomial_to_exponents(&self, text: &str) -> Result<Monomial> {
        syntax::monomial_to_exponents(self.base_ring().variables(), text)
    }
}

///
/// Computes the normal form of `f` modulo the ideal generated by `generators`.
///
pub fn reduce<R: Into<AmbientRing>>(ring: R, f: &Polynomial, generators: &[Polynomial]) -> Result<Polynomial> {
    Ideal::new(ring, generators.to_vec())?.reduce(f)
}

impl Clone for Ideal {

    fn clone(&self) -> Self {
        Ideal {
            ring: self.ring.clone(),
            generators: self.generators.clone(),
            engine: self.engine.clone(),
            cache: self.cache.clone()
        }
    }
}

impl Display for Ideal {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.generator_strings().join(", "))
    }
}

impl Debug for Ideal {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ideal{} in {:?}", self, self.ring)
    }
}

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use crate::field::Field;
#[cfg(test)]
use crate::engine::local::LocalEngine;

#[cfg(test)]
fn test_ring(variables: &[&str], ordering: MonomialOrdering) -> Arc<Ring> {
    Arc::new(Ring::new(Field::rationals(), variables.iter().copied(), ordering).unwrap())
}

#[cfg(test)]
fn counting_engine() -> Arc<CountingEngine> {
    Arc::new(CountingEngine::new(Arc::new(LocalEngine::default())))
}

#[cfg(test)]
fn ideal_with(ring: &Arc<Ring>, generators: &[&str], engine: &Arc<CountingEngine>) -> Ideal {
    let generators = generators.iter().map(|f| ring.parse(f).unwrap()).collect();
    Ideal::with_engine(ring.clone(), generators, engine.clone()).unwrap()
}

#[cfg(test)]
fn formatted(ring: &Ring, polys: &[Polynomial]) -> Vec<String> {
    polys.iter().map(|f| ring.format(f)).collect()
}

///
/// Answers some operations with fixed values, and forwards all others to a [`LocalEngine`].
///
#[cfg(test)]
struct ScriptedEngine {
    answers: HashMap<&'static str, EngineValue>,
    fallback: LocalEngine
}

#[cfg(test)]
impl EngineBridge for ScriptedEngine {

    fn invoke(&self, request: &EngineRequest) -> std::result::Result<EngineValue, EngineError> {
        match self.answers.get(request.operation.name()) {
            Some(answer) => Ok(answer.clone()),
            None => self.fallback.invoke(request)
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[test]
fn test_scenario() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let ideal = ideal_with(&ring, &["x^2 - y", "x*y - 1"], &engine);
    assert_eq!(vec!["x^2-y", "x*y-1", "y^2-x"], formatted(&ring, &ideal.groebner_basis().unwrap()));
    assert_eq!(0, ideal.dimension().unwrap());
    assert_eq!(2, ideal.codimension().unwrap());
    assert!(!ideal.is_unit().unwrap());

    // the pure-y polynomial appears in the elimination ideal and in the lex Groebner basis
    let eliminated = ideal.eliminate(&["x"]).unwrap();
    assert_eq!(vec!["y^3-1"], formatted(eliminated.base_ring(), eliminated.generators()));

    let lex_ring = test_ring(&["x", "y"], MonomialOrdering::Lex);
    let lex_ideal = ideal_with(&lex_ring, &["x^2 - y", "x*y - 1"], &engine);
    let gb = lex_ideal.groebner_basis().unwrap();
    assert!(gb.iter().any(|f| f.appearing_variables() == vec![1]));
}

#[test]
fn test_idempotence() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let ideal = ideal_with(&ring, &["x^2 - y", "x*y - 1"], &engine);
    for _ in 0..3 {
        ideal.groebner_basis().unwrap();
        ideal.dimension().unwrap();
        ideal.codimension().unwrap();
        ideal.independent_sets().unwrap();
        ideal.leading_monomials().unwrap();
        ideal.is_unit().unwrap();
    }
    assert_eq!(1, engine.count("groebner_basis"));
    assert_eq!(1, engine.count("dimension"));
    assert_eq!(1, engine.count("independent_sets"));
    assert_eq!(3, engine.total());
    assert!(ideal.is_cached(Invariant::LeadingMonomials));
}

#[test]
fn test_concurrent_access() {
    let ring = test_ring(&["x", "y", "z"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let ideal = ideal_with(&ring, &["x^2*y - z", "x*z^2 - y", "y^2 - x*z"], &engine);
    let expected = LocalEngine::default().invoke(&ideal.request(EngineOperation::GroebnerBasis)).unwrap().into_polynomials().unwrap();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(expected, formatted(&ring, &ideal.groebner_basis().unwrap()));
            });
        }
    });
    assert_eq!(1, engine.count("groebner_basis"));
}

#[test]
fn test_invalidation() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let mut ideal = ideal_with(&ring, &["x", "x*y", "y^2"], &engine);

    assert_eq!(0, ideal.dimension().unwrap());
    ideal.squoosh().unwrap();
    assert_eq!(2, ideal.generators().len());
    assert!(!ideal.is_cached(Invariant::Dimension));
    assert_eq!(0, ideal.dimension().unwrap());
    assert_eq!(2, engine.count("dimension"));

    ideal.set_generators(vec![ring.parse("x").unwrap()]).unwrap();
    assert!(!ideal.is_cached(Invariant::Dimension));
    assert_eq!(1, ideal.dimension().unwrap());
    assert_eq!(3, engine.count("dimension"));

    ideal.delete_cached_properties();
    assert_eq!(1, ideal.dimension().unwrap());
    assert_eq!(4, engine.count("dimension"));

    ideal.to_qring(Ideal::parse(ring.clone(), &["y"]).unwrap()).unwrap();
    assert_eq!(0, ideal.dimension().unwrap());
    assert_eq!(5, engine.count("dimension"));
    ideal.to_full_ring();
    assert_eq!(1, ideal.dimension().unwrap());
    assert_eq!(6, engine.count("dimension"));

    let eliminated = ideal.eliminate(&["x"]).unwrap();
    assert!(!eliminated.is_cached(Invariant::Dimension));
    assert!(eliminated.is_zero());
}

#[test]
fn test_invalid_generators() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let other_ring = test_ring(&["x", "y", "z"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let mut ideal = ideal_with(&ring, &["x"], &engine);
    assert_eq!(1, ideal.dimension().unwrap());
    assert!(matches!(ideal.set_generators(vec![other_ring.parse("z").unwrap()]), Err(AlgebraError::Arity(_))));
    // a rejected update does not touch the cache
    assert!(ideal.is_cached(Invariant::Dimension));
    assert!(Ideal::new(ring.clone(), vec![other_ring.parse("z").unwrap()]).is_err());
}

#[test]
fn test_zero_ideal() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let ideal = ideal_with(&ring, &[], &engine);
    assert!(ideal.groebner_basis().unwrap().is_empty());
    assert!(ideal.minimal_base().unwrap().is_empty());
    assert_eq!(2, ideal.dimension().unwrap());
    assert_eq!(0, ideal.codimension().unwrap());
    assert_eq!(vec![vec![1, 1]], ideal.independent_sets().unwrap());
    assert!(!ideal.is_unit().unwrap());
    assert!(ideal.radical().unwrap().is_zero());
    assert!(ideal.reduce(&ring.parse("x + 1").unwrap()).unwrap() == ring.parse("x + 1").unwrap());
    assert_eq!(0, engine.total());

    let zero_generator = ideal_with(&ring, &["0"], &engine);
    assert!(zero_generator.is_zero());
    assert_eq!(2, zero_generator.dimension().unwrap());
    assert_eq!(0, engine.total());
}

#[test]
fn test_unit_ideal() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let ideal = ideal_with(&ring, &["x", "3"], &engine);
    assert_eq!(vec!["1"], formatted(&ring, &ideal.groebner_basis().unwrap()));
    assert_eq!(vec!["1"], formatted(&ring, &ideal.minimal_base().unwrap()));
    assert_eq!(-1, ideal.dimension().unwrap());
    assert_eq!(3, ideal.codimension().unwrap());
    assert!(ideal.is_unit().unwrap());
    assert!(ideal.primary_decomposition().unwrap().is_empty());
    assert!(ideal.codimensions().unwrap().is_empty());
    assert_eq!(Vec::<Vec<i64>>::new(), ideal.independent_sets().unwrap());
    assert_eq!(None, ideal.independent_set().unwrap());
    assert_eq!(vec!["1"], formatted(&ring, ideal.radical().unwrap().generators()));
    assert!(ideal.contains(&ring.parse("x*y + 7").unwrap()).unwrap());
    assert_eq!(0, engine.total());

    // a unit ideal that is not recognizable from its generators
    let hidden_unit = ideal_with(&ring, &["x*y - 1", "x"], &engine);
    assert!(hidden_unit.is_unit().unwrap());
    assert_eq!(-1, hidden_unit.dimension().unwrap());
    assert_eq!(3, hidden_unit.codimension().unwrap());
}

#[test]
fn test_ring_mismatch() {
    let ring7 = Arc::new(Ring::new(Field::finite_field(7).unwrap(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap());
    let ring11 = Arc::new(Ring::new(Field::finite_field(11).unwrap(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap());
    let lhs = Ideal::parse(ring7.clone(), &["x"]).unwrap();
    let rhs = Ideal::parse(ring11, &["y"]).unwrap();
    assert!(matches!(Ideal::intersection(&[&lhs, &rhs]), Err(AlgebraError::RingMismatch(_))));
    assert!(matches!(lhs.sum(&rhs), Err(AlgebraError::RingMismatch(_))));
    assert!(matches!(lhs.contains_ideal(&rhs), Err(AlgebraError::RingMismatch(_))));
    assert!(!lhs.is_equal(&rhs).unwrap());
    assert!(matches!(Ideal::intersection(&[]), Err(AlgebraError::Arity(_))));

    let same = Ideal::parse(Arc::new(Ring::new(Field::finite_field(7).unwrap(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap()), &["y"]).unwrap();
    let intersection = Ideal::intersection(&[&lhs, &same]).unwrap();
    assert_eq!(vec!["x*y"], formatted(&ring7, intersection.generators()));
}

#[test]
fn test_eliminate() {
    let ring = test_ring(&["x", "y", "z"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let ideal = ideal_with(&ring, &["x - y^2", "y - z^3"], &engine);

    let eliminated = ideal.eliminate(&["y"]).unwrap();
    assert_eq!(&["x".to_owned(), "z".to_owned()][..], eliminated.base_ring().variables());
    for f in eliminated.generators() {
        assert!(ideal.contains(&f.embed(&[0, 2], 3)).unwrap());
    }
    assert_eq!(vec!["z^6-x"], formatted(eliminated.base_ring(), eliminated.generators()));

    assert!(matches!(ideal.eliminate(&["w"]), Err(AlgebraError::Arity(_))));
    assert!(matches!(ideal.eliminate(&["x", "y", "z"]), Err(AlgebraError::Arity(_))));

    let local_ring = test_ring(&["x", "y"], MonomialOrdering::NegDegRevLex);
    let local_ideal = Ideal::parse(local_ring, &["x - y"]).unwrap();
    assert!(matches!(local_ideal.eliminate(&["x"]), Err(AlgebraError::Ordering(_))));

    let block_ring = test_ring(&["x", "y", "z"], MonomialOrdering::Block(vec![(MonomialOrdering::DegRevLex, 1), (MonomialOrdering::Lex, 2)]));
    let block_ideal = Ideal::parse(block_ring, &["x - y^2", "y - z^3"]).unwrap();
    let eliminated = block_ideal.eliminate(&["x"]).unwrap();
    assert_eq!(&MonomialOrdering::DegRevLex, eliminated.base_ring().ordering());
    assert_eq!(vec!["z^3-y"], formatted(eliminated.base_ring(), eliminated.generators()));
}

#[test]
fn test_reduce() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let ideal = Ideal::parse(ring.clone(), &["x^2 - y", "x*y - 1"]).unwrap();
    let p = ring.parse("x^3*y + 2*y^2 - x + 5").unwrap();
    let r = ideal.reduce(&p).unwrap();
    assert!(!r.is_zero());
    assert!(ideal.reduce(&ring.sub(&p, &r)).unwrap().is_zero());
    assert!(ideal.contains(&ring.parse("x^3 - 1").unwrap()).unwrap());
    assert!(!ideal.contains(&ring.parse("x - 1").unwrap()).unwrap());
    assert_eq!(r, reduce(ring.clone(), &p, ideal.generators()).unwrap());

    let other_ring = test_ring(&["x", "y", "z"], MonomialOrdering::DegRevLex);
    assert!(ideal.reduce(&other_ring.parse("z").unwrap()).is_err());
}

#[test]
fn test_ideal_arithmetic() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let i = Ideal::parse(ring.clone(), &["x"]).unwrap();
    let j = Ideal::parse(ring.clone(), &["y"]).unwrap();

    let sum = i.sum(&j).unwrap();
    assert_eq!(0, sum.dimension().unwrap());
    let product = i.product(&j).unwrap();
    assert_eq!(vec!["x*y"], formatted(&ring, product.generators()));
    assert!(product.is_equal(&i.intersect(&j).unwrap()).unwrap());
    assert!(i.contains_ideal(&product).unwrap());
    assert!(!product.contains_ideal(&i).unwrap());

    assert!(i.power(0).unwrap().is_unit().unwrap());
    assert_eq!(vec!["x^3"], formatted(&ring, i.power(3).unwrap().generators()));

    let quotient = product.quotient(&i).unwrap();
    assert!(quotient.is_equal(&j).unwrap());
    assert!(i.quotient(&Ideal::parse(ring.clone(), &[]).unwrap()).unwrap().is_unit().unwrap());
}

#[test]
fn test_primary_decomposition() {
    let ring = test_ring(&["x1", "x2"], MonomialOrdering::DegRevLex);
    let engine = Arc::new(ScriptedEngine {
        answers: [
            ("primary_decomposition", EngineValue::Decomposition(vec![
                (vec!["x2".to_owned()], vec!["x2".to_owned()]),
                (vec!["x1^2".to_owned()], vec!["x1".to_owned()])
            ])),
            ("radical", EngineValue::Polynomials(vec!["x1*x2".to_owned()]))
        ].into_iter().collect(),
        fallback: LocalEngine::default()
    });
    let ideal = Ideal::with_engine(ring.clone(), vec![ring.parse("x1^2*x2").unwrap()], engine).unwrap();
    let decomposition = ideal.primary_decomposition().unwrap();
    assert_eq!(2, decomposition.len());
    assert_eq!(vec!["x1^2"], formatted(&ring, decomposition[1].0.generators()));
    assert_eq!(vec!["x1"], formatted(&ring, decomposition[1].1.generators()));
    assert_eq!(vec![1, 1], ideal.codimensions().unwrap());
    assert_eq!(vec!["x1*x2"], formatted(&ring, ideal.radical().unwrap().generators()));
    assert_eq!(1, ideal.dimension().unwrap());
    assert_eq!(Some(vec![1, 0]), ideal.independent_set().unwrap());
}

#[test]
fn test_unparseable_engine_output() {
    let ring = test_ring(&["x1", "x2"], MonomialOrdering::DegRevLex);
    let engine = Arc::new(ScriptedEngine {
        answers: [
            ("radical", EngineValue::Polynomials(vec!["x1*x3".to_owned()])),
            ("dimension", EngineValue::Polynomials(vec![]))
        ].into_iter().collect(),
        fallback: LocalEngine::default()
    });
    let ideal = Ideal::with_engine(ring.clone(), vec![ring.parse("x1^2*x2").unwrap()], engine).unwrap();
    assert!(matches!(ideal.radical(), Err(AlgebraError::Engine(EngineError { kind: EngineErrorKind::Unparseable, .. }))));
    assert!(matches!(ideal.dimension(), Err(AlgebraError::Engine(EngineError { kind: EngineErrorKind::Unparseable, .. }))));
    assert!(!ideal.is_cached(Invariant::Dimension));
    assert!(matches!(ideal.primary_decomposition(), Err(AlgebraError::Engine(EngineError { kind: EngineErrorKind::Unsupported, .. }))));
}

#[test]
fn test_quotient_ring() {
    let ring = test_ring(&["x1", "x2"], MonomialOrdering::DegRevLex);
    let qring = QuotientRing::new(ring.clone(), Ideal::parse(ring.clone(), &["x1"]).unwrap()).unwrap();
    let mut ideal = Ideal::parse(qring, &["x1", "x2"]).unwrap();
    assert_eq!(vec!["x2"], formatted(&ring, &ideal.groebner_basis().unwrap()));
    assert_eq!(0, ideal.dimension().unwrap());
    assert!(ideal.contains(&ring.parse("x1 + x2").unwrap()).unwrap());

    let eliminated = ideal.eliminate(&["x1"]).unwrap();
    assert_eq!(vec!["x2"], formatted(eliminated.base_ring(), eliminated.generators()));

    ideal.to_full_ring();
    assert_eq!(vec!["x1", "x2"], formatted(&ring, &ideal.groebner_basis().unwrap()));

    let other_ring = test_ring(&["a", "b"], MonomialOrdering::DegRevLex);
    assert!(matches!(ideal.to_qring(Ideal::parse(other_ring, &["a"]).unwrap()), Err(AlgebraError::RingMismatch(_))));
}

#[test]
fn test_generators_eval() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let ideal = Ideal::parse(ring.clone(), &["x^2 - y", "x*y - 1"]).unwrap();
    let QQ = ring.field();
    let evaluated = ideal.generators_eval(&[("x", QQ.int(2))]).unwrap();
    assert_eq!(vec!["-y+4", "2*y-1"], formatted(&ring, &evaluated));
    assert!(matches!(ideal.generators_eval(&[("z", QQ.int(2))]), Err(AlgebraError::Arity(_))));
    let Fp = Field::finite_field(5).unwrap();
    assert!(matches!(ideal.generators_eval(&[("x", Fp.int(2))]), Err(AlgebraError::Coercion(_))));
}

#[test]
fn test_valid_ideal() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let ideal = Ideal::parse(ring.clone(), &["x^2 - y", "x*y - 1"]).unwrap();
    assert!(ideal.test_valid_ideal().is_valid());

    let qring = QuotientRing::new(ring.clone(), Ideal::parse(ring.clone(), &["x^2"]).unwrap()).unwrap();
    let ideal = Ideal::parse(qring, &["y"]).unwrap();
    let report = ideal.test_valid_ideal();
    assert!(report.is_valid());
    assert!(report.defects().is_empty());
}

#[test]
fn test_monomial_to_exponents() {
    let ring = test_ring(&["x1", "x2"], MonomialOrdering::DegRevLex);
    let ideal = Ideal::parse(ring, &["x1"]).unwrap();
    assert_eq!(Monomial::new(vec![2, 1]), ideal.monomial_to_exponents("x1^2*x2").unwrap());
    assert_eq!(Monomial::new(vec![0, 0]), ideal.monomial_to_exponents("1").unwrap());
    assert!(matches!(ideal.monomial_to_exponents("x3"), Err(AlgebraError::Parse { .. })));
}

#[test]
fn test_clone_keeps_cache() {
    let ring = test_ring(&["x", "y"], MonomialOrdering::DegRevLex);
    let engine = counting_engine();
    let ideal = ideal_with(&ring, &["x^2 - y"], &engine);
    ideal.dimension().unwrap();
    let cloned = ideal.clone();
    assert!(cloned.is_cached(Invariant::Dimension));
    ideal.delete_cached_properties();
    assert!(cloned.is_cached(Invariant::Dimension));
    assert_eq!("(x^2-y)", format!("{}", cloned));
}
