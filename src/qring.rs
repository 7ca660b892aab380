use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::engine::RingDescription;
use crate::error::*;
use crate::field::Field;
use crate::ideal::Ideal;
use crate::multivariate::MonomialOrdering;
use crate::multivariate::polynomial::Polynomial;
use crate::ring::Ring;

///
/// The quotient `R/I` of a polynomial ring `R` by an ideal `I` of `R`.
///
/// Elements of the quotient ring are represented by polynomials of the base ring,
/// so all the polynomial arithmetic is done by [`QuotientRing::base()`]. Its main
/// use is as ambient ring of an [`Ideal`], in which case the engine performs all
/// computations modulo the relations given by [`QuotientRing::modulus()`].
///
/// # Example
/// ```
/// # use std::sync::Arc;
/// # use feanor_ideals::field::*;
/// # use feanor_ideals::ring::*;
/// # use feanor_ideals::ideal::*;
/// # use feanor_ideals::qring::*;
/// # use feanor_ideals::multivariate::*;
/// let ring = Arc::new(Ring::new(Field::rationals(), ["x1", "x2"], MonomialOrdering::DegRevLex).unwrap());
/// let modulus = Ideal::parse(ring.clone(), &["x1"]).unwrap();
/// let qring = QuotientRing::new(ring, modulus).unwrap();
/// let ideal = Ideal::parse(qring, &["x1", "x2"]).unwrap();
/// assert_eq!(vec!["x2".to_owned()], ideal.groebner_basis().unwrap().iter().map(|f| ideal.base_ring().format(f)).collect::<Vec<_>>());
/// ```
///
#[derive(Clone)]
pub struct QuotientRing {
    base: Arc<Ring>,
    modulus: Ideal
}

impl QuotientRing {

    ///
    /// Creates the quotient ring `base / modulus`. The modulus must be an ideal of
    /// `base` itself, in particular it must not live in a quotient ring.
    ///
    pub fn new<R: Into<Arc<Ring>>>(base: R, modulus: Ideal) -> Result<Self> {
        let base = base.into();
        match modulus.ring() {
            AmbientRing::Free(modulus_ring) if **modulus_ring == *base => Ok(QuotientRing { base, modulus }),
            AmbientRing::Free(modulus_ring) => Err(AlgebraError::RingMismatch(format!("modulus lives in {}, but base ring is {}", modulus_ring, base))),
            AmbientRing::Quotient(modulus_ring) => Err(AlgebraError::RingMismatch(format!("modulus lives in the quotient ring {}, not in a polynomial ring", modulus_ring)))
        }
    }

    pub fn base(&self) -> &Arc<Ring> {
        &self.base
    }

    pub fn modulus(&self) -> &Ideal {
        &self.modulus
    }

    pub fn field(&self) -> &Arc<Field> {
        self.base.field()
    }

    pub fn variables(&self) -> &[String] {
        self.base.variables()
    }

    pub fn ordering(&self) -> &MonomialOrdering {
        self.base.ordering()
    }

    pub fn variable_count(&self) -> usize {
        self.base.variable_count()
    }

    pub fn variable_index(&self, name: &str) -> Result<usize> {
        self.base.variable_index(name)
    }

    pub fn parse(&self, text: &str) -> Result<Polynomial> {
        self.base.parse(text)
    }

    pub fn format(&self, f: &Polynomial) -> String {
        self.base.format(f)
    }

    ///
    /// Returns the relations of the quotient ring, i.e. the generators of the modulus, in engine syntax.
    ///
    pub fn relations(&self) -> Vec<String> {
        self.modulus.generators().iter().map(|f| self.base.format(f)).collect()
    }
}

impl PartialEq for QuotientRing {

    fn eq(&self, other: &Self) -> bool {
        self.base == other.base &&
            self.modulus.generators().len() == other.modulus.generators().len() &&
            self.modulus.generators().iter().zip(other.modulus.generators().iter()).all(|(l, r)| self.base.eq_el(l, r))
    }
}

impl Display for QuotientRing {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / ({})", self.base, self.relations().join(", "))
    }
}

impl Debug for QuotientRing {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

///
/// The ring an [`Ideal`] lives in, either a polynomial ring or a quotient of one.
///
#[derive(Clone)]
pub enum AmbientRing {
    Free(Arc<Ring>),
    Quotient(Arc<QuotientRing>)
}

impl AmbientRing {

    ///
    /// Returns the polynomial ring whose elements represent the elements of this ring.
    ///
    pub fn base(&self) -> &Arc<Ring> {
        match self {
            AmbientRing::Free(ring) => ring,
            AmbientRing::Quotient(qring) => qring.base()
        }
    }

    pub fn modulus(&self) -> Option<&Ideal> {
        match self {
            AmbientRing::Free(_) => None,
            AmbientRing::Quotient(qring) => Some(qring.modulus())
        }
    }

    pub fn is_quotient(&self) -> bool {
        self.modulus().is_some()
    }

    pub fn variable_count(&self) -> usize {
        self.base().variable_count()
    }

    ///
    /// Returns the description of this ring that is sent to the engine.
    ///
    pub fn description(&self) -> RingDescription {
        let base = self.base();
        RingDescription {
            field: base.field().config(),
            variables: base.variables().to_vec(),
            ordering: base.ordering().clone(),
            quotient: match self {
                AmbientRing::Free(_) => None,
                AmbientRing::Quotient(qring) => Some(qring.relations())
            }
        }
    }
}

impl PartialEq for AmbientRing {

    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AmbientRing::Free(lhs), AmbientRing::Free(rhs)) => Arc::ptr_eq(lhs, rhs) || lhs == rhs,
            (AmbientRing::Quotient(lhs), AmbientRing::Quotient(rhs)) => Arc::ptr_eq(lhs, rhs) || lhs == rhs,
            _ => false
        }
    }
}

impl From<Ring> for AmbientRing {
    fn from(value: Ring) -> Self { AmbientRing::Free(Arc::new(value)) }
}

impl From<Arc<Ring>> for AmbientRing {
    fn from(value: Arc<Ring>) -> Self { AmbientRing::Free(value) }
}

impl From<QuotientRing> for AmbientRing {
    fn from(value: QuotientRing) -> Self { AmbientRing::Quotient(Arc::new(value)) }
}

impl From<Arc<QuotientRing>> for AmbientRing {
    fn from(value: Arc<QuotientRing>) -> Self { AmbientRing::Quotient(value) }
}

impl Display for AmbientRing {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmbientRing::Free(ring) => write!(f, "{}", ring),
            AmbientRing::Quotient(qring) => write!(f, "{}", qring)
        }
    }
}

impl Debug for AmbientRing {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
fn test_ring(field: Field) -> Arc<Ring> {
    Arc::new(Ring::new(field, ["x1", "x2"], MonomialOrdering::DegRevLex).unwrap())
}

#[test]
fn test_new() {
    let ring = test_ring(Field::rationals());
    let modulus = Ideal::parse(ring.clone(), &["x1"]).unwrap();
    let qring = QuotientRing::new(ring.clone(), modulus.clone()).unwrap();
    assert_eq!(vec!["x1".to_owned()], qring.relations());
    assert_eq!("0, (x1, x2), dp / (x1)", format!("{}", qring));

    let other_ring = test_ring(Field::finite_field(7).unwrap());
    assert!(matches!(QuotientRing::new(other_ring, modulus.clone()), Err(AlgebraError::RingMismatch(_))));

    let nested_modulus = Ideal::parse(qring.clone(), &["x2"]).unwrap();
    assert!(matches!(QuotientRing::new(ring, nested_modulus), Err(AlgebraError::RingMismatch(_))));
}

#[test]
fn test_ambient_ring() {
    let ring = test_ring(Field::rationals());
    let qring = QuotientRing::new(ring.clone(), Ideal::parse(ring.clone(), &["x1^2+1"]).unwrap()).unwrap();
    let free = AmbientRing::from(ring.clone());
    let quotient = AmbientRing::from(qring.clone());
    assert!(!free.is_quotient());
    assert!(quotient.is_quotient());
    assert!(free != quotient);
    assert!(quotient == AmbientRing::from(qring));
    assert!(free == AmbientRing::from(test_ring(Field::rationals())));

    let description = quotient.description();
    assert_eq!(Some(vec!["x1^2+1".to_owned()]), description.quotient);
    assert_eq!(vec!["x1".to_owned(), "x2".to_owned()], description.variables);
    assert_eq!(None, free.description().quotient);
}
