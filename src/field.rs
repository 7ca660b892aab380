use std::fmt::{Debug, Display};
use std::ops::RangeInclusive;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::algorithms::miller_rabin::is_prime;
use crate::algorithms::zn_ops::*;
use crate::error::*;
use crate::syntax;

///
/// The kinds of coefficient fields that are supported. Each kind fixes the
/// representation of its elements, see [`FieldElement`].
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// the rational numbers `Q`, represented exactly
    Rational,
    /// the gaussian rationals `Q[i]`, represented exactly
    GaussianRational,
    /// the prime field `Fp`
    FiniteField,
    /// the complex numbers `C`, approximated by pairs of `f64`s
    Complex
}

impl FieldKind {

    ///
    /// Parses the name of a field kind, accepting the usual aliases
    /// (e.g. `"Fp"` for `"finite field"`).
    ///
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rational" | "Q" => Some(FieldKind::Rational),
            "gaussian rational" | "Q[i]" | "Qi" => Some(FieldKind::GaussianRational),
            "finite field" | "Fp" => Some(FieldKind::FiniteField),
            "mpc" | "C" => Some(FieldKind::Complex),
            _ => None
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            FieldKind::Rational => "rational",
            FieldKind::GaussianRational => "gaussian rational",
            FieldKind::FiniteField => "finite field",
            FieldKind::Complex => "mpc"
        }
    }

    ///
    /// Whether elements are represented exactly, or only up to [`Field::tolerance()`].
    ///
    pub fn is_exact(&self) -> bool {
        *self != FieldKind::Complex
    }
}

///
/// Configuration from which a [`Field`] is built, see [`Field::new()`].
///
/// Only `name` and `characteristic` are required; `digits` is only relevant
/// for numeric fields. `tolerance` and `algebraically_closed` are determined
/// by the kind of field, and may only be given to override the tolerance of
/// numeric fields resp. to assert the expected closure property.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub characteristic: u64,
    #[serde(default)]
    pub digits: u32,
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub algebraically_closed: Option<bool>
}

impl FieldConfig {

    pub fn new<S: Into<String>>(name: S, characteristic: u64, digits: u32) -> Self {
        FieldConfig { name: name.into(), characteristic, digits, tolerance: None, algebraically_closed: None }
    }
}

///
/// An element of a [`Field`]. The variant always corresponds to the [`FieldKind`]
/// of the field the element belongs to; all arithmetic is performed through the
/// field object, e.g. `field.add(&a, &b)`.
///
#[derive(Debug, Clone, PartialEq)]
pub enum FieldElement {
    Rational(BigRational),
    /// `re + im * i`
    Gaussian(BigRational, BigRational),
    /// residue in `0..p`
    Modular(u64),
    /// `re + im * i`
    Complex(f64, f64)
}

///
/// An external value that can be coerced into a field via [`Field::set()`].
///
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalValue {
    Integer(BigInt),
    Rational(BigRational),
    Float(f64),
    Complex(f64, f64),
    Text(String)
}

impl From<i64> for ExternalValue {
    fn from(value: i64) -> Self { ExternalValue::Integer(BigInt::from(value)) }
}

impl From<BigInt> for ExternalValue {
    fn from(value: BigInt) -> Self { ExternalValue::Integer(value) }
}

impl From<BigRational> for ExternalValue {
    fn from(value: BigRational) -> Self { ExternalValue::Rational(value) }
}

impl From<f64> for ExternalValue {
    fn from(value: f64) -> Self { ExternalValue::Float(value) }
}

impl From<&str> for ExternalValue {
    fn from(value: &str) -> Self { ExternalValue::Text(value.to_owned()) }
}

const MAX_COMPLEX_DIGITS: u32 = 16;
const MIN_COMPLEX_DIGITS: u32 = 6;
const DEFAULT_RANDOM_BOUND: i64 = 100;
const RANDOM_DENOMINATOR_BOUND: i64 = 200;

///
/// A coefficient field, i.e. one of `Q`, `Q[i]`, `Fp` or (an approximation of) `C`.
///
/// Fields are immutable after construction and are usually shared between many
/// rings via an `Arc`. Two fields are equal if they are of the same kind, and have
/// the same characteristic and precision.
///
/// # Example
/// ```
/// # use feanor_ideals::field::*;
/// let Fp = Field::finite_field(7).unwrap();
/// let a = Fp.set(3.into()).unwrap();
/// assert!(Fp.sqrt(&a).is_err());
/// let b = Fp.set(2.into()).unwrap();
/// let root = Fp.sqrt(&b).unwrap();
/// assert!(Fp.eq_el(&b, &Fp.mul(&root, &root)));
/// ```
///
#[derive(Clone)]
pub struct Field {
    kind: FieldKind,
    name: String,
    characteristic: u64,
    digits: u32,
    tolerance: f64
}

impl Field {

    ///
    /// Creates a new field from the given configuration, checking that it
    /// describes a valid field.
    ///
    pub fn new(config: FieldConfig) -> Result<Self> {
        let kind = FieldKind::from_name(&config.name).ok_or_else(|| AlgebraError::InvalidField(format!(
            "unknown field `{}`, must be one of 'rational', 'gaussian rational', 'finite field', 'mpc' or aliases thereof", config.name
        )))?;
        match kind {
            FieldKind::FiniteField if !is_prime(config.characteristic, 5) => {
                return Err(AlgebraError::InvalidField(format!("characteristic {} is not a prime", config.characteristic)));
            },
            FieldKind::FiniteField if config.characteristic >= (1 << 63) => {
                return Err(AlgebraError::InvalidField(format!("characteristic {} exceeds 2^63", config.characteristic)));
            },
            FieldKind::FiniteField => {},
            _ if config.characteristic != 0 => {
                return Err(AlgebraError::InvalidField(format!("field `{}` has characteristic 0, got {}", config.name, config.characteristic)));
            },
            _ => {}
        }
        let algebraically_closed = kind == FieldKind::Complex;
        if let Some(expected) = config.algebraically_closed {
            if expected != algebraically_closed {
                return Err(AlgebraError::InvalidField(format!("field `{}` is {}algebraically closed", config.name, if algebraically_closed { "" } else { "not " })));
            }
        }
        let digits = if kind == FieldKind::Complex {
            let digits = if config.digits == 0 { MAX_COMPLEX_DIGITS } else { config.digits };
            if digits < MIN_COMPLEX_DIGITS || digits > MAX_COMPLEX_DIGITS {
                return Err(AlgebraError::InvalidField(format!("digits must be in {}..={}, got {}", MIN_COMPLEX_DIGITS, MAX_COMPLEX_DIGITS, digits)));
            }
            digits
        } else {
            0
        };
        let tolerance = match (kind, config.tolerance) {
            (FieldKind::Complex, Some(tolerance)) if tolerance >= 0. && tolerance.is_finite() => tolerance,
            (FieldKind::Complex, Some(tolerance)) => {
                return Err(AlgebraError::InvalidField(format!("tolerance must be non-negative, got {}", tolerance)));
            },
            (FieldKind::Complex, None) => {
                let exponent = std::cmp::min((0.95 * digits as f64).floor() as i32, digits as i32 - 4);
                10f64.powi(-exponent)
            },
            (_, None) => 0.,
            (_, Some(tolerance)) if tolerance == 0. => 0.,
            (_, Some(_)) => {
                return Err(AlgebraError::InvalidField(format!("exact field `{}` has zero tolerance", config.name)));
            }
        };
        Ok(Field { kind, name: config.name, characteristic: config.characteristic, digits, tolerance })
    }

    pub fn rationals() -> Self {
        Field { kind: FieldKind::Rational, name: "rational".to_owned(), characteristic: 0, digits: 0, tolerance: 0. }
    }

    pub fn gaussian_rationals() -> Self {
        Field { kind: FieldKind::GaussianRational, name: "gaussian rational".to_owned(), characteristic: 0, digits: 0, tolerance: 0. }
    }

    pub fn finite_field(p: u64) -> Result<Self> {
        Self::new(FieldConfig::new("finite field", p, 0))
    }

    pub fn complex(digits: u32) -> Result<Self> {
        Self::new(FieldConfig::new("mpc", 0, digits))
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn characteristic(&self) -> u64 {
        self.characteristic
    }

    ///
    /// The number of significant decimal digits of numeric fields, and 0
    /// for exact fields.
    ///
    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn is_algebraically_closed(&self) -> bool {
        self.kind == FieldKind::Complex
    }

    ///
    /// Returns the threshold below which the absolute value of an element is
    /// considered to be zero. This is zero for all exact fields.
    ///
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    ///
    /// Returns a small positive value of the field, e.g. for use as step size
    /// in numerical procedures. Only numeric fields have such an element.
    ///
    pub fn epsilon(&self) -> Result<f64> {
        match self.kind {
            FieldKind::Complex => Ok(10f64.powi(-((self.digits / 2) as i32))),
            FieldKind::FiniteField => Err(AlgebraError::Domain("finite field infinitesimal does not exist".to_owned())),
            _ => Err(AlgebraError::Domain(format!("field `{}` has no infinitesimal", self.name)))
        }
    }

    ///
    /// Returns the notation of the coefficient field in the ring declaration
    /// of the computation engine.
    ///
    pub fn notation(&self) -> String {
        match self.kind {
            FieldKind::Rational => "0".to_owned(),
            FieldKind::GaussianRational => "(0,I)".to_owned(),
            FieldKind::FiniteField => format!("{}", self.characteristic),
            FieldKind::Complex => format!("(complex,{},I)", self.digits - 5)
        }
    }

    ///
    /// If the field is given as an algebraic extension of its prime field, returns
    /// the minimal polynomial of the generator in engine syntax.
    ///
    pub fn minimal_polynomial(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::GaussianRational => Some("I^2+1"),
            _ => None
        }
    }

    pub fn config(&self) -> FieldConfig {
        FieldConfig {
            name: self.name.clone(),
            characteristic: self.characteristic,
            digits: self.digits,
            tolerance: if self.kind == FieldKind::Complex { Some(self.tolerance) } else { None },
            algebraically_closed: None
        }
    }

    pub fn zero(&self) -> FieldElement {
        match self.kind {
            FieldKind::Rational => FieldElement::Rational(BigRational::zero()),
            FieldKind::GaussianRational => FieldElement::Gaussian(BigRational::zero(), BigRational::zero()),
            FieldKind::FiniteField => FieldElement::Modular(0),
            FieldKind::Complex => FieldElement::Complex(0., 0.)
        }
    }

    pub fn one(&self) -> FieldElement {
        self.int(1)
    }

    ///
    /// Returns the imaginary unit, i.e. a square root of `-1`.
    ///
    pub fn i(&self) -> Result<FieldElement> {
        self.sqrt(&self.int(-1))
    }

    ///
    /// Maps an integer into the field. This cannot fail.
    ///
    pub fn int(&self, value: i64) -> FieldElement {
        self.from_bigint(&BigInt::from(value))
    }

    pub fn from_bigint(&self, value: &BigInt) -> FieldElement {
        match self.kind {
            FieldKind::Rational => FieldElement::Rational(BigRational::from_integer(value.clone())),
            FieldKind::GaussianRational => FieldElement::Gaussian(BigRational::from_integer(value.clone()), BigRational::zero()),
            FieldKind::FiniteField => {
                let p = BigInt::from(self.characteristic);
                FieldElement::Modular(value.mod_floor(&p).to_u64().unwrap_or(0))
            },
            FieldKind::Complex => FieldElement::Complex(value.to_f64().unwrap_or(f64::NAN), 0.)
        }
    }

    ///
    /// Coerces an external value into this field's representation.
    ///
    /// Fails with [`AlgebraError::Coercion`] if the value has no (exact)
    /// representation in the field, e.g. a non-integer value for a finite field,
    /// or a floating point number for an exact field.
    ///
    pub fn set(&self, value: ExternalValue) -> Result<FieldElement> {
        match (self.kind, value) {
            (_, ExternalValue::Integer(n)) => Ok(self.from_bigint(&n)),
            (FieldKind::FiniteField, ExternalValue::Rational(q)) if q.is_integer() => Ok(self.from_bigint(q.numer())),
            (FieldKind::FiniteField, ExternalValue::Text(text)) => self.parse_residue(&text),
            (FieldKind::FiniteField, value) => Err(AlgebraError::Coercion(format!("{:?} is not an integer, cannot coerce into {}", value, self))),
            (FieldKind::Rational, ExternalValue::Rational(q)) => Ok(FieldElement::Rational(q)),
            (FieldKind::GaussianRational, ExternalValue::Rational(q)) => Ok(FieldElement::Gaussian(q, BigRational::zero())),
            (FieldKind::Complex, ExternalValue::Rational(q)) => Ok(FieldElement::Complex(rational_to_f64(&q), 0.)),
            (FieldKind::Complex, ExternalValue::Float(x)) if x.is_finite() => Ok(FieldElement::Complex(x, 0.)),
            (FieldKind::Complex, ExternalValue::Complex(re, im)) if re.is_finite() && im.is_finite() => Ok(FieldElement::Complex(re, im)),
            (_, ExternalValue::Text(text)) => syntax::parse_constant(self, &text).map_err(|e| AlgebraError::Coercion(format!("`{}`: {}", text, e))),
            (_, value) => Err(AlgebraError::Coercion(format!("{:?} has no exact representation in {}", value, self)))
        }
    }

    ///
    /// Parses residues in the formats `a` and `a % p`.
    ///
    fn parse_residue(&self, text: &str) -> Result<FieldElement> {
        let (value, modulus) = match text.split_once('%') {
            Some((value, modulus)) => (value.trim(), Some(modulus.trim())),
            None => (text.trim(), None)
        };
        if let Some(modulus) = modulus {
            if modulus.parse::<u64>().ok() != Some(self.characteristic) {
                return Err(AlgebraError::Coercion(format!("`{}` is a residue modulo {}, expected modulo {}", text, modulus, self.characteristic)));
            }
        }
        let value = value.parse::<BigInt>().map_err(|_| AlgebraError::Coercion(format!("`{}` is not an integer, cannot coerce into {}", text, self)))?;
        Ok(self.from_bigint(&value))
    }

    ///
    /// Checks whether the given element is a valid element of this field, i.e.
    /// uses the correct representation and is reduced.
    ///
    pub fn contains(&self, el: &FieldElement) -> bool {
        match (self.kind, el) {
            (FieldKind::Rational, FieldElement::Rational(_)) => true,
            (FieldKind::GaussianRational, FieldElement::Gaussian(_, _)) => true,
            (FieldKind::FiniteField, FieldElement::Modular(a)) => *a < self.characteristic,
            (FieldKind::Complex, FieldElement::Complex(re, im)) => re.is_finite() && im.is_finite(),
            _ => false
        }
    }

    pub fn is_zero(&self, el: &FieldElement) -> bool {
        match el {
            FieldElement::Rational(q) => q.is_zero(),
            FieldElement::Gaussian(re, im) => re.is_zero() && im.is_zero(),
            FieldElement::Modular(a) => *a == 0,
            FieldElement::Complex(re, im) => re.hypot(*im) <= self.tolerance
        }
    }

    pub fn is_one(&self, el: &FieldElement) -> bool {
        self.eq_el(el, &self.one())
    }

    ///
    /// Checks equality of two field elements, which for numeric fields means
    /// that their difference is zero up to [`Field::tolerance()`].
    ///
    pub fn eq_el(&self, lhs: &FieldElement, rhs: &FieldElement) -> bool {
        self.is_zero(&self.sub(lhs, rhs))
    }

    pub fn add(&self, lhs: &FieldElement, rhs: &FieldElement) -> FieldElement {
        match (lhs, rhs) {
            (FieldElement::Rational(a), FieldElement::Rational(b)) => FieldElement::Rational(a + b),
            (FieldElement::Gaussian(a, b), FieldElement::Gaussian(c, d)) => FieldElement::Gaussian(a + c, b + d),
            (FieldElement::Modular(a), FieldElement::Modular(b)) => FieldElement::Modular(add_mod(*a, *b, self.characteristic)),
            (FieldElement::Complex(a, b), FieldElement::Complex(c, d)) => FieldElement::Complex(a + c, b + d),
            _ => panic!("elements {:?} and {:?} do not belong to the same field", lhs, rhs)
        }
    }

    pub fn neg(&self, el: &FieldElement) -> FieldElement {
        match el {
            FieldElement::Rational(a) => FieldElement::Rational(-a),
            FieldElement::Gaussian(a, b) => FieldElement::Gaussian(-a, -b),
            FieldElement::Modular(a) => FieldElement::Modular(neg_mod(*a, self.characteristic)),
            FieldElement::Complex(a, b) => FieldElement::Complex(-a, -b)
        }
    }

    pub fn sub(&self, lhs: &FieldElement, rhs: &FieldElement) -> FieldElement {
        self.add(lhs, &self.neg(rhs))
    }

    pub fn mul(&self, lhs: &FieldElement, rhs: &FieldElement) -> FieldElement {
        match (lhs, rhs) {
            (FieldElement::Rational(a), FieldElement::Rational(b)) => FieldElement::Rational(a * b),
            (FieldElement::Gaussian(a, b), FieldElement::Gaussian(c, d)) => FieldElement::Gaussian(a * c - b * d, a * d + b * c),
            (FieldElement::Modular(a), FieldElement::Modular(b)) => FieldElement::Modular(mul_mod(*a, *b, self.characteristic)),
            (FieldElement::Complex(a, b), FieldElement::Complex(c, d)) => FieldElement::Complex(a * c - b * d, a * d + b * c),
            _ => panic!("elements {:?} and {:?} do not belong to the same field", lhs, rhs)
        }
    }

    pub fn inv(&self, el: &FieldElement) -> Result<FieldElement> {
        if self.is_zero(el) {
            return Err(AlgebraError::Domain("division by zero".to_owned()));
        }
        Ok(match el {
            FieldElement::Rational(a) => FieldElement::Rational(a.recip()),
            FieldElement::Gaussian(a, b) => {
                let norm = a * a + b * b;
                FieldElement::Gaussian(a / &norm, -b / &norm)
            },
            FieldElement::Modular(a) => FieldElement::Modular(inv_mod(*a, self.characteristic).ok_or_else(|| AlgebraError::Domain(format!("{} is not invertible", a)))?),
            FieldElement::Complex(a, b) => {
                let norm = a * a + b * b;
                FieldElement::Complex(a / norm, -b / norm)
            }
        })
    }

    pub fn div(&self, lhs: &FieldElement, rhs: &FieldElement) -> Result<FieldElement> {
        Ok(self.mul(lhs, &self.inv(rhs)?))
    }

    pub fn pow(&self, el: &FieldElement, mut exp: u32) -> FieldElement {
        let mut result = self.one();
        let mut current = el.clone();
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(&result, &current);
            }
            current = self.mul(&current, &current);
            exp >>= 1;
        }
        return result;
    }

    ///
    /// Computes a square root of the given element.
    ///
    /// Over `C`, this is the principal square root. Over exact fields, this fails with
    /// [`AlgebraError::Domain`] if the element is not a square:
    ///  - in `Fp`, squares are detected by Euler's criterion, and roots are found using
    ///    the Tonelli-Shanks algorithm; the smaller of both roots (as integer in `0..p`)
    ///    is returned
    ///  - in `Q`, numerator and denominator must be perfect squares
    ///  - in `Q[i]`, the absolute value and both half-angle components must be rational
    ///
    pub fn sqrt(&self, el: &FieldElement) -> Result<FieldElement> {
        let not_a_square = || AlgebraError::Domain(format!("{} has no square root in {}", self.format(el), self));
        match el {
            FieldElement::Modular(a) => sqrt_mod(*a, self.characteristic).map(FieldElement::Modular).ok_or_else(not_a_square),
            FieldElement::Rational(a) => {
                if a.is_negative() {
                    return Err(not_a_square());
                }
                rational_sqrt(a).map(FieldElement::Rational).ok_or_else(not_a_square)
            },
            FieldElement::Gaussian(a, b) => {
                // sqrt(a + bi) = x + yi with x = sqrt((|z| + a)/2), y = sgn(b) sqrt((|z| - a)/2)
                let modulus = rational_sqrt(&(a * a + b * b)).ok_or_else(not_a_square)?;
                let two = BigRational::from_integer(BigInt::from(2));
                let x = rational_sqrt(&((&modulus + a) / &two)).ok_or_else(not_a_square)?;
                let y = rational_sqrt(&((&modulus - a) / &two)).ok_or_else(not_a_square)?;
                let y = if b.is_negative() { -y } else { y };
                Ok(FieldElement::Gaussian(x, y))
            },
            FieldElement::Complex(a, b) => {
                let modulus = a.hypot(*b);
                let x = ((modulus + a) / 2.).sqrt();
                let y = ((modulus - a) / 2.).sqrt();
                Ok(FieldElement::Complex(x, if *b < 0. { -y } else { y }))
            }
        }
    }

    ///
    /// Returns a random element of the field. For finite fields, this is uniform
    /// over all residues, for other fields this is [`Field::random_element()`] with
    /// range `-100..=100`.
    ///
    pub fn random(&self, rng: &mut oorandom::Rand64) -> FieldElement {
        self.random_element(rng, -DEFAULT_RANDOM_BOUND..=DEFAULT_RANDOM_BOUND)
    }

    ///
    /// Returns a random element of the field whose real and imaginary parts lie in the
    /// given range. Rational parts are fractions with denominator at most 200.
    /// For finite fields, the range is ignored and the element is uniform over all residues.
    ///
    pub fn random_element(&self, rng: &mut oorandom::Rand64, range: RangeInclusive<i64>) -> FieldElement {
        let (lower, upper) = (*range.start(), *range.end());
        assert!(lower <= upper);
        // fits, since |lower|, upper < 2^63 and den <= 200
        let width = (upper as i128 - lower as i128) as u128;
        let random_rational = |rng: &mut oorandom::Rand64| {
            let den = 1 + rng.rand_range(0..(RANDOM_DENOMINATOR_BOUND as u64)) as i128;
            let num = lower as i128 * den + random_below(rng, width * den as u128 + 1) as i128;
            BigRational::new(BigInt::from(num), BigInt::from(den))
        };
        match self.kind {
            FieldKind::FiniteField => FieldElement::Modular(rng.rand_range(0..self.characteristic)),
            FieldKind::Rational => FieldElement::Rational(random_rational(rng)),
            FieldKind::GaussianRational => {
                let re = random_rational(rng);
                FieldElement::Gaussian(re, random_rational(rng))
            },
            FieldKind::Complex => {
                let scale = upper as f64 - lower as f64;
                let re = lower as f64 + rng.rand_float() * scale;
                FieldElement::Complex(re, lower as f64 + rng.rand_float() * scale)
            }
        }
    }

    ///
    /// Returns a random element that has a square root in this field.
    ///
    pub fn random_square(&self, rng: &mut oorandom::Rand64) -> FieldElement {
        let root = self.random(rng);
        self.mul(&root, &root)
    }

    ///
    /// Formats the element in the polynomial syntax of the computation engine.
    ///
    pub fn format(&self, el: &FieldElement) -> String {
        syntax::format_coefficient(self, el)
    }
}

impl PartialEq for Field {

    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.characteristic == other.characteristic && self.digits == other.digits && self.tolerance == other.tolerance
    }
}

impl Debug for Field {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field('{}', {}, {})", self.name, self.characteristic, self.digits)
    }
}

impl Display for Field {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

///
/// Returns a random integer in `0..bound`, for `bound > 0`.
///
fn random_below(rng: &mut oorandom::Rand64, bound: u128) -> u128 {
    if bound <= u64::MAX as u128 {
        return rng.rand_range(0..(bound as u64)) as u128;
    }
    let value = ((rng.rand_u64() as u128) << 64) | rng.rand_u64() as u128;
    return value % bound;
}

pub(crate) fn rational_to_f64(q: &BigRational) -> f64 {
    q.numer().to_f64().unwrap_or(f64::NAN) / q.denom().to_f64().unwrap_or(f64::NAN)
}

fn rational_sqrt(q: &BigRational) -> Option<BigRational> {
    if q.is_negative() {
        return None;
    }
    let num = q.numer().sqrt();
    let den = q.denom().sqrt();
    if &(&num * &num) == q.numer() && &(&den * &den) == q.denom() {
        Some(BigRational::new(num, den))
    } else {
        None
    }
}

#[cfg(test)]
fn q(num: i64, den: i64) -> BigRational {
    BigRational::new(BigInt::from(num), BigInt::from(den))
}

#[test]
fn test_field_config_validation() {
    assert!(Field::new(FieldConfig::new("finite field", 2147483647, 1)).is_ok());
    assert!(matches!(Field::finite_field(15), Err(AlgebraError::InvalidField(_))));
    assert!(matches!(Field::new(FieldConfig::new("rational", 5, 0)), Err(AlgebraError::InvalidField(_))));
    assert!(matches!(Field::new(FieldConfig::new("padic", 5, 3)), Err(AlgebraError::InvalidField(_))));
    assert!(matches!(Field::complex(40), Err(AlgebraError::InvalidField(_))));
    let mut config = FieldConfig::new("Fp", 7, 0);
    config.algebraically_closed = Some(true);
    assert!(matches!(Field::new(config), Err(AlgebraError::InvalidField(_))));
    let mut config = FieldConfig::new("C", 0, 16);
    config.tolerance = Some(-1.);
    assert!(matches!(Field::new(config), Err(AlgebraError::InvalidField(_))));
}

#[test]
fn test_field_equality() {
    assert_eq!(Field::finite_field(7).unwrap(), Field::new(FieldConfig::new("Fp", 7, 1)).unwrap());
    assert_ne!(Field::finite_field(7).unwrap(), Field::finite_field(11).unwrap());
    assert_ne!(Field::rationals(), Field::gaussian_rationals());
    assert_eq!(Field::complex(16).unwrap(), Field::new(FieldConfig::new("C", 0, 0)).unwrap());
}

#[test]
fn test_field_attributes() {
    let C = Field::complex(16).unwrap();
    assert!(C.is_algebraically_closed());
    assert!((C.tolerance() - 1e-12).abs() < 1e-24);
    assert!((C.epsilon().unwrap() - 1e-8).abs() < 1e-20);
    assert_eq!("(complex,11,I)", C.notation());

    let Fp = Field::finite_field(2147483647).unwrap();
    assert!(!Fp.is_algebraically_closed());
    assert_eq!(0., Fp.tolerance());
    assert!(matches!(Fp.epsilon(), Err(AlgebraError::Domain(_))));
    assert_eq!("2147483647", Fp.notation());

    assert_eq!("0", Field::rationals().notation());
    assert_eq!(Some("I^2+1"), Field::gaussian_rationals().minimal_polynomial());
}

#[test]
fn test_set() {
    let Fp = Field::finite_field(2147481317).unwrap();
    assert_eq!(FieldElement::Modular(0), Fp.set(0.into()).unwrap());
    assert_eq!(FieldElement::Modular(2147481316), Fp.set((-1).into()).unwrap());
    assert_eq!(FieldElement::Modular(1978390662), Fp.set("1978390662 % 2147481317".into()).unwrap());
    assert!(matches!(Fp.set(q(1, 2).into()), Err(AlgebraError::Coercion(_))));
    assert!(matches!(Fp.set(0.5.into()), Err(AlgebraError::Coercion(_))));
    assert!(matches!(Fp.set("3 % 7".into()), Err(AlgebraError::Coercion(_))));
    assert_eq!(FieldElement::Modular(3), Fp.set(q(6, 2).into()).unwrap());

    let QQ = Field::rationals();
    assert_eq!(FieldElement::Rational(q(-125, 2)), QQ.set("-125/2".into()).unwrap());
    assert!(matches!(QQ.set(0.5.into()), Err(AlgebraError::Coercion(_))));
    assert!(matches!(QQ.set("x".into()), Err(AlgebraError::Coercion(_))));

    let QQi = Field::gaussian_rationals();
    assert_eq!(FieldElement::Gaussian(q(1, 2), q(3, 1)), QQi.set("1/2+3*I".into()).unwrap());

    let C = Field::complex(16).unwrap();
    assert_eq!(FieldElement::Complex(0.5, 0.), C.set(q(1, 2).into()).unwrap());
    assert!(C.eq_el(&FieldElement::Complex(1.5, -2.), &C.set("1.5-2*I".into()).unwrap()));
}

#[test]
fn test_sqrt() {
    let Fp = Field::finite_field(17).unwrap();
    for a in 0..17 {
        let a = Fp.int(a);
        match Fp.sqrt(&a) {
            Ok(root) => assert!(Fp.eq_el(&a, &Fp.mul(&root, &root))),
            Err(e) => assert!(matches!(e, AlgebraError::Domain(_)))
        }
    }
    assert!(Fp.i().is_ok());
    assert!(matches!(Field::finite_field(7).unwrap().i(), Err(AlgebraError::Domain(_))));

    let QQ = Field::rationals();
    assert_eq!(FieldElement::Rational(q(3, 2)), QQ.sqrt(&FieldElement::Rational(q(9, 4))).unwrap());
    assert!(matches!(QQ.sqrt(&QQ.int(2)), Err(AlgebraError::Domain(_))));
    assert!(matches!(QQ.i(), Err(AlgebraError::Domain(_))));

    let QQi = Field::gaussian_rationals();
    assert_eq!(FieldElement::Gaussian(q(0, 1), q(1, 1)), QQi.i().unwrap());
    // (2 + i)^2 = 3 + 4i
    assert_eq!(FieldElement::Gaussian(q(2, 1), q(1, 1)), QQi.sqrt(&FieldElement::Gaussian(q(3, 1), q(4, 1))).unwrap());

    let C = Field::complex(16).unwrap();
    assert!(C.eq_el(&FieldElement::Complex(0., 1.), &C.i().unwrap()));
    let z = FieldElement::Complex(-3., 4.);
    let root = C.sqrt(&z).unwrap();
    assert!(C.eq_el(&z, &C.mul(&root, &root)));
}

#[test]
fn test_random() {
    let mut rng = oorandom::Rand64::new(1);
    let Fp = Field::finite_field(65537).unwrap();
    for _ in 0..100 {
        assert!(Fp.contains(&Fp.random(&mut rng)));
        let square = Fp.random_square(&mut rng);
        assert!(Fp.sqrt(&square).is_ok());
    }
    let QQ = Field::rationals();
    for _ in 0..100 {
        match QQ.random_element(&mut rng, -2..=3) {
            FieldElement::Rational(x) => assert!(x >= q(-2, 1) && x <= q(3, 1)),
            _ => panic!()
        }
    }
    let C = Field::complex(16).unwrap();
    for _ in 0..100 {
        match C.random_element(&mut rng, -1..=1) {
            FieldElement::Complex(re, im) => assert!(re.abs() <= 1. && im.abs() <= 1.),
            _ => panic!()
        }
    }
    let bound = 100_000_000_000_000_000;
    for (lower, upper) in [(-bound, bound), (i64::MIN, i64::MAX), (i64::MAX - 1, i64::MAX)] {
        for _ in 0..20 {
            match QQ.random_element(&mut rng, lower..=upper) {
                FieldElement::Rational(x) => assert!(x >= q(lower, 1) && x <= q(upper, 1)),
                _ => panic!()
            }
        }
    }
    match C.random_element(&mut rng, i64::MIN..=i64::MAX) {
        FieldElement::Complex(re, im) => assert!(re.is_finite() && im.is_finite()),
        _ => panic!()
    }
    let mut rng1 = oorandom::Rand64::new(5);
    let mut rng2 = oorandom::Rand64::new(5);
    assert_eq!(QQ.random(&mut rng1), QQ.random(&mut rng2));
}

#[test]
fn test_arithmetic() {
    let QQi = Field::gaussian_rationals();
    let a = FieldElement::Gaussian(q(1, 1), q(2, 1));
    let a_inv = QQi.inv(&a).unwrap();
    assert!(QQi.is_one(&QQi.mul(&a, &a_inv)));
    assert!(matches!(QQi.inv(&QQi.zero()), Err(AlgebraError::Domain(_))));

    let Fp = Field::finite_field(7).unwrap();
    assert_eq!(FieldElement::Modular(4), Fp.div(&Fp.one(), &Fp.int(2)).unwrap());
    assert_eq!(FieldElement::Modular(1), Fp.pow(&Fp.int(3), 6));

    let C = Field::complex(16).unwrap();
    assert!(C.is_zero(&FieldElement::Complex(1e-13, 0.)));
    assert!(!C.is_zero(&FieldElement::Complex(1e-11, 0.)));
}

#[test]
fn test_config_serialization() {
    let C = Field::complex(12).unwrap();
    let serialized = serde_json::to_string(&C.config()).unwrap();
    let loaded = Field::new(serde_json::from_str(&serialized).unwrap()).unwrap();
    assert_eq!(C, loaded);
}
