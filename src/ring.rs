use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::error::*;
use crate::field::*;
use crate::multivariate::*;
use crate::multivariate::polynomial::Polynomial;
use crate::syntax;

///
/// The polynomial ring `k[X0, ..., XN]` over a field `k`, with named variables
/// and a fixed monomial ordering.
///
/// Rings are immutable values, and are usually shared between many ideals via an
/// `Arc`. Equality is structural, i.e. two rings are equal if they have equal fields,
/// the same variables (in the same order) and the same monomial ordering.
///
/// Arithmetic on [`Polynomial`]s is performed through the ring object, e.g.
/// ```
/// # use feanor_ideals::field::*;
/// # use feanor_ideals::ring::*;
/// # use feanor_ideals::multivariate::*;
/// let ring = Ring::new(Field::rationals(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
/// let f = ring.parse("x + y").unwrap();
/// let g = ring.parse("x - y").unwrap();
/// assert_eq!("x^2-y^2", ring.format(&ring.mul(&f, &g).unwrap()));
/// ```
///
#[derive(Clone)]
pub struct Ring {
    field: Arc<Field>,
    variables: Vec<String>,
    ordering: MonomialOrdering
}

impl Ring {

    ///
    /// Creates a new ring, checking that the variable names are distinct valid
    /// identifiers, and that the ordering fits to the number of variables.
    ///
    pub fn new<F, V>(field: F, variables: V, ordering: MonomialOrdering) -> Result<Self>
        where F: Into<Arc<Field>>,
            V: IntoIterator,
            V::Item: Into<String>
    {
        let variables = variables.into_iter().map(|v| v.into()).collect::<Vec<String>>();
        if variables.is_empty() {
            return Err(AlgebraError::Arity("a ring must have at least one variable".to_owned()));
        }
        if let Some(invalid) = variables.iter().find(|v| !syntax::is_valid_identifier(v)) {
            return Err(AlgebraError::parse(0, format!("`{}` is not a valid variable name", invalid)));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = variables.iter().find(|v| !seen.insert(v.as_str())) {
            return Err(AlgebraError::Arity(format!("variable `{}` appears twice", duplicate)));
        }
        if let Some(n) = ordering.fixed_variable_count() {
            if n != variables.len() {
                return Err(AlgebraError::Arity(format!("ordering {} is defined for {} variables, but ring has {}", ordering, n, variables.len())));
            }
        }
        Ok(Ring { field: field.into(), variables, ordering })
    }

    pub fn field(&self) -> &Arc<Field> {
        &self.field
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn ordering(&self) -> &MonomialOrdering {
        &self.ordering
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_index(&self, name: &str) -> Result<usize> {
        self.variables.iter().position(|v| v == name).ok_or_else(|| AlgebraError::Arity(format!("unknown variable `{}` in ring {}", name, self)))
    }

    pub fn parse(&self, text: &str) -> Result<Polynomial> {
        syntax::parse_polynomial(&self.field, &self.variables, text)
    }

    pub fn format(&self, f: &Polynomial) -> String {
        syntax::format_polynomial(&self.field, &self.variables, &self.ordering, f)
    }

    ///
    /// Checks that the given polynomial belongs to this ring, i.e. has the right number
    /// of variables and coefficients in the right representation.
    ///
    pub fn check(&self, f: &Polynomial) -> Result<()> {
        if f.variable_count() != self.variable_count() {
            return Err(AlgebraError::Arity(format!("polynomial has {} variables, but ring {} has {}", f.variable_count(), self, self.variable_count())));
        }
        if let Some((c, _)) = f.terms().find(|(c, _)| !self.field.contains(c)) {
            return Err(AlgebraError::Coercion(format!("coefficient {:?} is not an element of {}", c, self.field)));
        }
        return Ok(());
    }

    pub fn zero(&self) -> Polynomial {
        Polynomial::zero(self.variable_count())
    }

    pub fn one(&self) -> Polynomial {
        self.constant(self.field.one())
    }

    pub fn constant(&self, c: FieldElement) -> Polynomial {
        Polynomial::constant(&self.field, c, self.variable_count())
    }

    pub fn variable(&self, i: usize) -> Polynomial {
        Polynomial::from_terms(&self.field, self.variable_count(), [(self.field.one(), Monomial::variable(i, self.variable_count()))])
    }

    pub fn monomial(&self, m: Monomial) -> Polynomial {
        Polynomial::from_terms(&self.field, self.variable_count(), [(self.field.one(), m)])
    }

    pub fn is_zero(&self, f: &Polynomial) -> bool {
        f.is_zero()
    }

    pub fn eq_el(&self, lhs: &Polynomial, rhs: &Polynomial) -> bool {
        self.sub(lhs, rhs).is_zero()
    }

    pub fn add(&self, lhs: &Polynomial, rhs: &Polynomial) -> Polynomial {
        lhs.add(rhs, &self.field)
    }

    pub fn sub(&self, lhs: &Polynomial, rhs: &Polynomial) -> Polynomial {
        lhs.sub(rhs, &self.field)
    }

    pub fn neg(&self, f: &Polynomial) -> Polynomial {
        f.neg(&self.field)
    }

    ///
    /// Computes `lhs * rhs`. Fails with [`AlgebraError::Domain`] if an exponent of the
    /// product exceeds the range of [`crate::multivariate::MonomialExponent`].
    ///
    pub fn mul(&self, lhs: &Polynomial, rhs: &Polynomial) -> Result<Polynomial> {
        Ok(lhs.mul(rhs, &self.field)?)
    }

    pub fn scale(&self, f: &Polynomial, c: &FieldElement) -> Polynomial {
        f.scale(c, &self.field)
    }

    pub fn pow(&self, f: &Polynomial, exp: u32) -> Result<Polynomial> {
        Ok(f.pow(exp, &self.field)?)
    }

    ///
    /// Returns the leading term of `f` w.r.t. the ring's monomial ordering.
    ///
    #[allow(non_snake_case)]
    pub fn LT<'a>(&self, f: &'a Polynomial) -> Option<(&'a FieldElement, &'a Monomial)> {
        f.leading_term(&self.ordering)
    }

    pub fn lm<'a>(&self, f: &'a Polynomial) -> Option<&'a Monomial> {
        self.LT(f).map(|(_, m)| m)
    }

    ///
    /// Computes `lhs / rhs`, if `rhs` divides `lhs` exactly.
    ///
    pub fn checked_div(&self, lhs: &Polynomial, rhs: &Polynomial) -> Option<Polynomial> {
        lhs.checked_div(rhs, &self.field, &self.ordering)
    }

    ///
    /// Substitutes the given values for the named variables. Variables not mentioned
    /// remain unchanged.
    ///
    pub fn substitute(&self, f: &Polynomial, values: &[(&str, FieldElement)]) -> Result<Polynomial> {
        let mut replacements = (0..self.variable_count()).map(|i| self.variable(i)).collect::<Vec<_>>();
        for (name, value) in values {
            replacements[self.variable_index(name)?] = self.constant(value.clone());
        }
        return self.evaluate_at(f, &replacements);
    }

    ///
    /// Evaluates `f` at the given point.
    ///
    pub fn evaluate(&self, f: &Polynomial, point: &[FieldElement]) -> Result<FieldElement> {
        if point.len() != self.variable_count() {
            return Err(AlgebraError::Arity(format!("point has {} coordinates, but ring {} has {} variables", point.len(), self, self.variable_count())));
        }
        let mut result = self.field.zero();
        for (c, m) in f.terms() {
            let value = (0..self.variable_count()).fold(c.clone(), |current, i| self.field.mul(&current, &self.field.pow(&point[i], m[i])));
            result = self.field.add(&result, &value);
        }
        return Ok(result);
    }

    fn evaluate_at(&self, f: &Polynomial, replacements: &[Polynomial]) -> Result<Polynomial> {
        let mut result = self.zero();
        for (c, m) in f.terms() {
            let mut term = self.constant(c.clone());
            for i in m.support() {
                term = self.mul(&term, &self.pow(&replacements[i], m[i])?)?;
            }
            result = self.add(&result, &term);
        }
        return Ok(result);
    }
}

impl PartialEq for Ring {

    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.field, &other.field) || self.field == other.field) &&
            self.variables == other.variables &&
            self.ordering == other.ordering
    }
}

impl Debug for Ring {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ring({:?}, ({}), {})", self.field, self.variables.join(", "), self.ordering)
    }
}

///
/// Displays the ring as in a ring declaration of the computation engine, e.g. `0, (x, y), dp`.
///
impl Display for Ring {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, ({}), {}", self.field.notation(), self.variables.join(", "), self.ordering)
    }
}

#[test]
fn test_ring_validation() {
    assert!(Ring::new(Field::rationals(), ["x", "y"], MonomialOrdering::DegRevLex).is_ok());
    assert!(matches!(Ring::new(Field::rationals(), Vec::<String>::new(), MonomialOrdering::DegRevLex), Err(AlgebraError::Arity(_))));
    assert!(matches!(Ring::new(Field::rationals(), ["x", "x"], MonomialOrdering::DegRevLex), Err(AlgebraError::Arity(_))));
    assert!(matches!(Ring::new(Field::rationals(), ["x", "2y"], MonomialOrdering::DegRevLex), Err(AlgebraError::Parse { .. })));
    assert!(matches!(Ring::new(Field::rationals(), ["x", "I"], MonomialOrdering::DegRevLex), Err(AlgebraError::Parse { .. })));
    assert!(matches!(Ring::new(Field::rationals(), ["x", "y"], MonomialOrdering::elimination(1, 2)), Err(AlgebraError::Arity(_))));
    assert!(Ring::new(Field::rationals(), ["x", "y", "z"], MonomialOrdering::elimination(1, 2)).is_ok());
}

#[test]
fn test_ring_equality() {
    let field = Arc::new(Field::finite_field(7).unwrap());
    let R1 = Ring::new(field.clone(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
    let R2 = Ring::new(Field::finite_field(7).unwrap(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
    let R3 = Ring::new(field.clone(), ["x", "y"], MonomialOrdering::Lex).unwrap();
    let R4 = Ring::new(Field::finite_field(11).unwrap(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
    let R5 = Ring::new(field, ["y", "x"], MonomialOrdering::DegRevLex).unwrap();
    assert_eq!(R1, R2);
    assert_ne!(R1, R3);
    assert_ne!(R1, R4);
    assert_ne!(R1, R5);
    assert_eq!("7, (x, y), dp", format!("{}", R1));
    assert_eq!(1, R1.variable_index("y").unwrap());
    assert!(matches!(R1.variable_index("z"), Err(AlgebraError::Arity(_))));
}

#[test]
fn test_evaluate_substitute() {
    let ring = Ring::new(Field::rationals(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
    let QQ = ring.field().clone();
    let f = ring.parse("x^2*y - 3*y + 1").unwrap();
    assert_eq!(QQ.int(-1), ring.evaluate(&f, &[QQ.int(2), QQ.int(-2)]).unwrap());
    assert!(matches!(ring.evaluate(&f, &[QQ.int(2)]), Err(AlgebraError::Arity(_))));
    let g = ring.substitute(&f, &[("x", QQ.int(2))]).unwrap();
    assert_eq!("y+1", ring.format(&g));
    assert!(matches!(ring.substitute(&f, &[("z", QQ.int(2))]), Err(AlgebraError::Arity(_))));
}

#[test]
fn test_check() {
    let ring = Ring::new(Field::finite_field(5).unwrap(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
    assert!(ring.check(&ring.parse("x*y - 1").unwrap()).is_ok());
    assert!(matches!(ring.check(&Polynomial::zero(3)), Err(AlgebraError::Arity(_))));
    let bad = Polynomial::constant(&Field::rationals(), FieldElement::Modular(7), 2);
    assert!(matches!(ring.check(&bad), Err(AlgebraError::Coercion(_))));
}
