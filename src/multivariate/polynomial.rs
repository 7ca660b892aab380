use std::collections::BTreeMap;
use std::result::Result;

use crate::error::ExponentOverflow;
use crate::field::*;
use crate::multivariate::*;

static GLOBAL_DIVISION_ORDER: MonomialOrdering = MonomialOrdering::DegRevLex;

///
/// A sparse multivariate polynomial, stored as map from monomials to their
/// (nonzero) coefficients.
///
/// A polynomial does not know its coefficient field; all operations that
/// combine coefficients take the field as parameter. Usually, polynomials are
/// manipulated through a [`crate::ring::Ring`], which forwards to the functions
/// here.
///
#[derive(Clone, PartialEq, Debug)]
pub struct Polynomial {
    variable_count: usize,
    terms: BTreeMap<Monomial, FieldElement>
}

impl Polynomial {

    pub fn zero(variable_count: usize) -> Self {
        Polynomial { variable_count, terms: BTreeMap::new() }
    }

    pub fn constant(field: &Field, c: FieldElement, variable_count: usize) -> Self {
        Self::from_terms(field, variable_count, [(c, Monomial::one(variable_count))])
    }

    ///
    /// Creates the polynomial `sum c * m` over the given terms. Terms with equal monomials
    /// are added up, and zero coefficients are dropped.
    ///
    pub fn from_terms<I>(field: &Field, variable_count: usize, terms: I) -> Self
        where I: IntoIterator<Item = (FieldElement, Monomial)>
    {
        let mut result = Self::zero(variable_count);
        for (c, m) in terms {
            debug_assert_eq!(variable_count, m.len());
            result.add_term(field, c, m);
        }
        return result;
    }

    fn add_term(&mut self, field: &Field, c: FieldElement, m: Monomial) {
        if let Some(current) = self.terms.get_mut(&m) {
            let sum = field.add(current, &c);
            if field.is_zero(&sum) {
                self.terms.remove(&m);
            } else {
                *current = sum;
            }
        } else if !field.is_zero(&c) {
            self.terms.insert(m, c);
        }
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn terms(&self) -> impl '_ + Iterator<Item = (&FieldElement, &Monomial)> {
        self.terms.iter().map(|(m, c)| (c, m))
    }

    ///
    /// Returns the terms, sorted descending w.r.t. the given ordering.
    ///
    pub fn sorted_terms(&self, order: &MonomialOrdering) -> Vec<(&FieldElement, &Monomial)> {
        let mut result = self.terms().collect::<Vec<_>>();
        result.sort_by(|(_, l), (_, r)| order.compare(r, l));
        return result;
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    ///
    /// Returns whether this polynomial is a nonzero constant.
    ///
    pub fn is_unit(&self) -> bool {
        self.terms.len() == 1 && self.terms.keys().all(|m| m.is_one())
    }

    pub fn coefficient_at(&self, m: &Monomial) -> Option<&FieldElement> {
        self.terms.get(m)
    }

    ///
    /// Returns the total degree, or `None` for the zero polynomial.
    ///
    pub fn deg(&self) -> Option<u64> {
        self.terms.keys().map(|m| m.deg()).max()
    }

    ///
    /// Returns the indices of all variables that appear in some term.
    ///
    pub fn appearing_variables(&self) -> Vec<usize> {
        (0..self.variable_count).filter(|i| self.terms.keys().any(|m| m[*i] > 0)).collect()
    }

    ///
    /// Returns the leading term w.r.t. the given ordering, or `None` if the polynomial is zero.
    ///
    pub fn leading_term(&self, order: &MonomialOrdering) -> Option<(&FieldElement, &Monomial)> {
        self.terms.iter().max_by(|(l, _), (r, _)| order.compare(l, r)).map(|(m, c)| (c, m))
    }

    pub fn add(&self, rhs: &Self, field: &Field) -> Self {
        let mut result = self.clone();
        for (m, c) in &rhs.terms {
            result.add_term(field, c.clone(), m.clone());
        }
        return result;
    }

    pub fn neg(&self, field: &Field) -> Self {
        Polynomial {
            variable_count: self.variable_count,
            terms: self.terms.iter().map(|(m, c)| (m.clone(), field.neg(c))).collect()
        }
    }

    pub fn sub(&self, rhs: &Self, field: &Field) -> Self {
        self.add(&rhs.neg(field), field)
    }

    ///
    /// Computes `c * m * self`.
    ///
    pub fn mul_term(&self, c: &FieldElement, m: &Monomial, field: &Field) -> Result<Self, ExponentOverflow> {
        let mut result = Self::zero(self.variable_count);
        for (self_m, self_c) in &self.terms {
            result.add_term(field, field.mul(self_c, c), self_m.checked_mul(m).ok_or(ExponentOverflow)?);
        }
        return Ok(result);
    }

    pub fn scale(&self, c: &FieldElement, field: &Field) -> Self {
        Self::from_terms(field, self.variable_count, self.terms.iter().map(|(m, self_c)| (field.mul(self_c, c), m.clone())))
    }

    pub fn mul(&self, rhs: &Self, field: &Field) -> Result<Self, ExponentOverflow> {
        let mut result = Self::zero(self.variable_count);
        for (lm, lc) in &self.terms {
            for (rm, rc) in &rhs.terms {
                result.add_term(field, field.mul(lc, rc), lm.checked_mul(rm).ok_or(ExponentOverflow)?);
            }
        }
        return Ok(result);
    }

    pub fn pow(&self, mut exp: u32, field: &Field) -> Result<Self, ExponentOverflow> {
        let mut result = Self::constant(field, field.one(), self.variable_count);
        let mut current = self.clone();
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(&current, field)?;
            }
            exp >>= 1;
            if exp > 0 {
                current = current.mul(&current, field)?;
            }
        }
        return Ok(result);
    }

    ///
    /// Scales the polynomial such that its leading coefficient is one.
    ///
    pub fn normalize(&self, field: &Field, order: &MonomialOrdering) -> Self {
        match self.leading_term(order) {
            None => self.clone(),
            Some((lc, _)) => match field.inv(lc) {
                Ok(lc_inv) => self.scale(&lc_inv, field),
                Err(_) => self.clone()
            }
        }
    }

    ///
    /// Divides by `rhs`, if the division is exact. Returns `None` if `rhs` is zero or
    /// does not divide `self`.
    ///
    pub fn checked_div(&self, rhs: &Self, field: &Field, order: &MonomialOrdering) -> Option<Self> {
        // the quotient does not depend on the ordering, but division w.r.t. a local ordering might not terminate
        let order = if order.is_global() { order } else { &GLOBAL_DIVISION_ORDER };
        let (rhs_lc, rhs_lm) = rhs.leading_term(order)?;
        let rhs_lc_inv = field.inv(rhs_lc).ok()?;
        let mut remainder = self.clone();
        let mut quotient = Self::zero(self.variable_count);
        while let Some((lc, lm)) = remainder.leading_term(order) {
            let quo_m = lm.div(rhs_lm)?;
            let quo_c = field.mul(lc, &rhs_lc_inv);
            remainder = remainder.sub(&rhs.mul_term(&quo_c, &quo_m, field).ok()?, field);
            quotient.add_term(field, quo_c, quo_m);
        }
        return Some(quotient);
    }

    ///
    /// Returns the polynomial in the variables selected by `keep` (in the given order),
    /// assuming it does not contain any other variable.
    ///
    pub fn restrict(&self, keep: &[usize]) -> Self {
        debug_assert!(self.appearing_variables().iter().all(|i| keep.contains(i)));
        Polynomial {
            variable_count: keep.len(),
            terms: self.terms.iter().map(|(m, c)| (m.restrict(keep), c.clone())).collect()
        }
    }

    ///
    /// Embeds the polynomial into a ring with more variables, where variable `i` is
    /// mapped to variable `positions[i]`.
    ///
    pub fn embed(&self, positions: &[usize], variable_count: usize) -> Self {
        Polynomial {
            variable_count,
            terms: self.terms.iter().map(|(m, c)| {
                let mut exponents = vec![0; variable_count];
                for (i, j) in positions.iter().enumerate() {
                    exponents[*j] = m[i];
                }
                (Monomial::new(exponents), c.clone())
            }).collect()
        }
    }
}

#[cfg(test)]
fn poly(field: &Field, terms: &[(i64, [u32; 2])]) -> Polynomial {
    Polynomial::from_terms(field, 2, terms.iter().map(|(c, e)| (field.int(*c), Monomial::new(e.to_vec()))))
}

#[test]
fn test_arithmetic() {
    let QQ = Field::rationals();
    let f = poly(&QQ, &[(1, [1, 0]), (1, [0, 1])]);
    let g = poly(&QQ, &[(1, [1, 0]), (-1, [0, 1])]);
    assert_eq!(poly(&QQ, &[(1, [2, 0]), (-1, [0, 2])]), f.mul(&g, &QQ).unwrap());
    assert_eq!(poly(&QQ, &[(2, [0, 1])]), f.sub(&g, &QQ));
    assert!(f.sub(&f, &QQ).is_zero());
    assert_eq!(poly(&QQ, &[(1, [2, 0]), (2, [1, 1]), (1, [0, 2])]), f.pow(2, &QQ).unwrap());
    assert!(f.pow(0, &QQ).unwrap().is_unit());
    assert_eq!(Some(2), f.pow(2, &QQ).unwrap().deg());
    assert_eq!(poly(&QQ, &[(2, [1, 0])]), g.scale(&QQ.int(2), &QQ).add(&poly(&QQ, &[(2, [0, 1])]), &QQ));
    assert!(f.scale(&QQ.zero(), &QQ).is_zero());
    assert_eq!(None, Polynomial::zero(2).deg());
}

#[test]
fn test_leading_term() {
    let QQ = Field::rationals();
    let f = poly(&QQ, &[(3, [0, 2]), (2, [1, 0]), (1, [0, 0])]);
    assert_eq!(Some((&QQ.int(3), &Monomial::new(vec![0, 2]))), f.leading_term(&MonomialOrdering::DegRevLex));
    assert_eq!(Some((&QQ.int(2), &Monomial::new(vec![1, 0]))), f.leading_term(&MonomialOrdering::Lex));
    assert_eq!(Some((&QQ.int(1), &Monomial::new(vec![0, 0]))), f.leading_term(&MonomialOrdering::NegLex));
    let sorted = f.sorted_terms(&MonomialOrdering::DegRevLex).into_iter().map(|(_, m)| m.clone()).collect::<Vec<_>>();
    assert_eq!(vec![Monomial::new(vec![0, 2]), Monomial::new(vec![1, 0]), Monomial::new(vec![0, 0])], sorted);
}

#[test]
fn test_checked_div() {
    let Fp = Field::finite_field(7).unwrap();
    let f = poly(&Fp, &[(1, [1, 0]), (1, [0, 1])]);
    let g = poly(&Fp, &[(1, [1, 0]), (6, [0, 1])]);
    let product = f.mul(&g, &Fp).unwrap();
    assert_eq!(Some(g.clone()), product.checked_div(&f, &Fp, &MonomialOrdering::DegRevLex));
    assert_eq!(None, f.checked_div(&g, &Fp, &MonomialOrdering::DegRevLex));
    assert_eq!(None, f.checked_div(&Polynomial::zero(2), &Fp, &MonomialOrdering::DegRevLex));
}

#[test]
fn test_restrict_embed() {
    let QQ = Field::rationals();
    let f = poly(&QQ, &[(1, [0, 3]), (-1, [0, 0])]);
    assert_eq!(vec![1], f.appearing_variables());
    let restricted = f.restrict(&[1]);
    assert_eq!(1, restricted.variable_count());
    assert_eq!(f, restricted.embed(&[1], 2));
}

#[test]
fn test_exponent_overflow() {
    let QQ = Field::rationals();
    let x = poly(&QQ, &[(1, [1, 0])]);
    let big = poly(&QQ, &[(1, [u32::MAX, 0]), (1, [0, 1])]);
    assert_eq!(Err(ExponentOverflow), big.mul(&x, &QQ));
    assert_eq!(Err(ExponentOverflow), x.pow(u32::MAX, &QQ).unwrap().mul(&x, &QQ));
    assert_eq!(Ok(poly(&QQ, &[(1, [u32::MAX, 0])])), x.pow(u32::MAX, &QQ));
    assert_eq!(Err(ExponentOverflow), big.pow(2, &QQ));
    assert_eq!(Err(ExponentOverflow), big.mul_term(&QQ.one(), &Monomial::new(vec![1, 0]), &QQ));
    assert_eq!(None, big.checked_div(&x, &QQ, &MonomialOrdering::DegRevLex));
}
