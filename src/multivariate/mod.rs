use std::cmp::{max, Ordering};
use std::fmt::{Debug, Display};
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::*;

///
/// Contains [`polynomial::Polynomial`], the sparse representation of multivariate
/// polynomials, together with the coefficient-wise arithmetic on it.
///
pub mod polynomial;

pub type MonomialExponent = u32;

static ZERO: MonomialExponent = 0;

///
/// A monomial `X0^e0 * X1^e1 * ... * XN^eN`, stored as its exponent vector.
///
/// The length of the exponent vector is the number of variables of the ring
/// the monomial belongs to. The derived order is the plain lexicographic order
/// on exponent vectors, which is only used for storage; to compare monomials
/// w.r.t. the monomial ordering of a ring, use [`MonomialOrdering::compare()`].
///
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Monomial {
    exponents: Vec<MonomialExponent>
}

impl Monomial {

    pub fn new(exponents: Vec<MonomialExponent>) -> Self {
        Self { exponents }
    }

    ///
    /// The monomial `1` in `variable_count` variables.
    ///
    pub fn one(variable_count: usize) -> Self {
        Self { exponents: vec![0; variable_count] }
    }

    ///
    /// The monomial `Xi` in `variable_count` variables.
    ///
    pub fn variable(i: usize, variable_count: usize) -> Self {
        let mut exponents = vec![0; variable_count];
        exponents[i] = 1;
        Self { exponents }
    }

    pub fn exponents(&self) -> &[MonomialExponent] {
        &self.exponents
    }

    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    pub fn deg(&self) -> u64 {
        self.exponents.iter().map(|e| *e as u64).sum()
    }

    pub fn is_one(&self) -> bool {
        self.exponents.iter().all(|e| *e == 0)
    }

    pub fn divides(&self, rhs: &Self) -> bool {
        (0..max(self.len(), rhs.len())).all(|i| self[i] <= rhs[i])
    }

    pub fn is_coprime(&self, rhs: &Self) -> bool {
        (0..max(self.len(), rhs.len())).all(|i| self[i] == 0 || rhs[i] == 0)
    }

    ///
    /// Returns `self * rhs`, or `None` if an exponent of the product does not fit
    /// into a [`MonomialExponent`].
    ///
    pub fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        (0..max(self.len(), rhs.len())).map(|i| self[i].checked_add(rhs[i])).collect::<Option<Vec<_>>>().map(Self::new)
    }

    ///
    /// Returns `self / rhs`, if `rhs` divides `self`.
    ///
    pub fn div(&self, rhs: &Self) -> Option<Self> {
        if rhs.divides(self) {
            Some(Self::new((0..max(self.len(), rhs.len())).map(|i| self[i] - rhs[i]).collect()))
        } else {
            None
        }
    }

    pub fn lcm(&self, rhs: &Self) -> Self {
        Self::new((0..max(self.len(), rhs.len())).map(|i| max(self[i], rhs[i])).collect())
    }

    ///
    /// Returns the indices of all variables with nonzero exponent.
    ///
    pub fn support(&self) -> impl '_ + Iterator<Item = usize> {
        self.exponents.iter().enumerate().filter(|(_, e)| **e > 0).map(|(i, _)| i)
    }

    ///
    /// Returns the monomial in the variables selected by `keep` (in the given order).
    ///
    pub fn restrict(&self, keep: &[usize]) -> Self {
        Self::new(keep.iter().map(|i| self[*i]).collect())
    }
}

impl Index<usize> for Monomial {

    type Output = MonomialExponent;

    fn index(&self, index: usize) -> &Self::Output {
        if index >= self.exponents.len() {
            &ZERO
        } else {
            &self.exponents[index]
        }
    }
}

impl Debug for Monomial {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, e) in self.exponents.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", e)?;
        }
        write!(f, ")")
    }
}

///
/// A monomial ordering, as understood by the computation engine.
///
/// The variants correspond to the orderings `lp`, `rp`, `dp`, `Dp`, `ls`, `ds`
/// and block orderings like `(dp(2),lp(3))`. The first four are global
/// orderings, i.e. `1 < Xi` for all variables, which is necessary to do
/// elimination and Groebner basis computations in the usual sense.
///
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonomialOrdering {
    /// lexicographic order `lp`, with `X0 > X1 > ... > XN`
    Lex,
    /// reverse lexicographic order `rp`, i.e. lexicographic w.r.t. `XN > ... > X1 > X0`
    RevLex,
    /// graded reverse lexicographic order `dp`
    DegRevLex,
    /// graded lexicographic order `Dp`
    DegLex,
    /// negative lexicographic order `ls`, a local ordering
    NegLex,
    /// negative graded reverse lexicographic order `ds`, a local ordering
    NegDegRevLex,
    /// product order; monomials are compared by the first block in which they differ
    Block(Vec<(MonomialOrdering, usize)>)
}

impl MonomialOrdering {

    ///
    /// Creates the elimination ordering `(dp(n1),dp(n2))`, in which any monomial
    /// involving one of the first `larger_block` variables is larger than all monomials
    /// in the remaining variables.
    ///
    pub fn elimination(larger_block: usize, smaller_block: usize) -> Self {
        MonomialOrdering::Block(vec![(MonomialOrdering::DegRevLex, larger_block), (MonomialOrdering::DegRevLex, smaller_block)])
    }

    ///
    /// Parses the engine tag of an ordering, e.g. `dp` or `(lp(2),dp(1))`.
    ///
    pub fn from_tag(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        match tag {
            "lp" => return Ok(MonomialOrdering::Lex),
            "rp" => return Ok(MonomialOrdering::RevLex),
            "dp" => return Ok(MonomialOrdering::DegRevLex),
            "Dp" => return Ok(MonomialOrdering::DegLex),
            "ls" => return Ok(MonomialOrdering::NegLex),
            "ds" => return Ok(MonomialOrdering::NegDegRevLex),
            _ => {}
        }
        let inner = tag.strip_prefix('(').and_then(|t| t.strip_suffix(')'))
            .ok_or_else(|| AlgebraError::Ordering(format!("unknown monomial ordering `{}`", tag)))?;
        let mut blocks = Vec::new();
        for block in inner.split("),") {
            let block = block.trim().trim_end_matches(')');
            let (name, size) = block.split_once('(').ok_or_else(|| AlgebraError::Ordering(format!("block `{}` has no size", block)))?;
            let size = size.trim().parse::<usize>().map_err(|_| AlgebraError::Ordering(format!("block `{}` has invalid size", block)))?;
            let ordering = Self::from_tag(name)?;
            if let MonomialOrdering::Block(_) = ordering {
                return Err(AlgebraError::Ordering(format!("nested block ordering `{}`", tag)));
            }
            blocks.push((ordering, size));
        }
        return Ok(MonomialOrdering::Block(blocks));
    }

    pub fn tag(&self) -> String {
        match self {
            MonomialOrdering::Lex => "lp".to_owned(),
            MonomialOrdering::RevLex => "rp".to_owned(),
            MonomialOrdering::DegRevLex => "dp".to_owned(),
            MonomialOrdering::DegLex => "Dp".to_owned(),
            MonomialOrdering::NegLex => "ls".to_owned(),
            MonomialOrdering::NegDegRevLex => "ds".to_owned(),
            MonomialOrdering::Block(blocks) => format!("({})", blocks.iter().map(|(o, n)| format!("{}({})", o.tag(), n)).collect::<Vec<_>>().join(","))
        }
    }

    ///
    /// Returns whether this ordering is global, i.e. `1 < Xi` for every variable `Xi`.
    ///
    pub fn is_global(&self) -> bool {
        match self {
            MonomialOrdering::Lex | MonomialOrdering::RevLex | MonomialOrdering::DegRevLex | MonomialOrdering::DegLex => true,
            MonomialOrdering::NegLex | MonomialOrdering::NegDegRevLex => false,
            MonomialOrdering::Block(blocks) => blocks.iter().all(|(o, _)| o.is_global())
        }
    }

    ///
    /// Returns the total number of variables the ordering is defined for, if this
    /// is fixed (only the case for block orderings).
    ///
    pub fn fixed_variable_count(&self) -> Option<usize> {
        match self {
            MonomialOrdering::Block(blocks) => Some(blocks.iter().map(|(_, n)| *n).sum()),
            _ => None
        }
    }

    ///
    /// Compares two monomials according to this monomial order.
    ///
    pub fn compare(&self, lhs: &Monomial, rhs: &Monomial) -> Ordering {
        let n = max(lhs.len(), rhs.len());
        match self {
            MonomialOrdering::Lex => {
                for i in 0..n {
                    if lhs[i] != rhs[i] {
                        return lhs[i].cmp(&rhs[i]);
                    }
                }
                return Ordering::Equal;
            },
            MonomialOrdering::RevLex => {
                for i in (0..n).rev() {
                    if lhs[i] != rhs[i] {
                        return lhs[i].cmp(&rhs[i]);
                    }
                }
                return Ordering::Equal;
            },
            MonomialOrdering::DegRevLex => lhs.deg().cmp(&rhs.deg()).then_with(|| {
                for i in (0..n).rev() {
                    if lhs[i] != rhs[i] {
                        return rhs[i].cmp(&lhs[i]);
                    }
                }
                return Ordering::Equal;
            }),
            MonomialOrdering::DegLex => lhs.deg().cmp(&rhs.deg()).then_with(|| MonomialOrdering::Lex.compare(lhs, rhs)),
            MonomialOrdering::NegLex => MonomialOrdering::Lex.compare(rhs, lhs),
            MonomialOrdering::NegDegRevLex => rhs.deg().cmp(&lhs.deg()).then_with(|| MonomialOrdering::DegRevLex.compare(lhs, rhs)),
            MonomialOrdering::Block(blocks) => {
                let mut start = 0;
                for (ordering, size) in blocks {
                    let block = (start..(start + size)).collect::<Vec<_>>();
                    match ordering.compare(&lhs.restrict(&block), &rhs.restrict(&block)) {
                        Ordering::Equal => {},
                        result => return result
                    }
                    start += size;
                }
                return Ordering::Equal;
            }
        }
    }
}

impl Debug for MonomialOrdering {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl Display for MonomialOrdering {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
fn all_monomials_deg_le_2() -> Vec<Monomial> {
    vec![
        Monomial::new(vec![0, 0, 0]),
        Monomial::new(vec![0, 0, 1]),
        Monomial::new(vec![0, 0, 2]),
        Monomial::new(vec![0, 1, 0]),
        Monomial::new(vec![0, 1, 1]),
        Monomial::new(vec![0, 2, 0]),
        Monomial::new(vec![1, 0, 0]),
        Monomial::new(vec![1, 0, 1]),
        Monomial::new(vec![1, 1, 0]),
        Monomial::new(vec![2, 0, 0])
    ]
}

#[test]
fn test_lex() {
    let mut monomials = all_monomials_deg_le_2();
    monomials.sort_by(|l, r| MonomialOrdering::Lex.compare(l, r).reverse());
    assert_eq!(vec![
        Monomial::new(vec![2, 0, 0]),
        Monomial::new(vec![1, 1, 0]),
        Monomial::new(vec![1, 0, 1]),
        Monomial::new(vec![1, 0, 0]),
        Monomial::new(vec![0, 2, 0]),
        Monomial::new(vec![0, 1, 1]),
        Monomial::new(vec![0, 1, 0]),
        Monomial::new(vec![0, 0, 2]),
        Monomial::new(vec![0, 0, 1]),
        Monomial::new(vec![0, 0, 0])
    ], monomials);
}

#[test]
fn test_degrevlex() {
    let mut monomials = all_monomials_deg_le_2();
    monomials.sort_by(|l, r| MonomialOrdering::DegRevLex.compare(l, r).reverse());
    assert_eq!(vec![
        Monomial::new(vec![2, 0, 0]),
        Monomial::new(vec![1, 1, 0]),
        Monomial::new(vec![0, 2, 0]),
        Monomial::new(vec![1, 0, 1]),
        Monomial::new(vec![0, 1, 1]),
        Monomial::new(vec![0, 0, 2]),
        Monomial::new(vec![1, 0, 0]),
        Monomial::new(vec![0, 1, 0]),
        Monomial::new(vec![0, 0, 1]),
        Monomial::new(vec![0, 0, 0])
    ], monomials);
}

#[test]
fn test_elimination_ordering() {
    let order = MonomialOrdering::elimination(1, 2);
    // any monomial containing X0 is larger than any monomial without it
    assert_eq!(Ordering::Greater, order.compare(&Monomial::new(vec![1, 0, 0]), &Monomial::new(vec![0, 5, 7])));
    assert_eq!(Ordering::Less, order.compare(&Monomial::new(vec![0, 1, 1]), &Monomial::new(vec![0, 2, 1])));
    assert!(order.is_global());
    assert_eq!(Some(3), order.fixed_variable_count());
}

#[test]
fn test_local_orderings() {
    let one = Monomial::one(2);
    let x = Monomial::variable(0, 2);
    assert_eq!(Ordering::Greater, MonomialOrdering::NegLex.compare(&one, &x));
    assert_eq!(Ordering::Greater, MonomialOrdering::NegDegRevLex.compare(&one, &x));
    assert!(!MonomialOrdering::NegDegRevLex.is_global());
    assert_eq!(Ordering::Less, MonomialOrdering::RevLex.compare(&one, &x));
}

#[test]
fn test_ordering_tags() {
    for tag in ["lp", "rp", "dp", "Dp", "ls", "ds", "(dp(2),lp(1))"] {
        assert_eq!(tag, MonomialOrdering::from_tag(tag).unwrap().tag());
    }
    assert_eq!(MonomialOrdering::elimination(2, 3), MonomialOrdering::from_tag("(dp(2), dp(3))").unwrap());
    assert!(matches!(MonomialOrdering::from_tag("xy"), Err(AlgebraError::Ordering(_))));
    assert!(matches!(MonomialOrdering::from_tag("(dp(x))"), Err(AlgebraError::Ordering(_))));
}

#[test]
fn test_monomial_operations() {
    let a = Monomial::new(vec![2, 1, 0]);
    let b = Monomial::new(vec![1, 1, 3]);
    assert_eq!(Some(Monomial::new(vec![3, 2, 3])), a.checked_mul(&b));
    assert_eq!(None, a.checked_mul(&Monomial::new(vec![u32::MAX, 0, 0])));
    assert_eq!(Some(Monomial::new(vec![u32::MAX, 1, 0])), Monomial::new(vec![u32::MAX - 2, 0, 0]).checked_mul(&a));
    assert_eq!(Monomial::new(vec![2, 1, 3]), a.lcm(&b));
    assert_eq!(None, a.div(&b));
    assert_eq!(Some(Monomial::new(vec![1, 0, 0])), a.div(&Monomial::new(vec![1, 1, 0])));
    assert!(!a.is_coprime(&b));
    assert_eq!(vec![0, 1], a.support().collect::<Vec<_>>());
    assert_eq!(3, a.deg());
}
