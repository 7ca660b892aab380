use std::cmp::Ordering;
use std::fmt::Debug;

use tracing::{event, instrument, Level};

use crate::error::ExponentOverflow;
use crate::field::*;
use crate::multivariate::*;
use crate::multivariate::polynomial::Polynomial;

///
/// The S-polynomial of the `i`-th and `j`-th basis polynomial.
///
#[stability::unstable(feature = "enable")]
#[derive(PartialEq, Clone, Copy, Eq, Hash)]
pub struct SPoly(pub usize, pub usize);

impl Debug for SPoly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S({}, {})", self.0, self.1)
    }
}

fn lm<'a>(f: &'a Polynomial, order: &MonomialOrdering) -> &'a Monomial {
    f.leading_term(order).map(|(_, m)| m).expect("basis polynomials are nonzero")
}

impl SPoly {

    #[stability::unstable(feature = "enable")]
    pub fn lcm_monomial(&self, basis: &[Polynomial], order: &MonomialOrdering) -> Monomial {
        lm(&basis[self.0], order).lcm(lm(&basis[self.1], order))
    }

    #[stability::unstable(feature = "enable")]
    pub fn poly(&self, field: &Field, basis: &[Polynomial], order: &MonomialOrdering) -> Result<Polynomial, ExponentOverflow> {
        let (f1, f2) = (&basis[self.0], &basis[self.1]);
        let (f1_c, f1_m) = f1.leading_term(order).expect("basis polynomials are nonzero");
        let (f2_c, f2_m) = f2.leading_term(order).expect("basis polynomials are nonzero");
        let lcm = f1_m.lcm(f2_m);
        let f1_scaled = f1.mul_term(&field.inv(f1_c).unwrap_or_else(|_| field.one()), &lcm.div(f1_m).unwrap_or_else(|| Monomial::one(lcm.len())), field)?;
        let f2_scaled = f2.mul_term(&field.inv(f2_c).unwrap_or_else(|_| field.one()), &lcm.div(f2_m).unwrap_or_else(|| Monomial::one(lcm.len())), field)?;
        return Ok(f1_scaled.sub(&f2_scaled, field));
    }
}

fn find_reducer<'a, I>(field: &Field, f: &Polynomial, reducers: I, order: &MonomialOrdering) -> Option<(&'a Polynomial, FieldElement, Monomial)>
    where I: Iterator<Item = &'a Polynomial>
{
    let (f_lc, f_lm) = f.leading_term(order)?;
    reducers.filter_map(|reducer| {
        let (r_lc, r_lm) = reducer.leading_term(order)?;
        let quo_m = f_lm.div(r_lm)?;
        let quo_c = field.div(f_lc, r_lc).ok()?;
        return Some((reducer, quo_c, quo_m));
    }).next()
}

///
/// Checks whether the given S-polynomial can be discarded, by the product criterion
/// or by the chain criterion. Returns the index of the basis polynomial that witnesses
/// the chain criterion, or `usize::MAX` if the product criterion applies.
///
fn filter_spoly(new_spoly: SPoly, basis: &[Polynomial], order: &MonomialOrdering) -> Option<usize> {
    let SPoly(i, k) = new_spoly;
    assert!(i < k);
    let bi_m = lm(&basis[i], order);
    let bk_m = lm(&basis[k], order);
    if bi_m.is_coprime(bk_m) {
        return Some(usize::MAX);
    }
    let S_m = bi_m.lcm(bk_m);
    (0..k).filter_map(|j| {
        if j == i {
            return None;
        }
        let f_m = lm(&basis[j], order).lcm(bk_m);
        if j < i && f_m == S_m {
            return Some(j);
        }
        if let Some(quo) = S_m.div(&f_m) {
            if quo.deg() > 0 {
                return Some(j);
            }
        }
        return None;
    }).next()
}

///
/// Sorts S-polynomials descending by the degree of their lcm, so that those of smallest
/// degree are reduced first.
///
#[stability::unstable(feature = "enable")]
pub fn default_sort_fn<'a>(order: &'a MonomialOrdering) -> impl 'a + FnMut(&mut [SPoly], &[Polynomial]) {
    move |open, basis| open.sort_by_key(|spoly| -(spoly.lcm_monomial(basis, order).deg() as i64))
}

///
/// Computes a Groebner basis of the ideal generated by the input basis w.r.t. the given
/// global monomial ordering.
///
/// For a variant of this function that uses sensible defaults and returns the reduced
/// Groebner basis, see [`buchberger_simple()`].
///
/// The algorithm reduces all S-polynomials of the current minimal lcm degree before adding
/// them to the basis. The behavior can be modified by passing custom functions for
/// `sort_spolys` and `abort_early_if`.
///
/// - `sort_spolys` should permute the given list of S-polynomials w.r.t. the given basis;
///   S-polynomials that are supposed to be reduced first should be put at the end of the list.
/// - `abort_early_if` takes the current basis, and can return `true` to abort the computation,
///   yielding the current basis. In this case, the basis will in general not be a Groebner basis.
///
/// Local orderings are not supported, since the algorithm does not terminate for them in general.
/// Fails if an intermediate polynomial has an exponent that does not fit into a [`MonomialExponent`].
///
#[stability::unstable(feature = "enable")]
#[instrument(skip_all, level = "trace")]
pub fn buchberger<SortFn, AbortFn>(field: &Field, input_basis: Vec<Polynomial>, order: &MonomialOrdering, mut sort_spolys: SortFn, mut abort_early_if: AbortFn) -> Result<Vec<Polynomial>, ExponentOverflow>
    where SortFn: FnMut(&mut [SPoly], &[Polynomial]),
        AbortFn: FnMut(&[Polynomial]) -> bool
{
    assert!(order.is_global());
    event!(Level::TRACE, len = input_basis.len(), "buchberger");

    let input_basis = inter_reduce(field, input_basis.into_iter().filter(|f| !f.is_zero()).collect(), order)?;

    let sort_reducers = |reducers: &mut [Polynomial]| {
        reducers.sort_by(|lf, rf| order.compare(lm(lf, order), lm(rf, order)).then_with(|| lf.term_count().cmp(&rf.term_count())))
    };

    // invariant: `(reducers) = (basis)` and there exists a reduction to zero for every `f` in `basis` modulo `reducers`
    let mut reducers: Vec<Polynomial> = input_basis.clone();
    sort_reducers(&mut reducers);

    let mut open = Vec::new();
    let mut basis = Vec::new();
    update_basis(input_basis.into_iter(), &mut basis, &mut open, order, &mut 0, &mut sort_spolys);

    let mut current_deg = 0;
    let mut filtered_spolys = 0;
    let mut changed = false;
    loop {

        // reduce all known S-polys of minimal lcm degree
        let spolys_to_reduce_index = open.iter().enumerate().rev()
            .filter(|(_, spoly): &(usize, &SPoly)| spoly.lcm_monomial(&basis, order).deg() > current_deg)
            .next().map(|(i, _)| i + 1).unwrap_or(0);

        let mut new_polys: Vec<Polynomial> = Vec::new();
        for spoly in &open[spolys_to_reduce_index..] {
            let mut f = spoly.poly(field, &basis, order)?;
            reduce_poly(field, &mut f, || reducers.iter().chain(new_polys.iter()), order)?;
            if !f.is_zero() {
                new_polys.push(f);
            }
        }
        drop(open.drain(spolys_to_reduce_index..));

        if new_polys.len() == 0 && open.len() == 0 {
            if changed {
                // the reducers might not form a GB yet, since S-polys between two
                // inter-reduced reducers might not have been considered
                event!(Level::TRACE, reducers = reducers.len(), "restart");
                return buchberger(field, reducers, order, sort_spolys, abort_early_if);
            } else {
                return Ok(reducers);
            }
        } else if new_polys.len() == 0 {
            current_deg = open.last().map(|spoly| spoly.lcm_monomial(&basis, order).deg()).unwrap_or(0);
        } else {
            changed = true;
            current_deg = 0;
            update_basis(new_polys.iter().cloned(), &mut basis, &mut open, order, &mut filtered_spolys, &mut sort_spolys);
            event!(Level::TRACE, basis = basis.len(), open = open.len(), filtered = filtered_spolys);

            reducers.extend(new_polys.into_iter());
            reducers = inter_reduce(field, reducers, order)?;
            sort_reducers(&mut reducers);
            if abort_early_if(&reducers) {
                event!(Level::DEBUG, reducers = reducers.len(), "early abort");
                return Ok(reducers);
            }
        }

        // less S-polys if we restart from scratch with reducers
        if open.len() + filtered_spolys > reducers.len() * reducers.len() / 2 + 1 {
            event!(Level::TRACE, reducers = reducers.len(), "restart");
            return buchberger(field, reducers, order, sort_spolys, abort_early_if);
        }
    }
}

fn update_basis<I, SortFn>(new_polys: I, basis: &mut Vec<Polynomial>, open: &mut Vec<SPoly>, order: &MonomialOrdering, filtered_spolys: &mut usize, sort_spolys: &mut SortFn)
    where SortFn: FnMut(&mut [SPoly], &[Polynomial]),
        I: Iterator<Item = Polynomial>
{
    for new_poly in new_polys {
        basis.push(new_poly);
        for i in 0..(basis.len() - 1) {
            let spoly = SPoly(i, basis.len() - 1);
            if filter_spoly(spoly, &*basis, order).is_none() {
                open.push(spoly);
            } else {
                *filtered_spolys += 1;
            }
        }
    }
    sort_spolys(&mut *open, &*basis);
}

fn reduce_poly<'a, F, I>(field: &Field, to_reduce: &mut Polynomial, mut reducers: F, order: &MonomialOrdering) -> Result<(), ExponentOverflow>
    where F: FnMut() -> I,
        I: Iterator<Item = &'a Polynomial>
{
    while let Some((reducer, quo_c, quo_m)) = find_reducer(field, to_reduce, reducers(), order) {
        let scaled_reducer = reducer.mul_term(&quo_c, &quo_m, field)?;
        debug_assert!(order.compare(lm(&scaled_reducer, order), lm(to_reduce, order)) == Ordering::Equal);
        *to_reduce = to_reduce.sub(&scaled_reducer, field);
    }
    return Ok(());
}

///
/// Computes the normal form of `f` modulo the given polynomials, i.e. reduces every
/// term of `f` (not only the leading one) as long as possible. If the reducers form a
/// Groebner basis, the result is zero if and only if `f` is in the ideal they generate,
/// and does not depend on the order of the reducers.
///
#[stability::unstable(feature = "enable")]
pub fn multivariate_division<'a, I>(field: &Field, mut f: Polynomial, reducers: I, order: &MonomialOrdering) -> Result<Polynomial, ExponentOverflow>
    where I: Clone + Iterator<Item = &'a Polynomial>
{
    let mut remainder = Polynomial::zero(f.variable_count());
    loop {
        reduce_poly(field, &mut f, || reducers.clone(), order)?;
        let (c, m) = match f.leading_term(order) {
            Some((c, m)) => (c.clone(), m.clone()),
            None => return Ok(remainder)
        };
        let lt = Polynomial::from_terms(field, f.variable_count(), [(c, m)]);
        f = f.sub(&lt, field);
        remainder = remainder.add(&lt, field);
    }
}

fn inter_reduce(field: &Field, mut polys: Vec<Polynomial>, order: &MonomialOrdering) -> Result<Vec<Polynomial>, ExponentOverflow> {
    let mut changed = true;
    while changed {
        changed = false;
        let mut i = 0;
        while i < polys.len() {
            let last_i = polys.len() - 1;
            polys.swap(i, last_i);
            let (reducers, to_reduce) = polys.split_at_mut(last_i);
            let to_reduce = &mut to_reduce[0];

            let before = to_reduce.clone();
            reduce_poly(field, to_reduce, || reducers.iter(), order)?;
            if *to_reduce != before {
                changed = true;
            }

            // undo swap so that the outer loop still iterates over every poly
            if !to_reduce.is_zero() {
                polys.swap(i, last_i);
                i += 1;
            } else {
                _ = polys.pop();
            }
        }
    }
    return Ok(polys);
}

///
/// Turns a Groebner basis into the reduced Groebner basis, i.e. removes redundant elements,
/// reduces all non-leading terms and makes every element monic. The result is sorted
/// descending by leading monomials.
///
#[stability::unstable(feature = "enable")]
pub fn reduce_groebner_basis(field: &Field, basis: Vec<Polynomial>, order: &MonomialOrdering) -> Result<Vec<Polynomial>, ExponentOverflow> {
    let mut basis = basis.into_iter().filter(|f| !f.is_zero()).collect::<Vec<_>>();
    // drop elements whose leading monomial is divisible by another one
    let mut i = 0;
    while i < basis.len() {
        let redundant = (0..basis.len()).any(|j| j != i && lm(&basis[j], order).divides(lm(&basis[i], order)) && (lm(&basis[j], order) != lm(&basis[i], order) || j < i));
        if redundant {
            basis.remove(i);
        } else {
            i += 1;
        }
    }
    let mut result = Vec::new();
    for i in 0..basis.len() {
        let (c, m) = basis[i].leading_term(order).map(|(c, m)| (c.clone(), m.clone())).expect("basis polynomials are nonzero");
        let lt = Polynomial::from_terms(field, m.len(), [(c, m)]);
        let tail = basis[i].sub(&lt, field);
        let others = basis.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, f)| f).collect::<Vec<_>>();
        let reduced_tail = multivariate_division(field, tail, others.iter().copied(), order)?;
        result.push(lt.add(&reduced_tail, field).normalize(field, order));
    }
    result.sort_by(|l, r| order.compare(lm(r, order), lm(l, order)));
    return Ok(result);
}

///
/// Computes the reduced Groebner basis of the ideal generated by the input basis w.r.t.
/// the given global monomial ordering.
///
/// For a variant of this function that allows for more configuration, see [`buchberger()`].
///
pub fn buchberger_simple(field: &Field, input_basis: Vec<Polynomial>, order: &MonomialOrdering) -> Result<Vec<Polynomial>, ExponentOverflow> {
    let gb = buchberger(field, input_basis, order, default_sort_fn(order), |_| false)?;
    return reduce_groebner_basis(field, gb, order);
}

#[cfg(test)]
use crate::ring::Ring;

#[cfg(test)]
fn parse_all(ring: &Ring, polys: &[&str]) -> Vec<Polynomial> {
    polys.iter().map(|f| ring.parse(f).unwrap()).collect()
}

#[test]
fn test_buchberger_small() {
    let ring = Ring::new(Field::finite_field(17).unwrap(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
    let [f1, f2] = <[Polynomial; 2]>::try_from(parse_all(&ring, &["x^2 + y^2 - 1", "x*y - 2"])).unwrap();

    let actual = buchberger(ring.field(), vec![f1.clone(), f2.clone()], ring.ordering(), default_sort_fn(ring.ordering()), |_| false).unwrap();

    let expected = ring.parse("-y^3 - 2*x + y").unwrap();

    assert_eq!(3, actual.len());
    assert!(multivariate_division(ring.field(), f1, actual.iter(), ring.ordering()).unwrap().is_zero());
    assert!(multivariate_division(ring.field(), f2, actual.iter(), ring.ordering()).unwrap().is_zero());
    assert!(multivariate_division(ring.field(), expected, actual.iter(), ring.ordering()).unwrap().is_zero());
}

#[test]
fn test_buchberger_larger() {
    let ring = Ring::new(Field::finite_field(17).unwrap(), ["x", "y", "z"], MonomialOrdering::DegRevLex).unwrap();
    let basis = parse_all(&ring, &[
        "x^2*y*z + y^2 + x*z + 2*x + 1",
        "y^3*z + z^3 + x*y",
        "x*z^2 + x*z + 2*y*z + 7"
    ]);

    let actual = buchberger(ring.field(), basis, ring.ordering(), default_sort_fn(ring.ordering()), |_| false).unwrap();

    let g1 = ring.parse("y^4 + 8*y^3*z + 12*y*z^3 + 6*z^4 + y^3 + 13*y^2*z + 11*y*z^2 + 10*z^3 + 11*y^2 + 12*y*z + 6*z^2 + 6*y + 13*z + 9").unwrap();
    assert!(multivariate_division(ring.field(), g1, actual.iter(), ring.ordering()).unwrap().is_zero());
}

#[test]
fn test_gb_lex() {
    let ring = Ring::new(Field::rationals(), ["y", "x"], MonomialOrdering::Lex).unwrap();
    let basis = parse_all(&ring, &[
        "1 + x^2 + 2*y + (1 + x)*y^2",
        "3 + x + (2 + x)*y + (1 + x + x^2)*y^2"
    ]);
    let expected = parse_all(&ring, &[
        "2*y + x^6 + 3*x^5 + 6*x^4 + x^3 - 7*x^2 - 12*x - 2",
        "x^8 + 2*x^7 + 3*x^6 - 5*x^5 - 10*x^4 - 7*x^3 + 8*x^2 + 8*x + 4"
    ]);

    let gb = buchberger_simple(ring.field(), basis, ring.ordering()).unwrap();

    assert_eq!(2, gb.len());
    for (f, e) in gb.iter().zip(expected.iter()) {
        assert!(ring.eq_el(&e.normalize(ring.field(), ring.ordering()), f));
    }
}

#[test]
fn test_reduced_groebner_basis() {
    let ring = Ring::new(Field::rationals(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
    let basis = parse_all(&ring, &["x^2 - y", "x*y - 1"]);
    let gb = buchberger_simple(ring.field(), basis, ring.ordering()).unwrap();
    let gb = gb.iter().map(|f| ring.format(f)).collect::<Vec<_>>();
    assert_eq!(vec!["x^2-y".to_owned(), "x*y-1".to_owned(), "y^2-x".to_owned()], gb);
}

#[test]
fn test_abort_early() {
    let ring = Ring::new(Field::finite_field(17).unwrap(), ["x", "y", "z"], MonomialOrdering::DegRevLex).unwrap();
    let basis = parse_all(&ring, &[
        "x^2*y*z + y^2 + x*z + 2*x + 1",
        "y^3*z + z^3 + x*y",
        "x*z^2 + x*z + 2*y*z + 7"
    ]);
    let mut calls = 0;
    let partial = buchberger(ring.field(), basis, ring.ordering(), default_sort_fn(ring.ordering()), |_| { calls += 1; true }).unwrap();
    assert_eq!(1, calls);
    assert!(partial.len() > 0);
}

#[test]
fn test_unit_ideal() {
    let ring = Ring::new(Field::rationals(), ["x", "y"], MonomialOrdering::DegRevLex).unwrap();
    let basis = parse_all(&ring, &["x*y - 1", "x"]);
    let gb = buchberger_simple(ring.field(), basis, ring.ordering()).unwrap();
    assert_eq!(1, gb.len());
    assert!(ring.eq_el(&ring.one(), &gb[0]));
}

#[test]
fn test_exponent_overflow() {
    let ring = Ring::new(Field::rationals(), ["x", "y"], MonomialOrdering::Lex).unwrap();
    // the S-polynomial multiplies `y^4294967295` by `y`
    let basis = parse_all(&ring, &["x*y + y^4294967295", "x^2"]);
    assert_eq!(Err(ExponentOverflow), buchberger_simple(ring.field(), basis, ring.ordering()));
}
