use crate::multivariate::*;

///
/// Checks whether the variables marked in `set` are independent modulo an ideal with
/// the given leading monomials, i.e. no leading monomial involves only marked variables.
///
fn is_independent(leading_monomials: &[Monomial], set: &[bool]) -> bool {
    leading_monomials.iter().all(|m| m.support().any(|i| !set[i]))
}

fn extend_independent_sets(leading_monomials: &[Monomial], current: &mut Vec<bool>, next_var: usize, result: &mut Vec<Vec<bool>>) {
    if next_var == current.len() {
        let mut is_maximal = true;
        for i in 0..current.len() {
            if !current[i] {
                current[i] = true;
                let extendable = is_independent(leading_monomials, current);
                current[i] = false;
                if extendable {
                    is_maximal = false;
                    break;
                }
            }
        }
        if is_maximal {
            result.push(current.clone());
        }
        return;
    }
    current[next_var] = true;
    if is_independent(leading_monomials, current) {
        extend_independent_sets(leading_monomials, current, next_var + 1, result);
    }
    current[next_var] = false;
    extend_independent_sets(leading_monomials, current, next_var + 1, result);
}

///
/// Computes all maximal (w.r.t. inclusion) independent sets of variables modulo an ideal,
/// given the leading monomials of a Groebner basis of the ideal w.r.t. a global ordering.
///
/// Each set is returned as 0/1 vector, and the sets are sorted descending by size, and
/// then descending lexicographically. For the unit ideal, the result is empty.
///
pub fn independent_sets(leading_monomials: &[Monomial], variable_count: usize) -> Vec<Vec<i64>> {
    if leading_monomials.iter().any(|m| m.is_one()) {
        return Vec::new();
    }
    let mut result = Vec::new();
    extend_independent_sets(leading_monomials, &mut vec![false; variable_count], 0, &mut result);
    let mut result = result.into_iter().map(|set| set.into_iter().map(|x| if x { 1 } else { 0 }).collect::<Vec<i64>>()).collect::<Vec<_>>();
    result.sort_by(|l, r| r.iter().sum::<i64>().cmp(&l.iter().sum::<i64>()).then_with(|| r.cmp(l)));
    return result;
}

///
/// Computes the Krull dimension of `k[X0, ..., XN]/I`, given the leading monomials of a
/// Groebner basis of `I` w.r.t. a global ordering. This is the maximal size of an independent
/// set, or `-1` for the unit ideal.
///
pub fn dimension(leading_monomials: &[Monomial], variable_count: usize) -> i64 {
    independent_sets(leading_monomials, variable_count).first().map(|set| set.iter().sum::<i64>()).unwrap_or(-1)
}

#[test]
fn test_independent_sets() {
    // x1^2*x2
    let lms = [Monomial::new(vec![2, 1])];
    assert_eq!(vec![vec![1, 0], vec![0, 1]], independent_sets(&lms, 2));
    assert_eq!(1, dimension(&lms, 2));

    // x*y, x*z
    let lms = [Monomial::new(vec![1, 1, 0]), Monomial::new(vec![1, 0, 1])];
    assert_eq!(vec![vec![0, 1, 1], vec![1, 0, 0]], independent_sets(&lms, 3));
    assert_eq!(2, dimension(&lms, 3));
}

#[test]
fn test_degenerate_independent_sets() {
    assert_eq!(vec![vec![1, 1]], independent_sets(&[], 2));
    assert_eq!(2, dimension(&[], 2));
    assert_eq!(Vec::<Vec<i64>>::new(), independent_sets(&[Monomial::one(2)], 2));
    assert_eq!(-1, dimension(&[Monomial::one(2)], 2));
    // zero-dimensional, e.g. (x^2, y^3)
    assert_eq!(vec![vec![0, 0]], independent_sets(&[Monomial::new(vec![2, 0]), Monomial::new(vec![0, 3])], 2));
    assert_eq!(0, dimension(&[Monomial::new(vec![2, 0]), Monomial::new(vec![0, 3])], 2));
}
