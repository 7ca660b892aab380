use std::sync::Arc;

use tracing::{event, instrument, Level};

use crate::error::*;
use crate::multivariate::*;
use crate::multivariate::polynomial::Polynomial;
use crate::ring::Ring;

use super::Ideal;

///
/// The extension `I K(U)[X \ U]` of an ideal `I` in `K[X]` to the polynomial ring over
/// the rational function field in a set `U` of (usually independent) variables.
///
/// It is represented by a Groebner basis of `I` w.r.t. the block ordering that
/// compares the dependent variables `X \ U` first. Considered as polynomials in `X \ U`
/// with coefficients in `K(U)`, the elements form a Groebner basis of the extension,
/// and their leading coefficients are polynomials in `U` only.
///
#[derive(Debug, Clone)]
pub struct Extension {
    ring: Arc<Ring>,
    dependent_count: usize,
    generators: Vec<Polynomial>,
    leading_coefficients: Vec<Polynomial>
}

impl Extension {

    ///
    /// The ring `K[X \ U, U]` with the block ordering in which the generators are given.
    ///
    pub fn ring(&self) -> &Arc<Ring> {
        &self.ring
    }

    pub fn dependent_variables(&self) -> &[String] {
        &self.ring.variables()[..self.dependent_count]
    }

    pub fn independent_variables(&self) -> &[String] {
        &self.ring.variables()[self.dependent_count..]
    }

    pub fn generators(&self) -> &[Polynomial] {
        &self.generators
    }

    ///
    /// The distinct non-constant leading coefficients (w.r.t. `X \ U`) of the generators,
    /// as monic elements of the original ring. Their product is the polynomial `f` with
    /// `I K(U)[X \ U] ∩ K[X] = I : f^∞`.
    ///
    pub fn leading_coefficients(&self) -> &[Polynomial] {
        &self.leading_coefficients
    }
}

///
/// Returns the coefficient of the largest monomial in the first `dependent_count` variables,
/// which is a polynomial in the remaining variables.
///
fn leading_coefficient(ring: &Ring, f: &Polynomial, dependent_count: usize) -> Option<Polynomial> {
    let lm = ring.lm(f)?;
    let leading_part = &lm.exponents()[..dependent_count];
    let terms = f.terms()
        .filter(|(_, m)| &m.exponents()[..dependent_count] == leading_part)
        .map(|(c, m)| {
            let mut exponents = m.exponents().to_vec();
            exponents[..dependent_count].iter_mut().for_each(|e| *e = 0);
            (c.clone(), Monomial::new(exponents))
        }).collect::<Vec<_>>();
    return Some(Polynomial::from_terms(ring.field(), ring.variable_count(), terms));
}

impl Ideal {

    ///
    /// Computes the extension of this ideal to `K(U)[X \ U]`, where `U` are the given
    /// variables. In a quotient ring, the preimage of the ideal in the base ring is extended.
    ///
    /// Fails with [`AlgebraError::Arity`] if a variable is unknown, or if `U` contains
    /// all variables.
    ///
    #[instrument(skip_all, level = "trace")]
    pub fn extension(&self, independent: &[&str]) -> Result<Extension> {
        let ring = self.base_ring();
        let n = ring.variable_count();
        let mut independent_indices = Vec::new();
        for name in independent {
            let index = ring.variable_index(name)?;
            if !independent_indices.contains(&index) {
                independent_indices.push(index);
            }
        }
        if independent_indices.len() == n {
            return Err(AlgebraError::Arity(format!("cannot extend to the fraction field of all variables of {}", ring)));
        }
        let dependent_count = n - independent_indices.len();
        // `order[j]` is the original index of the `j`-th variable of the extension ring
        let order = (0..n).filter(|i| !independent_indices.contains(i)).chain(independent_indices.iter().copied()).collect::<Vec<_>>();
        let mut positions = vec![0; n];
        for (j, i) in order.iter().enumerate() {
            positions[*i] = j;
        }
        let ordering = if independent_indices.is_empty() {
            MonomialOrdering::DegRevLex
        } else {
            MonomialOrdering::elimination(dependent_count, independent_indices.len())
        };
        let extension_ring = Arc::new(Ring::new(ring.field().clone(), order.iter().map(|i| ring.variables()[*i].clone()), ordering)?);

        let mut generators = self.generators.iter().map(|f| f.embed(&positions, n)).collect::<Vec<_>>();
        if let Some(modulus) = self.ring.modulus() {
            generators.extend(modulus.generators().iter().map(|f| f.embed(&positions, n)));
        }
        let extended = Ideal::with_engine(extension_ring.clone(), generators, self.engine.clone())?;
        let gb = extended.groebner_basis()?;

        let mut leading_coefficients: Vec<Polynomial> = Vec::new();
        for f in &gb {
            if let Some(c) = leading_coefficient(&extension_ring, f, dependent_count) {
                let c = c.embed(&order, n).normalize(ring.field(), ring.ordering());
                if !c.is_unit() && !leading_coefficients.contains(&c) {
                    leading_coefficients.push(c);
                }
            }
        }
        event!(Level::DEBUG, dependent = dependent_count, len = gb.len(), leading_coefficients = leading_coefficients.len(), "extension");
        return Ok(Extension { ring: extension_ring, dependent_count, generators: gb, leading_coefficients });
    }

    ///
    /// Computes the contraction `I K(U)[X \ U] ∩ K[X]` of the extension of this ideal to
    /// `K(U)[X \ U]`, as saturation `I : f^∞` by the leading coefficients `f` of
    /// [`Ideal::extension()`].
    ///
    /// Returns the saturation index, i.e. the largest number of quotients by a single
    /// leading coefficient until the ideal became stable, together with a minimal base
    /// of the extended-contracted ideal.
    ///
    #[instrument(skip_all, level = "trace")]
    pub fn extension_contraction(&self, independent: &[&str]) -> Result<(usize, Ideal)> {
        let extension = self.extension(independent)?;
        let mut current = self.derive(self.generators.clone());
        let mut saturation_index = 0;
        for f in extension.leading_coefficients() {
            let divisor = self.derive(vec![f.clone()]);
            let mut steps = 0;
            loop {
                let next = current.quotient(&divisor)?;
                if current.contains_ideal(&next)? {
                    break;
                }
                current = next;
                steps += 1;
            }
            saturation_index = std::cmp::max(saturation_index, steps);
        }
        let minimal_base = current.minimal_base()?;
        event!(Level::DEBUG, saturation_index, "extension-contraction");
        return Ok((saturation_index, self.derive(minimal_base)));
    }
}

#[cfg(test)]
use crate::field::Field;

#[cfg(test)]
fn test_ring(variables: &[&str]) -> Arc<Ring> {
    Arc::new(Ring::new(Field::rationals(), variables.iter().copied(), MonomialOrdering::DegRevLex).unwrap())
}

#[cfg(test)]
fn formatted(ring: &Ring, polys: &[Polynomial]) -> Vec<String> {
    polys.iter().map(|f| ring.format(f)).collect()
}

#[test]
fn test_extension() {
    let ring = test_ring(&["x", "y"]);
    let ideal = Ideal::parse(ring.clone(), &["x*y", "x^2"]).unwrap();
    let extension = ideal.extension(&["y"]).unwrap();
    assert_eq!(&["x".to_owned()], extension.dependent_variables());
    assert_eq!(&["y".to_owned()], extension.independent_variables());
    assert_eq!(vec!["x^2", "x*y"], formatted(extension.ring(), extension.generators()));
    assert_eq!(vec!["y"], formatted(&ring, extension.leading_coefficients()));
}

#[test]
fn test_extension_reorders_variables() {
    let ring = test_ring(&["y", "x"]);
    let ideal = Ideal::parse(ring.clone(), &["x*y", "x^2"]).unwrap();
    let extension = ideal.extension(&["y"]).unwrap();
    assert_eq!(&["x".to_owned(), "y".to_owned()], extension.ring().variables());
    assert_eq!(vec!["y"], formatted(&ring, extension.leading_coefficients()));

    let extension = ideal.extension(&[]).unwrap();
    assert_eq!(&["y".to_owned(), "x".to_owned()], extension.ring().variables());
    assert!(extension.leading_coefficients().is_empty());
}

#[test]
fn test_extension_errors() {
    let ring = test_ring(&["x", "y"]);
    let ideal = Ideal::parse(ring.clone(), &["x*y"]).unwrap();
    assert!(matches!(ideal.extension(&["z"]), Err(AlgebraError::Arity(_))));
    assert!(matches!(ideal.extension(&["x", "y"]), Err(AlgebraError::Arity(_))));
    assert!(matches!(ideal.extension_contraction(&["y", "x", "y"]), Err(AlgebraError::Arity(_))));
}

#[test]
fn test_extension_contraction() {
    let ring = test_ring(&["x", "y"]);
    let ideal = Ideal::parse(ring.clone(), &["x*y", "x^2"]).unwrap();
    let (saturation_index, contracted) = ideal.extension_contraction(&["y"]).unwrap();
    assert_eq!(1, saturation_index);
    assert_eq!(vec!["x"], formatted(&ring, contracted.generators()));
    assert!(contracted.contains_ideal(&ideal).unwrap());

    // already saturated
    let prime = Ideal::parse(ring.clone(), &["x^2 - y"]).unwrap();
    let (saturation_index, contracted) = prime.extension_contraction(&["y"]).unwrap();
    assert_eq!(0, saturation_index);
    assert!(contracted.is_equal(&prime).unwrap());
}
