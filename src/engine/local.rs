use std::time::{Duration, Instant};

use tracing::{event, instrument, Level};

use crate::algorithms::buchberger::*;
use crate::algorithms::independent_sets;
use crate::engine::*;
use crate::error::*;
use crate::field::Field;
use crate::multivariate::*;
use crate::multivariate::polynomial::Polynomial;
use crate::ring::Ring;

///
/// An engine that answers requests in-process, using Buchberger's algorithm.
///
/// It supports all operations except [`EngineOperation::Radical`] and
/// [`EngineOperation::PrimaryDecomposition`], but only over rings with a global
/// monomial ordering. This makes the crate usable without an installation of
/// Singular, e.g. in tests.
///
#[derive(Debug, Clone, Default)]
pub struct LocalEngine {
    timeout: Option<Duration>
}

fn malformed<E: std::fmt::Display>(e: E) -> EngineError {
    EngineError::new(EngineErrorKind::Malformed, format!("{}", e))
}

///
/// The parsed form of an [`EngineRequest`], together with the deadline of the computation.
///
struct Session {
    ring: Ring,
    generators: Vec<Polynomial>,
    modulus: Vec<Polynomial>,
    deadline: Option<Instant>
}

impl Session {

    fn field(&self) -> &Field {
        self.ring.field()
    }

    fn order(&self) -> &MonomialOrdering {
        self.ring.ordering()
    }

    fn n(&self) -> usize {
        self.ring.variable_count()
    }

    ///
    /// Computes the reduced Groebner basis of the given polynomials w.r.t. the given
    /// (global) ordering, failing if the deadline is exceeded.
    ///
    fn groebner_basis_with(&self, polys: Vec<Polynomial>, order: &MonomialOrdering) -> std::result::Result<Vec<Polynomial>, EngineError> {
        let mut timed_out = false;
        let deadline = self.deadline;
        let gb = buchberger(self.field(), polys, order, default_sort_fn(order), |_| {
            timed_out = deadline.map(|d| Instant::now() >= d).unwrap_or(false);
            timed_out
        })?;
        if timed_out {
            return Err(EngineError::timeout("Groebner basis computation exceeded the deadline"));
        }
        return Ok(reduce_groebner_basis(self.field(), gb, order)?);
    }

    fn groebner_basis(&self, polys: Vec<Polynomial>) -> std::result::Result<Vec<Polynomial>, EngineError> {
        self.groebner_basis_with(polys, self.order())
    }

    fn with_modulus(&self, polys: &[Polynomial]) -> Vec<Polynomial> {
        polys.iter().chain(self.modulus.iter()).cloned().collect()
    }

    fn normal_form(&self, f: Polynomial, gb: &[Polynomial]) -> std::result::Result<Polynomial, EngineError> {
        Ok(multivariate_division(self.field(), f, gb.iter(), self.order())?)
    }

    fn is_unit_basis(gb: &[Polynomial]) -> bool {
        gb.len() == 1 && gb[0].is_unit()
    }

    ///
    /// Removes the polynomials that vanish in the quotient ring.
    ///
    fn drop_modulus(&self, polys: Vec<Polynomial>) -> std::result::Result<Vec<Polynomial>, EngineError> {
        if self.modulus.is_empty() {
            return Ok(polys);
        }
        let modulus_gb = self.groebner_basis(self.modulus.clone())?;
        let mut result = Vec::new();
        for f in polys {
            if !self.normal_form(f.clone(), &modulus_gb)?.is_zero() {
                result.push(f);
            }
        }
        return Ok(result);
    }

    fn leading_monomials(&self) -> std::result::Result<Vec<Monomial>, EngineError> {
        let gb = self.groebner_basis(self.with_modulus(&self.generators))?;
        return Ok(gb.iter().filter_map(|f| f.leading_term(self.order()).map(|(_, m)| m.clone())).collect());
    }

    fn minimal_base(&self) -> std::result::Result<Vec<Polynomial>, EngineError> {
        if Self::is_unit_basis(&self.groebner_basis(self.with_modulus(&self.generators))?) {
            return Ok(vec![self.ring.one()]);
        }
        let mut current = self.generators.iter().filter(|f| !f.is_zero()).map(|f| f.normalize(self.field(), self.order())).collect::<Vec<_>>();
        current.dedup();
        let mut i = 0;
        while i < current.len() {
            let others = current.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, f)| f.clone()).collect::<Vec<_>>();
            let others_gb = self.groebner_basis(self.with_modulus(&others))?;
            if self.normal_form(current[i].clone(), &others_gb)?.is_zero() {
                current.remove(i);
            } else {
                i += 1;
            }
        }
        return Ok(current);
    }

    fn eliminate(&self, variables: &[String]) -> std::result::Result<Vec<Polynomial>, EngineError> {
        let mut eliminated = Vec::new();
        for name in variables {
            let index = self.ring.variable_index(name).map_err(malformed)?;
            if !eliminated.contains(&index) {
                eliminated.push(index);
            }
        }
        let n = self.n();
        let e = eliminated.len();
        // eliminated variables are moved to the front, where the elimination ordering makes them largest
        let mut positions = vec![0; n];
        let mut next_eliminated = 0;
        let mut next_kept = e;
        for i in 0..n {
            if eliminated.contains(&i) {
                positions[i] = next_eliminated;
                next_eliminated += 1;
            } else {
                positions[i] = next_kept;
                next_kept += 1;
            }
        }
        let mut inverse = vec![0; n];
        for i in 0..n {
            inverse[positions[i]] = i;
        }
        let order = MonomialOrdering::elimination(e, n - e);
        let input = self.with_modulus(&self.generators).iter().map(|f| f.embed(&positions, n)).collect();
        let gb = self.groebner_basis_with(input, &order)?;
        let result = gb.into_iter()
            .filter(|f| f.appearing_variables().iter().all(|i| *i >= e))
            .map(|f| f.embed(&inverse, n).normalize(self.field(), self.order()))
            .collect::<Vec<_>>();
        event!(Level::TRACE, eliminated = e, len = result.len(), "eliminated variables");
        return Ok(result);
    }

    ///
    /// Computes generators of `I ∩ J` by eliminating `t` from `t * I + (1 - t) * J`.
    ///
    fn intersect_two(&self, lhs: &[Polynomial], rhs: &[Polynomial]) -> std::result::Result<Vec<Polynomial>, EngineError> {
        let lhs = lhs.iter().filter(|f| !f.is_zero()).collect::<Vec<_>>();
        let rhs = rhs.iter().filter(|f| !f.is_zero()).collect::<Vec<_>>();
        if lhs.is_empty() || rhs.is_empty() {
            return Ok(Vec::new());
        }
        let n = self.n();
        let field = self.field();
        let shifted = (1..=n).collect::<Vec<_>>();
        let t = Polynomial::from_terms(field, n + 1, [(field.one(), Monomial::variable(0, n + 1))]);
        let one_minus_t = Polynomial::constant(field, field.one(), n + 1).sub(&t, field);
        let mut input = Vec::new();
        for f in &lhs {
            input.push(f.embed(&shifted, n + 1).mul(&t, field)?);
        }
        for f in &rhs {
            input.push(f.embed(&shifted, n + 1).mul(&one_minus_t, field)?);
        }
        let gb = self.groebner_basis_with(input, &MonomialOrdering::elimination(1, n))?;
        return Ok(gb.into_iter().filter(|f| !f.appearing_variables().contains(&0)).map(|f| f.restrict(&shifted)).collect());
    }

    fn intersect(&self, others: &[Vec<Polynomial>]) -> std::result::Result<Vec<Polynomial>, EngineError> {
        let mut current = self.with_modulus(&self.generators);
        for other in others {
            current = self.intersect_two(&current, &self.with_modulus(other))?;
        }
        return self.drop_modulus(self.groebner_basis(current)?);
    }

    ///
    /// Computes `I : J` as the intersection of all `I : g = (I ∩ (g)) / g` for generators `g` of `J`.
    ///
    fn quotient(&self, divisor: &[Polynomial]) -> std::result::Result<Vec<Polynomial>, EngineError> {
        let ideal = self.with_modulus(&self.generators);
        let mut result: Option<Vec<Polynomial>> = None;
        for g in divisor.iter().filter(|g| !g.is_zero()) {
            let intersection = self.intersect_two(&ideal, std::slice::from_ref(g))?;
            let quotient = intersection.iter()
                .map(|f| f.checked_div(g, self.field(), self.order()).ok_or_else(|| EngineError::new(EngineErrorKind::Crashed, "intersection with principal ideal is not divisible by its generator")))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            result = Some(match result {
                None => quotient,
                Some(current) => self.intersect_two(&current, &quotient)?
            });
        }
        let result = result.unwrap_or_else(|| vec![self.ring.one()]);
        return self.drop_modulus(self.groebner_basis(result)?);
    }
}

impl LocalEngine {

    pub fn new(timeout: Option<Duration>) -> Self {
        LocalEngine { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn open_session(&self, request: &EngineRequest) -> std::result::Result<Session, EngineError> {
        if !request.ring.ordering.is_global() {
            return Err(EngineError::unsupported(format!("the local engine only supports global orderings, got {}", request.ring.ordering)));
        }
        let field = Field::new(request.ring.field.clone()).map_err(malformed)?;
        let ring = Ring::new(field, request.ring.variables.iter().cloned(), request.ring.ordering.clone()).map_err(malformed)?;
        let generators = request.generators.iter().map(|f| ring.parse(f)).collect::<Result<Vec<_>>>().map_err(malformed)?;
        let modulus = match &request.ring.quotient {
            Some(modulus) => modulus.iter().map(|f| ring.parse(f)).collect::<Result<Vec<_>>>().map_err(malformed)?,
            None => Vec::new()
        };
        Ok(Session { ring, generators, modulus, deadline: self.timeout.map(|t| Instant::now() + t) })
    }
}

impl EngineBridge for LocalEngine {

    #[instrument(skip_all, level = "trace")]
    fn invoke(&self, request: &EngineRequest) -> std::result::Result<EngineValue, EngineError> {
        let session = self.open_session(request)?;
        let format = |polys: Vec<Polynomial>| EngineValue::Polynomials(polys.iter().map(|f| session.ring.format(f)).collect());
        let parse_all = |polys: &[String]| polys.iter().map(|f| session.ring.parse(f)).collect::<Result<Vec<_>>>().map_err(malformed);
        match &request.operation {
            EngineOperation::GroebnerBasis => {
                let gb = session.groebner_basis(session.with_modulus(&session.generators))?;
                Ok(format(session.drop_modulus(gb)?))
            },
            EngineOperation::MinimalBase => Ok(format(session.minimal_base()?)),
            EngineOperation::Dimension => Ok(EngineValue::Integer(independent_sets::dimension(&session.leading_monomials()?, session.n()))),
            EngineOperation::IndependentSets => Ok(EngineValue::IntegerVectors(independent_sets::independent_sets(&session.leading_monomials()?, session.n()))),
            EngineOperation::Radical | EngineOperation::PrimaryDecomposition => {
                Err(EngineError::unsupported(format!("operation {} is not supported by the local engine", request.operation.name())))
            },
            EngineOperation::Eliminate { variables } => Ok(format(session.eliminate(variables)?)),
            EngineOperation::Intersect { others } => {
                let others = others.iter().map(|other| parse_all(other)).collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(format(session.intersect(&others)?))
            },
            EngineOperation::Quotient { divisor } => Ok(format(session.quotient(&parse_all(divisor)?)?)),
            EngineOperation::Reduce { polynomial } => {
                let f = session.ring.parse(polynomial).map_err(malformed)?;
                let gb = session.groebner_basis(session.with_modulus(&session.generators))?;
                Ok(format(vec![session.normal_form(f, &gb)?]))
            }
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
use crate::field::FieldConfig;

#[cfg(test)]
fn request(variables: &[&str], generators: &[&str], operation: EngineOperation) -> EngineRequest {
    EngineRequest {
        ring: RingDescription {
            field: FieldConfig::new("rational", 0, 0),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            ordering: MonomialOrdering::DegRevLex,
            quotient: None
        },
        generators: generators.iter().map(|f| f.to_string()).collect(),
        operation
    }
}

#[cfg(test)]
fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_groebner_basis() {
    let engine = LocalEngine::default();
    let result = engine.invoke(&request(&["x", "y"], &["x^2-y", "x*y-1"], EngineOperation::GroebnerBasis)).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["x^2-y", "x*y-1", "y^2-x"])), result);

    let result = engine.invoke(&request(&["x", "y"], &[], EngineOperation::GroebnerBasis)).unwrap();
    assert_eq!(EngineValue::Polynomials(vec![]), result);
}

#[test]
fn test_dimension() {
    let engine = LocalEngine::default();
    assert_eq!(0, engine.invoke(&request(&["x", "y"], &["x^2-y", "x*y-1"], EngineOperation::Dimension)).unwrap().into_integer().unwrap());
    assert_eq!(1, engine.invoke(&request(&["x1", "x2"], &["x1^2*x2"], EngineOperation::Dimension)).unwrap().into_integer().unwrap());
    assert_eq!(-1, engine.invoke(&request(&["x1", "x2"], &["x1", "x1+1"], EngineOperation::Dimension)).unwrap().into_integer().unwrap());
    assert_eq!(
        vec![vec![1, 0], vec![0, 1]],
        engine.invoke(&request(&["x1", "x2"], &["x1^2*x2"], EngineOperation::IndependentSets)).unwrap().into_integer_vectors().unwrap()
    );
}

#[test]
fn test_minimal_base() {
    let engine = LocalEngine::default();
    let result = engine.invoke(&request(&["x", "y"], &["x", "x*y", "y^2", "2*x+y^2"], EngineOperation::MinimalBase)).unwrap();
    let result = result.into_polynomials().unwrap();
    assert_eq!(2, result.len());
    let result = engine.invoke(&request(&["x", "y"], &["x", "x+1"], EngineOperation::MinimalBase)).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["1"])), result);
}

#[test]
fn test_eliminate() {
    let engine = LocalEngine::default();
    let result = engine.invoke(&request(&["x", "y"], &["x^2-y", "x*y-1"], EngineOperation::Eliminate { variables: strings(&["x"]) })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["y^3-1"])), result);

    let result = engine.invoke(&request(&["x", "y", "z"], &["x-y", "y-z^2"], EngineOperation::Eliminate { variables: strings(&["y"]) })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["z^2-x"])), result);

    let err = engine.invoke(&request(&["x", "y"], &["x"], EngineOperation::Eliminate { variables: strings(&["w"]) })).unwrap_err();
    assert_eq!(EngineErrorKind::Malformed, err.kind);
}

#[test]
fn test_intersect() {
    let engine = LocalEngine::default();
    let result = engine.invoke(&request(&["x", "y"], &["x"], EngineOperation::Intersect { others: vec![strings(&["y"])] })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["x*y"])), result);

    let result = engine.invoke(&request(&["x", "y"], &["x^2", "y"], EngineOperation::Intersect { others: vec![strings(&["x", "y^2"]), strings(&["x", "y"])] })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["x^2", "x*y", "y^2"])), result);

    let result = engine.invoke(&request(&["x", "y"], &[], EngineOperation::Intersect { others: vec![strings(&["x"])] })).unwrap();
    assert_eq!(EngineValue::Polynomials(vec![]), result);
}

#[test]
fn test_quotient() {
    let engine = LocalEngine::default();
    let result = engine.invoke(&request(&["x", "y"], &["x*y", "x^2"], EngineOperation::Quotient { divisor: strings(&["x"]) })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["x", "y"])), result);

    let result = engine.invoke(&request(&["x", "y"], &["x*y"], EngineOperation::Quotient { divisor: strings(&["x*y"]) })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["1"])), result);

    let result = engine.invoke(&request(&["x", "y"], &["x"], EngineOperation::Quotient { divisor: vec![] })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["1"])), result);
}

#[test]
fn test_reduce() {
    let engine = LocalEngine::default();
    let result = engine.invoke(&request(&["x", "y"], &["x^2-y", "x*y-1"], EngineOperation::Reduce { polynomial: "y^3".to_owned() })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["1"])), result);
    let result = engine.invoke(&request(&["x", "y"], &["x^2-y", "x*y-1"], EngineOperation::Reduce { polynomial: "x^3-1".to_owned() })).unwrap();
    assert_eq!(EngineValue::Polynomials(strings(&["0"])), result);
}

#[test]
fn test_quotient_ring() {
    let engine = LocalEngine::default();
    let mut req = request(&["x1", "x2"], &["x1", "x2"], EngineOperation::GroebnerBasis);
    req.ring.quotient = Some(strings(&["x1"]));
    assert_eq!(EngineValue::Polynomials(strings(&["x2"])), engine.invoke(&req).unwrap());

    req.operation = EngineOperation::Dimension;
    assert_eq!(EngineValue::Integer(0), engine.invoke(&req).unwrap());
}

#[test]
fn test_unsupported() {
    let engine = LocalEngine::default();
    let err = engine.invoke(&request(&["x"], &["x"], EngineOperation::PrimaryDecomposition)).unwrap_err();
    assert_eq!(EngineErrorKind::Unsupported, err.kind);

    let mut req = request(&["x"], &["x"], EngineOperation::GroebnerBasis);
    req.ring.ordering = MonomialOrdering::NegDegRevLex;
    assert_eq!(EngineErrorKind::Unsupported, engine.invoke(&req).unwrap_err().kind);

    req.ring.ordering = MonomialOrdering::DegRevLex;
    req.generators = strings(&["x+"]);
    assert_eq!(EngineErrorKind::Malformed, engine.invoke(&req).unwrap_err().kind);
}

#[test]
fn test_timeout() {
    let engine = LocalEngine::new(Some(Duration::ZERO));
    let err = engine.invoke(&request(&["x", "y", "z"], &[
        "x^2*y*z + y^2 + x*z + 2*x + 1",
        "y^3*z + z^3 + x*y",
        "x*z^2 + x*z + 2*y*z + 7"
    ], EngineOperation::GroebnerBasis)).unwrap_err();
    assert!(err.is_timeout());
}
