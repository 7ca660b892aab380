use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use crate::error::*;
use crate::field::FieldConfig;
use crate::multivariate::MonomialOrdering;

///
/// Contains [`singular::SingularEngine`], the bridge to the Singular computer algebra system.
///
pub mod singular;
///
/// Contains [`local::LocalEngine`], an in-process engine based on Buchberger's algorithm.
///
pub mod local;

///
/// Everything the engine needs to know about the ring an ideal lives in.
///
/// Polynomials (here the relations of a quotient ring) are given as text in the
/// engine syntax, see [`crate::syntax`].
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingDescription {
    pub field: FieldConfig,
    pub variables: Vec<String>,
    pub ordering: MonomialOrdering,
    /// generators of the ideal we take the quotient by, if the ring is a quotient ring
    pub quotient: Option<Vec<String>>
}

///
/// The operations an [`EngineBridge`] can be asked to perform on an ideal.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineOperation {
    /// reduced Groebner basis, answered with [`EngineValue::Polynomials`]
    GroebnerBasis,
    /// minimal generating set, answered with [`EngineValue::Polynomials`]
    MinimalBase,
    /// Krull dimension of the quotient, answered with [`EngineValue::Integer`]
    Dimension,
    /// all maximal independent sets, answered with [`EngineValue::IntegerVectors`]
    IndependentSets,
    /// generators of the radical, answered with [`EngineValue::Polynomials`]
    Radical,
    /// primary components with their associated primes, answered with [`EngineValue::Decomposition`]
    PrimaryDecomposition,
    /// generators of the elimination ideal, answered with [`EngineValue::Polynomials`]
    Eliminate { variables: Vec<String> },
    /// generators of the intersection with all given ideals, answered with [`EngineValue::Polynomials`]
    Intersect { others: Vec<Vec<String>> },
    /// generators of the ideal quotient `I : J`, answered with [`EngineValue::Polynomials`]
    Quotient { divisor: Vec<String> },
    /// normal form of the polynomial, answered with [`EngineValue::Polynomials`] of length 1
    Reduce { polynomial: String }
}

impl EngineOperation {

    pub fn name(&self) -> &'static str {
        match self {
            EngineOperation::GroebnerBasis => "groebner_basis",
            EngineOperation::MinimalBase => "minimal_base",
            EngineOperation::Dimension => "dimension",
            EngineOperation::IndependentSets => "independent_sets",
            EngineOperation::Radical => "radical",
            EngineOperation::PrimaryDecomposition => "primary_decomposition",
            EngineOperation::Eliminate { .. } => "eliminate",
            EngineOperation::Intersect { .. } => "intersect",
            EngineOperation::Quotient { .. } => "quotient",
            EngineOperation::Reduce { .. } => "reduce"
        }
    }
}

///
/// A single request to an [`EngineBridge`], consisting of the ambient ring, the
/// generators of the ideal (as text in engine syntax) and the operation.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRequest {
    pub ring: RingDescription,
    pub generators: Vec<String>,
    pub operation: EngineOperation
}

///
/// The typed result of an [`EngineRequest`].
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineValue {
    Polynomials(Vec<String>),
    Integer(i64),
    Boolean(bool),
    IntegerVectors(Vec<Vec<i64>>),
    /// pairs `(primary component, associated prime)`
    Decomposition(Vec<(Vec<String>, Vec<String>)>)
}

impl EngineValue {

    fn kind(&self) -> &'static str {
        match self {
            EngineValue::Polynomials(_) => "polynomials",
            EngineValue::Integer(_) => "integer",
            EngineValue::Boolean(_) => "boolean",
            EngineValue::IntegerVectors(_) => "integer vectors",
            EngineValue::Decomposition(_) => "decomposition"
        }
    }

    pub fn into_polynomials(self) -> std::result::Result<Vec<String>, EngineError> {
        match self {
            EngineValue::Polynomials(result) => Ok(result),
            other => Err(EngineError::unparseable(format!("expected polynomials, got {}", other.kind())))
        }
    }

    pub fn into_integer(self) -> std::result::Result<i64, EngineError> {
        match self {
            EngineValue::Integer(result) => Ok(result),
            other => Err(EngineError::unparseable(format!("expected integer, got {}", other.kind())))
        }
    }

    pub fn into_integer_vectors(self) -> std::result::Result<Vec<Vec<i64>>, EngineError> {
        match self {
            EngineValue::IntegerVectors(result) => Ok(result),
            other => Err(EngineError::unparseable(format!("expected integer vectors, got {}", other.kind())))
        }
    }

    pub fn into_decomposition(self) -> std::result::Result<Vec<(Vec<String>, Vec<String>)>, EngineError> {
        match self {
            EngineValue::Decomposition(result) => Ok(result),
            other => Err(EngineError::unparseable(format!("expected decomposition, got {}", other.kind())))
        }
    }
}

///
/// A stateless request/response channel to an engine that can perform computations
/// on ideals. Implementations must not cache results; caching is done by
/// [`crate::ideal::Ideal`].
///
pub trait EngineBridge: Send + Sync {

    fn invoke(&self, request: &EngineRequest) -> std::result::Result<EngineValue, EngineError>;

    ///
    /// Whether multiple sessions may run at the same time. If this is `false`, all
    /// sessions of this engine are serialized by [`run_session()`].
    ///
    fn supports_concurrent_sessions(&self) -> bool {
        true
    }

    fn name(&self) -> &str;
}

impl Debug for dyn EngineBridge {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EngineBridge({})", self.name())
    }
}

static BRIDGE_LOCK: Mutex<()> = Mutex::new(());

///
/// Runs a single engine session, holding the global bridge lock if the engine
/// does not support concurrent sessions.
///
#[instrument(skip_all, level = "trace")]
pub fn run_session(engine: &dyn EngineBridge, request: &EngineRequest) -> Result<EngineValue> {
    let _guard = if engine.supports_concurrent_sessions() {
        None
    } else {
        Some(BRIDGE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    };
    let start = Instant::now();
    let result = engine.invoke(request);
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => event!(Level::DEBUG, engine = engine.name(), operation = request.operation.name(), elapsed_ms, "engine session finished"),
        Err(e) if e.is_timeout() => event!(Level::WARN, engine = engine.name(), operation = request.operation.name(), elapsed_ms, "engine session timed out"),
        Err(e) => event!(Level::DEBUG, engine = engine.name(), operation = request.operation.name(), elapsed_ms, error = %e, "engine session failed")
    }
    return Ok(result?);
}

static DEFAULT_ENGINE: OnceLock<RwLock<Arc<dyn EngineBridge>>> = OnceLock::new();

fn default_engine_slot() -> &'static RwLock<Arc<dyn EngineBridge>> {
    DEFAULT_ENGINE.get_or_init(|| RwLock::new(Arc::new(local::LocalEngine::default())))
}

///
/// Returns the engine used by [`crate::ideal::Ideal::new()`]. Unless replaced by
/// [`set_default_engine()`], this is a [`local::LocalEngine`].
///
pub fn default_engine() -> Arc<dyn EngineBridge> {
    default_engine_slot().read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}

///
/// Replaces the process-wide default engine. Existing ideals keep using the engine
/// they were created with.
///
pub fn set_default_engine(engine: Arc<dyn EngineBridge>) {
    event!(Level::INFO, engine = engine.name(), "set default engine");
    *default_engine_slot().write().unwrap_or_else(|poisoned| poisoned.into_inner()) = engine;
}

///
/// Wraps another engine, and counts how often each operation was requested.
///
pub struct CountingEngine {
    inner: Arc<dyn EngineBridge>,
    counts: Mutex<HashMap<&'static str, usize>>
}

impl CountingEngine {

    pub fn new(inner: Arc<dyn EngineBridge>) -> Self {
        CountingEngine { inner, counts: Mutex::new(HashMap::new()) }
    }

    ///
    /// Returns how often the operation with the given name (see [`EngineOperation::name()`])
    /// was requested.
    ///
    pub fn count(&self, operation: &str) -> usize {
        self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).get(operation).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).values().sum()
    }
}

impl EngineBridge for CountingEngine {

    fn invoke(&self, request: &EngineRequest) -> std::result::Result<EngineValue, EngineError> {
        *self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).entry(request.operation.name()).or_insert(0) += 1;
        self.inner.invoke(request)
    }

    fn supports_concurrent_sessions(&self) -> bool {
        self.inner.supports_concurrent_sessions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
fn test_request(operation: EngineOperation) -> EngineRequest {
    EngineRequest {
        ring: RingDescription {
            field: FieldConfig::new("rational", 0, 0),
            variables: vec!["x".to_owned(), "y".to_owned()],
            ordering: MonomialOrdering::DegRevLex,
            quotient: None
        },
        generators: vec!["x^2-y".to_owned(), "x*y-1".to_owned()],
        operation
    }
}

#[test]
fn test_request_serialization() {
    let request = test_request(EngineOperation::Eliminate { variables: vec!["x".to_owned()] });
    let serialized = serde_json::to_string(&request).unwrap();
    let deserialized: EngineRequest = serde_json::from_str(&serialized).unwrap();
    assert_eq!(request, deserialized);

    let value = EngineValue::Decomposition(vec![(vec!["x^2".to_owned()], vec!["x".to_owned()])]);
    let serialized = serde_json::to_string(&value).unwrap();
    assert_eq!(value, serde_json::from_str::<EngineValue>(&serialized).unwrap());
}

#[test]
fn test_counting_engine() {
    let engine = CountingEngine::new(Arc::new(local::LocalEngine::default()));
    assert_eq!(0, engine.total());
    run_session(&engine, &test_request(EngineOperation::Dimension)).unwrap();
    run_session(&engine, &test_request(EngineOperation::Dimension)).unwrap();
    run_session(&engine, &test_request(EngineOperation::GroebnerBasis)).unwrap();
    assert_eq!(2, engine.count("dimension"));
    assert_eq!(1, engine.count("groebner_basis"));
    assert_eq!(3, engine.total());
}

#[test]
fn test_value_conversion() {
    assert_eq!(3, EngineValue::Integer(3).into_integer().unwrap());
    let err = EngineValue::Integer(3).into_polynomials().unwrap_err();
    assert_eq!(EngineErrorKind::Unparseable, err.kind);
}
