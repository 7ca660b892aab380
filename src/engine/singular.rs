use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use crate::error::*;
use crate::field::Field;
use crate::engine::*;

const DEFAULT_TIMEOUT_SECS: u64 = 300;
/// Scripts of at least this size are passed to Singular via a file instead of the command line.
const DEFAULT_SCRIPT_FILE_THRESHOLD: usize = 1 << 17;

const IDEAL_TAG: &str = "@ideal:";
const INT_TAG: &str = "@int:";
const INTVEC_TAG: &str = "@intvec:";
const PRIMARY_TAG: &str = "@primary:";
const PRIME_TAG: &str = "@prime:";

///
/// Configuration of a [`SingularEngine`].
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// path or name of the `Singular` executable
    pub executable: PathBuf,
    /// wall-clock time after which a session is killed
    pub timeout: Duration,
    /// scripts of at least this many bytes are passed via a temporary file
    pub script_file_threshold: usize,
    pub concurrent_sessions: bool
}

impl Default for EngineConfig {

    fn default() -> Self {
        EngineConfig {
            executable: PathBuf::from("Singular"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            script_file_threshold: DEFAULT_SCRIPT_FILE_THRESHOLD,
            concurrent_sessions: true
        }
    }
}

impl EngineConfig {

    ///
    /// Creates the default configuration, overriden by the environment variables
    /// `SINGULAR_EXECUTABLE` and `SINGULAR_TIMEOUT` (in seconds), if set.
    ///
    pub fn from_env() -> Result<Self> {
        let mut result = Self::default();
        if let Ok(executable) = std::env::var("SINGULAR_EXECUTABLE") {
            result.executable = PathBuf::from(executable);
        }
        if let Ok(timeout) = std::env::var("SINGULAR_TIMEOUT") {
            let secs = timeout.trim().parse::<u64>().map_err(|_| EngineError::new(EngineErrorKind::Malformed, format!("SINGULAR_TIMEOUT must be a number of seconds, got `{}`", timeout)))?;
            result.timeout = Duration::from_secs(secs);
        }
        return Ok(result);
    }
}

///
/// Bridge to the Singular computer algebra system, which is run as child process
/// `Singular --quiet` for every request.
///
/// All knowledge about the Singular language lives in this module: requests are
/// translated into a script by [`SingularEngine::script()`], and the output is parsed
/// back into an [`EngineValue`]. To make the output robust against warnings Singular
/// might print, results are printed on lines with a distinguished prefix.
///
#[derive(Debug, Clone, Default)]
pub struct SingularEngine {
    config: EngineConfig
}

impl SingularEngine {

    pub fn new(config: EngineConfig) -> Self {
        SingularEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn ideal_text(generators: &[String]) -> String {
        if generators.is_empty() {
            "0".to_owned()
        } else {
            generators.join(", ")
        }
    }

    ///
    /// Translates the request into a Singular script.
    ///
    pub fn script(request: &EngineRequest) -> std::result::Result<String, EngineError> {
        let field = Field::new(request.ring.field.clone()).map_err(|e| EngineError::new(EngineErrorKind::Malformed, format!("{}", e)))?;
        if request.ring.variables.is_empty() {
            return Err(EngineError::new(EngineErrorKind::Malformed, "ring without variables"));
        }
        let mut lines = vec!["short = 0;".to_owned()];
        if let EngineOperation::Radical | EngineOperation::PrimaryDecomposition = request.operation {
            lines.push("LIB \"primdec.lib\";".to_owned());
        }
        lines.push("option(redSB);".to_owned());
        lines.push(format!("ring r = {}, ({}), {};", field.notation(), request.ring.variables.join(", "), request.ring.ordering.tag()));
        if let Some(minpoly) = field.minimal_polynomial() {
            lines.push(format!("minpoly = {};", minpoly));
        }
        if let Some(quotient) = &request.ring.quotient {
            lines.push(format!("ideal q_ = {};", Self::ideal_text(quotient)));
            lines.push("qring q = std(q_);".to_owned());
        }
        lines.push(format!("ideal i = {};", Self::ideal_text(&request.generators)));
        lines.push("int k_;".to_owned());
        match &request.operation {
            EngineOperation::GroebnerBasis => {
                lines.push(format!("print(\"{}\" + string(groebner(i)));", IDEAL_TAG));
            },
            EngineOperation::MinimalBase => {
                lines.push(format!("print(\"{}\" + string(minbase(i)));", IDEAL_TAG));
            },
            EngineOperation::Dimension => {
                lines.push(format!("print(\"{}\" + string(dim(std(i))));", INT_TAG));
            },
            EngineOperation::IndependentSets => {
                lines.push("list l_ = indepSet(std(i), 1);".to_owned());
                lines.push(format!("for (k_ = 1; k_ <= size(l_); k_++) {{ print(\"{}\" + string(l_[k_])); }}", INTVEC_TAG));
            },
            EngineOperation::Radical => {
                lines.push(format!("print(\"{}\" + string(radical(i)));", IDEAL_TAG));
            },
            EngineOperation::PrimaryDecomposition => {
                lines.push("list pr_ = primdecGTZ(i);".to_owned());
                lines.push(format!(
                    "for (k_ = 1; k_ <= size(pr_); k_++) {{ print(\"{}\" + string(pr_[k_][1])); print(\"{}\" + string(pr_[k_][2])); }}",
                    PRIMARY_TAG, PRIME_TAG
                ));
            },
            EngineOperation::Eliminate { variables } => {
                if variables.is_empty() {
                    return Err(EngineError::new(EngineErrorKind::Malformed, "no variables to eliminate"));
                }
                lines.push(format!("ideal j_ = eliminate(i, {});", variables.join("*")));
                lines.push(format!("print(\"{}\" + string(minbase(j_)));", IDEAL_TAG));
            },
            EngineOperation::Intersect { others } => {
                for (k, other) in others.iter().enumerate() {
                    lines.push(format!("ideal j{}_ = {};", k, Self::ideal_text(other)));
                }
                let arguments = std::iter::once("i".to_owned()).chain((0..others.len()).map(|k| format!("j{}_", k))).collect::<Vec<_>>();
                lines.push(format!("print(\"{}\" + string(intersect({})));", IDEAL_TAG, arguments.join(", ")));
            },
            EngineOperation::Quotient { divisor } => {
                lines.push(format!("ideal j_ = {};", Self::ideal_text(divisor)));
                lines.push(format!("print(\"{}\" + string(quotient(i, j_)));", IDEAL_TAG));
            },
            EngineOperation::Reduce { polynomial } => {
                lines.push(format!("poly f_ = {};", polynomial));
                lines.push(format!("print(\"{}\" + string(reduce(f_, std(i))));", IDEAL_TAG));
            }
        }
        lines.push("$".to_owned());
        return Ok(lines.join("\n"));
    }

    ///
    /// Runs Singular on the given script, and returns its output.
    ///
    #[instrument(skip_all, level = "trace")]
    fn execute(&self, script: &str) -> std::result::Result<String, EngineError> {
        let crashed = |e: std::io::Error| EngineError::new(EngineErrorKind::Crashed, format!("cannot run `{}`: {}", self.config.executable.display(), e));

        let mut command = Command::new(&self.config.executable);
        command.arg("--quiet").stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        // the file is deleted when dropped, so keep it until the process finished
        let _script_file = if script.len() >= self.config.script_file_threshold {
            let mut file = tempfile::NamedTempFile::new().map_err(crashed)?;
            file.write_all(script.as_bytes()).map_err(crashed)?;
            file.flush().map_err(crashed)?;
            command.arg(file.path());
            event!(Level::TRACE, path = %file.path().display(), bytes = script.len(), "passing script via file");
            Some(file)
        } else {
            command.arg("--execute").arg(script);
            None
        };

        let mut child = command.spawn().map_err(crashed)?;
        let mut stdout = child.stdout.take().ok_or_else(|| EngineError::new(EngineErrorKind::Crashed, "no stdout"))?;
        let mut stderr = child.stderr.take().ok_or_else(|| EngineError::new(EngineErrorKind::Crashed, "no stderr"))?;
        let (sender, receiver) = mpsc::channel();
        std::thread::spawn(move || {
            let mut output = String::new();
            let result = stdout.read_to_string(&mut output).map(|_| output);
            _ = sender.send(result);
        });
        let stderr_reader = std::thread::spawn(move || {
            let mut output = String::new();
            _ = stderr.read_to_string(&mut output);
            output
        });

        let output = match receiver.recv_timeout(self.config.timeout) {
            Ok(output) => output.map_err(crashed)?,
            Err(_) => {
                _ = child.kill();
                _ = child.wait();
                return Err(EngineError::timeout(format!("{} s", self.config.timeout.as_secs())));
            }
        };
        let status = child.wait().map_err(crashed)?;
        let error_output = stderr_reader.join().unwrap_or_default();
        if !status.success() && output.trim().is_empty() {
            return Err(EngineError::new(EngineErrorKind::Crashed, format!("Singular exited with {}: {}", status, error_output.trim())));
        }
        return Ok(output + &error_output);
    }
}

///
/// Removes the warnings Singular prints in addition to the results, and detects
/// errors and timeouts.
///
///
/// Whether the line is the `halt <code>` message Singular prints when it is interrupted.
///
fn is_halt(line: &str) -> bool {
    let mut parts = line.split_whitespace();
    parts.next() == Some("halt") && parts.all(|part| part.chars().all(|c| c.is_ascii_digit()))
}

fn clean_output(output: &str) -> std::result::Result<Vec<&str>, EngineError> {
    if output.lines().any(is_halt) {
        return Err(EngineError::timeout(output.trim().to_owned()));
    }
    let mut result = Vec::new();
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("// **") {
            event!(Level::WARN, warning = trimmed, "Singular warning");
        } else if trimmed.starts_with("//") {
            event!(Level::TRACE, line = trimmed, "Singular comment");
        } else if trimmed.starts_with("? ") || trimmed.starts_with("error") {
            return Err(EngineError::new(EngineErrorKind::Malformed, output.trim().to_owned()));
        } else if !trimmed.is_empty() {
            result.push(trimmed);
        }
    }
    return Ok(result);
}

///
/// Splits the comma-separated generators of a stringified ideal, dropping zero generators.
///
fn split_ideal(text: &str) -> Vec<String> {
    text.split(',').map(|f| f.trim()).filter(|f| !f.is_empty() && *f != "0").map(|f| f.to_owned()).collect()
}

fn tagged<'a>(lines: &[&'a str], tag: &str) -> Vec<&'a str> {
    lines.iter().filter_map(|line| line.strip_prefix(tag)).collect()
}

fn parse_int_list(text: &str) -> std::result::Result<Vec<i64>, EngineError> {
    text.split(',').map(|x| x.trim().parse::<i64>().map_err(|_| EngineError::unparseable(format!("`{}` is not an integer vector", text)))).collect()
}

///
/// Parses the (already cleaned) output of the script for the given operation.
///
fn parse_output(operation: &EngineOperation, output: &str) -> std::result::Result<EngineValue, EngineError> {
    let lines = clean_output(output)?;
    let unexpected = || EngineError::unparseable(format!("unexpected output `{}`", output.trim()));
    match operation {
        EngineOperation::Dimension => {
            let values = tagged(&lines, INT_TAG);
            let value = values.first().ok_or_else(unexpected)?;
            Ok(EngineValue::Integer(value.trim().parse::<i64>().map_err(|_| unexpected())?))
        },
        EngineOperation::IndependentSets => {
            Ok(EngineValue::IntegerVectors(tagged(&lines, INTVEC_TAG).into_iter().map(parse_int_list).collect::<std::result::Result<Vec<_>, _>>()?))
        },
        EngineOperation::PrimaryDecomposition => {
            let primaries = tagged(&lines, PRIMARY_TAG);
            let primes = tagged(&lines, PRIME_TAG);
            if primaries.len() != primes.len() {
                return Err(unexpected());
            }
            Ok(EngineValue::Decomposition(primaries.into_iter().zip(primes.into_iter()).map(|(primary, prime)| (split_ideal(primary), split_ideal(prime))).collect()))
        },
        _ => {
            let ideals = tagged(&lines, IDEAL_TAG);
            let ideal = ideals.first().ok_or_else(unexpected)?;
            Ok(EngineValue::Polynomials(split_ideal(ideal)))
        }
    }
}

impl EngineBridge for SingularEngine {

    fn invoke(&self, request: &EngineRequest) -> std::result::Result<EngineValue, EngineError> {
        let script = Self::script(request)?;
        event!(Level::TRACE, script = script.as_str(), "Singular script");
        let output = self.execute(&script)?;
        let mut result = parse_output(&request.operation, &output)?;
        if let EngineValue::Polynomials(polys) = &mut result {
            if let EngineOperation::Reduce { .. } = request.operation {
                if polys.is_empty() {
                    polys.push("0".to_owned());
                }
            }
        }
        return Ok(result);
    }

    fn supports_concurrent_sessions(&self) -> bool {
        self.config.concurrent_sessions
    }

    fn name(&self) -> &str {
        "Singular"
    }
}

#[cfg(test)]
use crate::field::FieldConfig;
#[cfg(test)]
use crate::multivariate::MonomialOrdering;

#[cfg(test)]
fn test_request(field: FieldConfig, operation: EngineOperation) -> EngineRequest {
    EngineRequest {
        ring: RingDescription {
            field,
            variables: vec!["x1".to_owned(), "x2".to_owned()],
            ordering: MonomialOrdering::DegRevLex,
            quotient: None
        },
        generators: vec!["x1^2*x2".to_owned()],
        operation
    }
}

#[test]
fn test_script() {
    let script = SingularEngine::script(&test_request(FieldConfig::new("rational", 0, 0), EngineOperation::GroebnerBasis)).unwrap();
    assert_eq!("short = 0;\noption(redSB);\nring r = 0, (x1, x2), dp;\nideal i = x1^2*x2;\nint k_;\nprint(\"@ideal:\" + string(groebner(i)));\n$", script);

    let mut request = test_request(FieldConfig::new("Q[i]", 0, 0), EngineOperation::PrimaryDecomposition);
    request.ring.quotient = Some(vec!["x1".to_owned()]);
    let script = SingularEngine::script(&request).unwrap();
    assert!(script.contains("LIB \"primdec.lib\";"));
    assert!(script.contains("ring r = (0,I), (x1, x2), dp;\nminpoly = I^2+1;"));
    assert!(script.contains("ideal q_ = x1;\nqring q = std(q_);"));

    let script = SingularEngine::script(&test_request(FieldConfig::new("rational", 0, 0), EngineOperation::Eliminate { variables: vec!["x1".to_owned(), "x2".to_owned()] })).unwrap();
    assert!(script.contains("eliminate(i, x1*x2)"));

    let script = SingularEngine::script(&test_request(FieldConfig::new("rational", 0, 0), EngineOperation::Intersect { others: vec![vec!["x1".to_owned()], vec![]] })).unwrap();
    assert!(script.contains("ideal j1_ = 0;"));
    assert!(script.contains("intersect(i, j0_, j1_)"));

    assert_eq!(EngineErrorKind::Malformed, SingularEngine::script(&test_request(FieldConfig::new("padic", 3, 0), EngineOperation::Dimension)).unwrap_err().kind);
}

#[test]
fn test_parse_output() {
    let output = "// ** redefining k_ (int k_;)\n@ideal:x2,x1\n";
    assert_eq!(EngineValue::Polynomials(vec!["x2".to_owned(), "x1".to_owned()]), parse_output(&EngineOperation::GroebnerBasis, output).unwrap());

    assert_eq!(EngineValue::Polynomials(vec![]), parse_output(&EngineOperation::GroebnerBasis, "@ideal:0").unwrap());
    assert_eq!(EngineValue::Integer(1), parse_output(&EngineOperation::Dimension, "@int:1\n").unwrap());
    assert_eq!(
        EngineValue::IntegerVectors(vec![vec![1, 0], vec![0, 1]]),
        parse_output(&EngineOperation::IndependentSets, "@intvec:1,0\n@intvec:0,1\n").unwrap()
    );
    assert_eq!(EngineValue::IntegerVectors(vec![]), parse_output(&EngineOperation::IndependentSets, "").unwrap());
    assert_eq!(
        EngineValue::Decomposition(vec![
            (vec!["x2".to_owned()], vec!["x2".to_owned()]),
            (vec!["x1^2".to_owned()], vec!["x1".to_owned()])
        ]),
        parse_output(&EngineOperation::PrimaryDecomposition, "@primary:x2\n@prime:x2\n@primary:x1^2\n@prime:x1\n").unwrap()
    );
    let output = "// ** groebner base computations with inexact coefficients can not be trusted due to rounding errors\n@ideal:(0.5+I*1.5)*x1-1\n";
    assert_eq!(EngineValue::Polynomials(vec!["(0.5+I*1.5)*x1-1".to_owned()]), parse_output(&EngineOperation::GroebnerBasis, output).unwrap());
}

#[test]
fn test_parse_output_errors() {
    let output = "   ? `y` is not defined\n   ? error occurred in or before STDIN line 4: `ideal i = y;`\n";
    assert_eq!(EngineErrorKind::Malformed, parse_output(&EngineOperation::GroebnerBasis, output).unwrap_err().kind);
    assert_eq!(EngineErrorKind::Timeout, parse_output(&EngineOperation::GroebnerBasis, "halt 1").unwrap_err().kind);
    assert_eq!(EngineErrorKind::Timeout, parse_output(&EngineOperation::GroebnerBasis, "@ideal:x1\n  halt\n").unwrap_err().kind);
    assert_eq!(
        EngineValue::Polynomials(vec!["halting1-x1".to_owned()]),
        parse_output(&EngineOperation::GroebnerBasis, "// halting criterion reached\n@ideal:halting1-x1\n").unwrap()
    );
    assert_eq!(EngineErrorKind::Unparseable, parse_output(&EngineOperation::Dimension, "@int:x").unwrap_err().kind);
    assert_eq!(EngineErrorKind::Unparseable, parse_output(&EngineOperation::GroebnerBasis, "").unwrap_err().kind);
    assert_eq!(EngineErrorKind::Unparseable, parse_output(&EngineOperation::PrimaryDecomposition, "@primary:x1\n").unwrap_err().kind);
}

#[test]
fn test_config_defaults() {
    let config = EngineConfig::default();
    assert_eq!(Duration::from_secs(300), config.timeout);
    assert_eq!(131072, config.script_file_threshold);
    let serialized = serde_json::to_string(&config).unwrap();
    assert_eq!(config, serde_json::from_str::<EngineConfig>(&serialized).unwrap());
}

#[test]
fn test_missing_executable() {
    let engine = SingularEngine::new(EngineConfig { executable: PathBuf::from("/nonexistent/Singular"), ..EngineConfig::default() });
    let err = engine.invoke(&test_request(FieldConfig::new("rational", 0, 0), EngineOperation::GroebnerBasis)).unwrap_err();
    assert_eq!(EngineErrorKind::Crashed, err.kind);
}

#[test]
#[ignore]
fn test_singular_session() {
    let engine = SingularEngine::new(EngineConfig::from_env().unwrap());
    let result = engine.invoke(&test_request(FieldConfig::new("rational", 0, 0), EngineOperation::PrimaryDecomposition)).unwrap();
    assert_eq!(EngineValue::Decomposition(vec![
        (vec!["x2".to_owned()], vec!["x2".to_owned()]),
        (vec!["x1^2".to_owned()], vec!["x1".to_owned()])
    ]), result);
    let result = engine.invoke(&test_request(FieldConfig::new("rational", 0, 0), EngineOperation::IndependentSets)).unwrap();
    assert_eq!(EngineValue::IntegerVectors(vec![vec![1, 0], vec![0, 1]]), result);
}

#[test]
#[ignore]
fn test_singular_large_script() {
    let engine = SingularEngine::new(EngineConfig { script_file_threshold: 0, ..EngineConfig::from_env().unwrap() });
    let result = engine.invoke(&test_request(FieldConfig::new("rational", 0, 0), EngineOperation::Dimension)).unwrap();
    assert_eq!(EngineValue::Integer(1), result);
}
