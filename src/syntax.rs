use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Pow, Zero};

use crate::error::*;
use crate::field::*;
use crate::multivariate::*;
use crate::multivariate::polynomial::Polynomial;

///
/// Name of the parameter that denotes the imaginary unit in the engine syntax.
///
pub const IMAGINARY_UNIT: &str = "I";

///
/// Checks whether the given name can be used as variable name, i.e. matches
/// `[A-Za-z][A-Za-z0-9_]*` and is not the reserved name of the imaginary unit.
///
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {},
        _ => return false
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && name != IMAGINARY_UNIT
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Number(&'a str),
    Identifier(&'a str),
    Plus,
    Minus,
    Times,
    Divide,
    Power,
    LParen,
    RParen
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token<'_>)>> {
    let bytes = text.as_bytes();
    let mut result = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let c = bytes[i];
        let token = match c {
            b' ' | b'\t' | b'\n' | b'\r' => { i += 1; continue; },
            b'+' => { i += 1; Token::Plus },
            b'-' => { i += 1; Token::Minus },
            b'*' if bytes.get(i + 1) == Some(&b'*') => { i += 2; Token::Power },
            b'*' => { i += 1; Token::Times },
            b'/' => { i += 1; Token::Divide },
            b'^' => { i += 1; Token::Power },
            b'(' => { i += 1; Token::LParen },
            b')' => { i += 1; Token::RParen },
            b'0'..=b'9' | b'.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                // scientific notation, as printed for floating point coefficients
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        while j < bytes.len() && bytes[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                Token::Number(&text[start..i])
            },
            c if c.is_ascii_alphabetic() => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                Token::Identifier(&text[start..i])
            },
            _ => {
                let found = text[start..].chars().next().unwrap_or('?');
                return Err(AlgebraError::parse(start, format!("unexpected character `{}`", found)));
            }
        };
        result.push((start, token));
    }
    return Ok(result);
}

///
/// Recursive-descent parser for the polynomial grammar
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := unary (('*' | '/') unary)*
/// unary  := ('+' | '-') unary | power
/// power  := atom (('^' | '**') integer)?
/// atom   := number | identifier | '(' expr ')'
/// ```
///
struct Parser<'a, 'b> {
    field: &'b Field,
    variables: &'b [String],
    tokens: Vec<(usize, Token<'a>)>,
    position: usize,
    end: usize
}

impl<'a, 'b> Parser<'a, 'b> {

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position).map(|(_, t)| t)
    }

    fn current_offset(&self) -> usize {
        self.tokens.get(self.position).map(|(i, _)| *i).unwrap_or(self.end)
    }

    fn error<T, S: Into<String>>(&self, message: S) -> Result<T> {
        Err(AlgebraError::parse(self.current_offset(), message))
    }

    fn constant(&self, c: FieldElement) -> Polynomial {
        Polynomial::constant(self.field, c, self.variables.len())
    }

    fn expr(&mut self) -> Result<Polynomial> {
        let mut result = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.position += 1;
                    result = result.add(&self.term()?, self.field);
                },
                Some(Token::Minus) => {
                    self.position += 1;
                    result = result.sub(&self.term()?, self.field);
                },
                _ => return Ok(result)
            }
        }
    }

    fn term(&mut self) -> Result<Polynomial> {
        let mut result = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Times) => {
                    self.position += 1;
                    let offset = self.current_offset();
                    let factor = self.unary()?;
                    result = result.mul(&factor, self.field).map_err(|e| AlgebraError::parse(offset, format!("{}", e)))?;
                },
                Some(Token::Divide) => {
                    self.position += 1;
                    let offset = self.current_offset();
                    let divisor = self.unary()?;
                    if divisor.is_zero() {
                        return Err(AlgebraError::parse(offset, "division by zero"));
                    }
                    if !divisor.is_unit() {
                        return Err(AlgebraError::parse(offset, "division by non-constant polynomial"));
                    }
                    let (c, _) = divisor.terms().next().ok_or_else(|| AlgebraError::parse(offset, "division by zero"))?;
                    let c_inv = self.field.inv(c).map_err(|e| AlgebraError::parse(offset, format!("{}", e)))?;
                    result = result.scale(&c_inv, self.field);
                },
                _ => return Ok(result)
            }
        }
    }

    fn unary(&mut self) -> Result<Polynomial> {
        match self.peek() {
            Some(Token::Minus) => {
                self.position += 1;
                Ok(self.unary()?.neg(self.field))
            },
            Some(Token::Plus) => {
                self.position += 1;
                self.unary()
            },
            _ => self.power()
        }
    }

    fn power(&mut self) -> Result<Polynomial> {
        let base = self.atom()?;
        if let Some(Token::Power) = self.peek() {
            self.position += 1;
            let exponent = match self.peek() {
                Some(Token::Number(n)) => n.parse::<u32>().or_else(|_| self.error(format!("invalid exponent `{}`", n)))?,
                _ => return self.error("expected non-negative integer exponent")
            };
            let offset = self.current_offset();
            self.position += 1;
            return base.pow(exponent, self.field).map_err(|e| AlgebraError::parse(offset, format!("{}", e)));
        }
        return Ok(base);
    }

    fn atom(&mut self) -> Result<Polynomial> {
        let offset = self.current_offset();
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.position += 1;
                Ok(self.constant(parse_number(self.field, n).map_err(|message| AlgebraError::parse(offset, message))?))
            },
            Some(Token::Identifier(name)) => {
                self.position += 1;
                if let Some(i) = self.variables.iter().position(|v| v == name) {
                    let n = self.variables.len();
                    Ok(Polynomial::from_terms(self.field, n, [(self.field.one(), Monomial::variable(i, n))]))
                } else if name == IMAGINARY_UNIT && (self.field.kind() == FieldKind::GaussianRational || self.field.kind() == FieldKind::Complex) {
                    Ok(self.constant(self.field.i()?))
                } else {
                    Err(AlgebraError::parse(offset, format!("unknown variable `{}`", name)))
                }
            },
            Some(Token::LParen) => {
                self.position += 1;
                let result = self.expr()?;
                if self.peek() != Some(&Token::RParen) {
                    return self.error("expected `)`");
                }
                self.position += 1;
                Ok(result)
            },
            Some(token) => self.error(format!("unexpected token {:?}", token)),
            None => self.error("unexpected end of input")
        }
    }
}

///
/// Largest power of ten a decimal literal over an exact field may be scaled with.
///
const MAX_LITERAL_SCALE: u64 = 4096;

fn parse_number(field: &Field, text: &str) -> std::result::Result<FieldElement, String> {
    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(i) => (&text[..i], text[(i + 1)..].parse::<i32>().map_err(|_| format!("invalid number `{}`", text))?),
        None => (text, 0)
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(format!("invalid number `{}`", text));
    }
    if frac_part.contains('.') {
        return Err(format!("invalid number `{}`", text));
    }
    let is_integer = frac_part.is_empty() && exponent >= 0;
    if field.kind() == FieldKind::FiniteField && !is_integer {
        return Err(format!("`{}` is not an element of {}", text, field));
    }
    if field.kind() == FieldKind::Complex {
        return match text.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(FieldElement::Complex(x, 0.)),
            Ok(_) => Err(format!("`{}` is out of range", text)),
            Err(_) => Err(format!("invalid number `{}`", text))
        };
    }
    let scale = i64::from(exponent) - frac_part.len() as i64;
    if scale.unsigned_abs() > MAX_LITERAL_SCALE {
        return Err(format!("`{}` is out of range", text));
    }
    let digits = format!("{}{}", int_part, frac_part);
    let numerator = digits.parse::<BigInt>().map_err(|_| format!("invalid number `{}`", text))?;
    let ten = BigInt::from(10);
    let value = if scale >= 0 {
        BigRational::from_integer(numerator * Pow::pow(&ten, scale as u32))
    } else {
        BigRational::new(numerator, Pow::pow(&ten, (-scale) as u32))
    };
    match field.kind() {
        FieldKind::FiniteField => Ok(field.from_bigint(&value.to_integer())),
        FieldKind::Rational => Ok(FieldElement::Rational(value)),
        _ => Ok(FieldElement::Gaussian(value, BigRational::zero()))
    }
}

///
/// Parses a polynomial over the given field in the given variables.
///
/// Accepts the operators `+ - * / ^ **` and parentheses, integer and decimal literals
/// (decimals are rejected over finite fields), the imaginary unit `I` over fields
/// containing it, and the given variable names. Division is only allowed by nonzero
/// constants.
///
pub fn parse_polynomial(field: &Field, variables: &[String], text: &str) -> Result<Polynomial> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(AlgebraError::parse(0, "empty expression"));
    }
    let mut parser = Parser { field, variables, tokens, position: 0, end: text.len() };
    let result = parser.expr()?;
    if parser.position < parser.tokens.len() {
        return parser.error("unexpected trailing input");
    }
    return Ok(result);
}

///
/// Parses a constant expression like `-1/2`, `3 + 2*I` or `1.5e-3` as element of the field.
///
pub fn parse_constant(field: &Field, text: &str) -> Result<FieldElement> {
    let poly = parse_polynomial(field, &[], text)?;
    return Ok(poly.terms().next().map(|(c, _)| c.clone()).unwrap_or_else(|| field.zero()));
}

fn format_rational(q: &BigRational) -> String {
    if q.is_integer() {
        format!("{}", q.numer())
    } else {
        format!("{}/{}", q.numer(), q.denom())
    }
}

fn format_float(x: f64) -> String {
    // avoid printing `-0`
    if x == 0. {
        "0".to_owned()
    } else {
        format!("{}", x)
    }
}

///
/// Formats a value `re + im * I`, given the formatted (nonzero) components.
///
fn format_complex(re: Option<String>, im: Option<String>) -> String {
    let im = im.map(|im| match im.as_str() {
        "1" => IMAGINARY_UNIT.to_owned(),
        "-1" => format!("-{}", IMAGINARY_UNIT),
        _ => format!("{}*{}", im, IMAGINARY_UNIT)
    });
    match (re, im) {
        (None, None) => "0".to_owned(),
        (Some(re), None) => re,
        (None, Some(im)) => im,
        (Some(re), Some(im)) if im.starts_with('-') => format!("({}{})", re, im),
        (Some(re), Some(im)) => format!("({}+{})", re, im)
    }
}

///
/// Formats a field element in the engine syntax. Elements of finite fields are
/// printed as symmetric representatives, i.e. in `-p/2..=p/2`.
///
pub fn format_coefficient(field: &Field, el: &FieldElement) -> String {
    match el {
        FieldElement::Rational(q) => format_rational(q),
        FieldElement::Modular(a) => {
            let p = field.characteristic();
            if *a > p / 2 {
                format!("-{}", p - a)
            } else {
                format!("{}", a)
            }
        },
        FieldElement::Gaussian(re, im) => format_complex(
            if re.is_zero() { None } else { Some(format_rational(re)) },
            if im.is_zero() { None } else { Some(format_rational(im)) }
        ),
        FieldElement::Complex(re, im) => format_complex(
            if re.abs() <= field.tolerance() { None } else { Some(format_float(*re)) },
            if im.abs() <= field.tolerance() || *im == 0. { None } else { Some(format_float(*im)) }
        )
    }
}

fn format_monomial(variables: &[String], m: &Monomial) -> String {
    m.support().map(|i| if m[i] == 1 {
        variables[i].clone()
    } else {
        format!("{}^{}", variables[i], m[i])
    }).collect::<Vec<_>>().join("*")
}

///
/// Formats a polynomial in the engine syntax, with terms sorted descending w.r.t.
/// the given monomial ordering, e.g. `3*x^2*y-1/2*z+1`.
///
pub fn format_polynomial(field: &Field, variables: &[String], order: &MonomialOrdering, poly: &Polynomial) -> String {
    let mut result = String::new();
    for (c, m) in poly.sorted_terms(order) {
        let coefficient = format_coefficient(field, c);
        let term = if m.is_one() {
            coefficient
        } else if coefficient == "1" {
            format_monomial(variables, m)
        } else if coefficient == "-1" {
            format!("-{}", format_monomial(variables, m))
        } else {
            format!("{}*{}", coefficient, format_monomial(variables, m))
        };
        if !result.is_empty() && !term.starts_with('-') {
            result.push('+');
        }
        result.push_str(&term);
    }
    if result.is_empty() {
        result.push('0');
    }
    return result;
}

fn superscript_digit(c: char) -> Option<u32> {
    match c {
        '⁰' => Some(0), '¹' => Some(1), '²' => Some(2), '³' => Some(3), '⁴' => Some(4),
        '⁵' => Some(5), '⁶' => Some(6), '⁷' => Some(7), '⁸' => Some(8), '⁹' => Some(9),
        _ => None
    }
}

///
/// Parses a monomial like `x1^2*x2`, `x1**2*x2`, `x1²x2` or `x1 x2 x1` into its exponent
/// vector w.r.t. the given variables. Factors may be separated by `*`, `·`, whitespace,
/// or nothing; repeated factors add up. The empty string and `1` give the zero vector.
///
pub fn monomial_to_exponents(variables: &[String], text: &str) -> Result<Monomial> {
    let mut exponents = vec![0; variables.len()];
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "1" {
        return Ok(Monomial::new(exponents));
    }
    let chars = text.char_indices().collect::<Vec<_>>();
    let mut i = 0;
    let read_int = |i: &mut usize| -> Option<u32> {
        let start = *i;
        while *i < chars.len() && chars[*i].1.is_ascii_digit() {
            *i += 1;
        }
        if start == *i {
            return None;
        }
        let (from, to) = (chars[start].0, chars.get(*i).map(|(j, _)| *j).unwrap_or(text.len()));
        text[from..to].parse::<u32>().ok()
    };
    while i < chars.len() {
        let (offset, c) = chars[i];
        if c == '*' || c == '·' || c.is_whitespace() {
            i += 1;
            continue;
        }
        // longest variable name that matches at this position
        let rest = &text[offset..];
        let var = variables.iter().enumerate()
            .filter(|(_, v)| rest.starts_with(v.as_str()))
            .max_by_key(|(_, v)| v.len());
        let (var_index, var_name) = match var {
            Some(var) => var,
            None => return Err(AlgebraError::parse(offset, format!("unknown variable in `{}`", text)))
        };
        i += var_name.chars().count();
        let mut exponent: MonomialExponent = 1;
        if i < chars.len() && (chars[i].1 == '^' || (chars[i].1 == '*' && chars.get(i + 1).map(|(_, c)| *c) == Some('*'))) {
            i += if chars[i].1 == '^' { 1 } else { 2 };
            let exponent_offset = chars.get(i).map(|(j, _)| *j).unwrap_or(text.len());
            exponent = read_int(&mut i).ok_or_else(|| AlgebraError::parse(exponent_offset, "expected exponent"))?;
        } else if i < chars.len() && superscript_digit(chars[i].1).is_some() {
            let exponent_offset = chars[i].0;
            exponent = 0;
            while let Some(d) = chars.get(i).and_then(|(_, c)| superscript_digit(*c)) {
                exponent = exponent.checked_mul(10).and_then(|e| e.checked_add(d)).ok_or_else(|| AlgebraError::parse(exponent_offset, "exponent overflow"))?;
                i += 1;
            }
        }
        exponents[var_index] = exponents[var_index].checked_add(exponent).ok_or_else(|| AlgebraError::parse(offset, "exponent overflow"))?;
    }
    return Ok(Monomial::new(exponents));
}

#[cfg(test)]
fn vars(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_and_format() {
    let QQ = Field::rationals();
    let variables = vars(&["x", "y", "z"]);
    let f = parse_polynomial(&QQ, &variables, "3*x^2*y - z/2 + 1").unwrap();
    assert_eq!("3*x^2*y-1/2*z+1", format_polynomial(&QQ, &variables, &MonomialOrdering::DegRevLex, &f));
    let g = parse_polynomial(&QQ, &variables, "(x + y)**2 - x*(x + 2*y)").unwrap();
    assert_eq!("y^2", format_polynomial(&QQ, &variables, &MonomialOrdering::DegRevLex, &g));
    let h = parse_polynomial(&QQ, &variables, "-x + -y").unwrap();
    assert_eq!("-x-y", format_polynomial(&QQ, &variables, &MonomialOrdering::Lex, &h));
    assert_eq!("0", format_polynomial(&QQ, &variables, &MonomialOrdering::Lex, &parse_polynomial(&QQ, &variables, "x - x").unwrap()));
    assert_eq!(f, parse_polynomial(&QQ, &variables, &format_polynomial(&QQ, &variables, &MonomialOrdering::Lex, &f)).unwrap());
}

#[test]
fn test_parse_errors() {
    let QQ = Field::rationals();
    let variables = vars(&["x", "y"]);
    assert!(matches!(parse_polynomial(&QQ, &variables, "x + w"), Err(AlgebraError::Parse { position: 4, .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, "x / y"), Err(AlgebraError::Parse { .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, "x / 0"), Err(AlgebraError::Parse { .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, "(x + y"), Err(AlgebraError::Parse { .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, "x^y"), Err(AlgebraError::Parse { .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, "x $ y"), Err(AlgebraError::Parse { position: 2, .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, ""), Err(AlgebraError::Parse { .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, "I*x"), Err(AlgebraError::Parse { .. })));
    let Fp = Field::finite_field(7).unwrap();
    assert!(matches!(parse_polynomial(&Fp, &variables, "0.5*x"), Err(AlgebraError::Parse { .. })));
}

#[test]
fn test_coefficients() {
    let Fp = Field::finite_field(7).unwrap();
    let variables = vars(&["x"]);
    let f = parse_polynomial(&Fp, &variables, "x/2 + 6").unwrap();
    assert_eq!("-3*x-1", format_polynomial(&Fp, &variables, &MonomialOrdering::DegRevLex, &f));

    let QQi = Field::gaussian_rationals();
    let f = parse_polynomial(&QQi, &variables, "(1 + 2*I)*x - I").unwrap();
    assert_eq!("(1+2*I)*x-I", format_polynomial(&QQi, &variables, &MonomialOrdering::DegRevLex, &f));
    assert_eq!("(1/2-I)", format_coefficient(&QQi, &parse_constant(&QQi, "0.5 - I").unwrap()));

    let C = Field::complex(16).unwrap();
    let f = parse_polynomial(&C, &variables, "(0.5+I*1.5)*x^2 - 2.5e-1").unwrap();
    assert_eq!("(0.5+1.5*I)*x^2-0.25", format_polynomial(&C, &variables, &MonomialOrdering::DegRevLex, &f));

    let QQ = Field::rationals();
    assert_eq!(FieldElement::Rational(BigRational::new(BigInt::from(3), BigInt::from(2))), parse_constant(&QQ, "1.5").unwrap());
    assert_eq!(FieldElement::Rational(BigRational::from_integer(BigInt::from(1200))), parse_constant(&QQ, "1.2e3").unwrap());
    assert!(matches!(parse_constant(&QQ, "x"), Err(AlgebraError::Parse { .. })));
}

#[test]
fn test_monomial_to_exponents() {
    let variables = vars(&["x1", "x2", "x12"]);
    assert_eq!(Monomial::new(vec![2, 1, 0]), monomial_to_exponents(&variables, "x1^2*x2").unwrap());
    assert_eq!(Monomial::new(vec![2, 1, 0]), monomial_to_exponents(&variables, "x1**2*x2").unwrap());
    assert_eq!(Monomial::new(vec![2, 3, 0]), monomial_to_exponents(&variables, "x1²x2³").unwrap());
    assert_eq!(Monomial::new(vec![2, 0, 1]), monomial_to_exponents(&variables, "x1 x12 x1").unwrap());
    assert_eq!(Monomial::new(vec![1, 1, 0]), monomial_to_exponents(&variables, "x1·x2").unwrap());
    assert_eq!(Monomial::new(vec![0, 0, 0]), monomial_to_exponents(&variables, "").unwrap());
    assert_eq!(Monomial::new(vec![0, 0, 0]), monomial_to_exponents(&variables, "1").unwrap());
    assert!(matches!(monomial_to_exponents(&variables, "x1*y"), Err(AlgebraError::Parse { position: 3, .. })));
    assert!(matches!(monomial_to_exponents(&variables, "x1^"), Err(AlgebraError::Parse { .. })));
}

#[test]
fn test_exponent_overflow() {
    let variables = vars(&["x1", "x2"]);
    assert_eq!(Monomial::new(vec![u32::MAX, 0]), monomial_to_exponents(&variables, "x1^4294967295").unwrap());
    assert!(matches!(monomial_to_exponents(&variables, "x1^4294967295*x1"), Err(AlgebraError::Parse { position: 14, .. })));
    assert!(matches!(monomial_to_exponents(&variables, "x1^4294967296"), Err(AlgebraError::Parse { position: 3, .. })));
    assert!(matches!(monomial_to_exponents(&variables, "x2⁴²⁹⁴⁹⁶⁷²⁹⁶"), Err(AlgebraError::Parse { position: 2, .. })));

    let QQ = Field::rationals();
    assert!(matches!(parse_polynomial(&QQ, &variables, "x1^4294967295*x1"), Err(AlgebraError::Parse { position: 14, .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, "(x1^65536)^65536"), Err(AlgebraError::Parse { position: 11, .. })));
    assert!(matches!(parse_polynomial(&QQ, &variables, "x1^4294967296"), Err(AlgebraError::Parse { .. })));
    assert!(parse_polynomial(&QQ, &variables, "x1^4294967295*x2").is_ok());
}

#[test]
fn test_literal_range() {
    let QQ = Field::rationals();
    assert!(matches!(parse_constant(&QQ, "1e999999999"), Err(AlgebraError::Parse { .. })));
    assert!(matches!(parse_constant(&QQ, "1e-999999999"), Err(AlgebraError::Parse { .. })));
    assert!(matches!(parse_constant(&QQ, "1e99999999999"), Err(AlgebraError::Parse { .. })));
    assert_eq!(FieldElement::Rational(BigRational::new(BigInt::from(1), Pow::pow(&BigInt::from(10), 4096u32))), parse_constant(&QQ, "1e-4096").unwrap());
    let C = Field::complex(16).unwrap();
    assert!(matches!(parse_constant(&C, "1e400"), Err(AlgebraError::Parse { .. })));
    assert_eq!(FieldElement::Complex(0., 0.), parse_constant(&C, "1e-400").unwrap());
    let Fp = Field::finite_field(7).unwrap();
    assert_eq!(Fp.int(1), parse_constant(&Fp, "1000000000000000000000000000000").unwrap());
}

#[test]
fn test_identifiers() {
    assert!(is_valid_identifier("x1"));
    assert!(is_valid_identifier("alpha_2"));
    assert!(!is_valid_identifier("1x"));
    assert!(!is_valid_identifier("I"));
    assert!(!is_valid_identifier("x-y"));
    assert!(!is_valid_identifier(""));
}
