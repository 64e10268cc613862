//! Parser for the textual set notation used by the built-in engine.
//!
//! Accepts the quasi-affine subset of the usual notation:
//!
//! ```text
//! [N, M] -> { S[i, j] : 0 <= i < N and 0 <= j < M; T[k] : k = 0 or k >= N }
//! ```
//!
//! Formulas are flattened to disjunctive normal form, one [`BasicSet`] per
//! conjunct. Every constraint is stored as `affine >= 0` or `affine = 0`.
//! Nothing is simplified beyond dropping constant constraints.

use std::collections::BTreeMap;
use std::fmt;

/// Parsed set: parameters and a union of basic sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSet {
    pub params: Vec<String>,
    pub pieces: Vec<BasicSet>,
}

/// One conjunction of constraints over a named or anonymous tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicSet {
    pub name: Option<String>,
    pub dims: Vec<String>,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `affine = 0`
    Equality,
    /// `affine >= 0`
    Inequality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub affine: Affine,
    pub kind: ConstraintKind,
}

/// `sum(coeff * name) + constant` with zero coefficients removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affine {
    pub coeffs: BTreeMap<String, i64>,
    pub constant: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

type PResult<T> = Result<T, ParseError>;

impl Affine {
    fn constant(value: i64) -> Self {
        Self {
            coeffs: BTreeMap::new(),
            constant: value,
        }
    }

    fn variable(name: &str) -> Self {
        let mut coeffs = BTreeMap::new();
        coeffs.insert(name.to_string(), 1);
        Self {
            coeffs,
            constant: 0,
        }
    }

    fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }

    fn checked_add(mut self, other: &Affine) -> Option<Affine> {
        for (name, &c) in &other.coeffs {
            let entry = self.coeffs.entry(name.clone()).or_insert(0);
            *entry = entry.checked_add(c)?;
        }
        self.coeffs.retain(|_, c| *c != 0);
        self.constant = self.constant.checked_add(other.constant)?;
        Some(self)
    }

    fn checked_scale(mut self, factor: i64) -> Option<Affine> {
        for c in self.coeffs.values_mut() {
            *c = c.checked_mul(factor)?;
        }
        self.coeffs.retain(|_, c| *c != 0);
        self.constant = self.constant.checked_mul(factor)?;
        Some(self)
    }

    fn checked_sub(self, other: &Affine) -> Option<Affine> {
        let negated = other.clone().checked_scale(-1)?;
        self.checked_add(&negated)
    }

    /// Render with variables in `order`, e.g. `-i + N - 1`.
    fn render(&self, order: &[&str]) -> String {
        let mut out = String::new();
        for name in order {
            let Some(&c) = self.coeffs.get(*name) else {
                continue;
            };
            let magnitude = c.unsigned_abs();
            let term = if magnitude == 1 {
                (*name).to_string()
            } else {
                format!("{magnitude}{name}")
            };
            push_term(&mut out, c < 0, &term);
        }
        if self.constant != 0 || out.is_empty() {
            push_term(&mut out, self.constant < 0, &self.constant.unsigned_abs().to_string());
        }
        out
    }
}

fn push_term(out: &mut String, negative: bool, term: &str) {
    match (out.is_empty(), negative) {
        (true, false) => out.push_str(term),
        (true, true) => {
            out.push('-');
            out.push_str(term);
        }
        (false, false) => {
            out.push_str(" + ");
            out.push_str(term);
        }
        (false, true) => {
            out.push_str(" - ");
            out.push_str(term);
        }
    }
}

impl ParsedSet {
    /// Canonical text: declared parameters, then pieces in parse order.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if !self.params.is_empty() {
            out.push('[');
            out.push_str(&self.params.join(", "));
            out.push_str("] -> ");
        }
        out.push_str("{ ");
        let pieces: Vec<String> = self.pieces.iter().map(|p| p.render(&self.params)).collect();
        out.push_str(&pieces.join("; "));
        out.push_str(" }");
        out
    }
}

impl BasicSet {
    fn render(&self, params: &[String]) -> String {
        let mut out = String::new();
        if let Some(name) = &self.name {
            out.push_str(name);
        }
        out.push('[');
        out.push_str(&self.dims.join(", "));
        out.push(']');
        if self.constraints.is_empty() {
            return out;
        }
        let order: Vec<&str> = self
            .dims
            .iter()
            .chain(params.iter())
            .map(String::as_str)
            .collect();
        let rendered: Vec<String> = self
            .constraints
            .iter()
            .map(|c| {
                let op = match c.kind {
                    ConstraintKind::Equality => "=",
                    ConstraintKind::Inequality => ">=",
                };
                format!("{} {op} 0", c.affine.render(&order))
            })
            .collect();
        out.push_str(" : ");
        out.push_str(&rendered.join(" and "));
        out
    }
}

/// Parse set text.
pub fn parse_set(text: &str) -> PResult<ParsedSet> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.len(),
        scope: Vec::new(),
        depth: 0,
    };
    let set = parser.set()?;
    parser.expect_end()?;
    Ok(set)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Int(i64),
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    LParen,
    RParen,
    Comma,
    Colon,
    Semi,
    Arrow,
    Plus,
    Minus,
    Star,
    Le,
    Lt,
    Ge,
    Gt,
    Eq,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tok::Ident(name) => return write!(f, "`{name}`"),
            Tok::Int(v) => return write!(f, "`{v}`"),
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::LBrack => "[",
            Tok::RBrack => "]",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::Comma => ",",
            Tok::Colon => ":",
            Tok::Semi => ";",
            Tok::Arrow => "->",
            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::Le => "<=",
            Tok::Lt => "<",
            Tok::Ge => ">=",
            Tok::Gt => ">",
            Tok::Eq => "=",
        };
        write!(f, "`{s}`")
    }
}

fn tokenize(text: &str) -> PResult<Vec<(Tok, usize)>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let start = i;
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'\'')
            {
                i += 1;
            }
            tokens.push((Tok::Ident(text[start..i].to_string()), start));
            continue;
        }
        if b.is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let value = text[start..i].parse::<i64>().map_err(|_| ParseError {
                offset: start,
                message: format!("integer literal `{}` out of range", &text[start..i]),
            })?;
            tokens.push((Tok::Int(value), start));
            continue;
        }
        let next = bytes.get(i + 1).copied();
        let (tok, len) = match (b, next) {
            (b'-', Some(b'>')) => (Tok::Arrow, 2),
            (b'<', Some(b'=')) => (Tok::Le, 2),
            (b'>', Some(b'=')) => (Tok::Ge, 2),
            (b'=', Some(b'=')) => (Tok::Eq, 2),
            (b'{', _) => (Tok::LBrace, 1),
            (b'}', _) => (Tok::RBrace, 1),
            (b'[', _) => (Tok::LBrack, 1),
            (b']', _) => (Tok::RBrack, 1),
            (b'(', _) => (Tok::LParen, 1),
            (b')', _) => (Tok::RParen, 1),
            (b',', _) => (Tok::Comma, 1),
            (b':', _) => (Tok::Colon, 1),
            (b';', _) => (Tok::Semi, 1),
            (b'+', _) => (Tok::Plus, 1),
            (b'-', _) => (Tok::Minus, 1),
            (b'*', _) => (Tok::Star, 1),
            (b'<', _) => (Tok::Lt, 1),
            (b'>', _) => (Tok::Gt, 1),
            (b'=', _) => (Tok::Eq, 1),
            _ => {
                let ch = text[start..].chars().next().unwrap_or('?');
                return Err(ParseError {
                    offset: start,
                    message: format!("unexpected character `{ch}`"),
                });
            }
        };
        tokens.push((tok, start));
        i += len;
    }
    Ok(tokens)
}

/// A formula in disjunctive normal form. `[]` is false, `[[]]` is true.
type Dnf = Vec<Vec<Constraint>>;

/// Deepest nesting of parentheses and unary minus accepted.
const MAX_DEPTH: usize = 128;

/// Most basic sets a single formula may expand to.
const MAX_PIECES: usize = 4096;

struct Parser {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
    end: usize,
    /// Identifiers visible in the piece being parsed.
    scope: Vec<String>,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(_, o)| *o)
    }

    fn error<T>(&self, message: impl Into<String>) -> PResult<T> {
        Err(ParseError {
            offset: self.offset(),
            message: message.into(),
        })
    }

    fn unexpected<T>(&self, wanted: &str) -> PResult<T> {
        match self.peek() {
            Some(tok) => self.error(format!("expected {wanted}, found {tok}")),
            None => self.error(format!("expected {wanted}, found end of input")),
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_DEPTH {
            return self.error(format!("nesting too deep (limit {MAX_DEPTH})"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn too_many_pieces<T>(&self) -> PResult<T> {
        self.error(format!("formula expands to more than {MAX_PIECES} pieces"))
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> PResult<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            self.unexpected(&tok.to_string())
        }
    }

    fn expect_end(&self) -> PResult<()> {
        if self.peek().is_some() {
            return self.unexpected("end of input");
        }
        Ok(())
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Ident(name)) if name == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> PResult<String> {
        match self.peek() {
            Some(Tok::Ident(name)) if !is_keyword(name) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => self.unexpected("identifier"),
        }
    }

    fn ident_list(&mut self, what: &str) -> PResult<Vec<String>> {
        self.expect(&Tok::LBrack)?;
        let mut names: Vec<String> = Vec::new();
        if self.eat(&Tok::RBrack) {
            return Ok(names);
        }
        loop {
            let name = self.ident()?;
            if names.contains(&name) {
                return self.error(format!("duplicate {what} `{name}`"));
            }
            names.push(name);
            if self.eat(&Tok::RBrack) {
                return Ok(names);
            }
            self.expect(&Tok::Comma)?;
        }
    }

    fn set(&mut self) -> PResult<ParsedSet> {
        let params = if self.peek() == Some(&Tok::LBrack) {
            let params = self.ident_list("parameter")?;
            self.expect(&Tok::Arrow)?;
            params
        } else {
            Vec::new()
        };

        self.expect(&Tok::LBrace)?;
        let mut pieces = Vec::new();
        if !self.eat(&Tok::RBrace) {
            loop {
                pieces.extend(self.piece(&params)?);
                if self.eat(&Tok::RBrace) {
                    break;
                }
                self.expect(&Tok::Semi)?;
            }
        }
        Ok(ParsedSet { params, pieces })
    }

    fn piece(&mut self, params: &[String]) -> PResult<Vec<BasicSet>> {
        let name = match self.peek() {
            Some(Tok::Ident(_)) => Some(self.ident()?),
            _ => None,
        };
        let dims = self.ident_list("dimension")?;

        self.scope = dims.iter().chain(params.iter()).cloned().collect();
        let dnf = if self.eat(&Tok::Colon) {
            self.disjunction()?
        } else {
            vec![Vec::new()]
        };

        Ok(dnf
            .into_iter()
            .map(|constraints| BasicSet {
                name: name.clone(),
                dims: dims.clone(),
                constraints,
            })
            .collect())
    }

    fn disjunction(&mut self) -> PResult<Dnf> {
        let mut result = self.conjunction()?;
        while self.eat_keyword("or") {
            let rhs = self.conjunction()?;
            if result.len() + rhs.len() > MAX_PIECES {
                return self.too_many_pieces();
            }
            result.extend(rhs);
        }
        Ok(result)
    }

    fn conjunction(&mut self) -> PResult<Dnf> {
        let mut result = self.atom()?;
        while self.eat_keyword("and") {
            let rhs = self.atom()?;
            if result.len().saturating_mul(rhs.len()) > MAX_PIECES {
                return self.too_many_pieces();
            }
            let mut product = Vec::with_capacity(result.len() * rhs.len());
            for left in &result {
                for right in &rhs {
                    let mut both = left.clone();
                    both.extend(right.iter().cloned());
                    product.push(both);
                }
            }
            result = product;
        }
        Ok(result)
    }

    fn atom(&mut self) -> PResult<Dnf> {
        if self.eat_keyword("true") {
            return Ok(vec![Vec::new()]);
        }
        if self.eat_keyword("false") {
            return Ok(Vec::new());
        }
        if self.peek() == Some(&Tok::LParen) {
            // `(` opens either a nested formula or an affine expression.
            let saved = self.pos;
            self.pos += 1;
            match self.nested(Self::disjunction) {
                Ok(inner) => {
                    if self.eat(&Tok::RParen) && !self.at_relation() {
                        return Ok(inner);
                    }
                }
                // no retry as an expression: it would hit the same limit
                Err(err) if err.message.starts_with("nesting too deep") => return Err(err),
                Err(_) => {}
            }
            self.pos = saved;
        }
        self.comparison()
    }

    fn at_relation(&self) -> bool {
        matches!(
            self.peek(),
            Some(Tok::Le | Tok::Lt | Tok::Ge | Tok::Gt | Tok::Eq)
        )
    }

    fn comparison(&mut self) -> PResult<Dnf> {
        let mut lhs = self.expr()?;
        if !self.at_relation() {
            return self.unexpected("comparison operator");
        }
        let mut conjunct = Vec::new();
        let mut satisfiable = true;
        while let Some(op) = self.peek().cloned().filter(|_| self.at_relation()) {
            let offset = self.offset();
            self.pos += 1;
            let rhs = self.expr()?;
            let overflow = || ParseError {
                offset,
                message: "integer overflow in constraint".to_string(),
            };
            // Normalise to `diff >= 0` or `diff = 0`.
            let (diff, kind) = match op {
                Tok::Le => (rhs.clone().checked_sub(&lhs), ConstraintKind::Inequality),
                Tok::Lt => (
                    rhs.clone()
                        .checked_sub(&lhs)
                        .and_then(|d| d.checked_add(&Affine::constant(-1))),
                    ConstraintKind::Inequality,
                ),
                Tok::Ge => (lhs.clone().checked_sub(&rhs), ConstraintKind::Inequality),
                Tok::Gt => (
                    lhs.clone()
                        .checked_sub(&rhs)
                        .and_then(|d| d.checked_add(&Affine::constant(-1))),
                    ConstraintKind::Inequality,
                ),
                _ => (lhs.clone().checked_sub(&rhs), ConstraintKind::Equality),
            };
            let affine = diff.ok_or_else(overflow)?;
            if affine.is_constant() {
                let holds = match kind {
                    ConstraintKind::Equality => affine.constant == 0,
                    ConstraintKind::Inequality => affine.constant >= 0,
                };
                satisfiable &= holds;
            } else {
                conjunct.push(Constraint { affine, kind });
            }
            lhs = rhs;
        }
        Ok(if satisfiable { vec![conjunct] } else { Vec::new() })
    }

    fn expr(&mut self) -> PResult<Affine> {
        let mut acc = self.term()?;
        loop {
            let offset = self.offset();
            let next = if self.eat(&Tok::Plus) {
                let rhs = self.term()?;
                acc.checked_add(&rhs)
            } else if self.eat(&Tok::Minus) {
                let rhs = self.term()?;
                acc.checked_sub(&rhs)
            } else {
                return Ok(acc);
            };
            acc = next.ok_or(ParseError {
                offset,
                message: "integer overflow in expression".to_string(),
            })?;
        }
    }

    fn term(&mut self) -> PResult<Affine> {
        let mut acc = self.unary()?;
        loop {
            let offset = self.offset();
            // `2i` and `2(i + 1)` are implicit products.
            let implicit = acc.is_constant()
                && matches!(self.peek(), Some(Tok::Ident(name)) if !is_keyword(name))
                || acc.is_constant() && self.peek() == Some(&Tok::LParen);
            if !(implicit || self.eat(&Tok::Star)) {
                return Ok(acc);
            }
            let rhs = self.unary()?;
            let product = match (acc.is_constant(), rhs.is_constant()) {
                (true, _) => rhs.checked_scale(acc.constant),
                (false, true) => acc.checked_scale(rhs.constant),
                (false, false) => {
                    return Err(ParseError {
                        offset,
                        message: "non-affine product of variables".to_string(),
                    });
                }
            };
            acc = product.ok_or(ParseError {
                offset,
                message: "integer overflow in expression".to_string(),
            })?;
        }
    }

    fn unary(&mut self) -> PResult<Affine> {
        if self.eat(&Tok::Minus) {
            let offset = self.offset();
            let inner = self.nested(Self::unary)?;
            return inner.checked_scale(-1).ok_or(ParseError {
                offset,
                message: "integer overflow in expression".to_string(),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> PResult<Affine> {
        match self.peek().cloned() {
            Some(Tok::Int(value)) => {
                self.pos += 1;
                Ok(Affine::constant(value))
            }
            Some(Tok::Ident(name)) if !is_keyword(&name) => {
                if !self.scope.contains(&name) {
                    return self.error(format!("unknown identifier `{name}`"));
                }
                self.pos += 1;
                Ok(Affine::variable(&name))
            }
            Some(Tok::LParen) => {
                self.pos += 1;
                let inner = self.nested(Self::expr)?;
                self.expect(&Tok::RParen)?;
                Ok(inner)
            }
            _ => self.unexpected("expression"),
        }
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(name, "and" | "or" | "true" | "false")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ge(terms: &[(&str, i64)], constant: i64) -> Constraint {
        Constraint {
            affine: Affine {
                coeffs: terms.iter().map(|(n, c)| (n.to_string(), *c)).collect(),
                constant,
            },
            kind: ConstraintKind::Inequality,
        }
    }

    #[test]
    fn test_parse_bounded_interval() {
        let set = parse_set("{ [i] : 0 <= i <= 10 }").unwrap();
        assert!(set.params.is_empty());
        assert_eq!(set.pieces.len(), 1);
        assert_eq!(set.pieces[0].dims, vec!["i"]);
        assert_eq!(
            set.pieces[0].constraints,
            vec![ge(&[("i", 1)], 0), ge(&[("i", -1)], 10)]
        );
        assert_eq!(set.to_text(), "{ [i] : i >= 0 and -i + 10 >= 0 }");
    }

    #[test]
    fn test_parse_parametric_named_tuple() {
        let set = parse_set("[N, M] -> { S[i, j] : 0 <= i < N and 0 <= j < M }").unwrap();
        assert_eq!(set.params, vec!["N", "M"]);
        let piece = &set.pieces[0];
        assert_eq!(piece.name.as_deref(), Some("S"));
        assert_eq!(piece.constraints.len(), 4);
        assert_eq!(piece.constraints[1], ge(&[("i", -1), ("N", 1)], -1));
        assert_eq!(
            set.to_text(),
            "[N, M] -> { S[i, j] : i >= 0 and -i + N - 1 >= 0 and j >= 0 and -j + M - 1 >= 0 }"
        );
    }

    #[test]
    fn test_parse_disjunction_splits_pieces() {
        let set = parse_set("{ [i] : (i = 0 or i >= 5) and i <= 7 }").unwrap();
        assert_eq!(set.pieces.len(), 2);
        assert_eq!(set.pieces[0].constraints[0].kind, ConstraintKind::Equality);
        assert_eq!(set.pieces[1].constraints.len(), 2);
    }

    #[test]
    fn test_parse_coefficients_and_parentheses() {
        let set = parse_set("{ [i, j] : 2i + 3*j - (i - 1) * 2 >= j * 4 }").unwrap();
        // 2i + 3j - 2i + 2 - 4j >= 0  =>  -j + 2 >= 0
        assert_eq!(set.pieces[0].constraints, vec![ge(&[("j", -1)], 2)]);
    }

    #[test]
    fn test_parse_empty_and_universe() {
        let empty = parse_set("{ }").unwrap();
        assert!(empty.pieces.is_empty());
        assert_eq!(empty.to_text(), "{  }");

        let universe = parse_set("{ A[]; B[x] }").unwrap();
        assert_eq!(universe.pieces.len(), 2);
        assert_eq!(universe.to_text(), "{ A[]; B[x] }");
    }

    #[test]
    fn test_constant_constraints_fold() {
        let set = parse_set("{ [i] : 1 > 2 }").unwrap();
        assert!(set.pieces.is_empty());
        let set = parse_set("{ [i] : 0 <= 1 and true }").unwrap();
        assert_eq!(set.pieces.len(), 1);
        assert!(set.pieces[0].constraints.is_empty());
    }

    #[test]
    fn test_rejects_unknown_identifier() {
        let err = parse_set("{ [i] : 0 <= i < N }").unwrap_err();
        assert!(err.message.contains("unknown identifier `N`"));
        assert_eq!(err.offset, 17);
    }

    #[test]
    fn test_rejects_non_affine_and_malformed() {
        assert!(parse_set("{ [i, j] : i * j >= 0 }")
            .unwrap_err()
            .message
            .contains("non-affine"));
        assert!(parse_set("{ [i] : i }").is_err());
        assert!(parse_set("{ [i, i] }").is_err());
        assert!(parse_set("{ [i] : i >= 0").is_err());
        assert!(parse_set("[N] { [i] }").is_err());
        assert!(parse_set("{ [i] } trailing").is_err());
        assert!(parse_set("{ [i] : i >= 99999999999999999999 }").is_err());
        assert!(parse_set("{ [i] : i # 3 }").is_err());
        assert!(parse_set("").is_err());
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let text = format!("{{ [i] : {}i{} >= 0 }}", "(".repeat(10_000), ")".repeat(10_000));
        let err = parse_set(&text).unwrap_err();
        assert!(err.message.contains("nesting too deep"));

        let text = format!("{{ [i] : {}i >= 0 }}", "-".repeat(10_000));
        let err = parse_set(&text).unwrap_err();
        assert!(err.message.contains("nesting too deep"));

        // moderate nesting still parses
        let text = format!("{{ [i] : {}i{} >= 0 }}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_set(&text).unwrap().to_text(), "{ [i] : i >= 0 }");
        let text = format!("{{ [i] : {}(i >= 0){} }}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_set(&text).unwrap().to_text(), "{ [i] : i >= 0 }");
    }

    #[test]
    fn test_disjunction_blowup_is_an_error() {
        let clause = "(i = 0 or i = 1)";
        let text = format!("{{ [i] : {} }}", vec![clause; 30].join(" and "));
        let err = parse_set(&text).unwrap_err();
        assert!(err.message.contains("more than 4096 pieces"));

        let text = format!("{{ [i] : {} }}", vec![clause; 12].join(" and "));
        assert_eq!(parse_set(&text).unwrap().pieces.len(), 4096);
    }
}
