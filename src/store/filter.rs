//! Query filters evaluated by the bundled stores
//!
//! A where clause is a conjunction of comparisons:
//!
//! ```text
//! clause := term (AND term)*
//! term   := FIELD op literal | FIELD IS [NOT] NULL
//! op     := = | <> | != | < | <= | > | >=
//! ```
//!
//! Field names resolve through the schema's resolver, ignoring case. An
//! unknown field is an `InvalidQuery` error, not a `-1`.

use std::cmp::Ordering;

use serde_json::Value;

use crate::record::Record;
use crate::schema::{FieldType, SchemaDescriptor};

use super::errors::{StoreError, StoreResult};

/// Query parameters for `Table::search`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// Optional where clause; `None` or blank selects every row
    pub where_clause: Option<String>,
}

impl QueryFilter {
    /// Filter selecting every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter with a where clause
    pub fn with_where(clause: impl Into<String>) -> Self {
        Self {
            where_clause: Some(clause.into()),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    IsNull,
    IsNotNull,
}

/// One comparison bound to a field ordinal
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Ordinal of the compared field
    pub ordinal: usize,
    pub op: CompareOp,
    /// Literal operand; null for the `IS [NOT] NULL` tests
    pub value: Value,
}

/// A where clause compiled against one schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    predicates: Vec<Predicate>,
}

impl CompiledFilter {
    /// Parses `filter` and binds its field names to `schema`.
    pub fn compile(schema: &SchemaDescriptor, filter: &QueryFilter) -> StoreResult<Self> {
        let clause = match filter.where_clause.as_deref() {
            Some(clause) if !clause.trim().is_empty() => clause,
            _ => return Ok(Self::default()),
        };

        let tokens = tokenize(clause)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            schema,
        };
        let predicates = parser.parse_clause()?;
        Ok(Self { predicates })
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// True if the record satisfies every predicate
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|pred| {
            let actual = record.get(pred.ordinal).unwrap_or(&Value::Null);
            matches_predicate(actual, pred.op, &pred.value)
        })
    }
}

fn matches_predicate(actual: &Value, op: CompareOp, expected: &Value) -> bool {
    match op {
        CompareOp::IsNull => actual.is_null(),
        CompareOp::IsNotNull => !actual.is_null(),
        // Null values never match a comparison
        _ if actual.is_null() => false,
        CompareOp::Eq => compare(actual, expected) == Some(Ordering::Equal),
        CompareOp::Ne => compare(actual, expected).map_or(false, |o| o != Ordering::Equal),
        CompareOp::Lt => compare(actual, expected) == Some(Ordering::Less),
        CompareOp::Le => matches!(compare(actual, expected), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => compare(actual, expected) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            compare(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Orders two numbers or two strings; anything else is incomparable.
fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(serde_json::Number),
    Op(CompareOp),
}

fn tokenize(clause: &str) -> StoreResult<Vec<Token>> {
    let chars: Vec<char> = clause.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if c == '\'' {
            i += 1;
            let mut literal = String::new();
            loop {
                match chars.get(i) {
                    None => {
                        return Err(StoreError::InvalidQuery(format!(
                            "Unterminated string literal in '{}'",
                            clause
                        )))
                    }
                    Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                        literal.push('\'');
                        i += 2;
                    }
                    Some('\'') => {
                        i += 1;
                        break;
                    }
                    Some(ch) => {
                        literal.push(*ch);
                        i += 1;
                    }
                }
            }
            tokens.push(Token::Str(literal));
        } else if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).map_or(false, char::is_ascii_digit)) {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            tokens.push(Token::Num(parse_number(&text)?));
        } else {
            let next = chars.get(i + 1).copied();
            let (op, width) = match (c, next) {
                ('<', Some('>')) => (CompareOp::Ne, 2),
                ('!', Some('=')) => (CompareOp::Ne, 2),
                ('<', Some('=')) => (CompareOp::Le, 2),
                ('>', Some('=')) => (CompareOp::Ge, 2),
                ('<', _) => (CompareOp::Lt, 1),
                ('>', _) => (CompareOp::Gt, 1),
                ('=', _) => (CompareOp::Eq, 1),
                _ => {
                    return Err(StoreError::InvalidQuery(format!(
                        "Unexpected character '{}' in '{}'",
                        c, clause
                    )))
                }
            };
            tokens.push(Token::Op(op));
            i += width;
        }
    }

    Ok(tokens)
}

fn parse_number(text: &str) -> StoreResult<serde_json::Number> {
    if let Ok(n) = text.parse::<i64>() {
        return Ok(n.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| StoreError::InvalidQuery(format!("Invalid number '{}'", text)))
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    schema: &'a SchemaDescriptor,
}

impl Parser<'_> {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.tokens.get(self.pos), Some(Token::Ident(word)) if word.eq_ignore_ascii_case(keyword))
    }

    fn expect_keyword(&mut self, keyword: &str) -> StoreResult<()> {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(StoreError::InvalidQuery(format!("Expected {}", keyword)))
        }
    }

    fn parse_clause(&mut self) -> StoreResult<Vec<Predicate>> {
        let mut predicates = vec![self.parse_term()?];
        while self.pos < self.tokens.len() {
            self.expect_keyword("AND")?;
            predicates.push(self.parse_term()?);
        }
        Ok(predicates)
    }

    fn parse_term(&mut self) -> StoreResult<Predicate> {
        let name = match self.next() {
            Some(Token::Ident(name)) => name,
            other => {
                return Err(StoreError::InvalidQuery(format!(
                    "Expected field name, found {:?}",
                    other
                )))
            }
        };

        let field = self.schema.field_by_name(name.as_str()).ok_or_else(|| {
            StoreError::InvalidQuery(format!(
                "Unknown field '{}' in table '{}'",
                name,
                self.schema.name()
            ))
        })?;
        let ordinal = field.ordinal;
        let field_type = field.field_type;

        if self.peek_keyword("IS") {
            self.pos += 1;
            let op = if self.peek_keyword("NOT") {
                self.pos += 1;
                CompareOp::IsNotNull
            } else {
                CompareOp::IsNull
            };
            self.expect_keyword("NULL")?;
            return Ok(Predicate {
                ordinal,
                op,
                value: Value::Null,
            });
        }

        let op = match self.next() {
            Some(Token::Op(op)) => op,
            other => {
                return Err(StoreError::InvalidQuery(format!(
                    "Expected comparison after '{}', found {:?}",
                    name, other
                )))
            }
        };

        let value = match self.next() {
            Some(Token::Str(s)) => Value::String(s),
            Some(Token::Num(n)) => Value::Number(n),
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("NULL") => {
                return Err(StoreError::InvalidQuery(format!(
                    "Use IS NULL to test '{}' for null",
                    name
                )))
            }
            other => {
                return Err(StoreError::InvalidQuery(format!(
                    "Expected literal after '{}', found {:?}",
                    name, other
                )))
            }
        };

        if !literal_fits(field_type, &value) {
            return Err(StoreError::InvalidQuery(format!(
                "Literal {} cannot be compared with {} field '{}'",
                value,
                field_type.type_name(),
                name
            )));
        }

        Ok(Predicate { ordinal, op, value })
    }
}

fn literal_fits(field_type: FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::ObjectId | FieldType::Integer | FieldType::Double => value.is_number(),
        FieldType::String | FieldType::Date | FieldType::Guid => field_type.accepts(value),
        FieldType::Geometry => false,
    }
}
