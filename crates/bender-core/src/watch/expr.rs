//! Watch expressions
//!
//! A small, closed expression language over component properties. The set of
//! properties an expression reads is known statically, which is what the
//! dependency graph is built from.

use crate::error::{BenderError, BenderResult};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expression computing a watch's output from properties
///
/// Serialized externally tagged, e.g. `{"property": "x"}`,
/// `{"template": "Hello {name}"}` or `{"sum": [{"property": "a"}, {"literal": 1}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Constant
    Literal(Value),
    /// Current value of a property
    Property(String),
    /// String interpolation of properties
    Template(Template),
    /// Boolean negation of truthiness
    Not(Box<Expr>),
    /// Display forms joined into one string
    Concat(Vec<Expr>),
    /// Numeric sum
    Sum(Vec<Expr>),
    /// Value equality
    Equals(Box<Expr>, Box<Expr>),
    /// Conditional
    If {
        /// Condition, tested for truthiness
        cond: Box<Expr>,
        /// Result when the condition holds
        then: Box<Expr>,
        /// Result otherwise
        #[serde(rename = "else")]
        otherwise: Box<Expr>,
    },
}

impl Expr {
    /// Reference to a property
    pub fn property(name: impl Into<String>) -> Self {
        Expr::Property(name.into())
    }

    /// Constant value
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Parse a template such as `"Hello {name}"`
    pub fn template(source: &str) -> BenderResult<Self> {
        Template::parse(source).map(Expr::Template)
    }

    /// Properties read by this expression, in first-use order
    pub fn dependencies(&self) -> IndexSet<String> {
        let mut deps = IndexSet::new();
        self.collect_dependencies(&mut deps);
        deps
    }

    fn collect_dependencies(&self, deps: &mut IndexSet<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Property(name) => {
                deps.insert(name.clone());
            }
            Expr::Template(template) => {
                for name in template.properties() {
                    deps.insert(name.to_string());
                }
            }
            Expr::Not(inner) => inner.collect_dependencies(deps),
            Expr::Concat(items) | Expr::Sum(items) => {
                for item in items {
                    item.collect_dependencies(deps);
                }
            }
            Expr::Equals(left, right) => {
                left.collect_dependencies(deps);
                right.collect_dependencies(deps);
            }
            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                cond.collect_dependencies(deps);
                then.collect_dependencies(deps);
                otherwise.collect_dependencies(deps);
            }
        }
    }

    /// Evaluate against a property map
    pub fn evaluate(&self, properties: &IndexMap<String, Value>) -> BenderResult<Value> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Property(name) => lookup(properties, name).cloned(),
            Expr::Template(template) => template.render(properties).map(Value::String),
            Expr::Not(inner) => Ok(Value::Bool(!inner.evaluate(properties)?.is_truthy())),
            Expr::Concat(items) => {
                let mut out = String::new();
                for item in items {
                    out.push_str(&item.evaluate(properties)?.to_string());
                }
                Ok(Value::String(out))
            }
            Expr::Sum(items) => {
                let mut total = 0.0;
                for item in items {
                    let value = item.evaluate(properties)?;
                    total += value.as_number().ok_or_else(|| {
                        BenderError::evaluation(format!(
                            "sum expects numbers, got {} `{value}`",
                            value.type_name()
                        ))
                    })?;
                }
                Ok(Value::Number(total))
            }
            Expr::Equals(left, right) => Ok(Value::Bool(
                left.evaluate(properties)? == right.evaluate(properties)?,
            )),
            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                if cond.evaluate(properties)?.is_truthy() {
                    then.evaluate(properties)
                } else {
                    otherwise.evaluate(properties)
                }
            }
        }
    }
}

fn lookup<'a>(properties: &'a IndexMap<String, Value>, name: &str) -> BenderResult<&'a Value> {
    properties
        .get(name)
        .ok_or_else(|| BenderError::evaluation(format!("property `{name}` is not defined")))
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Verbatim text (escapes already resolved)
    Literal(String),
    /// `{name}` placeholder
    Property(String),
}

/// A parsed `{property}` interpolation string
///
/// `{{` and `}}` stand for literal braces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text
    pub fn parse(source: &str) -> BenderResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => {
                                return Err(BenderError::invalid_expression(
                                    source,
                                    "unterminated placeholder",
                                ))
                            }
                        }
                    }
                    if !is_identifier(&name) {
                        return Err(BenderError::invalid_expression(
                            source,
                            format!("`{name}` is not a property name"),
                        ));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Property(name));
                }
                '}' => {
                    return Err(BenderError::invalid_expression(
                        source,
                        "unmatched `}` (write `}}` for a literal brace)",
                    ))
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Property names in placeholder order (may repeat)
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Property(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// True when the template has at least one placeholder
    pub fn is_dynamic(&self) -> bool {
        self.properties().next().is_some()
    }

    /// Interpolate property values
    pub fn render(&self, properties: &IndexMap<String, Value>) -> BenderResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Property(name) => out.push_str(&lookup(properties, name)?.to_string()),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for Template {
    type Error = BenderError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(&source)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.source
    }
}

/// Property names: a letter or `_`, then letters, digits, `_` or `-`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
