//! Path specifications: the URL shape of one route.
//!
//! # Responsibilities
//! - Hold the ordered literal / parameter segments of a route
//! - Render the wire template (`/users/:userId`)
//! - Parse raw captures into a typed [`ParsedParams`] map
//!
//! # Design Decisions
//! - Invariants (non-empty, routable segments, unique parameter names) are checked at build time
//! - Parsing is fail-fast in segment order
//! - Literals are structural only; they never appear in the raw capture map

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

use super::param::{ParamParser, ParamValue, PathParseError};

/// Raw, percent-decoded captures keyed by parameter name.
pub type RawParams = HashMap<String, String>;

/// Errors raised while building a [`PathSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathSpecError {
    #[error("path must contain at least one segment")]
    Empty,

    #[error("duplicate path parameter `{0}`")]
    DuplicateParam(String),

    #[error("literal segment `{0}` cannot be routed")]
    InvalidLiteral(String),

    #[error("parameter name `{0}` cannot be routed")]
    InvalidParamName(String),
}

/// One segment of a route path.
#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Param(ParamParser),
}

impl From<&str> for Segment {
    fn from(literal: &str) -> Self {
        Segment::Literal(literal.to_string())
    }
}

impl From<String> for Segment {
    fn from(literal: String) -> Self {
        Segment::Literal(literal)
    }
}

impl From<ParamParser> for Segment {
    fn from(parser: ParamParser) -> Self {
        Segment::Param(parser)
    }
}

/// Typed parameters parsed out of a request path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedParams(BTreeMap<String, ParamValue>);

impl ParsedParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Integer parameter by name, `None` if absent or not an integer.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// String parameter by name, `None` if absent or not a string.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, ParamValue)> for ParsedParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered segment list describing one route's URL shape.
#[derive(Debug, Clone)]
pub struct PathSpec {
    segments: Vec<Segment>,
}

impl PathSpec {
    /// Build a path spec, enforcing non-emptiness and unique parameter names.
    pub fn build<I, S>(segments: I) -> Result<Self, PathSpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        let segments: Vec<Segment> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathSpecError::Empty);
        }

        let mut seen = HashSet::new();
        for segment in &segments {
            match segment {
                Segment::Literal(text) => {
                    if !is_routable_literal(text) {
                        return Err(PathSpecError::InvalidLiteral(text.clone()));
                    }
                }
                Segment::Param(parser) => {
                    if !is_routable_param_name(parser.name()) {
                        return Err(PathSpecError::InvalidParamName(parser.name().to_string()));
                    }
                    if !seen.insert(parser.name()) {
                        return Err(PathSpecError::DuplicateParam(parser.name().to_string()));
                    }
                }
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in segment order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params().map(ParamParser::name)
    }

    /// Wire template, e.g. `/users/:userId/households/:householdId`.
    pub fn template(&self) -> String {
        self.render(|name| format!(":{}", name))
    }

    /// Path in the transport's capture syntax, e.g. `/users/{userId}`.
    pub(crate) fn transport_path(&self) -> String {
        self.render(|name| format!("{{{}}}", name))
    }

    /// Template with every parameter erased; two specs with equal shapes
    /// match exactly the same request paths.
    pub(crate) fn shape(&self) -> String {
        self.render(|_| ":".to_string())
    }

    /// Decode every parameter segment from the raw captures, stopping at the first failure.
    pub fn parse(&self, raw: &RawParams) -> Result<ParsedParams, PathParseError> {
        self.params()
            .map(|parser| {
                let value = parser.decode(raw.get(parser.name()).map(String::as_str))?;
                Ok::<_, PathParseError>((parser.name().to_string(), value))
            })
            .collect()
    }

    fn params(&self) -> impl Iterator<Item = &ParamParser> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(parser) => Some(parser),
            Segment::Literal(_) => None,
        })
    }

    fn render(&self, param: impl Fn(&str) -> String) -> String {
        let joined = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Param(parser) => param(parser.name()),
            })
            .collect::<Vec<_>>()
            .join("/");

        format!("/{}", joined)
    }
}

fn is_routable_literal(text: &str) -> bool {
    !text.contains(['/', '{', '}']) && !text.starts_with([':', '*'])
}

fn is_routable_param_name(name: &str) -> bool {
    !name.is_empty() && is_routable_literal(name)
}
