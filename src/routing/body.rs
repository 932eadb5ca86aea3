//! Request body schemas.
//!
//! A schema decodes the raw request body into the value handed to the route
//! handler, or reports a list of structured [`BodyIssue`]s that is returned to
//! the client verbatim as a 400 response.

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Machine-readable category of a body validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A body was required but none was sent.
    Required,
    /// A body was sent to a route that expects none.
    UnexpectedBody,
    /// The body is not syntactically valid JSON.
    InvalidJson,
    /// Valid JSON whose shape does not match the expected type.
    InvalidType,
    /// Rejected by a semantic check attached to the schema.
    Custom,
}

/// One body validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyIssue {
    pub code: IssueCode,
    /// Field path of the failure, empty for the body as a whole.
    pub path: Vec<String>,
    pub message: String,
}

impl BodyIssue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Semantic check failure on the named field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: IssueCode::Custom,
            path: vec![field.into()],
            message: message.into(),
        }
    }
}

/// Decoder for a route's request body.
pub trait BodySchema: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Decode the raw body. `None` means the request carried no body bytes.
    fn decode(&self, raw: Option<&Bytes>) -> Result<Self::Output, Vec<BodyIssue>>;
}

/// Schema for routes that must receive an empty body.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBody;

/// Shorthand for [`NoBody`].
pub fn no_body() -> NoBody {
    NoBody
}

impl BodySchema for NoBody {
    type Output = ();

    fn decode(&self, raw: Option<&Bytes>) -> Result<(), Vec<BodyIssue>> {
        match raw {
            None => Ok(()),
            Some(_) => Err(vec![BodyIssue::new(
                IssueCode::UnexpectedBody,
                "Expected an empty request body",
            )]),
        }
    }
}

type Check<T> = Box<dyn Fn(&T) -> Result<(), Vec<BodyIssue>> + Send + Sync>;

/// JSON body deserialized into `T`, optionally followed by semantic checks.
pub struct Json<T> {
    checks: Vec<Check<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Attach a semantic check run after successful deserialization.
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), Vec<BodyIssue>> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }
}

impl<T> Default for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Json")
            .field("type", &std::any::type_name::<T>())
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// Shorthand for [`Json::new`].
pub fn json<T>() -> Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    Json::new()
}

impl<T> BodySchema for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn decode(&self, raw: Option<&Bytes>) -> Result<T, Vec<BodyIssue>> {
        let raw = raw.ok_or_else(|| vec![BodyIssue::new(IssueCode::Required, "Required")])?;

        let value: T = serde_json::from_slice(raw).map_err(|e| {
            let code = if e.is_data() {
                IssueCode::InvalidType
            } else {
                IssueCode::InvalidJson
            };
            vec![BodyIssue::new(code, e.to_string())]
        })?;

        let issues: Vec<BodyIssue> = self
            .checks
            .iter()
            .filter_map(|check| check(&value).err())
            .flatten()
            .collect();

        if issues.is_empty() {
            Ok(value)
        } else {
            Err(issues)
        }
    }
}

/// Schema used by routes registered without one; the body is never looked at.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Ignored;

impl BodySchema for Ignored {
    type Output = ();

    fn decode(&self, _raw: Option<&Bytes>) -> Result<(), Vec<BodyIssue>> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TodoInput {
        title: String,
    }

    fn bytes(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[test]
    fn test_no_body_accepts_absent() {
        assert_eq!(NoBody.decode(None), Ok(()));
    }

    #[test]
    fn test_no_body_rejects_payload() {
        let issues = NoBody.decode(Some(&bytes("{}"))).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::UnexpectedBody);
    }

    #[test]
    fn test_json_decodes_typed_value() {
        let schema = json::<TodoInput>();
        let decoded = schema.decode(Some(&bytes(r#"{"title":"Wash dishes"}"#))).unwrap();
        assert_eq!(decoded, TodoInput { title: "Wash dishes".into() });
    }

    #[test]
    fn test_json_requires_body() {
        let issues = json::<TodoInput>().decode(None).unwrap_err();
        assert_eq!(issues[0].code, IssueCode::Required);
    }

    #[test]
    fn test_json_reports_syntax_and_shape_errors() {
        let schema = json::<TodoInput>();

        let issues = schema.decode(Some(&bytes("{not json"))).unwrap_err();
        assert_eq!(issues[0].code, IssueCode::InvalidJson);

        let issues = schema.decode(Some(&bytes(r#"{"title": 5}"#))).unwrap_err();
        assert_eq!(issues[0].code, IssueCode::InvalidType);
    }

    #[test]
    fn test_json_checks_collect_all_issues() {
        let schema = json::<TodoInput>()
            .check(|t| {
                if t.title.trim().is_empty() {
                    Err(vec![BodyIssue::field("title", "must not be blank")])
                } else {
                    Ok(())
                }
            })
            .check(|t| {
                if t.title.len() > 3 {
                    Ok(())
                } else {
                    Err(vec![BodyIssue::field("title", "too short")])
                }
            });

        let issues = schema.decode(Some(&bytes(r#"{"title":"  "}"#))).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path, vec!["title".to_string()]);

        assert!(schema.decode(Some(&bytes(r#"{"title":"long enough"}"#))).is_ok());
    }

    #[test]
    fn test_issue_serialization() {
        let issue = BodyIssue::field("title", "too short");
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            serde_json::json!({ "code": "custom", "path": ["title"], "message": "too short" })
        );
    }

    #[test]
    fn test_ignored_accepts_anything() {
        assert!(Ignored.decode(Some(&bytes("garbage"))).is_ok());
    }
}
