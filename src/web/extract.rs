//! Extractors that validate the incoming request and turn every failure into a 422 response
//! listing each violated field, the violated constraint and the offending value.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Form,
};
use lazy_regex::regex_captures;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use super::Error;

// ###################################
// ->   VIOLATION
// ###################################
/// A single violated constraint of the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: String,
    /// Where the violation happened, e.g. `["body", "nome"]` or `["path", "id_membro"]`.
    pub loc: Vec<String>,
    pub msg: String,
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Value>,
}

impl Violation {
    pub fn new(kind: impl Into<String>, loc: &[&str], msg: impl Into<String>, input: Value) -> Self {
        Violation {
            kind: kind.into(),
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            input,
            ctx: None,
        }
    }

    /// Flattens `validator` errors into violations, sorted by field name.
    /// `location` is the part of the request that was validated ("body", "query").
    pub fn from_validation(location: &str, errors: &ValidationErrors) -> Vec<Self> {
        let mut field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs))
            .collect::<Vec<_>>();
        field_errors.sort_by(|a, b| a.0.cmp(&b.0));

        let mut violations = Vec::new();
        for (field, errs) in field_errors {
            for err in errs {
                let code = err.code.to_string();
                let input = err.params.get("value").cloned().unwrap_or(Value::Null);

                let ctx = err
                    .params
                    .iter()
                    .filter(|(key, _)| *key != "value")
                    .map(|(key, val)| {
                        let key: &str = key;
                        let key = match (code.as_str(), key) {
                            ("max_length", "max") => "max_length".to_string(),
                            (_, key) => key.to_string(),
                        };
                        (key, val.clone())
                    })
                    .collect::<Map<String, Value>>();

                let msg = match &err.message {
                    Some(msg) => msg.to_string(),
                    None => default_message(&code, &ctx),
                };

                violations.push(Violation {
                    kind: code,
                    loc: vec![location.to_string(), field.clone()],
                    msg,
                    input,
                    ctx: (!ctx.is_empty()).then_some(Value::Object(ctx)),
                });
            }
        }

        violations
    }

    /// Describes why `serde_json` couldn't turn the body into the expected shape.
    pub fn from_serde(error: &serde_json::Error) -> Self {
        if let Some(field) = missing_field(error) {
            return Violation::new("missing", &["body", field.as_str()], "Field required", Value::Null);
        }

        Violation::new(serde_kind(error), &["body"], error.to_string(), Value::Null)
    }
}

fn missing_field(error: &serde_json::Error) -> Option<String> {
    let msg = error.to_string();
    regex_captures!(r#"^missing field `([^`]+)`"#, &msg).map(|(_, field)| field.to_string())
}

fn serde_kind(error: &serde_json::Error) -> &'static str {
    use serde_json::error::Category;

    match error.classify() {
        Category::Data => "value_error",
        Category::Syntax | Category::Eof | Category::Io => "json_invalid",
    }
}

fn default_message(code: &str, ctx: &Map<String, Value>) -> String {
    let bound = |key: &str| ctx.get(key).map(|v| v.to_string()).unwrap_or_default();
    match code {
        "max_length" => format!("String should have at most {} characters", bound("max_length")),
        "length" => format!(
            "String should have between {} and {} characters",
            bound("min"),
            bound("max")
        ),
        "range" => "Value out of range".to_string(),
        "email" => "Value is not a valid email address".to_string(),
        other => format!("Validation failed: {other}"),
    }
}

// ###################################
// ->   BODY
// ###################################
/// Json body that was deserialized and validated.
/// Keeps the raw json around so that later checks can report it as well.
#[derive(Debug)]
pub struct ValidatedJson<T> {
    pub data: T,
    pub raw: Value,
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|er| {
            Error::validation(
                vec![Violation::new("body_read", &["body"], er.body_text(), Value::Null)],
                Value::Null,
            )
        })?;

        let raw: Value = serde_json::from_slice(&bytes).map_err(|er| {
            let body = Value::String(String::from_utf8_lossy(&bytes).into_owned());
            Error::validation(vec![Violation::from_serde(&er)], body)
        })?;

        let data = check_body(&raw)?;

        Ok(ValidatedJson { data, raw })
    }
}

/// Url encoded form body that was deserialized and validated.
/// Form fields arrive as strings, so `T` is expected to be made of string fields.
#[derive(Debug)]
pub struct ValidatedForm<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|er| {
                Error::validation(
                    vec![Violation::new("form_invalid", &["body"], er.body_text(), Value::Null)],
                    Value::Null,
                )
            })?;

        let raw = Value::Object(
            fields
                .into_iter()
                .map(|(key, val)| (key, Value::String(val)))
                .collect(),
        );
        let data = check_body(&raw)?;

        Ok(ValidatedForm(data))
    }
}

/// Deserializes and validates a parsed body, reporting every violated field at once.
fn check_body<T>(raw: &Value) -> Result<T, Error>
where
    T: DeserializeOwned + Validate,
{
    let BodyParse {
        data,
        mut violations,
        stood_in,
    } = BodyParse::<T>::run(raw);

    if let Some(data) = &data {
        if let Err(errors) = data.validate() {
            // Constraints on stand-in values say nothing about the request.
            violations.extend(
                Violation::from_validation("body", &errors)
                    .into_iter()
                    .filter(|violation| !stood_in.iter().any(|field| violation.loc[1..] == field[..])),
            );
        }
    }

    match data {
        Some(data) if violations.is_empty() => Ok(data),
        _ => Err(Error::validation(violations, raw.clone())),
    }
}

/// Values tried in place of a missing or mistyped field, until one of them deserializes.
fn stand_ins() -> [Value; 7] {
    [
        Value::String(String::new()),
        Value::from(0),
        Value::Bool(false),
        Value::String("1970-01-01T00:00:00".to_string()),
        Value::Array(Vec::new()),
        Value::Object(Map::new()),
        Value::Null,
    ]
}

/// Upper bound on the fields that get a stand-in before giving up on a body.
const MAX_STAND_INS: usize = 64;

type PathError = serde_path_to_error::Error<serde_json::Error>;

/// The outcome of deserializing a body field by field.
///
/// `serde` stops at the first bad field. Every bad field gets a violation and a stand-in value,
/// then deserialization is retried, so that all of them are reported and the fields that did parse
/// can still be validated. `stood_in` lists the paths of the replaced fields.
struct BodyParse<T> {
    data: Option<T>,
    violations: Vec<Violation>,
    stood_in: Vec<Vec<String>>,
}

impl<T: DeserializeOwned> BodyParse<T> {
    fn run(raw: &Value) -> Self {
        let mut working = raw.clone();
        let mut violations = Vec::new();
        let mut stood_in = Vec::new();
        let mut attempt = serde_path_to_error::deserialize::<_, T>(&working);

        for _ in 0..MAX_STAND_INS {
            let error = match attempt {
                Ok(data) => {
                    return BodyParse {
                        data: Some(data),
                        violations,
                        stood_in,
                    }
                }
                Err(error) => error,
            };

            let field = failed_field(&error);
            violations.push(field_violation(&error, &field, &working));

            let Some((patched, next)) = stand_in(&working, &field) else {
                break;
            };
            working = patched;
            stood_in.push(field);
            attempt = next;
        }

        BodyParse {
            data: None,
            violations,
            stood_in,
        }
    }
}

/// Path of the offending field, for a missing field the path of its parent plus its name.
fn failed_field(error: &PathError) -> Vec<String> {
    use serde_path_to_error::Segment;

    let mut field = error
        .path()
        .iter()
        .map(|segment| match segment {
            Segment::Seq { index } => index.to_string(),
            Segment::Map { key } => key.clone(),
            Segment::Enum { variant } => variant.clone(),
            Segment::Unknown => "?".to_string(),
        })
        .collect::<Vec<_>>();
    if let Some(missing) = missing_field(error.inner()) {
        field.push(missing);
    }
    field
}

fn field_violation(error: &PathError, field: &[String], working: &Value) -> Violation {
    let loc = std::iter::once("body".to_string())
        .chain(field.iter().cloned())
        .collect();

    if missing_field(error.inner()).is_some() {
        return Violation {
            kind: "missing".to_string(),
            loc,
            msg: "Field required".to_string(),
            input: Value::Null,
            ctx: None,
        };
    }

    Violation {
        kind: serde_kind(error.inner()).to_string(),
        loc,
        msg: error.inner().to_string(),
        input: working.pointer(&json_pointer(field)).cloned().unwrap_or(Value::Null),
        ctx: None,
    }
}

/// Finds a stand-in for `field` that moves deserialization past it.
/// Returns the patched body and the next attempt.
fn stand_in<T: DeserializeOwned>(
    working: &Value,
    field: &[String],
) -> Option<(Value, Result<T, PathError>)> {
    if field.is_empty() {
        return None;
    }

    for value in stand_ins() {
        let mut patched = working.clone();
        if !set_at(&mut patched, field, value) {
            return None;
        }
        let next = serde_path_to_error::deserialize::<_, T>(&patched);
        let stuck = matches!(&next, Err(error) if failed_field(error) == field);
        if !stuck {
            return Some((patched, next));
        }
    }

    None
}

fn json_pointer(field: &[String]) -> String {
    field
        .iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}

fn set_at(root: &mut Value, field: &[String], value: Value) -> bool {
    let Some((last, parent)) = field.split_last() else {
        return false;
    };

    match root.pointer_mut(&json_pointer(parent)) {
        Some(Value::Object(map)) => {
            map.insert(last.clone(), value);
            true
        }
        Some(Value::Array(items)) => match last.parse::<usize>().ok().and_then(|idx| items.get_mut(idx)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        },
        _ => false,
    }
}

// ###################################
// ->   QUERY
// ###################################
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|er| {
                let raw = Value::String(parts.uri.query().unwrap_or_default().to_string());
                Error::validation(
                    vec![Violation::new("query_invalid", &["query"], er.body_text(), raw)],
                    Value::Null,
                )
            })?;

        query
            .validate()
            .map_err(|errors| Error::validation(Violation::from_validation("query", &errors), Value::Null))?;

        Ok(ValidatedQuery(query))
    }
}

// ###################################
// ->   PATH
// ###################################
/// Raw path parameters, parsed into integers on demand so that a bad value
/// is reported with the name of the parameter.
#[derive(Debug)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    /// Parses the named parameter as an integer within `min..=max`.
    pub fn int(&self, name: &str, min: i64, max: i64) -> Result<i64, Violation> {
        let raw = self.0.get(name).map(String::as_str).unwrap_or_default();

        let value = raw.parse::<i64>().map_err(|_| {
            Violation::new(
                "int_parsing",
                &["path", name],
                "Input should be a valid integer, unable to parse string as an integer",
                Value::String(raw.to_string()),
            )
        })?;

        if value < min {
            let mut violation = Violation::new(
                "greater_than_equal",
                &["path", name],
                format!("Input should be greater than or equal to {min}"),
                Value::String(raw.to_string()),
            );
            violation.ctx = Some(serde_json::json!({ "ge": min }));
            return Err(violation);
        }
        if value > max {
            let mut violation = Violation::new(
                "less_than_equal",
                &["path", name],
                format!("Input should be less than or equal to {max}"),
                Value::String(raw.to_string()),
            );
            violation.ctx = Some(serde_json::json!({ "le": max }));
            return Err(violation);
        }

        Ok(value)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<S> FromRequestParts<S> for PathParams
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|er| {
                Error::validation(
                    vec![Violation::new("path_invalid", &["path"], er.body_text(), Value::Null)],
                    Value::Null,
                )
            })?;

        Ok(PathParams(params))
    }
}

/// The single integer id of a gym resource, e.g. `/membros/{id_membro}`.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = PathParams::from_request_parts(parts, state).await?;
        let Some(name) = params.0.keys().next().cloned() else {
            return Err(Error::validation(
                vec![Violation::new("missing", &["path"], "Field required", Value::Null)],
                Value::Null,
            ));
        };

        let id = params
            .int(&name, i32::MIN.into(), i32::MAX.into())
            .map_err(|violation| Error::validation(vec![violation], Value::Null))?;

        // Bounds were checked above.
        Ok(IdPath(id as i32))
    }
}
