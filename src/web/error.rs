use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use strum_macros::AsRefStr;

use super::extract::Violation;
use crate::database;

pub type WebResult<T> = core::result::Result<T, Error>;

/// The gym resources, used to pick the client facing message of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Membro,
    Plano,
    Assinatura,
}

impl Resource {
    pub fn not_found_msg(&self) -> &'static str {
        match self {
            Resource::Membro => "Membro não encontrado",
            Resource::Plano => "Plano não encontrado",
            Resource::Assinatura => "Assinatura não encontrada",
        }
    }

    pub fn duplicate_msg(&self) -> &'static str {
        match self {
            Resource::Membro => "Membro ja registrado",
            Resource::Plano => "Plano ja registrado",
            Resource::Assinatura => "Assinatura ja registrada",
        }
    }

    pub fn still_referenced_msg(&self) -> &'static str {
        match self {
            Resource::Membro => "Membro possui assinaturas",
            Resource::Plano => "Plano possui assinaturas",
            Resource::Assinatura => "Assinatura possui registros dependentes",
        }
    }
}

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("request failed validation: {} violation(s)", .detail.len())]
    Validation { detail: Vec<Violation>, body: Value },
    #[error("{0:?} not found")]
    NotFound(Resource),
    #[error("{0:?} already registered")]
    Duplicate(Resource),
    #[error("referenced member or plan does not exist")]
    MissingReference,
    #[error("{0:?} is still referenced by subscriptions")]
    StillReferenced(Resource),
    #[error("tutorial item not found")]
    ItemNotFound,

    #[error("database error: {0}")]
    Database(#[from] database::Error),
}

impl Error {
    pub fn validation(detail: Vec<Violation>, body: Value) -> Self {
        Error::Validation { detail, body }
    }

    /// Translates a gateway error into the error of the resource that was being handled.
    pub fn from_db(error: database::Error, resource: Resource) -> Self {
        match error {
            database::Error::Duplicate => Error::Duplicate(resource),
            database::Error::MissingReference => Error::MissingReference,
            database::Error::StillReferenced => Error::StillReferenced(resource),
            other => Error::Database(other),
        }
    }

    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::Validation { detail, body } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                InvalidInput {
                    detail: detail.clone(),
                    body: body.clone(),
                },
            ),
            Error::NotFound(res) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                NotFound(res.not_found_msg()),
            ),
            Error::Duplicate(res) => (StatusCode::BAD_REQUEST, Conflict(res.duplicate_msg())),
            Error::MissingReference => (
                StatusCode::UNPROCESSABLE_ENTITY,
                NotFound("Membro ou plano não encontrado"),
            ),
            Error::StillReferenced(res) => (
                StatusCode::BAD_REQUEST,
                Conflict(res.still_referenced_msg()),
            ),
            Error::ItemNotFound => (StatusCode::NOT_FOUND, TutorialItemNotFound),
            Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// The error as the client gets to see it.
#[derive(Debug, AsRefStr)]
pub enum ClientError {
    InvalidInput { detail: Vec<Violation>, body: Value },
    NotFound(&'static str),
    Conflict(&'static str),
    TutorialItemNotFound,
    ServiceError,
}

impl ClientError {
    pub fn body(&self) -> Value {
        match self {
            ClientError::InvalidInput { detail, body } => json!({ "detail": detail, "body": body }),
            ClientError::NotFound(msg) | ClientError::Conflict(msg) => json!({ "detail": msg }),
            ClientError::TutorialItemNotFound => json!({ "detail": "Item not found" }),
            ClientError::ServiceError => json!({ "detail": "Erro interno" }),
        }
    }

    pub fn to_response(&self, status: StatusCode) -> Response {
        let mut resp = (status, Json(self.body())).into_response();
        if let ClientError::TutorialItemNotFound = self {
            resp.headers_mut().insert(
                "x-error",
                HeaderValue::from_static("There goes my error"),
            );
        }
        resp
    }
}
