use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    database::planos,
    model::{NewPlano, Plano, PlanoPatch},
    web::{
        extract::{IdPath, ValidatedJson, Violation},
        Error, Resource, WebResult,
    },
    AppState,
};

const PLANO: Resource = Resource::Plano;

#[tracing::instrument(name = "Listing plans", skip(app_state))]
pub async fn list(State(app_state): State<AppState>) -> WebResult<Json<Vec<Plano>>> {
    let planos = planos::list(app_state.database_mgr.db())
        .await
        .map_err(|er| Error::from_db(er, PLANO))?;

    Ok(Json(planos))
}

#[tracing::instrument(name = "Getting a plan", skip(app_state))]
pub async fn get(
    State(app_state): State<AppState>,
    IdPath(id_plano): IdPath,
) -> WebResult<Json<Plano>> {
    let plano = planos::get_by_id(app_state.database_mgr.db(), id_plano)
        .await
        .map_err(|er| Error::from_db(er, PLANO))?
        .ok_or(Error::NotFound(PLANO))?;

    Ok(Json(plano))
}

#[tracing::instrument(
    name = "Creating a plan",
    skip(app_state, body),
    fields(nome = %body.data.nome)
)]
pub async fn create(
    State(app_state): State<AppState>,
    body: ValidatedJson<NewPlano>,
) -> WebResult<(StatusCode, Json<Plano>)> {
    let db = app_state.database_mgr.db();
    let plano = body.data;

    // A unique index backs this check, a concurrent insert that slips through is reported the same way.
    let existing = planos::get_by_nome(db, &plano.nome)
        .await
        .map_err(|er| Error::from_db(er, PLANO))?;
    if existing.is_some() {
        return Err(Error::Duplicate(PLANO));
    }

    let plano = planos::create(db, plano)
        .await
        .map_err(|er| Error::from_db(er, PLANO))?;
    info!(id_plano = plano.id_plano, "New plan registered.");

    Ok((StatusCode::CREATED, Json(plano)))
}

#[tracing::instrument(name = "Updating a plan", skip(app_state, body))]
pub async fn update(
    State(app_state): State<AppState>,
    IdPath(id_plano): IdPath,
    body: ValidatedJson<PlanoPatch>,
) -> WebResult<Json<Plano>> {
    let ValidatedJson { data: patch, raw } = body;
    patch
        .validate_for(id_plano)
        .map_err(|errors| Error::validation(Violation::from_validation("body", &errors), raw))?;

    let plano = planos::update(app_state.database_mgr.db(), id_plano, patch)
        .await
        .map_err(|er| Error::from_db(er, PLANO))?
        .ok_or(Error::NotFound(PLANO))?;

    Ok(Json(plano))
}

#[tracing::instrument(name = "Deleting a plan", skip(app_state))]
pub async fn delete(
    State(app_state): State<AppState>,
    IdPath(id_plano): IdPath,
) -> WebResult<(StatusCode, Json<Value>)> {
    let plano = planos::delete(app_state.database_mgr.db(), id_plano)
        .await
        .map_err(|er| Error::from_db(er, PLANO))?
        .ok_or(Error::NotFound(PLANO))?;
    info!(id_plano, "Plan deleted.");

    Ok((StatusCode::ACCEPTED, Json(json!({ "Deletado": plano }))))
}
