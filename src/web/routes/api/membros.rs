use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    database::membros,
    model::{Membro, MembroPatch, NewMembro},
    web::{
        extract::{IdPath, ValidatedJson, Violation},
        Error, Resource, WebResult,
    },
    AppState,
};

const MEMBRO: Resource = Resource::Membro;

#[tracing::instrument(name = "Listing members", skip(app_state))]
pub async fn list(State(app_state): State<AppState>) -> WebResult<Json<Vec<Membro>>> {
    let membros = membros::list(app_state.database_mgr.db())
        .await
        .map_err(|er| Error::from_db(er, MEMBRO))?;

    Ok(Json(membros))
}

#[tracing::instrument(name = "Getting a member", skip(app_state))]
pub async fn get(
    State(app_state): State<AppState>,
    IdPath(id_membro): IdPath,
) -> WebResult<Json<Membro>> {
    let membro = membros::get_by_id(app_state.database_mgr.db(), id_membro)
        .await
        .map_err(|er| Error::from_db(er, MEMBRO))?
        .ok_or(Error::NotFound(MEMBRO))?;

    Ok(Json(membro))
}

#[tracing::instrument(
    name = "Creating a member",
    skip(app_state, body),
    fields(nome = %body.data.nome)
)]
pub async fn create(
    State(app_state): State<AppState>,
    body: ValidatedJson<NewMembro>,
) -> WebResult<(StatusCode, Json<Membro>)> {
    let db = app_state.database_mgr.db();
    let membro = body.data;

    // A unique index backs this check, a concurrent insert that slips through is reported the same way.
    if let Some(celular) = membro.celular {
        let existing = membros::get_by_celular(db, celular)
            .await
            .map_err(|er| Error::from_db(er, MEMBRO))?;
        if existing.is_some() {
            return Err(Error::Duplicate(MEMBRO));
        }
    }

    let membro = membros::create(db, membro)
        .await
        .map_err(|er| Error::from_db(er, MEMBRO))?;
    info!(id_membro = membro.id_membro, "New member registered.");

    Ok((StatusCode::CREATED, Json(membro)))
}

#[tracing::instrument(name = "Updating a member", skip(app_state, body))]
pub async fn update(
    State(app_state): State<AppState>,
    IdPath(id_membro): IdPath,
    body: ValidatedJson<MembroPatch>,
) -> WebResult<Json<Membro>> {
    let ValidatedJson { data: patch, raw } = body;
    patch
        .validate_for(id_membro)
        .map_err(|errors| Error::validation(Violation::from_validation("body", &errors), raw))?;

    let membro = membros::update(app_state.database_mgr.db(), id_membro, patch)
        .await
        .map_err(|er| Error::from_db(er, MEMBRO))?
        .ok_or(Error::NotFound(MEMBRO))?;

    Ok(Json(membro))
}

#[tracing::instrument(name = "Deleting a member", skip(app_state))]
pub async fn delete(
    State(app_state): State<AppState>,
    IdPath(id_membro): IdPath,
) -> WebResult<(StatusCode, Json<Value>)> {
    let membro = membros::delete(app_state.database_mgr.db(), id_membro)
        .await
        .map_err(|er| Error::from_db(er, MEMBRO))?
        .ok_or(Error::NotFound(MEMBRO))?;
    info!(id_membro, "Member deleted.");

    Ok((StatusCode::ACCEPTED, Json(json!({ "Deletado": membro }))))
}
