use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    database::assinaturas,
    model::{Assinatura, AssinaturaPatch, NewAssinatura},
    web::{
        extract::{IdPath, ValidatedJson, Violation},
        Error, Resource, WebResult,
    },
    AppState,
};

const ASSINATURA: Resource = Resource::Assinatura;

#[tracing::instrument(name = "Listing subscriptions", skip(app_state))]
pub async fn list(State(app_state): State<AppState>) -> WebResult<Json<Vec<Assinatura>>> {
    let assinaturas = assinaturas::list(app_state.database_mgr.db())
        .await
        .map_err(|er| Error::from_db(er, ASSINATURA))?;

    Ok(Json(assinaturas))
}

#[tracing::instrument(name = "Getting a subscription", skip(app_state))]
pub async fn get(
    State(app_state): State<AppState>,
    IdPath(id_assinatura): IdPath,
) -> WebResult<Json<Assinatura>> {
    let assinatura = assinaturas::get_by_id(app_state.database_mgr.db(), id_assinatura)
        .await
        .map_err(|er| Error::from_db(er, ASSINATURA))?
        .ok_or(Error::NotFound(ASSINATURA))?;

    Ok(Json(assinatura))
}

/// Subscriptions have no natural key, the member and the plan have to exist though.
#[tracing::instrument(
    name = "Creating a subscription",
    skip(app_state, body),
    fields(
        id_membro = body.data.id_membro,
        id_plano = body.data.id_plano
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    body: ValidatedJson<NewAssinatura>,
) -> WebResult<(StatusCode, Json<Assinatura>)> {
    let assinatura = assinaturas::create(app_state.database_mgr.db(), body.data)
        .await
        .map_err(|er| Error::from_db(er, ASSINATURA))?;
    info!(
        id_assinatura = assinatura.id_assinatura,
        "New subscription registered."
    );

    Ok((StatusCode::CREATED, Json(assinatura)))
}

#[tracing::instrument(name = "Updating a subscription", skip(app_state, body))]
pub async fn update(
    State(app_state): State<AppState>,
    IdPath(id_assinatura): IdPath,
    body: ValidatedJson<AssinaturaPatch>,
) -> WebResult<Json<Assinatura>> {
    let ValidatedJson { data: patch, raw } = body;
    patch
        .validate_for(id_assinatura)
        .map_err(|errors| Error::validation(Violation::from_validation("body", &errors), raw))?;

    let assinatura = assinaturas::update(app_state.database_mgr.db(), id_assinatura, patch)
        .await
        .map_err(|er| Error::from_db(er, ASSINATURA))?
        .ok_or(Error::NotFound(ASSINATURA))?;

    Ok(Json(assinatura))
}

#[tracing::instrument(name = "Deleting a subscription", skip(app_state))]
pub async fn delete(
    State(app_state): State<AppState>,
    IdPath(id_assinatura): IdPath,
) -> WebResult<(StatusCode, Json<Value>)> {
    let assinatura = assinaturas::delete(app_state.database_mgr.db(), id_assinatura)
        .await
        .map_err(|er| Error::from_db(er, ASSINATURA))?
        .ok_or(Error::NotFound(ASSINATURA))?;
    info!(id_assinatura, "Subscription deleted.");

    Ok((StatusCode::ACCEPTED, Json(json!({ "Deletado": assinatura }))))
}
