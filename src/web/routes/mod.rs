//! Contains all the routes that this application can handle.
//! Every group registers its full paths so that the trailing slash of `/membros/` is kept.

mod api;
mod home;
pub mod tutorial;

use crate::AppState;
use home::{health_check, home};

use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health-check", get(health_check))
        .merge(membros_routes(app_state.clone()))
        .merge(planos_routes(app_state.clone()))
        .merge(assinaturas_routes(app_state.clone()))
        .merge(tutorial::routes(app_state))
}

/// MEMBROS - Routes under the "/membros" path
fn membros_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/membros/", get(api::membros::list))
        .route("/membros/{id_membro}", get(api::membros::get))
        .route("/membros/create", post(api::membros::create))
        .route("/membros/update/{id_membro}", put(api::membros::update))
        .route("/membros/delete/{id_membro}", delete(api::membros::delete))
        .with_state(app_state)
}

/// PLANOS - Routes under the "/planos" path
fn planos_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/planos/", get(api::planos::list))
        .route("/planos/{id_plano}", get(api::planos::get))
        .route("/planos/create", post(api::planos::create))
        .route("/planos/update/{id_plano}", put(api::planos::update))
        .route("/planos/delete/{id_plano}", delete(api::planos::delete))
        .with_state(app_state)
}

/// ASSINATURAS - Routes under the "/assinaturas" path
fn assinaturas_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/assinaturas/", get(api::assinaturas::list))
        .route("/assinaturas/{id_assinatura}", get(api::assinaturas::get))
        .route("/assinaturas/create", post(api::assinaturas::create))
        .route("/assinaturas/update/{id_assinatura}", put(api::assinaturas::update))
        .route("/assinaturas/delete/{id_assinatura}", delete(api::assinaturas::delete))
        .with_state(app_state)
}
