//! Integration tests against a spawned server and a freshly created database.
//! They need a reachable Postgres, configured through `config/local.toml` or `APP_DB_CONFIG__*`.

mod assinaturas;
mod health_check;
mod helpers;
mod membros;
mod planos;
