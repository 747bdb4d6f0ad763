//! Gateway for the `planos` table.

use sqlx::PgPool;
use tracing::Instrument;

use super::{Error, Result, Write};
use crate::model::{NewPlano, Plano, PlanoPatch};

pub async fn list(db: &PgPool) -> Result<Vec<Plano>> {
    let planos = sqlx::query_as::<_, Plano>(
        r#"SELECT id_plano, nome, preco
        FROM planos
        ORDER BY id_plano"#,
    )
    .fetch_all(db)
    .await?;

    Ok(planos)
}

pub async fn get_by_id(db: &PgPool, id_plano: i32) -> Result<Option<Plano>> {
    let plano = sqlx::query_as::<_, Plano>(
        r#"SELECT id_plano, nome, preco
        FROM planos
        WHERE id_plano = $1"#,
    )
    .bind(id_plano)
    .fetch_optional(db)
    .await?;

    Ok(plano)
}

/// Plans are identified by their name for duplicate detection.
pub async fn get_by_nome(db: &PgPool, nome: &str) -> Result<Option<Plano>> {
    let plano = sqlx::query_as::<_, Plano>(
        r#"SELECT id_plano, nome, preco
        FROM planos
        WHERE nome = $1"#,
    )
    .bind(nome)
    .fetch_optional(db)
    .await?;

    Ok(plano)
}

pub async fn create(db: &PgPool, plano: NewPlano) -> Result<Plano> {
    let q_span = tracing::info_span!("Inserting a new plan into the database");
    let plano = sqlx::query_as::<_, Plano>(
        r#"INSERT INTO planos (nome, preco)
        VALUES ($1, $2)
        RETURNING id_plano, nome, preco"#,
    )
    .bind(plano.nome)
    .bind(plano.preco)
    .fetch_one(db)
    .instrument(q_span)
    .await
    .map_err(|er| Error::from_write(er, Write::Insert))?;

    Ok(plano)
}

pub async fn update(db: &PgPool, id_plano: i32, patch: PlanoPatch) -> Result<Option<Plano>> {
    let Some(current) = get_by_id(db, id_plano).await? else {
        return Ok(None);
    };
    let next = patch.apply(current);

    let plano = sqlx::query_as::<_, Plano>(
        r#"UPDATE planos
        SET nome = $2, preco = $3
        WHERE id_plano = $1
        RETURNING id_plano, nome, preco"#,
    )
    .bind(next.id_plano)
    .bind(next.nome)
    .bind(next.preco)
    .fetch_optional(db)
    .await
    .map_err(|er| Error::from_write(er, Write::Update))?;

    Ok(plano)
}

pub async fn delete(db: &PgPool, id_plano: i32) -> Result<Option<Plano>> {
    let plano = sqlx::query_as::<_, Plano>(
        r#"DELETE FROM planos
        WHERE id_plano = $1
        RETURNING id_plano, nome, preco"#,
    )
    .bind(id_plano)
    .fetch_optional(db)
    .await
    .map_err(|er| Error::from_write(er, Write::Delete))?;

    Ok(plano)
}
