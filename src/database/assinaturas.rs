//! Gateway for the `assinaturas` table, the join between `membros` and `planos`.

use sqlx::PgPool;
use tracing::Instrument;

use super::{Error, Result, Write};
use crate::model::{Assinatura, AssinaturaPatch, NewAssinatura};

pub async fn list(db: &PgPool) -> Result<Vec<Assinatura>> {
    let assinaturas = sqlx::query_as::<_, Assinatura>(
        r#"SELECT id_assinatura, ativo, data_ativacao, id_membro, id_plano
        FROM assinaturas
        ORDER BY id_assinatura"#,
    )
    .fetch_all(db)
    .await?;

    Ok(assinaturas)
}

pub async fn get_by_id(db: &PgPool, id_assinatura: i32) -> Result<Option<Assinatura>> {
    let assinatura = sqlx::query_as::<_, Assinatura>(
        r#"SELECT id_assinatura, ativo, data_ativacao, id_membro, id_plano
        FROM assinaturas
        WHERE id_assinatura = $1"#,
    )
    .bind(id_assinatura)
    .fetch_optional(db)
    .await?;

    Ok(assinatura)
}

/// Fails with `Error::MissingReference` if the member or the plan doesn't exist.
pub async fn create(db: &PgPool, assinatura: NewAssinatura) -> Result<Assinatura> {
    let q_span = tracing::info_span!("Inserting a new subscription into the database");
    let assinatura = sqlx::query_as::<_, Assinatura>(
        r#"INSERT INTO assinaturas (ativo, data_ativacao, id_membro, id_plano)
        VALUES ($1, $2, $3, $4)
        RETURNING id_assinatura, ativo, data_ativacao, id_membro, id_plano"#,
    )
    .bind(assinatura.ativo)
    .bind(assinatura.data_ativacao)
    .bind(assinatura.id_membro)
    .bind(assinatura.id_plano)
    .fetch_one(db)
    .instrument(q_span)
    .await
    .map_err(|er| Error::from_write(er, Write::Insert))?;

    Ok(assinatura)
}

pub async fn update(
    db: &PgPool,
    id_assinatura: i32,
    patch: AssinaturaPatch,
) -> Result<Option<Assinatura>> {
    let Some(current) = get_by_id(db, id_assinatura).await? else {
        return Ok(None);
    };
    let next = patch.apply(current);

    let assinatura = sqlx::query_as::<_, Assinatura>(
        r#"UPDATE assinaturas
        SET ativo = $2, data_ativacao = $3, id_membro = $4, id_plano = $5
        WHERE id_assinatura = $1
        RETURNING id_assinatura, ativo, data_ativacao, id_membro, id_plano"#,
    )
    .bind(next.id_assinatura)
    .bind(next.ativo)
    .bind(next.data_ativacao)
    .bind(next.id_membro)
    .bind(next.id_plano)
    .fetch_optional(db)
    .await
    .map_err(|er| Error::from_write(er, Write::Update))?;

    Ok(assinatura)
}

pub async fn delete(db: &PgPool, id_assinatura: i32) -> Result<Option<Assinatura>> {
    let assinatura = sqlx::query_as::<_, Assinatura>(
        r#"DELETE FROM assinaturas
        WHERE id_assinatura = $1
        RETURNING id_assinatura, ativo, data_ativacao, id_membro, id_plano"#,
    )
    .bind(id_assinatura)
    .fetch_optional(db)
    .await
    .map_err(|er| Error::from_write(er, Write::Delete))?;

    Ok(assinatura)
}
