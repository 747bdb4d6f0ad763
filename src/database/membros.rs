//! Gateway for the `membros` table.

use sqlx::PgPool;
use tracing::Instrument;

use super::{Error, Result, Write};
use crate::model::{Membro, MembroPatch, NewMembro};

pub async fn list(db: &PgPool) -> Result<Vec<Membro>> {
    let membros = sqlx::query_as::<_, Membro>(
        r#"SELECT id_membro, nome, sobrenome, celular
        FROM membros
        ORDER BY id_membro"#,
    )
    .fetch_all(db)
    .await?;

    Ok(membros)
}

pub async fn get_by_id(db: &PgPool, id_membro: i32) -> Result<Option<Membro>> {
    let membro = sqlx::query_as::<_, Membro>(
        r#"SELECT id_membro, nome, sobrenome, celular
        FROM membros
        WHERE id_membro = $1"#,
    )
    .bind(id_membro)
    .fetch_optional(db)
    .await?;

    Ok(membro)
}

/// Looks a member up by the phone number, the natural key of the table.
pub async fn get_by_celular(db: &PgPool, celular: i64) -> Result<Option<Membro>> {
    let membro = sqlx::query_as::<_, Membro>(
        r#"SELECT id_membro, nome, sobrenome, celular
        FROM membros
        WHERE celular = $1"#,
    )
    .bind(celular)
    .fetch_optional(db)
    .await?;

    Ok(membro)
}

pub async fn create(db: &PgPool, membro: NewMembro) -> Result<Membro> {
    let q_span = tracing::info_span!("Inserting a new member into the database");
    let membro = sqlx::query_as::<_, Membro>(
        r#"INSERT INTO membros (nome, sobrenome, celular)
        VALUES ($1, $2, $3)
        RETURNING id_membro, nome, sobrenome, celular"#,
    )
    .bind(membro.nome)
    .bind(membro.sobrenome)
    .bind(membro.celular)
    .fetch_one(db)
    .instrument(q_span)
    .await
    .map_err(|er| Error::from_write(er, Write::Insert))?;

    Ok(membro)
}

/// Applies the patch on top of the stored row. Returns `None` if there is no member with this id.
pub async fn update(db: &PgPool, id_membro: i32, patch: MembroPatch) -> Result<Option<Membro>> {
    let Some(current) = get_by_id(db, id_membro).await? else {
        return Ok(None);
    };
    let next = patch.apply(current);

    // The row can disappear between the two statements, in that case nothing gets returned.
    let membro = sqlx::query_as::<_, Membro>(
        r#"UPDATE membros
        SET nome = $2, sobrenome = $3, celular = $4
        WHERE id_membro = $1
        RETURNING id_membro, nome, sobrenome, celular"#,
    )
    .bind(next.id_membro)
    .bind(next.nome)
    .bind(next.sobrenome)
    .bind(next.celular)
    .fetch_optional(db)
    .await
    .map_err(|er| Error::from_write(er, Write::Update))?;

    Ok(membro)
}

/// Deletes the member and returns the row as it was before the deletion.
pub async fn delete(db: &PgPool, id_membro: i32) -> Result<Option<Membro>> {
    let membro = sqlx::query_as::<_, Membro>(
        r#"DELETE FROM membros
        WHERE id_membro = $1
        RETURNING id_membro, nome, sobrenome, celular"#,
    )
    .bind(id_membro)
    .fetch_optional(db)
    .await
    .map_err(|er| Error::from_write(er, Write::Delete))?;

    Ok(membro)
}
