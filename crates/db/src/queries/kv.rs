use sqlx::PgExecutor;

pub async fn create_table<'e, E: PgExecutor<'e>>(executor: E) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feed_kv (
            key TEXT PRIMARY KEY,
            value BYTEA NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E: PgExecutor<'e>>(
    executor: E,
    key: &str,
) -> Result<Option<Vec<u8>>, sqlx::Error> {
    sqlx::query_scalar::<_, Vec<u8>>(
        r#"
        SELECT value
        FROM feed_kv
        WHERE key = $1
        "#,
    )
    .bind(key)
    .fetch_optional(executor)
    .await
}

/// Like [`get`], but locks the row for the rest of the transaction.
pub async fn get_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    key: &str,
) -> Result<Option<Vec<u8>>, sqlx::Error> {
    sqlx::query_scalar::<_, Vec<u8>>(
        r#"
        SELECT value
        FROM feed_kv
        WHERE key = $1
        FOR UPDATE
        "#,
    )
    .bind(key)
    .fetch_optional(executor)
    .await
}

pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    key: &str,
    value: &[u8],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO feed_kv (key, value)
        VALUES ($1, $2)
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update<'e, E: PgExecutor<'e>>(
    executor: E,
    key: &str,
    value: &[u8],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE feed_kv
        SET value = $2, updated_at = now()
        WHERE key = $1
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM feed_kv
        WHERE key = $1
        "#,
    )
    .bind(key)
    .execute(executor)
    .await?;
    Ok(())
}
