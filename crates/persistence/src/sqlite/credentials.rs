//! Credential slot operations

use crate::encryption::EncryptedToken;
use chrono::{DateTime, Utc};
use numberplay_core::{Error, Result};
use sqlx::SqlitePool;

/// Database row for a stored credential
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    token_encrypted: Vec<u8>,
    iv: Vec<u8>,
    updated_at: DateTime<Utc>,
}

/// A stored, still-encrypted credential
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub encrypted: EncryptedToken,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CredentialRow> for StoredCredential {
    type Error = Error;

    fn try_from(row: CredentialRow) -> Result<Self> {
        let iv: [u8; 12] = row
            .iv
            .as_slice()
            .try_into()
            .map_err(|_| Error::DatabaseError("Invalid IV length".to_string()))?;
        Ok(StoredCredential {
            encrypted: EncryptedToken {
                ciphertext: row.token_encrypted,
                iv,
            },
            updated_at: row.updated_at,
        })
    }
}

/// Insert or replace the credential stored under `key`
pub async fn save_credential(
    pool: &SqlitePool,
    key: &str,
    encrypted: &EncryptedToken,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO credentials (key, token_encrypted, iv, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
            token_encrypted = excluded.token_encrypted,
            iv = excluded.iv,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(&encrypted.ciphertext)
    .bind(&encrypted.iv[..])
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Load the credential stored under `key`
pub async fn get_credential(pool: &SqlitePool, key: &str) -> Result<Option<StoredCredential>> {
    let row: Option<CredentialRow> = sqlx::query_as(
        r#"
        SELECT token_encrypted, iv, updated_at
        FROM credentials
        WHERE key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    row.map(StoredCredential::try_from).transpose()
}

/// Remove the credential stored under `key`. Missing keys are fine.
pub async fn delete_credential(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM credentials WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}
