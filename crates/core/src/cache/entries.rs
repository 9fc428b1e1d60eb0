//! Entry operations on a single named store.
//!
//! Every write replaces the whole entry for its key. There is no
//! compare-and-swap: concurrent writers of the same key race and the last
//! one wins.

use super::key::RequestKey;
use super::response::StoredResponse;
use crate::Error;
use tokio_rusqlite::rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};

const ENSURE_CACHE: &str = "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)";

const UPSERT_ENTRY: &str = "INSERT INTO entries (
        cache_name, key_hash, method, url, status, status_text,
        headers_json, body, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    ON CONFLICT(cache_name, key_hash) DO UPDATE SET
        method = excluded.method,
        url = excluded.url,
        status = excluded.status,
        status_text = excluded.status_text,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

/// Handle to one named cache store.
#[derive(Clone, Debug)]
pub struct CacheStore {
    conn: Connection,
    name: String,
}

/// Listing row for an entry, without its body.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    pub key: RequestKey,
    pub status: u16,
    pub stored_at: String,
}

impl CacheStore {
    pub(crate) fn new(conn: Connection, name: &str) -> Self {
        Self { conn, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the response stored for a request.
    ///
    /// Returns None on a miss.
    pub async fn match_request(&self, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let name = self.name.clone();
        let hash = key.hash();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let row = conn
                    .query_row(
                        "SELECT status, status_text, headers_json, body
                         FROM entries WHERE cache_name = ?1 AND key_hash = ?2",
                        params![name, hash],
                        |row| {
                            Ok((
                                row.get::<_, i64>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                                row.get::<_, Vec<u8>>(3)?,
                            ))
                        },
                    )
                    .optional()?;

                let Some((status, status_text, headers_json, body)) = row else {
                    return Ok(None);
                };

                let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status}")))?;
                let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;

                Ok(Some(StoredResponse::new(status, status_text).with_headers(headers).with_body(body)))
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response under a request key, replacing any previous entry.
    ///
    /// Recreates the store row if the store was deleted since it was opened.
    pub async fn put(&self, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        let name = self.name.clone();
        let hash = key.hash();
        let method = key.method().to_string();
        let url = key.url().to_string();
        let status = i64::from(response.status());
        let status_text = response.status_text().to_string();
        let headers_json = serde_json::to_string(response.headers())?;
        let body = response.body().to_vec();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(ENSURE_CACHE, params![&name, &now])?;
                tx.execute(
                    UPSERT_ENTRY,
                    params![&name, &hash, &method, &url, status, &status_text, &headers_json, &body, &now],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store several responses in one transaction: either all are written or
    /// none are.
    pub async fn put_all(&self, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
        let name = self.name.clone();
        let now = chrono::Utc::now().to_rfc3339();
        let rows = entries
            .iter()
            .map(|(key, response)| -> Result<_, Error> {
                Ok((
                    key.hash(),
                    key.method().to_string(),
                    key.url().to_string(),
                    i64::from(response.status()),
                    response.status_text().to_string(),
                    serde_json::to_string(response.headers())?,
                    response.body().to_vec(),
                ))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(ENSURE_CACHE, params![&name, &now])?;
                for (hash, method, url, status, status_text, headers_json, body) in &rows {
                    tx.execute(
                        UPSERT_ENTRY,
                        params![&name, hash, method, url, status, status_text, headers_json, body, &now],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for a request key.
    ///
    /// Returns false if there was nothing to remove.
    pub async fn delete(&self, key: &RequestKey) -> Result<bool, Error> {
        let name = self.name.clone();
        let hash = key.hash();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE cache_name = ?1 AND key_hash = ?2",
                    params![name, hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Keys of every entry, in insertion order.
    pub async fn keys(&self) -> Result<Vec<RequestKey>, Error> {
        Ok(self.entries().await?.into_iter().map(|meta| meta.key).collect())
    }

    /// Listing of every entry, in insertion order.
    pub async fn entries(&self) -> Result<Vec<EntryMeta>, Error> {
        let name = self.name.clone();
        self.conn
            .call(move |conn| -> Result<Vec<EntryMeta>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, stored_at FROM entries
                     WHERE cache_name = ?1 ORDER BY rowid",
                )?;
                let rows = stmt
                    .query_map(params![name], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(method, url, status, stored_at)| -> Result<EntryMeta, Error> {
                        let key = RequestKey::from_row(method, &url)?;
                        let status =
                            u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status}")))?;
                        Ok(EntryMeta { key, status, stored_at })
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in the store.
    pub async fn len(&self) -> Result<usize, Error> {
        let name = self.name.clone();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE cache_name = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(count as usize)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}
