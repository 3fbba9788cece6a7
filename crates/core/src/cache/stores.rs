//! `CacheStorage` implementation over the `stores` and `entries` tables.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::{CacheStorage, check_storable};
use crate::{Error, RequestDescriptor, ResponseType, StoredResponse};

/// Raw entry columns, decoded outside the rusqlite row closure.
struct EntryRow {
    status: u16,
    status_text: String,
    response_type: String,
    url: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn decode(self) -> Result<StoredResponse, Error> {
        Ok(StoredResponse {
            status: self.status,
            status_text: self.status_text,
            response_type: self.response_type.parse::<ResponseType>()?,
            url: self.url,
            headers: serde_json::from_str(&self.headers_json)?,
            body: self.body,
        })
    }
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| Error::StoreUnavailable(Error::from(e).to_string()))
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE store_name = ?1", params![name])?;
                let removed = tx.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(removed > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn match_request(&self, name: &str, request: &RequestDescriptor) -> Result<Option<StoredResponse>, Error> {
        let name = name.to_string();
        let key = request.cache_key();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<EntryRow>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, status_text, response_type, response_url, headers_json, body
                     FROM entries WHERE store_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![name, key], |row| {
                    Ok(EntryRow {
                        status: row.get(0)?,
                        status_text: row.get(1)?,
                        response_type: row.get(2)?,
                        url: row.get(3)?,
                        headers_json: row.get(4)?,
                        body: row.get(5)?,
                    })
                });

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(EntryRow::decode).transpose()
    }

    async fn put(&self, name: &str, request: &RequestDescriptor, response: &StoredResponse) -> Result<(), Error> {
        check_storable(request, response)?;

        let name = name.to_string();
        let key = request.cache_key();
        let method = request.method.clone();
        let url = request.url.clone();
        let headers_json = serde_json::to_string(&response.headers)?;
        let response = response.clone();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                tx.execute(
                    "INSERT INTO entries (
                        store_name, key_hash, method, url, status, status_text,
                        response_type, response_url, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    ON CONFLICT(store_name, key_hash) DO UPDATE SET
                        status = excluded.status,
                        status_text = excluded.status_text,
                        response_type = excluded.response_type,
                        response_url = excluded.response_url,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        name,
                        key,
                        method,
                        url,
                        response.status,
                        response.status_text,
                        response.response_type.as_str(),
                        response.url,
                        headers_json,
                        response.body,
                        now,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store_name = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
