//! Named store operations: open, enumerate, delete.

use super::connection::CacheStorage;
use super::entries::CacheStore;
use crate::Error;
use tokio_rusqlite::params;

impl CacheStorage {
    /// Open the store with the given name, creating it if absent.
    pub async fn open_cache(&self, name: &str) -> Result<CacheStore, Error> {
        let owned = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![owned, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(CacheStore::new(self.conn.clone(), name))
    }

    /// Names of every existing store, oldest first.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether a store with this name exists.
    pub async fn has_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and every entry in it.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE cache_name = ?1", params![name])?;
                let count = tx.execute("DELETE FROM caches WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Make every later `delete_cache(name)` fail inside its transaction.
    #[cfg(any(test, feature = "test-hooks"))]
    pub async fn block_deletion_of(&self, name: &str) -> Result<(), Error> {
        let sql = format!(
            "CREATE TRIGGER IF NOT EXISTS block_delete_{} BEFORE DELETE ON caches
             WHEN OLD.name = '{}'
             BEGIN SELECT RAISE(ABORT, 'deletion blocked'); END",
            hex::encode(name),
            name.replace('\'', "''"),
        );
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute_batch(&sql)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
