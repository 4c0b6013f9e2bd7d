use super::{CatalogRecord, CatalogSource};
use crate::error::Error;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

/// Catalog backed by the storefront's SQLite database, opened read-only.
///
/// Expects a `products` table with `id`, `name`, `images` (a JSON array of
/// URLs, possibly NULL) and `is_active` columns.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens an existing database. A missing file, an unreadable file or a
    /// missing `products` table are all reported as [`Error::CatalogUnavailable`].
    pub fn open(path: &str) -> Result<Self, Error> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::CatalogUnavailable(format!("{}: {}", path, e)))?;
        debug!("Opened catalog database '{}' read-only", path);
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .map_err(|e| Error::CatalogUnavailable(e.to_string()))?;

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'products'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::CatalogUnavailable(e.to_string()))?;
        if tables == 0 {
            return Err(Error::CatalogUnavailable(
                "no 'products' table in catalog database".to_string(),
            ));
        }

        Ok(Self { conn })
    }
}

impl CatalogSource for SqliteCatalog {
    fn active_records(&self) -> Result<Vec<CatalogRecord>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT CAST(id AS TEXT), name, images FROM products \
             WHERE is_active = 1 ORDER BY name, id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records: Vec<CatalogRecord> = rows
            .into_iter()
            .map(|(id, name, images)| {
                let images = parse_images(&id, images.as_deref());
                CatalogRecord { id, name, images }
            })
            .collect();

        debug!("Loaded {} active catalog records", records.len());
        Ok(records)
    }
}

/// `images` column to URL list. NULL, blank and malformed values all read as
/// an empty list; malformed ones are logged so they can be fixed by hand.
fn parse_images(id: &str, raw: Option<&str>) -> Vec<String> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Vec::new(),
        Some(raw) => raw,
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(images) => images,
        Err(e) => {
            warn!("Product {} has unparseable images value {:?}: {}", id, raw, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_images() {
        assert!(parse_images("1", None).is_empty());
        assert!(parse_images("1", Some("  ")).is_empty());
        assert!(parse_images("1", Some("[]")).is_empty());
        assert!(parse_images("1", Some("not json")).is_empty());
        assert_eq!(
            parse_images("1", Some(r#"["/a.png","/b.png"]"#)),
            vec!["/a.png".to_string(), "/b.png".to_string()]
        );
    }

    #[test]
    fn test_missing_products_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            SqliteCatalog::from_connection(conn),
            Err(Error::CatalogUnavailable(_))
        ));
    }
}
