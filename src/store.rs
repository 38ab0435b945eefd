use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::mapper::PageDocument;
use crate::util::now_utc_string;

const STORE_SCHEMA_VERSION: &str = "0.1.0";

/// Sqlite-backed document store for generated child pages. One row per
/// `(parent_slug, slug, locale, site_code)`; writes are last-write-wins
/// upserts replacing the full document.
pub struct PageStore {
    connection: Connection,
}

impl PageStore {
    pub fn open(path: &Path) -> Result<Self> {
        let connection = Connection::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().context("failed to open in-memory store")?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    /// Insert or fully replace the document under its four-column key.
    pub fn upsert(&self, document: &PageDocument) -> Result<()> {
        let body = serde_json::to_string(document)
            .with_context(|| format!("failed to serialize document for {}", document.slug))?;

        self.connection
            .execute(
                "
                INSERT INTO pages(
                    parent_slug, slug, locale, site_code,
                    url_path, from_unit_code, to_unit_code, document, updated_at
                )
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(parent_slug, slug, locale, site_code) DO UPDATE SET
                  url_path=excluded.url_path,
                  from_unit_code=excluded.from_unit_code,
                  to_unit_code=excluded.to_unit_code,
                  document=excluded.document,
                  updated_at=excluded.updated_at
                ",
                params![
                    document.parent_slug,
                    document.slug,
                    document.locale,
                    document.site_code,
                    document.url_path,
                    document.from_unit_code,
                    document.to_unit_code,
                    body,
                    now_utc_string(),
                ],
            )
            .with_context(|| format!("failed to upsert page {}", document.slug))?;

        Ok(())
    }

    pub fn count_pages(&self) -> Result<i64> {
        let count = self
            .connection
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_by_parent(&self, parent_slug: &str) -> Result<i64> {
        let count = self.connection.query_row(
            "SELECT COUNT(*) FROM pages WHERE parent_slug = ?1",
            [parent_slug],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    #[cfg(test)]
    fn document_for(&self, parent_slug: &str, slug: &str) -> Result<String> {
        let body = self.connection.query_row(
            "SELECT document FROM pages WHERE parent_slug = ?1 AND slug = ?2",
            [parent_slug, slug],
            |row| row.get(0),
        )?;
        Ok(body)
    }
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pages (
          parent_slug TEXT NOT NULL,
          slug TEXT NOT NULL,
          locale TEXT NOT NULL,
          site_code TEXT NOT NULL,
          url_path TEXT NOT NULL,
          from_unit_code TEXT NOT NULL,
          to_unit_code TEXT NOT NULL,
          document TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          PRIMARY KEY (parent_slug, slug, locale, site_code)
        );

        CREATE INDEX IF NOT EXISTS idx_pages_parent ON pages(parent_slug);
        ",
    )?;

    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('store_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [STORE_SCHEMA_VERSION],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{DocumentIdentity, build_page_document};
    use crate::validate::tests::content_within_range;
    use chrono::Utc;

    fn document(slug: &str, title: &str) -> PageDocument {
        let mut content = content_within_range();
        content.seo_meta_title = title.to_string();
        let identity = DocumentIdentity::new(
            "area-convertor",
            slug,
            "en-IN",
            "sqy-india-web",
            "BIGHA_ASSAM",
            "ACRE",
            "Bigha - Assam",
            "Acre",
        );
        build_page_document(&content, &identity, Utc::now())
    }

    #[test]
    fn upsert_on_same_key_replaces_instead_of_duplicating() {
        let store = PageStore::open_in_memory().expect("store");

        store
            .upsert(&document("bigha-assam-to-acre", "first title"))
            .expect("first upsert");
        store
            .upsert(&document("bigha-assam-to-acre", "second title"))
            .expect("second upsert");

        assert_eq!(store.count_pages().expect("count"), 1);
        let body = store
            .document_for("area-convertor", "bigha-assam-to-acre")
            .expect("document");
        assert!(body.contains("second title"));
        assert!(!body.contains("first title"));
    }

    #[test]
    fn distinct_slugs_are_separate_rows() {
        let store = PageStore::open_in_memory().expect("store");

        store
            .upsert(&document("bigha-assam-to-acre", "a"))
            .expect("upsert");
        store
            .upsert(&document("acre-to-hectare", "b"))
            .expect("upsert");

        assert_eq!(store.count_pages().expect("count"), 2);
        assert_eq!(
            store.count_by_parent("area-convertor").expect("count"),
            2
        );
        assert_eq!(store.count_by_parent("other").expect("count"), 0);
    }
}
