use super::schema::{AdminAccount, Category, ContentItem, ContentKind, ListFilter, SortOrder};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

/// SQLite-backed store for content items and admin accounts. The server is
/// the only writer; clients never touch this directly.
#[derive(Clone)]
pub struct ContentRepository {
    conn: Arc<Mutex<Connection>>,
}

/// Timestamps are stored as fixed-precision RFC 3339 UTC so that string
/// comparison orders the same way as time comparison.
fn encode_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl ContentRepository {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             PRAGMA temp_store   = MEMORY;",
        )?;

        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS content_items (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                description     TEXT,
                blog_content    TEXT,
                video_path      TEXT,
                thumbnail_path  TEXT,
                kind            TEXT NOT NULL,
                category        TEXT NOT NULL,
                uploaded_by     TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_content_created ON content_items(created_at);
            CREATE INDEX IF NOT EXISTS idx_content_category ON content_items(category);

            CREATE TABLE IF NOT EXISTS admins (
                id              TEXT PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL
            );",
        )
        .context("failed to init catalog schema")?;
        Ok(())
    }

    /// Insert a new content item.
    pub fn insert(&self, item: &ContentItem) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO content_items (id, title, description, blog_content, video_path,
             thumbnail_path, kind, category, uploaded_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                item.id,
                item.title,
                item.description,
                item.blog_content,
                item.video_path,
                item.thumbnail_path,
                item.kind.as_str(),
                item.category.as_str(),
                item.uploaded_by,
                encode_time(item.created_at),
            ],
        )
        .context("failed to insert content item")?;
        Ok(())
    }

    /// Fetch one item by id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<ContentItem>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, blog_content, video_path, thumbnail_path,
             kind, category, uploaded_by, created_at
             FROM content_items WHERE id = ?1",
        )?;
        match stmt.query_row(params![id], Self::row_to_item) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List items matching the filter, ordered by createdAt per `sort`.
    pub fn list(&self, filter: &ListFilter, sort: SortOrder) -> Result<Vec<ContentItem>> {
        let conn = self.conn.lock();

        let mut clauses: Vec<&str> = Vec::new();
        let mut bind: Vec<String> = Vec::new();

        if let Some(category) = &filter.category {
            clauses.push("category = ?");
            bind.push(category.clone());
        }
        if let Some(day) = filter.day {
            let (start, end) = day_bounds(day);
            clauses.push("created_at >= ?");
            bind.push(start);
            clauses.push("created_at < ?");
            bind.push(end);
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let order = match sort {
            SortOrder::Latest => "DESC",
            SortOrder::Oldest => "ASC",
        };

        let sql = format!(
            "SELECT id, title, description, blog_content, video_path, thumbnail_path,
             kind, category, uploaded_by, created_at
             FROM content_items {where_sql} ORDER BY created_at {order}",
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(&bind), Self::row_to_item)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list content items")
    }

    /// Overwrite a full item row. Returns false when the id is unknown.
    pub fn update(&self, item: &ContentItem) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE content_items SET title = ?2, description = ?3, blog_content = ?4,
                 video_path = ?5, thumbnail_path = ?6, kind = ?7, category = ?8
                 WHERE id = ?1",
                params![
                    item.id,
                    item.title,
                    item.description,
                    item.blog_content,
                    item.video_path,
                    item.thumbnail_path,
                    item.kind.as_str(),
                    item.category.as_str(),
                ],
            )
            .context("failed to update content item")?;
        Ok(changed > 0)
    }

    /// Delete an item row. Returns false when the id is unknown.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn
            .execute("DELETE FROM content_items WHERE id = ?1", params![id])
            .context("failed to delete content item")?;
        Ok(changed > 0)
    }

    pub fn insert_admin(&self, admin: &AdminAccount) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO admins (id, username, password_hash) VALUES (?1, ?2, ?3)",
            params![admin.id, admin.username, admin.password_hash],
        )
        .with_context(|| format!("failed to create admin {:?}", admin.username))?;
        Ok(())
    }

    pub fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT id, username, password_hash FROM admins WHERE username = ?1")?;
        match stmt.query_row(params![username], |row| {
            Ok(AdminAccount {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
            })
        }) {
            Ok(admin) => Ok(Some(admin)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn admin_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: usize = conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<ContentItem> {
        let kind: String = row.get(6)?;
        let category: String = row.get(7)?;
        let created_at: String = row.get(9)?;
        Ok(ContentItem {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            blog_content: row.get(3)?,
            video_path: row.get(4)?,
            thumbnail_path: row.get(5)?,
            kind: kind.parse::<ContentKind>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            category: category.parse::<Category>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            uploaded_by: row.get(8)?,
            created_at: decode_time(9, &created_at)?,
        })
    }
}

/// Inclusive start / exclusive end of a UTC calendar day, in storage encoding.
fn day_bounds(day: NaiveDate) -> (String, String) {
    let start = day.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
    let end = start + Duration::days(1);
    (encode_time(start), encode_time(end))
}
