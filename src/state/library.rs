use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::{FurnitureTemplate, TemplateKind, TemplateScope};
use crate::error::{PlannerError, Result};

/// The Library manages the SQLite catalog database.
/// It stores calibrated scales keyed by image identity and the user's
/// custom furniture templates.
pub struct Library {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Library {
    /// Open (or create) the catalog in the user's data directory.
    /// See `config::data_dir` for the location.
    pub fn new() -> Result<Self> {
        let db_path = crate::config::db_path().ok_or_else(|| {
            PlannerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine user data directory",
            ))
        })?;
        Self::open(&db_path)
    }

    /// Open (or create) the catalog at an explicit path
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::info!(path = %db_path.display(), "📁 Catalog opened");

        let mut library = Library { conn, db_path: Some(db_path.to_path_buf()) };
        library.init_schema()?;
        Ok(library)
    }

    /// Throwaway catalog, used when the data directory is unusable and in tests
    pub fn open_in_memory() -> Result<Self> {
        let mut library = Library { conn: Connection::open_in_memory()?, db_path: None };
        library.init_schema()?;
        Ok(library)
    }

    /// Initialize the database schema.
    /// Creates all necessary tables if they don't exist.
    fn init_schema(&mut self) -> Result<()> {
        // One calibrated scale per image identity
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS scales (
                image_id        TEXT PRIMARY KEY,
                pixels_per_inch REAL NOT NULL,
                saved_at        INTEGER NOT NULL
            )",
            [],
        )?;

        // scope_image_id NULL means the template is offered for every image
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS custom_templates (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                width           REAL NOT NULL,
                height          REAL NOT NULL,
                color           TEXT NOT NULL,
                opacity         REAL NOT NULL,
                scope_image_id  TEXT,
                created_at      INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_custom_templates_scope
             ON custom_templates(scope_image_id)",
            [],
        )?;

        tracing::debug!("✅ Catalog schema initialized");
        Ok(())
    }

    /// Get the path to the database file (None for in-memory catalogs)
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Remember the scale calibrated for an image, replacing any older one
    pub fn save_scale(&self, image_id: &str, pixels_per_inch: f32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO scales (image_id, pixels_per_inch, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(image_id) DO UPDATE SET
                pixels_per_inch = excluded.pixels_per_inch,
                saved_at = excluded.saved_at",
            params![image_id, pixels_per_inch as f64, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Previously saved scale for an image, if any
    pub fn scale_for_image(&self, image_id: &str) -> Result<Option<f32>> {
        let scale: Option<f64> = self
            .conn
            .query_row(
                "SELECT pixels_per_inch FROM scales WHERE image_id = ?1",
                [image_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(scale.map(|s| s as f32))
    }

    /// Insert or update a custom template. Built-ins are never stored.
    pub fn save_custom_template(&self, template: &FurnitureTemplate) -> Result<()> {
        let scope_image_id = match &template.kind {
            TemplateKind::Default => return Ok(()),
            TemplateKind::Custom { scope: TemplateScope::Global } => None,
            TemplateKind::Custom { scope: TemplateScope::PerImage(id) } => Some(id.as_str()),
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO custom_templates
                (id, name, width, height, color, opacity, scope_image_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                template.id,
                template.name,
                template.width as f64,
                template.height as f64,
                template.color,
                template.opacity as f64,
                scope_image_id,
                Utc::now().timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    /// Custom templates offered for `image_id`: global ones plus those
    /// scoped to that image, oldest first
    pub fn custom_templates(&self, image_id: Option<&str>) -> Result<Vec<FurnitureTemplate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, width, height, color, opacity, scope_image_id
             FROM custom_templates
             WHERE scope_image_id IS NULL OR scope_image_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;

        let template_iter = stmt.query_map([image_id], |row| {
            let scope: Option<String> = row.get(6)?;
            Ok(FurnitureTemplate {
                id: row.get(0)?,
                name: row.get(1)?,
                width: row.get::<_, f64>(2)? as f32,
                height: row.get::<_, f64>(3)? as f32,
                color: row.get(4)?,
                opacity: row.get::<_, f64>(5)? as f32,
                kind: TemplateKind::Custom {
                    scope: scope.map_or(TemplateScope::Global, TemplateScope::PerImage),
                },
            })
        })?;

        let mut templates = Vec::new();
        for template in template_iter {
            templates.push(template?);
        }
        Ok(templates)
    }

    /// Remove a custom template; returns whether one was deleted
    pub fn delete_custom_template(&self, id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM custom_templates WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
