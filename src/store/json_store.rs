use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::store::schema::{Document, DocumentError, export_file_name, parse_document};

/// Reads and writes study documents. Nothing is saved implicitly; every write
/// is an explicit export.
pub struct DocumentStore {
    base_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where an export of `subject` lands when the user accepts the default.
    pub fn default_export_path(&self, subject: &str) -> PathBuf {
        self.base_dir.join(export_file_name(subject))
    }

    /// Write `doc` to `path` atomically: a sibling `.tmp` file is written and
    /// synced, then renamed over the target.
    pub fn export_to(&self, path: &Path, doc: &Document) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp_path = path.with_extension("json.tmp");

        let json = doc.to_json()?;
        let written = (|| -> Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)?;
            Ok(())
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.context(format!("writing {}", path.display())));
        }

        tracing::info!(
            path = %path.display(),
            keywords = doc.keywords.len(),
            baskets = doc.baskets.len(),
            "document exported"
        );
        Ok(())
    }

    /// Read `path` to completion and parse it. The caller only sees a
    /// document when the whole file was valid.
    pub fn import_from(&self, path: &Path) -> Result<Document, DocumentError> {
        let bytes = fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = parse_document(&bytes)?;
        tracing::info!(
            path = %path.display(),
            subject = %doc.subject,
            keywords = doc.keywords.len(),
            baskets = doc.baskets.len(),
            "document imported"
        );
        Ok(doc)
    }

    /// `*.json` files in the document directory, most recently modified first.
    pub fn list_documents(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.base_dir) else {
            return Vec::new();
        };
        let mut found: Vec<(SystemTime, PathBuf)> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("json"))
            .map(|p| {
                let modified = fs::metadata(&p)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, p)
            })
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        found.into_iter().map(|(_, p)| p).collect()
    }
}
