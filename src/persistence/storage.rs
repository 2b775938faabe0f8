//! Disk side of the store.
//!
//! Two JSON files back a database:
//! - the record file, `{ table: [record, ...] }`, rewritten on commit
//! - the schema file, `{ table: { lastID, columns } }`, rewritten whenever a
//!   schema changes
//!
//! Both are replaced whole: the new contents go to a sibling temp file which
//! is then renamed over the old one.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};

use super::schema::SerializedSchema;
use super::table::Table;
use crate::error::StoreResult;

pub(crate) type TableMap = IndexMap<String, Table>;
pub(crate) type SchemaFile = IndexMap<String, SerializedSchema>;

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

pub(crate) async fn bootstrap(path: &Path) -> StoreResult<TableMap> {
    //! Load the record file, creating it with an empty object if it does not
    //! exist yet.

    match tokio::fs::metadata(path).await {
        Err(error) if error.kind() == ErrorKind::NotFound => {
            info!("creating database file {}", path.display());
            write_file(path, b"{}").await?;
            Ok(TableMap::new())
        }
        Err(error) => Err(error.into()),
        Ok(metadata) if !metadata.is_file() => Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!("database path {} is not a file", path.display()),
        )
        .into()),
        Ok(_) => {
            let contents = tokio::fs::read(path).await?;
            if contents.iter().all(u8::is_ascii_whitespace) {
                debug!("database file {} is empty", path.display());
                return Ok(TableMap::new());
            }
            let tables: TableMap = serde_json::from_slice(&contents)?;
            info!(
                "loaded {} table(s) from {}",
                tables.len(),
                path.display()
            );
            Ok(tables)
        }
    }
}

pub(crate) async fn write_file(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let temp = temp_path(path);
    tokio::fs::write(&temp, contents).await?;
    tokio::fs::rename(&temp, path).await?;
    Ok(())
}

pub(crate) fn write_schema_file(path: &Path, schemas: &SchemaFile) -> StoreResult<()> {
    //! Replace the schema file with the given schemas.

    let contents = serde_json::to_vec_pretty(schemas)?;
    let temp = temp_path(path);
    std::fs::write(&temp, contents)?;
    std::fs::rename(&temp, path)?;
    debug!("wrote {} schema(s) to {}", schemas.len(), path.display());
    Ok(())
}

pub(crate) async fn read_schema_file(path: &Path) -> StoreResult<SchemaFile> {
    //! Read the schema file. A missing or blank file holds no schemas.

    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(SchemaFile::new()),
        Err(error) => return Err(error.into()),
    };

    if contents.iter().all(u8::is_ascii_whitespace) {
        return Ok(SchemaFile::new());
    }

    Ok(serde_json::from_slice(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn bootstrap_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.json");

        let tables = bootstrap(&path).await.unwrap();

        assert!(tables.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn bootstrap_accepts_blank_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.json");
        std::fs::write(&path, "").unwrap();

        assert!(bootstrap(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bootstrap_rejects_directory() {
        let dir = TempDir::new().unwrap();

        assert!(bootstrap(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn write_file_leaves_no_temp_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");

        write_file(&path, br#"{"a":[]}"#).await.unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn missing_schema_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();

        let schemas = read_schema_file(&dir.path().join("nope.json")).await.unwrap();
        assert!(schemas.is_empty());
    }
}
