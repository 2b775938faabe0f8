use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::Mutex;

use super::row::Record;
use super::schema::Schema;
use super::storage::{self, SchemaFile, TableMap};
use super::table::Table;
use super::validation::{self, Resolution};
use crate::config::StoreOptions;
use crate::error::{StoreError, StoreResult};

/// What a [`Database::commit`] ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The record file was replaced with `bytes` bytes of JSON.
    Written { bytes: usize },
    /// Nothing was written because the store holds no tables.
    Skipped,
    /// Nothing was written because a later commit already reached the file.
    Superseded,
}

/// The collective of all tables and their schemas.
///
/// A [`Database`] is the smart half of the store: every insert and update is
/// resolved through the owning [`Schema`] before it reaches a [`Table`], and
/// every schema change is written to the schema file straight away. Records
/// only reach disk on [`Database::commit`].
///
/// A database only exists once [`Database::open`] has resolved, so every
/// operation is safe to call on any value of this type.
///
/// Mutating operations take `&mut self`. Commit futures carry their own
/// snapshot, so the store can keep changing while a write is in flight; the
/// writes themselves run one at a time.
pub struct Database {
    options: StoreOptions,
    record_path: PathBuf,
    tables: TableMap,
    schemas: IndexMap<String, Schema>,
    /// Generation of the last snapshot written to the record file.
    writer: Arc<Mutex<u64>>,
    generation: AtomicU64,
}

impl Database {
    pub async fn open(options: StoreOptions) -> StoreResult<Database> {
        //! Open the store described by `options`.
        //!
        //! The record file is created holding `{}` when it does not exist and
        //! loaded otherwise. Schemas are not read back; see
        //! [`Database::load_schemas`] and [`Database::attach_schema`].

        let record_path = options.record_path();
        let tables = storage::bootstrap(&record_path).await?;
        info!("database {} is ready", record_path.display());

        Ok(Database {
            options,
            record_path,
            tables,
            schemas: IndexMap::new(),
            writer: Arc::new(Mutex::new(0)),
            generation: AtomicU64::new(0),
        })
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn record_path(&self) -> &PathBuf {
        &self.record_path
    }

    pub fn create_table(&mut self, schema: Schema) -> StoreResult<()> {
        //! Register `schema` and start an empty table for it.
        //!
        //! Fails with [`StoreError::TableExists`] when records already exist
        //! under the name (also the case for tables loaded from disk), and with
        //! [`StoreError::SchemaExists`] when a schema is already registered.

        let name = schema.table_name().to_string();

        if self.tables.contains_key(&name) {
            return Err(StoreError::TableExists(name));
        }
        if self.schemas.contains_key(&name) {
            return Err(StoreError::SchemaExists(name));
        }

        self.schemas.insert(name.clone(), schema);
        if let Err(error) = self.save_schemas() {
            self.schemas.shift_remove(&name);
            return Err(error);
        }
        self.tables.insert(name.clone(), Table::new());

        debug!("created table {}", name);
        Ok(())
    }

    pub fn attach_schema(&mut self, mut schema: Schema) -> StoreResult<()> {
        //! Register `schema` for a table that was loaded from the record file.
        //!
        //! The id counter is raised to the largest value already held in any
        //! auto-increment column, so loaded rows never collide with new ones.

        let name = schema.table_name().to_string();

        let table = self
            .tables
            .get(&name)
            .ok_or_else(|| StoreError::TableNotFound(name.clone()))?;
        if self.schemas.contains_key(&name) {
            return Err(StoreError::SchemaExists(name));
        }

        seed_last_id(&mut schema, table);

        self.schemas.insert(name.clone(), schema);
        if let Err(error) = self.save_schemas() {
            self.schemas.shift_remove(&name);
            return Err(error);
        }

        debug!("attached schema to table {}", name);
        Ok(())
    }

    pub fn fetch<F>(&self, table_name: &str, filter: F) -> StoreResult<Vec<Record>>
    where
        F: Fn(&Record) -> bool,
    {
        //! Copies of the records matching `filter`, in table order.

        Ok(self.get_table(table_name)?.filter(filter))
    }

    pub fn fetch_all(&self, table_name: &str) -> StoreResult<Vec<Record>> {
        Ok(self.get_table(table_name)?.scan())
    }

    pub fn insert(&mut self, table_name: &str, data: Value) -> StoreResult<Record> {
        //! Validate `data` against the table's schema and append it.
        //!
        //! Returns the stored record, with auto-increment columns filled in.
        //! The schema is looked up before the table, so an unknown name fails
        //! with [`StoreError::InsertWithoutSchema`].

        let schema = self
            .schemas
            .get(table_name)
            .ok_or_else(|| StoreError::InsertWithoutSchema(table_name.to_string()))?;
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))?;

        let candidate = validation::as_candidate(&data)?;
        let record = validation::validate(
            schema,
            candidate,
            table.rows(),
            &Resolution::Insert {
                next_id: schema.last_id + 1,
            },
        )?;

        self.bump_last_id(table_name, 1);
        if let Err(error) = self.save_schemas() {
            self.bump_last_id(table_name, -1);
            return Err(error);
        }
        if let Some(table) = self.tables.get_mut(table_name) {
            table.push(record.clone());
        }

        debug!("inserted into {}: {}", table_name, record);
        Ok(record)
    }

    pub fn update<F>(&mut self, table_name: &str, data: Value, filter: F) -> StoreResult<usize>
    where
        F: Fn(&Record) -> bool,
    {
        //! Overwrite the fields in `data` on every record matching `filter`.
        //!
        //! Each merged record is validated again against the schema. If any
        //! of them fails, the error is returned and no record is changed.
        //!
        //! Returns the number of records replaced.

        let table = self.get_table(table_name)?;
        let schema = self
            .schemas
            .get(table_name)
            .ok_or_else(|| StoreError::InsertWithoutSchema(table_name.to_string()))?;
        let changes = validation::as_candidate(&data)?;

        let positions = table.positions(filter);
        if positions.is_empty() {
            return Ok(0);
        }

        // validate against a working copy so later rows see earlier replacements
        let mut rows = table.scan();
        for &position in positions.iter() {
            let current = rows[position].clone();
            let mut merged = current.to_value();
            if let Some(fields) = merged.as_object_mut() {
                for (column, value) in changes.iter() {
                    fields.insert(column.clone(), value.clone());
                }
            }

            let record = validation::validate(
                schema,
                validation::as_candidate(&merged)?,
                &rows,
                &Resolution::Update {
                    current: &current,
                    position,
                },
            )?;
            rows[position] = record;
        }

        if let Some(table) = self.tables.get_mut(table_name) {
            table.replace_rows(rows);
        }

        debug!("updated {} record(s) in {}", positions.len(), table_name);
        Ok(positions.len())
    }

    pub fn update_all(&mut self, table_name: &str, data: Value) -> StoreResult<usize> {
        self.update(table_name, data, |_| true)
    }

    pub fn delete<F>(&mut self, table_name: &str, filter: F) -> StoreResult<usize>
    where
        F: Fn(&Record) -> bool,
    {
        //! Remove every record matching `filter`.
        //!
        //! Returns the number of records removed.

        let deleted = self.get_table_mut(table_name)?.delete_with_filter(filter);
        debug!("deleted {} record(s) from {}", deleted, table_name);
        Ok(deleted)
    }

    pub fn delete_all(&mut self, table_name: &str) -> StoreResult<usize> {
        self.delete(table_name, |_| true)
    }

    pub fn truncate(&mut self, table_name: &str) -> StoreResult<()> {
        //! Remove all records of a table, keeping its schema.

        let deleted = self.get_table_mut(table_name)?.delete_all();
        debug!("truncated {} ({} record(s))", table_name, deleted);
        Ok(())
    }

    pub fn drop(&mut self, table_name: &str) -> StoreResult<bool> {
        //! Remove a table together with its schema.
        //!
        //! Returns whether the records were removed.

        if !self.tables.contains_key(table_name) {
            return Err(StoreError::TableNotFound(table_name.to_string()));
        }

        let removed = self.schemas.shift_remove_full(table_name);
        if let Err(error) = self.save_schemas() {
            if let Some((index, name, schema)) = removed {
                self.schemas.shift_insert(index, name, schema);
            }
            return Err(error);
        }
        let dropped = self.tables.shift_remove(table_name).is_some();

        debug!("dropped table {}", table_name);
        Ok(dropped)
    }

    pub fn commit(&self) -> impl Future<Output = StoreResult<CommitOutcome>> + Send + use<> {
        //! Flush every table to the record file.
        //!
        //! The records are captured when `commit` is called; the returned
        //! future performs the write. Writes from the same database never
        //! overlap, later ones wait their turn, and a snapshot older than the
        //! one already on disk is dropped as [`CommitOutcome::Superseded`].
        //! A store with no tables is never written, so a spurious empty commit
        //! cannot wipe the file.

        let snapshot = if self.tables.is_empty() {
            None
        } else {
            Some(serde_json::to_vec(&self.tables))
        };
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let writer = Arc::clone(&self.writer);
        let path = self.record_path.clone();

        async move {
            let Some(payload) = snapshot else {
                warn!(
                    "aborting commit to {}: refusing to write an empty database",
                    path.display()
                );
                return Ok(CommitOutcome::Skipped);
            };
            let payload = payload?;

            let mut written = writer.lock().await;
            if *written > generation {
                debug!(
                    "dropping commit {} to {}: commit {} is already on disk",
                    generation,
                    path.display(),
                    *written
                );
                return Ok(CommitOutcome::Superseded);
            }
            storage::write_file(&path, &payload).await?;
            *written = generation;

            debug!("committed {} bytes to {}", payload.len(), path.display());
            Ok(CommitOutcome::Written {
                bytes: payload.len(),
            })
        }
    }

    pub async fn load_schemas(&mut self) -> StoreResult<Vec<String>> {
        //! Read the schema file and register every schema not registered yet.
        //!
        //! Restored schemas carry no column validators. Tables missing from
        //! the record file start empty.
        //!
        //! Returns the names of the restored tables.

        let serialized = storage::read_schema_file(&self.options.schema_file).await?;
        let mut restored = Vec::new();

        for (name, schema) in serialized {
            if self.schemas.contains_key(&name) {
                continue;
            }
            let mut schema = Schema::restore(name.clone(), schema);
            let table = self.tables.entry(name.clone()).or_default();
            seed_last_id(&mut schema, table);
            self.schemas.insert(name.clone(), schema);
            restored.push(name);
        }

        info!(
            "restored {} schema(s) from {}",
            restored.len(),
            self.options.schema_file.display()
        );
        Ok(restored)
    }

    pub fn schema(&self, table_name: &str) -> Option<&Schema> {
        self.schemas.get(table_name)
    }

    pub fn get_table(&self, table_name: &str) -> StoreResult<&Table> {
        self.tables
            .get(table_name)
            .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))
    }

    fn get_table_mut(&mut self, table_name: &str) -> StoreResult<&mut Table> {
        self.tables
            .get_mut(table_name)
            .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))
    }

    pub fn get_table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn contains_table(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    pub fn len(&self, table_name: &str) -> StoreResult<usize> {
        Ok(self.get_table(table_name)?.len())
    }

    fn bump_last_id(&mut self, table_name: &str, step: i64) {
        if let Some(schema) = self.schemas.get_mut(table_name) {
            schema.last_id = schema.last_id.saturating_add_signed(step);
        }
    }

    fn save_schemas(&self) -> StoreResult<()> {
        let schemas: SchemaFile = self
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.serialize()))
            .collect();
        storage::write_schema_file(&self.options.schema_file, &schemas)
    }
}

fn seed_last_id(schema: &mut Schema, table: &Table) {
    //! Raise the id counter past every value already held in the table's
    //! auto-increment columns.

    let highest = schema
        .auto_increment_columns()
        .filter_map(|column| table.max_numeric(column))
        .max()
        .unwrap_or(0);
    schema.last_id = schema.last_id.max(highest);
}
