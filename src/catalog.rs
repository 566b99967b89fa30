//! Catalog - the registry of tables the buffer pool can read from.
//!
//! Maps each [`TableId`] to the [`DbFile`] that stores it, along with the
//! table's name. The buffer pool consults it on every cache miss.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use crate::common::{Error, Result, TableId};
use crate::storage::DbFile;
use crate::tuple::TupleDesc;

struct TableEntry {
    name: String,
    file: Arc<dyn DbFile>,
}

/// Registry of tables by id and by name.
///
/// # Thread Safety
/// Lookups take a shared lock and clone the `Arc`, so a file stays alive for
/// as long as a caller holds it even if the table is replaced meanwhile.
#[derive(Default)]
pub struct Catalog {
    tables: RwLock<HashMap<TableId, TableEntry>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `file` under `name`.
    ///
    /// An existing table with the same name or the same id is replaced.
    pub fn add_table(&self, file: Arc<dyn DbFile>, name: impl Into<String>) -> TableId {
        let name = name.into();
        let id = file.id();

        let mut tables = self.tables.write();
        tables.retain(|&other_id, entry| {
            let conflict = other_id == id || entry.name == name;
            if conflict {
                debug!("table {} ({}) replaced by {} ({})", entry.name, other_id, name, id);
            }
            !conflict
        });
        tables.insert(id, TableEntry { name: name.clone(), file });

        info!("registered table {} as {}", name, id);
        id
    }

    /// Id of the table named `name`.
    pub fn table_id(&self, name: &str) -> Result<TableId> {
        self.tables
            .read()
            .iter()
            .find(|(_, entry)| entry.name == name)
            .map(|(&id, _)| id)
            .ok_or_else(|| Error::NoSuchTable(name.to_string()))
    }

    /// The file storing table `id`.
    pub fn database_file(&self, id: TableId) -> Result<Arc<dyn DbFile>> {
        self.tables
            .read()
            .get(&id)
            .map(|entry| Arc::clone(&entry.file))
            .ok_or(Error::UnknownTable(id))
    }

    pub fn tuple_desc(&self, id: TableId) -> Result<TupleDesc> {
        self.tables
            .read()
            .get(&id)
            .map(|entry| entry.file.tuple_desc().clone())
            .ok_or(Error::UnknownTable(id))
    }

    pub fn table_name(&self, id: TableId) -> Result<String> {
        self.tables
            .read()
            .get(&id)
            .map(|entry| entry.name.clone())
            .ok_or(Error::UnknownTable(id))
    }

    /// Ids of every registered table, in ascending order.
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.tables.read().keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }

    /// Forget every table.
    pub fn clear(&self) {
        self.tables.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HeapFile;
    use crate::tuple::Type;
    use std::fs::File;
    use tempfile::{tempdir, TempDir};

    fn heap_file(dir: &TempDir, file_name: &str, td: TupleDesc) -> Arc<HeapFile> {
        let path = dir.path().join(file_name);
        File::create(&path).unwrap();
        Arc::new(HeapFile::new(&path, td).unwrap())
    }

    #[test]
    fn test_add_and_lookup() {
        let dir = tempdir().unwrap();
        let td = TupleDesc::new([Type::Int, Type::String]);
        let file = heap_file(&dir, "a.dat", td.clone());

        let catalog = Catalog::new();
        assert!(catalog.is_empty());

        let id = catalog.add_table(file.clone(), "a");
        assert_eq!(id, file.id());
        assert_eq!(catalog.table_id("a").unwrap(), id);
        assert_eq!(catalog.table_name(id).unwrap(), "a");
        assert_eq!(catalog.tuple_desc(id).unwrap(), td);
        assert_eq!(catalog.database_file(id).unwrap().id(), id);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_unknown_lookups() {
        let catalog = Catalog::new();

        assert!(matches!(catalog.table_id("nope"), Err(Error::NoSuchTable(n)) if n == "nope"));
        assert!(matches!(
            catalog.database_file(TableId(9)),
            Err(Error::UnknownTable(TableId(9)))
        ));
        assert!(catalog.tuple_desc(TableId(9)).is_err());
        assert!(catalog.table_name(TableId(9)).is_err());
    }

    #[test]
    fn test_same_name_replaces() {
        let dir = tempdir().unwrap();
        let a = heap_file(&dir, "a.dat", TupleDesc::new([Type::Int]));
        let b = heap_file(&dir, "b.dat", TupleDesc::new([Type::Int]));

        let catalog = Catalog::new();
        catalog.add_table(a.clone(), "t");
        catalog.add_table(b.clone(), "t");

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.table_id("t").unwrap(), b.id());
        assert!(catalog.database_file(a.id()).is_err());
    }

    #[test]
    fn test_same_id_replaces() {
        let dir = tempdir().unwrap();
        let a = heap_file(&dir, "a.dat", TupleDesc::new([Type::Int]));

        let catalog = Catalog::new();
        catalog.add_table(a.clone(), "old");
        catalog.add_table(a.clone(), "new");

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.table_name(a.id()).unwrap(), "new");
        assert!(catalog.table_id("old").is_err());
    }

    #[test]
    fn test_table_ids_sorted_and_clear() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new();
        for name in ["a", "b", "c"] {
            catalog.add_table(heap_file(&dir, name, TupleDesc::new([Type::Int])), name);
        }

        let ids = catalog.table_ids();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        catalog.clear();
        assert!(catalog.is_empty());
        assert!(catalog.table_ids().is_empty());
    }
}
