//! Persistence interface for users, applications and generated functions.
//!
//! Records are keyed by numeric id. [`MemoryRepository`] is the in-process implementation
//! used by the CLI and tests; a database-backed store implements [`Repository`] the same way.

use crate::decompose::MaterializedFunction;
use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// A record that can live in a [`Repository`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    fn id(&self) -> Option<u64>;
    fn set_id(&mut self, id: u64);
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn get(&self, id: u64) -> Result<T, StoreError>;

    /// Stores a new record and returns it with its assigned id.
    async fn create(&self, record: T) -> Result<T, StoreError>;

    async fn update(&self, id: u64, record: T) -> Result<T, StoreError>;

    /// Lists records in id order. `page` starts at 1.
    async fn list(&self, page: usize, page_size: usize) -> Result<Page<T>, StoreError>;

    async fn delete(&self, id: u64) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Option<u64>,
    pub user_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A generated function as persisted after decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: Option<u64>,
    pub function_name: String,
    pub template: String,
    pub code: String,
    pub depth: usize,
    pub parent: Option<String>,
    /// Names of the child functions this one calls.
    pub children: Vec<String>,
}

impl From<&MaterializedFunction> for FunctionRecord {
    fn from(function: &MaterializedFunction) -> Self {
        let definition = &function.definition;
        Self {
            id: definition.id,
            function_name: definition.function_name.clone(),
            template: definition.template.clone(),
            code: definition.code.clone(),
            depth: function.depth,
            parent: function.parent.clone(),
            children: definition
                .child_functions
                .iter()
                .map(|c| c.function_name.clone())
                .collect(),
        }
    }
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> Option<u64> {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = Some(id);
            }
        }
    };
}

impl_record!(UserRecord, "User");
impl_record!(ApplicationRecord, "Application");
impl_record!(FunctionRecord, "Function");

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

/// An in-memory repository. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct MemoryRepository<T> {
    table: RwLock<Table<T>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read(|table| table.rows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<R>(&self, f: impl FnOnce(&Table<T>) -> R) -> R {
        match self.table.read() {
            Ok(table) => f(&table),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<R>(&self, f: impl FnOnce(&mut Table<T>) -> R) -> R {
        match self.table.write() {
            Ok(mut table) => f(&mut table),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn get(&self, id: u64) -> Result<T, StoreError> {
        self.read(|table| table.rows.get(&id).cloned())
            .ok_or(StoreError::NotFound { kind: T::KIND, id })
    }

    async fn create(&self, mut record: T) -> Result<T, StoreError> {
        Ok(self.write(|table| {
            let id = table.next_id;
            table.next_id += 1;
            record.set_id(id);
            table.rows.insert(id, record.clone());
            record
        }))
    }

    async fn update(&self, id: u64, mut record: T) -> Result<T, StoreError> {
        self.write(|table| {
            let row = table
                .rows
                .get_mut(&id)
                .ok_or(StoreError::NotFound { kind: T::KIND, id })?;
            record.set_id(id);
            *row = record.clone();
            Ok(record)
        })
    }

    async fn list(&self, page: usize, page_size: usize) -> Result<Page<T>, StoreError> {
        if page == 0 || page_size == 0 {
            return Err(StoreError::InvalidPage { page, page_size });
        }
        Ok(self.read(|table| {
            let total_items = table.rows.len();
            let items = table
                .rows
                .values()
                .skip((page - 1) * page_size)
                .take(page_size)
                .cloned()
                .collect();
            Page {
                items,
                page,
                page_size,
                total_items,
                total_pages: total_items.div_ceil(page_size),
            }
        }))
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        self.write(|table| table.rows.remove(&id))
            .map(|_| ())
            .ok_or(StoreError::NotFound { kind: T::KIND, id })
    }
}
