//! Almacenamiento en memoria
//!
//! Tabla genérica sobre `RwLock<HashMap>` que respalda las implementaciones
//! en memoria de los repositorios (desarrollo sin DATABASE_URL y tests).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    customer::Customer, expense::Expense, expense_category::ExpenseCategory, garage::GarageProfile,
    gst_bill::GstBill, item::Item, job_card::JobCard, mechanic::Mechanic, non_gst_bill::NonGstBill,
    permission::Permission, user::User,
};

/// Registro almacenable: identificador y fecha de alta para ordenar
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
}

macro_rules! impl_record {
    ($($model:ty),* $(,)?) => {
        $(
            impl Record for $model {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn created_at(&self) -> DateTime<Utc> {
                    self.created_at
                }
            }
        )*
    };
}

impl_record!(
    Customer,
    Mechanic,
    User,
    JobCard,
    Item,
    GstBill,
    NonGstBill,
    Expense,
    ExpenseCategory,
    GarageProfile,
    Permission,
);

pub struct MemoryTable<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: T) -> T {
        self.rows.write().await.insert(record.id(), record.clone());
        record
    }

    /// Inserta solo si ningún registro existente choca con el nuevo
    /// (equivalente a un índice único). Devuelve None si hay choque.
    pub async fn insert_unique<F>(&self, record: T, clashes: F) -> Option<T>
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut rows = self.rows.write().await;
        if rows.values().any(|existing| clashes(existing, &record)) {
            return None;
        }
        rows.insert(record.id(), record.clone());
        Some(record)
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    /// Reemplaza un registro existente; None si no existe
    pub async fn replace(&self, record: T) -> Option<T> {
        let mut rows = self.rows.write().await;
        let slot = rows.get_mut(&record.id())?;
        *slot = record.clone();
        Some(record)
    }

    /// Como `replace`, rechazando el cambio si choca con otro registro
    pub async fn replace_unique<F>(&self, record: T, clashes: F) -> Result<Option<T>, ()>
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut rows = self.rows.write().await;
        if rows
            .values()
            .any(|existing| existing.id() != record.id() && clashes(existing, &record))
        {
            return Err(());
        }
        Ok(rows.get_mut(&record.id()).map(|slot| {
            *slot = record.clone();
            record
        }))
    }

    /// Modifica un registro en sitio si `apply` devuelve true
    pub async fn update_if<F>(&self, id: Uuid, apply: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut rows = self.rows.write().await;
        rows.get_mut(&id).map_or(false, apply)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.rows.write().await.remove(&id).is_some()
    }

    /// Registros que cumplen el predicado, más recientes primero
    pub async fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.rows.read().await;
        let mut matches: Vec<T> = rows.values().filter(|r| predicate(r)).cloned().collect();
        matches.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        matches
    }

    pub async fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows.read().await.values().find(|r| predicate(r)).cloned()
    }

    pub async fn count<F>(&self, predicate: F) -> i64
    where
        F: Fn(&T) -> bool,
    {
        self.rows.read().await.values().filter(|r| predicate(r)).count() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mechanic::CreateMechanicRequest;

    fn mechanic(name: &str) -> Mechanic {
        Mechanic::new(CreateMechanicRequest {
            name: name.to_string(),
            specialty: "Engine".to_string(),
        })
    }

    #[tokio::test]
    async fn test_insert_get_replace_remove() {
        let table = MemoryTable::new();
        let mut stored = table.insert(mechanic("Ravi")).await;
        assert_eq!(table.get(stored.id).await.unwrap().name, "Ravi");

        stored.name = "Ravi K".to_string();
        assert!(table.replace(stored.clone()).await.is_some());
        assert_eq!(table.get(stored.id).await.unwrap().name, "Ravi K");

        assert!(table.remove(stored.id).await);
        assert!(table.replace(stored).await.is_none());
    }

    #[tokio::test]
    async fn test_insert_unique_rejects_clash() {
        let table = MemoryTable::new();
        let same_name = |a: &Mechanic, b: &Mechanic| a.name == b.name;
        assert!(table.insert_unique(mechanic("Ravi"), same_name).await.is_some());
        assert!(table.insert_unique(mechanic("Ravi"), same_name).await.is_none());
        assert_eq!(table.count(|_| true).await, 1);
    }

    #[tokio::test]
    async fn test_update_if_is_conditional() {
        let table = MemoryTable::new();
        let stored = table.insert(mechanic("Ravi")).await;
        let renamed = table
            .update_if(stored.id, |m| {
                if m.name == "Ravi" {
                    m.name = "Anil".to_string();
                    true
                } else {
                    false
                }
            })
            .await;
        assert!(renamed);
        assert!(!table.update_if(stored.id, |m| m.name == "Ravi").await);
        assert!(!table.update_if(Uuid::new_v4(), |_| true).await);
    }
}
