use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use stockroom_auth::{Identity, IdentityStore};
use stockroom_core::{ProductId, StoreError, UserId};
use stockroom_products::{NewProduct, Product, ProductStore};

/// A table: rows keyed by id plus the next id to hand out.
#[derive(Debug)]
struct Table<K, V> {
    rows: BTreeMap<K, V>,
    next_id: i64,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<K, V> Table<K, V> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::backend("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::backend("in-memory store lock poisoned"))
}

/// In-memory identity store for tests/dev.
///
/// Handle uniqueness is checked and the row inserted under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<Table<UserId, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop an identity.
    ///
    /// The core never deletes identities; this exists for operators and tests.
    pub fn remove(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(write(&self.inner)?.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>, StoreError> {
        let table = read(&self.inner)?;
        Ok(table.rows.values().find(|i| i.handle == handle).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        Ok(read(&self.inner)?.rows.get(&id).cloned())
    }

    async fn insert(&self, handle: &str, digest: &str) -> Result<Identity, StoreError> {
        let mut table = write(&self.inner)?;
        if table.rows.values().any(|i| i.handle == handle) {
            return Err(StoreError::UniqueViolation(format!("users.username = {handle}")));
        }

        let id = UserId::new(table.allocate_id());
        let identity = Identity {
            id,
            handle: handle.to_string(),
            digest: digest.to_string(),
        };
        table.rows.insert(id, identity.clone());
        Ok(identity)
    }

    async fn list(&self) -> Result<Vec<Identity>, StoreError> {
        Ok(read(&self.inner)?.rows.values().cloned().collect())
    }
}

/// In-memory product store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<Table<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, owner: UserId, draft: NewProduct) -> Result<Product, StoreError> {
        let mut table = write(&self.inner)?;
        let id = ProductId::new(table.allocate_id());
        let product = draft.into_product(id, owner);
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(read(&self.inner)?.rows.get(&id).cloned())
    }

    async fn update_quantity(&self, id: ProductId, quantity: i64) -> Result<Option<Product>, StoreError> {
        let mut table = write(&self.inner)?;
        Ok(table.rows.get_mut(&id).map(|p| {
            p.quantity = quantity;
            p.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(write(&self.inner)?.rows.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(read(&self.inner)?.rows.len() as u64)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        let table = read(&self.inner)?;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(table.rows.values().skip(offset).take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn draft(sku: &str) -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            kind: "Hardware".to_string(),
            sku: sku.to_string(),
            image_url: None,
            description: None,
            quantity: 5,
            price: 2.5,
        }
    }

    #[tokio::test]
    async fn identity_ids_are_sequential_and_immutable() {
        let store = InMemoryIdentityStore::new();
        let a = store.insert("alice", "d1").await.unwrap();
        let b = store.insert("bob", "d2").await.unwrap();
        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));

        store.remove(a.id).unwrap();
        let c = store.insert("carol", "d3").await.unwrap();
        assert_eq!(c.id, UserId::new(3), "ids are never reused");
    }

    #[tokio::test]
    async fn identity_lookup_is_case_sensitive() {
        let store = InMemoryIdentityStore::new();
        store.insert("alice", "d1").await.unwrap();
        assert!(store.find_by_handle("alice").await.unwrap().is_some());
        assert!(store.find_by_handle("Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_handle_is_unique_violation() {
        let store = InMemoryIdentityStore::new();
        store.insert("alice", "d1").await.unwrap();
        let err = store.insert("alice", "d2").await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_admit_exactly_one() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let mut handles = Vec::new();
        for n in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert("alice", &format!("digest-{n}")).await
            }));
        }

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn product_crud() {
        let store = InMemoryProductStore::new();
        let owner = UserId::new(1);
        let p = store.insert(owner, draft("A")).await.unwrap();
        assert_eq!(p.created_by, owner);

        let updated = store.update_quantity(p.id, 42).await.unwrap().unwrap();
        assert_eq!(updated.quantity, 42);
        assert_eq!(updated.created_by, owner);

        assert!(store.delete(p.id).await.unwrap());
        assert!(!store.delete(p.id).await.unwrap());
        assert!(store.update_quantity(p.id, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn product_listing_is_ordered_and_windowed() {
        let store = InMemoryProductStore::new();
        for sku in ["A", "B", "C", "D"] {
            store.insert(UserId::new(1), draft(sku)).await.unwrap();
        }
        assert_eq!(store.count().await.unwrap(), 4);

        let skus: Vec<String> = store
            .list(1, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.sku)
            .collect();
        assert_eq!(skus, vec!["B", "C"]);
        assert!(store.list(10, 2).await.unwrap().is_empty());
    }
}
