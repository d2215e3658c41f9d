use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use thiserror::Error;

use learnhub_core::TenantId;

/// Attempts made by [`modify`] before giving up on a contended row.
/// Retry bound for optimistic writes.
pub const MAX_MODIFY_ATTEMPTS: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique key or constraint already holds a row.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("row not found")]
    NotFound,

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Backend(String),
}

/// Tenant-isolated key/value table.
///
/// Every operation takes the tenant explicitly; rows of one tenant are never
/// visible through another tenant's id. Writes that must not race
/// (`insert`, `insert_unique`, `replace`) are atomic with respect to each other.
pub trait TenantStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &K) -> Result<Option<V>, StoreError>;

    /// Rows of the tenant accepted by `predicate`.
    fn filter(
        &self,
        tenant_id: TenantId,
        predicate: &dyn Fn(&V) -> bool,
    ) -> Result<Vec<V>, StoreError>;

    /// Insert a new row; `Conflict` if the key is taken.
    fn insert(&self, tenant_id: TenantId, key: K, value: V) -> Result<(), StoreError>;

    /// Insert a new row unless the key is taken or an existing row of the
    /// tenant satisfies `clashes` (a per-tenant unique constraint).
    fn insert_unique(
        &self,
        tenant_id: TenantId,
        key: K,
        value: V,
        clashes: &dyn Fn(&V) -> bool,
    ) -> Result<(), StoreError>;

    /// Swap the row for `value` only if it still equals `expected`.
    /// Returns `false` when another writer got there first.
    fn replace(&self, tenant_id: TenantId, key: &K, expected: &V, value: V)
    -> Result<bool, StoreError>;

    fn remove(&self, tenant_id: TenantId, key: &K) -> Result<Option<V>, StoreError>;

    fn list(&self, tenant_id: TenantId) -> Result<Vec<V>, StoreError> {
        self.filter(tenant_id, &|_| true)
    }
}

/// Optimistic read-modify-write on one row.
///
/// `f` sees the current row (if any) and returns the row to store, or `None`
/// to leave storage untouched. When a concurrent writer changes the row
/// between read and write, `f` runs again against the fresh value. Returns the
/// row as it stands afterwards.
pub fn modify<K, V, S, E, F>(
    store: &S,
    tenant_id: TenantId,
    key: &K,
    mut f: F,
) -> Result<Option<V>, E>
where
    S: TenantStore<K, V> + ?Sized,
    K: Clone,
    V: Clone,
    E: From<StoreError>,
    F: FnMut(Option<&V>) -> Result<Option<V>, E>,
{
    for _ in 0..MAX_MODIFY_ATTEMPTS {
        let current = store.get(tenant_id, key)?;
        let Some(next) = f(current.as_ref())? else {
            return Ok(current);
        };

        let stored = match &current {
            None => match store.insert(tenant_id, key.clone(), next.clone()) {
                Ok(()) => true,
                Err(StoreError::Conflict(_)) => false,
                Err(e) => return Err(e.into()),
            },
            Some(current) => store.replace(tenant_id, key, current, next.clone())?,
        };
        if stored {
            return Ok(Some(next));
        }
    }

    Err(StoreError::Conflict("row is being modified concurrently".to_string()).into())
}

/// In-memory tenant-isolated store for tests/dev.
#[derive(Debug)]
pub struct InMemoryTenantStore<K, V> {
    inner: RwLock<HashMap<(TenantId, K), V>>,
}

impl<K, V> InMemoryTenantStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryTenantStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl<K, V> TenantStore<K, V> for InMemoryTenantStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Result<Option<V>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&(tenant_id, key.clone())).cloned())
    }

    fn filter(
        &self,
        tenant_id: TenantId,
        predicate: &dyn Fn(&V) -> bool,
    ) -> Result<Vec<V>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .iter()
            .filter(|((t, _), v)| *t == tenant_id && predicate(v))
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn insert(&self, tenant_id: TenantId, key: K, value: V) -> Result<(), StoreError> {
        self.insert_unique(tenant_id, key, value, &|_| false)
    }

    fn insert_unique(
        &self,
        tenant_id: TenantId,
        key: K,
        value: V,
        clashes: &dyn Fn(&V) -> bool,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let key = (tenant_id, key);
        if map.contains_key(&key) {
            return Err(StoreError::Conflict("key already exists".to_string()));
        }
        if map.iter().any(|((t, _), v)| *t == tenant_id && clashes(v)) {
            return Err(StoreError::Conflict("unique constraint violated".to_string()));
        }
        map.insert(key, value);
        Ok(())
    }

    fn replace(
        &self,
        tenant_id: TenantId,
        key: &K,
        expected: &V,
        value: V,
    ) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&(tenant_id, key.clone())) {
            Some(current) if current == expected => {
                *current = value;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound),
        }
    }

    fn remove(&self, tenant_id: TenantId, key: &K) -> Result<Option<V>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&(tenant_id, key.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    type Store = InMemoryTenantStore<u32, String>;

    #[test]
    fn tenants_are_isolated() {
        let store = Store::new();
        let a = TenantId::new();
        let b = TenantId::new();
        store.insert(a, 1, "a".into()).unwrap();
        store.insert(b, 1, "b".into()).unwrap();

        assert_eq!(store.get(a, &1).unwrap().as_deref(), Some("a"));
        assert_eq!(store.list(b).unwrap(), vec!["b".to_string()]);
        assert_eq!(store.remove(a, &1).unwrap().as_deref(), Some("a"));
        assert_eq!(store.get(b, &1).unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn duplicate_key_conflicts() {
        let store = Store::new();
        let t = TenantId::new();
        store.insert(t, 1, "x".into()).unwrap();
        assert!(matches!(store.insert(t, 1, "y".into()), Err(StoreError::Conflict(_))));
        assert_eq!(store.get(t, &1).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn unique_predicate_is_per_tenant() {
        let store = Store::new();
        let a = TenantId::new();
        let b = TenantId::new();
        let same = |v: &String| v.eq_ignore_ascii_case("grade 10");

        store.insert_unique(a, 1, "Grade 10".into(), &same).unwrap();
        assert!(store.insert_unique(a, 2, "grade 10".into(), &same).is_err());
        store.insert_unique(b, 1, "GRADE 10".into(), &same).unwrap();
    }

    #[test]
    fn modify_creates_updates_and_skips() {
        let store = Store::new();
        let t = TenantId::new();

        let created: Result<_, StoreError> = modify(&store, t, &7, |cur| {
            assert!(cur.is_none());
            Ok(Some("one".to_string()))
        });
        assert_eq!(created.unwrap().as_deref(), Some("one"));

        let updated: Result<_, StoreError> =
            modify(&store, t, &7, |cur| Ok(cur.map(|c| format!("{c}+"))));
        assert_eq!(updated.unwrap().as_deref(), Some("one+"));

        let untouched: Result<_, StoreError> = modify(&store, t, &7, |_| Ok(None));
        assert_eq!(untouched.unwrap().as_deref(), Some("one+"));
    }

    #[test]
    fn concurrent_inserts_admit_exactly_one() {
        let store = Arc::new(Store::new());
        let t = TenantId::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.insert(t, 1, format!("writer {i}")).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.list(t).unwrap().len(), 1);
    }
}
