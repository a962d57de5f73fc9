use crate::error::Result;
use crate::metadata::record::Describe;
use crate::metadata::resolver::{resolve, TypeBindings};
use lazy_static::lazy_static;
use lru::LruCache;
use std::any::TypeId;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

pub const DEFAULT_CAPACITY: usize = 512;

lazy_static! {
    static ref GLOBAL_CACHE: BindingCache = BindingCache::new(DEFAULT_CAPACITY);
}

/// Bounded cache of resolved bindings keyed by host type.
///
/// Entries are read-only once inserted. Resolution runs outside the lock, so
/// two threads may resolve the same type concurrently; the first insert wins.
pub struct BindingCache {
    entries: Mutex<LruCache<TypeId, Arc<TypeBindings>>>,
    capacity: usize,
}

impl BindingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let size = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(size)),
            capacity,
        }
    }

    pub fn get(&self, type_id: TypeId) -> Option<Arc<TypeBindings>> {
        let Ok(mut guard) = self.entries.lock() else {
            return None;
        };
        guard.get(&type_id).cloned()
    }

    pub fn get_or_resolve<T: Describe + 'static>(&self) -> Result<Arc<TypeBindings>> {
        let type_id = TypeId::of::<T>();
        if let Some(hit) = self.get(type_id) {
            return Ok(hit);
        }

        let resolved = Arc::new(resolve(&T::describe())?);

        let Ok(mut guard) = self.entries.lock() else {
            log::warn!(
                "binding cache lock poisoned, serving uncached bindings for {}",
                resolved.type_name
            );
            return Ok(resolved);
        };
        if let Some(existing) = guard.get(&type_id) {
            return Ok(Arc::clone(existing));
        }
        guard.put(type_id, Arc::clone(&resolved));
        Ok(resolved)
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries
            .lock()
            .map(|guard| guard.contains(&type_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

pub fn global() -> &'static BindingCache {
    &GLOBAL_CACHE
}

/// Bindings of `T` from the process-wide cache.
pub fn bindings_for<T: Describe + 'static>() -> Result<Arc<TypeBindings>> {
    global().get_or_resolve::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::decl::{FieldDecl, TypeDecl};

    struct Customer;

    impl Describe for Customer {
        fn describe() -> TypeDecl {
            TypeDecl::new("Customer")
                .field(FieldDecl::new("id"))
                .field(FieldDecl::new("name"))
        }
    }

    struct Broken;

    impl Describe for Broken {
        fn describe() -> TypeDecl {
            TypeDecl::new("Broken")
                .field(FieldDecl::new("a").name("X"))
                .field(FieldDecl::new("b").name("X"))
        }
    }

    struct Other;

    impl Describe for Other {
        fn describe() -> TypeDecl {
            TypeDecl::new("Other")
        }
    }

    #[test]
    fn test_binding_cache_new() {
        let c = BindingCache::new(0);
        assert_eq!(c.capacity(), 1);
        assert!(c.is_empty());
    }

    #[test]
    fn test_get_or_resolve_reuses_entry() {
        let c = BindingCache::new(8);
        let first = c.get_or_resolve::<Customer>().unwrap();
        let second = c.get_or_resolve::<Customer>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert!(c.contains(TypeId::of::<Customer>()));
    }

    #[test]
    fn test_resolution_error_is_not_cached() {
        let c = BindingCache::new(8);
        assert!(c.get_or_resolve::<Broken>().is_err());
        assert!(!c.contains(TypeId::of::<Broken>()));
    }

    #[test]
    fn test_lru_eviction() {
        let c = BindingCache::new(1);
        c.get_or_resolve::<Customer>().unwrap();
        c.get_or_resolve::<Other>().unwrap();
        assert_eq!(c.len(), 1);
        assert!(!c.contains(TypeId::of::<Customer>()));
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn test_concurrent_resolution_is_idempotent() {
        let c = Arc::new(BindingCache::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || c.get_or_resolve::<Customer>().unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(c.len(), 1);
        let cached = c.get(TypeId::of::<Customer>()).unwrap();
        assert!(results.iter().all(|r| **r == *cached));
    }
}
