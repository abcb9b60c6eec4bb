//! Temporary object URLs referencing encoded image bytes
//!
//! An [`ObjectUrl`] keeps its bytes registered until it is dropped or
//! explicitly revoked, whichever comes first. Revocation happens exactly once.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tensor_interop_common::{ConversionError, EncodedImage, Result};
use tracing::debug;

/// Registry of live object URLs
#[derive(Debug, Default)]
pub struct UrlRegistry {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, Arc<EncodedImage>>>,
    revoked: AtomicUsize,
}

impl UrlRegistry {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register bytes and hand out a URL that releases them on drop
    pub fn register(self: &Arc<Self>, image: EncodedImage) -> ObjectUrl {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(image));
        debug!("Created object URL {}", id);
        ObjectUrl {
            id,
            registry: Arc::clone(self),
        }
    }

    /// Look up the bytes behind a URL
    ///
    /// # Errors
    /// Returns [`ConversionError::UnknownUrl`] if the URL came from another registry.
    pub fn resolve(&self, url: &ObjectUrl) -> Result<Arc<EncodedImage>> {
        if !std::ptr::eq(Arc::as_ptr(&url.registry), self) {
            return Err(ConversionError::UnknownUrl(url.id));
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&url.id)
            .cloned()
            .ok_or(ConversionError::UnknownUrl(url.id))
    }

    /// URLs registered and not yet released
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// URLs released so far
    #[must_use]
    pub fn revoked_count(&self) -> usize {
        self.revoked.load(Ordering::Relaxed)
    }

    fn revoke(&self, id: u64) {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            self.revoked.fetch_add(1, Ordering::Relaxed);
            debug!("Revoked object URL {}", id);
        }
    }
}

/// Handle to registered image bytes, released on drop
pub struct ObjectUrl {
    id: u64,
    registry: Arc<UrlRegistry>,
}

impl ObjectUrl {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Release the URL now instead of at end of scope
    pub fn revoke(self) {
        drop(self);
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:tensor-interop/{}", self.id)
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrl").field("id", &self.id).finish()
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_interop_common::ImageMime;

    fn sample() -> EncodedImage {
        EncodedImage::new(ImageMime::Png, vec![1, 2, 3])
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = UrlRegistry::new();
        let url = registry.register(sample());

        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.resolve(&url).unwrap().bytes, vec![1, 2, 3]);
        assert!(url.to_string().starts_with("blob:tensor-interop/"));
    }

    #[test]
    fn test_drop_releases_once() {
        let registry = UrlRegistry::new();
        {
            let _url = registry.register(sample());
        }
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 1);
    }

    #[test]
    fn test_explicit_revoke() {
        let registry = UrlRegistry::new();
        let first = registry.register(sample());
        let second = registry.register(sample());
        assert_ne!(first.id(), second.id());

        first.revoke();
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.revoked_count(), 1);

        drop(second);
        assert_eq!(registry.revoked_count(), 2);
    }
}
