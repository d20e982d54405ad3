//! In-memory image store
//!
//! Holds uploaded image bytes for the current session only; persistence is
//! out of scope. The server-assigned identifier is written once after the
//! first successful upload and never changes afterwards.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::RwLock;

use uuid::Uuid;

use crate::model::ImageHandle;

/// Oldest images are evicted beyond this count
const MAX_IMAGES: usize = 32;

struct StoredImage {
    filename: String,
    bytes: Vec<u8>,
    server_id: Option<String>,
}

#[derive(Default)]
struct StoreState {
    images: HashMap<String, StoredImage>,
    order: VecDeque<String>,
}

#[derive(Default)]
pub struct ImageStore {
    state: RwLock<StoreState>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store image bytes, returning a fresh local handle
    pub fn insert(&self, filename: String, bytes: Vec<u8>) -> ImageHandle {
        let id = Uuid::new_v4().to_string();
        let mut state = self.state.write().expect("image store lock");

        state.images.insert(
            id.clone(),
            StoredImage {
                filename,
                bytes,
                server_id: None,
            },
        );
        state.order.push_back(id.clone());

        while state.order.len() > MAX_IMAGES {
            if let Some(evicted) = state.order.pop_front() {
                state.images.remove(&evicted);
                tracing::debug!(id = %evicted, "Evicted oldest stored image");
            }
        }

        ImageHandle::new(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state
            .read()
            .expect("image store lock")
            .images
            .contains_key(id)
    }

    /// Filename and raw bytes for upload or inline transmission
    pub fn bytes(&self, id: &str) -> Option<(String, Vec<u8>)> {
        let state = self.state.read().expect("image store lock");
        state
            .images
            .get(id)
            .map(|img| (img.filename.clone(), img.bytes.clone()))
    }

    pub fn server_id(&self, id: &str) -> Option<String> {
        let state = self.state.read().expect("image store lock");
        state.images.get(id).and_then(|img| img.server_id.clone())
    }

    /// Record the server-assigned identifier; a no-op once set
    pub fn set_server_id(&self, id: &str, server_id: String) {
        let mut state = self.state.write().expect("image store lock");
        if let Some(img) = state.images.get_mut(id) {
            if img.server_id.is_none() {
                img.server_id = Some(server_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_fetch() {
        let store = ImageStore::new();
        let handle = store.insert("before.png".to_string(), vec![1, 2, 3]);
        assert!(store.contains(&handle.id));

        let (filename, bytes) = store.bytes(&handle.id).unwrap();
        assert_eq!(filename, "before.png");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_server_id_write_once() {
        let store = ImageStore::new();
        let handle = store.insert("a.png".to_string(), vec![]);

        store.set_server_id(&handle.id, "srv-1".to_string());
        store.set_server_id(&handle.id, "srv-2".to_string());
        assert_eq!(store.server_id(&handle.id), Some("srv-1".to_string()));
    }

    #[test]
    fn test_eviction_beyond_cap() {
        let store = ImageStore::new();
        let first = store.insert("0.png".to_string(), vec![]);
        for i in 1..=MAX_IMAGES {
            store.insert(format!("{}.png", i), vec![]);
        }
        assert!(!store.contains(&first.id));
    }
}
