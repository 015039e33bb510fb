//! Decoded slot images as GPU textures, keyed by the image data itself.
//!
//! Decoding happens on the rayon pool; until a texture is ready the caller gets
//! `None` and draws a placeholder. The least recently drawn textures are dropped
//! once more than `capacity` are resident.
//!
//! Hashing a data URI is linear in its size, so the content key of each image is
//! remembered per [`ImageId`]. Callers must [`TextureCache::forget_slot`] after
//! removing images from a slot and [`TextureCache::forget_positions`] after
//! binders are renumbered.

use crate::collection::SlotAddress;
use crate::constants::THUMBNAIL_MAX_DIMENSION;
use crate::image_loader::decode_thumbnail;
use eframe::egui::{self, ColorImage, TextureHandle};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::mpsc::{channel, Receiver, Sender};

pub type TextureKey = u64;

pub fn texture_key(uri: &str) -> TextureKey {
    let mut hasher = DefaultHasher::new();
    uri.hash(&mut hasher);
    hasher.finish()
}

/// Where an image sits in the collection. The URI length guards against a position
/// that was refilled with different data without being forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId {
    pub address: SlotAddress,
    pub image: usize,
    len: usize,
}

impl ImageId {
    pub fn new(address: SlotAddress, image: usize, uri: &str) -> Self {
        Self {
            address,
            image,
            len: uri.len(),
        }
    }
}

type DecodeResult = (TextureKey, Result<ColorImage, String>);

pub struct TextureCache {
    textures: HashMap<TextureKey, TextureHandle>,
    keys: HashMap<ImageId, TextureKey>,
    access_order: Vec<TextureKey>,
    pending: HashSet<TextureKey>,
    failed: HashSet<TextureKey>,
    capacity: usize,
    tx: Sender<DecodeResult>,
    rx: Receiver<DecodeResult>,
}

impl TextureCache {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = channel();
        Self {
            textures: HashMap::new(),
            keys: HashMap::new(),
            access_order: Vec::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
            capacity: capacity.max(1),
            tx,
            rx,
        }
    }

    /// Returns the texture for the image `uri` at `id`, scheduling a decode the
    /// first time it is seen.
    pub fn get(&mut self, ctx: &egui::Context, id: ImageId, uri: &str) -> Option<TextureHandle> {
        let key = self.key_for(id, uri);
        if let Some(texture) = self.textures.get(&key).cloned() {
            self.touch(key);
            return Some(texture);
        }
        if self.failed.contains(&key) || !self.pending.insert(key) {
            return None;
        }

        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let uri = uri.to_owned();
        rayon::spawn(move || {
            let result = decode_thumbnail(&uri, THUMBNAIL_MAX_DIMENSION);
            let _ = tx.send((key, result));
            ctx.request_repaint();
        });
        None
    }

    /// Whether decoding `uri` already failed; the slot shows an error marker instead.
    pub fn is_broken(&mut self, id: ImageId, uri: &str) -> bool {
        let key = self.key_for(id, uri);
        self.failed.contains(&key)
    }

    fn key_for(&mut self, id: ImageId, uri: &str) -> TextureKey {
        *self.keys.entry(id).or_insert_with(|| texture_key(uri))
    }

    /// Drops the remembered keys of one slot. Textures stay cached by content.
    pub fn forget_slot(&mut self, address: SlotAddress) {
        self.keys.retain(|id, _| id.address != address);
    }

    pub fn forget_positions(&mut self) {
        self.keys.clear();
    }

    /// Uploads every finished decode. Call once per frame before drawing.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok((key, result)) = self.rx.try_recv() {
            self.pending.remove(&key);
            match result {
                Ok(image) => self.insert(ctx, key, image),
                Err(err) => {
                    log::error!("Failed to decode slot image: {err}");
                    self.failed.insert(key);
                }
            }
        }
    }

    pub fn insert(&mut self, ctx: &egui::Context, key: TextureKey, image: ColorImage) {
        let texture = ctx.load_texture(
            format!("slot-texture-{key:016x}"),
            image,
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(key, texture);
        self.touch(key);
        self.evict_over_capacity();
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.keys.clear();
        self.access_order.clear();
        self.failed.clear();
    }

    fn touch(&mut self, key: TextureKey) {
        self.access_order.retain(|&k| k != key);
        self.access_order.push(key);
    }

    fn evict_over_capacity(&mut self) {
        while self.textures.len() > self.capacity && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.textures.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> ColorImage {
        ColorImage::new([1, 1], egui::Color32::WHITE)
    }

    fn id(slot: usize, image: usize, uri: &str) -> ImageId {
        let address = SlotAddress {
            binder: 0,
            page: 0,
            slot,
        };
        ImageId::new(address, image, uri)
    }

    #[test]
    fn test_key_is_stable() {
        assert_eq!(texture_key("data:a"), texture_key("data:a"));
        assert_ne!(texture_key("data:a"), texture_key("data:b"));
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::new(2);
        cache.insert(&ctx, texture_key("a"), pixel());
        cache.insert(&ctx, texture_key("b"), pixel());
        assert!(cache.get(&ctx, id(0, 0, "a"), "a").is_some());
        cache.insert(&ctx, texture_key("c"), pixel());

        assert_eq!(cache.textures.len(), 2);
        assert!(cache.textures.contains_key(&texture_key("a")));
        assert!(!cache.textures.contains_key(&texture_key("b")));
        assert!(cache.textures.contains_key(&texture_key("c")));
    }

    #[test]
    fn test_undecodable_image_is_marked_broken() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::new(4);
        let uri = "data:image/png;base64,AAAA";
        let image = id(0, 0, uri);
        assert!(cache.get(&ctx, image, uri).is_none());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !cache.is_broken(image, uri) && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
            cache.poll(&ctx);
        }
        assert!(cache.is_broken(image, uri));
        assert!(cache.get(&ctx, image, uri).is_none());
        assert_eq!(cache.textures.len(), 0);
    }

    #[test]
    fn test_key_is_remembered_per_position() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::new(4);
        cache.insert(&ctx, texture_key("data:a"), pixel());
        assert!(cache.get(&ctx, id(3, 1, "data:a"), "data:a").is_some());

        // Same position and length: the remembered key is used without rehashing.
        assert_eq!(cache.key_for(id(3, 1, "data:b"), "data:b"), texture_key("data:a"));
        assert_eq!(cache.key_for(id(3, 1, "data:bb"), "data:bb"), texture_key("data:bb"));
        assert_eq!(cache.key_for(id(4, 1, "data:b"), "data:b"), texture_key("data:b"));

        cache.forget_slot(id(3, 1, "").address);
        assert_eq!(cache.key_for(id(3, 1, "data:b"), "data:b"), texture_key("data:b"));
        assert_eq!(cache.key_for(id(4, 1, "data:b"), "data:b"), texture_key("data:b"));
        assert!(cache.textures.contains_key(&texture_key("data:a")));
    }

    #[test]
    fn test_forget_positions_keeps_textures() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::new(4);
        cache.insert(&ctx, texture_key("data:a"), pixel());
        assert!(cache.get(&ctx, id(0, 0, "data:a"), "data:a").is_some());
        cache.forget_positions();
        assert!(cache.keys.is_empty());
        assert!(cache.get(&ctx, id(1, 0, "data:a"), "data:a").is_some());
    }
}
