use gallery_common::ImageHandle;
use image::RgbaImage;
use std::collections::BTreeMap;

/// Presentation-side owner of decoded pixels.
pub trait TextureHost {
    /// Bind decoded pixels to `handle` (GPU upload, texture cache, ...).
    fn upload(&mut self, handle: ImageHandle, pixels: &RgbaImage);
    /// Free whatever `upload` created for `handle`.
    fn release(&mut self, handle: ImageHandle);
}

/// Tracks live image handles so each is released exactly once.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    live: BTreeMap<ImageHandle, String>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh handle for an accepted image.
    pub fn acquire(&mut self, name: &str) -> ImageHandle {
        let handle = ImageHandle::new();
        self.live.insert(handle, name.to_string());
        tracing::debug!(handle = %handle.short(), name, "image handle acquired");
        handle
    }

    /// Release a live handle. Returns false, and touches nothing, if the
    /// handle was never issued or is already released.
    pub fn release(&mut self, handle: ImageHandle, host: &mut dyn TextureHost) -> bool {
        match self.live.remove(&handle) {
            Some(name) => {
                host.release(handle);
                tracing::debug!(handle = %handle.short(), name, "image handle released");
                true
            }
            None => {
                tracing::debug!(handle = %handle.short(), "release of unknown handle ignored");
                false
            }
        }
    }

    /// Release every live handle (session teardown). Returns how many were released.
    pub fn release_all(&mut self, host: &mut dyn TextureHost) -> usize {
        let live = std::mem::take(&mut self.live);
        for handle in live.keys() {
            host.release(*handle);
        }
        if !live.is_empty() {
            tracing::info!(count = live.len(), "released all image handles");
        }
        live.len()
    }

    pub fn is_live(&self, handle: ImageHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn name(&self, handle: ImageHandle) -> Option<&str> {
        self.live.get(&handle).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl Drop for ImageRegistry {
    fn drop(&mut self) {
        if !self.live.is_empty() {
            tracing::warn!(
                count = self.live.len(),
                "image registry dropped with live handles; call release_all on teardown"
            );
        }
    }
}

/// Texture host without a GPU: remembers image sizes and counts releases.
///
/// Used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct HeadlessTextureHost {
    uploaded: BTreeMap<ImageHandle, (u32, u32)>,
    releases: BTreeMap<ImageHandle, u32>,
}

impl HeadlessTextureHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions of a bound image.
    pub fn dimensions(&self, handle: ImageHandle) -> Option<(u32, u32)> {
        self.uploaded.get(&handle).copied()
    }

    /// Images uploaded and not yet released.
    pub fn live(&self) -> usize {
        self.uploaded.len()
    }

    /// How many times `handle` was released.
    pub fn release_count(&self, handle: ImageHandle) -> u32 {
        self.releases.get(&handle).copied().unwrap_or(0)
    }
}

impl TextureHost for HeadlessTextureHost {
    fn upload(&mut self, handle: ImageHandle, pixels: &RgbaImage) {
        self.uploaded.insert(handle, pixels.dimensions());
    }

    fn release(&mut self, handle: ImageHandle) {
        self.uploaded.remove(&handle);
        *self.releases.entry(handle).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release_once() {
        let mut registry = ImageRegistry::new();
        let mut host = HeadlessTextureHost::new();
        let h = registry.acquire("a.png");
        host.upload(h, &RgbaImage::new(2, 2));
        assert!(registry.is_live(h));
        assert_eq!(registry.name(h), Some("a.png"));

        assert!(registry.release(h, &mut host));
        assert!(!registry.release(h, &mut host));
        assert_eq!(host.release_count(h), 1);
        assert_eq!(host.live(), 0);
    }

    #[test]
    fn release_all_on_teardown() {
        let mut registry = ImageRegistry::new();
        let mut host = HeadlessTextureHost::new();
        let handles: Vec<_> = (0..3).map(|i| registry.acquire(&format!("{i}.png"))).collect();
        assert!(registry.release(handles[1], &mut host));

        assert_eq!(registry.release_all(&mut host), 2);
        assert!(registry.is_empty());
        for h in handles {
            assert_eq!(host.release_count(h), 1);
        }
        assert_eq!(registry.release_all(&mut host), 0);
    }

    #[test]
    fn unknown_handle_is_ignored() {
        let mut registry = ImageRegistry::new();
        let mut host = HeadlessTextureHost::new();
        assert!(!registry.release(ImageHandle::new(), &mut host));
    }
}
