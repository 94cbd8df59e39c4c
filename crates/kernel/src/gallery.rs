use gallery_assets::{ingest, ImageRegistry, IngestReport, TextureHost, UploadedFile};
use gallery_common::{ArtworkDescriptor, ImageHandle, LayoutConfig, RoomBounds};
use gallery_layout::{LayoutEngine, LayoutPlan, Placement};

/// Events kept before the oldest are discarded.
pub const EVENT_LOG_LIMIT: usize = 1024;

/// A record produced by every mutation of the gallery.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    /// An artwork joined the end of the list.
    Appended { handle: ImageHandle, title: String },
    /// An artwork left the list and its handle was released.
    Removed { handle: ImageHandle },
    /// Placements were recomputed.
    Relaid { placed: usize, dropped: usize },
    /// Session ended; every handle was released.
    TornDown { released: usize },
}

/// A descriptor paired with the placement it currently has.
#[derive(Debug, Clone, Copy)]
pub struct Artwork<'a> {
    pub descriptor: &'a ArtworkDescriptor,
    pub placement: &'a Placement,
}

/// The authoritative gallery state.
///
/// Owns the ordered descriptor list, the image handles behind it and the
/// placements derived from it. Renderers read from it; they never write.
#[derive(Debug)]
pub struct Gallery {
    room: RoomBounds,
    engine: LayoutEngine,
    descriptors: Vec<ArtworkDescriptor>,
    plan: LayoutPlan,
    images: ImageRegistry,
    event_log: Vec<GalleryEvent>,
}

impl Gallery {
    pub fn new(room: RoomBounds, layout: LayoutConfig) -> Self {
        Self {
            room,
            engine: LayoutEngine::new(room, layout),
            descriptors: Vec::new(),
            plan: LayoutPlan::default(),
            images: ImageRegistry::new(),
            event_log: Vec::new(),
        }
    }

    pub fn room(&self) -> &RoomBounds {
        &self.room
    }

    /// Number of artworks in the list, on display or not.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[ArtworkDescriptor] {
        &self.descriptors
    }

    pub fn placements(&self) -> &[Placement] {
        &self.plan.placements
    }

    /// Artworks that did not fit on the walls.
    pub fn dropped(&self) -> usize {
        self.plan.dropped
    }

    pub fn capacity(&self) -> usize {
        self.engine.capacity()
    }

    /// Artworks on display, in slot order.
    pub fn artworks(&self) -> impl Iterator<Item = Artwork<'_>> {
        self.descriptors
            .iter()
            .zip(&self.plan.placements)
            .map(|(descriptor, placement)| Artwork {
                descriptor,
                placement,
            })
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[GalleryEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<GalleryEvent> {
        std::mem::take(&mut self.event_log)
    }

    fn record(&mut self, event: GalleryEvent) {
        if self.event_log.len() >= EVENT_LOG_LIMIT {
            let excess = self.event_log.len() + 1 - EVENT_LOG_LIMIT;
            self.event_log.drain(..excess);
        }
        self.event_log.push(event);
    }

    /// Ingest a batch of files and append the accepted images.
    ///
    /// The layout is recomputed once for the whole batch, before this
    /// returns, so no render can observe a partial layout.
    pub fn upload(
        &mut self,
        files: impl IntoIterator<Item = UploadedFile>,
        host: &mut dyn TextureHost,
    ) -> IngestReport {
        let report = ingest(files, &mut self.images, host);
        if report.descriptors.is_empty() {
            return report;
        }
        for d in &report.descriptors {
            self.record(GalleryEvent::Appended {
                handle: d.handle(),
                title: d.title().to_string(),
            });
        }
        self.descriptors.extend(report.descriptors.iter().cloned());
        self.relayout();
        report
    }

    /// Remove an artwork and release its image. Returns the descriptor if it
    /// was in the gallery.
    pub fn remove(
        &mut self,
        handle: ImageHandle,
        host: &mut dyn TextureHost,
    ) -> Option<ArtworkDescriptor> {
        let index = self.descriptors.iter().position(|d| d.handle() == handle)?;
        let removed = self.descriptors.remove(index);
        self.images.release(handle, host);
        self.record(GalleryEvent::Removed { handle });
        tracing::info!(handle = %handle.short(), title = removed.title(), "artwork removed");
        self.relayout();
        Some(removed)
    }

    /// End the session: release every image and empty the gallery.
    pub fn teardown(&mut self, host: &mut dyn TextureHost) -> usize {
        let released = self.images.release_all(host);
        self.descriptors.clear();
        self.plan = LayoutPlan::default();
        self.record(GalleryEvent::TornDown { released });
        released
    }

    fn relayout(&mut self) {
        self.plan = self.engine.plan(&self.descriptors);
        let placed = self.plan.placements.len();
        let dropped = self.plan.dropped;
        if dropped > 0 {
            tracing::warn!(
                dropped,
                capacity = self.capacity(),
                "not every artwork fits on the walls"
            );
        }
        tracing::debug!(placed, dropped, "gallery relaid");
        self.record(GalleryEvent::Relaid { placed, dropped });
    }

    /// Deterministic hash of the current placements, for comparing layouts.
    pub fn layout_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for p in &self.plan.placements {
            mix(&mut h, &(p.slot as u64).to_le_bytes());
            mix(&mut h, &p.position.x.to_le_bytes());
            mix(&mut h, &p.position.y.to_le_bytes());
            mix(&mut h, &p.position.z.to_le_bytes());
            mix(&mut h, &p.yaw.to_le_bytes());
            mix(&mut h, &p.frame_size.x.to_le_bytes());
            mix(&mut h, &p.frame_size.y.to_le_bytes());
        }
        h
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(RoomBounds::default(), LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_assets::HeadlessTextureHost;
    use gallery_common::Wall;
    use glam::Vec3;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_file(name: &str, width: u32, height: u32) -> UploadedFile {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        UploadedFile::new(name, "image/png", buf.into_inner())
    }

    fn batch(n: usize) -> Vec<UploadedFile> {
        (0..n).map(|i| png_file(&format!("img{i}.png"), 4 + i as u32, 4)).collect()
    }

    #[test]
    fn gallery_starts_empty() {
        let g = Gallery::default();
        assert!(g.is_empty());
        assert!(g.placements().is_empty());
        assert_eq!(g.capacity(), 17);
    }

    #[test]
    fn upload_appends_and_relays() {
        let mut g = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        g.upload(
            vec![
                png_file("A.png", 20, 10),
                png_file("B.png", 10, 10),
                png_file("C.png", 15, 10),
            ],
            &mut host,
        );

        let titles: Vec<&str> = g.descriptors().iter().map(|d| d.title()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
        assert_eq!(g.placements().len(), 3);
        assert_eq!(g.placements()[0].position, Vec3::new(0.0, 2.0, -9.5));
        assert_eq!(g.placements()[0].wall, Wall::Front);
        g.teardown(&mut host);
    }

    #[test]
    fn later_uploads_go_to_the_end() {
        let mut g = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        g.upload([png_file("first.png", 8, 8)], &mut host);
        g.upload([png_file("second.png", 8, 8)], &mut host);

        assert_eq!(g.descriptors()[0].title(), "first");
        assert_eq!(g.descriptors()[1].title(), "second");
        assert_eq!(g.placements()[0].wall, Wall::Front);
        assert_eq!(g.placements()[0].position.x, 0.0);
        g.teardown(&mut host);
    }

    #[test]
    fn non_images_leave_gallery_untouched() {
        let mut g = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        let report = g.upload(
            [UploadedFile::new("notes.txt", "text/plain", b"x".to_vec())],
            &mut host,
        );
        assert_eq!(report.skipped.len(), 1);
        assert!(g.is_empty());
        assert!(g.events().is_empty());
    }

    #[test]
    fn remove_releases_once_and_shifts_layout() {
        let mut g = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        g.upload(batch(3), &mut host);
        let first = g.descriptors()[0].handle();
        let second = g.descriptors()[1].handle();

        assert!(g.remove(first, &mut host).is_some());
        assert!(g.remove(first, &mut host).is_none());
        assert_eq!(host.release_count(first), 1);

        // The former second artwork now greets at the entrance.
        assert_eq!(g.descriptors()[0].handle(), second);
        assert_eq!(g.placements()[0].position, Vec3::new(0.0, 2.0, -9.5));
        assert_eq!(g.placements().len(), 2);

        g.teardown(&mut host);
        assert_eq!(host.release_count(first), 1);
        assert_eq!(host.release_count(second), 1);
    }

    #[test]
    fn teardown_releases_everything_exactly_once() {
        let mut g = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        g.upload(batch(5), &mut host);
        let handles: Vec<_> = g.descriptors().iter().map(|d| d.handle()).collect();

        assert_eq!(g.teardown(&mut host), 5);
        assert_eq!(g.teardown(&mut host), 0);
        assert!(g.is_empty());
        assert!(g.placements().is_empty());
        assert_eq!(host.live(), 0);
        for h in handles {
            assert_eq!(host.release_count(h), 1);
        }
    }

    #[test]
    fn overflow_is_reported() {
        let mut g = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        g.upload(batch(20), &mut host);
        assert_eq!(g.len(), 20);
        assert_eq!(g.placements().len(), 17);
        assert_eq!(g.dropped(), 3);
        assert_eq!(g.artworks().count(), 17);
        assert!(matches!(
            g.events().last(),
            Some(GalleryEvent::Relaid { placed: 17, dropped: 3 })
        ));
        g.teardown(&mut host);
    }

    #[test]
    fn events_are_recorded() {
        let mut g = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        g.upload(batch(2), &mut host);
        let h = g.descriptors()[0].handle();
        g.remove(h, &mut host);
        g.teardown(&mut host);
        // 2 appends + relayout, remove + relayout, teardown
        assert_eq!(g.events().len(), 6);
        assert_eq!(g.drain_events().len(), 6);
        assert!(g.events().is_empty());
    }

    #[test]
    fn undrained_event_log_is_bounded() {
        let mut g = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        for _ in 0..EVENT_LOG_LIMIT {
            g.upload(batch(1), &mut host);
            let h = g.descriptors()[0].handle();
            g.remove(h, &mut host);
        }
        assert_eq!(g.events().len(), EVENT_LOG_LIMIT);
        // Four events per round; the window still starts on a round boundary.
        assert!(matches!(g.events().first(), Some(GalleryEvent::Appended { .. })));
        assert!(matches!(
            g.events().last(),
            Some(GalleryEvent::Relaid { placed: 0, dropped: 0 })
        ));
        g.teardown(&mut host);
    }

    #[test]
    fn layout_hash_depends_only_on_geometry() {
        let mut g1 = Gallery::default();
        let mut g2 = Gallery::default();
        let mut host = HeadlessTextureHost::new();
        g1.upload(batch(6), &mut host);
        g2.upload(batch(6), &mut host);
        assert_eq!(g1.layout_hash(), g2.layout_hash());

        g2.upload([png_file("extra.png", 1, 3)], &mut host);
        assert_ne!(g1.layout_hash(), g2.layout_hash());
        g1.teardown(&mut host);
        g2.teardown(&mut host);
    }
}
