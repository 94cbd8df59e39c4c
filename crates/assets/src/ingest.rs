use gallery_common::ArtworkDescriptor;
use std::path::Path;

use crate::registry::{ImageRegistry, TextureHost};

/// Errors from reading or decoding an uploaded file.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] image::ImageError),
}

/// A file the user submitted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk; the MIME type comes from its extension.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime_for_path(path), bytes))
    }
}

/// MIME type for a path, by extension. Unknown extensions are not images.
pub fn mime_for_path(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// File name without its last extension: `"sunset.final.png"` -> `"sunset.final"`.
pub fn title_from_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

/// Outcome of one ingestion batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// New descriptors in submission order.
    pub descriptors: Vec<ArtworkDescriptor>,
    /// Names of files skipped for not being images.
    pub skipped: Vec<String>,
    /// Files that claimed to be images but could not be decoded.
    pub failed: Vec<(String, AssetError)>,
}

/// Decode every image file, bind its pixels to a new handle and describe it.
///
/// Non-image files are skipped without error. A handle is acquired only for
/// files that decode.
pub fn ingest(
    files: impl IntoIterator<Item = UploadedFile>,
    registry: &mut ImageRegistry,
    host: &mut dyn TextureHost,
) -> IngestReport {
    let _span = tracing::info_span!("ingest").entered();
    let mut report = IngestReport::default();

    for file in files {
        if !is_image_mime(&file.mime_type) {
            tracing::debug!(name = %file.name, mime = %file.mime_type, "skipping non-image file");
            report.skipped.push(file.name);
            continue;
        }

        let pixels = match image::load_from_memory(&file.bytes) {
            Ok(decoded) => decoded.to_rgba8(),
            Err(e) => {
                tracing::warn!(name = %file.name, "could not decode image: {e}");
                report.failed.push((file.name, e.into()));
                continue;
            }
        };

        let (width, height) = pixels.dimensions();
        let handle = registry.acquire(&file.name);
        host.upload(handle, &pixels);
        report.descriptors.push(ArtworkDescriptor::from_dimensions(
            handle,
            width,
            height,
            title_from_file_name(&file.name),
        ));
        tracing::debug!(name = %file.name, width, height, "image accepted");
    }

    tracing::info!(
        accepted = report.descriptors.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "ingest complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HeadlessTextureHost;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn titles_strip_last_extension() {
        assert_eq!(title_from_file_name("sunset.png"), "sunset");
        assert_eq!(title_from_file_name("a.b.jpeg"), "a.b");
        assert_eq!(title_from_file_name("noext"), "noext");
        assert_eq!(title_from_file_name("trailing."), "trailing.");
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("x.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("x.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("notes.txt")), "application/octet-stream");
        assert!(is_image_mime("image/webp"));
        assert!(!is_image_mime("text/plain"));
    }

    #[test]
    fn accepts_images_and_skips_others() {
        let mut registry = ImageRegistry::new();
        let mut host = HeadlessTextureHost::new();
        let files = vec![
            UploadedFile::new("wide.png", "image/png", png(40, 20)),
            UploadedFile::new("readme.txt", "text/plain", b"hello".to_vec()),
            UploadedFile::new("square.png", "image/png", png(8, 8)),
        ];

        let report = ingest(files, &mut registry, &mut host);
        assert_eq!(report.descriptors.len(), 2);
        assert_eq!(report.skipped, vec!["readme.txt".to_string()]);
        assert!(report.failed.is_empty());

        let wide = &report.descriptors[0];
        assert_eq!(wide.title(), "wide");
        assert_eq!(wide.aspect_ratio(), 2.0);
        assert_eq!(host.dimensions(wide.handle()), Some((40, 20)));
        assert_eq!(report.descriptors[1].aspect_ratio(), 1.0);
        assert_eq!(registry.len(), 2);

        registry.release_all(&mut host);
    }

    #[test]
    fn undecodable_image_gets_no_handle() {
        let mut registry = ImageRegistry::new();
        let mut host = HeadlessTextureHost::new();
        let files = vec![UploadedFile::new("broken.png", "image/png", vec![0, 1, 2, 3])];
        let report = ingest(files, &mut registry, &mut host);
        assert!(report.descriptors.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, AssetError::Decode(_)));
        assert!(registry.is_empty());
        assert_eq!(host.live(), 0);
    }

    #[test]
    fn read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hall.png");
        std::fs::write(&path, png(3, 6)).unwrap();

        let file = UploadedFile::read(&path).unwrap();
        assert_eq!(file.name, "hall.png");
        assert_eq!(file.mime_type, "image/png");

        let mut registry = ImageRegistry::new();
        let mut host = HeadlessTextureHost::new();
        let report = ingest([file], &mut registry, &mut host);
        assert_eq!(report.descriptors[0].aspect_ratio(), 0.5);
        registry.release_all(&mut host);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = UploadedFile::read("/no/such/image.png").unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }
}
