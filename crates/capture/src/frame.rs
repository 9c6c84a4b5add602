use base64::Engine as _;
use layers::OverlaySpec;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("render failed: {0}")]
    Render(String),
    #[error("image encode/decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("frame buffer size does not match dimensions")]
    BadBuffer,
}

/// A captured frame held in memory as encoded PNG.
///
/// Handles are transient: they live as long as the modal/session that
/// produced them and are never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl CapturedImage {
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, FrameError> {
        let buffer: image::RgbaImage =
            image::ImageBuffer::from_raw(width, height, rgba.to_vec())
                .ok_or(FrameError::BadBuffer)?;
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(buffer)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(Self { width, height, png })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }

    /// `data:image/png;base64,...` form for embedding.
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }

    pub fn to_rgba(&self) -> Result<image::RgbaImage, FrameError> {
        Ok(image::load_from_memory(&self.png)?.to_rgba8())
    }
}

/// The seam between capture flows and whatever renders the scene.
///
/// Flows check `generation`/`is_destroyed` before every scene mutation so a
/// viewer torn down mid-flow aborts the flow instead of being poked at.
#[allow(async_fn_in_trait)]
pub trait SceneFrame {
    /// Viewer generation at the time of the call; changes on teardown.
    fn generation(&self) -> u64;

    fn is_destroyed(&self) -> bool;

    /// Every imagery layer ready AND base globe tiles loaded.
    fn imagery_ready(&self) -> bool;

    fn attached_overlay(&self) -> Option<OverlaySpec>;

    fn apply_overlay(&mut self, spec: &OverlaySpec);

    async fn render(&mut self) -> Result<(), FrameError>;

    fn capture_frame(&mut self) -> Result<CapturedImage, FrameError>;
}

/// True once the viewer this flow started against is gone or replaced.
pub fn flow_aborted<S: SceneFrame>(scene: &S, generation: u64) -> bool {
    scene.is_destroyed() || scene.generation() != generation
}

#[cfg(test)]
mod tests {
    use super::CapturedImage;

    #[test]
    fn rgba_round_trip_preserves_dimensions() {
        let rgba = vec![255u8; 8 * 4 * 4];
        let img = CapturedImage::from_rgba(8, 4, &rgba).unwrap();
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 4);
        let decoded = img.to_rgba().unwrap();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        assert!(CapturedImage::from_rgba(10, 10, &[0u8; 4]).is_err());
    }

    #[test]
    fn data_uri_is_png_base64() {
        let img = CapturedImage::from_rgba(1, 1, &[1, 2, 3, 255]).unwrap();
        assert!(img.data_uri().starts_with("data:image/png;base64,"));
        assert!(!img.is_empty());
    }
}
