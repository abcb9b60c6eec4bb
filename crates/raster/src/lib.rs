//! Raster/canvas abstraction used by the image converters
//!
//! A [`RasterBackend`] provides off-screen [`Surface`]s, asynchronous
//! encoding of a surface to PNG/JPEG bytes, and asynchronous decoding of
//! bytes registered behind an [`ObjectUrl`]. [`SoftwareCanvas`] is the
//! in-process implementation on top of the `image` crate.

pub mod software;
pub mod surface;
pub mod url;

pub use software::SoftwareCanvas;
pub use surface::{DecodedImage, PixelBuffer, Surface};
pub use url::{ObjectUrl, UrlRegistry};

use async_trait::async_trait;
use tensor_interop_common::{EncodedImage, ImageMime, Result};

/// Drawing surfaces plus image codecs
#[async_trait]
pub trait RasterBackend: Send + Sync {
    /// Allocate a transparent surface of the given size
    fn create_surface(&self, width: u32, height: u32) -> Result<Surface>;

    /// Register encoded bytes for decoding; released when the URL is dropped
    fn create_object_url(&self, image: &EncodedImage) -> ObjectUrl;

    /// Decode the bytes behind `url`, resolving once decoding has finished
    async fn decode(&self, url: &ObjectUrl) -> Result<DecodedImage>;

    /// Encode surface contents; `quality` in [0, 1] applies to lossy formats only
    async fn encode(
        &self,
        surface: &Surface,
        mime: ImageMime,
        quality: Option<f32>,
    ) -> Result<EncodedImage>;
}
