//! Off-screen drawing surfaces and RGBA pixel buffers

use image::{imageops, RgbaImage};
use tensor_interop_common::{ConversionError, Result};

/// RGBA8 pixels plus their width and height, the `ImageData` of a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Wrap `width * height * 4` RGBA bytes
    ///
    /// # Errors
    /// Returns [`ConversionError::InvalidPixelBuffer`] if the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        let image = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            ConversionError::InvalidPixelBuffer(format!(
                "{width}x{height} RGBA needs {expected} bytes, got {actual}"
            ))
        })?;
        Ok(Self { image })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Row-major RGBA bytes
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.image.into_raw()
    }
}

/// A decoded, drawable image with its natural dimensions
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: RgbaImage,
}

impl DecodedImage {
    #[must_use]
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    #[must_use]
    pub fn natural_width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn natural_height(&self) -> u32 {
        self.image.height()
    }
}

/// Off-screen RGBA surface, initially transparent black
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Current surface contents
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Overwrite pixels starting at (x, y); parts outside the surface are clipped
    pub fn put_image_data(&mut self, data: &PixelBuffer, x: i64, y: i64) {
        imageops::replace(&mut self.pixels, &data.image, x, y);
    }

    /// Draw `image` with its top-left corner at (x, y)
    ///
    /// Uses copy compositing: destination pixels under the image are replaced,
    /// alpha included.
    pub fn draw_image(&mut self, image: &DecodedImage, x: i64, y: i64) {
        imageops::replace(&mut self.pixels, &image.image, x, y);
    }

    /// Read back a rectangle of RGBA pixels
    ///
    /// # Errors
    /// Returns [`ConversionError::InvalidPixelBuffer`] if the rectangle is not
    /// inside the surface.
    pub fn get_image_data(&self, x: u32, y: u32, width: u32, height: u32) -> Result<PixelBuffer> {
        let fits = x.checked_add(width).is_some_and(|r| r <= self.width())
            && y.checked_add(height).is_some_and(|b| b <= self.height());
        if !fits {
            return Err(ConversionError::InvalidPixelBuffer(format!(
                "region {width}x{height}+{x}+{y} outside {}x{} surface",
                self.width(),
                self.height()
            )));
        }
        let image = imageops::crop_imm(&self.pixels, x, y, width, height).to_image();
        Ok(PixelBuffer { image })
    }
}
