//! Conversion between rank-3 normalized tensors and encoded images
//!
//! Tensors are `[height, width, channels]` with intensities in [0, 1]. Both
//! directions go through an off-screen surface of a [`RasterBackend`]:
//!
//! - tensor -> image: denormalize into an RGBA [`PixelBuffer`], put it on a
//!   surface, encode the surface as PNG or JPEG
//! - image -> tensor: register the bytes behind an object URL, decode, draw
//!   onto a surface, read the pixels back and normalize them
//!
//! # Example
//! ```no_run
//! use tensor_interop_common::{DecodeOptions, EncodeOptions, Tensor};
//! use tensor_interop_image::{image_to_tensor, tensor_to_image};
//! use tensor_interop_raster::SoftwareCanvas;
//!
//! # async fn run() -> tensor_interop_common::Result<()> {
//! let canvas = SoftwareCanvas::new();
//! let tensor = Tensor::from_elem(vec![4, 4, 3], 0.5);
//!
//! let png = tensor_to_image(&canvas, &tensor, &EncodeOptions::png()).await?;
//! let restored = image_to_tensor(&canvas, &png, &DecodeOptions::default()).await?;
//! assert_eq!(restored.shape(), &[4, 4, 3]);
//! # Ok(())
//! # }
//! ```

use ndarray::{Array, Axis, IxDyn};
use std::future::Future;
use std::time::Duration;
use tensor_interop_common::{
    denormalize, normalize, ChannelMode, ConversionError, DecodeOptions, EncodeOptions,
    EncodedImage, Result, Tensor,
};
use tensor_interop_raster::{PixelBuffer, RasterBackend};
use tracing::debug;

/// Error message for tensors that are not rank 3
pub const NOT_3D_MESSAGE: &str = "Only 3D tensors can be converted to an image";

/// Encode a `[H, W, C]` tensor as an image
///
/// `C` must equal `options.channels` (3 unless RGBA was requested). Every
/// channel is denormalized once; RGB input gets an opaque alpha.
///
/// # Errors
/// - [`ConversionError::InvalidShape`] / [`ConversionError::ChannelMismatch`]
///   before any work is done
/// - [`ConversionError::SurfaceUnavailable`] if the backend has no surface of that size
/// - [`ConversionError::EncodeFailed`] if encoding fails or yields no bytes
/// - [`ConversionError::Timeout`] if `options.timeout` elapses first
pub async fn tensor_to_image<B>(
    backend: &B,
    tensor: &Tensor,
    options: &EncodeOptions,
) -> Result<EncodedImage>
where
    B: RasterBackend + ?Sized,
{
    let buffer = tensor_to_pixels(tensor, options.channels)?;

    let mut surface = backend.create_surface(buffer.width(), buffer.height())?;
    surface.put_image_data(&buffer, 0, 0);

    let encoded = with_timeout(
        "encode",
        options.timeout,
        backend.encode(&surface, options.mime, options.quality),
    )
    .await?;

    if encoded.is_empty() {
        return Err(ConversionError::EncodeFailed(
            "encoder produced no output".to_string(),
        ));
    }

    debug!(
        "tensor {:?} -> {} ({} bytes)",
        tensor.shape(),
        encoded.mime,
        encoded.len()
    );
    Ok(encoded)
}

/// Decode an image into a `[H, W, C]` tensor with values in [0, 1]
///
/// The object URL holding the bytes is released after the pixels are read,
/// or on whichever error ends the call first.
///
/// # Errors
/// - [`ConversionError::DecodeFailed`] with the decoder's message
/// - [`ConversionError::SurfaceUnavailable`] if no surface of the image's size exists
/// - [`ConversionError::Timeout`] if `options.timeout` elapses before decoding finishes
pub async fn image_to_tensor<B>(
    backend: &B,
    image: &EncodedImage,
    options: &DecodeOptions,
) -> Result<Tensor>
where
    B: RasterBackend + ?Sized,
{
    let url = backend.create_object_url(image);
    let decoded = with_timeout("decode", options.timeout, backend.decode(&url)).await?;

    let (width, height) = (decoded.natural_width(), decoded.natural_height());
    let mut surface = backend.create_surface(width, height)?;
    surface.draw_image(&decoded, 0, 0);
    let pixels = surface.get_image_data(0, 0, width, height)?;
    url.revoke();

    let tensor = pixels_to_tensor(&pixels, options.channels)?;
    debug!("{} ({} bytes) -> tensor {:?}", image.mime, image.len(), tensor.shape());
    Ok(tensor)
}

/// Denormalize a `[H, W, C]` tensor into an RGBA pixel buffer
///
/// # Errors
/// Fails if the tensor is not rank 3, its channel axis differs from
/// `channels`, or its size does not fit a pixel buffer.
pub fn tensor_to_pixels(tensor: &Tensor, channels: ChannelMode) -> Result<PixelBuffer> {
    let (height, width) = validate_image_tensor(tensor, channels)?;

    let mut rgba = Vec::with_capacity(height as usize * width as usize * 4);
    for pixel in tensor.lanes(Axis(2)) {
        rgba.extend(pixel.iter().map(|&v| denormalize(v)));
        if channels == ChannelMode::Rgb {
            rgba.push(u8::MAX);
        }
    }

    PixelBuffer::from_raw(width, height, rgba)
}

/// Normalize an RGBA pixel buffer into a `[H, W, C]` tensor
pub fn pixels_to_tensor(pixels: &PixelBuffer, channels: ChannelMode) -> Result<Tensor> {
    let count = channels.count();
    let values: Vec<f32> = pixels
        .as_raw()
        .chunks_exact(4)
        .flat_map(|px| px[..count].iter().map(|&v| normalize(v)))
        .collect();

    let shape = [pixels.height() as usize, pixels.width() as usize, count];
    Ok(Array::from_shape_vec(IxDyn(&shape), values)?)
}

/// Returns `(height, width)` of a valid image tensor
fn validate_image_tensor(tensor: &Tensor, channels: ChannelMode) -> Result<(u32, u32)> {
    if tensor.ndim() != 3 {
        return Err(ConversionError::InvalidShape(NOT_3D_MESSAGE.to_string()));
    }

    let shape = tensor.shape();
    if shape[2] != channels.count() {
        return Err(ConversionError::ChannelMismatch {
            expected: channels.count(),
            actual: shape[2],
        });
    }

    let dimension = |len: usize| {
        u32::try_from(len).map_err(|_| {
            ConversionError::InvalidShape(format!("image dimension {len} does not fit in u32"))
        })
    };
    Ok((dimension(shape[0])?, dimension(shape[1])?))
}

async fn with_timeout<T, F>(operation: &'static str, timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| ConversionError::Timeout { operation, after })?,
        None => fut.await,
    }
}
