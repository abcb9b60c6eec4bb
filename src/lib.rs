//! Tensor Interop - conversions between DataFrames, tensors and images
//!
//! Two independent conversion pairs:
//! - DataFrame <-> rank-2 tensor ([`dataframe_to_tensor`], [`tensor_to_dataframe`])
//! - rank-3 normalized tensor <-> PNG/JPEG bytes ([`tensor_to_image`],
//!   [`image_to_tensor`]), routed through a [`RasterBackend`] surface
//!
//! # Example
//! ```no_run
//! use tensor_interop::{
//!     dataframe_to_tensor, image_to_tensor, tensor_to_image, ConversionConfig, DataFrame,
//!     SoftwareCanvas,
//! };
//!
//! # async fn run() -> tensor_interop::Result<()> {
//! let df = DataFrame::from_json(r#"[{"a":1,"b":2},{"a":3,"b":4}]"#)?;
//! let table = dataframe_to_tensor(&df)?;
//! assert_eq!(table.shape(), &[2, 2]);
//!
//! let config = ConversionConfig::from_yaml("tensor-interop.yaml")?;
//! let canvas = SoftwareCanvas::from_config(&config);
//! let pixels = tensor_interop::Tensor::from_elem(vec![8, 8, 3], 1.0);
//! let png = tensor_to_image(&canvas, &pixels, &config.encode_options()).await?;
//! let back = image_to_tensor(&canvas, &png, &config.decode_options()).await?;
//! assert_eq!(back.shape(), &[8, 8, 3]);
//! # Ok(())
//! # }
//! ```

pub use tensor_interop_common::{
    denormalize, normalize, ChannelMode, ConversionConfig, ConversionError, DecodeOptions,
    EncodeOptions, EncodedImage, ErrorCategory, ImageMime, Result, Tensor, DEFAULT_JPEG_QUALITY,
};
pub use tensor_interop_image::{image_to_tensor, pixels_to_tensor, tensor_to_image, tensor_to_pixels};
pub use tensor_interop_raster::{
    DecodedImage, ObjectUrl, PixelBuffer, RasterBackend, SoftwareCanvas, Surface, UrlRegistry,
};
pub use tensor_interop_tabular::{
    coerce_value, dataframe_to_tensor, tensor_to_dataframe, tensor_to_dataframe_sync, DataFrame,
    Row,
};
