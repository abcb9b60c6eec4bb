//! End-to-end conversion suite: DataFrame -> tensor -> image and back

use anyhow::Result;
use serde_json::json;
use tensor_interop::{
    dataframe_to_tensor, image_to_tensor, tensor_to_dataframe, tensor_to_image, ConversionConfig,
    ConversionError, DataFrame, ImageMime, SoftwareCanvas, Tensor,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn test_dataframe_roundtrip() -> Result<()> {
    init_tracing();
    let df = DataFrame::from_json(r#"[{"a":1,"b":2},{"a":3,"b":4}]"#)?;

    let tensor = dataframe_to_tensor(&df)?;
    assert_eq!(tensor.shape(), &[2, 2]);
    assert_eq!(tensor, ndarray::arr2(&[[1.0_f32, 2.0], [3.0, 4.0]]).into_dyn());

    let columns = names(&["a", "b"]);
    let back = tensor_to_dataframe(&tensor, Some(columns.as_slice())).await?;
    assert_eq!(back, df);
    assert_eq!(
        serde_json::to_value(back.to_records())?,
        json!([{"a": 1, "b": 2}, {"a": 3, "b": 4}])
    );
    Ok(())
}

#[tokio::test]
async fn test_shape_invariant_over_many_frames() -> Result<()> {
    for rows in 0..4usize {
        for cols in 1..4usize {
            let records: Vec<serde_json::Value> = (0..rows)
                .map(|r| {
                    let row: serde_json::Map<_, _> = (0..cols)
                        .map(|c| (format!("c{c}"), json!(r * cols + c)))
                        .collect();
                    serde_json::Value::Object(row)
                })
                .collect();
            let df = DataFrame::from_json(&serde_json::to_string(&records)?)?;
            let tensor = dataframe_to_tensor(&df)?;
            assert_eq!(tensor.shape(), &[df.row_count(), df.column_count()]);
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_tensor_to_dataframe_rank_error() {
    let cube = Tensor::zeros(vec![2, 2, 3]);
    let err = tensor_to_dataframe(&cube, None).await.unwrap_err();
    assert!(matches!(err, ConversionError::InvalidShape(_)));
    assert_eq!(
        err.to_string(),
        "Only 2D tensors can be converted to a DataFrame"
    );
}

#[tokio::test]
async fn test_table_through_image_and_back() -> Result<()> {
    init_tracing();
    // A 2x2 "image" stored as a table of r/g/b rows, one row per pixel
    let df = DataFrame::from_json(
        r#"[{"r":1,"g":0,"b":0},{"r":0,"g":1,"b":0},{"r":0,"g":0,"b":1},{"r":1,"g":1,"b":0}]"#,
    )?;
    let flat = dataframe_to_tensor(&df)?;
    let image_tensor = flat.into_shape_with_order(vec![2, 2, 3])?;

    let canvas = SoftwareCanvas::new();
    let config = ConversionConfig::default();
    let png = tensor_to_image(&canvas, &image_tensor, &config.encode_options()).await?;
    assert_eq!(png.mime, ImageMime::Png);

    let decoded = image_to_tensor(&canvas, &png, &config.decode_options()).await?;
    let table = decoded.into_shape_with_order(vec![4, 3])?;
    let back = tensor_to_dataframe(&table, Some(df.columns())).await?;

    assert_eq!(back, df);
    Ok(())
}

#[tokio::test]
async fn test_config_driven_jpeg() -> Result<()> {
    let config = ConversionConfig::from_yaml_str("mime: image/jpeg\njpeg_quality: 0.75\n")?;
    let canvas = SoftwareCanvas::from_config(&config);
    let tensor = Tensor::from_elem(vec![8, 8, 3], 0.5);

    let jpeg = tensor_to_image(&canvas, &tensor, &config.encode_options()).await?;
    assert_eq!(jpeg.mime, ImageMime::Jpeg);

    let decoded = image_to_tensor(&canvas, &jpeg, &config.decode_options()).await?;
    assert_eq!(decoded.shape(), &[8, 8, 3]);
    assert!(decoded.iter().all(|v| (v - 0.5).abs() < 0.1));
    Ok(())
}

#[test]
fn test_bundled_config_parses() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tensor-interop.yaml");
    let config = ConversionConfig::from_yaml(path)?;
    assert_eq!(config.mime, ImageMime::Png);
    assert_eq!(config.timeout(), Some(std::time::Duration::from_secs(5)));
    Ok(())
}
