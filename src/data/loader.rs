use std::path::Path;

use anyhow::{Context, Result, bail};
use ndarray::Array3;

use super::model::{Annotation, Image, TabularData};

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Load an image file as luma intensities in `0.0..=255.0`.
pub fn load_image(path: &Path) -> Result<Image> {
    let gray = image::open(path)
        .with_context(|| format!("opening image {}", path.display()))?
        .to_luma8();
    let (width, height) = gray.dimensions();
    Ok(Image::from_shape_fn((height as usize, width as usize), |(r, c)| {
        gray.get_pixel(c as u32, r as u32)[0] as f64
    }))
}

/// Write an image with values clamped to `0..=255`.
pub fn save_image(path: &Path, image: &Image) -> Result<()> {
    let (rows, cols) = image.dim();
    let gray = image::GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        image::Luma([image[[y as usize, x as usize]].round().clamp(0.0, 255.0) as u8])
    });
    gray.save(path)
        .with_context(|| format!("writing image {}", path.display()))
}

/// Write a captured figure (`rows x cols x 3`) as PNG.
pub fn save_capture_png(path: &Path, pixels: &Array3<u8>) -> Result<()> {
    let (rows, cols, channels) = pixels.dim();
    if channels != 3 {
        bail!("expected an RGB capture, got {channels} channels");
    }
    let rgb = image::RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
        let (r, c) = (y as usize, x as usize);
        image::Rgb([pixels[[r, c, 0]], pixels[[r, c, 1]], pixels[[r, c, 2]]])
    });
    rgb.save(path)
        .with_context(|| format!("writing figure {}", path.display()))
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

/// Load an annotation.  Dispatch by extension.
///
/// Supported formats:
/// * `.png` – luma label image, pixel value = label
/// * `.csv` – comma-separated integer grid, no header
pub fn load_annotation(path: &Path) -> Result<Annotation> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "png" => load_annotation_png(path),
        "csv" => load_annotation_csv(path),
        other => bail!("Unsupported annotation extension: .{other}"),
    }
}

fn load_annotation_png(path: &Path) -> Result<Annotation> {
    let decoded = image::open(path)
        .with_context(|| format!("opening annotation {}", path.display()))?;
    let (width, height) = (decoded.width(), decoded.height());
    let shape = (height as usize, width as usize);

    // 16-bit label images keep their raw values; everything else is read as 8-bit luma.
    let annotation = match decoded {
        image::DynamicImage::ImageLuma16(labels) => Annotation::from_shape_fn(shape, |(r, c)| {
            labels.get_pixel(c as u32, r as u32)[0] as i64
        }),
        other => {
            let labels = other.to_luma8();
            Annotation::from_shape_fn(shape, |(r, c)| labels.get_pixel(c as u32, r as u32)[0] as i64)
        }
    };
    Ok(annotation)
}

fn load_annotation_csv(path: &Path) -> Result<Annotation> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening annotation CSV")?;

    let mut values = Vec::new();
    let mut cols = None;
    let mut rows = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        match cols {
            None => cols = Some(record.len()),
            Some(n) if n != record.len() => {
                bail!("CSV row {row_no}: expected {n} labels, found {}", record.len())
            }
            Some(_) => {}
        }
        for (j, field) in record.iter().enumerate() {
            let label = field
                .parse::<i64>()
                .with_context(|| format!("Row {row_no}, column {j}: '{field}' is not an integer"))?;
            values.push(label);
        }
        rows += 1;
    }

    Annotation::from_shape_vec((rows, cols.unwrap_or(0)), values)
        .context("assembling annotation grid")
}

/// Write an annotation as a comma-separated integer grid.
pub fn save_annotation_csv(path: &Path, annotation: &Annotation) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating annotation CSV")?;
    for row in annotation.rows() {
        writer
            .write_record(row.iter().map(|l| l.to_string()))
            .context("writing annotation row")?;
    }
    writer.flush().context("flushing annotation CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tabular export
// ---------------------------------------------------------------------------

/// Write `(X, y)` as CSV: one column per feature, then `label`.
pub fn write_tabular_csv<S: AsRef<str>>(
    path: &Path,
    data: &TabularData,
    feature_names: &[S],
) -> Result<()> {
    if feature_names.len() != data.n_features() {
        bail!(
            "{} feature names for {} feature columns",
            feature_names.len(),
            data.n_features()
        );
    }

    let mut writer = csv::Writer::from_path(path).context("creating tabular CSV")?;
    let header: Vec<&str> = feature_names
        .iter()
        .map(|n| n.as_ref())
        .chain(std::iter::once("label"))
        .collect();
    writer.write_record(&header).context("writing CSV header")?;

    for (row, label) in data.x.rows().into_iter().zip(data.y.iter()) {
        let record = row
            .iter()
            .map(|v| v.to_string())
            .chain(std::iter::once(label.to_string()));
        writer.write_record(record).context("writing CSV row")?;
    }
    writer.flush().context("flushing tabular CSV")?;
    Ok(())
}
