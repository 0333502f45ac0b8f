use std::path::Path;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pixel_shap::data::loader;
use pixel_shap::data::{Annotation, Image};

const SIZE: usize = 60;

/// (row, col, radius, amplitude)
const BLOBS: [(f64, f64, f64, f64); 3] = [
    (15.0, 18.0, 6.0, 200.0),
    (40.0, 42.0, 9.0, 160.0),
    (45.0, 12.0, 4.0, 230.0),
];

/// Box-Muller transform for a normal sample.
fn gauss<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn blob_intensity(r: f64, c: f64) -> f64 {
    BLOBS
        .iter()
        .map(|&(br, bc, radius, amp)| {
            let d2 = (r - br).powi(2) + (c - bc).powi(2);
            amp * (-d2 / (2.0 * radius * radius)).exp()
        })
        .sum()
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = StdRng::seed_from_u64(42);

    let image = Image::from_shape_fn((SIZE, SIZE), |(r, c)| {
        (blob_intensity(r as f64, c as f64) + gauss(&mut rng, 20.0, 5.0)).clamp(0.0, 255.0)
    });

    // Label a sparse subset: 1 on blob centres, 2 on dark background.
    let mut annotation = Annotation::zeros((SIZE, SIZE));
    for (r, c) in (0..SIZE).flat_map(|r| (0..SIZE).map(move |c| (r, c))) {
        if rng.gen::<f64>() > 0.05 {
            continue;
        }
        let signal = blob_intensity(r as f64, c as f64);
        if signal > 120.0 {
            annotation[[r, c]] = 1;
        } else if signal < 5.0 {
            annotation[[r, c]] = 2;
        }
    }

    let image_path = Path::new("sample_image.png");
    let annotation_path = Path::new("sample_annotation.csv");
    loader::save_image(image_path, &image)?;
    loader::save_annotation_csv(annotation_path, &annotation)?;

    let labelled = annotation.iter().filter(|&&v| v != 0).count();
    println!(
        "Wrote {SIZE}x{SIZE} image to {} and {labelled} labelled pixels to {}",
        image_path.display(),
        annotation_path.display()
    );
    Ok(())
}
