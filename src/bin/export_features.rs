use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use ndarray::ArrayD;

use pixel_shap::config::DemoConfig;
use pixel_shap::data::{format_data, loader};
use pixel_shap::figure::{visualize_image_list, with_figure};
use pixel_shap::imaging::{add_background, generate_feature_stack};

const USAGE: &str = "usage: export_features <image> <annotation> <out.csv> [config.json] [figure.png]";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !(3..=5).contains(&args.len()) {
        bail!(USAGE);
    }
    let image_path = PathBuf::from(&args[0]);
    let annotation_path = PathBuf::from(&args[1]);
    let out_path = PathBuf::from(&args[2]);

    let config = match args.get(3) {
        Some(path) => DemoConfig::load(path.as_ref())?,
        None => DemoConfig::default(),
    };

    let mut image = loader::load_image(&image_path)?;
    let annotation = loader::load_annotation(&annotation_path)?;
    log::info!(
        "Loaded image {:?} and annotation {:?}",
        image.dim(),
        annotation.dim()
    );

    if config.add_background {
        image = add_background(&image).context("adding background")?;
    }

    let stack = generate_feature_stack(&image, &config.features).context("computing features")?;
    let names: Vec<String> = config.features.iter().map(|f| f.to_string()).collect();

    let data = format_data(&stack, &annotation).context("formatting data")?;
    loader::write_tabular_csv(&out_path, &data, &names)?;
    log::info!(
        "Wrote {} samples x {} features to {} (classes {:?})",
        data.n_samples(),
        data.n_features(),
        out_path.display(),
        data.class_counts()
    );

    if let Some(figure_path) = args.get(4) {
        let images: Vec<ArrayD<f64>> = stack.into_iter().map(|f| f.into_dyn()).collect();
        let pixels = with_figure(config.figure.width, config.figure.height, |figure| {
            visualize_image_list(figure, &images, Some(&names[..]))
        })
        .context("capturing figure")?;
        loader::save_capture_png(figure_path.as_ref(), &pixels)?;
        log::info!("Wrote figure {figure_path}");
    }

    Ok(())
}
