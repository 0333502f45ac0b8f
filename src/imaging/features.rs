use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::filters::{gaussian, laplace, sobel};
use super::morphology::{disk, white_tophat};
use crate::data::model::{FeatureStack, Image};
use crate::error::{PixelError, Result};

// ---------------------------------------------------------------------------
// FeatureKind – one entry of the filter bank
// ---------------------------------------------------------------------------

/// A filter to derive from the source image, with its numeric parameter.
///
/// Serialised as `{"kind": "gaussian", "parameter": 2.0}`; parameterless
/// kinds omit `parameter`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameter", rename_all = "snake_case")]
pub enum FeatureKind {
    Original,
    Sobel,
    Laplace,
    /// White top-hat with a disk of this radius.
    TopHat(f64),
    /// Gaussian blur with this sigma.
    Gaussian(f64),
    GaussianSobel(f64),
    GaussianLaplace(f64),
    /// Uniform noise in `[0, 1)`; a baseline feature carrying no information.
    Random,
}

impl FeatureKind {
    /// Snake-case kind name, without the parameter.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FeatureKind::Original => "original",
            FeatureKind::Sobel => "sobel",
            FeatureKind::Laplace => "laplace",
            FeatureKind::TopHat(_) => "top_hat",
            FeatureKind::Gaussian(_) => "gaussian",
            FeatureKind::GaussianSobel(_) => "gaussian_sobel",
            FeatureKind::GaussianLaplace(_) => "gaussian_laplace",
            FeatureKind::Random => "random",
        }
    }

    /// Numeric parameter, if the kind takes one.
    pub fn parameter(&self) -> Option<f64> {
        match *self {
            FeatureKind::TopHat(p)
            | FeatureKind::Gaussian(p)
            | FeatureKind::GaussianSobel(p)
            | FeatureKind::GaussianLaplace(p) => Some(p),
            _ => None,
        }
    }

    /// Mutable access to the parameter, used by the viewer's drag values.
    pub fn parameter_mut(&mut self) -> Option<&mut f64> {
        match self {
            FeatureKind::TopHat(p)
            | FeatureKind::Gaussian(p)
            | FeatureKind::GaussianSobel(p)
            | FeatureKind::GaussianLaplace(p) => Some(p),
            _ => None,
        }
    }

    /// Radii and sigmas must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        match self.parameter() {
            Some(value) if !value.is_finite() || value < 0.0 => Err(PixelError::InvalidParameter {
                name: self.kind_name().to_string(),
                value,
            }),
            _ => Ok(()),
        }
    }

    /// Compute this feature for `image`.
    pub fn apply<R: Rng + ?Sized>(&self, image: &Image, rng: &mut R) -> Image {
        match *self {
            FeatureKind::Original => image.clone(),
            FeatureKind::Sobel => sobel(image),
            FeatureKind::Laplace => laplace(image),
            FeatureKind::TopHat(radius) => white_tophat(image, &disk(radius)),
            FeatureKind::Gaussian(sigma) => gaussian(image, sigma),
            FeatureKind::GaussianSobel(sigma) => sobel(&gaussian(image, sigma)),
            FeatureKind::GaussianLaplace(sigma) => laplace(&gaussian(image, sigma)),
            FeatureKind::Random => Image::from_shape_fn(image.raw_dim(), |_| rng.gen::<f64>()),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameter() {
            Some(p) => write!(f, "{}({p})", self.kind_name()),
            None => write!(f, "{}", self.kind_name()),
        }
    }
}

/// Parses names such as `sobel`, `top_hat(3)` or `gaussian_laplace(1.5)`.
///
/// A missing `(...)` suffix means parameter `0`. Parameterised kinds match
/// by prefix, checking `gaussian_sobel` and `gaussian_laplace` before
/// `gaussian`; the others need an exact match.
impl FromStr for FeatureKind {
    type Err = PixelError;

    fn from_str(name: &str) -> Result<Self> {
        let stripped = name.replace(')', "");
        let parameter = match stripped.rsplit_once('(') {
            Some((_, value)) => value
                .trim()
                .parse::<f64>()
                .map_err(|_| PixelError::UnknownFeature(name.to_string()))?,
            None => 0.0,
        };

        let kind = match stripped.as_str() {
            "original" => FeatureKind::Original,
            "sobel" => FeatureKind::Sobel,
            "laplace" => FeatureKind::Laplace,
            s if s.starts_with("top_hat") => FeatureKind::TopHat(parameter),
            s if s.starts_with("gaussian_sobel") => FeatureKind::GaussianSobel(parameter),
            s if s.starts_with("gaussian_laplace") => FeatureKind::GaussianLaplace(parameter),
            s if s.starts_with("gaussian") => FeatureKind::Gaussian(parameter),
            "random" => FeatureKind::Random,
            _ => return Err(PixelError::UnknownFeature(name.to_string())),
        };
        Ok(kind)
    }
}

// ---------------------------------------------------------------------------
// Feature stack generation
// ---------------------------------------------------------------------------

/// Parse feature names, warning about and dropping the ones that fail.
pub fn parse_feature_names<S: AsRef<str>>(names: &[S]) -> Vec<FeatureKind> {
    names
        .iter()
        .filter_map(|name| {
            let name = name.as_ref();
            match name.parse::<FeatureKind>().and_then(|kind| kind.validate().map(|_| kind)) {
                Ok(kind) => Some(kind),
                Err(e) => {
                    log::warn!("{e}; skipping '{name}'");
                    None
                }
            }
        })
        .collect()
}

/// Compute one image per requested feature, in request order.
///
/// `Random` draws from the thread RNG and is not reproducible; use
/// [`generate_feature_stack_with_rng`] to seed it.
pub fn generate_feature_stack(image: &Image, features: &[FeatureKind]) -> Result<FeatureStack> {
    generate_feature_stack_with_rng(image, features, &mut rand::thread_rng())
}

/// Like [`generate_feature_stack`] with an explicit random source.
pub fn generate_feature_stack_with_rng<R: Rng + ?Sized>(
    image: &Image,
    features: &[FeatureKind],
    rng: &mut R,
) -> Result<FeatureStack> {
    for feature in features {
        feature.validate()?;
    }
    log::debug!(
        "generating {} features for a {:?} image",
        features.len(),
        image.dim()
    );
    Ok(features.iter().map(|f| f.apply(image, rng)).collect())
}

/// String-named variant: unknown names are warned about and skipped, so the
/// result may hold fewer entries than `names`.
pub fn generate_feature_stack_by_name<S: AsRef<str>>(image: &Image, names: &[S]) -> Result<FeatureStack> {
    let features = parse_feature_names(names);
    generate_feature_stack(image, &features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample() -> Image {
        Image::from_shape_fn((12, 10), |(r, c)| ((r * 3 + c * 5) % 17) as f64)
    }

    #[test]
    fn original_passes_the_image_through() {
        let image = sample();
        let stack = generate_feature_stack_by_name(&image, &["original"]).unwrap();

        assert_eq!(stack.len(), 1);
        assert_eq!(stack[0], image);
    }

    #[test]
    fn unknown_name_is_skipped_with_a_warning() {
        testing_logger::setup();
        let image = sample();
        let stack = generate_feature_stack_by_name(&image, &["bogus_name"]).unwrap();
        assert!(stack.is_empty());

        testing_logger::validate(|logs| {
            let warnings: Vec<_> = logs.iter().filter(|l| l.level == log::Level::Warn).collect();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].body.contains("Feature unknown: bogus_name"));
        });
    }

    #[test]
    fn malformed_parameter_is_warned_about() {
        testing_logger::setup();
        assert_eq!(parse_feature_names(&["gaussian(abc)", "sobel"]), vec![FeatureKind::Sobel]);

        testing_logger::validate(|logs| {
            let warnings: Vec<_> = logs.iter().filter(|l| l.level == log::Level::Warn).collect();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].body.contains("gaussian(abc)"));
        });
    }

    #[test]
    fn unknown_names_do_not_stop_the_rest() {
        let image = sample();
        let stack =
            generate_feature_stack_by_name(&image, &["sobel", "bogus", "gaussian(1)"]).unwrap();

        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0], sobel(&image));
        assert_eq!(stack[1], gaussian(&image, 1.0));
    }

    #[test]
    fn prefixes_resolve_to_the_longest_kind() {
        assert_eq!("gaussian_sobel(2.0)".parse::<FeatureKind>().unwrap(), FeatureKind::GaussianSobel(2.0));
        assert_eq!("gaussian_laplace(1.5)".parse::<FeatureKind>().unwrap(), FeatureKind::GaussianLaplace(1.5));
        assert_eq!("gaussian(2.0)".parse::<FeatureKind>().unwrap(), FeatureKind::Gaussian(2.0));
        assert_eq!("top_hat".parse::<FeatureKind>().unwrap(), FeatureKind::TopHat(0.0));
    }

    #[test]
    fn parameterless_kinds_need_exact_names() {
        assert!("original(3)".parse::<FeatureKind>().is_err());
        assert!("sobel2".parse::<FeatureKind>().is_err());
        assert!("gaussian(abc)".parse::<FeatureKind>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for kind in [
            FeatureKind::Original,
            FeatureKind::TopHat(5.0),
            FeatureKind::GaussianLaplace(0.5),
            FeatureKind::Random,
        ] {
            assert_eq!(kind.to_string().parse::<FeatureKind>().unwrap(), kind);
        }
        assert_eq!(FeatureKind::Gaussian(2.0).to_string(), "gaussian(2)");
    }

    #[test]
    fn serialises_as_tagged_variant() {
        let json = serde_json::to_string(&FeatureKind::Gaussian(2.0)).unwrap();
        assert_eq!(json, r#"{"kind":"gaussian","parameter":2.0}"#);

        let kinds: Vec<FeatureKind> =
            serde_json::from_str(r#"[{"kind":"sobel"},{"kind":"top_hat","parameter":3}]"#).unwrap();
        assert_eq!(kinds, vec![FeatureKind::Sobel, FeatureKind::TopHat(3.0)]);
    }

    #[test]
    fn stack_follows_request_order_and_shape() {
        let image = sample();
        let features = [
            FeatureKind::Laplace,
            FeatureKind::TopHat(2.0),
            FeatureKind::GaussianSobel(1.0),
            FeatureKind::Original,
        ];
        let stack = generate_feature_stack(&image, &features).unwrap();

        assert_eq!(stack.len(), features.len());
        assert!(stack.iter().all(|f| f.dim() == image.dim()));
        assert_eq!(stack[0], laplace(&image));
        assert_eq!(stack[2], sobel(&gaussian(&image, 1.0)));
        assert_eq!(stack[3], image);
    }

    #[test]
    fn random_feature_is_uniform_and_seedable() {
        let image = sample();
        let a = generate_feature_stack_with_rng(&image, &[FeatureKind::Random], &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate_feature_stack_with_rng(&image, &[FeatureKind::Random], &mut StdRng::seed_from_u64(7)).unwrap();

        assert_eq!(a, b);
        assert!(a[0].iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn negative_parameters_are_rejected() {
        let image = sample();
        let err = generate_feature_stack(&image, &[FeatureKind::Gaussian(-1.0)]).unwrap_err();
        assert!(matches!(err, PixelError::InvalidParameter { .. }));

        assert!(parse_feature_names(&["gaussian(-1)"]).is_empty());
    }
}
