use anyhow::{ensure, Result};
use image::RgbImage;
use ndarray::Array2;

use super::seed::SeedRect;
use super::types::{Label, LabelMap, Segmenter};

/// Default number of refinement rounds
pub const DEFAULT_ITERATIONS: usize = 5;

/// Colour clusters per class
const COMPONENTS: usize = 5;

/// Lloyd steps per colour-model fit
const KMEANS_STEPS: usize = 3;

/// Pairwise weight between identical neighbours
const DEFAULT_SMOOTHNESS: f32 = 50.0;

/// Per-channel variance floor so flat regions keep a finite likelihood
const MIN_VARIANCE: f32 = 25.0;

type Color = [f32; 3];

/// Rectangle-seeded foreground/background segmentation
///
/// Everything outside the seed is fixed background. Inside the seed each round:
/// 1. Fits a small Gaussian mixture (k-means initialised) to each class
/// 2. Labels every interior pixel by the lower negative log-likelihood
/// 3. Runs one ICM sweep with contrast-sensitive neighbour penalties
///
/// Stops after `iterations` rounds, when no label changes, or when a class empties.
pub struct ColorModelSegmenter {
    iterations: usize,
    smoothness: f32,
}

impl ColorModelSegmenter {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            smoothness: DEFAULT_SMOOTHNESS,
        }
    }
}

impl Default for ColorModelSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl Segmenter for ColorModelSegmenter {
    fn segment(&self, image: &RgbImage, seed: &SeedRect) -> Result<LabelMap> {
        let _span = tracing::debug_span!("color_model_segment").entered();

        ensure!(!seed.is_degenerate(), "Seed rectangle {:?} is degenerate", seed);

        let (width, height) = image.dimensions();
        ensure!(
            seed.x + seed.width < i64::from(width) && seed.y + seed.height < i64::from(height),
            "Seed rectangle {:?} is not inside a {}x{} image",
            seed,
            width,
            height
        );

        let mut labels = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            if seed.contains(x as u32, y as u32) {
                Label::ProbableForeground
            } else {
                Label::DefiniteBackground
            }
        });

        let colors = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            let p = image.get_pixel(x as u32, y as u32);
            [p[0] as f32, p[1] as f32, p[2] as f32]
        });
        let beta = contrast_beta(&colors);

        let (x0, y0) = (seed.x as usize, seed.y as usize);
        let (x1, y1) = (x0 + seed.width as usize, y0 + seed.height as usize);

        let mut foreground_model: Option<ColorModel> = None;
        let mut background_model: Option<ColorModel> = None;

        for round in 0..self.iterations {
            let mut foreground = Vec::new();
            let mut background = Vec::new();
            for ((y, x), label) in labels.indexed_iter() {
                if label.is_foreground() {
                    foreground.push(colors[[y, x]]);
                } else {
                    background.push(colors[[y, x]]);
                }
            }

            let (Some(fg), Some(bg)) = (
                ColorModel::fit(&foreground, foreground_model.as_ref()),
                ColorModel::fit(&background, background_model.as_ref()),
            ) else {
                tracing::debug!("Round {}: a class is empty, stopping", round);
                break;
            };

            // Data term alone, then one smoothing sweep over that labeling
            let mut fg_cost = Array2::<f32>::zeros(labels.dim());
            let mut bg_cost = Array2::<f32>::zeros(labels.dim());
            let mut by_data = labels.map(|label| label.is_foreground());
            for y in y0..y1 {
                for x in x0..x1 {
                    let color = colors[[y, x]];
                    fg_cost[[y, x]] = fg.negative_log_likelihood(color);
                    bg_cost[[y, x]] = bg.negative_log_likelihood(color);
                    by_data[[y, x]] = fg_cost[[y, x]] < bg_cost[[y, x]];
                }
            }

            let mut next = labels.clone();
            let mut changed = 0usize;
            for y in y0..y1 {
                for x in x0..x1 {
                    let (to_fg, to_bg) = self.neighbour_penalties(&colors, &by_data, beta, x, y);
                    let label = if fg_cost[[y, x]] + to_fg < bg_cost[[y, x]] + to_bg {
                        Label::ProbableForeground
                    } else {
                        Label::ProbableBackground
                    };
                    if label != labels[[y, x]] {
                        changed += 1;
                    }
                    next[[y, x]] = label;
                }
            }

            labels = next;
            foreground_model = Some(fg);
            background_model = Some(bg);

            tracing::debug!("Round {}: {} labels changed", round, changed);
            if changed == 0 {
                break;
            }
        }

        Ok(labels)
    }

    fn name(&self) -> &str {
        "color-model"
    }
}

impl ColorModelSegmenter {
    /// Penalties for labeling `(x, y)` foreground and background given its 4-neighbours
    fn neighbour_penalties(
        &self,
        colors: &Array2<Color>,
        foreground: &Array2<bool>,
        beta: f32,
        x: usize,
        y: usize,
    ) -> (f32, f32) {
        let (height, width) = foreground.dim();
        let color = colors[[y, x]];
        let mut to_fg = 0.0;
        let mut to_bg = 0.0;

        let neighbours = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbours {
            if nx >= width || ny >= height {
                continue;
            }
            let weight = self.smoothness * (-beta * squared_distance(color, colors[[ny, nx]])).exp();
            if foreground[[ny, nx]] {
                to_bg += weight;
            } else {
                to_fg += weight;
            }
        }

        (to_fg, to_bg)
    }
}

/// `1 / (2 * mean squared colour step)` over all horizontal and vertical pairs
fn contrast_beta(colors: &Array2<Color>) -> f32 {
    let (height, width) = colors.dim();
    let mut total = 0.0f64;
    let mut pairs = 0usize;

    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                total += f64::from(squared_distance(colors[[y, x]], colors[[y, x + 1]]));
                pairs += 1;
            }
            if y + 1 < height {
                total += f64::from(squared_distance(colors[[y, x]], colors[[y + 1, x]]));
                pairs += 1;
            }
        }
    }

    if pairs == 0 || total == 0.0 {
        return 0.0;
    }
    (pairs as f64 / (2.0 * total)) as f32
}

fn squared_distance(a: Color, b: Color) -> f32 {
    (0..3).map(|c| (a[c] - b[c]).powi(2)).sum()
}

struct Cluster {
    mean: Color,
    variance: f32,
    weight: f32,
}

/// Isotropic Gaussian mixture for one class
struct ColorModel {
    clusters: Vec<Cluster>,
}

impl ColorModel {
    /// Fit to `samples`, warm-starting the cluster means from `previous` when available
    fn fit(samples: &[Color], previous: Option<&ColorModel>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut means: Vec<Color> = match previous {
            Some(model) => model.clusters.iter().map(|cluster| cluster.mean).collect(),
            None => {
                let k = COMPONENTS.min(samples.len());
                (0..k).map(|i| samples[i * samples.len() / k]).collect()
            }
        };

        let mut counts = vec![0usize; means.len()];
        let mut spread = vec![0.0f64; means.len()];
        for _ in 0..KMEANS_STEPS {
            let mut sums = vec![[0.0f64; 3]; means.len()];
            counts.iter_mut().for_each(|count| *count = 0);

            for sample in samples {
                let nearest = nearest_mean(&means, *sample).0;
                for c in 0..3 {
                    sums[nearest][c] += f64::from(sample[c]);
                }
                counts[nearest] += 1;
            }

            for (i, mean) in means.iter_mut().enumerate() {
                if counts[i] > 0 {
                    let n = counts[i] as f64;
                    *mean = [
                        (sums[i][0] / n) as f32,
                        (sums[i][1] / n) as f32,
                        (sums[i][2] / n) as f32,
                    ];
                }
            }
        }

        // Final assignment against the settled means
        counts.iter_mut().for_each(|count| *count = 0);
        for sample in samples {
            let (nearest, distance) = nearest_mean(&means, *sample);
            counts[nearest] += 1;
            spread[nearest] += f64::from(distance);
        }

        let total = samples.len() as f32;
        let clusters = means
            .into_iter()
            .enumerate()
            .map(|(i, mean)| {
                let variance = if counts[i] > 0 {
                    (spread[i] / (3.0 * counts[i] as f64)) as f32
                } else {
                    0.0
                };
                Cluster {
                    mean,
                    variance: variance.max(MIN_VARIANCE),
                    weight: counts[i] as f32 / total,
                }
            })
            .collect();

        Some(Self { clusters })
    }

    fn negative_log_likelihood(&self, color: Color) -> f32 {
        let terms: Vec<f32> = self
            .clusters
            .iter()
            .filter(|cluster| cluster.weight > 0.0)
            .map(|cluster| {
                cluster.weight.ln()
                    - 1.5 * (std::f32::consts::TAU * cluster.variance).ln()
                    - squared_distance(color, cluster.mean) / (2.0 * cluster.variance)
            })
            .collect();

        let max = terms.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let sum: f32 = terms.iter().map(|term| (term - max).exp()).sum();
        -(max + sum.ln())
    }
}

/// Index and squared distance of the closest mean
fn nearest_mean(means: &[Color], color: Color) -> (usize, f32) {
    let mut best = (0, f32::MAX);
    for (i, mean) in means.iter().enumerate() {
        let d = squared_distance(*mean, color);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}
