use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::compose::{mask_to_rgb, CompositeMode};
use crate::input::{ImageSource, SourceImage};
use crate::output::OutputSink;
use crate::pipeline::{Outcome, Pipeline};
use crate::segmentation::Segmenter;

/// Everything the batch driver needs to know, passed in explicitly
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub iterations: usize,
    pub max_side: Option<u32>,
    pub mode: CompositeMode,
    pub show_mask: bool,
}

/// Per-batch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Files written
    pub processed: usize,
    /// Files whose object was re-centred
    pub centered: usize,
    /// Files written unchanged (no foreground or degenerate)
    pub fallbacks: usize,
    /// Files that could not be decoded
    pub skipped: usize,
    /// Files that decoded but could not be processed or written
    pub failed: usize,
}

/// Run every image from `source` through the pipeline into `output`
///
/// Failures are contained to their file: undecodable files are skipped,
/// segmentation and write failures are counted, and the batch carries on.
pub fn run_batch<S, O>(
    source: &mut S,
    output: &mut O,
    segmenter: &dyn Segmenter,
    config: &BatchConfig,
) -> BatchReport
where
    S: ImageSource,
    O: OutputSink,
{
    let pipeline = Pipeline::new(segmenter, config.max_side, config.mode);
    let mut report = BatchReport::default();
    let mut total_time = Duration::ZERO;

    tracing::info!(
        "Processing {} images with {} (mode={:?}, show_mask={})",
        source.remaining(),
        segmenter.name(),
        config.mode,
        config.show_mask
    );

    while let Some(SourceImage { path, image }) = source.next_image() {
        let _span = tracing::info_span!("file", path = %path.display()).entered();
        let Some(file_name) = path.file_name().map(PathBuf::from) else {
            tracing::error!("No file name in source path");
            report.failed += 1;
            continue;
        };

        let image = match image {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!("Skipping: {}", err);
                report.skipped += 1;
                continue;
            }
        };

        let start = Instant::now();
        let processed = match pipeline.run(&image) {
            Ok(processed) => processed,
            Err(err) => {
                tracing::error!("Processing failed: {}", err);
                report.failed += 1;
                continue;
            }
        };

        let rendered = if config.show_mask {
            mask_to_rgb(&processed.mask)
        } else {
            processed.canvas
        };

        match output.write_image(&file_name, &rendered) {
            Ok(written) => {
                let elapsed = start.elapsed();
                total_time += elapsed;
                report.processed += 1;
                log_outcome(&processed.outcome, &written, elapsed);
                if processed.outcome.is_fallback() {
                    report.fallbacks += 1;
                } else {
                    report.centered += 1;
                }
            }
            Err(err) => {
                tracing::error!("{}", err);
                report.failed += 1;
            }
        }
    }

    let avg_ms = if report.processed > 0 {
        total_time.as_secs_f64() * 1000.0 / report.processed as f64
    } else {
        0.0
    };
    tracing::info!(
        "Done: processed={}, centered={}, fallbacks={}, skipped={}, failed={}, avg={:.1}ms",
        report.processed,
        report.centered,
        report.fallbacks,
        report.skipped,
        report.failed,
        avg_ms
    );

    report
}

fn log_outcome(outcome: &Outcome, written: &Path, elapsed: Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    match outcome {
        Outcome::Centered(placement) => tracing::info!(
            "Saved {} ({}x{} object, {:.1}ms)",
            written.display(),
            placement.source.width,
            placement.source.height,
            ms
        ),
        Outcome::NoForegroundFound => tracing::warn!(
            "No foreground found, saved original to {}",
            written.display()
        ),
        Outcome::DegenerateImage => tracing::warn!(
            "Image too small to segment, saved original to {}",
            written.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::fs;

    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    use super::*;
    use crate::compose::BACKGROUND;
    use crate::error::ProcessError;
    use crate::input::DirectorySource;
    use crate::output::DirectoryOutput;
    use crate::pipeline::tests::{gradient, RectSegmenter};

    struct MemorySource {
        items: VecDeque<SourceImage>,
    }

    impl ImageSource for MemorySource {
        fn next_image(&mut self) -> Option<SourceImage> {
            self.items.pop_front()
        }

        fn remaining(&self) -> usize {
            self.items.len()
        }
    }

    #[derive(Default)]
    struct MemorySink {
        written: HashMap<PathBuf, RgbImage>,
        reject: Option<PathBuf>,
    }

    impl OutputSink for MemorySink {
        fn write_image(
            &mut self,
            file_name: &Path,
            image: &RgbImage,
        ) -> Result<PathBuf, ProcessError> {
            if self.reject.as_deref() == Some(file_name) {
                return Err(ProcessError::UnsupportedFormat(file_name.to_path_buf()));
            }
            self.written.insert(file_name.to_path_buf(), image.clone());
            Ok(file_name.to_path_buf())
        }
    }

    fn config(show_mask: bool) -> BatchConfig {
        BatchConfig {
            input_dir: PathBuf::from("in"),
            output_dir: PathBuf::from("out"),
            iterations: 5,
            max_side: None,
            mode: CompositeMode::Threshold,
            show_mask,
        }
    }

    fn decoded(name: &str, image: RgbImage) -> SourceImage {
        SourceImage {
            path: PathBuf::from("in").join(name),
            image: Ok(image),
        }
    }

    fn undecodable(name: &str) -> SourceImage {
        let path = PathBuf::from("in").join(name);
        let source = image::ImageError::IoError(std::io::Error::other("corrupt"));
        SourceImage {
            path: path.clone(),
            image: Err(ProcessError::Decode { path, source }),
        }
    }

    #[test]
    fn test_decode_failure_does_not_stop_batch() {
        let mut source = MemorySource {
            items: VecDeque::from([
                decoded("a.png", gradient(100, 100)),
                undecodable("b.jpg"),
                decoded("c.png", gradient(8, 8)),
            ]),
        };
        let mut sink = MemorySink::default();
        let segmenter = RectSegmenter::new(&[(30, 30, 40, 40)]);

        let report = run_batch(&mut source, &mut sink, &segmenter, &config(false));

        assert_eq!(
            report,
            BatchReport {
                processed: 2,
                centered: 1,
                fallbacks: 1,
                skipped: 1,
                failed: 0,
            }
        );
        assert!(sink.written.contains_key(Path::new("a.png")));
        assert!(!sink.written.contains_key(Path::new("b.jpg")));
        assert_eq!(sink.written[Path::new("c.png")], gradient(8, 8));
    }

    #[test]
    fn test_write_failure_is_counted() {
        let mut source = MemorySource {
            items: VecDeque::from([
                decoded("a.png", gradient(50, 50)),
                decoded("b.png", gradient(50, 50)),
            ]),
        };
        let mut sink = MemorySink {
            reject: Some(PathBuf::from("a.png")),
            ..Default::default()
        };
        let segmenter = RectSegmenter::new(&[(20, 20, 10, 10)]);

        let report = run_batch(&mut source, &mut sink, &segmenter, &config(false));
        assert_eq!(report.failed, 1);
        assert_eq!(report.processed, 1);
        assert!(sink.written.contains_key(Path::new("b.png")));
    }

    #[test]
    fn test_show_mask_writes_mask() {
        let mut source = MemorySource {
            items: VecDeque::from([decoded("a.png", gradient(60, 60))]),
        };
        let mut sink = MemorySink::default();
        let segmenter = RectSegmenter::new(&[(20, 20, 20, 20)]);

        run_batch(&mut source, &mut sink, &segmenter, &config(true));

        let mask = &sink.written[Path::new("a.png")];
        assert_eq!(*mask.get_pixel(30, 30), Rgb([255, 255, 255]));
        assert_eq!(*mask.get_pixel(2, 2), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_directory_round_trip() {
        let input = TempDir::new().unwrap();
        let output_root = TempDir::new().unwrap();
        let output_dir = output_root.path().join("processed");

        let mut photo = RgbImage::from_pixel(100, 100, Rgb([40, 40, 40]));
        for y in 0..20 {
            for x in 0..30 {
                photo.put_pixel(10 + x, 15 + y, Rgb([200, 10, 10]));
            }
        }
        photo.save(input.path().join("photo.png")).unwrap();
        fs::write(input.path().join("broken.jpeg"), b"garbage").unwrap();
        fs::write(input.path().join("readme.md"), b"# notes").unwrap();

        let mut source = DirectorySource::open(input.path()).unwrap();
        let mut sink = DirectoryOutput::new(&output_dir).unwrap();
        let segmenter = RectSegmenter::new(&[(10, 15, 30, 20)]);

        let report = run_batch(&mut source, &mut sink, &segmenter, &config(false));
        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped, 1);

        assert!(!output_dir.join("broken.jpeg").exists());
        assert!(!output_dir.join("readme.md").exists());

        let result = image::open(output_dir.join("photo.png")).unwrap().into_rgb8();
        assert_eq!(result.dimensions(), (100, 100));
        // 30x20 object (plus feathered ring) lands around the centre
        assert_eq!(*result.get_pixel(50, 50), Rgb([200, 10, 10]));
        assert_eq!(*result.get_pixel(36, 41), Rgb([200, 10, 10]));
        assert_eq!(*result.get_pixel(10, 15), BACKGROUND);
        assert_eq!(*result.get_pixel(0, 0), BACKGROUND);
    }
}
