// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine dispatcher — normalise a scan, hand it to the selected OCR engine and
// collect the text.
//
// One call, one request: every temporary artifact is named after the request
// and deleted before the call returns, whatever the outcome.

use std::path::PathBuf;
use std::time::Duration;

use scanwerk_core::config::{AppConfig, DEFAULT_ENGINE_TIMEOUT_SECS};
use scanwerk_core::error::Result;
use scanwerk_core::types::{EngineId, EngineSpec, RecognitionResult, RequestId, SourceImage};
use scanwerk_document::{DefaultRasterizer, ImageNormalizer};
use tracing::{Span, field, info, instrument, warn};

use crate::artifact::ScratchSpace;
use crate::discovery::{EngineAvailability, EngineLocator};
use crate::process::run_engine;
use crate::protocol::Invocation;

/// Settings for [`EngineDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Search path for engine executables and `pdftoppm`; the process `PATH`
    /// if `None`.
    pub search_path: Option<String>,
    /// Directory for per-request artifacts; the system temp dir if `None`.
    pub temp_dir: Option<PathBuf>,
    /// Upper bound on one engine run; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            search_path: None,
            temp_dir: None,
            timeout: Some(Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS)),
        }
    }
}

impl From<&AppConfig> for DispatcherConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            search_path: config.search_path.clone(),
            temp_dir: config.temp_dir.clone(),
            timeout: config.engine_timeout(),
        }
    }
}

/// Routes recognition requests to external OCR engines.
///
/// The selected [`EngineSpec`] can change between calls (via
/// [`select`](Self::select)) but never during one, since `recognize` only
/// borrows the dispatcher immutably.
pub struct EngineDispatcher {
    config: DispatcherConfig,
    locator: EngineLocator,
    normalizer: ImageNormalizer,
    current: EngineSpec,
}

impl EngineDispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        let normalizer = ImageNormalizer::with_rasterizer(DefaultRasterizer::configured(
            config.temp_dir.as_deref(),
            config.search_path.as_deref(),
        ));
        Self {
            locator: EngineLocator::new(config.search_path.clone()),
            config,
            normalizer,
            current: EngineSpec::default(),
        }
    }

    /// Dispatcher configured and pre-selected from the application settings.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let mut dispatcher = Self::new(DispatcherConfig::from(config));
        dispatcher.select(config.default_spec());
        dispatcher
    }

    /// Swap the normaliser (e.g. for a different PDF rasteriser).
    pub fn with_normalizer(mut self, normalizer: ImageNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    // -- Engine selection -----------------------------------------------------

    /// Select the engine used by [`recognize_selected`](Self::recognize_selected).
    pub fn select(&mut self, spec: EngineSpec) {
        info!(engine = %spec.engine_id, language = %spec.language_hint, "Engine selected");
        self.current = spec;
    }

    pub fn current(&self) -> &EngineSpec {
        &self.current
    }

    // -- Queries --------------------------------------------------------------

    /// Whether `engine`'s executable can be found. Touches no files.
    pub fn engine_available(&self, engine: EngineId) -> bool {
        self.locator.is_available(engine)
    }

    /// Availability of every known engine.
    pub fn available_engines(&self) -> Vec<EngineAvailability> {
        self.locator.survey()
    }

    // -- Recognition ----------------------------------------------------------

    /// Recognise `source` with the currently selected engine.
    pub fn recognize_selected(&self, source: &SourceImage) -> Result<RecognitionResult> {
        self.recognize(source, &self.current)
    }

    /// Recognise the text in `source` with the engine described by `spec`.
    ///
    /// The engine's presence is checked before the source is read or any
    /// temporary file exists. A non-zero exit status or empty output is a
    /// degraded success (possibly empty text), not an error.
    ///
    /// # Errors
    ///
    /// - [`EngineNotFound`](scanwerk_core::ScanwerkError::EngineNotFound):
    ///   engine missing or failed to launch
    /// - [`InvalidImage`](scanwerk_core::ScanwerkError::InvalidImage) /
    ///   [`PdfError`](scanwerk_core::ScanwerkError::PdfError): source unreadable
    /// - [`EngineTimeout`](scanwerk_core::ScanwerkError::EngineTimeout):
    ///   bounded wait expired
    #[instrument(
        skip_all,
        fields(
            request = field::Empty,
            engine = %spec.engine_id,
            source = %source.path().display(),
        )
    )]
    pub fn recognize(&self, source: &SourceImage, spec: &EngineSpec) -> Result<RecognitionResult> {
        let request_id = RequestId::new();
        Span::current().record("request", field::display(request_id.short()));

        let executable = self.locator.locate(spec.engine_id)?;

        let raster = self.normalizer.normalize(source)?;

        let scratch = ScratchSpace::new(self.config.temp_dir.clone(), request_id);
        let raster_file = scratch.artifact("raster", ".png")?;
        raster.write_png(raster_file.path())?;
        drop(raster);

        let invocation = Invocation::for_engine(spec, raster_file.path(), &scratch)?;
        let output = run_engine(
            spec.engine_id,
            &executable,
            &invocation.args,
            self.config.timeout,
        )?;

        if !output.status.success() {
            warn!(status = %output.status, "Engine exited unsuccessfully; keeping whatever it produced");
        }

        let text = invocation.collect(spec.engine_id, &output);
        if text.is_empty() {
            warn!("Engine produced no text");
        }

        let result = RecognitionResult::new(request_id, text, spec.clone());
        info!(
            chars = result.char_count(),
            elapsed_ms = output.elapsed.as_millis() as u64,
            "Recognition complete"
        );
        Ok(result)
    }
}

impl Default for EngineDispatcher {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;
    use std::time::Instant;

    use image::{DynamicImage, GrayImage, Luma};
    use scanwerk_core::ScanwerkError;
    use scanwerk_document::PageRasterizer;
    use tempfile::TempDir;

    use super::*;
    use crate::test_support::{install_stub, spawn_guard};

    /// A bin directory for stub engines, a scratch directory for artifacts and
    /// a scanned page to recognise.
    struct Sandbox {
        _root: TempDir,
        bin: PathBuf,
        scratch: PathBuf,
        page: PathBuf,
    }

    impl Sandbox {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let bin = root.path().join("bin");
            let scratch = root.path().join("scratch");
            std::fs::create_dir(&bin).unwrap();
            std::fs::create_dir(&scratch).unwrap();

            let mut page = GrayImage::from_pixel(120, 80, Luma([255]));
            for y in 30..42 {
                for x in 15..105 {
                    page.put_pixel(x, y, Luma([0]));
                }
            }
            let page_path = root.path().join("page.png");
            page.save(&page_path).unwrap();

            Self {
                bin,
                scratch,
                page: page_path,
                _root: root,
            }
        }

        fn dispatcher(&self, timeout: Option<Duration>) -> EngineDispatcher {
            EngineDispatcher::new(DispatcherConfig {
                search_path: Some(self.bin.display().to_string()),
                temp_dir: Some(self.scratch.clone()),
                timeout,
            })
        }

        fn stub(&self, name: &str, body: &str) {
            install_stub(&self.bin, name, body);
        }

        fn scratch_entries(&self) -> Vec<PathBuf> {
            std::fs::read_dir(&self.scratch)
                .unwrap()
                .map(|entry| entry.unwrap().path())
                .collect()
        }

        fn source(&self) -> SourceImage {
            SourceImage::new(&self.page)
        }
    }

    const CUNEIFORM_ARGS: &str = r#"
out=""; lang=""; img=""
while [ $# -gt 0 ]; do
  case "$1" in
    -l) lang="$2"; shift 2 ;;
    -f) shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) img="$1"; shift ;;
  esac
done
[ -f "$img" ] || exit 2
"#;

    /// Renders every PDF as the same page.
    struct FixedPage(GrayImage);

    impl PageRasterizer for FixedPage {
        fn name(&self) -> &'static str {
            "fixed-page"
        }

        fn first_page(&self, _pdf: &Path) -> Result<DynamicImage> {
            Ok(DynamicImage::ImageLuma8(self.0.clone()))
        }
    }

    fn ten_seconds() -> Option<Duration> {
        Some(Duration::from_secs(10))
    }

    #[test]
    fn missing_engine_fails_before_touching_anything() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        let dispatcher = sandbox.dispatcher(ten_seconds());

        // The source does not exist either: the engine check must come first.
        let err = dispatcher
            .recognize(
                &SourceImage::new(Path::new("/nonexistent/page.png")),
                &EngineSpec::cuneiform("eng"),
            )
            .unwrap_err();

        assert!(
            matches!(err, ScanwerkError::EngineNotFound { ref engine, .. } if engine == "cuneiform"),
            "got {err:?}"
        );
        assert!(sandbox.scratch_entries().is_empty());
        assert!(!dispatcher.engine_available(EngineId::Cuneiform));
    }

    #[test]
    fn gocr_text_comes_from_stdout() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub(
            "gocr",
            r#"[ -f "$1" ] || { echo "no input" >&2; exit 2; }
echo "  HELLO  "
echo "chatter" >&2"#,
        );
        let dispatcher = sandbox.dispatcher(ten_seconds());

        let result = dispatcher
            .recognize(&sandbox.source(), &EngineSpec::gocr())
            .unwrap();

        assert_eq!(result.text, "HELLO");
        assert_eq!(result.engine_used, EngineSpec::gocr());
        assert!(sandbox.scratch_entries().is_empty());
    }

    #[test]
    fn gocr_sees_a_png_raster_named_after_the_request() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub(
            "gocr",
            r#"head -c 4 "$1" | tail -c 3; echo
basename "$1""#,
        );
        let dispatcher = sandbox.dispatcher(ten_seconds());

        let result = dispatcher
            .recognize(&sandbox.source(), &EngineSpec::gocr())
            .unwrap();

        let mut lines = result.text.lines();
        assert_eq!(lines.next(), Some("PNG"));
        let name = lines.next().unwrap();
        assert!(
            name.starts_with(&format!("scanwerk-{}-raster-", result.request_id.short())),
            "artifact name {name}"
        );
    }

    #[test]
    fn cuneiform_text_comes_from_output_file() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub(
            "cuneiform",
            &format!("{CUNEIFORM_ARGS}\nprintf '\\n  WORLD \\n' > \"$out\""),
        );
        let dispatcher = sandbox.dispatcher(ten_seconds());

        let result = dispatcher
            .recognize(&sandbox.source(), &EngineSpec::cuneiform("eng"))
            .unwrap();

        assert_eq!(result.text, "WORLD");
        assert!(sandbox.scratch_entries().is_empty());
    }

    #[test]
    fn cuneiform_receives_language_verbatim() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub(
            "cuneiform",
            &format!("{CUNEIFORM_ARGS}\nprintf '%s' \"$lang\" > \"$out\""),
        );
        let dispatcher = sandbox.dispatcher(ten_seconds());

        let result = dispatcher
            .recognize(&sandbox.source(), &EngineSpec::cuneiform("rus_eng"))
            .unwrap();
        assert_eq!(result.text, "rus_eng");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub(
            "cuneiform",
            &format!("{CUNEIFORM_ARGS}\nprintf 'ok\\377done' > \"$out\""),
        );
        let dispatcher = sandbox.dispatcher(ten_seconds());

        let result = dispatcher
            .recognize(&sandbox.source(), &EngineSpec::cuneiform("eng"))
            .unwrap();
        assert_eq!(result.text, "ok\u{FFFD}done");
    }

    #[test]
    fn failing_engine_is_degraded_success() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub("gocr", "echo boom >&2\nexit 3");
        let dispatcher = sandbox.dispatcher(ten_seconds());

        let result = dispatcher
            .recognize(&sandbox.source(), &EngineSpec::gocr())
            .unwrap();
        assert_eq!(result.text, "");
        assert!(result.is_empty());
        assert!(sandbox.scratch_entries().is_empty());
    }

    #[test]
    fn hung_engine_times_out_and_cleans_up() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub("cuneiform", "exec sleep 5");
        let dispatcher = sandbox.dispatcher(Some(Duration::from_millis(300)));

        let started = Instant::now();
        let err = dispatcher
            .recognize(&sandbox.source(), &EngineSpec::cuneiform("eng"))
            .unwrap_err();

        assert!(
            matches!(err, ScanwerkError::EngineTimeout { .. }),
            "got {err:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(sandbox.scratch_entries().is_empty());
    }

    #[test]
    fn undecodable_source_leaves_no_artifacts() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub("gocr", "echo SHOULD-NOT-RUN");
        std::fs::write(&sandbox.page, b"this is not an image").unwrap();
        let dispatcher = sandbox.dispatcher(ten_seconds());

        let err = dispatcher
            .recognize(&sandbox.source(), &EngineSpec::gocr())
            .unwrap_err();

        assert!(matches!(err, ScanwerkError::InvalidImage(_)), "got {err:?}");
        assert!(sandbox.scratch_entries().is_empty());
    }

    #[test]
    fn pdf_source_uses_the_normalizer_rasterizer() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub(
            "gocr",
            r#"head -c 8 "$1" | grep -q PNG || exit 2
echo FROM-PDF"#,
        );
        let page = image::open(&sandbox.page).unwrap().to_luma8();
        let dispatcher = sandbox
            .dispatcher(ten_seconds())
            .with_normalizer(ImageNormalizer::with_rasterizer(FixedPage(page)));

        // The PDF itself is never opened; the rasteriser stands in for it.
        let pdf = sandbox.page.with_extension("pdf");
        let result = dispatcher
            .recognize(&SourceImage::new(&pdf), &EngineSpec::gocr())
            .unwrap();

        assert_eq!(result.text, "FROM-PDF");
        assert!(sandbox.scratch_entries().is_empty());
    }

    #[test]
    fn recognize_selected_uses_current_spec() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub(
            "cuneiform",
            &format!("{CUNEIFORM_ARGS}\nprintf 'lang=%s' \"$lang\" > \"$out\""),
        );
        let mut dispatcher = sandbox.dispatcher(ten_seconds());
        assert_eq!(dispatcher.current(), &EngineSpec::gocr());

        dispatcher.select(EngineSpec::cuneiform("ger"));
        let result = dispatcher.recognize_selected(&sandbox.source()).unwrap();

        assert_eq!(result.text, "lang=ger");
        assert_eq!(result.engine_used.engine_id, EngineId::Cuneiform);
    }

    #[test]
    fn availability_report_reflects_search_path() {
        let _guard = spawn_guard();
        let sandbox = Sandbox::new();
        sandbox.stub("gocr", "exit 0");
        let dispatcher = sandbox.dispatcher(None);

        assert!(dispatcher.engine_available(EngineId::Gocr));
        let report = dispatcher.available_engines();
        assert_eq!(
            report
                .iter()
                .filter(|a| a.is_available())
                .map(|a| a.engine)
                .collect::<Vec<_>>(),
            vec![EngineId::Gocr]
        );
    }

    #[test]
    fn config_conversion_keeps_timeout_and_paths() {
        let app = AppConfig {
            engine_timeout_secs: None,
            temp_dir: Some(PathBuf::from("/var/tmp/scans")),
            search_path: Some("/opt/ocr/bin".into()),
            ..AppConfig::default()
        };
        let config = DispatcherConfig::from(&app);
        assert_eq!(config.timeout, None);
        assert_eq!(config.temp_dir, Some(PathBuf::from("/var/tmp/scans")));
        assert_eq!(config.search_path.as_deref(), Some("/opt/ocr/bin"));

        let dispatcher = EngineDispatcher::from_app_config(&AppConfig {
            default_engine: EngineId::Cuneiform,
            default_language: "fra".into(),
            ..AppConfig::default()
        });
        assert_eq!(dispatcher.current(), &EngineSpec::cuneiform("fra"));
        assert_eq!(dispatcher.config().timeout, Some(Duration::from_secs(300)));
    }
}
