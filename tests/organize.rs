//! End-to-end batch tests.
//!
//! The external tools are replaced with in-memory fakes keyed by file name,
//! so these tests need neither Poppler nor Tesseract.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use certsort::models::BatchSummary;
use certsort::ocr::{
    EmbeddedTextSource, ExtractionError, OcrBackend, OcrError, PageRasterizer, RasterizedPage,
    TextExtractor,
};
use certsort::organizer::{scan, OrganizeError, OrganizeEvent, Organizer};
use certsort::progress::MemorySink;
use certsort::storage::Filer;
use tempfile::{tempdir, TempDir};

const JUAN_PEREZ: &str = "UNIVERSIDAD AUTONOMA\n\nCertifica a:\nJuan Perez\n\nPor su asistencia al curso.\nAguascalientes, Ags, a 15 de Enero de 2024.";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Embedded text per PDF file name; unknown files have an empty text layer.
#[derive(Default)]
struct FakeTextLayer {
    pages: HashMap<String, Vec<String>>,
}

impl FakeTextLayer {
    fn with(mut self, file: &str, text: &str) -> Self {
        self.pages.insert(file.to_string(), vec![text.to_string()]);
        self
    }
}

impl EmbeddedTextSource for FakeTextLayer {
    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractionError> {
        Ok(self
            .pages
            .get(&file_name(pdf_path))
            .cloned()
            .unwrap_or_else(|| vec![String::new()]))
    }
}

/// Text layer whose reader panics on one file.
struct PanickingTextLayer {
    inner: FakeTextLayer,
    panics_on: &'static str,
}

impl EmbeddedTextSource for PanickingTextLayer {
    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractionError> {
        if file_name(pdf_path) == self.panics_on {
            panic!("corrupt text layer in {}", self.panics_on);
        }
        self.inner.extract_pages(pdf_path)
    }
}

/// "Rasterizes" a PDF by handing its own path to the OCR fake.
struct PassthroughRasterizer;

impl PageRasterizer for PassthroughRasterizer {
    fn rasterize_first_page(&self, pdf_path: &Path) -> Result<RasterizedPage, OcrError> {
        Ok(RasterizedPage::at(pdf_path))
    }
}

/// OCR text per image file name.
struct FakeOcr {
    texts: HashMap<String, String>,
    installed: Vec<&'static str>,
    installed_engine: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeOcr {
    fn new() -> Self {
        Self {
            texts: HashMap::new(),
            installed: vec!["spa", "eng"],
            installed_engine: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with(mut self, file: &str, text: &str) -> Self {
        self.texts.insert(file.to_string(), text.to_string());
        self
    }

    fn languages(mut self, installed: Vec<&'static str>) -> Self {
        self.installed = installed;
        self
    }

    fn not_installed(mut self) -> Self {
        self.installed_engine = false;
        self
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl OcrBackend for FakeOcr {
    fn is_available(&self) -> bool {
        self.installed_engine
    }

    fn availability_hint(&self) -> String {
        "install the fake engine".to_string()
    }

    fn recognize_text(&self, image_path: &Path, language: &str) -> Result<String, OcrError> {
        let file = file_name(image_path);
        self.calls
            .lock()
            .unwrap()
            .push((file.clone(), language.to_string()));

        if !self.installed_engine {
            return Err(OcrError::BackendNotAvailable(
                "tesseract not found (install tesseract-ocr)".to_string(),
            ));
        }
        if !self.installed.iter().any(|l| *l == language) {
            return Err(OcrError::UnsupportedLanguage(language.to_string()));
        }
        Ok(self.texts.get(&file).cloned().unwrap_or_default())
    }
}

struct Fixture {
    source: TempDir,
    dest: TempDir,
    sink: Arc<MemorySink>,
}

impl Fixture {
    fn new(files: &[&str]) -> Self {
        let source = tempdir().unwrap();
        for file in files {
            fs::write(source.path().join(file), format!("bytes of {}", file)).unwrap();
        }
        Self {
            source,
            dest: tempdir().unwrap(),
            sink: Arc::new(MemorySink::new()),
        }
    }

    fn organizer(&self, text: FakeTextLayer, ocr: Arc<FakeOcr>) -> Organizer {
        let extractor = TextExtractor::new(Arc::new(text), Arc::new(PassthroughRasterizer), ocr);
        Organizer::new(extractor, Filer::new(self.dest.path()), self.sink.clone())
    }

    fn filed(&self, year: &str, name: &str, file: &str) -> PathBuf {
        self.dest.path().join(year).join(name).join(file)
    }

    fn log(&self) -> Vec<String> {
        self.sink.lines()
    }

    fn log_contains(&self, needle: &str) -> bool {
        self.log().iter().any(|l| l.contains(needle))
    }
}

#[tokio::test]
async fn test_files_pdf_and_image_by_year_and_name() {
    let fx = Fixture::new(&["constancia.pdf", "diploma.jpg", "notes.txt"]);
    let text = FakeTextLayer::default().with("constancia.pdf", JUAN_PEREZ);
    let ocr = Arc::new(FakeOcr::new().with("diploma.jpg", "Certifica a:\nANNA SMITH\nFebrero 2024"));

    let summary = fx.organizer(text, ocr.clone()).run(fx.source.path()).await.unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            processed: 2,
            errors: 0
        }
    );
    let pdf = fx.filed("2024", "Juan Perez", "constancia.pdf");
    assert_eq!(fs::read_to_string(pdf).unwrap(), "bytes of constancia.pdf");
    assert!(fx.filed("2024", "Anna Smith", "diploma.jpg").is_file());

    // The PDF had a text layer, so only the image went through OCR
    assert_eq!(
        ocr.calls(),
        vec![("diploma.jpg".to_string(), "spa".to_string())]
    );
    assert!(fx.log_contains("Analyzing: constancia.pdf..."));
    assert!(fx.log_contains("-> Copied to: 2024/Juan Perez/"));
    assert!(!fx.log_contains("notes.txt"));

    // Sources stay where they were
    assert!(fx.source.path().join("constancia.pdf").is_file());
    assert!(fx.source.path().join("diploma.jpg").is_file());
}

#[tokio::test]
async fn test_scanned_pdf_goes_through_ocr() {
    let fx = Fixture::new(&["escaneo.pdf"]);
    let ocr = Arc::new(FakeOcr::new().with(
        "escaneo.pdf",
        "La Facultad otorga a Maria Fernanda Lopez el presente reconocimiento, marzo de 2019",
    ));

    let summary = fx
        .organizer(FakeTextLayer::default(), ocr.clone())
        .run(fx.source.path())
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert!(fx.filed("2019", "Maria Fernanda Lopez", "escaneo.pdf").is_file());
    assert!(fx.log_contains("running OCR on first page"));
}

#[tokio::test]
async fn test_no_text_counts_as_error_without_copy() {
    let fx = Fixture::new(&["blank.png"]);
    let ocr = Arc::new(FakeOcr::new().with("blank.png", "   \n"));

    let summary = fx
        .organizer(FakeTextLayer::default(), ocr)
        .run(fx.source.path())
        .await
        .unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            processed: 0,
            errors: 1
        }
    );
    assert!(fx.log_contains("[!] Could not extract information from blank.png"));
    assert_eq!(fs::read_dir(fx.dest.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_engine_fails_document_but_not_batch() {
    let fx = Fixture::new(&["a.jpg", "b.pdf"]);
    let text = FakeTextLayer::default().with("b.pdf", JUAN_PEREZ);
    let ocr = Arc::new(FakeOcr::new().not_installed());

    let summary = fx.organizer(text, ocr).run(fx.source.path()).await.unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            processed: 1,
            errors: 1
        }
    );
    assert!(fx.log_contains("[X] Error processing a.jpg"));
    assert!(fx.log_contains("tesseract-ocr"));
    assert!(fx.log_contains("certsort check"));
    assert!(fx.filed("2024", "Juan Perez", "b.pdf").is_file());
}

#[tokio::test]
async fn test_spanish_model_missing_falls_back_to_english() {
    let fx = Fixture::new(&["award.png"]);
    let ocr = Arc::new(
        FakeOcr::new()
            .languages(vec!["eng"])
            .with("award.png", "This certificate is awarded to JOHN DOE for outstanding work. 2021"),
    );

    let summary = fx
        .organizer(FakeTextLayer::default(), ocr.clone())
        .run(fx.source.path())
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert!(fx.filed("2021", "John Doe", "award.png").is_file());
    assert!(fx.log_contains("retrying with 'eng'"));
    assert_eq!(
        ocr.calls(),
        vec![
            ("award.png".to_string(), "spa".to_string()),
            ("award.png".to_string(), "eng".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_name_falls_back_to_file_name() {
    let fx = Fixture::new(&["Maria Lopez (1).pdf"]);
    let text = FakeTextLayer::default().with(
        "Maria Lopez (1).pdf",
        "Documento oficial emitido por la coordinacion academica durante 2023.",
    );

    let summary = fx
        .organizer(text, Arc::new(FakeOcr::new()))
        .run(fx.source.path())
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert!(fx.filed("2023", "Maria Lopez", "Maria Lopez (1).pdf").is_file());
    assert!(fx.log_contains("[i] Name taken from file name: Maria Lopez"));
}

#[tokio::test]
async fn test_unknown_name_and_year_use_placeholder_folders() {
    let fx = Fixture::new(&["scan001.jpg"]);
    let ocr = Arc::new(FakeOcr::new().with("scan001.jpg", "Documento de prueba sin datos relevantes"));

    let summary = fx
        .organizer(FakeTextLayer::default(), ocr)
        .run(fx.source.path())
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert!(fx.filed("SinFecha", "Desconocido", "scan001.jpg").is_file());
}

#[tokio::test]
async fn test_rerun_never_overwrites() {
    let fx = Fixture::new(&["constancia.pdf"]);

    for _ in 0..2 {
        let text = FakeTextLayer::default().with("constancia.pdf", JUAN_PEREZ);
        let summary = fx
            .organizer(text, Arc::new(FakeOcr::new()))
            .run(fx.source.path())
            .await
            .unwrap();
        assert_eq!(summary.processed, 1);
    }

    assert!(fx.filed("2024", "Juan Perez", "constancia.pdf").is_file());
    assert!(fx.filed("2024", "Juan Perez", "constancia_1.pdf").is_file());
}

#[tokio::test]
async fn test_parallel_workers_keep_logs_per_document() {
    let files = [
        "ana.pdf", "bruno.pdf", "carla.pdf", "diego.pdf", "elena.pdf", "fabio.pdf",
    ];
    let fx = Fixture::new(&files);
    let mut text = FakeTextLayer::default();
    for file in files {
        // Everyone lands in the same bucket to exercise collision handling
        text = text.with(file, JUAN_PEREZ);
    }

    let summary = fx
        .organizer(text, Arc::new(FakeOcr::new()))
        .with_workers(3)
        .run(fx.source.path())
        .await
        .unwrap();

    assert_eq!(summary.processed, files.len());
    assert_eq!(summary.errors, 0);
    let bucket = fx.dest.path().join("2024").join("Juan Perez");
    assert_eq!(fs::read_dir(bucket).unwrap().count(), files.len());

    // Every document's block runs from "Analyzing" to its own "Copied to"
    let log = fx.log();
    let starts: Vec<usize> = log
        .iter()
        .enumerate()
        .filter(|(_, l)| l.starts_with("Analyzing: "))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(starts.len(), files.len());
    for (n, start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(log.len());
        let block = &log[*start..end];
        assert!(block.last().unwrap().contains("-> Copied to"), "{:?}", block);
        assert_eq!(
            block.iter().filter(|l| l.contains("-> Copied to")).count(),
            1
        );
    }
}

#[tokio::test]
async fn test_events_report_progress() {
    let fx = Fixture::new(&["constancia.pdf", "blank.png"]);
    let text = FakeTextLayer::default().with("constancia.pdf", JUAN_PEREZ);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let organizer = fx
        .organizer(text, Arc::new(FakeOcr::new()))
        .with_events(tx);
    let summary = organizer.run(fx.source.path()).await.unwrap();
    drop(organizer);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(OrganizeEvent::Started { total: 2 })));
    let finished: Vec<(String, bool)> = events
        .iter()
        .filter_map(|e| match e {
            OrganizeEvent::DocumentFinished { file_name, filed } => {
                Some((file_name.clone(), *filed))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        finished,
        vec![
            ("blank.png".to_string(), false),
            ("constancia.pdf".to_string(), true),
        ]
    );
    assert!(matches!(events.last(), Some(OrganizeEvent::Finished(s)) if *s == summary));
}

#[tokio::test]
async fn test_missing_source_folder_is_error() {
    let dest = tempdir().unwrap();
    let extractor = TextExtractor::new(
        Arc::new(FakeTextLayer::default()),
        Arc::new(PassthroughRasterizer),
        Arc::new(FakeOcr::new()),
    );
    let organizer = Organizer::new(extractor, Filer::new(dest.path()), Arc::new(MemorySink::new()));

    let err = organizer
        .run(Path::new("/nonexistent/certsort/Docs"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrganizeError::SourceNotFound(_)));
}

#[test]
fn test_scan_is_not_recursive() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("inner.pdf"), b"x").unwrap();
    fs::write(dir.path().join("TOP.PNG"), b"x").unwrap();

    let docs = scan(dir.path()).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].file_name(), "TOP.PNG");
}

#[tokio::test]
async fn test_panicking_document_counts_as_error() {
    let fx = Fixture::new(&["a_broken.pdf", "b_constancia.pdf", "c_constancia.pdf"]);
    let text = PanickingTextLayer {
        inner: FakeTextLayer::default()
            .with("b_constancia.pdf", JUAN_PEREZ)
            .with("c_constancia.pdf", JUAN_PEREZ),
        panics_on: "a_broken.pdf",
    };
    let extractor = TextExtractor::new(
        Arc::new(text),
        Arc::new(PassthroughRasterizer),
        Arc::new(FakeOcr::new()),
    );
    let organizer = Organizer::new(extractor, Filer::new(fx.dest.path()), fx.sink.clone())
        .with_workers(2);

    let summary = organizer.run(fx.source.path()).await.unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            processed: 2,
            errors: 1
        }
    );
    assert!(fx.filed("2024", "Juan Perez", "b_constancia.pdf").is_file());
    assert!(fx.filed("2024", "Juan Perez", "c_constancia.pdf").is_file());
}
