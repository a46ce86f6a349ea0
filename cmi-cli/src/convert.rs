//! `cmi convert`: statement file → journal rows → table → spreadsheet

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use cmi_core::{JournalRow, Session, SessionState};
use cmi_export::{csv_out, render, xlsx};
use cmi_extract::{ExtractionMode, Extractor, ModelBackend};
use cmi_ingest::{check_declared_type, load_document};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::state::write_rows_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub file: PathBuf,
    pub mime: Option<String>,
    pub mode: Option<ExtractionMode>,
    pub strict: bool,
    pub out: Option<PathBuf>,
    pub format: OutputFormat,
    pub rows_json: Option<PathBuf>,
    pub no_export: bool,
}

/// Write `rows` in `format`, to `out` or the configured fixed file name.
pub fn export_rows(rows: &[JournalRow], format: OutputFormat, out: Option<PathBuf>, cfg: &Config) -> Result<PathBuf> {
    let path = out.unwrap_or_else(|| match format {
        OutputFormat::Xlsx => PathBuf::from(&cfg.export.xlsx_file_name),
        OutputFormat::Csv => PathBuf::from(&cfg.export.csv_file_name),
    });

    let written = match format {
        OutputFormat::Xlsx => xlsx::save_workbook(rows, &cfg.export.sheet_name, &path),
        OutputFormat::Csv => csv_out::save_csv(rows, &path),
    };
    written.with_context(|| format!("export to {}", path.display()))?;

    Ok(path)
}

/// `err` followed by its sources
fn error_chain(err: impl std::error::Error + Send + Sync + 'static) -> String {
    format!("{:#}", anyhow::Error::new(err))
}

/// Session-facing message for `err`; the full chain goes to the debug log.
fn session_message(err: impl std::error::Error + Send + Sync + 'static) -> String {
    let message = err.to_string();
    debug!("{}", error_chain(err));
    message
}

async fn extract<B: ModelBackend>(opts: &ConvertOptions, cfg: &Config, backend: B) -> Result<Vec<JournalRow>, String> {
    let doc = load_document(&opts.file, opts.mime.as_deref())
        .await
        .map_err(session_message)?;

    let mode = opts.mode.unwrap_or(cfg.extract.mode);
    let extractor = Extractor::new(backend, mode).strict(opts.strict || cfg.extract.strict);
    let extraction = extractor.extract(&doc).await.map_err(session_message)?;

    if !extraction.violations.is_empty() {
        warn!(
            "{} row(s) depart from the accounting rule; review before booking",
            extraction.violations.len()
        );
    }
    Ok(extraction.rows)
}

fn retry_hint(file: &Path) -> String {
    format!("Reset and retry with: cmi convert {}", file.display())
}

pub async fn run<B: ModelBackend>(opts: ConvertOptions, cfg: &Config, backend: B) -> Result<()> {
    let mut session = Session::new();

    if let Err(e) = check_declared_type(&opts.file, opts.mime.as_deref()) {
        session.reject(e.to_string());
    } else {
        let request_id = session.begin(opts.file.display().to_string());
        println!("{}", session.status_line());

        let outcome = extract(&opts, cfg, backend).await;
        session.finish(request_id, outcome);
    }

    let rows = match session.state() {
        SessionState::Success { rows, .. } => rows,
        SessionState::Error { message } => bail!("{message}\n{}", retry_hint(&opts.file)),
        other => bail!("unexpected session state: {other:?}"),
    };
    println!("{}", session.status_line());

    println!("\n{}\n", render(rows));

    if let Some(p) = &opts.rows_json {
        write_rows_json(p, rows)?;
        println!("Saved rows to {}", p.display());
    }

    if !opts.no_export {
        let path = export_rows(rows, opts.format, opts.out.clone(), cfg)?;
        println!("Exported {} rows to {}", rows.len(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::read_rows_json;
    use calamine::{open_workbook, Reader, Xlsx};
    use cmi_extract::{ExtractError, GenerateRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Backend with a fixed reply that counts how often it is called
    struct Scripted {
        reply: String,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ModelBackend for &Scripted {
        async fn generate(&self, _request: &GenerateRequest<'_>) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct Scratch(PathBuf);

    impl Scratch {
        fn new(test: &str) -> Self {
            let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
            let dir = std::env::temp_dir().join(format!("cmi-convert-{test}-{}-{nanos}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            Scratch(dir)
        }

        fn statement(&self) -> PathBuf {
            let p = self.0.join("releve_cmi.pdf");
            std::fs::write(&p, b"%PDF-1.4 fake").unwrap();
            p
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn options(file: PathBuf, out: Option<PathBuf>) -> ConvertOptions {
        ConvertOptions {
            file,
            mime: None,
            mode: None,
            strict: false,
            out,
            format: OutputFormat::Xlsx,
            rows_json: None,
            no_export: false,
        }
    }

    fn group_json(terminal: &str) -> String {
        format!(
            r#"{{"date":"05/03/2025","terminalId":"{terminal}","remittanceNumber":"1","cardFragment":"",
            "totalRemittance":"2 000,00","commissionHT":"30,00","vatOnCommission":"6,00","netBalance":"1 964,00"}}"#
        )
    }

    #[tokio::test]
    async fn test_unsupported_type_never_reaches_the_model() {
        let backend = Scripted::new("[]");
        let err = run(options(PathBuf::from("notes.txt"), None), &Config::default(), &backend)
            .await
            .unwrap_err();

        assert_eq!(backend.calls(), 0);
        let msg = err.to_string();
        assert!(msg.starts_with("unsupported file type 'text/plain'"), "{msg}");
        assert!(msg.ends_with("Reset and retry with: cmi convert notes.txt"), "{msg}");
    }

    #[tokio::test]
    async fn test_two_terminals_export_nine_sheet_rows() {
        let dir = Scratch::new("export");
        let out = dir.0.join("ecritures.xlsx");
        let rows_json = dir.0.join("rows.json");
        let reply = format!("[{},{}]", group_json("00011122233"), group_json("00044455566"));
        let backend = Scripted::new(&reply);

        let mut opts = options(dir.statement(), Some(out.clone()));
        opts.rows_json = Some(rows_json.clone());
        run(opts, &Config::default(), &backend).await.unwrap();

        assert_eq!(backend.calls(), 1);
        assert_eq!(read_rows_json(&rows_json).unwrap().len(), 8);

        let mut wb: Xlsx<_> = open_workbook(&out).unwrap();
        let range = wb.worksheet_range(xlsx::DEFAULT_SHEET_NAME).unwrap();
        assert_eq!(range.get_size(), (9, 6));
    }

    #[tokio::test]
    async fn test_empty_reply_fails_without_writing() {
        let dir = Scratch::new("empty");
        let out = dir.0.join("ecritures.xlsx");
        let backend = Scripted::new("");

        let err = run(options(dir.statement(), Some(out.clone())), &Config::default(), &backend)
            .await
            .unwrap_err();

        assert_eq!(backend.calls(), 1);
        let msg = err.to_string();
        assert!(msg.starts_with(&ExtractError::EmptyResponse.to_string()), "{msg}");
        assert!(msg.contains("Reset and retry with: cmi convert"), "{msg}");
        assert!(!out.exists());
    }

    #[test]
    fn test_error_chain_keeps_the_parse_position() {
        let source = serde_json::from_str::<serde_json::Value>("[{").unwrap_err();
        let err = ExtractError::InvalidFormat(source);

        assert!(!err.to_string().contains("line 1"));
        let chain = error_chain(err);
        assert!(chain.starts_with("the model returned an invalid output format"), "{chain}");
        assert!(chain.contains("line 1 column"), "{chain}");
    }
}
