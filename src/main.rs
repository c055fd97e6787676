//! The COWEL command-line compiler.

use anyhow::Context as _;
use cowel::codemap::FileMap;
use cowel::diagnostics::{Diagnostic, Logger, Severity};
use cowel::document::{GenerationOptions, generate_document, generate_fragment};
use cowel::highlight::SyntectHighlighter;
use cowel::services::{FileEntry, FileLoadError, FileLoader, SimpleBibliography};
use std::path::PathBuf;

const HELP: &str = "\
cowel-rs: compile a COWEL document to HTML

USAGE:
  cowel-rs [OPTIONS] INPUT

OPTIONS:
  -o, --output PATH   Write the HTML to PATH instead of stdout
      --fragment      Emit only the compiled content, without the
                      <html>/<head>/<body> skeleton
      --paragraphs    Split top-level content into paragraphs
  -q, --quiet         Only report errors
  -h, --help          Print this help
";

/// Parsed command-line arguments.
struct Args {
    /// The input document.
    input: PathBuf,
    /// Where to write the output; stdout if absent.
    output: Option<PathBuf>,
    /// Emit a fragment instead of a full document.
    fragment: bool,
    /// Split top-level content into paragraphs.
    paragraphs: bool,
    /// Only report errors.
    quiet: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }
    let parsed = Args {
        output: args.opt_value_from_str(["-o", "--output"])?,
        fragment: args.contains("--fragment"),
        paragraphs: args.contains("--paragraphs"),
        quiet: args.contains(["-q", "--quiet"]),
        input: args.free_from_str().context("missing input file")?,
    };
    let rest = args.finish();
    anyhow::ensure!(rest.is_empty(), "unexpected arguments: {rest:?}");
    Ok(parsed)
}

/// The file loader used by the command-line compiler.
#[derive(Default)]
struct DiskLoader {
    /// The number of files loaded so far, for ID assignment.
    loaded: u32,
}

impl FileLoader for DiskLoader {
    fn load(&mut self, path: &str) -> Result<FileEntry, FileLoadError> {
        let bytes = std::fs::read(path).map_err(|error| match error.kind() {
            std::io::ErrorKind::NotFound => FileLoadError::NotFound,
            std::io::ErrorKind::PermissionDenied => FileLoadError::Permissions,
            _ => FileLoadError::ReadError,
        })?;
        let source = String::from_utf8(bytes).map_err(|_| FileLoadError::Corrupted)?;
        let id = self.loaded;
        self.loaded += 1;
        Ok(FileEntry { id, source, name: path.to_string() })
    }
}

/// A logger that annotates diagnostics with their line and column before
/// forwarding them to the [`log`] crate.
struct ReportLogger<'a> {
    /// The name of the compiled file.
    name: String,
    /// Line lookup for the compiled source.
    map: FileMap<'a>,
    /// The minimum severity to report.
    min_severity: Severity,
}

impl Logger for ReportLogger<'_> {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn log(&self, diagnostic: Diagnostic) {
        let level = match diagnostic.severity {
            Severity::Trace => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::SoftWarning | Severity::Warning => log::Level::Warn,
            _ => log::Level::Error,
        };
        let position = self.map.find_line_col(diagnostic.location.start);
        log::log!(
            level,
            "{}:{}:{}: [{}] {}",
            self.name,
            position.line,
            position.column,
            diagnostic.id,
            diagnostic.message,
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args()?;

    let mut loader = DiskLoader::default();
    let input = args.input.display().to_string();
    let entry = loader
        .load(&input)
        .map_err(anyhow::Error::from)
        .with_context(|| format!("failed to read {input}"))?;
    let source = entry.source;

    let logger = ReportLogger {
        name: input,
        map: FileMap::new(&source),
        min_severity: if args.quiet { Severity::Error } else { Severity::SoftWarning },
    };
    let highlighter = SyntectHighlighter::new();
    let mut bibliography = SimpleBibliography::new();
    let options = GenerationOptions {
        logger: &logger,
        highlighter: &highlighter,
        bibliography: &mut bibliography,
        paragraphs: args.paragraphs,
    };

    let (html, status) = if args.fragment {
        generate_fragment(&source, options)
    } else {
        generate_document(&source, options)
    };

    match &args.output {
        Some(path) => std::fs::write(path, &html)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{html}"),
    }

    if status.is_error() {
        log::error!("compilation finished with status {}", status.name());
        std::process::exit(1);
    }
    Ok(())
}
