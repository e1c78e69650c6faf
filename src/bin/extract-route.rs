use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{CommandFactory, Parser, error::ErrorKind};
use routegen::{Document, RouteError, TableLengths};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "extract-route",
    version,
    about = "Print route, day and temple tables from a layered .xcf as Rust statics"
)]
struct Cli {
    /// Layered GIMP document (.xcf) to extract.
    document: PathBuf,

    /// Declared length of ROUTE.
    #[arg(long, default_value_t = TableLengths::default().route)]
    route_len: usize,

    /// Declared length of DAYS and N_TEMPLES (days plus the leading 0).
    #[arg(long, default_value_t = TableLengths::default().days)]
    days_len: usize,

    /// Declared length of TEMPLES.
    #[arg(long, default_value_t = TableLengths::default().temples)]
    temples_len: usize,

    /// Declare the extracted lengths instead of checking against the configured ones.
    #[arg(long)]
    infer_lengths: bool,

    /// Also write every decoded layer as a PNG into this directory.
    #[arg(long, value_name = "DIR")]
    dump_layers: Option<PathBuf>,
}

impl Cli {
    fn declared_lengths(&self) -> Option<TableLengths> {
        (!self.infer_lengths).then_some(TableLengths {
            route: self.route_len,
            days: self.days_len,
            temples: self.temples_len,
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args()?;
    if !routegen::document::has_document_extension(&cli.document) {
        return Err(usage_error(format!(
            "expected a .xcf document, got '{}'",
            cli.document.display()
        ))
        .into());
    }

    let doc = Document::load(&cli.document)
        .with_context(|| format!("load document '{}'", cli.document.display()))?;

    if let Some(dir) = &cli.dump_layers {
        dump_layers(&doc, dir)?;
    }

    let extraction = routegen::extract(&doc)
        .with_context(|| format!("extract tables from '{}'", cli.document.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    extraction
        .write_report(&mut out)
        .context("write report to stdout")?;
    extraction
        .write_tables(&mut out, cli.declared_lengths())
        .context("write tables to stdout")?;
    out.flush().context("flush stdout")?;
    Ok(())
}

/// Parse the command line. Malformed calls print the usage line on stdout and fail.
fn parse_args() -> Result<Cli, RouteError> {
    match Cli::try_parse() {
        Ok(cli) => Ok(cli),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            e.exit()
        }
        Err(e) => {
            let rendered = e.to_string();
            let reason = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ");
            Err(usage_error(reason))
        }
    }
}

fn usage_error(msg: impl Into<String>) -> RouteError {
    println!("{}", Cli::command().render_usage());
    RouteError::usage(msg)
}

fn dump_layers(doc: &Document, dir: &Path) -> anyhow::Result<()> {
    let written = doc
        .dump_layers(dir)
        .with_context(|| format!("dump layers into '{}'", dir.display()))?;
    for path in &written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
