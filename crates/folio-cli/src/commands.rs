use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use folio_doc::{DocumentConfig, PdfDocument};
use serde::Serialize;

use crate::cli::*;
use crate::json::{JsonDocument, JsonSink};

/// Dispatch a parsed command line.
pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => cmd_inspect(args, cli.format),
        Command::Copy(args) => cmd_copy(args, cli.format),
        Command::Config(args) => cmd_config(args),
    }
}

#[derive(Debug, Serialize)]
pub struct ObjectRow {
    pub number: u32,
    pub generation: u16,
    pub kind: String,
    pub state: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct CopySummary {
    /// Source object number and the number of its copy, if one was made.
    pub copied: Vec<(u32, Option<u32>)>,
    pub written: usize,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DocumentConfig> {
    let Some(path) = path else {
        return Ok(DocumentConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(DocumentConfig::from_toml_str(&text)?)
}

fn open_source(path: &Path, config: DocumentConfig) -> anyhow::Result<PdfDocument> {
    let table = JsonDocument::load(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(PdfDocument::open_reading(table.into_source(), config)?)
}

/// List every object of the JSON document at `path`.
pub fn inspect(path: &Path) -> anyhow::Result<Vec<ObjectRow>> {
    let doc = open_source(path, DocumentConfig::default())?;
    let mut rows = Vec::new();
    for reference in doc.references() {
        let object = doc.object(reference)?;
        rows.push(ObjectRow {
            number: reference.object_number(),
            generation: reference.generation(),
            kind: object.map_or_else(|| "free".to_owned(), |o| o.kind().to_string()),
            state: format!("{:?}", doc.reference_state(reference)?),
            value: object.map(|o| o.to_string()).unwrap_or_default(),
        });
    }
    Ok(rows)
}

/// Copy the requested objects into a new document and save it.
pub fn copy(args: &CopyArgs) -> anyhow::Result<CopySummary> {
    let config = load_config(args.config.as_deref())?;
    let source = open_source(&args.source, config.clone())?;
    let mut target = PdfDocument::open_writing(JsonSink::new(&args.output), config);

    let references = source.references();
    let mut copied = Vec::new();
    for &number in &args.objects {
        let Some(reference) = references.iter().find(|r| r.object_number() == number) else {
            bail!("object {number} not found in {}", args.source.display());
        };
        let copy = source.copy_reference_to(*reference, &mut target, args.allow_duplicating)?;
        copied.push((number, copy.as_reference().map(|r| r.object_number())));
    }

    let report = target.close()?;
    Ok(CopySummary {
        copied,
        written: report.flushed,
    })
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let rows = inspect(&args.path)?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in &rows {
        println!(
            "{} {}  {}  {}",
            format!("{} {} obj", row.number, row.generation).yellow(),
            row.kind.cyan(),
            row.value,
            row.state.dimmed()
        );
    }
    println!("{} objects", rows.len().to_string().bold());
    Ok(())
}

fn cmd_copy(args: CopyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let summary = copy(&args)?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    for (source, target) in &summary.copied {
        match target {
            Some(target) => println!("  {} {} → {}", "copied".green(), source, target.to_string().yellow()),
            None => println!("  {} {} (not copyable)", "skipped".red(), source),
        }
    }
    println!(
        "{} Wrote {} objects to {}",
        "✓".green().bold(),
        summary.written,
        args.output.display().to_string().bold()
    );
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.path.as_deref())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
