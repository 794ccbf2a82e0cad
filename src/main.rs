use clap::{Parser, Subcommand};
use folio::assemble::{Export, assemble};
use folio::layout::{self, ContentStats, TrimTable};
use folio::locale::Locales;
use folio::{config, naming, output, scan};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Assemble book manuscripts into print-ready markup")]
#[command(long_about = "\
Assemble book manuscripts into print-ready markup

A manuscript is a directory of Markdown files split by matter. Files are
ordered by numeric prefix; unnumbered files are drafts and left out.

Manuscript structure:

  manuscript/
  ├── config.toml                  # Metadata and options (optional)
  ├── front/
  │   ├── 010-title-page.md        # First heading is the book title
  │   └── 020-dedication.md        # Recognized names stay in front matter
  ├── main/
  │   ├── 010-the-harbour.md       # Chapters, numbered contiguously
  │   ├── 020-part-one.md          # '# Part I: Title' = part divider
  │   └── notes-to-self.md         # No number prefix = draft
  └── back/
      └── 010-references.md        # Long URLs get invisible break points

Output: <slug>.md (markup for the typesetter) and <slug>.geometry.json
(page size, margins and text block).

Set RUST_LOG=debug to see classification and detection decisions.
Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Manuscript directory
    #[arg(long, default_value = "manuscript", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan and assemble a manuscript, writing markup and geometry
    Assemble,
    /// Validate a manuscript and show what would be exported, without writing
    Check,
    /// Estimate the page count of a single Markdown file
    Estimate {
        /// Markdown file to measure
        file: PathBuf,
        /// Trim size, e.g. 6x9
        #[arg(long, default_value = "6x9")]
        trim: String,
        /// Leave out table-of-contents pages
        #[arg(long)]
        no_toc: bool,
    },
    /// Assemble every manuscript directly under --source in parallel
    Batch {
        /// Maximum parallel exports (defaults to the number of CPU cores)
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let locales = Locales::builtin();
    let trims = TrimTable::standard();

    match cli.command {
        Command::Assemble => {
            println!("==> Scanning {}", cli.source.display());
            let manuscript = scan::scan(&cli.source)?;
            output::print_scan_output(&manuscript);

            println!("==> Assembling");
            let export = assemble(&manuscript.document, &manuscript.config, &locales, &trims)?;
            output::print_export_output(&export);

            let slug = naming::slugify(&manuscript.document.metadata.title);
            let written = write_export(&cli.output, &slug, &export).map_err(|e| -> Box<dyn std::error::Error> { e })?;
            println!("==> Wrote {}", written.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manuscript = scan::scan(&cli.source)?;
            output::print_scan_output(&manuscript);
            let export = assemble(&manuscript.document, &manuscript.config, &locales, &trims)?;
            output::print_export_output(&export);
            println!("{}", export.geometry.to_directive());
            println!("==> Manuscript is valid");
        }
        Command::Estimate { file, trim, no_toc } => {
            let content = std::fs::read_to_string(&file)?;
            let trim = trims.lookup(&trim)?;
            let stats = ContentStats::from_markup(&content);
            let estimate = layout::estimate_from_stats(&stats, &trim, !no_toc);
            output::print_estimate_output(&stats, &trim, estimate);
        }
        Command::Batch { jobs } => {
            let manuscripts = find_manuscripts(&cli.source);
            println!(
                "==> Assembling {} manuscripts from {}",
                manuscripts.len(),
                cli.source.display()
            );
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config::effective_threads(jobs))
                .build()?;
            let results: Vec<(String, Result<Export, String>)> = pool.install(|| {
                manuscripts
                    .par_iter()
                    .map(|root| {
                        let name = root
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        let result = export_manuscript(root, &cli.output, &locales, &trims)
                            .map_err(|e| e.to_string());
                        (name, result)
                    })
                    .collect()
            });

            let mut failed = 0;
            for (i, (name, result)) in results.iter().enumerate() {
                if result.is_err() {
                    failed += 1;
                }
                let outcome = result.as_ref().map_err(String::as_str);
                println!("{}", output::format_batch_line(i + 1, name, outcome));
            }
            println!(
                "==> Batch complete: {} exported, {} failed → {}",
                results.len() - failed,
                failed,
                cli.output.display()
            );
            if failed > 0 {
                return Err(format!("{} manuscripts failed", failed).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Scan, assemble and write one manuscript.
fn export_manuscript(
    root: &Path,
    output_dir: &Path,
    locales: &Locales,
    trims: &TrimTable,
) -> Result<Export, BoxError> {
    let manuscript = scan::scan(root)?;
    let export = assemble(&manuscript.document, &manuscript.config, locales, trims)?;
    let slug = naming::slugify(&manuscript.document.metadata.title);
    write_export(output_dir, &slug, &export)?;
    Ok(export)
}

/// Write `<slug>.md` and `<slug>.geometry.json`; returns the markup path.
fn write_export(output_dir: &Path, slug: &str, export: &Export) -> Result<PathBuf, BoxError> {
    std::fs::create_dir_all(output_dir)?;
    let markup_path = output_dir.join(format!("{slug}.md"));
    std::fs::write(&markup_path, &export.markup)?;

    let geometry = serde_json::json!({
        "trim_size": export.trim_size,
        "page_estimate": export.page_estimate,
        "geometry": export.geometry,
        "directive": export.geometry.to_directive(),
        "digest": export.digest,
    });
    std::fs::write(
        output_dir.join(format!("{slug}.geometry.json")),
        serde_json::to_string_pretty(&geometry)?,
    )?;
    Ok(markup_path)
}

/// Immediate subdirectories of `root` that contain a matter directory.
fn find_manuscripts(root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .filter(|dir| ["front", "main", "back"].iter().any(|m| dir.join(m).is_dir()))
        .collect();
    found.sort();
    found
}
