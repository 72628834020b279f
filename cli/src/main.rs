//! pdfblocks CLI - PDF layout reconstruction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfblocks::render::{self, RenderOptions};
use pdfblocks::{
    extract_file, Document, ExtractOptions, Extraction, ExtractionStats, JsonFormat, LayoutConfig,
    PageSelection, ParseOptions, PdfParser,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pdfblocks")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Reconstruct styled headers, lists and paragraphs from PDF pages", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    extract: ExtractArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every extracting subcommand.
#[derive(Args, Clone, Default)]
struct ExtractArgs {
    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long, global = true)]
    pages: Option<String>,

    /// Lay pages out on a single thread
    #[arg(long, global = true)]
    sequential: bool,

    /// Give up after this many seconds
    #[arg(long, global = true, env = "PDFBLOCKS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Only process the first N pages
    #[arg(long, global = true)]
    max_pages: Option<usize>,

    /// Report layout errors instead of falling back to plain text
    #[arg(long, global = true)]
    no_fallback: bool,

    /// JSON file overriding layout thresholds
    #[arg(long, global = true, value_name = "FILE")]
    layout_config: Option<PathBuf>,
}

impl ExtractArgs {
    fn to_options(&self) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
        let pages = match self.pages.as_deref() {
            Some(p) => PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?,
            None => PageSelection::All,
        };

        let mut options =
            ExtractOptions::new().with_parse_options(ParseOptions::new().with_pages(pages));
        if self.sequential {
            options = options.sequential();
        }
        if let Some(secs) = self.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_pages {
            options = options.with_max_pages(max);
        }
        if self.no_fallback {
            options = options.without_fallback();
        }
        if let Some(path) = &self.layout_config {
            let json = fs::read_to_string(path)?;
            options = options.with_layout(LayoutConfig::from_json(&json)?);
        }
        Ok(options)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDF to all formats (HTML, Markdown, text, JSON)
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert PDF to a styled HTML fragment
    Html {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// CSS class of the wrapping element
        #[arg(long, default_value = "pdf-content")]
        class: String,
    },

    /// Convert PDF to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include YAML frontmatter
        #[arg(short, long)]
        frontmatter: bool,
    },

    /// Convert PDF to indented block text
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert PDF to JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let args = cli.extract;

    let result = match cli.command {
        Some(Commands::Convert { input, output }) => cmd_convert(&input, output.as_deref(), &args),
        Some(Commands::Html {
            input,
            output,
            class,
        }) => cmd_html(&input, output.as_deref(), &class, &args),
        Some(Commands::Markdown {
            input,
            output,
            frontmatter,
        }) => cmd_markdown(&input, output.as_deref(), frontmatter, &args),
        Some(Commands::Text { input, output }) => cmd_text(&input, output.as_deref(), &args),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact, &args),
        Some(Commands::Info { input, json }) => cmd_info(&input, json, &args),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: HTML to stdout or OUTPUT
            if let Some(input) = cli.input {
                cmd_html(&input, cli.output.as_deref(), "pdf-content", &args)
            } else {
                println!("{}", "Usage: pdfblocks <FILE> [OUTPUT]".yellow());
                println!("       pdfblocks --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Run the extraction and warn on stderr when only plain text came back.
fn extract(input: &Path, options: &ExtractOptions) -> Result<Extraction, Box<dyn std::error::Error>> {
    let extraction = extract_file(input, options)?;
    if !extraction.is_structured() {
        eprintln!(
            "{} layout reconstruction failed, showing plain text",
            "Warning:".yellow().bold()
        );
    }
    Ok(extraction)
}

/// The structured document, or an error when only plain text is available.
fn structured(input: &Path, args: &ExtractArgs) -> Result<Document, Box<dyn std::error::Error>> {
    let options = args.to_options()?.without_fallback();
    match extract_file(input, &options)? {
        Extraction::Structured { document, .. } => Ok(document),
        Extraction::PlainText(_) => Err("layout reconstruction failed".into()),
    }
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(input: &Path, output: Option<&Path>, args: &ExtractArgs) -> CliResult {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(5);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reconstructing layout...");
    let extraction = extract(input, &args.to_options()?)?;
    pb.inc(1);

    let document = match extraction {
        Extraction::Structured { document, html } => {
            pb.set_message("Writing HTML...");
            fs::write(output_dir.join("extract.html"), &html)?;
            pb.inc(1);
            document
        }
        Extraction::PlainText(text) => {
            fs::write(output_dir.join("extract.txt"), &text)?;
            pb.finish_with_message("Done (plain text only)");
            println!("\n{}", "Output files:".green().bold());
            println!("  {} extract.txt", "└─".dimmed());
            return Ok(());
        }
    };

    let render_options = RenderOptions::new().with_frontmatter(true);

    pb.set_message("Generating Markdown...");
    fs::write(
        output_dir.join("extract.md"),
        render::to_markdown(&document, &render_options),
    )?;
    pb.inc(1);

    pb.set_message("Generating text...");
    fs::write(
        output_dir.join("extract.txt"),
        render::to_text(&document, &render_options),
    )?;
    pb.inc(1);

    pb.set_message("Generating JSON...");
    fs::write(
        output_dir.join("content.json"),
        render::to_json(&document, JsonFormat::Pretty)?,
    )?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} extract.html", "├─".dimmed());
    println!("  {} extract.md", "├─".dimmed());
    println!("  {} extract.txt", "├─".dimmed());
    println!("  {} content.json", "└─".dimmed());

    Ok(())
}

fn cmd_html(input: &Path, output: Option<&Path>, class: &str, args: &ExtractArgs) -> CliResult {
    let options = args.to_options()?;
    let render = options.render.clone().with_container_class(class);
    let options = options.with_render_options(render);

    let extraction = extract(input, &options)?;
    write_output(output, extraction.content())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    frontmatter: bool,
    args: &ExtractArgs,
) -> CliResult {
    let doc = structured(input, args)?;
    let render_options = RenderOptions::new().with_frontmatter(frontmatter);
    write_output(output, &render::to_markdown(&doc, &render_options))
}

fn cmd_text(input: &Path, output: Option<&Path>, args: &ExtractArgs) -> CliResult {
    let extraction = extract(input, &args.to_options()?)?;
    let text = match &extraction {
        Extraction::Structured { document, .. } => {
            render::to_text(document, &RenderOptions::default())
        }
        Extraction::PlainText(text) => text.clone(),
    };
    write_output(output, &text)
}

fn cmd_json(input: &Path, output: Option<&Path>, compact: bool, args: &ExtractArgs) -> CliResult {
    let doc = structured(input, args)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    write_output(output, &render::to_json(&doc, format)?)
}

fn cmd_info(input: &Path, json: bool, args: &ExtractArgs) -> CliResult {
    let parser = PdfParser::open(input)?;
    let metadata = parser.metadata();

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), metadata.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if metadata.encrypted { "Yes" } else { "No" }
    );

    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Creator", &metadata.creator),
        ("Producer", &metadata.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }
    if let Some(created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Layout Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    match extract(input, &args.to_options()?)? {
        Extraction::Structured { document, .. } => {
            let stats = ExtractionStats::from_document(&document);
            println!("{}: {}", "Headers".bold(), stats.header_count);
            println!("{}: {}", "Sub-headers".bold(), stats.sub_header_count);
            println!("{}: {}", "Bullets".bold(), stats.bullet_count);
            println!("{}: {}", "Numbered".bold(), stats.numbered_count);
            println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
            println!("{}: {}", "Words".bold(), stats.word_count);
            println!("{}: {}", "Characters".bold(), stats.char_count);

            let colors: Vec<String> = document
                .diagnostics
                .colors
                .iter()
                .map(|c| c.to_css())
                .collect();
            println!("{}: {}", "Colors".bold(), colors.join(", "));
            let fonts: Vec<&str> = document.diagnostics.fonts.iter().map(|f| f.css()).collect();
            println!("{}: {}", "Fonts".bold(), fonts.join(", "));
        }
        Extraction::PlainText(text) => {
            println!("{}: {}", "Words".bold(), text.split_whitespace().count());
            println!("{}: {}", "Characters".bold(), text.chars().count());
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfblocks".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF layout reconstruction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfblocks".dimmed());
    println!("License: MIT");
}
