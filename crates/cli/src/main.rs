//! CLI tool for segmenting Markdown documents into slide decks.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mdslides_core::animation::{self, KNOWN_ANIMATIONS};
use mdslides_core::split::{DEFAULT_CHAR_LIMIT, DEFAULT_LINE_LIMIT};
use mdslides_core::{Alignment, Deck, RevealFormatter, Segmenter, SlideNode};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Segment Markdown into a slide deck.
#[derive(Parser, Debug)]
#[command(name = "mdslides")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input Markdown file(s); `-` reads stdin
    #[arg(required_unless_present = "list_animations")]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Global fragment style (`none` disables)
    #[arg(short, long, default_value = animation::NO_ANIMATION)]
    animation: String,

    /// Alignment for slides without a `::left` marker
    #[arg(long, default_value = "center")]
    alignment: Alignment,

    /// Character count above which a slide is auto-split
    #[arg(long, default_value_t = DEFAULT_CHAR_LIMIT)]
    char_limit: usize,

    /// Line count above which a slide is auto-split
    #[arg(long, default_value_t = DEFAULT_LINE_LIMIT)]
    line_limit: usize,

    /// Print the `horizontal,vertical` index of the slide containing this
    /// zero-indexed line instead of the deck
    #[arg(long)]
    locate: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// List the known fragment styles and exit
    #[arg(long)]
    list_animations: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output representation of a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Node tree as JSON
    Json,
    /// One line per slide with its index and source lines
    Outline,
    /// Slideshow-runtime `<section>` markup
    Reveal,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Outline => "txt",
            Self::Reveal => "html",
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if args.list_animations {
        for name in KNOWN_ANIMATIONS {
            println!("{}", name);
        }
        return Ok(());
    }

    if !animation::is_known(&args.animation) {
        log::warn!(
            "Unknown fragment style '{}'; passing it through unchanged",
            args.animation
        );
    }

    let segmenter = Segmenter::new()
        .with_animation(&args.animation)
        .with_alignment(args.alignment)
        .with_char_limit(args.char_limit)
        .with_line_limit(args.line_limit);

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &segmenter) {
            Ok(output) => {
                if args.print || is_stdin(input_path) || args.locate.is_some() {
                    print!("{}", output);
                } else {
                    let output_path =
                        get_output_path(input_path, args.output.as_ref(), args.format)?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Segment a single Markdown document and render it.
fn process_file(input_path: &Path, args: &Args, segmenter: &Segmenter) -> Result<String> {
    let text = read_input(input_path)?;
    let deck = segmenter.segment(&text);

    if args.verbose {
        eprintln!(
            "  Found {} positions, {} slides",
            deck.nodes.len(),
            deck.slide_count()
        );
    }

    if let Some(line) = args.locate {
        let index = deck
            .locate_line(line)
            .with_context(|| format!("Line {} is not inside any slide", line))?;
        return Ok(format!("{},{}\n", index.horizontal, index.vertical));
    }

    let output = match args.format {
        OutputFormat::Json => format!("{}\n", deck.to_json(args.pretty)?),
        OutputFormat::Outline => render_outline(&deck),
        OutputFormat::Reveal => RevealFormatter::new().format_with_newline(&deck),
    };

    Ok(output)
}

/// Read a document from a path or stdin.
fn read_input(input_path: &Path) -> Result<String> {
    let mut text = String::new();
    if is_stdin(input_path) {
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
    } else {
        File::open(input_path)
            .with_context(|| format!("Failed to open {}", input_path.display()))?
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to read {}", input_path.display()))?;
    }
    Ok(text)
}

/// One line per slide: navigation index, title or first line, source span.
fn render_outline(deck: &Deck) -> String {
    let mut out = String::new();
    for flat in deck.flatten() {
        let slide = flat.slide;
        let label = slide
            .title()
            .or_else(|| slide.content.lines().next())
            .unwrap_or_default();
        let stacked = matches!(deck.nodes[flat.index.horizontal], SlideNode::Stack(_));
        let position = if stacked {
            format!("{}.{}", flat.index.horizontal, flat.index.vertical)
        } else {
            flat.index.horizontal.to_string()
        };
        let indent = if flat.is_sub_slide() { "  " } else { "" };
        let notes = if slide.notes.is_some() { " [notes]" } else { "" };

        out.push_str(&format!(
            "{}[{}] {} (lines {}-{}){}\n",
            indent, position, label, slide.source_range.start, slide.source_range.end, notes
        ));
    }
    out
}

/// Determine the output path for a processed file.
fn get_output_path(
    input_path: &Path,
    output_dir: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.{}", stem, format.extension());

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_format_extension() {
        let path = get_output_path(Path::new("talks/intro.md"), None, OutputFormat::Reveal).unwrap();
        assert_eq!(path, PathBuf::from("talks/intro.html"));

        let path = get_output_path(Path::new("intro.md"), None, OutputFormat::Json).unwrap();
        assert_eq!(path, PathBuf::from("intro.json"));
    }

    #[test]
    fn test_render_outline() {
        let deck = Segmenter::new().segment("# Title\n---\n## A\nNote: hi\n### B\ntext");
        let outline = render_outline(&deck);

        assert_eq!(
            outline,
            "[0] Title (lines 0-0)\n[1.0] A (lines 2-3) [notes]\n  [1.1] A - B (lines 4-5)\n"
        );
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "mdslides",
            "deck.md",
            "--alignment",
            "left",
            "-a",
            "fade-up",
            "--format",
            "outline",
        ]);
        assert_eq!(args.alignment, Alignment::Left);
        assert_eq!(args.animation, "fade-up");
        assert_eq!(args.format, OutputFormat::Outline);
        assert_eq!(args.line_limit, DEFAULT_LINE_LIMIT);
    }
}
