//! `skosforest`: concept forest command-line interface.
//!
//! Two subcommands:
//!
//! - **`build`**: parse one or more SKOS files and write the tree document.
//! - **`render`**: print a stored tree document as an indented text tree.
//!
//! Exit codes: 0 when a tree (or an empty result) was produced, 1 when no
//! tree could be produced, 2 on usage or I/O errors.

mod rdf;

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use skosforest::{
    render_document, BrowseConfiguration, ConceptTreeTransform, StatementCollector, TreeDocument,
    TreeOutcome,
};

/// skosforest: build browsable concept trees from SKOS vocabularies
#[derive(Parser)]
#[command(name = "skosforest", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the tree document for a vocabulary.
    ///
    /// All FILEs are read into one vocabulary. `.nt` files are parsed as
    /// N-Triples, everything else as Turtle. If any file fails to parse, or
    /// the hierarchy has a cycle, no tree is written and an existing OUT is
    /// removed.
    ///
    /// Examples:
    ///   skosforest build vocab.ttl -o tree.json
    ///   skosforest build a.ttl b.nt --flag maySortByNotation --flag notationDotted
    Build {
        /// SKOS files to read.
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Browse flag; repeat for several. Also read comma-separated from
        /// SKOSFOREST_FLAGS.
        #[arg(
            long = "flag",
            value_name = "FLAG",
            env = "SKOSFOREST_FLAGS",
            value_delimiter = ','
        )]
        flags: Vec<String>,

        /// Reject unknown browse flags instead of ignoring them.
        #[arg(long)]
        strict_flags: bool,

        /// Primary language of the vocabulary.
        #[arg(
            short = 'l',
            long,
            value_name = "TAG",
            env = "SKOSFOREST_LANGUAGE",
            default_value = "en"
        )]
        language: String,

        /// Where to write the document. Defaults to stdout.
        #[arg(short = 'o', long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Render a stored tree document as text.
    ///
    /// Pass `-` as FILE to read from stdin.
    Render {
        /// Path to a tree document, or `-` for stdin.
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skosforest=info,skosforest_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            files,
            flags,
            strict_flags,
            language,
            output,
            pretty,
        } => {
            let config = if strict_flags {
                BrowseConfiguration::from_flags_strict(&flags)
            } else {
                BrowseConfiguration::from_flags(&flags)
            }
            .unwrap_or_else(|e| fatal(&format!("invalid browse flags: {}", e)));
            let transform = ConceptTreeTransform::new(config, &language)
                .unwrap_or_else(|e| fatal(&e.to_string()));

            let mut collector = StatementCollector::new();
            for file in &files {
                rdf::load_path(&mut collector, file);
            }
            tracing::info!(
                "read {} statement(s) from {} file(s)",
                collector.observed(),
                files.len()
            );

            match transform.run(collector) {
                TreeOutcome::Tree(result) => {
                    for diagnostic in &result.diagnostics {
                        eprintln!("skosforest: warning: {}", diagnostic);
                    }
                    write_document(&result.document, output.as_deref(), pretty);
                }
                TreeOutcome::Empty => {
                    if let Some(path) = &output {
                        clear_output(path);
                    }
                    eprintln!("skosforest: no concepts found; nothing written");
                }
                TreeOutcome::NoTree(no_tree) => {
                    if let Some(path) = &output {
                        clear_output(path);
                    }
                    eprintln!("skosforest: no tree produced: {}", no_tree.reason);
                    if let Some(alert) = &no_tree.alert {
                        eprintln!("skosforest: {}", alert);
                    }
                    process::exit(1);
                }
            }
        }

        Command::Render { file } => {
            let json = read_input(&file);
            let doc = TreeDocument::from_json(&json)
                .unwrap_or_else(|e| fatal(&format!("failed to parse tree document: {}", e)));
            print!("{}", render_document(&doc));
        }
    }
}

fn write_document(doc: &TreeDocument, output: Option<&Path>, pretty: bool) {
    let result = match output {
        Some(path) => {
            let file = File::create(path)
                .unwrap_or_else(|e| fatal(&format!("failed to create {}: {}", path.display(), e)));
            write_json(doc, BufWriter::new(file), pretty)
        }
        None => write_json(doc, io::stdout().lock(), pretty),
    };
    if let Err(e) = result {
        fatal(&e.to_string());
    }
}

fn write_json(
    doc: &TreeDocument,
    mut writer: impl Write,
    pretty: bool,
) -> Result<(), skosforest::TransformError> {
    if pretty {
        writeln!(writer, "{}", doc.to_json_pretty()?)?;
        writer.flush()?;
        Ok(())
    } else {
        doc.write_to(writer)
    }
}

/// Remove a previously written document. A missing file is not an error.
fn clear_output(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::info!("removed stale {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => fatal(&format!("failed to remove {}: {}", path.display(), e)),
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &Path) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {}", path.display(), e)))
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("skosforest: {}", msg);
    process::exit(2);
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_arguments() {
        let cli = Cli::try_parse_from([
            "skosforest",
            "build",
            "a.ttl",
            "b.nt",
            "--flag",
            "maySortByNotation",
            "--flag",
            "notationDotted",
            "-l",
            "de",
            "-o",
            "tree.json",
        ])
        .unwrap();
        match cli.command {
            Command::Build {
                files,
                flags,
                language,
                output,
                ..
            } => {
                assert_eq!(files, vec![PathBuf::from("a.ttl"), PathBuf::from("b.nt")]);
                assert_eq!(flags, vec!["maySortByNotation", "notationDotted"]);
                assert_eq!(language, "de");
                assert_eq!(output, Some(PathBuf::from("tree.json")));
            }
            Command::Render { .. } => panic!("expected build"),
        }
    }

    #[test]
    fn build_requires_a_file() {
        assert!(Cli::try_parse_from(["skosforest", "build"]).is_err());
    }

    #[test]
    fn clear_output_ignores_missing_file() {
        clear_output(Path::new("/nonexistent/skosforest/tree.json"));
    }
}
