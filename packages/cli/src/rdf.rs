//! Adapter from `oxttl` parse events to a [`StatementCollector`].
//!
//! Each file gets one parse pass. Syntax errors are recorded against the
//! file and parsing carries on with the next statement; an I/O error ends
//! that file. Neither stops the remaining files from being read.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use oxrdf::{Subject, Term as RdfTerm, Triple};
use oxttl::{NTriplesParser, TurtleParseError, TurtleParser};
use skosforest::{StatementCollector, Term};

/// Serialisations the CLI can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    NTriples,
}

impl RdfFormat {
    /// `.nt` is N-Triples; anything else is read as Turtle, which N-Triples
    /// is a subset of.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("nt") => RdfFormat::NTriples,
            _ => RdfFormat::Turtle,
        }
    }
}

/// Parse the file at `path` into `collector`, recording any failure
/// (including failure to open the file) as a parse error for that file.
pub fn load_path(collector: &mut StatementCollector, path: &Path) {
    collector.begin_source(path.display().to_string());
    match File::open(path) {
        Ok(file) => load_reader(collector, BufReader::new(file), RdfFormat::for_path(path)),
        Err(e) => collector.record_parse_error(format!("cannot open file: {e}")),
    }
}

/// Parse `reader` in `format` into `collector`. The caller is responsible
/// for [`StatementCollector::begin_source`].
pub fn load_reader(collector: &mut StatementCollector, reader: impl Read, format: RdfFormat) {
    match format {
        RdfFormat::Turtle => feed(collector, TurtleParser::new().for_reader(reader)),
        RdfFormat::NTriples => feed(collector, NTriplesParser::new().for_reader(reader)),
    }
}

fn feed(
    collector: &mut StatementCollector,
    triples: impl Iterator<Item = Result<Triple, TurtleParseError>>,
) {
    for result in triples {
        match result {
            Ok(triple) => observe(collector, &triple),
            Err(TurtleParseError::Syntax(e)) => collector.record_parse_error(e.to_string()),
            Err(TurtleParseError::Io(e)) => {
                collector.record_parse_error(format!("read failed: {e}"));
                break;
            }
        }
    }
}

#[allow(unreachable_patterns)]
fn observe(collector: &mut StatementCollector, triple: &Triple) {
    let subject = match &triple.subject {
        Subject::NamedNode(n) => n.as_str().to_string(),
        Subject::BlankNode(b) => format!("_:{}", b.as_str()),
        // quoted triples cannot be SKOS resources
        _ => return,
    };
    let object = match &triple.object {
        RdfTerm::NamedNode(n) => Term::iri(n.as_str()),
        RdfTerm::BlankNode(b) => Term::BlankNode(b.as_str().to_string()),
        RdfTerm::Literal(l) => Term::literal(l.value(), l.language()),
        _ => return,
    };
    collector.observe(&subject, triple.predicate.as_str(), &object);
}

// --- tests -------------------------------------------------------------------
