//! Thicket CLI
//!
//! Parse an HTML document or fragment and print the resulting tree.

mod json;

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser as ClapParser, ValueEnum};
use owo_colors::OwoColorize;

use thicket_common::warning::clear_warnings;
use thicket_dom::{Document, Namespace, NodeId};
use thicket_html::{FragmentContext, ParseIssue, Parser, ParserOptions, format_tree};

use json::JsonNode;

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// html5lib-style indented tree
    Tree,
    /// HTML serialization
    Html,
    /// JSON dump
    Json,
}

/// Thicket: parse HTML the way browsers do
#[derive(ClapParser, Debug)]
#[command(name = "thicket")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r"EXAMPLES:
    # Print the tree of a file
    thicket ./index.html

    # Parse inline HTML
    thicket --html '<p>1<b>2<i>3</b>4</i>5</p>'

    # Parse a fragment as the children of a <tr>
    thicket --fragment tr --html '<td>a<td>b'

    # Fragment in SVG
    thicket --fragment svg:g --html '<circle/>'

    # Feed the input 3 bytes at a time
    thicket --chunk-size 3 --format html ./index.html
")]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE", required_unless_present = "html")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Parse as a fragment in this context element (`div`, `svg:g`, `math:mi`)
    #[arg(long, value_name = "CONTEXT")]
    fragment: Option<String>,

    /// Parse with the scripting flag enabled
    #[arg(long)]
    scripting: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Feed the input in chunks of at most this many bytes
    #[arg(long, value_name = "N")]
    chunk_size: Option<usize>,

    /// Print parse errors after the output
    #[arg(long)]
    issues: bool,

    /// Log tree builder and tokenizer activity
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    clear_warnings();

    let html = load_input(&cli)?;
    let context = cli.fragment.as_deref().map(fragment_context).transpose()?;
    let is_fragment = context.is_some();

    let options = ParserOptions::new().with_scripting(cli.scripting);
    let mut parser = Parser::new("about:blank", context, options);
    feed(&mut parser, &html, cli.chunk_size)?;

    let issues: Vec<ParseIssue> = parser.issues().to_vec();
    let nodes = if is_fragment {
        parser.fragment_children()
    } else {
        Vec::new()
    };
    let document = parser.into_document();

    let output = if is_fragment {
        render_fragment(&document, &nodes, cli.format)?
    } else {
        render_document(&document, cli.format)?
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        writeln!(stdout)?;
    }

    if cli.issues {
        print_issues(&issues);
    }
    Ok(())
}

/// Read the document from `--html` or the file argument.
fn load_input(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        return Ok(html.clone());
    }
    let Some(ref path) = cli.path else {
        bail!("either a FILE or --html is required");
    };
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// `div` is an HTML context; `svg:NAME` and `math:NAME` are foreign ones.
fn fragment_context(context: &str) -> Result<FragmentContext> {
    let (namespace, local_name) = match context.split_once(':') {
        None => (Namespace::Html, context),
        Some(("svg", name)) => (Namespace::Svg, name),
        Some(("math", name)) => (Namespace::MathMl, name),
        Some((prefix, _)) => bail!("unknown namespace prefix {prefix:?} (use svg: or math:)"),
    };
    if local_name.is_empty() {
        bail!("empty fragment context name");
    }
    Ok(FragmentContext::new(local_name, namespace))
}

/// Push the input into the parser, in chunks when asked.
fn feed(parser: &mut Parser, html: &str, chunk_size: Option<usize>) -> Result<()> {
    let Some(size) = chunk_size else {
        parser.parse(html, true);
        return Ok(());
    };
    if size == 0 {
        bail!("--chunk-size must be at least 1");
    }

    let mut rest = html;
    while !rest.is_empty() {
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (chunk, tail) = rest.split_at(end);
        log::debug!("feeding {} bytes", chunk.len());
        parser.parse(chunk, false);
        rest = tail;
    }
    parser.parse("", true);
    Ok(())
}

fn render_document(document: &Document, format: Format) -> Result<String> {
    Ok(match format {
        Format::Tree => format_tree(document, document.root()),
        Format::Html => document.to_html(),
        Format::Json => {
            let dump = JsonNode::build(document, document.root()).context("document has no root")?;
            serde_json::to_string_pretty(&dump)?
        }
    })
}

fn render_fragment(document: &Document, nodes: &[NodeId], format: Format) -> Result<String> {
    Ok(match format {
        Format::Tree => nodes
            .iter()
            .map(|&node| format_tree(document, node))
            .collect(),
        Format::Html => nodes
            .iter()
            .map(|&node| document.outer_html(node))
            .collect(),
        Format::Json => serde_json::to_string_pretty(&JsonNode::fragment(document, nodes))?,
    })
}

fn print_issues(issues: &[ParseIssue]) {
    if issues.is_empty() {
        eprintln!("{}", "no parse errors".green());
        return;
    }
    eprintln!("{}", format!("{} parse errors", issues.len()).yellow().bold());
    for issue in issues {
        eprintln!(
            "  {} {}",
            format!("@{}", issue.position).dimmed(),
            issue.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_context_names() {
        let html = fragment_context("td").expect("html context");
        assert_eq!(html.namespace, Namespace::Html);
        assert_eq!(html.local_name, "td");

        let svg = fragment_context("svg:g").expect("svg context");
        assert_eq!(svg.namespace, Namespace::Svg);
        assert_eq!(svg.local_name, "g");

        assert!(fragment_context("xul:box").is_err());
        assert!(fragment_context("math:").is_err());
    }

    #[test]
    fn test_chunked_feed_matches_whole_input() {
        let html = "<p>caf\u{e9} &amp; cr\u{e8}me<table>x</table>";

        let mut whole = Parser::new("about:blank", None, ParserOptions::new());
        feed(&mut whole, html, None).expect("feed");

        let mut chunked = Parser::new("about:blank", None, ParserOptions::new());
        feed(&mut chunked, html, Some(2)).expect("feed");

        let whole = whole.into_document();
        let chunked = chunked.into_document();
        assert_eq!(whole.to_html(), chunked.to_html());
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let mut parser = Parser::new("about:blank", None, ParserOptions::new());
        assert!(feed(&mut parser, "x", Some(0)).is_err());
    }
}
