//! littledom - query an HTML file with a CSS selector

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use littledom::{Document, Node};

#[derive(Parser)]
#[command(name = "littledom")]
#[command(version, about = "Query an HTML file with a CSS selector", long_about = None)]
#[command(after_help = "EXAMPLES:
    littledom page.html 'ul > li'            Print matching elements
    littledom page.html a --attr href        Print each link target
    littledom page.html '.card' --json       Summarize matches as JSON")]
struct Cli {
    /// HTML file to load
    #[arg(value_name = "FILE")]
    input: String,

    /// CSS selector to match
    #[arg(value_name = "SELECTOR")]
    selector: String,

    /// Print this attribute of each match
    #[arg(short, long, value_name = "NAME", conflicts_with = "html")]
    attr: Option<String>,

    /// Print the inner HTML of each match instead of its outer HTML
    #[arg(long)]
    html: bool,

    /// Print a JSON array of node summaries
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct NodeSummary {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    text: String,
}

impl NodeSummary {
    fn of(node: &Node) -> Self {
        let id = node.element_id();
        Self {
            tag: node.local_name(),
            id: (!id.is_empty()).then_some(id),
            classes: node.class_list(),
            attributes: node.attributes(),
            text: node.text_content().trim().to_string(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let doc = Document::open(&cli.input).map_err(|e| format!("{}: {e}", cli.input))?;
    let matches = doc.select(cli.selector.as_str()).map_err(|e| e.to_string())?;

    if cli.json {
        let summaries: Vec<NodeSummary> = matches.iter().map(NodeSummary::of).collect();
        let json = serde_json::to_string_pretty(&summaries).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    for node in &matches {
        match &cli.attr {
            Some(name) => {
                if let Some(value) = node.get_attribute(name) {
                    println!("{value}");
                }
            }
            None if cli.html => println!("{}", node.inner_html()),
            None => println!("{}", node.outer_html()),
        }
    }
    Ok(())
}
