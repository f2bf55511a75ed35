//! sift: query element trees with CSS selectors
//!
//! Loads a JSON element tree, runs a selector against it, optionally applies
//! one traversal step to the matches, and prints the result.
//!
//! Logging goes to stderr. `RUST_LOG` sets the filter unless `-v` is given.

use std::fmt::Write as _;
use std::io::{self, Read};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use owo_colors::{OwoColorize, Stream};
use sift_css::{NodeSet, query, query_first};
use sift_dom::{DomTree, NodeId, print_tree};
use strum_macros::{Display, EnumString};
use tracing_subscriber::EnvFilter;

/// sift: CSS selectors over JSON element trees
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Every list item of a page
    sift page.json 'ul > li'

    # Odd rows, as text
    sift page.json 'tr:nth-child(odd)' --format text

    # Parents of the headings that carry a content attribute
    sift page.json 'h3, h4' --then 'parent:[content]'

    # Query inside the first nav only
    sift page.json a --scope nav --format html

    # Inline tree, read from an argument
    sift --json '{"tag":"ul","children":[{"tag":"li","text":"1"}]}' li --format count

    # Read the tree from stdin
    cat page.json | sift - 'a[href^=http]'
"#)]
struct Cli {
    /// Tree file (`-` for stdin) followed by the selector; only the
    /// selector when --json is given
    #[arg(required = true, num_args = 1..=2, value_name = "FILE SELECTOR")]
    inputs: Vec<String>,

    /// Parse the tree from this JSON string instead of a file
    #[arg(long, value_name = "JSON")]
    json: Option<String>,

    /// Run the selector from the first node matching this selector
    #[arg(long, value_name = "SELECTOR")]
    scope: Option<String>,

    /// Traversal step applied to the matches, e.g. `parent`, `closest:div`,
    /// `find:li`, `next-until:span`
    #[arg(long = "then", value_name = "OP[:ARG]")]
    step: Option<Step>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Tags)]
    format: Format,

    /// Trim each node's own text before joining (text format)
    #[arg(long)]
    trim: bool,

    /// Print the loaded tree before the results
    #[arg(long)]
    tree: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// How matches are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One node id per line
    Ids,
    /// Each node's text, children included
    Text,
    /// Each node's markup
    Html,
    /// Only the number of matches
    Count,
    /// Tag, id and classes of each node
    Tags,
}

/// Traversal operations available to `--then`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
enum StepOp {
    Parent,
    Parents,
    ParentsUntil,
    Closest,
    Children,
    Find,
    Siblings,
    Next,
    Prev,
    NextAll,
    PrevAll,
    NextUntil,
    PrevUntil,
    Not,
    Filter,
    First,
    Last,
}

impl StepOp {
    /// Operations whose argument is a selector they cannot do without.
    const fn requires_argument(self) -> bool {
        matches!(self, Self::Find | Self::Not | Self::Filter)
    }
}

/// A parsed `--then` value.
#[derive(Debug, Clone)]
struct Step {
    op: StepOp,
    argument: Option<String>,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (name, argument) = match text.split_once(':') {
            Some((name, argument)) => (name, Some(argument.trim().to_string())),
            None => (text, None),
        };
        let op = StepOp::from_str(name.trim())
            .map_err(|_| format!("unknown traversal operation '{}'", name.trim()))?;
        let argument = argument.filter(|argument| !argument.is_empty());
        if op.requires_argument() && argument.is_none() {
            return Err(format!("'{op}' needs a selector, as in '{op}:li'"));
        }
        Ok(Self { op, argument })
    }
}

impl Step {
    fn apply<'a>(&self, set: &NodeSet<'a, DomTree>) -> NodeSet<'a, DomTree> {
        let argument = self.argument.as_deref();
        let selector = argument.unwrap_or_default();
        match self.op {
            StepOp::Parent => set.parent(argument),
            StepOp::Parents => set.parents(argument),
            StepOp::ParentsUntil => set.parents_until(argument, None),
            StepOp::Closest => set.closest(argument),
            StepOp::Children => set.children(argument),
            StepOp::Find => set.find(selector),
            StepOp::Siblings => set.siblings(argument),
            StepOp::Next => set.next(argument),
            StepOp::Prev => set.prev(argument),
            StepOp::NextAll => set.next_all(argument),
            StepOp::PrevAll => set.prev_all(argument),
            StepOp::NextUntil => set.next_until(argument, None),
            StepOp::PrevUntil => set.prev_until(argument, None),
            StepOp::Not => set.not(selector),
            StepOp::Filter => set.filter(selector),
            StepOp::First => set.first(),
            StepOp::Last => set.last(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (file, selector) = match (cli.json.is_some(), cli.inputs.as_slice()) {
        (true, [selector]) => (None, selector.as_str()),
        (false, [file, selector]) => (Some(file.as_str()), selector.as_str()),
        (true, _) => bail!("with --json, pass only the SELECTOR"),
        (false, _) => bail!("expected a tree FILE and a SELECTOR (or --json and a SELECTOR)"),
    };

    let tree = load_tree(cli.json.as_deref(), file)?;
    if cli.tree {
        println!("{}", "=== Tree ===".if_supports_color(Stream::Stdout, |t| t.bold()));
        print_tree(&tree, tree.root(), 0);
        println!();
    }

    let scope = match &cli.scope {
        Some(scope) => query_first(&tree, tree.root(), scope)
            .with_context(|| format!("scope selector '{scope}' matched nothing"))?,
        None => tree.root(),
    };

    let mut set = query(&tree, scope, selector);
    if let Some(step) = &cli.step {
        let before = set.count();
        set = step.apply(&set);
        tracing::debug!(op = %step.op, argument = ?step.argument, before, after = set.count(), "traversal");
    }

    print_result(&set, cli.format, cli.trim);
    Ok(())
}

/// Install the stderr subscriber. `-v` overrides `RUST_LOG`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read and parse the tree from `--json`, a file, or stdin (`-`).
fn load_tree(json: Option<&str>, file: Option<&str>) -> Result<DomTree> {
    let source = match (json, file) {
        (Some(json), _) => json.to_string(),
        (None, Some("-")) => {
            let mut source = String::new();
            let _ = io::stdin()
                .read_to_string(&mut source)
                .context("failed to read tree from stdin")?;
            source
        }
        (None, Some(path)) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
        }
        (None, None) => bail!("no tree given"),
    };

    let tree = DomTree::from_json(&source).context("failed to parse element tree")?;
    tracing::debug!(nodes = tree.len(), "loaded tree");
    Ok(tree)
}

fn print_result(set: &NodeSet<'_, DomTree>, format: Format, trim: bool) {
    let tree = set.tree();
    match format {
        Format::Count => println!("{}", set.count()),
        Format::Ids => {
            for id in set {
                println!("{id}");
            }
        }
        Format::Text => {
            for id in set {
                println!("{}", NodeSet::from_nodes(tree, [id]).text(true, trim));
            }
        }
        Format::Html => {
            for markup in set.to_xml_list() {
                println!("{markup}");
            }
        }
        Format::Tags => {
            for id in set {
                println!(
                    "{} {}",
                    id.if_supports_color(Stream::Stdout, |t| t.dimmed()),
                    describe(tree, id).if_supports_color(Stream::Stdout, |t| t.cyan())
                );
            }
        }
    }
}

/// `tag#id.class1.class2` for one node.
fn describe(tree: &DomTree, id: NodeId) -> String {
    let Some(element) = tree.as_element(id) else {
        return String::from("?");
    };
    let mut label = element.tag_name.clone();
    if let Some(element_id) = element.id() {
        let _ = write!(label, "#{element_id}");
    }
    for class in element.classes() {
        let _ = write!(label, ".{class}");
    }
    label
}
