//! Clap argument definitions for the `quarry` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use quarry_search::{GroupBy, HeadingMode, OrderBy, SearchMethod};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Block search and find/replace over a document store")]
pub struct Cli {
    /// Storage location overrides.
    #[command(flatten)]
    pub store: StoreArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the configured storage locations.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Block database path (overrides [store] database)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Document tree directory (overrides [store] trees)
    #[arg(long, global = true)]
    pub trees: Option<PathBuf>,
}

/// Shared output mode flags.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Supported `quarry` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search blocks
    Search(SearchCommand),

    /// Resolve an embed block statement
    Embed(EmbedCommand),

    /// Find reference target candidates
    Refs(RefsCommand),

    /// Replace text in blocks and persist the changed documents
    Replace(ReplaceCommand),

    /// Print a document tree with search matches highlighted
    Highlight(HighlightCommand),

    /// Index document trees into the block database
    Index,

    /// Show effective configuration settings
    Config,
}

/// How the search query is interpreted.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MethodArg {
    /// Whitespace separated keywords
    #[default]
    Keyword,
    /// Full-text query syntax
    Query,
    /// A raw SQL statement
    Sql,
    /// A regular expression
    Regex,
}

impl From<MethodArg> for SearchMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Keyword => Self::Keyword,
            MethodArg::Query => Self::QuerySyntax,
            MethodArg::Sql => Self::Passthrough,
            MethodArg::Regex => Self::Regex,
        }
    }
}

/// Result ordering.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderArg {
    /// Block type
    #[default]
    Type,
    /// Oldest first
    Created,
    /// Newest first
    CreatedDesc,
    /// Least recently updated first
    Updated,
    /// Most recently updated first
    UpdatedDesc,
    /// Position in the document (with --group)
    Content,
    /// Least relevant first
    Relevance,
    /// Most relevant first
    RelevanceDesc,
}

impl From<OrderArg> for OrderBy {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Type => Self::Type,
            OrderArg::Created => Self::CreatedAsc,
            OrderArg::CreatedDesc => Self::CreatedDesc,
            OrderArg::Updated => Self::UpdatedAsc,
            OrderArg::UpdatedDesc => Self::UpdatedDesc,
            OrderArg::Content => Self::ContentOrder,
            OrderArg::Relevance => Self::RelevanceAsc,
            OrderArg::RelevanceDesc => Self::RelevanceDesc,
        }
    }
}

/// Which part of an embedded heading to resolve.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeadingModeArg {
    /// The heading and its section
    #[default]
    All,
    /// The heading alone
    Heading,
    /// The section without the heading
    Section,
}

impl From<HeadingModeArg> for HeadingMode {
    fn from(arg: HeadingModeArg) -> Self {
        match arg {
            HeadingModeArg::All => Self::WithSection,
            HeadingModeArg::Heading => Self::HeadingOnly,
            HeadingModeArg::Section => Self::SectionOnly,
        }
    }
}

/// Arguments for `quarry search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Query interpretation
    #[arg(short = 'm', long, value_enum, default_value_t)]
    pub method: MethodArg,

    /// Result ordering
    #[arg(short = 'o', long, value_enum, default_value_t)]
    pub order: OrderArg,

    /// Group matching blocks by document
    #[arg(short = 'g', long)]
    pub group: bool,

    /// Limit to boxes (can be specified multiple times)
    #[arg(short = 'b', long = "box")]
    pub boxes: Vec<String>,

    /// Limit to document path prefixes (can be specified multiple times)
    #[arg(short = 'p', long = "path")]
    pub paths: Vec<String>,

    /// Limit to block types such as paragraph or heading (can be specified multiple times)
    #[arg(short = 't', long = "type")]
    pub types: Vec<String>,

    /// Maximum rows to return [default: 64]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Match case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Output formatting flags.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `quarry embed`.
#[derive(Args, Debug, Clone)]
pub struct EmbedCommand {
    /// ID of the embed block
    pub embed_id: String,

    /// Statement the embed block runs
    pub stmt: String,

    /// Block IDs to leave out (can be specified multiple times)
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,

    /// Which part of embedded headings to resolve
    #[arg(long, value_enum, default_value_t)]
    pub heading_mode: HeadingModeArg,

    /// Include a breadcrumb for each block
    #[arg(long)]
    pub breadcrumb: bool,

    /// Output formatting flags.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `quarry refs`.
#[derive(Args, Debug, Clone)]
pub struct RefsCommand {
    /// Block the reference is being written in
    pub id: String,

    /// Document the reference is being written in
    pub root_id: String,

    /// Text typed so far; empty lists recent reference targets
    #[arg(default_value = "")]
    pub keyword: String,

    /// Output formatting flags.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `quarry replace`.
#[derive(Args, Debug, Clone)]
pub struct ReplaceCommand {
    /// Text to find
    pub keyword: String,

    /// Replacement text
    pub replacement: String,

    /// Blocks to rewrite (can be specified multiple times)
    #[arg(long = "id", required = true)]
    pub ids: Vec<String>,

    /// Treat the keyword as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Output formatting flags.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `quarry highlight`.
#[derive(Args, Debug, Clone)]
pub struct HighlightCommand {
    /// Document to highlight
    pub root_id: String,

    /// Keywords to mark
    #[arg(required = true)]
    pub keywords: Vec<String>,

    /// List mention previews of matching blocks instead of the highlighted tree
    #[arg(long)]
    pub preview: bool,

    /// Output formatting flags.
    #[command(flatten)]
    pub output: OutputArgs,
}
