use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use xml_search::SearchQuery;

#[derive(Parser, Debug)]
#[command(name = "xml-search")]
#[command(about = "Search XML documents with streaming, DOM and element-tree parsers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Strategy to use (sax, dom, etree)
    #[arg(
        short,
        long,
        global = true,
        env = "XML_SEARCH_STRATEGY",
        default_value = "sax"
    )]
    pub strategy: String,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find elements matching a query
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Output format (text, xml, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write the output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run every strategy instead of only --strategy
        #[arg(long)]
        all: bool,
    },

    /// List attribute names used on an element
    Attributes {
        file: PathBuf,
        element: String,
    },

    /// List values an attribute takes on an element
    Values {
        file: PathBuf,
        element: String,
        attribute: String,
    },

    /// List every element name in a document
    Elements { file: PathBuf },

    /// Run a query through every strategy and compare the matches
    Compare {
        #[command(flatten)]
        query: QueryArgs,

        /// Emit the report as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },

    /// Evaluate an XPath expression with the element-tree strategy
    Select { file: PathBuf, expr: String },

    /// List registered strategies
    Strategies,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// XML document to search
    pub file: PathBuf,

    /// Element name, matched case-insensitively
    pub element: String,

    /// Attribute that must be present
    #[arg(short, long, requires = "value")]
    pub attribute: Option<String>,

    /// Required value of --attribute
    #[arg(long, requires = "attribute")]
    pub value: Option<String>,

    /// Substring the element's own text must contain
    #[arg(short, long)]
    pub text: Option<String>,
}

impl QueryArgs {
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery {
            element_name: self.element.clone(),
            attribute_name: self.attribute.clone(),
            attribute_value: self.value.clone(),
            text_contains: self.text.clone(),
        }
    }
}
