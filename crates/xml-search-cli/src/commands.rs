//! Command execution. Every command returns the text it would print.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use xml_search::{
    compare_strategies, export_to_file, render, results_to_xml, EtreeStrategy, EventSink,
    ExportFormat, MemorySink, ParserStrategy, Payload, Registry, SearchEvent, SearchResult,
    TracingSink,
};

use crate::cli::{Cli, Commands, QueryArgs};

/// Keeps events for the timing footer and forwards them to the log
#[derive(Debug, Default, Clone)]
struct CliSink {
    memory: MemorySink,
}

impl EventSink for CliSink {
    fn record(&self, event: &SearchEvent) {
        TracingSink.record(event);
        self.memory.record(event);
    }
}

pub fn run(cli: Cli) -> Result<String> {
    let sink = CliSink::default();
    let registry = Registry::with_sink(Arc::new(sink.clone()));

    match cli.command {
        Commands::Search {
            query,
            format,
            output,
            all,
        } => {
            let format: ExportFormat = format.parse()?;
            let chosen = if all {
                None
            } else {
                Some(registry.resolve(&cli.strategy)?)
            };
            let strategies: Vec<&dyn ParserStrategy> = match &chosen {
                Some(strategy) => vec![strategy.as_ref()],
                None => registry.strategies().collect(),
            };
            let results = search(&strategies, &query)?;

            if let Some(path) = output {
                match results.as_slice() {
                    [single] => export_to_file(&Payload::from(single.clone()), format, &path)?,
                    many => fs::write(&path, render_results(many, format)?)
                        .with_context(|| format!("failed to write {}", path.display()))?,
                }
                return Ok(format!("Wrote {} output to {}", format, path.display()));
            }

            let mut rendered = render_results(&results, format)?;
            if format == ExportFormat::Text {
                rendered.push_str("\n\nTiming:\n");
                rendered.push_str(&sink.memory.lines().join("\n"));
            }
            Ok(rendered)
        }
        Commands::Attributes { file, element } => {
            let strategy = registry.resolve(&cli.strategy)?;
            let found = strategy.available_attributes(&file, &element)?;
            Ok(found.into_iter().collect::<Vec<_>>().join("\n"))
        }
        Commands::Values {
            file,
            element,
            attribute,
        } => {
            let strategy = registry.resolve(&cli.strategy)?;
            let found = strategy.attribute_values(&file, &element, &attribute)?;
            Ok(found.into_iter().collect::<Vec<_>>().join("\n"))
        }
        Commands::Elements { file } => {
            let strategy = registry.resolve(&cli.strategy)?;
            let found = strategy.element_names(&file)?;
            Ok(found.into_iter().collect::<Vec<_>>().join("\n"))
        }
        Commands::Compare { query, json } => {
            let search = query.to_query();
            search.validate()?;
            let strategies: Vec<&dyn ParserStrategy> = registry.strategies().collect();
            let report = compare_strategies(&strategies, &query.file, &search);
            debug!(agree = report.all_agree(), "comparison finished");
            Ok(if json {
                report.to_json()
            } else {
                report.to_markdown()
            })
        }
        Commands::Select { file, expr } => {
            let elements = EtreeStrategy::new().select(&file, &expr)?;
            let mut lines = vec![format!("{} element(s)", elements.len())];
            for element in &elements {
                let attrs: String = element
                    .attrib
                    .iter()
                    .map(|(k, v)| format!(" {}=\"{}\"", k, v))
                    .collect();
                let text = element.text.as_deref().map(str::trim).unwrap_or_default();
                lines.push(
                    format!("<{}{}> {}", element.tag, attrs, text)
                        .trim_end()
                        .to_string(),
                );
            }
            Ok(lines.join("\n"))
        }
        Commands::Strategies => {
            let lines: Vec<String> = registry
                .names()
                .into_iter()
                .zip(registry.strategies())
                .map(|(name, strategy)| format!("{:<6} {}", name, strategy.parser_name()))
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

fn search(strategies: &[&dyn ParserStrategy], args: &QueryArgs) -> Result<Vec<SearchResult>> {
    let query = args.to_query();
    query.validate()?;
    strategies
        .iter()
        .map(|strategy| {
            strategy.parse(&args.file, &query).with_context(|| {
                format!(
                    "{} could not search {}",
                    strategy.parser_name(),
                    args.file.display()
                )
            })
        })
        .collect()
}

fn render_results(results: &[SearchResult], format: ExportFormat) -> Result<String> {
    let rendered = match (results, format) {
        ([single], _) => render(&Payload::from(single.clone()), format)?,
        (many, ExportFormat::Xml) => results_to_xml(many)?,
        (many, ExportFormat::Json) => serde_json::to_string_pretty(many)?,
        (many, ExportFormat::Text) => many
            .iter()
            .map(SearchResult::detailed)
            .collect::<Vec<_>>()
            .join("\n\n"),
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    const CATALOG: &str = r#"<catalog>
    <book id="bk101" lang="en"><title>Rust in Action</title></book>
    <book id="bk102" lang="fr"><title>Le Petit Prince</title></book>
</catalog>"#;

    fn xml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn run_args(args: &[&str]) -> Result<String> {
        let mut argv = vec!["xml-search"];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn search_prints_details_and_timing() {
        let file = xml_file(CATALOG);
        let path = file.path().to_str().unwrap();
        let out = run_args(&["search", path, "title", "-t", "rust", "-s", "etree"]).unwrap();

        assert!(out.contains("Parser: ElementTree Parser"));
        assert!(out.contains("Results found: 1"));
        assert!(out.contains("   Path: catalog/book/title"));
        assert!(out.contains("Timing:\nParser: ElementTree Parser"));
    }

    #[test]
    fn search_all_as_xml() {
        let file = xml_file(CATALOG);
        let path = file.path().to_str().unwrap();
        let out = run_args(&["search", path, "book", "--all", "-f", "xml"]).unwrap();
        assert!(out.contains("<multipleSearchResults>"));
        assert!(out.contains("<searchResult index=\"3\">"));
    }

    #[test]
    fn search_writes_output_file() {
        let file = xml_file(CATALOG);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("result.json");
        let out = run_args(&[
            "search",
            file.path().to_str().unwrap(),
            "book",
            "-a",
            "lang",
            "--value",
            "fr",
            "-f",
            "json",
            "-o",
            target.to_str().unwrap(),
        ])
        .unwrap();

        assert!(out.starts_with("Wrote json output to"));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(json["elements"][0]["attributes"]["id"], "bk102");
    }

    #[test]
    fn unknown_format_is_reported() {
        let file = xml_file(CATALOG);
        let err = run_args(&["search", file.path().to_str().unwrap(), "book", "-f", "yaml"])
            .unwrap_err();
        let err = err.downcast::<xml_search::Error>().unwrap();
        assert_eq!(err.kind(), xml_search::ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn discovery_commands() {
        let file = xml_file(CATALOG);
        let path = file.path().to_str().unwrap();
        assert_eq!(run_args(&["attributes", path, "BOOK"]).unwrap(), "id\nlang");
        assert_eq!(run_args(&["values", path, "book", "lang", "-s", "dom"]).unwrap(), "en\nfr");
        assert_eq!(run_args(&["elements", path]).unwrap(), "book\ncatalog\ntitle");
    }

    #[test]
    fn compare_and_select() {
        let file = xml_file(CATALOG);
        let path = file.path().to_str().unwrap();
        let md = run_args(&["compare", path, "title"]).unwrap();
        assert!(md.contains("All strategies agree."));

        let selected = run_args(&["select", path, "//book[@lang='fr']/title"]).unwrap();
        assert_eq!(selected, "1 element(s)\n<title> Le Petit Prince");
    }

    #[test]
    fn strategies_lists_registry() {
        let out = run_args(&["strategies"]).unwrap();
        assert_eq!(
            out,
            "sax    SAX Parser\ndom    DOM Parser\netree  ElementTree Parser"
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = run_args(&["elements", "/no/such/file.xml"]).unwrap_err();
        let err = err.downcast::<xml_search::Error>().unwrap();
        assert_eq!(err.kind(), xml_search::ErrorKind::NotFound);
    }
}
