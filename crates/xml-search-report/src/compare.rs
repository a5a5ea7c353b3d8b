//! Cross-strategy comparison report
//!
//! Runs the same query through several strategies and records, for each one,
//! how many elements it found, how long it took, and whether its matches agree
//! with the first strategy that succeeded.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xml_search_traits::{ParsedElement, ParserStrategy, SearchQuery, SearchResult};

/// Outcome of one strategy in a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySummary {
    pub name: String,
    pub count: Option<usize>,
    pub execution_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `None` for the baseline itself and for failed strategies
    pub agrees: Option<bool>,
    /// Index of the first element that differs from the baseline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_divergence: Option<usize>,
}

/// Comparison report across multiple strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub timestamp: DateTime<Utc>,
    pub file: String,
    pub query: SearchQuery,
    pub baseline: Option<String>,
    pub strategies: Vec<StrategySummary>,
}

impl ComparisonReport {
    /// True when at least one strategy succeeded and every other success agrees with it
    pub fn all_agree(&self) -> bool {
        self.baseline.is_some() && self.strategies.iter().all(|s| s.agrees != Some(false))
    }

    /// Generate a markdown report
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Strategy Comparison\n\n");
        md.push_str(&format!("**File:** {}\n", self.file));
        md.push_str(&format!("**Element:** {}\n", self.query.element_name));
        if let Some(name) = self.query.attribute_filter() {
            md.push_str(&format!(
                "**Attribute:** {}={}\n",
                name,
                self.query.attribute_value.as_deref().unwrap_or_default()
            ));
        }
        if let Some(text) = self.query.text_filter() {
            md.push_str(&format!("**Text contains:** {}\n", text));
        }
        md.push_str(&format!(
            "**Date:** {}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md.push_str("| Strategy | Results | Time (ms) | Agrees | Notes |\n");
        md.push_str("|----------|---------|-----------|--------|-------|\n");
        for s in &self.strategies {
            let count = s.count.map_or_else(|| "-".to_string(), |c| c.to_string());
            let time = s
                .execution_time_ms
                .map_or_else(|| "-".to_string(), |t| format!("{:.2}", t));
            let agrees = match s.agrees {
                Some(true) => "yes",
                Some(false) => "**no**",
                None if s.error.is_some() => "-",
                None => "baseline",
            };
            let notes = match (&s.error, s.first_divergence) {
                (Some(err), _) => err.clone(),
                (None, Some(idx)) => format!("first divergence at result {}", idx + 1),
                (None, None) => String::new(),
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                s.name, count, time, agrees, notes
            ));
        }

        md.push('\n');
        if self.all_agree() {
            md.push_str("All strategies agree.\n");
        } else if self.baseline.is_none() {
            md.push_str("No strategy succeeded.\n");
        } else {
            md.push_str("Strategies disagree.\n");
        }
        md
    }

    /// Generate a JSON report
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Run `query` against `file` with every strategy and compare the matches.
///
/// Strategy failures are recorded in the report rather than returned.
pub fn compare_strategies(
    strategies: &[&dyn ParserStrategy],
    file: &Path,
    query: &SearchQuery,
) -> ComparisonReport {
    let mut baseline: Option<SearchResult> = None;
    let mut summaries = Vec::with_capacity(strategies.len());

    for strategy in strategies {
        let name = strategy.parser_name().to_string();
        match strategy.parse(file, query) {
            Ok(result) => {
                let (agrees, first_divergence) = match &baseline {
                    None => (None, None),
                    Some(base) => match first_divergence(&base.elements, &result.elements) {
                        None => (Some(true), None),
                        Some(idx) => (Some(false), Some(idx)),
                    },
                };
                debug!(strategy = %name, count = result.count(), ?agrees, "compared strategy");
                summaries.push(StrategySummary {
                    name,
                    count: Some(result.count()),
                    execution_time_ms: Some(result.execution_time_ms),
                    error: None,
                    agrees,
                    first_divergence,
                });
                if baseline.is_none() {
                    baseline = Some(result);
                }
            }
            Err(err) => {
                warn!(strategy = %name, error = %err, "strategy failed during comparison");
                summaries.push(StrategySummary {
                    name,
                    count: None,
                    execution_time_ms: None,
                    error: Some(err.to_string()),
                    agrees: None,
                    first_divergence: None,
                });
            }
        }
    }

    ComparisonReport {
        timestamp: Utc::now(),
        file: file.display().to_string(),
        query: query.clone(),
        baseline: baseline.map(|b| b.parser_type),
        strategies: summaries,
    }
}

/// Index of the first position where the (tag, attributes, text, path) tuples differ
fn first_divergence(left: &[ParsedElement], right: &[ParsedElement]) -> Option<usize> {
    let same = |a: &ParsedElement, b: &ParsedElement| {
        a.tag == b.tag && a.attributes == b.attributes && a.text == b.text && a.path == b.path
    };
    left.iter()
        .zip(right)
        .position(|(a, b)| !same(a, b))
        .or_else(|| (left.len() != right.len()).then(|| left.len().min(right.len())))
}
