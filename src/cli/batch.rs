//! Batch consumption of a coordinate set.
//!
//! Artifacts are processed strictly one at a time, in input order. One
//! artifact's failure is recorded and the batch moves on; outcomes are
//! tallied and summarized at the end.

use crate::cli::write_call_graph;
use crate::graph::ExternalAnalyzer;
use crate::maven::{MavenCoordinate, MavenResolver};
use crate::pipeline;
use anyhow::{Context, Result};
use console::style;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{error, info, warn};

/// One line of the batch input file.
#[derive(Debug, Deserialize)]
struct CoordinateRecord {
    #[serde(rename = "groupId")]
    group_id: String,
    #[serde(rename = "artifactId")]
    artifact_id: String,
    version: String,
    #[serde(deserialize_with = "timestamp_from_number_or_string")]
    date: i64,
}

/// Accept the release timestamp as a JSON number or a numeric string.
fn timestamp_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Default)]
struct BatchTally {
    successes: Vec<String>,
    empty: usize,
    failed: Vec<(String, String)>,
    occurrences: FxHashMap<String, usize>,
}

impl BatchTally {
    fn record_success(&mut self, coordinate: &str, calls: usize) {
        self.successes
            .push(format!("Number of calls: {calls} COORDINATE: {coordinate}"));
    }

    fn record_failure(&mut self, coordinate: String, kind: &str) {
        *self.occurrences.entry(kind.to_string()).or_insert(0) += 1;
        self.failed.push((coordinate, kind.to_string()));
    }

    fn total(&self) -> usize {
        self.successes.len() + self.failed.len()
    }

    /// Failure kinds, most frequent first.
    fn sorted_failure_kinds(&self) -> Vec<(&str, usize)> {
        let mut kinds: Vec<_> = self
            .occurrences
            .iter()
            .map(|(kind, count)| (kind.as_str(), *count))
            .collect();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        kinds
    }

    fn print_summary(&self) {
        for record in &self.successes {
            println!("{record}");
        }
        for (coordinate, kind) in &self.failed {
            println!("{coordinate} ERROR: {kind}");
        }

        println!();
        println!(
            "{}",
            style("=================== SUMMARY ===================").bold()
        );
        println!(
            "Total number of analyzed coordinates: {}",
            style(self.total()).cyan()
        );
        println!(
            "Total number of successful: {}",
            style(self.successes.len()).green()
        );
        println!("Empty call graphs: {}", style(self.empty).dim());
        println!(
            "Total number of failed: {}",
            style(self.failed.len()).red()
        );

        if !self.occurrences.is_empty() {
            println!("Most common failure kinds:");
            for (kind, count) in self.sorted_failure_kinds() {
                println!("\t[{kind} - {count}]");
            }
        }

        if self.total() > 0 {
            println!(
                "Success rate: {}%",
                style(100 * self.successes.len() / self.total()).bold()
            );
        }
    }
}

pub fn run_batch(
    set: &Path,
    repos: &[String],
    analyzer: &str,
    output: Option<&Path>,
    stdout: bool,
) -> Result<()> {
    let file = std::fs::File::open(set)
        .with_context(|| format!("cannot open coordinate set {}", set.display()))?;
    let reader = BufReader::new(file);

    let resolver = MavenResolver::new();
    let builder = ExternalAnalyzer::new(analyzer)?;
    let mut tally = BatchTally::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: CoordinateRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                error!("Could not parse input coordinate on line {}: {}", line_no + 1, e);
                tally.record_failure("UNKNOWN COORDINATE".to_string(), "MalformedInput");
                continue;
            }
        };

        let mut coordinate =
            MavenCoordinate::new(record.group_id, record.artifact_id, record.version);
        coordinate.set_repos(repos.to_vec());

        match pipeline::build_from_coordinate(&resolver, &builder, &coordinate, record.date) {
            Ok(rcg) => {
                tally.record_success(&coordinate.coordinate(), rcg.graph.total_calls());

                if rcg.is_call_graph_empty() {
                    warn!("Empty call graph for {}", coordinate);
                    tally.empty += 1;
                    continue;
                }

                info!("Call graph successfully generated for {}!", coordinate);
                if let Err(e) = write_call_graph(&rcg, output, stdout) {
                    warn!("Couldn't write the call graph for {}: {}", coordinate, e);
                }
            }
            Err(e) => {
                info!("Failed to generate a call graph for {}!", coordinate);
                tally.record_failure(coordinate.coordinate(), e.kind());
            }
        }
    }

    tally.print_summary();
    Ok(())
}
