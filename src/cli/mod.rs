//! CLI command definitions and handlers

mod batch;

use crate::errors::CgResult;
use crate::graph::{ExternalAnalyzer, RawCallGraph};
use crate::maven::{MavenCoordinate, MavenResolver};
use crate::pipeline;
use crate::revision::{DependencySet, RevisionCallGraph};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// fastencg - FASTEN revision call graphs for Maven artifacts
#[derive(Parser, Debug)]
#[command(name = "fastencg")]
#[command(
    version,
    about = "Generate FASTEN revision call graphs for Maven artifacts",
    long_about = "fastencg converts raw static call graphs produced by an external analyzer \
(WALA) into the portable, URI-addressed FASTEN call-graph format, together with each \
artifact's direct dependencies resolved from its POM.",
    after_help = "\
Examples:
  fastencg coord -c org.slf4j:slf4j-api:1.7.29 -t 1574072773 -o out/
  fastencg coord -c com.example:widget:1.0 -r https://mirror.example/m2/ --stdout
  fastencg file -f graph.json -p com.example:widget -v 1.0 --stdout
  fastencg file -f widget.jar --analyzer wala-callgraph -d org.slf4j:slf4j-api:1.7.29
  fastencg batch -s coordinates.jsonl -o out/

The analyzer command is run with the JAR path appended and must print the raw
call graph as JSON on stdout. Set RUST_LOG=debug for HTTP and analyzer detail."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the call graph for one Maven coordinate
    Coord {
        /// Maven coordinate string, groupId:artifactId:version
        #[arg(short = 'c', long = "coord")]
        coord: String,

        /// Release timestamp of the revision
        #[arg(short = 't', long, default_value_t = 0)]
        timestamp: i64,

        /// Maven repositories, in fallback order
        #[arg(short = 'r', long, value_delimiter = ',')]
        repos: Vec<String>,

        /// Analyzer command run against the downloaded JAR
        #[arg(long, env = "FASTENCG_ANALYZER", default_value = "wala-callgraph")]
        analyzer: String,

        /// Directory the output document is written into
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Print the document to stdout
        #[arg(long)]
        stdout: bool,
    },

    /// Generate the call graph from a local file
    File {
        /// Raw call graph JSON, or a JAR when --analyzer is given
        #[arg(short = 'f', long = "path")]
        path: PathBuf,

        /// Product the revision belongs to, as groupId:artifactId
        #[arg(short = 'p', long, default_value = "PRODUCT")]
        product: String,

        /// Version of the revision
        #[arg(short = 'v', long = "artifact-version", default_value = "0.0.0")]
        version: String,

        /// Release timestamp of the revision
        #[arg(short = 't', long, default_value_t = 0)]
        timestamp: i64,

        /// Dependency coordinates whose POMs are resolved into the depset
        #[arg(short = 'd', long, value_delimiter = ',')]
        dependencies: Vec<String>,

        /// Maven repositories, in fallback order
        #[arg(short = 'r', long, value_delimiter = ',')]
        repos: Vec<String>,

        /// Analyzer command; when given, PATH is treated as a JAR
        #[arg(long, env = "FASTENCG_ANALYZER")]
        analyzer: Option<String>,

        /// Directory the output document is written into
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Print the document to stdout
        #[arg(long)]
        stdout: bool,
    },

    /// Process a set of coordinates, one JSON object per line
    Batch {
        /// File with one {groupId, artifactId, version, date} object per line
        #[arg(short = 's', long = "set")]
        set: PathBuf,

        /// Maven repositories, in fallback order
        #[arg(short = 'r', long, value_delimiter = ',')]
        repos: Vec<String>,

        /// Analyzer command run against each downloaded JAR
        #[arg(long, env = "FASTENCG_ANALYZER", default_value = "wala-callgraph")]
        analyzer: String,

        /// Directory the output documents are written into
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Print each document to stdout
        #[arg(long)]
        stdout: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Coord {
            coord,
            timestamp,
            repos,
            analyzer,
            output,
            stdout,
        } => run_coord(&coord, timestamp, repos, &analyzer, output.as_deref(), stdout),
        Commands::File {
            path,
            product,
            version,
            timestamp,
            dependencies,
            repos,
            analyzer,
            output,
            stdout,
        } => run_file(
            &path,
            &product,
            &version,
            timestamp,
            &dependencies,
            repos,
            analyzer.as_deref(),
            output.as_deref(),
            stdout,
        ),
        Commands::Batch {
            set,
            repos,
            analyzer,
            output,
            stdout,
        } => batch::run_batch(&set, &repos, &analyzer, output.as_deref(), stdout),
    }
}

fn run_coord(
    coord: &str,
    timestamp: i64,
    repos: Vec<String>,
    analyzer: &str,
    output: Option<&Path>,
    stdout: bool,
) -> Result<()> {
    let mut coordinate: MavenCoordinate = coord.parse()?;
    coordinate.set_repos(repos);

    let resolver = MavenResolver::new();
    let builder = ExternalAnalyzer::new(analyzer)?;
    let rcg = pipeline::build_from_coordinate(&resolver, &builder, &coordinate, timestamp)
        .with_context(|| format!("failed to generate a call graph for {coordinate}"))?;

    if rcg.is_call_graph_empty() {
        warn!("Empty call graph for {}", coordinate);
    }
    write_call_graph(&rcg, output, stdout)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_file(
    path: &Path,
    product: &str,
    version: &str,
    timestamp: i64,
    dependencies: &[String],
    repos: Vec<String>,
    analyzer: Option<&str>,
    output: Option<&Path>,
    stdout: bool,
) -> Result<()> {
    let resolver = MavenResolver::new();

    let mut depset = DependencySet::new();
    for dep in dependencies {
        let mut coordinate: MavenCoordinate = dep.parse()?;
        coordinate.set_repos(repos.clone());
        depset.extend(resolver.resolve_dependencies(&coordinate));
    }

    let rcg = match analyzer {
        Some(command) => {
            let builder = ExternalAnalyzer::new(command)?;
            pipeline::build_from_file(&builder, path, product, version, timestamp, depset)?
        }
        None => {
            let raw = read_raw_graph(path)?;
            pipeline::build_from_raw(&raw, product, version, timestamp, depset)?
        }
    };

    if rcg.is_call_graph_empty() {
        warn!("Empty call graph for {}", rcg.product);
    }
    write_call_graph(&rcg, output, stdout)?;
    Ok(())
}

fn read_raw_graph(path: &Path) -> CgResult<RawCallGraph> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write the document into `<output>/<artifactId>_<groupId>_<version>.json`
/// and/or print it, as requested.
pub(crate) fn write_call_graph(
    rcg: &RevisionCallGraph,
    output: Option<&Path>,
    stdout: bool,
) -> CgResult<()> {
    if let Some(dir) = output {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(rcg.file_name());
        std::fs::write(&path, serde_json::to_string_pretty(rcg)?)?;
        info!("Successfully written the call graph into {}", path.display());
    }
    if stdout {
        println!("{}", serde_json::to_string(rcg)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_coord_args() {
        let cli = Cli::parse_from([
            "fastencg",
            "coord",
            "-c",
            "org.slf4j:slf4j-api:1.7.29",
            "-t",
            "1574072773",
            "-r",
            "https://a/,https://b/",
        ]);
        match cli.command {
            Commands::Coord {
                coord,
                timestamp,
                repos,
                ..
            } => {
                assert_eq!(coord, "org.slf4j:slf4j-api:1.7.29");
                assert_eq!(timestamp, 1574072773);
                assert_eq!(repos, ["https://a/", "https://b/"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_write_call_graph_names_file() {
        use indexmap::IndexMap;

        let dir = tempfile::tempdir().unwrap();
        let rcg = RevisionCallGraph::new(
            "org.slf4j:slf4j-api",
            "1.7.29",
            0,
            vec![],
            IndexMap::new(),
            crate::revision::Graph::default(),
        );
        write_call_graph(&rcg, Some(dir.path()), false).unwrap();
        assert!(dir
            .path()
            .join("slf4j-api_org.slf4j_1.7.29.json")
            .exists());
    }
}
