//! Boundary to the external call-graph construction algorithm.
//!
//! Call-graph construction itself (points-to analysis, context sensitivity)
//! is not this crate's concern: a builder is anything that, given a
//! classpath, returns a [`RawCallGraph`] or a construction failure.

use crate::errors::{CgError, CgResult};
use crate::graph::raw::RawCallGraph;
use std::path::Path;
use std::process::Command;
use tracing::debug;

pub trait CallGraphBuilder {
    /// Build the raw call graph for the artifact at `classpath`.
    ///
    /// A fatal construction failure (timeout, corrupt class files) must be
    /// reported as [`CgError::AnalysisFailure`]; no partial graph is returned.
    fn build_call_graph(&self, classpath: &Path) -> CgResult<RawCallGraph>;
}

/// Runs a configured analyzer command with the classpath appended as its last
/// argument and decodes the raw graph JSON from its stdout.
pub struct ExternalAnalyzer {
    program: String,
    args: Vec<String>,
}

impl ExternalAnalyzer {
    /// Split a command line into program and leading arguments.
    pub fn new(command_line: &str) -> CgResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            CgError::MalformedInput("empty analyzer command".to_string())
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl CallGraphBuilder for ExternalAnalyzer {
    fn build_call_graph(&self, classpath: &Path) -> CgResult<RawCallGraph> {
        debug!("Running analyzer {} on {}", self.program, classpath.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(classpath)
            .output()
            .map_err(|e| {
                CgError::AnalysisFailure(format!("could not run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CgError::AnalysisFailure(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            CgError::AnalysisFailure(format!("undecodable analyzer output: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_command() {
        assert!(ExternalAnalyzer::new("   ").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_decodes_analyzer_stdout() {
        use std::io::Write;

        // `cat <classpath>` stands in for an analyzer emitting JSON on stdout.
        let mut payload = tempfile::NamedTempFile::new().unwrap();
        payload
            .write_all(b"{\"nodes\":[],\"edges\":[]}")
            .unwrap();
        payload.flush().unwrap();

        let analyzer = ExternalAnalyzer::new("cat").unwrap();
        let graph = analyzer.build_call_graph(payload.path()).unwrap();
        assert!(graph.nodes.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_analysis_failure() {
        let analyzer = ExternalAnalyzer::new("false").unwrap();
        let err = analyzer.build_call_graph(Path::new("/dev/null")).unwrap_err();
        assert_eq!(err.kind(), "AnalysisFailure");
    }

    #[cfg(unix)]
    #[test]
    fn test_garbage_stdout_is_analysis_failure() {
        let analyzer = ExternalAnalyzer::new("echo not-json").unwrap();
        let err = analyzer.build_call_graph(Path::new("/dev/null")).unwrap_err();
        assert_eq!(err.kind(), "AnalysisFailure");
    }
}
