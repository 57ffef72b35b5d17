//! Maven coordinates and POM-based dependency resolution.

mod resolver;

pub use resolver::MavenResolver;

use crate::errors::{CgError, CgResult};
use std::fmt;
use std::str::FromStr;

/// Default repository tried when no mirrors are configured.
pub const MAVEN_CENTRAL: &str = "https://repo.maven.apache.org/maven2/";

/// Maven coordinate as g:a:v, e.g. `com.google.guava:guava:28.1-jre`.
///
/// The repository list is mutable only until resolution begins; the resolver
/// takes the coordinate by shared reference and reads it in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenCoordinate {
    repos: Vec<String>,
    group_id: String,
    artifact_id: String,
    version_constraint: String,
}

impl MavenCoordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            repos: vec![MAVEN_CENTRAL.to_string()],
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version_constraint: version.into(),
        }
    }

    /// Replace the repository list. Later entries are fallbacks, tried in order.
    pub fn set_repos(&mut self, repos: Vec<String>) {
        if !repos.is_empty() {
            self.repos = repos;
        }
    }

    pub fn repos(&self) -> &[String] {
        &self.repos
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version_constraint(&self) -> &str {
        &self.version_constraint
    }

    /// `groupId:artifactId`
    pub fn product(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// `groupId:artifactId:version`
    pub fn coordinate(&self) -> String {
        format!(
            "{}:{}:{}",
            self.group_id, self.artifact_id, self.version_constraint
        )
    }

    /// Repository-relative base URL of the artifact directory.
    fn base_url(&self, repo: &str) -> String {
        format!(
            "{}{}/{}/{}",
            repo,
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version_constraint
        )
    }

    pub fn pom_url(&self, repo: &str) -> String {
        format!(
            "{}/{}-{}.pom",
            self.base_url(repo),
            self.artifact_id,
            self.version_constraint
        )
    }

    pub fn jar_url(&self, repo: &str) -> String {
        format!(
            "{}/{}-{}.jar",
            self.base_url(repo),
            self.artifact_id,
            self.version_constraint
        )
    }
}

impl FromStr for MavenCoordinate {
    type Err = CgError;

    fn from_str(s: &str) -> CgResult<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Self::new(*group, *artifact, *version))
            }
            _ => Err(CgError::MalformedInput(format!(
                "expected coordinate as groupId:artifactId:version, got: {s}"
            ))),
        }
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let coord: MavenCoordinate = "org.slf4j:slf4j-api:1.7.29".parse().unwrap();
        assert_eq!(coord.product(), "org.slf4j:slf4j-api");
        assert_eq!(coord.coordinate(), "org.slf4j:slf4j-api:1.7.29");
        assert_eq!(coord.repos(), [MAVEN_CENTRAL]);
    }

    #[test]
    fn test_from_str_rejects_bad_shapes() {
        assert!("org.slf4j:slf4j-api".parse::<MavenCoordinate>().is_err());
        assert!("a:b:c:d".parse::<MavenCoordinate>().is_err());
        assert!("::1.0".parse::<MavenCoordinate>().is_err());
    }

    #[test]
    fn test_urls() {
        let coord = MavenCoordinate::new("org.slf4j", "slf4j-api", "1.7.29");
        assert_eq!(
            coord.pom_url(MAVEN_CENTRAL),
            "https://repo.maven.apache.org/maven2/org/slf4j/slf4j-api/1.7.29/slf4j-api-1.7.29.pom"
        );
        assert_eq!(
            coord.jar_url(MAVEN_CENTRAL),
            "https://repo.maven.apache.org/maven2/org/slf4j/slf4j-api/1.7.29/slf4j-api-1.7.29.jar"
        );
    }

    #[test]
    fn test_set_repos_ignores_empty() {
        let mut coord = MavenCoordinate::new("g", "a", "1.0");
        coord.set_repos(vec![]);
        assert_eq!(coord.repos(), [MAVEN_CENTRAL]);
        coord.set_repos(vec!["https://mirror.example/m2/".to_string()]);
        assert_eq!(coord.repos().len(), 1);
        assert!(coord.repos()[0].contains("mirror.example"));
    }
}
