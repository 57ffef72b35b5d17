//! fastencg - FASTEN revision call graphs for Maven artifacts
//!
//! Converts raw static call graphs produced by an external analyzer (WALA)
//! into the portable, URI-addressed FASTEN call-graph format, together with
//! each artifact's direct dependencies resolved from its POM.

pub mod cli;
pub mod errors;
pub mod graph;
pub mod maven;
pub mod pipeline;
pub mod revision;
pub mod uri;
