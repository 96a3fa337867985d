//! Core types and storage for the design-spec screen index.
//!
//! Provides the catalog data model ([`index::ScreenIndex`]), keyword extraction,
//! screen-id recognition, JSON persistence with atomic replacement, and the
//! layered configuration shared by the CLI and the MCP server.

pub mod config;
pub mod error;
pub mod ident;
pub mod index;
pub mod keywords;
pub mod storage;
