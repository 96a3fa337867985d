//! Remote design document access for the screen index.
//!
//! - [`provider`]: the remote boundary ([`provider::DocumentProvider`]) and its HTTP implementation
//! - [`client`]: depth-ladder fetching and project/file discovery
//! - [`node`]: the document tree model with bounded traversals
//! - [`extract`]: label-value heuristics for title, author and description
//! - [`scan`]: containers → [`screen_core::index::Screen`] records

pub mod client;
pub mod extract;
pub mod node;
pub mod provider;
pub mod scan;

pub use client::TreeClient;
pub use node::DocumentNode;
pub use provider::{DocumentProvider, FetchError, HttpDocumentProvider};
