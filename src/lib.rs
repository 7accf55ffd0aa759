//! # flickr-rpc Library
//!
//! A schema-less client for Flickr-style tag-based XML REST APIs. Method
//! names are built as dotted paths, requests are signed and sent over HTTP,
//! and XML responses are mapped into attribute-accessible entities without
//! any per-method declarations.
//!
//! ```no_run
//! # async fn run() -> flickr_rpc::Result<()> {
//! use std::sync::Arc;
//! use flickr_rpc::{Args, Client, HttpClientConfig, HttpTransport, Session};
//!
//! let transport = HttpTransport::new(HttpClientConfig::default())?;
//! let client = Client::new(Session::new("api-key"), Arc::new(transport));
//!
//! let user = client
//!     .method("people.findByUsername")
//!     .call(Args::new().with("username", "bees"))
//!     .await?;
//! println!("{}", user.attr("nsid").unwrap_or("?"));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod http_client;
pub mod mapper;
pub mod method;
pub mod node;
pub mod output;
pub mod paginator;
pub mod signer;
pub mod variants;

pub use cli::{Cli, OutputFormat};
pub use client::{Client, Endpoints, Session};
pub use config::{Config, ConfigError, ConfigManager};
pub use entity::{Entity, Response, Variant};
pub use error::{Error, Result};
pub use http_client::{HttpClientConfig, HttpTransport, Transport};
pub use mapper::{MultiplesTable, ResponseMapper};
pub use method::{ArgValue, Args, Method};
pub use node::Node;
pub use output::Output;
pub use paginator::{PageSignal, next_page};
pub use signer::{SIGNATURE_KEY, sign};
pub use variants::{Photo, User, VariantConstructor, VariantRegistry};
