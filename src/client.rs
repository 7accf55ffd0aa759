//! Client session and request pipeline.
//!
//! `Client::method` starts a [`Method`] path; invoking it merges the session
//! defaults with the call arguments, signs them when a shared secret is
//! configured, fetches the resulting URL through the [`Transport`] and maps
//! the parsed envelope.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::config::Config;
use crate::entity::Entity;
use crate::error::Result;
use crate::http_client::{HttpClientConfig, HttpTransport, Transport};
use crate::mapper::ResponseMapper;
use crate::method::{Args, Method};
use crate::node::Node;
use crate::signer::{self, SIGNATURE_KEY};

pub const API_KEY_ARG: &str = "api_key";
pub const AUTH_TOKEN_ARG: &str = "auth_token";
pub const METHOD_ARG: &str = "method";

pub const DEFAULT_REST_URL: &str = "https://api.flickr.com/services/rest";
pub const DEFAULT_AUTH_URL: &str = "https://www.flickr.com/services/auth";
pub const DEFAULT_NAMESPACE: &str = "flickr";

/// Credentials sent with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    api_key: String,
    secret: Option<String>,
    auth_token: Option<String>,
}

impl Session {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: None,
            auth_token: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Arguments every request starts from
    pub fn default_args(&self) -> BTreeMap<String, String> {
        let mut args = BTreeMap::from([(API_KEY_ARG.to_string(), self.api_key.clone())]);
        if let Some(token) = &self.auth_token {
            args.insert(AUTH_TOKEN_ARG.to_string(), token.clone());
        }
        args
    }
}

/// Where requests go and which namespace method paths start in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rest_url: Url,
    pub auth_url: Url,
    pub namespace: String,
}

impl Endpoints {
    pub fn new(rest_url: &str, auth_url: &str, namespace: impl Into<String>) -> Result<Self> {
        Ok(Self {
            rest_url: Url::parse(rest_url)?,
            auth_url: Url::parse(auth_url)?,
            namespace: namespace.into(),
        })
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rest_url: Url::parse(DEFAULT_REST_URL).expect("default REST URL is valid"),
            auth_url: Url::parse(DEFAULT_AUTH_URL).expect("default auth URL is valid"),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// API client. Cloning shares the transport and mapper.
#[derive(Clone)]
pub struct Client {
    session: Session,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
    mapper: Arc<ResponseMapper>,
}

impl Client {
    pub fn new(session: Session, transport: Arc<dyn Transport>) -> Self {
        Self {
            session,
            endpoints: Endpoints::default(),
            transport,
            mapper: Arc::new(ResponseMapper::default()),
        }
    }

    /// Client talking HTTP with the credentials and endpoints of `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(HttpClientConfig {
            timeout_seconds: config.network.timeout_seconds,
            user_agent: config.network.user_agent.clone(),
        })?;
        let endpoints = Endpoints::new(
            &config.endpoints.rest_url,
            &config.endpoints.auth_url,
            config.endpoints.namespace.clone(),
        )?;

        Ok(Self::new(config.credentials.session(), Arc::new(transport)).with_endpoints(endpoints))
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_mapper(mut self, mapper: ResponseMapper) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn mapper(&self) -> &ResponseMapper {
        &self.mapper
    }

    /// Replace the auth token, e.g. after an external auth flow
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.session.auth_token = token;
    }

    /// Method path under the client namespace; dotted names are split
    pub fn method(&self, name: &str) -> Method<'_> {
        Method::new(self, vec![self.endpoints.namespace.clone()]).path(name)
    }

    /// Signed REST URL for one call. The method path always wins over a
    /// caller argument named `method`.
    pub fn rest_url(&self, method: &str, args: Args) -> Url {
        let mut merged = self.session.default_args();
        merged.extend(args.into_wire());
        merged.insert(METHOD_ARG.to_string(), method.to_string());
        self.signed_url(&self.endpoints.rest_url, merged)
    }

    /// Signed URL on the auth endpoint
    pub fn auth_url(&self, args: Args) -> Url {
        let mut merged = self.session.default_args();
        merged.extend(args.into_wire());
        self.signed_url(&self.endpoints.auth_url, merged)
    }

    fn signed_url(&self, base: &Url, mut args: BTreeMap<String, String>) -> Url {
        if let Some(secret) = &self.session.secret {
            signer::sign_in_place(&mut args, secret);
        }
        let mut url = base.clone();
        url.query_pairs_mut().extend_pairs(args.iter());
        url
    }

    /// Map a raw response body
    pub fn parse_response(&self, bytes: &[u8]) -> Result<Entity> {
        let envelope = Node::parse(bytes)?;
        self.mapper.map_envelope(&self.session, &envelope)
    }

    pub(crate) async fn invoke(&self, method: &str, args: Args) -> Result<Entity> {
        let url = self.rest_url(method, args);
        debug!(method, "calling");
        trace!(url = %redacted(&url), "request");

        let bytes = self.transport.fetch(url.as_str()).await?;
        self.parse_response(&bytes)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &self.session.api_key)
            .field("signed", &self.session.secret.is_some())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn redacted(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == SIGNATURE_KEY || key == AUTH_TOKEN_ARG {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    let mut url = url.clone();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url
}
