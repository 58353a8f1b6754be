//! Request inspection pipeline.
//!
//! # Flow
//! ```text
//! client id → rate limit ──denied──▶ RateLimited (429)
//!                │
//!                ▼
//!           query string ──match──▶ Blocked(category, query) (403)
//!                │
//!                ▼  (body methods only)
//!   buffer body → fragments ──first match──▶ Blocked(category, location) (403)
//!                │
//!                ▼
//!              Allow → forward
//! ```
//!
//! Every path hands the request back with its body intact, so the caller
//! can forward it. Each rejection is logged before the caller writes the
//! response.

use std::fmt;

use axum::body::Body;
use axum::http::{Method, Request};

use crate::config::WafConfig;
use crate::inspection::body::{BodyError, BufferedRequest};
use crate::inspection::extractor::BodyExtractor;
use crate::inspection::fragment::Location;
use crate::net::ClientId;
use crate::observability::metrics;
use crate::security::{Category, ContentInspector, RateLimiter};

/// A signature hit: what matched and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub category: Category,
    pub location: Location,
    pub rule: &'static str,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} (rule {})", self.category, self.location, self.rule)
    }
}

/// Outcome of inspecting one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RateLimited,
    Blocked(Violation),
}

/// The decision together with the (restored) request.
#[derive(Debug)]
pub struct Evaluation {
    pub decision: Decision,
    pub request: Request<Body>,
}

/// Orchestrates rate limiting and content inspection.
#[derive(Debug)]
pub struct InspectionPipeline {
    limiter: RateLimiter,
    inspector: ContentInspector,
    body_methods: Vec<Method>,
    max_body_size: Option<usize>,
}

impl InspectionPipeline {
    pub fn new(
        limiter: RateLimiter,
        inspector: ContentInspector,
        body_methods: Vec<Method>,
        max_body_size: Option<usize>,
    ) -> Self {
        Self {
            limiter,
            inspector,
            body_methods,
            max_body_size,
        }
    }

    /// Build the pipeline from configuration, compiling the signature set.
    pub fn from_config(config: &WafConfig) -> Result<Self, regex::Error> {
        let body_methods = config
            .inspection
            .body_methods
            .iter()
            .filter_map(|name| match Method::from_bytes(name.as_bytes()) {
                Ok(method) => Some(method),
                Err(_) => {
                    tracing::warn!(method = %name, "Ignoring invalid body method");
                    None
                }
            })
            .collect();

        Ok(Self::new(
            RateLimiter::from_config(&config.rate_limit),
            ContentInspector::new()?,
            body_methods,
            config.inspection.max_body_size,
        ))
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Whether requests with this method have their body inspected.
    pub fn inspects_body(&self, method: &Method) -> bool {
        self.body_methods.contains(method)
    }

    /// Run every check for one request.
    ///
    /// Only a failure to buffer the body is an error; policy outcomes are
    /// reported through [`Decision`].
    pub async fn evaluate(
        &self,
        client: &ClientId,
        request: Request<Body>,
    ) -> Result<Evaluation, BodyError> {
        if !self.limiter.allow(client.as_str()) {
            tracing::warn!(client = %client, "Rate limit exceeded");
            metrics::record_rate_limited();
            return Ok(Evaluation {
                decision: Decision::RateLimited,
                request,
            });
        }
        metrics::record_tracked_clients(self.limiter.tracked_clients());

        let query_violation = request.uri().query().and_then(|q| self.check_query(q));
        if let Some(violation) = query_violation {
            return Ok(self.block(client, violation, request));
        }

        if !self.inspects_body(request.method()) {
            return Ok(Evaluation {
                decision: Decision::Allow,
                request,
            });
        }

        let buffered = BufferedRequest::read(request, self.max_body_size).await?;
        let body_violation = self.check_body(buffered.body(), buffered.content_type());
        let request = buffered.into_request();

        match body_violation {
            Some(violation) => Ok(self.block(client, violation, request)),
            None => {
                tracing::debug!(client = %client, "Request passed inspection");
                Ok(Evaluation {
                    decision: Decision::Allow,
                    request,
                })
            }
        }
    }

    /// Classify the raw (undecoded) query string.
    pub fn check_query(&self, query: &str) -> Option<Violation> {
        self.inspector.find(query).map(|hit| Violation {
            category: hit.category,
            location: Location::Query,
            rule: hit.rule,
        })
    }

    /// Classify body fragments in extraction order, stopping at the first hit.
    pub fn check_body(&self, body: &[u8], content_type: Option<&str>) -> Option<Violation> {
        BodyExtractor::extract(body, content_type)
            .into_iter()
            .find_map(|fragment| {
                self.inspector.find(&fragment.text).map(|hit| Violation {
                    category: hit.category,
                    location: fragment.location,
                    rule: hit.rule,
                })
            })
    }

    fn block(&self, client: &ClientId, violation: Violation, request: Request<Body>) -> Evaluation {
        tracing::warn!(
            client = %client,
            category = %violation.category,
            location = %violation.location,
            rule = violation.rule,
            "Blocked malicious request"
        );
        metrics::record_blocked(violation.category, &violation.location);
        Evaluation {
            decision: Decision::Blocked(violation),
            request,
        }
    }
}
