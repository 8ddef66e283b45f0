//! Content negotiation and renderers for hateoas [`Document`]s.
//!
//! A [`ContentNegotiator`] owns a [`RendererRegistry`] and picks a renderer
//! from the client's `?format=` parameter or `Accept` header. Three
//! renderers ship with the crate:
//!
//! - [`JsonRenderer`] — canonical JSON (`application/json`), the default
//! - [`HalRenderer`] — HAL+JSON (`application/hal+json`)
//! - [`HtmlRenderer`] — a browsable debug page (`text/html`)
//!
//! Registries are plain values. Build one per application (or per
//! endpoint) and pass it where it is needed; nothing is process-global.
//!
//! # Example
//!
//! ```
//! use hateoas::v1::{Document, Resource};
//! use hateoas_render::{ContentNegotiator, NegotiationRequest, RenderOptions};
//!
//! let mut order = Resource::new("order", 1).with_state("pending");
//! order.set_property("total", 10).unwrap();
//! order.add_link("self", "/orders/1").unwrap();
//!
//! let negotiator = ContentNegotiator::with_defaults(&RenderOptions::default());
//! let request = NegotiationRequest::new()
//!     .with_accept("application/json;q=0.5, application/hal+json");
//!
//! let rendered = negotiator.render(&request, &Document::from(order)).unwrap();
//! assert_eq!(rendered.media_type, "application/hal+json");
//! assert!(rendered.body.contains("\"_links\""));
//! ```

mod hal;
mod html;
mod json;
mod negotiate;

pub use hal::{HalRenderer, to_hal};
pub use html::{HtmlRenderer, escape_html};
pub use json::JsonRenderer;
pub use negotiate::{
    ContentNegotiator, FORMAT_MEDIA_TYPES, MediaRange, Negotiated, NegotiationRequest,
    RendererRegistry, format_media_type, parse_accept, select_media_type,
};

use hateoas::v1::{Document, Error, Result};
use serde_json::Value;

pub const MEDIA_TYPE_JSON: &str = "application/json";
pub const MEDIA_TYPE_HAL: &str = "application/hal+json";
pub const MEDIA_TYPE_HTML: &str = "text/html";

/// Options shared by the built-in renderers.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Pretty-print JSON and HAL output.
    pub pretty: bool,
    /// Append the canonical JSON to HTML pages.
    pub include_raw_json: bool,
    /// Page title for HTML output; defaults to `"{type} {id}"`.
    pub html_title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            include_raw_json: true,
            html_title: None,
        }
    }
}

/// Turns a [`Document`] into a wire payload for one media type.
///
/// Renderers are stateless apart from their configuration.
pub trait Renderer: Send + Sync {
    /// The media type this renderer produces, without parameters.
    fn media_type(&self) -> &str;

    /// Whether a requested media type is served by this renderer.
    ///
    /// Parameters such as `charset` are ignored; comparison is case-insensitive.
    fn can_handle(&self, media_type: &str) -> bool {
        essence(media_type).eq_ignore_ascii_case(self.media_type())
    }

    fn render(&self, doc: &Document) -> Result<String>;
}

/// A rendered response body together with its media type and status.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub status: u16,
    pub media_type: String,
    pub body: String,
}

impl Rendered {
    /// JSON error body for `err`, carrying its HTTP status.
    pub fn error(err: &Error) -> Self {
        Self {
            status: err.status(),
            media_type: MEDIA_TYPE_JSON.to_string(),
            body: err.to_json().to_string(),
        }
    }

    /// `Content-Type` header value; textual types get an explicit charset.
    pub fn content_type(&self) -> String {
        if self.media_type.starts_with("text/") {
            format!("{}; charset=utf-8", self.media_type)
        } else {
            self.media_type.clone()
        }
    }
}

/// The `type/subtype` part of a media type, trimmed and without parameters.
pub fn essence(media_type: &str) -> &str {
    media_type.split(';').next().unwrap_or("").trim()
}

fn to_string(value: &Value, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}
