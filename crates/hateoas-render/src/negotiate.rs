//! Media-type selection from `?format=` and `Accept`.

use crate::{HalRenderer, HtmlRenderer, JsonRenderer, RenderOptions, Rendered, Renderer};
use hateoas::v1::{Document, Error, NegotiationCode, Result};
use serde_json::json;

/// `?format=` values and the media types they stand for.
pub const FORMAT_MEDIA_TYPES: [(&str, &str); 6] = [
    ("json", "application/json"),
    ("hal", "application/hal+json"),
    ("jsonapi", "application/vnd.api+json"),
    ("html", "text/html"),
    ("xml", "application/xml"),
    ("text", "text/plain"),
];

/// Map a `?format=` value to its media type.
pub fn format_media_type(format: &str) -> Option<&'static str> {
    let format = format.trim();
    FORMAT_MEDIA_TYPES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(format))
        .map(|(_, media_type)| *media_type)
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub media_type: String,
    pub quality: f32,
}

/// Parse an `Accept` header into media ranges, best first.
///
/// A missing or blank header means `*/*`. Entries default to `q=1.0`;
/// `q=0` entries are dropped. Ties keep header order.
///
/// ```
/// use hateoas_render::parse_accept;
///
/// let ranges = parse_accept(Some("application/json;q=0.9, text/html;q=0.95"));
/// assert_eq!(ranges[0].media_type, "text/html");
/// assert_eq!(ranges[1].media_type, "application/json");
/// ```
pub fn parse_accept(header: Option<&str>) -> Vec<MediaRange> {
    let header = match header.map(str::trim) {
        Some(h) if !h.is_empty() => h,
        _ => "*/*",
    };

    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter_map(|part| {
            let mut params = part.split(';');
            let media_type = params.next()?.trim().to_ascii_lowercase();
            if media_type.is_empty() {
                return None;
            }
            let quality = params
                .filter_map(|p| p.split_once('='))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("q"))
                .and_then(|(_, v)| v.trim().parse::<f32>().ok())
                .map_or(1.0, |q| q.clamp(0.0, 1.0));
            Some(MediaRange {
                media_type,
                quality,
            })
        })
        .filter(|r| r.quality > 0.0)
        .collect();

    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// What the client asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NegotiationRequest {
    pub accept: Option<String>,
    pub format: Option<String>,
}

impl NegotiationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Build from a raw `Accept` header and a raw query string
    /// (`a=1&format=hal`). Only `format` is read from the query.
    pub fn from_parts(accept: Option<&str>, query: Option<&str>) -> Self {
        let format = query.and_then(|q| {
            q.trim_start_matches('?')
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(k, _)| *k == "format")
                .map(|(_, v)| v.to_string())
        });
        Self {
            accept: accept.map(str::to_string),
            format: format.filter(|f| !f.is_empty()),
        }
    }
}

/// Choose a media type from `available` for `request`.
///
/// `available` is in preference order: wildcards resolve to the first
/// matching entry.
pub fn select_media_type(request: &NegotiationRequest, available: &[&str]) -> Result<String> {
    if let Some(format) = request.format.as_deref() {
        match format_media_type(format) {
            Some(media_type) => {
                if available.iter().any(|a| a.eq_ignore_ascii_case(media_type)) {
                    tracing::debug!(format, media_type, "selected media type from format");
                    return Ok(media_type.to_string());
                }
                return Err(Error::negotiation(
                    NegotiationCode::FormatNotSupported,
                    format!("Format '{}' is not supported by this resource", format),
                    Some(json!({
                        "format": format,
                        "mediaType": media_type,
                        "available": available,
                    })),
                ));
            }
            None => tracing::debug!(format, "unknown format, falling back to Accept"),
        }
    }

    for range in parse_accept(request.accept.as_deref()) {
        let found = if range.media_type == "*/*" {
            available.first()
        } else if let Some(main) = range.media_type.strip_suffix("/*") {
            available
                .iter()
                .find(|a| a.split('/').next().is_some_and(|m| m.eq_ignore_ascii_case(main)))
        } else {
            available
                .iter()
                .find(|a| a.eq_ignore_ascii_case(&range.media_type))
        };
        if let Some(media_type) = found {
            tracing::debug!(
                range = %range.media_type,
                quality = range.quality,
                media_type,
                "selected media type from Accept"
            );
            return Ok(media_type.to_string());
        }
    }

    Err(Error::negotiation(
        NegotiationCode::NotAcceptable,
        "None of the requested media types are available",
        Some(json!({
            "accept": request.accept.as_deref().unwrap_or("*/*"),
            "available": available,
        })),
    ))
}

/// Ordered set of renderers with a designated default.
pub struct RendererRegistry {
    renderers: Vec<Box<dyn Renderer>>,
    default: usize,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererRegistry {
    /// A registry holding only the JSON renderer.
    pub fn new() -> Self {
        Self {
            renderers: vec![Box::new(JsonRenderer::default())],
            default: 0,
        }
    }

    /// JSON (default), HAL, and HTML, configured from `options`.
    pub fn with_defaults(options: &RenderOptions) -> Self {
        let mut registry = Self {
            renderers: vec![Box::new(JsonRenderer::new(options))],
            default: 0,
        };
        registry.register(HalRenderer::new(options));
        registry.register(HtmlRenderer::new(options));
        registry
    }

    /// Add a renderer, replacing any existing one for the same media type.
    pub fn register(&mut self, renderer: impl Renderer + 'static) -> &mut Self {
        let media_type = renderer.media_type().to_string();
        match self.position(&media_type) {
            Some(idx) => self.renderers[idx] = Box::new(renderer),
            None => self.renderers.push(Box::new(renderer)),
        }
        self
    }

    pub fn set_default(&mut self, media_type: &str) -> Result<&mut Self> {
        self.default = self.position(media_type).ok_or_else(|| {
            Error::invalid_argument(format!("no renderer registered for '{}'", media_type))
        })?;
        Ok(self)
    }

    pub fn get(&self, media_type: &str) -> Option<&dyn Renderer> {
        self.position(media_type).map(|idx| self.renderers[idx].as_ref())
    }

    pub fn default_renderer(&self) -> &dyn Renderer {
        self.renderers[self.default].as_ref()
    }

    /// Registered media types, default first, then registration order.
    pub fn media_types(&self) -> Vec<&str> {
        let default = self.default_renderer().media_type();
        std::iter::once(default)
            .chain(
                self.renderers
                    .iter()
                    .map(|r| r.media_type())
                    .filter(|m| *m != default),
            )
            .collect()
    }

    fn position(&self, media_type: &str) -> Option<usize> {
        self.renderers.iter().position(|r| r.can_handle(media_type))
    }
}

/// The renderer chosen for a request.
pub struct Negotiated<'a> {
    pub media_type: String,
    pub renderer: &'a dyn Renderer,
}

/// Picks and runs a renderer for each request.
///
/// ```
/// use hateoas_render::{ContentNegotiator, NegotiationRequest, RenderOptions};
///
/// let negotiator = ContentNegotiator::with_defaults(&RenderOptions::default());
/// let picked = negotiator
///     .negotiate(&NegotiationRequest::new().with_accept("text/*"))
///     .unwrap();
/// assert_eq!(picked.media_type, "text/html");
/// ```
#[derive(Default)]
pub struct ContentNegotiator {
    registry: RendererRegistry,
}

impl ContentNegotiator {
    pub fn new(registry: RendererRegistry) -> Self {
        Self { registry }
    }

    pub fn with_defaults(options: &RenderOptions) -> Self {
        Self::new(RendererRegistry::with_defaults(options))
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    /// Negotiate against every registered renderer.
    pub fn negotiate(&self, request: &NegotiationRequest) -> Result<Negotiated<'_>> {
        let available = self.registry.media_types();
        self.negotiate_among(request, &available)
    }

    /// Negotiate against the subset of media types an endpoint offers.
    ///
    /// Entries without a registered renderer are ignored.
    pub fn negotiate_among(
        &self,
        request: &NegotiationRequest,
        available: &[&str],
    ) -> Result<Negotiated<'_>> {
        let offered: Vec<&str> = available
            .iter()
            .copied()
            .filter(|m| self.registry.get(m).is_some())
            .collect();
        let media_type = select_media_type(request, &offered)?;
        let renderer = self.registry.get(&media_type).ok_or_else(|| {
            Error::negotiation(
                NegotiationCode::NegotiationError,
                format!("No renderer registered for '{}'", media_type),
                None,
            )
        })?;
        Ok(Negotiated {
            media_type,
            renderer,
        })
    }

    pub fn render(&self, request: &NegotiationRequest, doc: &Document) -> Result<Rendered> {
        let available = self.registry.media_types();
        self.render_among(request, doc, &available)
    }

    /// Negotiate, then render. Renderer failures other than negotiation
    /// errors come back as `NEGOTIATION_ERROR` with the cause in `details`.
    pub fn render_among(
        &self,
        request: &NegotiationRequest,
        doc: &Document,
        available: &[&str],
    ) -> Result<Rendered> {
        let negotiated = self.negotiate_among(request, available)?;
        match negotiated.renderer.render(doc) {
            Ok(body) => Ok(Rendered {
                status: 200,
                media_type: negotiated.media_type,
                body,
            }),
            Err(err @ Error::ContentNegotiation { .. }) => Err(err),
            Err(err) => {
                tracing::warn!(media_type = %negotiated.media_type, error = %err, "renderer failed");
                Err(Error::negotiation(
                    NegotiationCode::NegotiationError,
                    format!("Failed to render {}", negotiated.media_type),
                    Some(json!({ "cause": err.to_string() })),
                ))
            }
        }
    }

    /// Like [`ContentNegotiator::render`], but failures become JSON error bodies.
    pub fn respond(&self, request: &NegotiationRequest, doc: &Document) -> Rendered {
        self.render(request, doc)
            .unwrap_or_else(|err| Rendered::error(&err))
    }
}
