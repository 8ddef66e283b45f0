use crate::{MEDIA_TYPE_JSON, RenderOptions, Renderer, to_string};
use hateoas::v1::{Document, Result};

/// Canonical JSON, exactly as produced by `Resource::to_json`.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl JsonRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            pretty: options.pretty,
        }
    }
}

impl Renderer for JsonRenderer {
    fn media_type(&self) -> &str {
        MEDIA_TYPE_JSON
    }

    fn render(&self, doc: &Document) -> Result<String> {
        to_string(&doc.to_value(), self.pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hateoas::v1::Resource;

    #[test]
    fn test_render_is_canonical_json() {
        let mut r = Resource::new("order", 1);
        r.set_property("total", 5).unwrap();
        let doc = Document::from(r.clone());
        let body = JsonRenderer::default().render(&doc).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, r.to_json());
        assert!(!body.contains('\n'));
    }

    #[test]
    fn test_render_pretty() {
        let doc = Document::from(Resource::new("order", 1));
        let options = RenderOptions {
            pretty: true,
            ..Default::default()
        };
        let body = JsonRenderer::new(&options).render(&doc).unwrap();
        assert!(body.contains('\n'));
    }
}
