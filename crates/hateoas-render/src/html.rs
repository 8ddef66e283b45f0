//! Browsable HTML debug pages.
//!
//! Meant for poking at an API from a browser: every property, link, and
//! embedded resource is listed, followed by the raw canonical JSON.

use crate::{MEDIA_TYPE_HTML, RenderOptions, Renderer};
use hateoas::v1::{Collection, Document, LinkManager, Resource, Result};
use serde_json::Value;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse}td,th{border:1px solid #ddd;padding:4px 8px;text-align:left}\
.method{font-family:monospace;font-size:0.85em;background:#eee;padding:1px 4px;border-radius:3px}\
article{border-left:3px solid #cce5ff;padding-left:1em;margin:1em 0}\
pre{background:#f8f9fa;padding:1em;overflow:auto}";

#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    pub title: Option<String>,
    pub include_raw_json: bool,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(&RenderOptions::default())
    }
}

impl HtmlRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            title: options.html_title.clone(),
            include_raw_json: options.include_raw_json,
        }
    }
}

impl Renderer for HtmlRenderer {
    fn media_type(&self) -> &str {
        MEDIA_TYPE_HTML
    }

    fn render(&self, doc: &Document) -> Result<String> {
        let resource = doc.resource();
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| default_title(resource));

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
        html.push_str(&format!("<style>{}</style>\n", STYLE));
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&title)));

        match doc {
            Document::Resource(r) => push_resource_body(&mut html, r, 2),
            Document::Collection(c) => push_collection_body(&mut html, c),
        }

        if self.include_raw_json {
            let raw = serde_json::to_string_pretty(&doc.to_value())?;
            html.push_str("<section class=\"raw\">\n<h2>Raw JSON</h2>\n");
            html.push_str(&format!("<pre>{}</pre>\n</section>\n", escape_html(&raw)));
        }

        html.push_str("</body>\n</html>\n");
        Ok(html)
    }
}

fn default_title(resource: &Resource) -> String {
    match (resource.resource_type(), resource.id()) {
        ("", "") => "Resource".to_string(),
        (t, "") => t.to_string(),
        ("", id) => id.to_string(),
        (t, id) => format!("{} {}", t, id),
    }
}

fn push_collection_body(html: &mut String, collection: &Collection) {
    push_resource_body(html, collection.resource(), 2);

    html.push_str("<section class=\"pagination\">\n<h2>Pagination</h2>\n");
    match collection.pagination() {
        Some(p) => html.push_str(&format!(
            "<p>Page {} of {} ({} per page, {} total)</p>\n",
            p.page,
            p.total_pages(),
            p.page_size,
            p.total
        )),
        None => html.push_str(&format!("<p>{} items</p>\n", collection.count())),
    }
    html.push_str("</section>\n");

    html.push_str(&format!(
        "<section class=\"items\">\n<h2>{}</h2>\n",
        escape_html(collection.collection_name())
    ));
    for item in collection.items() {
        push_article(html, item, 3);
    }
    html.push_str("</section>\n");
}

/// `level` is the heading level used for section titles of this resource.
fn push_resource_body(html: &mut String, resource: &Resource, level: usize) {
    let h = level.min(6);

    if !resource.state().is_empty() {
        html.push_str(&format!(
            "<p class=\"state\">State: <code>{}</code></p>\n",
            escape_html(resource.state())
        ));
    }

    if !resource.properties().is_empty() {
        html.push_str(&format!(
            "<section class=\"properties\">\n<h{h}>Properties</h{h}>\n<table>\n"
        ));
        for (key, value) in resource.properties() {
            html.push_str(&format!(
                "<tr><th>{}</th><td>{}</td></tr>\n",
                escape_html(key),
                escape_html(&display_value(value))
            ));
        }
        html.push_str("</table>\n</section>\n");
    }

    if !resource.links().is_empty() {
        html.push_str(&format!(
            "<section class=\"links\">\n<h{h}>Links</h{h}>\n<ul>\n"
        ));
        push_links(html, resource.links());
        html.push_str("</ul>\n</section>\n");
    }

    let transitions = resource.available_transitions();
    if !transitions.is_empty() {
        html.push_str(&format!(
            "<section class=\"transitions\">\n<h{h}>Available transitions</h{h}>\n<ul>\n"
        ));
        for t in transitions {
            html.push_str(&format!(
                "<li><span class=\"method\">{}</span> <code>{}</code> &rarr; <code>{}</code> <a href=\"{}\">{}</a></li>\n",
                escape_html(&t.method),
                escape_html(&t.from),
                escape_html(&t.to),
                escape_html(&t.href),
                escape_html(&t.name)
            ));
        }
        html.push_str("</ul>\n</section>\n");
    }

    let embedded: Vec<_> = resource
        .all_embedded()
        .filter(|(_, list)| !list.is_empty())
        .collect();
    if !embedded.is_empty() {
        html.push_str(&format!(
            "<section class=\"embedded\">\n<h{h}>Embedded</h{h}>\n"
        ));
        for (rel, list) in embedded {
            let sub = (level + 1).min(6);
            html.push_str(&format!("<h{sub}>{}</h{sub}>\n", escape_html(rel)));
            for child in list {
                push_article(html, child, level + 2);
            }
        }
        html.push_str("</section>\n");
    }
}

fn push_article(html: &mut String, resource: &Resource, level: usize) {
    let h = level.min(6);
    html.push_str("<article>\n");
    html.push_str(&format!(
        "<h{h}>{}</h{h}>\n",
        escape_html(&default_title(resource))
    ));
    push_resource_body(html, resource, level + 1);
    html.push_str("</article>\n");
}

fn push_links(html: &mut String, links: &LinkManager) {
    for (rel, entry) in links.iter() {
        for link in entry.as_slice() {
            let target = if link.templated {
                format!("<code>{}</code>", escape_html(&link.href))
            } else {
                format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(&link.href),
                    escape_html(&link.href)
                )
            };
            let title = link
                .title
                .as_deref()
                .map(|t| format!(" <em>{}</em>", escape_html(t)))
                .unwrap_or_default();
            html.push_str(&format!(
                "<li><strong>{}</strong> <span class=\"method\">{}</span> {}{}</li>\n",
                escape_html(rel),
                escape_html(&link.method),
                target,
                title
            ));
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Escape a string for HTML text and attribute contexts.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hateoas::v1::Transition;

    fn order() -> Resource {
        let mut r = Resource::new("order", "1").with_state("pending");
        r.set_property("total", 10).unwrap();
        r.set_property("note", "<b>fragile</b>").unwrap();
        r.add_link("self", "/orders/1").unwrap();
        r.add_templated_link("search", "/orders{?q}").unwrap();
        r.add_transition(Transition::new("pending", "paid", "pay", "/orders/1/pay").unwrap())
            .unwrap();
        r
    }

    // ── escape_html ────────────────────────────────────────────────────

    #[test]
    fn test_escape_html_ampersand() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }

    #[test]
    fn test_escape_html_combined() {
        assert_eq!(
            escape_html(r#"<a href="url">&</a>"#),
            "&lt;a href=&quot;url&quot;&gt;&amp;&lt;/a&gt;"
        );
    }

    // ── default_title ──────────────────────────────────────────────────

    #[test]
    fn test_default_title() {
        assert_eq!(default_title(&Resource::new("order", 1)), "order 1");
        assert_eq!(default_title(&Resource::new("order", "")), "order");
        assert_eq!(default_title(&Resource::default()), "Resource");
    }

    // ── render ─────────────────────────────────────────────────────────

    #[test]
    fn test_render_resource_page() {
        let html = HtmlRenderer::default()
            .render(&Document::from(order()))
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>order 1</title>"));
        assert!(html.contains("State: <code>pending</code>"));
        assert!(html.contains("<th>total</th><td>10</td>"));
        assert!(html.contains("<a href=\"/orders/1\">/orders/1</a>"));
        assert!(html.contains("<code>/orders{?q}</code>"));
        assert!(html.contains("Available transitions"));
        assert!(html.contains("Raw JSON"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_render_escapes_property_values() {
        let html = HtmlRenderer::default()
            .render(&Document::from(order()))
            .unwrap();
        assert!(html.contains("&lt;b&gt;fragile&lt;/b&gt;"));
        assert!(!html.contains("<b>fragile</b>"));
    }

    #[test]
    fn test_render_embedded_articles() {
        let mut r = order();
        let mut line = Resource::new("line", "a");
        line.set_property("sku", "X-1").unwrap();
        r.embed("lines", line).unwrap();
        let html = HtmlRenderer::default().render(&Document::from(r)).unwrap();
        assert!(html.contains("Embedded"));
        assert!(html.contains("<article>"));
        assert!(html.contains("line a"));
        assert!(html.contains("X-1"));
    }

    #[test]
    fn test_render_collection() {
        let mut c = Collection::named("orders");
        c.add_items(vec![order(), order()]);
        c.set_pagination(2, 2, 5).unwrap();
        let html = HtmlRenderer::default().render(&Document::from(c)).unwrap();
        assert!(html.contains("Page 2 of 3 (2 per page, 5 total)"));
        assert_eq!(html.matches("<article>").count(), 2);
        assert!(html.contains("<h2>orders</h2>"));
    }

    #[test]
    fn test_render_options() {
        let options = RenderOptions {
            include_raw_json: false,
            html_title: Some("Orders & more".into()),
            ..Default::default()
        };
        let html = HtmlRenderer::new(&options)
            .render(&Document::from(order()))
            .unwrap();
        assert!(html.contains("<title>Orders &amp; more</title>"));
        assert!(!html.contains("Raw JSON"));
    }
}
