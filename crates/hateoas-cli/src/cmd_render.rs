use anyhow::{Context, Result};
use hateoas::v1::Document;
use hateoas_render::{ContentNegotiator, NegotiationRequest, RenderOptions, Rendered};
use std::path::PathBuf;

pub struct RenderArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub accept: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub include_raw_json: bool,
    pub pretty: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let doc = crate::read_doc(args.input.as_deref())?;
    let rendered = render_doc(&doc, &args)?;

    if let Some(output_path) = &args.output {
        std::fs::write(output_path, &rendered.body)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        eprintln!(
            "Rendered {} to {}",
            rendered.content_type(),
            output_path.display()
        );
    } else {
        println!("{}", rendered.body);
    }

    Ok(())
}

fn render_doc(doc: &Document, args: &RenderArgs) -> Result<Rendered> {
    let options = RenderOptions {
        pretty: args.pretty,
        include_raw_json: args.include_raw_json,
        html_title: args.title.clone(),
    };
    let negotiator = ContentNegotiator::with_defaults(&options);
    let request = NegotiationRequest {
        accept: args.accept.clone(),
        format: args.format.clone(),
    };
    negotiator
        .render(&request, doc)
        .context("Content negotiation failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hateoas::v1::Resource;
    use std::io::Write;

    fn make_doc() -> Document {
        let mut r = Resource::new("order", 1).with_state("pending");
        r.set_property("total", 10).unwrap();
        r.add_link("self", "/orders/1").unwrap();
        Document::from(r)
    }

    fn args(accept: Option<&str>, format: Option<&str>) -> RenderArgs {
        RenderArgs {
            input: None,
            output: None,
            accept: accept.map(str::to_string),
            format: format.map(str::to_string),
            title: None,
            include_raw_json: true,
            pretty: false,
        }
    }

    fn write_temp_doc(doc: &Document) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{}", doc.to_json().unwrap()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_render_doc_default_json() {
        let rendered = render_doc(&make_doc(), &args(None, None)).unwrap();
        assert_eq!(rendered.media_type, "application/json");
        assert!(rendered.body.contains("\"properties\""));
    }

    #[test]
    fn test_render_doc_hal_by_accept() {
        let rendered = render_doc(&make_doc(), &args(Some("application/hal+json"), None)).unwrap();
        assert_eq!(rendered.media_type, "application/hal+json");
        assert!(!rendered.body.contains("\"properties\""));
    }

    #[test]
    fn test_render_doc_html_title() {
        let mut a = args(None, Some("html"));
        a.title = Some("Order page".into());
        let rendered = render_doc(&make_doc(), &a).unwrap();
        assert!(rendered.body.contains("<title>Order page</title>"));
    }

    #[test]
    fn test_render_doc_not_acceptable() {
        let err = render_doc(&make_doc(), &args(Some("image/png"), None)).unwrap_err();
        assert!(format!("{:#}", err).contains("None of the requested media types"));
    }

    #[test]
    fn test_run_writes_output_file() {
        let f = write_temp_doc(&make_doc());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("order.html");
        let mut a = args(None, Some("html"));
        a.input = Some(f.path().to_path_buf());
        a.output = Some(out.clone());
        run(a).unwrap();
        let html = std::fs::read_to_string(out).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_run_missing_input() {
        let mut a = args(None, None);
        a.input = Some(PathBuf::from("/nonexistent/order.json"));
        assert!(run(a).is_err());
    }
}
