use anyhow::{Context, Result};
use hateoas_render::{ContentNegotiator, NegotiationRequest, RenderOptions};

pub fn run(accept: Option<String>, format: Option<String>, offers: Vec<String>) -> Result<()> {
    println!("{}", negotiate(accept, format, &offers)?);
    Ok(())
}

fn negotiate(accept: Option<String>, format: Option<String>, offers: &[String]) -> Result<String> {
    let negotiator = ContentNegotiator::with_defaults(&RenderOptions::default());
    let request = NegotiationRequest { accept, format };
    let negotiated = if offers.is_empty() {
        negotiator.negotiate(&request)
    } else {
        let offered: Vec<&str> = offers.iter().map(String::as_str).collect();
        negotiator.negotiate_among(&request, &offered)
    };
    let negotiated = negotiated.context("Content negotiation failed")?;
    Ok(negotiated.media_type)
}
