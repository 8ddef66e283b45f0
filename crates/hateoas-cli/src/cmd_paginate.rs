use anyhow::{Context, Result};
use hateoas::v1::{Collection, DEFAULT_COLLECTION_NAME, Document};

pub fn run(
    base: &str,
    page: u64,
    page_size: u64,
    total: u64,
    name: Option<String>,
    pretty: bool,
) -> Result<()> {
    let doc = Document::from(paginate(base, page, page_size, total, name)?);
    let json = if pretty {
        doc.to_json_pretty()?
    } else {
        doc.to_json()?
    };
    println!("{}", json);
    Ok(())
}

fn paginate(
    base: &str,
    page: u64,
    page_size: u64,
    total: u64,
    name: Option<String>,
) -> Result<Collection> {
    let mut collection =
        Collection::named(name.unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string()));
    collection
        .set_pagination(page, page_size, total)
        .context("Invalid pagination")?;
    collection
        .add_pagination_links(base)
        .context("Failed to derive pagination links")?;
    Ok(collection)
}
