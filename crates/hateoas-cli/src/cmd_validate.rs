use anyhow::Result;
use hateoas::v1::Document;
use std::path::PathBuf;

pub fn run(input: PathBuf) -> Result<()> {
    let doc = crate::read_doc(Some(&input))?;
    println!("{}", describe(&doc));
    Ok(())
}

fn describe(doc: &Document) -> String {
    match doc {
        Document::Resource(r) => {
            let mut line = format!("Valid resource: {} {}", r.resource_type(), r.id());
            if !r.state().is_empty() {
                line.push_str(&format!(" (state: {})", r.state()));
            }
            line
        }
        Document::Collection(c) => {
            let mut line = format!(
                "Valid collection: {} ({} items)",
                c.collection_name(),
                c.count()
            );
            if let Some(p) = c.pagination() {
                line.push_str(&format!(", page {} of {}", p.page, p.total_pages()));
            }
            line
        }
    }
}
