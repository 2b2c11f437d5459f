use async_trait::async_trait;

use crate::domain::Record;
use crate::error::Result;
use crate::markup::{clean_text, normalize_ws};

/// One named way of turning a query into headline records.
///
/// An empty vector means "nothing usable here". Errors should be transport or
/// parse failures; anything else stops the whole chain.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, query: &str) -> Result<Vec<Record>>;
}

/// Clean raw fields into a record. Title and link are mandatory; a blank
/// publish field is kept as `None`.
pub fn normalize_record(title: &str, link: &str, published: Option<&str>) -> Option<Record> {
    let title = clean_text(title);
    let link = normalize_ws(link);
    if title.is_empty() || link.is_empty() {
        return None;
    }

    let published = published.map(clean_text).filter(|p| !p.is_empty());
    Some(Record {
        title,
        link,
        published,
    })
}
