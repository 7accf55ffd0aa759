//! Auto-pagination over list-returning methods.
//!
//! Pages are fetched lazily: page `n + 1` is only requested once every item
//! of page `n` has been consumed. Whether there is a next page is read from
//! whatever signal the response carries, in this order:
//!
//! 1. `page` / `pages` counters: stop once the current page reaches `pages`;
//! 2. a `has_next_page` flag: continue only while it is `"1"`;
//! 3. nothing: the response is not paged, stop after the first fetch.

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::entity::Entity;
use crate::error::Result;
use crate::method::{Args, Method};

pub const PAGE_ARG: &str = "page";
pub const PAGES_FIELD: &str = "pages";
pub const HAS_NEXT_PAGE_FIELD: &str = "has_next_page";
const HAS_NEXT_PAGE_TRUE: &str = "1";
const FIRST_PAGE: u32 = 1;

/// Pagination signal exposed by one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSignal {
    Counted { page: Option<u64>, pages: Option<u64> },
    HasMore(bool),
    Unpaged,
}

impl PageSignal {
    pub fn of(result: &Entity) -> Self {
        if result.get(PAGES_FIELD).is_some() {
            PageSignal::Counted {
                page: parse_count(result.attr(PAGE_ARG)),
                pages: parse_count(result.attr(PAGES_FIELD)),
            }
        } else if let Some(flag) = result.get(HAS_NEXT_PAGE_FIELD) {
            PageSignal::HasMore(flag.text() == Some(HAS_NEXT_PAGE_TRUE))
        } else {
            PageSignal::Unpaged
        }
    }
}

fn parse_count(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Page to request after `requested`, or `None` when the sequence is done
pub fn next_page(result: &Entity, requested: u32) -> Option<u32> {
    let more = match PageSignal::of(result) {
        PageSignal::Counted { page, pages } => match pages {
            Some(pages) => page.unwrap_or(u64::from(requested)) < pages,
            None => false,
        },
        PageSignal::HasMore(more) => more,
        PageSignal::Unpaged => false,
    };
    if more { requested.checked_add(1) } else { None }
}

struct Cursor<'c> {
    method: Method<'c>,
    args: Args,
    next: Option<u32>,
}

async fn fetch_page(mut cursor: Cursor<'_>) -> Result<Option<(Vec<Entity>, Cursor<'_>)>> {
    let Some(page) = cursor.next else {
        return Ok(None);
    };
    debug!(method = %cursor.method, page, "fetching page");

    cursor.args.set(PAGE_ARG, page);
    let result = cursor.method.call(cursor.args.clone()).await?;
    cursor.next = next_page(&result, page);

    Ok(Some((result.into_items(), cursor)))
}

/// Lazily page through `method`, yielding every positional item
pub fn paginate<'c>(method: Method<'c>, args: Args) -> BoxStream<'c, Result<Entity>> {
    let cursor = Cursor {
        method,
        args,
        next: Some(FIRST_PAGE),
    };

    stream::try_unfold(cursor, fetch_page)
        .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
        .try_flatten()
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::{ResponseMapper, Session};

    fn result(xml: &str) -> Entity {
        let node = Node::parse(xml.as_bytes()).unwrap();
        ResponseMapper::default()
            .map(&Session::new("key"), &node)
            .unwrap()
    }

    #[test]
    fn test_counted_pages() {
        let first = result(r#"<photos page="1" pages="2"><photo id="1"/></photos>"#);
        let last = result(r#"<photos page="2" pages="2"><photo id="2"/></photos>"#);

        assert_eq!(
            PageSignal::of(&first),
            PageSignal::Counted {
                page: Some(1),
                pages: Some(2)
            }
        );
        assert_eq!(next_page(&first, 1), Some(2));
        assert_eq!(next_page(&last, 2), None);
    }

    #[test]
    fn test_zero_pages_terminates() {
        let empty = result(r#"<photos page="1" pages="0" total="0"/>"#);
        assert_eq!(next_page(&empty, 1), None);
    }

    #[test]
    fn test_missing_page_counter_uses_requested_page() {
        let response = result(r#"<photos pages="3"><photo id="1"/></photos>"#);
        assert_eq!(next_page(&response, 1), Some(2));
        assert_eq!(next_page(&response, 3), None);
    }

    #[test]
    fn test_has_next_page_flag() {
        let more = result(r#"<events has_next_page="1"><event id="1"/></events>"#);
        let done = result(r#"<events has_next_page="0"><event id="2"/></events>"#);

        assert_eq!(PageSignal::of(&more), PageSignal::HasMore(true));
        assert_eq!(next_page(&more, 4), Some(5));
        assert_eq!(next_page(&done, 5), None);
    }

    #[test]
    fn test_counted_signal_takes_priority() {
        let response = result(
            r#"<photos page="2" pages="2" has_next_page="1"><photo id="1"/></photos>"#,
        );
        assert_eq!(next_page(&response, 2), None);
    }

    #[test]
    fn test_unpaged_response_stops() {
        let response = result(r#"<sizes><size label="Square"/></sizes>"#);
        assert_eq!(PageSignal::of(&response), PageSignal::Unpaged);
        assert_eq!(next_page(&response, 1), None);
        assert_eq!(next_page(&Entity::Text(None), 1), None);
    }
}
