use std::future::Future;

use futures::stream::{self, Stream, TryStreamExt};

/// One page from a cursor-paginated endpoint.
#[derive(Debug)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

enum CursorState {
    Start,
    After(String),
    Exhausted,
}

/// Lazily walks a cursor-paginated endpoint, yielding items one by one.
///
/// `fetch` receives `None` for the first page and the cursor returned by the
/// previous page afterwards. The walk ends when a page carries no cursor or
/// no items, or after the first error.
pub fn cursor_paginated<T, E, F, Fut>(mut fetch: F) -> impl Stream<Item = Result<T, E>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<CursorPage<T>, E>>,
{
    stream::try_unfold(CursorState::Start, move |state| {
        let request = match state {
            CursorState::Start => Some(fetch(None)),
            CursorState::After(cursor) => Some(fetch(Some(cursor))),
            CursorState::Exhausted => None,
        };
        async move {
            let Some(request) = request else {
                return Ok(None);
            };
            let page = request.await?;
            let next = match page.next_cursor {
                Some(cursor) if !page.items.is_empty() => CursorState::After(cursor),
                _ => CursorState::Exhausted,
            };
            Ok::<_, E>(Some((page.items, next)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, E>)))
    .try_flatten()
}

/// Lazily walks an offset-paginated endpoint, yielding items one by one.
///
/// `fetch` receives `(offset, limit)`. The walk ends after the first page
/// holding fewer than `page_size` items, or after the first error.
pub fn offset_paginated<T, E, F, Fut>(page_size: u32, mut fetch: F) -> impl Stream<Item = Result<T, E>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let page_size = page_size.max(1);
    stream::try_unfold(Some(0u32), move |offset| {
        let request = offset.map(|offset| (offset, fetch(offset, page_size)));
        async move {
            let Some((offset, request)) = request else {
                return Ok(None);
            };
            let items = request.await?;
            let next = if items.len() >= page_size as usize {
                offset.checked_add(page_size)
            } else {
                None
            };
            Ok::<_, E>(Some((items, next)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, E>)))
    .try_flatten()
}
