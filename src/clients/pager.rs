//! Item-at-a-time iteration over paginated list responses.

use std::collections::VecDeque;
use std::future::Future;

use crate::error::GatewayError;

/// One page of a paginated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Token for the following page; `None` on the last page.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Builds a page, treating an empty token as "no more pages".
    #[must_use]
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.filter(|t| !t.is_empty()),
        }
    }

    /// A final page holding `items`.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Yields items one by one, fetching pages on demand.
///
/// [`Paginator::next`] returns `Ok(None)` once the last page is drained;
/// that is the only "done" signal. After an error the paginator is spent
/// and keeps returning `Ok(None)`.
#[derive(Debug)]
pub struct Paginator<T, F> {
    fetch: F,
    buffered: VecDeque<T>,
    next_token: Option<String>,
    done: bool,
}

impl<T, F, Fut> Paginator<T, F>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, GatewayError>>,
{
    /// Creates a paginator; `fetch` receives the page token to request.
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            buffered: VecDeque::new(),
            next_token: None,
            done: false,
        }
    }

    /// Returns the next item, or `Ok(None)` when iteration is complete.
    ///
    /// # Errors
    ///
    /// Propagates the error of the page fetch that failed.
    pub async fn next(&mut self) -> Result<Option<T>, GatewayError> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Ok(Some(item));
            }
            if self.done {
                return Ok(None);
            }

            let page = match (self.fetch)(self.next_token.take()).await {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            };
            self.next_token = page.next_page_token.filter(|t| !t.is_empty());
            self.done = self.next_token.is_none();
            self.buffered.extend(page.items);
        }
    }
}
