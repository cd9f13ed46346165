//!
//! This module defines MessageViewer, the state behind a paginated view of one queue's messages.
//!
//! Loading is split into [`MessageViewer::begin_load`] and [`MessageViewer::apply`] so results can arrive in any
//! order: only the most recently issued load is applied, and nothing is applied after [`MessageViewer::close`].
//!
use crate::client::QueueService;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{Message, MessagePage};
use crate::pagination::{PageRequest, PageSize, PageView, Pagination};
use crate::sequence::{QueryKey, RequestSequencer, Ticket};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The page was applied.
    Loaded,

    /// The page was applied, but its total no longer covers the current page. The page was clamped and the
    /// caller should load again.
    Clamped,

    /// The load failed; the previous state is retained and the message is available from [`MessageViewer::error`].
    Failed,

    /// A newer load was issued, or the viewer was closed. Nothing changed.
    Stale,
}

pub struct MessageViewer {
    queue_id: String,
    pagination: Pagination,
    sequencer: RequestSequencer,
    data: Option<MessagePage>,
    error: Option<String>,
    loading: bool,
    closed: bool,
}

impl MessageViewer {
    pub fn new(queue_id: &str, page_size: PageSize) -> Self {
        Self {
            queue_id: queue_id.to_owned(),
            pagination: Pagination::new(page_size),
            sequencer: RequestSequencer::new(),
            data: None,
            error: None,
            loading: false,
            closed: false,
        }
    }

    /// Build a viewer using the configured default page size.
    pub fn from_config(queue_id: &str, config: &ClientConfig) -> Self {
        Self::new(queue_id, config.default_page_size)
    }

    pub fn queue_id(&self) -> &str {
        &self.queue_id
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn messages(&self) -> &[Message] {
        self.data
            .as_ref()
            .map(|data| data.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> PageView {
        match &self.data {
            Some(data) => self.pagination.view(data),
            None => self.pagination.view(&MessagePage::default()),
        }
    }

    /// Switch to another queue, starting over on its first page.
    pub fn select_queue(&mut self, queue_id: &str) {
        if self.queue_id == queue_id {
            return;
        }
        self.queue_id = queue_id.to_owned();
        // Loads for the previous queue must not apply if the user comes back to it.
        self.sequencer.cancel_all();
        self.loading = false;
        self.pagination.reset();
        self.data = None;
        self.error = None;
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.pagination.set_page_size(page_size);
    }

    /// Returns whether the page changed and a load is due.
    pub fn next_page(&mut self) -> bool {
        let has_more = self.data.as_ref().map_or(false, |data| data.has_more);
        self.pagination.next_page(has_more)
    }

    /// Returns whether the page changed and a load is due.
    pub fn previous_page(&mut self) -> bool {
        self.pagination.previous_page()
    }

    pub fn toggle_row(&mut self, message_id: &str) {
        self.pagination.toggle_row(message_id);
    }

    /// Tear the view down. Loads still in flight are discarded when they complete.
    pub fn close(&mut self) {
        self.closed = true;
        self.loading = false;
        self.sequencer.cancel_all();
    }

    /// Issue a load for the current page, superseding any load still in flight.
    pub fn begin_load(&mut self) -> (Ticket, PageRequest) {
        self.loading = true;
        let ticket = self.sequencer.issue(QueryKey::messages(&self.queue_id));
        (ticket, self.pagination.request())
    }

    /// Apply the result of the load identified by `ticket`.
    pub fn apply(&mut self, ticket: Ticket, result: Result<MessagePage, ClientError>) -> Outcome {
        if self.closed
            || ticket.key() != &QueryKey::messages(&self.queue_id)
            || !self.sequencer.is_current(&ticket)
        {
            tracing::debug!("Discarding stale result for {} (#{})", ticket.key(), ticket.sequence());
            return Outcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                self.error = None;
                let clamped = self.pagination.clamp_to_total(page.total);
                self.data = Some(page);
                if clamped {
                    tracing::debug!(
                        "Result set of {} shrank, moved to page {}",
                        self.queue_id,
                        self.pagination.page()
                    );
                    Outcome::Clamped
                } else {
                    Outcome::Loaded
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load messages of {}: {}", self.queue_id, e);
                self.error = Some(e.display_message());
                Outcome::Failed
            }
        }
    }

    /// Load the current page through `service`, following any clamp to the last valid page.
    pub async fn load<T: Transport>(&mut self, service: &QueueService<T>) -> Outcome {
        loop {
            let (ticket, window) = self.begin_load();
            let result = service.messages(&self.queue_id, window).await;
            match self.apply(ticket, result) {
                // Each clamp strictly lowers the page, so this terminates.
                Outcome::Clamped => continue,
                outcome => return outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use reqwest::StatusCode;
    use serde_json::{json, Value};

    fn messages(from: u64, to: u64) -> Value {
        Value::Array((from..to).map(|i| json!({"id": format!("m{}", i)})).collect())
    }

    fn page(ids: &[&str], total: u64, has_more: bool) -> MessagePage {
        MessagePage {
            messages: ids
                .iter()
                .map(|id| Message {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            count: ids.len() as u64,
            total,
            offset: 0,
            limit: 10,
            has_more,
        }
    }

    #[tokio::test]
    async fn test_load_and_navigate() {
        let transport = MockTransport::new();
        transport
            .respond(Ok(json!({"messages": messages(0, 10), "total": 25, "hasMore": true})))
            .respond(Ok(json!({"messages": messages(10, 20), "total": 25, "hasMore": true})));
        let service = QueueService::new(transport);
        let mut viewer = MessageViewer::new("orders", PageSize::default());

        assert_eq!(viewer.load(&service).await, Outcome::Loaded);
        let view = viewer.view();
        assert_eq!((view.displayed_from, view.displayed_to), (1, 10));
        assert_eq!(view.page_count, 3);
        assert!(view.can_go_next);
        assert!(!view.can_go_previous);

        viewer.toggle_row("m3");
        assert!(viewer.next_page());
        assert_eq!(viewer.pagination().expanded_row(), None);
        assert_eq!(viewer.load(&service).await, Outcome::Loaded);
        assert_eq!(viewer.view().displayed_from, 11);
        assert_eq!(viewer.messages()[0].id, "m10");

        let requests = service.transport().requests();
        assert_eq!(requests[1].query[1], ("offset".to_owned(), "10".to_owned()));
    }

    #[tokio::test]
    async fn test_shrinking_total_clamps_and_refetches() {
        let transport = MockTransport::new();
        transport
            .respond(Ok(json!({"messages": [], "total": 15, "hasMore": false})))
            .respond(Ok(json!({"messages": messages(10, 15), "total": 15, "hasMore": false})));
        let service = QueueService::new(transport);
        let mut viewer = MessageViewer::new("orders", PageSize::default());
        viewer.pagination.next_page(true);
        viewer.pagination.next_page(true);
        viewer.toggle_row("m21");
        assert_eq!(viewer.pagination().offset(), 20);

        assert_eq!(viewer.load(&service).await, Outcome::Loaded);
        assert_eq!(viewer.pagination().page(), 1);
        assert_eq!(viewer.pagination().expanded_row(), None);
        assert_eq!(viewer.messages().len(), 5);

        let offsets: Vec<String> = service
            .transport()
            .requests()
            .iter()
            .map(|r| r.query[1].1.clone())
            .collect();
        assert_eq!(offsets, vec!["20", "10"]);
    }

    #[test]
    fn test_out_of_order_results() {
        let mut viewer = MessageViewer::new("orders", PageSize::default());
        let (first, _) = viewer.begin_load();
        let (second, _) = viewer.begin_load();

        assert_eq!(viewer.apply(second, Ok(page(&["new"], 1, false))), Outcome::Loaded);
        assert_eq!(viewer.apply(first, Ok(page(&["old"], 1, false))), Outcome::Stale);
        assert_eq!(viewer.messages()[0].id, "new");
    }

    #[test]
    fn test_failure_retains_state() {
        let mut viewer = MessageViewer::new("orders", PageSize::default());
        let (ticket, _) = viewer.begin_load();
        viewer.apply(ticket, Ok(page(&["a", "b"], 30, true)));
        assert!(viewer.next_page());
        viewer.toggle_row("b");

        let (ticket, _) = viewer.begin_load();
        let err = ClientError::Backend {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: Some("broker offline".to_owned()),
        };
        assert_eq!(viewer.apply(ticket, Err(err)), Outcome::Failed);
        assert_eq!(viewer.error(), Some("broker offline"));
        assert_eq!(viewer.pagination().page(), 1);
        assert_eq!(viewer.pagination().expanded_row(), Some("b"));
        assert_eq!(viewer.messages().len(), 2);
        assert!(!viewer.is_loading());
    }

    #[test]
    fn test_close_discards_pending() {
        let mut viewer = MessageViewer::new("orders", PageSize::default());
        let (ticket, _) = viewer.begin_load();
        viewer.close();
        assert_eq!(viewer.apply(ticket, Ok(page(&["late"], 1, false))), Outcome::Stale);
        assert!(viewer.messages().is_empty());
    }

    #[test]
    fn test_select_queue_resets() {
        let mut viewer = MessageViewer::new("orders", PageSize::new(25).unwrap());
        let (ticket, _) = viewer.begin_load();
        viewer.apply(ticket, Ok(page(&["a"], 100, true)));
        viewer.next_page();
        viewer.toggle_row("a");
        let (pending, _) = viewer.begin_load();

        viewer.select_queue("billing");
        assert_eq!(viewer.pagination().page(), 0);
        assert_eq!(viewer.pagination().expanded_row(), None);
        assert_eq!(viewer.pagination().page_size().get(), 25);
        assert!(viewer.messages().is_empty());
        assert_eq!(viewer.apply(pending, Ok(page(&["x"], 1, false))), Outcome::Stale);
    }

    #[test]
    fn test_switching_away_and_back_discards_pending() {
        let mut viewer = MessageViewer::new("orders", PageSize::default());
        let (ticket, _) = viewer.begin_load();
        viewer.apply(ticket, Ok(page(&["a"], 30, true)));
        viewer.next_page();
        viewer.next_page();
        let (pending, window) = viewer.begin_load();
        assert_eq!(window.offset, 20);

        viewer.select_queue("billing");
        viewer.select_queue("orders");
        assert_eq!(viewer.apply(pending, Ok(page(&["page2-row"], 30, false))), Outcome::Stale);
        assert_eq!(viewer.pagination().page(), 0);
        assert!(viewer.messages().is_empty());

        let (fresh, window) = viewer.begin_load();
        assert_eq!(window.offset, 0);
        assert_eq!(viewer.apply(fresh, Ok(page(&["page0-row"], 30, true))), Outcome::Loaded);
        assert_eq!(viewer.messages()[0].id, "page0-row");
    }

    #[test]
    fn test_from_config_uses_default_page_size() {
        let config = ClientConfig {
            default_page_size: PageSize::new(50).unwrap(),
            ..Default::default()
        };
        let viewer = MessageViewer::from_config("orders", &config);
        assert_eq!(viewer.queue_id(), "orders");
        assert_eq!(viewer.pagination().request(), PageRequest { offset: 0, limit: 50 });
    }

    #[test]
    fn test_next_page_requires_has_more() {
        let mut viewer = MessageViewer::new("orders", PageSize::default());
        assert!(!viewer.next_page());
        let (ticket, _) = viewer.begin_load();
        viewer.apply(ticket, Ok(page(&["a"; 9], 9, false)));
        assert!(!viewer.next_page());
        assert_eq!(viewer.view().page_count, 1);
    }
}
