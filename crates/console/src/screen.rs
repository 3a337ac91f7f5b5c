//! The users list screen: current page, filters, selection and notices.
//!
//! Navigation goes `Idle -> Loading -> Idle`. A bulk action goes
//! `Idle -> Pending -> Idle`; the selection is cleared on success and left
//! alone on failure.
//!
//! Every fetch takes a ticket from a monotonically increasing counter. A
//! response is applied only if its ticket is still the latest one issued, so
//! a slow early response can never overwrite a newer page.

use std::collections::BTreeSet;
use std::sync::Arc;

use warden_core::bulk::{BulkAction, BulkRequest};
use warden_core::list_query::{FilterState, PageResult, TableSpec};
use warden_core::selection::{HeaderState, SelectionSet};
use warden_core::types::RecordId;

use crate::client::{BulkReport, ListBackend, UserRow, USERS_PATH};
use crate::error::ConsoleError;
use crate::notice::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenStatus {
    Idle,
    Loading,
    Pending(BulkAction),
}

/// A fetch in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub state: FilterState,
}

pub struct ListScreen<B> {
    backend: Arc<B>,
    acting_user: RecordId,
    filters: FilterState,
    page: Option<PageResult<UserRow>>,
    selection: SelectionSet,
    status: ScreenStatus,
    latest_ticket: u64,
    notices: Vec<Notice>,
}

impl<B: ListBackend> ListScreen<B> {
    pub fn new(backend: Arc<B>, table: &TableSpec, acting_user: RecordId) -> Self {
        Self {
            backend,
            acting_user,
            filters: FilterState::from_defaults(&table.defaults()),
            page: None,
            selection: SelectionSet::new(),
            status: ScreenStatus::Idle,
            latest_ticket: 0,
            notices: Vec::new(),
        }
    }

    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> Option<&PageResult<UserRow>> {
        self.page.as_ref()
    }

    pub fn rows(&self) -> &[UserRow] {
        self.page.as_ref().map(|p| p.data.as_slice()).unwrap_or_default()
    }

    pub fn status(&self) -> ScreenStatus {
        self.status
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Take the accumulated notices, leaving none behind.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // -----------------------------------------------------------------------
    // Fetching
    // -----------------------------------------------------------------------

    /// Start a fetch for `state`. The returned ticket supersedes all earlier
    /// ones.
    ///
    /// [`navigate`](Self::navigate) issues and applies in one call, so its
    /// fetches never overlap. Callers that run several fetches at once use
    /// `issue` and [`apply`](Self::apply) directly; only the newest ticket's
    /// page is kept.
    pub fn issue(&mut self, state: FilterState) -> FetchTicket {
        self.latest_ticket += 1;
        self.status = ScreenStatus::Loading;
        FetchTicket {
            id: self.latest_ticket,
            state,
        }
    }

    /// Apply the outcome of `ticket`'s fetch. Returns `false` when the
    /// ticket is stale and the outcome was discarded.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<PageResult<UserRow>, ConsoleError>,
    ) -> bool {
        if ticket.id != self.latest_ticket {
            tracing::debug!(ticket = ticket.id, latest = self.latest_ticket, "Discarding stale page");
            return false;
        }
        self.status = ScreenStatus::Idle;

        match outcome {
            Ok(page) => {
                self.filters = ticket.state;
                self.page = Some(page);
                self.selection.clear();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load users");
                self.notices.push(Notice::error(format!("Could not load users: {e}")));
            }
        }
        true
    }

    /// Fetch `state` and apply it.
    pub async fn navigate(&mut self, state: FilterState) {
        let ticket = self.issue(state);
        let outcome = self.backend.fetch_page(&ticket.state).await;
        self.apply(ticket, outcome);
    }

    pub async fn reload(&mut self) {
        let state = self.filters.clone();
        self.navigate(state).await;
    }

    pub async fn search(&mut self, text: impl Into<String>) {
        let state = self.filters.with_search(text);
        self.navigate(state).await;
    }

    pub async fn go_to_page(&mut self, page: u32) {
        let state = self.filters.with_page(page);
        self.navigate(state).await;
    }

    pub async fn sort_by(&mut self, column: &str) {
        let state = self.filters.with_sort_toggled(column);
        self.navigate(state).await;
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    fn page_ids(&self) -> Vec<RecordId> {
        self.rows().iter().map(UserRow::record_id).collect()
    }

    /// Toggle a row on the current page. Ids not on the page are ignored.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if !self.page_ids().contains(&id) {
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn toggle_all(&mut self) {
        let ids = self.page_ids();
        self.selection.toggle_all(&ids);
    }

    pub fn header_state(&self) -> HeaderState {
        self.selection.header_state(&self.page_ids())
    }

    // -----------------------------------------------------------------------
    // Bulk actions
    // -----------------------------------------------------------------------

    /// Run `action` over the selected rows.
    ///
    /// Guard failures raise a warning without touching the network. Returns
    /// the server report when the action went through.
    pub async fn run_bulk(&mut self, action: BulkAction) -> Option<BulkReport> {
        let request = match BulkRequest::prepare(action, self.selection.selected_ids(), &self.acting_user) {
            Ok(request) => request,
            Err(guard) => {
                self.notices.push(Notice::warning(guard.to_string()));
                return None;
            }
        };

        self.status = ScreenStatus::Pending(action);
        let outcome = self.backend.bulk(&request).await;
        self.status = ScreenStatus::Idle;

        match outcome {
            Ok(report) => {
                self.apply_bulk(&request, &report);
                Some(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, action = %action, "Bulk action failed");
                self.notices.push(Notice::error(e.to_string()));
                None
            }
        }
    }

    fn apply_bulk(&mut self, request: &BulkRequest, report: &BulkReport) {
        let targets: &BTreeSet<RecordId> = &request.ids;

        if let Some(page) = self.page.take() {
            let mut rows = page.data;
            let mut total = page.meta.total;

            if request.action.removes_rows() {
                rows.retain(|r| !targets.contains(&r.record_id()));
                total = total.saturating_sub(report.affected);
            } else {
                let active = request.action == BulkAction::Activate;
                for row in rows.iter_mut().filter(|r| targets.contains(&r.record_id())) {
                    row.is_active = active;
                }
            }

            self.page = Some(PageResult::new(rows, total, &self.filters, USERS_PATH));
        }

        self.selection.clear();
        if request.skipped_self {
            self.notices.push(Notice::info("Your own account was skipped."));
        }
        self.notices.push(Notice::success(report.message.clone()));
    }
}
