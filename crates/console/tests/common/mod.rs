//! In-memory [`ListBackend`] for screen tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use warden_core::bulk::{BulkAction, BulkRequest};
use warden_core::list_query::memory::{FieldValue, MemorySource, Record};
use warden_core::list_query::{FilterState, PageResult};
use warden_core::users::USERS_TABLE;

use warden_console::client::{BulkReport, ListBackend, UserRow, USERS_PATH};
use warden_console::error::ConsoleError;

pub struct FakeBackend {
    pub users: Mutex<Vec<UserRow>>,
    pub fetches: Mutex<Vec<FilterState>>,
    pub bulk_calls: Mutex<Vec<BulkRequest>>,
    /// Make every bulk call fail with this status.
    pub fail_bulk: Option<u16>,
    /// Make every fetch fail with this status.
    pub fail_fetch: Mutex<Option<u16>>,
    /// Delay before a fetch for the given search text answers.
    pub slow_search: Option<(String, Duration)>,
}

pub fn user(id: i64, name: &str) -> UserRow {
    UserRow {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        is_active: true,
        email_verified_at: None,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(id),
        roles: Vec::new(),
    }
}

impl FakeBackend {
    /// `count` users with ids 1..=count named `User 01`, `User 02`, ...
    pub fn with_users(count: i64) -> Self {
        let users = (1..=count).map(|i| user(i, &format!("User {i:02}"))).collect();
        Self {
            users: Mutex::new(users),
            fetches: Mutex::new(Vec::new()),
            bulk_calls: Mutex::new(Vec::new()),
            fail_bulk: None,
            fail_fetch: Mutex::new(None),
            slow_search: None,
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn bulk_count(&self) -> usize {
        self.bulk_calls.lock().unwrap().len()
    }

    fn records(&self) -> Vec<Record> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .map(|u| {
                Record::new(u.id)
                    .with("name", FieldValue::Text(u.name.clone()))
                    .with("email", FieldValue::Text(u.email.clone()))
                    .with("is_active", FieldValue::Boolean(u.is_active))
                    .with("created_at", FieldValue::Timestamp(u.created_at))
            })
            .collect()
    }
}

fn status_error(status: u16) -> ConsoleError {
    ConsoleError::Status {
        status,
        code: "INTERNAL_ERROR".to_string(),
        message: "An internal error occurred".to_string(),
        field: None,
    }
}

#[async_trait]
impl ListBackend for FakeBackend {
    async fn fetch_page(&self, state: &FilterState) -> Result<PageResult<UserRow>, ConsoleError> {
        self.fetches.lock().unwrap().push(state.clone());

        if let Some((search, delay)) = &self.slow_search {
            if &state.search == search {
                tokio::time::sleep(*delay).await;
            }
        }
        if let Some(status) = *self.fail_fetch.lock().unwrap() {
            return Err(status_error(status));
        }

        let records = self.records();
        let page = MemorySource::new(&USERS_TABLE, &records)
            .page(state, USERS_PATH)
            .map_err(|e| ConsoleError::Config(e.to_string()))?;

        let users = self.users.lock().unwrap().clone();
        Ok(page.map(|record| {
            let id = record.id.as_db_id().unwrap();
            users.iter().find(|u| u.id == id).cloned().unwrap()
        }))
    }

    async fn bulk(&self, request: &BulkRequest) -> Result<BulkReport, ConsoleError> {
        self.bulk_calls.lock().unwrap().push(request.clone());
        if let Some(status) = self.fail_bulk {
            return Err(status_error(status));
        }

        let ids: Vec<i64> = request.ids.iter().filter_map(|id| id.as_db_id()).collect();
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        let affected = match request.action {
            BulkAction::Delete => {
                users.retain(|u| !ids.contains(&u.id));
                (before - users.len()) as u64
            }
            action => {
                let active = action == BulkAction::Activate;
                let mut changed = 0;
                for u in users.iter_mut().filter(|u| ids.contains(&u.id) && u.is_active != active) {
                    u.is_active = active;
                    changed += 1;
                }
                changed
            }
        };

        Ok(BulkReport {
            action: request.action,
            affected,
            skipped_self: request.skipped_self,
            message: request.action.success_message().to_string(),
        })
    }
}
