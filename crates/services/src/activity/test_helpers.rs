//! In-memory activity log fake mirroring the Postgres adapter's
//! filtering, ordering and total-count semantics.

use anyhow::bail;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use super::ports::{ActivityLogEntry, ActivityLogQuery, ActivityLogRepository};

#[derive(Default)]
struct State {
    entries: Vec<ActivityLogEntry>,
    fail: bool,
}

#[derive(Default)]
pub struct InMemoryActivityLogRepository {
    state: Mutex<State>,
}

impl InMemoryActivityLogRepository {
    pub fn add_entry(&self, entry: ActivityLogEntry) {
        self.lock().entries.push(entry);
    }

    /// Make every repository call fail, as if the store were offline.
    pub fn set_failing(&self, fail: bool) {
        self.lock().fail = fail;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("lock activity state")
    }
}

fn matches(entry: &ActivityLogEntry, query: &ActivityLogQuery) -> bool {
    if let Some(term) = &query.search {
        let term = term.to_lowercase();
        let in_action = entry.action.to_lowercase().contains(&term);
        let in_detail = entry
            .detail
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(&term));
        if !in_action && !in_detail {
            return false;
        }
    }
    if let Some(user_id) = query.user_id {
        if entry.user_id != Some(user_id) {
            return false;
        }
    }
    if let Some(action) = &query.action {
        if &entry.action != action {
            return false;
        }
    }
    if let Some(date) = query.date {
        if entry.created_at.date_naive() != date {
            return false;
        }
    }
    true
}

#[async_trait]
impl ActivityLogRepository for InMemoryActivityLogRepository {
    async fn query_activity(
        &self,
        query: &ActivityLogQuery,
    ) -> anyhow::Result<(Vec<ActivityLogEntry>, i64)> {
        let state = self.lock();
        if state.fail {
            bail!("activity store offline");
        }

        let mut matching: Vec<ActivityLogEntry> = state
            .entries
            .iter()
            .filter(|e| matches(e, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_actions(&self) -> anyhow::Result<Vec<String>> {
        let state = self.lock();
        if state.fail {
            bail!("activity store offline");
        }

        let actions: BTreeSet<String> =
            state.entries.iter().map(|e| e.action.clone()).collect();
        Ok(actions.into_iter().collect())
    }
}
