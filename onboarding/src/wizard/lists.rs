// Mailing-list table
//
// Lists are fetched once the API key is accepted. Each analyzable row gets exactly one click
// handler, recorded in a registry (row index -> handler) so the whole table can be detached
// and reattached with the same handler ids.

use log::{error, info, warn};
use std::collections::BTreeMap;

use crate::api::endpoints;
use crate::api::transport::{HttpRequest, Transport};
use crate::error::{WizardError, WizardResult};
use crate::form::{HandlerId, ListenerSet};
use crate::models::responses::{parse_lists, ListSummary};
use crate::models::state::ListSelection;

pub struct ListDataService;

impl ListDataService {
    pub async fn fetch_lists(transport: &dyn Transport) -> WizardResult<Vec<ListSummary>> {
        let resp = match transport.send(HttpRequest::get(endpoints::GET_LISTS)).await {
            Ok(r) => r,
            Err(e) => {
                error!("[PHASE: lists] [STEP: fetch] Failed to fetch lists: {}", e);
                return Err(e.into());
            }
        };
        if !resp.is_success() {
            error!(
                "[PHASE: lists] [STEP: fetch] Failed to fetch lists: HTTP {}",
                resp.status
            );
            return Err(WizardError::UnexpectedStatus {
                status: resp.status,
                path: endpoints::GET_LISTS.to_string(),
            });
        }
        let lists = parse_lists(&resp.body).map_err(|e| {
            error!("[PHASE: lists] [STEP: fetch] Unreadable lists payload: {}", e);
            WizardError::decode(endpoints::GET_LISTS, e)
        })?;
        info!("[PHASE: lists] [STEP: fetch] Fetched {} list(s)", lists.len());
        Ok(lists)
    }
}

#[derive(Debug, Clone)]
pub struct ListRow {
    pub summary: ListSummary,
    /// None for empty lists: they are shown but cannot be analyzed.
    pub selection: Option<ListSelection>,
    pub listeners: ListenerSet,
}

/// Row index -> click handler, populated at render time.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<usize, HandlerId>,
}

impl HandlerRegistry {
    pub fn get(&self, row: usize) -> Option<HandlerId> {
        self.handlers.get(&row).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, HandlerId)> + '_ {
        self.handlers.iter().map(|(row, h)| (*row, *h))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListsTable {
    rows: Vec<ListRow>,
    registry: HandlerRegistry,
    enabled: bool,
}

impl ListsTable {
    /// Builds the rows and registers one click handler per analyzable row.
    pub fn render(lists: Vec<ListSummary>) -> Self {
        let mut registry = HandlerRegistry::default();
        let rows = lists
            .into_iter()
            .enumerate()
            .map(|(idx, summary)| {
                let mut listeners = ListenerSet::default();
                let selection = (summary.stats.member_count > 0)
                    .then(|| ListSelection::from_summary(&summary));
                if selection.is_some() {
                    let handler = HandlerId::fresh();
                    listeners.attach(handler);
                    registry.handlers.insert(idx, handler);
                }
                ListRow {
                    summary,
                    selection,
                    listeners,
                }
            })
            .collect();
        Self {
            rows,
            registry,
            enabled: true,
        }
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn active_listener_count(&self) -> usize {
        self.rows.iter().map(|r| r.listeners.count()).sum()
    }

    /// A click on a row. Yields the row's selection only while the table is live and the
    /// row's handler is attached.
    pub fn click(&self, row: usize) -> Option<ListSelection> {
        if !self.enabled {
            return None;
        }
        let handler = self.registry.get(row)?;
        let row = self.rows.get(row)?;
        if !row.listeners.is_attached(handler) {
            return None;
        }
        row.selection.clone()
    }

    /// Detach every registered row handler and disable the table.
    pub fn make_inert(&mut self) {
        for (idx, handler) in self.registry.iter() {
            if let Some(row) = self.rows.get_mut(idx) {
                row.listeners.detach(handler);
            }
        }
        self.enabled = false;
    }

    /// Re-enable the table and reattach every registered handler. Never fails part-way;
    /// reports a mismatch afterwards.
    pub fn restore(&mut self) -> WizardResult<()> {
        self.enabled = true;
        for (idx, handler) in self.registry.iter() {
            match self.rows.get_mut(idx) {
                Some(row) => {
                    row.listeners.attach(handler);
                }
                None => warn!(
                    "[PHASE: analysis] [STEP: rollback] Registered row {} no longer exists",
                    idx
                ),
            }
        }
        let attached = self
            .registry
            .iter()
            .filter(|(idx, h)| {
                self.rows
                    .get(*idx)
                    .is_some_and(|r| r.listeners.is_attached(*h))
            })
            .count();
        if attached != self.registry.len() {
            return Err(WizardError::Rollback {
                attached,
                expected: self.registry.len(),
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn truncate_rows(&mut self, len: usize) {
        self.rows.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::ScriptedTransport;
    use crate::models::responses::ListStats;

    fn summary(id: &str, members: u64) -> ListSummary {
        ListSummary {
            id: id.to_string(),
            name: format!("List {}", id),
            stats: ListStats {
                member_count: members,
                unsubscribe_count: 2,
                cleaned_count: 1,
                open_rate: 21.5,
            },
        }
    }

    #[tokio::test]
    async fn fetch_lists_decodes_envelope() {
        let t = ScriptedTransport::new();
        t.respond(
            endpoints::GET_LISTS,
            200,
            r#"{"lists":[{"id":"a","name":"A","stats":{"member_count":5}}]}"#,
        )
        .await;
        let lists = ListDataService::fetch_lists(&t).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].stats.member_count, 5);
    }

    #[tokio::test]
    async fn fetch_lists_failure_is_reported_not_retried() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::GET_LISTS, 502, "").await;
        let err = ListDataService::fetch_lists(&t).await.unwrap_err();
        assert!(matches!(err, WizardError::UnexpectedStatus { status: 502, .. }));
        assert_eq!(t.calls_to(endpoints::GET_LISTS).await, 1);
    }

    #[test]
    fn render_registers_one_handler_per_analyzable_row() {
        let table = ListsTable::render(vec![summary("a", 10), summary("b", 0), summary("c", 3)]);
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.registry().len(), 2);
        assert_eq!(table.active_listener_count(), 2);
        assert!(table.rows()[1].selection.is_none());
        assert!(table.registry().get(1).is_none());
    }

    #[test]
    fn click_yields_selection_only_while_live() {
        let mut table = ListsTable::render(vec![summary("a", 10)]);
        let sel = table.click(0).unwrap();
        assert_eq!(sel.list_id, "a");
        assert_eq!(sel.total_member_count, 13);

        table.make_inert();
        assert!(table.click(0).is_none());
        assert!(!table.is_enabled());
        assert_eq!(table.active_listener_count(), 0);
    }

    #[test]
    fn restore_reattaches_every_registered_handler() {
        let mut table = ListsTable::render(vec![summary("a", 1), summary("b", 2), summary("c", 3)]);
        let before: Vec<_> = table.registry().iter().collect();
        table.make_inert();
        table.make_inert();
        table.restore().unwrap();
        assert_eq!(table.active_listener_count(), 3);
        for (idx, h) in before {
            assert!(table.rows()[idx].listeners.is_attached(h));
        }
    }
}
