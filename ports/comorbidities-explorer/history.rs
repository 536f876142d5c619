/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Back/forward navigation across view activations.
//!
//! Loading is split in two so the caller owns the await point:
//! `switch_view`/`go_back`/`go_forward` hand out a `PendingLoad`, and
//! `complete` applies its result. Every handed-out load carries a
//! generation; only the latest one may touch the session.

use crate::error::LoadError;
use crate::graph::LoadReport;
use crate::layout::LayoutEngine;
use crate::session::ExplorerSession;
use crate::view_state::Parameters;
use crate::views::{Dataset, ViewProvider, ViewRegistry};
use futures::future::BoxFuture;
use log::{error, info, warn};
use std::sync::Arc;

/// One visited view
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub view: String,

    /// Ids forwarded from the previous view
    pub params: Vec<String>,

    /// Live parameters when the entry was left; `None` until then
    pub parameters: Option<Parameters>,

    /// Selected node ids when the entry was left
    pub selected: Vec<String>,
}

impl HistoryEntry {
    fn new(view: &str, params: Vec<String>) -> Self {
        Self {
            view: view.to_string(),
            params,
            parameters: None,
            selected: Vec::new(),
        }
    }
}

/// A started view load
#[must_use = "a pending load does nothing until resolved and completed"]
pub struct PendingLoad {
    generation: u64,
    entry: usize,

    /// The entry was pushed by `switch_view` for this load
    pushed: bool,
    provider: Arc<dyn ViewProvider>,
    future: BoxFuture<'static, Result<Dataset, LoadError>>,
}

impl PendingLoad {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> &'static str {
        self.provider.name()
    }

    /// Wait for every collection the view needs
    pub async fn resolve(self) -> CompletedLoad {
        let result = self.future.await;
        CompletedLoad {
            generation: self.generation,
            entry: self.entry,
            pushed: self.pushed,
            provider: self.provider,
            result,
        }
    }
}

/// A finished view load, applied by `HistoryManager::complete`
pub struct CompletedLoad {
    generation: u64,
    entry: usize,
    pushed: bool,
    provider: Arc<dyn ViewProvider>,
    result: Result<Dataset, LoadError>,
}

impl CompletedLoad {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> &'static str {
        self.provider.name()
    }
}

/// What `complete` did with a load
#[derive(Debug)]
pub enum LoadOutcome {
    Applied(LoadReport),

    /// A newer load was started meanwhile
    Stale,

    /// The previous graph and its history entry stay current
    Failed(LoadError),
}

pub struct HistoryManager<L = Box<dyn LayoutEngine>> {
    registry: ViewRegistry,
    session: ExplorerSession<L>,
    entries: Vec<HistoryEntry>,
    pointer: Option<usize>,

    /// Entry whose graph the session currently shows
    displayed: Option<usize>,

    generation: u64,
}

impl<L: LayoutEngine> HistoryManager<L> {
    pub fn new(registry: ViewRegistry, session: ExplorerSession<L>) -> Self {
        Self {
            registry,
            session,
            entries: Vec::new(),
            pointer: None,
            displayed: None,
            generation: 0,
        }
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn session(&self) -> &ExplorerSession<L> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ExplorerSession<L> {
        &mut self.session
    }

    /// Open `name` after the current entry, discarding any forward entries.
    /// Unknown views leave the history untouched.
    pub fn switch_view(&mut self, name: &str, params: Vec<String>) -> Option<PendingLoad> {
        if self.registry.get(name).is_none() {
            error!("Unknown view {name}");
            return None;
        }
        self.save_current();

        let keep = self.pointer.map_or(0, |p| p + 1);
        self.entries.truncate(keep);
        if self.displayed.is_some_and(|d| d >= keep) {
            self.displayed = None;
        }
        self.entries.push(HistoryEntry::new(name, params));
        let index = self.entries.len() - 1;
        self.pointer = Some(index);
        info!("Switching to view {name} (history entry {index})");
        self.start_load(index, true)
    }

    pub fn go_back(&mut self) -> Option<PendingLoad> {
        let target = self.pointer?.checked_sub(1)?;
        self.save_current();
        self.pointer = Some(target);
        self.start_load(target, false)
    }

    pub fn go_forward(&mut self) -> Option<PendingLoad> {
        let target = self.pointer? + 1;
        if target >= self.entries.len() {
            return None;
        }
        self.save_current();
        self.pointer = Some(target);
        self.start_load(target, false)
    }

    /// Apply a finished load if it is still the latest one issued
    pub fn complete(&mut self, load: CompletedLoad) -> LoadOutcome {
        if load.generation != self.generation {
            warn!(
                "Discarding stale load of {} (generation {}, latest {})",
                load.view(),
                load.generation,
                self.generation
            );
            return LoadOutcome::Stale;
        }
        let dataset = match load.result {
            Ok(dataset) => dataset,
            Err(e) => {
                error!("Loading view {} failed: {e}", load.provider.name());
                self.abandon(load.entry, load.pushed);
                return LoadOutcome::Failed(e);
            },
        };
        let (parameters, selected) = match self.entries.get(load.entry) {
            Some(entry) => (entry.parameters.clone(), entry.selected.clone()),
            None => (None, Vec::new()),
        };
        let report = self
            .session
            .activate(load.provider.as_ref(), dataset, parameters, &selected);
        self.displayed = Some(load.entry);
        LoadOutcome::Applied(report)
    }

    /// Resolve and complete `pending`
    pub async fn navigate(&mut self, pending: PendingLoad) -> LoadOutcome {
        let load = pending.resolve().await;
        self.complete(load)
    }

    pub fn can_go_back(&self) -> bool {
        self.pointer.is_some_and(|p| p > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.pointer.is_some_and(|p| p + 1 < self.entries.len())
    }

    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.pointer?)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Latest generation handed out
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn save_current(&mut self) {
        let Some(entry) = self.displayed.and_then(|d| self.entries.get_mut(d)) else {
            return;
        };
        entry.parameters = Some(self.session.parameters().clone());
        entry.selected = self.session.selected_node_ids();
    }

    /// Point back at the displayed entry after `entry` failed to load,
    /// dropping it if it was freshly pushed
    fn abandon(&mut self, entry: usize, pushed: bool) {
        if pushed && entry + 1 == self.entries.len() && self.displayed != Some(entry) {
            self.entries.truncate(entry);
        }
        self.pointer = self.displayed;
    }

    fn start_load(&mut self, index: usize, pushed: bool) -> Option<PendingLoad> {
        let entry = self.entries.get(index)?;
        let Some(provider) = self.registry.get(&entry.view) else {
            error!("Unknown view {}", entry.view);
            return None;
        };
        self.generation += 1;
        let future = provider.load_dataset(&entry.params);
        Some(PendingLoad {
            generation: self.generation,
            entry: index,
            pushed,
            provider,
            future,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplorerConfig;
    use crate::filter::FilterDescriptor;
    use crate::layout::NullLayout;
    use crate::view_state::ParamValue;
    use crate::views::NextViewTransition;
    use crate::views::diseases::ABS_REL_RISK_PARAM;
    use crate::views::repository::tests::sample_repository;

    struct BrokenView;

    impl ViewProvider for BrokenView {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn load_dataset(&self, _params: &[String]) -> BoxFuture<'static, Result<Dataset, LoadError>> {
            Box::pin(async { Err(LoadError::MissingCollection("diseases".to_string())) })
        }

        fn initial_parameters(&self, _dataset: &Dataset) -> Parameters {
            Parameters::new()
        }

        fn filter_descriptors(&self, _dataset: &Dataset) -> Vec<FilterDescriptor> {
            Vec::new()
        }

        fn next_view_transition(&self) -> Option<NextViewTransition> {
            None
        }
    }

    fn manager() -> HistoryManager<NullLayout> {
        let mut registry = ViewRegistry::standard(sample_repository(), &ExplorerConfig::default());
        registry.register(Arc::new(BrokenView));
        HistoryManager::new(registry, ExplorerSession::new(NullLayout::new()))
    }

    async fn open(history: &mut HistoryManager<NullLayout>, name: &str, params: &[&str]) {
        let params = params.iter().map(|s| s.to_string()).collect();
        let pending = history.switch_view(name, params).unwrap();
        assert!(matches!(history.navigate(pending).await, LoadOutcome::Applied(_)));
    }

    #[tokio::test]
    async fn test_switch_view_activates() {
        let mut history = manager();
        open(&mut history, "diseases", &[]).await;
        assert_eq!(history.session().view_name(), Some("diseases"));
        assert_eq!(history.session().visible_counts(), (2, 1));
        assert_eq!(history.entries().len(), 1);
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[tokio::test]
    async fn test_unknown_view_leaves_history_intact() {
        let mut history = manager();
        open(&mut history, "diseases", &[]).await;
        assert!(history.switch_view("nowhere", Vec::new()).is_none());
        assert_eq!(history.entries().len(), 1);
        assert_eq!(history.current_entry().unwrap().view, "diseases");
    }

    #[tokio::test]
    async fn test_back_and_forward_restore_state() {
        let mut history = manager();
        open(&mut history, "diseases", &[]).await;
        history
            .session_mut()
            .set_parameter(ABS_REL_RISK_PARAM, ParamValue::Number(0.0));
        history
            .session_mut()
            .add_selection_by_ids(&["D10".to_string(), "D11".to_string()]);

        let request = history.session().next_view_request().unwrap();
        open(&mut history, request.target_view, &["10", "11"]).await;
        assert_eq!(history.session().view_name(), Some("patient_subgroups"));
        assert!(history.can_go_back());

        let pending = history.go_back().unwrap();
        assert!(matches!(history.navigate(pending).await, LoadOutcome::Applied(_)));
        assert_eq!(history.session().view_name(), Some("diseases"));
        assert_eq!(
            history.session().parameters().get(ABS_REL_RISK_PARAM),
            Some(&ParamValue::Number(0.0))
        );
        assert_eq!(history.session().selected_node_ids(), vec!["D10", "D11"]);
        assert!(history.can_go_forward());
        assert!(history.go_back().is_none());

        let pending = history.go_forward().unwrap();
        assert!(matches!(history.navigate(pending).await, LoadOutcome::Applied(_)));
        assert_eq!(history.session().view_name(), Some("patient_subgroups"));
        assert!(history.go_forward().is_none());
    }

    #[tokio::test]
    async fn test_switch_after_back_drops_forward_entries() {
        let mut history = manager();
        open(&mut history, "diseases", &[]).await;
        open(&mut history, "studies", &[]).await;
        let pending = history.go_back().unwrap();
        let _ = history.navigate(pending).await;

        open(&mut history, "patients", &["110"]).await;
        let views: Vec<&str> = history.entries().iter().map(|e| e.view.as_str()).collect();
        assert_eq!(views, vec!["diseases", "patients"]);
        assert!(!history.can_go_forward());
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let mut history = manager();
        let first = history.switch_view("diseases", Vec::new()).unwrap();
        let second = history.switch_view("studies", Vec::new()).unwrap();
        assert!(second.generation() > first.generation());

        let stale = first.resolve().await;
        assert!(matches!(history.complete(stale), LoadOutcome::Stale));
        assert_eq!(history.session().view_name(), None);

        assert!(matches!(history.navigate(second).await, LoadOutcome::Applied(_)));
        assert_eq!(history.session().view_name(), Some("studies"));
    }

    #[tokio::test]
    async fn test_stale_load_finishing_after_newer_view_is_discarded() {
        let mut history = manager();
        let first = history.switch_view("diseases", Vec::new()).unwrap();
        let second = history.switch_view("studies", Vec::new()).unwrap();

        assert!(matches!(history.navigate(second).await, LoadOutcome::Applied(_)));
        let counts = history.session().visible_counts();

        let stale = first.resolve().await;
        assert!(matches!(history.complete(stale), LoadOutcome::Stale));
        assert_eq!(history.session().view_name(), Some("studies"));
        assert_eq!(history.session().visible_counts(), counts);
        assert_eq!(history.current_entry().unwrap().view, "studies");
    }

    #[tokio::test]
    async fn test_switch_supersedes_pending_back() {
        let mut history = manager();
        open(&mut history, "diseases", &[]).await;
        open(&mut history, "studies", &[]).await;

        let back = history.go_back().unwrap();
        let next = history.switch_view("patients", vec!["110".to_string()]).unwrap();
        assert!(matches!(history.navigate(next).await, LoadOutcome::Applied(_)));
        let counts = history.session().visible_counts();

        let stale = back.resolve().await;
        assert!(matches!(history.complete(stale), LoadOutcome::Stale));
        assert_eq!(history.session().view_name(), Some("patients"));
        assert_eq!(history.session().visible_counts(), counts);
        let views: Vec<&str> = history.entries().iter().map(|e| e.view.as_str()).collect();
        assert_eq!(views, vec!["diseases", "patients"]);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_graph() {
        let mut history = manager();
        open(&mut history, "diseases", &[]).await;

        let pending = history.switch_view("broken", Vec::new()).unwrap();
        let outcome = history.navigate(pending).await;
        assert!(matches!(outcome, LoadOutcome::Failed(LoadError::MissingCollection(_))));
        assert_eq!(history.session().view_name(), Some("diseases"));
        assert_eq!(history.session().visible_counts(), (2, 1));
        assert_eq!(
            history.current_entry().map(|e| e.view.as_str()),
            history.session().view_name()
        );
        assert_eq!(history.entries().len(), 1);
        assert!(!history.can_go_back());

        open(&mut history, "studies", &[]).await;
        let views: Vec<&str> = history.entries().iter().map(|e| e.view.as_str()).collect();
        assert_eq!(views, vec!["diseases", "studies"]);

        let pending = history.go_back().unwrap();
        assert!(matches!(history.navigate(pending).await, LoadOutcome::Applied(_)));
        assert_eq!(history.session().view_name(), Some("diseases"));
    }

    #[tokio::test]
    async fn test_failed_first_load_leaves_empty_history() {
        let mut history = manager();
        let pending = history.switch_view("broken", Vec::new()).unwrap();
        assert!(matches!(history.navigate(pending).await, LoadOutcome::Failed(_)));
        assert!(history.entries().is_empty());
        assert!(history.current_entry().is_none());
        assert_eq!(history.session().view_name(), None);
    }
}
