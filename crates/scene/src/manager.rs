//! Model-hierarchy visibility controller.
//!
//! [`ModelHierarchyManager`] owns the mirror of the currently loaded model's
//! node tree and forwards visibility changes to the rendering engine. It is
//! created when a viewer mounts and consumed by [`ModelHierarchyManager::unmount`],
//! so several viewers can coexist, each with its own engine.
//!
//! Loads are last-request-wins: starting a load cancels the one in flight, and
//! only the result of the newest request is applied. The index is replaced
//! in a single assignment once the new hierarchy has been fully validated, so
//! callers observe either the old tree or the new one.

use foundation::ids::NodeId;
use gpu::engine::{ModelHandle, RenderEngine};
use streaming::loader::{AssetLoader, LoadError, LoadedModel, load_with_deadline};
use streaming::request::LoadRequest;
use streaming::tracker::{LoadTracker, PendingLoad};
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::expansion::ExpandedPath;
use crate::hierarchy::{HierarchyError, ModelIndex, ModelTreeNode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailure {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The hierarchy replaced the current one.
    Applied { request: LoadRequest, nodes: usize },
    /// A newer request was issued (or the load was cancelled); nothing changed.
    Stale { request: LoadRequest },
}

/// Visibility and expansion of a single node.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub visible: bool,
    pub expanded: bool,
}

#[derive(Debug)]
struct Loaded {
    model: ModelHandle,
    url: String,
    index: ModelIndex,
}

#[derive(Debug)]
pub struct ModelHierarchyManager<E: RenderEngine> {
    engine: E,
    config: ViewerConfig,
    current: Option<Loaded>,
    expanded: ExpandedPath,
    loads: LoadTracker,
}

impl<E: RenderEngine> ModelHierarchyManager<E> {
    pub fn mount(engine: E, config: ViewerConfig) -> Self {
        Self {
            engine,
            config,
            current: None,
            expanded: ExpandedPath::new(),
            loads: LoadTracker::new(),
        }
    }

    /// Tear the viewer down and hand the engine back.
    pub fn unmount(mut self) -> E {
        self.loads.cancel();
        self.unload();
        self.engine
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Issue a new load request, cancelling any load still in flight.
    pub fn begin_load(&mut self, url: impl Into<String>) -> PendingLoad {
        self.loads.begin(url)
    }

    pub fn load_in_flight(&self) -> Option<LoadRequest> {
        self.loads.in_flight()
    }

    pub fn cancel_load(&mut self) -> Option<LoadRequest> {
        let request = self.loads.cancel()?;
        debug!(%request, "model load cancelled");
        Some(request)
    }

    /// Apply the result of `request`.
    ///
    /// Results for superseded or cancelled requests are discarded. A failed
    /// load or a malformed hierarchy leaves the current index untouched.
    pub fn finish_load(
        &mut self,
        request: LoadRequest,
        result: Result<LoadedModel, LoadError>,
    ) -> Result<LoadOutcome, LoadFailure> {
        if !self.loads.complete(request) {
            debug!(%request, "discarding stale model load result");
            return Ok(LoadOutcome::Stale { request });
        }

        let loaded = result.inspect_err(|e| warn!(%request, "model load failed: {e}"))?;
        let index = ModelIndex::build(&loaded.hierarchy).inspect_err(|e| {
            warn!(%request, url = %loaded.url, "rejecting model hierarchy: {e}")
        })?;

        let nodes = index.len();
        self.replace(loaded.model, loaded.url, index);
        Ok(LoadOutcome::Applied { request, nodes })
    }

    /// Load `url` through `loader` and apply the result.
    pub async fn load<L: AssetLoader + ?Sized>(
        &mut self,
        loader: &L,
        url: &str,
    ) -> Result<LoadOutcome, LoadFailure> {
        let pending = self.begin_load(url);
        let result = load_with_deadline(
            loader,
            &pending.url,
            pending.cancel.clone(),
            self.config.load_timeout(),
        )
        .await;
        self.finish_load(pending.request, result)
    }

    /// Remove the current model from the engine and forget its hierarchy.
    pub fn unload(&mut self) -> bool {
        let Some(old) = self.current.take() else {
            return false;
        };
        self.expanded.clear();
        for id in old.index.preorder().iter().rev() {
            self.engine.remove_node(id);
        }
        self.engine.detach_model(old.model);
        debug!(url = %old.url, "model unloaded");
        true
    }

    fn replace(&mut self, model: ModelHandle, url: String, index: ModelIndex) {
        self.unload();
        self.engine.attach_model(model);
        for node in index.nodes() {
            self.engine.set_node_visible(&node.id, node.visible);
        }
        info!(%url, nodes = index.len(), "model hierarchy loaded");
        self.current = Some(Loaded { model, url, index });
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn model_url(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.url.as_str())
    }

    pub fn index(&self) -> Option<&ModelIndex> {
        self.current.as_ref().map(|c| &c.index)
    }

    pub fn len(&self) -> usize {
        self.index().map_or(0, ModelIndex::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, id: &str) -> Option<&ModelTreeNode> {
        self.index()?.get(id)
    }

    pub fn state(&self, id: &str) -> Option<NodeState> {
        let node = self.node(id)?;
        Some(NodeState {
            visible: node.visible,
            expanded: self.expanded.is_expanded(id),
        })
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.node(id).map(|n| n.visible)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.is_expanded(id)
    }

    pub fn expanded(&self) -> Option<&NodeId> {
        self.expanded.current()
    }

    pub fn parent_of(&self, id: &str) -> Option<&NodeId> {
        self.index()?.parent_of(id)
    }

    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        self.index().map(|i| i.ancestors(id)).unwrap_or_default()
    }

    pub fn children_of(&self, id: &str) -> &[NodeId] {
        match self.index() {
            Some(index) => index.children_of(id),
            None => &[],
        }
    }

    /// Show one node. Descendants keep their own state.
    pub fn show(&mut self, id: &str) -> bool {
        self.apply_visibility([NodeId::from(id)], true) > 0
    }

    /// Hide one node. Descendants keep their own state.
    pub fn hide(&mut self, id: &str) -> bool {
        self.apply_visibility([NodeId::from(id)], false) > 0
    }

    pub fn show_all(&mut self) -> usize {
        let ids = self.index().map(|i| i.preorder().to_vec()).unwrap_or_default();
        self.apply_visibility(ids, true)
    }

    pub fn hide_all(&mut self) -> usize {
        let ids = self.index().map(|i| i.preorder().to_vec()).unwrap_or_default();
        self.apply_visibility(ids, false)
    }

    /// Show `id` and every descendant.
    pub fn show_subtree(&mut self, id: &str) -> usize {
        let ids = self.index().map(|i| i.subtree(id)).unwrap_or_default();
        self.apply_visibility(ids, true)
    }

    /// Hide `id` and every descendant.
    pub fn hide_subtree(&mut self, id: &str) -> usize {
        let ids = self.index().map(|i| i.subtree(id)).unwrap_or_default();
        self.apply_visibility(ids, false)
    }

    fn apply_visibility<I>(&mut self, ids: I, visible: bool) -> usize
    where
        I: IntoIterator<Item = NodeId>,
    {
        let Some(current) = self.current.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        for id in ids {
            let Some(node) = current.index.get_mut(id.as_str()) else {
                debug!(%id, "visibility change for unknown node ignored");
                continue;
            };
            node.visible = visible;
            self.engine.set_node_visible(&id, visible);
            applied += 1;
        }
        applied
    }

    /// Make `id` the expanded node, collapsing whichever node was expanded.
    ///
    /// With `cascade_expand_visibility`, the direct children of `id` are shown
    /// and the direct children of the implicitly collapsed node are hidden,
    /// except for the new node and its ancestors.
    pub fn expand(&mut self, id: &str) -> bool {
        let Some(index) = self.index() else {
            return false;
        };
        if !index.contains(id) || self.expanded.is_expanded(id) {
            return false;
        }

        let mut keep = index.ancestors(id);
        keep.push(NodeId::from(id));
        let to_show = index.children_of(id).to_vec();

        let previous = self.expanded.expand(NodeId::from(id));
        if !self.config.cascade_expand_visibility {
            return true;
        }
        if let Some(previous) = previous {
            let to_hide: Vec<NodeId> = self
                .children_of(previous.as_str())
                .iter()
                .filter(|c| !keep.contains(c))
                .cloned()
                .collect();
            self.apply_visibility(to_hide, false);
        }
        self.apply_visibility(to_show, true);
        true
    }

    /// Collapse `id` if it is the expanded node.
    pub fn collapse(&mut self, id: &str) -> bool {
        if !self.expanded.collapse(id) {
            return false;
        }
        if self.config.cascade_expand_visibility {
            let to_hide = self.children_of(id).to_vec();
            self.apply_visibility(to_hide, false);
        }
        true
    }

    /// Sidebar click: expand a collapsed node, collapse the expanded one.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.is_expanded(id) {
            self.collapse(id)
        } else {
            self.expand(id)
        }
    }
}
