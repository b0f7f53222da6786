//! In-memory scene graph.
//!
//! [`MemoryScene`] stores objects in a flat table keyed by [`ObjectId`],
//! with parent/child links, and counts the frames it is asked to draw. The
//! headless binary runs against it and so do the tests.

use glam::DAffine3;
use rustc_hash::FxHashMap;

use super::{ObjectId, SceneHost, Shape};
use crate::error::InspectError;
use crate::options::ViewOptions;

/// One object held by a [`MemoryScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Display name.
    pub name: String,
    /// What the object draws.
    pub shape: Shape,
    /// Containing object, if any.
    pub parent: Option<ObjectId>,
    /// Children in creation order.
    pub children: Vec<ObjectId>,
    /// Placement relative to the parent.
    pub position: DAffine3,
    /// Display flag.
    pub visible: bool,
}

/// A [`SceneHost`] that keeps everything in memory.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: FxHashMap<ObjectId, SceneNode>,
    next_id: u64,
    frames_drawn: u64,
    view: Option<ViewOptions>,
    interactive: bool,
    /// Remaining creates before [`SceneHost::create`] starts failing.
    create_budget: Option<usize>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// An empty, interactive scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            next_id: 1,
            frames_drawn: 0,
            view: None,
            interactive: true,
            create_budget: None,
        }
    }

    /// An empty scene that reports itself as non-interactive.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            interactive: false,
            ..Self::new()
        }
    }

    /// Make [`SceneHost::create`] fail after `creates` more successes.
    pub fn fail_after(&mut self, creates: usize) {
        self.create_budget = Some(creates);
    }

    // -- Queries --

    /// Object by id.
    #[must_use]
    pub fn node(&self, id: ObjectId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level objects, sorted by id.
    #[must_use]
    pub fn roots(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Objects whose name is `name`, sorted by id.
    #[must_use]
    pub fn find(&self, name: &str) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.name == name)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Children of `parent` that are visible.
    #[must_use]
    pub fn visible_children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.nodes.get(&parent).map_or_else(Vec::new, |p| {
            p.children
                .iter()
                .copied()
                .filter(|c| self.nodes.get(c).is_some_and(|n| n.visible))
                .collect()
        })
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Last camera settings applied.
    #[must_use]
    pub fn view(&self) -> Option<&ViewOptions> {
        self.view.as_ref()
    }

    // -- Mutation helpers --

    fn node_mut(
        &mut self,
        id: ObjectId,
    ) -> Result<&mut SceneNode, InspectError> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| InspectError::Scene(format!("no object {id}")))
    }

    fn remove_subtree(&mut self, id: ObjectId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        for child in node.children {
            self.remove_subtree(child);
        }
    }
}

impl SceneHost for MemoryScene {
    fn create(
        &mut self,
        name: &str,
        shape: Shape,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, InspectError> {
        if let Some(budget) = self.create_budget.as_mut() {
            if *budget == 0 {
                return Err(InspectError::Scene(format!(
                    "cannot create {name}: scene is full"
                )));
            }
            *budget -= 1;
        }
        let id = ObjectId(self.next_id);
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(id);
        }
        self.next_id += 1;
        let _ = self.nodes.insert(
            id,
            SceneNode {
                name: name.to_owned(),
                shape,
                parent,
                children: Vec::new(),
                position: DAffine3::IDENTITY,
                visible: true,
            },
        );
        log::debug!("created {name} as {id}");
        Ok(id)
    }

    fn delete(&mut self, id: ObjectId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != id);
        }
        self.remove_subtree(id);
    }

    fn is_live(&self, id: ObjectId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn set_position(
        &mut self,
        id: ObjectId,
        position: DAffine3,
    ) -> Result<(), InspectError> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    fn set_visible(
        &mut self,
        id: ObjectId,
        visible: bool,
    ) -> Result<(), InspectError> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    fn draw_new_frame(&mut self) {
        self.frames_drawn += 1;
    }

    fn prepare_view(&mut self, view: &ViewOptions) {
        log::debug!(
            "camera: orthographic={} depth_cue={}",
            view.orthographic,
            view.depth_cue
        );
        self.view = Some(view.clone());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
