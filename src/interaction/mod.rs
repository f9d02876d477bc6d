//! Editing interactions: draw, modify and translate.
//!
//! The [`InteractionController`] owns at most one active interaction. Starting
//! a new one always detaches the previous one first, so two interactions never
//! act on the same pointer event.

mod sketch;

pub use sketch::{MIN_POLYGON_VERTICES, Sketch};

use crate::format::WORKING_PROJECTION;
use crate::model::{Coordinate, Feature, FeatureCollection, Geometry, GeometryError, GeometryKind};

/// The kinds of interaction that can be attached to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Draw,
    Modify,
    Translate,
}

impl InteractionKind {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionKind::Draw => "draw",
            InteractionKind::Modify => "modify",
            InteractionKind::Translate => "translate",
        }
    }
}

/// What happens on the next pointer or shape-completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    None,
    Drawing(GeometryKind),
    Modifying,
    Translating,
}

/// Event emitted by the drawing surface when the user finishes a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCompleted {
    pub feature: Feature,
}

impl ShapeCompleted {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            feature: Feature::new(geometry),
        }
    }
}

/// Interaction detached and attached by a controller call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    pub removed: Option<InteractionKind>,
    pub installed: Option<InteractionKind>,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.removed.is_none() && self.installed.is_none()
    }
}

/// Result of feeding a draw event to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// No draw interaction was active, or the event did not match it.
    Ignored,
    /// The sketch accepted the vertex and is still in progress.
    Pending,
    /// A feature was appended to the store at `index` and the draw detached.
    Completed { index: usize, transition: Transition },
}

#[derive(Debug, Clone)]
enum ActiveInteraction {
    Draw(Sketch),
    Modify,
    /// Only features below `snapshot` were present at activation.
    Translate { snapshot: usize },
}

impl ActiveInteraction {
    fn kind(&self) -> InteractionKind {
        match self {
            ActiveInteraction::Draw(_) => InteractionKind::Draw,
            ActiveInteraction::Modify => InteractionKind::Modify,
            ActiveInteraction::Translate { .. } => InteractionKind::Translate,
        }
    }
}

/// Single-active-mode state machine for editing interactions.
#[derive(Debug, Clone)]
pub struct InteractionController {
    active: Option<ActiveInteraction>,
    hit_tolerance: f64,
}

impl InteractionController {
    pub fn new(hit_tolerance: f64) -> Self {
        Self {
            active: None,
            hit_tolerance,
        }
    }

    /// Current interaction mode, derived from the active interaction.
    pub fn mode(&self) -> InteractionMode {
        match &self.active {
            None => InteractionMode::None,
            Some(ActiveInteraction::Draw(sketch)) => InteractionMode::Drawing(sketch.kind()),
            Some(ActiveInteraction::Modify) => InteractionMode::Modifying,
            Some(ActiveInteraction::Translate { .. }) => InteractionMode::Translating,
        }
    }

    /// Kind of the active interaction, if any.
    pub fn active_kind(&self) -> Option<InteractionKind> {
        self.active.as_ref().map(ActiveInteraction::kind)
    }

    pub fn hit_tolerance(&self) -> f64 {
        self.hit_tolerance
    }

    /// Begin drawing a new shape of `kind`, discarding any active interaction.
    pub fn start_draw(&mut self, kind: GeometryKind) -> Transition {
        self.replace(Some(ActiveInteraction::Draw(Sketch::new(kind))))
    }

    /// Begin vertex editing of the store's features.
    pub fn start_modify(&mut self) -> Transition {
        self.replace(Some(ActiveInteraction::Modify))
    }

    /// Begin dragging whole features. Only features present in `store` now
    /// can be dragged until translate is restarted.
    pub fn start_translate(&mut self, store: &FeatureCollection) -> Transition {
        self.replace(Some(ActiveInteraction::Translate {
            snapshot: store.len(),
        }))
    }

    /// Deactivate whatever is active. Idempotent.
    pub fn stop(&mut self) -> Transition {
        self.replace(None)
    }

    /// Current in-progress sketch, for preview rendering.
    pub fn sketch(&self) -> Option<&Sketch> {
        match &self.active {
            Some(ActiveInteraction::Draw(sketch)) => Some(sketch),
            _ => None,
        }
    }

    /// Append a completed shape to the store and detach the draw interaction.
    ///
    /// Completion without an active draw, or with a geometry of a different
    /// kind, is ignored. Malformed geometry is rejected and the draw stays active.
    pub fn complete_shape(
        &mut self,
        store: &mut FeatureCollection,
        event: ShapeCompleted,
    ) -> Result<DrawOutcome, GeometryError> {
        let Some(ActiveInteraction::Draw(sketch)) = &self.active else {
            log::warn!("Ignoring completed shape: no draw interaction active");
            return Ok(DrawOutcome::Ignored);
        };
        // Multi- variants are never produced by a draw interaction
        let type_name = event.feature.geometry.type_name();
        if type_name != sketch.kind().name() {
            log::warn!(
                "Ignoring completed {} while drawing {}",
                type_name,
                sketch.kind().name()
            );
            return Ok(DrawOutcome::Ignored);
        }
        let mut feature = event.feature;
        feature.geometry.validate()?;
        if WORKING_PROJECTION.clamp_geometry(&mut feature.geometry) {
            log::debug!("Clamped drawn {} to the projection's valid area", type_name);
        }

        let index = store.push(feature);
        let transition = self.replace(None);
        log::debug!("Draw completed: {} stored at {}", type_name, index);
        Ok(DrawOutcome::Completed { index, transition })
    }

    /// Feed a clicked vertex to the active draw. Points complete immediately.
    pub fn add_vertex(
        &mut self,
        store: &mut FeatureCollection,
        vertex: Coordinate,
    ) -> Result<DrawOutcome, GeometryError> {
        let Some(ActiveInteraction::Draw(sketch)) = &mut self.active else {
            return Ok(DrawOutcome::Ignored);
        };
        sketch.push(vertex);
        if sketch.is_complete() {
            return self.finish_sketch(store);
        }
        Ok(DrawOutcome::Pending)
    }

    /// Finish the sketch (double-click). Too few vertices keeps drawing.
    pub fn finish_sketch(
        &mut self,
        store: &mut FeatureCollection,
    ) -> Result<DrawOutcome, GeometryError> {
        let Some(ActiveInteraction::Draw(sketch)) = &self.active else {
            return Ok(DrawOutcome::Ignored);
        };
        match sketch.to_geometry() {
            Some(geometry) => self.complete_shape(store, ShapeCompleted::new(geometry)),
            None => {
                log::debug!(
                    "Sketch has too few vertices to finish a {}",
                    sketch.kind().name()
                );
                Ok(DrawOutcome::Pending)
            }
        }
    }

    /// Whether the feature at `index` can be dragged by the active interaction.
    pub fn is_draggable(&self, index: usize) -> bool {
        match &self.active {
            Some(ActiveInteraction::Modify) => true,
            Some(ActiveInteraction::Translate { snapshot }) => index < *snapshot,
            _ => false,
        }
    }

    /// Apply a pointer drag from `from` to `to`.
    ///
    /// Modify moves the nearest vertex within the hit tolerance; translate
    /// moves the whole hit feature. Returns the position of the changed feature.
    pub fn drag(
        &mut self,
        store: &mut FeatureCollection,
        from: Coordinate,
        to: Coordinate,
    ) -> Option<usize> {
        let tolerance = self.hit_tolerance;
        match self.active.as_ref()? {
            ActiveInteraction::Modify => {
                let (index, vertex) = store.iter().enumerate().rev().find_map(|(i, f)| {
                    f.geometry.nearest_vertex(&from, tolerance).map(|v| (i, v))
                })?;
                let feature = store.get_mut(index)?;
                if !feature.geometry.move_vertex(vertex, to) {
                    return None;
                }
                WORKING_PROJECTION.clamp_geometry(&mut feature.geometry);
                Some(index)
            }
            ActiveInteraction::Translate { snapshot } => {
                let snapshot = *snapshot;
                let index = store.hit_test(&from, tolerance, |i| i < snapshot)?;
                let feature = store.get_mut(index)?;
                feature.geometry.translate(to.x - from.x, to.y - from.y);
                WORKING_PROJECTION.clamp_geometry(&mut feature.geometry);
                Some(index)
            }
            ActiveInteraction::Draw(_) => None,
        }
    }

    fn replace(&mut self, next: Option<ActiveInteraction>) -> Transition {
        let removed = self.active.take().map(|a| a.kind());
        let installed = next.as_ref().map(ActiveInteraction::kind);
        if let Some(kind) = removed {
            log::debug!("Interaction detached: {}", kind.name());
        }
        if let Some(kind) = installed {
            log::debug!("Interaction installed: {}", kind.name());
        }
        self.active = next;
        Transition { removed, installed }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_HIT_TOLERANCE)
    }
}
