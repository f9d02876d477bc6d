//! Editing session: the state object tying the editor together.
//!
//! An [`EditorSession`] owns the layer registry and the interaction
//! controller, and queues everything the map view needs to know about as
//! [`ViewCommand`]s. Nothing reaches the view until the host calls
//! [`EditorSession::flush_view`], typically once per event-loop turn.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::file::{DownloadSink, FileDownload, ImportTicket, read_import_file};
use crate::format::{GeoJsonFormat, LayerFormat};
use crate::interaction::{
    DrawOutcome, InteractionController, InteractionKind, InteractionMode, ShapeCompleted, Sketch,
    Transition,
};
use crate::model::{Coordinate, GeometryKind, LayerId};
use crate::registry::LayerRegistry;
use crate::styling::StyleManager;
use crate::view::{Dirty, ViewBridge, ViewCommand};

/// Complete state of one map editing session.
#[derive(Debug, Clone)]
pub struct EditorSession {
    // === Layers ===
    registry: LayerRegistry,

    // === Interactions ===
    /// Draw/modify/translate state machine, bound to the freehand layer.
    controller: InteractionController,

    // === View ===
    /// Commands queued since the last flush, in the order they were issued.
    pending: Vec<ViewCommand>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            registry: LayerRegistry::new(),
            controller: InteractionController::default(),
            pending: Vec::new(),
        }
    }

    /// Create a session using the settings of a loaded configuration.
    pub fn with_config(config: &EditorConfig) -> Result<Self> {
        let mut registry = LayerRegistry::with_show_all(config.show_all);
        registry.set_default_style(config.default_style.to_style()?);
        Ok(Self {
            registry,
            controller: InteractionController::new(config.hit_tolerance),
            pending: Vec::new(),
        })
    }

    pub fn mode(&self) -> InteractionMode {
        self.controller.mode()
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// In-progress draw sketch, for preview rendering.
    pub fn sketch(&self) -> Option<&Sketch> {
        self.controller.sketch()
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    /// Start drawing a shape of `kind` into the freehand layer.
    pub fn start_draw(&mut self, kind: GeometryKind) {
        let transition = self.controller.start_draw(kind);
        self.queue_transition(transition);
    }

    /// Start vertex editing of the freehand layer.
    pub fn start_modify(&mut self) {
        let transition = self.controller.start_modify();
        self.queue_transition(transition);
    }

    /// Start translating the features currently in the freehand layer.
    pub fn start_translate(&mut self) {
        let transition = self.controller.start_translate(&self.registry.freehand().features);
        self.queue_transition(transition);
    }

    pub fn stop(&mut self) {
        let transition = self.controller.stop();
        self.queue_transition(transition);
    }

    /// Handle a shape finished by the drawing surface.
    pub fn complete_shape(&mut self, event: ShapeCompleted) -> Result<DrawOutcome> {
        let outcome = self
            .controller
            .complete_shape(self.registry.freehand_features_mut(), event)?;
        self.after_draw(&outcome);
        Ok(outcome)
    }

    /// Add a clicked vertex to the active sketch.
    pub fn add_vertex(&mut self, vertex: Coordinate) -> Result<DrawOutcome> {
        let outcome = self
            .controller
            .add_vertex(self.registry.freehand_features_mut(), vertex)?;
        self.after_draw(&outcome);
        Ok(outcome)
    }

    /// Finish the active sketch, as on double-click.
    pub fn finish_sketch(&mut self) -> Result<DrawOutcome> {
        let outcome = self
            .controller
            .finish_sketch(self.registry.freehand_features_mut())?;
        self.after_draw(&outcome);
        Ok(outcome)
    }

    /// Apply a pointer drag to the active modify or translate interaction.
    /// Returns the position of the changed feature in the freehand layer.
    pub fn drag(&mut self, from: Coordinate, to: Coordinate) -> Option<usize> {
        let index = self
            .controller
            .drag(self.registry.freehand_features_mut(), from, to)?;
        self.registry.mark_dirty(LayerId::FREEHAND);
        Some(index)
    }

    /// Remove every drawn feature. Returns how many were removed.
    pub fn clear_freehand(&mut self) -> usize {
        let removed = self.registry.clear_freehand();
        // The translate snapshot refers to features that no longer exist
        if removed > 0 && self.controller.active_kind() == Some(InteractionKind::Translate) {
            self.stop();
        }
        removed
    }

    fn after_draw(&mut self, outcome: &DrawOutcome) {
        if let DrawOutcome::Completed { transition, .. } = outcome {
            self.registry.mark_dirty(LayerId::FREEHAND);
            self.queue_transition(*transition);
        }
    }

    fn queue_transition(&mut self, transition: Transition) {
        if let Some(kind) = transition.removed {
            self.pending.push(ViewCommand::RemoveInteraction(kind));
        }
        if let Some(kind) = transition.installed {
            self.pending.push(ViewCommand::InstallInteraction {
                kind,
                target: LayerId::FREEHAND,
            });
        }
    }

    // =========================================================================
    // Import / export
    // =========================================================================

    /// Parse a GeoJSON document and register it as a new layer.
    ///
    /// Parsing happens before anything is registered: on error the registry
    /// is unchanged. On success the view is asked to fit the new layer.
    pub fn import_text(&mut self, name: &str, text: &str) -> Result<LayerId> {
        self.import_document(name, None, text)
    }

    /// Check a picked file against the extension filter before reading it.
    pub fn begin_import(&self, file_name: &str) -> Result<ImportTicket> {
        Ok(ImportTicket::for_file(file_name)?)
    }

    /// Finish an import once the file contents are available.
    pub fn complete_import(&mut self, ticket: ImportTicket, text: &str) -> Result<LayerId> {
        let name = ticket.layer_name().to_string();
        self.import_document(&name, Some(ticket.file_name().to_string()), text)
    }

    /// Read and import a file from disk.
    pub fn import_file(&mut self, path: &Path) -> Result<LayerId> {
        let (ticket, text) = read_import_file(path)?;
        self.complete_import(ticket, &text)
    }

    fn import_document(
        &mut self,
        name: &str,
        file_name: Option<String>,
        text: &str,
    ) -> Result<LayerId> {
        let imported = GeoJsonFormat.import_text(text).inspect_err(|e| {
            log::warn!("Import of '{}' failed: {}", name, e);
        })?;
        for warning in &imported.warnings {
            match warning.feature {
                Some(index) => log::warn!("'{}' feature {}: {}", name, index, warning.message),
                None => log::warn!("'{}': {}", name, warning.message),
            }
        }

        let name = if name.trim().is_empty() {
            crate::constants::UNNAMED_LAYER
        } else {
            name
        };
        let extent = imported.features.extent();
        let id = self
            .registry
            .add_imported_layer(name, file_name, imported.features);
        if let Some(extent) = extent {
            self.pending.push(ViewCommand::FitExtent(extent));
        }
        Ok(id)
    }

    /// Serialize a layer (freehand included) as a GeoJSON download.
    pub fn export_layer(&self, id: LayerId) -> Result<FileDownload> {
        let layer = self.registry.get(id).ok_or(EditorError::UnknownLayer(id))?;
        let text = GeoJsonFormat.export_text(&layer.features)?;
        log::info!("Exported {} '{}'", id, layer.name);
        Ok(FileDownload::geojson(text))
    }

    /// Export a layer and hand it to `sink`.
    pub fn export_to(
        &self,
        id: LayerId,
        sink: &mut impl DownloadSink,
    ) -> Result<Option<PathBuf>> {
        let download = self.export_layer(id)?;
        Ok(sink.save(&download)?)
    }

    // =========================================================================
    // Layers
    // =========================================================================

    /// Remove an imported layer. The freehand layer and unknown ids are ignored.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        self.registry.remove_layer(id).is_some()
    }

    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> Result<()> {
        if self.registry.set_visibility(id, visible) {
            Ok(())
        } else {
            Err(EditorError::UnknownLayer(id))
        }
    }

    /// Flip the "show all layers" switch. Returns the new state.
    pub fn toggle_show_all(&mut self) -> bool {
        self.registry.toggle_show_all()
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> Result<()> {
        if self.registry.rename_layer(id, name) {
            Ok(())
        } else {
            Err(EditorError::UnknownLayer(id))
        }
    }

    /// Style setters for the session's layers.
    pub fn styles(&mut self) -> StyleManager<'_> {
        StyleManager::new(&mut self.registry)
    }

    /// Ask the view to show a layer's full extent. Returns false for unknown
    /// or empty layers.
    pub fn fit_to_layer(&mut self, id: LayerId) -> bool {
        let Some(extent) = self.registry.get(id).and_then(|l| l.extent()) else {
            return false;
        };
        self.pending.push(ViewCommand::FitExtent(extent));
        true
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Whether a flush would send anything to the view.
    pub fn needs_flush(&self) -> bool {
        self.registry.is_dirty() || !self.pending.is_empty()
    }

    /// Drain everything queued since the last flush.
    ///
    /// Layer updates come first so that fits and interactions refer to
    /// layers the view already knows about.
    pub fn take_commands(&mut self) -> Vec<ViewCommand> {
        let mut commands: Vec<ViewCommand> = self
            .registry
            .take_dirty()
            .into_iter()
            .map(ViewCommand::from)
            .collect();
        commands.append(&mut self.pending);
        commands
    }

    /// Send queued changes to the rendering engine.
    pub fn flush_view(&mut self, view: &mut impl ViewBridge) {
        for command in self.take_commands() {
            match command {
                ViewCommand::Layer(Dirty::Render(id)) => match self.registry.get(id) {
                    Some(layer) => view.render_layer(layer),
                    None => log::debug!("Skipping render of vanished {}", id),
                },
                ViewCommand::Layer(Dirty::Removed(id)) => view.remove_layer(id),
                ViewCommand::FitExtent(extent) => view.fit_extent(extent),
                ViewCommand::InstallInteraction { kind, target } => {
                    view.install_interaction(kind, target)
                }
                ViewCommand::RemoveInteraction(kind) => view.remove_interaction(kind),
            }
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}
