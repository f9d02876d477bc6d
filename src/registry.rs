//! Ordered registry of vector layers.
//!
//! The registry owns the freehand drawing layer (always present, never
//! removable) and any number of imported layers in insertion order. Every
//! mutation records a [`Dirty`] entry that the session later turns into
//! render requests.

use std::collections::HashMap;

use crate::model::{FeatureCollection, Layer, LayerId, Style};
use crate::view::Dirty;

/// Ordered collection of layers with shared visibility state.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    freehand: Layer,
    layers: Vec<Layer>,
    next_id: u32,
    /// Registry-wide "show all" flag. Newly imported layers inherit it.
    show_all: bool,
    /// Style given to newly imported layers.
    default_style: Style,
    /// Visibility of imported layers just before the last "show all" toggle.
    /// Cleared when a layer's visibility is set individually.
    remembered: Option<HashMap<LayerId, bool>>,
    /// Layers changed since the last [`take_dirty`](Self::take_dirty).
    dirty: Vec<Dirty>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::with_show_all(true)
    }

    /// Create a registry with the given initial "show all" state.
    pub fn with_show_all(show_all: bool) -> Self {
        Self {
            freehand: Layer::freehand(),
            layers: Vec::new(),
            next_id: LayerId::FREEHAND.0 + 1,
            show_all,
            default_style: Style::default(),
            remembered: None,
            // Start dirty so the first flush draws the freehand layer
            dirty: vec![Dirty::Render(LayerId::FREEHAND)],
        }
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn default_style(&self) -> Style {
        self.default_style
    }

    /// Change the style given to layers imported from now on.
    pub fn set_default_style(&mut self, style: Style) {
        self.default_style = style;
    }

    /// Register a new imported layer and return its handle.
    pub fn add_imported_layer(
        &mut self,
        name: impl Into<String>,
        file_name: Option<String>,
        features: FeatureCollection,
    ) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;

        let layer = Layer::imported(
            id,
            name,
            file_name,
            features,
            self.show_all,
            self.default_style,
        );
        log::info!(
            "Added layer {} '{}' with {} features",
            id,
            layer.name,
            layer.features.len()
        );
        self.layers.push(layer);
        self.mark_dirty(id);
        id
    }

    /// Remove an imported layer. Unknown ids and the freehand layer are left alone.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        if id.is_freehand() {
            log::warn!("Refusing to remove the freehand layer");
            return None;
        }
        let position = self.layers.iter().position(|l| l.id() == id)?;
        let layer = self.layers.remove(position);
        if let Some(remembered) = &mut self.remembered {
            remembered.remove(&id);
        }
        self.dirty.retain(|d| d.layer() != id);
        self.dirty.push(Dirty::Removed(id));
        log::info!("Removed layer {} '{}'", id, layer.name);
        Some(layer)
    }

    /// Show or hide a single layer. Returns false for unknown layers.
    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> bool {
        let Some(layer) = self.get_mut(id) else {
            return false;
        };
        layer.visible = visible;
        // An explicit choice means the next toggle applies the flag instead
        if !id.is_freehand() {
            self.remembered = None;
        }
        self.mark_dirty(id);
        true
    }

    /// Flip the registry-wide "show all" flag.
    ///
    /// Every toggle records the visibility of the imported layers. If no layer
    /// was shown or hidden individually since the previous toggle, the values
    /// recorded by that toggle are restored, so two toggles in a row leave
    /// every layer as it was. Otherwise every imported layer takes the new
    /// flag. Layers imported after the recording also take the new flag.
    /// The freehand layer is never touched. Returns the new flag.
    pub fn toggle_show_all(&mut self) -> bool {
        self.show_all = !self.show_all;
        let before: HashMap<LayerId, bool> =
            self.layers.iter().map(|l| (l.id(), l.visible)).collect();
        let restore = self.remembered.take();
        for layer in &mut self.layers {
            layer.visible = restore
                .as_ref()
                .and_then(|r| r.get(&layer.id()).copied())
                .unwrap_or(self.show_all);
        }
        self.remembered = Some(before);
        let ids: Vec<LayerId> = self.layers.iter().map(Layer::id).collect();
        for id in ids {
            self.mark_dirty(id);
        }
        log::debug!("Show all layers: {}", self.show_all);
        self.show_all
    }

    /// Layers with their display index, in insertion order.
    ///
    /// The freehand layer comes first when `include_freehand` is set. The
    /// returned iterator is lazy and can be cloned to restart it.
    pub fn layers(
        &self,
        include_freehand: bool,
    ) -> impl Iterator<Item = (&Layer, usize)> + Clone + '_ {
        std::iter::once(&self.freehand)
            .filter(move |_| include_freehand)
            .chain(self.layers.iter())
            .enumerate()
            .map(|(index, layer)| (layer, index))
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        if id.is_freehand() {
            Some(&self.freehand)
        } else {
            self.layers.iter().find(|l| l.id() == id)
        }
    }

    /// Mutable access without marking the layer dirty. Prefer [`update`](Self::update).
    pub(crate) fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        if id.is_freehand() {
            Some(&mut self.freehand)
        } else {
            self.layers.iter_mut().find(|l| l.id() == id)
        }
    }

    /// Mutate a layer in place and mark it dirty.
    pub fn update<R>(&mut self, id: LayerId, f: impl FnOnce(&mut Layer) -> R) -> Option<R> {
        let result = f(self.get_mut(id)?);
        self.mark_dirty(id);
        Some(result)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn freehand(&self) -> &Layer {
        &self.freehand
    }

    pub(crate) fn freehand_features_mut(&mut self) -> &mut FeatureCollection {
        &mut self.freehand.features
    }

    /// Display index of an imported layer (freehand excluded).
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.update(id, |layer| layer.name = name).is_some()
    }

    /// Remove every feature from the freehand layer. Returns how many were removed.
    pub fn clear_freehand(&mut self) -> usize {
        let count = self.freehand.features.len();
        if count > 0 {
            self.freehand.features.clear();
            self.mark_dirty(LayerId::FREEHAND);
            log::info!("Cleared {} drawn features", count);
        }
        count
    }

    /// Number of imported layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Record that a layer needs re-rendering.
    pub fn mark_dirty(&mut self, id: LayerId) {
        let entry = Dirty::Render(id);
        if !self.dirty.contains(&entry) {
            self.dirty.push(entry);
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Drain the changes recorded since the last call.
    pub fn take_dirty(&mut self) -> Vec<Dirty> {
        std::mem::take(&mut self.dirty)
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
