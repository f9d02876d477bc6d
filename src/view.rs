//! Boundary to the rendering engine.
//!
//! The editor never draws anything itself. State changes are recorded as
//! [`ViewCommand`]s and handed to a [`ViewBridge`] implementation when the
//! host flushes the session.

use crate::interaction::InteractionKind;
use crate::model::{Extent, Layer, LayerId};

/// A layer whose rendered state is out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dirty {
    /// Re-render with the layer's current features, visibility and style.
    Render(LayerId),
    /// The layer was deleted and must be dropped from the view.
    Removed(LayerId),
}

impl Dirty {
    pub fn layer(&self) -> LayerId {
        match self {
            Dirty::Render(id) | Dirty::Removed(id) => *id,
        }
    }
}

/// A pending request for the rendering engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    Layer(Dirty),
    FitExtent(Extent),
    InstallInteraction {
        kind: InteractionKind,
        target: LayerId,
    },
    RemoveInteraction(InteractionKind),
}

impl From<Dirty> for ViewCommand {
    fn from(dirty: Dirty) -> Self {
        ViewCommand::Layer(dirty)
    }
}

/// Services the editor needs from the map rendering engine.
pub trait ViewBridge {
    /// Draw (or redraw) a layer with its current visibility and style.
    fn render_layer(&mut self, layer: &Layer);

    /// Drop a deleted layer from the map.
    fn remove_layer(&mut self, id: LayerId);

    /// Move the viewport so that `extent` is visible.
    fn fit_extent(&mut self, extent: Extent);

    /// Attach an interaction bound to the features of `target`.
    fn install_interaction(&mut self, kind: InteractionKind, target: LayerId);

    /// Detach a previously installed interaction.
    fn remove_interaction(&mut self, kind: InteractionKind);
}
