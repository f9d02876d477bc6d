use std::collections::HashMap;

use serde_json::{Value, json};

use super::*;
use crate::file::DirectorySink;
use crate::format::FormatError;
use crate::model::{Extent, Feature, Geometry, Layer, Style};
use crate::styling::StyleError;

/// View that records what the editor asked it to do.
#[derive(Debug, Default)]
struct RecordingView {
    installed: Vec<(InteractionKind, LayerId)>,
    rendered: HashMap<LayerId, Layer>,
    render_count: usize,
    removed: Vec<LayerId>,
    fits: Vec<Extent>,
}

impl ViewBridge for RecordingView {
    fn render_layer(&mut self, layer: &Layer) {
        self.render_count += 1;
        self.rendered.insert(layer.id(), layer.clone());
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.rendered.remove(&id);
        self.removed.push(id);
    }

    fn fit_extent(&mut self, extent: Extent) {
        self.fits.push(extent);
    }

    fn install_interaction(&mut self, kind: InteractionKind, target: LayerId) {
        self.installed.push((kind, target));
    }

    fn remove_interaction(&mut self, kind: InteractionKind) {
        self.installed.retain(|(k, _)| *k != kind);
    }
}

fn flushed(session: &mut EditorSession, view: &mut RecordingView) {
    session.flush_view(view);
    assert!(!session.needs_flush());
}

fn square(offset: f64) -> Geometry {
    Geometry::Polygon(vec![vec![
        Coordinate::new(offset, offset),
        Coordinate::new(offset + 10.0, offset),
        Coordinate::new(offset + 10.0, offset + 10.0),
        Coordinate::new(offset, offset + 10.0),
        Coordinate::new(offset, offset),
    ]])
}

const TWO_POINTS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}, "properties": {"n": 1}},
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [10.0, 10.0]}, "properties": {"n": 2}}
    ]
}"#;

#[derive(Debug, Clone, Copy)]
enum Op {
    Draw(GeometryKind),
    Modify,
    Translate,
    Stop,
}

fn apply(session: &mut EditorSession, op: Op) {
    match op {
        Op::Draw(kind) => session.start_draw(kind),
        Op::Modify => session.start_modify(),
        Op::Translate => session.start_translate(),
        Op::Stop => session.stop(),
    }
}

fn expected_kind(mode: InteractionMode) -> Option<InteractionKind> {
    match mode {
        InteractionMode::None => None,
        InteractionMode::Drawing(_) => Some(InteractionKind::Draw),
        InteractionMode::Modifying => Some(InteractionKind::Modify),
        InteractionMode::Translating => Some(InteractionKind::Translate),
    }
}

#[test]
fn test_at_most_one_interaction_for_every_short_sequence() {
    let ops: Vec<Op> = GeometryKind::all()
        .iter()
        .map(|&kind| Op::Draw(kind))
        .chain([Op::Modify, Op::Translate, Op::Stop])
        .collect();
    let length = 4;
    let total = ops.len().pow(length);

    for mut code in 0..total {
        let mut session = EditorSession::new();
        let mut view = RecordingView::default();
        let mut sequence = Vec::new();
        for _ in 0..length {
            let op = ops[code % ops.len()];
            code /= ops.len();
            sequence.push(op);

            apply(&mut session, op);
            flushed(&mut session, &mut view);

            assert!(view.installed.len() <= 1, "after {:?}: {:?}", sequence, view.installed);
            assert_eq!(
                view.installed.first().map(|(k, _)| *k),
                expected_kind(session.mode()),
                "after {:?}",
                sequence
            );
            assert!(view.installed.iter().all(|(_, t)| t.is_freehand()));
        }
    }
}

#[test]
fn test_switching_draw_kind_keeps_one_draw() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();

    session.start_draw(GeometryKind::Point);
    session.start_draw(GeometryKind::LineString);
    flushed(&mut session, &mut view);

    assert_eq!(view.installed, vec![(InteractionKind::Draw, LayerId::FREEHAND)]);
    assert_eq!(session.mode(), InteractionMode::Drawing(GeometryKind::LineString));
}

#[test]
fn test_drawn_polygon_exports_with_properties() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();

    session.start_draw(GeometryKind::Polygon);
    let event = ShapeCompleted {
        feature: Feature::new(square(0.0)).with_property("name", "A"),
    };
    let outcome = session.complete_shape(event).unwrap();
    assert!(matches!(outcome, DrawOutcome::Completed { index: 0, .. }));
    assert_eq!(session.mode(), InteractionMode::None);

    flushed(&mut session, &mut view);
    assert!(view.installed.is_empty());
    assert_eq!(view.rendered[&LayerId::FREEHAND].features.len(), 1);

    let download = session.export_layer(LayerId::FREEHAND).unwrap();
    let document: Value = serde_json::from_str(&download.contents).unwrap();
    let features = document["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["geometry"]["type"], "Polygon");
    assert_eq!(features[0]["properties"], json!({"name": "A"}));
}

#[test]
fn test_completion_of_other_kind_is_ignored() {
    let mut session = EditorSession::new();
    session.start_draw(GeometryKind::Polygon);

    let outcome = session
        .complete_shape(ShapeCompleted::new(Geometry::Point(Coordinate::new(1.0, 1.0))))
        .unwrap();
    assert_eq!(outcome, DrawOutcome::Ignored);
    assert!(session.registry().freehand().features.is_empty());
    assert_eq!(session.mode(), InteractionMode::Drawing(GeometryKind::Polygon));
}

#[test]
fn test_invalid_drawn_shape_is_rejected() {
    let mut session = EditorSession::new();
    session.start_draw(GeometryKind::LineString);

    let result = session.complete_shape(ShapeCompleted::new(Geometry::LineString(vec![
        Coordinate::new(0.0, 0.0),
    ])));
    assert!(matches!(result, Err(EditorError::Geometry(_))));
    assert!(session.registry().freehand().features.is_empty());
}

#[test]
fn test_click_drawing_through_session() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();

    session.start_draw(GeometryKind::LineString);
    assert_eq!(
        session.add_vertex(Coordinate::new(0.0, 0.0)).unwrap(),
        DrawOutcome::Pending
    );
    assert_eq!(session.finish_sketch().unwrap(), DrawOutcome::Pending);
    session.add_vertex(Coordinate::new(5.0, 5.0)).unwrap();
    assert_eq!(session.sketch().unwrap().vertices().len(), 2);

    let outcome = session.finish_sketch().unwrap();
    assert!(matches!(outcome, DrawOutcome::Completed { index: 0, .. }));
    flushed(&mut session, &mut view);
    assert!(view.installed.is_empty());

    session.start_draw(GeometryKind::Point);
    assert!(matches!(
        session.add_vertex(Coordinate::new(3.0, 3.0)).unwrap(),
        DrawOutcome::Completed { index: 1, .. }
    ));
}

#[test]
fn test_translate_excludes_features_drawn_later() {
    let mut session = EditorSession::new();
    session.start_draw(GeometryKind::Polygon);
    session
        .complete_shape(ShapeCompleted::new(square(0.0)))
        .unwrap();

    session.start_translate();
    assert!(session.controller().is_draggable(0));

    // Drawing detaches translate, so the next feature is added outside it
    session.start_draw(GeometryKind::Polygon);
    let outcome = session
        .complete_shape(ShapeCompleted::new(square(100.0)))
        .unwrap();
    assert!(matches!(outcome, DrawOutcome::Completed { index: 1, .. }));

    // Drawing replaced translate; restart it and check the new snapshot
    session.start_translate();
    assert!(session.controller().is_draggable(1));

    let moved = session.drag(Coordinate::new(105.0, 105.0), Coordinate::new(115.0, 105.0));
    assert_eq!(moved, Some(1));
    let extent = session.registry().freehand().features.get(1).unwrap().geometry.extent();
    assert_eq!(extent.unwrap().min_x, 110.0);
}

#[test]
fn test_translate_snapshot_is_fixed_at_activation() {
    let mut session = EditorSession::new();
    session.start_draw(GeometryKind::Polygon);
    session
        .complete_shape(ShapeCompleted::new(square(0.0)))
        .unwrap();
    session.start_translate();

    // Features added behind the controller's back (e.g. by an import into the
    // drawing layer) are outside the snapshot
    session
        .registry
        .freehand_features_mut()
        .push(Feature::new(square(100.0)));

    assert!(!session.controller().is_draggable(1));
    assert_eq!(
        session.drag(Coordinate::new(105.0, 105.0), Coordinate::new(115.0, 105.0)),
        None
    );
    assert_eq!(
        session.drag(Coordinate::new(5.0, 5.0), Coordinate::new(6.0, 5.0)),
        Some(0)
    );
}

#[test]
fn test_modify_moves_vertex_and_rerenders() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();
    session.start_draw(GeometryKind::Polygon);
    session
        .complete_shape(ShapeCompleted::new(square(0.0)))
        .unwrap();
    session.start_modify();
    flushed(&mut session, &mut view);
    let renders = view.render_count;

    assert_eq!(
        session.drag(Coordinate::new(10.0, 10.0), Coordinate::new(20.0, 20.0)),
        Some(0)
    );
    flushed(&mut session, &mut view);
    assert_eq!(view.render_count, renders + 1);

    // Nothing under the pointer
    assert_eq!(
        session.drag(Coordinate::new(500.0, 500.0), Coordinate::new(0.0, 0.0)),
        None
    );
    assert!(!session.needs_flush());
}

#[test]
fn test_clear_freehand_stops_translate() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();
    session.start_draw(GeometryKind::Polygon);
    session
        .complete_shape(ShapeCompleted::new(square(0.0)))
        .unwrap();
    session.start_translate();

    assert_eq!(session.clear_freehand(), 1);
    assert_eq!(session.mode(), InteractionMode::None);
    flushed(&mut session, &mut view);
    assert!(view.installed.is_empty());
    assert!(view.rendered[&LayerId::FREEHAND].features.is_empty());
}

#[test]
fn test_import_registers_layer_and_fits_view() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();

    let id = session.import_text("points", TWO_POINTS).unwrap();
    flushed(&mut session, &mut view);

    let layer = &view.rendered[&id];
    assert_eq!(layer.name, "points");
    assert!(layer.visible);
    assert_eq!(layer.features.len(), 2);
    assert_eq!(view.fits.len(), 1);
    assert!(view.fits[0].max_x > 1_000_000.0);
}

#[test]
fn test_imported_polygon_exports_as_feature_collection() {
    let mut session = EditorSession::new();
    let text = r#"{
        "type": "Feature",
        "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]},
        "properties": {"name": "A"}
    }"#;

    let id = session.import_text("A", text).unwrap();
    assert_eq!(session.registry().len(), 1);
    assert_eq!(session.registry().get(id).unwrap().features.len(), 1);

    let download = session.export_layer(id).unwrap();
    let document: Value = serde_json::from_str(&download.contents).unwrap();
    assert_eq!(document["type"], "FeatureCollection");
    let features = document["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["type"], "Feature");
    assert_eq!(features[0]["properties"], json!({"name": "A"}));

    let ring = features[0]["geometry"]["coordinates"][0].as_array().unwrap();
    assert_eq!(ring.len(), 4);
    assert_eq!(ring.first(), ring.last());
    let corner = ring[2].as_array().unwrap();
    assert!((corner[0].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert!((corner[1].as_f64().unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn test_point_drawn_past_mercator_limit_survives_export() {
    use crate::format::projection::MAX_MERCATOR_Y;

    let mut session = EditorSession::new();
    session.start_draw(GeometryKind::Point);
    session
        .add_vertex(Coordinate::new(1000.0, 25_000_000.0))
        .unwrap();
    let Geometry::Point(stored) = session.registry().freehand().features.get(0).unwrap().geometry else {
        panic!("expected a point");
    };
    assert_eq!(stored, Coordinate::new(1000.0, MAX_MERCATOR_Y));

    let download = session.export_layer(LayerId::FREEHAND).unwrap();
    let id = session.import_text("again", &download.contents).unwrap();
    let Geometry::Point(back) = session.registry().get(id).unwrap().features.get(0).unwrap().geometry else {
        panic!("expected a point");
    };
    assert!(back.approx_eq(&stored, 1e-6), "{:?} came back as {:?}", stored, back);
}

#[test]
fn test_failed_import_leaves_registry_unchanged() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();
    flushed(&mut session, &mut view);

    let cases = [
        "{not json",
        r#"{"type":"FeatureCollection"}"#,
        r#"{"type":"GeometryCollection","geometries":[]}"#,
        r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]]]}"#,
    ];
    for text in cases {
        assert!(matches!(
            session.import_text("bad", text),
            Err(EditorError::Format(_))
        ));
    }
    assert!(session.registry().is_empty());
    assert!(!session.needs_flush());
}

#[test]
fn test_import_with_blank_name_gets_placeholder() {
    let mut session = EditorSession::new();
    let id = session.import_text("  ", TWO_POINTS).unwrap();
    assert_eq!(
        session.registry().get(id).unwrap().name,
        crate::constants::UNNAMED_LAYER
    );
}

#[test]
fn test_ticket_import_flow() {
    let mut session = EditorSession::new();

    assert!(matches!(
        session.begin_import("notes.txt"),
        Err(EditorError::Format(FormatError::UnsupportedFile { .. }))
    ));

    let ticket = session.begin_import("Parks.GEOJSON").unwrap();
    let id = session.complete_import(ticket, TWO_POINTS).unwrap();
    let layer = session.registry().get(id).unwrap();
    assert_eq!(layer.name, "Parks");
    assert_eq!(
        layer.source,
        crate::model::LayerSource::Imported {
            file_name: Some("Parks.GEOJSON".to_string())
        }
    );
}

#[test]
fn test_import_file_and_export_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("points.geojson");
    std::fs::write(&path, TWO_POINTS).unwrap();

    let mut session = EditorSession::new();
    let id = session.import_file(&path).unwrap();

    let mut sink = DirectorySink::new(dir.path().join("export"));
    let saved = session.export_to(id, &mut sink).unwrap().unwrap();
    let text = std::fs::read_to_string(saved).unwrap();

    let reimported = GeoJsonFormat.import_text(&text).unwrap().features;
    let original = &session.registry().get(id).unwrap().features;
    assert_eq!(reimported.len(), original.len());
    for (a, b) in reimported.iter().zip(original.iter()) {
        assert_eq!(a.properties, b.properties);
        let (Geometry::Point(pa), Geometry::Point(pb)) = (&a.geometry, &b.geometry) else {
            panic!("expected points");
        };
        assert!(pa.approx_eq(pb, 1e-6));
    }
}

#[test]
fn test_export_unknown_layer() {
    let session = EditorSession::new();
    assert!(matches!(
        session.export_layer(LayerId(42)),
        Err(EditorError::UnknownLayer(_))
    ));
}

#[test]
fn test_freehand_layer_cannot_be_removed() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();
    flushed(&mut session, &mut view);

    assert!(!session.remove_layer(LayerId::FREEHAND));
    assert!(session.registry().contains(LayerId::FREEHAND));
    assert!(!session.needs_flush());
}

#[test]
fn test_removed_layer_is_dropped_from_view() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();
    let a = session.import_text("a", TWO_POINTS).unwrap();
    let b = session.import_text("b", TWO_POINTS).unwrap();
    flushed(&mut session, &mut view);

    assert!(session.remove_layer(a));
    assert!(!session.remove_layer(a));
    flushed(&mut session, &mut view);

    assert_eq!(view.removed, vec![a]);
    assert!(!view.rendered.contains_key(&a));
    assert_eq!(session.registry().index_of(b), Some(0));
}

#[test]
fn test_toggle_show_all_twice_restores_visibility() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();
    let a = session.import_text("a", TWO_POINTS).unwrap();
    let b = session.import_text("b", TWO_POINTS).unwrap();
    session.set_visibility(b, false).unwrap();
    flushed(&mut session, &mut view);

    assert!(!session.toggle_show_all());
    flushed(&mut session, &mut view);
    assert!(!view.rendered[&a].visible);
    assert!(!view.rendered[&b].visible);
    assert!(view.rendered[&LayerId::FREEHAND].visible);

    assert!(session.toggle_show_all());
    flushed(&mut session, &mut view);
    assert!(view.rendered[&a].visible);
    assert!(!view.rendered[&b].visible);
}

#[test]
fn test_toggle_twice_from_hidden_config_keeps_shown_layer() {
    let config = EditorConfig {
        show_all: false,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::with_config(&config).unwrap();
    let a = session.import_text("a", TWO_POINTS).unwrap();
    session.set_visibility(a, true).unwrap();

    assert!(session.toggle_show_all());
    assert!(!session.toggle_show_all());
    assert!(session.registry().get(a).unwrap().visible);
}

#[test]
fn test_unknown_layer_operations() {
    let mut session = EditorSession::new();
    assert!(matches!(
        session.set_visibility(LayerId(9), true),
        Err(EditorError::UnknownLayer(_))
    ));
    assert!(matches!(
        session.rename_layer(LayerId(9), "x"),
        Err(EditorError::UnknownLayer(_))
    ));
    assert!(!session.fit_to_layer(LayerId(9)));
    // The freehand layer starts empty, so there is nothing to fit
    assert!(!session.fit_to_layer(LayerId::FREEHAND));
}

#[test]
fn test_invalid_opacity_leaves_style_unchanged() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();
    let id = session.import_text("a", TWO_POINTS).unwrap();
    flushed(&mut session, &mut view);
    let before = session.registry().get(id).unwrap().style;

    assert!(matches!(
        session.styles().set_fill_opacity(id, 1.5),
        Err(StyleError::InvalidValue { .. })
    ));
    assert_eq!(session.registry().get(id).unwrap().style, before);
    assert!(!session.needs_flush());

    session.styles().set_fill_opacity(id, 0.2).unwrap();
    flushed(&mut session, &mut view);
    assert_eq!(view.rendered[&id].effective_style().fill_opacity(), 0.2);
}

#[test]
fn test_fit_to_layer() {
    let mut session = EditorSession::new();
    let mut view = RecordingView::default();
    let id = session.import_text("a", TWO_POINTS).unwrap();
    flushed(&mut session, &mut view);

    assert!(session.fit_to_layer(id));
    flushed(&mut session, &mut view);
    assert_eq!(view.fits.len(), 2);
    assert_eq!(view.fits[0], view.fits[1]);
}

#[test]
fn test_session_from_config() {
    let mut config = EditorConfig::new();
    config.show_all = false;
    config.hit_tolerance = 2.5;
    config.default_style.stroke_width = 4.0;

    let mut session = EditorSession::with_config(&config).unwrap();
    assert_eq!(session.controller().hit_tolerance(), 2.5);

    let id = session.import_text("a", TWO_POINTS).unwrap();
    let layer = session.registry().get(id).unwrap();
    assert!(!layer.visible);
    assert_eq!(layer.effective_style().stroke_width, 4.0);
    assert_ne!(layer.effective_style(), Style::default());

    config.default_style.fill_opacity = -1.0;
    assert!(matches!(
        EditorSession::with_config(&config),
        Err(EditorError::Style(_))
    ));
}
