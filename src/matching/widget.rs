//! Cost model for widget nodes.
//!
//! Each widget type compares a common set of layout fields plus the fields
//! that type actually renders with. Listener hooks, triggers and actions
//! carry their own weights. Legacy (non-if3) widgets are never moved
//! upstream, so a flat equal-weight comparison is enough for them.

use super::scoring::{Field, FieldScorer, FieldValue};
use crate::align::Dissimilarity;
use crate::model::{WidgetNode, LISTENERS};

macro_rules! field {
    ($name:literal, int $f:ident) => {
        Field {
            name: $name,
            get: |w: &WidgetNode| FieldValue::Int(i64::from(w.$f)),
            weight: 1.0,
        }
    };
    ($name:literal, bool $f:ident) => {
        Field {
            name: $name,
            get: |w: &WidgetNode| FieldValue::Bool(w.$f),
            weight: 1.0,
        }
    };
    ($name:literal, str $f:ident) => {
        Field {
            name: $name,
            get: |w: &WidgetNode| FieldValue::Str(w.$f.as_deref()),
            weight: 1.0,
        }
    };
}

const LAYOUT: &[Field<WidgetNode>] = &[
    field!("contentType", int content_type),
    field!("originalX", int original_x),
    field!("originalY", int original_y),
    field!("originalWidth", int original_width),
    field!("originalHeight", int original_height),
    field!("widthMode", int width_mode),
    field!("heightMode", int height_mode),
    field!("xPositionMode", int x_position_mode),
    field!("yPositionMode", int y_position_mode),
    field!("parentId", int parent_id),
    field!("hidden", bool hidden),
];

const CONTAINER: &[Field<WidgetNode>] = &[
    field!("scrollWidth", int scroll_width),
    field!("scrollHeight", int scroll_height),
    field!("noClickThrough", bool no_click_through),
];

const RECTANGLE: &[Field<WidgetNode>] = &[
    field!("textColor", int text_color),
    field!("filled", bool filled),
    field!("opacity", int opacity),
];

const TEXT: &[Field<WidgetNode>] = &[
    field!("fontId", int font_id),
    field!("lineHeight", int line_height),
    field!("xTextAlignment", int x_text_alignment),
    field!("yTextAlignment", int y_text_alignment),
    field!("textShadowed", bool text_shadowed),
    field!("textColor", int text_color),
];

const GRAPHIC: &[Field<WidgetNode>] = &[
    field!("spriteId", int sprite_id),
    field!("textureId", int texture_id),
    field!("spriteTiling", bool sprite_tiling),
    field!("opacity", int opacity),
    field!("borderType", int border_type),
    field!("shadowColor", int shadow_color),
    field!("flippedVertically", bool flipped_vertically),
    field!("flippedHorizontally", bool flipped_horizontally),
];

const MODEL: &[Field<WidgetNode>] = &[
    field!("modelType", int model_type),
    field!("modelId", int model_id),
    field!("offsetX2d", int offset_x2d),
    field!("offsetY2d", int offset_y2d),
    field!("rotationX", int rotation_x),
    field!("rotationZ", int rotation_z),
    field!("rotationY", int rotation_y),
    field!("modelZoom", int model_zoom),
    field!("animation", int animation),
    field!("orthogonal", bool orthogonal),
    field!("modelHeightOverride", int model_height_override),
];

const LINE: &[Field<WidgetNode>] = &[
    field!("lineWidth", int line_width),
    field!("lineHeight", int line_height),
    field!("lineDirection", bool line_direction),
];

const INTERACTION: &[Field<WidgetNode>] = &[
    field!("clickMask", int click_mask),
    field!("name", str name),
];

const DRAG: &[Field<WidgetNode>] = &[
    field!("dragDeadZone", int drag_dead_zone),
    field!("dragDeadTime", int drag_dead_time),
    field!("dragRenderBehavior", bool drag_render_behavior),
    field!("targetVerb", str target_verb),
];

/// Every scalar field, for the legacy comparison.
const ALL_TABLES: &[&[Field<WidgetNode>]] = &[
    LAYOUT,
    CONTAINER,
    RECTANGLE,
    TEXT,
    GRAPHIC,
    MODEL,
    LINE,
    INTERACTION,
    DRAG,
    &[field!("text", str text), field!("type", int kind)],
];

fn type_fields(kind: i32) -> &'static [Field<WidgetNode>] {
    match kind {
        0 => CONTAINER,
        3 => RECTANGLE,
        4 => TEXT,
        5 => GRAPHIC,
        6 => MODEL,
        9 => LINE,
        _ => &[],
    }
}

/// Widget node dissimilarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidgetCost;

impl WidgetCost {
    fn legacy(a: &WidgetNode, b: &WidgetNode) -> f64 {
        let mut scorer = FieldScorer::new();
        for table in ALL_TABLES {
            scorer.fields(table, a, b);
        }
        scorer.compare(&a.actions, &b.actions, 1.0);
        scorer.compare(&a.listeners, &b.listeners, 1.0);
        scorer.compare(&a.var_transmit_triggers, &b.var_transmit_triggers, 1.0);
        scorer.compare(&a.inv_transmit_triggers, &b.inv_transmit_triggers, 1.0);
        scorer.compare(&a.stat_transmit_triggers, &b.stat_transmit_triggers, 1.0);
        scorer.finish()
    }

    fn listener(scorer: &mut FieldScorer, a: Option<&[serde_json::Value]>, b: Option<&[serde_json::Value]>) {
        scorer.add(0.0, 0.2);
        match (a, b) {
            (None, None) => {}
            (Some(_), None) | (None, Some(_)) => scorer.add(2.0, 1.8),
            (Some(a), Some(b)) => {
                let mut diff = 0.0;
                if a.first() != b.first() {
                    diff += 1.0;
                }
                if a != b {
                    diff += 1.0;
                }
                scorer.add(diff, 1.8);
            }
        }
    }
}

impl Dissimilarity<WidgetNode> for WidgetCost {
    fn cost(&self, a: &WidgetNode, b: &WidgetNode) -> f64 {
        if !a.is_if3 || !b.is_if3 {
            return Self::legacy(a, b);
        }
        if a.kind != b.kind {
            return 1.0;
        }

        let mut scorer = FieldScorer::new();
        scorer.fields(LAYOUT, a, b);
        scorer.fields(type_fields(a.kind), a, b);
        scorer.fields(INTERACTION, a, b);
        scorer.sets(a.actions.as_deref(), b.actions.as_deref(), 1.0, 0.0);
        scorer.fields(DRAG, a, b);

        for name in LISTENERS {
            Self::listener(&mut scorer, a.listener(name), b.listener(name));
        }

        scorer.sets(
            a.var_transmit_triggers.as_deref(),
            b.var_transmit_triggers.as_deref(),
            0.5,
            0.5,
        );
        scorer.sets(
            a.inv_transmit_triggers.as_deref(),
            b.inv_transmit_triggers.as_deref(),
            0.5,
            0.5,
        );
        scorer.sets(
            a.stat_transmit_triggers.as_deref(),
            b.stat_transmit_triggers.as_deref(),
            0.5,
            0.5,
        );

        scorer.finish()
    }
}
