//! Widget layout nodes as read from a snapshot's widget groups.
//!
//! A group file is a JSON array; a node's position in the array is its
//! child id within the group.

use crate::error::{ParseErrorKind, Result, UpdaterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of bits the group occupies above the child in a packed widget id.
pub const GROUP_SHIFT: u32 = 16;
const CHILD_MASK: i64 = 0xFFFF;

/// Split a packed widget id into `(group, child)`.
pub fn unpack_id(packed: i64) -> (i64, i64) {
    (packed >> GROUP_SHIFT, packed & CHILD_MASK)
}

/// Pack a `(group, child)` pair.
pub fn pack_id(group: i64, child: i64) -> i64 {
    (group << GROUP_SHIFT) | (child & CHILD_MASK)
}

/// Event hooks compared by the widget cost, in this order.
pub const LISTENERS: &[&str] = &[
    "onLoad",
    "onMouseOver",
    "onMouseLeave",
    "onTargetLeave",
    "onTargetEnter",
    "onVarTransmit",
    "onInvTransmit",
    "onStatTransmit",
    "onTimer",
    "onOp",
    "onMouseRepeat",
    "onClick",
    "onClickRepeat",
    "onRelease",
    "onHold",
    "onDrag",
    "onDragComplete",
    "onScrollWheel",
];

/// One widget definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetNode {
    pub is_if3: bool,
    #[serde(rename = "type")]
    pub kind: i32,
    pub content_type: i32,
    pub original_x: i32,
    pub original_y: i32,
    pub original_width: i32,
    pub original_height: i32,
    pub width_mode: i32,
    pub height_mode: i32,
    pub x_position_mode: i32,
    pub y_position_mode: i32,
    pub parent_id: i32,
    pub hidden: bool,

    // container
    pub scroll_width: i32,
    pub scroll_height: i32,
    pub no_click_through: bool,

    // graphic
    pub sprite_id: i32,
    pub texture_id: i32,
    pub sprite_tiling: bool,
    pub opacity: i32,
    pub border_type: i32,
    pub shadow_color: i32,
    pub flipped_vertically: bool,
    pub flipped_horizontally: bool,

    // model
    pub model_type: i32,
    pub model_id: i32,
    pub offset_x2d: i32,
    pub offset_y2d: i32,
    pub rotation_x: i32,
    pub rotation_y: i32,
    pub rotation_z: i32,
    pub model_zoom: i32,
    pub animation: i32,
    pub orthogonal: bool,
    pub model_height_override: i32,

    // text
    pub font_id: i32,
    pub line_height: i32,
    pub x_text_alignment: i32,
    pub y_text_alignment: i32,
    pub text_shadowed: bool,
    pub text_color: i32,
    pub text: Option<String>,

    // rectangle
    pub filled: bool,

    // line
    pub line_width: i32,
    pub line_direction: bool,

    pub click_mask: i32,
    pub name: Option<String>,
    pub actions: Option<Vec<String>>,
    pub drag_dead_zone: i32,
    pub drag_dead_time: i32,
    pub drag_render_behavior: bool,
    pub target_verb: Option<String>,

    /// Listener name (see [`LISTENERS`]) to its argument list; the first
    /// argument is the script id.
    pub listeners: BTreeMap<String, Vec<serde_json::Value>>,

    pub var_transmit_triggers: Option<Vec<i32>>,
    pub inv_transmit_triggers: Option<Vec<i32>>,
    pub stat_transmit_triggers: Option<Vec<i32>>,
}

impl WidgetNode {
    pub fn listener(&self, name: &str) -> Option<&[serde_json::Value]> {
        self.listeners.get(name).map(Vec::as_slice)
    }
}

/// Decode a widget group file.
pub fn parse_group(text: &str) -> Result<Vec<WidgetNode>> {
    serde_json::from_str(text).map_err(|e| {
        UpdaterError::parse("widget group", ParseErrorKind::InvalidJson(e.to_string()))
    })
}
