use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::app::error::{AppError, Result};

/// Version tag written by the current schema revision.
pub const FORMAT_VERSION: &str = "1";

/// A sprite-stack project: named groups of animations sharing one canvas
/// size. The document owns its whole tree; there is no identity beyond the
/// file path the caller loaded it from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDocument {
    pub version: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub groups: HashMap<String, Group>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub animations: HashMap<String, Animation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Animation {
    /// Playback order is the vector order.
    #[serde(default)]
    pub frames: Vec<Frame>,
    /// Duration unit (ms, ticks, ...) is defined by the consuming editor.
    #[serde(default)]
    pub time: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Stack order, bottom to top.
    #[serde(default)]
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// 0.0 receives no directional shading, 1.0 full shading. Not clamped
    /// here; out-of-range values round-trip untouched and are the
    /// renderer's problem.
    #[serde(default)]
    pub shading_multiplier: f64,
}

/// The pre-versioned file format: no `version` field, canvas dimensions
/// stored per group instead of on the document.
#[derive(Debug, Deserialize)]
struct LegacyDocument {
    #[serde(default)]
    groups: HashMap<String, LegacyGroup>,
}

#[derive(Debug, Deserialize)]
struct LegacyGroup {
    #[serde(default)]
    width: i32,
    #[serde(default)]
    height: i32,
    #[serde(default)]
    animations: HashMap<String, LegacyAnimation>,
}

#[derive(Debug, Deserialize)]
struct LegacyAnimation {
    #[serde(default)]
    frames: Vec<LegacyFrame>,
    #[serde(default)]
    time: i32,
}

/// Legacy frames keyed their stack as `layers`; the current revision
/// calls these slices.
#[derive(Debug, Deserialize)]
struct LegacyFrame {
    #[serde(default)]
    layers: Vec<Slice>,
}

/// Hoist per-group dimensions to the document level. The document canvas
/// becomes the maximum across groups so every group's content stays
/// representable; an empty legacy document upgrades to 0x0.
fn upgrade_legacy(legacy: LegacyDocument) -> StackDocument {
    let width = legacy.groups.values().map(|g| g.width).max().unwrap_or(0);
    let height = legacy.groups.values().map(|g| g.height).max().unwrap_or(0);
    let groups = legacy
        .groups
        .into_iter()
        .map(|(name, group)| {
            let animations = group
                .animations
                .into_iter()
                .map(|(name, animation)| {
                    (
                        name,
                        Animation {
                            frames: animation
                                .frames
                                .into_iter()
                                .map(|frame| Frame {
                                    slices: frame.layers,
                                })
                                .collect(),
                            time: animation.time,
                        },
                    )
                })
                .collect();
            (name, Group { animations })
        })
        .collect();
    StackDocument {
        version: FORMAT_VERSION.to_string(),
        width,
        height,
        groups,
    }
}

impl StackDocument {
    /// An empty current-revision document for a new project.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            width,
            height,
            groups: HashMap::new(),
        }
    }

    /// Decode a document from its JSON bytes.
    ///
    /// The `version` field is inspected before the full decode: files
    /// without one are the legacy per-group-dimensions format and get
    /// upgraded, anything other than the current tag is rejected rather
    /// than read with current-revision semantics.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        #[derive(Deserialize)]
        struct VersionProbe {
            #[serde(default)]
            version: Option<String>,
        }

        let probe: VersionProbe = serde_json::from_slice(bytes).map_err(AppError::Decode)?;
        match probe.version.as_deref() {
            None => {
                let legacy: LegacyDocument =
                    serde_json::from_slice(bytes).map_err(AppError::Decode)?;
                Ok(upgrade_legacy(legacy))
            }
            Some(v) if v == FORMAT_VERSION => {
                serde_json::from_slice(bytes).map_err(AppError::Decode)
            }
            Some(other) => Err(AppError::UnsupportedVersion(other.to_string())),
        }
    }

    /// Encode to JSON bytes. Pure transform; the caller writes the file.
    ///
    /// The only in-memory value JSON cannot represent is a non-finite
    /// shading multiplier, so that is checked up front instead of letting
    /// it degrade to `null` in the output.
    pub fn encode(&self) -> Result<Vec<u8>> {
        for (name, group) in &self.groups {
            for animation in group.animations.values() {
                for frame in &animation.frames {
                    for slice in &frame.slices {
                        if !slice.shading_multiplier.is_finite() {
                            return Err(AppError::Encode(format!(
                                "non-finite shadingMultiplier in group {:?}",
                                name
                            )));
                        }
                    }
                }
            }
        }
        serde_json::to_vec_pretty(self)
            .map_err(|e| AppError::Encode(e.to_string()))
    }
}
