//! Map files exported from Tiled (`.tmj`, JSON).
//!
//! Only object layers matter for gameplay. Every object becomes an
//! axis-aligned rectangle: plain objects use `x/y/width/height`, polygons are
//! reduced to the bounding box of their points. Layers listed in
//! `MapLoadOptions::interaction_layers` become named interaction rects, every
//! other object layer becomes obstacles.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use oa_core::geometry::Rect;

use crate::collision::CollisionWorld;

#[derive(Debug, Deserialize)]
struct MapFile {
    #[serde(default)]
    layers: Vec<MapLayer>,
}

#[derive(Debug, Deserialize)]
struct MapLayer {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    objects: Vec<MapObject>,
}

#[derive(Debug, Deserialize)]
struct MapObject {
    #[serde(default)]
    name: String,
    x: f32,
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    polygon: Option<Vec<MapPoint>>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct MapPoint {
    x: f32,
    y: f32,
}

/// How map pixel space lands in scene space.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MapLoadOptions {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub interaction_layers: Vec<String>,
}

impl Default for MapLoadOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            interaction_layers: Vec::new(),
        }
    }
}

impl MapLoadOptions {
    fn transform(&self, rect: Rect) -> Rect {
        rect.scaled(self.scale)
            .translated(Vec2::new(self.offset_x, self.offset_y))
    }

    fn is_interaction_layer(&self, name: &str) -> bool {
        self.interaction_layers
            .iter()
            .any(|layer| layer.eq_ignore_ascii_case(name))
    }
}

pub fn load_map_from_path(path: &Path, options: &MapLoadOptions) -> Result<CollisionWorld, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read map file {}: {e}", path.display()))?;
    parse_map(&raw, options).map_err(|e| format!("Failed to parse map JSON {}: {e}", path.display()))
}

/// Load a map, degrading to an empty world when the file is missing or
/// malformed.
pub fn load_map_or_empty(path: &Path, options: &MapLoadOptions) -> CollisionWorld {
    load_map_from_path(path, options).unwrap_or_else(|err| {
        log::warn!("{err}. Continuing without map collision.");
        CollisionWorld::default()
    })
}

pub fn parse_map(raw: &str, options: &MapLoadOptions) -> Result<CollisionWorld, String> {
    if options.scale.is_nan() || options.scale <= 0.0 {
        return Err(format!("map scale must be > 0 (got {})", options.scale));
    }
    let file: MapFile = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let mut world = CollisionWorld::default();
    for layer in file.layers.iter().filter(|l| l.kind == "objectgroup") {
        let interactive = options.is_interaction_layer(&layer.name);
        for (index, object) in layer.objects.iter().enumerate() {
            let Some(rect) = object_rect(object) else {
                log::debug!(
                    "Map layer '{}' object {} has no area; skipped",
                    layer.name,
                    index
                );
                continue;
            };
            let rect = options.transform(rect);
            if interactive {
                let name = if object.name.is_empty() {
                    format!("{}#{}", layer.name, index)
                } else {
                    object.name.clone()
                };
                world.add_interaction(name, rect);
            } else {
                world.add_obstacle(rect);
            }
        }
    }

    log::info!(
        "Map loaded: {} obstacles, {} interactions",
        world.obstacles.len(),
        world.interactions.len()
    );
    Ok(world)
}

fn object_rect(object: &MapObject) -> Option<Rect> {
    let rect = match &object.polygon {
        Some(points) => Rect::bounding(
            points
                .iter()
                .map(|p| Vec2::new(object.x + p.x, object.y + p.y)),
        )?,
        None => Rect::new(object.x, object.y, object.width, object.height),
    };
    (!rect.is_empty()).then_some(rect)
}
