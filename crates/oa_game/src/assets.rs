//! Character sprite sheets.
//!
//! A character is described by a small JSON manifest listing strips of
//! equally sized frames inside PNG sheets. Loading slices every frame out of
//! its sheet, checks it for any non-transparent pixel and registers the
//! pixels in the `SpriteStore`. Playback never touches pixels again; the
//! result travels with the frame as `AnimationFrame::visible`.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::Deserialize;

use oa_core::animation::{AnimationClip, AnimationFrame};

use crate::animation::AnimationManager;
use crate::collision::CollisionWorld;
use crate::map::{load_map_or_empty, MapLoadOptions};
use crate::render::SpriteStore;

/// Row order of directional sheets.
pub const SHEET_DIRECTIONS: [&str; 4] = ["up", "left", "down", "right"];

#[derive(Debug, Deserialize, Clone)]
pub struct CharacterManifest {
    pub character: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub clips: Vec<ClipSpec>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClipSpec {
    pub name: String,
    /// Sheet path relative to the manifest.
    pub sheet: String,
    #[serde(default)]
    pub row: u32,
    pub frames: u32,
    /// Expand into `{name}_up/left/down/right` from four consecutive rows.
    #[serde(default)]
    pub directional: bool,
    #[serde(default)]
    pub frame_ms: Option<u64>,
    #[serde(default)]
    pub looping: Option<bool>,
}

pub fn load_manifest(path: &Path) -> Result<CharacterManifest, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read character manifest {}: {e}", path.display()))?;
    let manifest: CharacterManifest = serde_json::from_str(&raw).map_err(|e| {
        format!(
            "Failed to parse character manifest JSON {}: {e}",
            path.display()
        )
    })?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

fn validate_manifest(manifest: &CharacterManifest) -> Result<(), String> {
    if manifest.frame_width == 0 || manifest.frame_height == 0 {
        return Err(format!(
            "Manifest validation failed: '{}' frame size must be non-zero",
            manifest.character
        ));
    }
    let mut names = HashSet::new();
    for clip in &manifest.clips {
        if clip.frames == 0 {
            return Err(format!(
                "Manifest validation failed: clip '{}' has zero frames",
                clip.name
            ));
        }
        if clip.frame_ms == Some(0) {
            return Err(format!(
                "Manifest validation failed: clip '{}' has frame_ms 0",
                clip.name
            ));
        }
        if last_row_offset(clip, manifest.frame_height).is_none() {
            return Err(format!(
                "Manifest validation failed: clip '{}' row {} is out of range",
                clip.name, clip.row
            ));
        }
        if !names.insert(clip.name.as_str()) {
            return Err(format!(
                "Manifest validation failed: duplicate clip name '{}'",
                clip.name
            ));
        }
    }
    Ok(())
}

/// Pixel offset of the bottom edge of the clip's last row, or `None` when
/// it does not fit in `u32`.
fn last_row_offset(clip: &ClipSpec, frame_height: u32) -> Option<u32> {
    let rows = if clip.directional {
        SHEET_DIRECTIONS.len() as u32
    } else {
        1
    };
    clip.row
        .checked_add(rows)?
        .checked_mul(frame_height)
}

/// True when any pixel has non-zero alpha.
pub fn has_visible_pixels(frame: &RgbaImage) -> bool {
    frame.pixels().any(|p| p.0[3] > 0)
}

fn default_frame_ms(name: &str) -> u64 {
    if name.starts_with("walk") || name.starts_with("run") {
        100
    } else if name.starts_with("idle") {
        250
    } else {
        150
    }
}

fn default_looping(name: &str) -> bool {
    !(name.starts_with("sit") || name.starts_with("kneel"))
}

/// Cut `count` frames of `fw`×`fh` from `row` of `sheet`. Frames that would
/// fall outside the sheet are dropped.
pub fn slice_row(sheet: &RgbaImage, row: u32, count: u32, fw: u32, fh: u32) -> Vec<RgbaImage> {
    if fw == 0 || fh == 0 {
        return Vec::new();
    }
    let Some(y) = row.checked_mul(fh) else {
        return Vec::new();
    };
    match y.checked_add(fh) {
        Some(bottom) if bottom <= sheet.height() => {}
        _ => return Vec::new(),
    }
    let fit = (sheet.width() / fw).min(count);
    (0..fit)
        .map(|i| image::imageops::crop_imm(sheet, i * fw, y, fw, fh).to_image())
        .collect()
}

/// Build a clip from sliced frames, registering their pixels in `store`.
fn build_clip(
    character: &str,
    clip_name: &str,
    frames: Vec<RgbaImage>,
    frame_ms: u64,
    looping: bool,
    store: &mut SpriteStore,
) -> AnimationClip {
    let mut anim_frames = Vec::with_capacity(frames.len());
    for (i, pixels) in frames.into_iter().enumerate() {
        let sprite_id = format!("{character}/{clip_name}/{i}");
        let visible = has_visible_pixels(&pixels);
        store.insert(sprite_id.clone(), pixels);
        anim_frames.push(AnimationFrame::new(sprite_id, visible));
    }

    // Walk cycles are re-timed around their visible frames only; a fully
    // blank strip is kept as-is so the clip still exists.
    if clip_name.starts_with("walk") && anim_frames.iter().any(|f| f.visible) {
        anim_frames.retain(|f| f.visible);
    }

    AnimationClip::from_ms(anim_frames, frame_ms, looping)
}

pub fn load_character(manifest_path: &Path, store: &mut SpriteStore) -> Result<AnimationManager, String> {
    let manifest = load_manifest(manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut sheets: HashMap<PathBuf, RgbaImage> = HashMap::new();
    let mut manager = AnimationManager::new();

    for entry in &manifest.clips {
        let sheet_path = base.join(&entry.sheet);
        if !sheets.contains_key(&sheet_path) {
            match image::open(&sheet_path) {
                Ok(img) => {
                    sheets.insert(sheet_path.clone(), img.to_rgba8());
                }
                Err(err) => {
                    log::warn!(
                        "Failed to load sheet {} for '{}': {}. Clip '{}' skipped.",
                        sheet_path.display(),
                        manifest.character,
                        err,
                        entry.name
                    );
                    continue;
                }
            }
        }
        let Some(sheet) = sheets.get(&sheet_path) else {
            continue;
        };

        let rows: Vec<(String, u32)> = if entry.directional {
            SHEET_DIRECTIONS
                .iter()
                .enumerate()
                .filter_map(|(i, dir)| {
                    let row = entry.row.checked_add(i as u32)?;
                    Some((format!("{}_{}", entry.name, dir), row))
                })
                .collect()
        } else {
            vec![(entry.name.clone(), entry.row)]
        };
        if entry.directional && rows.len() < SHEET_DIRECTIONS.len() {
            log::warn!(
                "Clip '{}' of '{}': row {} is out of range. Clip skipped.",
                entry.name,
                manifest.character,
                entry.row
            );
            continue;
        }

        for (clip_name, row) in rows {
            let frames = slice_row(
                sheet,
                row,
                entry.frames,
                manifest.frame_width,
                manifest.frame_height,
            );
            if frames.is_empty() {
                log::warn!(
                    "Clip '{}' of '{}': row {} is outside sheet {}",
                    clip_name,
                    manifest.character,
                    row,
                    sheet_path.display()
                );
                continue;
            }
            if frames.len() < entry.frames as usize {
                log::warn!(
                    "Clip '{}' of '{}': sheet holds {} of {} frames",
                    clip_name,
                    manifest.character,
                    frames.len(),
                    entry.frames
                );
            }
            let frame_ms = entry.frame_ms.unwrap_or_else(|| default_frame_ms(&clip_name));
            let looping = entry.looping.unwrap_or_else(|| default_looping(&clip_name));
            let clip = build_clip(
                &manifest.character,
                &clip_name,
                frames,
                frame_ms,
                looping,
                store,
            );
            if !clip.has_visible_frame() {
                log::warn!(
                    "Clip '{}' of '{}' has no visible frames",
                    clip_name,
                    manifest.character
                );
            }
            manager.add(clip_name, clip);
        }
    }

    log::info!(
        "Loaded character '{}' with {} clips",
        manifest.character,
        manager.len()
    );
    Ok(manager)
}

/// Asset root plus the decoded sprite pixels shared by every scene.
pub struct Assets {
    pub root: PathBuf,
    pub sprites: SpriteStore,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sprites: SpriteStore::new(),
        }
    }

    pub fn character_manifest_path(&self, name: &str) -> PathBuf {
        self.root.join("characters").join(format!("{name}.json"))
    }

    /// Load a character's clips, or an empty manager if anything is missing.
    pub fn character(&mut self, name: &str) -> AnimationManager {
        let path = self.character_manifest_path(name);
        load_character(&path, &mut self.sprites).unwrap_or_else(|err| {
            log::warn!("{err}. '{name}' will not be drawn.");
            AnimationManager::new()
        })
    }

    pub fn map(&self, relative: &str, options: &MapLoadOptions) -> CollisionWorld {
        load_map_or_empty(&self.root.join(relative), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "oa_assets_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(dir.join("characters")).expect("create temp asset dir");
        dir
    }

    /// 4 columns × 4 rows of 2×2 frames. Row `r` has `visible[r]` opaque
    /// frames followed by transparent padding.
    fn write_sheet(path: &Path, visible: [u32; 4]) {
        let mut sheet = RgbaImage::new(8, 8);
        for (row, &count) in visible.iter().enumerate() {
            for col in 0..count {
                sheet.put_pixel(col * 2, row as u32 * 2, Rgba([255, 0, 0, 255]));
            }
        }
        sheet.save(path).expect("write sheet png");
    }

    #[test]
    fn visible_pixel_detection() {
        let mut img = RgbaImage::new(3, 3);
        assert!(!has_visible_pixels(&img));
        img.put_pixel(2, 2, Rgba([0, 0, 0, 1]));
        assert!(has_visible_pixels(&img));
    }

    #[test]
    fn slicing_drops_frames_outside_sheet() {
        let sheet = RgbaImage::new(8, 8);
        assert_eq!(slice_row(&sheet, 1, 4, 2, 2).len(), 4);
        assert_eq!(slice_row(&sheet, 0, 9, 2, 2).len(), 4);
        assert!(slice_row(&sheet, 4, 4, 2, 2).is_empty());
    }

    #[test]
    fn directional_clips_and_padding() {
        let dir = temp_dir("directional");
        write_sheet(&dir.join("characters/walk.png"), [4, 3, 2, 0]);
        write_sheet(&dir.join("characters/sit.png"), [1, 1, 3, 1]);
        fs::write(
            dir.join("characters/maria.json"),
            r#"{
              "character": "maria",
              "frame_width": 2,
              "frame_height": 2,
              "clips": [
                { "name": "walk", "sheet": "walk.png", "frames": 4, "directional": true },
                { "name": "sit_down", "sheet": "sit.png", "row": 2, "frames": 4 }
              ]
            }"#,
        )
        .expect("write manifest");

        let mut assets = Assets::new(&dir);
        let anim = assets.character("maria");

        // Walk rows keep only visible frames, unless none are visible.
        assert_eq!(anim.clip("walk_up").unwrap().len(), 4);
        assert_eq!(anim.clip("walk_left").unwrap().len(), 3);
        assert_eq!(anim.clip("walk_down").unwrap().len(), 2);
        assert_eq!(anim.clip("walk_right").unwrap().len(), 4);
        assert!(!anim.clip("walk_right").unwrap().has_visible_frame());

        // Non-walk clips keep padding and carry per-frame visibility.
        let sit = anim.clip("sit_down").unwrap();
        assert_eq!(sit.len(), 4);
        assert_eq!(sit.last_visible_index(), Some(2));
        assert!(!sit.looping);
        assert_eq!(sit.frame_us, 150_000);

        assert!(assets.sprites.contains("maria/sit_down/3"));
        assert_eq!(assets.sprites.len(), 4 * 4 + 4);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_manifest_gives_empty_manager() {
        let dir = temp_dir("missing");
        let mut assets = Assets::new(&dir);
        assert!(assets.character("nobody").is_empty());
        assert!(assets.sprites.is_empty());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_sheet_skips_clip() {
        let dir = temp_dir("missing_sheet");
        write_sheet(&dir.join("characters/idle.png"), [2, 2, 2, 2]);
        fs::write(
            dir.join("characters/shani.json"),
            r#"{
              "character": "shani",
              "frame_width": 2,
              "frame_height": 2,
              "clips": [
                { "name": "idle_down", "sheet": "idle.png", "row": 2, "frames": 2, "frame_ms": 300 },
                { "name": "emote", "sheet": "nope.png", "frames": 2 }
              ]
            }"#,
        )
        .expect("write manifest");

        let mut assets = Assets::new(&dir);
        let anim = assets.character("shani");
        assert_eq!(anim.len(), 1);
        assert_eq!(anim.clip("idle_down").unwrap().frame_us, 300_000);
        assert!(anim.clip("idle_down").unwrap().looping);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn manifest_validation() {
        let dir = temp_dir("invalid");
        let path = dir.join("characters/bad.json");
        fs::write(
            &path,
            r#"{ "character": "bad", "frame_width": 2, "frame_height": 2,
                 "clips": [
                   { "name": "idle", "sheet": "a.png", "frames": 1 },
                   { "name": "idle", "sheet": "b.png", "frames": 1 }
                 ] }"#,
        )
        .expect("write manifest");
        let err = load_manifest(&path).unwrap_err();
        assert!(err.contains("duplicate clip name 'idle'"));

        fs::write(
            &path,
            r#"{ "character": "bad", "frame_width": 0, "frame_height": 2, "clips": [] }"#,
        )
        .expect("write manifest");
        assert!(load_manifest(&path).unwrap_err().contains("frame size"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn out_of_range_row_degrades_to_empty_manager() {
        let dir = temp_dir("huge_row");
        write_sheet(&dir.join("characters/walk.png"), [1, 1, 1, 1]);
        fs::write(
            dir.join("characters/maria.json"),
            r#"{ "character": "maria", "frame_width": 2, "frame_height": 2,
                 "clips": [
                   { "name": "walk", "sheet": "walk.png", "row": 4294967295,
                     "frames": 1, "directional": true }
                 ] }"#,
        )
        .expect("write manifest");

        let err = load_manifest(&dir.join("characters/maria.json")).unwrap_err();
        assert!(err.contains("row 4294967295 is out of range"));

        let mut assets = Assets::new(&dir);
        assert!(assets.character("maria").is_empty());
        assert!(assets.sprites.is_empty());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn slicing_huge_rows_is_empty() {
        let sheet = RgbaImage::new(8, 8);
        assert!(slice_row(&sheet, u32::MAX, 1, 2, 2).is_empty());
        assert!(slice_row(&sheet, u32::MAX / 2, 1, 2, 2).is_empty());
    }
}
