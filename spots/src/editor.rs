use nalgebra::Vector2;

use crate::{Region, RegionStore};

const MOVE_STEP: i32 = 5;
const SIZE_STEP: i32 = 5;
const ROTATE_STEP: i32 = 5;
// Sizes are only shrunk while above these
const MIN_WIDTH: i32 = 30;
const MIN_HEIGHT: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Left,
    Up,
    Right,
    Down,
    RotateLeft,
    RotateRight,
    Wider,
    Narrower,
    Taller,
    Shorter,
}

/// Strips the modifier state highgui ORs into bits 16 and up of a `wait_key_ex` code.
pub fn key_without_modifiers(code: i32) -> i32 {
    code & 0xFFFF
}

impl EditKey {
    /// Maps a `wait_key_ex` code. Arrow keys are accepted both as GTK keysyms
    /// and as Cocoa function key codes.
    pub fn from_key_code(code: i32) -> Option<EditKey> {
        let key = match key_without_modifiers(code) {
            0xFF51 | 0xF702 => EditKey::Left,
            0xFF52 | 0xF700 => EditKey::Up,
            0xFF53 | 0xF703 => EditKey::Right,
            0xFF54 | 0xF701 => EditKey::Down,
            c if c == '[' as i32 => EditKey::RotateLeft,
            c if c == ']' as i32 => EditKey::RotateRight,
            c if c == 'd' as i32 => EditKey::Wider,
            c if c == 'a' as i32 => EditKey::Narrower,
            c if c == 'w' as i32 => EditKey::Taller,
            c if c == 's' as i32 => EditKey::Shorter,
            _ => return None,
        };

        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Add,
    Remove,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseClick {
    pub kind: ClickKind,
    pub position: Vector2<i32>,
}

impl MouseClick {
    pub fn new(kind: ClickKind, position: Vector2<i32>) -> Self {
        Self { kind, position }
    }
}

/// Annotation state: the region set and the currently selected region.
#[derive(Debug, Clone, Default)]
pub struct RegionEditor {
    regions: Vec<Region>,
    selected: Option<usize>,
}

impl RegionEditor {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            selected: None,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn hit(&self, p: &Vector2<i32>) -> Option<usize> {
        self.regions.iter().position(|r| r.contains(p))
    }

    pub fn add_at(&mut self, p: Vector2<i32>) -> usize {
        self.regions.push(Region::at(p));
        let index = self.regions.len() - 1;
        self.selected = Some(index);
        index
    }

    pub fn remove_at(&mut self, p: &Vector2<i32>) -> Option<Region> {
        let index = self.hit(p)?;
        self.selected = None;
        Some(self.regions.remove(index))
    }

    pub fn select_at(&mut self, p: &Vector2<i32>) -> Option<usize> {
        let index = self.hit(p)?;
        self.selected = Some(index);
        Some(index)
    }

    /// Returns true when the region set changed.
    pub fn click(&mut self, click: &MouseClick) -> bool {
        match click.kind {
            ClickKind::Add => {
                let index = self.add_at(click.position);
                log::debug!("Added region {index} at ({}, {})", click.position.x, click.position.y);
                true
            }
            ClickKind::Remove => match self.remove_at(&click.position) {
                Some(region) => {
                    log::debug!("Removed region at ({}, {})", region.center.x, region.center.y);
                    true
                }
                None => false,
            },
            ClickKind::Select => {
                if let Some(index) = self.select_at(&click.position) {
                    let r = &self.regions[index];
                    log::info!(
                        "Selected region {index} at ({}, {}) angle={} size=({}x{})",
                        r.center.x, r.center.y, r.angle, r.width(), r.height()
                    );
                }
                false
            }
        }
    }

    /// Applies a key to the selected region. Returns true when the region set changed.
    pub fn apply_key(&mut self, key: EditKey) -> bool {
        let Some(region) = self.selected.and_then(|i| self.regions.get_mut(i)) else {
            return false;
        };

        match key {
            EditKey::Left => region.center.x -= MOVE_STEP,
            EditKey::Up => region.center.y -= MOVE_STEP,
            EditKey::Right => region.center.x += MOVE_STEP,
            EditKey::Down => region.center.y += MOVE_STEP,
            EditKey::RotateLeft => region.angle -= ROTATE_STEP,
            EditKey::RotateRight => region.angle += ROTATE_STEP,
            EditKey::Wider => region.size.x += SIZE_STEP,
            EditKey::Narrower if region.size.x > MIN_WIDTH => region.size.x -= SIZE_STEP,
            EditKey::Taller => region.size.y += SIZE_STEP,
            EditKey::Shorter if region.size.y > MIN_HEIGHT => region.size.y -= SIZE_STEP,
            EditKey::Narrower | EditKey::Shorter => return false,
        }

        true
    }
}

/// Owns the editor state and keeps the store in sync with it.
pub struct EditorController {
    store: RegionStore,
    editor: RegionEditor,
}

impl EditorController {
    pub fn open(store: RegionStore) -> Self {
        let editor = RegionEditor::new(store.load());
        Self { store, editor }
    }

    pub fn editor(&self) -> &RegionEditor {
        &self.editor
    }

    pub fn handle_click(&mut self, click: &MouseClick) {
        if self.editor.click(click) {
            self.persist();
        }
    }

    pub fn handle_key(&mut self, key: EditKey) {
        if self.editor.apply_key(key) {
            self.persist();
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.editor.regions()) {
            log::error!("Failed to save regions to {}: {e:#}", self.store.path().display());
        }
    }
}
