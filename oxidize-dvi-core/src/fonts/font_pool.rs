//! Reference-counted font pool shared by all open DVI documents

use super::{FontHandle, FontRequest, FontResourceManager, MetafontMode, TexFont};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Fonts are shared when name and rendered size agree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    name: String,
    size_bits: u64,
}

impl FontKey {
    fn new(name: &str, size: f64) -> Self {
        Self {
            name: name.to_string(),
            size_bits: size.to_bits(),
        }
    }
}

#[derive(Debug)]
struct PoolEntry {
    font: FontHandle,
    /// Registrations not yet released by `file_closed`
    users: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    fonts: HashMap<FontKey, PoolEntry>,
    mode: MetafontMode,
    render_resolution: Option<f64>,
}

/// Thread-safe font pool
///
/// Closing a document only drops its references; fonts without users are
/// removed the next time a document finishes registering its fonts (or on
/// [`FontPool::collect_garbage`]), so a document reopened in between finds
/// them still loaded.
#[derive(Debug, Clone, Default)]
pub struct FontPool {
    state: Arc<RwLock<PoolState>>,
}

impl FontPool {
    /// Create an empty pool using the default Metafont mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `mode` for font sizes
    pub fn with_mode(self, mode: MetafontMode) -> Self {
        self.set_mode(mode);
        self
    }

    /// Render at `dpi` instead of the Metafont mode's resolution
    pub fn with_render_resolution(self, dpi: f64) -> Self {
        self.write().render_resolution = Some(dpi);
        self
    }

    pub fn set_mode(&self, mode: MetafontMode) {
        self.write().mode = mode;
    }

    pub fn mode(&self) -> MetafontMode {
        self.read().mode
    }

    /// Whether a font with this name and size is loaded
    pub fn contains(&self, name: &str, size: f64) -> bool {
        self.read().fonts.contains_key(&FontKey::new(name, size))
    }

    /// Number of live registrations of a font
    pub fn users(&self, name: &str, size: f64) -> usize {
        self.read()
            .fonts
            .get(&FontKey::new(name, size))
            .map_or(0, |entry| entry.users)
    }

    /// Names of all loaded fonts
    pub fn font_names(&self) -> Vec<String> {
        self.read()
            .fonts
            .keys()
            .map(|key| key.name.clone())
            .collect()
    }

    /// Drop every font nobody references any more
    pub fn collect_garbage(&self) -> usize {
        let mut state = self.write();
        let before = state.fonts.len();
        state.fonts.retain(|_, entry| entry.users > 0);
        let removed = before - state.fonts.len();
        if removed > 0 {
            tracing::debug!("released {removed} unused font(s)");
        }
        removed
    }

    /// Remove all fonts regardless of users
    pub fn clear(&self) {
        self.write().fonts.clear();
    }

    pub fn len(&self) -> usize {
        self.read().fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().fonts.is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, PoolState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PoolState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FontResourceManager for FontPool {
    fn register(&self, request: FontRequest) -> FontHandle {
        let key = FontKey::new(&request.name, request.effective_size);
        let mut state = self.write();
        let entry = state.fonts.entry(key).or_insert_with(|| {
            tracing::debug!(
                "loading font \"{}\" at {:.2} dots",
                request.name,
                request.effective_size
            );
            PoolEntry {
                font: Arc::new(TexFont::from(request)),
                users: 0,
            }
        });
        entry.users += 1;
        Arc::clone(&entry.font)
    }

    fn registration_complete(&self) {
        self.collect_garbage();
    }

    fn file_closed(&self, fonts: &[FontHandle]) {
        let mut state = self.write();
        for font in fonts {
            let key = FontKey::new(&font.name, font.effective_size);
            if let Some(entry) = state.fonts.get_mut(&key) {
                if Arc::ptr_eq(&entry.font, font) {
                    entry.users = entry.users.saturating_sub(1);
                }
            }
        }
    }

    fn render_resolution(&self) -> f64 {
        let state = self.read();
        state
            .render_resolution
            .unwrap_or_else(|| state.mode.resolution())
    }

    fn mode_resolution(&self) -> f64 {
        self.read().mode.resolution()
    }
}
