//! Avatar resolution: locate an image reference on disk and inline it as a
//! `data:` URI, falling back to a placeholder payload.

pub mod cache;

pub use cache::{ImageCache, ImageKey};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;

/// One step of the avatar search order
pub trait AvatarLocator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> String;

    /// Path of an existing file for `reference`, if this strategy finds one
    fn locate(&self, reference: &str) -> Option<PathBuf>;
}

/// The reference itself, when it is an absolute path to an existing file
pub struct AbsolutePath;

impl AvatarLocator for AbsolutePath {
    fn name(&self) -> String {
        "absolute path".to_string()
    }

    fn locate(&self, reference: &str) -> Option<PathBuf> {
        let path = Path::new(reference);
        (path.is_absolute() && path.is_file()).then(|| path.to_path_buf())
    }
}

/// The reference joined onto a fixed directory
pub struct SearchDir {
    dir: PathBuf,
}

impl SearchDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AvatarLocator for SearchDir {
    fn name(&self) -> String {
        self.dir.display().to_string()
    }

    fn locate(&self, reference: &str) -> Option<PathBuf> {
        let candidate = self.dir.join(reference);
        candidate.is_file().then_some(candidate)
    }
}

/// Resolves avatar references through an ordered locator chain; first hit wins.
///
/// `resolve` never fails: anything that cannot be located or read becomes
/// the placeholder payload.
pub struct ImageResolver {
    locators: Vec<Box<dyn AvatarLocator>>,
    placeholder: String,
    cache: Option<ImageCache>,
}

impl ImageResolver {
    pub fn new(locators: Vec<Box<dyn AvatarLocator>>, placeholder: impl Into<String>) -> Self {
        Self {
            locators,
            placeholder: placeholder.into(),
            cache: None,
        }
    }

    /// Keep up to `capacity` encoded payloads in memory; 0 disables caching
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then(|| ImageCache::new(capacity));
        self
    }

    /// Search order: absolute path, avatar dir, data dir, project root
    pub fn from_config(config: &Config) -> Self {
        let locators: Vec<Box<dyn AvatarLocator>> = vec![
            Box::new(AbsolutePath),
            Box::new(SearchDir::new(config.avatar_dir())),
            Box::new(SearchDir::new(config.data_dir())),
            Box::new(SearchDir::new(config.root())),
        ];
        Self::new(locators, config.render.placeholder.clone())
            .with_cache(config.render.image_cache_capacity)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn is_placeholder(&self, payload: &str) -> bool {
        payload == self.placeholder
    }

    pub fn cache(&self) -> Option<&ImageCache> {
        self.cache.as_ref()
    }

    /// First existing file for `reference`; `None` for a blank reference
    pub fn locate(&self, reference: &str) -> Option<PathBuf> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        self.locators.iter().find_map(|locator| {
            let found = locator.locate(reference);
            if let Some(ref path) = found {
                log::trace!("Avatar '{}' found via {}: {}", reference, locator.name(), path.display());
            }
            found
        })
    }

    /// Inline payload for `reference`, or the placeholder
    ///
    /// # Arguments
    ///
    /// * `reference` - Absolute path or bare file name from the person table
    ///
    /// # Returns
    ///
    /// A `data:` URI for the first readable match, the placeholder otherwise
    pub fn resolve(&self, reference: &str) -> String {
        match self.locate(reference) {
            Some(path) => self.encode_cached(&path),
            None => {
                if !reference.trim().is_empty() {
                    log::debug!("Avatar not found: {}", reference);
                }
                self.placeholder.clone()
            }
        }
    }

    /// Inline payload for a background image; `None` unless a real file resolves
    pub fn resolve_background(&self, reference: &str) -> Option<String> {
        let payload = self.resolve(reference);
        (!self.is_placeholder(&payload)).then_some(payload)
    }

    fn encode_cached(&self, path: &Path) -> String {
        let key = self.cache.as_ref().and_then(|_| ImageKey::for_file(path));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                return hit;
            }
        }

        match encode_file(path) {
            Ok(payload) => {
                if let (Some(cache), Some(key)) = (&self.cache, key) {
                    cache.put(key, payload.clone());
                }
                payload
            }
            Err(e) => {
                log::warn!("Could not read image {}: {}", path.display(), e);
                self.placeholder.clone()
            }
        }
    }
}

/// MIME type by extension: `.png` is PNG, everything else is treated as JPEG
pub fn mime_for(path: &Path) -> &'static str {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Read a file and encode it as a `data:<mime>;base64,<payload>` URI
pub fn encode_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("data:{};base64,{}", mime_for(path), STANDARD.encode(bytes)))
}

/// `.jpg`/`.jpeg`/`.png` files directly inside `dir`, sorted by path.
/// A missing directory yields an empty list.
pub fn discover_images(dir: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            let extension = p
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_lowercase();
            matches!(extension.as_str(), "jpg" | "jpeg" | "png")
        })
        .collect();
    images.sort();
    images
}
