use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use url::Url;

/// Raster extensions accepted as-is; anything else gets the synthetic
/// fallback name. svg is deliberately excluded (the optimizer is raster-only).
const ACCEPTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

const FALLBACK_EXTENSION: &str = "jpg";

/// Serialized filename reservation for one destination directory.
///
/// Deriving a name and checking the directory for collisions is a
/// check-then-act sequence; with several download workers running it, two
/// tasks could both observe a name as free and both write to it. Every
/// reservation therefore runs under one lock and is remembered for the life
/// of the registry, so within a batch no two tasks ever claim the same
/// output filename. Names already on disk from earlier runs are skipped the
/// same way, by probing the directory inside the lock.
pub struct NameRegistry {
    dir: PathBuf,
    claimed: Mutex<HashSet<String>>,
}

impl NameRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserve a unique filename for one image URL.
    ///
    /// Starts from the URL's last path segment (or `image_NNNN.jpg` when that
    /// is absent or not a recognized raster name) and appends `_1`, `_2`, …
    /// before the extension until a name is found that neither exists in the
    /// directory nor was claimed earlier in this batch.
    pub fn reserve(&self, image_url: &str, ordinal: usize) -> String {
        let candidate = candidate_name(image_url, ordinal);

        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        let mut name = candidate.clone();
        let mut counter = 1;
        while claimed.contains(&name) || self.dir.join(&name).exists() {
            name = with_suffix(&candidate, counter);
            counter += 1;
        }
        claimed.insert(name.clone());
        name
    }
}

/// Derive the initial filename candidate for an image URL.
fn candidate_name(image_url: &str, ordinal: usize) -> String {
    let segment = Url::parse(image_url).ok().and_then(|url| {
        url.path_segments()
            .and_then(|segments| segments.last().map(str::to_string))
    });

    match segment {
        Some(name) if !name.is_empty() && has_accepted_extension(&name) => name,
        _ => format!("image_{ordinal:04}.{FALLBACK_EXTENSION}"),
    }
}

fn has_accepted_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// Insert a numeric suffix before the extension: `a.png` -> `a_2.png`.
fn with_suffix(name: &str, counter: u32) -> String {
    let path = Path::new(name);
    match (path.file_stem().and_then(|s| s.to_str()), path.extension().and_then(|e| e.to_str()))
    {
        (Some(stem), Some(ext)) => format!("{stem}_{counter}.{ext}"),
        _ => format!("{name}_{counter}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn candidate_uses_last_path_segment() {
        assert_eq!(candidate_name("http://a.test/img/photo.png", 0), "photo.png");
        assert_eq!(candidate_name("http://a.test/photo.JPG?v=2", 3), "photo.JPG");
    }

    #[test]
    fn candidate_falls_back_for_missing_or_odd_names() {
        assert_eq!(candidate_name("http://a.test/", 0), "image_0000.jpg");
        assert_eq!(candidate_name("http://a.test/gallery", 7), "image_0007.jpg");
        assert_eq!(candidate_name("http://a.test/pic.svg", 12), "image_0012.jpg");
        assert_eq!(candidate_name("http://a.test/.png", 2), "image_0002.jpg");
        assert_eq!(candidate_name("not a url", 41), "image_0041.jpg");
    }

    #[test]
    fn suffix_goes_before_the_extension() {
        assert_eq!(with_suffix("a.png", 1), "a_1.png");
        assert_eq!(with_suffix("archive.tar.png", 2), "archive.tar_2.png");
    }

    #[test]
    fn reserve_skips_names_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("photo.png"), b"x").unwrap();
        std::fs::write(dir.path().join("photo_1.png"), b"x").unwrap();

        let registry = NameRegistry::new(dir.path());
        assert_eq!(registry.reserve("http://a.test/photo.png", 0), "photo_2.png");
    }

    #[test]
    fn reserve_skips_names_claimed_in_this_batch() {
        let dir = tempfile::tempdir().unwrap();
        let registry = NameRegistry::new(dir.path());

        assert_eq!(registry.reserve("http://a.test/photo.png", 0), "photo.png");
        assert_eq!(registry.reserve("http://b.test/photo.png", 1), "photo_1.png");
        assert_eq!(registry.reserve("http://c.test/photo.png", 2), "photo_2.png");
    }

    // The race-freedom property: many workers resolving the synthetic
    // fallback concurrently must produce a gapless, duplicate-free set.
    #[test]
    fn concurrent_fallback_reservations_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(NameRegistry::new(dir.path()));

        let handles: Vec<_> = (0..50)
            .map(|ordinal| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.reserve("http://a.test/gallery", ordinal))
            })
            .collect();

        let names: HashSet<String> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let expected: HashSet<String> =
            (0..50).map(|i| format!("image_{i:04}.jpg")).collect();
        assert_eq!(names, expected);
    }
}
