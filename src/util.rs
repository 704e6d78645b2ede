use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strip the scheme and trailing slash from a URL for compact display.
pub fn host_name(url: &str) -> &str {
    let trimmed = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    trimmed.strip_suffix('/').unwrap_or(trimmed)
}

/// Hash a string into a pair in [-1, 1]^2. Used to scatter initial node
/// positions so identical inputs never start stacked on top of each other.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
