pub mod cloudinary;
pub mod geocoding;

/// Image formats accepted for upload; anything else is refused (or, for
/// review attachments, silently skipped).
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Extension-based allow-list check, case-insensitive, matching on the
/// text after the last dot.
pub fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_listed_extensions_case_insensitively() {
        for name in ["a.png", "b.JPG", "c.jpeg", "d.gif", "e.WebP"] {
            assert!(has_allowed_extension(name), "{name}");
        }
    }

    #[test]
    fn rejects_unlisted_or_missing_extensions() {
        for name in ["a.pdf", "b.exe", "noext", "", "archive.tar.gz"] {
            assert!(!has_allowed_extension(name), "{name}");
        }
    }
}
