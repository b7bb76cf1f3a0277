//! MIME type resolution for media files.

use std::path::Path;

/// Fallback for unrecognized extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Resolves the `Content-Type` for a media file from its extension.
///
/// The video containers we serve are mapped through a static table so the
/// types match what browsers expect from a `<video>` source; anything else
/// falls through to `mime_guess`, then to `application/octet-stream`.
pub fn mime_for_path(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    if let Some(ext) = extension.as_deref()
        && let Some(mime) = video_mime_type(ext)
    {
        return mime.to_string();
    }

    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// Static extension table for the video containers in the library.
fn video_mime_type(extension: &str) -> Option<&'static str> {
    match extension {
        "mp4" | "m4v" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "ogg" => Some("video/ogg"),
        "avi" => Some("video/x-msvideo"),
        "mov" => Some("video/quicktime"),
        "flv" => Some("video/x-flv"),
        "mkv" => Some("video/x-matroska"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_video_extensions_map_through_static_table() {
        let cases = [
            ("workout.mp4", "video/mp4"),
            ("workout.webm", "video/webm"),
            ("workout.ogg", "video/ogg"),
            ("workout.avi", "video/x-msvideo"),
            ("workout.mov", "video/quicktime"),
            ("workout.flv", "video/x-flv"),
        ];
        for (name, expected) in cases {
            assert_eq!(mime_for_path(Path::new(name)), expected, "for {name}");
        }
    }

    #[test]
    fn extension_case_is_ignored() {
        assert_eq!(mime_for_path(Path::new("Workout.MP4")), "video/mp4");
    }

    #[test]
    fn images_resolve_via_mime_guess() {
        assert_eq!(mime_for_path(Path::new("thumb.jpg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("thumb.png")), "image/png");
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        assert_eq!(mime_for_path(Path::new("video.xyz123")), OCTET_STREAM);
        assert_eq!(mime_for_path(Path::new("no_extension")), OCTET_STREAM);
    }
}
