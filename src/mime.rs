//! Content-Type lookup by filename extension.

/// Type used when the extension is missing or unknown.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Types served for common web and office files.
static CONTENT_TYPES: &[(&str, &str)] = &[
    // Web
    ("html", "text/html; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("css", "text/css; charset=utf-8"),
    ("js", "application/javascript; charset=utf-8"),
    ("mjs", "application/javascript; charset=utf-8"),
    ("json", "application/json"),
    ("txt", "text/plain; charset=utf-8"),
    ("csv", "text/csv; charset=utf-8"),
    ("wasm", "application/wasm"),
    // Images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    // Media
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    // Archives and documents
    ("zip", "application/zip"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
];

/// Content-Type for `filename`, keyed by the lowercased text after its last `.`.
///
/// Extensions missing from the table above fall back to `mime_guess`; anything
/// neither knows is served as `application/octet-stream`.
pub fn content_type(filename: &str) -> String {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return OCTET_STREAM.to_string();
    };
    if ext.is_empty() {
        return OCTET_STREAM.to_string();
    }

    let ext = ext.to_ascii_lowercase();
    if let Some((_, mime)) = CONTENT_TYPES.iter().find(|(e, _)| *e == ext) {
        return (*mime).to_string();
    }

    mime_guess::from_ext(&ext)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}
