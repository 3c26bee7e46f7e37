//! Uploaded-asset reference resolution.
//!
//! Payment proofs and class certificates were stored through several
//! generations of upload handling, so a single record field may hold a bare
//! filename, a path relative to the public asset folder, an absolute Windows
//! path from a desktop upload tool, an external URL, an inline data URI, or a
//! JSON-wrapped variant of any of those. [`resolve_asset_url`] turns every one
//! of them into something directly fetchable: a root-relative path, an
//! absolute URL, or a data URI.
//!
//! Resolution is best-effort and never fails; an unrecognisable value falls
//! through the steps mostly unchanged and the caller's render-error handling
//! takes over. Resolving an already-resolved value returns it unchanged.
//!
//! Records written by this system do not rely on the heuristics: they classify
//! the reference once, at write time, into the [`AssetRef`] tagged union.

use serde::{Deserialize, Serialize};

/// Public folder for uploaded payment proofs.
pub const PAYMENT_PROOFS_DIR: &str = "payment-proofs";

/// Public folder for issued class certificates.
pub const CERTIFICATES_DIR: &str = "certificates";

/// Folder markers recognised inside stored paths.
const KNOWN_ASSET_DIRS: &[&str] = &[PAYMENT_PROOFS_DIR, CERTIFICATES_DIR];

/// Resolves a stored payment-proof reference into a fetchable URL.
///
/// Bare filenames are placed under [`PAYMENT_PROOFS_DIR`]; see the module
/// documentation for the shapes handled.
///
/// # Examples
///
/// ```
/// use kedai_rules::asset::resolve_asset_url;
///
/// assert_eq!(resolve_asset_url("a.jpg"), "/payment-proofs/a.jpg");
/// assert_eq!(resolve_asset_url("/payment-proofs/a.jpg"), "/payment-proofs/a.jpg");
/// assert_eq!(resolve_asset_url("https://example.com/x.png"), "https://example.com/x.png");
/// ```
pub fn resolve_asset_url(reference: &str) -> String {
    resolve_in(reference, PAYMENT_PROOFS_DIR)
}

/// Resolves a stored certificate reference into a fetchable URL.
///
/// Identical to [`resolve_asset_url`] except that bare filenames are placed
/// under [`CERTIFICATES_DIR`].
pub fn resolve_certificate_url(reference: &str) -> String {
    resolve_in(reference, CERTIFICATES_DIR)
}

/// Returns true when the reference should be rendered as a PDF.
///
/// Checks the raw stored reference and the resolved URL; misclassification
/// fails open to an image render, which the caller recovers from via its
/// load-error handling.
pub fn is_pdf_reference(raw: &str, resolved: &str) -> bool {
    raw.trim().to_ascii_lowercase().ends_with(".pdf")
        || resolved.starts_with("data:application/pdf")
        || resolved.to_ascii_lowercase().ends_with(".pdf")
}

/// A stored asset reference, classified once at write time.
///
/// Legacy records require the heuristic resolver on every read; records
/// written by this system store one of these instead, so the stored shape is
/// explicit and resolution never has to guess again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AssetRef {
    /// Absolute external URL, fetched as-is.
    Url { url: String },
    /// Inline `data:` URI, rendered as-is.
    DataUri { uri: String },
    /// Root-relative path under the public asset tree.
    RelativePath { path: String },
    /// Bare filename; `path` is the resolved location under its asset folder.
    Filename { name: String, path: String },
}

impl AssetRef {
    /// Classifies a raw payment-proof reference.
    ///
    /// Returns `None` for blank input so callers can store the absence of an
    /// upload rather than an empty reference.
    pub fn from_raw(reference: &str) -> Option<Self> {
        Self::from_raw_in(reference, PAYMENT_PROOFS_DIR)
    }

    /// Classifies a raw certificate reference.
    pub fn from_certificate(reference: &str) -> Option<Self> {
        Self::from_raw_in(reference, CERTIFICATES_DIR)
    }

    fn from_raw_in(reference: &str, folder: &str) -> Option<Self> {
        let cleaned = preclean(reference);
        if cleaned.is_empty() {
            return None;
        }

        let resolved = resolve_in(reference, folder);
        if resolved.starts_with("data:") {
            Some(AssetRef::DataUri { uri: resolved })
        } else if is_external_url(&resolved) {
            Some(AssetRef::Url { url: resolved })
        } else if !cleaned.contains('/') {
            Some(AssetRef::Filename {
                name: cleaned,
                path: resolved,
            })
        } else {
            Some(AssetRef::RelativePath { path: resolved })
        }
    }

    /// The fetchable URL for this reference.
    pub fn as_url(&self) -> &str {
        match self {
            AssetRef::Url { url } => url,
            AssetRef::DataUri { uri } => uri,
            AssetRef::RelativePath { path } => path,
            AssetRef::Filename { path, .. } => path,
        }
    }

    /// Whether this reference should be rendered as a PDF.
    pub fn is_pdf(&self) -> bool {
        let raw = match self {
            AssetRef::Filename { name, .. } => name,
            other => other.as_url(),
        };
        is_pdf_reference(raw, self.as_url())
    }
}

fn is_external_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Case-insensitive substring search; needles are ASCII folder markers, so
/// lowercasing preserves byte offsets.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

/// Steps 1-4 of resolution: trim, unwrap one layer of JSON encoding, strip one
/// layer of surrounding quotes, convert backslashes.
fn preclean(reference: &str) -> String {
    let mut value = reference.trim().to_string();

    if let Some(unwrapped) = unwrap_json(&value) {
        value = unwrapped.trim().to_string();
    }

    value = strip_quotes(&value).trim().to_string();
    value.replace('\\', "/")
}

/// Unwraps a value that was accidentally stored JSON-encoded.
///
/// Handles a JSON string, an array whose first element is a string, and an
/// object carrying the value under `url`, `path` or `file`. Anything that
/// fails to parse is kept as-is.
fn unwrap_json(value: &str) -> Option<String> {
    let wrapped = (value.starts_with('{') && value.ends_with('}'))
        || (value.starts_with('[') && value.ends_with(']'))
        || (value.starts_with('"') && value.ends_with('"'));
    if !wrapped {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(value).ok()? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => match items.first() {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => None,
        },
        serde_json::Value::Object(map) => ["url", "path", "file"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()).map(str::to_owned)),
        _ => None,
    }
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn is_windows_drive_path(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

fn resolve_in(reference: &str, folder: &str) -> String {
    let mut value = preclean(reference);
    if value.is_empty() {
        return value;
    }

    // Absolute Windows path: cut down to the public tree if we can find it,
    // otherwise hand the value back untouched and let render-error handling
    // deal with it.
    if is_windows_drive_path(&value) {
        let cut = find_ci(&value, "public/")
            .into_iter()
            .chain(
                KNOWN_ASSET_DIRS
                    .iter()
                    .filter_map(|dir| find_ci(&value, &format!("{dir}/"))),
            )
            .min();
        match cut {
            Some(idx) => value = value[idx..].to_string(),
            None => return value,
        }
    }

    // Already fetchable.
    if value.starts_with("data:") || is_external_url(&value) {
        return value;
    }

    // Stored base64 payload that lost its data-URI prefix.
    if let Some((prefix, payload)) = value.split_once(";base64,") {
        let mime = if prefix.contains('/') { prefix } else { "image/jpeg" };
        return format!("data:{mime};base64,{payload}");
    }

    // Already root-relative.
    if value.starts_with('/') {
        return value;
    }

    while let Some(rest) = value.strip_prefix("./") {
        value = rest.to_string();
    }
    while let Some(rest) = value.strip_prefix("../") {
        value = rest.to_string();
    }
    if find_ci(&value, "public/") == Some(0) {
        value = value["public/".len()..].to_string();
    }

    // Anything before a known asset folder is upload-tool noise.
    if let Some(idx) = KNOWN_ASSET_DIRS
        .iter()
        .filter_map(|dir| find_ci(&value, &format!("{dir}/")))
        .min()
    {
        value = value[idx..].to_string();
    }

    // Bare filename: place it in its asset folder.
    if !value.contains('/') {
        value = format!("{folder}/{value}");
    }

    if !value.starts_with('/') {
        value = format!("/{value}");
    }

    value
}
