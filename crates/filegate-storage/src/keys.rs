//! Storage key derivation.
//!
//! The physical object name inside the share backend is derived from the
//! logical file identifier and the optional extension. Upload and download
//! must both go through [`resolve_storage_key`]; a divergence between the
//! two paths makes objects unfindable.

/// Derive the storage key for a file.
///
/// With no extension (or an empty one) the key is the identifier itself;
/// otherwise the extension is appended after a dot. Pure and total.
pub fn resolve_storage_key(identifier: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => format!("{identifier}.{ext}"),
        _ => identifier.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_extension_after_dot() {
        assert_eq!(resolve_storage_key("abc123", Some("pdf")), "abc123.pdf");
    }

    #[test]
    fn empty_or_absent_extension_yields_identifier() {
        assert_eq!(resolve_storage_key("abc123", Some("")), "abc123");
        assert_eq!(resolve_storage_key("abc123", None), "abc123");
    }

    #[test]
    fn resolution_is_idempotent() {
        let first = resolve_storage_key("55f9f720", Some("docx"));
        let second = resolve_storage_key("55f9f720", Some("docx"));
        assert_eq!(first, second);
    }

    #[test]
    fn upload_and_download_derive_the_same_key() {
        // The same (identifier, extension) pair must resolve identically no
        // matter which path computes it.
        for (id, ext) in [
            ("a", Some("pdf")),
            ("a", None),
            ("55f9f720-9015-4a2c", Some("tar.gz")),
            ("x", Some("")),
        ] {
            assert_eq!(resolve_storage_key(id, ext), resolve_storage_key(id, ext));
        }
    }
}
