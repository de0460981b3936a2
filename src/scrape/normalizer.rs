//! Image URL normalization
//!
//! The extracted image is resolved against the URL the caller asked for, not
//! wherever redirects ended up, so a root-relative `/images/a.jpg` always
//! lands on the requested site's origin.

use tracing::debug;
use url::Url;

/// Make `image` absolute, or fall back to `placeholder` when nothing was found.
///
/// Absolute values are returned verbatim. A value that cannot be resolved
/// (which only happens for pathological input) is treated as missing.
pub fn normalize_image(requested: &Url, image: Option<&str>, placeholder: &str) -> String {
    let Some(image) = image.filter(|image| !image.trim().is_empty()) else {
        return placeholder.to_string();
    };

    if Url::parse(image).is_ok() {
        return image.to_string();
    }

    // Root-relative paths (and the rarer document-relative ones) take the
    // requested URL's scheme, host and port
    match requested.join(image) {
        Ok(resolved) => {
            debug!("Resolved image {} to {}", image, resolved);
            resolved.to_string()
        }
        Err(e) => {
            debug!("Could not resolve image {}: {}", image, e);
            placeholder.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::config::NO_IMAGE_PLACEHOLDER;

    fn requested() -> Url {
        Url::parse("https://shop.example/product/1").unwrap()
    }

    #[test]
    fn test_root_relative_uses_origin() {
        assert_eq!(
            normalize_image(&requested(), Some("/images/shirt.jpg"), NO_IMAGE_PLACEHOLDER),
            "https://shop.example/images/shirt.jpg"
        );
    }

    #[test]
    fn test_port_is_kept() {
        let requested = Url::parse("http://127.0.0.1:8080/p/9?ref=x").unwrap();
        assert_eq!(
            normalize_image(&requested, Some("/m.jpg"), NO_IMAGE_PLACEHOLDER),
            "http://127.0.0.1:8080/m.jpg"
        );
    }

    #[test]
    fn test_absolute_is_unchanged() {
        assert_eq!(
            normalize_image(&requested(), Some("https://cdn.example/a.png"), NO_IMAGE_PLACEHOLDER),
            "https://cdn.example/a.png"
        );
        // Left exactly as written, no re-serialization
        assert_eq!(
            normalize_image(&requested(), Some("HTTPS://CDN.example/a b.png"), NO_IMAGE_PLACEHOLDER),
            "HTTPS://CDN.example/a b.png"
        );
    }

    #[test]
    fn test_protocol_relative_takes_scheme() {
        assert_eq!(
            normalize_image(&requested(), Some("//cdn.example/a.png"), NO_IMAGE_PLACEHOLDER),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn test_document_relative_is_resolved() {
        assert_eq!(
            normalize_image(&requested(), Some("thumb.png"), NO_IMAGE_PLACEHOLDER),
            "https://shop.example/product/thumb.png"
        );
    }

    #[test]
    fn test_missing_image_uses_placeholder() {
        assert_eq!(
            normalize_image(&requested(), None, NO_IMAGE_PLACEHOLDER),
            NO_IMAGE_PLACEHOLDER
        );
        assert_eq!(
            normalize_image(&requested(), Some(""), NO_IMAGE_PLACEHOLDER),
            NO_IMAGE_PLACEHOLDER
        );
    }
}
