//! Image and category resolution helpers shared by both reconciler paths.

use colibri_catalog::{CatalogError, CatalogStore, CategoryId, MediaId};
use colibri_feed::RawRecord;

/// Joins the media base URL and a feed filename into the exact URL stored
/// media is matched against.
#[must_use]
pub fn media_url(media_base_url: &str, filename: &str) -> String {
    format!("{}/{}", media_base_url.trim_end_matches('/'), filename)
}

/// Resolves the principal image by exact URL match against stored media.
///
/// A record without an image filename, or a filename with no matching stored
/// media, resolves to `Ok(None)` — only store failures are errors.
pub async fn resolve_principal_image<S: CatalogStore + ?Sized>(
    store: &S,
    media_base_url: &str,
    record: &RawRecord,
) -> Result<Option<MediaId>, CatalogError> {
    let Some(filename) = record.principal_image() else {
        return Ok(None);
    };
    let url = media_url(media_base_url, filename);
    let found = store.find_image_by_url(&url).await?;
    if found.is_none() {
        tracing::debug!(url = %url, "principal image not found in stored media");
    }
    Ok(found)
}

/// Resolves the gallery image list; unmatched filenames are silently dropped.
pub async fn resolve_gallery<S: CatalogStore + ?Sized>(
    store: &S,
    media_base_url: &str,
    record: &RawRecord,
) -> Result<Vec<MediaId>, CatalogError> {
    let mut gallery = Vec::new();
    for filename in record.gallery_files() {
        let url = media_url(media_base_url, filename);
        if let Some(id) = store.find_image_by_url(&url).await? {
            gallery.push(id);
        }
    }
    Ok(gallery)
}

/// Maps the `>`-delimited category breadcrumb to category references,
/// creating missing categories on demand.
///
/// A segment that fails to register is logged and skipped; the others
/// proceed, so the returned list is always the successful subset in
/// breadcrumb order.
pub async fn resolve_categories<S: CatalogStore + ?Sized>(
    store: &S,
    record: &RawRecord,
) -> Vec<CategoryId> {
    let mut ids = Vec::new();
    for segment in record.category_path() {
        match store.ensure_category(segment).await {
            Ok(id) => ids.push(id),
            Err(e) => {
                tracing::error!(
                    category = %segment,
                    error = %e,
                    "failed to register category — skipping segment"
                );
            }
        }
    }
    ids
}
