//! Pre-flight checks on an [`ExpandedRequest`].

use crate::error::ValidationError;
use crate::inventory::Inventory;
use crate::request::ExpandedRequest;
use crate::types::TargetKind;

/// Check `request` against `inventory`, stopping at the first violation.
///
/// Order: extensions, skins, servers, language filter.
pub fn validate(request: &ExpandedRequest, inventory: &Inventory) -> Result<(), ValidationError> {
    if let Some(unknown) = request
        .extensions()
        .iter()
        .find(|ext| !inventory.has_extension(ext))
    {
        return Err(ValidationError::UnknownTarget {
            kind: TargetKind::Extension,
            name: unknown.to_string(),
        });
    }

    if let Some(unknown) = request.skins().iter().find(|skin| !inventory.has_skin(skin)) {
        return Err(ValidationError::UnknownTarget {
            kind: TargetKind::Skin,
            name: unknown.to_string(),
        });
    }

    if request.servers().is_empty() {
        return Err(ValidationError::NoServersSpecified);
    }

    if !request.localization_languages().is_empty() && !request.localization() {
        return Err(ValidationError::LanguageWithoutLocalization);
    }

    Ok(())
}
