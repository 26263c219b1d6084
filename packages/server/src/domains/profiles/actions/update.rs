//! Profile mutation actions: partial update, interest replacement, picture
//! selection.

use sqlx::PgPool;
use tracing::info;

use crate::common::{AppError, AppResult, FieldErrors, PictureId, UserId};
use crate::domains::profiles::models::{
    Interest, InterestKind, ProfilePatch, ProfilePicture, UserDetail, user_detail::MAX_INTERESTS,
};
use crate::kernel::ServerDeps;

/// Apply a tri-state partial update to the caller's profile.
pub async fn update_profile(
    user_id: UserId,
    patch: ProfilePatch,
    deps: &ServerDeps,
) -> AppResult<UserDetail> {
    // Non-nullable columns can be overwritten but never cleared.
    if patch.gender.is_set() && patch.gender.as_option().is_none() {
        return Err(AppError::validation_field("gender cannot be cleared", "gender"));
    }
    if patch.location.is_set() && patch.location.as_option().is_none() {
        return Err(AppError::validation_field(
            "location cannot be cleared",
            "location",
        ));
    }
    if let Some(geo) = patch.location.as_option() {
        geo.coords()?;
    }

    let detail = UserDetail::apply_patch(user_id, &patch, &deps.db_pool).await?;
    info!(user_id = %user_id, version = detail.version, "Profile updated");
    Ok(detail)
}

/// Replace one of the caller's interest collections.
///
/// # Errors
///
/// `UnprocessableEntity` with field-path-keyed sub-errors when values are
/// blank, duplicated, or exceed the per-kind limit.
pub async fn replace_interests(
    user_id: UserId,
    kind: InterestKind,
    values: Vec<String>,
    deps: &ServerDeps,
) -> AppResult<Vec<Interest>> {
    let fields = validate_interest_values(kind, &values);
    if !fields.is_empty() {
        return Err(AppError::unprocessable("invalid interest values", fields));
    }

    let pool = &deps.db_pool;
    UserDetail::find_by_user_id(user_id, pool)
        .await?
        .ok_or(AppError::NotFound("user detail"))?;

    let mut tx = pool.begin().await?;
    let rows = Interest::replace_for_user(kind, user_id, &values, &mut *tx).await?;
    tx.commit().await?;

    info!(user_id = %user_id, kind = %kind, count = rows.len(), "Interests replaced");
    Ok(rows)
}

/// Pure validation: blank/duplicate values per index, plus the size cap.
fn validate_interest_values(kind: InterestKind, values: &[String]) -> FieldErrors {
    let mut fields = FieldErrors::new();

    if values.len() > MAX_INTERESTS {
        fields
            .entry(kind.table().to_string())
            .or_default()
            .push(format!("at most {MAX_INTERESTS} values are allowed"));
    }

    for (i, value) in values.iter().enumerate() {
        let path = format!("{}.{}", kind.table(), i);
        if value.trim().is_empty() {
            fields
                .entry(path.clone())
                .or_default()
                .push("value must not be blank".to_string());
        }
        if values[..i].contains(value) {
            fields
                .entry(path)
                .or_default()
                .push("every value must be unique".to_string());
        }
    }

    fields
}

/// Mark one of the caller's pictures as selected.
///
/// Clears any previous selection in the same transaction, holding the
/// at-most-one-selected invariant.
pub async fn select_picture(
    user_id: UserId,
    picture_id: PictureId,
    deps: &ServerDeps,
) -> AppResult<ProfilePicture> {
    let pool: &PgPool = &deps.db_pool;
    let mut tx = pool.begin().await?;

    let picture = ProfilePicture::find_by_id_for_update(picture_id, &mut *tx)
        .await?
        .ok_or(AppError::NotFound("profile picture"))?;

    if picture.user_id != user_id {
        let mut fields = FieldErrors::new();
        fields.insert(
            "picture_id".to_string(),
            vec!["picture does not belong to the caller".to_string()],
        );
        return Err(AppError::unprocessable("picture not owned by caller", fields));
    }

    ProfilePicture::clear_selected(user_id, picture_id, &mut *tx).await?;
    let selected = ProfilePicture::set_selected(picture_id, &mut *tx).await?;
    tx.commit().await?;

    info!(user_id = %user_id, picture_id = %picture_id, "Profile picture selected");
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_values_flagged_per_index() {
        let values = vec!["tennis".to_string(), "tennis".to_string()];
        let fields = validate_interest_values(InterestKind::Hobbies, &values);
        assert_eq!(
            fields.get("hobbies.1").unwrap(),
            &vec!["every value must be unique".to_string()]
        );
        assert!(!fields.contains_key("hobbies.0"));
    }

    #[test]
    fn test_too_many_values_flagged_on_collection() {
        let values: Vec<String> = (0..6).map(|i| format!("v{i}")).collect();
        let fields = validate_interest_values(InterestKind::Sports, &values);
        assert!(fields.get("sports").unwrap()[0].contains("at most"));
    }

    #[test]
    fn test_blank_value_flagged() {
        let values = vec!["  ".to_string()];
        let fields = validate_interest_values(InterestKind::Traveling, &values);
        assert_eq!(
            fields.get("traveling.0").unwrap(),
            &vec!["value must not be blank".to_string()]
        );
    }

    #[test]
    fn test_valid_values_pass() {
        let values = vec!["hiking".to_string(), "baking".to_string()];
        assert!(validate_interest_values(InterestKind::Hobbies, &values).is_empty());
    }
}
