use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
    ActiveValue::{NotSet, Set},
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    dto::favorites::{
        ADDED_MESSAGE, CheckFavoriteResponse, FavoriteList, FavoriteStatus, REMOVED_MESSAGE,
        ToggleFavoriteRequest, ToggleFavoriteResponse,
    },
    entity::{
        favorites::{self, Column, Entity as Favorites},
        properties::Entity as Properties,
    },
    error::{AppError, AppResult},
    media::MediaUrls,
    middleware::auth::AuthUser,
    models::{FavoriteRecord, PropertyRecord},
    response::{ApiResponse, Meta},
    services::property_service::load_images,
    state::AppState,
};

/// Flip the favorite state of a property for the calling user.
///
/// The insert and the fallback delete run in one transaction. The insert is
/// conflict-tolerant on (user_id, property_id), so two concurrent toggles never
/// produce a duplicate row.
pub async fn toggle_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: ToggleFavoriteRequest,
) -> AppResult<ApiResponse<ToggleFavoriteResponse>> {
    let property_id = payload.property_id;
    let txn = state.orm.begin().await?;

    if Properties::find_by_id(property_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let inserted = insert_favorite(&txn, user.user_id, property_id).await?;

    let status = if inserted {
        FavoriteStatus::Added
    } else {
        Favorites::delete_many()
            .filter(Column::UserId.eq(user.user_id))
            .filter(Column::PropertyId.eq(property_id))
            .exec(&txn)
            .await?;
        FavoriteStatus::Removed
    };

    txn.commit().await?;

    tracing::info!(user_id = %user.user_id, property_id, ?status, "favorite toggled");

    let message = match status {
        FavoriteStatus::Added => ADDED_MESSAGE,
        FavoriteStatus::Removed => REMOVED_MESSAGE,
    };
    Ok(ApiResponse::success(
        message,
        ToggleFavoriteResponse {
            property_id,
            status,
            is_favorite: status == FavoriteStatus::Added,
        },
        Some(Meta::empty()),
    ))
}

/// Insert a favorite unless the pair already exists; `true` when a row was written.
///
/// A property deleted after the existence check fails the foreign key and
/// surfaces as `NotFound`.
pub async fn insert_favorite<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    property_id: i64,
) -> AppResult<bool> {
    let result = Favorites::insert(favorites::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        property_id: Set(property_id),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([Column::UserId, Column::PropertyId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await;

    match result {
        Ok(rows) => Ok(rows > 0),
        Err(err) => match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Err(AppError::NotFound),
            _ => Err(err.into()),
        },
    }
}

/// All favorites of the calling user, newest first.
pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
    urls: &MediaUrls,
) -> AppResult<ApiResponse<FavoriteList>> {
    let rows = Favorites::find()
        .filter(Column::UserId.eq(user.user_id))
        .find_also_related(Properties)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(state.orm.as_ref())
        .await?;

    let property_ids: Vec<i64> = rows
        .iter()
        .filter_map(|(_, property)| property.as_ref().map(|p| p.id))
        .collect();
    let mut images = load_images(state.orm.as_ref(), &property_ids).await?;

    let items: Vec<FavoriteRecord> = rows
        .into_iter()
        .filter_map(|(favorite, property)| {
            let property = property?;
            let property_images = images.remove(&property.id).unwrap_or_default();
            Some(FavoriteRecord::from_parts(
                favorite,
                PropertyRecord::from_model(property, property_images, urls),
            ))
        })
        .collect();

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("OK", FavoriteList { items }, Some(meta)))
}

/// Whether the calling user has favorited the property. Unknown ids are simply `false`.
pub async fn check_favorite(
    state: &AppState,
    user: &AuthUser,
    property_id: i64,
) -> AppResult<ApiResponse<CheckFavoriteResponse>> {
    let is_favorite = Favorites::find()
        .filter(Column::UserId.eq(user.user_id))
        .filter(Column::PropertyId.eq(property_id))
        .one(state.orm.as_ref())
        .await?
        .is_some();

    Ok(ApiResponse::success(
        "OK",
        CheckFavoriteResponse { is_favorite },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::properties,
        media::RequestOrigin,
        models::fixtures,
        state::test_support::{member, test_state},
    };
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn favorite(id: i64, user: &AuthUser, property_id: i64) -> favorites::Model {
        favorites::Model {
            id,
            user_id: user.user_id,
            property_id,
            created_at: Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap().into(),
        }
    }

    #[tokio::test]
    async fn first_toggle_adds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::property(7)]])
            .append_exec_results([exec(1)])
            .into_connection();
        let state = test_state(db, false);

        let resp = toggle_favorite(&state, &member(), ToggleFavoriteRequest { property_id: 7 })
            .await
            .unwrap();

        assert_eq!(resp.message, ADDED_MESSAGE);
        let data = resp.data.unwrap();
        assert_eq!(data.status, FavoriteStatus::Added);
        assert!(data.is_favorite);
    }

    #[tokio::test]
    async fn second_toggle_removes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::property(7)]])
            .append_exec_results([exec(0), exec(1)])
            .into_connection();
        let state = test_state(db, false);

        let resp = toggle_favorite(&state, &member(), ToggleFavoriteRequest { property_id: 7 })
            .await
            .unwrap();

        assert_eq!(resp.message, REMOVED_MESSAGE);
        let data = resp.data.unwrap();
        assert_eq!(data.status, FavoriteStatus::Removed);
        assert!(!data.is_favorite);
    }

    #[tokio::test]
    async fn toggle_unknown_property_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<properties::Model>::new()])
            .into_connection();
        let state = test_state(db, false);

        let err = toggle_favorite(&state, &member(), ToggleFavoriteRequest { property_id: 99 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn check_reports_membership() {
        let user = member();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![favorite(1, &user, 7)]])
            .append_query_results([Vec::<favorites::Model>::new()])
            .into_connection();
        let state = test_state(db, false);

        let found = check_favorite(&state, &user, 7).await.unwrap();
        assert!(found.data.unwrap().is_favorite);

        let missing = check_favorite(&state, &user, 8).await.unwrap();
        assert!(!missing.data.unwrap().is_favorite);
    }

    #[tokio::test]
    async fn list_embeds_properties_with_images() {
        let user = member();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                (favorite(2, &user, 8), fixtures::property(8)),
                (favorite(1, &user, 7), fixtures::property(7)),
            ]])
            .append_query_results([vec![fixtures::image(5, 7, true)]])
            .into_connection();
        let state = test_state(db, false);
        let urls = MediaUrls::new(RequestOrigin(None), "/media/");

        let resp = list_favorites(&state, &user, &urls).await.unwrap();
        let meta = resp.meta.unwrap();
        let items = resp.data.unwrap().items;

        assert_eq!(meta.total, Some(2));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 2);
        assert_eq!(items[0].property.id, 8);
        assert!(items[0].property.images.is_empty());
        assert_eq!(items[1].property.images[0].image_url, "/media/properties/images/5.jpg");
    }
}
