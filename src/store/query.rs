use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entity::{CategoryEntity, category::Column};
use crate::filtering::{Pagination, SearchFilter, apply_filters};
use crate::hal::Page;
use crate::models::Category;

/// Fetch one page of categories matching `filter`, in insertion order.
///
/// One extra row is read to know whether a next page exists; the total is
/// only counted when `pagination.with_count` is set.
///
/// # Errors
///
/// Propagates database errors.
pub async fn list_categories<C: ConnectionTrait>(
    db: &C,
    filter: &SearchFilter,
    pagination: &Pagination,
) -> Result<Page<Category>, DbErr> {
    let condition = apply_filters(filter);

    let mut models = CategoryEntity::find()
        .filter(condition.clone())
        .order_by_asc(Column::Id)
        .offset(pagination.offset())
        .limit(pagination.limit + 1)
        .all(db)
        .await?;

    let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
    let has_next = models.len() > limit;
    models.truncate(limit);

    let items_count = if pagination.with_count {
        Some(CategoryEntity::find().filter(condition).count(db).await?)
    } else {
        None
    };

    tracing::debug!(
        page = pagination.page,
        limit = pagination.limit,
        returned = models.len(),
        has_next,
        "Listed categories"
    );

    Ok(Page {
        items: models.into_iter().map(Category::from).collect(),
        has_next,
        items_count,
    })
}
