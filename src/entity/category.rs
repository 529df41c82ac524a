use sea_orm::entity::prelude::*;

/// A stored category row.
///
/// `id` only records insertion order; the API identifies categories by `code`.
/// `parent` holds the parent's code, or `NULL` for a tree root.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(nullable)]
    pub parent: Option<String>,
    pub labels: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
