//! Schema migrations for the category catalog.
//!
//! Run with `Migrator::up(&db, None)` before serving requests. The second
//! migration seeds the `master` root every catalog starts with.

use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use sea_orm_migration::prelude::*;
use serde_json::json;

use crate::entity::category;

/// Code of the root category present in every catalog
pub const MASTER_CATEGORY_CODE: &str = "master";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(CreateCategoryTable),
            Box::new(SeedMasterCategory),
        ]
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Code,
    Parent,
    Labels,
}

pub struct CreateCategoryTable;

impl MigrationName for CreateCategoryTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_categories_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCategoryTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Categories::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Categories::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Categories::Code)
                    .string_len(100)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Categories::Parent).string_len(100).null())
            .col(ColumnDef::new(Categories::Labels).json().not_null())
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_categories_parent")
                    .table(Categories::Table)
                    .col(Categories::Parent)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

pub struct SeedMasterCategory;

impl MigrationName for SeedMasterCategory {
    fn name(&self) -> &'static str {
        "m20240101_000002_seed_master_category"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for SeedMasterCategory {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        category::ActiveModel {
            code: Set(MASTER_CATEGORY_CODE.to_string()),
            parent: Set(None),
            labels: Set(json!({ "en_US": "Master catalog" })),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Categories::Table)
            .and_where(Expr::col(Categories::Code).eq(MASTER_CATEGORY_CODE))
            .to_owned();
        manager.exec_stmt(delete).await
    }
}
