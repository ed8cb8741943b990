//! Create property_images table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PropertyImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PropertyImages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PropertyImages::PropertyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PropertyImages::Image)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PropertyImages::IsMain)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_images_property")
                            .from(PropertyImages::Table, PropertyImages::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_property_images_property_id")
                    .table(PropertyImages::Table)
                    .col(PropertyImages::PropertyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PropertyImages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PropertyImages {
    Table,
    Id,
    PropertyId,
    Image,
    IsMain,
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
}
