//! Create properties table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Properties::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Properties::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Properties::Kind).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Properties::Location)
                            .string_len(200)
                            .not_null()
                            .default("Inconnue"),
                    )
                    .col(
                        ColumnDef::new(Properties::Price)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Properties::Price).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Properties::Bedrooms)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(Properties::Bedrooms).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Properties::Bathrooms)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(Properties::Bathrooms).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Properties::Area)
                            .integer()
                            .not_null()
                            .default(50)
                            .check(Expr::col(Properties::Area).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Properties::Rating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Properties::Furnished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::Available)
                            .string_len(50)
                            .not_null()
                            .default("immédiate"),
                    )
                    .col(
                        ColumnDef::new(Properties::ContractDuration)
                            .string_len(20)
                            .not_null()
                            .default("1"),
                    )
                    .col(
                        ColumnDef::new(Properties::CustomContractDuration)
                            .string_len(100)
                            .null(),
                    )
                    .col(ColumnDef::new(Properties::Description).text().null())
                    .col(
                        ColumnDef::new(Properties::Wifi)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::Parking)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::Security)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::PetFriendly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::State)
                            .string_len(20)
                            .not_null()
                            .default("bon"),
                    )
                    .col(
                        ColumnDef::new(Properties::SmokingAllowed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::PartiesAllowed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::PetsAllowed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::DateAdded)
                            .date()
                            .not_null()
                            .default(Expr::current_date()),
                    )
                    .col(
                        ColumnDef::new(Properties::OwnerAdvanceMonths)
                            .integer()
                            .not_null()
                            .default(3)
                            .check(Expr::col(Properties::OwnerAdvanceMonths).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Properties::AgentFeeMonths)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(Properties::AgentFeeMonths).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Properties::ElectricityDeposit)
                            .string_len(200)
                            .null(),
                    )
                    .col(ColumnDef::new(Properties::WaterDeposit).string_len(100).null())
                    .col(ColumnDef::new(Properties::OtherCharges).string_len(100).null())
                    .col(ColumnDef::new(Properties::Video).string_len(255).null())
                    .to_owned(),
            )
            .await?;

        // Listing order: newest first.
        manager
            .create_index(
                Index::create()
                    .name("idx_properties_date_added")
                    .table(Properties::Table)
                    .col(Properties::DateAdded)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
    Title,
    #[sea_orm(iden = "type")]
    Kind,
    Location,
    Price,
    Bedrooms,
    Bathrooms,
    Area,
    Rating,
    Furnished,
    Available,
    ContractDuration,
    CustomContractDuration,
    Description,
    Wifi,
    Parking,
    Security,
    PetFriendly,
    State,
    SmokingAllowed,
    PartiesAllowed,
    PetsAllowed,
    DateAdded,
    OwnerAdvanceMonths,
    AgentFeeMonths,
    ElectricityDeposit,
    WaterDeposit,
    OtherCharges,
    Video,
}
