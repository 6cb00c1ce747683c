use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string_len(100).null())
                    .col(ColumnDef::new(Users::Email).string_len(100).null())
                    .col(ColumnDef::new(Users::Role).string_len(20).not_null().default("ADMIN"))
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Categories::Type).string_len(20).not_null())
                    .col(ColumnDef::new(Categories::Description).text().null())
                    .col(ColumnDef::new(Categories::Icon).string_len(50).null())
                    .col(ColumnDef::new(Categories::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Categories::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_categories_name_type")
                    .table(Categories::Table)
                    .col(Categories::Name)
                    .col(Categories::Type)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Locations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Locations::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Locations::Address).text().not_null())
                    .col(ColumnDef::new(Locations::Description).text().null())
                    .col(ColumnDef::new(Locations::ImageUrl).string_len(500).null())
                    .col(ColumnDef::new(Locations::Latitude).double().null())
                    .col(ColumnDef::new(Locations::Longitude).double().null())
                    .col(ColumnDef::new(Locations::Phone).string_len(20).null())
                    .col(ColumnDef::new(Locations::Email).string_len(100).null())
                    .col(ColumnDef::new(Locations::Website).string_len(200).null())
                    .col(ColumnDef::new(Locations::OpeningHours).text().null())
                    .col(ColumnDef::new(Locations::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Locations::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Locations::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Locations::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_locations_category_id")
                            .from(Locations::Table, Locations::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_locations_category_id")
                    .table(Locations::Table)
                    .col(Locations::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::Title).string_len(300).not_null())
                    .col(ColumnDef::new(Posts::Content).text().not_null())
                    .col(ColumnDef::new(Posts::Summary).text().null())
                    .col(ColumnDef::new(Posts::ThumbnailUrl).string_len(500).null())
                    .col(ColumnDef::new(Posts::Author).string_len(100).not_null())
                    .col(ColumnDef::new(Posts::IsFeatured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Posts::IsUrgent).boolean().not_null().default(false))
                    .col(ColumnDef::new(Posts::ViewCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Posts::PublishedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Posts::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Posts::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Posts::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_category_id")
                            .from(Posts::Table, Posts::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_category_id")
                    .table(Posts::Table)
                    .col(Posts::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_published_at")
                    .table(Posts::Table)
                    .col(Posts::PublishedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    FullName,
    Email,
    Role,
    IsActive,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Type,
    Description,
    Icon,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    Name,
    Address,
    Description,
    ImageUrl,
    Latitude,
    Longitude,
    Phone,
    Email,
    Website,
    OpeningHours,
    IsActive,
    CategoryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Content,
    Summary,
    ThumbnailUrl,
    Author,
    IsFeatured,
    IsUrgent,
    ViewCount,
    PublishedAt,
    CategoryId,
    CreatedAt,
    UpdatedAt,
}
