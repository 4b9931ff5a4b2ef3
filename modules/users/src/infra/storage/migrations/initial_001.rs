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
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::Nickname).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Country).string_len(2).not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::FirstNameLower).string().not_null())
                    .col(ColumnDef::new(Users::LastNameLower).string().not_null())
                    .col(ColumnDef::new(Users::NicknameLower).string().not_null())
                    .col(ColumnDef::new(Users::EmailLower).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Backs the default listing order
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_created_at_email")
                    .table(Users::Table)
                    .col(Users::CreatedAt)
                    .col(Users::Email)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Nickname,
    Email,
    Country,
    Password,
    CreatedAt,
    UpdatedAt,
    FirstNameLower,
    LastNameLower,
    NicknameLower,
    EmailLower,
}
