use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Session: range delete on expiration during sweeps
        manager
            .create_index(
                Index::create()
                    .name("idx_session_expiration")
                    .table(Session::Table)
                    .col(Session::Expiration)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_session_expiration").table(Session::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Session { Table, Expiration }
