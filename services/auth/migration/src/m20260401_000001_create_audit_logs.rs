use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLogs::UserEmail).string().not_null())
                    .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                    .col(
                        ColumnDef::new(AuditLogs::Details)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditLogs::Timestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditLogs::Date).string_len(10).not_null())
                    .col(ColumnDef::new(AuditLogs::ClientDescriptor).string())
                    .to_owned(),
            )
            .await?;

        // Newest-first listing.
        manager
            .create_index(
                Index::create()
                    .table(AuditLogs::Table)
                    .col(AuditLogs::Timestamp)
                    .name("idx_audit_logs_timestamp")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(AuditLogs::Table)
                    .col(AuditLogs::UserEmail)
                    .col(AuditLogs::Timestamp)
                    .name("idx_audit_logs_user_email_timestamp")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(AuditLogs::Table)
                    .col(AuditLogs::Date)
                    .name("idx_audit_logs_date")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuditLogs {
    Table,
    Id,
    UserEmail,
    Action,
    Details,
    Timestamp,
    Date,
    ClientDescriptor,
}
