use sea_orm::entity::prelude::*;

/// Append-only audit trail of auth and email events.
/// Rows are inserted by the service and never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_email: String,
    pub action: String,
    pub details: Json,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// `YYYY-MM-DD` (UTC) of `timestamp`.
    pub date: String,
    pub client_descriptor: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
