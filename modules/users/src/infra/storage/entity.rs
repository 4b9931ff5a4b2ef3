use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
    /// Hex SHA-256; never mapped into the contract model.
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    // Unicode lower-cased copies used for prefix search. SQLite's LOWER()
    // only folds ASCII, so folding happens here instead of in SQL.
    pub first_name_lower: String,
    pub last_name_lower: String,
    pub nickname_lower: String,
    pub email_lower: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

fn lowered(source: &ActiveValue<String>) -> Option<ActiveValue<String>> {
    match source {
        ActiveValue::Set(v) => Some(Set(v.to_lowercase())),
        _ => None,
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Keep the search columns in step with every name or email that is written.
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Some(v) = lowered(&self.first_name) {
            self.first_name_lower = v;
        }
        if let Some(v) = lowered(&self.last_name) {
            self.last_name_lower = v;
        }
        if let Some(v) = lowered(&self.nickname) {
            self.nickname_lower = v;
        }
        if let Some(v) = lowered(&self.email) {
            self.email_lower = v;
        }
        Ok(self)
    }
}
