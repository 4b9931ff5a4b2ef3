//! SeaORM-backed repository implementation for the domain port.
//!
//! This struct is generic over `C: ConnectionTrait`, so you can construct it
//! with a `DatabaseConnection` **or** a transactional connection.

use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::contract::model::{NewUser, User, UserFilter, UserPatch};
use crate::domain::password::PasswordHash;
use crate::domain::repo::{PageWindow, UsersRepository};
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Escape LIKE wildcards so user input is matched literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `col LIKE 'prefix%'` against a column that already holds lower-cased text.
fn prefix_match(lower_col: Column, prefix: &str) -> SimpleExpr {
    let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
    Expr::col(lower_col).like(LikeExpr::new(pattern).escape('\\'))
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn list(&self, window: PageWindow, filter: &UserFilter) -> anyhow::Result<Vec<User>> {
        let mut query = UserEntity::find();

        for (col, prefix) in [
            (Column::FirstNameLower, &filter.first_name),
            (Column::LastNameLower, &filter.last_name),
            (Column::NicknameLower, &filter.nickname),
            (Column::EmailLower, &filter.email),
        ] {
            if !prefix.is_empty() {
                query = query.filter(prefix_match(col, prefix));
            }
        }
        // country is stored upper-cased
        if !filter.country.is_empty() {
            query = query.filter(Column::Country.eq(filter.country.to_uppercase()));
        }

        let rows = query
            .order_by_desc(Column::CreatedAt)
            .order_by_asc(Column::Email)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.conn)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, user: &NewUser, password: &PasswordHash) -> anyhow::Result<User> {
        let now = Utc::now();
        // Profile and password go in one INSERT, so a row without a password
        // is never visible. The search columns are filled by `before_save`.
        let m = UserAM {
            id: Set(Uuid::new_v4()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            nickname: Set(user.nickname.clone()),
            email: Set(user.email.clone()),
            country: Set(user.country.clone()),
            password: Set(password.as_str().to_owned()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            ..Default::default()
        };
        let model = m.insert(&self.conn).await.context("create failed")?;
        Ok(model.into())
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> anyhow::Result<Option<User>> {
        let mut m = UserAM {
            id: Set(id),
            ..Default::default()
        };

        if !patch.first_name.is_empty() {
            m.first_name = Set(patch.first_name.clone());
        }
        if !patch.last_name.is_empty() {
            m.last_name = Set(patch.last_name.clone());
        }
        if !patch.nickname.is_empty() {
            m.nickname = Set(patch.nickname.clone());
        }
        if !patch.email.is_empty() {
            m.email = Set(patch.email.clone());
        }
        if !patch.country.is_empty() {
            m.country = Set(patch.country.clone());
        }
        m.updated_at = Set(Some(Utc::now()));

        match m.update(&self.conn).await {
            Ok(model) => Ok(Some(model.into())),
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("update failed")),
        }
    }

    async fn update_password(&self, id: Uuid, password: &PasswordHash) -> anyhow::Result<bool> {
        let res = UserEntity::update_many()
            .col_expr(Column::Password, Expr::value(password.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("update_password failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}
