//! Postgres-backed user repository.

use squash::ordering::sort_users;
use squash::{email_key, NewUser, User};

use super::PostgresStore;
use crate::persistence::codec::{decode_rows, user_insert_error, UserRow};
use crate::persistence::traits::UserRepository;
use crate::persistence::PersistenceError;

impl UserRepository for PostgresStore {
    async fn list_users(&self) -> Result<Vec<User>, PersistenceError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, phone, email, password_hash,
                   role, skill, avatar_url
            FROM users
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut users = decode_rows(rows, UserRow::into_user)?;
        sort_users(&mut users);
        Ok(users)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, PersistenceError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, phone, email, password_hash,
                   role, skill, avatar_url
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, phone, email, password_hash,
                   role, skill, avatar_url
            FROM users
            WHERE email_key = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(email_key(email))
        .fetch_optional(self.pool())
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, PersistenceError> {
        let user = user.into_user()?;
        if self.get_user(&user.id).await?.is_some() {
            return Err(PersistenceError::duplicate_id("user", user.id));
        }
        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(PersistenceError::DuplicateEmail(user.email));
        }

        sqlx::query(
            r#"
            INSERT INTO users
                (id, first_name, last_name, phone, email, email_key,
                 password_hash, role, skill, avatar_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.email)
        .bind(email_key(&user.email))
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.skill.as_str())
        .bind(&user.avatar_url)
        .execute(self.pool())
        .await
        .map_err(|e| user_insert_error(e, &user))?;

        Ok(user)
    }
}

