use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, UserChanges};

/// SQLSTATE raised by Postgres when a unique index rejects a row.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique index on `login` rejected the write.
    #[error("login already taken")]
    Conflict,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Persistence for user records. Login uniqueness is the store's job: a
/// conflicting `insert` or `update` returns [`StoreError::Conflict`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    /// Returns `None` when no record has this id.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn close(&self);
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, surname, login, password, profile_picture
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, surname, login, password, profile_picture
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, surname, login, password, profile_picture)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, surname, login, password, profile_picture
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.login)
        .bind(user.password.as_str())
        .bind(&user.profile_picture)
        .fetch_one(&self.db)
        .await?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2,
                   surname = $3,
                   login = $4,
                   profile_picture = COALESCE($5, profile_picture)
             WHERE id = $1
            RETURNING id, name, surname, login, password, profile_picture
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.surname)
        .bind(&changes.login)
        .bind(&changes.profile_picture)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-process store with the same unique-login rule as the `users` table.
    #[derive(Default)]
    pub struct MemoryUserStore {
        rows: Mutex<HashMap<Uuid, User>>,
    }

    impl MemoryUserStore {
        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.rows.lock().unwrap().is_empty()
        }

        /// Replaces a stored hash behind the handlers' back.
        pub fn corrupt_password(&self, id: Uuid, value: &str) {
            if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
                row.password = value.to_string();
            }
        }

        fn login_taken(rows: &HashMap<Uuid, User>, login: &str, except: Option<Uuid>) -> bool {
            rows.values()
                .any(|u| u.login == login && Some(u.id) != except)
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.values().find(|u| u.login == login).cloned())
        }

        async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if Self::login_taken(&rows, &user.login, None) {
                return Err(StoreError::Conflict);
            }
            let row = User {
                id: Uuid::new_v4(),
                name: user.name,
                surname: user.surname,
                login: user.login,
                password: user.password.as_str().to_string(),
                profile_picture: user.profile_picture,
            };
            rows.insert(row.id, row.clone());
            Ok(row)
        }

        async fn update(
            &self,
            id: Uuid,
            changes: UserChanges,
        ) -> Result<Option<User>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if !rows.contains_key(&id) {
                return Ok(None);
            }
            if Self::login_taken(&rows, &changes.login, Some(id)) {
                return Err(StoreError::Conflict);
            }
            let Some(row) = rows.get_mut(&id) else {
                return Ok(None);
            };
            row.name = changes.name;
            row.surname = changes.surname;
            row.login = changes.login;
            if changes.profile_picture.is_some() {
                row.profile_picture = changes.profile_picture;
            }
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
            Ok(self.rows.lock().unwrap().remove(&id).is_some())
        }

        async fn close(&self) {}
    }

    /// Never reports an existing login from `find_by_login`, as if another
    /// request inserted it between the pre-check and the write.
    pub struct RacingStore(pub MemoryUserStore);

    #[async_trait]
    impl UserStore for RacingStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
            self.0.find_by_id(id).await
        }

        async fn find_by_login(&self, _login: &str) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
            self.0.insert(user).await
        }

        async fn update(
            &self,
            id: Uuid,
            changes: UserChanges,
        ) -> Result<Option<User>, StoreError> {
            self.0.update(id, changes).await
        }

        async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
            self.0.delete(id).await
        }

        async fn close(&self) {}
    }

    /// Fails every call, standing in for a lost database connection.
    pub struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn find_by_login(&self, _login: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn insert(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn update(
            &self,
            _id: Uuid,
            _changes: UserChanges,
        ) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn close(&self) {}
    }
}
