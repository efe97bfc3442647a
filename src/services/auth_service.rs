use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::database::entities::{auth_tokens, roles, users};
use crate::errors::{KitchenError, KitchenResult};

/// Bearer tokens outlive a double shift, then expire.
pub const TOKEN_HOURS: i64 = 16;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> KitchenResult<String> {
    if password.is_empty() {
        return Err(KitchenError::invalid_argument("Password cannot be empty"));
    }
    hash(password, DEFAULT_COST)
        .map_err(|e| KitchenError::internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored bcrypt hash
pub fn verify_password(password: &str, password_hash: &str) -> KitchenResult<bool> {
    verify(password, password_hash)
        .map_err(|e| KitchenError::internal(format!("Failed to verify password: {}", e)))
}

/// Map the role names kitchen staff actually type onto the three stored
/// roles. Unknown values pass through and fail lookup later.
pub fn normalize_role(role: &str) -> String {
    let value = role.trim().to_lowercase().replace(['-', '_'], " ");
    match value.as_str() {
        "admin" | "owner" => "admin".to_string(),
        "chef" | "manager" | "chef manager" => "manager".to_string(),
        "prep" | "prep chef" => "prep".to_string(),
        _ => value,
    }
}

/// The authenticated actor attached to every request.
#[derive(Clone, Debug, Serialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: String,
}

impl CurrentUser {
    /// Fails with `Forbidden` unless the actor holds one of the roles.
    pub fn require_role(&self, allowed: &[&str]) -> KitchenResult<()> {
        if allowed.contains(&self.role.as_str()) {
            Ok(())
        } else {
            Err(KitchenError::forbidden("Insufficient permissions"))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: CurrentUser,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub active: bool,
    pub role: String,
    pub created_at: chrono::DateTime<Utc>,
}

/// Partial update for an existing account; `None` fields are untouched.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub active: Option<bool>,
    pub role: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Check credentials and issue a fresh bearer token.
    pub async fn login(&self, username: &str, password: &str) -> KitchenResult<LoginResponse> {
        let username = username.trim();
        let found = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .find_also_related(roles::Entity)
            .one(&self.db)
            .await?;

        let (user, role) = match found {
            Some((user, Some(role))) => (user, role),
            _ => return Err(KitchenError::unauthorized("Invalid credentials")),
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(KitchenError::unauthorized("Invalid credentials"));
        }
        if !user.active {
            return Err(KitchenError::forbidden("User inactive"));
        }

        let now = Utc::now();
        let token = Uuid::new_v4().to_string();
        let token_row = auth_tokens::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user.id),
            expires_at: Set(now + Duration::hours(TOKEN_HOURS)),
            created_at: Set(now),
        };
        auth_tokens::Entity::insert(token_row).exec(&self.db).await?;

        Ok(LoginResponse {
            token,
            user: CurrentUser {
                id: user.id,
                username: user.username,
                full_name: user.full_name,
                role: role.name,
            },
        })
    }

    /// Resolve a bearer token to its user, rejecting expired tokens and
    /// deactivated accounts.
    pub async fn authenticate(&self, token: &str) -> KitchenResult<CurrentUser> {
        let token_row = auth_tokens::Entity::find_by_id(token)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::unauthorized("Invalid token"))?;

        if token_row.expires_at < Utc::now() {
            return Err(KitchenError::unauthorized("Token expired"));
        }

        let (user, role) = users::Entity::find_by_id(token_row.user_id)
            .find_also_related(roles::Entity)
            .one(&self.db)
            .await?
            .and_then(|(user, role)| role.map(|r| (user, r)))
            .ok_or_else(|| KitchenError::unauthorized("Invalid token"))?;

        if !user.active {
            return Err(KitchenError::forbidden("User inactive"));
        }

        Ok(CurrentUser {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: role.name,
        })
    }

    /// All accounts, including deactivated ones. Admin screens only.
    pub async fn list_users(&self) -> KitchenResult<Vec<UserInfo>> {
        let rows = users::Entity::find()
            .find_also_related(roles::Entity)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(user, role)| UserInfo {
                id: user.id,
                username: user.username,
                full_name: user.full_name,
                active: user.active,
                role: role.map(|r| r.name).unwrap_or_default(),
                created_at: user.created_at,
            })
            .collect())
    }

    /// Active accounts only, for assignment pickers.
    pub async fn list_staff(&self) -> KitchenResult<Vec<UserInfo>> {
        let rows = users::Entity::find()
            .filter(users::Column::Active.eq(true))
            .find_also_related(roles::Entity)
            .order_by_asc(users::Column::FullName)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(user, role)| UserInfo {
                id: user.id,
                username: user.username,
                full_name: user.full_name,
                active: user.active,
                role: role.map(|r| r.name).unwrap_or_default(),
                created_at: user.created_at,
            })
            .collect())
    }

    pub async fn create_user(
        &self,
        username: &str,
        full_name: &str,
        password: &str,
        role: &str,
    ) -> KitchenResult<i32> {
        let username = username.trim();
        let role_id = self.role_id_by_name(&normalize_role(role)).await?;

        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(KitchenError::invalid_argument("Username already exists"));
        }

        let user = users::ActiveModel {
            username: Set(username.to_string()),
            full_name: Set(full_name.trim().to_string()),
            password_hash: Set(hash_password(password)?),
            role_id: Set(role_id),
            active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let result = users::Entity::insert(user).exec(&self.db).await?;
        Ok(result.last_insert_id)
    }

    pub async fn update_user(&self, user_id: i32, update: UserUpdate) -> KitchenResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::not_found("User", user_id))?;

        let mut user: users::ActiveModel = user.into();
        if let Some(role) = update.role {
            user.role_id = Set(self.role_id_by_name(&normalize_role(&role)).await?);
        }
        if let Some(full_name) = update.full_name {
            user.full_name = Set(full_name);
        }
        if let Some(active) = update.active {
            user.active = Set(active);
        }
        if let Some(password) = update.password {
            user.password_hash = Set(hash_password(&password)?);
        }
        user.update(&self.db).await?;
        Ok(())
    }

    /// Create an admin account, or reset an existing account to an
    /// active admin with the given password. Used by the CLI.
    pub async fn ensure_admin(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> KitchenResult<bool> {
        let role_id = match self.role_id_by_name("admin").await {
            Ok(id) => id,
            Err(_) => {
                let role = roles::ActiveModel {
                    name: Set("admin".to_string()),
                    ..Default::default()
                };
                roles::Entity::insert(role).exec(&self.db).await?.last_insert_id
            }
        };

        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.db)
            .await?;

        match existing {
            Some(user) => {
                let mut user: users::ActiveModel = user.into();
                user.password_hash = Set(hash_password(password)?);
                user.role_id = Set(role_id);
                user.active = Set(true);
                user.update(&self.db).await?;
                Ok(false)
            }
            None => {
                let user = users::ActiveModel {
                    username: Set(username.trim().to_string()),
                    full_name: Set(full_name.trim().to_string()),
                    password_hash: Set(hash_password(password)?),
                    role_id: Set(role_id),
                    active: Set(true),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                };
                users::Entity::insert(user).exec(&self.db).await?;
                Ok(true)
            }
        }
    }

    async fn role_id_by_name(&self, role: &str) -> KitchenResult<i32> {
        let row = roles::Entity::find()
            .filter(roles::Column::Name.eq(role))
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::invalid_argument(format!("Unknown role: {}", role)))?;
        Ok(row.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "kitchen_test_123";
        let hashed = hash_password(password).expect("Failed to hash password");

        assert!(verify_password(password, &hashed).expect("Failed to verify password"));
        assert!(!verify_password("wrong_password", &hashed)
            .expect("Failed to verify wrong password"));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(hash_password("").is_err());
    }

    #[test]
    fn test_role_normalization() {
        assert_eq!(normalize_role("admin"), "admin");
        assert_eq!(normalize_role("Owner"), "admin");
        assert_eq!(normalize_role("chef"), "manager");
        assert_eq!(normalize_role("Chef-Manager"), "manager");
        assert_eq!(normalize_role("prep_chef"), "prep");
        assert_eq!(normalize_role(" PREP "), "prep");
        assert_eq!(normalize_role("dishwasher"), "dishwasher");
    }

    #[test]
    fn test_role_check() {
        let user = CurrentUser {
            id: 1,
            username: "chef1".to_string(),
            full_name: "Chef Maria".to_string(),
            role: "manager".to_string(),
        };
        assert!(user.require_role(&["admin", "manager"]).is_ok());
        assert!(user.require_role(&["admin"]).is_err());
    }
}
