use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AdminUserConfig;
use crate::dto::user_dto::{CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, UserView};
use crate::model::user::{User, UserRole};
use crate::repository::Repositories;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::session::{Session, SessionStore};

/// The caller behind an authenticated request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: ObjectId,
    pub username: String,
    pub role: UserRole,
    pub session_id: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    fn may_access(&self, user_id: ObjectId) -> bool {
        self.is_admin() || self.id == user_id
    }
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn login(&self, req: LoginRequest) -> ServiceResult<LoginResponse>;
    async fn logout(&self, caller: &AuthUser) -> ServiceResult<()>;
    /// Resolves a bearer token to its user, provided the session is still open.
    async fn authenticate(&self, token: &str) -> ServiceResult<AuthUser>;
    async fn me(&self, caller: &AuthUser) -> ServiceResult<UserView>;
    async fn list_users(&self) -> ServiceResult<Vec<UserView>>;
    async fn get_user(&self, caller: &AuthUser, id: ObjectId) -> ServiceResult<UserView>;
    async fn create_user(&self, req: CreateUserRequest) -> ServiceResult<UserView>;
    async fn update_user(&self, caller: &AuthUser, id: ObjectId, req: UpdateUserRequest) -> ServiceResult<UserView>;
    async fn delete_user(&self, id: ObjectId) -> ServiceResult<()>;
    /// Creates the configured admin unless that username already exists.
    async fn seed_admin(&self, config: &AdminUserConfig) -> ServiceResult<bool>;
}

pub struct UserServiceImpl {
    pub repos: Repositories,
    pub sessions: Arc<dyn SessionStore>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl UserServiceImpl {
    pub fn new(repos: Repositories, sessions: Arc<dyn SessionStore>, jwt_utils: Arc<JwtTokenUtilsImpl>) -> Self {
        Self { repos, sessions, jwt_utils }
    }

    async fn find(&self, id: ObjectId) -> ServiceResult<User> {
        self.repos
            .users
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    fn hash(password: &str) -> ServiceResult<String> {
        PasswordUtilsImpl::validate_password_strength(password)
            .map_err(|problems| ServiceError::InvalidInput(problems.join("; ")))?;
        PasswordUtilsImpl::hash_password(password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))
    }

    async fn ensure_unique(&self, username: Option<&str>, email: Option<&str>, except: Option<ObjectId>) -> ServiceResult<()> {
        if let Some(username) = username {
            if let Some(other) = self.repos.users.find_by_username(username).await? {
                if Some(other.id) != except {
                    return Err(ServiceError::Conflict("Username already exists".to_string()));
                }
            }
        }
        if let Some(email) = email {
            if let Some(other) = self.repos.users.find_by_email(email).await? {
                if Some(other.id) != except {
                    return Err(ServiceError::Conflict("Email already exists".to_string()));
                }
            }
        }
        Ok(())
    }

    /// Refuses to remove the Admin role from the only admin left.
    async fn guard_last_admin(&self, user: &User) -> ServiceResult<()> {
        if user.role == UserRole::Admin && self.repos.users.count_by_role(UserRole::Admin).await? <= 1 {
            warn!(user_id = %user.id, "Refusing to remove the last admin");
            return Err(ServiceError::Conflict("Cannot remove the last admin user".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, req), fields(username = %req.username))]
    async fn login(&self, req: LoginRequest) -> ServiceResult<LoginResponse> {
        info!("User login attempt");
        let user = self.repos.users.find_by_username(&req.username).await?;
        let Some(user) = user else {
            error!("User not found for login");
            return Err(ServiceError::Unauthorized("Invalid username or password".to_string()));
        };
        let valid = PasswordUtilsImpl::verify_password(&req.password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            error!("Invalid credentials for user: {}", req.username);
            return Err(ServiceError::Unauthorized("Invalid username or password".to_string()));
        }

        let session = Session {
            user_id: user.id.to_hex(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            created_at: Utc::now(),
        };
        let session_id = self
            .sessions
            .create(session, self.jwt_utils.jwt_config.session_ttl_secs())
            .await
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        let token = self
            .jwt_utils
            .generate_session_token(&user.id.to_hex(), &user.username, user.role.as_str(), &session_id)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;

        info!("User logged in successfully");
        Ok(LoginResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_utils.expires_in(),
            user: user.into(),
        })
    }

    #[instrument(skip(self, caller), fields(username = %caller.username))]
    async fn logout(&self, caller: &AuthUser) -> ServiceResult<()> {
        let revoked = self
            .sessions
            .revoke(&caller.session_id)
            .await
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        debug!(revoked, "Session closed");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> ServiceResult<AuthUser> {
        let claims = self
            .jwt_utils
            .validate_token(token)
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))?;
        let session = self
            .sessions
            .get(&claims.jti)
            .await
            .map_err(|e| ServiceError::InternalError(e.to_string()))?
            .ok_or_else(|| ServiceError::Unauthorized("Session expired or logged out".to_string()))?;
        let id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))?;
        let role = UserRole::parse(&session.role)
            .ok_or_else(|| ServiceError::Unauthorized("Unknown role".to_string()))?;
        Ok(AuthUser { id, username: session.username, role, session_id: claims.jti })
    }

    #[instrument(skip(self, caller), fields(username = %caller.username))]
    async fn me(&self, caller: &AuthUser) -> ServiceResult<UserView> {
        let user = self
            .repos
            .users
            .find_by_id(&caller.id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("User no longer exists".to_string()))?;
        Ok(user.into())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> ServiceResult<Vec<UserView>> {
        let users = self.repos.users.list().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    #[instrument(skip(self, caller))]
    async fn get_user(&self, caller: &AuthUser, id: ObjectId) -> ServiceResult<UserView> {
        if !caller.may_access(id) {
            return Err(ServiceError::Forbidden("You can only view your own profile".to_string()));
        }
        Ok(self.find(id).await?.into())
    }

    #[instrument(skip(self, req), fields(username = %req.username, email = %req.email))]
    async fn create_user(&self, req: CreateUserRequest) -> ServiceResult<UserView> {
        info!("Creating user");
        self.ensure_unique(Some(&req.username), Some(&req.email), None).await?;
        let now = Utc::now().to_rfc3339();
        let user = User {
            id: ObjectId::new(),
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_hash: Self::hash(&req.password)?,
            role: req.role,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        let inserted = self.repos.users.insert(user).await;
        match &inserted {
            Ok(u) => info!(user_id = %u.id, "User inserted successfully"),
            Err(e) => error!("Failed to insert user: {e}"),
        }
        Ok(inserted?.into())
    }

    #[instrument(skip(self, caller, req))]
    async fn update_user(&self, caller: &AuthUser, id: ObjectId, req: UpdateUserRequest) -> ServiceResult<UserView> {
        if !caller.may_access(id) {
            return Err(ServiceError::Forbidden("You can only edit your own profile".to_string()));
        }
        let mut user = self.find(id).await?;

        if let Some(role) = req.role {
            if role != user.role {
                if !caller.is_admin() {
                    return Err(ServiceError::Forbidden("Only admins can change roles".to_string()));
                }
                self.guard_last_admin(&user).await?;
                user.role = role;
            }
        }
        self.ensure_unique(req.username.as_deref(), req.email.as_deref(), Some(id)).await?;
        if let Some(username) = req.username {
            user.username = username;
        }
        if let Some(email) = req.email {
            user.email = email;
        }
        if let Some(first_name) = req.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = req.last_name {
            user.last_name = last_name;
        }
        if let Some(password) = req.password.as_deref() {
            user.password_hash = Self::hash(password)?;
        }
        user.updated_at = Some(Utc::now().to_rfc3339());
        let user = self.repos.users.update(user).await?;
        info!(user_id = %user.id, "User updated");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: ObjectId) -> ServiceResult<()> {
        let user = self.find(id).await?;
        self.guard_last_admin(&user).await?;
        self.repos.users.delete_cascade(id).await?;
        info!(user_id = %id, "User deleted with absences and assignments");
        Ok(())
    }

    #[instrument(skip(self, config), fields(username = %config.username))]
    async fn seed_admin(&self, config: &AdminUserConfig) -> ServiceResult<bool> {
        if self.repos.users.find_by_username(&config.username).await?.is_some() {
            info!("Admin user already exists, skipping creation.");
            return Ok(false);
        }
        let now = Utc::now().to_rfc3339();
        let admin = User {
            id: ObjectId::new(),
            username: config.username.clone(),
            first_name: config.first_name.clone(),
            last_name: config.last_name.clone(),
            email: config.email.clone(),
            password_hash: PasswordUtilsImpl::hash_password(&config.password)
                .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?,
            role: UserRole::Admin,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        self.repos.users.insert(admin).await?;
        info!("First admin user created.");
        Ok(true)
    }
}
