use bcrypt::BcryptError;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{require_role, Identity, JwtUtils};
use crate::entity::user::{self, Entity as UserEntity, Role};
use crate::model::auth::{LoginResponse, UserProfile, UserResponse};
use crate::model::global_error::{AppError, ErrorCode};

/// Login and account management. Holds the token signer and the bcrypt cost.
#[derive(Clone)]
pub struct CredentialService {
    jwt: JwtUtils,
    hash_cost: u32,
    // 없는 사용자 로그인에도 같은 cost 의 bcrypt 검증을 수행하기 위한 해시
    dummy_hash: String,
}

impl CredentialService {
    pub fn new(jwt: JwtUtils, hash_cost: u32) -> Result<Self, BcryptError> {
        let dummy_hash = hash_password("unknown-user-placeholder", hash_cost)?;
        Ok(Self { jwt, hash_cost, dummy_hash })
    }

    pub fn jwt(&self) -> &JwtUtils {
        &self.jwt
    }

    /// Unknown username and wrong password fail identically.
    #[instrument(skip(self, db, password))]
    pub async fn login<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AppError> {
        let Some(user) = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?
        else {
            let _ = verify_password(password, &self.dummy_hash);
            warn!("존재하지 않는 사용자로 로그인 시도");
            return Err(AppError::new(ErrorCode::InvalidCredentials));
        };

        if !verify_password(password, &user.password)? {
            warn!(user_id = user.id, "비밀번호 불일치");
            return Err(AppError::new(ErrorCode::InvalidCredentials));
        }

        let profile = UserProfile::from(&user);
        let token = self.jwt.generate_token(&profile)?;
        info!(user_id = user.id, "로그인 성공");

        Ok(LoginResponse { token, user: profile })
    }

    #[instrument(skip(self, db, identity, password), fields(caller = identity.id))]
    pub async fn register<C: ConnectionTrait>(
        &self,
        db: &C,
        identity: &Identity,
        username: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<UserResponse, AppError> {
        require_role(identity, Role::Admin)?;
        self.create_user(db, username, password, role.unwrap_or(Role::User)).await
    }

    /// Creates a user without a caller check; used by registration and bootstrap seeding.
    pub async fn create_user<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserResponse, AppError> {
        let existing = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AppError::new(ErrorCode::DuplicateUsername));
        }

        let new_user = user::ActiveModel {
            username: Set(username.to_string()),
            password: Set(hash_password(password, self.hash_cost)?),
            role: Set(role),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        // 동시 가입 경쟁은 unique 제약이 최종 판정
        let user = new_user.insert(db).await.map_err(|err| {
            if is_unique_violation(&err) {
                AppError::new(ErrorCode::DuplicateUsername)
            } else {
                AppError::from(err)
            }
        })?;

        info!(user_id = user.id, role = role.as_str(), "사용자 생성");
        Ok(UserResponse::from(user))
    }
}

#[instrument(skip(db, identity), fields(caller = identity.id))]
pub async fn list_users<C: ConnectionTrait>(db: &C, identity: &Identity) -> Result<Vec<UserResponse>, AppError> {
    require_role(identity, Role::Admin)?;

    let users = UserEntity::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;

    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn current_user<C: ConnectionTrait>(db: &C, identity: &Identity) -> Result<UserResponse, AppError> {
    let user = UserEntity::find_by_id(identity.id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(UserResponse::from(user))
}

pub(crate) fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
}
