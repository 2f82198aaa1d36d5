use subtle::ConstantTimeEq;

use super::jwt::{JwtUtils, TokenVerifyResult};
use crate::entity::user::Role;
use crate::model::auth::Claims;
use crate::model::global_error::{AppError, ErrorCode};

/// The caller behind a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

impl TryFrom<Claims> for Identity {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::new(ErrorCode::InvalidAuthToken))?;

        Ok(Identity {
            id,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// Resolves an `Authorization` header value into an identity.
pub fn authenticate(header: Option<&str>, jwt: &JwtUtils) -> Result<Identity, AppError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::MissingAuthToken))?;

    match jwt.verify_token(token) {
        TokenVerifyResult::Valid(claims) => Identity::try_from(claims),
        TokenVerifyResult::Expired => Err(AppError::new(ErrorCode::ExpiredAuthToken)),
        TokenVerifyResult::Invalid => Err(AppError::new(ErrorCode::InvalidAuthToken)),
    }
}

pub fn require_role(identity: &Identity, required: Role) -> Result<(), AppError> {
    match (identity.role, required) {
        (Role::Admin, _) | (Role::User, Role::User) => Ok(()),
        (Role::User, Role::Admin) => Err(AppError::new(ErrorCode::AdminRequired)),
    }
}

pub fn require_owner_or_admin(identity: &Identity, owner_id: i32) -> Result<(), AppError> {
    match identity.role {
        Role::Admin => Ok(()),
        Role::User if identity.id == owner_id => Ok(()),
        Role::User => Err(AppError::new(ErrorCode::NotEnoughPermission)),
    }
}

pub fn authenticate_service_key(header: Option<&str>, expected: &str) -> Result<(), AppError> {
    let provided = header.unwrap_or_default();
    let matches = !provided.is_empty() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()));

    if matches {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::InvalidApiKey))
    }
}
