pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use gate::{authenticate_service_key, require_owner_or_admin, require_role, Identity};
pub use jwt::{JwtUtils, TokenVerifyResult};
pub use middleware::AuthMiddleware;
