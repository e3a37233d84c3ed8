// Bearer-token verification and role gates

pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;

pub use errors::AuthError;
pub use jwt::{extract_bearer_token, JwtService};
pub use middleware::{jwt_auth_middleware, AdminSession};
pub use models::{Claims, UserRole, UserSession};
