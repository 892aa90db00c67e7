pub mod jwt_token;
pub mod user;
