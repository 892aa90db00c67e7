pub mod auth_user;
pub mod guard;
pub mod json;

pub use auth_user::CurrentUser;
pub use guard::{
    CsrfGuard, DeviceId, RefreshToken, CSRF_COOKIE, CSRF_HEADER, DEVICE_ID_HEADER, REFRESH_COOKIE,
};
pub use json::Json;
