// handlers/public/auth - token acquisition

use serde::Deserialize;

pub mod login;    // POST /auth/login/ - exchange credentials for a JWT
pub mod register; // POST /auth/register/ - create an account

pub use login::login_post;
pub use register::register_post;

/// Body shared by login and register
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
