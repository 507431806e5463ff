use serde::Serialize;

use crate::schemas::user::UserResponse;

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) success: bool,
    pub(crate) token: String,
    pub(crate) data: UserResponse,
}

impl TokenResponse {
    pub(crate) fn new(token: String, data: UserResponse) -> Self {
        Self { success: true, token, data }
    }
}
