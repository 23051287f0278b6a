use serde::{Deserialize, Serialize};

use crate::types::AuthAction;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_logged_in: bool,
    pub username: Option<String>,
}

route!(CheckAuthStatus, AuthAction::CheckStatus, () => AuthStatus);
