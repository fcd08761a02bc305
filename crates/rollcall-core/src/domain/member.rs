use crate::domain::phone::PhoneNumber;
use serde::{Deserialize, Serialize};

const NICKNAME_PREFIX: &str = "User ";

/// One entry of the `members/add` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub nickname: String,
    pub phone_number: PhoneNumber,
}

impl Member {
    pub fn from_phone(phone_number: PhoneNumber) -> Self {
        let nickname = format!("{NICKNAME_PREFIX}{phone_number}");
        Self {
            nickname,
            phone_number,
        }
    }
}
