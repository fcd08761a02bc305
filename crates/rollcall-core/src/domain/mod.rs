pub mod ids;
pub mod member;
pub mod phone;

pub use ids::{AccessToken, GroupId};
pub use member::Member;
pub use phone::{normalize_phone_number, Normalizer, PhoneNumber, DEFAULT_COUNTRY_CODE};
