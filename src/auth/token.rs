//! The token stored in the encrypted auth cookie and its JSON encoding.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::auth::UserID;

/// How the expiry is written into the cookie, e.g. "2025-12-21 00:00:00.0 +00:00:00".
///
/// Hours are always written with two digits. The default serde format for
/// [OffsetDateTime] writes midnight as "0:00:00.0", which it then refuses to parse.
const EXPIRY_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] \
     [offset_hour sign:mandatory]:[offset_minute]:[offset_second]"
);

fn serialize_expiry<S: Serializer>(
    expires_at: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let text = expires_at
        .format(EXPIRY_FORMAT)
        .map_err(serde::ser::Error::custom)?;

    serializer.serialize_str(&text)
}

fn deserialize_expiry<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<OffsetDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;

    OffsetDateTime::parse(&text, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
}

/// Identifies the logged in user and when their session ends.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(serialize_with = "serialize_expiry", deserialize_with = "deserialize_expiry")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the session has ended at the time `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
