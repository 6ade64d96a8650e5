// kernel/src/model/id.rs
use serde::{Deserialize, Serialize};
use shared::error::AppError;

macro_rules! define_id {
    ($id_name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(into = "String", try_from = "String")]
        #[sqlx(transparent)]
        pub struct $id_name(uuid::Uuid);

        impl $id_name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub fn raw(self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $id_name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $id_name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$id_name> for String {
            fn from(value: $id_name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $id_name {
            type Error = AppError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                uuid::Uuid::parse_str(&value)
                    .map(Self)
                    .map_err(AppError::ConvertToUuidError)
            }
        }

        impl std::str::FromStr for $id_name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s)
                    .map(Self)
                    .map_err(AppError::ConvertToUuidError)
            }
        }

        impl std::fmt::Display for $id_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(UserId);
define_id!(GameId);
define_id!(ReviewId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips_through_string() -> Result<(), AppError> {
        let id = GameId::new();
        let s = String::from(id);
        assert_eq!(GameId::try_from(s)?, id);
        Ok(())
    }

    #[test]
    fn malformed_id_is_rejected() {
        assert!(matches!(
            UserId::try_from("not-a-uuid".to_string()),
            Err(AppError::ConvertToUuidError(_))
        ));
    }
}
