use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};

/// Visitor shared by every identifier type.
///
/// The portal emits serial ids as JSON numbers, but some handlers echo them
/// back as strings, so both forms are accepted.
struct NumericIdVisitor;

impl<'de> Visitor<'de> for NumericIdVisitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative integer or a numeric string")
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(value)
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u64::try_from(value).map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value
            .trim()
            .parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

macro_rules! numeric_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
            pub struct $name {
                value: u64,
            }

            impl $name {
                pub fn new(id: u64) -> Self {
                    Self { value: id }
                }

                pub fn value(&self) -> u64 {
                    self.value
                }
            }

            impl From<u64> for $name {
                fn from(id: u64) -> Self {
                    Self::new(id)
                }
            }

            impl<'de> Deserialize<'de> for $name {
                fn deserialize<D>(deserializer: D) -> Result<$name, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    deserializer
                        .deserialize_any(NumericIdVisitor)
                        .map($name::new)
                }
            }

            impl Serialize for $name {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    serializer.serialize_u64(self.value)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "{}", self.value)
                }
            }
        )+
    };
}

numeric_id!(
    /// Posted job
    JobId,
    /// Application submitted by a job seeker
    ApplicationId,
    /// Notification addressed to a user
    NotificationId,
    UserId,
    EmployerId,
    JobSeekerId,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_number_and_numeric_string() {
        let from_number: JobId = serde_json::from_str("42").unwrap();
        let from_string: JobId = serde_json::from_str("\"42\"").unwrap();

        assert_eq!(from_number, JobId::new(42));
        assert_eq!(from_string, from_number);
    }

    #[test]
    fn rejects_negative_and_non_numeric_values() {
        assert!(serde_json::from_str::<NotificationId>("-3").is_err());
        assert!(serde_json::from_str::<NotificationId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<NotificationId>("true").is_err());
    }

    #[test]
    fn serializes_as_plain_number() {
        let ids = vec![NotificationId::new(1), NotificationId::new(2)];
        assert_eq!(serde_json::to_string(&ids).unwrap(), "[1,2]");
    }
}
