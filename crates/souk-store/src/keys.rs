use std::fmt;

/// The four entries of the persisted session record.
///
/// The storage names are part of the on-device format and must not change:
/// a build that renamed them would silently log every user out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    AccessToken,
    RefreshToken,
    /// The current user, serialized as JSON.
    User,
    UserId,
}

impl StoreKey {
    /// Every key, in the order they are written on login.
    pub const ALL: [StoreKey; 4] = [
        StoreKey::AccessToken,
        StoreKey::RefreshToken,
        StoreKey::User,
        StoreKey::UserId,
    ];

    /// The storage name of this entry.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
            Self::User => "user",
            Self::UserId => "userId",
        }
    }

    /// Looks a key up by its storage name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_names_are_stable() {
        let names: Vec<_> = StoreKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, ["accessToken", "refreshToken", "user", "userId"]);
    }

    #[test]
    fn test_from_name_round_trips_every_key() {
        for key in StoreKey::ALL {
            assert_eq!(StoreKey::from_name(key.as_str()), Some(key));
        }
        assert_eq!(StoreKey::from_name("theme"), None);
    }
}
