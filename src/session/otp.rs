//! One-time token purposes understood by the session backend.

use std::{fmt, str::FromStr};

/// Purpose tag carried by an email link next to its `token_hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OtpType {
    Signup,
    Invite,
    Magiclink,
    Recovery,
    EmailChange,
    Email,
}

impl OtpType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Invite => "invite",
            Self::Magiclink => "magiclink",
            Self::Recovery => "recovery",
            Self::EmailChange => "email_change",
            Self::Email => "email",
        }
    }

    #[must_use]
    pub const fn is_recovery(self) -> bool {
        matches!(self, Self::Recovery)
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown otp type: {0}")]
pub struct UnknownOtpType(pub String);

impl FromStr for OtpType {
    type Err = UnknownOtpType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "signup" => Ok(Self::Signup),
            "invite" => Ok(Self::Invite),
            "magiclink" => Ok(Self::Magiclink),
            "recovery" => Ok(Self::Recovery),
            "email_change" => Ok(Self::EmailChange),
            "email" => Ok(Self::Email),
            other => Err(UnknownOtpType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types() {
        assert_eq!("signup".parse::<OtpType>(), Ok(OtpType::Signup));
        assert_eq!("magiclink".parse::<OtpType>(), Ok(OtpType::Magiclink));
        assert_eq!("recovery".parse::<OtpType>(), Ok(OtpType::Recovery));
        assert_eq!("email_change".parse::<OtpType>(), Ok(OtpType::EmailChange));
        assert_eq!("invite".parse::<OtpType>(), Ok(OtpType::Invite));
        assert_eq!("email".parse::<OtpType>(), Ok(OtpType::Email));
    }

    #[test]
    fn rejects_unknown_and_mixed_case() {
        assert_eq!(
            "Recovery".parse::<OtpType>(),
            Err(UnknownOtpType("Recovery".to_string()))
        );
        assert!("sms".parse::<OtpType>().is_err());
        assert!("".parse::<OtpType>().is_err());
    }

    #[test]
    fn only_recovery_is_recovery() {
        assert!(OtpType::Recovery.is_recovery());
        assert!(!OtpType::Magiclink.is_recovery());
        assert!(!OtpType::EmailChange.is_recovery());
    }

    #[test]
    fn display_matches_wire_format() {
        assert_eq!(OtpType::EmailChange.to_string(), "email_change");
    }
}
