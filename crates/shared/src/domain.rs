use std::{fmt, num::NonZeroU32, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RosterError, RoundLimitParseError};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Fresh random id, unique for all practical purposes.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(MemberId);
id_newtype!(SectorId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Gradient endpoints used by front ends to tint a sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub from: String,
    pub to: String,
}

impl Theme {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub name: String,
    pub manager: String,
    pub members: Vec<Member>,
    pub theme: Theme,
}

impl Sector {
    pub fn member(&self, member_id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == member_id)
    }

    /// Appends a member with a freshly generated id. The name is trimmed and
    /// must not be blank.
    pub fn add_member(&mut self, name: &str) -> Result<Member, RosterError> {
        let member = Member::new(MemberId::generate(), normalize_name(name)?);
        self.members.push(member.clone());
        Ok(member)
    }

    pub fn remove_member(&mut self, member_id: &MemberId) -> Result<Member, RosterError> {
        let index = self
            .members
            .iter()
            .position(|m| &m.id == member_id)
            .ok_or_else(|| RosterError::UnknownMember(member_id.clone()))?;
        Ok(self.members.remove(index))
    }

    pub fn rename_member(&mut self, member_id: &MemberId, name: &str) -> Result<(), RosterError> {
        let name = normalize_name(name)?;
        let member = self
            .members
            .iter_mut()
            .find(|m| &m.id == member_id)
            .ok_or_else(|| RosterError::UnknownMember(member_id.clone()))?;
        member.name = name;
        Ok(())
    }

    pub fn set_member_role(
        &mut self,
        member_id: &MemberId,
        role: Option<&str>,
    ) -> Result<(), RosterError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| &m.id == member_id)
            .ok_or_else(|| RosterError::UnknownMember(member_id.clone()))?;
        member.role = role
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        Ok(())
    }

    pub fn set_manager(&mut self, manager: &str) -> Result<(), RosterError> {
        self.manager = normalize_name(manager)?;
        Ok(())
    }
}

pub fn normalize_name(raw: &str) -> Result<String, RosterError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RosterError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// How many acknowledged draws end a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundLimit {
    /// Run until every present member has spoken.
    #[default]
    Unbounded,
    Bounded(NonZeroU32),
}

impl RoundLimit {
    pub fn bounded(rounds: u32) -> Option<Self> {
        NonZeroU32::new(rounds).map(Self::Bounded)
    }

    pub fn is_reached(&self, rounds_completed: u32) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Bounded(limit) => rounds_completed >= limit.get(),
        }
    }
}

impl FromStr for RoundLimit {
    type Err = RoundLimitParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("all")
            || raw.eq_ignore_ascii_case("todos")
            || raw.eq_ignore_ascii_case("unbounded")
            || raw == "*"
        {
            return Ok(Self::Unbounded);
        }

        let parsed: i64 = raw
            .parse()
            .map_err(|_| RoundLimitParseError::Invalid(raw.to_string()))?;
        if parsed <= 0 {
            return Err(RoundLimitParseError::NotPositive(parsed));
        }
        u32::try_from(parsed)
            .ok()
            .and_then(Self::bounded)
            .ok_or_else(|| RoundLimitParseError::Invalid(raw.to_string()))
    }
}

impl fmt::Display for RoundLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("all"),
            Self::Bounded(limit) => write!(f, "{limit}"),
        }
    }
}

/// Notes a speaker shared during their turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUpdate {
    pub member_id: MemberId,
    pub member_name: String,
    pub demands: String,
    pub updates: String,
    pub timestamp: DateTime<Utc>,
}
