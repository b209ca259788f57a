//! Domain entities: family members and the raw input that creates them

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::domain::error::ValidationError;

/// Generational rank used to group members into rows. 0 is the oldest row shown.
pub type Level = u8;

/// Upper bound on `parent_ids` entries.
pub const MAX_PARENTS: usize = 2;

/// Date format accepted for raw birth and death dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque member identifier, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship categories of the enum-based models, relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Grandparent,
    Parent,
    /// The anchor itself. Only the seed member carries it.
    Myself,
    Sibling,
    Child,
    UncleAunt,
}

impl Relation {
    /// Stable tag used in scripts and config.
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Grandparent => "grandparent",
            Relation::Parent => "parent",
            Relation::Myself => "self",
            Relation::Sibling => "sibling",
            Relation::Child => "child",
            Relation::UncleAunt => "uncle_aunt",
        }
    }

    /// Card label.
    pub fn label(self) -> &'static str {
        match self {
            Relation::Grandparent => "Grandparent",
            Relation::Parent => "Parent",
            Relation::Myself => "You",
            Relation::Sibling => "Sibling",
            Relation::Child => "Child",
            Relation::UncleAunt => "Uncle/Aunt",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "" => Err(ValidationError::MissingRelation),
            "grandparent" => Ok(Relation::Grandparent),
            "parent" => Ok(Relation::Parent),
            "self" | "me" => Ok(Relation::Myself),
            "sibling" => Ok(Relation::Sibling),
            "child" => Ok(Relation::Child),
            "uncle_aunt" | "uncle" | "aunt" => Ok(Relation::UncleAunt),
            _ => Err(ValidationError::UnknownRelation(s.to_string())),
        }
    }
}

/// How a member was placed: by relation category or by explicit generation.
///
/// A tree uses exactly one of the two, decided by its relationship model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Relation(Relation),
    Generation(Level),
}

/// What the user picked in the add-member dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Relation(Relation),
    Generation {
        generation: Level,
        parent: Option<MemberId>,
    },
}

impl Selector {
    /// Parse a raw relation tag; an empty tag is a missing selector.
    pub fn relation(raw: &str) -> Result<Self, ValidationError> {
        raw.parse().map(Selector::Relation)
    }

    pub fn generation(generation: Level, parent: Option<MemberId>) -> Self {
        Selector::Generation { generation, parent }
    }
}

/// One person in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyMember {
    pub id: MemberId,
    pub name: String,
    /// Always set for members added through the dialog; spouses linked by
    /// name alone have none.
    pub birth_date: Option<NaiveDate>,
    /// Present only for deceased members.
    pub death_date: Option<NaiveDate>,
    pub photo: Option<String>,
    pub placement: Placement,
    pub level: Level,
    pub parent_ids: Vec<MemberId>,
    pub spouse_id: Option<MemberId>,
}

impl FamilyMember {
    pub fn is_living(&self) -> bool {
        self.death_date.is_none()
    }

    pub fn relation(&self) -> Option<Relation> {
        match self.placement {
            Placement::Relation(relation) => Some(relation),
            Placement::Generation(_) => None,
        }
    }

    /// First letter of every word of the name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }

    /// `1960` for the living, `1931 - 2004` for the deceased.
    pub fn lifespan(&self) -> Option<String> {
        let born = self.birth_date?.year();
        Some(match self.death_date {
            Some(died) => format!("{} - {}", born, died.year()),
            None => born.to_string(),
        })
    }
}

/// Raw fields from the add-member dialog, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInput {
    pub name: String,
    pub birth_date: String,
    pub alive: bool,
    /// Ignored unless `alive` is false.
    pub death_date: Option<String>,
    pub photo: Option<String>,
}

impl Default for MemberInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            birth_date: String::new(),
            alive: true,
            death_date: None,
            photo: None,
        }
    }
}

impl MemberInput {
    pub fn new(name: impl Into<String>, birth_date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_date: birth_date.into(),
            ..Self::default()
        }
    }

    pub fn deceased(mut self, death_date: impl Into<String>) -> Self {
        self.alive = false;
        self.death_date = Some(death_date.into());
        self
    }

    pub fn with_photo(mut self, uri: impl Into<String>) -> Self {
        self.photo = Some(uri.into());
        self
    }

    /// Check required fields and parse dates.
    pub fn validate(&self) -> Result<ValidInput, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let raw_birth = self.birth_date.trim();
        if raw_birth.is_empty() {
            return Err(ValidationError::MissingBirthDate);
        }
        let birth_date = parse_date("birth date", raw_birth)?;

        let death_date = match (&self.death_date, self.alive) {
            (Some(raw), false) if !raw.trim().is_empty() => {
                Some(parse_date("death date", raw.trim())?)
            }
            _ => None,
        };
        if let Some(death) = death_date {
            if death < birth_date {
                return Err(ValidationError::DeathBeforeBirth {
                    birth: birth_date,
                    death,
                });
            }
        }

        let photo = self
            .photo
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string);

        Ok(ValidInput {
            name: name.to_string(),
            birth_date,
            death_date,
            photo,
        })
    }
}

/// Dialog input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInput {
    pub name: String,
    pub birth_date: NaiveDate,
    pub death_date: Option<NaiveDate>,
    pub photo: Option<String>,
}

impl ValidInput {
    /// Build the member record for a resolved placement.
    pub fn into_member(
        self,
        id: MemberId,
        placement: Placement,
        level: Level,
        parent_ids: Vec<MemberId>,
    ) -> FamilyMember {
        FamilyMember {
            id,
            name: self.name,
            birth_date: Some(self.birth_date),
            death_date: self.death_date,
            photo: self.photo,
            placement,
            level,
            parent_ids,
            spouse_id: None,
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, birth: &str, death: Option<&str>) -> FamilyMember {
        let mut input = MemberInput::new(name, birth);
        if let Some(death) = death {
            input = input.deceased(death);
        }
        input.validate().unwrap().into_member(
            MemberId::new(),
            Placement::Relation(Relation::Parent),
            1,
            vec![],
        )
    }

    #[test]
    fn initials_take_first_letter_of_each_word() {
        assert_eq!(member("Ivan  Petrov", "1960-01-01", None).initials(), "IP");
        assert_eq!(member("Anna", "1960-01-01", None).initials(), "A");
    }

    #[test]
    fn lifespan_shows_years_only() {
        assert_eq!(
            member("Ivan", "1960-03-04", None).lifespan().as_deref(),
            Some("1960")
        );
        assert_eq!(
            member("Ivan", "1931-01-01", Some("2004-12-31"))
                .lifespan()
                .as_deref(),
            Some("1931 - 2004")
        );
    }

    #[test]
    fn relation_tags_parse_leniently() {
        assert_eq!("Uncle-Aunt".parse::<Relation>(), Ok(Relation::UncleAunt));
        assert_eq!(" parent ".parse::<Relation>(), Ok(Relation::Parent));
        assert_eq!("".parse::<Relation>(), Err(ValidationError::MissingRelation));
        assert!(matches!(
            "cousin".parse::<Relation>(),
            Err(ValidationError::UnknownRelation(_))
        ));
    }

    #[test]
    fn death_date_is_dropped_for_the_living() {
        let mut input = MemberInput::new("Ivan", "1960-01-01");
        input.death_date = Some("2020-01-01".into());
        assert_eq!(input.validate().unwrap().death_date, None);
    }

    #[test]
    fn blank_photo_is_dropped() {
        let input = MemberInput::new("Ivan", "1960-01-01").with_photo("   ");
        assert_eq!(input.validate().unwrap().photo, None);
    }
}
