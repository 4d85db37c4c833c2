// ABOUTME: User fitness profile consumed by plan generation and adaptation
// ABOUTME: Weekly availability with bitflag day sets, goals, fitness levels, and injury records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::taxonomy::{BodyPart, Discipline, FitnessLevel, MovementPattern};
use crate::errors::{TrainingError, TrainingResult};

/// Weekdays in calendar order starting Monday
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

bitflags::bitflags! {
    /// Set of weekdays using bitflags for compact storage
    ///
    /// Serialized as a list of weekday names (`["Mon", "Wed", "Fri"]`).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct WeekdaySet: u8 {
        /// Monday
        const MON = 0b0000_0001;
        /// Tuesday
        const TUE = 0b0000_0010;
        /// Wednesday
        const WED = 0b0000_0100;
        /// Thursday
        const THU = 0b0000_1000;
        /// Friday
        const FRI = 0b0001_0000;
        /// Saturday
        const SAT = 0b0010_0000;
        /// Sunday
        const SUN = 0b0100_0000;
    }
}

impl WeekdaySet {
    /// Flag for a single weekday
    #[must_use]
    pub const fn day(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::MON,
            Weekday::Tue => Self::TUE,
            Weekday::Wed => Self::WED,
            Weekday::Thu => Self::THU,
            Weekday::Fri => Self::FRI,
            Weekday::Sat => Self::SAT,
            Weekday::Sun => Self::SUN,
        }
    }

    /// Whether the weekday is in the set
    #[must_use]
    pub const fn includes(&self, weekday: Weekday) -> bool {
        self.contains(Self::day(weekday))
    }

    /// Number of selected days
    #[must_use]
    pub const fn count(&self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Selected days in calendar order starting Monday
    #[must_use]
    pub fn weekdays(&self) -> Vec<Weekday> {
        WEEKDAYS
            .iter()
            .copied()
            .filter(|day| self.includes(*day))
            .collect()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, day| set | Self::day(day))
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.weekdays())
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = Vec::<Weekday>::deserialize(deserializer)?;
        Ok(days.into_iter().collect())
    }
}

/// Weekly schedule availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    /// Days the athlete can train
    pub days: WeekdaySet,
    /// Minimum sessions per week
    pub min_sessions: u8,
    /// Maximum sessions per week
    pub max_sessions: u8,
}

impl WeeklyAvailability {
    /// Create availability from a day list and session bounds (unvalidated)
    #[must_use]
    pub fn new(days: &[Weekday], min_sessions: u8, max_sessions: u8) -> Self {
        Self {
            days: days.iter().copied().collect(),
            min_sessions,
            max_sessions,
        }
    }

    /// Check `1 <= min <= max <= selected days` with at least one day selected
    ///
    /// # Errors
    ///
    /// Returns `TrainingError::Validation` describing the first violated bound.
    pub fn validate(&self) -> TrainingResult<()> {
        let selected = self.days.count();
        if selected == 0 {
            return Err(TrainingError::validation(
                "availability must select at least one day",
            ));
        }
        if self.min_sessions < 1 {
            return Err(TrainingError::validation(
                "minimum sessions per week must be at least 1",
            ));
        }
        if self.min_sessions > self.max_sessions {
            return Err(TrainingError::validation(format!(
                "minimum sessions ({}) exceeds maximum sessions ({})",
                self.min_sessions, self.max_sessions
            )));
        }
        if usize::from(self.max_sessions) > selected {
            return Err(TrainingError::validation(format!(
                "maximum sessions ({}) exceeds the {selected} selected days",
                self.max_sessions
            )));
        }
        Ok(())
    }

    /// Clamp a session count into `[min_sessions, max_sessions]`
    #[must_use]
    pub fn clamp_sessions(&self, count: usize) -> usize {
        count.clamp(
            usize::from(self.min_sessions),
            usize::from(self.max_sessions),
        )
    }
}

/// Fitness level in one discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineLevel {
    /// Discipline
    pub discipline: Discipline,
    /// Self-assessed level
    pub level: FitnessLevel,
}

/// Kind of training goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    /// Target event or race
    Race,
    /// Build aerobic endurance
    Endurance,
    /// Build strength
    Strength,
    /// Reduce body weight
    WeightLoss,
    /// General health and fitness
    GeneralFitness,
}

/// Lifecycle of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Being pursued
    Active,
    /// Reached
    Achieved,
    /// Dropped
    Abandoned,
}

/// Training goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Goal identifier
    pub id: Uuid,
    /// Kind of goal
    pub goal_type: GoalType,
    /// Discipline the goal trains
    pub discipline: Discipline,
    /// Date the goal should be reached
    pub target_date: NaiveDate,
    /// Priority (1 = highest)
    pub priority: u8,
    /// Lifecycle status
    pub status: GoalStatus,
}

/// Open injury or limitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryRecord {
    /// Injury identifier
    pub id: Uuid,
    /// Affected body part
    pub body_part: BodyPart,
    /// Explicitly restricted movement patterns (empty = body-part defaults)
    #[serde(default)]
    pub movement_restrictions: Vec<MovementPattern>,
    /// Date reported
    pub reported_on: NaiveDate,
    /// Whether the injury has been resolved
    #[serde(default)]
    pub resolved: bool,
}

impl InjuryRecord {
    /// Restricted patterns, falling back to the body part's defaults
    #[must_use]
    pub fn effective_restrictions(&self) -> Vec<MovementPattern> {
        if self.movement_restrictions.is_empty() {
            self.body_part.default_restrictions().to_vec()
        } else {
            self.movement_restrictions.clone()
        }
    }
}

/// User fitness profile, owned by an external collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owner
    pub user_id: Uuid,
    /// Per-discipline fitness levels; the disciplines the athlete trains
    pub fitness_levels: Vec<DisciplineLevel>,
    /// Weekly availability
    pub availability: WeeklyAvailability,
    /// Goals in any status
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Injury and limitation records
    #[serde(default)]
    pub injuries: Vec<InjuryRecord>,
}

impl UserProfile {
    /// Validate the profile before it feeds plan generation
    ///
    /// # Errors
    ///
    /// Returns `TrainingError::Validation` when availability is invalid, no
    /// discipline is listed, or a goal has priority 0.
    pub fn validate(&self) -> TrainingResult<()> {
        self.availability.validate()?;
        if self.fitness_levels.is_empty() {
            return Err(TrainingError::validation(
                "profile must list at least one discipline",
            ));
        }
        if let Some(goal) = self.goals.iter().find(|goal| goal.priority == 0) {
            return Err(TrainingError::validation(format!(
                "goal {} has priority 0; priorities start at 1",
                goal.id
            )));
        }
        Ok(())
    }

    /// Fitness level for a discipline, if the athlete trains it
    #[must_use]
    pub fn level_for(&self, discipline: Discipline) -> Option<FitnessLevel> {
        self.fitness_levels
            .iter()
            .find(|entry| entry.discipline == discipline)
            .map(|entry| entry.level)
    }

    /// Active goals ordered by priority (1 first), ties by target date
    #[must_use]
    pub fn active_goals(&self) -> Vec<&Goal> {
        let mut goals: Vec<&Goal> = self
            .goals
            .iter()
            .filter(|goal| goal.status == GoalStatus::Active)
            .collect();
        goals.sort_by_key(|goal| (goal.priority, goal.target_date));
        goals
    }

    /// Unresolved injury records
    pub fn open_injuries(&self) -> impl Iterator<Item = &InjuryRecord> {
        self.injuries.iter().filter(|injury| !injury.resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_set_round_trips_through_json() {
        let set: WeekdaySet = [Weekday::Mon, Weekday::Wed, Weekday::Fri]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Mon","Wed","Fri"]"#);
        let back: WeekdaySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.count(), 3);
    }

    #[test]
    fn test_availability_bounds() {
        let days = [Weekday::Mon, Weekday::Wed, Weekday::Fri];
        assert!(WeeklyAvailability::new(&days, 2, 3).validate().is_ok());
        assert!(WeeklyAvailability::new(&days, 0, 3).validate().is_err());
        assert!(WeeklyAvailability::new(&days, 3, 2).validate().is_err());
        assert!(WeeklyAvailability::new(&days, 2, 4).validate().is_err());
        assert!(WeeklyAvailability::new(&[], 1, 1).validate().is_err());
    }

    #[test]
    fn test_injury_falls_back_to_body_part_defaults() {
        let injury = InjuryRecord {
            id: Uuid::new_v4(),
            body_part: BodyPart::Ankle,
            movement_restrictions: Vec::new(),
            reported_on: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            resolved: false,
        };
        assert_eq!(
            injury.effective_restrictions(),
            vec![MovementPattern::Impact]
        );
    }
}
