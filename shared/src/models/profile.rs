//! User Profile Model

use super::meal::HealthCondition;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// 用户健康档案
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Owning user id
    pub id: String,
    pub name: String,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    pub health_conditions: Vec<HealthCondition>,
    pub allergies: Vec<String>,
    pub dietary_preferences: Vec<String>,
    /// Derived, `None` until height and weight are known
    #[serde(default)]
    pub bmi: Option<f64>,
}

impl UserProfile {
    /// Profile returned for a user that never saved one
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            id: user_id.into(),
            name: String::new(),
            age: 0,
            height_cm: 0.0,
            weight_kg: 0.0,
            gender: Gender::Other,
            health_conditions: Vec::new(),
            allergies: Vec::new(),
            dietary_preferences: Vec::new(),
            bmi: None,
        }
    }

    /// A profile is complete once name, age, height and weight are set
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.age > 0 && self.height_cm > 0.0 && self.weight_kg > 0.0
    }

    /// Condition matching is skipped when no condition (or `none`) is declared
    pub fn matches_any_condition(&self) -> bool {
        !self.health_conditions.is_empty()
            && !self.health_conditions.contains(&HealthCondition::None)
    }
}

/// BMI = weight / (height/100)², rounded to one decimal
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let meters = height_cm / 100.0;
    let bmi = weight_kg / (meters * meters);
    Some((bmi * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_bmi() {
        assert_eq!(compute_bmi(180.0, 75.0), Some(23.1));
        assert_eq!(compute_bmi(0.0, 75.0), None);
        assert_eq!(compute_bmi(170.0, 0.0), None);
    }

    #[test]
    fn test_is_complete() {
        let mut p = UserProfile::empty("u1");
        assert!(!p.is_complete());

        p.name = "Ada".into();
        p.age = 34;
        p.height_cm = 168.0;
        assert!(!p.is_complete());

        p.weight_kg = 60.0;
        assert!(p.is_complete());

        p.name = "   ".into();
        assert!(!p.is_complete());
    }

    #[test]
    fn test_matches_any_condition() {
        let mut p = UserProfile::empty("u1");
        assert!(!p.matches_any_condition());

        p.health_conditions = vec![HealthCondition::Diabetes];
        assert!(p.matches_any_condition());

        p.health_conditions.push(HealthCondition::None);
        assert!(!p.matches_any_condition());
    }
}
