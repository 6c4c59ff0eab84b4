//! Exercise catalog
//!
//! Muscle -> sub-muscle -> equipment category -> exercise names. The content
//! is supplied by the host app; this module only answers questions about it.

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Most substitutions offered for one exercise
pub const MAX_SUBSTITUTIONS: usize = 5;

/// Score of a substitute that uses the same equipment
pub const SAME_EQUIPMENT_SCORE: u8 = 90;

/// Score of a substitute that uses different equipment
pub const OTHER_EQUIPMENT_SCORE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCategory {
    Weightlifting,
    Cables,
    Bodyweight,
}

impl EquipmentCategory {
    pub const ALL: [EquipmentCategory; 3] = [
        EquipmentCategory::Weightlifting,
        EquipmentCategory::Cables,
        EquipmentCategory::Bodyweight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::Weightlifting => "weightlifting",
            EquipmentCategory::Cables => "cables",
            EquipmentCategory::Bodyweight => "bodyweight",
        }
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exercises of one sub-muscle, split by equipment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubMuscleGroup {
    pub name: String,
    #[serde(default)]
    pub weightlifting: Vec<String>,
    #[serde(default)]
    pub cables: Vec<String>,
    #[serde(default)]
    pub bodyweight: Vec<String>,
}

impl SubMuscleGroup {
    pub fn exercises(&self, category: EquipmentCategory) -> &[String] {
        match category {
            EquipmentCategory::Weightlifting => &self.weightlifting,
            EquipmentCategory::Cables => &self.cables,
            EquipmentCategory::Bodyweight => &self.bodyweight,
        }
    }

    fn exercises_mut(&mut self, category: EquipmentCategory) -> &mut Vec<String> {
        match category {
            EquipmentCategory::Weightlifting => &mut self.weightlifting,
            EquipmentCategory::Cables => &mut self.cables,
            EquipmentCategory::Bodyweight => &mut self.bodyweight,
        }
    }

    /// Every exercise with its category, in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentCategory, &str)> + '_ {
        EquipmentCategory::ALL
            .into_iter()
            .flat_map(move |cat| self.exercises(cat).iter().map(move |n| (cat, n.as_str())))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleGroup {
    pub name: String,
    pub sub_groups: Vec<SubMuscleGroup>,
}

/// Where an exercise lives in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLocation {
    pub name: String,
    pub muscle: String,
    pub sub_muscle: String,
    pub category: EquipmentCategory,
}

/// A candidate replacement for an exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub name: String,
    pub equipment: EquipmentCategory,
    pub match_score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseCatalog {
    groups: Vec<MuscleGroup>,
}

impl ExerciseCatalog {
    pub fn new(groups: Vec<MuscleGroup>) -> Self {
        Self { groups }
    }

    /// Load from the JSON list form:
    /// `[{"name": "Chest", "subGroups": [{"name": "Upper Chest", "weightlifting": [..]}]}]`
    pub fn from_json(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::Validation(format!("Invalid exercise catalog: {}", e)))
    }

    /// Add one exercise, creating its muscle and sub-muscle on first use
    pub fn insert(&mut self, muscle: &str, sub_muscle: &str, category: EquipmentCategory, name: &str) {
        let group = match self.groups.iter().position(|g| g.name == muscle) {
            Some(i) => &mut self.groups[i],
            None => {
                self.groups.push(MuscleGroup {
                    name: muscle.to_string(),
                    sub_groups: Vec::new(),
                });
                let last = self.groups.len() - 1;
                &mut self.groups[last]
            }
        };
        let sub = match group.sub_groups.iter().position(|s| s.name == sub_muscle) {
            Some(i) => &mut group.sub_groups[i],
            None => {
                group.sub_groups.push(SubMuscleGroup {
                    name: sub_muscle.to_string(),
                    ..Default::default()
                });
                let last = group.sub_groups.len() - 1;
                &mut group.sub_groups[last]
            }
        };
        sub.exercises_mut(category).push(name.to_string());
    }

    pub fn groups(&self) -> &[MuscleGroup] {
        &self.groups
    }

    /// Muscle names in catalog order
    pub fn muscles(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Every exercise of a muscle, across sub-muscles and equipment
    pub fn exercises_for(&self, muscle: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|g| g.name == muscle)
            .flat_map(|g| g.sub_groups.iter())
            .flat_map(|sub| sub.iter().map(|(_, n)| n))
            .collect()
    }

    fn locations(&self) -> impl Iterator<Item = ExerciseLocation> + '_ {
        self.groups.iter().flat_map(|g| {
            g.sub_groups.iter().flat_map(move |sub| {
                sub.iter().map(move |(category, name)| ExerciseLocation {
                    name: name.to_string(),
                    muscle: g.name.clone(),
                    sub_muscle: sub.name.clone(),
                    category,
                })
            })
        })
    }

    /// First place an exercise appears
    pub fn locate(&self, name: &str) -> Option<ExerciseLocation> {
        self.locations().find(|loc| loc.name == name)
    }

    /// Case-insensitive substring search. An empty query finds nothing.
    pub fn search(&self, query: &str) -> Vec<ExerciseLocation> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.locations()
            .filter(|loc| loc.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Alternatives from the same sub-muscle, same equipment first
    pub fn substitutions(&self, name: &str) -> Vec<Substitution> {
        let Some(origin) = self.locate(name) else {
            return Vec::new();
        };
        let Some(sub) = self
            .groups
            .iter()
            .find(|g| g.name == origin.muscle)
            .and_then(|g| g.sub_groups.iter().find(|s| s.name == origin.sub_muscle))
        else {
            return Vec::new();
        };

        let mut options: Vec<Substitution> = sub
            .iter()
            .filter(|(_, candidate)| *candidate != name)
            .map(|(category, candidate)| Substitution {
                name: candidate.to_string(),
                equipment: category,
                match_score: if category == origin.category {
                    SAME_EQUIPMENT_SCORE
                } else {
                    OTHER_EQUIPMENT_SCORE
                },
            })
            .collect();

        options.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        options.truncate(MAX_SUBSTITUTIONS);
        options
    }
}
