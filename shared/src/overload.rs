//! Exercise history and progressive overload
//!
//! After each workout the last sets and personal records of every exercise
//! are refreshed. The next session's suggestion is a simple rep-range
//! heuristic over the averages of the last sets.

use crate::models::{new_id, ActiveExercise, CompletedWorkout, ExerciseHistory, PersonalRecord, WorkoutSet};
use crate::units::WeightUnit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weight step used when nothing else is configured
pub const DEFAULT_INCREMENT: f64 = 2.5;

/// Average reps at or above which the load goes up and reps drop to 8
pub const HIGH_REP_THRESHOLD: f64 = 12.0;

/// Average reps below which a rep is added instead
pub const LOW_REP_THRESHOLD: f64 = 6.0;

/// Reps prescribed after a weight jump from the high-rep range
pub const RESET_REPS: u32 = 8;

/// Which branch of the heuristic produced a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    IncreaseWeight,
    AddRep,
    SmallWeightIncrease,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverloadSuggestion {
    pub suggested_sets: Vec<WorkoutSet>,
    pub reason: String,
    pub rule: Rule,
}

/// Fold one performed exercise into its history
pub fn update_history(
    existing: Option<&ExerciseHistory>,
    exercise: &ActiveExercise,
    date: NaiveDate,
) -> ExerciseHistory {
    let session = session_record(&exercise.sets);
    let previous = existing
        .map(|h| h.personal_record.clone())
        .unwrap_or_default();

    ExerciseHistory {
        exercise_name: exercise.name.clone(),
        last_performed: date,
        last_sets: exercise.sets.clone(),
        personal_record: PersonalRecord {
            max_weight: previous.max_weight.max(session.max_weight),
            max_reps: previous.max_reps.max(session.max_reps),
            max_volume: previous.max_volume.max(session.max_volume),
        },
    }
}

/// Refresh the history of every exercise in a workout.
///
/// An exercise logged twice in one workout builds on its own first entry.
pub fn update_histories(
    existing: &HashMap<String, ExerciseHistory>,
    workout: &CompletedWorkout,
) -> Vec<ExerciseHistory> {
    let mut updated: HashMap<&str, ExerciseHistory> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for exercise in &workout.exercises {
        let name = exercise.name.as_str();
        let base = updated.get(name).or_else(|| existing.get(name));
        let history = update_history(base, exercise, workout.date);
        if updated.insert(name, history).is_none() {
            order.push(name);
        }
    }

    order
        .into_iter()
        .filter_map(|name| updated.remove(name))
        .collect()
}

/// Best values within one session. An empty set list yields zeros.
fn session_record(sets: &[WorkoutSet]) -> PersonalRecord {
    sets.iter().fold(PersonalRecord::default(), |acc, set| PersonalRecord {
        max_weight: acc.max_weight.max(set.weight),
        max_reps: acc.max_reps.max(set.reps),
        max_volume: acc.max_volume.max(set.volume()),
    })
}

/// Next session's sets for an exercise.
///
/// `None` when the history has no sets to build on.
pub fn suggest(history: &ExerciseHistory, increment: f64, unit: WeightUnit) -> Option<OverloadSuggestion> {
    let last = &history.last_sets;
    if last.is_empty() {
        return None;
    }
    let increment = if increment.is_finite() && increment > 0.0 {
        increment
    } else {
        DEFAULT_INCREMENT
    };

    let count = last.len() as f64;
    let avg_weight = last.iter().map(|s| s.weight).sum::<f64>() / count;
    let avg_reps = last.iter().map(|s| s.reps as f64).sum::<f64>() / count;

    let suggestion = if avg_reps >= HIGH_REP_THRESHOLD {
        let weight = next_weight(avg_weight, increment);
        OverloadSuggestion {
            suggested_sets: fresh_sets(last, |_| (weight, RESET_REPS)),
            reason: format!("+{:.1}{} (Stronger!)", weight - avg_weight, unit.abbreviation()),
            rule: Rule::IncreaseWeight,
        }
    } else if avg_reps < LOW_REP_THRESHOLD {
        OverloadSuggestion {
            suggested_sets: fresh_sets(last, |s| (s.weight, s.reps.saturating_add(1))),
            reason: "+1 rep per set".to_string(),
            rule: Rule::AddRep,
        }
    } else {
        let weight = next_weight(avg_weight, increment);
        OverloadSuggestion {
            suggested_sets: fresh_sets(last, |s| (weight, s.reps)),
            reason: format!("+{:.1}{}", weight - avg_weight, unit.abbreviation()),
            rule: Rule::SmallWeightIncrease,
        }
    };

    Some(suggestion)
}

/// Smallest multiple of `increment` that is at least `avg + increment`
pub fn next_weight(avg_weight: f64, increment: f64) -> f64 {
    ((avg_weight + increment) / increment).ceil() * increment
}

fn fresh_sets(last: &[WorkoutSet], f: impl Fn(&WorkoutSet) -> (f64, u32)) -> Vec<WorkoutSet> {
    last.iter()
        .map(|set| {
            let (weight, reps) = f(set);
            WorkoutSet {
                id: new_id(),
                weight,
                reps,
                completed: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(weight: f64, reps: u32) -> WorkoutSet {
        WorkoutSet {
            id: new_id(),
            weight,
            reps,
            completed: true,
        }
    }

    fn history(sets: Vec<WorkoutSet>) -> ExerciseHistory {
        ExerciseHistory {
            exercise_name: "Bench Press (Barbell)".to_string(),
            last_performed: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            last_sets: sets,
            personal_record: PersonalRecord::default(),
        }
    }

    // =========================================================================
    // History Tests
    // =========================================================================

    #[test]
    fn test_update_history_keeps_best_records() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 8).unwrap();
        let previous = ExerciseHistory {
            personal_record: PersonalRecord {
                max_weight: 120.0,
                max_reps: 6,
                max_volume: 600.0,
            },
            ..history(vec![])
        };
        let exercise = ActiveExercise {
            name: "Bench Press (Barbell)".to_string(),
            sets: vec![set(100.0, 10), set(110.0, 3)],
        };

        let updated = update_history(Some(&previous), &exercise, date);
        assert_eq!(updated.last_performed, date);
        assert_eq!(updated.last_sets, exercise.sets);
        assert_eq!(updated.personal_record.max_weight, 120.0);
        assert_eq!(updated.personal_record.max_reps, 10);
        assert_eq!(updated.personal_record.max_volume, 1000.0);
    }

    #[test]
    fn test_update_history_first_time_empty_sets() {
        let exercise = ActiveExercise {
            name: "Plank".to_string(),
            sets: vec![],
        };
        let updated = update_history(None, &exercise, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(updated.personal_record, PersonalRecord::default());
    }

    #[test]
    fn test_update_histories_chains_duplicates() {
        let workout = CompletedWorkout {
            id: new_id(),
            date: NaiveDate::from_ymd_opt(2025, 5, 8).unwrap(),
            duration_seconds: 0,
            exercises: vec![
                ActiveExercise { name: "Squat".to_string(), sets: vec![set(140.0, 3)] },
                ActiveExercise { name: "Dips".to_string(), sets: vec![set(0.0, 15)] },
                ActiveExercise { name: "Squat".to_string(), sets: vec![set(100.0, 10)] },
            ],
            total_volume: 0.0,
            updated_at: None,
            deleted_at: None,
        };

        let histories = update_histories(&HashMap::new(), &workout);
        assert_eq!(histories.len(), 2);
        assert_eq!(histories[0].exercise_name, "Squat");
        assert_eq!(histories[0].personal_record.max_weight, 140.0);
        assert_eq!(histories[0].personal_record.max_reps, 10);
        assert_eq!(histories[0].last_sets[0].weight, 100.0);
        assert_eq!(histories[1].exercise_name, "Dips");
    }

    // =========================================================================
    // Suggestion Tests
    // =========================================================================

    #[test]
    fn test_high_reps_increase_weight() {
        let suggestion = suggest(&history(vec![set(60.0, 12), set(60.0, 12)]), 2.5, WeightUnit::Kg).unwrap();
        assert_eq!(suggestion.rule, Rule::IncreaseWeight);
        assert!(suggestion.suggested_sets.iter().all(|s| s.weight == 62.5 && s.reps == 8));
        assert_eq!(suggestion.reason, "+2.5kg (Stronger!)");
    }

    #[test]
    fn test_low_reps_add_rep() {
        let suggestion = suggest(&history(vec![set(100.0, 5), set(100.0, 4)]), 2.5, WeightUnit::Kg).unwrap();
        assert_eq!(suggestion.rule, Rule::AddRep);
        let reps: Vec<u32> = suggestion.suggested_sets.iter().map(|s| s.reps).collect();
        assert_eq!(reps, vec![6, 5]);
        assert!(suggestion.suggested_sets.iter().all(|s| s.weight == 100.0));
        assert_eq!(suggestion.reason, "+1 rep per set");
    }

    #[test]
    fn test_mid_reps_small_weight_increase() {
        let suggestion = suggest(&history(vec![set(61.0, 8), set(61.0, 10)]), 2.5, WeightUnit::Kg).unwrap();
        assert_eq!(suggestion.rule, Rule::SmallWeightIncrease);
        assert!(suggestion.suggested_sets.iter().all(|s| s.weight == 65.0));
        assert_eq!(suggestion.suggested_sets[1].reps, 10);
        assert_eq!(suggestion.reason, "+4.0kg");
    }

    #[test]
    fn test_lbs_increment_and_reason() {
        let suggestion = suggest(&history(vec![set(135.0, 8)]), 5.0, WeightUnit::Lbs).unwrap();
        assert_eq!(suggestion.suggested_sets[0].weight, 140.0);
        assert_eq!(suggestion.reason, "+5.0lbs");
    }

    #[test]
    fn test_suggested_sets_are_fresh() {
        let last = vec![set(50.0, 8)];
        let suggestion = suggest(&history(last.clone()), 2.5, WeightUnit::Kg).unwrap();
        assert_ne!(suggestion.suggested_sets[0].id, last[0].id);
        assert!(!suggestion.suggested_sets[0].completed);
    }

    #[test]
    fn test_no_suggestion_without_sets() {
        assert!(suggest(&history(vec![]), 2.5, WeightUnit::Kg).is_none());
    }

    #[test]
    fn test_invalid_increment_falls_back() {
        let suggestion = suggest(&history(vec![set(60.0, 8)]), 0.0, WeightUnit::Kg).unwrap();
        assert_eq!(suggestion.suggested_sets[0].weight, 62.5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: weight rules land on a multiple of the increment above the average
        #[test]
        fn prop_next_weight_multiple_and_greater(
            weights in proptest::collection::vec(0u32..400, 1..8),
            reps in 6u32..30,
            inc_idx in 0usize..3
        ) {
            let increment = [1.25, 2.5, 5.0][inc_idx];
            let sets: Vec<WorkoutSet> = weights.iter().map(|w| set(*w as f64 / 2.0, reps)).collect();
            let avg = sets.iter().map(|s| s.weight).sum::<f64>() / sets.len() as f64;

            let suggestion = suggest(&history(sets), increment, WeightUnit::Kg).unwrap();
            prop_assert_ne!(suggestion.rule, Rule::AddRep);
            for s in &suggestion.suggested_sets {
                prop_assert!(s.weight > avg);
                let steps = s.weight / increment;
                prop_assert!((steps - steps.round()).abs() < 1e-9);
            }
        }
    }
}
