//! Workout tracker state machine
//!
//! Setup (pick muscles) -> Selection (pick exercises) -> Active -> Summary.
//! Every operation checks the phase and its indices first; a rejected
//! operation leaves the session untouched.

use crate::clock::{Clock, ClockMode, Countdown};
use crate::errors::{DomainError, DomainResult};
use crate::models::{new_id, ActiveExercise, CompletedWorkout, WorkoutSet, WorkoutTemplate};
use crate::overload::OverloadSuggestion;
use crate::stats::workout_volume;
use crate::units::WeightUnit;
use crate::validation::{parse_number_or_zero, validate_reps, validate_set_weight_in};
use chrono::NaiveDate;
use std::fmt;
use std::time::Duration;

/// Rest between sets when nothing else is configured
pub const DEFAULT_REST_SECONDS: u64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Setup,
    Selection,
    Active,
    Summary,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionPhase::Setup => "choosing muscles",
            SessionPhase::Selection => "choosing exercises",
            SessionPhase::Active => "a workout is running",
            SessionPhase::Summary => "showing the summary",
        };
        f.write_str(label)
    }
}

/// Editable field of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Weight,
    Reps,
}

#[derive(Debug, Clone)]
pub struct WorkoutSession {
    phase: SessionPhase,
    selected_muscles: Vec<String>,
    selected_exercises: Vec<String>,
    exercises: Vec<ActiveExercise>,
    clock: Clock,
    rest: Option<Countdown>,
    rest_seconds: u64,
    weight_unit: WeightUnit,
    summary: Option<CompletedWorkout>,
}

impl Default for WorkoutSession {
    fn default() -> Self {
        Self::new(DEFAULT_REST_SECONDS)
    }
}

impl WorkoutSession {
    pub fn new(rest_seconds: u64) -> Self {
        Self {
            phase: SessionPhase::Setup,
            selected_muscles: Vec::new(),
            selected_exercises: Vec::new(),
            exercises: Vec::new(),
            clock: Clock::new(),
            rest: None,
            rest_seconds,
            weight_unit: WeightUnit::default(),
            summary: None,
        }
    }

    /// Unit set weights are entered in; bounds the accepted load
    pub fn with_weight_unit(mut self, unit: WeightUnit) -> Self {
        self.weight_unit = unit;
        self
    }

    pub fn weight_unit(&self) -> WeightUnit {
        self.weight_unit
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn selected_muscles(&self) -> &[String] {
        &self.selected_muscles
    }

    pub fn selected_exercises(&self) -> &[String] {
        &self.selected_exercises
    }

    pub fn exercises(&self) -> &[ActiveExercise] {
        &self.exercises
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// The workout produced by the last `finish`
    pub fn summary(&self) -> Option<&CompletedWorkout> {
        self.summary.as_ref()
    }

    // ========================================================================
    // Setup / Selection
    // ========================================================================

    pub fn toggle_muscle(&mut self, name: &str) -> DomainResult<()> {
        self.require(&[SessionPhase::Setup, SessionPhase::Selection], "change muscles")?;
        toggle_in(&mut self.selected_muscles, name);
        Ok(())
    }

    pub fn proceed_to_selection(&mut self) -> DomainResult<()> {
        self.require(&[SessionPhase::Setup], "choose exercises")?;
        if self.selected_muscles.is_empty() {
            return Err(DomainError::Validation(
                "Select at least one muscle group".to_string(),
            ));
        }
        self.phase = SessionPhase::Selection;
        Ok(())
    }

    pub fn back_to_setup(&mut self) -> DomainResult<()> {
        self.require(&[SessionPhase::Selection], "go back to muscles")?;
        self.phase = SessionPhase::Setup;
        Ok(())
    }

    pub fn toggle_exercise(&mut self, name: &str) -> DomainResult<()> {
        self.require(&[SessionPhase::Selection], "change exercises")?;
        toggle_in(&mut self.selected_exercises, name);
        Ok(())
    }

    /// Begin the workout with the selected exercises
    pub fn start(&mut self, now_ms: u64) -> DomainResult<()> {
        self.require(&[SessionPhase::Setup, SessionPhase::Selection], "start")?;
        let names = self.selected_exercises.clone();
        self.begin(names, now_ms)
    }

    /// Begin the workout with a template's exercises
    pub fn start_from_template(&mut self, template: &WorkoutTemplate, now_ms: u64) -> DomainResult<()> {
        self.require(&[SessionPhase::Setup, SessionPhase::Selection], "start")?;
        self.begin(template.exercises.clone(), now_ms)?;
        self.selected_exercises = template.exercises.clone();
        Ok(())
    }

    fn begin(&mut self, names: Vec<String>, now_ms: u64) -> DomainResult<()> {
        if names.is_empty() {
            return Err(DomainError::Validation(
                "Select at least one exercise".to_string(),
            ));
        }

        self.exercises = names.into_iter().map(ActiveExercise::new).collect();
        self.rest = None;
        self.summary = None;
        self.clock.set_mode(ClockMode::Stopwatch, now_ms);
        self.clock.reset();
        self.clock.set_active(true, now_ms);
        self.phase = SessionPhase::Active;
        Ok(())
    }

    // ========================================================================
    // Active
    // ========================================================================

    pub fn add_set(&mut self, exercise_idx: usize) -> DomainResult<()> {
        self.require(&[SessionPhase::Active], "add a set")?;
        self.exercise_mut(exercise_idx)?.sets.push(WorkoutSet::empty());
        Ok(())
    }

    /// Remove a set. The last remaining set of an exercise stays.
    pub fn remove_set(&mut self, exercise_idx: usize, set_idx: usize) -> DomainResult<()> {
        self.require(&[SessionPhase::Active], "remove a set")?;
        let exercise = self.exercise_mut(exercise_idx)?;
        if set_idx >= exercise.sets.len() {
            return Err(set_not_found(exercise_idx, set_idx));
        }
        if exercise.sets.len() == 1 {
            return Err(DomainError::Validation(
                "An exercise needs at least one set".to_string(),
            ));
        }
        exercise.sets.remove(set_idx);
        Ok(())
    }

    /// Update weight or reps from raw form input.
    ///
    /// Unparsable input reads as 0, negatives clamp to 0 and reps drop
    /// their fraction.
    pub fn update_set(
        &mut self,
        exercise_idx: usize,
        set_idx: usize,
        field: SetField,
        raw: &str,
    ) -> DomainResult<()> {
        self.require(&[SessionPhase::Active], "edit a set")?;
        let value = parse_number_or_zero(raw).max(0.0);
        let weight_unit = self.weight_unit;
        let set = self.set_mut(exercise_idx, set_idx)?;

        match field {
            SetField::Weight => {
                validate_set_weight_in(value, weight_unit).map_err(DomainError::Validation)?;
                set.weight = value;
            }
            SetField::Reps => {
                let reps = u32::try_from(value.trunc() as u64).unwrap_or(u32::MAX);
                validate_reps(reps).map_err(DomainError::Validation)?;
                set.reps = reps;
            }
        }
        Ok(())
    }

    /// Flip a set's completed flag. Completing arms the rest timer.
    pub fn toggle_set_complete(
        &mut self,
        exercise_idx: usize,
        set_idx: usize,
        now_ms: u64,
    ) -> DomainResult<bool> {
        self.require(&[SessionPhase::Active], "complete a set")?;
        let rest_seconds = self.rest_seconds;
        let set = self.set_mut(exercise_idx, set_idx)?;
        set.completed = !set.completed;
        let completed = set.completed;

        if completed {
            let mut rest = Countdown::new(Duration::from_secs(rest_seconds));
            rest.start(now_ms);
            self.rest = Some(rest);
        } else {
            self.rest = None;
        }
        Ok(completed)
    }

    /// Seconds of rest left. The timer clears itself once it reaches zero.
    pub fn rest_remaining_secs(&mut self, now_ms: u64) -> Option<u64> {
        let remaining = self.rest.as_ref()?.remaining_secs(now_ms);
        if remaining == 0 {
            self.rest = None;
            return None;
        }
        Some(remaining)
    }

    /// Swap an exercise for another, keeping its sets
    pub fn substitute_exercise(&mut self, exercise_idx: usize, new_name: &str) -> DomainResult<()> {
        self.require(&[SessionPhase::Active], "swap an exercise")?;
        if new_name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Exercise name cannot be empty".to_string(),
            ));
        }
        self.exercise_mut(exercise_idx)?.name = new_name.to_string();
        Ok(())
    }

    /// Replace an exercise's sets with an overload suggestion
    pub fn apply_suggestion(
        &mut self,
        exercise_idx: usize,
        suggestion: &OverloadSuggestion,
    ) -> DomainResult<()> {
        self.require(&[SessionPhase::Active], "apply a suggestion")?;
        if suggestion.suggested_sets.is_empty() {
            return Err(DomainError::Validation(
                "Suggestion has no sets".to_string(),
            ));
        }
        self.exercise_mut(exercise_idx)?.sets = suggestion.suggested_sets.clone();
        Ok(())
    }

    /// End the workout and build its summary
    pub fn finish(&mut self, now_ms: u64, today: NaiveDate) -> DomainResult<CompletedWorkout> {
        self.require(&[SessionPhase::Active], "finish")?;

        self.clock.set_mode(ClockMode::Stopwatch, now_ms);
        self.clock.set_active(false, now_ms);
        self.rest = None;

        let workout = CompletedWorkout {
            id: new_id(),
            date: today,
            duration_seconds: self.clock.duration_secs(now_ms),
            total_volume: workout_volume(&self.exercises),
            exercises: self.exercises.clone(),
            updated_at: None,
            deleted_at: None,
        };

        self.summary = Some(workout.clone());
        self.phase = SessionPhase::Summary;
        Ok(workout)
    }

    /// Back to an empty setup screen
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Setup;
        self.selected_muscles.clear();
        self.selected_exercises.clear();
        self.exercises.clear();
        self.summary = None;
        self.rest = None;
        self.clock.reset();
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn require(&self, allowed: &[SessionPhase], action: &'static str) -> DomainResult<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(action, self.phase))
        }
    }

    fn exercise_mut(&mut self, exercise_idx: usize) -> DomainResult<&mut ActiveExercise> {
        self.exercises
            .get_mut(exercise_idx)
            .ok_or_else(|| DomainError::NotFound(format!("exercise #{}", exercise_idx)))
    }

    fn set_mut(&mut self, exercise_idx: usize, set_idx: usize) -> DomainResult<&mut WorkoutSet> {
        self.exercise_mut(exercise_idx)?
            .sets
            .get_mut(set_idx)
            .ok_or_else(|| set_not_found(exercise_idx, set_idx))
    }
}

fn set_not_found(exercise_idx: usize, set_idx: usize) -> DomainError {
    DomainError::NotFound(format!("set #{} of exercise #{}", set_idx, exercise_idx))
}

fn toggle_in(list: &mut Vec<String>, name: &str) {
    if let Some(pos) = list.iter().position(|n| n == name) {
        list.remove(pos);
    } else {
        list.push(name.to_string());
    }
}
