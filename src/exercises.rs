//! Exercise catalog - built-in exercises used to seed the database

use serde::{Deserialize, Serialize};

/// How executions of an exercise are prescribed: rep-driven types count
/// repetitions, Cardio and Stretching count minutes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExerciseType {
    Strength,
    Cardio,
    Stretching,
    Mobility,
}

impl ExerciseType {
    pub fn name(&self) -> &'static str {
        match self {
            ExerciseType::Strength => "Strength",
            ExerciseType::Cardio => "Cardio",
            ExerciseType::Stretching => "Stretching",
            ExerciseType::Mobility => "Mobility",
        }
    }

    pub fn parse(name: &str) -> Option<ExerciseType> {
        ExerciseType::all()
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Default `on_reps` for new execution rows of this type
    pub fn on_reps_default(&self) -> bool {
        !matches!(self, ExerciseType::Cardio | ExerciseType::Stretching)
    }

    /// All exercise types for iteration
    pub fn all() -> &'static [ExerciseType] {
        &[
            ExerciseType::Strength,
            ExerciseType::Cardio,
            ExerciseType::Stretching,
            ExerciseType::Mobility,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct CatalogExercise {
    pub slug: &'static str,
    pub name: &'static str,
    pub exer_type: ExerciseType,
}

/// Built-in exercises inserted into an empty database
pub const BUILTIN_EXERCISES: &[CatalogExercise] = &[
    CatalogExercise {
        slug: "bench_press",
        name: "Bench Press",
        exer_type: ExerciseType::Strength,
    },
    CatalogExercise {
        slug: "back_squat",
        name: "Back Squat",
        exer_type: ExerciseType::Strength,
    },
    CatalogExercise {
        slug: "deadlift",
        name: "Deadlift",
        exer_type: ExerciseType::Strength,
    },
    CatalogExercise {
        slug: "pull_up",
        name: "Pull-up",
        exer_type: ExerciseType::Strength,
    },
    CatalogExercise {
        slug: "push_up",
        name: "Push-up",
        exer_type: ExerciseType::Strength,
    },
    CatalogExercise {
        slug: "barbell_row",
        name: "Barbell Row",
        exer_type: ExerciseType::Strength,
    },
    CatalogExercise {
        slug: "overhead_press",
        name: "Overhead Press",
        exer_type: ExerciseType::Strength,
    },
    CatalogExercise {
        slug: "biceps_curl",
        name: "Biceps Curl",
        exer_type: ExerciseType::Strength,
    },
    CatalogExercise {
        slug: "treadmill_run",
        name: "Treadmill Run",
        exer_type: ExerciseType::Cardio,
    },
    CatalogExercise {
        slug: "rowing_machine",
        name: "Rowing Machine",
        exer_type: ExerciseType::Cardio,
    },
    CatalogExercise {
        slug: "jump_rope",
        name: "Jump Rope",
        exer_type: ExerciseType::Cardio,
    },
    CatalogExercise {
        slug: "hamstring_stretch",
        name: "Hamstring Stretch",
        exer_type: ExerciseType::Stretching,
    },
    CatalogExercise {
        slug: "hip_flexor_stretch",
        name: "Hip Flexor Stretch",
        exer_type: ExerciseType::Stretching,
    },
    CatalogExercise {
        slug: "shoulder_circles",
        name: "Shoulder Circles",
        exer_type: ExerciseType::Mobility,
    },
];

pub fn find_builtin(slug: &str) -> Option<&'static CatalogExercise> {
    BUILTIN_EXERCISES.iter().find(|e| e.slug == slug)
}

pub fn find_builtin_by_name(name: &str) -> Option<&'static CatalogExercise> {
    BUILTIN_EXERCISES
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_reps_default() {
        assert!(ExerciseType::Strength.on_reps_default());
        assert!(ExerciseType::Mobility.on_reps_default());
        assert!(!ExerciseType::Cardio.on_reps_default());
        assert!(!ExerciseType::Stretching.on_reps_default());
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(ExerciseType::parse("cardio"), Some(ExerciseType::Cardio));
        assert_eq!(ExerciseType::parse("Strength"), Some(ExerciseType::Strength));
        assert_eq!(ExerciseType::parse("yoga"), None);
    }

    #[test]
    fn test_find_builtin() {
        let exer = find_builtin("bench_press").unwrap();
        assert_eq!(exer.name, "Bench Press");
        assert!(find_builtin("no_such_exercise").is_none());
    }

    #[test]
    fn test_find_builtin_by_name_case_insensitive() {
        let exer = find_builtin_by_name("bench press").unwrap();
        assert_eq!(exer.slug, "bench_press");
    }

    #[test]
    fn test_slugs_unique() {
        for (i, a) in BUILTIN_EXERCISES.iter().enumerate() {
            for b in &BUILTIN_EXERCISES[i + 1..] {
                assert_ne!(a.slug, b.slug);
            }
        }
    }
}
