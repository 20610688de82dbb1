//! Name validation and generic name generation

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

pub const MIN_EXERCISE_NAME_LEN: usize = 3;
pub const MAX_EXERCISE_NAME_LEN: usize = 50;
pub const MIN_WORKOUT_NAME_LEN: usize = 5;
pub const MAX_WORKOUT_NAME_LEN: usize = 40;
pub const MIN_PLAN_NAME_LEN: usize = 5;
pub const MAX_PLAN_NAME_LEN: usize = 50;

// english alphabet, digits, croatian letters and a few punctuation marks
const NAME_CHARS: &str = r"[a-zA-Z0-9čćđšžČĆĐŠŽ,_'\-\(\) ]";

fn name_pattern(min: usize, max: usize) -> Regex {
    Regex::new(&format!("^{NAME_CHARS}{{{min},{max}}}$")).expect("static name pattern")
}

static EXERCISE_NAME: LazyLock<Regex> =
    LazyLock::new(|| name_pattern(MIN_EXERCISE_NAME_LEN, MAX_EXERCISE_NAME_LEN));
static WORKOUT_NAME: LazyLock<Regex> =
    LazyLock::new(|| name_pattern(MIN_WORKOUT_NAME_LEN, MAX_WORKOUT_NAME_LEN));
static PLAN_NAME: LazyLock<Regex> =
    LazyLock::new(|| name_pattern(MIN_PLAN_NAME_LEN, MAX_PLAN_NAME_LEN));

pub fn exercise_name_valid(name: &str) -> bool {
    EXERCISE_NAME.is_match(name)
}

pub fn workout_name_valid(name: &str) -> bool {
    WORKOUT_NAME.is_match(name)
}

pub fn plan_name_valid(name: &str) -> bool {
    PLAN_NAME.is_match(name)
}

fn name_check_error_msg(kind: &str, min: usize, max: usize) -> String {
    format!(
        "{kind} name:\n\
         \x20   - must be minimum {min} characters long\n\
         \x20   - must be maximum {max} characters long\n\
         \x20   - can contain english alphabet: a-z(upper/lower case)\n\
         \x20   - can contain croatian letters: \"č ć đ š ž\"(upper/lower case)\n\
         \x20   - can contain other characters: \" , _ - ' ( )\"\n"
    )
}

pub fn exercise_name_check_error_msg() -> String {
    name_check_error_msg("Exercise", MIN_EXERCISE_NAME_LEN, MAX_EXERCISE_NAME_LEN)
}

pub fn workout_name_check_error_msg() -> String {
    name_check_error_msg("Workout", MIN_WORKOUT_NAME_LEN, MAX_WORKOUT_NAME_LEN)
}

pub fn plan_name_check_error_msg() -> String {
    name_check_error_msg("Plan", MIN_PLAN_NAME_LEN, MAX_PLAN_NAME_LEN)
}

/// First free name of the form `base`, `base 1`, `base 2`, ... probing the
/// store through `taken`. Bounded so a broken probe cannot loop forever.
pub fn available_generic_name(
    base: &str,
    mut taken: impl FnMut(&str) -> Result<bool>,
) -> Result<String> {
    let mut name = base.to_string();
    for numb in 1..1000 {
        if !taken(&name)? {
            break;
        }
        name = format!("{base} {numb}");
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workout_name_length_bounds() {
        assert!(!workout_name_valid("abcd")); // 4 < 5
        assert!(workout_name_valid("abcde"));
        assert!(workout_name_valid(&"a".repeat(40)));
        assert!(!workout_name_valid(&"a".repeat(41)));
    }

    #[test]
    fn test_exercise_name_length_bounds() {
        assert!(!exercise_name_valid("ab"));
        assert!(exercise_name_valid("abc"));
        assert!(exercise_name_valid(&"a".repeat(50)));
        assert!(!exercise_name_valid(&"a".repeat(51)));
    }

    #[test]
    fn test_allowed_characters() {
        assert!(exercise_name_valid("Push-up (weighted), v2"));
        assert!(exercise_name_valid("Čučanj s šipkom"));
        assert!(!exercise_name_valid("squat!"));
        assert!(!exercise_name_valid("bench.press"));
    }

    #[test]
    fn test_plan_name_valid() {
        assert!(plan_name_valid("Summer Plan"));
        assert!(!plan_name_valid("Plan"));
    }

    #[test]
    fn test_error_msg_mentions_bounds() {
        let msg = workout_name_check_error_msg();
        assert!(msg.starts_with("Workout name:"));
        assert!(msg.contains("minimum 5"));
        assert!(msg.contains("maximum 40"));
    }

    #[test]
    fn test_generic_name_first_free() {
        let taken = ["Workout".to_string(), "Workout 1".to_string()];
        let name =
            available_generic_name("Workout", |n| Ok(taken.contains(&n.to_string()))).unwrap();
        assert_eq!(name, "Workout 2");
    }

    #[test]
    fn test_generic_name_base_free() {
        let name = available_generic_name("Workout", |_| Ok(false)).unwrap();
        assert_eq!(name, "Workout");
    }

    #[test]
    fn test_generic_name_probe_error_propagates() {
        let result = available_generic_name("Workout", |_| anyhow::bail!("db gone"));
        assert!(result.is_err());
    }
}
