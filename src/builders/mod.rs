//! Request builders, one per endpoint family.
//!
//! Setters only record values. Every trigger call validates the current
//! parameter snapshot first and performs no I/O when a value is out of range.

pub mod audio;
pub mod chat;
pub mod completion;
pub mod conversation;
pub mod edit;
pub mod image;

pub use audio::{AudioTranscription, AudioTranslation};
pub use chat::ChatCompletion;
pub use completion::Completion;
pub use conversation::ConversationLog;
pub use edit::Edit;
pub use image::{ImageEdit, ImageGeneration, ImageVariation};

use crate::models::Stop;
use crate::{Error, Result};

pub(crate) const MAX_RESULTS: u32 = 10;

pub(crate) fn check_range(name: &str, value: Option<f32>, min: f32, max: f32) -> Result<()> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(Error::Validation(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, v
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn check_temperature(value: Option<f32>, max: f32) -> Result<()> {
    check_range("temperature", value, 0.0, max)
}

pub(crate) fn check_top_p(value: Option<f32>) -> Result<()> {
    check_range("top_p", value, 0.0, 1.0)
}

pub(crate) fn check_penalty(name: &str, value: Option<f32>) -> Result<()> {
    check_range(name, value, -2.0, 2.0)
}

/// Result count `n`, 1 to 10 when set.
pub(crate) fn check_count(value: Option<u32>) -> Result<()> {
    match value {
        Some(n) if !(1..=MAX_RESULTS).contains(&n) => Err(Error::Validation(format!(
            "n must be between 1 and {}, got {}",
            MAX_RESULTS, n
        ))),
        _ => Ok(()),
    }
}

/// `best_of` must exceed `n`; an unset `n` counts as 1.
pub(crate) fn check_best_of(best_of: Option<u32>, n: Option<u32>) -> Result<()> {
    match best_of {
        Some(best_of) if best_of <= n.unwrap_or(1) => Err(Error::Validation(format!(
            "best_of ({}) must be greater than n ({})",
            best_of,
            n.unwrap_or(1)
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn check_stop(stop: Option<&Stop>) -> Result<()> {
    let Some(stop) = stop else {
        return Ok(());
    };

    let sequences = stop.sequences();
    if sequences.is_empty() || sequences.len() > Stop::MAX_SEQUENCES {
        return Err(Error::Validation(format!(
            "stop takes 1 to {} sequences, got {}",
            Stop::MAX_SEQUENCES,
            sequences.len()
        )));
    }
    if sequences.iter().any(|s| s.is_empty()) {
        return Err(Error::Validation(
            "stop sequences must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_not_empty(name: &str, value: &[u8]) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_bounds_inclusive() {
        assert!(check_temperature(Some(0.0), 2.0).is_ok());
        assert!(check_temperature(Some(2.0), 2.0).is_ok());
        assert!(check_temperature(None, 2.0).is_ok());
        assert!(check_temperature(Some(2.01), 2.0).is_err());
        assert!(check_temperature(Some(-0.1), 2.0).is_err());
        assert!(check_temperature(Some(f32::NAN), 2.0).is_err());
    }

    #[test]
    fn test_check_penalty_and_top_p() {
        assert!(check_penalty("presence_penalty", Some(-2.0)).is_ok());
        assert!(check_penalty("presence_penalty", Some(2.5)).is_err());
        assert!(check_top_p(Some(1.0)).is_ok());
        assert!(check_top_p(Some(1.5)).is_err());
    }

    #[test]
    fn test_check_count() {
        assert!(check_count(Some(1)).is_ok());
        assert!(check_count(Some(10)).is_ok());
        assert!(check_count(Some(0)).is_err());
        assert!(check_count(Some(11)).is_err());
    }

    #[test]
    fn test_check_best_of() {
        assert!(check_best_of(None, Some(3)).is_ok());
        assert!(check_best_of(Some(4), Some(3)).is_ok());
        assert!(check_best_of(Some(2), None).is_ok());
        assert!(check_best_of(Some(2), Some(3)).is_err());
        assert!(check_best_of(Some(3), Some(3)).is_err());
        assert!(check_best_of(Some(1), None).is_err());
    }

    #[test]
    fn test_check_stop() {
        assert!(check_stop(None).is_ok());
        assert!(check_stop(Some(&Stop::from("\n"))).is_ok());
        assert!(check_stop(Some(&Stop::Many(vec![]))).is_err());
        assert!(check_stop(Some(&Stop::from(""))).is_err());

        let five: &[&str] = &["a", "b", "c", "d", "e"];
        let err = check_stop(Some(&Stop::from(five))).unwrap_err();
        assert!(err.to_string().contains("got 5"));
    }
}
