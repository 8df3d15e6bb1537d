//! Score submission checks.
//!
//! Small scores only get structural checks. Anything above
//! [`ANTI_CHEAT_THRESHOLD`] must carry a session token whose signed start
//! time makes the score physically reachable.

use drift_core::constants::{ANTI_CHEAT_THRESHOLD, MAX_PLAYER_NAME_CHARS, MAX_SCORE};
use drift_core::pace::{check_pace, PaceVerdict};

use crate::session::{SessionError, SessionKey};

pub(crate) const MSG_STORE_WRITE_FAILED: &str = "Erreur lors de l'envoi du score";
pub(crate) const MSG_SERVER_MISCONFIGURED: &str = "Configuration serveur manquante";

/// Why a submission was refused. `Display` is the message shown to players.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum Rejection {
    #[error("Pseudo invalide (max 15 chars)")]
    InvalidName,
    #[error("Score invalide")]
    InvalidScore,
    #[error("Session invalide (anti-cheat)")]
    MissingSession,
    #[error("Session corrompue")]
    CorruptedSession,
    #[error("Anomalie temporelle détectée")]
    TemporalAnomaly,
    #[error("Score impossible (vitesse anormale)")]
    ImpossibleSpeed,
}

impl Rejection {
    /// Rejections that point at a tampered client rather than a typo.
    pub(crate) fn is_cheat_signal(&self) -> bool {
        matches!(
            self,
            Self::CorruptedSession | Self::TemporalAnomaly | Self::ImpossibleSpeed
        )
    }
}

pub(crate) fn validate_player_name(name: &str) -> Result<(), Rejection> {
    if name.is_empty() || name.chars().count() > MAX_PLAYER_NAME_CHARS {
        return Err(Rejection::InvalidName);
    }
    Ok(())
}

/// Validates a submission at time `now_ms` and returns the integer score to
/// record.
pub(crate) fn validate_submission(
    key: &SessionKey,
    player_name: &str,
    score: f64,
    session_token: Option<&str>,
    now_ms: u64,
) -> Result<u32, Rejection> {
    validate_player_name(player_name)?;

    if !score.is_finite() || score < 0.0 || score > f64::from(MAX_SCORE) {
        return Err(Rejection::InvalidScore);
    }

    if score > f64::from(ANTI_CHEAT_THRESHOLD) {
        let Some(token) = session_token else {
            return Err(Rejection::MissingSession);
        };

        let issued_at_ms = match key.verify(token) {
            Ok(issued_at_ms) => issued_at_ms,
            Err(err) => {
                if err == SessionError::BadSignature {
                    tracing::warn!(player = player_name, score, "session signature mismatch");
                }
                return Err(Rejection::CorruptedSession);
            }
        };

        let elapsed_secs = (now_ms as f64 - issued_at_ms as f64) / 1000.0;
        match check_pace(score, elapsed_secs) {
            PaceVerdict::TooSoon => {
                tracing::warn!(
                    player = player_name,
                    score,
                    elapsed_secs,
                    "high score submitted too soon after session start"
                );
                return Err(Rejection::TemporalAnomaly);
            }
            PaceVerdict::TooFast => {
                tracing::warn!(
                    player = player_name,
                    score,
                    elapsed_secs,
                    points_per_sec = score / elapsed_secs,
                    "score rate exceeds plausibility bound"
                );
                return Err(Rejection::ImpossibleSpeed);
            }
            PaceVerdict::Unchecked | PaceVerdict::Plausible => {}
        }
    }

    Ok(score.floor() as u32)
}
