//! Wire data model shared by the backend client and the generation engine.
//!
//! All enums serialize as lowercase strings to match the backend's JSON
//! contract (`"pending"`, `"analyzing"`, ...).

use serde::{Deserialize, Serialize};

/// Lifecycle status of an in-flight generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Pipeline stage the backend (or the simulated sequence) is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStep {
    Analyzing,
    Bio,
    Image,
    Voice,
    Finalizing,
}

impl GenerationStep {
    /// Human-readable label shown next to the progress bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyzing => "Analyzing description",
            Self::Bio => "Generating biography",
            Self::Image => "Creating portrait",
            Self::Voice => "Synthesizing voice",
            Self::Finalizing => "Finalizing",
        }
    }
}

/// Point-in-time snapshot of one generation attempt.
///
/// Owned by the engine, overwritten on every tick, and cleared (set to
/// `None` on the watch channel) on every terminal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationProgress {
    pub status: GenerationStatus,
    pub step: GenerationStep,
    /// 0–100.
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GenerationProgress {
    pub fn new(status: GenerationStatus, step: GenerationStep, progress: u8) -> Self {
        Self {
            status,
            step,
            progress,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// The generated bundle for one synthesized persona.
///
/// Image and audio travel as base64 text; the prompts are kept so single
/// pieces can be regenerated without re-running the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedIdentity {
    pub image_base64: String,
    pub audio_base64: String,
    pub bio: String,
    pub image_prompt: String,
    pub voice_prompt: String,
}

/// A saved, named identity as listed by `GET /profiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProfile {
    pub name: String,
    pub bio: String,
    pub image_url: String,
    pub audio_url: String,
}

/// Backend-assigned handle for an asynchronous generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task_id: String,
}
