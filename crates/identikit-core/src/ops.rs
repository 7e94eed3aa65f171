//! Operation wrappers: user-facing notifications around the backend calls,
//! plus the cached profile directory.
//!
//! Failures never escape unannounced: every wrapper pushes a notification
//! (title + message, with a per-operation default when the backend gives
//! none) onto a channel the view layer drains, then returns the error so
//! callers can still branch on it.

use crate::client::IdentityBackend;
use crate::engine::GenerationEngine;
use crate::error::{ClientError, GenerationError, OpsError};
use crate::types::{GeneratedIdentity, SavedProfile};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

const DEFAULT_GENERATE_MESSAGE: &str = "Failed to generate identity. Please try again.";
const DEFAULT_IMAGE_MESSAGE: &str = "Failed to regenerate image. Please try again.";
const DEFAULT_VOICE_MESSAGE: &str = "Failed to regenerate voice. Please try again.";
const DEFAULT_SAVE_MESSAGE: &str = "Failed to save profile. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// One user-facing toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// Studio-level operations the view layer calls into.
pub struct StudioOps {
    backend: Arc<dyn IdentityBackend>,
    engine: Arc<GenerationEngine>,
    notify_tx: mpsc::UnboundedSender<Notification>,
    /// Cached `GET /profiles` result; invalidated by a successful save.
    profiles: Mutex<Option<Vec<SavedProfile>>>,
}

impl StudioOps {
    /// Wire the wrappers up. The returned receiver is the notification
    /// stream the view layer renders as toasts.
    pub fn new(
        backend: Arc<dyn IdentityBackend>,
        engine: Arc<GenerationEngine>,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        (
            Self {
                backend,
                engine,
                notify_tx,
                profiles: Mutex::new(None),
            },
            notify_rx,
        )
    }

    pub fn engine(&self) -> &GenerationEngine {
        &self.engine
    }

    /// Generate a full identity, notifying on failure.
    pub async fn generate(
        &self,
        description: &str,
    ) -> Result<GeneratedIdentity, GenerationError> {
        match self.engine.generate(description).await {
            Ok(identity) => Ok(identity),
            Err(err) => {
                self.notify_failure("Generation Failed", &err.to_string(), DEFAULT_GENERATE_MESSAGE);
                Err(err)
            }
        }
    }

    /// New portrait for the identity's image prompt; returns the new base64
    /// image data.
    pub async fn regenerate_image(&self, image_prompt: &str) -> Result<String, ClientError> {
        match self.backend.regenerate_image(image_prompt).await {
            Ok(image) => Ok(image),
            Err(err) => {
                self.notify_failure(
                    "Image Regeneration Failed",
                    &err.to_string(),
                    DEFAULT_IMAGE_MESSAGE,
                );
                Err(err)
            }
        }
    }

    /// New voice sample for the identity's voice prompt; returns the new
    /// base64 audio data.
    pub async fn regenerate_voice(
        &self,
        voice_prompt: &str,
        bio: &str,
    ) -> Result<String, ClientError> {
        match self.backend.regenerate_voice(voice_prompt, bio).await {
            Ok(audio) => Ok(audio),
            Err(err) => {
                self.notify_failure(
                    "Voice Regeneration Failed",
                    &err.to_string(),
                    DEFAULT_VOICE_MESSAGE,
                );
                Err(err)
            }
        }
    }

    /// Persist an identity under `name`. A successful save invalidates the
    /// cached profile list so the next listing reflects it.
    pub async fn save_profile(
        &self,
        name: &str,
        bio: &str,
        identity: &GeneratedIdentity,
    ) -> Result<(), OpsError> {
        if name.trim().is_empty() {
            return Err(OpsError::EmptyProfileName);
        }

        match self
            .backend
            .save_profile(name, bio, &identity.image_base64, &identity.audio_base64)
            .await
        {
            Ok(success) => {
                if !success {
                    warn!(name, "backend answered the save request with success=false");
                }
                self.invalidate_profiles().await;
                self.notify(Notification {
                    title: "Profile Saved".to_string(),
                    message: "Identity has been saved to the gallery.".to_string(),
                    severity: Severity::Info,
                });
                Ok(())
            }
            Err(err) => {
                self.notify_failure("Save Failed", &err.to_string(), DEFAULT_SAVE_MESSAGE);
                Err(err.into())
            }
        }
    }

    /// Saved profiles, served from cache until a save invalidates it.
    pub async fn profiles(&self) -> Result<Vec<SavedProfile>, ClientError> {
        let mut cached = self.profiles.lock().await;
        if let Some(list) = cached.as_ref() {
            return Ok(list.clone());
        }
        let list = self.backend.list_profiles().await?;
        *cached = Some(list.clone());
        Ok(list)
    }

    pub async fn invalidate_profiles(&self) {
        *self.profiles.lock().await = None;
    }

    fn notify_failure(&self, title: &str, message: &str, fallback: &str) {
        let message = if message.trim().is_empty() {
            fallback
        } else {
            message
        };
        warn!(title, message, "operation failed");
        self.notify(Notification {
            title: title.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn notify(&self, notification: Notification) {
        if notification.severity == Severity::Info {
            info!(title = %notification.title, "{}", notification.message);
        }
        // A view layer that went away just means nobody is listening.
        let _ = self.notify_tx.send(notification);
    }
}
