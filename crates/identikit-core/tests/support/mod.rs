//! Scripted [`IdentityBackend`] fake shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use identikit_core::{
    ClientError, GeneratedIdentity, GenerationProgress, GenerationStatus, GenerationStep,
    IdentityBackend, SavedProfile, TaskHandle,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn identity(bio: &str) -> GeneratedIdentity {
    GeneratedIdentity {
        image_base64: "aW1hZ2U=".to_string(),
        audio_base64: "YXVkaW8=".to_string(),
        bio: bio.to_string(),
        image_prompt: "passport photo".to_string(),
        voice_prompt: "calm baritone".to_string(),
    }
}

pub fn snapshot(status: GenerationStatus, step: GenerationStep, progress: u8) -> GenerationProgress {
    GenerationProgress::new(status, step, progress)
}

/// One scripted reply for a `generation_progress` poll.
pub enum ProgressReply {
    Snapshot(GenerationProgress),
    Error(String),
}

/// In-memory backend with per-endpoint scripts and call counters.
pub struct FakeBackend {
    /// `Some` → `start_generation` succeeds with this task id.
    task_id: Option<String>,
    /// Replies consumed per poll; when empty, `idle_snapshot` is returned.
    progress_script: Mutex<VecDeque<ProgressReply>>,
    idle_snapshot: GenerationProgress,
    result_identity: GeneratedIdentity,

    sync_identity: Option<GeneratedIdentity>,
    sync_error: Option<String>,
    sync_delay: Duration,

    image_error: Option<String>,
    voice_error: Option<String>,
    save_error: Option<String>,
    profiles: Mutex<Vec<SavedProfile>>,

    pub start_calls: AtomicUsize,
    pub progress_calls: AtomicUsize,
    pub result_calls: AtomicUsize,
    pub sync_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl FakeBackend {
    /// Backend without async support: the start call answers like a 404.
    pub fn sync_only(result: GeneratedIdentity) -> Self {
        Self {
            task_id: None,
            sync_identity: Some(result.clone()),
            result_identity: result,
            ..Self::empty()
        }
    }

    /// Backend with async task support under the given task id.
    pub fn with_task(task_id: &str, result: GeneratedIdentity) -> Self {
        Self {
            task_id: Some(task_id.to_string()),
            result_identity: result,
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            task_id: None,
            progress_script: Mutex::new(VecDeque::new()),
            idle_snapshot: snapshot(GenerationStatus::Processing, GenerationStep::Image, 55),
            result_identity: identity("unset"),
            sync_identity: None,
            sync_error: None,
            sync_delay: Duration::ZERO,
            image_error: None,
            voice_error: None,
            save_error: None,
            profiles: Mutex::new(Vec::new()),
            start_calls: AtomicUsize::new(0),
            progress_calls: AtomicUsize::new(0),
            result_calls: AtomicUsize::new(0),
            sync_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_sync_delay(mut self, delay: Duration) -> Self {
        self.sync_delay = delay;
        self
    }

    pub fn with_sync_error(mut self, message: &str) -> Self {
        self.sync_identity = None;
        self.sync_error = Some(message.to_string());
        self
    }

    pub fn with_image_error(mut self, message: &str) -> Self {
        self.image_error = Some(message.to_string());
        self
    }

    pub fn with_voice_error(mut self, message: &str) -> Self {
        self.voice_error = Some(message.to_string());
        self
    }

    pub fn with_save_error(mut self, message: &str) -> Self {
        self.save_error = Some(message.to_string());
        self
    }

    pub fn with_profiles(self, profiles: Vec<SavedProfile>) -> Self {
        *self.profiles.lock().unwrap() = profiles;
        self
    }

    pub fn script_progress(self, replies: Vec<ProgressReply>) -> Self {
        *self.progress_script.lock().unwrap() = replies.into();
        self
    }
}

#[async_trait]
impl IdentityBackend for FakeBackend {
    async fn generate_identity(
        &self,
        _description: &str,
    ) -> Result<GeneratedIdentity, ClientError> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        if !self.sync_delay.is_zero() {
            tokio::time::sleep(self.sync_delay).await;
        }
        if let Some(message) = &self.sync_error {
            return Err(ClientError::Backend(message.clone()));
        }
        Ok(self
            .sync_identity
            .clone()
            .expect("FakeBackend has neither a sync identity nor a sync error"))
    }

    async fn regenerate_image(&self, _image_prompt: &str) -> Result<String, ClientError> {
        match &self.image_error {
            Some(message) => Err(ClientError::Backend(message.clone())),
            None => Ok("bmV3LWltYWdl".to_string()),
        }
    }

    async fn regenerate_voice(
        &self,
        _voice_prompt: &str,
        _bio: &str,
    ) -> Result<String, ClientError> {
        match &self.voice_error {
            Some(message) => Err(ClientError::Backend(message.clone())),
            None => Ok("bmV3LWF1ZGlv".to_string()),
        }
    }

    async fn save_profile(
        &self,
        name: &str,
        bio: &str,
        _image_base64: &str,
        _audio_base64: &str,
    ) -> Result<bool, ClientError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.save_error {
            return Err(ClientError::Backend(message.clone()));
        }
        self.profiles.lock().unwrap().push(SavedProfile {
            name: name.to_string(),
            bio: bio.to_string(),
            image_url: format!("/profiles/{name}/image.png"),
            audio_url: format!("/profiles/{name}/voice.mp3"),
        });
        Ok(true)
    }

    async fn list_profiles(&self) -> Result<Vec<SavedProfile>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn start_generation(&self, _description: &str) -> Result<TaskHandle, ClientError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        match &self.task_id {
            Some(task_id) => Ok(TaskHandle {
                task_id: task_id.clone(),
            }),
            None => Err(ClientError::Transport(
                "request failed with status 404 Not Found".to_string(),
            )),
        }
    }

    async fn generation_progress(
        &self,
        _task_id: &str,
    ) -> Result<GenerationProgress, ClientError> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        match self.progress_script.lock().unwrap().pop_front() {
            Some(ProgressReply::Snapshot(snapshot)) => Ok(snapshot),
            Some(ProgressReply::Error(message)) => Err(ClientError::Transport(message)),
            None => Ok(self.idle_snapshot.clone()),
        }
    }

    async fn generation_result(&self, _task_id: &str) -> Result<GeneratedIdentity, ClientError> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result_identity.clone())
    }
}
