use crate::error::PestGuardError;
use crate::llm::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::ConversationSession;

/// A saved snapshot of a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTranscript {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub model: String,
    pub messages: Vec<Message>,
}

impl SavedTranscript {
    pub fn from_session(session: &ConversationSession) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            saved_at: Utc::now(),
            model: session.options().model.clone(),
            messages: session.history().to_vec(),
        }
    }
}

/// Manages transcript files in a records directory, one JSON file per save.
pub struct TranscriptStore {
    base_dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn transcript_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", id))
    }

    /// Snapshot the session and write it to disk. Returns the new transcript id.
    pub fn save(&self, session: &ConversationSession) -> Result<String, PestGuardError> {
        let transcript = SavedTranscript::from_session(session);
        self.write(&transcript)?;
        Ok(transcript.id)
    }

    pub fn write(&self, transcript: &SavedTranscript) -> Result<(), PestGuardError> {
        fs::create_dir_all(&self.base_dir).map_err(|e| {
            PestGuardError::write_failed(&self.base_dir, e)
        })?;

        let path = self.transcript_path(&transcript.id);
        let contents = serde_json::to_string_pretty(transcript)?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).map_err(|e| PestGuardError::write_failed(&path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| PestGuardError::write_failed(&path, e))?;

        tracing::debug!(id = %transcript.id, "saved transcript");
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<SavedTranscript, PestGuardError> {
        let path = self.transcript_path(id);
        let contents =
            fs::read_to_string(&path).map_err(|e| PestGuardError::unreadable(&path, e))?;
        serde_json::from_str(&contents).map_err(|e| PestGuardError::unreadable(&path, e))
    }

    /// Saved transcripts, most recent first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<SavedTranscript>, PestGuardError> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut transcripts = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(id) {
                Ok(t) => transcripts.push(t),
                Err(e) => tracing::warn!("skipping transcript: {e}"),
            }
        }

        transcripts.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(transcripts)
    }
}
