use std::path::{Path, PathBuf};

use crate::error::{CallbriefError, Result};

/// Video extensions accepted in the input directory (matched case-insensitively).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv", "wmv", "m4v"];

/// Directory conventions under a single data root.
///
/// Every derived file is keyed by the stem of its source video, which is what
/// makes existence checks a sufficient resume mechanism.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join("videos")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("audio")
    }

    pub fn transcripts_dir(&self) -> PathBuf {
        self.root.join("transcripts")
    }

    pub fn summaries_dir(&self) -> PathBuf {
        self.root.join("summaries")
    }

    pub fn audio_path(&self, stem: &str) -> PathBuf {
        self.audio_dir().join(format!("{stem}.wav"))
    }

    pub fn transcript_path(&self, stem: &str) -> PathBuf {
        self.transcripts_dir().join(format!("{stem}.json"))
    }

    pub fn summary_path(&self, stem: &str) -> PathBuf {
        self.summaries_dir().join(format!("{stem}.txt"))
    }

    /// Create the three output directories if they are missing.
    pub async fn ensure_output_dirs(&self) -> Result<()> {
        for dir in [self.audio_dir(), self.transcripts_dir(), self.summaries_dir()] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// List video files in the input directory, lexicographically by file name.
    ///
    /// Fails if the input directory itself is missing; an existing but empty
    /// directory yields an empty list.
    pub fn discover_videos(&self, limit: Option<usize>) -> Result<Vec<PathBuf>> {
        let videos_dir = self.videos_dir();
        if !videos_dir.is_dir() {
            return Err(CallbriefError::MissingInputDir { path: videos_dir });
        }

        let mut videos: Vec<PathBuf> = std::fs::read_dir(&videos_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_video(path))
            .collect();
        videos.sort();

        if let Some(limit) = limit {
            videos.truncate(limit);
        }
        Ok(videos)
    }
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
}

/// The base name shared by a video and all of its derived files.
pub fn asset_stem(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
