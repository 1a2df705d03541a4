use futures::future::try_join_all;
use std::path::{Path, PathBuf};

use crate::errors::{PlannerError, PlannerResult};
use crate::form::FormState;
use crate::wire::GenerationMode;

/// A file the user selected: its display name and decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub name: String,
    pub content: String,
}

/// Prompt-ready text for the three context channels. Empty means "omit".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedInputs {
    pub previous_content: String,
    pub reference: String,
    pub style: String,
}

pub fn wrap_file(file: &FileInput) -> String {
    format!(
        "--- START OF FILE: {name} ---\n\n{content}\n\n--- END OF FILE: {name} ---\n\n",
        name = file.name,
        content = file.content
    )
}

/// Wrap every file in selection order and concatenate.
pub fn wrap_files(files: &[FileInput]) -> String {
    files.iter().map(wrap_file).collect()
}

/// File-derived text first, free text after, separated by one blank line.
pub fn combine(file_text: &str, free_text: &str) -> String {
    [file_text, free_text]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub async fn read_file(path: &Path) -> PlannerResult<FileInput> {
    let name = display_name(path);
    match fs_err::tokio::read_to_string(path).await {
        Ok(content) => Ok(FileInput { name, content }),
        Err(e) => {
            log::error!("reading {} failed: {}", path.display(), e);
            Err(PlannerError::FileRead { name, message: e.to_string() })
        }
    }
}

/// Read all files concurrently; results keep selection order and the first
/// failure aborts the whole channel.
pub async fn read_files(paths: &[PathBuf]) -> PlannerResult<Vec<FileInput>> {
    try_join_all(paths.iter().map(|p| read_file(p))).await
}

async fn multi_file_channel(paths: &[PathBuf], free_text: &str) -> PlannerResult<String> {
    let files = read_files(paths).await?;
    Ok(combine(&wrap_files(&files), free_text))
}

// The previous-content calendar is a single upload used as-is.
async fn previous_content_channel(path: Option<&Path>, free_text: &str) -> PlannerResult<String> {
    let from_file = match path {
        Some(p) => read_file(p).await?.content,
        None => String::new(),
    };
    Ok(combine(&from_file, free_text))
}

/// Read and merge every channel the form's mode uses. Channels are read
/// concurrently and all must succeed before anything is returned.
pub async fn aggregate(form: &FormState) -> PlannerResult<AggregatedInputs> {
    let previous = async {
        match form.mode {
            GenerationMode::Calendar => {
                previous_content_channel(form.previous_content_file.as_deref(), &form.previous_content_text).await
            }
            GenerationMode::Script => Ok(String::new()),
        }
    };
    let reference = multi_file_channel(&form.reference_files, &form.reference_text);
    let style = multi_file_channel(&form.style_files, &form.style_text);

    let (previous_content, reference, style) = tokio::try_join!(previous, reference, style)?;
    log::debug!(
        "aggregated inputs: previous={}B reference={}B style={}B",
        previous_content.len(),
        reference.len(),
        style.len()
    );
    Ok(AggregatedInputs { previous_content, reference, style })
}
