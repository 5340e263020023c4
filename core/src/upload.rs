//! Multipart bodies for file uploads.
//!
//! A single file goes under `file`, several files each go under a repeated
//! `files` part, and metadata travels as plain text parts. File bytes are
//! never inlined into JSON.

use std::path::Path;

/// Part name for a single uploaded file.
pub const SINGLE_FILE_FIELD: &str = "file";
/// Part name repeated once per file in a multi-file upload.
pub const MULTIPLE_FILES_FIELD: &str = "files";

/// A file held in memory, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, naming the part after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// One file or many.
#[derive(Debug, Clone)]
pub enum UploadFiles {
    Single(UploadFile),
    Multiple(Vec<UploadFile>),
}

impl From<UploadFile> for UploadFiles {
    fn from(file: UploadFile) -> Self {
        UploadFiles::Single(file)
    }
}

impl From<Vec<UploadFile>> for UploadFiles {
    fn from(files: Vec<UploadFile>) -> Self {
        UploadFiles::Multiple(files)
    }
}

/// Files plus optional string metadata, consumed by one upload call.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub files: UploadFiles,
    pub fields: Vec<(String, String)>,
}

impl UploadRequest {
    pub fn new(files: impl Into<UploadFiles>) -> Self {
        Self {
            files: files.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self.files, UploadFiles::Multiple(_))
    }

    pub fn into_multipart(self) -> MultipartBody {
        let mut body = MultipartBody::default();
        match self.files {
            UploadFiles::Single(file) => body.push_file(SINGLE_FILE_FIELD, file),
            UploadFiles::Multiple(files) => {
                for file in files {
                    body.push_file(MULTIPLE_FILES_FIELD, file);
                }
            }
        }
        for (name, value) in self.fields {
            body.push_text(name, value);
        }
        body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    File { name: String, file: UploadFile },
    Text { name: String, value: String },
}

impl Part {
    pub fn name(&self) -> &str {
        match self {
            Part::File { name, .. } | Part::Text { name, .. } => name,
        }
    }
}

/// Ordered multipart parts. The boundary is chosen by the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<Part>,
}

impl MultipartBody {
    pub fn push_file(&mut self, name: impl Into<String>, file: UploadFile) {
        self.parts.push(Part::File {
            name: name.into(),
            file,
        });
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub(crate) fn into_form(self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            form = match part {
                Part::Text { name, value } => form.text(name, value),
                Part::File { name, file } => {
                    let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
                    if let Some(content_type) = file.content_type {
                        part = part.mime_str(&content_type)?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
