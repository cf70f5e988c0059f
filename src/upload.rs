use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use bytes::Bytes;
use rand::Rng;

use crate::error::AppError;

/// A file attachment pulled out of a multipart request.
pub struct UploadedFile {
    pub original_name: String,
    pub data: Bytes,
}

/// Drain a multipart request into its text fields plus the attachment
/// carried under `file_field`, if one was sent. Empty attachments are
/// treated as absent so optional-photo forms can leave the input blank.
pub async fn collect_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(HashMap<String, String>, Option<UploadedFile>), AppError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if name == file_field {
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let data = field.bytes().await?;
            if !data.is_empty() {
                file = Some(UploadedFile {
                    original_name,
                    data,
                });
            }
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    Ok((fields, file))
}

/// Generate a stored filename of the form
/// `<unix-millis>-<random-int><original-extension>`.
pub fn stored_filename(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}{}", millis, suffix, ext)
}

/// Write uploaded bytes under `dir`, creating the directory if missing.
/// Returns the stored filename, not the full path.
pub async fn save(dir: &Path, original_name: &str, data: Bytes) -> Result<String, AppError> {
    tokio::fs::create_dir_all(dir).await?;
    let filename = stored_filename(original_name);
    tokio::fs::write(dir.join(&filename), &data).await?;
    Ok(filename)
}
