//! Prediction upload form

use axum::body::Bytes;
use axum::extract::Multipart;
use validator::Validate;

use crate::{AppError, AppResult};

pub const ACCEPTED_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// `POST /predict/` multipart form
#[derive(Debug, Validate)]
pub struct PredictUpload {
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    pub image: Bytes,

    #[validate(range(exclusive_min = 0.0, message = "container_width must be positive"))]
    pub container_width: f64,

    #[validate(range(exclusive_min = 0.0, message = "container_height must be positive"))]
    pub container_height: f64,
}

impl PredictUpload {
    /// Read `file`, `container_width` and `container_height`; other fields are
    /// ignored. Missing or unparseable fields are validation errors.
    pub async fn from_multipart(multipart: &mut Multipart) -> AppResult<Self> {
        let mut file: Option<(Option<String>, Option<String>, Bytes)> = None;
        let mut container_width = None;
        let mut container_height = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let content_type = field.content_type().map(str::to_string);
                    let file_name = field.file_name().map(str::to_string);
                    let data = field.bytes().await?;
                    file = Some((content_type, file_name, data));
                }
                "container_width" => container_width = Some(parse_dimension(&name, &field.text().await?)?),
                "container_height" => container_height = Some(parse_dimension(&name, &field.text().await?)?),
                _ => {
                    tracing::debug!("Ignoring form field '{}'", name);
                }
            }
        }

        let (content_type, file_name, image) = file.ok_or_else(|| missing("file"))?;
        let upload = Self {
            content_type,
            file_name,
            image,
            container_width: container_width.ok_or_else(|| missing("container_width"))?,
            container_height: container_height.ok_or_else(|| missing("container_height"))?,
        };
        upload.validate()?;
        Ok(upload)
    }

    /// Only JPEG and PNG uploads are accepted
    pub fn check_content_type(&self) -> AppResult<()> {
        let accepted = self.content_type.as_deref()
            .map(|ct| ACCEPTED_CONTENT_TYPES.contains(&ct))
            .unwrap_or(false);
        if accepted { Ok(()) } else { Err(AppError::InvalidFileFormat) }
    }
}

fn missing(field: &str) -> AppError {
    AppError::ValidationError(format!("field required: {}", field))
}

fn parse_dimension(name: &str, raw: &str) -> AppResult<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        AppError::ValidationError(format!("{} must be a number, got '{}'", name, raw.trim()))
    })?;
    if !value.is_finite() {
        return Err(AppError::ValidationError(format!("{} must be finite", name)));
    }
    Ok(value)
}
