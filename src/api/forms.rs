//! Typed multipart forms
//!
//! Every multipart endpoint declares the text fields and file slots it
//! accepts. Anything else in the body is rejected. Files are checked
//! against the upload policy while they are read, so an oversized file
//! fails before it is fully buffered.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request, multipart::Field},
};

use crate::error::AppError;
use crate::service::{GalleryInput, ProfileInput, ThoughtInput, WorkInput};
use crate::storage::{MAX_UPLOAD_BYTES, Upload, check_image_type};

/// Field names a form accepts
#[derive(Debug)]
pub struct FormSchema {
    pub text: &'static [&'static str],
    /// File slots that take at most one file
    pub single_files: &'static [&'static str],
    /// File slots that take any number of files
    pub multi_files: &'static [&'static str],
}

enum Slot {
    Text(&'static str),
    SingleFile(&'static str),
    MultiFile(&'static str),
}

impl FormSchema {
    fn slot(&self, name: &str) -> Option<Slot> {
        let name = name.strip_suffix("[]").unwrap_or(name);
        let find = |names: &'static [&'static str]| names.iter().copied().find(|n| *n == name);

        find(self.text)
            .map(Slot::Text)
            .or_else(|| find(self.single_files).map(Slot::SingleFile))
            .or_else(|| find(self.multi_files).map(Slot::MultiFile))
    }
}

/// Multipart body sorted into text values and uploads
#[derive(Debug, Default)]
pub struct ParsedForm {
    text: HashMap<&'static str, String>,
    files: HashMap<&'static str, Vec<Upload>>,
}

impl ParsedForm {
    pub fn text(&mut self, name: &str) -> Option<String> {
        self.text.remove(name)
    }

    pub fn file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name).and_then(|files| files.into_iter().next())
    }

    pub fn files(&mut self, name: &str) -> Vec<Upload> {
        self.files.remove(name).unwrap_or_default()
    }

    /// Optional integer field
    pub fn integer(&mut self, name: &str) -> Result<Option<i64>, AppError> {
        self.text(name)
            .map(|value| {
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::InvalidInput(format!("{name} must be an integer")))
            })
            .transpose()
    }
}

fn multipart_error(error: impl std::fmt::Display) -> AppError {
    AppError::InvalidInput(format!("Invalid multipart body: {error}"))
}

/// Read a file part, enforcing the size limit chunk by chunk
async fn read_file_bytes(field: &mut Field<'_>) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    let mut oversized = false;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        // Drain the rest of the part before failing
        if oversized || bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
            oversized = true;
            continue;
        }
        bytes.extend_from_slice(&chunk);
    }
    if oversized {
        return Err(AppError::PayloadTooLarge {
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(bytes)
}

/// Read a file slot; `None` for empty parts and text sent to a file slot
async fn read_upload(field: &mut Field<'_>) -> Result<Option<Upload>, AppError> {
    let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
        // Plain text in a file slot; references are never client-assigned
        while field.chunk().await.map_err(multipart_error)?.is_some() {}
        return Ok(None);
    };
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    if file_name.is_empty() {
        let data = read_file_bytes(field).await?;
        if data.is_empty() {
            return Ok(None);
        }
        check_image_type(&file_name, &content_type)?;
        return Ok(Some(Upload {
            file_name,
            content_type,
            data,
        }));
    }

    check_image_type(&file_name, &content_type)?;
    let data = read_file_bytes(field).await?;
    Ok(Some(Upload {
        file_name,
        content_type,
        data,
    }))
}

/// Sort a multipart body into a `ParsedForm` according to `schema`
///
/// # Errors
/// `InvalidInput` for unknown fields, repeated text fields or a second
/// file in a single-file slot; `UploadFailed` / `PayloadTooLarge` when a
/// file violates the upload policy
pub async fn read_form(
    mut multipart: Multipart,
    schema: &FormSchema,
) -> Result<ParsedForm, AppError> {
    let mut form = ParsedForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        let slot = schema
            .slot(&field_name)
            .ok_or_else(|| AppError::InvalidInput(format!("Unexpected field: {field_name}")))?;

        match slot {
            Slot::Text(name) => {
                let value = field.text().await.map_err(multipart_error)?;
                if form.text.insert(name, value).is_some() {
                    return Err(AppError::InvalidInput(format!(
                        "Field {name} supplied more than once"
                    )));
                }
            }
            Slot::SingleFile(name) => {
                if let Some(upload) = read_upload(&mut field).await? {
                    let files = form.files.entry(name).or_default();
                    if !files.is_empty() {
                        return Err(AppError::InvalidInput(format!(
                            "Only one file allowed for {name}"
                        )));
                    }
                    files.push(upload);
                }
            }
            Slot::MultiFile(name) => {
                if let Some(upload) = read_upload(&mut field).await? {
                    form.files.entry(name).or_default().push(upload);
                }
            }
        }
    }

    Ok(form)
}

/// A request type that can be built from a typed multipart body
pub trait MultipartForm: Sized {
    const SCHEMA: FormSchema;

    fn from_parsed(form: ParsedForm) -> Result<Self, AppError>;
}

/// Multipart extractor for a `MultipartForm`
///
/// # Usage
/// ```ignore
/// async fn create_work(Form(input): Form<WorkInput>) -> ... { }
/// ```
#[derive(Debug)]
pub struct Form<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Form<T>
where
    S: Send + Sync,
    T: MultipartForm + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        let form = read_form(multipart, &T::SCHEMA).await?;
        Ok(Form(T::from_parsed(form)?))
    }
}

impl MultipartForm for WorkInput {
    const SCHEMA: FormSchema = FormSchema {
        text: &["name", "description", "category", "sort_order", "images_paths"],
        single_files: &["image"],
        multi_files: &["images"],
    };

    fn from_parsed(mut form: ParsedForm) -> Result<Self, AppError> {
        Ok(Self {
            name: form.text("name"),
            description: form.text("description"),
            category: form.text("category"),
            sort_order: form.integer("sort_order")?,
            images_paths: form.text("images_paths"),
            image: form.file("image"),
            images: form.files("images"),
        })
    }
}

impl MultipartForm for ThoughtInput {
    const SCHEMA: FormSchema = FormSchema {
        text: &[
            "title",
            "content",
            "content_detail",
            "sort_order",
            "images_paths",
        ],
        single_files: &["image"],
        multi_files: &["images"],
    };

    fn from_parsed(mut form: ParsedForm) -> Result<Self, AppError> {
        Ok(Self {
            title: form.text("title"),
            content: form.text("content"),
            content_detail: form.text("content_detail"),
            sort_order: form.integer("sort_order")?,
            images_paths: form.text("images_paths"),
            image: form.file("image"),
            images: form.files("images"),
        })
    }
}

impl MultipartForm for ProfileInput {
    const SCHEMA: FormSchema = FormSchema {
        text: &[
            "name",
            "main_title",
            "sub_title",
            "hero_description",
            "about_description",
            "skills",
            "email",
            "address",
            "about_images_paths",
        ],
        single_files: &["avatar", "wechat_qr", "qq_qr"],
        multi_files: &["about_images"],
    };

    fn from_parsed(mut form: ParsedForm) -> Result<Self, AppError> {
        Ok(Self {
            name: form.text("name"),
            main_title: form.text("main_title"),
            sub_title: form.text("sub_title"),
            hero_description: form.text("hero_description"),
            about_description: form.text("about_description"),
            skills: form.text("skills"),
            email: form.text("email"),
            address: form.text("address"),
            about_images_paths: form.text("about_images_paths"),
            avatar: form.file("avatar"),
            wechat_qr: form.file("wechat_qr"),
            qq_qr: form.file("qq_qr"),
            about_images: form.files("about_images"),
        })
    }
}

impl MultipartForm for GalleryInput {
    const SCHEMA: FormSchema = FormSchema {
        text: &["name", "description"],
        single_files: &["image"],
        multi_files: &[],
    };

    fn from_parsed(mut form: ParsedForm) -> Result<Self, AppError> {
        Ok(Self {
            name: form.text("name"),
            description: form.text("description"),
            image: form.file("image"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    const BOUNDARY: &str = "XBOUNDARYX";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a str, &'a [u8]),
    }

    fn request(parts: &[Part<'_>]) -> Request {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(name, file_name, content_type, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn extract<T: MultipartForm + Send>(parts: &[Part<'_>]) -> Result<T, AppError> {
        Form::<T>::from_request(request(parts), &()).await.map(|Form(input)| input)
    }

    #[tokio::test]
    async fn work_form_reads_text_and_files() {
        let input: WorkInput = extract(&[
            Part::Text("name", "Harbor"),
            Part::Text("sort_order", " 4 "),
            Part::Text("images_paths", r#"["/uploads/a.jpg"]"#),
            Part::File("image", "cover.png", "image/png", b"png"),
            Part::File("images[]", "one.jpg", "image/jpeg", b"1"),
            Part::File("images", "two.jpg", "image/jpeg", b"2"),
        ])
        .await
        .unwrap();

        assert_eq!(input.name.as_deref(), Some("Harbor"));
        assert_eq!(input.sort_order, Some(4));
        assert_eq!(input.description, None);
        assert_eq!(input.images_paths.as_deref(), Some(r#"["/uploads/a.jpg"]"#));
        assert_eq!(input.image.unwrap().file_name, "cover.png");
        let names: Vec<_> = input.images.iter().map(|u| u.file_name.as_str()).collect();
        assert_eq!(names, vec!["one.jpg", "two.jpg"]);
    }

    #[tokio::test]
    async fn rejects_unknown_fields() {
        let result = extract::<WorkInput>(&[
            Part::Text("name", "Harbor"),
            Part::Text("owner", "someone"),
        ])
        .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn rejects_second_file_in_single_slot() {
        let result = extract::<GalleryInput>(&[
            Part::File("image", "a.png", "image/png", b"a"),
            Part::File("image", "b.png", "image/png", b"b"),
        ])
        .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn rejects_non_integer_sort_order() {
        let result = extract::<ThoughtInput>(&[Part::Text("sort_order", "first")]).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn rejects_disallowed_file_types() {
        let result = extract::<GalleryInput>(&[Part::File(
            "image",
            "notes.txt",
            "text/plain",
            b"hello",
        )])
        .await;
        assert!(matches!(result, Err(AppError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn ignores_empty_file_parts_and_text_in_file_slots() {
        let input: ProfileInput = extract(&[
            Part::File("avatar", "", "application/octet-stream", b""),
            Part::Text("wechat_qr", "https://evil.example.com/qr.png"),
            Part::Text("about_images_paths", "[]"),
        ])
        .await
        .unwrap();

        assert!(input.avatar.is_none());
        assert!(input.wechat_qr.is_none());
        assert!(input.about_images.is_empty());
        assert_eq!(input.about_images_paths.as_deref(), Some("[]"));
    }
}
