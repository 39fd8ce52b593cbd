//! Resource methods on [`crate::GuriClient`], one module per API area.

mod admin;
mod auth;
mod catalog;
mod listings;
mod people;
mod stories;

pub use stories::NewStory;

use reqwest::multipart::{Form, Part};

use guri_types::Page;

use crate::error::Result;

/// A file to send in a multipart upload
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    fn into_part(self) -> Result<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }
}

/// Gallery upload body: every file under the `images` field
fn images_form(uploads: Vec<Upload>) -> Result<Form> {
    uploads
        .into_iter()
        .try_fold(Form::new(), |form, upload| Ok(form.part("images", upload.into_part()?)))
}

fn with_page(mut pairs: Vec<(&'static str, String)>, page: Page) -> Vec<(&'static str, String)> {
    pairs.extend(page.to_query_pairs());
    pairs
}
