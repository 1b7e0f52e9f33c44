use super::EncodedBody;
use crate::{Error, Result};
use std::fmt::Display;

const BASE_BOUNDARY: &str = "----OpenAiEmbeddedFormBoundary";

enum PartBody<'a> {
    Text(String),
    File {
        file_name: String,
        content_type: &'static str,
        data: &'a [u8],
    },
}

struct Part<'a> {
    name: &'static str,
    body: PartBody<'a>,
}

impl Part<'_> {
    fn content(&self) -> &[u8] {
        match &self.body {
            PartBody::Text(value) => value.as_bytes(),
            PartBody::File { data, .. } => data,
        }
    }
}

/// `multipart/form-data` body borrowing caller buffers for binary parts.
///
/// Parts are written in insertion order and the boundary depends only on the
/// part contents, so identical inputs always encode to identical bytes.
#[derive(Default)]
pub struct MultipartForm<'a> {
    parts: Vec<Part<'a>>,
}

impl<'a> MultipartForm<'a> {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn text(mut self, name: &'static str, value: impl Display) -> Self {
        self.parts.push(Part {
            name,
            body: PartBody::Text(value.to_string()),
        });
        self
    }

    /// Adds a text part only when `value` is set.
    pub fn optional_text<T: Display>(self, name: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    pub fn file(
        mut self,
        name: &'static str,
        file_name: impl Into<String>,
        content_type: &'static str,
        data: &'a [u8],
    ) -> Self {
        self.parts.push(Part {
            name,
            body: PartBody::File {
                file_name: file_name.into(),
                content_type,
                data,
            },
        });
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// First boundary candidate that occurs in none of the parts.
    fn boundary(&self) -> String {
        let mut boundary = BASE_BOUNDARY.to_string();
        let mut suffix = 0u32;
        while self
            .parts
            .iter()
            .any(|part| contains(part.content(), boundary.as_bytes()))
        {
            suffix += 1;
            boundary = format!("{}{}", BASE_BOUNDARY, suffix);
        }
        boundary
    }

    /// Writes the body into one buffer reserved up front.
    ///
    /// Only that reservation is fallible: if it fails the call returns
    /// [`Error::Allocation`]. Header formatting, JSON encoding and reply
    /// parsing go through the global allocator, which aborts on exhaustion.
    pub fn encode(self) -> Result<EncodedBody> {
        let boundary = self.boundary();

        let estimated = self
            .parts
            .iter()
            .map(|part| part.content().len() + boundary.len() + 160)
            .sum::<usize>()
            + boundary.len()
            + 8;

        let mut bytes = Vec::new();
        reserve(&mut bytes, estimated)?;

        for part in &self.parts {
            bytes.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            match &part.body {
                PartBody::Text(value) => {
                    bytes.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            part.name
                        )
                        .as_bytes(),
                    );
                    bytes.extend_from_slice(value.as_bytes());
                }
                PartBody::File {
                    file_name,
                    content_type,
                    data,
                } => {
                    bytes.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                            part.name, file_name, content_type
                        )
                        .as_bytes(),
                    );
                    bytes.extend_from_slice(data);
                }
            }
            bytes.extend_from_slice(b"\r\n");
        }
        bytes.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        Ok(EncodedBody {
            content_type: format!("multipart/form-data; boundary={}", boundary),
            bytes,
        })
    }
}

fn reserve(bytes: &mut Vec<u8>, additional: usize) -> Result<()> {
    bytes.try_reserve(additional).map_err(|e| {
        tracing::error!("Failed to reserve {} bytes for multipart body: {}", additional, e);
        Error::Allocation(e.to_string())
    })
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_text_and_file_parts() {
        let audio = [0x49u8, 0x44, 0x33];
        let body = MultipartForm::new()
            .text("model", "whisper-1")
            .optional_text("language", None::<&str>)
            .optional_text("temperature", Some(0.5))
            .file("file", "audio.mp3", "audio/mpeg", &audio)
            .encode()
            .unwrap();

        assert_eq!(
            body.content_type,
            "multipart/form-data; boundary=----OpenAiEmbeddedFormBoundary"
        );

        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"------OpenAiEmbeddedFormBoundary\r\n\
Content-Disposition: form-data; name=\"model\"\r\n\r\nwhisper-1\r\n\
------OpenAiEmbeddedFormBoundary\r\n\
Content-Disposition: form-data; name=\"temperature\"\r\n\r\n0.5\r\n\
------OpenAiEmbeddedFormBoundary\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"audio.mp3\"\r\n\
Content-Type: audio/mpeg\r\n\r\n",
        );
        expected.extend_from_slice(&audio);
        expected.extend_from_slice(b"\r\n------OpenAiEmbeddedFormBoundary--\r\n");

        assert_eq!(body.bytes, expected);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let image = vec![0x89, 0x50, 0x4E, 0x47];
        let encode = || {
            MultipartForm::new()
                .text("n", 2)
                .file("image", "image.png", "image/png", &image)
                .encode()
                .unwrap()
        };

        assert_eq!(encode(), encode());
    }

    #[test]
    fn test_boundary_avoids_collisions_with_content() {
        let payload = format!("xx{}yy{}1zz", BASE_BOUNDARY, BASE_BOUNDARY);
        let form = MultipartForm::new().file("file", "a.wav", "audio/x-wav", payload.as_bytes());

        assert_eq!(form.boundary(), format!("{}2", BASE_BOUNDARY));

        let body = form.encode().unwrap();
        assert!(body.content_type.ends_with("Boundary2"));
    }

    #[test]
    fn test_failed_reservation_is_an_error() {
        let mut bytes = Vec::new();
        assert!(matches!(
            reserve(&mut bytes, usize::MAX),
            Err(Error::Allocation(_))
        ));
        assert!(reserve(&mut bytes, 64).is_ok());
        assert!(bytes.capacity() >= 64);
    }

    #[test]
    fn test_contains() {
        assert!(contains(b"abcdef", b"cde"));
        assert!(!contains(b"ab", b"abc"));
        assert!(!contains(b"abc", b""));
    }
}
