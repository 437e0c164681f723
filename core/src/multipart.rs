//! `multipart/form-data` body builder for file uploads.
//!
//! The body is assembled in memory: the binary content is copied from its
//! reader first, so a failing reader aborts the upload with a local I/O
//! error before anything is sent.

use std::io::{self, Read};

use uuid::Uuid;

#[derive(Debug)]
pub struct Multipart {
    boundary: String,
    body: Vec<u8>,
}

impl Multipart {
    /// New form with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(Uuid::new_v4().simple().to_string())
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a binary part, copying `content` to its end. Returns the
    /// number of content bytes copied.
    pub fn file<R: Read + ?Sized>(
        &mut self,
        name: &str,
        file_name: &str,
        content: &mut R,
    ) -> io::Result<u64> {
        self.open_part(&format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape_quotes(name),
            escape_quotes(file_name)
        ));
        self.body
            .extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        let copied = io::copy(content, &mut self.body)?;
        self.body.extend_from_slice(b"\r\n");
        Ok(copied)
    }

    /// Append a text part.
    pub fn text(&mut self, name: &str, value: &str) {
        self.open_part(&format!("form-data; name=\"{}\"", escape_quotes(name)));
        self.body.extend_from_slice(b"\r\n");
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }

    /// Close the form and return the encoded body.
    pub fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(b"--\r\n");
        self.body
    }

    fn open_part(&mut self, disposition: &str) {
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(b"\r\nContent-Disposition: ");
        self.body.extend_from_slice(disposition.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "source went away"))
        }
    }

    #[test]
    fn photo_form_has_one_binary_and_two_text_parts() {
        let mut form = Multipart::with_boundary("XBOUNDARYX");
        let copied = form
            .file("photo", "photo.png", &mut &[1u8, 2, 3][..])
            .unwrap();
        form.text("chat_id", "42");
        form.text("caption", "hello");
        let body = form.finish();

        assert_eq!(copied, 3);
        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"--XBOUNDARYX\r\n\
              Content-Disposition: form-data; name=\"photo\"; filename=\"photo.png\"\r\n\
              Content-Type: application/octet-stream\r\n\r\n",
        );
        expected.extend_from_slice(&[1, 2, 3]);
        expected.extend_from_slice(
            b"\r\n--XBOUNDARYX\r\n\
              Content-Disposition: form-data; name=\"chat_id\"\r\n\r\n42\r\n\
              --XBOUNDARYX\r\n\
              Content-Disposition: form-data; name=\"caption\"\r\n\r\nhello\r\n\
              --XBOUNDARYX--\r\n",
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn random_boundaries_differ() {
        let a = Multipart::new();
        let b = Multipart::new();
        assert_ne!(a.boundary(), b.boundary());
        assert_eq!(a.boundary().len(), 32);
        assert!(a.boundary().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            a.content_type(),
            format!("multipart/form-data; boundary={}", a.boundary())
        );
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let mut form = Multipart::with_boundary("b");
        form.text("we\"ird", "v");
        let body = String::from_utf8(form.finish()).unwrap();
        assert!(body.contains("name=\"we\\\"ird\""));
    }

    #[test]
    fn reader_failure_surfaces() {
        let mut form = Multipart::with_boundary("b");
        let err = form.file("photo", "photo.png", &mut FailingReader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
