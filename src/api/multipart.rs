//! Minimal `multipart/form-data` encoder for single-file uploads.
//!
//! `ureq` 2 sends raw bodies but has no form builder, so the upload body is
//! assembled here: one `file` part, binary content, closing delimiter.

use std::time::{SystemTime, UNIX_EPOCH};

/// An encoded form ready to send.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    /// Encode `content` as the form field `field` with the given filename.
    pub fn single_file(field: &str, filename: &str, content: &[u8]) -> Self {
        let boundary = make_boundary();
        let mut body = Vec::with_capacity(content.len() + 256);

        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                sanitize(field),
                sanitize(filename)
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Self { boundary, body }
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn make_boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("----scorelens{nanos:032x}")
}

/// Quotes and line breaks would end the header early.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| if c == '"' { '\'' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_has_one_part_and_closing_delimiter() {
        let form = MultipartBody::single_file("file", "notes.txt", b"hello");
        let text = String::from_utf8(form.body().to_vec()).unwrap();
        let boundary = form.content_type().split("boundary=").nth(1).unwrap().to_string();

        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("name=\"file\"; filename=\"notes.txt\""));
        assert!(text.contains("\r\n\r\nhello\r\n"));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn filename_cannot_break_the_header() {
        let form = MultipartBody::single_file("file", "a\"b\r\n.txt", b"");
        let text = String::from_utf8(form.body().to_vec()).unwrap();
        assert!(text.contains("filename=\"a'b.txt\""));
    }
}
