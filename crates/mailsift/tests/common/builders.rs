//! Builders for raw MIME messages and PDF documents.

#![allow(dead_code)]

use base64::Engine;
use lopdf::{dictionary, Document, Object, Stream};

/// Builds a PDF with one page per entry, each showing that line of text.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for line in pages {
        let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", line);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize PDF");
    bytes
}

/// A single-page CV containing every default required term.
pub fn cv_pdf(extra: &str) -> Vec<u8> {
    let line = format!("Experience Education Skills {}", extra);
    pdf_with_pages(&[line.as_str()])
}

/// One attachment in a message under construction.
struct Part {
    content_type: String,
    disposition: String,
    filename: String,
    content: Vec<u8>,
}

/// Builder for raw RFC 5322 messages with base64 attachments.
pub struct MessageBuilder {
    subject: String,
    date: String,
    body: String,
    parts: Vec<Part>,
}

impl MessageBuilder {
    /// Create a new builder with a plain-text body and no attachments.
    pub fn new(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            date: "Tue, 09 Jan 2024 10:00:00 +0000".to_string(),
            body: "Please find my application attached.".to_string(),
            parts: Vec::new(),
        }
    }

    /// Set the Date header.
    pub fn date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    /// Attach a PDF as `Content-Disposition: attachment`.
    pub fn pdf(self, filename: &str, content: Vec<u8>) -> Self {
        self.attachment("application/pdf", "attachment", filename, content)
    }

    /// Attach a PDF as `Content-Disposition: inline`.
    pub fn inline_pdf(self, filename: &str, content: Vec<u8>) -> Self {
        self.attachment("application/pdf", "inline", filename, content)
    }

    /// Attach arbitrary content.
    pub fn attachment(
        mut self,
        content_type: &str,
        disposition: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Self {
        self.parts.push(Part {
            content_type: content_type.to_string(),
            disposition: disposition.to_string(),
            filename: filename.to_string(),
            content,
        });
        self
    }

    /// Renders the message. Without attachments the message is single-part.
    pub fn build(self) -> Vec<u8> {
        let mut raw = format!(
            "From: candidate@example.com\r\n\
             To: hr@example.com\r\n\
             Subject: {}\r\n\
             Date: {}\r\n\
             MIME-Version: 1.0\r\n",
            self.subject, self.date
        );

        if self.parts.is_empty() {
            raw.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
            raw.push_str(&self.body);
            raw.push_str("\r\n");
            return raw.into_bytes();
        }

        let boundary = "mailsift-test-boundary";
        raw.push_str(&format!(
            "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
            boundary
        ));
        raw.push_str(&format!(
            "--{}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
            boundary, self.body
        ));

        for part in self.parts {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&part.content);
            raw.push_str(&format!(
                "--{}\r\n\
                 Content-Type: {}; name=\"{}\"\r\n\
                 Content-Disposition: {}; filename=\"{}\"\r\n\
                 Content-Transfer-Encoding: base64\r\n\r\n",
                boundary, part.content_type, part.filename, part.disposition, part.filename
            ));
            for line in encoded.as_bytes().chunks(76) {
                raw.push_str(std::str::from_utf8(line).expect("base64 is ASCII"));
                raw.push_str("\r\n");
            }
        }

        raw.push_str(&format!("--{}--\r\n", boundary));
        raw.into_bytes()
    }
}
