//! XML documents written by the gateway: error bodies and the bucket location.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Error>
//!   <Code>NoSuchKey</Code>
//!   <Message>The specified key does not exist.</Message>
//!   <Resource>obj1</Resource>
//!   <RequestId>4442587FB7D0A2F9</RequestId>
//! </Error>
//! ```

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Serialize an error body.
#[must_use]
pub fn error_to_xml(code: &str, message: &str, resource: Option<&str>, request_id: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    // Writing to Vec<u8> is infallible; if this fails it means a logic error.
    if let Err(e) = write_error_xml(&mut buf, code, message, resource, request_id) {
        tracing::error!(error = %e, "failed to serialize error XML");
        buf.clear();
    }
    buf
}

fn write_error_xml(
    buf: &mut Vec<u8>,
    code: &str,
    message: &str,
    resource: Option<&str>,
    request_id: &str,
) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer.create_element("Error").write_inner_content(|w| {
        w.create_element("Code")
            .write_text_content(BytesText::new(code))?;
        w.create_element("Message")
            .write_text_content(BytesText::new(message))?;
        if let Some(res) = resource {
            w.create_element("Resource")
                .write_text_content(BytesText::new(res))?;
        }
        w.create_element("RequestId")
            .write_text_content(BytesText::new(request_id))?;
        Ok(())
    })?;

    Ok(())
}

/// Serialize the `GetBucketLocation` document.
///
/// An empty constraint means the default region.
#[must_use]
pub fn location_constraint_xml(location: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    if let Err(e) = write_location_xml(&mut buf, location) {
        tracing::error!(error = %e, "failed to serialize location XML");
        buf.clear();
    }
    buf
}

fn write_location_xml(buf: &mut Vec<u8>, location: &str) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer
        .create_element("LocationConstraint")
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_text_content(BytesText::new(location))?;

    Ok(())
}
