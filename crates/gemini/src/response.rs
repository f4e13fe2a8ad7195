//! Mapping of streamed `GenerateContentResponse` chunks to fragments.

use {
    base64::Engine,
    orion_relay::{Attachment, Error, Result, StreamFragment},
    tracing::{debug, trace, warn},
};

/// Hands out `output.png`, `output-2.png`, ... within one response.
#[derive(Debug, Default)]
pub struct AttachmentNamer {
    issued: usize,
}

impl AttachmentNamer {
    pub fn next(&mut self, mime_type: Option<&str>) -> String {
        self.issued += 1;
        let ext = extension_for(mime_type);
        if self.issued == 1 {
            format!("output.{ext}")
        } else {
            format!("output-{}.{ext}", self.issued)
        }
    }
}

fn extension_for(mime_type: Option<&str>) -> &'static str {
    match mime_type {
        Some("image/jpeg") => "jpg",
        Some("image/gif") => "gif",
        Some("image/webp") => "webp",
        Some("image/svg+xml") => "svg",
        _ => "png",
    }
}

/// Fragments carried by one SSE payload.
///
/// Missing candidates, parts or fields produce nothing. An `error` object
/// from the API is returned as `Err`.
pub fn parse_chunk(data: &str, names: &mut AttachmentNamer) -> Result<Vec<StreamFragment>> {
    let chunk: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "skipping unparseable gemini chunk");
            return Ok(Vec::new());
        },
    };
    trace!(chunk = %chunk, "gemini chunk");

    if let Some(error) = chunk.get("error") {
        let message = error["message"].as_str().unwrap_or("unknown error");
        let status = error["status"].as_str().unwrap_or("");
        return Err(Error::stream(format!("gemini {status}: {message}")));
    }

    let Some(parts) = chunk["candidates"][0]["content"]["parts"].as_array() else {
        return Ok(Vec::new());
    };

    let mut fragments = Vec::new();
    for part in parts {
        if let Some(text) = part["text"].as_str()
            && !text.is_empty()
        {
            fragments.push(StreamFragment::Text(text.to_string()));
        }

        let inline = &part["inlineData"];
        if let Some(encoded) = inline["data"].as_str()
            && !encoded.is_empty()
        {
            match base64::engine::general_purpose::STANDARD.decode(encoded) {
                Ok(data) => fragments.push(StreamFragment::Attachment(Attachment {
                    filename: names.next(inline["mimeType"].as_str()),
                    data,
                })),
                Err(e) => warn!(error = %e, "dropping undecodable inline data"),
            }
        }
    }

    Ok(fragments)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn parse(data: &str) -> Vec<StreamFragment> {
        parse_chunk(data, &mut AttachmentNamer::default()).unwrap()
    }

    #[test]
    fn text_parts_become_text_fragments() {
        let fragments = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"world"}]}}]}"#,
        );
        assert_eq!(fragments, vec![
            StreamFragment::Text("Hello ".into()),
            StreamFragment::Text("world".into()),
        ]);
    }

    #[test]
    fn inline_image_becomes_attachment() {
        // "PNG" base64-encoded.
        let fragments = parse(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"UE5H"}}]}}]}"#,
        );
        assert_eq!(fragments, vec![StreamFragment::Attachment(Attachment {
            data: b"PNG".to_vec(),
            filename: "output.png".into(),
        })]);
    }

    #[rstest]
    #[case(r#"{}"#)]
    #[case(r#"{"candidates":[]}"#)]
    #[case(r#"{"candidates":[{"finishReason":"STOP"}]}"#)]
    #[case(r#"{"candidates":[{"content":{"parts":[{"executableCode":{"language":"PYTHON","code":"print(1)"}}]}}]}"#)]
    #[case(r#"{"candidates":[{"content":{"parts":[{"codeExecutionResult":{"outcome":"OUTCOME_OK"}}]}}]}"#)]
    #[case(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#)]
    #[case(r#"{"usageMetadata":{"promptTokenCount":3}}"#)]
    #[case("not json at all")]
    fn unexpected_shapes_emit_nothing(#[case] data: &str) {
        assert!(parse(data).is_empty());
    }

    #[test]
    fn api_error_payload_is_an_error() {
        let result = parse_chunk(
            r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#,
            &mut AttachmentNamer::default(),
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("The model is overloaded."));
    }

    #[test]
    fn undecodable_inline_data_is_dropped() {
        let fragments = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"chart:"},{"inlineData":{"mimeType":"image/png","data":"!!not base64!!"}}]}}]}"#,
        );
        assert_eq!(fragments, vec![StreamFragment::Text("chart:".into())]);
    }

    #[test]
    fn attachment_names_are_unique_per_response() {
        let mut names = AttachmentNamer::default();
        assert_eq!(names.next(Some("image/png")), "output.png");
        assert_eq!(names.next(None), "output-2.png");
        assert_eq!(names.next(Some("image/jpeg")), "output-3.jpg");
    }
}
