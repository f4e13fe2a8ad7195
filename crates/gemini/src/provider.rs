use {
    futures::StreamExt,
    orion_relay::{Error, FragmentStream, ResponseSource, Turn},
    tracing::{debug, trace, warn},
};

use crate::{
    config::GeminiConfig,
    request::request_body,
    response::{AttachmentNamer, parse_chunk},
    sse::SseDecoder,
};

/// Streams replies from the Gemini `streamGenerateContent` endpoint.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(config: GeminiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

impl ResponseSource for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn stream(&self, context: Vec<Turn>) -> FragmentStream<'_> {
        Box::pin(async_stream::stream! {
            let body = request_body(&self.config, &context);
            debug!(
                model = %self.config.model,
                turns = context.len(),
                "gemini stream request"
            );
            trace!(body = %body, "gemini request body");

            let resp = match self
                .client
                .post(self.config.stream_url())
                .header("x-goog-api-key", self.config.api_key())
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    yield Err(Error::external("gemini request", e));
                    return;
                }
            };

            let status = resp.status();
            if !status.is_success() {
                let body_text = resp.text().await.unwrap_or_default();
                warn!(status = %status, body = %body_text, "gemini API error");
                yield Err(Error::stream(format!("HTTP {status}: {body_text}")));
                return;
            }

            let mut byte_stream = resp.bytes_stream();
            let mut decoder = SseDecoder::new();
            let mut names = AttachmentNamer::default();

            loop {
                let (payloads, done) = match byte_stream.next().await {
                    Some(Ok(chunk)) => (decoder.push(&chunk), false),
                    Some(Err(e)) => {
                        yield Err(Error::external("gemini stream", e));
                        return;
                    }
                    None => (decoder.finish(), true),
                };

                for data in payloads {
                    match parse_chunk(&data, &mut names) {
                        Ok(fragments) => {
                            for fragment in fragments {
                                yield Ok(fragment);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }

                if done {
                    break;
                }
            }
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        mockito::Matcher,
        orion_relay::{Attachment, StreamFragment},
        secrecy::Secret,
    };

    const STREAM_PATH: &str = r"^/v1beta/models/gemini-test:streamGenerateContent";

    fn provider(base_url: &str) -> GeminiProvider {
        let mut config = GeminiConfig::new(Secret::new("test-key".into()));
        config.base_url = base_url.into();
        config.model = "gemini-test".into();
        GeminiProvider::new(config)
    }

    async fn collect(provider: &GeminiProvider, turns: Vec<Turn>) -> Vec<orion_relay::Result<StreamFragment>> {
        provider.stream(turns).collect().await
    }

    #[tokio::test]
    async fn streams_text_and_images_in_order() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Here is \"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"a chart\"},{\"inlineData\":{\"mimeType\":\"image/png\",\"data\":\"UE5H\"}}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[]},\"finishReason\":\"STOP\"}]}\n\n",
        );
        let mock = server
            .mock("POST", Matcher::Regex(STREAM_PATH.into()))
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "draw" }] }],
                "tools": [{ "codeExecution": {} }, { "googleSearch": {} }],
            })))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let provider = provider(&server.url());
        let items = collect(&provider, vec![Turn::user("draw")]).await;
        let fragments: Vec<StreamFragment> = items.into_iter().map(|i| i.unwrap()).collect();

        assert_eq!(fragments, vec![
            StreamFragment::Text("Here is ".into()),
            StreamFragment::Text("a chart".into()),
            StreamFragment::Attachment(Attachment {
                data: b"PNG".to_vec(),
                filename: "output.png".into(),
            }),
        ]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_is_single_terminal_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex(STREAM_PATH.into()))
            .with_status(429)
            .with_body(r#"{"error":{"message":"quota"}}"#)
            .create_async()
            .await;

        let provider = provider(&server.url());
        let items = collect(&provider, vec![Turn::user("hi")]).await;

        assert_eq!(items.len(), 1);
        let err = items.into_iter().next().unwrap().unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn error_event_stops_stream_after_earlier_text() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"partial\"}]}}]}\n\n",
            "data: {\"error\":{\"code\":500,\"message\":\"internal\",\"status\":\"INTERNAL\"}}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"never\"}]}}]}\n\n",
        );
        let _mock = server
            .mock("POST", Matcher::Regex(STREAM_PATH.into()))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let provider = provider(&server.url());
        let items = collect(&provider, vec![Turn::user("hi")]).await;

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].as_ref().unwrap(),
            &StreamFragment::Text("partial".into())
        );
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn unterminated_last_event_is_flushed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex(STREAM_PATH.into()))
            .with_status(200)
            .with_body("data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"tail\"}]}}]}")
            .create_async()
            .await;

        let provider = provider(&server.url());
        let items = collect(&provider, vec![Turn::user("hi")]).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), &StreamFragment::Text("tail".into()));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        // Nothing listens on port 9 (discard) on test hosts.
        let provider = provider("http://127.0.0.1:9");
        let items = collect(&provider, vec![Turn::user("hi")]).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[test]
    fn provider_reports_name_and_model() {
        let provider = provider("https://example.com");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-test");
    }
}
