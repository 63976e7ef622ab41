//! VLM interaction: compose the request and make the single call.
//!
//! The instruction wording lives in
//! [`crate::prompts`]; the reply interpretation lives in
//! [`crate::pipeline::parse`].
//!
//! ## Message Layout
//!
//! One user turn, in order:
//! 1. **N image blocks**: every page of the document, base64 JPEG
//! 2. **One text block**: the extraction instruction
//!
//! Pages come first so the instruction is the last thing the model reads.
//! There is no retry: a failed call downgrades the document to an error
//! record and the batch moves on.

use crate::error::ModelError;
use crate::model::{ContentBlock, ModelReply, VisionModel};
use crate::pipeline::encode::PageImage;
use std::time::Instant;
use tracing::debug;

/// Build the user turn: page images in document order, then the instruction.
pub fn build_content(pages: Vec<PageImage>, instruction: &str) -> Vec<ContentBlock> {
    let mut content: Vec<ContentBlock> = pages.into_iter().map(ContentBlock::image).collect();
    content.push(ContentBlock::text(instruction));
    content
}

/// Send `content` to `model` once and wait for the full reply.
pub async fn request_extraction(
    model: &dyn VisionModel,
    content: &[ContentBlock],
) -> Result<ModelReply, ModelError> {
    let start = Instant::now();
    let images = content.iter().filter(|b| b.is_image()).count();
    debug!("Sending {} image block(s) to {}", images, model.name());

    let reply = model.complete(content).await?;

    match reply.usage {
        Some(usage) => debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            model.name(),
            usage.input_tokens,
            usage.output_tokens,
            start.elapsed()
        ),
        None => debug!("{}: reply in {:?}", model.name(), start.elapsed()),
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReplyBlock;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn images_precede_instruction() {
        let pages = vec![PageImage::jpeg("p1".into()), PageImage::jpeg("p2".into())];
        let content = build_content(pages, "do the thing");
        assert_eq!(content.len(), 3);
        assert!(content[0].is_image());
        assert!(content[1].is_image());
        assert_eq!(content[2], ContentBlock::text("do the thing"));
        match &content[1] {
            ContentBlock::Image { source } => {
                assert_eq!(source.data, "p2");
                assert_eq!(source.media_type, "image/jpeg");
                assert_eq!(source.kind, "base64");
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn zero_pages_still_sends_instruction() {
        let content = build_content(Vec::new(), "x");
        assert_eq!(content, vec![ContentBlock::text("x")]);
    }

    struct Recording {
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl VisionModel for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, content: &[ContentBlock]) -> Result<ModelReply, ModelError> {
            self.seen.lock().unwrap().push(content.len());
            Ok(ModelReply::text("{}"))
        }
    }

    #[tokio::test]
    async fn request_is_sent_exactly_once() {
        let model = Recording {
            seen: Mutex::new(Vec::new()),
        };
        let content = build_content(vec![PageImage::jpeg("a".into())], "x");
        let reply = request_extraction(&model, &content).await.unwrap();
        assert_eq!(reply.content, vec![ReplyBlock::Text { text: "{}".into() }]);
        assert_eq!(*model.seen.lock().unwrap(), vec![2]);
    }
}
