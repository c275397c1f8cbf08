//! Content validation operations: text, media and image checks routed to
//! their registered handlers. URL parsing stays with the caller; media and
//! image validation take an already-parsed URL and only inspect the final
//! path segment's extension.

use super::Core;
use crate::constants::{handlers, media};
use crate::results::{Outcome, ResultCode};
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

/// Case-insensitive extension match on a file name.
fn file_type_match(file: &str, extensions: &[&str]) -> bool {
    let Some((_, ext)) = file.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    extensions.iter().any(|candidate| *candidate == ext)
}

/// Final non-empty path segment of a URL.
fn file_name(uri: &Url) -> Option<&str> {
    uri.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
}

impl Core {
    /// Validate text content through the registered text handler.
    pub async fn validate_text(self: &Arc<Self>, content: &str, options: Value) -> Outcome {
        let Some(user) = self.user() else {
            return Outcome::error(ResultCode::Unauthenticated, "validate.text", json!(content));
        };
        self.call(
            handlers::TEXT,
            json!({ "content": content, "options": options, "user": user }),
        )
        .await
    }

    /// Validate a media (audio/video) URL through the registered media
    /// handler. Rejects URLs without a recognizable media extension.
    pub async fn validate_media(self: &Arc<Self>, uri: &Url, options: Value) -> Outcome {
        let Some(user) = self.user() else {
            return Outcome::error(ResultCode::Unauthenticated, "validate.media", json!(uri.path()));
        };
        let Some(file) = file_name(uri) else {
            return Outcome::error(
                ResultCode::Parameters,
                "validate.media",
                json!("path not found from uri"),
            );
        };
        if !file_type_match(file, media::VIDEO_EXTENSIONS)
            && !file_type_match(file, media::AUDIO_EXTENSIONS)
            && !file_type_match(file, media::MEDIA_EXTENSIONS)
        {
            return Outcome::error(
                ResultCode::Parameters,
                "validate.media",
                json!("path not media file"),
            );
        }
        self.call(
            handlers::MEDIA,
            json!({ "uri": uri.as_str(), "options": options, "user": user }),
        )
        .await
    }

    /// Validate an image URL through the registered image handler.
    pub async fn validate_image(self: &Arc<Self>, uri: &Url, options: Value) -> Outcome {
        let Some(user) = self.user() else {
            return Outcome::error(ResultCode::Unauthenticated, "validate.image", json!(uri.path()));
        };
        let Some(file) = file_name(uri) else {
            return Outcome::error(
                ResultCode::Parameters,
                "validate.image",
                json!("path not found from uri"),
            );
        };
        if !file_type_match(file, media::IMAGE_EXTENSIONS) {
            return Outcome::error(
                ResultCode::Parameters,
                "validate.image",
                json!("path not image file"),
            );
        }
        self.call(
            handlers::IMAGE,
            json!({ "uri": uri.as_str(), "options": options, "user": user }),
        )
        .await
    }
}
