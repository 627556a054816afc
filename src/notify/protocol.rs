//! Wire types for the notification socket protocol

use serde::{Deserialize, Serialize};

/// A single notification request as sent over the socket
///
/// One request describes one toast. All fields beyond `title` and
/// `message` are optional and absent fields are simply left out of the
/// generated toast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyRequest {
    /// Toast title line
    pub title: String,
    /// Toast body text
    pub message: String,
    /// Target opened when the notification itself is clicked
    #[serde(default)]
    pub url: Option<String>,
    /// Small attribution line under the body
    #[serde(default)]
    pub attribution: Option<String>,
    /// Buttons, shown in the order given here
    #[serde(default)]
    pub button: Option<Vec<ToastButton>>,
    /// Image shown in the toast. `src` may be a WSL path or a Windows path.
    #[serde(default)]
    pub image: Option<ToastImage>,
    /// Sound played when the toast appears
    #[serde(default)]
    pub audio: Option<ToastAudio>,
    /// How long the toast stays on screen
    #[serde(default)]
    pub duration: Option<ToastDuration>,
}

/// A clickable toast button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastButton {
    /// Display label
    pub label: String,
    /// Target opened when the button is clicked
    pub src: String,
}

/// Toast image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastImage {
    pub placement: ImagePlacement,
    #[serde(default, rename = "hintCrop")]
    pub hint_crop: Option<HintCrop>,
    pub src: String,
}

/// Where the image appears in the toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImagePlacement {
    /// Replaces the app logo in the corner
    AppLogoOverride,
    /// Large banner image across the top
    Hero,
}

impl ImagePlacement {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImagePlacement::AppLogoOverride => "appLogoOverride",
            ImagePlacement::Hero => "hero",
        }
    }
}

/// Image crop hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintCrop {
    Circle,
}

impl HintCrop {
    pub fn as_str(&self) -> &'static str {
        match self {
            HintCrop::Circle => "circle",
        }
    }
}

/// Toast sound settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastAudio {
    /// Sound source, e.g. `ms-winsoundevent:Notification.Default`
    #[serde(default)]
    pub src: Option<String>,
    /// Repeat the sound while the toast is shown
    #[serde(default)]
    pub r#loop: Option<bool>,
    /// Show the toast without any sound
    #[serde(default)]
    pub silent: Option<bool>,
}

/// Toast display duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastDuration {
    Long,
    Short,
}

impl Default for ToastDuration {
    fn default() -> Self {
        ToastDuration::Short
    }
}

impl ToastDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastDuration::Long => "long",
            ToastDuration::Short => "short",
        }
    }
}

/// Result of processing one notification request
///
/// Tagged on `status`, so the `error` field exists exactly when the
/// status is `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NotifyResponse {
    Ok,
    Error { error: String },
}

impl NotifyResponse {
    /// Build an error response from anything printable
    pub fn error(err: impl std::fmt::Display) -> Self {
        NotifyResponse::Error {
            error: err.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, NotifyResponse::Ok)
    }
}
