//! Orchestration of one notification request
//!
//! The dispatcher turns a validated request into toast XML and hands it
//! to the notification sink. Image relocation failures degrade to a
//! toast without the image; only sink failures surface as errors.

use tracing::{debug, warn};

use crate::notify::protocol::NotifyRequest;
use crate::sink::{NotificationSink, SinkError};
use crate::toast::{self, ToastXmlOptions};
use crate::winpath;

pub struct Dispatcher {
    sink: Box<dyn NotificationSink>,
    options: ToastXmlOptions,
}

impl Dispatcher {
    pub fn new(sink: Box<dyn NotificationSink>) -> Self {
        Self::with_options(sink, ToastXmlOptions::default())
    }

    pub fn with_options(sink: Box<dyn NotificationSink>, options: ToastXmlOptions) -> Self {
        Self { sink, options }
    }

    /// Deliver one notification to the host
    pub async fn dispatch(&self, req: &NotifyRequest) -> Result<(), SinkError> {
        let req = self.prepare_image(req).await;
        let xml = toast::build_toast_xml(&req, &self.options);
        debug!("Dispatching toast: {}", xml);
        self.sink.show(&xml).await
    }

    /// Rewrite a WSL-side image path into its Windows copy, or drop the
    /// image when the file cannot be relocated. Windows paths pass
    /// through untouched.
    async fn prepare_image(&self, req: &NotifyRequest) -> NotifyRequest {
        let mut req = req.clone();
        if let Some(mut image) = req.image.take() {
            if winpath::is_wsl_path(&image.src) {
                match toast::relocate(&image.src).await {
                    Some(windows_path) => {
                        image.src = windows_path;
                        req.image = Some(image);
                    }
                    None => {
                        warn!("Dropping image that could not be relocated: {}", image.src);
                    }
                }
            } else {
                req.image = Some(image);
            }
        }
        req
    }
}
