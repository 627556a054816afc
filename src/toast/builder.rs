//! Windows toast notification XML construction
//!
//! Maps a [`NotifyRequest`] to the toast content XML understood by the
//! WinRT notification API. Pure string building, no I/O.

use crate::notify::protocol::NotifyRequest;

/// XML prologue accepted by PowerShell's XmlDocument loader
const XML_DECLARATION: &str = r#"<?xml version="1.0"?>"#;

/// Options for toast XML generation
#[derive(Debug, Clone)]
pub struct ToastXmlOptions {
    /// Emit the `<?xml version="1.0"?>` prologue. Some hosts require it,
    /// others reject it.
    pub xml_declaration: bool,
}

impl Default for ToastXmlOptions {
    fn default() -> Self {
        Self {
            xml_declaration: true,
        }
    }
}

/// Escape the five XML metacharacters
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the toast content XML for one request
///
/// Every text node and attribute value coming from the request is passed
/// through [`escape_xml`]; the request itself is never modified. The
/// `<actions>` container is only present when at least one button was
/// given.
pub fn build_toast_xml(req: &NotifyRequest, opts: &ToastXmlOptions) -> String {
    let mut xml = String::with_capacity(256);

    if opts.xml_declaration {
        xml.push_str(XML_DECLARATION);
    }

    let launch = escape_xml(req.url.as_deref().unwrap_or(""));
    let duration = req.duration.unwrap_or_default();
    xml.push_str(&format!(
        r#"<toast activationType="protocol" launch="{}" duration="{}">"#,
        launch,
        duration.as_str()
    ));

    xml.push_str(r#"<visual><binding template="ToastGeneric">"#);

    if let Some(image) = &req.image {
        match &image.hint_crop {
            Some(crop) => xml.push_str(&format!(
                r#"<image placement="{}" hint-crop="{}" src="{}"/>"#,
                image.placement.as_str(),
                crop.as_str(),
                escape_xml(&image.src)
            )),
            None => xml.push_str(&format!(
                r#"<image placement="{}" src="{}"/>"#,
                image.placement.as_str(),
                escape_xml(&image.src)
            )),
        }
    }

    xml.push_str(&format!("<text>{}</text>", escape_xml(&req.title)));
    xml.push_str(&format!("<text>{}</text>", escape_xml(&req.message)));

    if let Some(attribution) = &req.attribution {
        xml.push_str(&format!(
            r#"<text placement="attribution">{}</text>"#,
            escape_xml(attribution)
        ));
    }

    xml.push_str("</binding></visual>");

    if let Some(buttons) = &req.button {
        if !buttons.is_empty() {
            xml.push_str("<actions>");
            for button in buttons {
                xml.push_str(&format!(
                    r#"<action content="{}" activationType="protocol" arguments="{}"/>"#,
                    escape_xml(&button.label),
                    escape_xml(&button.src)
                ));
            }
            xml.push_str("</actions>");
        }
    }

    if let Some(audio) = &req.audio {
        xml.push_str(&format!(
            r#"<audio src="{}" loop="{}" silent="{}"/>"#,
            escape_xml(audio.src.as_deref().unwrap_or("")),
            audio.r#loop.unwrap_or(false),
            audio.silent.unwrap_or(false)
        ));
    }

    xml.push_str("</toast>");
    xml
}
