// Small HTML fragments returned by the handlers

/// Escape text for use inside an element or a quoted attribute
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// `<p>` with escaped text
pub fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape(text))
}

/// Wrap lines of text in the half-width box container, one paragraph each
pub fn boxed<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from("<div class=\"box\" style=\"width: 50%\">");
    for line in lines {
        out.push_str(&paragraph(line.as_ref()));
    }
    out.push_str("</div>");
    out
}

/// A single message in a box, used for soft errors and notices
pub fn message_box(message: &str) -> String {
    boxed([message])
}
