use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use engine_logging::engine_debug;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("body decodes to binary data, not markup")]
    Binary,
}

/// Decode a page body to text.
///
/// The encoding comes from a byte-order mark, then the `charset` parameter of
/// the Content-Type header, then `chardetng` sniffing. Byte sequences invalid
/// in that encoding become U+FFFD. Only a body that decodes to NUL characters
/// is refused.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<String, DecodeError> {
    let encoding = pick_encoding(bytes, content_type);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        engine_debug!("invalid {} sequences replaced", encoding.name());
    }
    if text.contains('\0') {
        return Err(DecodeError::Binary);
    }
    Ok(text.into_owned())
}

fn pick_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if let Some(encoding) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}
