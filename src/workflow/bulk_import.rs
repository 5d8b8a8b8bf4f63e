//! Turning pasted spreadsheet text into request inputs.

use regex::Regex;
use std::sync::LazyLock;

use crate::database::schema::asset::AssetKind;
use crate::database::schema::request::{RequestInput, parse_length};

/// A tab, or two or more spaces, separates spreadsheet columns.
static COLUMN_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t| {2,}").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkImport {
    pub inputs: Vec<RequestInput>,
    /// `Line N: ...`, numbered over the non-empty lines
    pub errors: Vec<String>,
}

/// Parse the bulk import box of the board for `kind`.
///
/// Audio has no board; every line is reported as an error.
pub fn parse(kind: AssetKind, text: &str) -> BulkImport {
    let lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let mut import = BulkImport::default();

    for (index, line) in lines.enumerate() {
        let number = index + 1;
        let (inputs, reasons) = match kind {
            AssetKind::Image => parse_image_line(line),
            AssetKind::Video => match parse_video_line(line) {
                Ok(input) => (vec![input], Vec::new()),
                Err(reason) => (Vec::new(), vec![reason]),
            },
            AssetKind::Audio => (Vec::new(), vec!["Audio has no request board".to_string()]),
        };
        import.inputs.extend(inputs);
        import
            .errors
            .extend(reasons.into_iter().map(|reason| format!("Line {number}: {reason}")));
    }
    import
}

/// Inputs on one image line, plus a reason for each filename that was dropped.
fn parse_image_line(line: &str) -> (Vec<RequestInput>, Vec<String>) {
    let parts: Vec<&str> = COLUMN_SEPARATOR.split(line).collect();

    let candidates: Vec<(&str, String)> = if parts.len() > 1 {
        let description = parts[1..]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        vec![(parts[0].trim(), description)]
    } else {
        WHITESPACE
            .split(line)
            .filter(|name| !name.is_empty())
            .map(|name| (name, String::new()))
            .collect()
    };

    let mut inputs = Vec::new();
    let mut reasons = Vec::new();
    for (filename, description) in candidates {
        if filename.is_empty() {
            reasons.push("Missing filename".to_string());
        } else if filename.contains('/') || filename.contains('\\') {
            reasons.push(format!("Invalid filename {filename}"));
        } else {
            inputs.push(RequestInput::image(filename, description));
        }
    }
    (inputs, reasons)
}

fn parse_video_line(line: &str) -> Result<RequestInput, String> {
    let parts: Vec<&str> = WHITESPACE
        .split(line)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() < 4 || parts.len() > 5 {
        return Err(format!("Expected 4-5 fields, got {}", parts.len()));
    }
    let length = parts.get(4).copied().unwrap_or("0");
    if parse_length(length).is_none() {
        return Err(format!("Invalid length {length}"));
    }
    Ok(RequestInput::video(
        parts[0], parts[1], parts[2], parts[3], length,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_lines_accept_columns_or_plain_names() {
        let text = "banner.jpg\thome page banner\n\n  logo.png   footer  logo \nicon-a.png icon-b.png\n";
        let import = parse(AssetKind::Image, text);
        assert!(import.errors.is_empty());
        assert_eq!(
            import.inputs,
            vec![
                RequestInput::image("banner.jpg", "home page banner"),
                RequestInput::image("logo.png", "footer logo"),
                RequestInput::image("icon-a.png", ""),
                RequestInput::image("icon-b.png", ""),
            ]
        );
    }

    #[test]
    fn image_paths_are_rejected() {
        let import = parse(AssetKind::Image, "ok.png\nsub/dir.png\tdesc");
        assert_eq!(import.inputs.len(), 1);
        assert_eq!(import.errors, vec!["Line 2: Invalid filename sub/dir.png"]);
    }

    #[test]
    fn bad_names_on_a_line_do_not_drop_the_good_ones() {
        let import = parse(AssetKind::Image, "ok.png sub/x.png good.png back\\slash.png");
        assert_eq!(
            import.inputs,
            vec![
                RequestInput::image("ok.png", ""),
                RequestInput::image("good.png", ""),
            ]
        );
        assert_eq!(
            import.errors,
            vec![
                "Line 1: Invalid filename sub/x.png".to_string(),
                "Line 1: Invalid filename back\\slash.png".to_string(),
            ]
        );
    }

    #[test]
    fn video_lines_need_four_or_five_fields() {
        let text = "c1 f1 s1 intro.mp4 1:30\nc2 f2 s2 outro.mp4\nc3 f3 s3\nc4 f4 s4 x.mp4 soon";
        let import = parse(AssetKind::Video, text);
        assert_eq!(
            import.inputs,
            vec![
                RequestInput::video("c1", "f1", "s1", "intro.mp4", "1:30"),
                RequestInput::video("c2", "f2", "s2", "outro.mp4", "0"),
            ]
        );
        assert_eq!(
            import.errors,
            vec![
                "Line 3: Expected 4-5 fields, got 3".to_string(),
                "Line 4: Invalid length soon".to_string(),
            ]
        );
    }
}
