//! SVG template patching.
//!
//! Rewrites the text of elements selected by `id` and leaves every other byte
//! of the document as it was read.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Display width of each field, including its dot leader. Zero means the
/// field has no leader.
const FIELD_WIDTHS: [(&str, i64); 8] = [
    ("age_data", 49),
    ("commit_data", 22),
    ("star_data", 14),
    ("contrib_data", 0),
    ("follower_data", 10),
    ("loc_data", 9),
    ("loc_add", 0),
    ("loc_del", 7),
];

/// Values shown on the badge.
#[derive(Debug, Clone, Default)]
pub struct BadgeFields {
    pub age: String,
    pub commits: u64,
    pub stars: u64,
    pub repos: u64,
    pub contributed: u64,
    pub followers: u64,
    pub loc_net: i64,
    pub loc_add: u64,
    pub loc_del: u64,
}

impl BadgeFields {
    /// Element id to text, including the `<id>_dots` leaders.
    pub fn to_elements(&self) -> BTreeMap<String, String> {
        let mut elements = BTreeMap::new();
        elements.insert("age_data".to_string(), self.age.clone());
        elements.insert("commit_data".to_string(), self.commits.to_string());
        elements.insert("star_data".to_string(), self.stars.to_string());
        elements.insert("repo_data".to_string(), self.repos.to_string());
        elements.insert("contrib_data".to_string(), self.contributed.to_string());
        elements.insert("follower_data".to_string(), self.followers.to_string());
        elements.insert("loc_data".to_string(), thousands(self.loc_net));
        elements.insert("loc_add".to_string(), thousands(self.loc_add as i64));
        elements.insert("loc_del".to_string(), thousands(self.loc_del as i64));

        // repo_data shares its line with contrib_data
        let repo_width = 7 - text_len(&elements["contrib_data"]);
        let widths = FIELD_WIDTHS
            .iter()
            .copied()
            .chain(std::iter::once(("repo_data", repo_width)));

        let mut leaders = Vec::new();
        for (id, width) in widths {
            if width > 0 {
                leaders.push((format!("{id}_dots"), dot_leader(id, &elements[id], width)));
            }
        }
        elements.extend(leaders);
        elements
    }
}

/// Padding placed between a label and its value.
fn dot_leader(id: &str, text: &str, width: i64) -> String {
    let pad = width - text_len(text);
    if pad <= 2 && id != "repo_data" {
        match pad {
            1 => " ".to_string(),
            2 => ". ".to_string(),
            _ => String::new(),
        }
    } else {
        format!(" {} ", ".".repeat(pad.max(0) as usize))
    }
}

fn text_len(text: &str) -> i64 {
    text.chars().count() as i64
}

/// `1234567` -> `"1,234,567"`
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Replace the text content of every element whose `id` is a key of `elements`.
///
/// Children of a replaced element are dropped; self-closing elements are
/// expanded so they can hold text.
pub fn patch_svg(svg: &str, elements: &BTreeMap<String, String>) -> Result<String> {
    let mut reader = Reader::from_str(svg);
    let mut writer = Writer::new(Vec::with_capacity(svg.len()));
    // nesting depth inside an element whose content is being replaced
    let mut skipping: Option<usize> = None;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("Invalid SVG at byte {}", reader.buffer_position()))?;

        if let Some(depth) = skipping.as_mut() {
            match event {
                Event::Start(_) => *depth += 1,
                Event::End(_) if *depth == 0 => {
                    skipping = None;
                    writer.write_event(event)?;
                }
                Event::End(_) => *depth -= 1,
                Event::Eof => anyhow::bail!("Unexpected end of SVG inside a patched element"),
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(ref start) => {
                let replacement = lookup(start, elements)?;
                writer.write_event(&event)?;
                if let Some(text) = replacement {
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                    skipping = Some(0);
                }
            }
            Event::Empty(ref start) => match lookup(start, elements)? {
                Some(text) => {
                    let end = start.to_end().into_owned();
                    writer.write_event(Event::Start(start.clone()))?;
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                    writer.write_event(Event::End(end))?;
                }
                None => writer.write_event(&event)?,
            },
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    String::from_utf8(writer.into_inner()).context("Patched SVG is not valid UTF-8")
}

fn lookup<'e>(
    start: &BytesStart<'_>,
    elements: &'e BTreeMap<String, String>,
) -> Result<Option<&'e str>> {
    let Some(attr) = start.try_get_attribute("id")? else {
        return Ok(None);
    };
    let id = attr.unescape_value()?;
    Ok(elements.get(id.as_ref()).map(String::as_str))
}

/// Patch the SVG file at `path` in place.
pub fn overwrite_svg(path: &Path, elements: &BTreeMap<String, String>) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read SVG template: {}", path.display()))?;
    let patched = patch_svg(&content, elements)
        .with_context(|| format!("Failed to patch SVG: {}", path.display()))?;
    fs::write(path, patched).with_context(|| format!("Failed to write SVG: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TEMPLATE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="985px">
<!-- stats -->
<text x="370" y="30" fill="#c9d1d9">
<tspan class="key">Uptime</tspan>:<tspan class="cc" id="age_data_dots"> .... </tspan><tspan class="value" id="age_data">old age</tspan>
<tspan class="key">Repos</tspan>:<tspan id="repo_data_dots"/><tspan class="value" id="repo_data">0</tspan>
<tspan class="key">Lines</tspan>: <tspan id="loc_add">1</tspan>++ <tspan id="untouched">keep &amp; me</tspan>
</text>
</svg>"##;

    fn elements(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_patch_replaces_text_by_id() {
        let patched = patch_svg(
            TEMPLATE,
            &elements(&[("age_data", "24 years"), ("loc_add", "1,234")]),
        )
        .unwrap();

        assert!(patched.contains(r#"<tspan class="value" id="age_data">24 years</tspan>"#));
        assert!(patched.contains(r#"<tspan id="loc_add">1,234</tspan>"#));
        assert!(patched.contains(r#"<tspan id="untouched">keep &amp; me</tspan>"#));
        assert!(patched.contains("<!-- stats -->"));
        assert!(patched.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    }

    #[test]
    fn test_patch_expands_empty_elements_and_escapes() {
        let patched = patch_svg(TEMPLATE, &elements(&[("repo_data_dots", " <..> ")])).unwrap();
        assert!(patched.contains(r#"<tspan id="repo_data_dots"> &lt;..&gt; </tspan>"#));
    }

    #[test]
    fn test_patch_without_matches_is_identity() {
        let patched = patch_svg(TEMPLATE, &BTreeMap::new()).unwrap();
        assert_eq!(patched, TEMPLATE);
    }

    #[test]
    fn test_overwrite_svg_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dark_mode.svg");
        fs::write(&path, TEMPLATE).unwrap();

        overwrite_svg(&path, &elements(&[("repo_data", "42")])).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"id="repo_data">42</tspan>"#));
    }

    #[test]
    fn test_dot_leaders() {
        assert_eq!(dot_leader("star_data", "12", 14), " ............ ");
        assert_eq!(dot_leader("star_data", "123456789012", 14), ". ");
        assert_eq!(dot_leader("star_data", "1234567890123", 14), " ");
        assert_eq!(dot_leader("star_data", "12345678901234", 14), "");
        assert_eq!(dot_leader("star_data", "123456789012345", 14), "");
    }

    #[test]
    fn test_repo_leader_never_collapses() {
        assert_eq!(dot_leader("repo_data", "12", 3), " . ");
        assert_eq!(dot_leader("repo_data", "123", 3), "  ");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-45210), "-45,210");
    }

    #[test]
    fn test_fields_to_elements() {
        let fields = BadgeFields {
            age: "24 years, 1 month, 3 days".to_string(),
            commits: 1500,
            stars: 42,
            repos: 30,
            contributed: 55,
            followers: 7,
            loc_net: 120_000,
            loc_add: 150_000,
            loc_del: 30_000,
        };
        let el = fields.to_elements();

        assert_eq!(el["contrib_data"], "55");
        assert_eq!(el["commit_data"], "1500");
        assert_eq!(el["loc_data"], "120,000");
        assert_eq!(el["loc_add"], "150,000");
        assert_eq!(el["loc_del"], "30,000");
        assert_eq!(el["star_data_dots"], " ............ ");
        // 7 - len("55") = 5, minus len("30") = 3 dots
        assert_eq!(el["repo_data_dots"], " ... ");
        assert!(!el.contains_key("contrib_data_dots"));
        assert!(!el.contains_key("loc_add_dots"));
        assert_eq!(el["loc_del_dots"], " ");
    }
}
