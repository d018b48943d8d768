//! Output grammars shared by the backend adapters
//!
//! Three shapes cover every tool we drive: delimited record lines
//! (`name,version,size`), colon key/value lines grouped into blocks, and
//! attribute-bearing XML element lists. Malformed lines are dropped rather
//! than failing the whole parse.

use crate::core::{PackageRecord, PkgError, Record, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// DELIMITED RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse `name,version,size` lines.
///
/// Lines with any other field count are skipped. A size that does not parse
/// keeps the record with size 0. `size_unit` scales the reported number into
/// bytes (dpkg reports KiB).
pub fn parse_package_lines(text: &str, size_unit: u64) -> Vec<PackageRecord> {
    text.lines()
        .filter_map(|line| parse_package_line(line, size_unit))
        .collect()
}

fn parse_package_line(line: &str, size_unit: u64) -> Option<PackageRecord> {
    let line = line.trim().trim_matches(['\'', '"']);
    if line.is_empty() {
        return None;
    }

    let fields: Vec<&str> = line.split(',').collect();
    let [name, version, size] = fields.as_slice() else {
        tracing::debug!("skipping malformed package line: {line}");
        return None;
    };
    if name.is_empty() {
        return None;
    }

    let installed_size_bytes = match size.trim().parse::<u64>() {
        Ok(size) => size.saturating_mul(size_unit),
        Err(_) => {
            tracing::warn!("unparsable size {size:?} for {name}, using 0");
            0
        }
    };

    Some(PackageRecord {
        name: (*name).to_string(),
        version: (*version).to_string(),
        installed_size_bytes,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLON KEY/VALUE
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse `Key: value` lines in order.
///
/// Lines starting with whitespace continue the previous value (dpkg status
/// format). When a key equals `trailer`, everything after it becomes that key's
/// value verbatim (rpm's free-form `Description`).
pub fn parse_key_values(text: &str, trailer: Option<&str>) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = entries.last_mut() {
                let cont = line.trim();
                if cont != "." {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(cont);
                }
                continue;
            }
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let mut value = value.trim().to_string();

        if trailer == Some(key) {
            let rest: Vec<&str> = lines.by_ref().collect();
            let rest = rest.join("\n");
            let rest = rest.trim_end();
            if !rest.is_empty() {
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(rest);
            }
            entries.push((key.to_string(), value));
            break;
        }

        entries.push((key.to_string(), value));
    }

    entries
}

/// How consecutive key/value blocks are told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// A blank line ends the current block
    BlankLine,
    /// A line starting with this marker opens a new block; text before the
    /// first marker is ignored and the marker line becomes the block header
    Rule(&'static str),
}

/// One block of key/value entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub header: Option<String>,
    pub entries: Vec<(String, String)>,
}

impl Block {
    /// Collapse into a record, later keys overwriting earlier ones
    #[must_use]
    pub fn into_record(self) -> Record {
        self.entries.into_iter().collect()
    }
}

/// Split `Key: value` output into blocks
pub fn parse_blocks(text: &str, separator: Separator) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = match separator {
        Separator::BlankLine => Some(Block::default()),
        Separator::Rule(_) => None,
    };

    for line in text.lines() {
        match separator {
            Separator::BlankLine if line.trim().is_empty() => {
                if let Some(block) = current.take().filter(|b| !b.entries.is_empty()) {
                    blocks.push(block);
                }
                current = Some(Block::default());
                continue;
            }
            Separator::Rule(marker) if line.starts_with(marker) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                let header = line.trim_matches(|c: char| c == '=' || c.is_whitespace());
                current = Some(Block {
                    header: (!header.is_empty()).then(|| header.to_string()),
                    entries: Vec::new(),
                });
                continue;
            }
            _ => {}
        }

        let Some(block) = current.as_mut() else {
            continue;
        };
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                block
                    .entries
                    .push((key.to_string(), value.trim().to_string()));
            }
        }
    }

    if let Some(block) = current {
        let keep = match separator {
            Separator::BlankLine => !block.entries.is_empty(),
            Separator::Rule(_) => true,
        };
        if keep {
            blocks.push(block);
        }
    }

    blocks
}

// ═══════════════════════════════════════════════════════════════════════════════
// XML ELEMENT LISTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Attributes and child texts of one XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub attributes: Record,
    /// `(tag, text)` for each child element carrying text
    pub children: Vec<(String, String)>,
}

impl XmlElement {
    #[must_use]
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, text)| text.as_str())
    }
}

/// Collect every `<child>` element directly under a `<parent>` element, in
/// document order, regardless of where `<parent>` sits in the tree.
pub fn parse_xml_elements(
    tool: &str,
    xml: &str,
    parent: &str,
    child: &str,
) -> Result<Vec<XmlElement>> {
    let doc = roxmltree::Document::parse(xml.trim()).map_err(|e| PkgError::Parse {
        tool: tool.to_string(),
        message: e.to_string(),
    })?;

    let elements = doc
        .descendants()
        .filter(|node| node.has_tag_name(child))
        .filter(|node| node.parent_element().is_some_and(|p| p.has_tag_name(parent)))
        .map(|node| XmlElement {
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            children: node
                .children()
                .filter(roxmltree::Node::is_element)
                .filter_map(|c| {
                    c.text()
                        .map(|text| (c.tag_name().name().to_string(), text.trim().to_string()))
                })
                .collect(),
        })
        .collect();

    Ok(elements)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINE OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Split raw output into lines, dropping trailing blank lines
#[must_use]
pub fn output_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// Keep the first `limit` lines; `limit <= 0` keeps everything
#[must_use]
pub fn truncate_lines(mut lines: Vec<String>, limit: i64) -> Vec<String> {
    if let Ok(limit) = usize::try_from(limit) {
        if limit > 0 && lines.len() > limit {
            lines.truncate(limit);
        }
    }
    lines
}
