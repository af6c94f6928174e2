//! Narrative text extraction
//!
//! Stat blocks were historically written as prose in a single notes field:
//!
//! ```text
//! SKILLS: Awareness +10, Forbidden Lore (Warp, Daemonology).
//! TALENTS: Swift Attack, Fearless.
//! SPECIAL ABILITIES:
//! • Warp Regeneration — regrows lost limbs within minutes.
//! ```
//!
//! This module is the layered grammar over that format: section boundary
//! detection, then entry tokenization, then small lexical helpers the
//! per-kind record builders share. The boundary rules live here and
//! nowhere else.
//!
//! A section starts after the first `LABEL:` occurrence and any following
//! whitespace, and runs to the first of:
//!
//! 1. a period immediately followed by a line break (period excluded),
//! 2. a blank line,
//! 3. a line break followed by another all-caps label (two or more
//!    uppercase letters, then a colon or whitespace),
//! 4. end of text.
//!
//! The span is then whitespace-collapsed and stripped of trailing periods.
//! An absent label yields nothing rather than an error; callers treat that
//! as an empty section.

// ============================================================================
// Section location
// ============================================================================

/// Extract the normalized text of a named section, e.g. `section(notes,
/// "SKILLS")`. Returns `None` when the label does not occur.
pub fn section(text: &str, label: &str) -> Option<String> {
    let raw = section_span(text, label)?;
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(collapsed.trim_end_matches('.').to_string())
}

/// Like [`section`], but takes several candidate labels and reads the one
/// occurring earliest in the text. Used for sections with historical
/// spelling variants ("SPECIAL ABILITIES" vs "SPECIAL RULES").
pub fn section_any(text: &str, labels: &[&str]) -> Option<String> {
    let label = labels
        .iter()
        .filter_map(|l| text.find(&format!("{l}:")).map(|pos| (pos, *l)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, l)| l)?;
    section(text, label)
}

/// Comma-separated entries of a named section. An absent section yields an
/// empty list.
pub fn section_entries(text: &str, label: &str) -> Vec<String> {
    match section(text, label) {
        Some(s) => split_entries(&s),
        None => Vec::new(),
    }
}

/// Raw section span per the module-level boundary rules.
fn section_span<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let tag = format!("{label}:");
    let after = text.find(&tag)? + tag.len();
    let rest = &text[after..];
    let offset = rest
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)?;
    let start = after + offset;

    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut end = len;
    let mut i = start;
    while i < len {
        if bytes[i] == b'.' && i + 1 < len && bytes[i + 1] == b'\n' {
            end = i;
            break;
        }
        if bytes[i] == b'\n' {
            if i + 1 < len && bytes[i + 1] == b'\n' {
                end = i;
                break;
            }
            if followed_by_label(text, i + 1) {
                end = i;
                break;
            }
        }
        i += 1;
    }
    Some(&text[start..end])
}

/// Whether `text` at byte position `pos` starts another all-caps label:
/// two or more uppercase ASCII letters followed by a colon or whitespace.
fn followed_by_label(text: &str, pos: usize) -> bool {
    let bytes = text.as_bytes();
    let mut j = pos;
    while j < bytes.len() && bytes[j].is_ascii_uppercase() {
        j += 1;
    }
    if j - pos < 2 || j >= bytes.len() {
        return false;
    }
    bytes[j] == b':' || text[j..].chars().next().is_some_and(char::is_whitespace)
}

// ============================================================================
// Entry tokenization
// ============================================================================

/// Split a section string into entries on commas, except commas inside a
/// parenthetical group: `"Forbidden Lore (Warp, Daemonology), Dodge"` is
/// two entries. Depth may go negative on unbalanced input; a comma only
/// splits at depth zero. Empty entries are dropped.
pub fn split_entries(text: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                entries.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    entries.push(current);
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

// ============================================================================
// Bullet lists
// ============================================================================

/// Split a bulleted section on the `•` marker, trimming each piece and
/// dropping empties.
pub fn split_bullets(text: &str) -> Vec<String> {
    text.split('•')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split one bullet at the first en- or em-dash into a name and a
/// description. Bullets without a dash (or with nothing on one side)
/// yield `None` and are discarded by callers.
pub fn split_name_description(bullet: &str) -> Option<(String, String)> {
    let dash = bullet
        .char_indices()
        .find(|(_, c)| *c == '\u{2014}' || *c == '\u{2013}')?;
    let name = bullet[..dash.0].trim();
    let description = bullet[dash.0 + dash.1.len_utf8()..].trim();
    if name.is_empty() || description.is_empty() {
        return None;
    }
    Some((name.to_string(), description.to_string()))
}

// ============================================================================
// Parentheticals
// ============================================================================

/// Find a trailing parenthetical group by scanning back from the closing
/// paren to its match, so nested qualifiers stay intact. Returns the base
/// name and the group contents, both trimmed. `None` when the name does
/// not end in `)`, the parens are unbalanced, or either side is empty.
pub fn trailing_parenthetical(name: &str) -> Option<(&str, &str)> {
    let trimmed = name.trim_end();
    if !trimmed.ends_with(')') {
        return None;
    }
    let mut depth = 0i32;
    for (i, c) in trimmed.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    let base = trimmed[..i].trim();
                    let inner = trimmed[i + 1..trimmed.len() - 1].trim();
                    if base.is_empty() || inner.is_empty() {
                        return None;
                    }
                    return Some((base, inner));
                }
            }
            _ => {}
        }
    }
    None
}
