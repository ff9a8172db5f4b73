use log::debug;

/// Which recognized manifest section an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Autoload,
    InputAction,
}

/// One accepted line from a recognized section of `project.godot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub kind: EntryKind,
    pub name: String,
    pub path: Option<String>,
}

const AUTOLOAD_SECTION: &str = "autoload";
const INPUT_SECTION: &str = "input";

/// Parses the project manifest into its recognized entries, in file order.
///
/// Every bracketed section is tracked generically and the two relevant ones
/// are picked by name, so section ordering and unknown sections in between
/// are harmless. Malformed lines are skipped, never an error.
pub fn parse_manifest(text: &str) -> Vec<ManifestEntry> {
    let mut entries: Vec<ManifestEntry> = Vec::new();
    let mut section: Option<&str> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = section_header(line) {
            section = match header {
                AUTOLOAD_SECTION => Some(AUTOLOAD_SECTION),
                INPUT_SECTION => Some(INPUT_SECTION),
                _ => None,
            };
            continue;
        }

        let Some(entry) = (match section {
            Some(AUTOLOAD_SECTION) => parse_autoload_line(line),
            Some(INPUT_SECTION) => parse_input_line(line),
            _ => None,
        }) else {
            if section.is_some() {
                debug!("skipping malformed manifest line: {line}");
            }
            continue;
        };

        if entries
            .iter()
            .any(|e| e.kind == entry.kind && e.name == entry.name)
        {
            debug!("duplicate manifest entry `{}`, keeping first", entry.name);
            continue;
        }
        entries.push(entry);
    }

    entries
}

fn section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    rest.strip_suffix(']')
}

/// Autoload lines look like `Music="*res://scripts/music.cs"`. Accepted only
/// when splitting on `=` yields exactly a name and a quoted path.
fn parse_autoload_line(line: &str) -> Option<ManifestEntry> {
    let fields: Vec<&str> = line.split('=').collect();
    if fields.len() != 2 {
        return None;
    }
    Some(ManifestEntry {
        kind: EntryKind::Autoload,
        name: fields[0].trim().to_string(),
        path: Some(fields[1].trim().trim_matches('"').to_string()),
    })
}

/// Input lines look like `move_left={ "deadzone": 0.5, ... }`; only the
/// action name before the first `=` matters.
fn parse_input_line(line: &str) -> Option<ManifestEntry> {
    let mut fields = line.splitn(2, '=');
    let name = fields.next()?.trim();
    fields.next()?;
    if name.is_empty() {
        return None;
    }
    Some(ManifestEntry {
        kind: EntryKind::InputAction,
        name: name.to_string(),
        path: None,
    })
}
