use indexmap::IndexMap;
use log::debug;

use crate::HeaderLexer;

/// Script extension this parser cares about; resources pointing anywhere
/// else are dropped.
pub const SCRIPT_EXTENSION: &str = ".cs";

/// Sentinel name for the scene root node (a node header with no `parent`).
pub const ROOT_NODE: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    ExtResource,
    Node,
    Connection,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneTag {
    pub kind: TagKind,
    pub name: String,
    pub properties: IndexMap<String, String>,
}

/// One parsed scene asset, retained only when it wires at least one signal
/// to a script method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneAsset {
    pub path: String,
    pub tags: Vec<SceneTag>,
}

impl SceneAsset {
    pub fn connections(&self) -> impl Iterator<Item = &SceneTag> {
        self.tags.iter().filter(|t| t.kind == TagKind::Connection)
    }
}

fn recognize(kind: &str) -> Option<TagKind> {
    match kind {
        "ext_resource" => Some(TagKind::ExtResource),
        "node" => Some(TagKind::Node),
        "connection" => Some(TagKind::Connection),
        _ => None,
    }
}

/// Parses one scene asset into its filtered tag list.
///
/// `path` is the `res://` path the asset is known by; it is carried along so
/// downstream joins can match connections back to class source files.
///
/// Returns `None` when the asset is irrelevant to generation: no script
/// resource of the target extension, or no resolvable connection tags.
pub fn parse_scene(path: &str, text: &str) -> Option<SceneAsset> {
    let mut asset = SceneAsset {
        path: path.to_string(),
        tags: Vec::new(),
    };

    // Headers before the first node are resource registrations; the kind
    // starts as ExtResource so the transition check below fires on the
    // first non-resource tag.
    let mut current = TagKind::ExtResource;
    let mut current_node: Option<usize> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            current_node = None;
            let Some((kind_word, properties)) = HeaderLexer::new(line).parse() else {
                current = TagKind::Other;
                continue;
            };
            let Some(kind) = recognize(&kind_word) else {
                current = TagKind::Other;
                continue;
            };

            if kind != TagKind::ExtResource && current == TagKind::ExtResource {
                // Leaving the resource block without a single script
                // resource means nothing here can ever join a class.
                if !asset.tags.iter().any(|t| t.kind == TagKind::ExtResource) {
                    return None;
                }
            }
            current = kind;

            match kind {
                TagKind::ExtResource => {
                    let is_script = properties
                        .get("path")
                        .is_some_and(|p| p.ends_with(SCRIPT_EXTENSION));
                    if !is_script {
                        continue;
                    }
                    let Some(id) = properties.get("id") else {
                        continue;
                    };
                    asset.tags.push(SceneTag {
                        kind,
                        name: id.clone(),
                        properties,
                    });
                }
                TagKind::Node => {
                    let Some(name) = properties.get("name") else {
                        continue;
                    };
                    let name = if properties.contains_key("parent") {
                        name.clone()
                    } else {
                        ROOT_NODE.to_string()
                    };
                    asset.tags.push(SceneTag {
                        kind,
                        name,
                        properties,
                    });
                    current_node = Some(asset.tags.len() - 1);
                }
                TagKind::Connection => {
                    if let Some(tag) = resolve_connection(&asset.tags, properties) {
                        asset.tags.push(tag);
                    }
                }
                TagKind::Other => {}
            }
            continue;
        }

        // Body lines only matter for nodes, and only the script binding.
        if current == TagKind::Node {
            if let Some(idx) = current_node {
                attach_script_id(&mut asset.tags[idx], line);
            }
        }
    }

    if asset.connections().next().is_none() {
        debug!("scene {} has no resolved connections, discarding", asset.path);
        return None;
    }
    Some(asset)
}

/// A connection is kept only when its target node and that node's script
/// resource are both already registered; the resolved script path is stored
/// under the `cs` property.
fn resolve_connection(
    tags: &[SceneTag],
    mut properties: IndexMap<String, String>,
) -> Option<SceneTag> {
    let method = properties.get("method")?.clone();
    let to = properties.get("to")?.clone();

    let node = tags
        .iter()
        .find(|t| t.kind == TagKind::Node && t.name == to)?;
    let script_id = node.properties.get("script")?;
    let resource = tags
        .iter()
        .find(|t| t.kind == TagKind::ExtResource && &t.name == script_id)?;
    let script_path = resource.properties.get("path")?.clone();

    properties.insert("cs".to_string(), script_path);
    Some(SceneTag {
        kind: TagKind::Connection,
        name: method,
        properties,
    })
}

/// Reads a node body line of the shape `script = ExtResource("<id>")` and
/// attaches the resource id to the node tag.
fn attach_script_id(node: &mut SceneTag, line: &str) {
    let Some((key, value)) = line.split_once('=') else {
        return;
    };
    if key.trim() != "script" {
        return;
    }
    let value = value.trim();
    let Some(id) = value
        .strip_prefix("ExtResource(\"")
        .and_then(|v| v.strip_suffix("\")"))
    else {
        return;
    };
    node.properties
        .entry("script".to_string())
        .or_insert_with(|| id.to_string());
}
