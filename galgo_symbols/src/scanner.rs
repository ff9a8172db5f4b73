use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    AttributeUse, ClassSymbol, Diagnostic, MemberSymbol, Param, SourceLocation, SymbolGraph, names,
};

/// One marked member found on a scanned class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclaredMember {
    /// Field or property carrying the accessor marker. `path` is already
    /// effective: the marker's explicit path, or `%Name` when it was empty.
    Accessor {
        name: String,
        ty: String,
        path: String,
        not_null: bool,
        location: SourceLocation,
    },
    /// Ordinary method carrying the remote-call marker.
    RemoteCall { name: String, params: Vec<Param> },
    /// Nested delegate carrying the event-signal marker.
    EventEmit { name: String, params: Vec<Param> },
}

/// All marked members of one class reaching the engine root type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScan {
    pub name: String,
    pub namespace: String,
    pub qualified_name: String,
    pub hint_name: String,
    pub members: Vec<DeclaredMember>,
}

/// Record for a class carrying the autoload-registration marker. Created
/// once per class, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoloadClass {
    pub base_is_autoload: bool,
    pub namespace: String,
    pub hint_name: String,
    pub name: String,
    pub qualified_name: String,
}

/// Per-class method table used only when joining against scene connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMethods {
    pub name: String,
    pub namespace: String,
    pub hint_name: String,
    pub source_path: String,
    /// Method name -> rendered call expression.
    pub methods: IndexMap<String, String>,
}

/// Walks every class reaching the engine root type and collects its marked
/// members, one `DeclaredMember` variant per marker kind. Classes seen from
/// multiple partial fragments are visited once, keyed by qualified name.
pub fn scan_classes(graph: &SymbolGraph, diagnostics: &mut Vec<Diagnostic>) -> Vec<ClassScan> {
    let mut seen = HashSet::new();
    let mut scans = Vec::new();

    for class in &graph.classes {
        if !graph.inherits_root(class) {
            continue;
        }
        let qualified_name = class.qualified_name();
        if !seen.insert(qualified_name.clone()) {
            continue;
        }

        let members = scan_members(class, &qualified_name, diagnostics);
        if members.is_empty() {
            continue;
        }
        scans.push(ClassScan {
            name: class.name.clone(),
            namespace: class.namespace.clone(),
            hint_name: class.hint_name(),
            qualified_name,
            members,
        });
    }

    scans
}

fn scan_members(
    class: &ClassSymbol,
    qualified_name: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<DeclaredMember> {
    let mut members = Vec::new();
    // Effective accessor path -> member name that claimed it.
    let mut accessor_paths: HashMap<String, String> = HashMap::new();

    for member in &class.members {
        match member {
            MemberSymbol::Field {
                name,
                ty,
                is_static: false,
                ..
            }
            | MemberSymbol::Property {
                name,
                ty,
                is_static: false,
                ..
            } => {
                let Some(attr) = member.find_attribute(names::AUTO_GET_ATTR) else {
                    continue;
                };
                let (path, not_null) = accessor_args(name, attr);
                if let Some(first) = accessor_paths.get(&path) {
                    diagnostics.push(Diagnostic {
                        code: "GLG0001",
                        message: format!(
                            "accessor path `{path}` on {qualified_name}.{name} is already used by `{first}`; member skipped"
                        ),
                        location: attr.location.clone(),
                    });
                    continue;
                }
                accessor_paths.insert(path.clone(), name.clone());
                members.push(DeclaredMember::Accessor {
                    name: name.clone(),
                    ty: ty.clone(),
                    path,
                    not_null,
                    location: attr.location.clone(),
                });
            }
            MemberSymbol::Method {
                name,
                params,
                is_static: false,
                is_implicit: false,
                ..
            } => {
                if member.find_attribute(names::RPC_ATTR).is_none() {
                    continue;
                }
                members.push(DeclaredMember::RemoteCall {
                    name: name.clone(),
                    params: params.clone(),
                });
            }
            MemberSymbol::Delegate { name, params, .. } => {
                if member.find_attribute(names::SIGNAL_ATTR).is_none() {
                    continue;
                }
                members.push(DeclaredMember::EventEmit {
                    name: name.clone(),
                    params: params.clone(),
                });
            }
            _ => {}
        }
    }

    members
}

/// Marker constructor arguments are positional: `(path, notNull)`, with an
/// empty path defaulting to the unique-name lookup `%Member`.
fn accessor_args(member_name: &str, attr: &AttributeUse) -> (String, bool) {
    let explicit = attr
        .args
        .first()
        .and_then(|a| a.as_str())
        .unwrap_or("")
        .trim();
    let not_null = attr.args.get(1).and_then(|a| a.as_bool()).unwrap_or(true);
    let path = if explicit.is_empty() {
        format!("%{member_name}")
    } else {
        explicit.to_string()
    };
    (path, not_null)
}

/// Collects every class carrying the autoload-registration marker.
pub fn scan_autoload_classes(graph: &SymbolGraph) -> Vec<AutoloadClass> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for class in &graph.classes {
        if !class.has_attribute(names::AUTOLOAD_GET_ATTR) {
            continue;
        }
        let qualified_name = class.qualified_name();
        if !seen.insert(qualified_name.clone()) {
            continue;
        }

        // Only the immediate base matters here, not the whole chain.
        let base_is_autoload = class
            .base
            .as_ref()
            .and_then(|b| graph.find_class(&b.qualified_name))
            .is_some_and(|b| b.has_attribute(names::AUTOLOAD_GET_ATTR));

        records.push(AutoloadClass {
            base_is_autoload,
            namespace: class.namespace.clone(),
            hint_name: class.hint_name(),
            name: class.name.clone(),
            qualified_name,
        });
    }

    records
}

/// One field marked for change-notifying property generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyField {
    pub name: String,
    /// Pascal-case rendering of the field name; the generated property.
    pub property_name: String,
    pub ty: String,
    /// Notify through an engine signal instead of a plain event.
    pub use_signal: bool,
    /// Export the generated property to the editor.
    pub use_export: bool,
}

/// All notify-marked fields of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyClass {
    pub name: String,
    pub namespace: String,
    pub hint_name: String,
    pub fields: Vec<NotifyField>,
}

/// Collects every class with at least one notify-marked field. Any class
/// qualifies; the generated property wraps the field directly, so no base
/// chain is required. A field whose pascal-case rendering equals its own
/// name has no distinct property to generate and is skipped.
pub fn scan_notify_classes(graph: &SymbolGraph) -> Vec<NotifyClass> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for class in &graph.classes {
        if !seen.insert(class.qualified_name()) {
            continue;
        }

        let mut fields = Vec::new();
        for member in &class.members {
            let MemberSymbol::Field { name, ty, .. } = member else {
                continue;
            };
            let Some(attr) = member.find_attribute(names::NOTIFY_ATTR) else {
                continue;
            };
            let property_name = to_pascal_case(name);
            if property_name == *name {
                debug!("notify field {}.{name} already pascal-cased, skipping", class.name);
                continue;
            }
            fields.push(NotifyField {
                name: name.clone(),
                property_name,
                ty: ty.clone(),
                use_signal: attr.args.first().and_then(|a| a.as_bool()).unwrap_or(false),
                use_export: attr.args.get(1).and_then(|a| a.as_bool()).unwrap_or(false),
            });
        }
        if fields.is_empty() {
            continue;
        }

        records.push(NotifyClass {
            name: class.name.clone(),
            namespace: class.namespace.clone(),
            hint_name: class.hint_name(),
            fields,
        });
    }

    records
}

fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Collects method tables for every class reaching the engine root type,
/// for joining against scene connections by script path.
pub fn scan_class_methods(graph: &SymbolGraph) -> Vec<ClassMethods> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for class in &graph.classes {
        if !graph.inherits_root(class) {
            continue;
        }
        let qualified_name = class.qualified_name();
        if !seen.insert(qualified_name) {
            continue;
        }

        let mut methods = IndexMap::new();
        for member in &class.members {
            if let MemberSymbol::Method {
                name,
                params,
                is_static: false,
                is_implicit: false,
                ..
            } = member
            {
                if methods.contains_key(name) {
                    debug!("overloaded method {}.{name}, keeping first", class.name);
                    continue;
                }
                methods.insert(name.clone(), render_call_expression(name, params));
            }
        }
        if methods.is_empty() {
            continue;
        }

        records.push(ClassMethods {
            name: class.name.clone(),
            namespace: class.namespace.clone(),
            hint_name: class.hint_name(),
            source_path: class.source_path.clone(),
            methods,
        });
    }

    records
}

/// A compilable call expression with default arguments, enough for the
/// editor-navigation listing to reference the method.
fn render_call_expression(name: &str, params: &[Param]) -> String {
    let args = params
        .iter()
        .map(|_| "default")
        .collect::<Vec<_>>()
        .join(", ");
    format!("{name}({args});")
}
