//! Renders C# source fragments from scanned/joined snapshots. Every
//! identifier in the output is derived from the originating declared name
//! by fixed prefix/suffix rules, so re-running over unchanged input yields
//! byte-identical text and generated call sites stay stable across
//! unrelated edits.

pub mod autoload;
pub mod connections;
pub mod helper;
pub mod input;
pub mod notify;

pub use autoload::{AutoloadSlot, emit_autoload_registry};
pub use connections::{ConnectionRef, emit_connection_listing};
pub use helper::emit_class_helper;
pub use input::emit_input_actions;
pub use notify::emit_notify_wrappers;

/// One named generated source fragment, returned to the host for inclusion
/// in the compiled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub hint_name: String,
    pub source: String,
}

/// Suffix appended to a class's sanitized qualified name for its member
/// helper fragment.
pub const HELPER_SUFFIX: &str = "_Galgo.g.cs";

/// Suffix for the per-class scene-connection listing fragment.
pub const CONNECTIONS_SUFFIX: &str = "_Galgo_ConnectionTscn.g.cs";

/// Suffix for the per-class change-notifying property fragment.
pub const NOTIFY_SUFFIX: &str = "_GalgoNotify.g.cs";

/// Hint name of the project-wide autoload registry fragment.
pub const AUTOLOAD_HINT: &str = "GalgoGenerator_Autoload.g.cs";

/// Hint name of the input-action constants fragment.
pub const INPUT_HINT: &str = "GalgoGenerator_InputActionName.g.cs";

pub(crate) fn open_namespace(source: &mut String, namespace: &str) {
    if !namespace.is_empty() {
        source.push_str(&format!("namespace {namespace} {{\n\n"));
    }
}

pub(crate) fn close_namespace(source: &mut String, namespace: &str) {
    if !namespace.is_empty() {
        source.push_str("\n}\n");
    }
}

pub(crate) fn render_params(params: &[galgo_symbols::Param]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Arguments forwarded positionally after a leading fixed argument, so the
/// result always starts with `, ` when any parameter exists.
pub(crate) fn render_forward_args(params: &[galgo_symbols::Param]) -> String {
    params
        .iter()
        .map(|p| format!(", {}", p.name))
        .collect::<String>()
}
