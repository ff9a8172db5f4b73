use galgo_symbols::ClassMethods;

use crate::{CONNECTIONS_SUFFIX, Fragment, close_namespace, open_namespace};

/// A single scene-file signal wired to a method on the target class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRef {
    pub scene_path: String,
    pub from: String,
    pub signal: String,
    pub call: String,
}

/// Renders the editor-only listing of every scene connection targeting
/// the class, one comment plus call expression per connection. The body
/// returns immediately so the calls are never executed, they only exist
/// so the editor sees each method referenced.
pub fn emit_connection_listing(
    class: &ClassMethods,
    connections: &[ConnectionRef],
) -> Option<Fragment> {
    if connections.is_empty() {
        return None;
    }

    let mut source = String::new();
    source.push_str("using Godot;\n");
    source.push_str("using Godot.NativeInterop;\n\n");
    open_namespace(&mut source, &class.namespace);

    source.push_str("#pragma warning disable CS0162\n");
    source.push_str("#if TOOLS\n");
    source.push_str(&format!("partial class {}\n{{\n", class.name));
    source.push_str("    public void GetMethodConnectionTscnList()\n    {\n");
    source.push_str("        return;\n");
    for conn in connections {
        source.push_str(&format!(
            "        // {} - FromNode: {} - Signal: {}\n",
            conn.scene_path, conn.from, conn.signal
        ));
        source.push_str(&format!("        {}\n", conn.call));
    }
    source.push_str("    }\n");
    source.push_str("}\n");
    source.push_str("#endif // TOOLS\n");
    source.push_str("#pragma warning restore CS0162\n");

    close_namespace(&mut source, &class.namespace);

    Some(Fragment {
        hint_name: format!("{}{CONNECTIONS_SUFFIX}", class.hint_name),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn class() -> ClassMethods {
        let mut methods = IndexMap::new();
        methods.insert("OnHit".to_string(), "OnHit(default);".to_string());
        ClassMethods {
            name: "Player".to_string(),
            namespace: "Game".to_string(),
            hint_name: "Game.Player".to_string(),
            source_path: "res://Player.cs".to_string(),
            methods,
        }
    }

    #[test]
    fn listing_carries_comment_and_call_per_connection() {
        let connections = vec![ConnectionRef {
            scene_path: "res://main.tscn".to_string(),
            from: "Area2D".to_string(),
            signal: "body_entered".to_string(),
            call: "OnHit(default);".to_string(),
        }];
        let fragment = emit_connection_listing(&class(), &connections).unwrap();

        assert_eq!(fragment.hint_name, "Game.Player_Galgo_ConnectionTscn.g.cs");
        assert!(
            fragment
                .source
                .contains("// res://main.tscn - FromNode: Area2D - Signal: body_entered")
        );
        assert!(fragment.source.contains("        OnHit(default);"));
        assert!(fragment.source.contains("#if TOOLS"));
        assert!(fragment.source.contains("        return;"));
    }

    #[test]
    fn empty_connection_set_emits_nothing() {
        assert!(emit_connection_listing(&class(), &[]).is_none());
    }
}
