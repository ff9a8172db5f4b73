use galgo_symbols::AutoloadClass;

use crate::{AUTOLOAD_HINT, Fragment};

/// One registry slot: a manifest autoload entry, with the declared class
/// matched by name when one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoloadSlot {
    pub entry_name: String,
    pub class: Option<AutoloadClass>,
}

/// Renders the autoload registry: an explicit value constructed once from
/// the scene root and passed by handle to consumers. Slots with a matching
/// marked class are typed to that exact class; the rest fall back to a
/// plain node slot, never an error.
pub fn emit_autoload_registry(slots: &[AutoloadSlot]) -> Option<Fragment> {
    if slots.is_empty() {
        return None;
    }

    let mut source = String::new();
    source.push_str("using Godot;\n");
    source.push_str("using System;\n\n");
    source.push_str("/// <summary>\n");
    source.push_str("/// Autoload lookups, resolved once at startup from the scene root.\n");
    source.push_str("/// </summary>\n");
    source.push_str("public sealed partial class AutoloadRegistry\n{\n");

    for slot in slots {
        let ty = slot_type(slot);
        source.push_str(&format!("    public {ty} {} {{ get; }}\n", slot.entry_name));
    }

    source.push_str("\n    public AutoloadRegistry(global::Godot.Node root)\n    {\n");
    for slot in slots {
        let lookup = match &slot.class {
            Some(class) => format!(
                "root.GetNode<global::{}>(\"/root/{}\")",
                class.qualified_name, slot.entry_name
            ),
            None => format!("root.GetNode(\"/root/{}\")", slot.entry_name),
        };
        source.push_str(&format!("        {} = {lookup};\n", slot.entry_name));
    }
    source.push_str("    }\n}\n");

    Some(Fragment {
        hint_name: AUTOLOAD_HINT.to_string(),
        source,
    })
}

fn slot_type(slot: &AutoloadSlot) -> String {
    match &slot.class {
        Some(class) => format!("global::{}", class.qualified_name),
        None => "global::Godot.Node".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn music_class() -> AutoloadClass {
        AutoloadClass {
            base_is_autoload: false,
            namespace: "Game".to_string(),
            hint_name: "Game.Music".to_string(),
            name: "Music".to_string(),
            qualified_name: "Game.Music".to_string(),
        }
    }

    #[test]
    fn matched_slot_is_typed_to_exact_class() {
        let fragment = emit_autoload_registry(&[AutoloadSlot {
            entry_name: "Music".to_string(),
            class: Some(music_class()),
        }])
        .unwrap();

        assert_eq!(fragment.hint_name, AUTOLOAD_HINT);
        assert!(fragment.source.contains("public global::Game.Music Music { get; }"));
        assert!(
            fragment
                .source
                .contains("Music = root.GetNode<global::Game.Music>(\"/root/Music\");")
        );
    }

    #[test]
    fn unmatched_slot_falls_back_to_plain_node() {
        let fragment = emit_autoload_registry(&[AutoloadSlot {
            entry_name: "Hud".to_string(),
            class: None,
        }])
        .unwrap();

        assert!(fragment.source.contains("public global::Godot.Node Hud { get; }"));
        assert!(fragment.source.contains("Hud = root.GetNode(\"/root/Hud\");"));
    }

    #[test]
    fn no_slots_means_no_fragment() {
        assert!(emit_autoload_registry(&[]).is_none());
    }
}
