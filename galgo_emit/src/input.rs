use crate::{Fragment, INPUT_HINT};

/// Renders one named `StringName` constant per retained input action, in
/// manifest order.
pub fn emit_input_actions(actions: &[String]) -> Option<Fragment> {
    if actions.is_empty() {
        return None;
    }

    let mut source = String::new();
    source.push_str("using Godot;\n");
    source.push_str("using System;\n\n");
    source.push_str("public partial class InputActionName\n{\n");
    for action in actions {
        source.push_str(&format!(
            "    public static readonly StringName {action} = \"{action}\";\n"
        ));
    }
    source.push_str("}\n");

    Some(Fragment {
        hint_name: INPUT_HINT.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_keep_manifest_order() {
        let fragment = emit_input_actions(&[
            "move_left".to_string(),
            "jump".to_string(),
        ])
        .unwrap();

        let move_left = fragment
            .source
            .find("public static readonly StringName move_left = \"move_left\";")
            .unwrap();
        let jump = fragment
            .source
            .find("public static readonly StringName jump = \"jump\";")
            .unwrap();
        assert!(move_left < jump);
    }

    #[test]
    fn no_actions_means_no_fragment() {
        assert!(emit_input_actions(&[]).is_none());
    }
}
