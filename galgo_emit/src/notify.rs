use galgo_symbols::{NotifyClass, NotifyField};

use crate::{Fragment, NOTIFY_SUFFIX, close_namespace, open_namespace};

/// Renders change-notifying property wrappers for a class's marked
/// fields: a pascal-cased property with an equality-guarded setter,
/// `On{X}Changing`/`On{X}Changed` partial hooks, and a `{X}Changed`
/// notification raised as a plain event or an engine signal.
pub fn emit_notify_wrappers(class: &NotifyClass) -> Fragment {
    let mut source = String::new();
    source.push_str("using Godot;\n");
    source.push_str("using System;\n");
    source.push_str("using System.Collections.Generic;\n\n");
    open_namespace(&mut source, &class.namespace);

    source.push_str(&format!("partial class {}\n{{\n", class.name));
    for field in &class.fields {
        emit_field(&mut source, field);
    }
    source.push_str("}\n");

    close_namespace(&mut source, &class.namespace);

    Fragment {
        hint_name: format!("{}{NOTIFY_SUFFIX}", class.hint_name),
        source,
    }
}

fn emit_field(source: &mut String, field: &NotifyField) {
    let NotifyField {
        name,
        property_name,
        ty,
        use_signal,
        use_export,
    } = field;

    if *use_signal {
        source.push_str(&format!(
            "    [Signal] public delegate void {property_name}ChangedEventHandler({ty} oldValue, {ty} newValue);\n"
        ));
    } else {
        source.push_str(&format!(
            "    public event Action<{ty}, {ty}> {property_name}Changed;\n"
        ));
    }
    source.push_str(&format!(
        "    partial void On{property_name}Changing({ty} oldValue, {ty} newValue);\n"
    ));
    source.push_str(&format!(
        "    partial void On{property_name}Changed({ty} oldValue, {ty} newValue);\n\n"
    ));

    let export = if *use_export { "[Export] " } else { "" };
    let notify = if *use_signal {
        format!("Emit{property_name}Changed(oldValue, value);")
    } else {
        format!("{property_name}Changed?.Invoke(oldValue, value);")
    };

    source.push_str(&format!("    /// <inheritdoc cref=\"{name}\"/>\n"));
    source.push_str(&format!("    {export}public {ty} {property_name}\n    {{\n"));
    source.push_str(&format!("        get => {name};\n"));
    source.push_str("        set\n        {\n");
    source.push_str(&format!(
        "            if (!EqualityComparer<{ty}>.Default.Equals({name}, value))\n"
    ));
    source.push_str("            {\n");
    source.push_str(&format!("                var oldValue = {name};\n"));
    source.push_str(&format!(
        "                On{property_name}Changing(oldValue, value);\n"
    ));
    source.push_str(&format!("                {name} = value;\n"));
    source.push_str(&format!(
        "                On{property_name}Changed(oldValue, value);\n"
    ));
    source.push_str(&format!("                {notify}\n"));
    source.push_str("            }\n        }\n    }\n\n");
}
