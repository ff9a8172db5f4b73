use galgo_symbols::{ClassScan, DeclaredMember};

use crate::{Fragment, HELPER_SUFFIX, close_namespace, open_namespace, render_forward_args, render_params};

const SIGNAL_DELEGATE_SUFFIX: &str = "EventHandler";

/// Renders the per-class member helper: the `GetNodes()` accessor body,
/// remote-call wrapper overloads, and event-emit wrappers, one partial
/// class per scanned class.
pub fn emit_class_helper(scan: &ClassScan) -> Fragment {
    let mut source = String::new();
    source.push_str("using Godot;\n");
    source.push_str("using Godot.NativeInterop;\n\n");
    open_namespace(&mut source, &scan.namespace);

    source.push_str(&format!("partial class {}\n{{\n", scan.name));

    emit_accessors(&mut source, scan);
    for member in &scan.members {
        match member {
            DeclaredMember::RemoteCall { name, params } => {
                emit_remote_call(&mut source, name, params);
            }
            DeclaredMember::EventEmit { name, params } => {
                emit_event(&mut source, name, params);
            }
            DeclaredMember::Accessor { .. } => {}
        }
    }

    source.push_str("}\n");
    close_namespace(&mut source, &scan.namespace);

    Fragment {
        hint_name: format!("{}{HELPER_SUFFIX}", scan.hint_name),
        source,
    }
}

/// One lookup statement per accessor member: a required lookup when the
/// not-null flag is set, an optional lookup otherwise.
fn emit_accessors(source: &mut String, scan: &ClassScan) {
    let accessors: Vec<_> = scan
        .members
        .iter()
        .filter_map(|m| match m {
            DeclaredMember::Accessor {
                name,
                ty,
                path,
                not_null,
                ..
            } => Some((name, ty, path, *not_null)),
            _ => None,
        })
        .collect();
    if accessors.is_empty() {
        return;
    }

    source.push_str("    public void GetNodes()\n    {\n");
    for (name, ty, path, not_null) in accessors {
        let lookup = if not_null { "GetNode" } else { "GetNodeOrNull" };
        source.push_str(&format!("        {name} = {lookup}<{ty}>(\"{path}\");\n"));
    }
    source.push_str("    }\n\n");
}

/// Two overloads per remote-call target: a broadcast call and a directed
/// call with a leading peer id, both forwarding parameters in declared
/// order.
fn emit_remote_call(source: &mut String, name: &str, params: &[galgo_symbols::Param]) {
    let params_text = render_params(params);
    let args_text = render_forward_args(params);

    source.push_str(&format!("    /// <inheritdoc cref=\"{name}\"/>\n"));
    source.push_str(&format!("    public void Rpc{name}({params_text})\n    {{\n"));
    source.push_str(&format!("        Rpc(MethodName.{name}{args_text});\n"));
    source.push_str("    }\n\n");

    source.push_str(&format!("    /// <inheritdoc cref=\"{name}\"/>\n"));
    let lead = if params.is_empty() { "" } else { ", " };
    source.push_str(&format!(
        "    public void Rpc{name}(long peerId{lead}{params_text})\n    {{\n"
    ));
    source.push_str(&format!("        RpcId(peerId, MethodName.{name}{args_text});\n"));
    source.push_str("    }\n\n");
}

/// One wrapper per event-signal delegate, named after the delegate with
/// its fixed suffix stripped.
fn emit_event(source: &mut String, delegate_name: &str, params: &[galgo_symbols::Param]) {
    let signal = delegate_name
        .strip_suffix(SIGNAL_DELEGATE_SUFFIX)
        .unwrap_or(delegate_name);
    let params_text = render_params(params);
    let args_text = render_forward_args(params);

    source.push_str(&format!("    /// <inheritdoc cref=\"{delegate_name}\"/>\n"));
    source.push_str(&format!("    public void Emit{signal}({params_text})\n    {{\n"));
    source.push_str(&format!("        EmitSignal(SignalName.{signal}{args_text});\n"));
    source.push_str("    }\n\n");
}
