//! The incremental generation pipeline: an explicit task graph joining the
//! manifest stream, the scene stream, and the declaration stream into
//! rendered source artifacts.
//!
//! Every stage is memoized by content key ([`galgo_graph`]), so a pass over
//! unchanged inputs recomputes nothing, and the artifact map for a given
//! input set is byte-identical across passes and machines. Aggregates are
//! snapshotted in sorted order before emission; arrival order never leaks
//! into output.

pub mod disk;
pub mod error;

use std::collections::{BTreeMap, HashSet};

use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use galgo_emit::{
    AutoloadSlot, ConnectionRef, emit_autoload_registry, emit_class_helper,
    emit_connection_listing, emit_input_actions, emit_notify_wrappers,
};
use galgo_graph::{
    CacheStats, Cancelled, ContentKey, FileCache, GenerationToken, JoinMemo,
};
use galgo_manifest::{EntryKind, ManifestEntry, parse_manifest};
use galgo_scene::{SceneAsset, parse_scene};
use galgo_symbols::{
    AutoloadClass, ClassMethods, ClassScan, Diagnostic, NotifyClass, SymbolGraph,
    scan_autoload_classes, scan_class_methods, scan_classes, scan_notify_classes,
};

pub use disk::{generate_project, load_inputs, write_artifacts};
pub use error::GeneratorError;

/// One immutable input file: the path it is known by plus its full text.
/// The computation never touches the disk; the front-end snapshots first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSnapshot {
    pub path: String,
    pub text: String,
}

impl TextSnapshot {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// The compiled symbol graph plus the content key of the snapshot it was
/// decoded from. The key drives the declaration stream's memo.
#[derive(Debug, Clone)]
pub struct SymbolSnapshot {
    key: ContentKey,
    graph: SymbolGraph,
}

impl SymbolSnapshot {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            key: ContentKey::of_text(text),
            graph: serde_json::from_str(text)?,
        })
    }

    pub fn from_graph(graph: SymbolGraph) -> Result<Self, serde_json::Error> {
        let rendered = serde_json::to_string(&graph)?;
        Ok(Self {
            key: ContentKey::of_text(&rendered),
            graph,
        })
    }

    pub fn empty() -> Self {
        Self {
            key: ContentKey::of_text(""),
            graph: SymbolGraph::default(),
        }
    }
}

/// Everything one generation pass consumes.
#[derive(Debug, Clone)]
pub struct GeneratorInputs {
    pub manifests: Vec<TextSnapshot>,
    pub scenes: Vec<TextSnapshot>,
    pub symbols: SymbolSnapshot,
}

/// Everything one generation pass produces. The artifact map is keyed by
/// hint name, already in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutput {
    pub artifacts: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Cache counters across every memo the generator holds, for asserting
/// what a pass actually recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub manifests: CacheStats,
    pub scenes: CacheStats,
    pub autoload_joins: CacheStats,
    pub connection_joins: CacheStats,
}

/// Everything the declaration stream derives from one symbol snapshot.
/// Diagnostics are memoized with it so an unchanged snapshot re-reports
/// the same findings.
#[derive(Debug, Clone, Default)]
struct DeclarationScan {
    scans: Vec<ClassScan>,
    autoloads: Vec<AutoloadClass>,
    notifies: Vec<NotifyClass>,
    methods: Vec<ClassMethods>,
    diagnostics: Vec<Diagnostic>,
}

/// The generator instance. Long-lived: each `run` revalidates the memos it
/// owns against the new input snapshots and recomputes only what changed.
#[derive(Default)]
pub struct Generator {
    manifests: FileCache<Vec<ManifestEntry>>,
    scenes: FileCache<SceneAsset>,
    declarations_key: Option<ContentKey>,
    declarations: DeclarationScan,
    autoload_joins: JoinMemo<AutoloadSlot>,
    connection_joins: JoinMemo<Vec<ConnectionRef>>,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> GeneratorStats {
        GeneratorStats {
            manifests: self.manifests.stats(),
            scenes: self.scenes.stats(),
            autoload_joins: self.autoload_joins.stats(),
            connection_joins: self.connection_joins.stats(),
        }
    }

    /// One generation pass. Memos update as streams revalidate, but the
    /// artifact map is committed only at the end; a cancelled pass returns
    /// nothing and the next pass starts from the new snapshot.
    pub fn run(
        &mut self,
        inputs: &GeneratorInputs,
        token: &GenerationToken,
    ) -> Result<GenerationOutput, Cancelled> {
        token.check()?;
        self.update_manifests(&inputs.manifests);

        token.check()?;
        self.update_scenes(&inputs.scenes, token)?;

        token.check()?;
        self.update_declarations(&inputs.symbols);

        let mut output = GenerationOutput {
            artifacts: BTreeMap::new(),
            diagnostics: self.declarations.diagnostics.clone(),
        };

        token.check()?;
        self.emit_manifest_artifacts(&mut output);

        for scan in &self.declarations.scans {
            token.check()?;
            let fragment = emit_class_helper(scan);
            output.artifacts.insert(fragment.hint_name, fragment.source);
        }

        for class in &self.declarations.notifies {
            token.check()?;
            let fragment = emit_notify_wrappers(class);
            output.artifacts.insert(fragment.hint_name, fragment.source);
        }

        token.check()?;
        self.emit_connection_artifacts(&mut output, token)?;

        Ok(output)
    }

    fn update_manifests(&mut self, snapshots: &[TextSnapshot]) {
        let mut live = HashSet::new();
        for snapshot in snapshots {
            live.insert(snapshot.path.clone());
            self.manifests
                .update_with(&snapshot.path, &snapshot.text, |_, text| {
                    Some(parse_manifest(text))
                });
        }
        self.manifests.retain_paths(&live);
    }

    /// Scene snapshots are split into hit and miss halves up front so the
    /// misses can be parsed in parallel; the memo then absorbs the parsed
    /// values one by one.
    fn update_scenes(
        &mut self,
        snapshots: &[TextSnapshot],
        token: &GenerationToken,
    ) -> Result<(), Cancelled> {
        let changed: Vec<&TextSnapshot> = snapshots
            .iter()
            .filter(|s| !self.scenes.is_current(&s.path, ContentKey::of_text(&s.text)))
            .collect();

        let mut parsed: FxHashMap<String, Option<SceneAsset>> = changed
            .par_iter()
            .map(|s| (s.path.clone(), parse_scene(&s.path, &s.text)))
            .collect();
        token.check()?;

        let mut live = HashSet::new();
        for snapshot in snapshots {
            live.insert(snapshot.path.clone());
            self.scenes
                .update_with(&snapshot.path, &snapshot.text, |path, _| {
                    parsed.remove(path).flatten()
                });
        }
        self.scenes.retain_paths(&live);
        Ok(())
    }

    fn update_declarations(&mut self, symbols: &SymbolSnapshot) {
        if self.declarations_key == Some(symbols.key) {
            return;
        }
        debug!("rescanning symbol snapshot ({:?})", symbols.key);
        let mut diagnostics = Vec::new();
        self.declarations = DeclarationScan {
            scans: scan_classes(&symbols.graph, &mut diagnostics),
            autoloads: scan_autoload_classes(&symbols.graph),
            notifies: scan_notify_classes(&symbols.graph),
            methods: scan_class_methods(&symbols.graph),
            diagnostics,
        };
        self.declarations_key = Some(symbols.key);
    }

    /// Join #1 plus the input-action aggregate. Autoload entries match
    /// classes by entry name; an unmatched entry degrades to a generic
    /// slot, never an error.
    fn emit_manifest_artifacts(&mut self, output: &mut GenerationOutput) {
        let mut entries: Vec<ManifestEntry> = Vec::new();
        for (_, parsed) in self.manifests.snapshot() {
            entries.extend(parsed.iter().cloned());
        }

        let mut slots = Vec::new();
        let mut live = HashSet::new();
        for entry in entries.iter().filter(|e| e.kind == EntryKind::Autoload) {
            live.insert(entry.name.clone());
            let class = self
                .declarations
                .autoloads
                .iter()
                .find(|c| c.name == entry.name);
            let pair_key = entry_key(entry).pair(
                class.map(autoload_class_key).unwrap_or_else(|| ContentKey::of_text("")),
            );
            let slot = self
                .autoload_joins
                .get_or_insert_with(&entry.name, pair_key, || AutoloadSlot {
                    entry_name: entry.name.clone(),
                    class: class.cloned(),
                });
            slots.push(slot.clone());
        }
        self.autoload_joins.retain_keys(&live);

        if let Some(fragment) = emit_autoload_registry(&slots) {
            output.artifacts.insert(fragment.hint_name, fragment.source);
        }

        let actions: Vec<String> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::InputAction)
            .map(|e| e.name.clone())
            .collect();
        if let Some(fragment) = emit_input_actions(&actions) {
            output.artifacts.insert(fragment.hint_name, fragment.source);
        }
    }

    /// Join #2: scene connections against class method tables, matched by
    /// the connection's resolved script path. Pairs are memoized per
    /// (scene, class), so editing one scene revalidates only its pairs.
    fn emit_connection_artifacts(
        &mut self,
        output: &mut GenerationOutput,
        token: &GenerationToken,
    ) -> Result<(), Cancelled> {
        let scenes: Vec<(String, SceneAsset)> = self
            .scenes
            .snapshot()
            .into_iter()
            .map(|(path, asset)| (path.to_string(), asset.clone()))
            .collect();
        let methods = self.declarations.methods.clone();

        let mut live = HashSet::new();
        for class in &methods {
            token.check()?;
            let script_path = resource_path(&class.source_path);
            let class_key = class_methods_key(class);

            let mut connections: Vec<ConnectionRef> = Vec::new();
            for (scene_path, asset) in &scenes {
                let Some(scene_key) = self.scenes.key_of(scene_path) else {
                    continue;
                };
                let match_key = format!("{scene_path}\u{0}{script_path}");
                live.insert(match_key.clone());
                let pair = self.connection_joins.get_or_insert_with(
                    &match_key,
                    scene_key.pair(class_key),
                    || join_scene_connections(asset, &script_path, class),
                );
                connections.extend(pair.iter().cloned());
            }

            if let Some(fragment) = emit_connection_listing(class, &connections) {
                output.artifacts.insert(fragment.hint_name, fragment.source);
            }
        }
        self.connection_joins.retain_keys(&live);
        Ok(())
    }
}

/// Connections of one scene targeting one class, in scene order. A
/// connection whose method the class does not declare is dropped.
fn join_scene_connections(
    asset: &SceneAsset,
    script_path: &str,
    class: &ClassMethods,
) -> Vec<ConnectionRef> {
    asset
        .connections()
        .filter(|tag| tag.properties.get("cs").is_some_and(|p| p == script_path))
        .filter_map(|tag| {
            let call = class.methods.get(&tag.name)?;
            Some(ConnectionRef {
                scene_path: asset.path.clone(),
                from: tag.properties.get("from").cloned().unwrap_or_default(),
                signal: tag.properties.get("signal").cloned().unwrap_or_default(),
                call: call.clone(),
            })
        })
        .collect()
}

/// A class source path rendered the way scene resources reference it.
fn resource_path(source_path: &str) -> String {
    let normalized = source_path.replace('\\', "/");
    if normalized.starts_with("res://") {
        normalized
    } else {
        format!("res://{}", normalized.trim_start_matches("./"))
    }
}

fn entry_key(entry: &ManifestEntry) -> ContentKey {
    ContentKey::of_text(&format!(
        "{}\u{0}{}",
        entry.name,
        entry.path.as_deref().unwrap_or("")
    ))
}

fn autoload_class_key(class: &AutoloadClass) -> ContentKey {
    ContentKey::of_text(&format!(
        "{}\u{0}{}\u{0}{}",
        class.base_is_autoload, class.hint_name, class.qualified_name
    ))
}

fn class_methods_key(class: &ClassMethods) -> ContentKey {
    let mut text = String::new();
    text.push_str(&class.hint_name);
    for (name, call) in &class.methods {
        text.push('\n');
        text.push_str(name);
        text.push('=');
        text.push_str(call);
    }
    ContentKey::of_text(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use galgo_graph::GenerationCounter;
    use galgo_symbols::{
        AttrArg, AttributeUse, ClassSymbol, ExternalType, MemberSymbol, Param, SourceLocation,
        TypeRef, names,
    };

    const MANIFEST: &str = r#"
[application]
config/name="Demo"

[autoload]
Music="*res://scripts/Music.cs"
Save="*res://scripts/Save.cs"

[input]
jump={
"deadzone": 0.5
}
"#;

    const PLAYER_SCENE: &str = r#"
[gd_scene load_steps=2 format=3]

[ext_resource type="Script" path="res://scripts/Player.cs" id="1"]

[node name="Player" type="CharacterBody2D"]
script = ExtResource("1")

[node name="Hitbox" type="Area2D" parent="."]

[connection signal="body_entered" from="Hitbox" to="." method="OnHit"]
"#;

    fn node_base() -> Option<TypeRef> {
        Some(TypeRef::new(names::ENGINE_ASSEMBLY, names::ROOT_OBJECT))
    }

    fn player_class() -> ClassSymbol {
        ClassSymbol {
            name: "Player".to_string(),
            namespace: "Game".to_string(),
            assembly: "Game".to_string(),
            base: node_base(),
            source_path: "scripts/Player.cs".to_string(),
            members: vec![
                MemberSymbol::Field {
                    name: "Sprite".to_string(),
                    ty: "global::Godot.Sprite2D".to_string(),
                    is_static: false,
                    attributes: vec![AttributeUse::new(
                        names::AUTO_GET_ATTR,
                        vec![],
                        SourceLocation::new("scripts/Player.cs", 4),
                    )],
                },
                MemberSymbol::Method {
                    name: "OnHit".to_string(),
                    params: vec![Param {
                        name: "body".to_string(),
                        ty: "global::Godot.Node2D".to_string(),
                    }],
                    is_static: false,
                    is_implicit: false,
                    attributes: vec![],
                },
            ],
            attributes: vec![],
        }
    }

    fn music_class() -> ClassSymbol {
        ClassSymbol {
            name: "Music".to_string(),
            namespace: "Game".to_string(),
            assembly: "Game".to_string(),
            base: node_base(),
            source_path: "scripts/Music.cs".to_string(),
            members: vec![],
            attributes: vec![AttributeUse::new(
                names::AUTOLOAD_GET_ATTR,
                vec![],
                SourceLocation::new("scripts/Music.cs", 1),
            )],
        }
    }

    fn graph() -> SymbolGraph {
        SymbolGraph {
            classes: vec![player_class(), music_class()],
            externals: vec![ExternalType {
                assembly: names::ENGINE_ASSEMBLY.to_string(),
                qualified_name: names::ROOT_OBJECT.to_string(),
                base: None,
            }],
        }
    }

    fn inputs() -> GeneratorInputs {
        GeneratorInputs {
            manifests: vec![TextSnapshot::new("project.godot", MANIFEST)],
            scenes: vec![TextSnapshot::new("res://player.tscn", PLAYER_SCENE)],
            symbols: SymbolSnapshot::from_graph(graph()).unwrap(),
        }
    }

    fn token() -> GenerationToken {
        GenerationCounter::new().token()
    }

    #[test]
    fn full_pass_emits_all_artifact_kinds() {
        let mut generator = Generator::new();
        let output = generator.run(&inputs(), &token()).unwrap();

        let hints: Vec<&str> = output.artifacts.keys().map(String::as_str).collect();
        assert_eq!(
            hints,
            vec![
                "GalgoGenerator_Autoload.g.cs",
                "GalgoGenerator_InputActionName.g.cs",
                "Game.Player_Galgo.g.cs",
                "Game.Player_Galgo_ConnectionTscn.g.cs",
            ]
        );
        assert!(output.diagnostics.is_empty());

        let registry = &output.artifacts["GalgoGenerator_Autoload.g.cs"];
        assert!(registry.contains("global::Game.Music Music"));
        // The Save entry has no marked class and degrades to a generic slot.
        assert!(registry.contains("global::Godot.Node Save"));

        let listing = &output.artifacts["Game.Player_Galgo_ConnectionTscn.g.cs"];
        assert!(listing.contains("// res://player.tscn - FromNode: Hitbox - Signal: body_entered"));
        assert!(listing.contains("OnHit(default);"));
    }

    #[test]
    fn passes_are_deterministic_across_instances() {
        let first = Generator::new().run(&inputs(), &token()).unwrap();
        let second = Generator::new().run(&inputs(), &token()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn input_order_does_not_change_output() {
        let mut reordered = inputs();
        reordered.scenes.push(TextSnapshot::new(
            "res://other.tscn",
            PLAYER_SCENE.replace("Hitbox", "Other"),
        ));
        let forward = Generator::new().run(&reordered, &token()).unwrap();
        reordered.scenes.reverse();
        let backward = Generator::new().run(&reordered, &token()).unwrap();
        assert_eq!(forward.artifacts, backward.artifacts);
    }

    #[test]
    fn unchanged_rerun_recomputes_nothing() {
        let inputs = inputs();
        let mut generator = Generator::new();
        let first = generator.run(&inputs, &token()).unwrap();
        let before = generator.stats();

        let second = generator.run(&inputs, &token()).unwrap();
        let after = generator.stats();

        assert_eq!(first, second);
        assert_eq!(after.manifests.misses, before.manifests.misses);
        assert_eq!(after.scenes.misses, before.scenes.misses);
        assert_eq!(after.autoload_joins.misses, before.autoload_joins.misses);
        assert_eq!(after.connection_joins.misses, before.connection_joins.misses);
    }

    #[test]
    fn editing_one_scene_leaves_other_memos_alone() {
        let mut with_two = inputs();
        with_two.scenes.push(TextSnapshot::new(
            "res://other.tscn",
            PLAYER_SCENE.replace("Hitbox", "Other"),
        ));
        let mut generator = Generator::new();
        generator.run(&with_two, &token()).unwrap();
        let before = generator.stats();

        with_two.scenes[1].text.push('\n');
        generator.run(&with_two, &token()).unwrap();
        let after = generator.stats();

        assert_eq!(after.scenes.misses, before.scenes.misses + 1);
        assert_eq!(after.manifests.misses, before.manifests.misses);
    }

    #[test]
    fn cancelled_pass_produces_nothing_and_next_pass_is_identical() {
        let inputs = inputs();
        let baseline = Generator::new().run(&inputs, &token()).unwrap();

        let counter = GenerationCounter::new();
        let stale = counter.token();
        counter.invalidate();

        let mut generator = Generator::new();
        assert_eq!(generator.run(&inputs, &stale), Err(Cancelled));

        let rerun = generator.run(&inputs, &counter.token()).unwrap();
        assert_eq!(rerun, baseline);
    }

    #[test]
    fn scene_without_connections_contributes_no_listing() {
        let mut no_connections = inputs();
        no_connections.scenes = vec![TextSnapshot::new(
            "res://menu.tscn",
            "[gd_scene]\n\n[node name=\"Menu\" type=\"Control\"]\n",
        )];
        let output = Generator::new().run(&no_connections, &token()).unwrap();
        assert!(
            !output
                .artifacts
                .contains_key("Game.Player_Galgo_ConnectionTscn.g.cs")
        );
        // The class helper still renders from the declaration stream alone.
        assert!(output.artifacts.contains_key("Game.Player_Galgo.g.cs"));
    }

    #[test]
    fn notify_fields_gain_property_wrappers() {
        let mut class = player_class();
        class.members.push(MemberSymbol::Field {
            name: "_health".to_string(),
            ty: "int".to_string(),
            is_static: false,
            attributes: vec![AttributeUse::new(
                names::NOTIFY_ATTR,
                vec![],
                SourceLocation::new("scripts/Player.cs", 7),
            )],
        });
        let mut with_notify = inputs();
        with_notify.symbols = SymbolSnapshot::from_graph(SymbolGraph {
            classes: vec![class, music_class()],
            externals: graph().externals,
        })
        .unwrap();

        let output = Generator::new().run(&with_notify, &token()).unwrap();
        let wrappers = &output.artifacts["Game.Player_GalgoNotify.g.cs"];
        assert!(wrappers.contains("public int Health"));
        assert!(wrappers.contains("HealthChanged?.Invoke(oldValue, value);"));
    }

    #[test]
    fn symbol_change_reflows_into_artifacts() {
        let mut generator = Generator::new();
        let first = generator.run(&inputs(), &token()).unwrap();

        let mut changed = graph();
        changed.classes[0].members.push(MemberSymbol::Delegate {
            name: "DiedEventHandler".to_string(),
            params: vec![],
            attributes: vec![AttributeUse::new(
                names::SIGNAL_ATTR,
                vec![],
                SourceLocation::new("scripts/Player.cs", 9),
            )],
        });
        let mut next = inputs();
        next.symbols = SymbolSnapshot::from_graph(changed).unwrap();

        let second = generator.run(&next, &token()).unwrap();
        assert_ne!(first, second);
        assert!(second.artifacts["Game.Player_Galgo.g.cs"].contains("EmitDied"));
    }

    #[test]
    fn duplicate_accessor_path_is_reported_once_per_pass() {
        let mut class = player_class();
        class.members.push(MemberSymbol::Field {
            name: "Shadow".to_string(),
            ty: "global::Godot.Sprite2D".to_string(),
            is_static: false,
            attributes: vec![AttributeUse::new(
                names::AUTO_GET_ATTR,
                vec![AttrArg::Str("%Sprite".to_string())],
                SourceLocation::new("scripts/Player.cs", 6),
            )],
        });
        let mut conflicting = inputs();
        conflicting.symbols = SymbolSnapshot::from_graph(SymbolGraph {
            classes: vec![class],
            externals: graph().externals,
        })
        .unwrap();

        let mut generator = Generator::new();
        let first = generator.run(&conflicting, &token()).unwrap();
        assert_eq!(first.diagnostics.len(), 1);
        assert_eq!(first.diagnostics[0].code, "GLG0001");
        assert!(!first.artifacts["Game.Player_Galgo.g.cs"].contains("Shadow"));

        let second = generator.run(&conflicting, &token()).unwrap();
        assert_eq!(second.diagnostics.len(), 1);
    }
}
