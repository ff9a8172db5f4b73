//! Disk front-end: snapshot a project directory, run one generation pass,
//! write the artifacts back out. All I/O happens here; the computation in
//! [`crate::Generator`] only ever sees immutable snapshots.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use log::{info, warn};
use walkdir::WalkDir;

use galgo_graph::GenerationCounter;

use crate::{GenerationOutput, Generator, GeneratorError, GeneratorInputs, SymbolSnapshot, TextSnapshot};

const MANIFEST_FILE_NAME: &str = "project.godot";
const SCENE_EXTENSION: &str = "tscn";

/// Snapshots every generation input under `project_root`. A missing root
/// is fatal; an unreadable individual file is logged and skipped.
pub fn load_inputs(
    project_root: &Path,
    symbols: Option<&Path>,
) -> Result<GeneratorInputs, GeneratorError> {
    if !project_root.is_dir() {
        return Err(GeneratorError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("project root {} is not a directory", project_root.display()),
        )));
    }

    let mut manifests = Vec::new();
    let mut scenes = Vec::new();
    for entry in WalkDir::new(project_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let is_manifest = entry.file_name() == MANIFEST_FILE_NAME;
        let is_scene = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == SCENE_EXTENSION);
        if !is_manifest && !is_scene {
            continue;
        }

        let text = match fs::read_to_string(entry.path()) {
            Ok(text) => text,
            Err(err) => {
                warn!("skipping unreadable file {}: {err}", entry.path().display());
                continue;
            }
        };
        let path = resource_path(project_root, entry.path());
        if is_manifest {
            manifests.push(TextSnapshot::new(path, text));
        } else {
            scenes.push(TextSnapshot::new(path, text));
        }
    }

    let symbols = match symbols {
        Some(path) => SymbolSnapshot::from_json(&fs::read_to_string(path)?)?,
        None => SymbolSnapshot::empty(),
    };

    info!(
        "snapshotted {} manifest(s) and {} scene(s)",
        manifests.len(),
        scenes.len()
    );
    Ok(GeneratorInputs {
        manifests,
        scenes,
        symbols,
    })
}

/// Writes each artifact under `out_dir`, creating it as needed. Hint names
/// are flat file names, so no nested directories appear.
pub fn write_artifacts(
    out_dir: &Path,
    artifacts: &BTreeMap<String, String>,
) -> Result<(), GeneratorError> {
    fs::create_dir_all(out_dir)?;
    for (hint_name, source) in artifacts {
        fs::write(out_dir.join(hint_name), source)?;
    }
    Ok(())
}

/// One full load, generate, write cycle over a project directory.
pub fn generate_project(
    project_root: &Path,
    symbols: Option<&Path>,
    out_dir: &Path,
) -> Result<GenerationOutput, GeneratorError> {
    let inputs = load_inputs(project_root, symbols)?;
    let output = Generator::new().run(&inputs, &GenerationCounter::new().token())?;
    write_artifacts(out_dir, &output.artifacts)?;
    info!("wrote {} artifact(s) to {}", output.artifacts.len(), out_dir.display());
    Ok(output)
}

/// Renders a file's path the way scene resources reference it: relative to
/// the project root, forward slashes, behind the `res://` scheme.
fn resource_path(project_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(project_root).unwrap_or(path);
    let mut rendered = String::from("res://");
    for (i, component) in relative.components().enumerate() {
        if i > 0 {
            rendered.push('/');
        }
        rendered.push_str(&component.as_os_str().to_string_lossy());
    }
    rendered
}
