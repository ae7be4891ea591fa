//! Serialization and deserialization of scenes.
//!
//! A [`SceneDocument`] is the configuration handed to the host on every
//! save: the root frame with its whole subtree, and each element's outgoing
//! connections stored on the element with the target referenced by name.
//! [`SceneFile`] wraps a document with file metadata for save/load to disk.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use canvaskit_core::{DocumentError, ElementId, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::connections::{ConnectionConfig, ConnectionLayer};
use crate::element::{ElementConfig, FRAME_TYPE};
use crate::geometry::Rect;
use crate::tree::ElementTree;

/// Scene document format version
pub const DOCUMENT_VERSION: &str = "1.0";

/// Scene file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Persisted configuration of a whole scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub version: String,
    pub root: ElementConfig,
}

impl SceneDocument {
    /// A document holding an empty root frame.
    pub fn empty() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            root: ElementConfig::frame(),
        }
    }

    /// Number of elements below the root.
    pub fn element_count(&self) -> usize {
        fn count(config: &ElementConfig) -> usize {
            config.elements.iter().map(|c| 1 + count(c)).sum()
        }
        count(&self.root)
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builds the document for `tree` and the live connections in `connections`.
pub fn serialize(tree: &ElementTree, connections: &ConnectionLayer) -> SceneDocument {
    SceneDocument {
        version: DOCUMENT_VERSION.to_string(),
        root: element_config(tree, connections, tree.root()),
    }
}

fn element_config(
    tree: &ElementTree,
    connections: &ConnectionLayer,
    id: ElementId,
) -> ElementConfig {
    let Some(element) = tree.get(id) else {
        return ElementConfig::frame();
    };

    ElementConfig {
        element_type: element.element_type.clone(),
        name: Some(element.name().to_string()),
        placement: element.placement,
        constraint: element.constraint,
        config: element.config.clone(),
        connections: connections.configs_for(tree, id),
        elements: element
            .children()
            .iter()
            .map(|child| element_config(tree, connections, *child))
            .collect(),
    }
}

/// A tree rebuilt from a document.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub tree: ElementTree,
    pub connections: ConnectionLayer,
    /// Recovered problems, such as connections to unknown elements.
    pub warnings: Vec<String>,
}

/// Checks a document before it is loaded.
pub fn validate(document: &SceneDocument) -> std::result::Result<(), DocumentError> {
    let major = document.version.split('.').next().unwrap_or_default();
    let expected = DOCUMENT_VERSION.split('.').next().unwrap_or_default();
    if major != expected {
        return Err(DocumentError::UnsupportedVersion {
            version: document.version.clone(),
        });
    }
    if document.root.element_type != FRAME_TYPE {
        return Err(DocumentError::RootNotFrame {
            found: document.root.element_type.clone(),
        });
    }
    validate_placements(&document.root)
}

fn validate_placements(config: &ElementConfig) -> std::result::Result<(), DocumentError> {
    if let Some(field) = config.placement.invalid_field() {
        return Err(DocumentError::InvalidPlacement {
            name: config.name.clone().unwrap_or_else(|| config.element_type.clone()),
            reason: format!("{} is not a finite number", field),
        });
    }
    config.elements.iter().try_for_each(validate_placements)
}

/// Rebuilds a tree and its connections from `document`.
///
/// Duplicate or missing names are replaced with generated ones that avoid
/// every name the document declares. Connections
/// are resolved after the whole tree exists; a connection whose target name
/// matches no element is dropped with a warning.
pub fn deserialize(
    document: &SceneDocument,
    root_bounds: Rect,
    name_probe_limit: usize,
) -> Result<LoadedScene> {
    validate(document)?;

    let mut tree = ElementTree::with_root_bounds(root_bounds);
    tree.set_name_probe_limit(name_probe_limit);
    let root = tree.root();
    if let Some(root_element) = tree.get_mut(root) {
        root_element.config = document.root.config.clone();
    }

    let mut names = HashMap::new();
    if let Some(name) = &document.root.name {
        names.insert(name.clone(), root);
    }
    let mut declared = HashSet::new();
    collect_names(&document.root.elements, &mut declared);
    let mut outgoing = Vec::new();
    for connection in &document.root.connections {
        outgoing.push((root, connection));
    }
    let mut context = BuildContext {
        declared: &declared,
        names: &mut names,
        outgoing: &mut outgoing,
    };
    build(&mut tree, root, &document.root.elements, &mut context)?;

    let mut connections = ConnectionLayer::new();
    let mut warnings = Vec::new();
    for (source, config) in outgoing {
        let target = match &config.target_name {
            Some(name) => names.get(name).copied(),
            None => Some(root),
        };
        match target {
            Some(target) if target != source => {
                connections.insert(source, target, config.clone());
            }
            Some(_) => warnings.push(format!("Dropped connection of {} to itself", source)),
            None => {
                let message = format!(
                    "Dropped connection to unknown element '{}'",
                    config.target_name.as_deref().unwrap_or_default()
                );
                tracing::warn!("{}", message);
                warnings.push(message);
            }
        }
    }
    connections.update_state(&tree);

    tracing::debug!(
        "Loaded {} element(s), {} connection(s)",
        tree.len(),
        connections.len()
    );
    Ok(LoadedScene {
        tree,
        connections,
        warnings,
    })
}

fn collect_names(configs: &[ElementConfig], declared: &mut HashSet<String>) {
    for config in configs {
        if let Some(name) = config.name.as_ref().filter(|n| !n.is_empty()) {
            declared.insert(name.clone());
        }
        if config.is_frame() {
            collect_names(&config.elements, declared);
        }
    }
}

struct BuildContext<'a, 'b> {
    declared: &'b HashSet<String>,
    names: &'b mut HashMap<String, ElementId>,
    outgoing: &'b mut Vec<(ElementId, &'a ConnectionConfig)>,
}

fn build<'a>(
    tree: &mut ElementTree,
    parent: ElementId,
    configs: &'a [ElementConfig],
    context: &mut BuildContext<'a, '_>,
) -> Result<()> {
    for config in configs {
        let name = match config.name.as_deref() {
            Some(name) if !name.is_empty() && tree.can_rename(name) => name.to_string(),
            _ => tree.next_element_name_excluding(config.is_frame(), context.declared),
        };
        let shallow = ElementConfig {
            element_type: config.element_type.clone(),
            name: Some(name),
            placement: config.placement,
            constraint: config.constraint,
            config: config.config.clone(),
            connections: Vec::new(),
            elements: Vec::new(),
        };
        let id = tree.add_element(parent, &shallow)?;

        if let Some(name) = &config.name {
            context.names.entry(name.clone()).or_insert(id);
        }
        if let Some(actual) = tree.get(id).map(|e| e.name().to_string()) {
            context.names.entry(actual).or_insert(id);
        }
        context
            .outgoing
            .extend(config.connections.iter().map(|c| (id, c)));

        if config.is_frame() {
            build(tree, id, &config.elements, context)?;
        }
    }
    Ok(())
}

/// Complete scene file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub version: String,
    pub metadata: SceneMetadata,
    pub scene: SceneDocument,
}

/// Scene file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

impl SceneFile {
    /// Create a new scene file around `scene`
    pub fn new(name: impl Into<String>, scene: SceneDocument) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: SceneMetadata {
                name: name.into(),
                created: now,
                modified: now,
                description: String::new(),
            },
            scene,
        }
    }

    /// Save scene to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize scene")?;

        std::fs::write(path.as_ref(), json).context("Failed to write scene file")?;

        Ok(())
    }

    /// Load scene from file
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read scene file")?;

        let mut file: SceneFile =
            serde_json::from_str(&content).context("Failed to parse scene file")?;

        file.metadata.modified = Utc::now();

        Ok(file)
    }
}
