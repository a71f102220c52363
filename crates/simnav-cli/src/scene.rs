//! Scene snapshot files.
//!
//! Either a bare JSON array of scene nodes or an object naming the scene:
//!
//! ```json
//! { "name": "skydio_x2/scene.xml", "nodes": [ ... ] }
//! ```

use anyhow::Context;
use serde::Deserialize;
use simnav_core::SceneNode;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct SceneFile {
    pub name: Option<String>,
    pub nodes: Vec<SceneNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SceneDocument {
    Nodes(Vec<SceneNode>),
    Named {
        #[serde(default)]
        name: Option<String>,
        nodes: Vec<SceneNode>,
    },
}

impl SceneFile {
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let doc: SceneDocument =
            serde_json::from_str(text).context("scene must be a node array or {name, nodes}")?;
        Ok(match doc {
            SceneDocument::Nodes(nodes) => Self { name: None, nodes },
            SceneDocument::Named { name, nodes } => Self { name, nodes },
        })
    }
}

pub fn load_scene(path: impl AsRef<Path>) -> anyhow::Result<SceneFile> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scene {}", path.display()))?;
    SceneFile::from_json_str(&text).with_context(|| format!("invalid scene {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: &str = r#"{"name":"box","bounds":{"min":{"x":0,"y":0,"z":0},"max":{"x":1,"y":1,"z":1}}}"#;

    #[test]
    fn test_bare_array() {
        let scene = SceneFile::from_json_str(&format!("[{BOX}]")).unwrap();
        assert!(scene.name.is_none());
        assert_eq!(scene.nodes.len(), 1);
    }

    #[test]
    fn test_named_scene() {
        let text = format!(r#"{{"name":"skydio_x2/scene.xml","nodes":[{BOX},{BOX}]}}"#);
        let scene = SceneFile::from_json_str(&text).unwrap();
        assert_eq!(scene.name.as_deref(), Some("skydio_x2/scene.xml"));
        assert_eq!(scene.nodes.len(), 2);
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(SceneFile::from_json_str("42").is_err());
        assert!(SceneFile::from_json_str(r#"{"name":"x"}"#).is_err());
    }
}
