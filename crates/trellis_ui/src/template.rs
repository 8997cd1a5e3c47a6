//! Template loading and id scoping.
//!
//! A template is a named node list supplied by a host loader. When a
//! template node is generated its template is compiled, every id and
//! reference in it is scoped under the including node's id, and the result
//! is spliced in as the including node's children. The same template can
//! therefore be included many times without id clashes.

use std::path::PathBuf;

use crate::error::{UiError, UiResult};
use crate::source::{self, Blueprint, NodeRecord};

/// Host-supplied template loader.
pub type TemplateLoader = Box<dyn FnMut(&str) -> UiResult<Vec<NodeRecord>>>;

/// Loader reading `<root>/<name>.toml`, falling back to `<root>/<name>.json`.
#[must_use]
pub fn directory_loader(root: impl Into<PathBuf>) -> TemplateLoader {
    let root = root.into();
    Box::new(move |name: &str| {
        let toml_path = root.join(format!("{name}.toml"));
        if toml_path.is_file() {
            return source::read_file(toml_path);
        }
        source::read_file(root.join(format!("{name}.json")))
    })
}

/// Loader plus the joiner used for scoping.
pub(crate) struct Templates {
    loader: Option<TemplateLoader>,
    separator: String,
}

impl Templates {
    pub(crate) fn new(separator: impl Into<String>) -> Self {
        Self {
            loader: None,
            separator: separator.into(),
        }
    }

    pub(crate) fn set_loader(&mut self, loader: TemplateLoader) {
        self.loader = Some(loader);
    }

    /// Loads `name` and scopes it under `including_id`.
    pub(crate) fn load(&mut self, name: &str, including_id: &str) -> UiResult<Vec<Blueprint>> {
        let loader = self.loader.as_mut().ok_or(UiError::NoTemplateLoader)?;
        let records = loader(name).map_err(|err| match err {
            UiError::Template { .. } => err,
            other => UiError::Template {
                name: name.to_string(),
                reason: other.to_string(),
            },
        })?;
        let blueprints = source::compile_all(&records)?;

        tracing::debug!(template = name, into = including_id, nodes = blueprints.len(), "splicing template");
        Ok(blueprints
            .into_iter()
            .map(|bp| bp.scoped(including_id, &self.separator))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_template() -> Vec<NodeRecord> {
        let mut label = NodeRecord::new("label", "basic");
        label.width = "50%".to_string();
        let mut value = NodeRecord::new("value", "basic");
        value.x = "after label".to_string();
        value.font_size = "80% of label".to_string();
        vec![label, value]
    }

    #[test]
    fn test_load_scopes_ids_and_references() {
        let mut templates = Templates::new("__");
        templates.set_loader(Box::new(|name: &str| {
            assert_eq!(name, "row");
            Ok(row_template())
        }));

        let spliced = templates.load("row", "stats").unwrap();
        assert_eq!(spliced[0].id, "stats__label");
        assert_eq!(spliced[1].id, "stats__value");
        assert_eq!(spliced[1].exprs.x.as_ref().unwrap().to_string(), "after stats__label");
        assert_eq!(spliced[1].font_size.as_ref().unwrap().to_string(), "80% of stats__label");
        assert!(spliced[0].font_size.is_none());
    }

    #[test]
    fn test_missing_loader() {
        let mut templates = Templates::new("__");
        assert!(matches!(templates.load("row", "x"), Err(UiError::NoTemplateLoader)));
    }

    #[test]
    fn test_loader_errors_are_wrapped() {
        let mut templates = Templates::new("::");
        templates.set_loader(Box::new(|_: &str| Err(UiError::NoTemplateLoader)));

        let err = templates.load("row", "x").unwrap_err();
        assert!(matches!(err, UiError::Template { ref name, .. } if name == "row"));
    }

    #[test]
    fn test_directory_loader_missing_file() {
        let mut loader = directory_loader("/definitely/not/a/dir");
        assert!(matches!(loader("row"), Err(UiError::Io(_))));
    }
}
