//! Module argument documents.
//!
//! Arguments arrive as one JSON or YAML mapping holding both connection and
//! module options. Keys starting with `_ansible_` are control keys: only
//! `_ansible_check_mode` is honoured, the rest are ignored.

use crate::config::{self, ConnectionArgs, CONNECTION_KEYS};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use vsr_reconcile::{FailurePolicy, GraphicsParams, HostTarget, TagParams, TagState};
use vsr_vmware::types::{AssignmentPolicy, GraphicsType};

const CONTROL_PREFIX: &str = "_ansible_";
const CHECK_MODE_KEY: &str = "_ansible_check_mode";

/// A parsed argument document, split by concern.
#[derive(Debug, Default)]
pub struct ModuleArgs {
    pub check_mode: bool,
    pub connection: ConnectionArgs,
    pub module: Map<String, Value>,
}

/// Read the argument text from a file, or stdin when `path` is `None`.
pub fn read_args_source(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(p) => std::fs::read_to_string(p).map_err(|e| AppError::io(p, e)),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| AppError::io("<stdin>", e))?;
            Ok(text)
        }
    }
}

/// Parse JSON, falling back to YAML. Empty input is an empty mapping.
pub fn parse_document(text: &str) -> Result<Value, AppError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_str::<Value>(text) {
        Ok(v) => Ok(v),
        Err(_) => serde_yaml::from_str::<Value>(text)
            .map_err(|e| AppError::Params(format!("Module arguments are neither JSON nor YAML: {e}"))),
    }
}

/// Split a document into check mode, connection fields and module fields.
/// `null` values count as unset.
pub fn split_args(doc: Value) -> Result<ModuleArgs, AppError> {
    let Value::Object(map) = doc else {
        return Err(AppError::Params("Module arguments must be a mapping".into()));
    };

    let mut args = ModuleArgs::default();
    let mut connection = Map::new();
    for (key, value) in map {
        if key == CHECK_MODE_KEY {
            args.check_mode = config::bool_word_or_bool(value)
                .map_err(|_| AppError::Params(format!("{CHECK_MODE_KEY} must be a boolean")))?;
        } else if key.starts_with(CONTROL_PREFIX) || value.is_null() {
            continue;
        } else if CONNECTION_KEYS.contains(&key.as_str()) {
            connection.insert(key, value);
        } else {
            args.module.insert(key, value);
        }
    }
    args.connection = serde_json::from_value(Value::Object(connection))
        .map_err(|e| AppError::Params(format!("Invalid connection arguments: {e}")))?;
    Ok(args)
}

fn from_module_map<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(map))
        .map_err(|e| AppError::Params(format!("Invalid module arguments: {e}")))
}

// ── Host graphics ───────────────────────────────────────────────────

fn default_graphic_type() -> GraphicsType {
    GraphicsType::Shared
}

fn default_assignment_policy() -> AssignmentPolicy {
    AssignmentPolicy::Performance
}

fn default_true() -> bool {
    true
}

/// Accept a single host name where a list is expected.
fn one_or_many<'de, D>(d: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(Option::<OneOrMany>::deserialize(d)?.map(|v| match v {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostGraphicsArgs {
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub esxi_hostname: Option<Vec<String>>,
    #[serde(default = "default_graphic_type")]
    pub graphic_type: GraphicsType,
    /// Spelling matches the published module interface.
    #[serde(default = "default_assignment_policy")]
    pub assigment_policy: AssignmentPolicy,
    #[serde(default = "default_true", deserialize_with = "config::bool_word_or_bool")]
    pub restart_xorg: bool,
    #[serde(default)]
    pub on_host_error: FailurePolicy,
}

impl HostGraphicsArgs {
    pub fn into_params(self) -> Result<GraphicsParams, AppError> {
        let cluster = self.cluster_name.filter(|c| !c.trim().is_empty());
        let hosts = self
            .esxi_hostname
            .map(|v| v.into_iter().filter(|h| !h.trim().is_empty()).collect::<Vec<_>>())
            .filter(|v| !v.is_empty());

        let target = match (cluster, hosts) {
            (Some(_), Some(_)) => {
                return Err(AppError::Params(
                    "parameters are mutually exclusive: cluster_name|esxi_hostname".into(),
                ))
            }
            (Some(c), None) => HostTarget::Cluster(c),
            (None, Some(h)) => HostTarget::Hosts(h),
            (None, None) => {
                return Err(AppError::Params(
                    "one of the following is required: cluster_name, esxi_hostname".into(),
                ))
            }
        };

        Ok(GraphicsParams {
            target,
            graphics_type: self.graphic_type,
            assignment_policy: self.assigment_policy,
            restart_xorg: self.restart_xorg,
            on_host_error: self.on_host_error,
        })
    }
}

pub fn host_graphics_params(module: Map<String, Value>) -> Result<GraphicsParams, AppError> {
    from_module_map::<HostGraphicsArgs>(module)?.into_params()
}

// ── Tag ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagArgs {
    pub tag_name: String,
    #[serde(default)]
    pub tag_description: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub state: TagState,
}

impl TagArgs {
    pub fn into_params(self) -> Result<TagParams, AppError> {
        if self.tag_name.trim().is_empty() {
            return Err(AppError::Params("tag_name must not be empty".into()));
        }
        Ok(TagParams {
            tag_name: self.tag_name,
            tag_description: self.tag_description,
            category_id: self.category_id.filter(|c| !c.is_empty()),
            state: self.state,
        })
    }
}

pub fn tag_params(module: Map<String, Value>) -> Result<TagParams, AppError> {
    from_module_map::<TagArgs>(module)?.into_params()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn module(v: Value) -> Map<String, Value> {
        split_args(v).unwrap().module
    }

    #[test]
    fn yaml_and_json_documents() {
        let v = parse_document("tag_name: prod\nstate: absent\n").unwrap();
        assert_eq!(v["state"], "absent");
        let v = parse_document(r#"{"tag_name": "prod"}"#).unwrap();
        assert_eq!(v["tag_name"], "prod");
        assert_eq!(parse_document("  \n").unwrap(), json!({}));
        assert!(parse_document("[unclosed").is_err());
    }

    #[test]
    fn control_and_connection_keys_are_split_off() {
        let args = split_args(json!({
            "hostname": "vc.lab",
            "user": "administrator@vsphere.local",
            "_ansible_check_mode": true,
            "_ansible_verbosity": 3,
            "tag_name": "prod",
            "category_id": null,
        }))
        .unwrap();
        assert!(args.check_mode);
        assert_eq!(args.connection.hostname.as_deref(), Some("vc.lab"));
        assert_eq!(args.connection.username.as_deref(), Some("administrator@vsphere.local"));
        assert_eq!(args.module.len(), 1);
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        assert!(split_args(json!(["a"])).is_err());
        assert!(split_args(json!({"_ansible_check_mode": "maybe"})).is_err());
    }

    #[test]
    fn host_graphics_defaults() {
        let p = host_graphics_params(module(json!({"cluster_name": "gpu"}))).unwrap();
        assert_eq!(p.target, HostTarget::Cluster("gpu".into()));
        assert_eq!(p.graphics_type, GraphicsType::Shared);
        assert_eq!(p.assignment_policy, AssignmentPolicy::Performance);
        assert!(p.restart_xorg);
        assert_eq!(p.on_host_error, FailurePolicy::FailFast);
    }

    #[test]
    fn host_graphics_choices_are_enforced() {
        let err = host_graphics_params(module(json!({"cluster_name": "gpu", "graphic_type": "basic"}))).unwrap_err();
        assert!(err.to_string().contains("unknown variant `basic`"));
        assert!(host_graphics_params(module(json!({"cluster_name": "gpu", "graphic_type": "other"}))).is_err());
        assert!(host_graphics_params(module(json!({"cluster_name": "gpu", "assigment_policy": "fast"}))).is_err());
        assert!(host_graphics_params(module(json!({"cluster_name": "gpu", "bogus": 1}))).is_err());
    }

    #[test]
    fn exactly_one_target_required() {
        let err = host_graphics_params(module(json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "one of the following is required: cluster_name, esxi_hostname");

        let err = host_graphics_params(module(json!({"cluster_name": "gpu", "esxi_hostname": ["a"]}))).unwrap_err();
        assert_eq!(err.to_string(), "parameters are mutually exclusive: cluster_name|esxi_hostname");

        let err = host_graphics_params(module(json!({"esxi_hostname": []}))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn single_host_name_is_accepted() {
        let p = host_graphics_params(module(json!({
            "esxi_hostname": "esxi01.lab",
            "graphic_type": "sharedDirect",
            "assigment_policy": "consolidation",
            "restart_xorg": false,
            "on_host_error": "continue",
        })))
        .unwrap();
        assert_eq!(p.target, HostTarget::Hosts(vec!["esxi01.lab".into()]));
        assert_eq!(p.graphics_type, GraphicsType::SharedDirect);
        assert!(!p.restart_xorg);
        assert_eq!(p.on_host_error, FailurePolicy::Continue);
    }

    #[test]
    fn boolean_words_are_accepted() {
        let doc = parse_document("cluster_name: gpu\nrestart_xorg: no\n").unwrap();
        assert!(!host_graphics_params(module(doc)).unwrap().restart_xorg);
        assert!(!host_graphics_params(module(json!({"cluster_name": "gpu", "restart_xorg": "false"}))).unwrap().restart_xorg);
        assert!(host_graphics_params(module(json!({"cluster_name": "gpu", "restart_xorg": "yes"}))).unwrap().restart_xorg);
        assert!(host_graphics_params(module(json!({"cluster_name": "gpu", "restart_xorg": "later"}))).is_err());

        let args = split_args(parse_document("_ansible_check_mode: yes\nvalidate_certs: off\n").unwrap()).unwrap();
        assert!(args.check_mode);
        assert_eq!(args.connection.validate_certs, Some(false));
    }

    #[test]
    fn tag_params_validation() {
        let p = tag_params(module(json!({"tag_name": "prod"}))).unwrap();
        assert_eq!(p.state, TagState::Present);
        assert_eq!(p.tag_description, "");
        assert_eq!(p.category_id, None);

        assert!(tag_params(module(json!({}))).is_err());
        assert!(tag_params(module(json!({"tag_name": " "}))).is_err());
        assert!(tag_params(module(json!({"tag_name": "x", "state": "gone"}))).is_err());
    }
}
