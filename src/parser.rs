//! # Terraform Module Parser
//!
//! Turns a directory of `.tf` files into a summary fragment: variables,
//! outputs, provider requirements, sub-module references, managed
//! resources, a short description, and the documentation file contents.
//! The parser knows nothing about version control; it only borrows read
//! access to a checked-out directory.
//!
//! ## Tolerance
//!
//! Real-world modules contain malformed files, half-written blocks, and
//! expressions that cannot be evaluated statically. The parser therefore
//! never fails a whole module for one bad file: each file-level failure is
//! recorded as a [`ParseIssue`] and scanning continues with the next file.
//! Non-literal expressions (references, templates, function calls) degrade
//! to their raw source text instead of erroring.
//!
//! ## Structural normalization
//!
//! Block-oriented grammars can hand back a single scalar attribute either
//! as a bare value or as a one-element sequence wrapping it. Every
//! attribute read in this module goes through [`unwrap_singleton`] so the
//! two shapes are indistinguishable to the rest of the pipeline.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use hcl::expr::{Expression, ObjectKey};
use hcl::{Body, Number};
use log::warn;

use crate::error::Result;
use crate::summary::{
    ManagedResource, ModuleOutput, ModuleVariable, ProviderRequirement, SubModuleReference,
    TfValue,
};

/// Conventional file holding variable definitions.
pub const VARIABLES_FILE: &str = "variables.tf";
/// Conventional file holding output definitions.
pub const OUTPUTS_FILE: &str = "outputs.tf";
/// The module's primary entry file, scanned for a leading description
/// comment.
pub const ENTRY_FILE: &str = "main.tf";

/// Documentation files, tried in order; the first readable one wins.
pub const DOC_FILE_NAMES: &[&str] = &[
    "README.md",
    "README.markdown",
    "README.rst",
    "README.txt",
    "README",
];

/// Description text extracted from documentation is capped at this many
/// characters.
const MAX_DESCRIPTION_LEN: usize = 500;

/// A non-fatal problem encountered while parsing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseIssue {
    pub file: String,
    pub message: String,
}

/// The summary fragment produced from one module directory.
#[derive(Debug, Default)]
pub struct ParsedModule {
    pub description: Option<String>,
    pub variables: Vec<ModuleVariable>,
    pub outputs: Vec<ModuleOutput>,
    pub providers: Vec<ProviderRequirement>,
    pub submodules: Vec<SubModuleReference>,
    pub resources: Vec<ManagedResource>,
    pub readme: Option<String>,
    /// Per-file failures; the caller decides whether to surface them.
    pub issues: Vec<ParseIssue>,
}

/// Parse every top-level `.tf` file in `dir` into a [`ParsedModule`].
///
/// Variables come from [`VARIABLES_FILE`] and outputs from
/// [`OUTPUTS_FILE`]; providers, resources, and sub-module references are
/// collected from every file. Returns `Err` only when the directory
/// itself cannot be read.
pub fn parse_module_directory(dir: &Path) -> Result<ParsedModule> {
    let mut module = ParsedModule::default();
    let mut seen_resources: HashSet<(String, String)> = HashSet::new();

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "tf"))
        .collect();
    files.sort();

    for file in &files {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                warn!("skipping unreadable file {}: {}", file.display(), e);
                module.issues.push(ParseIssue {
                    file: file_name,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let body = match hcl::parse(&content) {
            Ok(body) => body,
            Err(e) => {
                warn!("skipping malformed file {}: {}", file.display(), e);
                module.issues.push(ParseIssue {
                    file: file_name,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if file_name == VARIABLES_FILE {
            collect_variables(&body, &mut module.variables);
        }
        if file_name == OUTPUTS_FILE {
            collect_outputs(&body, &mut module.outputs);
        }
        collect_providers(&body, &mut module.providers);
        collect_submodules(&body, &mut module.submodules);
        collect_resources(&body, &mut module.resources, &mut seen_resources);
    }

    module.readme = read_documentation(dir);
    module.description = leading_comment_description(dir)
        .or_else(|| module.readme.as_deref().and_then(first_prose_paragraph));

    Ok(module)
}

/// Locate and read the module's documentation file, trying
/// [`DOC_FILE_NAMES`] in order.
pub fn read_documentation(dir: &Path) -> Option<String> {
    DOC_FILE_NAMES
        .iter()
        .find_map(|name| fs::read_to_string(dir.join(name)).ok())
}

fn collect_variables(body: &Body, variables: &mut Vec<ModuleVariable>) {
    for block in body.blocks().filter(|b| b.identifier() == "variable") {
        let Some(name) = block.labels().first().map(|label| label.as_str().to_string()) else {
            continue;
        };
        let body = block.body();
        let variable = ModuleVariable::new(
            name,
            attribute_text(body, "type"),
            attribute_text(body, "description"),
            attribute_value(body, "default"),
        );
        upsert_by(variables, |v| v.name.clone(), variable);
    }
}

fn collect_outputs(body: &Body, outputs: &mut Vec<ModuleOutput>) {
    for block in body.blocks().filter(|b| b.identifier() == "output") {
        let Some(name) = block.labels().first().map(|label| label.as_str().to_string()) else {
            continue;
        };
        let body = block.body();
        let output = ModuleOutput {
            name,
            description: attribute_text(body, "description"),
            value: attribute_text(body, "value"),
            sensitive: matches!(attribute_value(body, "sensitive"), Some(TfValue::Bool(true))),
        };
        upsert_by(outputs, |o| o.name.clone(), output);
    }
}

fn collect_providers(body: &Body, providers: &mut Vec<ProviderRequirement>) {
    // terraform { required_providers { name = ... } } entries carry the
    // authoritative source/version information.
    for terraform in body.blocks().filter(|b| b.identifier() == "terraform") {
        for required in terraform
            .body()
            .blocks()
            .filter(|b| b.identifier() == "required_providers")
        {
            for attr in required.body().attributes() {
                let name = attr.key().to_string();
                let requirement = match unwrap_singleton(expression_value(attr.expr())) {
                    // A bare string is a version constraint with no source.
                    TfValue::String(version) => ProviderRequirement {
                        name,
                        source: None,
                        version: Some(version),
                    },
                    // A structured value carries source and version
                    // independently; missing fields stay absent.
                    TfValue::Map(map) => ProviderRequirement {
                        name,
                        source: map.get("source").map(|v| value_text(&unwrap_singleton(v.clone()))),
                        version: map
                            .get("version")
                            .map(|v| value_text(&unwrap_singleton(v.clone()))),
                    },
                    _ => ProviderRequirement {
                        name,
                        source: None,
                        version: None,
                    },
                };
                upsert_by(providers, |p| p.name.clone(), requirement);
            }
        }
    }

    // provider "name" { ... } blocks only register a bare entry when the
    // name has not been seen yet.
    for block in body.blocks().filter(|b| b.identifier() == "provider") {
        let Some(name) = block.labels().first().map(|label| label.as_str().to_string()) else {
            continue;
        };
        if !providers.iter().any(|p| p.name == name) {
            providers.push(ProviderRequirement {
                name,
                source: None,
                version: None,
            });
        }
    }
}

fn collect_submodules(body: &Body, submodules: &mut Vec<SubModuleReference>) {
    for block in body.blocks().filter(|b| b.identifier() == "module") {
        let Some(name) = block.labels().first().map(|label| label.as_str().to_string()) else {
            continue;
        };
        let body = block.body();
        // A module call without a source cannot be resolved; drop it.
        let Some(source) = attribute_text(body, "source") else {
            continue;
        };
        // Call sites are not deduplicated: the same name may legitimately
        // appear in several files.
        submodules.push(SubModuleReference {
            name,
            source,
            version: attribute_text(body, "version"),
        });
    }
}

fn collect_resources(
    body: &Body,
    resources: &mut Vec<ManagedResource>,
    seen: &mut HashSet<(String, String)>,
) {
    for block in body.blocks().filter(|b| b.identifier() == "resource") {
        let labels = block.labels();
        let (Some(r#type), Some(name)) = (
            labels.first().map(|l| l.as_str().to_string()),
            labels.get(1).map(|l| l.as_str().to_string()),
        ) else {
            continue;
        };
        if seen.insert((r#type.clone(), name.clone())) {
            resources.push(ManagedResource {
                r#type,
                name,
                description: None,
            });
        }
    }
}

/// Insert `item`, replacing an existing entry with the same key (last
/// definition wins, mirroring how duplicate blocks shadow each other).
fn upsert_by<T, K: PartialEq>(items: &mut Vec<T>, key: impl Fn(&T) -> K, item: T) {
    let item_key = key(&item);
    if let Some(existing) = items.iter_mut().find(|existing| key(existing) == item_key) {
        *existing = item;
    } else {
        items.push(item);
    }
}

/// Read one attribute from a block body, normalized.
fn attribute_value(body: &Body, key: &str) -> Option<TfValue> {
    body.attributes()
        .find(|attr| attr.key() == key)
        .map(|attr| unwrap_singleton(expression_value(attr.expr())))
}

/// Read one attribute as text (strings stay verbatim, other shapes render
/// to their JSON representation).
fn attribute_text(body: &Body, key: &str) -> Option<String> {
    attribute_value(body, key).map(|value| value_text(&value))
}

/// Unwrap one level of a one-element sequence.
///
/// Applied uniformly to every attribute read, never ad hoc per field.
fn unwrap_singleton(value: TfValue) -> TfValue {
    match value {
        TfValue::List(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

/// Convert an HCL expression to a [`TfValue`]. Literals map structurally;
/// anything that would need evaluation keeps its raw source text.
fn expression_value(expr: &Expression) -> TfValue {
    match expr {
        Expression::Null => TfValue::Null,
        Expression::Bool(b) => TfValue::Bool(*b),
        Expression::Number(n) => TfValue::Number(json_number(n)),
        Expression::String(s) => TfValue::String(s.clone()),
        Expression::Array(items) => TfValue::List(items.iter().map(expression_value).collect()),
        Expression::Object(object) => {
            let mut map = BTreeMap::new();
            for (key, value) in object.iter() {
                map.insert(object_key_text(key), expression_value(value));
            }
            TfValue::Map(map)
        }
        other => TfValue::String(raw_expression(other)),
    }
}

fn object_key_text(key: &ObjectKey) -> String {
    match key {
        ObjectKey::Identifier(ident) => ident.as_str().to_string(),
        ObjectKey::Expression(Expression::String(s)) => s.clone(),
        ObjectKey::Expression(expr) => raw_expression(expr),
        _ => String::new(),
    }
}

fn json_number(n: &Number) -> serde_json::Number {
    match serde_json::to_value(n) {
        Ok(serde_json::Value::Number(number)) => number,
        _ => serde_json::Number::from(0),
    }
}

/// Render an expression back to HCL source text.
fn raw_expression(expr: &Expression) -> String {
    hcl::format::to_string(expr).unwrap_or_default()
}

fn value_text(value: &TfValue) -> String {
    match value {
        TfValue::String(s) => s.clone(),
        TfValue::Bool(b) => b.to_string(),
        TfValue::Number(n) => n.to_string(),
        TfValue::Null => "null".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Extract a description from the leading comment run of the entry file.
///
/// Comment markers (`#`, `//`) are stripped and the lines joined with
/// single spaces. Blank lines are skipped; the first non-comment,
/// non-blank line ends the run.
fn leading_comment_description(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join(ENTRY_FILE)).ok()?;
    let mut parts: Vec<String> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let comment = trimmed
            .strip_prefix("//")
            .or_else(|| trimmed.strip_prefix('#'))
            .map(|rest| rest.trim_start_matches('#').trim());
        match comment {
            Some(text) => {
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
            None => break,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Extract the first prose paragraph from documentation text: everything
/// from the first non-heading, non-blank line up to the next blank line
/// or heading, capped at [`MAX_DESCRIPTION_LEN`] characters.
fn first_prose_paragraph(text: &str) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            if parts.is_empty() {
                continue;
            }
            break;
        }
        parts.push(trimmed.to_string());
    }

    if parts.is_empty() {
        return None;
    }

    let mut paragraph = parts.join(" ");
    if paragraph.chars().count() > MAX_DESCRIPTION_LEN {
        paragraph = paragraph.chars().take(MAX_DESCRIPTION_LEN).collect();
    }
    Some(paragraph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_parse_variables_with_defaults_and_required() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            VARIABLES_FILE,
            r#"
variable "region" {
  type        = string
  description = "AWS region"
}

variable "instance_count" {
  type    = number
  default = 0
}

variable "enable_logging" {
  default = false
}

variable "name_prefix" {
  default = ""
}

variable "tags" {
  type = map(string)
  default = {
    team = "platform"
  }
}
"#,
        );

        let module = parse_module_directory(temp.path()).unwrap();
        assert!(module.issues.is_empty());
        assert_eq!(module.variables.len(), 5);

        let region = &module.variables[0];
        assert_eq!(region.name, "region");
        assert_eq!(region.r#type.as_deref(), Some("string"));
        assert_eq!(region.description.as_deref(), Some("AWS region"));
        assert!(region.required);

        // Falsy defaults still make a variable optional.
        assert!(!module.variables[1].required);
        assert_eq!(
            module.variables[1].default,
            Some(TfValue::Number(0.into()))
        );
        assert!(!module.variables[2].required);
        assert!(!module.variables[3].required);

        match &module.variables[4].default {
            Some(TfValue::Map(map)) => {
                assert_eq!(map.get("team"), Some(&TfValue::String("platform".into())));
            }
            other => panic!("expected map default, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_outputs_with_sensitive_and_value_text() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            OUTPUTS_FILE,
            r#"
output "vpc_id" {
  description = "The VPC id"
  value       = aws_vpc.this.id
}

output "db_password" {
  value     = random_password.db.result
  sensitive = true
}
"#,
        );

        let module = parse_module_directory(temp.path()).unwrap();
        assert_eq!(module.outputs.len(), 2);
        assert_eq!(module.outputs[0].name, "vpc_id");
        assert_eq!(module.outputs[0].value.as_deref(), Some("aws_vpc.this.id"));
        assert!(!module.outputs[0].sensitive);
        assert!(module.outputs[1].sensitive);
    }

    #[test]
    fn test_required_providers_bare_string_and_structured() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "versions.tf",
            r#"
terraform {
  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }
    random = ">= 3.0"
  }
}
"#,
        );

        let module = parse_module_directory(temp.path()).unwrap();
        assert_eq!(module.providers.len(), 2);

        let aws = module.providers.iter().find(|p| p.name == "aws").unwrap();
        assert_eq!(aws.source.as_deref(), Some("hashicorp/aws"));
        assert_eq!(aws.version.as_deref(), Some("~> 5.0"));

        let random = module.providers.iter().find(|p| p.name == "random").unwrap();
        assert!(random.source.is_none());
        assert_eq!(random.version.as_deref(), Some(">= 3.0"));
    }

    #[test]
    fn test_provider_block_registers_bare_entry_without_duplicating() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ENTRY_FILE,
            r#"
terraform {
  required_providers {
    aws = {
      source = "hashicorp/aws"
    }
  }
}

provider "aws" {
  region = var.region
}

provider "null" {}
"#,
        );

        let module = parse_module_directory(temp.path()).unwrap();
        assert_eq!(module.providers.len(), 2);

        // The requirement entry wins; the provider block does not reset it.
        let aws = module.providers.iter().find(|p| p.name == "aws").unwrap();
        assert_eq!(aws.source.as_deref(), Some("hashicorp/aws"));

        let null = module.providers.iter().find(|p| p.name == "null").unwrap();
        assert!(null.source.is_none());
        assert!(null.version.is_none());
    }

    #[test]
    fn test_resources_dedup_and_submodules_not_dedup() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ENTRY_FILE,
            r#"
resource "aws_subnet" "this" {
  vpc_id = aws_vpc.this.id
}

resource "aws_vpc" "this" {
  cidr_block = var.cidr
}

module "endpoints" {
  source  = "./modules/endpoints"
  version = "1.0.0"
}
"#,
        );
        write(
            temp.path(),
            "extra.tf",
            r#"
resource "aws_vpc" "this" {
  cidr_block = var.other_cidr
}

module "endpoints" {
  source = "registry.example.com/org/endpoints/aws"
}

module "no_source" {
  count = 2
}
"#,
        );

        let module = parse_module_directory(temp.path()).unwrap();

        // (type, name) pairs are deduplicated across files.
        assert_eq!(module.resources.len(), 2);
        // Call sites sharing a name in different files are preserved, and
        // the entry without a source is dropped.
        assert_eq!(module.submodules.len(), 2);
        assert!(module.submodules.iter().all(|m| m.name == "endpoints"));
    }

    #[test]
    fn test_malformed_file_does_not_poison_directory() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            VARIABLES_FILE,
            r#"
variable "region" {
  type = string
}
"#,
        );
        write(temp.path(), "broken.tf", "resource \"aws_vpc\" {{{ not hcl");
        write(
            temp.path(),
            ENTRY_FILE,
            r#"
resource "aws_vpc" "this" {
  cidr_block = var.cidr
}
"#,
        );

        let module = parse_module_directory(temp.path()).unwrap();
        assert_eq!(module.variables.len(), 1);
        assert_eq!(module.resources.len(), 1);
        assert_eq!(module.issues.len(), 1);
        assert_eq!(module.issues[0].file, "broken.tf");
    }

    #[test]
    fn test_singleton_sequence_unwrapping_is_uniform() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            VARIABLES_FILE,
            r#"
variable "wrapped" {
  default = ["only"]
}

variable "not_wrapped" {
  default = ["a", "b"]
}
"#,
        );

        let module = parse_module_directory(temp.path()).unwrap();
        // One level of a one-element sequence is unwrapped...
        assert_eq!(
            module.variables[0].default,
            Some(TfValue::String("only".into()))
        );
        // ...but genuine lists are left alone.
        assert_eq!(
            module.variables[1].default,
            Some(TfValue::List(vec![
                TfValue::String("a".into()),
                TfValue::String("b".into())
            ]))
        );
    }

    #[test]
    fn test_description_from_leading_comments() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ENTRY_FILE,
            r#"# VPC module
# Creates a VPC with public and private subnets.

resource "aws_vpc" "this" {
  cidr_block = var.cidr
}

# This trailing comment is not part of the description.
"#,
        );
        write(temp.path(), "README.md", "# Title\n\nReadme prose here.\n");

        let module = parse_module_directory(temp.path()).unwrap();
        assert_eq!(
            module.description.as_deref(),
            Some("VPC module Creates a VPC with public and private subnets.")
        );
    }

    #[test]
    fn test_description_falls_back_to_readme_paragraph() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ENTRY_FILE,
            "resource \"aws_vpc\" \"this\" {\n  cidr_block = var.cidr\n}\n",
        );
        write(
            temp.path(),
            "README.md",
            "# terraform-aws-vpc\n\nProvisions a VPC\nwith sensible defaults.\n\nMore detail below.\n",
        );

        let module = parse_module_directory(temp.path()).unwrap();
        assert_eq!(
            module.description.as_deref(),
            Some("Provisions a VPC with sensible defaults.")
        );
        assert!(module.readme.as_deref().unwrap().contains("More detail"));
    }

    #[test]
    fn test_readme_description_is_truncated() {
        let temp = TempDir::new().unwrap();
        let long_line = "word ".repeat(200);
        write(temp.path(), "README.md", &format!("{}\n", long_line));

        let module = parse_module_directory(temp.path()).unwrap();
        let description = module.description.unwrap();
        assert_eq!(description.chars().count(), 500);
    }

    #[test]
    fn test_documentation_lookup_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "README", "plain readme");
        write(temp.path(), "README.md", "markdown readme");

        let readme = read_documentation(temp.path()).unwrap();
        assert_eq!(readme, "markdown readme");
    }

    #[test]
    fn test_empty_directory_yields_empty_module() {
        let temp = TempDir::new().unwrap();
        let module = parse_module_directory(temp.path()).unwrap();
        assert!(module.variables.is_empty());
        assert!(module.outputs.is_empty());
        assert!(module.providers.is_empty());
        assert!(module.description.is_none());
        assert!(module.readme.is_none());
        assert!(module.issues.is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("does-not-exist");
        assert!(parse_module_directory(&missing).is_err());
    }
}
