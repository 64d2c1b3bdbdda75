//! Built-in JSDoc Extractor
//!
//! Turns `/** ... */` blocks into jsdoc-style template data (one doclet per
//! documented declaration) without an external toolchain. Each block documents
//! the declaration, assignment or object property that directly follows it.

use crate::domain::ast::{children, first_child, has_token, key_name, text, unparen, FUNCTION_DECLARATIONS};
use crate::domain::error::{line_col, IntrospectError};
use crate::domain::exports::MemberPath;
use crate::domain::navigate::is_function;
use crate::domain::parser::build_tree;
use crate::infrastructure::fs_reader::FsSourceReader;
use crate::ports::{DocExtractor, SourceReader};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tree_sitter::Node;

pub struct JsDocExtractor {
    reader: Box<dyn SourceReader>,
}

impl JsDocExtractor {
    pub fn new(reader: Box<dyn SourceReader>) -> Self {
        Self { reader }
    }
}

impl Default for JsDocExtractor {
    fn default() -> Self {
        Self::new(Box::new(FsSourceReader))
    }
}

impl DocExtractor for JsDocExtractor {
    fn extract(&self, paths: &[PathBuf]) -> Result<Value, IntrospectError> {
        let mut doclets = Vec::new();
        for path in paths {
            let text = self
                .reader
                .read(path)
                .map_err(|e| IntrospectError::DocExtraction(e.to_string()))?;
            doclets.extend(doclets_for_source(path, &text)?);
        }
        for (order, doclet) in doclets.iter_mut().enumerate() {
            if let Value::Object(map) = doclet {
                map.insert("order".into(), json!(order));
            }
        }
        Ok(Value::Array(doclets))
    }
}

/// Doclets for one source text.
pub fn doclets_for_source(path: &Path, text: &str) -> Result<Vec<Value>, IntrospectError> {
    let tree = build_tree(text).map_err(|e| IntrospectError::DocExtraction(format!("{}: {}", path.display(), e)))?;

    let mut targets = collect_targets(tree.root(), text);
    targets.sort_by_key(|t| t.start);

    let mut doclets = Vec::new();
    for comment in tree.comments().iter().filter(|c| c.is_doc_block()) {
        let block = DocBlock::parse(&comment.text);
        let target = find_target(&targets, comment.span.end, text);
        if let Some(doclet) = build_doclet(path, text, &block, target, comment.span.end) {
            doclets.push(doclet);
        }
    }
    Ok(doclets)
}

// ═══════════════════════════════════════════════════════════════════════════
// Documentable targets
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
struct DocTarget {
    start: usize,
    name: String,
    kind: &'static str,
    param_names: Vec<String>,
    is_async: bool,
}

fn kind_of_value(expr: Node<'_>) -> &'static str {
    let expr = unparen(expr);
    match expr.kind() {
        "arrow_function" => "function",
        "class" => "class",
        _ if is_function(expr) => "function",
        _ => "member",
    }
}

fn param_names(func: Node<'_>, source: &str) -> Vec<String> {
    if let Some(single) = func.child_by_field_name("parameter") {
        return vec![text(single, source).to_string()];
    }
    let Some(params) = func.child_by_field_name("parameters") else {
        return Vec::new();
    };
    children(params)
        .into_iter()
        .filter_map(|p| match p.kind() {
            "identifier" => Some(text(p, source).to_string()),
            "assignment_pattern" => p
                .child_by_field_name("left")
                .filter(|l| l.kind() == "identifier")
                .map(|l| text(l, source).to_string()),
            "rest_pattern" => first_child(p)
                .filter(|a| a.kind() == "identifier")
                .map(|a| format!("...{}", text(a, source))),
            _ => None,
        })
        .collect()
}

fn value_signature(expr: Node<'_>, source: &str) -> (Vec<String>, bool) {
    let expr = unparen(expr);
    if expr.kind() == "arrow_function" || is_function(expr) {
        (param_names(expr, source), has_token(expr, "async"))
    } else {
        (Vec::new(), false)
    }
}

/// Every documentable declaration, assignment, class member and object property.
///
/// `lead` on a stack entry is where a leading doc block must end up against,
/// e.g. the `export` keyword in front of a declaration.
fn collect_targets(root: Node<'_>, source: &str) -> Vec<DocTarget> {
    let mut targets = Vec::new();
    let mut push = |start: usize, name: String, kind: &'static str, (param_names, is_async): (Vec<String>, bool)| {
        targets.push(DocTarget { start, name, kind, param_names, is_async });
    };
    let mut stack: Vec<(Node<'_>, &'static str, Option<usize>)> = vec![(root, "", None)];

    while let Some((node, parent_kind, lead)) = stack.pop() {
        let start = lead.unwrap_or_else(|| node.start_byte());
        let mut declaration_lead = None;
        match node.kind() {
            kind if FUNCTION_DECLARATIONS.contains(&kind) => {
                let name = node.child_by_field_name("name").map_or("default", |n| text(n, source));
                push(start, name.to_string(), "function", (param_names(node, source), has_token(node, "async")));
            }
            "class_declaration" => {
                let name = node.child_by_field_name("name").map_or("", |n| text(n, source));
                push(start, name.to_string(), "class", (Vec::new(), false));
            }
            "lexical_declaration" | "variable_declaration" => {
                let is_const = node.child_by_field_name("kind").is_some_and(|k| text(k, source) == "const");
                let declarators = children(node).into_iter().filter(|d| d.kind() == "variable_declarator");
                for (i, declarator) in declarators.enumerate() {
                    let Some(id) = declarator.child_by_field_name("name").filter(|n| n.kind() == "identifier") else {
                        continue;
                    };
                    let at = if i == 0 { start } else { declarator.start_byte() };
                    let value = declarator.child_by_field_name("value");
                    let (kind, signature) = match value {
                        Some(value) if kind_of_value(value) != "member" => (kind_of_value(value), value_signature(value, source)),
                        _ if is_const => ("constant", (Vec::new(), false)),
                        _ => ("member", (Vec::new(), false)),
                    };
                    push(at, text(id, source).to_string(), kind, signature);
                }
            }
            "expression_statement" => {
                let assignment = first_child(node).map(unparen).filter(|e| e.kind() == "assignment_expression");
                if let Some(assignment) = assignment {
                    let path = assignment.child_by_field_name("left").and_then(|l| MemberPath::from_node(l, source));
                    if let (Some(path), Some(right)) = (path, assignment.child_by_field_name("right")) {
                        let name = path.segments().last().cloned().unwrap_or_default();
                        push(start, name, kind_of_value(right), value_signature(right, source));
                    }
                }
            }
            "export_statement" => {
                declaration_lead = node.child_by_field_name("declaration").map(|d| (d.id(), start));
                if has_token(node, "default") {
                    if let Some(value) = node.child_by_field_name("value") {
                        push(start, "default".to_string(), kind_of_value(value), value_signature(value, source));
                    }
                }
            }
            "method_definition" => {
                if let Some(name) = node.child_by_field_name("name").and_then(|k| key_name(k, source)) {
                    let kind = if parent_kind == "class_body" && name == "constructor" { "constructor" } else { "function" };
                    push(start, name, kind, (param_names(node, source), has_token(node, "async")));
                }
            }
            "field_definition" => {
                if let Some(name) = node.child_by_field_name("property").and_then(|k| key_name(k, source)) {
                    match node.child_by_field_name("value") {
                        Some(value) => push(start, name, kind_of_value(value), value_signature(value, source)),
                        None => push(start, name, "member", (Vec::new(), false)),
                    }
                }
            }
            "pair" if parent_kind == "object" => {
                let key = node.child_by_field_name("key").and_then(|k| key_name(k, source));
                if let (Some(name), Some(value)) = (key, node.child_by_field_name("value")) {
                    push(start, name, kind_of_value(value), value_signature(value, source));
                }
            }
            "shorthand_property_identifier" => {
                push(start, text(node, source).to_string(), "member", (Vec::new(), false));
            }
            _ => {}
        }

        let kind = node.kind();
        let kids = children(node);
        stack.extend(kids.into_iter().rev().map(|kid| {
            let lead = declaration_lead.filter(|(id, _)| *id == kid.id()).map(|(_, at)| at);
            (kid, kind, lead)
        }));
    }
    targets
}

/// First target starting after the comment with only whitespace in between.
fn find_target<'t>(targets: &'t [DocTarget], comment_end: usize, text: &str) -> Option<&'t DocTarget> {
    let idx = targets.partition_point(|t| t.start < comment_end);
    let target = targets.get(idx)?;
    let gap = text.get(comment_end..target.start)?;
    gap.trim().is_empty().then_some(target)
}

// ═══════════════════════════════════════════════════════════════════════════
// Comment parsing
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, PartialEq)]
struct DocBlock {
    description: String,
    tags: Vec<(String, String)>,
}

impl DocBlock {
    /// `text` is the comment body between `/*` and `*/`.
    fn parse(text: &str) -> Self {
        let body = text.strip_prefix('*').unwrap_or(text);
        let mut description: Vec<&str> = Vec::new();
        let mut tags: Vec<(String, Vec<&str>)> = Vec::new();
        for raw in body.lines() {
            let trimmed = raw.trim_start();
            let line = match trimmed.strip_prefix('*') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => trimmed,
            }
            .trim_end();
            if let Some(rest) = line.trim_start().strip_prefix('@') {
                let (title, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                tags.push((title.to_string(), vec![value.trim()]));
            } else if let Some((_, lines)) = tags.last_mut() {
                lines.push(line);
            } else {
                description.push(line);
            }
        }
        DocBlock {
            description: description.join("\n").trim().to_string(),
            tags: tags.into_iter().map(|(t, lines)| (t, lines.join("\n").trim().to_string())).collect(),
        }
    }

    fn tag(&self, title: &str) -> Option<&str> {
        self.tags.iter().find(|(t, _)| t == title).map(|(_, v)| v.as_str())
    }
}

/// Split a leading `{Type}` off a tag value.
fn split_type(value: &str) -> (Option<Value>, &str) {
    if !value.starts_with('{') {
        return (None, value);
    }
    let mut depth = 0usize;
    for (i, c) in value.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let inner = &value[1..i];
                    let names: Vec<String> = inner
                        .trim_matches(|c| c == '(' || c == ')')
                        .split('|')
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty())
                        .collect();
                    return (Some(json!({ "names": names })), value[i + 1..].trim_start());
                }
            }
            _ => {}
        }
    }
    (None, value)
}

fn strip_dash(description: &str) -> &str {
    let description = description.trim();
    description.strip_prefix("- ").unwrap_or(description).trim()
}

/// `@param {T} [name=default] - description`
fn parse_param(value: &str) -> Value {
    let (ty, rest) = split_type(value);
    let mut param = Map::new();
    if let Some(ty) = ty {
        param.insert("type".into(), ty);
    }
    let rest = rest.trim_start();
    let (name_part, description) = if let Some(inner) = rest.strip_prefix('[') {
        let close = inner.find(']').unwrap_or(inner.len());
        let (name, default) = match inner[..close].split_once('=') {
            Some((name, default)) => (name.trim(), Some(default.trim())),
            None => (inner[..close].trim(), None),
        };
        param.insert("optional".into(), json!(true));
        if let Some(default) = default {
            param.insert("defaultvalue".into(), json!(default));
        }
        (name, inner.get(close + 1..).unwrap_or(""))
    } else {
        rest.split_once(char::is_whitespace).unwrap_or((rest, ""))
    };
    let description = strip_dash(description);
    if !description.is_empty() {
        param.insert("description".into(), json!(description));
    }
    param.insert("name".into(), json!(name_part));
    Value::Object(param)
}

/// `@returns {T} description`
fn parse_typed(value: &str) -> Value {
    let (ty, rest) = split_type(value);
    let mut out = Map::new();
    if let Some(ty) = ty {
        out.insert("type".into(), ty);
    }
    let description = strip_dash(rest);
    if !description.is_empty() {
        out.insert("description".into(), json!(description));
    }
    Value::Object(out)
}

fn first_word(value: &str) -> Option<&str> {
    value.split_whitespace().next()
}

fn build_doclet(path: &Path, text: &str, block: &DocBlock, target: Option<&DocTarget>, comment_end: usize) -> Option<Value> {
    let mut name = target.map(|t| t.name.clone());
    let mut kind = target.map(|t| t.kind.to_string());
    let mut description = block.description.clone();
    let mut params = Vec::new();
    let mut returns = Vec::new();
    let mut examples = Vec::new();
    let mut custom = Vec::new();
    let mut extra = Map::new();

    for (title, value) in &block.tags {
        match title.as_str() {
            "param" | "arg" | "argument" => params.push(parse_param(value)),
            "returns" | "return" => returns.push(parse_typed(value)),
            "example" => examples.push(json!(value)),
            "description" | "desc" => description = value.clone(),
            "name" => name = first_word(value).map(str::to_string),
            "kind" => kind = first_word(value).map(str::to_string),
            "function" | "func" | "method" => {
                kind = Some("function".into());
                if let Some(n) = first_word(value) {
                    name = Some(n.to_string());
                }
            }
            "module" => {
                kind = Some("module".into());
                name = first_word(value).map(str::to_string).or(name);
            }
            "file" | "fileoverview" | "overview" => {
                kind = Some("file".into());
                if !value.is_empty() {
                    description = value.clone();
                }
            }
            "typedef" => {
                let (ty, rest) = split_type(value);
                kind = Some("typedef".into());
                name = first_word(rest).map(str::to_string).or(name);
                if let Some(ty) = ty {
                    extra.insert("type".into(), ty);
                }
            }
            "type" => {
                if let (Some(ty), _) = split_type(value) {
                    extra.insert("type".into(), ty);
                }
            }
            "constant" | "const" => kind = Some("constant".into()),
            "class" | "constructor" => kind = Some("class".into()),
            "async" => {
                extra.insert("async".into(), json!(true));
            }
            "deprecated" => {
                extra.insert("deprecated".into(), if value.is_empty() { json!(true) } else { json!(value) });
            }
            "since" | "version" | "author" => {
                extra.insert(title.clone(), json!(value));
            }
            "throws" | "exception" => {
                let exceptions = extra.entry("exceptions").or_insert_with(|| json!([]));
                if let Value::Array(list) = exceptions {
                    list.push(parse_typed(value));
                }
            }
            "property" | "prop" => {
                let properties = extra.entry("properties").or_insert_with(|| json!([]));
                if let Value::Array(list) = properties {
                    list.push(parse_param(value));
                }
            }
            _ => custom.push(json!({ "tag": title, "value": value })),
        }
    }

    // a block documents nothing unless it follows code or names itself
    let name = name?;
    let kind = kind.unwrap_or_else(|| "member".into());

    let lineno_offset = target.map_or(comment_end, |t| t.start);
    let (lineno, columnno) = line_col(text, lineno_offset);
    let mut code = Map::new();
    code.insert("name".into(), json!(name));
    if let Some(target) = target {
        code.insert("paramnames".into(), json!(target.param_names));
        if target.is_async {
            extra.entry("async").or_insert(json!(true));
        }
    }
    let meta = json!({
        "lineno": lineno,
        "columnno": columnno,
        "filename": path.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default(),
        "path": path.parent().map(|p| p.display().to_string()).unwrap_or_default(),
        "code": Value::Object(code),
    });

    let mut doclet = Map::new();
    doclet.insert("id".into(), json!(name));
    doclet.insert("longname".into(), json!(name));
    doclet.insert("name".into(), json!(name));
    doclet.insert("kind".into(), json!(kind));
    if !description.is_empty() {
        doclet.insert("description".into(), json!(description));
    }
    if !params.is_empty() {
        doclet.insert("params".into(), Value::Array(params));
    }
    if !returns.is_empty() {
        doclet.insert("returns".into(), Value::Array(returns));
    }
    if !examples.is_empty() {
        doclet.insert("examples".into(), Value::Array(examples));
    }
    if !custom.is_empty() {
        doclet.insert("customTags".into(), Value::Array(custom));
    }
    doclet.extend(extra);
    doclet.insert("meta".into(), meta);
    Some(Value::Object(doclet))
}
