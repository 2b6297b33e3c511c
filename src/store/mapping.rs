//! Conversions between domain enums/collections and their SQLite column
//! representations.

use crate::domain::error::{Error, Result};
use crate::domain::types::{BindingLevel, ImportKind, SourceType, UsageKind};

pub fn import_kind_to_str(kind: ImportKind) -> &'static str {
    match kind {
        ImportKind::Direct => "direct",
        ImportKind::FromModule => "from_module",
    }
}

pub fn import_kind_from_str(s: &str) -> Result<ImportKind> {
    match s {
        "direct" => Ok(ImportKind::Direct),
        "from_module" => Ok(ImportKind::FromModule),
        other => Err(Error::internal(format!("unknown import kind '{other}' in store"))),
    }
}

pub fn usage_kind_to_str(kind: UsageKind) -> &'static str {
    match kind {
        UsageKind::MethodCall => "method_call",
        UsageKind::AttributeAccess => "attribute_access",
        UsageKind::FunctionCall => "function_call",
    }
}

pub fn usage_kind_from_str(s: &str) -> Result<UsageKind> {
    match s {
        "method_call" => Ok(UsageKind::MethodCall),
        "attribute_access" => Ok(UsageKind::AttributeAccess),
        "function_call" => Ok(UsageKind::FunctionCall),
        other => Err(Error::internal(format!("unknown usage kind '{other}' in store"))),
    }
}

pub fn source_type_to_str(source_type: SourceType) -> &'static str {
    match source_type {
        SourceType::FileDocstring => "file_docstring",
        SourceType::ClassDocstring => "class_docstring",
        SourceType::MethodDocstring => "method_docstring",
        SourceType::FunctionDocstring => "function_docstring",
        SourceType::Comment => "comment",
        SourceType::MethodComment => "method_comment",
        SourceType::ClassComment => "class_comment",
        SourceType::FunctionComment => "function_comment",
    }
}

pub fn source_type_from_str(s: &str) -> Result<SourceType> {
    Ok(match s {
        "file_docstring" => SourceType::FileDocstring,
        "class_docstring" => SourceType::ClassDocstring,
        "method_docstring" => SourceType::MethodDocstring,
        "function_docstring" => SourceType::FunctionDocstring,
        "comment" => SourceType::Comment,
        "method_comment" => SourceType::MethodComment,
        "class_comment" => SourceType::ClassComment,
        "function_comment" => SourceType::FunctionComment,
        other => return Err(Error::internal(format!("unknown source type '{other}' in store"))),
    })
}

pub fn binding_level_to_i64(level: BindingLevel) -> i64 {
    level as i64
}

pub fn binding_level_from_i64(value: i64) -> Result<BindingLevel> {
    Ok(match value {
        1 => BindingLevel::File,
        2 => BindingLevel::Class,
        3 => BindingLevel::FunctionOrMethod,
        4 => BindingLevel::Node,
        5 => BindingLevel::Line,
        other => return Err(Error::internal(format!("unknown binding level '{other}' in store"))),
    })
}

pub fn strings_to_json(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

pub fn strings_from_json(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

pub fn vector_to_json(vector: &Option<Vec<f32>>) -> Option<String> {
    vector.as_ref().map(|v| serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string()))
}

pub fn vector_from_json(json: Option<String>) -> Option<Vec<f32>> {
    json.and_then(|s| serde_json::from_str(&s).ok())
}
