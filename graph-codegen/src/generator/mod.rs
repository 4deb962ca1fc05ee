mod rust_gen;

use std::collections::HashSet;

use lazy_static::lazy_static;
use proc_macro2::{Ident, Span};
use quote::format_ident;

use crate::config::GeneratorConfig;
use crate::parser::Entity;

lazy_static! {
    static ref RESERVED_WORDS: HashSet<&'static str> = [
        "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
        "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
        "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
        "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
        "unsized", "use", "virtual", "where", "while", "yield",
    ]
    .into_iter()
    .collect();
}

pub fn generate_rust(entities: Vec<Entity>, config: &GeneratorConfig) -> anyhow::Result<String> {
    rust_gen::generate_code(entities, config)
}

/// `displayName` -> `display_name`, `macOSKernelExtension` -> `mac_os_kernel_extension`,
/// `@odata.type` -> `odata_type`.
pub(crate) fn snake_case(s: &str) -> String {
    let chars = s.chars().collect::<Vec<_>>();
    let mut out = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            // an acronym ends where the next word's lowercase tail begins
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_end_matches('_').to_string()
}

/// `notPublished` -> `NotPublished`, `microsoft.graph.entity` -> `MicrosoftGraphEntity`.
pub(crate) fn pascal_case(s: &str) -> String {
    let mut out = String::new();
    for segment in s.split(|c: char| !c.is_alphanumeric()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        out.push_str("Value");
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Enum variant name for a wire value. `self` would become the keyword `Self` and is
/// suffixed instead.
pub(crate) fn variant_name(value: &str) -> String {
    let name = pascal_case(value);
    if name == "Self" {
        format!("{name}_")
    } else {
        name
    }
}

/// Snake case name for a wire name, usable as an identifier once passed to `escaped_ident`.
pub(crate) fn field_name(wire_name: &str) -> String {
    let name = snake_case(wire_name);
    match name.as_str() {
        "" => "value".to_string(),
        "self" | "super" | "crate" => format!("{name}_"),
        _ if name.starts_with(|c: char| c.is_ascii_digit()) => format!("_{name}"),
        _ => name,
    }
}

pub(crate) fn escaped_ident(name: &str) -> Ident {
    if RESERVED_WORDS.contains(name) {
        Ident::new_raw(name, Span::call_site())
    } else {
        format_ident!("{}", name)
    }
}

pub(crate) fn field_ident(wire_name: &str) -> Ident {
    escaped_ident(&field_name(wire_name))
}
