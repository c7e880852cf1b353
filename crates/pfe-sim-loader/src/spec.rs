use anyhow::Result;

use crate::{BuiltinMethod, MethodDescriptor};

/// Map a user-visible builtin name to the enum used by the loader.
pub fn builtin_by_name(name: &str) -> Result<BuiltinMethod> {
    match name {
        "WholeFont" => Ok(BuiltinMethod::WholeFont),
        "Fake" => Ok(BuiltinMethod::Fake),
        other => anyhow::bail!("Unknown method '{other}'. Try 'WholeFont' or 'Fake'."),
    }
}

/// Parse a comma separated method list such as `WholeFont,Fake`.
pub fn parse_method_list(list: &str) -> Result<Vec<MethodDescriptor>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| builtin_by_name(name).map(MethodDescriptor::BuiltIn))
        .collect()
}
