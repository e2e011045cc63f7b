//! Names exported by the `pulse-js` runtime.
//!
//! Every call the rewriter generates must name one of these exports; the
//! table is the source of truth for that invariant.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Module specifier the runtime is imported from.
pub const MODULE: &str = "pulse-js";
/// Namespace identifier for `Pulse.<primitive>(...)` calls.
pub const NAMESPACE: &str = "Pulse";

pub const OBSERVABLE: &str = "observable";
pub const OBSERVABLE_ARRAY: &str = "observableArray";
pub const COMPUTE: &str = "compute";
pub const EFFECT: &str = "effect";
pub const CONDITIONAL: &str = "conditional";
pub const OBSERVE: &str = "observe";
pub const REGISTER_ELEMENT: &str = "registerElement";
pub const REGISTER_COMPONENT: &str = "registerComponent";
pub const GET_PROP_VALUE: &str = "getPropValue";

/// Member name for observable reads (`count.value`).
pub const VALUE_MEMBER: &str = "value";
/// Member name for observable writes (`count.set(...)`).
pub const SET_MEMBER: &str = "set";
/// Object key marking the condition slot of a `conditional` call.
pub const CONDITION_KEY: &str = "__condition__";

lazy_static! {
    pub static ref RUNTIME_EXPORTS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert(OBSERVABLE);
        s.insert(OBSERVABLE_ARRAY);
        s.insert(COMPUTE);
        s.insert(EFFECT);
        s.insert(CONDITIONAL);
        s.insert(OBSERVE);
        s.insert(REGISTER_ELEMENT);
        s.insert(REGISTER_COMPONENT);
        s.insert(GET_PROP_VALUE);
        s
    };
    static ref COMPONENT_PREFIX_RE: Regex = Regex::new(r"^Component_").unwrap();
    static ref BLANK_TEXT_RE: Regex = Regex::new(r"^\s*$").unwrap();
}

pub fn is_runtime_export(name: &str) -> bool {
    RUNTIME_EXPORTS.contains(name)
}

/// Declarations named `Component_<Name>` are UI components.
pub fn is_component_name(name: &str) -> bool {
    COMPONENT_PREFIX_RE.is_match(name)
}

pub fn strip_component_prefix(tag: &str) -> String {
    COMPONENT_PREFIX_RE.replace(tag, "").into_owned()
}

pub fn component_declaration_name(tag: &str) -> String {
    format!("Component_{}", strip_component_prefix(tag))
}

/// Markup text that is only whitespace is dropped during lowering.
pub fn is_blank_markup_text(value: &str) -> bool {
    BLANK_TEXT_RE.is_match(value)
}

pub fn hoisted_binding_name(counter: u64) -> String {
    format!("computed__ref_{}", counter)
}
