//! Call signature rendering.
//!
//! Renders schemas, slots and overloads in a compact TypeScript-like form.
//! The same text names overloads in decode trails and serves as the
//! best-effort client signature for code generation:
//!
//! ```text
//! SET(key: string, value: string, expiration?: ["EX" | "PX", integer])
//! BITOP(operation: "AND" | "OR", destkey: string, ...key: string[])
//! ```

use crate::overload::enumerate_overloads;
use crate::{CommandSpec, Schema, Slot};

/// Renders a schema as a type expression.
///
/// # Examples
///
/// ```
/// use command_args_core::{Schema, Slot, render_schema};
///
/// let schema = Schema::tuple(vec![
///     Slot::required("unit", Schema::one_of(["EX", "PX"])),
///     Slot::required("ttl", Schema::Integer),
/// ]);
/// assert_eq!(render_schema(&schema), r#"[unit: "EX" | "PX", ttl: integer]"#);
/// ```
pub fn render_schema(schema: &Schema) -> String {
    match schema {
        Schema::Literal { value } => format!("{value:?}"),
        Schema::Enum { values } => values
            .iter()
            .map(|value| format!("{value:?}"))
            .collect::<Vec<_>>()
            .join(" | "),
        Schema::Text => "string".to_string(),
        Schema::Integer => "integer".to_string(),
        Schema::Number => "number".to_string(),
        Schema::Any => "any".to_string(),
        Schema::Unknown => "unknown".to_string(),
        Schema::Tuple { items } => {
            let inner = items.iter().map(render_slot).collect::<Vec<_>>();
            format!("[{}]", inner.join(", "))
        }
        Schema::List { item } => format!("{}[]", render_list_item(item)),
        Schema::Union { variants } => {
            if variants.is_empty() {
                return "never".to_string();
            }
            variants
                .iter()
                .map(render_schema)
                .collect::<Vec<_>>()
                .join(" | ")
        }
    }
}

/// Renders `name: type`, marking optional slots with `?`.
pub fn render_slot(slot: &Slot) -> String {
    let marker = if slot.optional { "?" } else { "" };
    format!("{}{marker}: {}", slot.name, render_schema(&slot.schema))
}

/// Renders a parenthesised parameter list. A trailing list slot becomes a
/// rest parameter.
///
/// # Examples
///
/// ```
/// use command_args_core::{Schema, Slot, render_slots};
///
/// let slots = vec![
///     Slot::required("destkey", Schema::Text),
///     Slot::required("key", Schema::list(Schema::Text)),
/// ];
/// assert_eq!(render_slots(&slots), "(destkey: string, ...key: string[])");
/// ```
pub fn render_slots(slots: &[Slot]) -> String {
    let mut params = Vec::with_capacity(slots.len());
    for (index, slot) in slots.iter().enumerate() {
        match &slot.schema {
            Schema::List { item } if index + 1 == slots.len() => {
                params.push(format!("...{}: {}[]", slot.name, render_list_item(item)));
            }
            _ => params.push(render_slot(slot)),
        }
    }
    format!("({})", params.join(", "))
}

/// Renders one signature per overload of `spec`, prefixed with the command
/// name.
///
/// # Examples
///
/// ```
/// use command_args_core::{CommandSpec, Schema, Slot, command_signatures};
///
/// let spec = CommandSpec::new("GETEX")
///     .with_arg(Slot::required("key", Schema::Text))
///     .with_arg(Slot::optional("persist", Schema::literal("PERSIST")));
/// assert_eq!(
///     command_signatures(&spec),
///     vec![r#"GETEX(key: string, persist?: "PERSIST")"#],
/// );
/// ```
pub fn command_signatures(spec: &CommandSpec) -> Vec<String> {
    enumerate_overloads(&spec.arguments)
        .iter()
        .map(|overload| format!("{}{}", spec.command, render_slots(&overload.slots)))
        .collect()
}

fn render_list_item(item: &Schema) -> String {
    let rendered = render_schema(item);
    match item {
        Schema::Enum { values } if values.len() > 1 => format!("({rendered})"),
        Schema::Union { variants } if variants.len() > 1 => format!("({rendered})"),
        _ => rendered,
    }
}
