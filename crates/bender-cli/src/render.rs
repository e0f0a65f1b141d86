//! Human and JSON renderings of resolved components and update reports

use anyhow::Result;
use bender_core::tree::outline;
use bender_core::watch::TargetWrite;
use bender_core::{Component, UpdateReport, Value, WriteOutcome};
use serde_json::{json, Value as Json};
use std::fmt::Write;

/// Values as they would be written on the command line; strings quoted
pub fn show(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

/// Header, properties and view outline, followed by nested components
pub fn component_outline(component: &Component) -> String {
    let mut out = String::new();
    write_component(component, "", &mut out);
    out
}

fn write_component(component: &Component, label: &str, out: &mut String) {
    let _ = writeln!(
        out,
        "{label}{} ({})",
        component.name(),
        component.chain().join(" < ")
    );
    for (name, value) in component.properties() {
        let _ = writeln!(out, "  {name} = {}", show(value));
    }
    if let Some(err) = component.binding_error() {
        let _ = writeln!(out, "  ! watches disabled: {err}");
    }
    out.push_str(&outline(component.view()));
    for (index, child) in component.children().iter().enumerate() {
        out.push('\n');
        write_component(child, &format!("child[{index}] "), out);
    }
}

/// JSON form of a component tree
pub fn component_json(component: &Component) -> Result<Json> {
    let children = component
        .children()
        .iter()
        .map(component_json)
        .collect::<Result<Vec<_>>>()?;
    let view = component.view().to_raw()?;
    Ok(json!({
        "name": component.name(),
        "chain": component.chain(),
        "properties": component.properties(),
        "binding_error": component.binding_error().map(ToString::to_string),
        "view": view,
        "children": children,
    }))
}

fn describe(outcome: &WriteOutcome, value: &Value) -> String {
    match outcome {
        WriteOutcome::Changed { previous } => format!("{} -> {}", show(previous), show(value)),
        WriteOutcome::Unchanged => format!("unchanged ({})", show(value)),
    }
}

fn target_line(component: &Component, write: &TargetWrite) -> String {
    let label = component
        .watches()
        .get(write.watch)
        .map(|watch| watch.label(write.watch))
        .unwrap_or_else(|| format!("watch#{}", write.watch));
    format!(
        "  {label} => {}: {}",
        write.target,
        describe(&write.outcome, &write.value)
    )
}

/// The property outcome, then one line per target write
pub fn update_report(component: &Component, report: &UpdateReport, requested: &Value) -> String {
    let mut out = format!(
        "{}: {}\n",
        report.property,
        describe(&report.outcome, requested)
    );
    for write in &report.writes {
        out.push_str(&target_line(component, write));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_quoted() {
        assert_eq!(show(&Value::from("a b")), "\"a b\"");
        assert_eq!(show(&Value::from(2i64)), "2");
        assert_eq!(show(&Value::Null), "null");
    }

    #[test]
    fn outcomes() {
        let changed = WriteOutcome::Changed {
            previous: Value::from(1i64),
        };
        assert_eq!(describe(&changed, &Value::from(2i64)), "1 -> 2");
        assert_eq!(
            describe(&WriteOutcome::Unchanged, &Value::Bool(true)),
            "unchanged (true)"
        );
    }
}
