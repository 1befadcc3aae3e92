use std::path::{Path, PathBuf};

use regex::Regex;

/// Which optional capabilities the generated action implements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub structured: bool,
    pub streaming: bool,
    pub tools: bool,
}

// ── Public entry point ───────────────────────────────────────────────

/// Scaffold a new action type under `dir` and report the written path.
pub fn action(name: &str, caps: Capabilities, dir: &str) -> anyhow::Result<()> {
    let path = action_in(Path::new(dir), name, caps)?;
    println!("Action [{}] created successfully.", type_name(name));
    println!("  Path: {}", path.display());
    Ok(())
}

// ── Core implementation (directory-parameterised for testability) ─────

fn action_in(dir: &Path, name: &str, caps: Capabilities) -> anyhow::Result<PathBuf> {
    let valid = Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]*$")?;
    if !valid.is_match(name) {
        anyhow::bail!(
            "invalid action name {name:?}: use letters, digits, '-' or '_', starting with a letter"
        );
    }

    let type_name = type_name(name);
    let path = dir.join(format!("{}.rs", file_stem(name)));

    if path.exists() {
        anyhow::bail!("Action [{type_name}] already exists at {}.", path.display());
    }

    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, render(&type_name, caps))?;
    tracing::debug!(path = %path.display(), "wrote action scaffold");
    Ok(path)
}

// ── Naming ───────────────────────────────────────────────────────────

fn parts(name: &str) -> impl Iterator<Item = &str> {
    name.split(['-', '_']).filter(|p| !p.is_empty())
}

/// `summarize-ticket` / `summarize_ticket` / `summarizeTicket` → `SummarizeTicket`.
pub fn type_name(name: &str) -> String {
    parts(name)
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// `SummarizeTicket` → `summarize_ticket`, `HTTPFetch` → `http_fetch`.
pub fn file_stem(name: &str) -> String {
    let studly: Vec<char> = type_name(name).chars().collect();
    let mut out = String::with_capacity(studly.len() + 4);

    for (i, &c) in studly.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = studly[i - 1];
            let next_is_lower = studly.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

// ── Rendering ────────────────────────────────────────────────────────

fn render(type_name: &str, caps: Capabilities) -> String {
    let mut runtime_imports = vec!["AgentAction"];
    if caps.tools {
        runtime_imports.push("HasTools");
    }
    if caps.streaming {
        runtime_imports.push("StreamingResponse");
    }
    if caps.structured {
        runtime_imports.push("StructuredOutput");
    }

    let mut domain_imports = vec!["ActionContext"];
    if caps.streaming {
        domain_imports.insert(0, "ActionResult");
    }
    if caps.structured {
        domain_imports.push("SchemaNode");
    }

    let mut out = String::new();
    out.push_str("use aa_domain::error::Result;\n");
    if caps.tools {
        out.push_str("use aa_domain::tool::ToolDefinition;\n");
    }
    out.push_str(&format!("use aa_domain::{{{}}};\n", domain_imports.join(", ")));
    out.push_str(&format!("use aa_runtime::{{{}}};\n", runtime_imports.join(", ")));
    if caps.structured {
        out.push_str("use serde_json::{Map, Value};\n");
    }

    out.push_str(&format!(
        r#"
pub struct {type_name};

impl AgentAction for {type_name} {{
    fn instructions(&self, _ctx: &ActionContext) -> Result<String> {{
        Ok("You are a helpful assistant.".into())
    }}

    fn prompt(&self, ctx: &ActionContext) -> Result<String> {{
        Ok(ctx.user_instruction().unwrap_or_default().to_string())
    }}
"#
    ));

    if caps.structured {
        out.push_str(
            r#"
    fn structured_output(&self) -> Option<&dyn StructuredOutput> {
        Some(self)
    }
"#,
        );
    }
    if caps.streaming {
        out.push_str(
            r#"
    fn streaming(&self) -> Option<&dyn StreamingResponse> {
        Some(self)
    }
"#,
        );
    }
    if caps.tools {
        out.push_str(
            r#"
    fn tools(&self) -> Option<&dyn HasTools> {
        Some(self)
    }
"#,
        );
    }
    out.push_str("}\n");

    if caps.structured {
        out.push_str(&format!(
            r#"
impl StructuredOutput for {type_name} {{
    fn output_schema(&self) -> SchemaNode {{
        SchemaNode::object().required_property("summary", SchemaNode::string())
    }}

    fn map_output(&self, raw: Map<String, Value>) -> Result<Value> {{
        Ok(Value::Object(raw))
    }}
}}
"#
        ));
    }
    if caps.streaming {
        out.push_str(&format!(
            r#"
impl StreamingResponse for {type_name} {{
    fn on_chunk(&self, chunk: &str) -> bool {{
        print!("{{chunk}}");
        true
    }}

    fn on_complete(&self, _result: &ActionResult) {{
        println!();
    }}
}}
"#
        ));
    }
    if caps.tools {
        out.push_str(&format!(
            r#"
impl HasTools for {type_name} {{
    fn tool_definitions(&self) -> Vec<ToolDefinition> {{
        Vec::new()
    }}
}}
"#
        ));
    }

    out
}
