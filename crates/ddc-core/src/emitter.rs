//! Renders a protocol catalog as constant declarations for each target language

use crate::error::{Error, Result};
use crate::output::write_file;
use crate::parser::check_encoding;
use crate::protocol::{load_catalog, DuplicatePolicy, ProtocolCatalog, ProtocolEntry};
use crate::scanner::{discover_protocols, require_files, EmptyInputPolicy, FileOrder};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Banner text written at the top of every generated file
pub const DEFAULT_BANNER: &str = "请求响应数据协议";

/// Name of the generated class, node or table
pub const DEFAULT_WRAPPER: &str = "Protocols";

/// A supported output language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Java,
    CSharp,
    Godot,
    Lua,
}

impl Target {
    /// Every target, in emission order
    pub const ALL: [Target; 4] = [Target::Godot, Target::Lua, Target::CSharp, Target::Java];

    pub fn template(&self) -> &'static Template {
        match self {
            Target::Java => &JAVA,
            Target::CSharp => &CSHARP,
            Target::Godot => &GODOT,
            Target::Lua => &LUA,
        }
    }

    /// Output file name for a wrapper called `name`
    pub fn file_name(&self, name: &str) -> String {
        format!("{}.{}", name, self.template().extension)
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "java" => Ok(Target::Java),
            "csharp" | "cs" | "c#" => Ok(Target::CSharp),
            "godot" | "gd" | "gdscript" => Ok(Target::Godot),
            "lua" => Ok(Target::Lua),
            _ => Err(Error::UnknownTarget(s.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Target::Java => "java",
            Target::CSharp => "csharp",
            Target::Godot => "godot",
            Target::Lua => "lua",
        };
        f.write_str(name)
    }
}

/// Text pieces of one target's output file.
///
/// `header` may contain `{name}` and `{banner}`. Each entry becomes
/// `prefix NAME separator VALUE comment DESCRIPTION\n`.
#[derive(Debug)]
pub struct Template {
    pub extension: &'static str,
    pub header: &'static str,
    pub prefix: &'static str,
    pub separator: &'static str,
    pub comment: &'static str,
    pub footer: &'static str,
}

static JAVA: Template = Template {
    extension: "java",
    header: "\n/**\n * {banner}\n */\npublic class {name} {\n",
    prefix: "    public static final int ",
    separator: " = ",
    comment: "; // ",
    footer: "}",
};

static CSHARP: Template = Template {
    extension: "cs",
    header: "\n/**\n * {banner}\n */\npublic class {name} {\n",
    prefix: "    public static readonly int ",
    separator: " = ",
    comment: "; // ",
    footer: "}",
};

static GODOT: Template = Template {
    extension: "gd",
    header: "# {banner}: {name}\nextends Node\n",
    prefix: "const ",
    separator: ":int = ",
    comment: "; # ",
    footer: "",
};

// `X = X or {` keeps a table that is already loaded
static LUA: Template = Template {
    extension: "lua",
    header: "---\n--- {banner}\n---\n{name} = {name} or {\n",
    prefix: "    ",
    separator: " = ",
    comment: "; -- ",
    footer: "}\n",
};

/// Render entries with a template. Entries are written as given.
pub fn render(template: &Template, entries: &[ProtocolEntry], name: &str, banner: &str) -> String {
    let mut text = template
        .header
        .replace("{banner}", banner)
        .replace("{name}", name);

    for entry in entries {
        text.push_str(template.prefix);
        text.push_str(&entry.name);
        text.push_str(template.separator);
        text.push_str(&entry.value.to_string());
        text.push_str(template.comment);
        text.push_str(&entry.description);
        text.push('\n');
    }

    text.push_str(template.footer);
    text
}

/// Options for a protocol compilation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolOptions {
    /// Wrapper name, also the output file stem
    pub name: String,
    pub banner: String,
    pub targets: Vec<Target>,
    pub encoding: String,
    pub order: FileOrder,
    pub empty_input: EmptyInputPolicy,
    pub duplicates: DuplicatePolicy,
}

impl Default for ProtocolOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_WRAPPER.to_string(),
            banner: DEFAULT_BANNER.to_string(),
            targets: Target::ALL.to_vec(),
            encoding: "utf-8".to_string(),
            order: FileOrder::Listing,
            empty_input: EmptyInputPolicy::Fail,
            duplicates: DuplicatePolicy::Warn,
        }
    }
}

/// Outcome of a protocol compilation run
#[derive(Debug, Clone, Default)]
pub struct ProtocolReport {
    pub entries: usize,
    pub written: Vec<PathBuf>,
}

/// Write one file per selected target
pub fn emit_catalog(
    catalog: &ProtocolCatalog,
    output_dir: &Path,
    options: &ProtocolOptions,
) -> Result<Vec<PathBuf>> {
    catalog.check_duplicates(options.duplicates)?;

    let mut written = Vec::with_capacity(options.targets.len());
    for target in &options.targets {
        let text = render(target.template(), &catalog.entries, &options.name, &options.banner);
        let path = output_dir.join(target.file_name(&options.name));
        write_file(&path, text.as_bytes())?;
        info!("wrote {} ({} constants)", path.display(), catalog.len());
        written.push(path);
    }

    Ok(written)
}

/// Discover definition files in `input_dir`, load them and emit every target
pub fn run_protocols(
    input_dir: &Path,
    output_dir: &Path,
    options: &ProtocolOptions,
) -> Result<ProtocolReport> {
    check_encoding(&options.encoding)?;

    let files = discover_protocols(input_dir, options.order)?;
    require_files(input_dir, &files, options.empty_input)?;
    if files.is_empty() {
        info!("no protocol definitions found in {}", input_dir.display());
        return Ok(ProtocolReport::default());
    }

    let catalog = load_catalog(&files, &options.encoding)?;
    let written = emit_catalog(&catalog, output_dir, options)?;

    Ok(ProtocolReport {
        entries: catalog.len(),
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> Vec<ProtocolEntry> {
        vec![
            ProtocolEntry {
                value: 1,
                name: "CHAT_SEND".to_string(),
                description: "发送消息".to_string(),
            },
            ProtocolEntry {
                value: -2,
                name: "LOGIN_OK".to_string(),
                description: "d2".to_string(),
            },
        ]
    }

    #[test]
    fn test_render_java() {
        let text = render(Target::Java.template(), &catalog(), "Protocols", "Codes");
        assert_eq!(
            text,
            "\n/**\n * Codes\n */\npublic class Protocols {\n\
             \x20   public static final int CHAT_SEND = 1; // 发送消息\n\
             \x20   public static final int LOGIN_OK = -2; // d2\n\
             }"
        );
    }

    #[test]
    fn test_render_csharp() {
        let text = render(Target::CSharp.template(), &catalog(), "Protocols", "Codes");
        assert!(text.contains("    public static readonly int LOGIN_OK = -2; // d2\n"));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn test_render_godot() {
        let text = render(Target::Godot.template(), &catalog(), "Protocols", "Codes");
        assert_eq!(
            text,
            "# Codes: Protocols\n\
             extends Node\n\
             const CHAT_SEND:int = 1; # 发送消息\n\
             const LOGIN_OK:int = -2; # d2\n"
        );
    }

    #[test]
    fn test_render_lua() {
        let text = render(Target::Lua.template(), &catalog(), "Net", "Codes");
        assert_eq!(
            text,
            "---\n--- Codes\n---\n\
             Net = Net or {\n\
             \x20   CHAT_SEND = 1; -- 发送消息\n\
             \x20   LOGIN_OK = -2; -- d2\n\
             }\n"
        );
    }

    #[test]
    fn test_targets_agree_on_entries() {
        let entries = catalog();
        for target in Target::ALL {
            let text = render(target.template(), &entries, "Protocols", "Codes");
            let lines: Vec<&str> = text
                .lines()
                .filter(|l| l.contains("CHAT_SEND") || l.contains("LOGIN_OK"))
                .collect();
            assert_eq!(lines.len(), entries.len(), "target {}", target);
            assert!(lines[0].contains("CHAT_SEND") && lines[0].contains("= 1;"));
            assert!(lines[1].contains("LOGIN_OK") && lines[1].contains("= -2;"));
        }
    }

    #[test]
    fn test_target_parse() {
        assert_eq!("Java".parse::<Target>().unwrap(), Target::Java);
        assert_eq!("cs".parse::<Target>().unwrap(), Target::CSharp);
        assert_eq!("gd".parse::<Target>().unwrap(), Target::Godot);
        assert!(matches!("rust".parse::<Target>(), Err(Error::UnknownTarget(_))));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(Target::Java.file_name("Protocols"), "Protocols.java");
        assert_eq!(Target::CSharp.file_name("Protocols"), "Protocols.cs");
        assert_eq!(Target::Godot.file_name("Protocols"), "Protocols.gd");
        assert_eq!(Target::Lua.file_name("Protocols"), "Protocols.lua");
    }
}
