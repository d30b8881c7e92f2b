//! Lua modulefile templates.
//!
//! Templates are rendered from typed parameters. Every user-supplied value is
//! emitted as an escaped Lua string literal.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::Calls;

use super::request::ModuleRequest;

/// Name of the runtime module every software module loads.
pub const RUNTIME_MODULE: &str = "cc/singularity";

/// One shell function exposed by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellFunction {
    pub alias: String,
    /// Command run inside the image; `None` runs the image itself.
    pub target: Option<String>,
}

impl ShellFunction {
    /// Functions for a request: one per `calls` entry, or one named after
    /// the module when `calls` is absent.
    pub fn for_request(request: &ModuleRequest) -> Vec<Self> {
        match &request.calls {
            None => vec![Self {
                alias: request.name.clone(),
                target: Some(request.name.clone()),
            }],
            Some(Calls::List(names)) => names
                .iter()
                .map(|name| Self {
                    alias: name.clone(),
                    target: Some(name.clone()),
                })
                .collect(),
            Some(Calls::Map(map)) => map
                .iter()
                .map(|(alias, target)| Self {
                    alias: alias.clone(),
                    target: target.clone(),
                })
                .collect(),
        }
    }
}

/// Parameters for the per-software base modulefile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseModule {
    /// Image cache directory, `~` allowed.
    pub images_dir: String,
    /// Image URI up to and including the `:` before the tag.
    pub source_prefix: String,
    pub gpu: bool,
    pub functions: Vec<ShellFunction>,
}

impl BaseModule {
    pub fn for_request(request: &ModuleRequest, images_dir: &str) -> Self {
        Self {
            images_dir: images_dir.to_string(),
            source_prefix: request.source_prefix(),
            gpu: request.gpu,
            functions: ShellFunction::for_request(request),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("-- generated by comcol; rewritten on every refresh\n");
        let _ = writeln!(out, "local images_dn = {}", lua_string(&self.images_dir));
        out.push_str("-- the tag is the module version\n");
        let _ = writeln!(
            out,
            "local source = {} .. myModuleVersion()",
            lua_string(&self.source_prefix)
        );
        out.push_str("local target = myModuleName() .. \"-\" .. myModuleVersion() .. \".sif\"\n\n");
        let _ = writeln!(out, "load({})\n", lua_string(RUNTIME_MODULE));
        out.push_str(
            "local function resolve_tilde(s)\n    return (s:gsub(\"^~\", os.getenv(\"HOME\")))\nend\n\n",
        );
        out.push_str("local images_dn_abs = resolve_tilde(images_dn)\n");
        out.push_str("local target_fn = pathJoin(images_dn_abs, target)\n");
        out.push_str("-- quoted for use inside shell commands\n");
        out.push_str("local target_arg = \"\\\"\" .. target_fn .. \"\\\"\"\n\n");
        out.push_str("if mode() == \"load\" then\n");
        out.push_str("    if lfs.attributes(images_dn_abs, \"mode\") == nil then\n");
        out.push_str(
            "        io.stderr:write(\"[CC] making a cache directory: \" .. images_dn_abs .. \"\\n\")\n",
        );
        out.push_str("        lfs.mkdir(images_dn_abs)\n");
        out.push_str("    end\n");
        out.push_str("    if lfs.attributes(target_fn, \"mode\") == nil then\n");
        out.push_str(
            "        execute{cmd = \"singularity pull \" .. target_arg .. \" \" .. source, modeA = {\"load\"}}\n",
        );
        out.push_str("    end\nend\n\n");

        let nv = if self.gpu { " --nv" } else { "" };
        for function in &self.functions {
            let alias = lua_string(&function.alias);
            match &function.target {
                Some(target) => {
                    let _ = writeln!(
                        out,
                        "set_shell_function({alias},\n    \"singularity exec{nv} \" .. target_arg .. {},\n    \"singularity exec{nv} \" .. target_arg .. {})",
                        lua_string(&format!(" {} \"$@\"", target)),
                        lua_string(&format!(" {} \"$*\"", target)),
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "set_shell_function({alias},\n    \"singularity run{nv} \" .. target_arg,\n    \"singularity run{nv} \" .. target_arg)",
                    );
                }
            }
        }
        out
    }
}

/// The runtime module putting the resolved Singularity on `PATH`.
pub fn render_runtime_module(prefix: &Path) -> String {
    format!(
        "-- generated by comcol\nwhatis(\"Singularity container runtime\")\nprepend_path(\"PATH\", {})\n",
        lua_string(&prefix.join("bin").display().to_string())
    )
}

/// Quote `s` as a Lua double-quoted string literal.
pub fn lua_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Source, WhitelistDetail, WhitelistEntry};
    use std::collections::BTreeMap;

    fn request(calls: Option<Calls>, gpu: bool) -> ModuleRequest {
        let detail = WhitelistDetail {
            version: Some("3.6".into()),
            repo: Some("library/python".into()),
            calls,
            gpu,
            ..Default::default()
        };
        ModuleRequest::from_entry("python", &WhitelistEntry::Detail(detail), Source::Docker)
    }

    #[test]
    fn default_alias_is_module_name() {
        let functions = ShellFunction::for_request(&request(None, false));
        assert_eq!(
            functions,
            vec![ShellFunction {
                alias: "python".into(),
                target: Some("python".into())
            }]
        );
    }

    #[test]
    fn mapping_with_null_runs_image() {
        let mut map = BTreeMap::new();
        map.insert("py".to_string(), None);
        let request = request(Some(Calls::Map(map)), false);

        let functions = ShellFunction::for_request(&request);
        assert_eq!(functions[0].target, None);

        let rendered = BaseModule::for_request(&request, "~/.cc_images").render();
        assert!(rendered.contains("\"singularity run \" .. target_arg"));
    }

    #[test]
    fn base_module_contents() {
        let rendered = BaseModule::for_request(&request(None, false), "~/.cc_images").render();
        assert!(rendered.contains("local images_dn = \"~/.cc_images\""));
        assert!(rendered.contains("local source = \"docker://library/python:\" .. myModuleVersion()"));
        assert!(rendered.contains("load(\"cc/singularity\")"));
        assert!(rendered.contains("singularity pull"));
        assert!(rendered.contains("set_shell_function(\"python\""));
        assert!(rendered.contains("\" python \\\"$@\\\"\""));
    }

    #[test]
    fn image_path_is_quoted_in_shell_commands() {
        let rendered = BaseModule::for_request(&request(None, false), "~/my images").render();
        assert!(rendered.contains("local images_dn = \"~/my images\""));
        assert!(rendered.contains("local target_arg = \"\\\"\" .. target_fn .. \"\\\"\""));
        assert!(rendered.contains("\"singularity pull \" .. target_arg .. \" \" .. source"));
        assert!(rendered.contains("\"singularity exec \" .. target_arg .. \" python"));
        assert!(!rendered.contains(".. target_fn .. \" python"));
        assert!(!rendered.contains("\"singularity pull \" .. target_fn"));
    }

    #[test]
    fn gpu_adds_nv_flag() {
        let rendered = BaseModule::for_request(&request(None, true), "~/.cc_images").render();
        assert!(rendered.contains("singularity exec --nv"));
    }

    #[test]
    fn runtime_module_prepends_bin() {
        let rendered = render_runtime_module(Path::new("/opt/singularity"));
        assert!(rendered.contains("prepend_path(\"PATH\", \"/opt/singularity/bin\")"));
    }

    #[test]
    fn lua_string_escapes() {
        assert_eq!(lua_string(r#"a"b\c"#), r#""a\"b\\c""#);
    }
}
