use crate::compdb::CompileCommand;
use crate::error::{Error, Result};
use crate::util;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static CMD_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*cmd_(\S+)\s*:=\s*(.+)\s*$").unwrap()
});
static SOURCE_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*source_(\S+)\s*:=\s*(.+)\s*$").unwrap()
});

/// Marker kbuild puts in front of the dependency file path.
const DEP_FLAG: &str = "-Wp,-MD,";

/// Read-only parameters shared by every cmd file parse.
#[derive(Debug, Clone)]
pub struct ParseParams {
    /// Absolute build root, emitted verbatim as the entry directory.
    pub directory: String,
    /// Absolute root the build actually ran under, with a trailing `/`.
    /// Removed from commands and source paths.
    pub strip_prefix: String,
    /// Relative object directory, with a trailing `/`.
    pub output_dir: String,
}

impl ParseParams {
    /// Resolve the build root and the optional root it was mounted at
    /// during the build (e.g. inside a container).
    pub fn new(
        root: &Path,
        build_root: Option<&Path>,
        output_dir: &str,
    ) -> Result<ParseParams> {
        let directory = util::absolute(root)?;
        let strip_root = match build_root {
            Some(p) => util::absolute(p)?,
            None => directory.clone(),
        };
        let mut strip_prefix = strip_root.to_string_lossy().into_owned();
        if !strip_prefix.ends_with('/') {
            strip_prefix.push('/');
        }
        Ok(ParseParams {
            directory: directory.to_string_lossy().into_owned(),
            strip_prefix,
            output_dir: output_dir.to_owned(),
        })
    }

    /// Path of an object inside the output directory. An absolute object
    /// path is returned unchanged.
    fn output_path(&self, object: &str) -> String {
        Path::new(&self.output_dir)
            .join(object)
            .to_string_lossy()
            .into_owned()
    }

    /// Rewrite a recorded compiler invocation. The order of the
    /// substitutions matters: later ones search the output of earlier ones.
    fn rewrite_command(&self, object: &str, command: &str) -> String {
        command
            .replace(&self.strip_prefix, "")
            .replace("./", &self.output_dir)
            .replace(object, &self.output_path(object))
            .replace(DEP_FLAG, &format!("{}{}", DEP_FLAG, self.output_dir))
            .replace("\\\"", "\"")
    }
}

/// Collect `<prefix>_<object> := <value>` variables in match order. A
/// repeated object keeps its first position and its last value.
fn collect_vars<'a>(re: &Regex, text: &'a str) -> Vec<(&'a str, &'a str)> {
    let mut vars: Vec<(&str, &str)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for caps in re.captures_iter(text) {
        let (Some(object), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let (object, value) = (object.as_str(), value.as_str());
        match index.get(object) {
            Some(&i) => vars[i].1 = value,
            None => {
                index.insert(object, vars.len());
                vars.push((object, value));
            }
        }
    }
    vars
}

/// Produce one compilation database entry per `source_` variable in the
/// text of a cmd file. `path` is only used for error reporting.
pub fn parse(
    params: &ParseParams,
    path: &Path,
    text: &str,
) -> Result<Vec<CompileCommand>> {
    let commands: HashMap<&str, &str> =
        collect_vars(&CMD_VAR_RE, text).into_iter().collect();
    let sources = collect_vars(&SOURCE_VAR_RE, text);

    let mut entries = Vec::with_capacity(sources.len());
    for (object, source) in sources {
        let command = match commands.get(object) {
            Some(c) => c,
            None => {
                return Err(Error::MissingCommand {
                    object: object.to_owned(),
                    path: path.to_owned(),
                })
            }
        };
        entries.push(CompileCommand {
            directory: params.directory.clone(),
            command: params.rewrite_command(object, command),
            file: source.replace(&params.strip_prefix, ""),
            output: params.output_path(object),
        });
    }
    Ok(entries)
}

/// Read and parse the cmd file at `path`.
pub fn parse_file(
    params: &ParseParams,
    path: &Path,
) -> Result<Vec<CompileCommand>> {
    let text =
        std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse(params, path, &text)
}
