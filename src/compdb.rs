use crate::error::{Error, Result};
use serde::Serialize;
use serde_derive::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default location of the emitted database, relative to the working
/// directory.
pub const DEFAULT_OUTPUT: &str = "../compile_commands.json";

/// One entry of a `compile_commands.json` compilation database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileCommand {
    /// Working directory of the compilation.
    pub directory: String,
    /// The compiler invocation.
    pub command: String,
    /// Source file being compiled.
    pub file: String,
    /// Object file produced.
    pub output: String,
}

/// Serialize the database as a JSON array, indented one space per level.
pub fn emit<W: Write>(out: W, entries: &[CompileCommand]) -> serde_json::Result<()> {
    let mut ser = Serializer::with_formatter(out, PrettyFormatter::with_indent(b" "));
    entries.serialize(&mut ser)
}

/// Emit the database to the file at `path`, replacing any previous content.
pub fn emit_file(path: &Path, entries: &[CompileCommand]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    emit(&mut out, entries).map_err(|source| Error::Json {
        path: path.to_owned(),
        source,
    })?;
    out.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CompileCommand {
        CompileCommand {
            directory: "/src/kernel".into(),
            command: "gcc -c -o out/a.o a.c".into(),
            file: "a.c".into(),
            output: "out/a.o".into(),
        }
    }

    #[test]
    fn emits_one_space_indent_in_key_order() {
        let mut buf = Vec::new();
        emit(&mut buf, &[entry()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "[\n {\n  \"directory\": \"/src/kernel\",\n  \"command\": \"gcc -c -o out/a.o a.c\",\n  \"file\": \"a.c\",\n  \"output\": \"out/a.o\"\n }\n]"
        );
    }

    #[test]
    fn empty_database_is_empty_array() {
        let mut buf = Vec::new();
        emit(&mut buf, &[]).unwrap();
        assert_eq!(buf, b"[]");
    }

    #[test]
    fn emit_file_writes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compile_commands.json");
        emit_file(&path, &[entry(), entry()]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        for obj in array {
            let mut keys: Vec<&str> =
                obj.as_object().unwrap().keys().map(|k| k.as_str()).collect();
            keys.sort();
            assert_eq!(keys, ["command", "directory", "file", "output"]);
        }
    }

    #[test]
    fn emit_file_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("compile_commands.json");
        assert!(matches!(emit_file(&path, &[entry()]), Err(Error::Io { .. })));
    }
}
