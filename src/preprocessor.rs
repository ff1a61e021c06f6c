use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{error::CompileError, lexer::SourceFile};

/// Reads an entry file and every file it imports.
///
/// An import is a line of the form `import <path>`. The path is taken
/// relative to the directory of the importing file. Imports are followed
/// depth first, so the returned list names every file after the files it
/// imports and the entry file comes last. A file imported twice, or through
/// a cycle, is read once.
///
/// # Errors
/// [`CompileError::Io`] for the first file that cannot be read.
pub fn preprocess(entry: impl AsRef<Path>) -> Result<Vec<SourceFile>, CompileError> {
    preprocess_with(entry, |path| fs::read_to_string(path))
}

/// [`preprocess`] over a custom file reader.
///
/// # Errors
/// [`CompileError::Io`] for the first file `read` fails on.
///
/// # Example
/// ```
/// use std::{collections::HashMap, io, path::Path};
///
/// use kvantum::preprocessor::preprocess_with;
///
/// let files = HashMap::from([("main.kv", "import util.kv\nlet x = 1;"), ("util.kv", "fn one() => 1;")]);
/// let read = |path: &Path| {
///     files.get(path.to_str().unwrap_or_default())
///          .map(ToString::to_string)
///          .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
/// };
///
/// let sources = preprocess_with("main.kv", read).unwrap();
/// let paths: Vec<&str> = sources.iter().map(|source| source.path.as_str()).collect();
/// assert_eq!(paths, ["util.kv", "main.kv"]);
/// ```
pub fn preprocess_with(entry: impl AsRef<Path>,
                       read: impl FnMut(&Path) -> io::Result<String>)
                       -> Result<Vec<SourceFile>, CompileError> {
    let mut preprocessor = Preprocessor { read,
                                          seen: HashSet::new(),
                                          sources: Vec::new() };
    preprocessor.visit(entry.as_ref().to_path_buf())?;

    tracing::debug!(files = preprocessor.sources.len(), "imports resolved");
    Ok(preprocessor.sources)
}

/// The path named by an `import` line, if the line is one.
///
/// A trailing `;` and surrounding quotes are ignored.
#[must_use]
pub fn import_target(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("import")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let target = rest.trim().trim_end_matches(';').trim_end().trim_matches('"');
    (!target.is_empty()).then_some(target)
}

struct Preprocessor<F> {
    read:    F,
    seen:    HashSet<PathBuf>,
    sources: Vec<SourceFile>,
}

impl<F: FnMut(&Path) -> io::Result<String>> Preprocessor<F> {
    fn visit(&mut self, path: PathBuf) -> Result<(), CompileError> {
        if !self.seen.insert(path.clone()) {
            return Ok(());
        }

        let text = (self.read)(&path).map_err(|source| CompileError::Io { path: path.clone(),
                                                                          source })?;

        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let imports: Vec<PathBuf> = text.lines()
                                        .filter_map(import_target)
                                        .map(|target| directory.join(target))
                                        .collect();
        for import in imports {
            tracing::trace!(file = %path.display(), import = %import.display(), "import found");
            self.visit(import)?;
        }

        self.sources.push(SourceFile::new(path.display().to_string(), text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn order(files: &[(&str, &str)], entry: &str) -> Result<Vec<String>, CompileError> {
        let files: HashMap<PathBuf, String> = files.iter()
                                                   .map(|(path, text)| (PathBuf::from(path), (*text).to_string()))
                                                   .collect();
        let read = |path: &Path| {
            files.get(path)
                 .cloned()
                 .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        };

        preprocess_with(entry, read).map(|sources| sources.into_iter().map(|source| source.path).collect())
    }

    #[test]
    fn import_lines_are_recognised() {
        assert_eq!(import_target("import util.kv"), Some("util.kv"));
        assert_eq!(import_target("  import \"lib/a.kv\";"), Some("lib/a.kv"));
        assert_eq!(import_target("important = 1;"), None);
        assert_eq!(import_target("import"), None);
        assert_eq!(import_target("let import = 2;"), None);
    }

    #[test]
    fn dependencies_come_first_and_only_once() {
        let files = [("main.kv", "import b.kv\nimport a.kv\n"),
                     ("a.kv", "import c.kv\n"),
                     ("b.kv", "import c.kv\n"),
                     ("c.kv", "")];
        assert_eq!(order(&files, "main.kv").unwrap(), ["c.kv", "b.kv", "a.kv", "main.kv"]);
    }

    #[test]
    fn cycles_terminate() {
        let files = [("main.kv", "import a.kv"), ("a.kv", "import main.kv")];
        assert_eq!(order(&files, "main.kv").unwrap(), ["a.kv", "main.kv"]);
    }

    #[test]
    fn imports_are_relative_to_the_importing_file() {
        let files = [("src/main.kv", "import lib/util.kv"), ("src/lib/util.kv", "")];
        assert_eq!(order(&files, "src/main.kv").unwrap(), ["src/lib/util.kv", "src/main.kv"]);
    }

    #[test]
    fn missing_imports_name_the_file() {
        let error = order(&[("main.kv", "import gone.kv")], "main.kv").unwrap_err();
        assert!(error.to_string().starts_with("could not read source file 'gone.kv'"), "{error}");
    }
}
