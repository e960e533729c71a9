use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Create,
    Modify,
    Delete,
    Rename,
}

impl ChangeType {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Modify => "modify",
            ChangeType::Delete => "delete",
            ChangeType::Rename => "rename",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLineType {
    Context,
    Addition,
    Deletion,
}

impl DiffLineType {
    fn prefix(&self) -> char {
        match self {
            DiffLineType::Context => ' ',
            DiffLineType::Addition => '+',
            DiffLineType::Deletion => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub content: String,
    /// Set when the line was followed by `\ No newline at end of file`.
    pub missing_newline: bool,
}

/// A `start,count` pair from a hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub count: u32,
}

impl LineRange {
    fn parse(s: &str) -> Option<Self> {
        let (start, count) = match s.split_once(',') {
            Some((start, count)) => (start.parse().ok()?, count.parse().ok()?),
            None => (s.parse().ok()?, 1),
        };
        Some(LineRange { start, count })
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{},{}", self.start, self.count)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub removed: LineRange,
    pub added: LineRange,
    /// Text after the closing `@@`, usually the enclosing function.
    pub section: String,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    pub fn additions(&self) -> usize {
        self.count(DiffLineType::Addition)
    }

    pub fn deletions(&self) -> usize {
        self.count(DiffLineType::Deletion)
    }

    fn count(&self, line_type: DiffLineType) -> usize {
        self.lines.iter().filter(|l| l.line_type == line_type).count()
    }
}

/// The hunks touching one file. `source` is `None` for created files and
/// `target` is `None` for deleted ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePatch {
    pub source: Option<String>,
    pub target: Option<String>,
    pub binary: bool,
    pub hunks: Vec<Hunk>,
}

impl FilePatch {
    fn from_git_header(paths: &str) -> Self {
        match split_git_paths(paths) {
            Some((source, target)) => FilePatch {
                source: Some(strip_prefix(&source, "a/").to_string()),
                target: Some(strip_prefix(&target, "b/").to_string()),
                ..Default::default()
            },
            None => FilePatch::default(),
        }
    }

    pub fn path(&self) -> &str {
        self.target
            .as_deref()
            .or(self.source.as_deref())
            .unwrap_or_default()
    }

    pub fn change_type(&self) -> ChangeType {
        match (&self.source, &self.target) {
            (None, Some(_)) => ChangeType::Create,
            (Some(_), None) => ChangeType::Delete,
            (Some(source), Some(target)) if source != target => ChangeType::Rename,
            _ => ChangeType::Modify,
        }
    }

    fn render(&self, output: &mut String) {
        let source = self.source.as_deref().unwrap_or(self.path());
        let target = self.target.as_deref().unwrap_or(self.path());
        output.push_str(&format!("diff --git a/{} b/{}\n", source, target));

        match self.change_type() {
            ChangeType::Create => output.push_str("new file mode 100644\n"),
            ChangeType::Delete => output.push_str("deleted file mode 100644\n"),
            ChangeType::Rename => {
                output.push_str(&format!("rename from {}\nrename to {}\n", source, target));
            }
            ChangeType::Modify => {}
        }

        let old = self.source.as_ref().map(|p| format!("a/{}", p));
        let new = self.target.as_ref().map(|p| format!("b/{}", p));
        let old = old.as_deref().unwrap_or(DEV_NULL);
        let new = new.as_deref().unwrap_or(DEV_NULL);

        if self.binary {
            output.push_str(&format!("Binary files {} and {} differ\n", old, new));
            return;
        }
        if self.hunks.is_empty() {
            return;
        }

        output.push_str(&format!("--- {}\n+++ {}\n", old, new));
        for hunk in &self.hunks {
            output.push_str(&format!("@@ -{} +{} @@", hunk.removed, hunk.added));
            if !hunk.section.is_empty() {
                output.push(' ');
                output.push_str(&hunk.section);
            }
            output.push('\n');
            for line in &hunk.lines {
                output.push(line.line_type.prefix());
                output.push_str(&line.content);
                output.push('\n');
                if line.missing_newline {
                    output.push_str(NO_NEWLINE);
                    output.push('\n');
                }
            }
        }
    }
}

const DEV_NULL: &str = "/dev/null";
const NO_NEWLINE: &str = "\\ No newline at end of file";

/// A parsed unified diff, scoped to exactly one repository snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub repository_url: String,
    pub revision: String,
    pub repository_folder: String,
    pub files: Vec<FilePatch>,
}

impl Change {
    pub fn from_unified_diff(
        text: &str,
        repository_url: impl Into<String>,
        revision: impl Into<String>,
        repository_folder: impl Into<String>,
    ) -> Result<Self> {
        Ok(Change {
            repository_url: repository_url.into(),
            revision: revision.into(),
            repository_folder: repository_folder.into(),
            files: parse_patches(text)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(FilePatch::path).collect()
    }

    pub fn additions(&self) -> usize {
        self.hunks().map(Hunk::additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.hunks().map(Hunk::deletions).sum()
    }

    fn hunks(&self) -> impl Iterator<Item = &Hunk> {
        self.files.iter().flat_map(|f| f.hunks.iter())
    }

    pub fn to_unified_diff(&self) -> String {
        let mut output = String::new();
        for file in &self.files {
            file.render(&mut output);
        }
        output
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s), +{} -{} at {}@{}",
            self.files.len(),
            self.additions(),
            self.deletions(),
            self.repository_url,
            self.revision
        )
    }
}

// Split on `\n` only: a `\r` before it belongs to the file content.
type Lines<'a> = std::iter::Peekable<std::iter::Enumerate<std::str::SplitTerminator<'a, char>>>;

fn parse_patches(text: &str) -> Result<Vec<FilePatch>> {
    let mut files: Vec<FilePatch> = Vec::new();
    // Whether the current file already had its `---` line.
    let mut source_header_seen = false;
    let mut lines: Lines<'_> = text.split_terminator('\n').enumerate().peekable();

    while let Some((index, raw)) = lines.next() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(paths) = line.strip_prefix("diff --git ") {
            files.push(FilePatch::from_git_header(paths));
            source_header_seen = false;
        } else if let Some(path) = line.strip_prefix("--- ") {
            let starts_file = match files.last() {
                Some(file) => source_header_seen || !file.hunks.is_empty(),
                None => true,
            };
            if starts_file {
                files.push(FilePatch::default());
            }
            current(&mut files, index)?.source = header_path(path, "a/");
            source_header_seen = true;
        } else if let Some(path) = line.strip_prefix("+++ ") {
            current(&mut files, index)?.target = header_path(path, "b/");
        } else if line.starts_with("@@ ") {
            let hunk = read_hunk(line, index, &mut lines)?;
            current(&mut files, index)?.hunks.push(hunk);
        } else if line.starts_with("new file mode") {
            current(&mut files, index)?.source = None;
        } else if line.starts_with("deleted file mode") {
            current(&mut files, index)?.target = None;
        } else if let Some(path) = line.strip_prefix("rename from ") {
            current(&mut files, index)?.source = Some(unquote(path).into_owned());
        } else if let Some(path) = line.strip_prefix("rename to ") {
            current(&mut files, index)?.target = Some(unquote(path).into_owned());
        } else if line.starts_with("Binary files ") || line == "GIT binary patch" {
            current(&mut files, index)?.binary = true;
        }
        // index, mode and similarity lines carry nothing we keep
    }

    Ok(files)
}

fn current(files: &mut [FilePatch], index: usize) -> Result<&mut FilePatch> {
    files.last_mut().ok_or_else(|| {
        Error::InvalidDiff(format!("line {}: content before any file header", index + 1))
    })
}

fn read_hunk(header: &str, index: usize, lines: &mut Lines<'_>) -> Result<Hunk> {
    let (removed, added, section) = parse_hunk_header(header).ok_or_else(|| {
        Error::InvalidDiff(format!("line {}: malformed hunk header {:?}", index + 1, header))
    })?;

    let mut hunk = Hunk {
        removed,
        added,
        section,
        lines: Vec::new(),
    };
    let mut old_remaining = removed.count;
    let mut new_remaining = added.count;

    while old_remaining > 0 || new_remaining > 0 {
        let (index, line) = lines.next().ok_or_else(|| {
            Error::InvalidDiff(format!(
                "hunk {} ended {} line(s) early",
                header,
                old_remaining.max(new_remaining)
            ))
        })?;

        if line.starts_with('\\') {
            mark_missing_newline(&mut hunk);
            continue;
        }

        let (line_type, content) = match line.chars().next() {
            Some('+') => (DiffLineType::Addition, &line[1..]),
            Some('-') => (DiffLineType::Deletion, &line[1..]),
            Some(' ') => (DiffLineType::Context, &line[1..]),
            // some tools strip the trailing space of empty context lines
            None => (DiffLineType::Context, ""),
            Some(_) => {
                return Err(Error::InvalidDiff(format!(
                    "line {}: unexpected {:?} inside hunk",
                    index + 1,
                    line
                )))
            }
        };

        let consumes_old = line_type != DiffLineType::Addition;
        let consumes_new = line_type != DiffLineType::Deletion;
        if (consumes_old && old_remaining == 0) || (consumes_new && new_remaining == 0) {
            return Err(Error::InvalidDiff(format!(
                "line {}: hunk {} has more lines than its header declares",
                index + 1,
                header
            )));
        }
        if consumes_old {
            old_remaining -= 1;
        }
        if consumes_new {
            new_remaining -= 1;
        }

        hunk.lines.push(DiffLine {
            line_type,
            content: content.to_string(),
            missing_newline: false,
        });
    }

    if matches!(lines.peek(), Some((_, line)) if line.starts_with('\\')) {
        lines.next();
        mark_missing_newline(&mut hunk);
    }

    Ok(hunk)
}

fn mark_missing_newline(hunk: &mut Hunk) {
    if let Some(last) = hunk.lines.last_mut() {
        last.missing_newline = true;
    }
}

fn parse_hunk_header(line: &str) -> Option<(LineRange, LineRange, String)> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, section) = rest.split_once(" @@")?;
    let (removed, added) = ranges.split_once(" +")?;
    let section = section.strip_prefix(' ').unwrap_or(section);

    Some((
        LineRange::parse(removed)?,
        LineRange::parse(added)?,
        section.to_string(),
    ))
}

fn header_path(raw: &str, prefix: &str) -> Option<String> {
    let path = unquote(raw.split('\t').next().unwrap_or(raw));
    if path == DEV_NULL {
        None
    } else {
        Some(strip_prefix(&path, prefix).to_string())
    }
}

/// Splits the `a/... b/...` pair of a `diff --git` line. Either side may be
/// quoted.
fn split_git_paths(paths: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
    let (source, target) = if paths.starts_with('"') {
        let end = closing_quote(paths)?;
        (&paths[..=end], paths[end + 1..].strip_prefix(' ')?)
    } else if paths.ends_with('"') {
        let (source, _) = paths.rsplit_once(" \"b/")?;
        (source, &paths[source.len() + 1..])
    } else {
        let (source, _) = paths.rsplit_once(" b/")?;
        (source, &paths[source.len() + 1..])
    };
    Some((unquote(source), unquote(target)))
}

fn closing_quote(quoted: &str) -> Option<usize> {
    let bytes = quoted.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Decodes a path git quoted C-style, such as `"h\303\251llo.txt"`. Octal
/// escapes are raw bytes of the UTF-8 name.
fn unquote(path: &str) -> Cow<'_, str> {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return Cow::Borrowed(path);
    };

    let mut decoded = Vec::with_capacity(inner.len());
    let mut bytes = inner.bytes().peekable();
    while let Some(byte) = bytes.next() {
        if byte != b'\\' {
            decoded.push(byte);
            continue;
        }
        match bytes.next() {
            Some(b'a') => decoded.push(0x07),
            Some(b'b') => decoded.push(0x08),
            Some(b't') => decoded.push(b'\t'),
            Some(b'n') => decoded.push(b'\n'),
            Some(b'v') => decoded.push(0x0b),
            Some(b'f') => decoded.push(0x0c),
            Some(b'r') => decoded.push(b'\r'),
            Some(digit @ b'0'..=b'3') => {
                let mut value = digit - b'0';
                for _ in 0..2 {
                    match bytes.peek() {
                        Some(&next @ b'0'..=b'7') => {
                            value = value * 8 + (next - b'0');
                            bytes.next();
                        }
                        _ => break,
                    }
                }
                decoded.push(value);
            }
            Some(other) => decoded.push(other),
            None => decoded.push(b'\\'),
        }
    }

    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or(path)
}
