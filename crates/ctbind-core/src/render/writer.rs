//! Indentation-aware text output for generated Python.

/// Python reserved words (plus `type`, which would shadow the builtin the
/// generated module relies on).
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "type",
];

/// Line-oriented writer with four-space indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    output: String,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writeln(&mut self, s: &str) {
        if s.is_empty() {
            self.output.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Write a line that opens a block and indent what follows.
    pub fn open(&mut self, s: &str) {
        self.writeln(s);
        self.indent += 1;
    }

    pub fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    /// Write a (possibly multi-line) docstring at the current indentation.
    pub fn docstring(&mut self, doc: &str) {
        let mut lines = doc.lines();
        let first = lines.next().unwrap_or_default();
        let rest: Vec<&str> = lines.collect();
        if rest.is_empty() {
            self.writeln(&format!("\"\"\"{}\"\"\"", first));
            return;
        }
        self.writeln(&format!("\"\"\"{}", first));
        for line in rest {
            self.writeln(line);
        }
        self.writeln("\"\"\"");
    }

    /// The accumulated text without trailing newlines.
    pub fn finish(mut self) -> String {
        let len = self.output.trim_end_matches('\n').len();
        self.output.truncate(len);
        self.output
    }
}

/// Sanitize a native identifier for Python.
pub fn sanitize_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_unnamed".to_string();
    }
    if PYTHON_KEYWORDS.contains(&name) {
        return format!("{}_", name);
    }
    name.to_string()
}

/// Lower-case the first character (`GetFloat` -> `getFloat`).
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
