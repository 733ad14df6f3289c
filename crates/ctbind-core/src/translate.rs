//! Native type spelling to ctypes type expression.
//!
//! Translation is a two-step structural rewrite. A spelling is tokenized and
//! parsed into a [`TypeExpr`] (named type, pointer, fixed-size array), with
//! the keyword and width normalizations applied to every base name as it is
//! parsed. The tree is then rendered bottom-up. Because the parser also
//! accepts the output vocabulary (`POINTER(T)`, `T * N`, parenthesized
//! groups), translating an already translated spelling returns it unchanged.
//!
//! Translation never fails. When the parser cannot make sense of a spelling
//! (or it nests deeper than any real declaration), trailing `*`, `&` and
//! `[N]` are still applied and the rest is passed through with its keyword
//! noise stripped, so the gap shows up as a visible name in the generated
//! module: `const foo<int> *` becomes `POINTER(foo<int>)`.

use ctbind_config::TypesConfig;
use std::fmt;

/// ctypes "no value" marker.
pub const NO_VALUE: &str = "None";
/// ctypes opaque pointer.
pub const VOID_P: &str = "c_void_p";
/// ctypes null-terminated byte string.
pub const CHAR_P: &str = "c_char_p";
/// Prefix of ctypes primitive names.
pub const PRIMITIVE_MARKER: &str = "c_";

const POINTER_WRAPPER: &str = "POINTER";

/// Keywords that carry no information for ctypes.
const NOISE_KEYWORDS: &[&str] = &["const", "struct", "enum", "union"];

/// Primitive roots that take the `c_` marker (matched as name prefixes, so
/// `uint32` and `intptr_t` qualify).
const PRIMITIVE_ROOTS: &[&str] = &[
    "float", "uint", "int", "double", "uchar", "char", "ushort", "short", "ulong", "long",
];

const WIDTH_SUFFIXES: &[&str] = &["8_t", "16_t", "32_t", "64_t"];

/// Deepest pointer/array/group nesting accepted from a spelling.
const MAX_NESTING: usize = 64;

/// A parsed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A normalized base name (`c_float`, `HmdMatrix34_t`, `None`).
    Named(String),
    /// `POINTER(T)`, or `c_void_p` when `T` is the no-value marker.
    Pointer(Box<TypeExpr>),
    /// `T * N`
    Array(Box<TypeExpr>, usize),
    /// A spelling the parser could not decompose, passed through.
    Raw(String),
}

impl TypeExpr {
    fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    fn array(element: TypeExpr, len: usize) -> Self {
        TypeExpr::Array(Box::new(element), len)
    }

    /// Render as a ctypes expression. `nested` parenthesizes arrays so that
    /// an array used as an element of another array associates correctly.
    pub fn render(&self, nested: bool) -> String {
        match self {
            TypeExpr::Named(name) | TypeExpr::Raw(name) => name.clone(),
            TypeExpr::Pointer(inner) => {
                let inner = inner.render(false);
                if inner == NO_VALUE {
                    VOID_P.to_string()
                } else {
                    format!("{}({})", POINTER_WRAPPER, inner)
                }
            }
            TypeExpr::Array(element, len) => {
                let result = format!("{} * {}", element.render(true), len);
                if nested {
                    format!("({})", result)
                } else {
                    result
                }
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(usize),
    Star,
    Amp,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Other(char),
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

fn tokenize(spelling: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = spelling.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if is_ident_char(c) {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if !is_ident_char(c) {
                    break;
                }
                word.push(c);
                chars.next();
            }
            if NOISE_KEYWORDS.contains(&word.as_str()) {
                continue;
            }
            let token = if word.bytes().all(|b| b.is_ascii_digit()) {
                word.parse().map(Token::Number).unwrap_or(Token::Ident(word))
            } else {
                Token::Ident(word)
            };
            tokens.push(token);
            continue;
        }
        chars.next();
        tokens.push(match c {
            '*' => Token::Star,
            '&' => Token::Amp,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => Token::Other(other),
        });
    }

    tokens
}

/// Strip keyword noise for the pass-through fallback.
fn strip_noise(spelling: &str) -> String {
    spelling
        .split_whitespace()
        .filter(|w| !NOISE_KEYWORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Type spelling translator.
#[derive(Debug, Clone)]
pub struct Translator {
    namespace: String,
    strip_prefix: String,
    bool_alias: String,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(&TypesConfig::default())
    }
}

impl Translator {
    pub fn new(config: &TypesConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            strip_prefix: config.strip_prefix.clone(),
            bool_alias: config.bool_alias.clone(),
        }
    }

    /// Translate a native type spelling to a ctypes type expression.
    pub fn translate(&self, spelling: &str) -> String {
        let result = self.translate_with(spelling, false);
        tracing::trace!(spelling, result = %result, "translated type");
        result
    }

    /// Translate a spelling used as the element of an enclosing array.
    pub fn translate_nested(&self, spelling: &str) -> String {
        self.translate_with(spelling, true)
    }

    fn translate_with(&self, spelling: &str, nested: bool) -> String {
        let tokens = tokenize(spelling);
        // `char *` is a byte string, but only as a whole spelling: `char **`
        // and `char *[4]` stay pointers to c_char.
        if tokens == [Token::Ident("char".to_string()), Token::Star] {
            return CHAR_P.to_string();
        }
        self.parse_tokens(spelling, &tokens).render(nested)
    }

    /// Parse a spelling into its structural form.
    pub fn parse(&self, spelling: &str) -> TypeExpr {
        self.parse_tokens(spelling, &tokenize(spelling))
    }

    fn parse_tokens(&self, spelling: &str, tokens: &[Token]) -> TypeExpr {
        self.parse_complete(tokens)
            .unwrap_or_else(|| self.parse_suffixes(spelling))
    }

    fn parse_complete(&self, tokens: &[Token]) -> Option<TypeExpr> {
        let mut parser = Parser {
            translator: self,
            tokens,
            pos: 0,
            nesting: 0,
        };
        let expr = parser.parse_type()?;
        (parser.pos == tokens.len()).then_some(expr)
    }

    /// Fallback for spellings the parser rejects: trailing `*`, `&` and
    /// `[N]` still wrap the unparsed base.
    fn parse_suffixes(&self, spelling: &str) -> TypeExpr {
        let stripped = strip_noise(spelling);
        let mut base = stripped.as_str();
        let mut suffixes = Vec::new();
        while let Some(suffix) = peel_suffix(&mut base) {
            if suffixes.len() == MAX_NESTING {
                return TypeExpr::Raw(stripped.clone());
            }
            suffixes.push(suffix);
        }
        let base = base.trim();
        if suffixes.is_empty() || base.is_empty() {
            return TypeExpr::Raw(stripped.clone());
        }

        let mut ty = self
            .parse_complete(&tokenize(base))
            .unwrap_or_else(|| TypeExpr::Raw(base.to_string()));
        let mut dims = Vec::new();
        for suffix in suffixes.into_iter().rev() {
            match suffix {
                Suffix::Pointer => ty = TypeExpr::pointer(flush_dims(ty, &mut dims)),
                Suffix::Dim(len) => dims.push(len),
            }
        }
        flush_dims(ty, &mut dims)
    }

    /// Normalize the words of a base type name.
    fn normalize_name(&self, words: &[String]) -> TypeExpr {
        let mut words: Vec<String> = words.to_vec();

        // No implicit int.
        if words.len() == 1 && words[0] == "unsigned" {
            words.push("int".to_string());
        }

        for word in &mut words {
            if WIDTH_SUFFIXES.iter().any(|s| word.ends_with(s)) {
                word.truncate(word.len() - 2);
            }
        }

        // `long long` collapses before `unsigned` folds in, so that
        // `unsigned long long` becomes `ulonglong`.
        words = merge_adjacent(words, |a, b| {
            (a == "long" && b == "long").then(|| "longlong".to_string())
        });
        words = merge_adjacent(words, |a, b| (a == "unsigned").then(|| format!("u{}", b)));

        let mut name = words.join(" ");

        if !self.namespace.is_empty() {
            if let Some(rest) = name.strip_prefix(&self.namespace) {
                name = rest.to_string();
            }
        }
        if !self.strip_prefix.is_empty() {
            name = strip_at_word_boundaries(&name, &self.strip_prefix);
        }

        if PRIMITIVE_ROOTS.iter().any(|root| name.starts_with(root)) {
            name = format!("{}{}", PRIMITIVE_MARKER, name);
        }

        // Pointer typedef idiom: `uintptr_t` is a pointer to `uint`.
        if let Some(pointee) = pointer_typedef_pointee(&name) {
            let pointee = pointee.to_string();
            return TypeExpr::pointer(self.normalize_name(&[pointee]));
        }

        match name.as_str() {
            "void" => TypeExpr::Named(NO_VALUE.to_string()),
            "bool" => TypeExpr::Named(self.bool_alias.clone()),
            _ => TypeExpr::Named(name),
        }
    }
}

/// Merge each adjacent pair for which `merge` returns a replacement.
fn merge_adjacent(
    words: Vec<String>,
    merge: impl Fn(&str, &str) -> Option<String>,
) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(words.len());
    let mut iter = words.into_iter().peekable();
    while let Some(word) = iter.next() {
        if let Some(next) = iter.peek() {
            if let Some(merged) = merge(&word, next) {
                iter.next();
                result.push(merged);
                continue;
            }
        }
        result.push(word);
    }
    result
}

/// Remove every occurrence of `prefix` that starts at a word boundary.
fn strip_at_word_boundaries(name: &str, prefix: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut rest = name;
    let mut prev: Option<char> = None;
    while !rest.is_empty() {
        let at_boundary = prev.map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
        if at_boundary && rest.starts_with(prefix) {
            rest = &rest[prefix.len()..];
            prev = prefix.chars().last();
            continue;
        }
        let c = rest.chars().next().unwrap_or_default();
        result.push(c);
        prev = Some(c);
        rest = &rest[c.len_utf8()..];
    }
    result
}

/// The pointee of a `<T>ptr` / `<T>ptr_t` name, if it is one.
fn pointer_typedef_pointee(name: &str) -> Option<&str> {
    let stem = name
        .strip_suffix("ptr_t")
        .or_else(|| name.strip_suffix("ptr"))?;
    let stem = stem.trim_end();
    (!stem.is_empty()).then_some(stem)
}

/// A declarator suffix peeled off the end of a spelling.
enum Suffix {
    Pointer,
    Dim(usize),
}

/// Remove one trailing `*`, `&`, `[N]` or `[]` from `base`.
fn peel_suffix(base: &mut &str) -> Option<Suffix> {
    let current: &str = base;
    let trimmed = current.trim_end();
    if let Some(rest) = trimmed.strip_suffix(|c: char| c == '*' || c == '&') {
        *base = rest;
        return Some(Suffix::Pointer);
    }
    let open = trimmed.strip_suffix(']')?.rfind('[')?;
    let inner = trimmed[open + 1..trimmed.len() - 1].trim();
    let suffix = if inner.is_empty() {
        Suffix::Pointer
    } else {
        Suffix::Dim(inner.parse().ok()?)
    };
    *base = &trimmed[..open];
    Some(suffix)
}

struct Parser<'a> {
    translator: &'a Translator,
    tokens: &'a [Token],
    pos: usize,
    nesting: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    /// Count one more level of nesting; fails past `MAX_NESTING`.
    fn nest(&mut self) -> Option<()> {
        self.nesting += 1;
        (self.nesting <= MAX_NESTING).then_some(())
    }

    fn expect(&mut self, token: Token) -> Option<()> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// type := atom postfix*
    fn parse_type(&mut self) -> Option<TypeExpr> {
        self.nest()?;
        let mut ty = self.parse_atom()?;
        // C array dimensions, outermost first.
        let mut dims: Vec<usize> = Vec::new();

        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.nest()?;
                    ty = flush_dims(ty, &mut dims);
                    if let Some(Token::Number(len)) = self.peek_at(1) {
                        // Output vocabulary: `T * N`.
                        let len = *len;
                        self.pos += 2;
                        ty = TypeExpr::array(ty, len);
                    } else {
                        self.pos += 1;
                        ty = TypeExpr::pointer(ty);
                    }
                }
                Some(Token::Amp) => {
                    self.nest()?;
                    self.pos += 1;
                    ty = TypeExpr::pointer(flush_dims(ty, &mut dims));
                }
                Some(Token::LBracket) => {
                    self.nest()?;
                    self.pos += 1;
                    match self.peek() {
                        Some(Token::Number(len)) => {
                            dims.push(*len);
                            self.pos += 1;
                            self.expect(Token::RBracket)?;
                        }
                        Some(Token::RBracket) => {
                            // Incomplete array decays to a pointer.
                            self.pos += 1;
                            ty = TypeExpr::pointer(flush_dims(ty, &mut dims));
                        }
                        _ => return None,
                    }
                }
                _ => break,
            }
        }

        Some(flush_dims(ty, &mut dims))
    }

    /// atom := 'POINTER' '(' type ')' | '(' type ')' | word+
    fn parse_atom(&mut self) -> Option<TypeExpr> {
        match self.peek()? {
            Token::Ident(word)
                if word == POINTER_WRAPPER && self.peek_at(1) == Some(&Token::LParen) =>
            {
                self.pos += 2;
                let inner = self.parse_type()?;
                self.expect(Token::RParen)?;
                Some(TypeExpr::pointer(inner))
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.parse_type()?;
                self.expect(Token::RParen)?;
                Some(inner)
            }
            Token::Ident(_) => {
                let mut words = Vec::new();
                while let Some(Token::Ident(word)) = self.peek() {
                    words.push(word.clone());
                    self.pos += 1;
                }
                Some(self.translator.normalize_name(&words))
            }
            _ => None,
        }
    }
}

fn flush_dims(mut ty: TypeExpr, dims: &mut Vec<usize>) -> TypeExpr {
    for len in dims.drain(..).rev() {
        ty = TypeExpr::array(ty, len);
    }
    ty
}

/// Translate with the default (OpenVR) configuration.
pub fn translate_type(spelling: &str) -> String {
    Translator::default().translate(spelling)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(spelling: &str) -> String {
        translate_type(spelling)
    }

    #[test]
    fn test_primitives() {
        assert_eq!(t("float"), "c_float");
        assert_eq!(t("double"), "c_double");
        assert_eq!(t("int"), "c_int");
        assert_eq!(t("char"), "c_char");
        assert_eq!(t("unsigned char"), "c_uchar");
        assert_eq!(t("unsigned short"), "c_ushort");
        assert_eq!(t("long long"), "c_longlong");
        assert_eq!(t("unsigned long long"), "c_ulonglong");
    }

    #[test]
    fn test_no_implicit_int() {
        assert_eq!(t("unsigned"), "c_uint");
        assert_eq!(t("unsigned"), t("unsigned int"));
    }

    #[test]
    fn test_fixed_width_integers() {
        assert_eq!(t("uint8_t"), "c_uint8");
        assert_eq!(t("int16_t"), "c_int16");
        assert_eq!(t("uint32_t"), "c_uint32");
        assert_eq!(t("int32_t"), "c_int32");
        assert_eq!(t("uint64_t"), "c_uint64");
        assert_ne!(t("uint32_t"), t("unsigned int"));
        assert_ne!(t("uint32_t"), t("int32_t"));
        assert_ne!(t("unsigned int"), t("int32_t"));
    }

    #[test]
    fn test_width_suffix_is_word_anchored() {
        assert_eq!(t("vr::Foo32_tx"), "Foo32_tx");
        assert_eq!(t("vr::HmdMatrix34_t"), "HmdMatrix34_t");
    }

    #[test]
    fn test_keyword_noise() {
        assert_eq!(t("const float"), "c_float");
        assert_eq!(t("struct vr::VREvent_t"), "VREvent_t");
        assert_eq!(t("enum vr::ETrackedDeviceClass"), "ETrackedDeviceClass");
        assert_eq!(t("union vr::VREvent_Data_t"), "VREvent_Data_t");
        // Whole words only.
        assert_eq!(t("vr::constant_t"), "constant_t");
    }

    #[test]
    fn test_void_and_bool() {
        assert_eq!(t("void"), "None");
        assert_eq!(t("void *"), "c_void_p");
        assert_eq!(t("const void *"), "c_void_p");
        assert_eq!(t("void **"), "POINTER(c_void_p)");
        assert_eq!(t("bool"), "openvr_bool");
        assert_eq!(t("bool *"), "POINTER(openvr_bool)");
    }

    #[test]
    fn test_byte_strings() {
        assert_eq!(t("char *"), "c_char_p");
        assert_eq!(t("const char *"), "c_char_p");
        assert_eq!(t("char*"), "c_char_p");
        assert_eq!(t("char **"), "POINTER(POINTER(c_char))");
        assert_eq!(t("unsigned char *"), "POINTER(c_uchar)");
    }

    #[test]
    fn test_pointers() {
        assert_eq!(t("float *"), "POINTER(c_float)");
        assert_eq!(t("uint32_t *"), "POINTER(c_uint32)");
        assert_eq!(t("vr::TrackedDevicePose_t *"), "POINTER(TrackedDevicePose_t)");
        assert_eq!(t("const vr::HmdMatrix34_t &"), "POINTER(HmdMatrix34_t)");
        assert_eq!(t("vr::IVRSystem **"), "POINTER(POINTER(IVRSystem))");
    }

    #[test]
    fn test_pointer_fixpoint() {
        for n in 0..6 {
            let spelling = format!("int{}", "*".repeat(n));
            let mut expected = "c_int".to_string();
            for _ in 0..n {
                expected = format!("POINTER({})", expected);
            }
            assert_eq!(t(&spelling), expected, "spelling {}", spelling);
        }
    }

    #[test]
    fn test_pointer_typedef_idiom() {
        assert_eq!(t("uintptr_t"), "POINTER(c_uint)");
        assert_eq!(t("intptr_t"), "POINTER(c_int)");
        assert_eq!(t("uintptr_t *"), "POINTER(POINTER(c_uint))");
    }

    #[test]
    fn test_library_prefixes() {
        assert_eq!(t("vr::VR_Foo"), "Foo");
        assert_eq!(t("VR_IVRSystem_FnTable"), "IVRSystem_FnTable");
        assert_eq!(t("IVR_Thing"), "IVR_Thing");
        assert_eq!(t("vr::EVRInitError"), "EVRInitError");
    }

    #[test]
    fn test_arrays() {
        assert_eq!(t("float[3]"), "c_float * 3");
        assert_eq!(t("float [3]"), "c_float * 3");
        assert_eq!(t("float[3][4]"), "(c_float * 4) * 3");
        assert_eq!(t("float[2][3][4]"), "((c_float * 4) * 3) * 2");
        assert_eq!(t("char *[4]"), "POINTER(c_char) * 4");
        assert_eq!(t("vr::HmdVector2_t[3]"), "HmdVector2_t * 3");
    }

    #[test]
    fn test_nested_mode_brackets_arrays() {
        let tr = Translator::default();
        assert_eq!(tr.translate_nested("float[4]"), "(c_float * 4)");
        assert_eq!(tr.translate_nested("float"), "c_float");
    }

    #[test]
    fn test_incomplete_array_decays() {
        assert_eq!(t("float []"), "POINTER(c_float)");
    }

    #[test]
    fn test_idempotent_on_target_forms() {
        for spelling in [
            "float",
            "uint32_t *",
            "void *",
            "void **",
            "char *",
            "char **",
            "bool",
            "float[3][4]",
            "vr::HmdMatrix34_t[2]",
            "uintptr_t",
            "unsigned long long",
            "vr::TrackedDevicePose_t **",
        ] {
            let once = t(spelling);
            assert_eq!(t(&once), once, "spelling {}", spelling);
        }
    }

    #[test]
    fn test_unparseable_spelling_passes_through() {
        assert_eq!(t("void (*)(int)"), "void (*)(int)");
        assert_eq!(t("const foo<int>"), "foo<int>");
        assert_eq!(t(""), "");
    }

    #[test]
    fn test_unparsed_base_keeps_declarator_suffixes() {
        assert_eq!(t("const foo<int> *"), "POINTER(foo<int>)");
        assert_eq!(t("foo<int> &"), "POINTER(foo<int>)");
        assert_eq!(t("foo<int> **"), "POINTER(POINTER(foo<int>))");
        assert_eq!(t("foo<int> [3]"), "foo<int> * 3");
        assert_eq!(t("foo<int>[2][3]"), "(foo<int> * 3) * 2");
        assert_eq!(
            t("std::map<int, float> *[2]"),
            "POINTER(std::map<int, float>) * 2"
        );
        assert_eq!(t("POINTER(foo<int>)"), "POINTER(foo<int>)");
    }

    #[test]
    fn test_deep_nesting_degrades_instead_of_overflowing() {
        let groups = format!("{}int{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(t(&groups), groups);

        let wrappers = format!("{}c_int{}", "POINTER(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(t(&wrappers), wrappers);

        let pointers = format!("int{}", " *".repeat(10_000));
        assert!(t(&pointers).starts_with("int * * *"));

        assert_eq!(t("((float))"), "c_float");
    }

    #[test]
    fn test_parse_structure() {
        let tr = Translator::default();
        assert_eq!(
            tr.parse("float *[2]"),
            TypeExpr::Array(
                Box::new(TypeExpr::Pointer(Box::new(TypeExpr::Named("c_float".to_string())))),
                2
            )
        );
        assert_eq!(tr.parse("float[3]").to_string(), "c_float * 3");
    }

    #[test]
    fn test_custom_namespace() {
        let config = TypesConfig {
            namespace: "ipl::".to_string(),
            strip_prefix: "IPL_".to_string(),
            bool_alias: "ipl_bool".to_string(),
        };
        let tr = Translator::new(&config);
        assert_eq!(tr.translate("ipl::IPL_Vector3 *"), "POINTER(Vector3)");
        assert_eq!(tr.translate("bool"), "ipl_bool");
        assert_eq!(tr.translate("vr::HmdMatrix34_t"), "vr::HmdMatrix34_t");
    }
}
