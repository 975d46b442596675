//! External scanner: HTML tag names, implicit end tags, raw text, comments
//! and Mustache section names.
//!
//! The scanner keeps two stacks, open HTML elements and open Mustache
//! sections. Start tag names push, matching end tag names pop, and
//! mismatched end tags come back as the grammar's erroneous tokens so the
//! tree stays well formed.

use stache_lib::{ExternalScanner, ScanCursor};

use super::tag::{Tag, TagKind};

/// Serialized scanner state never reaches this many bytes.
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

/// Two `u16` counts in front of the Mustache names.
const MUSTACHE_HEADER: usize = 4;

/// External tokens, in the grammar's `externals` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
enum Token {
    StartTagName,
    ScriptStartTagName,
    StyleStartTagName,
    EndTagName,
    ErroneousEndTagName,
    SelfClosingTagDelimiter,
    ImplicitEndTag,
    RawText,
    Comment,
    MustacheStartTagName,
    MustacheEndTagName,
    MustacheErroneousEndTagName,
    MustacheIdentifierContent,
}

struct Valid<'a>(&'a [bool]);

impl Valid<'_> {
    fn has(&self, token: Token) -> bool {
        self.0.get(token as usize).copied().unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct Scanner {
    pub(super) tags: Vec<Tag>,
    pub(super) mustache_tags: Vec<String>,
}

impl ExternalScanner for Scanner {
    fn scan(&mut self, cursor: &mut ScanCursor<'_>, valid: &[bool]) -> Option<usize> {
        self.scan_token(cursor, &Valid(valid))
            .map(|token| token as usize)
    }

    fn serialize(&self, buf: &mut Vec<u8>) {
        let limit = buf.len() + SERIALIZATION_BUFFER_SIZE;

        let header = buf.len();
        buf.extend_from_slice(&[0; 4]);
        let total = self.tags.len().min(u16::MAX as usize);
        let mut written = 0;
        for tag in &self.tags[..total] {
            let name = truncated(&tag.name);
            let needed = match tag.kind {
                TagKind::Custom => 2 + name.len(),
                _ => 1,
            };
            if buf.len() + needed + MUSTACHE_HEADER >= limit {
                break;
            }
            buf.push(tag.kind.code());
            if tag.kind == TagKind::Custom {
                buf.push(name.len() as u8);
                buf.extend_from_slice(name.as_bytes());
            }
            written += 1;
        }
        put_u16(buf, header, written);
        put_u16(buf, header + 2, total);

        let header = buf.len();
        buf.extend_from_slice(&[0; 4]);
        let total = self.mustache_tags.len().min(u16::MAX as usize);
        let mut written = 0;
        for name in &self.mustache_tags[..total] {
            let name = truncated(name);
            if buf.len() + 1 + name.len() >= limit {
                break;
            }
            buf.push(name.len() as u8);
            buf.extend_from_slice(name.as_bytes());
            written += 1;
        }
        put_u16(buf, header, written);
        put_u16(buf, header + 2, total);
    }

    fn deserialize(&mut self, data: &[u8]) {
        self.tags.clear();
        self.mustache_tags.clear();

        let mut reader = Reader { data, pos: 0 };
        if self.read_tags(&mut reader).is_none() {
            return;
        }
        self.read_mustache_tags(&mut reader);
    }
}

impl Scanner {
    fn scan_token(&mut self, cursor: &mut ScanCursor<'_>, valid: &Valid<'_>) -> Option<Token> {
        if valid.has(Token::RawText)
            && !valid.has(Token::StartTagName)
            && !valid.has(Token::EndTagName)
        {
            return self.scan_raw_text(cursor);
        }

        while cursor.lookahead().is_whitespace() {
            cursor.skip();
        }

        if valid.has(Token::MustacheIdentifierContent) {
            return scan_mustache_identifier_content(cursor);
        }
        if valid.has(Token::MustacheStartTagName) {
            return self.scan_mustache_start_tag_name(cursor);
        }
        if valid.has(Token::MustacheEndTagName) || valid.has(Token::MustacheErroneousEndTagName) {
            return self.scan_mustache_end_tag_name(cursor);
        }

        match cursor.lookahead() {
            '<' => {
                cursor.mark_end();
                cursor.advance();
                if cursor.lookahead() == '!' {
                    cursor.advance();
                    return scan_comment(cursor);
                }
                if valid.has(Token::ImplicitEndTag) {
                    return self.scan_implicit_end_tag(cursor);
                }
                None
            }
            '\0' => {
                if valid.has(Token::ImplicitEndTag) {
                    return self.scan_implicit_end_tag(cursor);
                }
                None
            }
            '/' => {
                if valid.has(Token::SelfClosingTagDelimiter) {
                    return self.scan_self_closing_tag_delimiter(cursor);
                }
                None
            }
            _ if valid.has(Token::RawText) => None,
            _ if valid.has(Token::StartTagName) => self.scan_start_tag_name(cursor),
            _ if valid.has(Token::EndTagName) || valid.has(Token::ErroneousEndTagName) => {
                self.scan_end_tag_name(cursor)
            }
            _ => None,
        }
    }

    /// Everything up to `</script` or `</style` (any case). May be empty.
    fn scan_raw_text(&mut self, cursor: &mut ScanCursor<'_>) -> Option<Token> {
        let delimiter: &[u8] = match self.tags.last()?.kind {
            TagKind::Script => b"</SCRIPT",
            _ => b"</STYLE",
        };

        cursor.mark_end();
        let mut matched = 0;
        loop {
            let c = cursor.lookahead();
            if c == '\0' {
                break;
            }
            if c.to_ascii_uppercase() == char::from(delimiter[matched]) {
                matched += 1;
                if matched == delimiter.len() {
                    break;
                }
                cursor.advance();
            } else {
                matched = 0;
                cursor.advance();
                cursor.mark_end();
            }
        }

        Some(Token::RawText)
    }

    fn scan_implicit_end_tag(&mut self, cursor: &mut ScanCursor<'_>) -> Option<Token> {
        let is_closing_tag = cursor.lookahead() == '/';
        if is_closing_tag {
            cursor.advance();
        } else if self.tags.last().is_some_and(Tag::is_void) {
            return Some(self.pop_implicit());
        }

        let name = scan_tag_name(cursor);
        if name.is_empty() && !cursor.eof() {
            return None;
        }
        let next = Tag::for_name(name);

        if is_closing_tag {
            if self.tags.last() == Some(&next) {
                return None;
            }
            // A deeper element is being closed: close the ones above it first.
            if self.tags.iter().any(|tag| tag.kind == next.kind) {
                return Some(self.pop_implicit());
            }
        } else if let Some(parent) = self.tags.last() {
            let at_document_end =
                matches!(parent.kind, TagKind::Html | TagKind::Head | TagKind::Body) && cursor.eof();
            if !parent.can_contain(&next) || at_document_end {
                return Some(self.pop_implicit());
            }
        }

        None
    }

    fn pop_implicit(&mut self) -> Token {
        if let Some(tag) = self.tags.pop() {
            tracing::trace!(kind = ?tag.kind, name = %tag.name, "implicit end tag");
        }
        Token::ImplicitEndTag
    }

    fn scan_start_tag_name(&mut self, cursor: &mut ScanCursor<'_>) -> Option<Token> {
        let name = scan_tag_name(cursor);
        if name.is_empty() {
            return None;
        }

        let tag = Tag::for_name(name);
        let token = match tag.kind {
            TagKind::Script => Token::ScriptStartTagName,
            TagKind::Style => Token::StyleStartTagName,
            _ => Token::StartTagName,
        };
        self.tags.push(tag);
        Some(token)
    }

    fn scan_end_tag_name(&mut self, cursor: &mut ScanCursor<'_>) -> Option<Token> {
        let name = scan_tag_name(cursor);
        if name.is_empty() {
            return None;
        }

        let tag = Tag::for_name(name);
        if self.tags.last() == Some(&tag) {
            self.tags.pop();
            Some(Token::EndTagName)
        } else {
            Some(Token::ErroneousEndTagName)
        }
    }

    fn scan_self_closing_tag_delimiter(&mut self, cursor: &mut ScanCursor<'_>) -> Option<Token> {
        cursor.advance();
        if cursor.lookahead() != '>' {
            return None;
        }
        cursor.advance();
        self.tags.pop();
        Some(Token::SelfClosingTagDelimiter)
    }

    fn scan_mustache_start_tag_name(&mut self, cursor: &mut ScanCursor<'_>) -> Option<Token> {
        let name = scan_mustache_tag_name(cursor);
        if name.is_empty() {
            return None;
        }
        self.mustache_tags.push(name);
        Some(Token::MustacheStartTagName)
    }

    fn scan_mustache_end_tag_name(&mut self, cursor: &mut ScanCursor<'_>) -> Option<Token> {
        let name = scan_mustache_tag_name(cursor);
        if name.is_empty() {
            return None;
        }

        if self.mustache_tags.last() == Some(&name) {
            self.mustache_tags.pop();
            Some(Token::MustacheEndTagName)
        } else {
            Some(Token::MustacheErroneousEndTagName)
        }
    }

    fn read_tags(&mut self, reader: &mut Reader<'_>) -> Option<()> {
        let written = reader.u16()?;
        let total = reader.u16()? as usize;
        self.tags.reserve(total);
        for _ in 0..written {
            let kind = TagKind::from_code(reader.u8()?);
            let tag = match kind {
                TagKind::Custom => {
                    let len = reader.u8()? as usize;
                    Tag {
                        kind,
                        name: String::from_utf8_lossy(reader.bytes(len)?).into_owned(),
                    }
                }
                _ => Tag::new(kind),
            };
            self.tags.push(tag);
        }
        // Tags that did not fit are remembered as placeholders.
        self.tags.resize(total.max(self.tags.len()), Tag::default());
        Some(())
    }

    fn read_mustache_tags(&mut self, reader: &mut Reader<'_>) -> Option<()> {
        let written = reader.u16()?;
        let total = reader.u16()? as usize;
        self.mustache_tags.reserve(total);
        for _ in 0..written {
            let len = reader.u8()? as usize;
            let name = String::from_utf8_lossy(reader.bytes(len)?).into_owned();
            self.mustache_tags.push(name);
        }
        self.mustache_tags
            .resize(total.max(self.mustache_tags.len()), String::new());
        Some(())
    }
}

/// Upper-cased run of alphanumerics, `-` and `:`.
fn scan_tag_name(cursor: &mut ScanCursor<'_>) -> String {
    let mut name = String::new();
    loop {
        let c = cursor.lookahead();
        if !(c.is_alphanumeric() || c == '-' || c == ':') {
            return name;
        }
        name.extend(c.to_uppercase());
        cursor.advance();
    }
}

/// Section name, up to `}` or whitespace. Case-sensitive.
fn scan_mustache_tag_name(cursor: &mut ScanCursor<'_>) -> String {
    let mut name = String::new();
    loop {
        let c = cursor.lookahead();
        if c == '}' || c.is_whitespace() || cursor.eof() {
            return name;
        }
        name.push(c);
        cursor.advance();
    }
}

/// One segment of a Mustache path: up to `}`, `.` or whitespace.
/// Running into end of input is not an identifier.
fn scan_mustache_identifier_content(cursor: &mut ScanCursor<'_>) -> Option<Token> {
    let mut has_content = false;
    loop {
        let c = cursor.lookahead();
        if c == '}' || c == '.' || c.is_whitespace() {
            break;
        }
        if cursor.eof() {
            return None;
        }
        has_content = true;
        cursor.advance();
    }
    has_content.then_some(Token::MustacheIdentifierContent)
}

/// The rest of `<!-- ... -->`, called after `<!`.
fn scan_comment(cursor: &mut ScanCursor<'_>) -> Option<Token> {
    for _ in 0..2 {
        if cursor.lookahead() != '-' {
            return None;
        }
        cursor.advance();
    }

    let mut dashes = 0;
    loop {
        match cursor.lookahead() {
            '\0' => return None,
            '-' => dashes += 1,
            '>' if dashes >= 2 => {
                cursor.advance();
                cursor.mark_end();
                return Some(Token::Comment);
            }
            _ => dashes = 0,
        }
        cursor.advance();
    }
}

/// At most 255 bytes, cut on a character boundary.
fn truncated(name: &str) -> &str {
    let mut len = name.len().min(u8::MAX as usize);
    while !name.is_char_boundary(len) {
        len -= 1;
    }
    &name[..len]
}

fn put_u16(buf: &mut [u8], at: usize, value: usize) {
    buf[at..at + 2].copy_from_slice(&(value as u16).to_le_bytes());
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos + len)?;
        self.pos += len;
        Some(bytes)
    }

    fn u8(&mut self) -> Option<u8> {
        self.bytes(1).map(|b| b[0])
    }

    fn u16(&mut self) -> Option<u16> {
        self.bytes(2).map(|b| u16::from_le_bytes([b[0], b[1]]))
    }
}
