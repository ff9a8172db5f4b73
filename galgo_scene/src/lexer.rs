use indexmap::IndexMap;

/// Splits a bracketed tag header like
/// `[node name="Player" parent="." groups=["a", "b"]]` into its leading
/// kind word and a `key -> value` map.
///
/// Values surrounded by quotes are unquoted. Everything else (numbers,
/// bracketed arrays, `ExtResource("id")` calls) is kept as raw text; array
/// values in particular are never decomposed into elements.
pub struct HeaderLexer<'a> {
    chars: std::str::Chars<'a>,
    peek: Option<char>,
}

impl<'a> HeaderLexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut chars = src.chars();
        let peek = chars.next();
        Self { chars, peek }
    }

    fn bump(&mut self) -> Option<char> {
        let cur = self.peek;
        self.peek = self.chars.next();
        cur
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek, Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn read_ident(&mut self) -> String {
        let mut s = String::new();
        while matches!(self.peek, Some(c) if c.is_alphanumeric() || c == '_') {
            s.push(self.bump().unwrap());
        }
        s
    }

    /// Reads one value token: a quoted string (returned without the
    /// quotes), or a raw run up to the next top-level whitespace or the
    /// closing `]` of the header. Quote state and bracket/paren depth are
    /// tracked so array and call values survive intact.
    fn read_value(&mut self) -> String {
        if self.peek == Some('"') {
            self.bump();
            let mut s = String::new();
            while let Some(c) = self.bump() {
                if c == '"' {
                    break;
                }
                s.push(c);
            }
            return s;
        }

        let mut s = String::new();
        let mut depth = 0_i32;
        let mut in_quotes = false;
        while let Some(c) = self.peek {
            if in_quotes {
                if c == '"' {
                    in_quotes = false;
                }
            } else {
                match c {
                    '"' => in_quotes = true,
                    '[' | '(' => depth += 1,
                    ']' | ')' if depth > 0 => depth -= 1,
                    ']' => break,
                    c if depth == 0 && c.is_whitespace() => break,
                    _ => {}
                }
            }
            s.push(self.bump().unwrap());
        }
        s
    }

    /// Parses the whole header. Returns `None` when the line is not a
    /// bracketed header at all.
    pub fn parse(mut self) -> Option<(String, IndexMap<String, String>)> {
        self.skip_ws();
        if self.bump() != Some('[') {
            return None;
        }
        self.skip_ws();
        let kind = self.read_ident();
        if kind.is_empty() {
            return None;
        }

        let mut properties = IndexMap::new();
        loop {
            self.skip_ws();
            match self.peek {
                None | Some(']') => break,
                _ => {}
            }
            let key = self.read_ident();
            if key.is_empty() {
                // Not a key=value token; drop the stray character and move on.
                self.bump();
                continue;
            }
            if self.peek != Some('=') {
                continue;
            }
            self.bump();
            let value = self.read_value();
            properties.entry(key).or_insert(value);
        }

        Some((kind, properties))
    }
}
