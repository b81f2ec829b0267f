//! Pull parser: a forward-only cursor over a fixed JSON buffer.

use typed_json_buffers::Reader;
use typed_json_schema::TemplateKind;

use crate::error::CodecError;
use crate::scalars;

/// Shape of the top-level value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Object,
    Array,
}

/// Forward-only scanner over a fixed input buffer.
///
/// Navigation alternates between [`goto_property`](Self::goto_property) and
/// [`goto_value`](Self::goto_value); the typed reads advance past the value
/// they return. Any navigation that would pass the buffer's declared end
/// fails with [`CodecError::UnexpectedEndOfContent`].
pub struct JsonReader<'a> {
    cursor: Reader<'a>,
    start: usize,
    current_property: Option<String>,
}

impl<'a> JsonReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: Reader::new(buf),
            start: 0,
            current_property: None,
        }
    }

    /// Bytes consumed since this reader (or sub-reader) was created.
    pub fn used(&self) -> usize {
        self.cursor.x - self.start
    }

    /// The property name most recently navigated to, for error context.
    pub fn current_property(&self) -> Option<&str> {
        self.current_property.as_deref()
    }

    fn skip_whitespace(&mut self) {
        while let Ok(c) = self.cursor.peek() {
            match c {
                b' ' | b'\t' | b'\n' | b'\r' => self.cursor.x += 1,
                _ => break,
            }
        }
    }

    fn invalid(&self) -> CodecError {
        CodecError::InvalidJson {
            offset: self.cursor.x,
        }
    }

    /// Skips leading whitespace and reports whether the top-level value is
    /// an object or an array, without consuming its opening byte.
    pub fn locate_first_token(&mut self) -> Result<RootKind, CodecError> {
        self.skip_whitespace();
        match self.cursor.peek()? {
            b'{' => Ok(RootKind::Object),
            b'[' => Ok(RootKind::Array),
            _ => Err(self.invalid()),
        }
    }

    /// Consumes one expected byte.
    pub fn expect(&mut self, byte: u8) -> Result<(), CodecError> {
        if self.cursor.peek()? != byte {
            return Err(self.invalid());
        }
        self.cursor.skip(1)?;
        Ok(())
    }

    /// Advances past separators and whitespace to the next property name,
    /// or detects the closing `}` and reports no more properties.
    pub fn goto_property(&mut self) -> Result<Option<String>, CodecError> {
        self.skip_whitespace();
        while self.cursor.peek()? == b',' {
            self.cursor.skip(1)?;
            self.skip_whitespace();
        }
        match self.cursor.peek()? {
            b'}' => {
                self.cursor.skip(1)?;
                self.current_property = None;
                Ok(None)
            }
            b'"' => {
                let (name, consumed) = scalars::parse_string(self.cursor.tail())?;
                self.cursor.skip(consumed)?;
                let name = name.unwrap_or_default();
                self.current_property = Some(name.clone());
                Ok(Some(name))
            }
            _ => Err(self.invalid()),
        }
    }

    /// Advances past the `:` separator and whitespace to the value's first
    /// byte.
    pub fn goto_value(&mut self) -> Result<(), CodecError> {
        self.skip_whitespace();
        self.expect(b':')?;
        self.skip_whitespace();
        Ok(())
    }

    // ----------------------------------------------------------------
    // Typed reads

    fn mismatch(&self, expected: TemplateKind) -> CodecError {
        let tail = self.cursor.tail();
        let raw = if tail.first() == Some(&b'"') {
            match scalars::size_to_string_end(&tail[1..]) {
                Ok((size, _)) => &tail[..size + 2],
                Err(_) => tail,
            }
        } else {
            &tail[..scalars::size_to_delimiter_or_end(tail)]
        };
        CodecError::WrongValueType {
            property: self.current_property.clone().unwrap_or_default(),
            expected,
            value: String::from_utf8_lossy(raw).into_owned(),
        }
    }

    fn advance<T>(
        &mut self,
        expected: TemplateKind,
        parsed: Result<(T, usize), CodecError>,
    ) -> Result<T, CodecError> {
        match parsed {
            Ok((value, consumed)) => {
                self.cursor.skip(consumed)?;
                Ok(value)
            }
            Err(CodecError::UnexpectedEndOfContent) => Err(CodecError::UnexpectedEndOfContent),
            Err(_) => Err(self.mismatch(expected)),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        let parsed = scalars::parse_bool(self.cursor.tail());
        self.advance(TemplateKind::Bool, parsed)
    }

    pub fn read_long(&mut self) -> Result<i64, CodecError> {
        let parsed = scalars::parse_long(self.cursor.tail());
        self.advance(TemplateKind::Long, parsed)
    }

    pub fn read_double(&mut self) -> Result<f64, CodecError> {
        let parsed = scalars::parse_double(self.cursor.tail());
        self.advance(TemplateKind::Double, parsed)
    }

    pub fn read_decimal(&mut self) -> Result<rust_decimal::Decimal, CodecError> {
        let parsed = scalars::parse_decimal(self.cursor.tail());
        self.advance(TemplateKind::Decimal, parsed)
    }

    pub fn read_string(&mut self) -> Result<Option<String>, CodecError> {
        let parsed = scalars::parse_string(self.cursor.tail());
        self.advance(TemplateKind::String, parsed)
    }

    /// Triggers are write-only; on the wire only the `null` token is a
    /// valid incoming value for them.
    pub fn read_trigger(&mut self) -> Result<(), CodecError> {
        let parsed = scalars::scan_scalar_token(self.cursor.tail());
        match parsed {
            Ok((token, consumed)) if scalars::is_null_token(token) => {
                self.cursor.skip(consumed)?;
                Ok(())
            }
            Ok(_) => Err(self.mismatch(TemplateKind::Trigger)),
            Err(e) => Err(e),
        }
    }

    // ----------------------------------------------------------------
    // Structural skip

    /// Skips one value of any shape: strings by delimiter scan honoring
    /// escapes, objects and arrays structurally, scalars by delimiter scan.
    pub fn skip_value(&mut self) -> Result<(), CodecError> {
        self.skip_whitespace();
        match self.cursor.peek()? {
            b'"' => {
                self.cursor.skip(1)?;
                let (size, _) = scalars::size_to_string_end(self.cursor.tail())?;
                self.cursor.skip(size + 1)?;
            }
            b'{' | b'[' => self.skip_structure()?,
            _ => {
                let size = scalars::size_to_delimiter_or_end(self.cursor.tail());
                if size == 0 {
                    return Err(self.invalid());
                }
                self.cursor.skip(size)?;
            }
        }
        Ok(())
    }

    fn skip_structure(&mut self) -> Result<(), CodecError> {
        let mut depth = 0usize;
        loop {
            match self.cursor.u8()? {
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                b'"' => {
                    let (size, _) = scalars::size_to_string_end(self.cursor.tail())?;
                    self.cursor.skip(size + 1)?;
                }
                _ => {}
            }
        }
    }

    // ----------------------------------------------------------------
    // Bounded array iteration

    /// A child reader over the unread remainder, for parsing one array
    /// element without pre-scanning the whole array. Advance this reader
    /// past the element afterwards with [`skip`](Self::skip).
    pub fn create_sub_reader(&self) -> JsonReader<'a> {
        JsonReader {
            cursor: Reader::from_slice(self.cursor.uint8, self.cursor.x, self.cursor.end),
            start: self.cursor.x,
            current_property: None,
        }
    }

    /// Advances the cursor by `n` bytes (used to consume a sub-reader's
    /// element).
    pub fn skip(&mut self, n: usize) -> Result<(), CodecError> {
        self.cursor.skip(n)?;
        Ok(())
    }

    /// Positions on the next `{` of an array body, consuming separators on
    /// the way. Returns `false` when the closing `]` was consumed instead.
    /// The cursor must be just past the `[` or a previous element.
    pub fn goto_next_object(&mut self) -> Result<bool, CodecError> {
        self.skip_whitespace();
        loop {
            match self.cursor.peek()? {
                b',' => {
                    self.cursor.skip(1)?;
                    self.skip_whitespace();
                }
                b']' => {
                    self.cursor.skip(1)?;
                    return Ok(false);
                }
                b'{' => return Ok(true),
                _ => return Err(self.invalid()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_navigation() {
        let input = br#" {"a": 1, "b": "x"} "#;
        let mut reader = JsonReader::new(input);
        assert_eq!(reader.locate_first_token().unwrap(), RootKind::Object);
        reader.expect(b'{').unwrap();

        assert_eq!(reader.goto_property().unwrap().as_deref(), Some("a"));
        reader.goto_value().unwrap();
        assert_eq!(reader.read_long().unwrap(), 1);

        assert_eq!(reader.goto_property().unwrap().as_deref(), Some("b"));
        assert_eq!(reader.current_property(), Some("b"));
        reader.goto_value().unwrap();
        assert_eq!(reader.read_string().unwrap().as_deref(), Some("x"));

        assert_eq!(reader.goto_property().unwrap(), None);
    }

    #[test]
    fn type_mismatch_carries_context() {
        let input = br#"{"Age": "abc"}"#;
        let mut reader = JsonReader::new(input);
        reader.expect(b'{').unwrap();
        reader.goto_property().unwrap();
        reader.goto_value().unwrap();
        let err = reader.read_long().unwrap_err();
        assert_eq!(
            err,
            CodecError::WrongValueType {
                property: "Age".to_owned(),
                expected: TemplateKind::Long,
                value: "\"abc\"".to_owned(),
            }
        );
    }

    #[test]
    fn skip_value_all_shapes() {
        let input = br#"{"a":[1,{"x":"}"},3],"b":2}"#;
        let mut reader = JsonReader::new(input);
        reader.expect(b'{').unwrap();
        reader.goto_property().unwrap();
        reader.goto_value().unwrap();
        reader.skip_value().unwrap();
        assert_eq!(reader.goto_property().unwrap().as_deref(), Some("b"));
        reader.goto_value().unwrap();
        assert_eq!(reader.read_long().unwrap(), 2);
        assert_eq!(reader.goto_property().unwrap(), None);
    }

    #[test]
    fn bounded_array_iteration() {
        let input = br#"[ {"n":1} , {"n":2} ]"#;
        let mut reader = JsonReader::new(input);
        assert_eq!(reader.locate_first_token().unwrap(), RootKind::Array);
        reader.expect(b'[').unwrap();

        let mut seen = Vec::new();
        while reader.goto_next_object().unwrap() {
            let mut sub = reader.create_sub_reader();
            sub.expect(b'{').unwrap();
            sub.goto_property().unwrap();
            sub.goto_value().unwrap();
            seen.push(sub.read_long().unwrap());
            assert_eq!(sub.goto_property().unwrap(), None);
            reader.skip(sub.used()).unwrap();
        }
        assert_eq!(seen, [1, 2]);
    }

    #[test]
    fn truncated_input_fails_fatally() {
        let mut reader = JsonReader::new(br#"{"a": "#);
        reader.expect(b'{').unwrap();
        reader.goto_property().unwrap();
        assert_eq!(
            reader.goto_value().and_then(|_| reader.read_long()),
            Err(CodecError::UnexpectedEndOfContent)
        );

        let mut reader = JsonReader::new(br#"{"a":[1,2"#);
        reader.expect(b'{').unwrap();
        reader.goto_property().unwrap();
        reader.goto_value().unwrap();
        assert_eq!(
            reader.skip_value(),
            Err(CodecError::UnexpectedEndOfContent)
        );
    }

    #[test]
    fn empty_input_is_structural_error() {
        let mut reader = JsonReader::new(b"   ");
        assert_eq!(
            reader.locate_first_token(),
            Err(CodecError::UnexpectedEndOfContent)
        );
    }
}
