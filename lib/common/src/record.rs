use std::io::{self, BufRead, Read, Seek, SeekFrom};
use std::str::FromStr;

/// Errors raised while reading line-oriented model files.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("unexpected end of file; expected {expected}")]
    UnexpectedEof { expected: String },
}

/// A single non-blank line of a model file, split into whitespace-separated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number within the source stream.
    pub line: usize,
    text: String,
}

impl Record {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    /// The whole line, trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The first field of the record.
    pub fn keyword(&self) -> &str {
        self.text.split_whitespace().next().unwrap_or("")
    }

    /// Everything after the keyword, trimmed.
    pub fn rest(&self) -> &str {
        let trimmed = self.text.trim_start();
        match trimmed.find(char::is_whitespace) {
            Some(i) => trimmed[i..].trim(),
            None => "",
        }
    }

    pub fn fields(&self) -> std::str::SplitWhitespace<'_> {
        self.text.split_whitespace()
    }

    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    /// Build a parse error pointing at this record.
    pub fn error(&self, reason: impl Into<String>) -> RecordError {
        RecordError::Parse {
            line: self.line,
            reason: reason.into(),
        }
    }

    /// Parse the field at `index`.
    pub fn parse<T: FromStr>(&self, index: usize) -> Result<T, RecordError> {
        let field = self
            .fields()
            .nth(index)
            .ok_or_else(|| self.error(format!("missing field {index}")))?;
        field
            .parse()
            .map_err(|_| self.error(format!("invalid value {field:?} in field {index}")))
    }

    /// Parse exactly `N` fields starting at `skip`; extra fields are an error.
    pub fn values<T: FromStr + Copy + Default, const N: usize>(
        &self,
        skip: usize,
    ) -> Result<[T; N], RecordError> {
        let mut out = [T::default(); N];
        let mut fields = self.fields().skip(skip);
        for (i, slot) in out.iter_mut().enumerate() {
            let field = fields
                .next()
                .ok_or_else(|| self.error(format!("expected {N} values, found {i}")))?;
            *slot = field
                .parse()
                .map_err(|_| self.error(format!("invalid value {field:?}")))?;
        }
        if fields.next().is_some() {
            return Err(self.error(format!("expected {N} values, found more")));
        }
        Ok(out)
    }

    /// Ensure that the keyword of this record is `keyword`.
    pub fn expect_keyword(&self, keyword: &str) -> Result<(), RecordError> {
        if self.keyword() == keyword {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {keyword}, found {:?}",
                self.keyword()
            )))
        }
    }

    /// Parse a `KEYWORD <count>` record.
    pub fn count(&self, keyword: &str) -> Result<usize, RecordError> {
        self.expect_keyword(keyword)?;
        let [n] = self.values::<usize, 1>(1)?;
        Ok(n)
    }
}

/// Pulls [Records](Record) out of a buffered stream, skipping blank lines.
#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
    line: usize,
    peeked: Option<Record>,
    buf: String,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            peeked: None,
            buf: String::new(),
        }
    }

    /// Line number of the last line pulled from the stream.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn pull(&mut self) -> Result<Option<Record>, RecordError> {
        loop {
            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if !text.is_empty() {
                return Ok(Some(Record::new(self.line, text)));
            }
        }
    }

    /// The next record, or `None` at the end of the stream.
    pub fn next_record(&mut self) -> Result<Option<Record>, RecordError> {
        match self.peeked.take() {
            Some(r) => Ok(Some(r)),
            None => self.pull(),
        }
    }

    /// Look at the next record without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Record>, RecordError> {
        if self.peeked.is_none() {
            self.peeked = self.pull()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// The next record; running out of input is an error.
    pub fn require(&mut self, expected: &str) -> Result<Record, RecordError> {
        self.next_record()?
            .ok_or_else(|| RecordError::UnexpectedEof {
                expected: expected.to_owned(),
            })
    }

    /// The next record, which must start with `keyword`.
    pub fn directive(&mut self, keyword: &str) -> Result<Record, RecordError> {
        let rec = self.require(keyword)?;
        rec.expect_keyword(keyword)?;
        Ok(rec)
    }

    /// Consume the next record only if it starts with `keyword`.
    pub fn optional(&mut self, keyword: &str) -> Result<Option<Record>, RecordError> {
        match self.peek()? {
            Some(r) if r.keyword() == keyword => self.next_record(),
            _ => Ok(None),
        }
    }

    /// Read a `KEYWORD <count>` record.
    pub fn count(&mut self, keyword: &str) -> Result<usize, RecordError> {
        self.directive(keyword)?.count(keyword)
    }

    /// Read `count` records of exactly `N` values each.
    pub fn rows<T: FromStr + Copy + Default, const N: usize>(
        &mut self,
        count: usize,
        what: &str,
    ) -> Result<Vec<[T; N]>, RecordError> {
        let mut out = Vec::with_capacity(crate::capacity_hint(count));
        for _ in 0..count {
            out.push(self.require(what)?.values::<T, N>(0)?);
        }
        tracing::trace!(count, what, "read rows");
        Ok(out)
    }

    /// Ensure there is nothing left but whitespace.
    pub fn finish(mut self) -> Result<(), RecordError> {
        match self.next_record()? {
            None => Ok(()),
            Some(r) => Err(r.error(format!("unexpected trailing record {:?}", r.keyword()))),
        }
    }
}

/// Most bytes [probe_first_line] reads before giving up.
pub const PROBE_LIMIT: u64 = 4096;

/// Classify-then-rewind helper: return the first non-blank line of `stream` and restore the
/// stream to the position it had on entry.
///
/// Input that is not valid UTF-8 yields `Ok(None)` rather than an error, so binary files can be
/// probed safely. At most [PROBE_LIMIT] bytes are read; a longer line comes back truncated.
pub fn probe_first_line<R: BufRead + Seek>(stream: &mut R) -> io::Result<Option<String>> {
    let start = stream.stream_position()?;
    let mut found = None;
    let mut buf = String::new();
    let mut limited = (&mut *stream).take(PROBE_LIMIT);
    loop {
        buf.clear();
        match limited.read_line(&mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let text = buf.trim();
                if !text.is_empty() {
                    found = Some(text.to_owned());
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
            Err(e) => {
                stream.seek(SeekFrom::Start(start))?;
                return Err(e);
            }
        }
    }
    stream.seek(SeekFrom::Start(start))?;
    Ok(found)
}
