//! The diagnostics object controls the output of errors and warnings the
//! checker front-end produces for the user.
//! It also tracks the number of messages per level for flow control.
//!
//! This implementation is NOT thread-safe.
#![warn(rust_2018_idioms)]

use failure::Fail;
use std::{
    cell::RefCell,
    collections::HashMap,
    io::{self, Write},
};
use termcolor::{Color, ColorSpec, WriteColor};

/// Instead of writing errors directly to stdout, they are collected in this
/// object, which is the single place responsible for formatting them.
pub struct Diagnostics {
    message_count: RefCell<HashMap<MessageLevel, usize>>,
    writer: RefCell<Box<dyn WriteColor>>,
}

/// The text a message refers to, printed below the message with the
/// offending part underlined.
#[derive(Debug, Clone)]
pub struct Snippet<'a> {
    /// Where the text comes from, e.g. `expression #2`.
    pub origin: &'a str,
    pub text: &'a str,
}

impl Diagnostics {
    pub fn new(writer: Box<dyn WriteColor>) -> Self {
        Self {
            writer: RefCell::new(writer),
            message_count: RefCell::new(HashMap::new()),
        }
    }

    /// True when an error message was emitted, false
    /// if only warnings were emitted.
    pub fn errored(&self) -> bool {
        self.count(MessageLevel::Error) > 0
    }

    pub fn count(&self, level: MessageLevel) -> usize {
        self.message_count
            .borrow()
            .get(&level)
            .cloned()
            .unwrap_or(0)
    }

    pub fn write_statistics(&self) {
        let mut writer = self.writer.borrow_mut();
        let mut output = ColorOutput::new(&mut **writer);

        output.set_bold(true);

        if self.errored() {
            output.set_color(MessageLevel::Error.color());
            writeln!(
                output.writer(),
                "Type check aborted due to {}",
                match self.count(MessageLevel::Error) {
                    1 => "an error".to_string(),
                    n => format!("{} errors", n),
                }
            )
            .ok();
        } else {
            output.set_color(Some(Color::Green));
            writeln!(
                output.writer(),
                "Type check finished successfully {}",
                match self.count(MessageLevel::Warning) {
                    0 => "without warnings".to_string(),
                    1 => "with a warning".to_string(),
                    n => format!("with {} warnings", n),
                }
            )
            .ok();
        }
    }

    /// Print a message to the writer given in the `new` constructor.
    /// Most of the time this will be stderr.
    pub fn emit(&self, level: MessageLevel, kind: &dyn Fail, snippet: Option<&Snippet<'_>>) {
        let msg = Message { level, kind };

        let mut writer = self.writer.borrow_mut();
        msg.write_colored(&mut **writer, snippet).ok();
        self.increment_level_count(level);
    }

    pub fn error(&self, kind: &dyn Fail, snippet: Option<&Snippet<'_>>) {
        self.emit(MessageLevel::Error, kind, snippet)
    }

    pub fn warning(&self, kind: &dyn Fail, snippet: Option<&Snippet<'_>>) {
        self.emit(MessageLevel::Warning, kind, snippet)
    }

    fn increment_level_count(&self, level: MessageLevel) {
        let mut message_count = self.message_count.borrow_mut();
        let counter = message_count.entry(level).or_insert(0);
        *counter += 1;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MessageLevel {
    Error,
    Warning,
}

impl MessageLevel {
    fn color(self) -> Option<Color> {
        // Don't be confused by the return type. `None` means default color!
        match self {
            MessageLevel::Error => Some(Color::Red),
            MessageLevel::Warning => Some(Color::Yellow),
        }
    }

    fn name(self) -> &'static str {
        match self {
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
        }
    }
}

struct Message<'a> {
    level: MessageLevel,
    kind: &'a dyn Fail,
}

const HIGHLIGHT: Option<Color> = Some(Color::Blue);

impl Message<'_> {
    fn write_colored(
        &self,
        writer: &mut dyn WriteColor,
        snippet: Option<&Snippet<'_>>,
    ) -> io::Result<()> {
        {
            let mut output = ColorOutput::new(writer);
            output.set_color(self.level.color());
            output.set_bold(true);
            write!(output.writer(), "{}: ", self.level.name())?;

            output.set_color(None);
            writeln!(output.writer(), "{}", self.kind)?;
            for cause in self.kind.iter_causes() {
                writeln!(output.writer(), "  caused by: {}", cause)?;
            }
        }

        if let Some(snippet) = snippet {
            self.write_snippet(writer, snippet)?;
        }
        Ok(())
    }

    fn write_snippet(&self, writer: &mut dyn WriteColor, snippet: &Snippet<'_>) -> io::Result<()> {
        let mut output = ColorOutput::new(writer);

        output.set_color(HIGHLIGHT);
        output.set_bold(true);
        writeln!(output.writer(), "  --> {}", snippet.origin)?;
        writeln!(output.writer(), "   |")?;
        write!(output.writer(), "   | ")?;

        output.set_color(None);
        output.set_bold(false);
        writeln!(output.writer(), "{}", snippet.text)?;

        output.set_color(HIGHLIGHT);
        output.set_bold(true);
        write!(output.writer(), "   | ")?;
        output.set_color(self.level.color());
        writeln!(output.writer(), "{}", "^".repeat(snippet.text.chars().count()))?;
        writeln!(output.writer())
    }
}

/// Calls to functions should pass the raw writer, each function should
/// create its own `ColorOutput` object that is dropped on return. This
/// guarantees correct coloring in nested calls.
struct ColorOutput<'a> {
    writer: &'a mut dyn WriteColor,
    spec: ColorSpec,
}

impl<'a> ColorOutput<'a> {
    fn new(writer: &'a mut dyn WriteColor) -> Self {
        writer.reset().ok();

        Self {
            writer,
            spec: ColorSpec::new(),
        }
    }

    fn set_color(&mut self, color: Option<Color>) {
        // ignore coloring failures using ok()
        self.spec.set_fg(color);
        self.writer.set_color(&self.spec).ok();
    }

    fn set_bold(&mut self, yes: bool) {
        // ignore coloring failures using ok()
        self.spec.set_bold(yes);
        self.writer.set_color(&self.spec).ok();
    }

    fn writer(&mut self) -> &mut dyn WriteColor {
        self.writer
    }
}

/// reset to no color by default. Otherwise code that
/// is not color aware will print everything in the
/// color last used.
impl<'a> Drop for ColorOutput<'a> {
    fn drop(&mut self) {
        // ignore coloring failures using ok()
        self.writer.reset().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use failure::Fail;
    use std::{cell::RefCell, io::Write, rc::Rc};
    use termcolor::Buffer;

    /// A writer whose output stays readable after it was moved into
    /// `Diagnostics`.
    #[derive(Clone)]
    struct SharedBuffer(Rc<RefCell<Buffer>>);

    impl SharedBuffer {
        fn new() -> Self {
            SharedBuffer(Rc::new(RefCell::new(Buffer::no_color())))
        }

        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().as_slice().to_vec()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.0.borrow_mut().flush()
        }
    }

    impl WriteColor for SharedBuffer {
        fn supports_color(&self) -> bool {
            false
        }

        fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
            self.0.borrow_mut().set_color(spec)
        }

        fn reset(&mut self) -> io::Result<()> {
            self.0.borrow_mut().reset()
        }
    }

    #[derive(Debug, Fail)]
    enum TestMessage {
        #[fail(display = "Type {} is not instantiable", ty)]
        NotInstantiable { ty: String },
        #[fail(display = "unused class '{}'", name)]
        Unused { name: String },
    }

    #[test]
    fn counts_messages_per_level() {
        let buffer = SharedBuffer::new();
        let diagnostics = Diagnostics::new(Box::new(buffer.clone()));
        assert!(!diagnostics.errored());

        let unused = TestMessage::Unused {
            name: "Cat".to_string(),
        };
        diagnostics.warning(&unused, None);
        diagnostics.warning(&unused, None);
        assert!(!diagnostics.errored());
        assert_eq!(2, diagnostics.count(MessageLevel::Warning));

        diagnostics.error(
            &TestMessage::NotInstantiable {
                ty: "Shape".to_string(),
            },
            None,
        );
        assert!(diagnostics.errored());
        assert_eq!(1, diagnostics.count(MessageLevel::Error));

        let output = buffer.contents();
        assert!(output.contains("warning: unused class 'Cat'\n"));
        assert!(output.contains("error: Type Shape is not instantiable\n"));
    }

    #[test]
    fn snippet_underlines_whole_text() {
        let buffer = SharedBuffer::new();
        let diagnostics = Diagnostics::new(Box::new(buffer.clone()));

        diagnostics.error(
            &TestMessage::NotInstantiable {
                ty: "Shape".to_string(),
            },
            Some(&Snippet {
                origin: "expression #1",
                text: "new Shape()",
            }),
        );

        let expected = "error: Type Shape is not instantiable
  --> expression #1
   |
   | new Shape()
   | ^^^^^^^^^^^

";
        assert_eq!(expected, buffer.contents());
    }

    #[test]
    fn statistics() {
        let buffer = SharedBuffer::new();
        let diagnostics = Diagnostics::new(Box::new(buffer.clone()));
        diagnostics.write_statistics();
        assert_eq!(
            "Type check finished successfully without warnings\n",
            buffer.contents()
        );

        let buffer = SharedBuffer::new();
        let diagnostics = Diagnostics::new(Box::new(buffer.clone()));
        let msg = TestMessage::NotInstantiable {
            ty: "Shape".to_string(),
        };
        diagnostics.error(&msg, None);
        diagnostics.error(&msg, None);
        diagnostics.write_statistics();
        assert!(buffer
            .contents()
            .ends_with("Type check aborted due to 2 errors\n"));
    }
}
