// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Conversion of terminal escape sequences into inline HTML.
//!
//! SGR sequences (`ESC [ ... m`) become `<b>`, `<i>`, `<u>`, `<strike>` and
//! styled `<span>` tags. Every other escape sequence is dropped. Tags are always
//! emitted properly nested and all of them are closed at the end of the text.

use std::fmt::Write;
use std::sync::OnceLock;

use regex::Regex;

// Classic 16 color terminal palette
const PALETTE: [&str; 16] = [
    "#000", "#A00", "#0A0", "#A50", "#00A", "#A0A", "#0AA", "#AAA", "#555", "#F55", "#5F5",
    "#FF5", "#55F", "#F5F", "#5FF", "#FFF",
];

// Channel intensities of the 6x6x6 color cube (indices 16..=231)
const CUBE_LEVELS: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnsiError {
    #[error("invalid SGR parameter {0:?}")]
    InvalidParameter(String),
    #[error("invalid extended color {0:?}")]
    InvalidExtendedColor(String),
}

#[allow(clippy::expect_used)]
fn escape_sequence() -> &'static Regex {
    static ESCAPE_SEQUENCE: OnceLock<Regex> = OnceLock::new();
    ESCAPE_SEQUENCE.get_or_init(|| {
        // CSI sequences capture their parameters and final byte; OSC, charset
        // selection and stray ESC bytes only need to be recognised
        Regex::new(r"\x1b\[([0-9;?:]*)([@-~])|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[()][0-9A-Za-z]|\x1b")
            .expect("escape sequence pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tag {
    Bold,
    Faint,
    Italic,
    Underline,
    Strike,
    Foreground(String),
    Background(String),
}

impl Tag {
    fn open(&self, out: &mut String) {
        match self {
            Tag::Bold => out.push_str("<b>"),
            Tag::Faint => out.push_str("<span style=\"opacity:0.5\">"),
            Tag::Italic => out.push_str("<i>"),
            Tag::Underline => out.push_str("<u>"),
            Tag::Strike => out.push_str("<strike>"),
            Tag::Foreground(color) => {
                let _ = write!(out, "<span style=\"color:{color}\">");
            }
            Tag::Background(color) => {
                let _ = write!(out, "<span style=\"background-color:{color}\">");
            }
        }
    }

    fn close(&self, out: &mut String) {
        out.push_str(match self {
            Tag::Bold => "</b>",
            Tag::Italic => "</i>",
            Tag::Underline => "</u>",
            Tag::Strike => "</strike>",
            Tag::Faint | Tag::Foreground(_) | Tag::Background(_) => "</span>",
        });
    }

    fn same_kind(&self, other: &Tag) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[derive(Debug, Default)]
struct Styler {
    out: String,
    open: Vec<Tag>,
}

impl Styler {
    fn push(&mut self, tag: Tag) {
        if let Some(existing) = self.open.iter().find(|open| open.same_kind(&tag)) {
            if *existing == tag {
                return;
            }
            let existing = existing.clone();
            self.close_kind(&existing);
        }
        tag.open(&mut self.out);
        self.open.push(tag);
    }

    /// Closes the innermost tag of the same kind, reopening anything above it.
    fn close_kind(&mut self, kind: &Tag) {
        let Some(index) = self.open.iter().rposition(|open| open.same_kind(kind)) else {
            return;
        };
        let reopen = self.open.split_off(index + 1);
        for tag in reopen.iter().rev() {
            tag.close(&mut self.out);
        }
        if let Some(tag) = self.open.pop() {
            tag.close(&mut self.out);
        }
        for tag in reopen {
            tag.open(&mut self.out);
            self.open.push(tag);
        }
    }

    fn reset(&mut self) {
        while let Some(tag) = self.open.pop() {
            tag.close(&mut self.out);
        }
    }

    fn apply_sgr(&mut self, params: &str) -> Result<(), AnsiError> {
        let codes = params
            .split([';', ':'])
            .map(|code| match code.parse::<u16>() {
                _ if code.is_empty() => Ok(0),
                Ok(value) => Ok(value),
                // Too large to be any known code; ignored like other unknown codes.
                Err(_) if code.bytes().all(|b| b.is_ascii_digit()) => Ok(u16::MAX),
                Err(_) => Err(AnsiError::InvalidParameter(params.to_string())),
            })
            .collect::<Result<Vec<u16>, _>>()?;

        let mut codes = codes.into_iter();
        while let Some(code) = codes.next() {
            match code {
                0 => self.reset(),
                1 => self.push(Tag::Bold),
                2 => self.push(Tag::Faint),
                3 => self.push(Tag::Italic),
                4 => self.push(Tag::Underline),
                9 => self.push(Tag::Strike),
                22 => {
                    self.close_kind(&Tag::Bold);
                    self.close_kind(&Tag::Faint);
                }
                23 => self.close_kind(&Tag::Italic),
                24 => self.close_kind(&Tag::Underline),
                29 => self.close_kind(&Tag::Strike),
                30..=37 => self.push(Tag::Foreground(PALETTE[usize::from(code - 30)].into())),
                90..=97 => self.push(Tag::Foreground(PALETTE[usize::from(code - 82)].into())),
                40..=47 => self.push(Tag::Background(PALETTE[usize::from(code - 40)].into())),
                100..=107 => self.push(Tag::Background(PALETTE[usize::from(code - 92)].into())),
                38 => {
                    let color = extended_color(&mut codes, params)?;
                    self.push(Tag::Foreground(color));
                }
                48 => {
                    let color = extended_color(&mut codes, params)?;
                    self.push(Tag::Background(color));
                }
                39 => self.close_kind(&Tag::Foreground(String::new())),
                49 => self.close_kind(&Tag::Background(String::new())),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Reads the `5;n` or `2;r;g;b` tail of a 38/48 sequence.
fn extended_color<I>(codes: &mut I, params: &str) -> Result<String, AnsiError>
where
    I: Iterator<Item = u16>,
{
    match codes.next() {
        Some(5) => Ok(indexed_color(color_channel(codes, params)?)),
        Some(2) => {
            let r = color_channel(codes, params)?;
            let g = color_channel(codes, params)?;
            let b = color_channel(codes, params)?;
            Ok(format!("#{r:02x}{g:02x}{b:02x}"))
        }
        _ => Err(AnsiError::InvalidExtendedColor(params.to_string())),
    }
}

fn color_channel<I>(codes: &mut I, params: &str) -> Result<u8, AnsiError>
where
    I: Iterator<Item = u16>,
{
    codes
        .next()
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| AnsiError::InvalidExtendedColor(params.to_string()))
}

fn indexed_color(index: u8) -> String {
    match index {
        0..=15 => PALETTE[usize::from(index)].to_string(),
        16..=231 => {
            let cube = index - 16;
            let r = CUBE_LEVELS[usize::from(cube / 36)];
            let g = CUBE_LEVELS[usize::from((cube % 36) / 6)];
            let b = CUBE_LEVELS[usize::from(cube % 6)];
            format!("#{r:02x}{g:02x}{b:02x}")
        }
        232..=255 => {
            let grey = 8 + (index - 232) * 10;
            format!("#{grey:02x}{grey:02x}{grey:02x}")
        }
    }
}

fn push_text(out: &mut String, text: &str, escape_html: bool) {
    if !escape_html {
        out.push_str(text);
        return;
    }
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
}

/// Converts terminal styled text into HTML markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiConverter {
    escape_html: bool,
}

impl AnsiConverter {
    pub fn new(escape_html: bool) -> Self {
        Self { escape_html }
    }

    pub fn to_html(&self, text: &str) -> Result<String, AnsiError> {
        if !text.contains('\x1b') && !self.escape_html {
            return Ok(text.to_string());
        }

        let mut styler = Styler {
            out: String::with_capacity(text.len()),
            open: Vec::new(),
        };
        let mut last = 0;
        for captures in escape_sequence().captures_iter(text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            push_text(&mut styler.out, &text[last..whole.start()], self.escape_html);
            last = whole.end();

            let is_sgr = captures.get(2).map(|m| m.as_str()) == Some("m");
            if let (true, Some(params)) = (is_sgr, captures.get(1)) {
                styler.apply_sgr(params.as_str())?;
            }
        }
        push_text(&mut styler.out, &text[last..], self.escape_html);
        styler.reset();
        Ok(styler.out)
    }
}
