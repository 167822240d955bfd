//! printf-style command templates.
//!
//! Specifier grammar: `%[index$][-][width][.precision]conversion`, where the
//! conversion is `s`, `S` (upper-cased), `%`, or `n`. Precision truncates the
//! argument to that many characters, then width pads it with spaces (on the
//! right when `-` is given). Explicit indices are 1-based and do not advance
//! the ordinal counter. Unused arguments are ignored.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("format specifier references missing argument {position}")]
    MissingArgument { position: usize },
    #[error("unknown format conversion '{0}'")]
    UnknownConversion(char),
    #[error("malformed format specifier {0}")]
    Malformed(String),
    #[error("format string ends with a dangling '%'")]
    Dangling,
}

/// Everything between `%` and the conversion character.
#[derive(Debug, Default)]
struct Spec {
    index: Option<usize>,
    left_justify: bool,
    width: Option<usize>,
    precision: Option<usize>,
    /// Source text consumed so far, for error messages.
    raw: String,
}

impl Spec {
    fn parse(chars: &mut Peekable<Chars<'_>>) -> Result<Self, FormatError> {
        let mut spec = Spec {
            raw: String::from("%"),
            ..Spec::default()
        };

        let mut digits = spec.take_digits(chars);
        if !digits.is_empty() && chars.next_if_eq(&'$').is_some() {
            spec.raw.push('$');
            match digits.parse::<usize>() {
                Ok(n) if n > 0 => spec.index = Some(n - 1),
                _ => return Err(FormatError::Malformed(spec.raw)),
            }
            digits.clear();
        }
        if digits.is_empty() {
            if chars.next_if_eq(&'-').is_some() {
                spec.raw.push('-');
                spec.left_justify = true;
            }
            digits = spec.take_digits(chars);
        }
        if !digits.is_empty() {
            // A leading zero is the zero-padding flag, which strings reject.
            if digits.starts_with('0') {
                return Err(FormatError::Malformed(spec.raw));
            }
            spec.width = Some(spec.number(&digits)?);
        }
        if chars.next_if_eq(&'.').is_some() {
            spec.raw.push('.');
            let digits = spec.take_digits(chars);
            if digits.is_empty() {
                return Err(FormatError::Malformed(spec.raw));
            }
            spec.precision = Some(spec.number(&digits)?);
        }
        if spec.left_justify && spec.width.is_none() {
            return Err(FormatError::Malformed(spec.raw));
        }
        Ok(spec)
    }

    fn take_digits(&mut self, chars: &mut Peekable<Chars<'_>>) -> String {
        let mut digits = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            digits.push(d);
        }
        self.raw.push_str(&digits);
        digits
    }

    fn number(&self, digits: &str) -> Result<usize, FormatError> {
        digits
            .parse()
            .map_err(|_| FormatError::Malformed(self.raw.clone()))
    }

    fn is_bare(&self) -> bool {
        self.index.is_none()
            && !self.left_justify
            && self.width.is_none()
            && self.precision.is_none()
    }

    fn render(&self, arg: &str, upper: bool) -> String {
        let text: String = match self.precision {
            Some(precision) => arg.chars().take(precision).collect(),
            None => arg.to_string(),
        };
        let text = if upper { text.to_uppercase() } else { text };
        self.pad(text)
    }

    fn pad(&self, text: String) -> String {
        let len = text.chars().count();
        match self.width {
            Some(width) if width > len => {
                let fill = " ".repeat(width - len);
                if self.left_justify {
                    text + &fill
                } else {
                    fill + &text
                }
            }
            _ => text,
        }
    }
}

/// Substitute `args` into `template`.
pub fn format_template(template: &str, args: &[String]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut ordinal = 0usize;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let spec = Spec::parse(&mut chars)?;
        let Some(conversion) = chars.next() else {
            return Err(FormatError::Dangling);
        };
        match conversion {
            's' | 'S' => {
                let index = spec.index.unwrap_or_else(|| {
                    ordinal += 1;
                    ordinal - 1
                });
                let arg = args
                    .get(index)
                    .ok_or(FormatError::MissingArgument { position: index + 1 })?;
                out.push_str(&spec.render(arg, conversion == 'S'));
            }
            '%' if spec.index.is_none() && spec.precision.is_none() => {
                out.push_str(&spec.pad("%".to_string()));
            }
            'n' if spec.is_bare() => out.push('\n'),
            '%' | 'n' => return Err(FormatError::Malformed(format!("{}{conversion}", spec.raw))),
            other => return Err(FormatError::UnknownConversion(other)),
        }
    }

    Ok(out)
}
