//! printf-style label formats used by value axes and item labels.
//!
//! Only the first conversion of a format is substituted; the text around it
//! is kept literally (with `%%` collapsing to `%`). A format without a
//! recognised conversion renders verbatim apart from `%%`, so mistakes stay
//! visible. Width and precision are capped at [`MAX_FIELD_WIDTH`].

use serde::{Deserialize, Serialize};

pub const DEFAULT_LABEL_FORMAT: &str = "%.2f";

/// Upper bound for width and precision fields.
pub const MAX_FIELD_WIDTH: usize = 128;

/// Argument class selected by the conversion character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatParam {
    Int,
    UInt,
    Real,
    Unknown,
}

impl FormatParam {
    const fn from_conversion(conversion: char) -> Self {
        match conversion {
            'd' | 'i' | 'c' => Self::Int,
            'u' | 'o' | 'x' | 'X' => Self::UInt,
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => Self::Real,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ConversionSpec {
    left_align: bool,
    force_sign: bool,
    space_sign: bool,
    alternate: bool,
    zero_pad: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

/// Parsed label format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFormat {
    source: String,
    prefix: String,
    spec: Option<ConversionSpec>,
    suffix: String,
}

impl LabelFormat {
    #[must_use]
    pub fn parse(format: &str) -> Self {
        let chars: Vec<char> = format.chars().collect();
        let mut prefix = String::new();
        let mut index = 0;

        while index < chars.len() {
            if chars[index] != '%' {
                prefix.push(chars[index]);
                index += 1;
                continue;
            }
            if chars.get(index + 1) == Some(&'%') {
                prefix.push('%');
                index += 2;
                continue;
            }
            if let Some((spec, consumed)) = parse_conversion(&chars[index + 1..]) {
                let suffix = unescape_percent(&chars[index + 1 + consumed..]);
                return Self {
                    source: format.to_owned(),
                    prefix,
                    spec: Some(spec),
                    suffix,
                };
            }
            prefix.push('%');
            index += 1;
        }

        Self {
            source: format.to_owned(),
            prefix,
            spec: None,
            suffix: String::new(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn param(&self) -> FormatParam {
        self.spec
            .map_or(FormatParam::Unknown, |spec| FormatParam::from_conversion(spec.conversion))
    }

    #[must_use]
    pub fn format(&self, value: f64) -> String {
        let Some(spec) = self.spec else {
            return self.prefix.clone();
        };
        let body = match FormatParam::from_conversion(spec.conversion) {
            FormatParam::Int if spec.conversion == 'c' => format_char(value, spec),
            FormatParam::Int => format_signed(value as i64, spec),
            FormatParam::UInt => format_unsigned(value as u64, spec),
            FormatParam::Real => format_real(value, spec),
            FormatParam::Unknown => return self.source.clone(),
        };
        format!("{}{body}{}", self.prefix, self.suffix)
    }
}

/// Parses flags, width, precision, length modifiers and the conversion
/// character following a `%`. Returns the spec and the number of consumed chars.
fn parse_conversion(chars: &[char]) -> Option<(ConversionSpec, usize)> {
    let mut spec = ConversionSpec::default();
    let mut index = 0;

    while let Some(&flag) = chars.get(index) {
        match flag {
            '-' => spec.left_align = true,
            '+' => spec.force_sign = true,
            ' ' => spec.space_sign = true,
            '#' => spec.alternate = true,
            '0' => spec.zero_pad = true,
            _ => break,
        }
        index += 1;
    }

    let (width, consumed) = parse_number(&chars[index..]);
    spec.width = width.unwrap_or(0).min(MAX_FIELD_WIDTH);
    index += consumed;

    if chars.get(index) == Some(&'.') {
        index += 1;
        let (precision, consumed) = parse_number(&chars[index..]);
        spec.precision = Some(precision.unwrap_or(0).min(MAX_FIELD_WIDTH));
        index += consumed;
    }

    while matches!(chars.get(index), Some('l' | 'h' | 'j' | 'z' | 't' | 'L')) {
        index += 1;
    }

    let conversion = *chars.get(index)?;
    if FormatParam::from_conversion(conversion) == FormatParam::Unknown {
        return None;
    }
    spec.conversion = conversion;
    Some((spec, index + 1))
}

fn parse_number(chars: &[char]) -> (Option<usize>, usize) {
    let digits: String = chars.iter().take_while(|c| c.is_ascii_digit()).collect();
    let consumed = digits.len();
    (digits.parse().ok(), consumed)
}

fn unescape_percent(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut index = 0;
    while index < chars.len() {
        out.push(chars[index]);
        if chars[index] == '%' && chars.get(index + 1) == Some(&'%') {
            index += 1;
        }
        index += 1;
    }
    out
}

fn sign_prefix(negative: bool, spec: ConversionSpec) -> &'static str {
    if negative {
        "-"
    } else if spec.force_sign {
        "+"
    } else if spec.space_sign {
        " "
    } else {
        ""
    }
}

fn pad(prefix: &str, digits: &str, spec: ConversionSpec, zero_pad_allowed: bool) -> String {
    let len = prefix.chars().count() + digits.chars().count();
    if len >= spec.width {
        return format!("{prefix}{digits}");
    }
    let fill = spec.width - len;
    if spec.left_align {
        format!("{prefix}{digits}{}", " ".repeat(fill))
    } else if spec.zero_pad && zero_pad_allowed {
        format!("{prefix}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{prefix}{digits}", " ".repeat(fill))
    }
}

fn apply_integer_precision(digits: String, precision: Option<usize>, is_zero: bool) -> String {
    match precision {
        Some(0) if is_zero => String::new(),
        Some(precision) if digits.len() < precision => {
            format!("{}{digits}", "0".repeat(precision - digits.len()))
        }
        _ => digits,
    }
}

fn format_signed(value: i64, spec: ConversionSpec) -> String {
    let digits = apply_integer_precision(value.unsigned_abs().to_string(), spec.precision, value == 0);
    pad(
        sign_prefix(value < 0, spec),
        &digits,
        spec,
        spec.precision.is_none(),
    )
}

fn format_unsigned(value: u64, spec: ConversionSpec) -> String {
    let (digits, prefix) = match spec.conversion {
        'o' => {
            let digits = format!("{value:o}");
            let prefix = if spec.alternate && value != 0 { "0" } else { "" };
            (digits, prefix)
        }
        'x' => (format!("{value:x}"), if spec.alternate && value != 0 { "0x" } else { "" }),
        'X' => (format!("{value:X}"), if spec.alternate && value != 0 { "0X" } else { "" }),
        _ => (value.to_string(), ""),
    };
    let digits = apply_integer_precision(digits, spec.precision, value == 0);
    pad(prefix, &digits, spec, spec.precision.is_none())
}

fn format_char(value: f64, spec: ConversionSpec) -> String {
    let character = u32::try_from(value as i64)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or('?');
    pad("", &character.to_string(), spec, false)
}

fn format_real(value: f64, spec: ConversionSpec) -> String {
    let upper = spec.conversion.is_ascii_uppercase();
    let negative = value.is_sign_negative() && value != 0.0;
    if !value.is_finite() {
        let text = if value.is_nan() { "nan" } else { "inf" };
        let text = if upper { text.to_uppercase() } else { text.to_owned() };
        return pad(sign_prefix(negative && !value.is_nan(), spec), &text, spec, false);
    }

    let magnitude = value.abs();
    let precision = spec.precision.unwrap_or(6);
    let mut body = match spec.conversion.to_ascii_lowercase() {
        'e' => format_exponent(magnitude, precision),
        'g' => format_general(magnitude, precision, spec.alternate),
        _ => format!("{magnitude:.precision$}"),
    };
    if spec.alternate && precision == 0 && !body.contains('.') && spec.conversion != 'g' {
        match body.find('e') {
            Some(at) => body.insert(at, '.'),
            None => body.push('.'),
        }
    }
    if upper {
        body = body.to_uppercase();
    }
    pad(sign_prefix(negative, spec), &body, spec, true)
}

fn split_exponent(magnitude: f64, precision: usize) -> (String, i32) {
    let rendered = format!("{magnitude:.precision$e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_owned(), exponent.parse().unwrap_or(0)),
        None => (rendered, 0),
    }
}

fn format_exponent(magnitude: f64, precision: usize) -> String {
    let (mantissa, exponent) = split_exponent(magnitude, precision);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

fn strip_trailing_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_owned();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

fn format_general(magnitude: f64, precision: usize, alternate: bool) -> String {
    let significant = precision.max(1);
    let exponent = if magnitude == 0.0 {
        0
    } else {
        split_exponent(magnitude, significant - 1).1
    };

    if exponent < -4 || exponent >= significant as i32 {
        let rendered = format_exponent(magnitude, significant - 1);
        if alternate {
            return rendered;
        }
        match rendered.split_once('e') {
            Some((mantissa, tail)) => format!("{}e{tail}", strip_trailing_zeros(mantissa)),
            None => rendered,
        }
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        let rendered = format!("{magnitude:.decimals$}");
        if alternate {
            rendered
        } else {
            strip_trailing_zeros(&rendered)
        }
    }
}

/// Memoizes the parsed format: re-parsing happens only when the format text
/// differs from the one used last.
#[derive(Debug, Clone, Default)]
pub struct LabelFormatCache {
    current: Option<LabelFormat>,
    parse_count: usize,
}

impl LabelFormatCache {
    pub fn format(&mut self, format: &str, value: f64) -> String {
        self.parsed(format).format(value)
    }

    pub fn param(&mut self, format: &str) -> FormatParam {
        self.parsed(format).param()
    }

    /// Number of times a format string had to be parsed.
    #[must_use]
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }

    fn parsed(&mut self, format: &str) -> &LabelFormat {
        let stale = self
            .current
            .as_ref()
            .is_none_or(|current| current.source != format);
        if stale {
            self.parse_count += 1;
            self.current = Some(LabelFormat::parse(format));
        }
        self.current.get_or_insert_with(|| LabelFormat::parse(format))
    }
}
